#![deny(warnings)]

//! Versioned save snapshots for the corporation engine.
//!
//! A [`SaveFile`] captures the corporation behind a schema version and a
//! wall-clock timestamp, in either human-readable JSON or compact bincode.
//! Loading validates the version, re-establishes the derived fields that
//! serialization skips (warehouse fill levels, division production
//! multipliers), and can turn the elapsed wall time into an offline
//! catch-up batch of market cycles.

use chrono::{DateTime, Utc};
use corp_core::constants::SECONDS_PER_MARKET_CYCLE;
use corp_engine::Corporation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Current save-file schema version. Bump on breaking layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Ceiling on offline catch-up, one week of cycles, so a stale save does
/// not trigger an absurd batch.
pub const MAX_OFFLINE_CYCLES: u32 = (7 * 24 * 3600) / SECONDS_PER_MARKET_CYCLE as u32;

/// Errors from encoding or decoding snapshots.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The snapshot was written by an incompatible schema.
    #[error("unsupported save schema version {found} (expected {expected})")]
    Version {
        /// Version found in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// JSON encode/decode failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Bincode encode/decode failure.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A versioned, timestamped snapshot of the whole corporation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    /// Schema version the snapshot was written with.
    pub schema_version: u32,
    /// Wall-clock time of the capture.
    pub saved_at: DateTime<Utc>,
    /// The corporation state.
    pub corporation: Corporation,
}

impl SaveFile {
    /// Capture a snapshot of `corporation` at `saved_at`.
    pub fn capture(corporation: &Corporation, saved_at: DateTime<Utc>) -> Self {
        SaveFile {
            schema_version: SCHEMA_VERSION,
            saved_at,
            corporation: corporation.clone(),
        }
    }

    /// Encode as pretty JSON.
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON, validate the schema version, and restore derived
    /// state.
    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        let mut save: SaveFile = serde_json::from_str(text)?;
        save.validate_and_restore()?;
        Ok(save)
    }

    /// Encode as compact binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from binary, validate the schema version, and restore
    /// derived state.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveError> {
        let mut save: SaveFile = bincode::deserialize(bytes)?;
        save.validate_and_restore()?;
        Ok(save)
    }

    fn validate_and_restore(&mut self) -> Result<(), SaveError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(SaveError::Version {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        restore(&mut self.corporation);
        Ok(())
    }
}

/// Recompute every derived field serialization skips: warehouse material
/// coverage and fill levels, and division production multipliers. Loaded
/// state is ready to process the next phase afterwards.
pub fn restore(corporation: &mut Corporation) {
    for division in corporation.divisions.values_mut() {
        for wh in division.warehouses.values_mut() {
            wh.restore();
        }
        let cities: Vec<corp_core::City> = division.warehouses.keys().copied().collect();
        for city in cities {
            division.update_warehouse_size_used(city);
        }
        division.calculate_production_factors();
        // A save taken mid-cycle still needs staff output for the phases
        // that remain before the next START recomputes it.
        let employee = division.research_effects().employee;
        for office in division.offices.values_mut() {
            office.recompute_production(&employee);
        }
    }
    info!(
        divisions = corporation.divisions.len(),
        "restored corporation snapshot"
    );
}

/// Market cycles elapsed between a save's timestamp and `now`, for
/// catch-up batching. Clamped to `[0, MAX_OFFLINE_CYCLES]`; a clock that
/// went backwards yields 0.
pub fn offline_market_cycles(saved_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = (now - saved_at).num_seconds().max(0) as f64;
    let cycles = (elapsed / SECONDS_PER_MARKET_CYCLE).floor();
    (cycles as u64).min(u64::from(MAX_OFFLINE_CYCLES)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use corp_core::{City, IndustryType, MaterialName, Research};
    use corp_engine::CycleContext;

    fn sample_corp() -> Corporation {
        let mut corp = Corporation::new("SaveCo", 500e9);
        corp.create_division("Agro", IndustryType::Agriculture).unwrap();
        corp.create_division("Tob", IndustryType::Tobacco).unwrap();
        corp.expand_division("Agro", City::Volhaven).unwrap();
        corp.division_mut("Agro").unwrap().research_points = 1234.5;
        corp.division_mut("Agro")
            .unwrap()
            .researched
            .insert(Research::HiTechRndLaboratory);
        corp.set_material_buy_rate("Agro", City::Sector12, MaterialName::Water, 2.5)
            .unwrap();
        corp.set_material_sell(
            "Agro",
            City::Sector12,
            MaterialName::Plants,
            Some("MAX".to_string()),
            Some("MP*1.1".to_string()),
        )
        .unwrap();
        corp.add_export(
            "Agro",
            City::Sector12,
            MaterialName::Plants,
            "Tob",
            City::Sector12,
            "EPROD/2".to_string(),
        )
        .unwrap();
        corp.develop_product("Tob", "Widget", City::Sector12, 1e6, 2e6)
            .unwrap();
        let mut ctx = CycleContext::new(11);
        corp.run_cycles(4, &mut ctx);
        corp
    }

    #[test]
    fn json_roundtrip_preserves_every_persistent_field() {
        let corp = sample_corp();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let save = SaveFile::capture(&corp, at);
        let json = save.to_json().unwrap();
        let back = SaveFile::from_json(&json).unwrap();

        assert_eq!(back.saved_at, at);
        let a = &back.corporation;
        assert_eq!(a.funds, corp.funds);
        assert_eq!(a.state, corp.state);
        assert_eq!(a.divisions.len(), corp.divisions.len());

        let (da, db) = (&a.divisions["Agro"], &corp.divisions["Agro"]);
        assert_eq!(da.research_points, db.research_points);
        assert_eq!(da.researched, db.researched);
        assert_eq!(da.popularity, db.popularity);
        assert_eq!(da.last_cycle_revenue, db.last_cycle_revenue);
        let (wa, wb) = (
            &da.warehouses[&City::Sector12],
            &db.warehouses[&City::Sector12],
        );
        for name in MaterialName::ALL {
            let (ma, mb) = (wa.material(name), wb.material(name));
            assert_eq!(ma.stored, mb.stored, "{name} stock diverged");
            assert_eq!(ma.quality, mb.quality);
            assert_eq!(ma.average_price, mb.average_price);
            assert_eq!(ma.market_price, mb.market_price);
            assert_eq!(ma.exports, mb.exports);
            assert_eq!(ma.desired_sell_amount, mb.desired_sell_amount);
        }
        let (pa, pb) = (&da.offices[&City::Volhaven], &db.offices[&City::Volhaven]);
        assert_eq!(pa.jobs, pb.jobs);
        assert_eq!(
            a.divisions["Tob"].products["Widget"].development_progress,
            corp.divisions["Tob"].products["Widget"].development_progress
        );
    }

    #[test]
    fn binary_roundtrip_matches_json_roundtrip() {
        let corp = sample_corp();
        let save = SaveFile::capture(&corp, Utc::now());
        let bytes = save.to_bytes().unwrap();
        let back = SaveFile::from_bytes(&bytes).unwrap();
        assert_eq!(back.corporation.funds, corp.funds);
        assert_eq!(
            back.corporation.divisions["Agro"].warehouses[&City::Sector12]
                .material(MaterialName::Water)
                .stored,
            corp.divisions["Agro"].warehouses[&City::Sector12]
                .material(MaterialName::Water)
                .stored
        );
    }

    #[test]
    fn transient_fields_are_recomputed_not_persisted() {
        let corp = sample_corp();
        let save = SaveFile::capture(&corp, Utc::now());
        let json = save.to_json().unwrap();
        // The derived fields never appear in a division's payload.
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let division = &value["corporation"]["divisions"]["Agro"];
        assert!(division.get("production_mult").is_none());
        assert!(division["warehouses"]["Sector12"].get("size_used").is_none());

        let back = SaveFile::from_json(&json).unwrap().corporation;
        let wa = &back.divisions["Agro"].warehouses[&City::Sector12];
        let wb = &corp.divisions["Agro"].warehouses[&City::Sector12];
        assert!((wa.size_used - wb.size_used).abs() < 1e-9);
        assert!(
            (back.divisions["Agro"].production_mult - corp.divisions["Agro"].production_mult)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn loaded_state_processes_identically_to_live_state() {
        let mut live = sample_corp();
        let save = SaveFile::capture(&live, Utc::now());
        let mut loaded = SaveFile::from_bytes(&save.to_bytes().unwrap())
            .unwrap()
            .corporation;
        // Same seed, same run: a snapshot is a transparent checkpoint.
        let mut ctx_a = CycleContext::new(5);
        let mut ctx_b = CycleContext::new(5);
        live.run_cycles(3, &mut ctx_a);
        loaded.run_cycles(3, &mut ctx_b);
        assert_eq!(live.funds, loaded.funds);
        assert_eq!(
            live.divisions["Agro"].warehouses[&City::Sector12]
                .material(MaterialName::Plants)
                .stored,
            loaded.divisions["Agro"].warehouses[&City::Sector12]
                .material(MaterialName::Plants)
                .stored
        );
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let corp = Corporation::new("SaveCo", 0.0);
        let mut save = SaveFile::capture(&corp, Utc::now());
        save.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&save).unwrap();
        match SaveFile::from_json(&json) {
            Err(SaveError::Version { found, expected }) => {
                assert_eq!(found, SCHEMA_VERSION + 1);
                assert_eq!(expected, SCHEMA_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn offline_cycles_floor_and_clamp() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(offline_market_cycles(t0, t0), 0);
        assert_eq!(
            offline_market_cycles(t0, t0 + chrono::Duration::seconds(9)),
            0
        );
        assert_eq!(
            offline_market_cycles(t0, t0 + chrono::Duration::seconds(95)),
            9
        );
        // Clock went backwards: no catch-up.
        assert_eq!(
            offline_market_cycles(t0, t0 - chrono::Duration::hours(1)),
            0
        );
        // A month away clamps to the ceiling.
        assert_eq!(
            offline_market_cycles(t0, t0 + chrono::Duration::days(30)),
            MAX_OFFLINE_CYCLES
        );
    }

    proptest::proptest! {
        #[test]
        fn offline_cycles_never_exceed_ceiling(secs in 0i64..100_000_000) {
            let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let n = offline_market_cycles(t0, t0 + chrono::Duration::seconds(secs));
            proptest::prop_assert!(n <= MAX_OFFLINE_CYCLES);
        }
    }
}
