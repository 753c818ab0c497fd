//! Tradable materials: static info and per-warehouse state.

use crate::city::City;
use crate::constants;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of tradable materials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialName {
    /// Water
    Water,
    /// Energy
    Energy,
    /// Food
    Food,
    /// Plants
    Plants,
    /// Metal
    Metal,
    /// Hardware; also boosts production as a warehouse stock.
    Hardware,
    /// Chemicals
    Chemicals,
    /// Robots; boosts production as a warehouse stock.
    Robots,
    /// AI Cores; boosts production and produced-material quality.
    AiCores,
    /// Real Estate; boosts production as a warehouse stock.
    RealEstate,
}

impl MaterialName {
    /// Every material, in stable iteration order.
    pub const ALL: [MaterialName; 10] = [
        MaterialName::Water,
        MaterialName::Energy,
        MaterialName::Food,
        MaterialName::Plants,
        MaterialName::Metal,
        MaterialName::Hardware,
        MaterialName::Chemicals,
        MaterialName::Robots,
        MaterialName::AiCores,
        MaterialName::RealEstate,
    ];

    /// Materials that boost a division's production multiplier when stocked.
    pub const PRODUCTION_BOOSTERS: [MaterialName; 4] = [
        MaterialName::RealEstate,
        MaterialName::Hardware,
        MaterialName::Robots,
        MaterialName::AiCores,
    ];

    /// Static market data for this material.
    pub fn info(self) -> &'static MaterialInfo {
        &MATERIAL_INFO[self as usize]
    }
}

impl fmt::Display for MaterialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaterialName::Water => "Water",
            MaterialName::Energy => "Energy",
            MaterialName::Food => "Food",
            MaterialName::Plants => "Plants",
            MaterialName::Metal => "Metal",
            MaterialName::Hardware => "Hardware",
            MaterialName::Chemicals => "Chemicals",
            MaterialName::Robots => "Robots",
            MaterialName::AiCores => "AI Cores",
            MaterialName::RealEstate => "Real Estate",
        };
        f.write_str(name)
    }
}

/// Static per-material market characteristics.
#[derive(Clone, Copy, Debug)]
pub struct MaterialInfo {
    /// Storage units one unit of this material occupies.
    pub size: f64,
    /// Baseline market price.
    pub base_price: f64,
    /// Maximum per-cycle drift magnitude of price/demand/competition.
    pub max_volatility: f64,
    /// Baseline market demand.
    pub base_demand: f64,
    /// Baseline market competition.
    pub base_competition: f64,
}

// Indexed by `MaterialName as usize`; order must match `MaterialName::ALL`.
static MATERIAL_INFO: [MaterialInfo; 10] = [
    // Water
    MaterialInfo {
        size: 0.05,
        base_price: 1.5,
        max_volatility: 0.2,
        base_demand: 75.0,
        base_competition: 50.0,
    },
    // Energy
    MaterialInfo {
        size: 0.01,
        base_price: 2.0,
        max_volatility: 0.2,
        base_demand: 90.0,
        base_competition: 80.0,
    },
    // Food
    MaterialInfo {
        size: 0.03,
        base_price: 5.0,
        max_volatility: 0.5,
        base_demand: 80.0,
        base_competition: 60.0,
    },
    // Plants
    MaterialInfo {
        size: 0.05,
        base_price: 3.0,
        max_volatility: 0.6,
        base_demand: 70.0,
        base_competition: 50.0,
    },
    // Metal
    MaterialInfo {
        size: 0.1,
        base_price: 2.7,
        max_volatility: 1.0,
        base_demand: 95.0,
        base_competition: 70.0,
    },
    // Hardware
    MaterialInfo {
        size: 0.06,
        base_price: 8.0,
        max_volatility: 0.5,
        base_demand: 85.0,
        base_competition: 80.0,
    },
    // Chemicals
    MaterialInfo {
        size: 0.05,
        base_price: 4.0,
        max_volatility: 0.5,
        base_demand: 55.0,
        base_competition: 60.0,
    },
    // Robots
    MaterialInfo {
        size: 0.5,
        base_price: 75.0,
        max_volatility: 0.5,
        base_demand: 90.0,
        base_competition: 90.0,
    },
    // AI Cores
    MaterialInfo {
        size: 0.1,
        base_price: 28.0,
        max_volatility: 0.8,
        base_demand: 90.0,
        base_competition: 90.0,
    },
    // Real Estate
    MaterialInfo {
        size: 0.005,
        base_price: 80_000.0,
        max_volatility: 1.5,
        base_demand: 50.0,
        base_competition: 50.0,
    },
];

/// A standing rule transferring a fixed formula's worth of a material to
/// another division's warehouse every EXPORT phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialExport {
    /// Target division name.
    pub division: String,
    /// Target city.
    pub city: City,
    /// Amount formula; sees `MAX`, `EPROD`, `IPROD`, `EINV`, `IINV`.
    pub amount: String,
}

/// One material's state inside one warehouse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Which material this is.
    pub name: MaterialName,
    /// Units in storage. Invariant: `>= 0`, clamped against float drift.
    pub stored: f64,
    /// Blended quality of the stock. Invariant: `>= 0.1`.
    pub quality: f64,
    /// Weighted-average acquisition price of the stock.
    pub average_price: f64,
    /// Current market price; drifts every cycle.
    pub market_price: f64,
    /// Current market demand; drifts every cycle.
    pub demand: f64,
    /// Current market competition; drifts every cycle, capped at 99.99.
    pub competition: f64,
    /// Drift magnitude. Zero disables market drift for this material.
    pub market_volatility: f64,
    /// Player-configured purchase rate, units/second.
    pub buy_rate: f64,
    /// Units/second sold during the last SALE phase.
    pub actual_sell_rate: f64,
    /// Net production rate over the last cycle, units/second. Negative for
    /// consumed inputs.
    pub production_rate: f64,
    /// Units/second arriving via imports during the last EXPORT phase.
    pub import_rate: f64,
    /// Units/second leaving via exports during the last EXPORT phase.
    pub export_rate: f64,
    /// Desired sell amount formula (`MAX`, `PROD`, `INV`); `None` sells
    /// nothing.
    pub desired_sell_amount: Option<String>,
    /// Desired sell price formula (`MP`); `None` sells nothing unless a
    /// Market-TA tier is active.
    pub desired_sell_price: Option<String>,
    /// Market-TA1 auto-pricing: market price plus markup limit.
    pub market_ta1: bool,
    /// Market-TA2 auto-pricing: solve for the desired quantity's price.
    pub market_ta2: bool,
    /// Manual cap on production of this material, units per second.
    pub production_limit: Option<f64>,
    /// Standing export rules.
    pub exports: Vec<MaterialExport>,
}

impl Material {
    /// Fresh material state at baseline market conditions.
    pub fn new(name: MaterialName) -> Self {
        let info = name.info();
        Material {
            name,
            stored: 0.0,
            quality: 1.0,
            average_price: info.base_price,
            market_price: info.base_price,
            demand: info.base_demand,
            competition: info.base_competition,
            market_volatility: info.max_volatility,
            buy_rate: 0.0,
            actual_sell_rate: 0.0,
            production_rate: 0.0,
            import_rate: 0.0,
            export_rate: 0.0,
            desired_sell_amount: None,
            desired_sell_price: None,
            market_ta1: false,
            market_ta2: false,
            production_limit: None,
            exports: Vec::new(),
        }
    }

    /// The price premium over market this material's quality can sustain.
    pub fn markup_limit(&self) -> f64 {
        self.quality / constants::MATERIAL_MARKUP_FACTOR
    }

    /// Random walk of market price, demand, and competition. Drift
    /// direction couples price to demand so the market stays coherent.
    pub fn process_market<R: Rng>(&mut self, rng: &mut R) {
        if self.market_volatility <= 0.0 {
            return;
        }
        let jitter = rng.gen::<f64>() * self.market_volatility;
        let price_shift = 1.0 + jitter / 300.0;
        match rng.gen_range(0..4u8) {
            0 => {
                self.market_price *= price_shift;
                self.demand += jitter;
            }
            1 => {
                self.market_price /= price_shift;
                self.demand -= jitter;
            }
            2 => {
                self.competition += jitter;
                self.demand -= jitter;
            }
            _ => {
                self.competition -= jitter;
                self.demand += jitter;
            }
        }
        self.market_price = self.market_price.max(constants::MIN_MARKET_PRICE);
        self.demand = self.demand.clamp(0.0, 100.0);
        self.competition = self.competition.clamp(0.0, constants::MAX_COMPETITION);
    }

    /// Add `qty` units of `unit_quality` stock bought at `unit_price`,
    /// blending quality and average price by weighted average. An empty
    /// result resets quality to the neutral baseline.
    pub fn absorb(&mut self, qty: f64, unit_quality: f64, unit_price: f64) {
        let total = self.stored + qty;
        if total <= 0.0 {
            self.quality = 1.0;
            self.average_price = unit_price;
            self.stored = 0.0;
            return;
        }
        self.quality = ((self.quality * self.stored + unit_quality * qty) / total)
            .max(constants::MIN_MATERIAL_QUALITY);
        self.average_price = (self.average_price * self.stored + unit_price * qty) / total;
        self.stored = total;
    }

    /// Remove `qty` units, clamping at zero against floating-point
    /// overshoot from producibility-fraction arithmetic.
    pub fn consume(&mut self, qty: f64) {
        self.stored = (self.stored - qty).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn info_table_is_aligned() {
        for name in MaterialName::ALL {
            let info = name.info();
            assert!(info.size > 0.0, "{name} has no size");
            assert!(info.base_price > 0.0);
        }
        // Spot-check the enum-to-index mapping.
        assert_eq!(MaterialName::Water.info().base_price, 1.5);
        assert_eq!(MaterialName::RealEstate.info().base_price, 80_000.0);
    }

    #[test]
    fn absorb_blends_quality_and_price() {
        let mut mat = Material::new(MaterialName::Plants);
        mat.stored = 10.0;
        mat.quality = 2.0;
        mat.average_price = 4.0;
        mat.absorb(10.0, 4.0, 8.0);
        assert_eq!(mat.stored, 20.0);
        assert_eq!(mat.quality, 3.0);
        assert_eq!(mat.average_price, 6.0);
    }

    #[test]
    fn absorb_into_empty_resets_to_baseline() {
        let mut mat = Material::new(MaterialName::Plants);
        mat.quality = 7.0;
        mat.absorb(0.0, 3.0, 9.0);
        assert_eq!(mat.quality, 1.0);
        assert_eq!(mat.average_price, 9.0);
        assert_eq!(mat.stored, 0.0);
    }

    #[test]
    fn quality_floor_holds() {
        let mut mat = Material::new(MaterialName::Water);
        mat.stored = 1.0;
        mat.quality = 0.1;
        mat.absorb(1000.0, 0.0, 1.0);
        assert!(mat.quality >= 0.1);
    }

    #[test]
    fn consume_clamps_float_overshoot() {
        let mut mat = Material::new(MaterialName::Plants);
        mat.stored = 942_118.0;
        // Slightly more than stored, as produced by prod * (stored / prod).
        mat.consume(942_118.000_000_000_1);
        assert_eq!(mat.stored, 0.0);
    }

    #[test]
    fn market_drift_is_deterministic_and_clamped() {
        let mut a = Material::new(MaterialName::Metal);
        let mut b = Material::new(MaterialName::Metal);
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            a.process_market(&mut rng_a);
            b.process_market(&mut rng_b);
        }
        assert_eq!(a, b);
        assert!(a.market_price >= constants::MIN_MARKET_PRICE);
        assert!(a.competition <= constants::MAX_COMPETITION);
        assert!(a.demand >= 0.0);
    }

    #[test]
    fn zero_volatility_freezes_the_market() {
        let mut mat = Material::new(MaterialName::Metal);
        mat.market_volatility = 0.0;
        let before = mat.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        mat.process_market(&mut rng);
        assert_eq!(mat, before);
    }

    #[test]
    fn serde_roundtrip() {
        let mut mat = Material::new(MaterialName::Hardware);
        mat.stored = 12.5;
        mat.desired_sell_amount = Some("MAX/2".to_string());
        mat.exports.push(MaterialExport {
            division: "AgroCo".to_string(),
            city: City::Aevum,
            amount: "EPROD".to_string(),
        });
        let s = serde_json::to_string(&mat).unwrap();
        let back: Material = serde_json::from_str(&s).unwrap();
        assert_eq!(back, mat);
    }

    proptest! {
        #[test]
        fn absorb_never_goes_negative(start in 0.0f64..1e9, qty in 0.0f64..1e9,
                                      quality in 0.0f64..100.0, price in 0.0f64..1e6) {
            let mut mat = Material::new(MaterialName::Food);
            mat.stored = start;
            mat.absorb(qty, quality, price);
            prop_assert!(mat.stored >= 0.0);
            prop_assert!(mat.quality >= constants::MIN_MATERIAL_QUALITY);
        }

        #[test]
        fn consume_never_goes_negative(start in 0.0f64..1e9, qty in 0.0f64..2e9) {
            let mut mat = Material::new(MaterialName::Food);
            mat.stored = start;
            mat.consume(qty);
            prop_assert!(mat.stored >= 0.0);
        }
    }
}
