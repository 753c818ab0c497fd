//! Per-invocation cycle context: batch size, seeded RNG, diagnostics.
//!
//! Every operation receives its context explicitly. There is no global
//! corporation or RNG; identical seeds and inputs reproduce identical runs.

use corp_core::constants::SECONDS_PER_MARKET_CYCLE;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// A user-visible, non-fatal problem raised while processing a cycle:
/// a malformed formula, an invalid export target, a NaN reset. The
/// triggering sub-operation yields a zero/no-op result and siblings
/// continue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description.
    pub message: String,
}

/// State threaded through one `process` invocation and across cycles: the
/// current batch size, the deterministic RNG, and accumulated diagnostics.
#[derive(Debug)]
pub struct CycleContext {
    /// Cycles covered by the current batch; >1 when catching up.
    pub market_cycles: u32,
    /// Deterministic RNG for market drift and product launches.
    pub rng: ChaCha8Rng,
    /// Diagnostics accumulated since last drained.
    pub diagnostics: Vec<Diagnostic>,
}

impl CycleContext {
    /// Context with a fixed RNG seed and a single-cycle batch.
    pub fn new(seed: u64) -> Self {
        CycleContext {
            market_cycles: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
            diagnostics: Vec::new(),
        }
    }

    /// Batch size as a float scale factor.
    pub fn cycles(&self) -> f64 {
        f64::from(self.market_cycles)
    }

    /// Seconds covered by the current batch.
    pub fn cycle_seconds(&self) -> f64 {
        self.cycles() * SECONDS_PER_MARKET_CYCLE
    }

    /// Record a user-visible diagnostic.
    pub fn raise(&mut self, message: String) {
        warn!(diagnostic = %message);
        self.diagnostics.push(Diagnostic { message });
    }

    /// Take all accumulated diagnostics.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Snapshot of corporation-wide multipliers handed to each division for the
/// duration of one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorpMultipliers {
    /// Production multiplier from corporation upgrades.
    pub production: f64,
    /// Sale-rate multiplier from corporation upgrades.
    pub sales: f64,
    /// Advertising multiplier from corporation upgrades.
    pub advertising: f64,
    /// Research-point gain multiplier from corporation upgrades.
    pub scientific_research: f64,
    /// Warehouse-size multiplier from corporation upgrades.
    pub storage: f64,
    /// Passive popularity gain per cycle from DreamSense.
    pub dream_sense_gain: f64,
}

impl Default for CorpMultipliers {
    fn default() -> Self {
        CorpMultipliers {
            production: 1.0,
            sales: 1.0,
            advertising: 1.0,
            scientific_research: 1.0,
            storage: 1.0,
            dream_sense_gain: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_seconds_scale_with_batch() {
        let mut ctx = CycleContext::new(1);
        assert_eq!(ctx.cycle_seconds(), SECONDS_PER_MARKET_CYCLE);
        ctx.market_cycles = 10;
        assert_eq!(ctx.cycle_seconds(), 10.0 * SECONDS_PER_MARKET_CYCLE);
    }

    #[test]
    fn diagnostics_drain() {
        let mut ctx = CycleContext::new(1);
        ctx.raise("bad formula".to_string());
        ctx.raise("bad export".to_string());
        let drained = ctx.drain_diagnostics();
        assert_eq!(drained.len(), 2);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn same_seed_same_stream() {
        use rand::Rng;
        let mut a = CycleContext::new(42);
        let mut b = CycleContext::new(42);
        let xs: Vec<f64> = (0..8).map(|_| a.rng.gen()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.rng.gen()).collect();
        assert_eq!(xs, ys);
    }
}
