//! Research upgrades and the multipliers they grant.
//!
//! The research tree is a read-only lookup table: a division owns a set of
//! completed [`Research`] entries, and multiplier queries fold over that
//! set. There is no runtime tree mutation to persist.

use crate::office::EmployeeMultipliers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Completed research entries a division can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Research {
    /// Prerequisite lab; boosts research-point gain.
    HiTechRndLaboratory,
    /// Unlocks Market-TA1 auto-pricing.
    MarketTa1,
    /// Unlocks Market-TA2 auto-pricing.
    MarketTa2,
    /// Overclocked workstations; smarter, faster staff.
    Overclock,
    /// Assembly lines that correct their own defects.
    SelfCorrectingAssemblers,
    /// Drone-assisted assembly.
    DroneAssembly,
    /// Drone-assisted warehouse logistics.
    DroneTransport,
    /// Product-line tooling upgrade.
    UpgradeFulcrum,
    /// Allows carrying one more product.
    UpgradeCapacityI,
    /// Allows carrying another product on top of Capacity.I.
    UpgradeCapacityII,
    /// Sales-science program.
    SciAdvertising,
}

/// Multipliers a set of research entries grants a division.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResearchEffects {
    /// Material production multiplier.
    pub production: f64,
    /// Product production multiplier, on top of `production`.
    pub product_production: f64,
    /// Sale rate multiplier.
    pub sales: f64,
    /// Research-point gain multiplier.
    pub scientific_research: f64,
    /// Warehouse capacity multiplier.
    pub storage: f64,
    /// Advertising effectiveness multiplier.
    pub advertising: f64,
    /// Employee stat multipliers.
    pub employee: EmployeeMultipliers,
}

impl Default for ResearchEffects {
    fn default() -> Self {
        ResearchEffects {
            production: 1.0,
            product_production: 1.0,
            sales: 1.0,
            scientific_research: 1.0,
            storage: 1.0,
            advertising: 1.0,
            employee: EmployeeMultipliers::default(),
        }
    }
}

impl Research {
    /// Every research entry, in stable order.
    pub const ALL: [Research; 11] = [
        Research::HiTechRndLaboratory,
        Research::MarketTa1,
        Research::MarketTa2,
        Research::Overclock,
        Research::SelfCorrectingAssemblers,
        Research::DroneAssembly,
        Research::DroneTransport,
        Research::UpgradeFulcrum,
        Research::UpgradeCapacityI,
        Research::UpgradeCapacityII,
        Research::SciAdvertising,
    ];

    /// Research points required to complete this entry.
    pub fn cost(self) -> f64 {
        match self {
            Research::HiTechRndLaboratory => 5_000.0,
            Research::MarketTa1 => 20_000.0,
            Research::MarketTa2 => 50_000.0,
            Research::Overclock => 15_000.0,
            Research::SelfCorrectingAssemblers => 25_000.0,
            Research::DroneAssembly => 25_000.0,
            Research::DroneTransport => 30_000.0,
            Research::UpgradeFulcrum => 10_000.0,
            Research::UpgradeCapacityI => 20_000.0,
            Research::UpgradeCapacityII => 30_000.0,
            Research::SciAdvertising => 10_000.0,
        }
    }

    /// Research that must be completed before this one.
    pub fn prerequisite(self) -> Option<Research> {
        match self {
            Research::HiTechRndLaboratory => None,
            Research::MarketTa1 => Some(Research::HiTechRndLaboratory),
            Research::MarketTa2 => Some(Research::MarketTa1),
            Research::UpgradeCapacityI => Some(Research::UpgradeFulcrum),
            Research::UpgradeCapacityII => Some(Research::UpgradeCapacityI),
            _ => Some(Research::HiTechRndLaboratory),
        }
    }

    fn apply(self, effects: &mut ResearchEffects) {
        match self {
            Research::HiTechRndLaboratory => {
                effects.scientific_research *= 1.10;
                effects.production *= 1.05;
            }
            // TA tiers are capability unlocks, not multipliers.
            Research::MarketTa1 | Research::MarketTa2 => {}
            Research::Overclock => {
                effects.employee.intelligence *= 1.25;
                effects.employee.efficiency *= 1.25;
            }
            Research::SelfCorrectingAssemblers => effects.production *= 1.10,
            Research::DroneAssembly => effects.production *= 1.20,
            Research::DroneTransport => effects.storage *= 1.50,
            Research::UpgradeFulcrum => effects.product_production *= 1.05,
            Research::UpgradeCapacityI | Research::UpgradeCapacityII => {}
            Research::SciAdvertising => {
                effects.advertising *= 1.10;
                effects.sales *= 1.10;
            }
        }
    }
}

impl fmt::Display for Research {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Research::HiTechRndLaboratory => "Hi-Tech R&D Laboratory",
            Research::MarketTa1 => "Market-TA.I",
            Research::MarketTa2 => "Market-TA.II",
            Research::Overclock => "Overclock",
            Research::SelfCorrectingAssemblers => "Self-Correcting Assemblers",
            Research::DroneAssembly => "Drones - Assembly",
            Research::DroneTransport => "Drones - Transport",
            Research::UpgradeFulcrum => "uPgrade: Fulcrum",
            Research::UpgradeCapacityI => "uPgrade: Capacity.I",
            Research::UpgradeCapacityII => "uPgrade: Capacity.II",
            Research::SciAdvertising => "Sci-Advertising",
        };
        f.write_str(name)
    }
}

/// Fold a researched set into its combined multipliers.
pub fn combined_effects(researched: &BTreeSet<Research>) -> ResearchEffects {
    let mut effects = ResearchEffects::default();
    for research in researched {
        research.apply(&mut effects);
    }
    effects
}
