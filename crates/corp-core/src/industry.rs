//! Industry types and their static production data.

use crate::material::MaterialName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The line of business a division is locked into at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndustryType {
    /// Grows plants and food from water and chemicals.
    Agriculture,
    /// Refines plants into chemicals.
    Chemical,
    /// Builds hardware from metal; designs computer products.
    Computers,
    /// Produces AI cores; designs software products.
    Software,
    /// Consumes plants; designs tobacco products.
    Tobacco,
}

/// Static per-industry data: the production recipe and the exponents that
/// shape how boost materials, research, and advertising pay off. All
/// exponents are < 1 (diminishing returns); a lower value means the
/// industry benefits less from that input.
#[derive(Clone, Copy, Debug)]
pub struct IndustryData {
    /// Funds required to create a division of this industry.
    pub starting_cost: f64,
    /// Whether the industry can develop products.
    pub makes_products: bool,
    /// Real-estate production exponent.
    pub real_estate_factor: f64,
    /// Research/science exponent.
    pub science_factor: f64,
    /// Hardware production exponent.
    pub hardware_factor: f64,
    /// Robots production exponent.
    pub robot_factor: f64,
    /// AI-cores production exponent.
    pub ai_core_factor: f64,
    /// Advertising exponent.
    pub advertising_factor: f64,
    /// Materials consumed per unit produced: `(material, units required)`.
    pub required_materials: &'static [(MaterialName, f64)],
    /// Materials created by production, all at the same rate.
    pub produced_materials: &'static [MaterialName],
}

impl IndustryType {
    /// Every industry, in stable order.
    pub const ALL: [IndustryType; 5] = [
        IndustryType::Agriculture,
        IndustryType::Chemical,
        IndustryType::Computers,
        IndustryType::Software,
        IndustryType::Tobacco,
    ];

    /// Static data table for this industry.
    pub fn data(self) -> &'static IndustryData {
        match self {
            IndustryType::Agriculture => &AGRICULTURE,
            IndustryType::Chemical => &CHEMICAL,
            IndustryType::Computers => &COMPUTERS,
            IndustryType::Software => &SOFTWARE,
            IndustryType::Tobacco => &TOBACCO,
        }
    }

    /// Industries whose product markets drift faster than the default.
    pub fn volatile_product_market(self) -> bool {
        matches!(self, IndustryType::Software | IndustryType::Tobacco)
    }
}

impl fmt::Display for IndustryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndustryType::Agriculture => "Agriculture",
            IndustryType::Chemical => "Chemical",
            IndustryType::Computers => "Computers",
            IndustryType::Software => "Software",
            IndustryType::Tobacco => "Tobacco",
        };
        f.write_str(name)
    }
}

static AGRICULTURE: IndustryData = IndustryData {
    starting_cost: 40e9,
    makes_products: false,
    real_estate_factor: 0.72,
    science_factor: 0.5,
    hardware_factor: 0.2,
    robot_factor: 0.3,
    ai_core_factor: 0.3,
    advertising_factor: 0.04,
    required_materials: &[(MaterialName::Water, 0.5), (MaterialName::Chemicals, 0.2)],
    produced_materials: &[MaterialName::Plants, MaterialName::Food],
};

static CHEMICAL: IndustryData = IndustryData {
    starting_cost: 70e9,
    makes_products: false,
    real_estate_factor: 0.25,
    science_factor: 0.75,
    hardware_factor: 0.2,
    robot_factor: 0.25,
    ai_core_factor: 0.2,
    advertising_factor: 0.07,
    required_materials: &[(MaterialName::Plants, 1.0), (MaterialName::Water, 0.5)],
    produced_materials: &[MaterialName::Chemicals],
};

static COMPUTERS: IndustryData = IndustryData {
    starting_cost: 500e9,
    makes_products: true,
    real_estate_factor: 0.2,
    science_factor: 0.62,
    hardware_factor: 0.0,
    robot_factor: 0.36,
    ai_core_factor: 0.19,
    advertising_factor: 0.17,
    required_materials: &[(MaterialName::Metal, 2.0)],
    produced_materials: &[MaterialName::Hardware],
};

static SOFTWARE: IndustryData = IndustryData {
    starting_cost: 25e9,
    makes_products: true,
    real_estate_factor: 0.15,
    science_factor: 0.62,
    hardware_factor: 0.25,
    robot_factor: 0.05,
    ai_core_factor: 0.18,
    advertising_factor: 0.16,
    required_materials: &[(MaterialName::Hardware, 0.5), (MaterialName::Energy, 0.5)],
    produced_materials: &[MaterialName::AiCores],
};

static TOBACCO: IndustryData = IndustryData {
    starting_cost: 20e9,
    makes_products: true,
    real_estate_factor: 0.15,
    science_factor: 0.75,
    hardware_factor: 0.15,
    robot_factor: 0.2,
    ai_core_factor: 0.15,
    advertising_factor: 0.2,
    required_materials: &[(MaterialName::Plants, 1.0)],
    produced_materials: &[],
};
