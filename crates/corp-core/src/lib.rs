#![deny(warnings)]

//! Core domain models for the corporation simulation.
//!
//! This crate defines the serializable entities the engine operates on —
//! cities, industries, materials, products, warehouses, offices, research —
//! together with their local behavior (market drift, weighted blending,
//! capacity accounting) and validation helpers. The cross-entity pipeline
//! itself lives in `corp-engine`.

use thiserror::Error;

pub mod city;
pub mod constants;
pub mod industry;
pub mod material;
pub mod office;
pub mod product;
pub mod research;
pub mod warehouse;

pub use city::City;
pub use industry::{IndustryData, IndustryType};
pub use material::{Material, MaterialExport, MaterialInfo, MaterialName};
pub use office::{EmployeeMultipliers, Job, JobFactors, OfficeSpace};
pub use product::{Product, ProductCityData};
pub use research::{Research, ResearchEffects};
pub use warehouse::{SmartSupplyOption, Warehouse};

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// More employees assigned than the office has room for.
    #[error("office capacity {size} exceeded by assignment of {requested} employees")]
    OfficeCapacityExceeded {
        /// Office size.
        size: u32,
        /// Total employees the assignment would require.
        requested: u32,
    },
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
    /// Quantities and rates must be non-negative.
    #[error("quantity must be non-negative")]
    NegativeQuantity,
    /// Warehouse capacity must be strictly positive.
    #[error("warehouse size must be > 0")]
    NonPositiveSize,
}

/// Validate a rate or quantity set from outside the engine.
pub fn validate_quantity(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeQuantity);
    }
    Ok(())
}
