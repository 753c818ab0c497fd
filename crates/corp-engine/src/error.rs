//! Errors returned by the engine's policy-mutator surface.
//!
//! Every mutator validates the division/city/material reference chain and
//! the syntax of player formulas before touching state; an invalid call
//! fails with a descriptive error instead of silently doing nothing.

use corp_core::{City, IndustryType, Research, ValidationError};
use corp_expr::ExprError;
use thiserror::Error;

/// Errors from the inbound policy API.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No division by that name.
    #[error("unknown division {0:?}")]
    UnknownDivision(String),
    /// A division by that name already exists.
    #[error("division {0:?} already exists")]
    DuplicateDivision(String),
    /// The division does not operate a warehouse in that city.
    #[error("division {division:?} has no warehouse in {city}")]
    NoWarehouse {
        /// Division name.
        division: String,
        /// City.
        city: City,
    },
    /// The division does not operate an office in that city.
    #[error("division {division:?} has no office in {city}")]
    NoOffice {
        /// Division name.
        division: String,
        /// City.
        city: City,
    },
    /// The division already operates in that city.
    #[error("division {division:?} already operates in {city}")]
    CityTaken {
        /// Division name.
        division: String,
        /// City.
        city: City,
    },
    /// No product by that name.
    #[error("division {division:?} has no product named {product:?}")]
    UnknownProduct {
        /// Division name.
        division: String,
        /// Product name.
        product: String,
    },
    /// A product by that name already exists.
    #[error("a product named {0:?} already exists")]
    DuplicateProduct(String),
    /// The division's industry does not develop products.
    #[error("industry {0} cannot develop products")]
    NoProducts(IndustryType),
    /// The division already carries its maximum number of products.
    #[error("product limit reached ({0} max)")]
    TooManyProducts(u32),
    /// A player formula failed to parse.
    #[error("invalid formula {text:?}: {source}")]
    InvalidExpression {
        /// The offending formula.
        text: String,
        /// Parser error.
        #[source]
        source: ExprError,
    },
    /// The operation requires a research the division has not completed.
    #[error("{operation} requires research {research}")]
    MissingResearch {
        /// What was attempted.
        operation: &'static str,
        /// The missing research.
        research: Research,
    },
    /// Research prerequisite not met.
    #[error("research {research} requires {prerequisite} first")]
    MissingPrerequisite {
        /// The research being bought.
        research: Research,
        /// Its unmet prerequisite.
        prerequisite: Research,
    },
    /// Not enough research points.
    #[error("research {research} costs {cost} points; division has {available:.1}")]
    InsufficientResearchPoints {
        /// The research being bought.
        research: Research,
        /// Its cost.
        cost: f64,
        /// Points on hand.
        available: f64,
    },
    /// An export rule pointing a material at its own warehouse.
    #[error("an export may not target its own warehouse")]
    SelfExport,
    /// No matching export rule to remove.
    #[error("no export of {material} to {division:?}/{city}")]
    UnknownExport {
        /// Exported material.
        material: corp_core::MaterialName,
        /// Target division.
        division: String,
        /// Target city.
        city: City,
    },
    /// The corporation cannot afford the operation.
    #[error("insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds {
        /// Cost of the operation.
        needed: f64,
        /// Funds on hand.
        available: f64,
    },
    /// A core-level validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
