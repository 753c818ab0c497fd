#![deny(warnings)]

//! The corporation economic-simulation engine.
//!
//! A [`Corporation`] advances one global phase per [`Corporation::process`]
//! call — `START → PURCHASE → PRODUCTION → SALE → EXPORT`, cycling — and
//! every [`Division`] executes the logic bound to that phase across its
//! cities. All state mutation is synchronous inside one call; batches of
//! more than one market cycle scale rates instead of looping, so offline
//! catch-ups stay cheap and numerically equivalent.
//!
//! The engine runs headless: configuration enters through the validated
//! policy API, diagnostics leave through the [`CycleContext`], and the
//! presentation layer reads plain getters.

pub mod api;
pub mod context;
pub mod corporation;
pub mod division;
pub mod error;
mod sale;
pub mod state;

pub use context::{CorpMultipliers, CycleContext, Diagnostic};
pub use corporation::Corporation;
pub use division::Division;
pub use error::EngineError;
pub use state::CorpState;
