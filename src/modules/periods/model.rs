//! Period data models and DTOs.
//!
//! Re-exports the period models from the `scolaris-models` crate.

pub use scolaris_models::periods::*;
