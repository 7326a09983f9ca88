//! School year data models and DTOs.
//!
//! Re-exports the school year models from the `scolaris-models` crate.

pub use scolaris_models::school_years::*;
