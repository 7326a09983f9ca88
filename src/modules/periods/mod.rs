//! Periods module.
//!
//! Periods are the grading sub-intervals of a school year, grouped into
//! independent tracks. Within a `(year, track)` group periods must be
//! strictly separated and at most one may be ACTIVE at a time.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
