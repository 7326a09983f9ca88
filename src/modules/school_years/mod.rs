//! School years module.
//!
//! A school year is the top-level academic calendar record of a tenant.
//! Creating a year either accepts an explicit period list (validated for
//! strict separation per track) or partitions the year into generated
//! periods for the requested tracks. At most one year per tenant is
//! ACTIVE and at most one is the default; both invariants are enforced
//! by cascading demotion inside the mutating transaction.

pub mod controller;
pub mod model;
pub mod partition;
pub mod router;
pub mod service;
pub mod validation;
