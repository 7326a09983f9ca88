//! # Scolaris Core
//!
//! Core types, errors, and utilities for the Scolaris API.
//!
//! This crate provides foundational types used throughout the Scolaris
//! application:
//!
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`pagination`]: Pagination utilities for API responses

pub mod errors;
pub mod pagination;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
