//! Middleware modules for request processing.
//!
//! # Modules
//!
//! - [`tenant`]: Tenant resolution from the `X-Tenant-Id` header
//!
//! # Tenant Flow
//!
//! 1. The gateway authenticates the caller and forwards the request with
//!    an `X-Tenant-Id` header
//! 2. The [`tenant::Tenant`] extractor parses the header into a
//!    [`scolaris_models::ids::TenantId`]
//! 3. Every service call is scoped to that tenant; a missing or malformed
//!    header is rejected with 401 before any handler runs
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::tenant::Tenant;
//!
//! async fn list_years(Tenant(tenant_id): Tenant) -> impl IntoResponse {
//!     // tenant_id is a validated TenantId
//! }
//! ```

pub mod tenant;
