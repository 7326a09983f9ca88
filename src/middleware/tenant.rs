use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::ids::TenantId;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Extractor that resolves the calling tenant from the `X-Tenant-Id` header.
///
/// Authentication happens upstream at the gateway; by the time a request
/// reaches this service the header is expected to carry the tenant's UUID.
/// A missing or malformed header is rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub TenantId);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized(anyhow::anyhow!("Missing X-Tenant-Id header"))
            })?;

        let tenant_id = header.parse::<Uuid>().map_err(|_| {
            AppError::unauthorized(anyhow::anyhow!("Invalid X-Tenant-Id header"))
        })?;

        Ok(Tenant(TenantId::from(tenant_id)))
    }
}
