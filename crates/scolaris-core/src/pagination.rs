//! Offset-based pagination for list endpoints.
//!
//! Query parameters: `limit` (1-100, default 10) and `offset` (default 0).
//! Responses carry a [`PaginationMeta`] block alongside the data:
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": { "total": 42, "limit": 10, "offset": 20, "has_more": true }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Deserializes an optional query-string value into an optional i64,
/// treating the empty string as absent.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    pub offset: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Effective limit, clamped to [1, 100]. Defaults to 10.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Effective offset, clamped to a minimum of 0.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
