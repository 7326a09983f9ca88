//! Shared value types for the academic calendar domain.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state shared by school years and periods.
///
/// Transitions are caller-driven; any state may move to any other state on
/// explicit request. Moving to `Active` is the only transition that
/// cascades (demoting the previously active sibling to `Completed`).
/// `Completed` is not terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lifecycle_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    Upcoming,
    Active,
    Completed,
}

impl LifecycleStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upcoming => "UPCOMING",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

/// Well-known period tracks and their partitioning rules.
///
/// A track is a free-form string key on each period; only the tracks listed
/// here are recognized by the partition generator. Periods with any other
/// track value are accepted when supplied explicitly but never generated.
pub mod tracks {
    pub const TRIMESTER: &str = "TRIMESTER";
    pub const SEMESTER: &str = "SEMESTER";

    /// Number of generated periods for a recognized track.
    pub fn period_count(track: &str) -> Option<u32> {
        match track {
            TRIMESTER => Some(3),
            SEMESTER => Some(2),
            _ => None,
        }
    }

    /// Display label used when naming generated periods.
    pub fn display_label(track: &str) -> &str {
        match track {
            TRIMESTER => "Trimestre",
            SEMESTER => "Semestre",
            other => other,
        }
    }
}
