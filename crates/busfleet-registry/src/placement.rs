//! Resolving a vehicle's membership rows into a single placement.
//!
//! A vehicle is in exactly one of four logical states:
//!
//! ```text
//!                  ┌──────────────────────────┐
//!   register ────▶ │  Registered, undeployed  │ ◀──── clear
//!                  └────────────┬─────────────┘
//!                               │ set status
//!          ┌────────────────────┼────────────────────┐
//!          ▼                    ▼                    ▼
//!    ┌──────────┐         ┌──────────┐         ┌────────────┐
//!    │ On route │ ◀─────▶ │ In depot │ ◀─────▶ │ In service │
//!    └──────────┘         └──────────┘         └────────────┘
//! ```
//!
//! Moves between deployed states always pass through an implicit clear.

use std::fmt;

use busfleet_store::{Membership, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a registered vehicle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Placement {
    /// The vehicle occupies one of the three status categories.
    Deployed {
        /// The occupied category.
        status: Status,
        /// When the vehicle entered it.
        since: DateTime<Utc>,
    },
    /// The vehicle is on the roster but in no category.
    Undeployed,
}

impl Placement {
    /// Returns the occupied status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<Status> {
        match self {
            Self::Deployed { status, .. } => Some(*status),
            Self::Undeployed => None,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployed { status, since } => {
                write!(
                    f,
                    "is {} since {}",
                    status.describe(),
                    since.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::Undeployed => f.write_str("is registered but not deployed"),
        }
    }
}

/// Resolve membership rows into a placement using the fixed priority order
/// on route, in depot, in service.
///
/// The rows need not be sorted, and more than one row (a violated
/// exclusivity invariant) still yields the highest-priority match.
#[must_use]
pub fn resolve(memberships: &[Membership]) -> Placement {
    memberships
        .iter()
        .min_by_key(|m| m.status)
        .map_or(Placement::Undeployed, |m| Placement::Deployed {
            status: m.status,
            since: m.event_time,
        })
}

/// Returns true if the rows satisfy the exclusivity invariant.
#[must_use]
pub fn is_exclusive(memberships: &[Membership]) -> bool {
    memberships.len() <= 1
}
