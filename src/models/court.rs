//! Court and its availability status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourtStatus {
    #[default]
    Available,
    Maintenance,
    Occupied,
    Inactive,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub status: CourtStatus,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: None,
            active: true,
            status: CourtStatus::Available,
        }
    }

    /// Occupied only means "in use right now", so future slots can still be booked.
    pub fn is_schedulable(&self) -> bool {
        self.active && matches!(self.status, CourtStatus::Available | CourtStatus::Occupied)
    }
}
