use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FailureReason;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Checking,
    Verified,
    OutOfRange,
    Error,
    NotSupported,
}

impl LocationStatus {
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            LocationStatus::Checking | LocationStatus::Verified => None,
            LocationStatus::OutOfRange => Some(FailureReason::OutOfRange),
            LocationStatus::Error => Some(FailureReason::LocationError),
            LocationStatus::NotSupported => Some(FailureReason::NotSupported),
        }
    }
}

/// What a finished geolocation check reports back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationOutcome {
    pub status: LocationStatus,
    pub distance: Option<f64>,
}

impl LocationOutcome {
    pub fn without_distance(status: LocationStatus) -> Self {
        Self {
            status,
            distance: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationCheck {
    pub attempt_id: u64,
    pub status: LocationStatus,
    pub distance: Option<f64>,
    pub started_at: DateTime<Utc>,
}

impl LocationCheck {
    pub fn checking(attempt_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            attempt_id,
            status: LocationStatus::Checking,
            distance: None,
            started_at: now,
        }
    }

    pub fn resolve(&mut self, outcome: LocationOutcome) {
        self.status = outcome.status;
        self.distance = outcome.distance;
    }

    pub fn is_checking(&self) -> bool {
        self.status == LocationStatus::Checking
    }

    pub fn verified(&self) -> bool {
        self.status == LocationStatus::Verified
    }
}
