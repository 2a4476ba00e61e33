use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CaptureMethod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttemptStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl Default for AttemptStatus {
    fn default() -> Self {
        AttemptStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InvalidCode,
    NotRecognized,
    CameraError,
    OutOfRange,
    LocationError,
    NotSupported,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InvalidCode => "invalid_code",
            FailureReason::NotRecognized => "not_recognized",
            FailureReason::CameraError => "camera_error",
            FailureReason::OutOfRange => "out_of_range",
            FailureReason::LocationError => "location_error",
            FailureReason::NotSupported => "not_supported",
        }
    }
}

/// Result of a single QR or face scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanOutcome {
    Succeeded,
    Failed(FailureReason),
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureAttempt {
    /// Zero until the first scan starts; afterwards unique per page lifetime.
    pub id: u64,
    pub method: CaptureMethod,
    pub status: AttemptStatus,
    pub failure_reason: Option<FailureReason>,
    pub started_at: Option<DateTime<Utc>>,
}

impl CaptureAttempt {
    pub fn idle(method: CaptureMethod) -> Self {
        Self {
            id: 0,
            method,
            status: AttemptStatus::Idle,
            failure_reason: None,
            started_at: None,
        }
    }

    pub fn begin(&mut self, id: u64, now: DateTime<Utc>) {
        *self = Self {
            id,
            method: self.method,
            status: AttemptStatus::Running,
            failure_reason: None,
            started_at: Some(now),
        };
    }

    pub fn resolve(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Succeeded => {
                self.status = AttemptStatus::Succeeded;
                self.failure_reason = None;
            }
            ScanOutcome::Failed(reason) => {
                self.status = AttemptStatus::Failed;
                self.failure_reason = Some(reason);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == AttemptStatus::Running
    }

    pub fn succeeded(&self) -> bool {
        self.status == AttemptStatus::Succeeded
    }
}
