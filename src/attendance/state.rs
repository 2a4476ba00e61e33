use serde::{Deserialize, Serialize};

use crate::{
    db::models::AttendanceRecord,
    models::{CaptureAttempt, CaptureMethod, LocationCheck},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttendancePhase {
    Selecting,
    Capturing,
    ReadyToConfirm,
    Submitting,
    Completed,
}

impl Default for AttendancePhase {
    fn default() -> Self {
        AttendancePhase::Selecting
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceState {
    pub phase: AttendancePhase,
    pub active_method: Option<CaptureMethod>,
    /// Scan state for QR and face capture.
    pub attempt: Option<CaptureAttempt>,
    /// Location state for GPS capture.
    pub location: Option<LocationCheck>,
    pub record: Option<AttendanceRecord>,
    /// Last backend failure; cleared by the next confirmation or selection.
    pub gate_error: Option<String>,
    /// Attempt ids are never reused, so late results from a replaced attempt are
    /// recognisable even after a reset.
    #[serde(skip)]
    pub(crate) last_attempt_id: u64,
}

impl AttendanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the active method has produced a usable capture.
    pub fn capture_succeeded(&self) -> bool {
        match self.active_method {
            Some(CaptureMethod::Gps) => self
                .location
                .as_ref()
                .map(LocationCheck::verified)
                .unwrap_or(false),
            Some(_) => self
                .attempt
                .as_ref()
                .map(CaptureAttempt::succeeded)
                .unwrap_or(false),
            None => false,
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.phase == AttendancePhase::ReadyToConfirm && self.capture_succeeded()
    }

    /// Id of the attempt whose result is still outstanding, if any.
    pub fn pending_attempt_id(&self) -> Option<u64> {
        if let Some(attempt) = self.attempt.as_ref().filter(|a| a.is_running()) {
            return Some(attempt.id);
        }
        self.location
            .as_ref()
            .filter(|check| check.is_checking())
            .map(|check| check.attempt_id)
    }

    pub fn is_pending(&self, attempt_id: u64) -> bool {
        self.pending_attempt_id() == Some(attempt_id)
    }

    pub(crate) fn next_attempt_id(&mut self) -> u64 {
        self.last_attempt_id += 1;
        self.last_attempt_id
    }
}
