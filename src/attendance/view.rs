//! What the attendance page shows for a given state: the status line and the buttons.

use serde::{Deserialize, Serialize};

use crate::models::{AttemptStatus, CaptureMethod, FailureReason, LocationStatus};

use super::{AttendancePhase, AttendanceState};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

impl StatusMessage {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UiAction {
    SelectMethod,
    StartScan,
    RetryLocation,
    MarkAttendance,
    GoToDashboard,
    MarkAnother,
}

pub fn failure_text(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::InvalidCode => "Invalid QR code. Please try again.",
        FailureReason::NotRecognized => "Face not recognized. Please try again.",
        FailureReason::CameraError => "Camera access denied or unavailable.",
        FailureReason::OutOfRange => "You are not in the classroom range",
        FailureReason::LocationError => "Unable to access location",
        FailureReason::NotSupported => "Location services not supported",
    }
}

pub fn status_message(state: &AttendanceState) -> StatusMessage {
    match state.phase {
        AttendancePhase::Selecting => {
            return StatusMessage::new("Choose an attendance method", Tone::Info)
        }
        AttendancePhase::Submitting => {
            return StatusMessage::new("Submitting attendance...", Tone::Info)
        }
        AttendancePhase::Completed => {
            let text = match &state.record {
                Some(record) => format!(
                    "Attendance marked successfully! Your attendance for {} has been recorded using {} method.",
                    record.subject, record.method
                ),
                None => "Attendance marked successfully!".to_string(),
            };
            return StatusMessage::new(text, Tone::Success);
        }
        AttendancePhase::Capturing | AttendancePhase::ReadyToConfirm => {}
    }

    if let Some(error) = &state.gate_error {
        return StatusMessage::new(format!("Could not mark attendance: {error}"), Tone::Error);
    }

    match state.active_method {
        Some(CaptureMethod::Gps) => location_message(state),
        Some(method) => scan_message(state, method),
        None => StatusMessage::new("Choose an attendance method", Tone::Info),
    }
}

fn location_message(state: &AttendanceState) -> StatusMessage {
    let Some(check) = &state.location else {
        return StatusMessage::new("Checking your location...", Tone::Warning);
    };

    match check.status {
        LocationStatus::Checking => StatusMessage::new("Checking your location...", Tone::Warning),
        LocationStatus::Verified => {
            StatusMessage::new("Location verified - You are in classroom", Tone::Success)
        }
        other => {
            let reason = other
                .failure_reason()
                .unwrap_or(FailureReason::LocationError);
            StatusMessage::new(failure_text(reason), Tone::Error)
        }
    }
}

fn scan_message(state: &AttendanceState, method: CaptureMethod) -> StatusMessage {
    let status = state
        .attempt
        .as_ref()
        .map(|attempt| (attempt.status, attempt.failure_reason));

    match (method, status) {
        (CaptureMethod::Face, Some((AttemptStatus::Running, _))) => {
            StatusMessage::new("Analyzing face...", Tone::Warning)
        }
        (_, Some((AttemptStatus::Running, _))) => {
            StatusMessage::new("Scanning QR code...", Tone::Warning)
        }
        (_, Some((AttemptStatus::Succeeded, _))) => StatusMessage::new(
            "Capture verified - you can now mark attendance",
            Tone::Success,
        ),
        (_, Some((AttemptStatus::Failed, Some(reason)))) => {
            StatusMessage::new(failure_text(reason), Tone::Error)
        }
        (CaptureMethod::Face, _) => {
            StatusMessage::new("Click scan to start face recognition", Tone::Info)
        }
        _ => StatusMessage::new("Click scan to start QR code detection", Tone::Info),
    }
}

pub fn available_actions(state: &AttendanceState) -> Vec<UiAction> {
    match state.phase {
        AttendancePhase::Selecting => vec![UiAction::SelectMethod],
        AttendancePhase::Submitting => Vec::new(),
        AttendancePhase::Completed => vec![UiAction::GoToDashboard, UiAction::MarkAnother],
        AttendancePhase::Capturing | AttendancePhase::ReadyToConfirm => {
            let mut actions = vec![UiAction::SelectMethod];

            match state.active_method {
                Some(CaptureMethod::Gps) => {
                    let settled = state
                        .location
                        .as_ref()
                        .is_some_and(|check| !check.is_checking() && !check.verified());
                    if settled {
                        actions.push(UiAction::RetryLocation);
                    }
                }
                Some(_) => {
                    let running = state.attempt.as_ref().is_some_and(|a| a.is_running());
                    if !running {
                        actions.push(UiAction::StartScan);
                    }
                }
                None => {}
            }

            if state.can_confirm() {
                actions.push(UiAction::MarkAttendance);
            }
            actions
        }
    }
}
