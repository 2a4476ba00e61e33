//! Attendance page state machine.
//!
//! Pure transitions: every user action or capture result is an [`AttendanceEvent`]
//! applied to the current [`AttendanceState`], yielding the next state plus the side
//! effects the controller must run. Nothing here touches timers, devices or storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::AttendanceRecord,
    models::{CaptureAttempt, CaptureMethod, LocationCheck, LocationOutcome, ScanOutcome},
};

use super::{AttendancePhase, AttendanceState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttendanceEvent {
    SelectMethod {
        method: CaptureMethod,
        now: DateTime<Utc>,
    },
    StartScan {
        now: DateTime<Utc>,
    },
    ScanResolved {
        attempt_id: u64,
        outcome: ScanOutcome,
    },
    RetryLocation {
        now: DateTime<Utc>,
    },
    LocationResolved {
        attempt_id: u64,
        outcome: LocationOutcome,
    },
    Confirm,
    SubmissionSucceeded {
        record: AttendanceRecord,
    },
    SubmissionFailed {
        error: String,
    },
    Reset,
    /// The page is going away: drop whatever capture is in flight.
    Leave,
}

/// Side effects requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceAction {
    CancelAttempt { attempt_id: u64 },
    RunScan { attempt_id: u64, method: CaptureMethod },
    CheckLocation { attempt_id: u64 },
    Submit { method: CaptureMethod },
    ScheduleRedirect,
    CancelRedirect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceError {
    #[error("no capture method selected")]
    NoMethodSelected,
    #[error("{0} does not support scanning")]
    ScanNotSupported(CaptureMethod),
    #[error("a {0} scan is already running")]
    ScanInProgress(CaptureMethod),
    #[error("location retry is only available for GPS")]
    RetryNotSupported,
    #[error("location check already in progress")]
    LocationCheckInProgress,
    #[error("attendance cannot be confirmed before a successful capture")]
    NotReady,
    #[error("attendance submission already in progress")]
    SubmissionInProgress,
    #[error("attendance already marked; reset to mark another")]
    AlreadyCompleted,
    #[error("attendance submission failed: {0}")]
    Submission(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AttendanceState,
    pub actions: Vec<AttendanceAction>,
}

impl Transition {
    fn to(state: AttendanceState, actions: Vec<AttendanceAction>) -> Self {
        Self { state, actions }
    }

    fn unchanged(state: &AttendanceState) -> Self {
        Self::to(state.clone(), Vec::new())
    }
}

pub struct AttendanceMachine;

impl AttendanceMachine {
    pub fn transition(
        state: &AttendanceState,
        event: AttendanceEvent,
    ) -> Result<Transition, AttendanceError> {
        match event {
            AttendanceEvent::SelectMethod { method, now } => Self::select(state, method, now),
            AttendanceEvent::StartScan { now } => Self::start_scan(state, now),
            AttendanceEvent::ScanResolved {
                attempt_id,
                outcome,
            } => Ok(Self::scan_resolved(state, attempt_id, outcome)),
            AttendanceEvent::RetryLocation { now } => Self::retry_location(state, now),
            AttendanceEvent::LocationResolved {
                attempt_id,
                outcome,
            } => Ok(Self::location_resolved(state, attempt_id, outcome)),
            AttendanceEvent::Confirm => Self::confirm(state),
            AttendanceEvent::SubmissionSucceeded { record } => {
                Ok(Self::submission_succeeded(state, record))
            }
            AttendanceEvent::SubmissionFailed { error } => {
                Ok(Self::submission_failed(state, error))
            }
            AttendanceEvent::Reset => Self::reset(state),
            AttendanceEvent::Leave => Ok(Self::leave(state)),
        }
    }

    fn ensure_editable(state: &AttendanceState) -> Result<(), AttendanceError> {
        match state.phase {
            AttendancePhase::Submitting => Err(AttendanceError::SubmissionInProgress),
            AttendancePhase::Completed => Err(AttendanceError::AlreadyCompleted),
            _ => Ok(()),
        }
    }

    fn cancel_pending(state: &AttendanceState) -> Vec<AttendanceAction> {
        state
            .pending_attempt_id()
            .map(|attempt_id| AttendanceAction::CancelAttempt { attempt_id })
            .into_iter()
            .collect()
    }

    fn select(
        state: &AttendanceState,
        method: CaptureMethod,
        now: DateTime<Utc>,
    ) -> Result<Transition, AttendanceError> {
        Self::ensure_editable(state)?;

        let mut actions = Self::cancel_pending(state);
        let mut next = AttendanceState {
            phase: AttendancePhase::Capturing,
            active_method: Some(method),
            last_attempt_id: state.last_attempt_id,
            ..AttendanceState::default()
        };

        if method.is_scan_based() {
            next.attempt = Some(CaptureAttempt::idle(method));
        } else {
            let attempt_id = next.next_attempt_id();
            next.location = Some(LocationCheck::checking(attempt_id, now));
            actions.push(AttendanceAction::CheckLocation { attempt_id });
        }

        Ok(Transition::to(next, actions))
    }

    fn start_scan(
        state: &AttendanceState,
        now: DateTime<Utc>,
    ) -> Result<Transition, AttendanceError> {
        Self::ensure_editable(state)?;

        let method = state
            .active_method
            .ok_or(AttendanceError::NoMethodSelected)?;
        if !method.is_scan_based() {
            return Err(AttendanceError::ScanNotSupported(method));
        }
        if state.attempt.as_ref().is_some_and(CaptureAttempt::is_running) {
            return Err(AttendanceError::ScanInProgress(method));
        }

        let mut next = state.clone();
        let attempt_id = next.next_attempt_id();
        next.attempt
            .get_or_insert_with(|| CaptureAttempt::idle(method))
            .begin(attempt_id, now);
        next.phase = AttendancePhase::Capturing;
        next.gate_error = None;

        Ok(Transition::to(
            next,
            vec![AttendanceAction::RunScan { attempt_id, method }],
        ))
    }

    fn scan_resolved(
        state: &AttendanceState,
        attempt_id: u64,
        outcome: ScanOutcome,
    ) -> Transition {
        let current = state
            .attempt
            .as_ref()
            .is_some_and(|attempt| attempt.is_running() && attempt.id == attempt_id);
        if !current {
            return Transition::unchanged(state);
        }

        let mut next = state.clone();
        if let Some(attempt) = next.attempt.as_mut() {
            attempt.resolve(outcome);
        }
        next.phase = if outcome.is_success() {
            AttendancePhase::ReadyToConfirm
        } else {
            AttendancePhase::Capturing
        };
        Transition::to(next, Vec::new())
    }

    fn retry_location(
        state: &AttendanceState,
        now: DateTime<Utc>,
    ) -> Result<Transition, AttendanceError> {
        Self::ensure_editable(state)?;

        match state.active_method {
            None => return Err(AttendanceError::NoMethodSelected),
            Some(CaptureMethod::Gps) => {}
            Some(_) => return Err(AttendanceError::RetryNotSupported),
        }
        if state.location.as_ref().is_some_and(LocationCheck::is_checking) {
            return Err(AttendanceError::LocationCheckInProgress);
        }

        let mut next = state.clone();
        let attempt_id = next.next_attempt_id();
        next.location = Some(LocationCheck::checking(attempt_id, now));
        next.phase = AttendancePhase::Capturing;
        next.gate_error = None;

        Ok(Transition::to(
            next,
            vec![AttendanceAction::CheckLocation { attempt_id }],
        ))
    }

    fn location_resolved(
        state: &AttendanceState,
        attempt_id: u64,
        outcome: LocationOutcome,
    ) -> Transition {
        let current = state
            .location
            .as_ref()
            .is_some_and(|check| check.is_checking() && check.attempt_id == attempt_id);
        if !current {
            return Transition::unchanged(state);
        }

        let mut next = state.clone();
        if let Some(check) = next.location.as_mut() {
            check.resolve(outcome);
        }
        next.phase = if next.capture_succeeded() {
            AttendancePhase::ReadyToConfirm
        } else {
            AttendancePhase::Capturing
        };
        Transition::to(next, Vec::new())
    }

    fn confirm(state: &AttendanceState) -> Result<Transition, AttendanceError> {
        Self::ensure_editable(state)?;
        if !state.can_confirm() {
            return Err(AttendanceError::NotReady);
        }
        let method = state
            .active_method
            .ok_or(AttendanceError::NoMethodSelected)?;

        let mut next = state.clone();
        next.phase = AttendancePhase::Submitting;
        next.gate_error = None;
        Ok(Transition::to(next, vec![AttendanceAction::Submit { method }]))
    }

    fn submission_succeeded(state: &AttendanceState, record: AttendanceRecord) -> Transition {
        if state.phase != AttendancePhase::Submitting {
            return Transition::unchanged(state);
        }

        let mut next = state.clone();
        next.phase = AttendancePhase::Completed;
        next.record = Some(record);
        Transition::to(next, vec![AttendanceAction::ScheduleRedirect])
    }

    fn submission_failed(state: &AttendanceState, error: String) -> Transition {
        if state.phase != AttendancePhase::Submitting {
            return Transition::unchanged(state);
        }

        let mut next = state.clone();
        next.phase = AttendancePhase::ReadyToConfirm;
        next.gate_error = Some(error);
        Transition::to(next, Vec::new())
    }

    fn reset(state: &AttendanceState) -> Result<Transition, AttendanceError> {
        if state.phase == AttendancePhase::Submitting {
            return Err(AttendanceError::SubmissionInProgress);
        }
        Ok(Self::cleared(state))
    }

    /// Like reset, but never rejected. An in-flight submission is left to finish.
    fn leave(state: &AttendanceState) -> Transition {
        if state.phase == AttendancePhase::Submitting {
            return Transition::unchanged(state);
        }
        Self::cleared(state)
    }

    fn cleared(state: &AttendanceState) -> Transition {
        let mut actions = Self::cancel_pending(state);
        if state.phase == AttendancePhase::Completed {
            actions.push(AttendanceAction::CancelRedirect);
        }

        let next = AttendanceState {
            last_attempt_id: state.last_attempt_id,
            ..AttendanceState::default()
        };
        Transition::to(next, actions)
    }
}
