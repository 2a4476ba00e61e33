//! Deterministic collaborators shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    attendance::AttendanceController,
    capture::CaptureSimulator,
    catalog::Catalog,
    db::{
        models::{AttendanceId, AttendanceSubmission},
        Database,
    },
    platform::{ChannelNavigator, SimulatedCamera, SimulatedGeolocation},
    ports::{AttendanceSubmitter, Clock, RandomSource, SubmitError},
    settings::SettingsStore,
    AppState,
};

/// Replays the given samples in order, then keeps returning the last one.
pub struct ScriptedRandom {
    samples: Mutex<VecDeque<f64>>,
    last: Mutex<f64>,
}

impl ScriptedRandom {
    pub fn new(samples: &[f64]) -> Self {
        Self {
            samples: Mutex::new(samples.iter().copied().collect()),
            last: Mutex::new(samples.last().copied().unwrap_or(0.0)),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        let next = self.samples.lock().unwrap().pop_front();
        match next {
            Some(value) => {
                *self.last.lock().unwrap() = value;
                value
            }
            None => *self.last.lock().unwrap(),
        }
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(hour: u32, minute: u32) -> Self {
        Self(Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct FakeSubmitter {
    failing: AtomicBool,
    submissions: Mutex<Vec<AttendanceSubmission>>,
}

impl FakeSubmitter {
    pub fn failing() -> Self {
        let submitter = Self::default();
        submitter.set_failing(true);
        submitter
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<AttendanceSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttendanceSubmitter for FakeSubmitter {
    async fn submit(&self, submission: &AttendanceSubmission) -> Result<AttendanceId, SubmitError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SubmitError::Unavailable("backend offline".into()));
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission.clone());
        Ok(AttendanceId(format!("att-{}", submissions.len())))
    }
}

/// Full app wiring at 10:05 on the demo class day, with an in-memory database and
/// settings stored under `dir`.
pub fn app_state(dir: &tempfile::TempDir, samples: &[f64]) -> AppState {
    let clock = FixedClock::at(10, 5);
    let catalog = Catalog::demo(clock.0);
    let db = Database::in_memory().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
    let simulator = CaptureSimulator::new(
        settings.capture(),
        Arc::new(ScriptedRandom::new(samples)),
        Arc::new(SimulatedCamera::granting()),
        Arc::new(SimulatedGeolocation::available()),
    );
    let (navigator, _routes) = ChannelNavigator::new();
    let controller = AttendanceController::new(
        catalog.current_class.clone(),
        simulator,
        Arc::new(db.clone()),
        Arc::new(navigator),
        Arc::new(clock),
    );

    AppState {
        db,
        controller,
        settings,
        catalog,
    }
}
