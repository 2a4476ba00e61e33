use std::{
    sync::{Arc, Mutex as StdMutex, MutexGuard},
    time::Duration,
};

use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    capture::CaptureSimulator,
    db::models::{AttendanceRecord, AttendanceSubmission},
    models::{CaptureMethod, ClassSession, LocationOutcome, ScanOutcome},
    ports::{AttendanceSubmitter, Clock, Navigator, Route},
};

use super::{
    view::{available_actions, status_message, StatusMessage, UiAction},
    AttendanceAction, AttendanceError, AttendanceEvent, AttendanceMachine, AttendanceState,
    Transition,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSnapshot {
    pub state: AttendanceState,
    pub can_confirm: bool,
    pub status: StatusMessage,
    pub actions: Vec<UiAction>,
}

impl AttendanceSnapshot {
    pub fn of(state: &AttendanceState) -> Self {
        Self {
            can_confirm: state.can_confirm(),
            status: status_message(state),
            actions: available_actions(state),
            state: state.clone(),
        }
    }
}

struct Inflight {
    attempt_id: u64,
    token: CancellationToken,
}

fn lock_slot<T>(slot: &StdMutex<T>) -> MutexGuard<'_, T> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Owns the attendance page: the state machine, the single in-flight capture and the
/// pending redirect. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct AttendanceController {
    state: Arc<Mutex<AttendanceState>>,
    class: Arc<ClassSession>,
    simulator: CaptureSimulator,
    submitter: Arc<dyn AttendanceSubmitter>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    redirect_delay: Duration,
    inflight: Arc<StdMutex<Option<Inflight>>>,
    redirect: Arc<StdMutex<Option<JoinHandle<()>>>>,
    snapshots: Arc<watch::Sender<AttendanceSnapshot>>,
}

impl AttendanceController {
    pub fn new(
        class: ClassSession,
        simulator: CaptureSimulator,
        submitter: Arc<dyn AttendanceSubmitter>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let initial = AttendanceState::new();
        let (snapshots, _) = watch::channel(AttendanceSnapshot::of(&initial));

        Self {
            state: Arc::new(Mutex::new(initial)),
            class: Arc::new(class),
            redirect_delay: simulator.settings().redirect_delay(),
            simulator,
            submitter,
            navigator,
            clock,
            inflight: Arc::new(StdMutex::new(None)),
            redirect: Arc::new(StdMutex::new(None)),
            snapshots: Arc::new(snapshots),
        }
    }

    pub fn class(&self) -> &ClassSession {
        &self.class
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn subscribe(&self) -> watch::Receiver<AttendanceSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn get_state(&self) -> AttendanceState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> AttendanceSnapshot {
        AttendanceSnapshot::of(&*self.state.lock().await)
    }

    pub async fn can_confirm(&self) -> bool {
        self.state.lock().await.can_confirm()
    }

    /// Switches the active method. Any attempt of the previous method is cancelled and
    /// its result discarded; selecting GPS starts a location check in the background.
    pub async fn select_method(
        &self,
        method: CaptureMethod,
    ) -> Result<AttendanceSnapshot, AttendanceError> {
        let actions = self
            .dispatch(AttendanceEvent::SelectMethod {
                method,
                now: self.clock.now(),
            })
            .await?;

        for action in actions {
            if let AttendanceAction::CheckLocation { attempt_id } = action {
                self.spawn_location_check(attempt_id);
            }
        }

        info!("capture method selected: {}", method.as_str());
        Ok(self.get_snapshot().await)
    }

    /// Runs one QR or face scan to completion. Returns `None` when the scan was
    /// superseded (method switch, reset, shutdown) before it resolved.
    pub async fn start_scan(&self) -> Result<Option<ScanOutcome>, AttendanceError> {
        let actions = self
            .dispatch(AttendanceEvent::StartScan {
                now: self.clock.now(),
            })
            .await?;

        for action in actions {
            if let AttendanceAction::RunScan { attempt_id, method } = action {
                return Ok(self.run_scan(attempt_id, method).await);
            }
        }
        Ok(None)
    }

    /// Re-runs the GPS location check and waits for it.
    pub async fn retry_location(&self) -> Result<Option<LocationOutcome>, AttendanceError> {
        let actions = self
            .dispatch(AttendanceEvent::RetryLocation {
                now: self.clock.now(),
            })
            .await?;

        for action in actions {
            if let AttendanceAction::CheckLocation { attempt_id } = action {
                return Ok(self.run_location_check(attempt_id).await);
            }
        }
        Ok(None)
    }

    pub async fn confirm(&self) -> Result<AttendanceRecord, AttendanceError> {
        let actions = self.dispatch(AttendanceEvent::Confirm).await?;
        let method = actions
            .iter()
            .find_map(|action| match action {
                AttendanceAction::Submit { method } => Some(*method),
                _ => None,
            })
            .ok_or(AttendanceError::NotReady)?;

        let timestamp = self.clock.now();
        let submission = AttendanceSubmission {
            class_id: self.class.code.clone(),
            subject: self.class.subject.clone(),
            method,
            status: self.class.status_for(timestamp),
            timestamp,
        };

        match self.submitter.submit(&submission).await {
            Ok(id) => {
                let record = AttendanceRecord::from_submission(id, submission);
                self.dispatch(AttendanceEvent::SubmissionSucceeded {
                    record: record.clone(),
                })
                .await?;
                info!(
                    "attendance {} confirmed for {} via {}",
                    record.id,
                    record.class_id,
                    record.method.as_str()
                );
                Ok(record)
            }
            Err(err) => {
                warn!("attendance submission failed: {err}");
                let message = err.to_string();
                self.dispatch(AttendanceEvent::SubmissionFailed {
                    error: message.clone(),
                })
                .await?;
                Err(AttendanceError::Submission(message))
            }
        }
    }

    /// "Mark another attendance": back to method selection with nothing in flight.
    pub async fn reset(&self) -> Result<AttendanceSnapshot, AttendanceError> {
        self.dispatch(AttendanceEvent::Reset).await?;
        Ok(self.get_snapshot().await)
    }

    /// Leaves the page: in-flight captures are torn down before navigating.
    pub async fn go_to_dashboard(&self) {
        self.shutdown().await;
        self.navigator.navigate(Route::StudentDashboard);
    }

    /// Cancels everything the page still has in flight and clears the capture state;
    /// call when the page goes away.
    pub async fn shutdown(&self) {
        if let Some(inflight) = lock_slot(&self.inflight).take() {
            inflight.token.cancel();
        }
        self.cancel_redirect();

        if let Err(err) = self.dispatch(AttendanceEvent::Leave).await {
            warn!("failed to clear attendance state on leave: {err}");
        }
    }

    async fn dispatch(
        &self,
        event: AttendanceEvent,
    ) -> Result<Vec<AttendanceAction>, AttendanceError> {
        let mut guard = self.state.lock().await;
        let Transition { state, actions } = AttendanceMachine::transition(&guard, event)?;
        *guard = state;

        let mut deferred = Vec::new();
        for action in actions {
            match action {
                AttendanceAction::CancelAttempt { attempt_id } => self.cancel_inflight(attempt_id),
                AttendanceAction::RunScan { attempt_id, .. }
                | AttendanceAction::CheckLocation { attempt_id } => {
                    self.register_inflight(attempt_id);
                    deferred.push(action);
                }
                AttendanceAction::Submit { .. } => deferred.push(action),
                AttendanceAction::ScheduleRedirect => self.schedule_redirect(),
                AttendanceAction::CancelRedirect => self.cancel_redirect(),
            }
        }

        self.snapshots.send_replace(AttendanceSnapshot::of(&guard));
        Ok(deferred)
    }

    /// Applies a capture result if its attempt is still the pending one.
    async fn resolve(&self, attempt_id: u64, event: AttendanceEvent) -> bool {
        let mut guard = self.state.lock().await;
        if !guard.is_pending(attempt_id) {
            info!("discarding result of superseded attempt {attempt_id}");
            return false;
        }

        match AttendanceMachine::transition(&guard, event) {
            Ok(transition) => {
                *guard = transition.state;
                self.snapshots.send_replace(AttendanceSnapshot::of(&guard));
                true
            }
            Err(err) => {
                warn!("capture result for attempt {attempt_id} rejected: {err}");
                false
            }
        }
    }

    async fn run_scan(&self, attempt_id: u64, method: CaptureMethod) -> Option<ScanOutcome> {
        let token = self.inflight_token(attempt_id)?;

        let outcome = tokio::select! {
            outcome = self.simulator.scan(method) => outcome,
            _ = token.cancelled() => {
                info!("{} scan {attempt_id} cancelled", method.as_str());
                return None;
            }
        };

        self.finish_inflight(attempt_id);
        self.resolve(
            attempt_id,
            AttendanceEvent::ScanResolved {
                attempt_id,
                outcome,
            },
        )
        .await
        .then_some(outcome)
    }

    async fn run_location_check(&self, attempt_id: u64) -> Option<LocationOutcome> {
        let token = self.inflight_token(attempt_id)?;

        let outcome = tokio::select! {
            outcome = self.simulator.check_location() => outcome,
            _ = token.cancelled() => {
                info!("location check {attempt_id} cancelled");
                return None;
            }
        };

        self.finish_inflight(attempt_id);
        self.resolve(
            attempt_id,
            AttendanceEvent::LocationResolved {
                attempt_id,
                outcome,
            },
        )
        .await
        .then_some(outcome)
    }

    fn spawn_location_check(&self, attempt_id: u64) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_location_check(attempt_id).await;
        });
    }

    fn register_inflight(&self, attempt_id: u64) {
        let previous = lock_slot(&self.inflight).replace(Inflight {
            attempt_id,
            token: CancellationToken::new(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
    }

    fn inflight_token(&self, attempt_id: u64) -> Option<CancellationToken> {
        lock_slot(&self.inflight)
            .as_ref()
            .filter(|inflight| inflight.attempt_id == attempt_id)
            .map(|inflight| inflight.token.clone())
    }

    fn cancel_inflight(&self, attempt_id: u64) {
        let mut slot = lock_slot(&self.inflight);
        if slot
            .as_ref()
            .is_some_and(|inflight| inflight.attempt_id == attempt_id)
        {
            if let Some(inflight) = slot.take() {
                inflight.token.cancel();
            }
        }
    }

    fn finish_inflight(&self, attempt_id: u64) {
        let mut slot = lock_slot(&self.inflight);
        if slot
            .as_ref()
            .is_some_and(|inflight| inflight.attempt_id == attempt_id)
        {
            slot.take();
        }
    }

    fn schedule_redirect(&self) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.redirect_delay;
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            navigator.navigate(Route::StudentDashboard);
        });

        if let Some(previous) = lock_slot(&self.redirect).replace(handle) {
            previous.abort();
        }
    }

    fn cancel_redirect(&self) {
        if let Some(handle) = lock_slot(&self.redirect).take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::AttendancePhase;
    use crate::db::models::AttendanceStatus;
    use crate::models::{AttemptStatus, FailureReason, LocationStatus};
    use crate::platform::{ChannelNavigator, SimulatedCamera, SimulatedGeolocation};
    use crate::settings::CaptureSettings;
    use crate::test_support::{FakeSubmitter, FixedClock, ScriptedRandom};
    use chrono::Duration as ChronoDuration;
    use tokio::sync::mpsc;

    struct Harness {
        controller: AttendanceController,
        submitter: Arc<FakeSubmitter>,
        camera: SimulatedCamera,
        routes: mpsc::UnboundedReceiver<Route>,
    }

    fn class_at(clock: &FixedClock) -> ClassSession {
        let starts_at = clock.0 - ChronoDuration::minutes(5);
        ClassSession {
            code: "CS301".into(),
            subject: "Advanced Data Structures".into(),
            faculty: "Dr. Priya Sharma".into(),
            department: "Computer Science".into(),
            room: "Room 101".into(),
            building: "Engineering Block A".into(),
            starts_at,
            ends_at: starts_at + ChronoDuration::minutes(90),
            attendance_window_minutes: 15,
        }
    }

    fn harness_with(
        samples: &[f64],
        camera: SimulatedCamera,
        geolocation: SimulatedGeolocation,
        submitter: FakeSubmitter,
        clock: FixedClock,
        class: ClassSession,
    ) -> Harness {
        let submitter = Arc::new(submitter);
        let (navigator, routes) = ChannelNavigator::new();
        let simulator = CaptureSimulator::new(
            CaptureSettings::default(),
            Arc::new(ScriptedRandom::new(samples)),
            Arc::new(camera.clone()),
            Arc::new(geolocation),
        );
        let controller = AttendanceController::new(
            class,
            simulator,
            submitter.clone(),
            Arc::new(navigator),
            Arc::new(clock),
        );
        Harness {
            controller,
            submitter,
            camera,
            routes,
        }
    }

    fn harness(samples: &[f64]) -> Harness {
        let clock = FixedClock::at(10, 5);
        let class = class_at(&clock);
        harness_with(
            samples,
            SimulatedCamera::granting(),
            SimulatedGeolocation::available(),
            FakeSubmitter::default(),
            clock,
            class,
        )
    }

    async fn settled_location(controller: &AttendanceController) -> AttendanceSnapshot {
        let mut rx = controller.subscribe();
        let snapshot = rx
            .wait_for(|snapshot| {
                snapshot
                    .state
                    .location
                    .as_ref()
                    .is_some_and(|check| !check.is_checking())
            })
            .await
            .unwrap()
            .clone();
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_a_qr_success_confirms_and_redirects() {
        let mut h = harness(&[0.1]);

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        assert!(!h.controller.can_confirm().await);

        let started = time::Instant::now();
        let outcome = h.controller.start_scan().await.unwrap();
        assert_eq!(outcome, Some(ScanOutcome::Succeeded));
        assert!(started.elapsed() <= Duration::from_millis(3_000));
        assert!(h.controller.can_confirm().await);

        let record = h.controller.confirm().await.unwrap();
        assert_eq!(record.method, CaptureMethod::Qr);
        assert_eq!(record.class_id, "CS301");
        assert_eq!(record.status, AttendanceStatus::Present);

        let state = h.controller.get_state().await;
        assert_eq!(state.phase, AttendancePhase::Completed);
        assert_eq!(state.record, Some(record));
        assert_eq!(h.submitter.submissions().len(), 1);

        time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(h.routes.try_recv().ok(), Some(Route::StudentDashboard));
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_b_face_denied_cannot_confirm() {
        let clock = FixedClock::at(10, 5);
        let class = class_at(&clock);
        let h = harness_with(
            &[0.1],
            SimulatedCamera::denying(),
            SimulatedGeolocation::available(),
            FakeSubmitter::default(),
            clock,
            class,
        );

        h.controller.select_method(CaptureMethod::Face).await.unwrap();
        let outcome = h.controller.start_scan().await.unwrap();
        assert_eq!(
            outcome,
            Some(ScanOutcome::Failed(FailureReason::CameraError))
        );

        let snapshot = h.controller.get_snapshot().await;
        assert!(!snapshot.can_confirm);
        assert!(snapshot.actions.contains(&UiAction::StartScan));
        assert!(!snapshot.actions.contains(&UiAction::MarkAttendance));

        assert_eq!(
            h.controller.confirm().await,
            Err(AttendanceError::NotReady)
        );
        assert!(h.submitter.submissions().is_empty());
        assert_eq!(h.camera.streams_opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_c_gps_out_of_range_until_retry() {
        let h = harness(&[0.8, 0.3]);

        h.controller.select_method(CaptureMethod::Gps).await.unwrap();
        let first = settled_location(&h.controller).await;
        assert_eq!(
            first.state.location.as_ref().map(|c| c.status),
            Some(LocationStatus::OutOfRange)
        );
        assert!(!first.can_confirm);
        assert!(first.actions.contains(&UiAction::RetryLocation));

        let retried = h.controller.retry_location().await.unwrap();
        assert_eq!(retried.map(|o| o.status), Some(LocationStatus::Verified));
        assert!(h.controller.can_confirm().await);

        let record = h.controller.confirm().await.unwrap();
        assert_eq!(record.method, CaptureMethod::Gps);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_d_switching_mid_scan_discards_stale_result() {
        let h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Qr).await.unwrap();

        let scanning = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.start_scan().await })
        };
        time::sleep(Duration::from_millis(1_000)).await;
        assert!(h.controller.get_state().await.pending_attempt_id().is_some());

        h.controller.select_method(CaptureMethod::Face).await.unwrap();
        assert_eq!(scanning.await.unwrap(), Ok(None));

        time::sleep(Duration::from_millis(5_000)).await;
        let state = h.controller.get_state().await;
        assert_eq!(state.active_method, Some(CaptureMethod::Face));
        assert_eq!(
            state.attempt.as_ref().map(|a| a.status),
            Some(AttemptStatus::Idle)
        );
        assert!(!state.can_confirm());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_scan_is_rejected() {
        let h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Face).await.unwrap();

        let scanning = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.start_scan().await })
        };
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(
            h.controller.start_scan().await,
            Err(AttendanceError::ScanInProgress(CaptureMethod::Face))
        );
        assert_eq!(h.camera.open_streams(), 1);

        assert_eq!(
            scanning.await.unwrap(),
            Ok(Some(ScanOutcome::Succeeded))
        );
        assert_eq!(h.camera.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_away_from_face_scan_releases_camera() {
        let h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Face).await.unwrap();

        let scanning = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.start_scan().await })
        };
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(h.camera.open_streams(), 1);

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        assert_eq!(scanning.await.unwrap(), Ok(None));
        assert_eq!(h.camera.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn backend_failure_keeps_page_ready() {
        let clock = FixedClock::at(10, 5);
        let class = class_at(&clock);
        let mut h = harness_with(
            &[0.1],
            SimulatedCamera::granting(),
            SimulatedGeolocation::available(),
            FakeSubmitter::failing(),
            clock,
            class,
        );

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        h.controller.start_scan().await.unwrap();

        let err = h.controller.confirm().await.unwrap_err();
        assert!(matches!(err, AttendanceError::Submission(_)));

        let state = h.controller.get_state().await;
        assert_eq!(state.phase, AttendancePhase::ReadyToConfirm);
        assert!(state.gate_error.is_some());
        assert!(state.record.is_none());

        time::sleep(Duration::from_millis(3_000)).await;
        assert!(h.routes.try_recv().is_err());

        h.submitter.set_failing(false);
        let record = h.controller.confirm().await.unwrap();
        assert_eq!(record.method, CaptureMethod::Qr);
        assert!(h.controller.get_state().await.gate_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_after_completion_cancels_redirect() {
        let mut h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        h.controller.start_scan().await.unwrap();
        h.controller.confirm().await.unwrap();

        let snapshot = h.controller.reset().await.unwrap();
        assert_eq!(snapshot.state.phase, AttendancePhase::Selecting);
        assert_eq!(snapshot.state.active_method, None);
        assert!(snapshot.state.attempt.is_none());
        assert!(snapshot.state.record.is_none());

        time::sleep(Duration::from_millis(3_000)).await;
        assert!(h.routes.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_after_window_is_late() {
        let clock = FixedClock::at(10, 45);
        let class = class_at(&FixedClock::at(10, 5));
        let h = harness_with(
            &[0.1],
            SimulatedCamera::granting(),
            SimulatedGeolocation::available(),
            FakeSubmitter::default(),
            clock,
            class,
        );

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        h.controller.start_scan().await.unwrap();
        let record = h.controller.confirm().await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_inflight_scan() {
        let h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Qr).await.unwrap();

        let scanning = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.start_scan().await })
        };
        time::sleep(Duration::from_millis(100)).await;

        h.controller.shutdown().await;
        assert_eq!(scanning.await.unwrap(), Ok(None));

        let snapshot = h.controller.get_snapshot().await;
        assert_eq!(snapshot.state.pending_attempt_id(), None);
        assert_eq!(snapshot.state.phase, AttendancePhase::Selecting);
        assert_eq!(h.controller.subscribe().borrow().state, snapshot.state);

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        assert_eq!(
            h.controller.start_scan().await,
            Ok(Some(ScanOutcome::Succeeded))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_mid_face_scan_releases_camera_and_drops_result() {
        let mut h = harness(&[0.1]);
        h.controller.select_method(CaptureMethod::Face).await.unwrap();

        let scanning = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.start_scan().await })
        };
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(h.camera.open_streams(), 1);

        h.controller.go_to_dashboard().await;
        assert_eq!(h.routes.try_recv().ok(), Some(Route::StudentDashboard));
        assert_eq!(scanning.await.unwrap(), Ok(None));
        assert_eq!(h.camera.open_streams(), 0);

        time::sleep(Duration::from_millis(5_000)).await;
        let state = h.controller.get_state().await;
        assert!(!state.can_confirm());
        assert_eq!(state.pending_attempt_id(), None);
        assert!(state.attempt.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_mid_location_check_clears_checking_state() {
        let clock = FixedClock::at(10, 5);
        let class = class_at(&clock);
        let h = harness_with(
            &[0.3],
            SimulatedCamera::granting(),
            SimulatedGeolocation::unresponsive(),
            FakeSubmitter::default(),
            clock,
            class,
        );

        h.controller.select_method(CaptureMethod::Gps).await.unwrap();
        time::sleep(Duration::from_millis(1_000)).await;
        assert!(h.controller.get_state().await.pending_attempt_id().is_some());

        h.controller.go_to_dashboard().await;
        let state = h.controller.get_state().await;
        assert_eq!(state.pending_attempt_id(), None);
        assert!(state.location.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_published_on_each_transition() {
        let h = harness(&[0.1]);
        let rx = h.controller.subscribe();

        h.controller.select_method(CaptureMethod::Qr).await.unwrap();
        assert_eq!(
            rx.borrow().state.active_method,
            Some(CaptureMethod::Qr)
        );

        h.controller.start_scan().await.unwrap();
        assert!(rx.borrow().can_confirm);
    }
}
