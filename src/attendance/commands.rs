use serde::Serialize;

use crate::{
    analytics::{summarize, AttendanceBands, AttendanceSummary},
    attendance::{AttendanceController, AttendanceSnapshot},
    db::{models::AttendanceRecord, HistoryQuery},
    models::{CaptureMethod, ClassPhase, ClassSession, LocationOutcome, ScanOutcome},
    settings::CaptureSettings,
};

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub class: ClassSession,
    pub phase: ClassPhase,
    pub time_remaining: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// `None` when the scan was superseded before it finished.
    pub outcome: Option<ScanOutcome>,
    pub snapshot: AttendanceSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub outcome: Option<LocationOutcome>,
    pub snapshot: AttendanceSnapshot,
}

fn controller_from_state(state: &AppState) -> AttendanceController {
    state.controller.clone()
}

pub async fn get_current_class(state: &AppState) -> Result<ClassOverview, String> {
    let controller = controller_from_state(state);
    let class = controller.class().clone();
    let now = controller.clock().now();

    Ok(ClassOverview {
        phase: class.phase(now),
        time_remaining: class.time_remaining(now),
        class,
    })
}

pub async fn get_attendance_state(state: &AppState) -> Result<AttendanceSnapshot, String> {
    let controller = controller_from_state(state);
    Ok(controller.get_snapshot().await)
}

pub async fn select_method(state: &AppState, method: &str) -> Result<AttendanceSnapshot, String> {
    let method: CaptureMethod = method.parse().map_err(|e: anyhow::Error| e.to_string())?;
    let controller = controller_from_state(state);
    controller
        .select_method(method)
        .await
        .map_err(|e| e.to_string())
}

pub async fn start_scan(state: &AppState) -> Result<ScanReport, String> {
    let controller = controller_from_state(state);
    let outcome = controller.start_scan().await.map_err(|e| e.to_string())?;
    Ok(ScanReport {
        outcome,
        snapshot: controller.get_snapshot().await,
    })
}

pub async fn retry_location(state: &AppState) -> Result<LocationReport, String> {
    let controller = controller_from_state(state);
    let outcome = controller
        .retry_location()
        .await
        .map_err(|e| e.to_string())?;
    Ok(LocationReport {
        outcome,
        snapshot: controller.get_snapshot().await,
    })
}

pub async fn confirm_attendance(state: &AppState) -> Result<AttendanceRecord, String> {
    let controller = controller_from_state(state);
    controller.confirm().await.map_err(|e| e.to_string())
}

pub async fn reset_attendance(state: &AppState) -> Result<AttendanceSnapshot, String> {
    let controller = controller_from_state(state);
    controller.reset().await.map_err(|e| e.to_string())
}

pub async fn go_to_dashboard(state: &AppState) -> Result<(), String> {
    controller_from_state(state).go_to_dashboard().await;
    Ok(())
}

pub async fn get_attendance_history(
    state: &AppState,
    query: HistoryQuery,
) -> Result<Vec<AttendanceRecord>, String> {
    state
        .db
        .list_attendance_records(query)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_attendance_analytics(state: &AppState) -> Result<AttendanceSummary, String> {
    let recorded = state
        .db
        .attended_counts()
        .await
        .map_err(|e| e.to_string())?;
    Ok(summarize(
        &state.catalog.courses,
        &recorded,
        &AttendanceBands::default(),
    ))
}

pub async fn get_capture_settings(state: &AppState) -> Result<CaptureSettings, String> {
    Ok(state.settings.capture())
}

/// Persists new capture settings; they apply from the next launch.
pub async fn update_capture_settings(
    state: &AppState,
    settings: CaptureSettings,
) -> Result<CaptureSettings, String> {
    state
        .settings
        .update_capture(settings)
        .map_err(|e| e.to_string())?;
    Ok(state.settings.capture())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analytics::AttendanceBand,
        attendance::AttendancePhase,
        db::{SortKey, SortOrder},
    };

    fn app_state(dir: &tempfile::TempDir) -> AppState {
        crate::test_support::app_state(dir, &[0.1])
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_attendance_shows_in_history_and_analytics() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        select_method(&state, "qr").await.unwrap();
        let report = start_scan(&state).await.unwrap();
        assert_eq!(report.outcome, Some(ScanOutcome::Succeeded));
        assert!(report.snapshot.can_confirm);

        let record = confirm_attendance(&state).await.unwrap();
        assert_eq!(record.subject, "Advanced Data Structures");

        let history = get_attendance_history(
            &state,
            HistoryQuery {
                date: Some("2025-01".into()),
                subject: None,
                sort_by: SortKey::Date,
                order: SortOrder::Desc,
            },
        )
        .await
        .unwrap();
        assert_eq!(history, vec![record]);

        let summary = get_attendance_analytics(&state).await.unwrap();
        let cs301 = &summary.subjects[0];
        assert_eq!((cs301.attended, cs301.total), (29, 33));
        assert_eq!(summary.band, AttendanceBand::Warning);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        assert!(select_method(&state, "fingerprint").await.is_err());
        let snapshot = get_attendance_state(&state).await.unwrap();
        assert_eq!(snapshot.state.phase, AttendancePhase::Selecting);
    }

    #[tokio::test]
    async fn confirm_without_capture_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        select_method(&state, "Face Recognition").await.unwrap();
        let err = confirm_attendance(&state).await.unwrap_err();
        assert!(!err.is_empty());
        assert!(get_attendance_history(&state, HistoryQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn current_class_reports_time_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        let overview = get_current_class(&state).await.unwrap();
        assert_eq!(overview.class.code, "CS301");
        assert_eq!(overview.phase, ClassPhase::InProgress);
        assert_eq!(overview.time_remaining, "1h 25m remaining");
    }

    #[tokio::test]
    async fn invalid_settings_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let state = app_state(&dir);

        let mut settings = get_capture_settings(&state).await.unwrap();
        settings.qr_success_probability = 1.5;
        assert!(update_capture_settings(&state, settings).await.is_err());
        assert_eq!(
            get_capture_settings(&state).await.unwrap(),
            CaptureSettings::default()
        );
    }
}
