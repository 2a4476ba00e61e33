//! The class a student is currently marking attendance for.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::AttendanceStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ClassPhase {
    Upcoming,
    InProgress,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    /// Course code, doubles as the class id sent to the attendance backend.
    pub code: String,
    pub subject: String,
    pub faculty: String,
    pub department: String,
    pub room: String,
    pub building: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub attendance_window_minutes: u32,
}

impl ClassSession {
    pub fn phase(&self, now: DateTime<Utc>) -> ClassPhase {
        if now < self.starts_at {
            ClassPhase::Upcoming
        } else if now > self.ends_at {
            ClassPhase::Ended
        } else {
            ClassPhase::InProgress
        }
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        let diff = self.ends_at - now;
        if diff <= Duration::zero() {
            return "Class ended".to_string();
        }

        let minutes = diff.num_minutes();
        let hours = minutes / 60;
        if hours > 0 {
            format!("{}h {}m remaining", hours, minutes % 60)
        } else {
            format!("{}m remaining", minutes)
        }
    }

    /// Marks confirmed after the attendance window closes count as late.
    pub fn status_for(&self, marked_at: DateTime<Utc>) -> AttendanceStatus {
        let window_end =
            self.starts_at + Duration::minutes(i64::from(self.attendance_window_minutes));
        if marked_at <= window_end {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Late
        }
    }
}
