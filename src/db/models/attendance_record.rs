//! Attendance record data models.
//!
//! A record only exists once the submission gate confirmed a successful capture.

use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CaptureMethod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AttendanceId(pub String);

impl AttendanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttendanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceStatus {
    Present,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "Present" => Ok(AttendanceStatus::Present),
            "Late" => Ok(AttendanceStatus::Late),
            other => Err(anyhow!("unknown attendance status {other}")),
        }
    }
}

/// What the gate hands to the attendance backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    pub class_id: String,
    pub subject: String,
    pub method: CaptureMethod,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub class_id: String,
    pub subject: String,
    pub method: CaptureMethod,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn from_submission(id: AttendanceId, submission: AttendanceSubmission) -> Self {
        Self {
            id,
            class_id: submission.class_id,
            subject: submission.subject,
            method: submission.method,
            status: submission.status,
            timestamp: submission.timestamp,
        }
    }
}
