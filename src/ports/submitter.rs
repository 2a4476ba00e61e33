use async_trait::async_trait;

use crate::db::models::{AttendanceId, AttendanceSubmission};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("attendance backend rejected the record: {0}")]
    Rejected(String),
    #[error("attendance backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AttendanceSubmitter: Send + Sync {
    async fn submit(&self, submission: &AttendanceSubmission) -> Result<AttendanceId, SubmitError>;
}
