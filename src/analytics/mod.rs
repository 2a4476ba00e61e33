pub mod config;
pub mod summary;

pub use config::{AttendanceBand, AttendanceBands};
pub use summary::{summarize, AttendanceSummary, Course, SubjectAttendance};
