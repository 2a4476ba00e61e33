pub mod attendance_record;

pub use attendance_record::{
    AttendanceId, AttendanceRecord, AttendanceStatus, AttendanceSubmission,
};
