pub mod attendance_records;
