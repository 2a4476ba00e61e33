//! Demo timetable: the class being marked and the student's enrolled courses.

use chrono::{DateTime, Duration, Utc};

use crate::{analytics::Course, models::ClassSession};

const CLASS_LENGTH_MINUTES: i64 = 90;
const ATTENDANCE_WINDOW_MINUTES: u32 = 15;

#[derive(Debug, Clone)]
pub struct Catalog {
    pub current_class: ClassSession,
    pub courses: Vec<Course>,
}

impl Catalog {
    /// The current class started a few minutes before `now`, so attendance taken right
    /// away lands inside the window.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let starts_at = now - Duration::minutes(5);

        let current_class = ClassSession {
            code: "CS301".into(),
            subject: "Advanced Data Structures".into(),
            faculty: "Dr. Priya Sharma".into(),
            department: "Computer Science".into(),
            room: "Room 101".into(),
            building: "Engineering Block A".into(),
            starts_at,
            ends_at: starts_at + Duration::minutes(CLASS_LENGTH_MINUTES),
            attendance_window_minutes: ATTENDANCE_WINDOW_MINUTES,
        };

        let courses = [
            ("CS301", "Advanced Data Structures", 32, 28),
            ("CS302", "Database Management", 30, 25),
            ("CS303", "Software Engineering", 28, 22),
            ("CS304", "Machine Learning", 26, 20),
            ("CS305", "Computer Networks", 24, 18),
        ]
        .into_iter()
        .map(|(code, name, total_classes, prior_attended)| Course {
            code: code.into(),
            name: name.into(),
            total_classes,
            prior_attended,
        })
        .collect();

        Self {
            current_class,
            courses,
        }
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.code == code)
    }
}
