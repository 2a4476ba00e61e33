//! Per-subject and overall attendance figures for the student dashboard.
//!
//! Each course carries the classes held and attended before this run; records confirmed
//! through the attendance page add one held and one attended class to their course.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::{AttendanceBand, AttendanceBands};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    pub name: String,
    pub total_classes: u32,
    pub prior_attended: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttendance {
    pub code: String,
    pub name: String,
    pub attended: u32,
    pub total: u32,
    pub percentage: u32,
    pub band: AttendanceBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub subjects: Vec<SubjectAttendance>,
    pub total_classes: u32,
    pub attended_classes: u32,
    pub overall_percentage: u32,
    pub band: AttendanceBand,
}

fn percentage(attended: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(attended) / f64::from(total) * 100.0).round() as u32
}

/// `recorded` maps a course code to the number of attendance records confirmed for it.
/// Codes that match no course are ignored.
pub fn summarize(
    courses: &[Course],
    recorded: &HashMap<String, u32>,
    bands: &AttendanceBands,
) -> AttendanceSummary {
    let subjects: Vec<SubjectAttendance> = courses
        .iter()
        .map(|course| {
            let confirmed = recorded.get(&course.code).copied().unwrap_or(0);
            let total = course.total_classes + confirmed;
            let attended = course.prior_attended.min(course.total_classes) + confirmed;
            let percentage = percentage(attended, total);

            SubjectAttendance {
                code: course.code.clone(),
                name: course.name.clone(),
                attended,
                total,
                percentage,
                band: bands.classify(percentage),
            }
        })
        .collect();

    let total_classes = subjects.iter().map(|s| s.total).sum();
    let attended_classes = subjects.iter().map(|s| s.attended).sum();
    let overall_percentage = percentage(attended_classes, total_classes);

    AttendanceSummary {
        subjects,
        total_classes,
        attended_classes,
        overall_percentage,
        band: bands.classify(overall_percentage),
    }
}
