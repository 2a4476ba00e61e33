use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceBand {
    Good,
    Warning,
    Critical,
}

/// Percentage thresholds used to classify attendance.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceBands {
    /// At or above this percentage attendance is in good standing
    pub good_threshold: u32,

    /// At or above this (and below good) the student gets a warning
    pub warning_threshold: u32,
}

impl Default for AttendanceBands {
    fn default() -> Self {
        Self {
            good_threshold: 85,
            warning_threshold: 75,
        }
    }
}

impl AttendanceBands {
    pub fn classify(&self, percentage: u32) -> AttendanceBand {
        if percentage >= self.good_threshold {
            AttendanceBand::Good
        } else if percentage >= self.warning_threshold {
            AttendanceBand::Warning
        } else {
            AttendanceBand::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        let bands = AttendanceBands::default();
        assert_eq!(bands.classify(100), AttendanceBand::Good);
        assert_eq!(bands.classify(85), AttendanceBand::Good);
        assert_eq!(bands.classify(84), AttendanceBand::Warning);
        assert_eq!(bands.classify(75), AttendanceBand::Warning);
        assert_eq!(bands.classify(74), AttendanceBand::Critical);
        assert_eq!(bands.classify(0), AttendanceBand::Critical);
    }
}
