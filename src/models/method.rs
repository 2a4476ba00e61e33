use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMethod {
    Qr,
    Face,
    Gps,
}

impl CaptureMethod {
    pub const ALL: [CaptureMethod; 3] = [CaptureMethod::Qr, CaptureMethod::Face, CaptureMethod::Gps];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMethod::Qr => "qr",
            CaptureMethod::Face => "face",
            CaptureMethod::Gps => "gps",
        }
    }

    /// Human-readable name, as shown in attendance history.
    pub fn label(&self) -> &'static str {
        match self {
            CaptureMethod::Qr => "QR Code",
            CaptureMethod::Face => "Face Recognition",
            CaptureMethod::Gps => "GPS Location",
        }
    }

    /// QR and face capture are started by an explicit scan; GPS checks run on selection.
    pub fn is_scan_based(&self) -> bool {
        matches!(self, CaptureMethod::Qr | CaptureMethod::Face)
    }
}

impl fmt::Display for CaptureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaptureMethod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        CaptureMethod::ALL
            .into_iter()
            .find(|method| {
                method.as_str().eq_ignore_ascii_case(trimmed)
                    || method.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| anyhow!("unknown capture method '{trimmed}'"))
    }
}
