use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Tunables for the simulated capture methods and the confirmation gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureSettings {
    pub qr_success_probability: f64,
    pub face_success_probability: f64,
    /// A sampled distance strictly below this counts as inside the classroom.
    pub gps_radius: f64,
    /// Simulated distances are drawn uniformly from `[0, gps_distance_range)`.
    pub gps_distance_range: f64,
    pub qr_scan_ms: u64,
    pub face_scan_ms: u64,
    /// Upper bound on waiting for camera or location permission prompts.
    pub capture_timeout_ms: u64,
    pub redirect_delay_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            qr_success_probability: 0.7,
            face_success_probability: 0.8,
            gps_radius: 50.0,
            gps_distance_range: 100.0,
            qr_scan_ms: 3_000,
            face_scan_ms: 4_000,
            capture_timeout_ms: 10_000,
            redirect_delay_ms: 2_000,
        }
    }
}

impl CaptureSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("qrSuccessProbability", self.qr_success_probability),
            ("faceSuccessProbability", self.face_success_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be between 0 and 1, got {value}");
            }
        }

        if !(self.gps_distance_range > 0.0) {
            bail!("gpsDistanceRange must be positive");
        }
        if !(0.0..=self.gps_distance_range).contains(&self.gps_radius) {
            bail!(
                "gpsRadius must be between 0 and gpsDistanceRange ({}), got {}",
                self.gps_distance_range,
                self.gps_radius
            );
        }

        if self.qr_scan_ms == 0 || self.face_scan_ms == 0 || self.capture_timeout_ms == 0 {
            bail!("scan durations and capture timeout must be greater than zero");
        }

        Ok(())
    }

    /// Debug mode keeps the flow intact but makes every wait ten times shorter.
    pub fn debug_scaled(&self) -> Self {
        Self {
            qr_scan_ms: (self.qr_scan_ms / 10).max(1),
            face_scan_ms: (self.face_scan_ms / 10).max(1),
            redirect_delay_ms: self.redirect_delay_ms / 10,
            ..self.clone()
        }
    }

    pub fn qr_scan_duration(&self) -> Duration {
        Duration::from_millis(self.qr_scan_ms)
    }

    pub fn face_scan_duration(&self) -> Duration {
        Duration::from_millis(self.face_scan_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    capture: CaptureSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let parsed: UserSettings = serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            });
            if let Err(err) = parsed.capture.validate() {
                warn!("Ignoring invalid capture settings: {err}");
                UserSettings::default()
            } else {
                parsed
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn capture(&self) -> CaptureSettings {
        self.read().capture.clone()
    }

    pub fn update_capture(&self, settings: CaptureSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        let previous = std::mem::replace(&mut guard.capture, settings);
        if let Err(err) = self.persist(&guard) {
            guard.capture = previous;
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
