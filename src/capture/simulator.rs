//! Simulated capture attempts for each attendance method.
//!
//! Durations and success rates come from [`CaptureSettings`]; device access goes through
//! the camera and geolocation ports so denial and unsupported paths can be exercised.

use std::sync::Arc;

use tokio::time::{sleep, timeout};

use crate::{
    models::{CaptureMethod, FailureReason, LocationOutcome, LocationStatus, ScanOutcome},
    ports::{Camera, Geolocation, RandomSource},
    settings::CaptureSettings,
};

use super::CameraSession;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Clone)]
pub struct CaptureSimulator {
    settings: CaptureSettings,
    random: Arc<dyn RandomSource>,
    camera: Arc<dyn Camera>,
    geolocation: Arc<dyn Geolocation>,
}

impl CaptureSimulator {
    pub fn new(
        settings: CaptureSettings,
        random: Arc<dyn RandomSource>,
        camera: Arc<dyn Camera>,
        geolocation: Arc<dyn Geolocation>,
    ) -> Self {
        Self {
            settings,
            random,
            camera,
            geolocation,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub async fn scan(&self, method: CaptureMethod) -> ScanOutcome {
        match method {
            CaptureMethod::Qr => self.scan_qr().await,
            CaptureMethod::Face => self.scan_face().await,
            CaptureMethod::Gps => {
                log_warn!("scan requested for GPS, which only supports location checks");
                ScanOutcome::Failed(FailureReason::NotSupported)
            }
        }
    }

    async fn scan_qr(&self) -> ScanOutcome {
        log_info!("QR scan started ({}ms)", self.settings.qr_scan_ms);
        sleep(self.settings.qr_scan_duration()).await;

        let outcome = if self.roll(self.settings.qr_success_probability) {
            ScanOutcome::Succeeded
        } else {
            ScanOutcome::Failed(FailureReason::InvalidCode)
        };
        log_info!("QR scan finished: {:?}", outcome);
        outcome
    }

    async fn scan_face(&self) -> ScanOutcome {
        let stream = match timeout(
            self.settings.capture_timeout(),
            self.camera.request_video_stream(),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                log_warn!("camera access failed: {err}");
                return ScanOutcome::Failed(FailureReason::CameraError);
            }
            Err(_) => {
                log_warn!(
                    "camera permission prompt timed out (> {}ms)",
                    self.settings.capture_timeout_ms
                );
                return ScanOutcome::Failed(FailureReason::CameraError);
            }
        };

        let _camera = CameraSession::new(stream);
        log_info!("face analysis started ({}ms)", self.settings.face_scan_ms);
        sleep(self.settings.face_scan_duration()).await;

        let outcome = if self.roll(self.settings.face_success_probability) {
            ScanOutcome::Succeeded
        } else {
            ScanOutcome::Failed(FailureReason::NotRecognized)
        };
        log_info!("face analysis finished: {:?}", outcome);
        outcome
    }

    pub async fn check_location(&self) -> LocationOutcome {
        if !self.geolocation.is_supported() {
            log_warn!("geolocation not supported on this platform");
            return LocationOutcome::without_distance(LocationStatus::NotSupported);
        }

        match timeout(
            self.settings.capture_timeout(),
            self.geolocation.current_position(),
        )
        .await
        {
            Ok(Ok(position)) => {
                let distance = self.random.next_unit() * self.settings.gps_distance_range;
                let status = if distance < self.settings.gps_radius {
                    LocationStatus::Verified
                } else {
                    LocationStatus::OutOfRange
                };
                log_info!(
                    "location ({:.5}, {:.5}) is {:.1} units from the classroom: {:?}",
                    position.latitude,
                    position.longitude,
                    distance,
                    status
                );
                LocationOutcome {
                    status,
                    distance: Some(distance),
                }
            }
            Ok(Err(err)) => {
                log_warn!("location request failed: {err}");
                LocationOutcome::without_distance(LocationStatus::Error)
            }
            Err(_) => {
                log_warn!(
                    "location request timed out (> {}ms)",
                    self.settings.capture_timeout_ms
                );
                LocationOutcome::without_distance(LocationStatus::Error)
            }
        }
    }

    fn roll(&self, success_probability: f64) -> bool {
        self.random.next_unit() < success_probability
    }
}
