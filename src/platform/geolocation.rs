use async_trait::async_trait;

use crate::ports::{Coordinates, Geolocation, PermissionError};

/// Fixed position near the engineering block; the classroom distance itself is sampled
/// by the capture simulator.
const CAMPUS_POSITION: Coordinates = Coordinates {
    latitude: 28.54480,
    longitude: 77.19290,
    accuracy_m: 12.0,
};

#[derive(Debug, Clone, Copy)]
pub struct SimulatedGeolocation {
    supported: bool,
    denied: bool,
    unresponsive: bool,
}

impl SimulatedGeolocation {
    pub fn available() -> Self {
        Self {
            supported: true,
            denied: false,
            unresponsive: false,
        }
    }

    pub fn denying() -> Self {
        Self {
            supported: true,
            denied: true,
            unresponsive: false,
        }
    }

    /// Supported, but the position request never completes.
    pub fn unresponsive() -> Self {
        Self {
            supported: true,
            denied: false,
            unresponsive: true,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            denied: false,
            unresponsive: false,
        }
    }
}

#[async_trait]
impl Geolocation for SimulatedGeolocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self) -> Result<Coordinates, PermissionError> {
        if !self.supported {
            return Err(PermissionError::Unavailable("no geolocation capability".into()));
        }
        if self.unresponsive {
            std::future::pending::<()>().await;
        }
        if self.denied {
            return Err(PermissionError::Denied);
        }
        Ok(CAMPUS_POSITION)
    }
}
