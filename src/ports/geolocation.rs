use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PermissionError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
}

#[async_trait]
pub trait Geolocation: Send + Sync {
    /// False when the platform has no location capability at all.
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> Result<Coordinates, PermissionError>;
}
