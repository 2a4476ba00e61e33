use log::debug;

use crate::ports::VideoStream;

/// Owns a camera stream for the lifetime of one face scan. The stream is stopped when
/// the session is dropped, including when the scan future itself is cancelled.
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    pub fn new(stream: Box<dyn VideoStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("camera stream released");
        }
    }
}
