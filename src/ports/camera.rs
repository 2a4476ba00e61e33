use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("permission denied")]
    Denied,
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// A live video stream. Must be stopped exactly once when the caller is done with it.
pub trait VideoStream: Send {
    fn stop(&mut self);
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_video_stream(&self) -> Result<Box<dyn VideoStream>, PermissionError>;
}
