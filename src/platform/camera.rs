use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use log::info;

use crate::ports::{Camera, PermissionError, VideoStream};

/// Camera whose permission prompt always answers the same way. Counts streams so
/// leaks are observable.
#[derive(Clone, Default)]
pub struct SimulatedCamera {
    denied: bool,
    unresponsive: bool,
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl SimulatedCamera {
    pub fn granting() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    /// Never answers the permission prompt.
    pub fn unresponsive() -> Self {
        Self {
            unresponsive: true,
            ..Self::default()
        }
    }

    /// Streams handed out so far.
    pub fn streams_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet stopped.
    pub fn open_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for SimulatedCamera {
    async fn request_video_stream(&self) -> Result<Box<dyn VideoStream>, PermissionError> {
        if self.unresponsive {
            std::future::pending::<()>().await;
        }
        if self.denied {
            return Err(PermissionError::Denied);
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        info!("simulated camera stream opened");
        Ok(Box::new(SimulatedStream {
            live: Arc::clone(&self.live),
            stopped: false,
        }))
    }
}

struct SimulatedStream {
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl VideoStream for SimulatedStream {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
