use log::{info, warn};
use tokio::sync::mpsc;

use crate::ports::{Navigator, Route};

/// Forwards navigation requests to whoever renders pages.
#[derive(Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        info!("navigating to {}", route.path());
        if self.sender.send(route).is_err() {
            warn!("navigation to {} dropped: no page listener", route.path());
        }
    }
}
