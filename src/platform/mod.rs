//! Stand-ins for browser device APIs and routing.

mod camera;
mod geolocation;
mod navigator;

pub use camera::SimulatedCamera;
pub use geolocation::SimulatedGeolocation;
pub use navigator::ChannelNavigator;
