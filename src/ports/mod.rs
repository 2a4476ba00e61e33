//! Seams between the attendance flow and the outside world.
//!
//! Device access, the attendance backend, navigation, time and randomness are all
//! reached through these traits so the flow can run against simulated devices and be
//! driven deterministically in tests.

pub mod camera;
pub mod clock;
pub mod geolocation;
pub mod navigator;
pub mod random;
pub mod submitter;

pub use camera::{Camera, PermissionError, VideoStream};
pub use clock::{Clock, SystemClock};
pub use geolocation::{Coordinates, Geolocation};
pub use navigator::{Navigator, Route};
pub use random::{RandomSource, ThreadRandom};
pub use submitter::{AttendanceSubmitter, SubmitError};
