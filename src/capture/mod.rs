mod camera_session;
pub mod simulator;

pub use camera_session::CameraSession;
pub use simulator::CaptureSimulator;
