pub mod attempt;
pub mod class_session;
pub mod location;
pub mod method;

pub use attempt::{AttemptStatus, CaptureAttempt, FailureReason, ScanOutcome};
pub use class_session::{ClassPhase, ClassSession};
pub use location::{LocationCheck, LocationOutcome, LocationStatus};
pub use method::CaptureMethod;
