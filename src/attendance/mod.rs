pub mod commands;
pub mod controller;
pub mod machine;
pub mod state;
pub mod view;

pub use controller::{AttendanceController, AttendanceSnapshot};
pub use machine::{
    AttendanceAction, AttendanceError, AttendanceEvent, AttendanceMachine, Transition,
};
pub use state::{AttendancePhase, AttendanceState};
pub use view::{available_actions, status_message, StatusMessage, Tone, UiAction};
