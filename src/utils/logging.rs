//! Logging macros that can be silenced per module.
//!
//! A module opts in by declaring an `ENABLE_LOGS` const and importing the macros from the
//! crate root:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("scan started");
//! ```
//!
//! Flipping the const to `false` drops the module's chatter without touching `RUST_LOG`.

/// `log::info!` guarded by the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` guarded by the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
