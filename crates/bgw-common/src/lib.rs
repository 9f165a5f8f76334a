//! BGW Common Library
//!
//! Shared infrastructure for the BGW cache updater workspace:
//!
//! - **Logging**: tracing subscriber setup with console/file targets
//! - **Duration**: wall-clock formatting for job completion reports

pub mod duration;
pub mod logging;

pub use duration::format_duration;
pub use logging::{init_logging, LogConfig, LogLevel, LogOutput};
