//! # natview Utilities
//!
//! Shared helpers for the natview workspace, currently the `tracing` setup used
//! by the command-line front end.

pub mod logging;

pub use logging::{init_logging, init_logging_with_level, LogFormat, LogGuard, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
