//! Shared utilities for the quorum engine.

pub mod logging;

pub use logging::{init_logging, LogFormat, LogFormatError};
