//! Shared utilities for the votecheck workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
