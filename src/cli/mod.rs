//! CLI surface
//!
//! Argument parsing, the single train command, and console logging.

mod commands;
mod logging;

pub use commands::{run_command, Cli};
pub use logging::{log, LogLevel};
