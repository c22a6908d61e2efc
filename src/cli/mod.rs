//! Command-line interface components
//!
//! Argument parsing and the wiring between the configuration and the run
//! controller.

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::handle_run;
