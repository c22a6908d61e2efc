//! Archive Localizer Library
//!
//! Downloads the image attachments referenced by an exported chat archive and
//! rewrites its pages to embed the local copies. Progress is kept in a state
//! file so a run can be interrupted and resumed.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
