//! Core application logic for the archive localizer
//!
//! This module contains the components of a run, leaf first: filename
//! derivation, the attachment fetcher, the durable state store, the page
//! transformer, and the run controller that ties them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//!
//! use archive_localizer::app::{
//!     AssetFetcher, ClientConfig, PageConfig, PageTransformer, RunController, StopFlag,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = AssetFetcher::new(&ClientConfig::default(), true)?;
//! let transformer = PageTransformer::new(fetcher, PageConfig::default());
//!
//! let mut controller = RunController::initialize(
//!     Path::new("state.json"),
//!     PathBuf::from("/archives/vk"),
//!     transformer,
//!     StopFlag::new(),
//! )?;
//!
//! let result = controller.run().await?;
//! println!("{}", result.closing_message());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod controller;
pub mod filename;
pub mod page;
pub mod state;

// Re-export main public API
pub use client::{AssetFetcher, ClientConfig};
pub use controller::{
    RunController, RunOutcome, RunPhase, SessionResult, SessionSummary, SignalHandler, StopFlag,
};
pub use filename::derive_filename;
pub use page::{AttachmentLink, PageConfig, PageReport, PageTransformer};
pub use state::{ProcessingState, StateStore};
