//! Error types for the archive localizer
//!
//! This module defines the error types for every component of the application.
//! Per-link failures that the page transformer can absorb are distinguished from
//! environment failures that must stop the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while deriving a local filename from an attachment URL
#[derive(Error, Debug)]
pub enum FilenameError {
    /// URL could not be parsed at all
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// URL path does not end in `<name>.<extension>`
    #[error("URL path does not end in <name>.<extension>: {url}")]
    MalformedUrl { url: String },
}

/// Errors raised while fetching one attachment
#[derive(Error, Debug)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("Server responded with HTTP {status}")]
    NonSuccessStatus { status: u16 },

    /// Request could not be completed or the body could not be read
    #[error("HTTP request failed")]
    Transport(#[from] reqwest::Error),

    /// No local filename could be derived from the URL
    #[error(transparent)]
    Filename(#[from] FilenameError),

    /// Downloaded bytes could not be written to disk
    #[error("Could not write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Check whether the failure only affects the current link
    ///
    /// Remote problems are absorbed by annotating the page. Filename and write
    /// failures point at a broken environment and abort the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FetchError::NonSuccessStatus { .. } | FetchError::Transport(_) => true,
            FetchError::Filename(_) | FetchError::Write { .. } => false,
        }
    }
}

/// State file errors
#[derive(Error, Debug)]
pub enum StateError {
    /// State file was written by an incompatible schema
    #[error("State version mismatch. Expected: {expected}, found: {found}")]
    VersionMismatch { expected: u32, found: u64 },

    /// State file contents are not valid JSON for the schema
    #[error("Could not parse state file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// State file violates the remaining/processed partition
    #[error("State file is corrupted: {reason}")]
    Corrupted { reason: String },

    /// Committed path is not in the remaining queue
    #[error("File is not queued for processing: {path}")]
    NotQueued { path: String },

    /// Data directory is missing or not a directory
    #[error("Archive root is not a directory: {path}")]
    DataDirNotFound { path: PathBuf },

    /// I/O error while reading, writing or discovering
    #[error("State I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Page transformation errors, all of them fatal for the run
#[derive(Error, Debug)]
pub enum PageError {
    /// Page could not be read
    #[error("Could not read page {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rewritten page could not be written back
    #[error("Could not write page {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Attachment download failed in a way that indicates a broken environment
    #[error("Attachment {url} could not be stored")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Could not read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Location of the executable could not be determined
    #[error("Could not locate the executable directory")]
    ExecutableDir(#[source] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// State file error
    #[error(transparent)]
    State(#[from] StateError),

    /// Page transformation error
    #[error(transparent)]
    Page(#[from] PageError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::State(_) => "state",
            AppError::Page(_) => "page",
            AppError::Config(_) => "config",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Filename derivation result type alias
pub type FilenameResult<T> = std::result::Result<T, FilenameError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// State result type alias
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Page result type alias
pub type PageResult<T> = std::result::Result<T, PageError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
