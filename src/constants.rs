//! Application constants for the archive localizer
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

/// HTTP client configuration constants
pub mod http {
    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("archive-localizer/", env!("CARGO_PKG_VERSION"));
}

/// State file constants
pub mod state {
    /// Current schema version of the state file
    pub const STATE_VERSION: u32 = 1;

    /// State file name, placed next to the executable by default
    pub const STATE_FILE_NAME: &str = "state.json";
}

/// Archive layout constants
pub mod archive {
    /// Subdirectory of the archive root holding the conversation pages
    pub const MESSAGES_DIR: &str = "messages";

    /// Extension of the pages to process
    pub const PAGE_EXTENSION: &str = "html";
}

/// Markup conventions of the exported pages and of the rewritten output
pub mod markup {
    /// CSS selector for attachment links in exported pages
    pub const ATTACHMENT_LINK_SELECTOR: &str = "a.attachment__link";

    /// Class given to images embedded next to an attachment link
    pub const LOCAL_IMAGE_CLASS: &str = "attachment__local";

    /// Class given to notes inserted when an attachment could not be downloaded
    pub const MISSING_NOTE_CLASS: &str = "attachment__missing";

    /// Timestamp format of the "could not download" note
    pub const NOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Image extensions that qualify an attachment link for download
    pub const IMAGE_EXTENSIONS: &[&str] = &[
        "apng", "avif", "svg", "webp", "jpg", "jpeg", "png", "mng", "gif", "bmp", "ico", "tiff",
    ];
}

/// File naming constants
pub mod files {
    /// Suffix for temporary files during downloads
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Suffix appended to a page's file name before it is overwritten
    pub const BACKUP_FILE_SUFFIX: &str = "~";

    /// Name of the optional configuration file
    pub const CONFIG_FILE_NAME: &str = "archive-localizer.toml";

    /// Directory name under the user config directory
    pub const CONFIG_DIR_NAME: &str = "archive-localizer";
}

/// Page decoding constants
pub mod encoding {
    /// Encoding label of pages produced by the exporter
    pub const DEFAULT_SOURCE_ENCODING: &str = "windows-1251";
}
