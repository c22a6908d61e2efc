//! Local filename derivation for downloaded attachments
//!
//! Attachment URLs are turned into flat, collision-resistant file names that can
//! live next to the page that references them:
//!
//! `https://host/img/u1/cat.jpg?size=604x453` becomes
//! `img_u1_cat.604x453.<unix-time>.jpg`.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use url::Url;

use crate::errors::{FilenameError, FilenameResult};

static PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\.(\w+)$").expect("path pattern is valid"));

static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"size=(\d+x\d+)").expect("size pattern is valid"));

/// Derives the local filename for an attachment URL
///
/// The name is built from the URL path (slashes flattened to underscores), the
/// optional `size=WxH` query token, the current Unix timestamp when
/// `include_time` is set, and the original extension, joined by dots.
///
/// # Errors
///
/// Returns `FilenameError` if the URL cannot be parsed or its path does not end
/// in `<name>.<extension>`.
pub fn derive_filename(url: &str, include_time: bool) -> FilenameResult<String> {
    let timestamp = include_time.then(|| Utc::now().timestamp());
    derive_filename_at(url, timestamp)
}

/// Derives the filename with an explicit timestamp component
pub(crate) fn derive_filename_at(url: &str, timestamp: Option<i64>) -> FilenameResult<String> {
    let parsed = Url::parse(url).map_err(|e| FilenameError::InvalidUrl {
        url: url.to_string(),
        error: e.to_string(),
    })?;

    let captures = PATH_PATTERN
        .captures(parsed.path())
        .ok_or_else(|| FilenameError::MalformedUrl {
            url: url.to_string(),
        })?;

    let stem = captures[1].replace('/', "_");
    let stem = stem.trim_start_matches('_');
    if stem.is_empty() {
        return Err(FilenameError::MalformedUrl {
            url: url.to_string(),
        });
    }
    let extension = &captures[2];

    let size = parsed
        .query()
        .and_then(|query| SIZE_PATTERN.captures(query))
        .map(|c| c[1].to_string());

    let components = [
        Some(stem.to_string()),
        size,
        timestamp.map(|t| t.to_string()),
        Some(extension.to_string()),
    ];

    Ok(components
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("."))
}
