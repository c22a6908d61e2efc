//! Page transformation
//!
//! A page is parsed, its image attachment links are downloaded next to it, and
//! the page is rewritten so every downloaded image is embedded right after its
//! link. Links whose download failed remotely get a dated note instead. The
//! original page is kept under a backup name before it is overwritten.
//!
//! Pages without image attachment links are never written to, unless the page
//! only survives as its backup and is put back in place.
//!
//! Running a page through the transformer a second time does not duplicate
//! anything: links already followed by an embedded image are skipped, and a
//! link that still cannot be downloaded keeps its single note.

pub mod encoding;
pub mod links;
pub mod markup;

#[cfg(test)]
pub mod tests;

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use encoding_rs::{Encoding, WINDOWS_1251};
use kuchiki::traits::*;
use kuchiki::NodeRef;
use tracing::{info, warn};

use crate::app::client::AssetFetcher;
use crate::constants::files::BACKUP_FILE_SUFFIX;
use crate::constants::markup::{LOCAL_IMAGE_CLASS, MISSING_NOTE_CLASS};
use crate::errors::{PageError, PageResult};

pub use links::{collect_attachment_links, is_image_url, AttachmentLink};

/// Page transformer settings
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Encoding of pages that are not valid UTF-8
    pub source_encoding: &'static Encoding,
    /// Suffix appended to a page's file name to form its backup name
    pub backup_suffix: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            source_encoding: WINDOWS_1251,
            backup_suffix: BACKUP_FILE_SUFFIX.to_string(),
        }
    }
}

/// What happened to one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    /// Attachment links in the page
    pub links_found: usize,
    /// Attachment links pointing at images
    pub image_links: usize,
    /// Images downloaded and embedded
    pub embedded: usize,
    /// Notes inserted for images that could not be downloaded
    pub annotated: usize,
    /// Image links whose download failed remotely
    pub failed: usize,
    /// Image links already embedded by an earlier run
    pub skipped: usize,
    /// Whether the page was written back
    pub rewritten: bool,
    /// Backup created for the original page
    pub backup: Option<PathBuf>,
}

impl PageReport {
    /// Whether the document was changed in memory
    pub fn changed(&self) -> bool {
        self.embedded + self.annotated > 0
    }
}

/// Rewrites pages to embed their image attachments
#[derive(Debug, Clone)]
pub struct PageTransformer {
    fetcher: AssetFetcher,
    config: PageConfig,
}

impl PageTransformer {
    /// Create a new transformer
    pub fn new(fetcher: AssetFetcher, config: PageConfig) -> Self {
        Self { fetcher, config }
    }

    /// Backup path of `page`
    pub fn backup_path(&self, page: &Path) -> PathBuf {
        let mut name = page.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(&self.config.backup_suffix);
        page.with_file_name(name)
    }

    /// Transforms one page in place
    ///
    /// # Errors
    ///
    /// Returns `PageError` if the page cannot be read or written back, or if an
    /// attachment cannot be stored locally. Remote download failures are not
    /// errors; they are recorded in the page.
    pub async fn transform(&self, page: &Path) -> PageResult<PageReport> {
        let (bytes, restored) = self.read_source(page).await?;
        let text = encoding::decode_page(&bytes, self.config.source_encoding);
        let document = kuchiki::parse_html().one(&*text);

        let links = collect_attachment_links(&document);
        let mut report = PageReport {
            links_found: links.len(),
            ..Default::default()
        };

        if links.is_empty() {
            info!("No links found");
            if restored {
                restore_original(page, &bytes).await?;
            }
            return Ok(report);
        }

        let asset_dir = match page.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        for link in links.iter().filter(|link| link.is_image()) {
            report.image_links += 1;
            self.localize_link(link, asset_dir, &mut report).await?;
        }

        if report.changed() {
            self.write_back(page, &document, &mut report).await?;
        } else if restored {
            restore_original(page, &bytes).await?;
        }

        info!("Replaced {} links", report.embedded);
        if report.failed > 0 {
            warn!("{} images could not be downloaded", report.failed);
        }
        Ok(report)
    }

    /// Reads the page, falling back to its backup when the page itself is gone
    ///
    /// A page is only ever missing when an earlier run renamed it to its backup
    /// and then failed to write the rewritten copy. The flag tells whether the
    /// bytes came from the backup.
    async fn read_source(&self, page: &Path) -> PageResult<(Vec<u8>, bool)> {
        match tokio::fs::read(page).await {
            Ok(bytes) => Ok((bytes, false)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                let backup = self.backup_path(page);
                match tokio::fs::read(&backup).await {
                    Ok(bytes) => {
                        warn!("{} is missing, restoring from {}", page.display(), backup.display());
                        Ok((bytes, true))
                    }
                    Err(_) => Err(PageError::Read {
                        path: page.to_path_buf(),
                        source,
                    }),
                }
            }
            Err(source) => Err(PageError::Read {
                path: page.to_path_buf(),
                source,
            }),
        }
    }

    /// Downloads one image link and records the outcome in the document
    async fn localize_link(
        &self,
        link: &AttachmentLink,
        asset_dir: &Path,
        report: &mut PageReport,
    ) -> PageResult<()> {
        let previous = markup::following_element(&link.node);

        if previous
            .as_ref()
            .is_some_and(|node| markup::has_class(node, LOCAL_IMAGE_CLASS))
        {
            info!("Already embedded: {}", link.href);
            report.skipped += 1;
            return Ok(());
        }
        let previous_note = previous.filter(|node| markup::has_class(node, MISSING_NOTE_CLASS));

        match self.fetcher.fetch(&link.href, asset_dir).await {
            Ok(filename) => {
                if let Some(note) = previous_note {
                    note.detach();
                }
                link.node.insert_after(markup::local_image(&filename));
                report.embedded += 1;
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                report.failed += 1;
                if previous_note.is_none() {
                    link.node.insert_after(markup::missing_note(Local::now()));
                    report.annotated += 1;
                }
                Ok(())
            }
            Err(source) => Err(PageError::Fetch {
                url: link.href.clone(),
                source,
            }),
        }
    }

    /// Backs up the original page and writes the rewritten document
    async fn write_back(
        &self,
        page: &Path,
        document: &NodeRef,
        report: &mut PageReport,
    ) -> PageResult<()> {
        let write_error = |source: std::io::Error| PageError::Write {
            path: page.to_path_buf(),
            source,
        };

        markup::declare_utf8(document);
        let mut html = Vec::new();
        document.serialize(&mut html).map_err(write_error)?;

        let backup = self.backup_path(page);
        let renamed = if tokio::fs::try_exists(&backup).await.unwrap_or(false) {
            info!("Keeping existing backup {}", backup.display());
            None
        } else {
            Some(tokio::fs::rename(page, &backup).await)
        };

        replace_page(page, backup, renamed, &html, report).await
    }
}

/// Writes the rewritten page once the backup step is over
///
/// `renamed` is the outcome of moving the original to `backup`, or `None`
/// when an existing backup was kept. A failed rename is logged and the page
/// is written anyway.
async fn replace_page(
    page: &Path,
    backup: PathBuf,
    renamed: Option<io::Result<()>>,
    html: &[u8],
    report: &mut PageReport,
) -> PageResult<()> {
    match renamed {
        Some(Ok(())) => report.backup = Some(backup),
        Some(Err(e)) => warn!("Couldn't rename {}: {}", page.display(), e),
        None => {}
    }

    tokio::fs::write(page, html)
        .await
        .map_err(|source| PageError::Write {
            path: page.to_path_buf(),
            source,
        })?;
    report.rewritten = true;
    Ok(())
}

/// Puts the original bytes back at the page path, unchanged
async fn restore_original(page: &Path, bytes: &[u8]) -> PageResult<()> {
    tokio::fs::write(page, bytes)
        .await
        .map_err(|source| PageError::Write {
            path: page.to_path_buf(),
            source,
        })
}
