//! Attachment link discovery

use kuchiki::NodeRef;
use url::Url;

use crate::constants::markup::{ATTACHMENT_LINK_SELECTOR, IMAGE_EXTENSIONS};

/// An attachment link found in a page
#[derive(Debug, Clone)]
pub struct AttachmentLink {
    /// Link target
    pub href: String,
    /// Index among the page's attachment links, in document order
    pub position: usize,
    /// The anchor element
    pub node: NodeRef,
}

impl AttachmentLink {
    /// Whether the link points at a known image format
    pub fn is_image(&self) -> bool {
        is_image_url(&self.href)
    }
}

/// Collects every attachment link of the document, in document order
///
/// Anchors carrying the attachment class but no `href` are ignored.
pub fn collect_attachment_links(document: &NodeRef) -> Vec<AttachmentLink> {
    let Ok(anchors) = document.select(ATTACHMENT_LINK_SELECTOR) else {
        return Vec::new();
    };

    anchors
        .enumerate()
        .filter_map(|(position, anchor)| {
            let href = anchor.attributes.borrow().get("href")?.trim().to_string();
            Some(AttachmentLink {
                href,
                position,
                node: anchor.as_node().clone(),
            })
        })
        .collect()
}

/// Checks whether an absolute URL's final path segment has an image extension
///
/// The match is case-insensitive and ignores any query string.
pub fn is_image_url(href: &str) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };

    let segment = url.path().rsplit('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&extension.as_str())
        }
        None => false,
    }
}
