//! Construction and inspection of the nodes inserted into rewritten pages

use chrono::{DateTime, Local};
use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchiki::{Attribute, ExpandedName, NodeRef};

use crate::constants::markup::{LOCAL_IMAGE_CLASS, MISSING_NOTE_CLASS, NOTE_TIMESTAMP_FORMAT};

fn html_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
    let attributes = attributes.iter().map(|(name, value)| {
        (
            ExpandedName::new(ns!(), LocalName::from(*name)),
            Attribute {
                prefix: None,
                value: value.to_string(),
            },
        )
    });

    NodeRef::new_element(
        QualName::new(None, ns!(html), LocalName::from(tag)),
        attributes,
    )
}

/// `<img>` pointing at a downloaded attachment
pub fn local_image(filename: &str) -> NodeRef {
    html_element("img", &[("class", LOCAL_IMAGE_CLASS), ("src", filename)])
}

/// Paragraph telling the reader an attachment could not be downloaded
pub fn missing_note(at: DateTime<Local>) -> NodeRef {
    let note = html_element("p", &[("class", MISSING_NOTE_CLASS)]);
    note.append(NodeRef::new_text(format!(
        "Couldn't download on {}",
        at.format(NOTE_TIMESTAMP_FORMAT)
    )));
    note
}

/// First element after `node` among its siblings
///
/// Whitespace-only text is skipped. Any other node in between means nothing
/// was inserted right after `node`, and `None` is returned.
pub fn following_element(node: &NodeRef) -> Option<NodeRef> {
    for sibling in node.following_siblings() {
        if sibling.as_element().is_some() {
            return Some(sibling);
        }
        match sibling.as_text() {
            Some(text) if text.borrow().trim().is_empty() => continue,
            _ => return None,
        }
    }
    None
}

/// Whether `node` is an element carrying `class`
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().is_some_and(|element| {
        element
            .attributes
            .borrow()
            .get("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    })
}

/// Rewrites charset declarations so they match the UTF-8 output
pub fn declare_utf8(document: &NodeRef) {
    let Ok(metas) = document.select("meta") else {
        return;
    };

    for meta in metas {
        let mut attributes = meta.attributes.borrow_mut();

        if attributes.contains("charset") {
            attributes.insert("charset", "utf-8".to_string());
        }

        let is_content_type = attributes
            .get("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("content-type"));
        if is_content_type {
            attributes.insert("content", "text/html; charset=utf-8".to_string());
        }
    }
}
