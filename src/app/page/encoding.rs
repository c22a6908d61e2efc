//! Decoding of page bytes
//!
//! Exported pages use a legacy single-byte encoding. Pages rewritten by an
//! earlier run are UTF-8, so valid UTF-8 input is taken as is.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Looks up an encoding by its WHATWG label (e.g. `windows-1251`, `cp1251`)
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Decodes page bytes, falling back to `legacy` when they are not UTF-8
pub fn decode_page<'a>(bytes: &'a [u8], legacy: &'static Encoding) -> Cow<'a, str> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return encoding
            .decode_without_bom_handling(&bytes[bom_length..])
            .0;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => legacy.decode_without_bom_handling(bytes).0,
    }
}
