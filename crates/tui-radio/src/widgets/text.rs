//! Display-width aware text helpers.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Longest prefix of `text` that fits in `max` terminal columns.
/// Never splits a character; wide glyphs that would overflow are dropped.
pub fn truncate_to_width(text: &str, max: usize) -> &str {
    if text.width() <= max {
        return text;
    }
    let mut used = 0;
    let mut end = 0;
    for (i, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        end = i + ch.len_utf8();
    }
    &text[..end]
}
