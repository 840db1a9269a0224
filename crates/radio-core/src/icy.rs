//! ICY title extraction from the player's log output.
//!
//! With `--msg-level=icy=info` mpv prints a line such as
//! `icy-title: Artist - Track` every time the stream's in-band metadata
//! changes. Everything else on the output stream is ignored.

/// Literal prefix of a title-metadata line.
pub const ICY_TITLE_MARKER: &str = "icy-title:";

/// Returns the track title carried by `line`, or `None` when the line is not a
/// title marker or the title is blank.
pub fn extract_title(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(ICY_TITLE_MARKER)?;
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}
