//! Utility functions and helpers.

pub mod http;
pub mod url;

/// Longest file name produced by [`sanitize_filename`].
pub const MAX_FILENAME_LEN: usize = 200;

/// Make a title safe to use as a file name.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`, runs of `_` collapse,
/// and the result is cut to [`MAX_FILENAME_LEN`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.chars().take(MAX_FILENAME_LEN).collect()
}

/// Collapse internal whitespace and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
