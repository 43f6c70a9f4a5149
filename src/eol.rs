//! Line-ending normalization applied before a document is saved.
//!
//! When enabled, documents that still carry CRLF endings are rewritten to
//! LF as part of the save, unless their file name matches one of the
//! configured exemption globs.

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compile the exemption patterns into a matcher over file names.
///
/// Patterns that fail to compile are skipped with a warning; an empty or
/// fully invalid list yields a matcher that exempts nothing.
pub fn build_ignore_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                log::warn!("ignoring invalid pattern {pattern:?} in ignoreForceLFSaveFiles: {e}");
            }
        }
    }
    builder.build().unwrap_or_else(|e| {
        log::warn!("failed to build ignoreForceLFSaveFiles matcher: {e}");
        GlobSet::empty()
    })
}

/// Whether the text still uses the CRLF convention anywhere.
pub fn has_crlf(text: &str) -> bool {
    text.contains("\r\n")
}

/// Rewrite all CRLF sequences to LF. Lone carriage returns are left alone;
/// only the Windows convention is normalized.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}
