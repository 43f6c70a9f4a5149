//! Decoding of wpiformat's stderr into per-line diagnostics.
//!
//! wpiformat has no structured output mode; failures arrive as free-form
//! text where lines that concern a particular file look like
//!
//! ```text
//! <file path>:<line>: <message>
//! ```
//!
//! The decoder scans for the target file's path as a substring, skips the
//! single separator character that follows it, and reads a `line:message`
//! pair from the remainder. Anything that does not fit the shape is
//! dropped: a line with fewer than two `:`-separated segments after the
//! path is not a diagnostic, and a non-numeric line field is counted in
//! [`DecodeResult::malformed`] instead of producing a record.

/// One diagnostic extracted from the tool's stderr: a 1-based line number
/// and the associated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub line: u32,
    pub message: String,
}

/// Decoded stderr for a single file, in input order, duplicates kept.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodeResult {
    pub errors: Vec<FileError>,
    /// Lines that matched the file path and had a `line:message` shape but
    /// whose line field did not parse as a base-10 integer.
    pub malformed: usize,
}

/// Stderr fragment printed when wpiformat cannot find clang-format.
pub const CLANG_FORMAT_MISSING_FRAGMENT: &str = "clang-format not found in PATH. Is it installed?";

/// Stderr fragment printed when a wrapper script fails to dispatch to
/// wpiformat itself.
pub const WPIFORMAT_MISSING_FRAGMENT: &str = "'wpiformat' is not recognized";

/// Scan `output` for diagnostics that reference `target`, the absolute path
/// of the file that was formatted.
pub fn decode_file_errors(output: &str, target: &str) -> DecodeResult {
    let mut result = DecodeResult::default();

    for line in output.lines() {
        let Some(start) = line.find(target) else {
            continue;
        };
        // Skip exactly one separator character after the matched path. The
        // separator is ASCII (`:` on Unix tool output, occasionally a space);
        // a multi-byte character here is not a diagnostic line.
        let after_file = &line[start + target.len()..];
        let Some(rest) = after_file.get(1..) else {
            continue;
        };
        let segments: Vec<&str> = rest.split(':').collect();
        if segments.len() < 2 {
            continue;
        }
        match segments[0].trim().parse::<u32>() {
            Ok(line_number) => result.errors.push(FileError {
                line: line_number,
                message: segments[1].trim().to_string(),
            }),
            Err(_) => result.malformed += 1,
        }
    }

    result
}

/// Whether stderr reports that clang-format is not installed.
pub fn clang_format_missing(output: &str) -> bool {
    output.contains(CLANG_FORMAT_MISSING_FRAGMENT)
}

/// Whether stderr reports that wpiformat itself is not installed.
pub fn wpiformat_missing(output: &str) -> bool {
    output.contains(WPIFORMAT_MISSING_FRAGMENT)
}
