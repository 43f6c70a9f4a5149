//! LSP type helpers for wpifmt.

use tower_lsp::lsp_types::*;

use crate::decode::FileError;

/// Command identifier for the explicit "format this file" request.
pub const FORMAT_FILE_COMMAND: &str = "wpifmt.formatFile";

/// Diagnostic source label shown next to each entry in the editor.
pub const DIAGNOSTIC_SOURCE: &str = "wpifmt";

/// Convert a decoded formatter error to an LSP diagnostic.
///
/// The formatter reports 1-based lines with no column information, so the
/// range spans the whole line; clients clamp the character bound to the
/// actual line length.
pub fn file_error_to_diagnostic(error: &FileError) -> Diagnostic {
    let line = error.line.saturating_sub(1);
    Diagnostic {
        range: Range {
            start: Position { line, character: 0 },
            end: Position {
                line,
                character: u32::MAX,
            },
        },
        severity: Some(DiagnosticSeverity::ERROR),
        code: None,
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: error.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Build a single edit replacing the entire document text.
pub fn replace_whole_document(old_text: &str, new_text: String) -> TextEdit {
    TextEdit {
        range: Range {
            start: Position { line: 0, character: 0 },
            end: end_position(old_text),
        },
        new_text,
    }
}

/// Position just past the last character of `text`, in LSP terms
/// (0-based line, UTF-16 column).
fn end_position(text: &str) -> Position {
    let mut line = 0u32;
    let mut last_line_start = 0usize;
    for (index, ch) in text.char_indices() {
        if ch == '\n' {
            line += 1;
            last_line_start = index + 1;
        }
    }
    let character = text[last_line_start..].encode_utf16().count() as u32;
    Position { line, character }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_document_edit_spans_every_line() {
        let edit = replace_whole_document("one\r\ntwo\r\n", "one\ntwo\n".to_string());
        assert_eq!(edit.range.start, Position { line: 0, character: 0 });
        assert_eq!(edit.range.end, Position { line: 2, character: 0 });
        assert_eq!(edit.new_text, "one\ntwo\n");
    }

    #[test]
    fn diagnostic_line_is_zero_based() {
        let diagnostic = file_error_to_diagnostic(&FileError {
            line: 42,
            message: "missing semicolon".to_string(),
        });
        assert_eq!(diagnostic.range.start.line, 41);
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic.source, Some("wpifmt".to_string()));
    }
}
