//! Incremental content synchronization.

use super::state::Document;
use hms_core::position::range_to_offsets;
use tower_lsp_server::ls_types::{Range, TextDocumentContentChangeEvent};

/// One edit from a `textDocument/didChange` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOp {
    /// Replace the text covered by `range`.
    RangeReplace { range: Range, text: String },
    /// Replace the whole document.
    WholeReplace { text: String },
}

impl From<TextDocumentContentChangeEvent> for ChangeOp {
    fn from(event: TextDocumentContentChangeEvent) -> Self {
        match event.range {
            Some(range) => Self::RangeReplace {
                range,
                text: event.text,
            },
            None => Self::WholeReplace { text: event.text },
        }
    }
}

impl ChangeOp {
    /// Applies this edit to `content`.
    ///
    /// Range ends are clamped to the content, so an out-of-range edit
    /// degrades to an insertion or append instead of failing.
    fn apply_to(self, content: &str) -> String {
        match self {
            Self::RangeReplace { range, text } => {
                let (start, end) = range_to_offsets(content, range);
                let mut updated = String::with_capacity(content.len() - (end - start) + text.len());
                updated.push_str(&content[..start]);
                updated.push_str(&text);
                updated.push_str(&content[end..]);
                updated
            }
            Self::WholeReplace { text } => text,
        }
    }
}

/// Applies a batch of edits in order and stamps the document with `revision`.
///
/// Each edit's positions refer to the content produced by the previous one.
/// The line index is dropped after every edit.
pub fn apply_changes(
    doc: &mut Document,
    changes: impl IntoIterator<Item = ChangeOp>,
    revision: u64,
) {
    let mut applied = 0usize;
    for change in changes {
        let updated = change.apply_to(doc.content());
        doc.replace_content(updated);
        applied += 1;
    }

    doc.mark_changed(revision);
    tracing::trace!(
        "applied {} changes to {} (revision {})",
        applied,
        doc.path(),
        revision
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tower_lsp_server::ls_types::{Position, Uri};

    fn document(content: &str) -> Document {
        Document::new(
            Uri::from_str("file:///test/main.hms").unwrap(),
            "/test/main.hms".into(),
            content.into(),
            1,
        )
    }

    fn replace(start: (u32, u32), end: (u32, u32), text: &str) -> ChangeOp {
        ChangeOp::RangeReplace {
            range: Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1)),
            text: text.into(),
        }
    }

    #[test]
    fn test_from_event_with_range() {
        let range = Range::new(Position::new(0, 1), Position::new(0, 2));
        let event = TextDocumentContentChangeEvent {
            range: Some(range),
            range_length: None,
            text: "x".into(),
        };

        assert_eq!(
            ChangeOp::from(event),
            ChangeOp::RangeReplace {
                range,
                text: "x".into()
            }
        );
    }

    #[test]
    fn test_from_event_without_range() {
        let event = TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "whole".into(),
        };

        assert_eq!(
            ChangeOp::from(event),
            ChangeOp::WholeReplace {
                text: "whole".into()
            }
        );
    }

    #[test]
    fn test_range_replace() {
        let mut doc = document("let x = 1;\nprint(x);");
        apply_changes(&mut doc, [replace((1, 6), (1, 7), "x + 1")], 2);
        assert_eq!(doc.content(), "let x = 1;\nprint(x + 1);");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut doc = document("abc");
        apply_changes(&mut doc, [replace((0, 3), (0, 3), "d")], 2);
        assert_eq!(doc.content(), "abcd");

        apply_changes(&mut doc, [replace((0, 0), (0, 2), "")], 3);
        assert_eq!(doc.content(), "cd");
    }

    #[test]
    fn test_whole_replace() {
        let mut doc = document("old");
        apply_changes(
            &mut doc,
            [ChangeOp::WholeReplace {
                text: "brand new".into(),
            }],
            2,
        );
        assert_eq!(doc.content(), "brand new");
    }

    #[test]
    fn test_changes_apply_in_order() {
        let insert = replace((0, 0), (0, 0), "X");
        let overwrite = replace((0, 1), (0, 2), "Y");

        let mut forward = document("abc");
        apply_changes(&mut forward, [insert.clone(), overwrite.clone()], 2);

        let mut backward = document("abc");
        apply_changes(&mut backward, [overwrite, insert], 2);

        assert_eq!(forward.content(), "XYbc");
        assert_eq!(backward.content(), "XaYc");
        assert_ne!(forward.content(), backward.content());
    }

    #[test]
    fn test_later_change_sees_new_lines() {
        let mut doc = document("one");
        apply_changes(
            &mut doc,
            [
                replace((0, 3), (0, 3), "\ntwo"),
                replace((1, 0), (1, 3), "TWO"),
            ],
            2,
        );
        assert_eq!(doc.content(), "one\nTWO");
    }

    #[test]
    fn test_line_cache_reflects_applied_changes() {
        let mut doc = document("first");
        assert_eq!(doc.line_at(0), Some("first"));
        assert_eq!(doc.line_at(1), None);

        apply_changes(&mut doc, [replace((0, 5), (0, 5), "\nsecond")], 2);

        assert_eq!(doc.line_at(0), Some("first"));
        assert_eq!(doc.line_at(1), Some("second"));
    }

    #[test]
    fn test_crlf_range_replace() {
        let mut doc = document("a = 1\r\nb = 2\r\n");
        apply_changes(&mut doc, [replace((1, 4), (1, 5), "3")], 2);
        assert_eq!(doc.content(), "a = 1\r\nb = 3\r\n");
    }

    #[test]
    fn test_utf16_range_replace() {
        let mut doc = document("print('😀!')");
        // '😀' occupies UTF-16 columns 7 and 8
        apply_changes(&mut doc, [replace((0, 7), (0, 9), "ok")], 2);
        assert_eq!(doc.content(), "print('ok!')");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut doc = document("ab\ncd");
        apply_changes(&mut doc, [replace((0, 10), (0, 20), "!")], 2);
        assert_eq!(doc.content(), "ab!\ncd");

        apply_changes(&mut doc, [replace((9, 0), (12, 4), "\nef")], 3);
        assert_eq!(doc.content(), "ab!\ncd\nef");
    }

    #[test]
    fn test_inverted_range_inserts_at_start() {
        let mut doc = document("abc");
        apply_changes(&mut doc, [replace((0, 2), (0, 1), "Z")], 2);
        assert_eq!(doc.content(), "abZc");
    }

    #[test]
    fn test_apply_marks_document_stale() {
        let mut doc = document("x");
        doc.mark_refreshed(vec![]);

        apply_changes(&mut doc, [replace((0, 0), (0, 0), "y")], 5);
        assert!(doc.needs_refresh);
        assert_eq!(doc.revision(), 5);
    }
}
