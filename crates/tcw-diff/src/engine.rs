//! Positional line diff between the two comparison surfaces.
//!
//! Lines are paired by index only; there is no alignment search. Each pair
//! that differs is diffed character by character (see [`crate::cleanup`]),
//! and the resulting runs are laid out as spans on the left (deletions) and
//! right (insertions) surfaces.

use serde::{Deserialize, Serialize};
use tcw_types::Surface;

use crate::cleanup::line_edits;

/// Edit kind of a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKind {
    Equal,
    Delete,
    Insert,
}

/// A run of characters on one surface line.
///
/// `offset` and `len` count characters, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub line: usize,
    pub offset: usize,
    pub len: usize,
}

impl DiffSpan {
    /// One past the last character of the span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Navigation anchor: the first insertion on a differing line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffIndexEntry {
    pub line: usize,
    pub offset: usize,
}

/// The complete result of comparing the two surfaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOutput {
    /// Equal and delete spans, in line order.
    pub left_spans: Vec<DiffSpan>,
    /// Equal and insert spans, in line order.
    pub right_spans: Vec<DiffSpan>,
    /// One entry per line with at least one insertion.
    pub index: Vec<DiffIndexEntry>,
    /// Number of line pairs that differ (with or without insertions).
    pub changed_lines: usize,
}

impl DiffOutput {
    /// Returns `true` if the two texts are identical line by line.
    pub fn is_identical(&self) -> bool {
        self.changed_lines == 0
    }

    pub fn spans(&self, surface: Surface) -> &[DiffSpan] {
        match surface {
            Surface::Left => &self.left_spans,
            Surface::Right => &self.right_spans,
        }
    }

    /// Spans on `line` for one surface.
    pub fn spans_on_line(&self, surface: Surface, line: usize) -> impl Iterator<Item = &DiffSpan> {
        self.spans(surface).iter().filter(move |s| s.line == line)
    }

    /// Total characters deleted from the left surface.
    pub fn deleted_chars(&self) -> usize {
        self.left_spans
            .iter()
            .filter(|s| s.kind == SpanKind::Delete)
            .map(|s| s.len)
            .sum()
    }

    /// Total characters inserted on the right surface.
    pub fn inserted_chars(&self) -> usize {
        self.right_spans
            .iter()
            .filter(|s| s.kind == SpanKind::Insert)
            .map(|s| s.len)
            .sum()
    }
}

/// Compare two texts line by line.
///
/// Pure and total: the same inputs always produce the same output.
pub fn compute(left: &str, right: &str) -> DiffOutput {
    let left_lines: Vec<&str> = left.split('\n').collect();
    let right_lines: Vec<&str> = right.split('\n').collect();
    let line_count = left_lines.len().max(right_lines.len());

    let mut out = DiffOutput::default();
    for line in 0..line_count {
        let old = left_lines.get(line).copied().unwrap_or("");
        let new = right_lines.get(line).copied().unwrap_or("");
        if old == new {
            continue;
        }
        out.changed_lines += 1;

        let mut left_offset = 0;
        let mut right_offset = 0;
        let mut anchor = None;

        for edit in line_edits(old, new) {
            let len = edit.len();
            match edit.kind {
                SpanKind::Equal => {
                    out.left_spans.push(DiffSpan { kind: SpanKind::Equal, line, offset: left_offset, len });
                    out.right_spans.push(DiffSpan { kind: SpanKind::Equal, line, offset: right_offset, len });
                    left_offset += len;
                    right_offset += len;
                }
                SpanKind::Delete => {
                    out.left_spans.push(DiffSpan { kind: SpanKind::Delete, line, offset: left_offset, len });
                    left_offset += len;
                }
                SpanKind::Insert => {
                    out.right_spans.push(DiffSpan { kind: SpanKind::Insert, line, offset: right_offset, len });
                    anchor.get_or_insert(DiffIndexEntry { line, offset: right_offset });
                    right_offset += len;
                }
            }
        }

        // Lines with deletions only get no navigation entry.
        if let Some(entry) = anchor {
            out.index.push(entry);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(spans: &[DiffSpan], kind: SpanKind) -> Vec<DiffSpan> {
        spans.iter().copied().filter(|s| s.kind == kind).collect()
    }

    #[test]
    fn identical_texts_no_diff() {
        let text = "Hochwohlgeborener Herr\nich beehre mich\n\nIhnen mitzuteilen";
        let diff = compute(text, text);
        assert!(diff.is_identical());
        assert!(diff.index.is_empty());
        assert!(diff.left_spans.is_empty());
        assert!(diff.right_spans.is_empty());
    }

    #[test]
    fn single_character_substitution() {
        let diff = compute("cat", "cot");
        let deletes = kinds(&diff.left_spans, SpanKind::Delete);
        let inserts = kinds(&diff.right_spans, SpanKind::Insert);
        assert_eq!(deletes, vec![DiffSpan { kind: SpanKind::Delete, line: 0, offset: 1, len: 1 }]);
        assert_eq!(inserts, vec![DiffSpan { kind: SpanKind::Insert, line: 0, offset: 1, len: 1 }]);
        assert_eq!(diff.index, vec![DiffIndexEntry { line: 0, offset: 1 }]);
    }

    #[test]
    fn lines_compared_by_position_only() {
        // A shifted line is not realigned: every following line differs.
        let left = "a\nb\nc";
        let right = "x\na\nb\nc";
        let diff = compute(left, right);
        assert_eq!(diff.changed_lines, 4);
        let lines: Vec<usize> = diff.index.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![0, 1, 2, 3]);
    }

    #[test]
    fn shorter_side_padded_with_empty_lines() {
        let diff = compute("one\ntwo\nthree", "one");
        // Lines 1 and 2 differ but only by deletion: no navigation entries.
        assert_eq!(diff.changed_lines, 2);
        assert!(diff.index.is_empty());
        assert_eq!(kinds(&diff.left_spans, SpanKind::Delete).len(), 2);
    }

    #[test]
    fn deletion_only_line_has_no_index_entry() {
        let diff = compute("alpha\nbeta gamma", "alpha\nbeta");
        assert_eq!(diff.changed_lines, 1);
        assert!(diff.index.is_empty());
        assert_eq!(diff.deleted_chars(), " gamma".chars().count());
        assert_eq!(diff.inserted_chars(), 0);
    }

    #[test]
    fn index_anchor_is_first_insertion() {
        let diff = compute("x\nDer Brief kam an", "x\nDer lange Brief kam heute an");
        assert_eq!(diff.index.len(), 1);
        let entry = diff.index[0];
        assert_eq!(entry.line, 1);
        let first_insert = diff
            .spans_on_line(Surface::Right, 1)
            .find(|s| s.kind == SpanKind::Insert)
            .copied()
            .unwrap();
        assert_eq!(entry.offset, first_insert.offset);
    }

    #[test]
    fn spans_partition_each_changed_line() {
        let left = "Sehr geehrter Herr\nunverändert\nMit freundlichen Grüßen";
        let right = "Sehr verehrter Herr\nunverändert\nMit besten Grüßen!";
        let diff = compute(left, right);

        for (surface, text) in [(Surface::Left, left), (Surface::Right, right)] {
            for (line, content) in text.split('\n').enumerate() {
                let spans: Vec<&DiffSpan> = diff.spans_on_line(surface, line).collect();
                if spans.is_empty() {
                    continue;
                }
                let mut cursor = 0;
                for span in &spans {
                    assert_eq!(span.offset, cursor, "gap on {surface} line {line}");
                    cursor = span.end();
                }
                assert_eq!(cursor, content.chars().count());
            }
        }
    }

    #[test]
    fn offsets_count_characters() {
        let diff = compute("Größe", "Grüße");
        let inserts = kinds(&diff.right_spans, SpanKind::Insert);
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].offset, 2);
        assert_eq!(inserts[0].len, 1);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let left = "eins\nzwei\ndrei";
        let right = "eins\nzwo\ndrey\nvier";
        assert_eq!(compute(left, right), compute(left, right));
    }

    #[test]
    fn empty_inputs() {
        assert!(compute("", "").is_identical());
        let diff = compute("", "neu");
        assert_eq!(diff.index, vec![DiffIndexEntry { line: 0, offset: 0 }]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn identical_inputs_never_diff(lines in prop::collection::vec("[a-zA-Zäöü .,]{0,20}", 0..30)) {
                let text = lines.join("\n");
                let diff = compute(&text, &text);
                prop_assert!(diff.index.is_empty());
                prop_assert!(diff.is_identical());
            }

            #[test]
            fn spans_rebuild_both_lines(old in "[a-e ]{0,16}", new in "[a-e ]{0,16}") {
                let diff = compute(&old, &new);
                let left_len: usize = diff.left_spans.iter().map(|s| s.len).sum();
                let right_len: usize = diff.right_spans.iter().map(|s| s.len).sum();
                if old != new {
                    prop_assert_eq!(left_len, old.chars().count());
                    prop_assert_eq!(right_len, new.chars().count());
                }
                prop_assert!(diff.index.len() <= 1);
            }
        }
    }
}
