//! Cursor navigation over the diff index, and whole-line merges between
//! the two surfaces.

use tcw_types::Surface;

use crate::engine::{DiffIndexEntry, DiffOutput, DiffSpan};

/// Transient emphasis for the line under the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Highlight {
    /// The emphasised line.
    pub line: usize,
    /// Every span on that line, on both surfaces.
    pub marks: Vec<(Surface, DiffSpan)>,
    /// Where the view should scroll to.
    pub scroll_to: DiffIndexEntry,
}

/// Cursor over the navigation index.
///
/// The cursor starts unset; `next` and `prev` never wrap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffNavigator {
    entries: Vec<DiffIndexEntry>,
    cursor: Option<usize>,
}

impl DiffNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator over `entries` with no entry selected.
    pub fn with_index(entries: Vec<DiffIndexEntry>) -> Self {
        Self { entries, cursor: None }
    }

    pub fn entries(&self) -> &[DiffIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&DiffIndexEntry> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Advance to the next entry. Returns `false` at the last entry.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next < self.entries.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Step back to the previous entry. Returns `false` at the first entry
    /// or when nothing is selected.
    pub fn prev(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Replace the index after a recomputation, keeping the cursor at
    /// `min(previous, len - 1)`.
    pub fn refresh_clamped(&mut self, entries: Vec<DiffIndexEntry>) {
        self.entries = entries;
        self.cursor = match (self.cursor, self.entries.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => None,
        };
    }

    /// Replace the index and select its first entry, if any.
    pub fn refresh_select_first(&mut self, entries: Vec<DiffIndexEntry>) {
        self.entries = entries;
        self.cursor = if self.entries.is_empty() { None } else { Some(0) };
    }

    /// Emphasis for every span on the cursor's line. `None` without a cursor.
    pub fn highlight_current(&self, diff: &DiffOutput) -> Option<Highlight> {
        let entry = *self.current()?;
        let marks = Surface::BOTH
            .into_iter()
            .flat_map(|surface| {
                diff.spans_on_line(surface, entry.line)
                    .map(move |span| (surface, *span))
            })
            .collect();
        Some(Highlight { line: entry.line, marks, scroll_to: entry })
    }

    /// Copy the cursor's line from `source` over the same line of the other
    /// surface. Returns the merged line index, or `None` without a cursor.
    ///
    /// The caller is responsible for scheduling the recomputation.
    pub fn merge_line(&self, source: Surface, left: &mut String, right: &mut String) -> Option<usize> {
        let line = self.current()?.line;
        let replacement = match source {
            Surface::Left => line_at(left, line),
            Surface::Right => line_at(right, line),
        }
        .to_string();

        let destination = match source {
            Surface::Left => right,
            Surface::Right => left,
        };
        *destination = replace_line(destination, line, &replacement);
        Some(line)
    }
}

/// The `line`-th line of `text`, or `""` past the end.
pub fn line_at(text: &str, line: usize) -> &str {
    text.split('\n').nth(line).unwrap_or("")
}

/// `text` with line `line` replaced, padding with empty lines if needed.
pub fn replace_line(text: &str, line: usize, replacement: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= line {
        lines.resize(line + 1, "");
    }
    lines[line] = replacement;
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute;

    fn navigator_for(left: &str, right: &str) -> (DiffNavigator, DiffOutput) {
        let diff = compute(left, right);
        (DiffNavigator::with_index(diff.index.clone()), diff)
    }

    #[test]
    fn next_walks_to_last_entry_without_wrapping() {
        let (mut nav, _) = navigator_for("a\nb\nc", "x\ny\nz");
        assert_eq!(nav.len(), 3);
        assert_eq!(nav.cursor(), None);

        for _ in 0..3 {
            assert!(nav.next());
        }
        assert_eq!(nav.cursor(), Some(2));
        assert!(!nav.next());
        assert_eq!(nav.cursor(), Some(2));
    }

    #[test]
    fn prev_from_unset_is_noop() {
        let (mut nav, _) = navigator_for("a\nb", "x\ny");
        assert!(!nav.prev());
        assert_eq!(nav.cursor(), None);

        nav.next();
        nav.next();
        assert!(nav.prev());
        assert_eq!(nav.cursor(), Some(0));
        assert!(!nav.prev());
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn empty_index_never_moves() {
        let (mut nav, _) = navigator_for("same", "same");
        assert!(!nav.next());
        assert!(!nav.prev());
        assert_eq!(nav.current(), None);
    }

    #[test]
    fn highlight_marks_both_surfaces_on_cursor_line() {
        let (mut nav, diff) = navigator_for("eins\nzwei", "eins\nzwo");
        assert!(nav.highlight_current(&diff).is_none());

        nav.next();
        let hl = nav.highlight_current(&diff).unwrap();
        assert_eq!(hl.line, 1);
        assert_eq!(hl.scroll_to, diff.index[0]);
        assert!(hl.marks.iter().any(|(s, _)| *s == Surface::Left));
        assert!(hl.marks.iter().any(|(s, _)| *s == Surface::Right));
        assert!(hl.marks.iter().all(|(_, span)| span.line == 1));
    }

    #[test]
    fn merge_left_to_right_equalises_line() {
        let mut left = String::from("Anfang\nDer Brief\nEnde");
        let mut right = String::from("Anfang\nDer Bricf\nEnde");
        let (mut nav, _) = navigator_for(&left, &right);
        nav.next();

        let merged = nav.merge_line(Surface::Left, &mut left, &mut right);
        assert_eq!(merged, Some(1));
        assert_eq!(line_at(&left, 1), line_at(&right, 1));
        assert!(compute(&left, &right).index.is_empty());
    }

    #[test]
    fn merge_right_to_left() {
        let mut left = String::from("x\nold");
        let mut right = String::from("x\nnew");
        let (mut nav, _) = navigator_for(&left, &right);
        nav.next();
        nav.merge_line(Surface::Right, &mut left, &mut right);
        assert_eq!(left, "x\nnew");
        assert_eq!(right, "x\nnew");
    }

    #[test]
    fn merge_without_cursor_is_noop() {
        let mut left = String::from("a");
        let mut right = String::from("b");
        let (nav, _) = navigator_for(&left, &right);
        assert_eq!(nav.merge_line(Surface::Left, &mut left, &mut right), None);
        assert_eq!(left, "a");
        assert_eq!(right, "b");
    }

    #[test]
    fn merge_pads_shorter_destination() {
        let mut left = String::from("a");
        let mut right = String::from("a\n\nextra");
        let (mut nav, _) = navigator_for(&left, &right);
        nav.next();
        assert_eq!(nav.current().unwrap().line, 2);
        nav.merge_line(Surface::Right, &mut left, &mut right);
        assert_eq!(left, "a\n\nextra");
    }

    #[test]
    fn refresh_clamps_cursor() {
        let (mut nav, _) = navigator_for("a\nb\nc", "x\ny\nz");
        nav.next();
        nav.next();
        nav.next();
        nav.refresh_clamped(compute("a\nb", "x\nb").index);
        assert_eq!(nav.cursor(), Some(0));

        nav.refresh_clamped(Vec::new());
        assert_eq!(nav.cursor(), None);
    }

    #[test]
    fn refresh_keeps_unset_cursor_unset() {
        let mut nav = DiffNavigator::new();
        nav.refresh_clamped(compute("a", "b").index);
        assert_eq!(nav.cursor(), None);
        nav.refresh_select_first(compute("a", "b").index);
        assert_eq!(nav.cursor(), Some(0));
        nav.refresh_select_first(Vec::new());
        assert_eq!(nav.cursor(), None);
    }

    #[test]
    fn replace_line_helpers() {
        assert_eq!(replace_line("a\nb", 1, "c"), "a\nc");
        assert_eq!(replace_line("a", 2, "c"), "a\n\nc");
        assert_eq!(line_at("a\nb", 5), "");
    }
}
