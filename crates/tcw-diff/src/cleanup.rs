//! Character-level line diff with a readability cleanup pass.
//!
//! The raw Myers script is minimal but often shreds words into alternating
//! one-letter edits. The cleanup folds short equalities that sit between
//! edits into the surrounding change, re-merges the result, and slides lone
//! edits onto word boundaries.

use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::engine::SpanKind;

/// One run of characters with the same edit kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub kind: SpanKind,
    pub text: Vec<char>,
}

impl Edit {
    fn new(kind: SpanKind, text: Vec<char>) -> Self {
        Self { kind, text }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Diff two lines character by character and clean up the script.
///
/// The returned edits cover both lines completely: concatenating the
/// `Equal` and `Delete` runs yields `old`, the `Equal` and `Insert` runs
/// yield `new`.
pub fn line_edits(old: &str, new: &str) -> Vec<Edit> {
    let edits = raw_edits(old, new);
    cleanup_semantic(edits)
}

fn raw_edits(old: &str, new: &str) -> Vec<Edit> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();

    let mut edits = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => edits.push(Edit::new(SpanKind::Equal, old[old_range].to_vec())),
            DiffTag::Delete => edits.push(Edit::new(SpanKind::Delete, old[old_range].to_vec())),
            DiffTag::Insert => edits.push(Edit::new(SpanKind::Insert, new[new_range].to_vec())),
            DiffTag::Replace => {
                edits.push(Edit::new(SpanKind::Delete, old[old_range].to_vec()));
                edits.push(Edit::new(SpanKind::Insert, new[new_range].to_vec()));
            }
        }
    }
    merge(edits)
}

/// Trade minimality for legibility.
pub fn cleanup_semantic(edits: Vec<Edit>) -> Vec<Edit> {
    let mut edits = edits;
    if eliminate_small_equalities(&mut edits) {
        edits = merge(edits);
    }
    align_boundaries(&mut edits);
    merge(edits)
}

/// Fold equalities that are no longer than the edits on both sides of them.
///
/// Returns `true` if anything changed.
fn eliminate_small_equalities(edits: &mut Vec<Edit>) -> bool {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // (inserted, deleted) character counts before and after the last equality.
    let mut before = (0usize, 0usize);
    let mut after = (0usize, 0usize);

    let mut pointer = 0;
    while pointer < edits.len() {
        match edits[pointer].kind {
            SpanKind::Equal => {
                equalities.push(pointer);
                before = after;
                after = (0, 0);
                last_equality = Some(edits[pointer].len());
            }
            kind => {
                if kind == SpanKind::Insert {
                    after.0 += edits[pointer].len();
                } else {
                    after.1 += edits[pointer].len();
                }

                let fold = matches!(
                    last_equality,
                    Some(len) if len > 0
                        && len <= before.0.max(before.1)
                        && len <= after.0.max(after.1)
                );
                if fold {
                    if let Some(eq_index) = equalities.pop() {
                        let text = edits[eq_index].text.clone();
                        edits[eq_index] = Edit::new(SpanKind::Insert, text.clone());
                        edits.insert(eq_index, Edit::new(SpanKind::Delete, text));
                    }
                    // The previous equality must be re-evaluated as well.
                    equalities.pop();
                    before = (0, 0);
                    after = (0, 0);
                    last_equality = None;
                    changed = true;
                    pointer = equalities.last().map(|&p| p + 1).unwrap_or(0);
                    continue;
                }
            }
        }
        pointer += 1;
    }

    changed
}

/// Slide single edits surrounded by equalities onto the most natural boundary.
fn align_boundaries(edits: &mut Vec<Edit>) {
    let mut pointer = 1;
    while pointer + 1 < edits.len() {
        let surrounded = edits[pointer - 1].kind == SpanKind::Equal
            && edits[pointer + 1].kind == SpanKind::Equal
            && edits[pointer].kind != SpanKind::Equal;

        if surrounded {
            let mut eq1 = edits[pointer - 1].text.clone();
            let mut edit = edits[pointer].text.clone();
            let mut eq2 = edits[pointer + 1].text.clone();

            // Shift the edit as far left as possible.
            let shift = common_suffix(&eq1, &edit);
            if shift > 0 {
                let common = edit[edit.len() - shift..].to_vec();
                eq1.truncate(eq1.len() - shift);
                let mut shifted = common.clone();
                shifted.extend_from_slice(&edit[..edit.len() - shift]);
                edit = shifted;
                let mut tail = common;
                tail.extend_from_slice(&eq2);
                eq2 = tail;
            }

            // Step right one character at a time, keeping the best position.
            let mut best = (eq1.clone(), edit.clone(), eq2.clone());
            let mut best_score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
            while !edit.is_empty() && !eq2.is_empty() && edit[0] == eq2[0] {
                eq1.push(edit[0]);
                edit.remove(0);
                edit.push(eq2.remove(0));
                let score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
                if score >= best_score {
                    best_score = score;
                    best = (eq1.clone(), edit.clone(), eq2.clone());
                }
            }

            let (best_eq1, best_edit, best_eq2) = best;
            if edits[pointer - 1].text != best_eq1 {
                if best_eq1.is_empty() {
                    edits.remove(pointer - 1);
                    pointer -= 1;
                } else {
                    edits[pointer - 1].text = best_eq1;
                }
                edits[pointer].text = best_edit;
                if best_eq2.is_empty() {
                    edits.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    edits[pointer + 1].text = best_eq2;
                }
            }
        }
        pointer += 1;
    }
}

/// Score how natural a boundary between `one` and `two` is (0 worst, 6 best).
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };
    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();

    if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Coalesce runs of the same kind, order deletes before inserts, and factor
/// shared prefixes and suffixes of a replacement back into equalities.
fn merge(edits: Vec<Edit>) -> Vec<Edit> {
    let mut out: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut deleted: Vec<char> = Vec::new();
    let mut inserted: Vec<char> = Vec::new();

    for edit in edits {
        match edit.kind {
            SpanKind::Delete => deleted.extend(edit.text),
            SpanKind::Insert => inserted.extend(edit.text),
            SpanKind::Equal => {
                flush(&mut out, &mut deleted, &mut inserted);
                push_equal(&mut out, edit.text);
            }
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);
    out
}

fn flush(out: &mut Vec<Edit>, deleted: &mut Vec<char>, inserted: &mut Vec<char>) {
    let mut suffix = Vec::new();
    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix(deleted, inserted);
        if prefix > 0 {
            push_equal(out, deleted[..prefix].to_vec());
            deleted.drain(..prefix);
            inserted.drain(..prefix);
        }
        let tail = common_suffix(deleted, inserted);
        if tail > 0 {
            suffix = deleted[deleted.len() - tail..].to_vec();
            deleted.truncate(deleted.len() - tail);
            inserted.truncate(inserted.len() - tail);
        }
    }
    if !deleted.is_empty() {
        out.push(Edit::new(SpanKind::Delete, std::mem::take(deleted)));
    }
    if !inserted.is_empty() {
        out.push(Edit::new(SpanKind::Insert, std::mem::take(inserted)));
    }
    push_equal(out, suffix);
}

fn push_equal(out: &mut Vec<Edit>, text: Vec<char>) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.kind == SpanKind::Equal => last.text.extend(text),
        _ => out.push(Edit::new(SpanKind::Equal, text)),
    }
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(edits: &[Edit]) -> Vec<(SpanKind, String)> {
        edits
            .iter()
            .map(|e| (e.kind, e.text.iter().collect()))
            .collect()
    }

    fn side(edits: &[Edit], skip: SpanKind) -> String {
        edits
            .iter()
            .filter(|e| e.kind != skip)
            .flat_map(|e| e.text.iter())
            .collect()
    }

    #[test]
    fn single_substitution_stays_minimal() {
        let edits = line_edits("cat", "cot");
        assert_eq!(
            render(&edits),
            vec![
                (SpanKind::Equal, "c".into()),
                (SpanKind::Delete, "a".into()),
                (SpanKind::Insert, "o".into()),
                (SpanKind::Equal, "t".into()),
            ]
        );
    }

    #[test]
    fn edits_cover_both_lines() {
        let old = "Sehr geehrter Herr Müller,";
        let new = "Sehr verehrte Frau Muller;";
        let edits = line_edits(old, new);
        assert_eq!(side(&edits, SpanKind::Insert), old);
        assert_eq!(side(&edits, SpanKind::Delete), new);
    }

    #[test]
    fn scattered_letters_fold_into_word_replacement() {
        // Raw Myers keeps the shared letters and produces many tiny edits.
        let edits = line_edits("abcxyz", "1b2x3z");
        assert_eq!(
            render(&edits),
            vec![
                (SpanKind::Delete, "abcxy".into()),
                (SpanKind::Insert, "1b2x3".into()),
                (SpanKind::Equal, "z".into()),
            ]
        );
    }

    #[test]
    fn lone_insertion_slides_to_word_boundary() {
        let edits = line_edits("The cat came.", "The cat cat came.");
        let inserted: Vec<String> = edits
            .iter()
            .filter(|e| e.kind == SpanKind::Insert)
            .map(|e| e.text.iter().collect())
            .collect();
        assert_eq!(inserted.len(), 1);
        let text = &inserted[0];
        assert!(text == "cat " || text == " cat", "unexpected boundary: {text:?}");
    }

    #[test]
    fn identical_lines_yield_single_equality() {
        let edits = line_edits("same", "same");
        assert_eq!(render(&edits), vec![(SpanKind::Equal, "same".into())]);
    }

    #[test]
    fn empty_sides() {
        assert_eq!(render(&line_edits("", "new")), vec![(SpanKind::Insert, "new".into())]);
        assert_eq!(render(&line_edits("old", "")), vec![(SpanKind::Delete, "old".into())]);
        assert!(line_edits("", "").is_empty());
    }

    #[test]
    fn merge_factors_common_affixes() {
        let edits = vec![
            Edit::new(SpanKind::Delete, "abXcd".chars().collect()),
            Edit::new(SpanKind::Insert, "abYcd".chars().collect()),
        ];
        assert_eq!(
            render(&merge(edits)),
            vec![
                (SpanKind::Equal, "ab".into()),
                (SpanKind::Delete, "X".into()),
                (SpanKind::Insert, "Y".into()),
                (SpanKind::Equal, "cd".into()),
            ]
        );
    }

    #[test]
    fn boundary_scores() {
        let a: Vec<char> = "word".chars().collect();
        let space: Vec<char> = " next".chars().collect();
        let inner: Vec<char> = "rd".chars().collect();
        assert_eq!(boundary_score(&[], &a), 6);
        assert_eq!(boundary_score(&a, &space), 2);
        assert_eq!(boundary_score(&a, &inner), 0);
    }
}
