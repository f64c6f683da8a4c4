use tokio::time::Instant;
use tracing::debug;

use tcw_diff::{compute, DiffNavigator, DiffOutput, Highlight};
use tcw_types::Surface;

/// Where the cursor lands after a deferred recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CursorPolicy {
    /// Keep the cursor, clamped to the new index.
    Clamp,
    /// Select and highlight the first entry.
    SelectFirst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingRecompute {
    deadline: Instant,
    policy: CursorPolicy,
}

/// The two comparison surfaces with their current diff and cursor.
///
/// Content changes never recompute the diff directly; they schedule a pass
/// that runs once [`settle`](Self::settle) is called at or after its deadline.
#[derive(Clone, Debug, Default)]
pub struct ComparisonView {
    left: String,
    right: String,
    diff: DiffOutput,
    navigator: DiffNavigator,
    highlight: Option<Highlight>,
    pending: Option<PendingRecompute>,
}

impl ComparisonView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, surface: Surface) -> &str {
        match surface {
            Surface::Left => &self.left,
            Surface::Right => &self.right,
        }
    }

    pub fn diff(&self) -> &DiffOutput {
        &self.diff
    }

    pub fn navigator(&self) -> &DiffNavigator {
        &self.navigator
    }

    pub fn cursor(&self) -> Option<usize> {
        self.navigator.cursor()
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Deadline of the scheduled recomputation, if one is pending.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Replace a surface's content and schedule a pass that selects the
    /// first difference.
    pub fn load(&mut self, surface: Surface, text: impl Into<String>, deadline: Instant) {
        *self.text_mut(surface) = text.into();
        self.schedule(deadline, CursorPolicy::SelectFirst);
    }

    /// Apply a user edit. Each edit pushes the pass back to `deadline`.
    pub fn edit(&mut self, surface: Surface, text: impl Into<String>, deadline: Instant) {
        *self.text_mut(surface) = text.into();
        self.schedule(deadline, CursorPolicy::Clamp);
    }

    /// Copy the cursor's line from `source` to the other surface.
    ///
    /// A pending recomputation runs first so the cursor points into the
    /// current index.
    pub fn merge_line(&mut self, source: Surface, deadline: Instant) -> Option<usize> {
        self.flush();
        let line = self.navigator.merge_line(source, &mut self.left, &mut self.right)?;
        debug!(line, source = %source, "merged line");
        self.schedule(deadline, CursorPolicy::Clamp);
        Some(line)
    }

    /// Step to the next difference, flushing a pending recomputation first.
    pub fn next(&mut self) -> bool {
        self.flush();
        let moved = self.navigator.next();
        if moved {
            self.highlight = self.navigator.highlight_current(&self.diff);
        }
        moved
    }

    pub fn prev(&mut self) -> bool {
        self.flush();
        let moved = self.navigator.prev();
        if moved {
            self.highlight = self.navigator.highlight_current(&self.diff);
        }
        moved
    }

    /// Empty both surfaces and drop the diff.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Run the pending pass if its deadline has been reached.
    ///
    /// Returns `true` if a recomputation ran.
    pub fn settle(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if pending.deadline <= now => {
                self.pending = None;
                self.recompute(pending.policy);
                true
            }
            _ => false,
        }
    }

    /// Run the pending pass immediately, whatever its deadline.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.recompute(pending.policy);
                true
            }
            None => false,
        }
    }

    fn schedule(&mut self, deadline: Instant, policy: CursorPolicy) {
        let policy = self.pending.map_or(policy, |p| p.policy.max(policy));
        self.pending = Some(PendingRecompute { deadline, policy });
    }

    fn recompute(&mut self, policy: CursorPolicy) {
        self.diff = compute(&self.left, &self.right);
        self.highlight = None;
        let index = self.diff.index.clone();
        match policy {
            CursorPolicy::Clamp => self.navigator.refresh_clamped(index),
            CursorPolicy::SelectFirst => {
                self.navigator.refresh_select_first(index);
                self.highlight = self.navigator.highlight_current(&self.diff);
            }
        }
        debug!(entries = self.navigator.len(), cursor = ?self.navigator.cursor(), "diff recomputed");
    }

    fn text_mut(&mut self, surface: Surface) -> &mut String {
        match surface {
            Surface::Left => &mut self.left,
            Surface::Right => &mut self.right,
        }
    }
}
