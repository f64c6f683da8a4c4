use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque, server-assigned identifier for a remote job.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wrap a server-provided identifier. Blank identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TypeError::EmptyJobId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.short_id())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two kinds of remote long-running operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Handwriting recognition plus language-model transcription and merge.
    Recognition,
    /// Structured final-document generation from the chosen text.
    FinalDocument,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recognition => f.write_str("recognition"),
            Self::FinalDocument => f.write_str("final-document"),
        }
    }
}

/// Lifecycle of a job handle.
///
/// The state only moves forward (`Idle → Submitted → Polling → terminal`).
/// Returning to `Idle` is a reset, which is always permitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    Idle,
    Submitted,
    Polling,
    Completed,
    Failed,
}

impl JobState {
    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` while the job occupies the remote side.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Submitted | Self::Polling)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, Submitted)
                | (Submitted, Polling)
                | (Submitted, Failed)
                | (Polling, Completed)
                | (Polling, Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_rejects_blank() {
        assert_eq!(JobId::new("  ").unwrap_err(), TypeError::EmptyJobId);
        assert_eq!(JobId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn job_id_short() {
        let id = JobId::new("0f3c2a9e-1111-2222-3333-444455556666").unwrap();
        assert_eq!(id.short_id(), "0f3c2a9e");
        assert_eq!(JobId::new("ab").unwrap().short_id(), "ab");
    }

    #[test]
    fn forward_transitions_allowed() {
        assert!(JobState::Idle.can_advance_to(JobState::Submitted));
        assert!(JobState::Submitted.can_advance_to(JobState::Polling));
        assert!(JobState::Polling.can_advance_to(JobState::Completed));
        assert!(JobState::Polling.can_advance_to(JobState::Failed));
    }

    #[test]
    fn terminal_states_never_poll_again() {
        assert!(!JobState::Completed.can_advance_to(JobState::Polling));
        assert!(!JobState::Failed.can_advance_to(JobState::Polling));
        assert!(!JobState::Completed.can_advance_to(JobState::Submitted));
        assert!(JobState::Completed.can_advance_to(JobState::Idle));
    }

    #[test]
    fn skipping_states_rejected() {
        assert!(!JobState::Idle.can_advance_to(JobState::Polling));
        assert!(!JobState::Idle.can_advance_to(JobState::Completed));
    }

    #[test]
    fn state_classification() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Polling.is_active());
        assert!(!JobState::Idle.is_active());
    }
}
