use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One of the two editable comparison panes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Left,
    Right,
}

impl Surface {
    pub const BOTH: [Surface; 2] = [Surface::Left, Surface::Right];

    /// The opposite pane.
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(TypeError::UnknownSurface(other.to_string())),
        }
    }
}

/// A named text variant tracked per page.
///
/// The set is closed: every lookup against a [`PageResult`](crate::PageResult)
/// is an exhaustive match, and parsing an unrecognised name is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VersionKey {
    /// Output of the handwriting-recognition service.
    #[serde(rename = "base-engine")]
    BaseEngine,
    /// Standalone transcription by the multimodal language model.
    #[serde(rename = "secondary-engine")]
    SecondaryEngine,
    /// Language-model merge of the two engine outputs.
    #[serde(rename = "merged")]
    Merged,
    /// First user-edit slot.
    #[serde(rename = "user-slot-1")]
    UserSlot1,
    /// Second user-edit slot.
    #[serde(rename = "user-slot-2")]
    UserSlot2,
}

impl VersionKey {
    pub const ALL: [VersionKey; 5] = [
        VersionKey::BaseEngine,
        VersionKey::SecondaryEngine,
        VersionKey::Merged,
        VersionKey::UserSlot1,
        VersionKey::UserSlot2,
    ];

    /// Returns `true` for the slots that hold user edits.
    pub fn is_user_slot(self) -> bool {
        matches!(self, Self::UserSlot1 | Self::UserSlot2)
    }

    /// Returns `true` for the slots filled by a recognition job.
    pub fn is_engine_output(self) -> bool {
        !self.is_user_slot()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseEngine => "base-engine",
            Self::SecondaryEngine => "secondary-engine",
            Self::Merged => "merged",
            Self::UserSlot1 => "user-slot-1",
            Self::UserSlot2 => "user-slot-2",
        }
    }

    /// Human-readable label for status lines and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Self::BaseEngine => "recognition engine",
            Self::SecondaryEngine => "language model",
            Self::Merged => "merged",
            Self::UserSlot1 => "user edit 1",
            Self::UserSlot2 => "user edit 2",
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| TypeError::UnknownVersionKey(s.to_string()))
    }
}

/// The version key chosen for each surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceBindings {
    pub left: VersionKey,
    pub right: VersionKey,
}

impl SurfaceBindings {
    pub fn new(left: VersionKey, right: VersionKey) -> Self {
        Self { left, right }
    }

    pub fn get(&self, surface: Surface) -> VersionKey {
        match surface {
            Surface::Left => self.left,
            Surface::Right => self.right,
        }
    }

    pub fn set(&mut self, surface: Surface, key: VersionKey) {
        match surface {
            Surface::Left => self.left = key,
            Surface::Right => self.right = key,
        }
    }

    /// Surfaces currently bound to a user-edit slot.
    pub fn user_slot_surfaces(&self) -> impl Iterator<Item = (Surface, VersionKey)> + '_ {
        Surface::BOTH
            .into_iter()
            .map(move |s| (s, self.get(s)))
            .filter(|(_, key)| key.is_user_slot())
    }
}

impl Default for SurfaceBindings {
    fn default() -> Self {
        Self {
            left: VersionKey::BaseEngine,
            right: VersionKey::Merged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_key_round_trips_through_str() {
        for key in VersionKey::ALL {
            assert_eq!(key.as_str().parse::<VersionKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_version_key_is_rejected() {
        let err = "ocr".parse::<VersionKey>().unwrap_err();
        assert_eq!(err, TypeError::UnknownVersionKey("ocr".into()));
    }

    #[test]
    fn user_slots() {
        assert!(VersionKey::UserSlot1.is_user_slot());
        assert!(VersionKey::UserSlot2.is_user_slot());
        assert!(!VersionKey::Merged.is_user_slot());
        assert!(VersionKey::BaseEngine.is_engine_output());
    }

    #[test]
    fn surface_other() {
        assert_eq!(Surface::Left.other(), Surface::Right);
        assert_eq!(Surface::Right.other(), Surface::Left);
        assert!("middle".parse::<Surface>().is_err());
    }

    #[test]
    fn bindings_track_user_slots() {
        let mut b = SurfaceBindings::default();
        assert_eq!(b.user_slot_surfaces().count(), 0);

        b.set(Surface::Right, VersionKey::UserSlot2);
        let bound: Vec<_> = b.user_slot_surfaces().collect();
        assert_eq!(bound, vec![(Surface::Right, VersionKey::UserSlot2)]);
        assert_eq!(b.get(Surface::Left), VersionKey::BaseEngine);
    }

    #[test]
    fn version_key_serde_matches_display() {
        for key in VersionKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{key}\""));
        }
    }
}
