use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::surface::VersionKey;

/// A scanned page image as loaded by the user.
///
/// The workbench never decodes the image; it only forwards the bytes to the
/// remote services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageImage {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl PageImage {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self { file_name, mime_type, data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".tif") || lower.ends_with(".tiff") {
        "image/tiff"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/png"
    }
}

/// Every text variant held for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// File name of the page image, if one is bound.
    pub image: Option<String>,
    pub base_engine: String,
    pub secondary_engine: String,
    pub merged: String,
    pub user_slot_1: String,
    pub user_slot_2: String,
}

impl PageResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text stored under `key`.
    pub fn text(&self, key: VersionKey) -> &str {
        match key {
            VersionKey::BaseEngine => &self.base_engine,
            VersionKey::SecondaryEngine => &self.secondary_engine,
            VersionKey::Merged => &self.merged,
            VersionKey::UserSlot1 => &self.user_slot_1,
            VersionKey::UserSlot2 => &self.user_slot_2,
        }
    }

    pub fn text_mut(&mut self, key: VersionKey) -> &mut String {
        match key {
            VersionKey::BaseEngine => &mut self.base_engine,
            VersionKey::SecondaryEngine => &mut self.secondary_engine,
            VersionKey::Merged => &mut self.merged,
            VersionKey::UserSlot1 => &mut self.user_slot_1,
            VersionKey::UserSlot2 => &mut self.user_slot_2,
        }
    }

    /// Returns `true` if the variant under `key` holds non-blank text.
    pub fn has_text(&self, key: VersionKey) -> bool {
        !self.text(key).trim().is_empty()
    }
}

/// Engine output for one page, as delivered by a completed recognition job.
///
/// Absent or empty fields leave the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUpdate {
    pub page: usize,
    pub base_engine: Option<String>,
    pub secondary_engine: Option<String>,
    pub merged: Option<String>,
}

impl PageUpdate {
    pub fn new(page: usize) -> Self {
        Self { page, ..Default::default() }
    }

    /// The non-empty fields of this update, keyed by version.
    pub fn fields(&self) -> impl Iterator<Item = (VersionKey, &str)> {
        [
            (VersionKey::BaseEngine, self.base_engine.as_deref()),
            (VersionKey::SecondaryEngine, self.secondary_engine.as_deref()),
            (VersionKey::Merged, self.merged.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, text)| text.filter(|t| !t.is_empty()).map(|t| (key, t)))
    }
}
