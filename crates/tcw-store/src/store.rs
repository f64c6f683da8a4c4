use tracing::debug;

use tcw_types::{PageImage, PageResult, PageUpdate, VersionKey};

use crate::error::{StoreError, StoreResult};

/// Ordered per-page records for the current document.
#[derive(Clone, Debug, Default)]
pub struct PageResultStore {
    pages: Vec<PageResult>,
    images: Vec<PageImage>,
}

impl PageResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all records with `n` empty pages.
    pub fn initialize(&mut self, n: usize) {
        self.pages = vec![PageResult::new(); n];
        self.images.clear();
        debug!(pages = n, "page store initialized");
    }

    /// Replace all records with one empty page per image.
    pub fn load_images(&mut self, images: Vec<PageImage>) {
        self.initialize(images.len());
        for (page, image) in self.pages.iter_mut().zip(&images) {
            page.image = Some(image.file_name.clone());
        }
        self.images = images;
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns `true` if `page` addresses an existing record.
    pub fn contains(&self, page: usize) -> bool {
        page < self.pages.len()
    }

    /// The record for `page`.
    pub fn get(&self, page: usize) -> StoreResult<&PageResult> {
        self.pages.get(page).ok_or(StoreError::PageOutOfRange {
            page,
            len: self.pages.len(),
        })
    }

    /// The text stored under `key` on `page`.
    pub fn text(&self, page: usize, key: VersionKey) -> StoreResult<&str> {
        Ok(self.get(page)?.text(key))
    }

    /// All records in page order.
    pub fn pages(&self) -> &[PageResult] {
        &self.pages
    }

    /// The image bound to `page`, if any.
    pub fn image(&self, page: usize) -> Option<&PageImage> {
        self.images.get(page)
    }

    /// Every loaded image in page order.
    pub fn images(&self) -> &[PageImage] {
        &self.images
    }

    /// Overwrite one field. Ignored if `page` is out of range.
    pub fn set_field(&mut self, page: usize, key: VersionKey, value: impl Into<String>) {
        match self.pages.get_mut(page) {
            Some(record) => *record.text_mut(key) = value.into(),
            None => debug!(page, key = %key, "ignoring write to missing page"),
        }
    }

    /// Write `value` into `key` only if it differs from what is stored.
    ///
    /// Returns `true` if the store changed.
    pub fn write_if_changed(&mut self, page: usize, key: VersionKey, value: &str) -> bool {
        match self.pages.get_mut(page) {
            Some(record) if record.text(key) != value => {
                *record.text_mut(key) = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Apply one page of recognition output.
    ///
    /// Only fields present and non-empty in `update` are written. Returns the
    /// number of fields written.
    pub fn apply_page_payload(&mut self, update: &PageUpdate) -> usize {
        let Some(record) = self.pages.get_mut(update.page) else {
            debug!(page = update.page, "ignoring update for missing page");
            return 0;
        };
        let mut written = 0;
        for (key, text) in update.fields() {
            *record.text_mut(key) = text.to_string();
            written += 1;
        }
        written
    }

    /// Empty the engine-produced fields of every page.
    ///
    /// Images and user slots are kept.
    pub fn clear_engine_results(&mut self) {
        for record in &mut self.pages {
            for key in VersionKey::ALL.into_iter().filter(|k| k.is_engine_output()) {
                record.text_mut(key).clear();
            }
        }
    }

    /// The first page (0-based) whose `key` variant is blank.
    pub fn first_missing(&self, key: VersionKey) -> Option<usize> {
        self.pages.iter().position(|record| !record.has_text(key))
    }
}
