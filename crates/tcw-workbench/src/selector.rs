use tokio::time::Instant;
use tracing::debug;

use tcw_store::PageResultStore;
use tcw_types::{Surface, VersionKey};

use crate::comparison::ComparisonView;
use crate::context::SessionContext;

/// Maps version keys to store content for each surface.
pub struct VersionSelector;

impl VersionSelector {
    /// Bind `key` to `surface` and load that variant of the active page.
    ///
    /// A missing page loads an empty surface.
    pub fn select(
        store: &PageResultStore,
        session: &mut SessionContext,
        view: &mut ComparisonView,
        surface: Surface,
        key: VersionKey,
        deadline: Instant,
    ) {
        session.bindings.set(surface, key);
        Self::load(store, session, view, surface, deadline);
        debug!(surface = %surface, key = %key, page = session.active_page, "version selected");
    }

    /// Reload both surfaces from the active page with the current bindings.
    pub fn apply_bindings(
        store: &PageResultStore,
        session: &SessionContext,
        view: &mut ComparisonView,
        deadline: Instant,
    ) {
        for surface in Surface::BOTH {
            Self::load(store, session, view, surface, deadline);
        }
    }

    /// Write each user-slot surface back to the active page when it differs
    /// from the stored value. Returns the number of fields written.
    pub fn reconcile(
        store: &mut PageResultStore,
        session: &SessionContext,
        view: &ComparisonView,
    ) -> usize {
        let page = session.active_page;
        let mut written = 0;
        for (surface, key) in session.bindings.user_slot_surfaces() {
            if store.write_if_changed(page, key, view.text(surface)) {
                debug!(page, key = %key, "user edit persisted");
                written += 1;
            }
        }
        written
    }

    fn load(
        store: &PageResultStore,
        session: &SessionContext,
        view: &mut ComparisonView,
        surface: Surface,
        deadline: Instant,
    ) {
        let key = session.bindings.get(surface);
        let text = store.text(session.active_page, key).unwrap_or_default();
        view.load(surface, text.to_string(), deadline);
    }
}
