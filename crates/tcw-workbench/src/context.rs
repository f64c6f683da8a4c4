use tcw_jobs::{JobPoller, StatusRules};
use tcw_types::SurfaceBindings;

/// Per-session state shared by the workbench operations.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    /// 0-based index of the page shown on the surfaces.
    pub active_page: usize,
    pub bindings: SurfaceBindings,
    pub poller: JobPoller,
}

impl SessionContext {
    pub fn new(bindings: SurfaceBindings, rules: StatusRules) -> Self {
        Self { active_page: 0, bindings, poller: JobPoller::new(rules) }
    }

    /// Dependent actions are enabled while no job is in flight.
    pub fn actions_enabled(&self) -> bool {
        self.poller.actions_enabled()
    }

    /// Whether the reconciliation sweep has anything to write back.
    pub fn has_user_slot_binding(&self) -> bool {
        self.bindings.user_slot_surfaces().next().is_some()
    }
}
