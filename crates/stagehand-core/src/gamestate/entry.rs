use super::module::Gamestate;

/// Flags of one gamestate, as seen from outside the manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamestateStatus {
    pub loaded: bool,
    pub started: bool,
    pub paused: bool,
    pub frozen: bool,
    pub pending_load: bool,
    pub pending_unload: bool,
    pub pending_start: bool,
    pub pending_stop: bool,
    pub show_loading: bool,
}

/// Registry entry. Created by name on first load request and kept until shutdown.
pub struct GamestateEntry {
    pub(crate) name: String,
    pub(crate) status: GamestateStatus,
    pub(crate) module: Option<Box<dyn Gamestate>>,
}

impl GamestateEntry {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: GamestateStatus {
                show_loading: true,
                ..GamestateStatus::default()
            },
            module: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn status(&self) -> GamestateStatus {
        self.status
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.status.loaded
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.status.started
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.status.paused
    }

    /// Whether a module instance is currently resolved.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.module.is_some()
    }

    pub(crate) fn clear_pending(&mut self) {
        let s = &mut self.status;
        s.pending_load = false;
        s.pending_unload = false;
        s.pending_start = false;
        s.pending_stop = false;
    }

    pub(crate) fn has_pending(&self) -> bool {
        let s = &self.status;
        s.pending_load || s.pending_unload || s.pending_start || s.pending_stop
    }
}
