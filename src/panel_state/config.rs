use egui::Rect;

use super::PanelContainerState;
use crate::auto_dock::AutoDock;
use crate::layout::DockInformation;

/// Values that survive across state changes of one panel.
///
/// A state records here what its successor needs to undo it: the rect before
/// maximizing, where to dock back to, which minimize slot is held.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedStateConfig {
    /// State that `restore` (and `hide_popup`) returns to.
    pub restore_state: Option<PanelContainerState>,

    /// Header visibility before maximizing.
    pub was_header_visible: Option<bool>,

    /// Rect before maximizing.
    pub original_rect: Option<Rect>,

    /// Last rect of the floating dialog.
    pub dialog_rect: Option<Rect>,

    /// Floating panel collapsed to its header.
    pub collapsed: bool,

    pub minimized_slot: Option<usize>,

    /// Where the panel was docked before it moved to a collapser or popup.
    pub auto_dock: Option<AutoDock>,

    /// Explicit target for the next docking, consumed on entering the docked state.
    pub dock_target: Option<DockInformation>,
}

impl SharedStateConfig {
    pub fn restore_state(&self) -> PanelContainerState {
        self.restore_state.unwrap_or(PanelContainerState::Docked)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
