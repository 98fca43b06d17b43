use egui::{Rect, Vec2};

use super::Animation;
use super::AnimationStatus;
use crate::auto_dock::AutoDock;
use crate::error::DockResult;
use crate::layout::{DockInformation, DockKind};
use crate::panel::PanelId;

/// What panel states need from the surrounding manager.
///
/// States only talk to the manager through this trait, so they never hold a
/// reference back to it; the manager passes itself in for the duration of a call.
pub trait PanelHost {
    /// The rect of the whole docking area.
    fn container_rect(&self) -> Rect;

    fn panel_rect(&self, panel: PanelId) -> Rect;
    fn set_panel_rect(&mut self, panel: PanelId, rect: Rect);

    fn is_header_visible(&self, panel: PanelId) -> bool;
    fn set_header_visible(&mut self, panel: PanelId, visible: bool);
    fn set_panel_visible(&mut self, panel: PanelId, visible: bool);

    /// While observed, the panel follows the rect of its dock node.
    fn observe_placeholder(&mut self, _panel: PanelId, _observe: bool) {}

    fn collapsers_enabled(&self) -> bool {
        true
    }

    fn default_dialog_size(&self) -> Vec2;

    // Tree ------------------------------------------------------------------

    fn is_docked(&self, panel: PanelId) -> bool;

    /// Take the panel's node out of the tree.
    fn undock_panel(&mut self, panel: PanelId) -> DockResult<()>;

    /// Put the panel back into the tree at `target`, or into the document area.
    fn dock_panel(&mut self, panel: PanelId, target: Option<DockInformation>) -> DockResult<()>;

    fn scan_auto_dock(&self, panel: PanelId) -> AutoDock;

    /// Dock the panel back where `auto_dock` says it was.
    fn restore_auto_dock(&mut self, panel: PanelId, auto_dock: &AutoDock) -> DockResult<()>;

    // Dialogs ---------------------------------------------------------------

    /// Show the panel's floating dialog at `rect`, creating it if needed.
    fn show_dialog(&mut self, panel: PanelId, rect: Rect);
    fn hide_dialog(&mut self, panel: PanelId);
    fn remove_dialog(&mut self, panel: PanelId);
    fn dialog_rect(&self, panel: PanelId) -> Option<Rect>;
    fn set_dialog_collapsed(&mut self, panel: PanelId, collapsed: bool);

    // Minimized slots --------------------------------------------------------

    fn request_minimize_slot(&mut self) -> usize;
    fn release_minimize_slot(&mut self, slot: usize);
    fn minimized_slot_rect(&self, slot: usize) -> Rect;
    fn next_free_minimized_slot_rect(&self) -> Rect;

    // Collapsers and popups ---------------------------------------------------

    fn create_collapser(&mut self, panel: PanelId, side: DockKind);
    fn remove_collapser(&mut self, panel: PanelId);

    /// Slide a collapsed panel out of (or back into) its margin.
    fn show_collapsed_panel(&mut self, panel: PanelId, shown: bool);

    fn open_popup(&mut self, panel: PanelId);
    fn close_popup(&mut self, panel: PanelId);

    fn start_animation(&mut self, animation: &Animation) -> AnimationStatus;
}
