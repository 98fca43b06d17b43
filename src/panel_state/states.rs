//! One type per [`PanelContainerState`].
//!
//! The request methods return `true` when the request is legal from this state,
//! and may record in the shared config what the next state needs. Transition
//! requests only read the host; the visible work happens in `enter`/`leave`.
//! `collapse`/`expand` stay in the same state and act right away.

use egui::{Align2, Rect};

use super::{PanelContainerState, PanelHost, SharedStateConfig};
use crate::error::DockResult;
use crate::layout::DockInformation;
use crate::panel::PanelId;

/// Everything a state may touch while handling a call.
pub struct StateContext<'a> {
    pub panel: PanelId,
    pub config: &'a mut SharedStateConfig,
    pub host: &'a mut dyn PanelHost,
}

pub trait PanelState: std::fmt::Debug {
    fn kind(&self) -> PanelContainerState;

    fn enter(&mut self, _ctx: &mut StateContext<'_>) -> DockResult<()> {
        Ok(())
    }

    fn leave(&mut self, _ctx: &mut StateContext<'_>) -> DockResult<()> {
        Ok(())
    }

    /// The panel is being closed while in this state.
    fn dispose(&mut self, _ctx: &mut StateContext<'_>) {}

    /// The host area was resized.
    fn update_layout(&mut self, _ctx: &mut StateContext<'_>) {}

    fn dock_panel(
        &mut self,
        _ctx: &mut StateContext<'_>,
        _target: Option<DockInformation>,
    ) -> bool {
        false
    }

    fn float_panel(&mut self, _ctx: &mut StateContext<'_>, _rect: Option<Rect>) -> bool {
        false
    }

    fn maximize(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn minimize(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn restore(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn show_popup(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn hide_popup(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn pin_panel(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn unpin_panel(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    /// Collapse to the header without changing state.
    fn collapse(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn expand(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        false
    }
}

pub fn create_state(state: PanelContainerState) -> Box<dyn PanelState> {
    match state {
        PanelContainerState::Docked => Box::new(DockedState),
        PanelContainerState::Floating => Box::new(FloatingState),
        PanelContainerState::Maximized => Box::new(MaximizedState),
        PanelContainerState::Minimized => Box::new(MinimizedState),
        PanelContainerState::InCollapser => Box::new(InCollapserState::default()),
        PanelContainerState::PopupWindow => Box::new(PopupWindowState),
    }
}

/// Remember what maximizing has to undo.
fn remember_before_maximize(ctx: &mut StateContext<'_>, restore_to: PanelContainerState) {
    let rect = ctx
        .host
        .dialog_rect(ctx.panel)
        .filter(|_| restore_to == PanelContainerState::Floating)
        .unwrap_or_else(|| ctx.host.panel_rect(ctx.panel));
    ctx.config.restore_state = Some(restore_to);
    ctx.config.was_header_visible = Some(ctx.host.is_header_visible(ctx.panel));
    ctx.config.original_rect = Some(rect);
    if restore_to == PanelContainerState::Floating {
        ctx.config.dialog_rect = Some(rect);
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct DockedState;

impl PanelState for DockedState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::Docked
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        if !ctx.host.is_docked(ctx.panel) {
            let target = ctx.config.dock_target.take();
            ctx.host.dock_panel(ctx.panel, target)?;
        }
        ctx.host.remove_dialog(ctx.panel);
        ctx.host.set_panel_visible(ctx.panel, true);
        ctx.host.observe_placeholder(ctx.panel, true);
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        ctx.host.observe_placeholder(ctx.panel, false);
        Ok(())
    }

    fn float_panel(&mut self, ctx: &mut StateContext<'_>, rect: Option<Rect>) -> bool {
        if rect.is_some() {
            ctx.config.dialog_rect = rect;
        }
        true
    }

    fn maximize(&mut self, ctx: &mut StateContext<'_>) -> bool {
        remember_before_maximize(ctx, PanelContainerState::Docked);
        true
    }

    fn show_popup(&mut self, ctx: &mut StateContext<'_>) -> bool {
        ctx.config.restore_state = Some(PanelContainerState::Docked);
        true
    }

    fn unpin_panel(&mut self, ctx: &mut StateContext<'_>) -> bool {
        ctx.host.collapsers_enabled()
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct FloatingState;

impl PanelState for FloatingState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::Floating
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        if ctx.host.is_docked(ctx.panel) {
            ctx.host.undock_panel(ctx.panel)?;
        }
        let rect = ctx.config.dialog_rect.unwrap_or_else(|| {
            Align2::CENTER_CENTER.align_size_within_rect(
                ctx.host.default_dialog_size(),
                ctx.host.container_rect(),
            )
        });
        ctx.config.dialog_rect = Some(rect);
        ctx.host.show_dialog(ctx.panel, rect);
        ctx.host.set_panel_rect(ctx.panel, rect);
        ctx.host.set_header_visible(ctx.panel, true);
        ctx.host.set_panel_visible(ctx.panel, true);
        if ctx.config.collapsed {
            ctx.host.set_dialog_collapsed(ctx.panel, true);
        }
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        if let Some(rect) = ctx.host.dialog_rect(ctx.panel) {
            ctx.config.dialog_rect = Some(rect);
        }
        ctx.host.hide_dialog(ctx.panel);
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut StateContext<'_>) {
        ctx.host.remove_dialog(ctx.panel);
    }

    fn dock_panel(&mut self, ctx: &mut StateContext<'_>, target: Option<DockInformation>) -> bool {
        ctx.config.dock_target = target;
        ctx.config.collapsed = false;
        true
    }

    fn maximize(&mut self, ctx: &mut StateContext<'_>) -> bool {
        remember_before_maximize(ctx, PanelContainerState::Floating);
        true
    }

    fn minimize(&mut self, ctx: &mut StateContext<'_>) -> bool {
        remember_before_maximize(ctx, PanelContainerState::Floating);
        true
    }

    fn collapse(&mut self, ctx: &mut StateContext<'_>) -> bool {
        if ctx.config.collapsed {
            return false;
        }
        ctx.config.collapsed = true;
        ctx.host.set_dialog_collapsed(ctx.panel, true);
        true
    }

    fn expand(&mut self, ctx: &mut StateContext<'_>) -> bool {
        if !ctx.config.collapsed {
            return false;
        }
        ctx.config.collapsed = false;
        ctx.host.set_dialog_collapsed(ctx.panel, false);
        true
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct MaximizedState;

impl PanelState for MaximizedState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::Maximized
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        ctx.host.set_header_visible(ctx.panel, true);
        ctx.host.set_panel_visible(ctx.panel, true);
        self.update_layout(ctx);
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        let visible = ctx.config.was_header_visible.unwrap_or(true);
        ctx.host.set_header_visible(ctx.panel, visible);
        Ok(())
    }

    fn update_layout(&mut self, ctx: &mut StateContext<'_>) {
        let rect = ctx.host.container_rect();
        ctx.host.set_panel_rect(ctx.panel, rect);
    }

    /// Only a panel that came from a floating dialog can be minimized.
    fn minimize(&mut self, ctx: &mut StateContext<'_>) -> bool {
        ctx.config.restore_state == Some(PanelContainerState::Floating)
    }

    fn restore(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        true
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct MinimizedState;

impl PanelState for MinimizedState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::Minimized
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        let slot = ctx.host.request_minimize_slot();
        ctx.config.minimized_slot = Some(slot);
        ctx.host.set_header_visible(ctx.panel, true);
        ctx.host.set_panel_visible(ctx.panel, true);
        self.update_layout(ctx);
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        self.dispose(ctx);
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut StateContext<'_>) {
        if let Some(slot) = ctx.config.minimized_slot.take() {
            ctx.host.release_minimize_slot(slot);
        }
    }

    fn update_layout(&mut self, ctx: &mut StateContext<'_>) {
        if let Some(slot) = ctx.config.minimized_slot {
            let rect = ctx.host.minimized_slot_rect(slot);
            ctx.host.set_panel_rect(ctx.panel, rect);
        }
    }

    fn maximize(&mut self, ctx: &mut StateContext<'_>) -> bool {
        ctx.config.restore_state = Some(PanelContainerState::Floating);
        ctx.config.was_header_visible = Some(true);
        true
    }

    fn restore(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        true
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InCollapserState {
    /// Slid out of the margin.
    shown: bool,
}

impl PanelState for InCollapserState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::InCollapser
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        let auto_dock = ctx.host.scan_auto_dock(ctx.panel);
        let side = auto_dock.collapser_side();
        ctx.config.auto_dock = Some(auto_dock);
        if ctx.host.is_docked(ctx.panel) {
            ctx.host.undock_panel(ctx.panel)?;
        }
        ctx.host.set_header_visible(ctx.panel, true);
        ctx.host.set_panel_visible(ctx.panel, false);
        ctx.host.create_collapser(ctx.panel, side);
        self.shown = false;
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        ctx.host.remove_collapser(ctx.panel);
        ctx.host.set_panel_visible(ctx.panel, true);
        match ctx.config.auto_dock.take() {
            Some(auto_dock) => ctx.host.restore_auto_dock(ctx.panel, &auto_dock),
            None => Ok(()),
        }
    }

    fn dispose(&mut self, ctx: &mut StateContext<'_>) {
        ctx.host.remove_collapser(ctx.panel);
    }

    fn pin_panel(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        true
    }

    fn expand(&mut self, ctx: &mut StateContext<'_>) -> bool {
        if self.shown {
            return false;
        }
        self.shown = true;
        ctx.host.show_collapsed_panel(ctx.panel, true);
        ctx.host.set_panel_visible(ctx.panel, true);
        true
    }

    fn collapse(&mut self, ctx: &mut StateContext<'_>) -> bool {
        if !self.shown {
            return false;
        }
        self.shown = false;
        ctx.host.show_collapsed_panel(ctx.panel, false);
        ctx.host.set_panel_visible(ctx.panel, false);
        true
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct PopupWindowState;

impl PanelState for PopupWindowState {
    fn kind(&self) -> PanelContainerState {
        PanelContainerState::PopupWindow
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        let auto_dock = ctx.host.scan_auto_dock(ctx.panel);
        ctx.config.auto_dock = Some(auto_dock);
        if ctx.host.is_docked(ctx.panel) {
            ctx.host.undock_panel(ctx.panel)?;
        }
        ctx.host.open_popup(ctx.panel);
        Ok(())
    }

    fn leave(&mut self, ctx: &mut StateContext<'_>) -> DockResult<()> {
        ctx.host.close_popup(ctx.panel);
        match ctx.config.auto_dock.take() {
            Some(auto_dock) => ctx.host.restore_auto_dock(ctx.panel, &auto_dock),
            None => Ok(()),
        }
    }

    fn dispose(&mut self, ctx: &mut StateContext<'_>) {
        ctx.host.close_popup(ctx.panel);
    }

    fn hide_popup(&mut self, _ctx: &mut StateContext<'_>) -> bool {
        true
    }
}
