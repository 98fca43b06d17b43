//! [`DockManager`]: owns the model, the panels and their state machines, and is the
//! [`PanelHost`] those machines act through.

use std::collections::{BTreeMap, BTreeSet};

use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::auto_dock::AutoDock;
use crate::config::DockConfig;
use crate::container::{Container, ContainerKind, ContainerState};
use crate::error::{DockError, DockResult};
use crate::events::{DockEvent, EventEmitter, SubscriptionId};
use crate::integrity;
use crate::layout::{DockInformation, DockKind, DockLayoutEngine};
use crate::model::{Dialog, DockModel};
use crate::node::{DockTree, NodeId};
use crate::panel::{
    InstanceType, Panel, PanelAttributes, PanelId, PanelTypeMetadata, PanelTypeRegistry,
};
use crate::panel_state::{
    Animation, AnimationStatus, Animator, ImmediateAnimator, PanelContainerState, PanelHost,
    PanelStateMachine, SharedStateConfig, TransitionOutcome,
};
use crate::persistence::{self, DockSnapshot, NodeInfo, PanelInfo};

/// Top-level entry point: one per docking area.
pub struct DockManager {
    config: DockConfig,
    engine: DockLayoutEngine,
    model: DockModel,
    registry: PanelTypeRegistry,
    panels: BTreeMap<PanelId, Panel>,
    machines: BTreeMap<PanelId, PanelStateMachine>,
    events: EventEmitter<DockEvent>,
    animator: Box<dyn Animator>,
    host_rect: Rect,
    active_panel: Option<PanelId>,

    /// Docked panels that follow the rect of their node.
    observed: BTreeSet<PanelId>,
    popups: BTreeSet<PanelId>,

    /// Slot ids, newest first.
    minimized_slots: Vec<usize>,
    next_minimized_slot: usize,

    next_panel_id: u64,
    integrity_hash: Option<u64>,
}

impl std::fmt::Debug for DockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockManager")
            .field("host_rect", &self.host_rect)
            .field("panels", &self.panels.len())
            .field("nodes", &self.model.tree.len())
            .field("active_panel", &self.active_panel)
            .finish_non_exhaustive()
    }
}

impl DockManager {
    /// A manager whose layout starts as an empty document area covering `host_rect`.
    ///
    /// # Errors
    /// Only if the initial document area cannot be laid out.
    pub fn new(config: DockConfig, host_rect: Rect) -> DockResult<Self> {
        let model = DockModel::with_document_manager(host_rect)?;
        Ok(Self {
            engine: DockLayoutEngine::new(config.splitter_bar_size),
            config,
            model,
            registry: PanelTypeRegistry::new(),
            panels: BTreeMap::new(),
            machines: BTreeMap::new(),
            events: EventEmitter::new(),
            animator: Box::new(ImmediateAnimator),
            host_rect,
            active_panel: None,
            observed: BTreeSet::new(),
            popups: BTreeSet::new(),
            minimized_slots: Vec::new(),
            next_minimized_slot: 0,
            next_panel_id: 0,
            integrity_hash: None,
        })
    }

    /// Play transition animations with `animator` instead of finishing them at once.
    #[must_use]
    pub fn with_animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Box::new(animator);
        self
    }

    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn model(&self) -> &DockModel {
        &self.model
    }

    pub fn tree(&self) -> &DockTree {
        &self.model.tree
    }

    pub fn engine(&self) -> &DockLayoutEngine {
        &self.engine
    }

    pub fn host_rect(&self) -> Rect {
        self.host_rect
    }

    pub fn document_node(&self) -> Option<NodeId> {
        self.model.document_node()
    }

    pub fn registry(&self) -> &PanelTypeRegistry {
        &self.registry
    }

    /// Register a panel type so that [`Self::create_panel`] can build it.
    ///
    /// # Errors
    /// [`DockError::PanelTypeAlreadyRegistered`] if the name is taken.
    pub fn register_panel_type(&mut self, metadata: PanelTypeMetadata) -> DockResult<()> {
        self.registry.register(metadata)
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&DockEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // Panels ------------------------------------------------------------------

    pub fn panel(&self, panel: PanelId) -> Option<&Panel> {
        self.panels.get(&panel)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels.values()
    }

    /// `None` for unknown panels and for panels that were created but never placed.
    pub fn panel_state(&self, panel: PanelId) -> Option<PanelContainerState> {
        self.machines.get(&panel).map(PanelStateMachine::state)
    }

    pub fn panel_state_config(&self, panel: PanelId) -> Option<&SharedStateConfig> {
        self.machines.get(&panel).map(PanelStateMachine::config)
    }

    pub fn is_transitioning(&self, panel: PanelId) -> bool {
        self.machines
            .get(&panel)
            .is_some_and(PanelStateMachine::is_transitioning)
    }

    /// The node showing `panel`, if it is docked.
    pub fn panel_node(&self, panel: PanelId) -> Option<NodeId> {
        self.model
            .tree
            .find_panel(panel)
            .filter(|&node| self.model.tree.is_docked(node))
    }

    pub fn active_panel(&self) -> Option<PanelId> {
        self.active_panel
    }

    /// Create and initialize a panel of a registered type. The panel is not placed yet.
    ///
    /// Singleton types return their live instance if there is one.
    ///
    /// # Errors
    /// [`DockError::UnknownPanelType`], or [`DockError::ContentInitialization`] if the
    /// content failed to initialize; no panel is registered in either case.
    pub fn create_panel(
        &mut self,
        panel_type: &str,
        options: &serde_json::Value,
    ) -> DockResult<PanelId> {
        let metadata = self
            .registry
            .metadata(panel_type)
            .ok_or_else(|| DockError::UnknownPanelType(panel_type.to_owned()))?;
        if metadata.instance_type == InstanceType::Singleton {
            if let Some(&existing) = self.registry.instances(panel_type).first() {
                log::debug!("reuse singleton {panel_type:?} {existing:?}");
                return Ok(existing);
            }
        }

        let panel = instantiate(
            &mut self.registry,
            &mut self.next_panel_id,
            panel_type,
            options,
            None,
        )?;
        let id = panel.id;
        log::debug!("create panel {id:?} of type {panel_type:?}");
        self.registry.register_instance(panel_type, id);
        self.panels.insert(id, panel);
        Ok(id)
    }

    /// Make `panel` the active one: its dialog comes to the front, or its tab is selected.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] for an unknown panel.
    pub fn set_active_panel(&mut self, panel: Option<PanelId>) -> DockResult<()> {
        if let Some(panel) = panel {
            if !self.panels.contains_key(&panel) {
                return Err(DockError::PanelNotFound(panel));
            }
            if self.model.dialog(panel).is_some() {
                self.model.bring_to_front(panel);
            }
            if let Some(node) = self.panel_node(panel) {
                if let Some(parent) = self.model.tree.parent(node) {
                    self.model.tree.set_active_child(parent, node)?;
                }
            }
        }
        if panel != self.active_panel {
            let previous = std::mem::replace(&mut self.active_panel, panel);
            self.events
                .publish(&DockEvent::ActivePanelChanged { panel, previous });
        }
        Ok(())
    }

    // Docking -----------------------------------------------------------------

    /// Dock `panel` to the left of `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_left(
        &mut self,
        reference: NodeId,
        panel: PanelId,
        ratio: Option<f32>,
    ) -> DockResult<NodeId> {
        self.dock(reference, panel, DockKind::Left, ratio)
    }

    /// Dock `panel` to the right of `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_right(
        &mut self,
        reference: NodeId,
        panel: PanelId,
        ratio: Option<f32>,
    ) -> DockResult<NodeId> {
        self.dock(reference, panel, DockKind::Right, ratio)
    }

    /// Dock `panel` above `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_up(
        &mut self,
        reference: NodeId,
        panel: PanelId,
        ratio: Option<f32>,
    ) -> DockResult<NodeId> {
        self.dock(reference, panel, DockKind::Up, ratio)
    }

    /// Dock `panel` below `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_down(
        &mut self,
        reference: NodeId,
        panel: PanelId,
        ratio: Option<f32>,
    ) -> DockResult<NodeId> {
        self.dock(reference, panel, DockKind::Down, ratio)
    }

    /// Dock `panel` as a tab next to `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_fill(&mut self, reference: NodeId, panel: PanelId) -> DockResult<NodeId> {
        self.dock(reference, panel, DockKind::Fill, None)
    }

    /// Dock `panel` next to `reference`. Works for new panels and floating ones.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `reference` is not docked,
    /// [`DockError::AlreadyDocked`] if the panel is docked already and
    /// [`DockError::TransitionRejected`] if its current state cannot dock.
    pub fn dock(
        &mut self,
        reference: NodeId,
        panel: PanelId,
        kind: DockKind,
        ratio: Option<f32>,
    ) -> DockResult<NodeId> {
        if !self.model.tree.is_docked(reference) {
            return Err(DockError::NodeNotFound(reference));
        }
        self.place(
            panel,
            Some(DockInformation {
                reference,
                kind,
                ratio,
            }),
        )
    }

    /// Dock `panel` as a tab of the document area (or as the root of an empty tree).
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`], [`DockError::AlreadyDocked`] or
    /// [`DockError::TransitionRejected`], as for [`Self::dock`].
    pub fn dock_to_document(&mut self, panel: PanelId) -> DockResult<NodeId> {
        self.place(panel, None)
    }

    fn place(&mut self, panel: PanelId, target: Option<DockInformation>) -> DockResult<NodeId> {
        if !self.panels.contains_key(&panel) {
            return Err(DockError::PanelNotFound(panel));
        }
        match self.panel_state(panel) {
            None => {
                self.attach_panel(panel, target)?;
                let machine = PanelStateMachine::new(panel, PanelContainerState::Docked, self)?;
                self.machines.insert(panel, machine);
            }
            Some(PanelContainerState::Docked) => return Err(DockError::AlreadyDocked(panel)),
            Some(state) => {
                let outcome = self.transition(panel, |machine, host| {
                    machine.dock_panel(host, target)
                })?;
                if outcome.is_rejected() {
                    return Err(DockError::TransitionRejected { panel, state });
                }
            }
        }
        self.set_active_panel(Some(panel))?;
        self.after_structure_change();
        self.panel_node(panel).ok_or(DockError::PanelNotFound(panel))
    }

    /// Float a docked panel at its current position.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] for an unknown panel, otherwise as
    /// [`Self::float_panel`].
    pub fn undock(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        let rect = self
            .panels
            .get(&panel)
            .map(|p| p.frame_rect)
            .ok_or(DockError::PanelNotFound(panel))?;
        self.float_panel(panel, Some(rect))
    }

    /// Move `panel` into a floating dialog at `rect` (or its last dialog rect, or a
    /// default-sized rect centered in the host).
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] for an unknown panel, or the error of the
    /// transition into the floating state.
    pub fn float_panel(
        &mut self,
        panel: PanelId,
        rect: Option<Rect>,
    ) -> DockResult<TransitionOutcome> {
        if !self.panels.contains_key(&panel) {
            return Err(DockError::PanelNotFound(panel));
        }
        if self.machines.contains_key(&panel) {
            let outcome = self.transition(panel, |machine, host| machine.float_panel(host, rect))?;
            self.after_structure_change();
            return Ok(outcome);
        }

        let config = SharedStateConfig {
            dialog_rect: rect,
            ..Default::default()
        };
        let machine =
            PanelStateMachine::with_config(panel, PanelContainerState::Floating, config, self)?;
        self.machines.insert(panel, machine);
        self.set_active_panel(Some(panel))?;
        Ok(TransitionOutcome::Completed {
            from: PanelContainerState::Floating,
            to: PanelContainerState::Floating,
        })
    }

    /// Close `panel`, asking its content first.
    ///
    /// # Errors
    /// [`DockError::CloseVetoed`] if the content refuses; nothing changes then.
    pub fn close_panel(&mut self, panel: PanelId) -> DockResult<()> {
        let content = &self
            .panels
            .get(&panel)
            .ok_or(DockError::PanelNotFound(panel))?
            .content;
        if !content.can_close() {
            log::warn!("close of {panel:?} vetoed by its content");
            return Err(DockError::CloseVetoed(panel));
        }
        self.teardown_panel(panel)?;
        self.after_structure_change();
        Ok(())
    }

    /// Close `node` and every panel below it. Any veto aborts the whole close.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the tree and
    /// [`DockError::CloseVetoed`] if any panel below it refuses; nothing changes then.
    pub fn close_node(&mut self, node: NodeId) -> DockResult<()> {
        if !self.model.tree.contains(node) {
            return Err(DockError::NodeNotFound(node));
        }
        let panels = self.model.tree.panels_in_subtree(node);
        if let Some(&vetoed) = panels.iter().find(|panel| {
            self.panels
                .get(*panel)
                .is_some_and(|p| !p.content.can_close())
        }) {
            log::warn!("close of {node:?} vetoed by {vetoed:?}");
            return Err(DockError::CloseVetoed(vetoed));
        }

        let closed = self.engine.close(&mut self.model.tree, node)?;
        self.events.publish(&DockEvent::LayoutChanged);
        for panel in closed {
            self.teardown_panel(panel)?;
        }
        self.sync_docked_rects();
        self.after_structure_change();
        Ok(())
    }

    fn teardown_panel(&mut self, panel: PanelId) -> DockResult<()> {
        if let Some(mut machine) = self.machines.remove(&panel) {
            machine.dispose(self);
        }
        if let Some(node) = self.model.tree.find_panel(panel) {
            if self.model.tree.is_docked(node) {
                self.engine.close(&mut self.model.tree, node)?;
                self.events.publish(&DockEvent::Undocked { panel });
                self.events.publish(&DockEvent::LayoutChanged);
            } else {
                self.model.tree.dispose_subtree(node);
            }
        }
        self.model.remove_dialog(panel);
        self.model.remove_collapser(panel);
        self.popups.remove(&panel);
        self.observed.remove(&panel);
        self.registry.unregister_instance(panel);
        if let Some(mut removed) = self.panels.remove(&panel) {
            removed.content.on_close();
        }
        if self.active_panel == Some(panel) {
            self.set_active_panel(None)?;
        }
        self.sync_docked_rects();
        log::debug!("closed panel {panel:?}");
        self.events.publish(&DockEvent::Closed { panel });
        Ok(())
    }

    // Transitions ---------------------------------------------------------------

    /// Maximize `panel` over the host.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn maximize(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.maximize(host))
    }

    /// Minimize `panel` into a slot along the bottom edge.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn minimize(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.minimize(host))
    }

    /// Undo a maximize or minimize.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn restore(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.restore(host))
    }

    /// Pop a docked panel out into a popup window.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn show_popup(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.show_popup(host))
    }

    /// Close the popup window and dock the panel back where it was.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn hide_popup(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.hide_popup(host))
    }

    /// Move a docked panel into a collapser margin.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn unpin_panel(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.unpin_panel(host))
    }

    /// Bring a panel back from its collapser margin to where it was docked.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn pin_panel(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.pin_panel(host))
    }

    /// Called by the renderer once the animation it was handed has finished.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] for an unknown panel and
    /// [`DockError::NoTransitionInFlight`] if nothing is running.
    pub fn complete_animation(&mut self, panel: PanelId) -> DockResult<TransitionOutcome> {
        self.transition(panel, |machine, host| machine.complete_animation(host))
    }

    /// Collapse a floating panel to its header, or slide a collapser panel back in.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn collapse(&mut self, panel: PanelId) -> DockResult<bool> {
        let collapsed = self.with_machine(panel, |machine, manager| machine.collapse(manager))?;
        if collapsed {
            self.events.publish(&DockEvent::Collapsed { panel });
        }
        Ok(collapsed)
    }

    /// Undo [`Self::collapse`].
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no state machine, otherwise as
    /// [`PanelStateMachine`](crate::PanelStateMachine) transitions fail.
    pub fn expand(&mut self, panel: PanelId) -> DockResult<bool> {
        let expanded = self.with_machine(panel, |machine, manager| machine.expand(manager))?;
        if expanded {
            self.events.publish(&DockEvent::Expanded { panel });
        }
        Ok(expanded)
    }

    /// Run `f` on the machine of `panel` with the manager as its host.
    fn with_machine<R>(
        &mut self,
        panel: PanelId,
        f: impl FnOnce(&mut PanelStateMachine, &mut Self) -> DockResult<R>,
    ) -> DockResult<R> {
        let mut machine = self
            .machines
            .remove(&panel)
            .ok_or(DockError::PanelNotFound(panel))?;
        let result = f(&mut machine, self);
        self.machines.insert(panel, machine);
        result
    }

    fn transition(
        &mut self,
        panel: PanelId,
        f: impl FnOnce(&mut PanelStateMachine, &mut dyn PanelHost) -> DockResult<TransitionOutcome>,
    ) -> DockResult<TransitionOutcome> {
        let outcome = self.with_machine(panel, |machine, manager| {
            f(machine, manager as &mut dyn PanelHost)
        })?;
        if let TransitionOutcome::Completed { from, to } = outcome {
            if from != to {
                self.events
                    .publish(&DockEvent::StateChanged { panel, from, to });
            }
            if from == PanelContainerState::InCollapser && to == PanelContainerState::Docked {
                self.events.publish(&DockEvent::Pinned { panel });
            }
            if to == PanelContainerState::InCollapser {
                self.events.publish(&DockEvent::Unpinned { panel });
            }
            self.after_structure_change();
        }
        Ok(outcome)
    }

    // Layout ------------------------------------------------------------------

    /// The host surface changed size.
    ///
    /// # Errors
    /// Only if the tree fails to lay out, which means it is corrupt.
    pub fn resize(&mut self, rect: Rect) -> DockResult<()> {
        log::debug!("resize host to {rect:?}");
        self.host_rect = rect;
        if let Some(root) = self.model.tree.root() {
            self.model.tree.resize(root, rect)?;
        }
        self.sync_docked_rects();

        let panels: Vec<PanelId> = self.machines.keys().copied().collect();
        for panel in panels {
            if let Some(mut machine) = self.machines.remove(&panel) {
                machine.update_layout(self);
                self.machines.insert(panel, machine);
            }
        }
        self.events.publish(&DockEvent::ContainerResized { rect });
        Ok(())
    }

    /// Apply `ratios` to the splitter at `node`.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the tree.
    pub fn set_splitter_ratios(&mut self, node: NodeId, ratios: &[f32]) -> DockResult<()> {
        self.model.tree.set_ratios(node, ratios)?;
        self.layout_changed();
        Ok(())
    }

    /// Drag bar `bar` of the splitter at `node` by `delta` pixels.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the tree.
    pub fn drag_splitter_bar(&mut self, node: NodeId, bar: usize, delta: f32) -> DockResult<()> {
        self.model.tree.drag_bar(node, bar, delta)?;
        self.layout_changed();
        Ok(())
    }

    /// Move a docked node to `index` among its siblings.
    ///
    /// # Errors
    /// [`DockError::NoParent`] if `node` is the root or detached.
    pub fn reorder(&mut self, node: NodeId, index: usize) -> DockResult<()> {
        self.engine.reorder(&mut self.model.tree, node, index)?;
        self.layout_changed();
        Ok(())
    }

    /// How `panel` is docked right now.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` is not docked, and
    /// [`DockError::NoParent`] if it is the root.
    pub fn query_dock_information(&self, panel: PanelId) -> DockResult<DockInformation> {
        let node = self
            .panel_node(panel)
            .ok_or(DockError::PanelNotFound(panel))?;
        self.engine.query_dock_information(&self.model.tree, node)
    }

    /// The renderer moved or resized a floating dialog.
    ///
    /// # Errors
    /// [`DockError::PanelNotFound`] if `panel` has no dialog.
    pub fn set_dialog_rect(&mut self, panel: PanelId, rect: Rect) -> DockResult<()> {
        let dialog = self
            .model
            .dialog_mut(panel)
            .ok_or(DockError::PanelNotFound(panel))?;
        dialog.rect = rect;
        if let Some(p) = self.panels.get_mut(&panel) {
            p.frame_rect = rect;
        }
        Ok(())
    }

    /// Rect of the minimized slot at `position`, counted from the right edge.
    fn slot_rect(&self, position: usize) -> Rect {
        let size = self.config.minimized_slot_size;
        let position = position as f32;
        let x = self.host_rect.right()
            - (position + 1.0) * size.x
            - position * self.config.minimized_slot_spacing;
        Rect::from_min_size(pos2(x, self.host_rect.bottom() - size.y), size)
    }

    /// Where a panel slides out to from a collapser on `side`.
    fn collapser_rect(&self, side: DockKind) -> Rect {
        let host = self.host_rect;
        let extent = self.config.collapser_panel_size;
        match side {
            DockKind::Left => Rect::from_min_max(
                host.min,
                pos2((host.left() + extent).min(host.right()), host.bottom()),
            ),
            DockKind::Right => Rect::from_min_max(
                pos2((host.right() - extent).max(host.left()), host.top()),
                host.max,
            ),
            DockKind::Up => Rect::from_min_max(
                host.min,
                pos2(host.right(), (host.top() + extent).min(host.bottom())),
            ),
            DockKind::Down | DockKind::Fill => Rect::from_min_max(
                pos2(host.left(), (host.bottom() - extent).max(host.top())),
                host.max,
            ),
        }
    }

    fn sync_docked_rects(&mut self) {
        for &panel in &self.observed {
            let rect = self
                .model
                .tree
                .find_panel(panel)
                .and_then(|node| self.model.tree.rect(node));
            if let (Some(rect), Some(p)) = (rect, self.panels.get_mut(&panel)) {
                p.frame_rect = rect;
            }
        }
    }

    fn relayout_minimized(&mut self) {
        let slots: Vec<(PanelId, usize)> = self
            .machines
            .iter()
            .filter_map(|(&panel, machine)| Some((panel, machine.config().minimized_slot?)))
            .collect();
        for (panel, slot) in slots {
            let rect = self.minimized_slot_rect(slot);
            self.set_panel_rect(panel, rect);
        }
    }

    fn layout_changed(&mut self) {
        self.sync_docked_rects();
        self.events.publish(&DockEvent::LayoutChanged);
    }

    fn after_structure_change(&mut self) {
        if self.config.debug_integrity {
            integrity::warn_on_integrity_issues(&self.model.tree, &mut self.integrity_hash);
        }
    }

    /// Put a panel leaf into the tree at `target`, or into the document area.
    fn attach_panel(
        &mut self,
        panel: PanelId,
        target: Option<DockInformation>,
    ) -> DockResult<NodeId> {
        let min_size = self
            .panels
            .get(&panel)
            .map(Panel::min_size)
            .ok_or(DockError::PanelNotFound(panel))?;
        let document = self.model.document_node();
        let tree = &mut self.model.tree;
        let node = tree.insert(Container::panel(panel, min_size));
        let result = match (target, document) {
            (Some(target), _) => {
                self.engine
                    .dock(tree, target.reference, node, target.kind, target.ratio)
            }
            (None, Some(document)) => self.engine.dock_fill(tree, document, node),
            (None, None) => self.engine.dock_root(tree, node, self.host_rect),
        };
        if let Err(err) = result {
            self.model.tree.dispose_node(node);
            return Err(err);
        }

        log::debug!("dock {panel:?} as {node:?}");
        self.layout_changed();
        self.events.publish(&DockEvent::Docked { panel, node });
        Ok(node)
    }

    // Persistence -------------------------------------------------------------

    fn panel_container_state(&self, panel: PanelId, state: &mut ContainerState) {
        if let Some(p) = self.panels.get(&panel) {
            state.panel_type = Some(p.panel_type.clone());
            state.title = Some(p.attributes.title.clone());
            state.content = p.content.save_state();
        }
    }

    /// Record the layout. Panels that were created but never placed are not part of it.
    pub fn snapshot(&self) -> DockSnapshot {
        let graph_info = persistence::snapshot_tree(&self.model.tree, |panel, state| {
            self.panel_container_state(panel, state);
        });

        let mut dialogs_info: Vec<PanelInfo> = self
            .model
            .dialogs()
            .iter()
            .map(|dialog| self.panel_info(dialog.panel, dialog.rect, dialog.hidden))
            .collect();

        // Panels parked in a collapser or popup have neither a node nor a dialog.
        for &panel in self.machines.keys() {
            if self.model.dialog(panel).is_none() && self.panel_node(panel).is_none() {
                let rect = self.panels.get(&panel).map_or(Rect::ZERO, |p| p.frame_rect);
                dialogs_info.push(self.panel_info(panel, rect, true));
            }
        }

        DockSnapshot {
            graph_info,
            dialogs_info,
        }
    }

    fn panel_info(&self, panel: PanelId, rect: Rect, is_hidden: bool) -> PanelInfo {
        let mut state = ContainerState {
            width: rect.width(),
            height: rect.height(),
            ..Default::default()
        };
        self.panel_container_state(panel, &mut state);
        PanelInfo {
            container_type: ContainerKind::Panel,
            state,
            position: rect.min,
            is_hidden,
            panel_state: self
                .panel_state(panel)
                .filter(|&s| s != PanelContainerState::Floating),
        }
    }

    /// Replace the layout and all panels with `graph`, typically made by a
    /// [`crate::DockBuilder`].
    ///
    /// # Errors
    /// As [`Self::load_state`]; the current layout is kept on error.
    pub fn install_layout(&mut self, graph: NodeInfo) -> DockResult<()> {
        self.restore_snapshot(&DockSnapshot {
            graph_info: Some(graph),
            dialogs_info: Vec::new(),
        })
    }

    /// Serialize the layout to JSON.
    ///
    /// # Errors
    /// [`DockError::Json`] if serialization fails.
    pub fn save_state(&self) -> DockResult<String> {
        self.snapshot().to_json()
    }

    /// Replace the layout and all panels with the one described by `json`.
    ///
    /// # Errors
    /// On any error the current layout is left untouched.
    pub fn load_state(&mut self, json: &str) -> DockResult<()> {
        let snapshot = DockSnapshot::from_json(json)?;
        self.restore_snapshot(&snapshot)
    }

    /// Replace the layout and all panels with `snapshot`.
    ///
    /// # Errors
    /// [`DockError::InvalidGraph`], [`DockError::UnknownPanelType`] or a content
    /// initialization error. The current layout is kept on error.
    pub fn restore_snapshot(&mut self, snapshot: &DockSnapshot) -> DockResult<()> {
        let mut created: Vec<Panel> = Vec::new();
        let mut next_id = self.next_panel_id;
        let registry = &mut self.registry;
        let mut make_panel = |state: &ContainerState| -> DockResult<(PanelId, Vec2)> {
            let panel_type = state
                .panel_type
                .clone()
                .ok_or_else(|| DockError::InvalidGraph("panel without a type".to_owned()))?;
            let mut panel = instantiate(
                registry,
                &mut next_id,
                &panel_type,
                &serde_json::Value::Null,
                state.title.as_deref(),
            )?;
            panel.content.load_state(&state.content);
            panel.frame_rect = Rect::from_min_size(Pos2::ZERO, vec2(state.width, state.height));
            let result = (panel.id, panel.min_size());
            created.push(panel);
            Ok(result)
        };

        let graph = match &snapshot.graph_info {
            Some(info) => Some(persistence::restore_tree(
                info,
                self.config.splitter_bar_size,
                self.host_rect,
                &mut make_panel,
            )?),
            None => None,
        };
        let mut dialogs = Vec::new();
        for info in &snapshot.dialogs_info {
            if info.container_type != ContainerKind::Panel {
                return Err(DockError::InvalidGraph(format!(
                    "dialog holding a {:?} container",
                    info.container_type
                )));
            }
            let (panel, _) = make_panel(&info.state)?;
            dialogs.push((panel, info));
        }

        // Everything was built; replace the live layout.
        self.clear_panels()?;
        self.model = DockModel::new();
        self.next_panel_id = next_id;
        for panel in created {
            self.registry.register_instance(&panel.panel_type, panel.id);
            self.panels.insert(panel.id, panel);
        }
        if let Some(graph) = graph {
            self.model.tree = graph.tree;
            self.model.set_document_node(graph.document_node);
            for (_, panel) in graph.panels {
                let machine = PanelStateMachine::new(panel, PanelContainerState::Docked, self)?;
                self.machines.insert(panel, machine);
            }
        }
        for (panel, info) in dialogs {
            self.restore_dialog(panel, info)?;
        }

        log::debug!("loaded layout with {} panels", self.panels.len());
        self.layout_changed();
        self.after_structure_change();
        Ok(())
    }

    fn restore_dialog(&mut self, panel: PanelId, info: &PanelInfo) -> DockResult<()> {
        let config = SharedStateConfig {
            dialog_rect: Some(info.rect()),
            ..Default::default()
        };
        let machine =
            PanelStateMachine::with_config(panel, PanelContainerState::Floating, config, self)?;
        self.machines.insert(panel, machine);

        match info.panel_state {
            None | Some(PanelContainerState::Floating) => {
                if info.is_hidden {
                    self.hide_dialog(panel);
                }
            }
            Some(PanelContainerState::Maximized) => {
                self.maximize(panel)?;
            }
            Some(PanelContainerState::Minimized) => {
                self.minimize(panel)?;
            }
            Some(PanelContainerState::Docked) => {
                self.place(panel, None)?;
            }
            Some(PanelContainerState::InCollapser) => {
                self.place(panel, None)?;
                self.unpin_panel(panel)?;
            }
            Some(PanelContainerState::PopupWindow) => {
                self.place(panel, None)?;
                self.show_popup(panel)?;
            }
        }
        Ok(())
    }

    /// Close every panel without asking its content.
    fn clear_panels(&mut self) -> DockResult<()> {
        let panels: Vec<PanelId> = self.panels.keys().copied().collect();
        for panel in panels {
            self.teardown_panel(panel)?;
        }
        self.set_active_panel(None)?;
        self.observed.clear();
        self.popups.clear();
        self.minimized_slots.clear();
        Ok(())
    }
}

/// Create and initialize the content of a `panel_type` panel, allocating its id from
/// `next_id` only on success.
fn instantiate(
    registry: &mut PanelTypeRegistry,
    next_id: &mut u64,
    panel_type: &str,
    options: &serde_json::Value,
    title: Option<&str>,
) -> DockResult<Panel> {
    let view_kind = registry
        .metadata(panel_type)
        .map(|metadata| metadata.view_kind)
        .ok_or_else(|| DockError::UnknownPanelType(panel_type.to_owned()))?;
    let mut content = registry.create_content(panel_type)?;
    let mut attributes = PanelAttributes {
        title: panel_type.to_owned(),
        ..Default::default()
    };
    let surface = content
        .initialize(&mut attributes, options)
        .map_err(|err| DockError::ContentInitialization {
            panel_type: panel_type.to_owned(),
            message: err.to_string(),
        })?;
    if let Some(title) = title {
        title.clone_into(&mut attributes.title);
    }

    *next_id += 1;
    Ok(Panel {
        id: PanelId::from_u64(*next_id),
        panel_type: panel_type.to_owned(),
        view_kind,
        attributes,
        content,
        surface,
        frame_rect: Rect::ZERO,
        header_visible: true,
        visible: false,
    })
}

// ----------------------------------------------------------------------------

impl PanelHost for DockManager {
    fn container_rect(&self) -> Rect {
        self.host_rect
    }

    fn panel_rect(&self, panel: PanelId) -> Rect {
        self.panels.get(&panel).map_or(Rect::ZERO, |p| p.frame_rect)
    }

    fn set_panel_rect(&mut self, panel: PanelId, rect: Rect) {
        if let Some(p) = self.panels.get_mut(&panel) {
            p.frame_rect = rect;
        }
    }

    fn is_header_visible(&self, panel: PanelId) -> bool {
        self.panels.get(&panel).is_some_and(|p| p.header_visible)
    }

    fn set_header_visible(&mut self, panel: PanelId, visible: bool) {
        if let Some(p) = self.panels.get_mut(&panel) {
            p.header_visible = visible;
        }
    }

    fn set_panel_visible(&mut self, panel: PanelId, visible: bool) {
        if let Some(p) = self.panels.get_mut(&panel) {
            p.visible = visible;
        }
    }

    fn observe_placeholder(&mut self, panel: PanelId, observe: bool) {
        if observe {
            self.observed.insert(panel);
            self.sync_docked_rects();
        } else {
            self.observed.remove(&panel);
        }
    }

    fn collapsers_enabled(&self) -> bool {
        self.config.enable_collapsers
    }

    fn default_dialog_size(&self) -> Vec2 {
        self.config.default_dialog_size
    }

    fn is_docked(&self, panel: PanelId) -> bool {
        self.panel_node(panel).is_some()
    }

    fn undock_panel(&mut self, panel: PanelId) -> DockResult<()> {
        let Some(node) = self.panel_node(panel) else {
            return Ok(());
        };
        self.engine.close(&mut self.model.tree, node)?;
        log::debug!("undock {panel:?} from {node:?}");
        self.layout_changed();
        self.events.publish(&DockEvent::Undocked { panel });
        Ok(())
    }

    fn dock_panel(&mut self, panel: PanelId, target: Option<DockInformation>) -> DockResult<()> {
        self.attach_panel(panel, target).map(|_| ())
    }

    fn scan_auto_dock(&self, panel: PanelId) -> AutoDock {
        self.panel_node(panel)
            .map(|node| AutoDock::scan(&self.engine, &self.model.tree, node))
            .unwrap_or_default()
    }

    fn restore_auto_dock(&mut self, panel: PanelId, auto_dock: &AutoDock) -> DockResult<()> {
        let target = auto_dock.restore_target(&self.model.tree);
        self.attach_panel(panel, target).map(|_| ())
    }

    fn show_dialog(&mut self, panel: PanelId, rect: Rect) {
        match self.model.dialog_mut(panel) {
            Some(dialog) => {
                dialog.rect = rect;
                dialog.hidden = false;
                self.model.bring_to_front(panel);
            }
            None => {
                self.model.add_dialog(Dialog {
                    panel,
                    rect,
                    hidden: false,
                    collapsed: false,
                });
                self.events.publish(&DockEvent::DialogCreated { panel });
            }
        }
        self.events.publish(&DockEvent::DialogShown { panel });
    }

    fn hide_dialog(&mut self, panel: PanelId) {
        if let Some(dialog) = self.model.dialog_mut(panel) {
            dialog.hidden = true;
            self.events.publish(&DockEvent::DialogHidden { panel });
        }
    }

    fn remove_dialog(&mut self, panel: PanelId) {
        if self.model.remove_dialog(panel).is_some() {
            self.events.publish(&DockEvent::DialogHidden { panel });
        }
    }

    fn dialog_rect(&self, panel: PanelId) -> Option<Rect> {
        self.model.dialog(panel).map(|dialog| dialog.rect)
    }

    fn set_dialog_collapsed(&mut self, panel: PanelId, collapsed: bool) {
        if let Some(dialog) = self.model.dialog_mut(panel) {
            dialog.collapsed = collapsed;
        }
    }

    fn request_minimize_slot(&mut self) -> usize {
        let slot = self.next_minimized_slot;
        self.next_minimized_slot += 1;
        self.minimized_slots.insert(0, slot);
        slot
    }

    fn release_minimize_slot(&mut self, slot: usize) {
        self.minimized_slots.retain(|&s| s != slot);
        self.relayout_minimized();
    }

    fn minimized_slot_rect(&self, slot: usize) -> Rect {
        let count = self.minimized_slots.len();
        let position = self
            .minimized_slots
            .iter()
            .position(|&s| s == slot)
            .map_or(count, |index| count - 1 - index);
        self.slot_rect(position)
    }

    fn next_free_minimized_slot_rect(&self) -> Rect {
        self.slot_rect(self.minimized_slots.len())
    }

    fn create_collapser(&mut self, panel: PanelId, side: DockKind) {
        self.model.add_collapser(panel, side);
        let rect = self.collapser_rect(side);
        self.set_panel_rect(panel, rect);
    }

    fn remove_collapser(&mut self, panel: PanelId) {
        self.model.remove_collapser(panel);
    }

    fn show_collapsed_panel(&mut self, panel: PanelId, shown: bool) {
        if let Some(collapser) = self.model.collapser_mut(panel) {
            collapser.shown = shown;
        }
    }

    fn open_popup(&mut self, panel: PanelId) {
        self.popups.insert(panel);
    }

    fn close_popup(&mut self, panel: PanelId) {
        self.popups.remove(&panel);
    }

    fn start_animation(&mut self, animation: &Animation) -> AnimationStatus {
        self.animator.start(animation)
    }
}
