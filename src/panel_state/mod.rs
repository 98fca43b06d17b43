//! Per-panel presentation state machine.
//!
//! A transition runs in this order: the current state vets the request (and may
//! record what its successor needs), the pair is looked up in the transition
//! table, the current state is left, the transition animation runs, and finally
//! the target state is entered. A request the current state refuses changes
//! nothing. A pair missing from the table is an error and rolls the shared config
//! back to what it was before the request.
//!
//! While an animation is running the machine is between states and refuses every
//! further request until [`PanelStateMachine::complete_animation`] is called.

use egui::Rect;

use crate::error::{DockError, DockResult};
use crate::layout::DockInformation;
use crate::panel::PanelId;

mod config;
mod host;
mod states;
mod transitions;

pub use config::SharedStateConfig;
pub use host::PanelHost;
pub use states::{PanelState, StateContext, create_state};
pub use transitions::{Animation, AnimationStatus, Animator, ImmediateAnimator, TransitionKind};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
pub enum PanelContainerState {
    #[default]
    Docked,
    Floating,
    Maximized,
    Minimized,
    InCollapser,
    PopupWindow,
}

/// What became of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Not legal from the current state. Nothing changed.
    Rejected,

    /// The animation is still running; the target is entered on `complete_animation`.
    Started {
        from: PanelContainerState,
        to: PanelContainerState,
    },

    Completed {
        from: PanelContainerState,
        to: PanelContainerState,
    },
}

impl TransitionOutcome {
    pub fn is_rejected(self) -> bool {
        self == Self::Rejected
    }
}

#[derive(Clone, Copy, Debug)]
enum Request {
    Dock(Option<DockInformation>),
    Float(Option<Rect>),
    Maximize,
    Minimize,
    Restore,
    ShowPopup,
    HidePopup,
    Pin,
    Unpin,
}

#[derive(Clone, Debug)]
struct InFlight {
    from: PanelContainerState,
    to: PanelContainerState,

    /// Shared values from before the request, for falling back.
    snapshot: SharedStateConfig,
}

/// The state machine of one panel.
#[derive(Debug)]
pub struct PanelStateMachine {
    panel: PanelId,
    state: PanelContainerState,

    /// `None` only while a transition animation is running.
    current: Option<Box<dyn PanelState>>,

    config: SharedStateConfig,
    in_flight: Option<InFlight>,
}

impl PanelStateMachine {
    /// Create the machine and enter `initial`.
    ///
    /// # Errors
    /// The error of entering `initial`.
    pub fn new(
        panel: PanelId,
        initial: PanelContainerState,
        host: &mut dyn PanelHost,
    ) -> DockResult<Self> {
        Self::with_config(panel, initial, SharedStateConfig::default(), host)
    }

    /// Like [`Self::new`], starting from previously saved shared values.
    ///
    /// # Errors
    /// The error of entering `initial`.
    pub fn with_config(
        panel: PanelId,
        initial: PanelContainerState,
        config: SharedStateConfig,
        host: &mut dyn PanelHost,
    ) -> DockResult<Self> {
        let mut machine = Self {
            panel,
            state: initial,
            current: None,
            config,
            in_flight: None,
        };
        machine.enter(initial, host)?;
        Ok(machine)
    }

    pub fn panel(&self) -> PanelId {
        self.panel
    }

    pub fn state(&self) -> PanelContainerState {
        self.state
    }

    pub fn config(&self) -> &SharedStateConfig {
        &self.config
    }

    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    // Requests ----------------------------------------------------------------

    /// Dock a floating panel at `target`, or into the document area.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs, or whatever the
    /// target state fails with on entry.
    pub fn dock_panel(
        &mut self,
        host: &mut dyn PanelHost,
        target: Option<DockInformation>,
    ) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Dock(target))
    }

    /// Float the panel in a dialog at `rect`, or its last dialog rect.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn float_panel(
        &mut self,
        host: &mut dyn PanelHost,
        rect: Option<Rect>,
    ) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Float(rect))
    }

    /// Maximize over the host area.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn maximize(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Maximize)
    }

    /// Minimize into a slot of the host.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn minimize(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Minimize)
    }

    /// Return to the state recorded before maximizing or minimizing.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn restore(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Restore)
    }

    /// Move a docked panel into a popup window.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn show_popup(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::ShowPopup)
    }

    /// Close the popup and dock back where the panel came from.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn hide_popup(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::HidePopup)
    }

    /// Dock a collapser panel back where it was.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn pin_panel(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Pin)
    }

    /// Park a docked panel in a collapser margin.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs and
    /// [`DockError::UnknownTransition`] for a pair outside the table. If entering the
    /// new state fails, that error is returned and the machine is back in its
    /// previous state.
    pub fn unpin_panel(&mut self, host: &mut dyn PanelHost) -> DockResult<TransitionOutcome> {
        self.request(host, Request::Unpin)
    }

    /// Collapse to the header (floating) or slide back into the margin (collapser).
    ///
    /// Returns `false` if the current state has nothing to collapse.
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs.
    pub fn collapse(&mut self, host: &mut dyn PanelHost) -> DockResult<bool> {
        self.with_current(host, |state, ctx| state.collapse(ctx))
    }

    /// Undo [`Self::collapse`].
    ///
    /// # Errors
    /// [`DockError::TransitionInProgress`] while an animation runs.
    pub fn expand(&mut self, host: &mut dyn PanelHost) -> DockResult<bool> {
        self.with_current(host, |state, ctx| state.expand(ctx))
    }

    /// The host area changed size.
    pub fn update_layout(&mut self, host: &mut dyn PanelHost) {
        let panel = self.panel;
        if let Some(current) = self.current.as_mut() {
            let mut ctx = StateContext {
                panel,
                config: &mut self.config,
                host,
            };
            current.update_layout(&mut ctx);
        }
    }

    /// Finish the running animation and enter the target state.
    ///
    /// # Errors
    /// [`DockError::NoTransitionInFlight`] if nothing is running.
    pub fn complete_animation(
        &mut self,
        host: &mut dyn PanelHost,
    ) -> DockResult<TransitionOutcome> {
        let InFlight { from, to, snapshot } = self
            .in_flight
            .take()
            .ok_or(DockError::NoTransitionInFlight(self.panel))?;
        self.commit(from, to, snapshot, host)
    }

    /// Release what the current state holds. The machine is unusable afterwards.
    pub fn dispose(&mut self, host: &mut dyn PanelHost) {
        let panel = self.panel;
        if let Some(mut current) = self.current.take() {
            let mut ctx = StateContext {
                panel,
                config: &mut self.config,
                host,
            };
            current.dispose(&mut ctx);
        }
        self.in_flight = None;
        self.config.clear();
    }

    // ------------------------------------------------------------------------

    fn with_current<R>(
        &mut self,
        host: &mut dyn PanelHost,
        f: impl FnOnce(&mut dyn PanelState, &mut StateContext<'_>) -> R,
    ) -> DockResult<R> {
        if self.in_flight.is_some() {
            return Err(DockError::TransitionInProgress(self.panel));
        }
        let current = self
            .current
            .as_mut()
            .ok_or(DockError::TransitionInProgress(self.panel))?;
        let mut ctx = StateContext {
            panel: self.panel,
            config: &mut self.config,
            host,
        };
        Ok(f(current.as_mut(), &mut ctx))
    }

    fn request(
        &mut self,
        host: &mut dyn PanelHost,
        request: Request,
    ) -> DockResult<TransitionOutcome> {
        let panel = self.panel;
        let from = self.state;
        let to = match request {
            Request::Dock(_) | Request::Pin => PanelContainerState::Docked,
            Request::Float(_) => PanelContainerState::Floating,
            Request::Maximize => PanelContainerState::Maximized,
            Request::Minimize => PanelContainerState::Minimized,
            Request::Restore | Request::HidePopup => self.config.restore_state(),
            Request::ShowPopup => PanelContainerState::PopupWindow,
            Request::Unpin => PanelContainerState::InCollapser,
        };

        let snapshot = self.config.clone();
        if self.in_flight.is_some() {
            log::warn!("{panel:?}: {request:?} while a transition is running");
            return Err(DockError::TransitionInProgress(panel));
        }
        let mut current = self
            .current
            .take()
            .ok_or(DockError::TransitionInProgress(panel))?;

        let mut ctx = StateContext {
            panel,
            config: &mut self.config,
            host: &mut *host,
        };
        let allowed = match request {
            Request::Dock(target) => current.dock_panel(&mut ctx, target),
            Request::Float(rect) => current.float_panel(&mut ctx, rect),
            Request::Maximize => current.maximize(&mut ctx),
            Request::Minimize => current.minimize(&mut ctx),
            Request::Restore => current.restore(&mut ctx),
            Request::ShowPopup => current.show_popup(&mut ctx),
            Request::HidePopup => current.hide_popup(&mut ctx),
            Request::Pin => current.pin_panel(&mut ctx),
            Request::Unpin => current.unpin_panel(&mut ctx),
        };
        if !allowed {
            log::debug!("{panel:?}: {request:?} rejected in {from:?}");
            self.config = snapshot;
            self.current = Some(current);
            return Ok(TransitionOutcome::Rejected);
        }

        let Some(kind) = TransitionKind::lookup(from, to) else {
            self.config = snapshot;
            self.current = Some(current);
            return Err(DockError::UnknownTransition { from, to });
        };

        if let Err(err) = current.leave(&mut ctx) {
            self.config = snapshot;
            self.current = Some(current);
            return Err(err);
        }
        drop(current);

        let animation = kind
            .target_rect(panel, to, &self.config, host)
            .map(|target| Animation {
                panel,
                kind,
                from: host.panel_rect(panel),
                to: target,
            });
        let status = match &animation {
            Some(animation) => host.start_animation(animation),
            None => AnimationStatus::Finished,
        };
        log::debug!("{panel:?}: {from:?} -> {to:?} ({kind:?}, {status:?})");

        match status {
            AnimationStatus::Finished => self.commit(from, to, snapshot, host),
            AnimationStatus::Running => {
                self.in_flight = Some(InFlight { from, to, snapshot });
                Ok(TransitionOutcome::Started { from, to })
            }
        }
    }

    /// Enter `to`. If that fails, enter `from` again with the shared values it had,
    /// keeping the dialog rect recorded on the way out.
    fn commit(
        &mut self,
        from: PanelContainerState,
        to: PanelContainerState,
        snapshot: SharedStateConfig,
        host: &mut dyn PanelHost,
    ) -> DockResult<TransitionOutcome> {
        let Err(err) = self.enter(to, host) else {
            return Ok(TransitionOutcome::Completed { from, to });
        };

        let panel = self.panel;
        log::warn!("{panel:?}: entering {to:?} failed ({err}), back to {from:?}");
        let dialog_rect = self.config.dialog_rect;
        self.config = snapshot;
        if dialog_rect.is_some() {
            self.config.dialog_rect = dialog_rect;
        }
        if let Err(again) = self.enter(from, host) {
            log::warn!("{panel:?}: entering {from:?} again failed too: {again}");
        }
        Err(err)
    }

    /// Install and enter `state`. The state counts as current even if entering fails.
    fn enter(&mut self, state: PanelContainerState, host: &mut dyn PanelHost) -> DockResult<()> {
        let mut next = create_state(state);
        let mut ctx = StateContext {
            panel: self.panel,
            config: &mut self.config,
            host,
        };
        let result = next.enter(&mut ctx);
        self.state = state;
        self.current = Some(next);
        result
    }
}
