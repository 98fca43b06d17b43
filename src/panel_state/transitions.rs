//! The table of legal state pairs and the visual effect of each.

use egui::Rect;

use super::{PanelContainerState, PanelHost, SharedStateConfig};
use crate::panel::PanelId;

/// Visual effect played between two states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Instant switch.
    NoAction,
    Maximize,
    Minimize,
    Restore,
}

impl TransitionKind {
    /// The transition for `from -> to`, or `None` if the pair is not in the table.
    pub fn lookup(from: PanelContainerState, to: PanelContainerState) -> Option<Self> {
        use PanelContainerState::{Docked, Floating, InCollapser, Maximized, Minimized, PopupWindow};

        let kind = match (from, to) {
            (Docked | Floating | Minimized, Maximized) => Self::Maximize,
            (Maximized | Floating, Minimized) => Self::Minimize,
            (Minimized, Floating) | (Maximized, Docked | Floating) => Self::Restore,
            (Docked, Floating | PopupWindow | InCollapser)
            | (Floating | PopupWindow | InCollapser, Docked) => Self::NoAction,
            _ => return None,
        };
        Some(kind)
    }

    /// Where the panel ends up when this transition finishes.
    ///
    /// `None` for [`Self::NoAction`], which has no animation.
    pub fn target_rect(
        self,
        panel: PanelId,
        to: PanelContainerState,
        config: &SharedStateConfig,
        host: &dyn PanelHost,
    ) -> Option<Rect> {
        let current = host.panel_rect(panel);
        match self {
            Self::NoAction => None,
            Self::Maximize => Some(host.container_rect()),
            Self::Minimize => Some(host.next_free_minimized_slot_rect()),
            Self::Restore => Some(match to {
                PanelContainerState::Floating => config.dialog_rect.unwrap_or(current),
                _ => config.original_rect.unwrap_or(current),
            }),
        }
    }
}

/// A transition animation handed to the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub panel: PanelId,
    pub kind: TransitionKind,
    pub from: Rect,
    pub to: Rect,
}

/// Whether the host finished an animation synchronously.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Finished,

    /// The host calls `complete_animation` once the animation is over.
    Running,
}

/// Plays transition animations.
pub trait Animator {
    fn start(&mut self, animation: &Animation) -> AnimationStatus;
}

/// Finishes every animation at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateAnimator;

impl Animator for ImmediateAnimator {
    fn start(&mut self, _animation: &Animation) -> AnimationStatus {
        AnimationStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_the_documented_pairs() {
        use PanelContainerState::{Docked, Floating, InCollapser, Maximized, Minimized, PopupWindow};

        let expect = [
            (Minimized, Maximized, TransitionKind::Maximize),
            (Minimized, Floating, TransitionKind::Restore),
            (Maximized, Minimized, TransitionKind::Minimize),
            (Maximized, Docked, TransitionKind::Restore),
            (Maximized, Floating, TransitionKind::Restore),
            (Docked, Maximized, TransitionKind::Maximize),
            (Floating, Maximized, TransitionKind::Maximize),
            (Floating, Minimized, TransitionKind::Minimize),
            (Docked, Floating, TransitionKind::NoAction),
            (Floating, Docked, TransitionKind::NoAction),
            (Docked, PopupWindow, TransitionKind::NoAction),
            (PopupWindow, Docked, TransitionKind::NoAction),
            (Docked, InCollapser, TransitionKind::NoAction),
            (InCollapser, Docked, TransitionKind::NoAction),
        ];
        for (from, to, kind) in expect {
            assert_eq!(TransitionKind::lookup(from, to), Some(kind), "{from:?} -> {to:?}");
        }

        assert_eq!(TransitionKind::lookup(Docked, Minimized), None);
        assert_eq!(TransitionKind::lookup(Minimized, Docked), None);
        assert_eq!(TransitionKind::lookup(InCollapser, Floating), None);
        assert_eq!(TransitionKind::lookup(Docked, Docked), None);
    }
}
