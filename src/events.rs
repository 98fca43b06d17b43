//! Change notifications published by [`crate::DockManager`].
//!
//! Each manager owns its own [`EventEmitter`]; handlers live exactly as long as the
//! manager (or until unsubscribed), there is no process-wide bus.

use egui::Rect;

use crate::node::NodeId;
use crate::panel::PanelId;
use crate::panel_state::PanelContainerState;

/// Events emitted by the dock manager.
#[derive(Clone, Debug, PartialEq)]
pub enum DockEvent {
    /// A panel entered the dock tree.
    Docked { panel: PanelId, node: NodeId },

    /// A panel left the dock tree (it may still exist, e.g. floating).
    Undocked { panel: PanelId },

    /// A panel was destroyed.
    Closed { panel: PanelId },

    /// The tree structure changed (composites created or collapsed, nodes moved).
    LayoutChanged,

    /// The host surface was resized.
    ContainerResized { rect: Rect },

    StateChanged {
        panel: PanelId,
        from: PanelContainerState,
        to: PanelContainerState,
    },

    /// A panel was collapsed to its header.
    Collapsed { panel: PanelId },

    Expanded { panel: PanelId },

    ActivePanelChanged {
        panel: Option<PanelId>,
        previous: Option<PanelId>,
    },

    DialogCreated { panel: PanelId },
    DialogShown { panel: PanelId },
    DialogHidden { panel: PanelId },

    /// A panel moved from a collapser margin back into the tree.
    Pinned { panel: PanelId },

    /// A panel moved from the tree into a collapser margin.
    Unpinned { panel: PanelId },
}

/// Handle returned by [`EventEmitter::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// A subscribe/publish list, scoped to its owner.
pub struct EventEmitter<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Call every handler, in subscription order.
    pub fn publish(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Drop every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn publish_reaches_subscribers_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = EventEmitter::<DockEvent>::new();

        let sink = Rc::clone(&seen);
        let id = emitter.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        emitter.publish(&DockEvent::LayoutChanged);
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.publish(&DockEvent::LayoutChanged);

        assert_eq!(*seen.borrow(), vec![DockEvent::LayoutChanged]);
    }

    #[test]
    fn clear_releases_handlers() {
        let seen = Rc::new(RefCell::new(0));
        let mut emitter = EventEmitter::<DockEvent>::new();
        let sink = Rc::clone(&seen);
        emitter.subscribe(move |_| *sink.borrow_mut() += 1);

        emitter.clear();
        emitter.publish(&DockEvent::LayoutChanged);
        assert_eq!(*seen.borrow(), 0);
        assert_eq!(Rc::strong_count(&seen), 1);
    }
}
