//! Structural docking engine: a dock-node tree, the layout operations that reshape
//! it, proportional splitter sizing under minimum sizes, and a per-panel
//! presentation state machine.
//!
//! Rendering is left to the host. [`DockManager`] is the entry point: register panel
//! types, create panels, dock them next to each other, float, maximize, minimize,
//! pin and unpin them, and save or load the whole layout as JSON.
//!
//! ```
//! use egui::{Pos2, Rect, vec2};
//! use egui_docking_core::{DockConfig, DockManager};
//!
//! let host = Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 720.0));
//! let manager = DockManager::new(DockConfig::default(), host).unwrap();
//! assert_eq!(manager.tree().root(), manager.document_node());
//! ```

#![forbid(unsafe_code)]

pub mod auto_dock;
pub mod config;
pub mod container;
pub mod dock_builder;
pub mod error;
pub mod events;
pub mod integrity;
pub mod layout;
pub mod manager;
pub mod model;
pub mod node;
pub mod panel;
pub mod panel_state;
pub mod persistence;
pub mod splitter;

#[cfg(test)]
mod manager_tests;
#[cfg(test)]
mod model_tests;

pub use auto_dock::AutoDock;
pub use config::DockConfig;
pub use container::{Container, ContainerKind, ContainerState, DockContainer, Orientation};
pub use dock_builder::{DockBuilder, DockNodeId, SplitDirection};
pub use error::{DockError, DockResult};
pub use events::{DockEvent, EventEmitter, SubscriptionId};
pub use layout::{DockInformation, DockKind, DockLayoutEngine};
pub use manager::DockManager;
pub use model::{Collapser, Dialog, DockModel};
pub use node::{DockNode, DockTree, NodeId};
pub use panel::{
    InstanceType, Panel, PanelAttributes, PanelContent, PanelId, PanelTypeMetadata,
    PanelTypeRegistry, SurfaceHandle, ViewKind,
};
pub use panel_state::{
    Animation, AnimationStatus, Animator, ImmediateAnimator, PanelContainerState, PanelHost,
    PanelStateMachine, SharedStateConfig, TransitionKind, TransitionOutcome,
};
pub use persistence::{DockSnapshot, NodeInfo, PanelInfo};
pub use splitter::SplitterSizing;
