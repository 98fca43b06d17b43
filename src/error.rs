use crate::node::NodeId;
use crate::panel::PanelId;
use crate::panel_state::PanelContainerState;

/// Everything that can go wrong while mutating a dock layout.
///
/// Structural and transition errors are reported before any mutation takes place,
/// so an `Err` always leaves the model exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum DockError {
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),

    #[error("node {reference:?} is not a child of {parent:?}")]
    ReferenceNotFound { parent: NodeId, reference: NodeId },

    #[error("splitter requires at least 2 children, got {0}")]
    InsufficientChildren(usize),

    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("docking {node:?} next to {reference:?} would create a cycle")]
    WouldCreateCycle { node: NodeId, reference: NodeId },

    #[error("node {0:?} is already attached to the tree")]
    NodeAlreadyAttached(NodeId),

    #[error("panel {0:?} is already docked")]
    AlreadyDocked(PanelId),

    #[error("panel {0:?} does not exist")]
    PanelNotFound(PanelId),

    #[error("no transition defined from {from:?} to {to:?}")]
    UnknownTransition {
        from: PanelContainerState,
        to: PanelContainerState,
    },

    #[error("panel {panel:?} cannot do that while {state:?}")]
    TransitionRejected {
        panel: PanelId,
        state: PanelContainerState,
    },

    #[error("panel {0:?} is already transitioning")]
    TransitionInProgress(PanelId),

    #[error("panel {0:?} has no transition in flight")]
    NoTransitionInFlight(PanelId),

    #[error("panel {0:?} refused to close")]
    CloseVetoed(PanelId),

    #[error("panel type {0:?} is already registered")]
    PanelTypeAlreadyRegistered(String),

    #[error("panel type {0:?} is not registered")]
    UnknownPanelType(String),

    #[error("failed to initialize panel of type {panel_type:?}: {message}")]
    ContentInitialization { panel_type: String, message: String },

    #[error("invalid dock graph: {0}")]
    InvalidGraph(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DockResult<T> = Result<T, DockError>;
