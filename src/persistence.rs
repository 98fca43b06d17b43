//! Snapshot of a dock layout: the tree (`graphInfo`) plus every panel that lives
//! outside of it (`dialogsInfo`), as plain serde records.
//!
//! Restoring rebuilds a fresh [`DockTree`] next to the live one; the caller swaps it in
//! only once everything succeeded.

use egui::{Pos2, Rect, Vec2, vec2};

use crate::container::{
    Container, ContainerKind, ContainerState, DockContainer as _, Orientation, SplitContainer,
};
use crate::error::{DockError, DockResult};
use crate::integrity::tree_integrity_issues;
use crate::node::{DockTree, NodeId};
use crate::panel::PanelId;
use crate::panel_state::PanelContainerState;

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockSnapshot {
    /// `None` for an empty tree.
    pub graph_info: Option<NodeInfo>,

    /// Panels outside the tree, back to front.
    #[serde(default)]
    pub dialogs_info: Vec<PanelInfo>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub container_type: ContainerKind,
    pub state: ContainerState,

    #[serde(default)]
    pub children: Vec<NodeInfo>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelInfo {
    pub container_type: ContainerKind,
    pub state: ContainerState,
    pub position: Pos2,
    pub is_hidden: bool,

    /// State to bring the panel back to. Absent means floating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_state: Option<PanelContainerState>,
}

impl PanelInfo {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, vec2(self.state.width, self.state.height))
    }
}

impl DockSnapshot {
    /// Serialize to the JSON graph format.
    ///
    /// # Errors
    /// [`DockError::Json`] if serialization fails.
    pub fn to_json(&self) -> DockResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON graph format.
    ///
    /// # Errors
    /// [`DockError::Json`] for malformed input.
    pub fn from_json(json: &str) -> DockResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ----------------------------------------------------------------------------

/// Record the tree rooted at the tree's root.
///
/// `panel_state` fills in what only the panel owner knows (type name, content blob).
pub fn snapshot_tree(
    tree: &DockTree,
    mut panel_state: impl FnMut(PanelId, &mut ContainerState),
) -> Option<NodeInfo> {
    fn snapshot_node(
        tree: &DockTree,
        id: NodeId,
        panel_state: &mut dyn FnMut(PanelId, &mut ContainerState),
    ) -> Option<NodeInfo> {
        let container = tree.container(id).ok()?;
        let mut state = ContainerState::default();
        container.save_state(&mut state);
        if let Some(panel) = container.panel_id() {
            panel_state(panel, &mut state);
        }
        let children = tree
            .children(id)
            .iter()
            .filter_map(|&child| snapshot_node(tree, child, panel_state))
            .collect();
        Some(NodeInfo {
            container_type: container.kind(),
            state,
            children,
        })
    }

    let root = tree.root()?;
    snapshot_node(tree, root, &mut panel_state)
}

/// A tree rebuilt from a [`NodeInfo`].
#[derive(Debug)]
pub struct RestoredGraph {
    pub tree: DockTree,

    /// First document area found, depth-first.
    pub document_node: Option<NodeId>,

    /// Every panel leaf, depth-first.
    pub panels: Vec<(NodeId, PanelId)>,
}

struct Restorer<'a> {
    bar_size: f32,
    tree: DockTree,
    document_node: Option<NodeId>,
    panels: Vec<(NodeId, PanelId)>,
    make_panel: &'a mut dyn FnMut(&ContainerState) -> DockResult<(PanelId, Vec2)>,
}

impl Restorer<'_> {
    fn restore(&mut self, info: &NodeInfo, is_root: bool) -> DockResult<NodeId> {
        let size = vec2(info.state.width, info.state.height);
        let children = info
            .children
            .iter()
            .map(|child| self.restore(child, false))
            .collect::<DockResult<Vec<_>>>()?;

        let id = match info.container_type {
            ContainerKind::Panel => {
                if !children.is_empty() {
                    return Err(DockError::InvalidGraph(
                        "panel node with children".to_owned(),
                    ));
                }
                let (panel, min_size) = (self.make_panel)(&info.state)?;
                let id = self.tree.insert(Container::panel(panel, min_size));
                self.panels.push((id, panel));
                id
            }
            kind @ (ContainerKind::Row | ContainerKind::Column) => {
                let Some(orientation) = Orientation::from_kind(kind) else {
                    return Err(DockError::InvalidGraph(format!("{kind:?} has no orientation")));
                };
                let bounds = Rect::from_min_size(Pos2::ZERO, size);
                let split =
                    SplitContainer::new(orientation, self.bar_size, children.clone(), bounds)
                        .map_err(|err| DockError::InvalidGraph(err.to_string()))?;
                let id = self.tree.insert(Container::Split(split));
                for &child in &children {
                    self.tree.add_child(id, child)?;
                }
                let sizes: Vec<f32> = info
                    .children
                    .iter()
                    .map(|child| {
                        orientation.varying(vec2(child.state.width, child.state.height))
                    })
                    .collect();
                self.tree.load_sizes(id, &sizes)?;
                id
            }
            ContainerKind::Fill => {
                let container = if info.state.document_manager {
                    Container::document_manager()
                } else {
                    if children.len() < 2 && !is_root {
                        return Err(DockError::InvalidGraph(format!(
                            "tab group with {} children",
                            children.len()
                        )));
                    }
                    Container::tabs()
                };
                let id = self.tree.insert(container);
                for &child in &children {
                    self.tree.add_child(id, child)?;
                }
                self.tree.perform_layout(id, true)?;
                if info.state.document_manager && self.document_node.is_none() {
                    self.document_node = Some(id);
                }
                id
            }
        };

        self.tree.container_mut(id)?.load_state(&info.state);
        Ok(id)
    }
}

/// Rebuild a tree from `info`, rescaled to `host`.
///
/// `make_panel` creates the panel for a panel node and returns its id and minimum size.
///
/// # Errors
/// [`DockError::InvalidGraph`] if the record does not describe a valid tree, or whatever
/// `make_panel` fails with.
pub fn restore_tree(
    info: &NodeInfo,
    bar_size: f32,
    host: Rect,
    mut make_panel: impl FnMut(&ContainerState) -> DockResult<(PanelId, Vec2)>,
) -> DockResult<RestoredGraph> {
    let mut restorer = Restorer {
        bar_size,
        tree: DockTree::new(),
        document_node: None,
        panels: Vec::new(),
        make_panel: &mut make_panel,
    };
    let root = restorer.restore(info, true)?;

    let Restorer {
        mut tree,
        document_node,
        panels,
        ..
    } = restorer;
    tree.set_root(root)?;
    tree.resize(root, host)?;

    let issues = tree_integrity_issues(&tree);
    if !issues.is_empty() {
        return Err(DockError::InvalidGraph(issues.join("; ")));
    }
    log::debug!("restored graph: {} nodes, {} panels", tree.len(), panels.len());

    Ok(RestoredGraph {
        tree,
        document_node,
        panels,
    })
}
