use std::collections::BTreeMap;

use egui::{Vec2, vec2};

use crate::container::{ContainerKind, ContainerState, Orientation};
use crate::error::{DockError, DockResult};
use crate::persistence::NodeInfo;

/// Split direction with Dear ImGui `DockBuilder::SplitNode`-like semantics.
///
/// The direction indicates where the *side* node is placed relative to the *main* node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SplitDirection {
    fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Row,
            Self::Up | Self::Down => Orientation::Column,
        }
    }

    fn side_first(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

/// A logical node id used by [`DockBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DockNodeId(u64);

#[derive(Clone, Debug)]
enum Node<Pane> {
    Leaf {
        panes: Vec<Pane>,
    },
    Split {
        dir: SplitDirection,
        side_fraction: f32,
        main: DockNodeId,
        side: DockNodeId,
    },
}

/// Scripted layout construction that feels close to Dear ImGui's `DockBuilder`:
/// create empty nodes, split them, dock panes into the leaves, then `finish()`.
///
/// The result is a [`NodeInfo`] graph, installed with
/// [`crate::DockManager::install_layout`]. Leaves map to the dock tree like this:
/// - no panes: the document area,
/// - one pane: a plain panel node,
/// - several panes: a tab group.
pub struct DockBuilder<Pane> {
    next_node_id: u64,
    nodes: BTreeMap<DockNodeId, Node<Pane>>,
}

impl<Pane> Default for DockBuilder<Pane> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Pane> DockBuilder<Pane> {
    pub fn new() -> Self {
        Self {
            next_node_id: 1,
            nodes: BTreeMap::new(),
        }
    }

    fn alloc_node_id(&mut self) -> DockNodeId {
        let id = DockNodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        id
    }

    /// Create an empty leaf node.
    #[must_use]
    pub fn add_node(&mut self) -> DockNodeId {
        let id = self.alloc_node_id();
        self.nodes.insert(id, Node::Leaf { panes: Vec::new() });
        id
    }

    /// Split an existing node and return `(side, main)` (Dear ImGui semantics).
    ///
    /// The `node` itself becomes the split, and its original content is moved into the
    /// returned `main` child node. `side_fraction` is clamped to `0.0..=1.0`.
    ///
    /// # Errors
    /// [`DockError::InvalidGraph`] if `node` was never created.
    pub fn split_node(
        &mut self,
        node: DockNodeId,
        dir: SplitDirection,
        side_fraction: f32,
    ) -> DockResult<(DockNodeId, DockNodeId)> {
        let old = self
            .nodes
            .remove(&node)
            .ok_or_else(|| DockError::InvalidGraph(format!("no builder node {node:?}")))?;
        let main = self.alloc_node_id();
        self.nodes.insert(main, old);

        let side = self.add_node();
        self.nodes.insert(
            node,
            Node::Split {
                dir,
                side_fraction: side_fraction.clamp(0.0, 1.0),
                main,
                side,
            },
        );
        Ok((side, main))
    }

    /// Dock a pane into a leaf node.
    ///
    /// # Errors
    /// [`DockError::InvalidGraph`] if `node` is a split or does not exist.
    pub fn dock_pane(&mut self, pane: Pane, node: DockNodeId) -> DockResult<()> {
        match self.nodes.get_mut(&node) {
            Some(Node::Leaf { panes }) => {
                panes.push(pane);
                Ok(())
            }
            Some(Node::Split { .. }) => Err(DockError::InvalidGraph(format!(
                "builder node {node:?} is a split, not a leaf"
            ))),
            None => Err(DockError::InvalidGraph(format!("no builder node {node:?}"))),
        }
    }

    /// Dock multiple panes into a leaf node (tabbed together).
    ///
    /// # Errors
    /// [`DockError::InvalidGraph`] if `node` is a split or does not exist.
    pub fn dock_panes(
        &mut self,
        panes: impl IntoIterator<Item = Pane>,
        node: DockNodeId,
    ) -> DockResult<()> {
        for pane in panes {
            self.dock_pane(pane, node)?;
        }
        Ok(())
    }

    /// Finish building, mapping each pane to the state of its panel node.
    ///
    /// `size` is the nominal size of the root; installing rescales everything to the
    /// host anyway, so only the proportions matter. Returning `None` from `map` drops
    /// that pane.
    pub fn finish_map(
        self,
        root: DockNodeId,
        size: Vec2,
        mut map: impl FnMut(Pane) -> Option<ContainerState>,
    ) -> NodeInfo {
        fn build_node<Pane>(
            node_id: DockNodeId,
            size: Vec2,
            nodes: &mut BTreeMap<DockNodeId, Node<Pane>>,
            map: &mut dyn FnMut(Pane) -> Option<ContainerState>,
        ) -> NodeInfo {
            let sized = |mut state: ContainerState| {
                state.width = size.x;
                state.height = size.y;
                state
            };

            match nodes.remove(&node_id) {
                Some(Node::Leaf { panes }) => {
                    let mut children: Vec<NodeInfo> = panes
                        .into_iter()
                        .filter_map(&mut *map)
                        .map(|state| NodeInfo {
                            container_type: ContainerKind::Panel,
                            state: sized(state),
                            children: Vec::new(),
                        })
                        .collect();
                    match children.len() {
                        0 => NodeInfo {
                            container_type: ContainerKind::Fill,
                            state: sized(ContainerState {
                                document_manager: true,
                                ..Default::default()
                            }),
                            children,
                        },
                        1 => children.remove(0),
                        _ => NodeInfo {
                            container_type: ContainerKind::Fill,
                            state: sized(ContainerState::default()),
                            children,
                        },
                    }
                }
                Some(Node::Split {
                    dir,
                    side_fraction,
                    main,
                    side,
                }) => {
                    let orientation = dir.orientation();
                    let extent = orientation.varying(size);
                    let fixed = orientation.fixed(size);
                    let side_extent = extent * side_fraction;
                    let side_info = build_node(
                        side,
                        orientation.compose(side_extent, fixed),
                        nodes,
                        map,
                    );
                    let main_info = build_node(
                        main,
                        orientation.compose(extent - side_extent, fixed),
                        nodes,
                        map,
                    );
                    let children = if dir.side_first() {
                        vec![side_info, main_info]
                    } else {
                        vec![main_info, side_info]
                    };
                    NodeInfo {
                        container_type: orientation.kind(),
                        state: sized(ContainerState::default()),
                        children,
                    }
                }
                None => NodeInfo {
                    container_type: ContainerKind::Fill,
                    state: sized(ContainerState {
                        document_manager: true,
                        ..Default::default()
                    }),
                    children: Vec::new(),
                },
            }
        }

        let mut nodes = self.nodes;
        build_node(root, size, &mut nodes, &mut map)
    }
}

impl<Pane: Into<String>> DockBuilder<Pane> {
    /// Finish building; every pane names the panel type to create for it.
    pub fn finish(self, root: DockNodeId) -> NodeInfo {
        self.finish_map(root, vec2(1000.0, 1000.0), |pane| {
            Some(ContainerState {
                panel_type: Some(pane.into()),
                ..Default::default()
            })
        })
    }
}
