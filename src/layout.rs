//! Structural dock/undock/close operations on a [`DockTree`].
//!
//! Every operation validates its inputs before touching the tree, then mutates,
//! then runs a synchronous layout pass so sizes are consistent when it returns.

use egui::Rect;

use crate::container::{Container, ContainerKind, DockContainer as _, Orientation, SplitContainer};
use crate::error::{DockError, DockResult};
use crate::node::{DockTree, NodeId};
use crate::panel::PanelId;

/// Where a node is docked relative to a reference node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DockKind {
    Left,
    Right,
    Up,
    Down,
    Fill,
}

impl DockKind {
    pub fn container_kind(self) -> ContainerKind {
        match self {
            Self::Left | Self::Right => ContainerKind::Row,
            Self::Up | Self::Down => ContainerKind::Column,
            Self::Fill => ContainerKind::Fill,
        }
    }

    pub fn orientation(self) -> Option<Orientation> {
        Orientation::from_kind(self.container_kind())
    }

    /// `true` if the new node goes before the reference in child order.
    pub fn inserts_before(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

/// How a node is currently docked: re-docking it with these values puts it back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DockInformation {
    pub reference: NodeId,
    pub kind: DockKind,
    pub ratio: Option<f32>,
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    node: NodeId,
    kind: DockKind,
    ratio: Option<f32>,
}

/// Tree surgery for docking. Holds only the splitter bar thickness used for the
/// composites it creates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DockLayoutEngine {
    bar_size: f32,
}

impl Default for DockLayoutEngine {
    fn default() -> Self {
        Self::new(crate::DockConfig::default().splitter_bar_size)
    }
}

impl DockLayoutEngine {
    pub fn new(bar_size: f32) -> Self {
        Self { bar_size }
    }

    pub fn bar_size(&self) -> f32 {
        self.bar_size
    }

    /// Dock `node` to the left of `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_left(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
        ratio: Option<f32>,
    ) -> DockResult<()> {
        self.dock(tree, reference, node, DockKind::Left, ratio)
    }

    /// Dock `node` to the right of `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_right(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
        ratio: Option<f32>,
    ) -> DockResult<()> {
        self.dock(tree, reference, node, DockKind::Right, ratio)
    }

    /// Dock `node` above `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_up(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
        ratio: Option<f32>,
    ) -> DockResult<()> {
        self.dock(tree, reference, node, DockKind::Up, ratio)
    }

    /// Dock `node` below `reference`.
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_down(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
        ratio: Option<f32>,
    ) -> DockResult<()> {
        self.dock(tree, reference, node, DockKind::Down, ratio)
    }

    /// Dock `node` as a tab of `reference` (or of its tab group).
    ///
    /// # Errors
    /// As [`Self::dock`].
    pub fn dock_fill(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
    ) -> DockResult<()> {
        self.dock(tree, reference, node, DockKind::Fill, None)
    }

    /// Dock into an empty tree (the node becomes the root, sized to `host`),
    /// or as a tab of the existing root.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the arena and
    /// [`DockError::NodeAlreadyAttached`] if it is attached already.
    pub fn dock_root(&self, tree: &mut DockTree, node: NodeId, host: Rect) -> DockResult<()> {
        match tree.root() {
            Some(root) => self.dock_fill(tree, root, node),
            None => {
                self.validate_detached(tree, node)?;
                tree.set_root(node)?;
                tree.resize(node, host)?;
                tree.perform_layout(node, true)?;
                log::debug!("dock {node:?} as root");
                Ok(())
            }
        }
    }

    fn validate_detached(&self, tree: &DockTree, node: NodeId) -> DockResult<()> {
        if !tree.contains(node) {
            return Err(DockError::NodeNotFound(node));
        }
        if tree.parent(node).is_some() || tree.root() == Some(node) {
            return Err(DockError::NodeAlreadyAttached(node));
        }
        Ok(())
    }

    /// Dock the detached `node` relative to `reference`.
    ///
    /// # Errors
    /// [`DockError::NodeAlreadyAttached`] if `node` is not detached and
    /// [`DockError::NodeNotFound`] if either node is missing or `reference` is not docked.
    /// The tree is unchanged then.
    pub fn dock(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        node: NodeId,
        kind: DockKind,
        ratio: Option<f32>,
    ) -> DockResult<()> {
        self.validate_detached(tree, node)?;
        if !tree.is_docked(reference) {
            return Err(DockError::NodeNotFound(reference));
        }

        // Docking targets the tab group, never one of its tabs. A group docked
        // into with Fill takes the node as another tab of its own.
        let mut reference = reference;
        let fills_group =
            kind == DockKind::Fill && tree.container(reference)?.kind() == ContainerKind::Fill;
        if let Some(parent) = tree.parent(reference) {
            if !fills_group && tree.container(parent)?.kind() == ContainerKind::Fill {
                reference = parent;
            }
        }

        if kind == DockKind::Fill && tree.container(reference)?.kind() == ContainerKind::Fill {
            tree.add_child(reference, node)?;
            tree.relayout_from(reference)?;
            tree.set_active_child(reference, node)?;
            log::debug!("dock {node:?} as tab of {reference:?}");
            return Ok(());
        }

        let placement = Placement {
            node,
            kind,
            ratio: ratio.map(|r| r.clamp(0.0, 1.0)),
        };
        match tree.parent(reference) {
            None => self.wrap_root(tree, reference, placement)?,
            Some(parent) if tree.container(parent)?.kind() != kind.container_kind() => {
                self.splice_composite(tree, parent, reference, placement)?;
            }
            Some(parent) => self.insert_sibling(tree, parent, reference, placement)?,
        }

        if let Some(parent) = tree.parent(node) {
            tree.set_active_child(parent, node)?;
        }
        Ok(())
    }

    /// Create a composite of `placement.kind` holding `reference` and the new node,
    /// attach both and size it to `rect`.
    fn build_composite(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        placement: Placement,
        rect: Rect,
        install: impl FnOnce(&mut DockTree, NodeId) -> DockResult<()>,
    ) -> DockResult<NodeId> {
        let Placement { node, kind, ratio } = placement;
        let ordered = if kind.inserts_before() {
            [node, reference]
        } else {
            [reference, node]
        };
        let container = match kind.orientation() {
            Some(orientation) => Container::Split(SplitContainer::new(
                orientation,
                self.bar_size,
                ordered.to_vec(),
                rect,
            )?),
            None => Container::tabs(),
        };
        let composite = tree.insert(container);
        log::debug!(
            "create {:?} composite {composite:?} for {ordered:?}",
            kind.container_kind()
        );

        install(tree, composite)?;
        for child in ordered {
            tree.add_child(composite, child)?;
        }
        tree.resize(composite, rect)?;
        tree.perform_layout(composite, true)?;
        if let (Some(ratio), Some(_)) = (ratio, kind.orientation()) {
            tree.set_child_ratio(node, ratio)?;
        }
        Ok(composite)
    }

    fn wrap_root(
        &self,
        tree: &mut DockTree,
        reference: NodeId,
        placement: Placement,
    ) -> DockResult<()> {
        let rect = tree.container(reference)?.rect();
        self.build_composite(tree, reference, placement, rect, |tree, composite| {
            tree.set_root(composite)
        })?;
        Ok(())
    }

    fn splice_composite(
        &self,
        tree: &mut DockTree,
        parent: NodeId,
        reference: NodeId,
        placement: Placement,
    ) -> DockResult<()> {
        let rect = tree.container(reference)?.rect();
        let index = tree
            .index_in_parent(reference)
            .ok_or(DockError::ReferenceNotFound { parent, reference })?;

        self.build_composite(tree, reference, placement, rect, |tree, composite| {
            tree.detach_from_parent(reference);
            tree.insert_child_at(parent, index, composite)
        })?;
        tree.relayout_from(parent)
    }

    fn insert_sibling(
        &self,
        tree: &mut DockTree,
        parent: NodeId,
        reference: NodeId,
        placement: Placement,
    ) -> DockResult<()> {
        let Placement { node, kind, ratio } = placement;
        let previous_ratios = tree.ratios(parent);
        if kind.inserts_before() {
            tree.add_child_before(parent, reference, node)?;
        } else {
            tree.add_child_after(parent, reference, node)?;
        }
        tree.relayout_from(parent)?;
        log::debug!("dock {node:?} {kind:?} of {reference:?} inside {parent:?}");

        if let (Some(ratio), Some(mut ratios)) = (ratio, previous_ratios) {
            let index = tree.index_in_parent(node).unwrap_or(ratios.len());
            for r in &mut ratios {
                *r *= 1.0 - ratio;
            }
            ratios.insert(index.min(ratios.len()), ratio);
            normalize(&mut ratios);
            tree.set_ratios(parent, &ratios)?;
        }
        Ok(())
    }

    /// Detach `node` from the tree, collapsing its parent if it falls below its
    /// minimum child count. The node stays in the arena, detached.
    ///
    /// # Errors
    /// [`DockError::NoParent`] for the root or a detached node.
    pub fn undock(&self, tree: &mut DockTree, node: NodeId) -> DockResult<()> {
        let parent = tree.parent(node).ok_or(DockError::NoParent(node))?;
        let index = tree.detach_from_parent(node).unwrap_or(0);
        log::debug!("undock {node:?} from {parent:?}");

        let remaining = tree.children(parent).len();
        if remaining < tree.container(parent)?.minimum_child_count() {
            self.collapse(tree, parent)
        } else {
            tree.relayout_from(parent)?;
            if let Some(&active) = tree.children(parent).get(index.saturating_sub(1)) {
                tree.set_active_child(parent, active)?;
            }
            Ok(())
        }
    }

    /// Remove `node` and its whole subtree. Closing the root leaves an empty tree.
    ///
    /// Returns the panels that were hosted in the closed subtree.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the tree.
    pub fn close(&self, tree: &mut DockTree, node: NodeId) -> DockResult<Vec<PanelId>> {
        if !tree.contains(node) {
            return Err(DockError::NodeNotFound(node));
        }
        if tree.parent(node).is_some() {
            self.undock(tree, node)?;
        }
        let panels = tree.dispose_subtree(node);
        log::debug!("close {node:?}: disposed panels {panels:?}");
        Ok(panels)
    }

    /// Structural collapse: move the survivors of `composite` into its former
    /// position and drop it.
    fn collapse(&self, tree: &mut DockTree, composite: NodeId) -> DockResult<()> {
        let survivors = tree.children(composite).to_vec();
        let rect = tree.container(composite)?.rect();
        log::debug!("collapse {composite:?}, survivors {survivors:?}");

        match tree.parent(composite) {
            Some(grandparent) => {
                let index = tree.index_in_parent(composite).unwrap_or(0);
                if survivors.is_empty() {
                    self.undock(tree, composite)?;
                    tree.dispose_node(composite);
                    return Ok(());
                }
                tree.dispose_node(composite);
                for (offset, survivor) in survivors.iter().enumerate() {
                    tree.insert_child_at(grandparent, index + offset, *survivor)?;
                }
                if let [only] = survivors.as_slice() {
                    tree.resize(*only, rect)?;
                }
                tree.relayout_from(grandparent)?;
                tree.set_active_child(grandparent, survivors[0])?;
            }
            None => match survivors.as_slice() {
                [] => tree.dispose_node(composite),
                [only] => {
                    tree.dispose_node(composite);
                    tree.set_root(*only)?;
                    tree.resize(*only, rect)?;
                }
                _ => tree.relayout_from(composite)?,
            },
        }
        Ok(())
    }

    /// Move `node` to `index` among its siblings (tab or splitter reordering).
    ///
    /// In a splitter the node keeps its pixel size at the new position.
    ///
    /// # Errors
    /// [`DockError::NoParent`] if `node` is the root or detached.
    pub fn reorder(&self, tree: &mut DockTree, node: NodeId, index: usize) -> DockResult<()> {
        let parent = tree.parent(node).ok_or(DockError::NoParent(node))?;
        let from = tree.index_in_parent(node).ok_or(DockError::NoParent(node))?;
        let sizes = tree
            .container(parent)?
            .as_split()
            .map(|split| split.sizing.container_sizes().to_vec());

        tree.insert_child_at(parent, index, node)?;
        tree.relayout_from(parent)?;
        if let Some(mut sizes) = sizes {
            if let Some(to) = tree.index_in_parent(node) {
                if from < sizes.len() {
                    let size = sizes.remove(from);
                    sizes.insert(to.min(sizes.len()), size);
                    tree.load_sizes(parent, &sizes)?;
                }
            }
        }
        tree.set_active_child(parent, node)
    }

    /// Derive how `node` is docked, so that it can be docked back later.
    ///
    /// # Errors
    /// [`DockError::NoParent`] for the root or a detached node.
    pub fn query_dock_information(
        &self,
        tree: &DockTree,
        node: NodeId,
    ) -> DockResult<DockInformation> {
        let parent = tree.parent(node).ok_or(DockError::NoParent(node))?;
        let siblings = tree.children(parent);
        let index = tree
            .index_in_parent(node)
            .ok_or(DockError::ReferenceNotFound {
                parent,
                reference: node,
            })?;
        let previous = index.checked_sub(1).and_then(|i| siblings.get(i)).copied();
        let next = siblings.get(index + 1).copied();
        let ratio = tree.ratios(parent).and_then(|r| r.get(index).copied());

        let info = match Orientation::from_kind(tree.container(parent)?.kind()) {
            None => DockInformation {
                reference: previous.or(next).unwrap_or(parent),
                kind: DockKind::Fill,
                ratio: None,
            },
            Some(orientation) => {
                let (after, before) = match orientation {
                    Orientation::Row => (DockKind::Right, DockKind::Left),
                    Orientation::Column => (DockKind::Down, DockKind::Up),
                };
                match (previous, next) {
                    (Some(previous), _) => DockInformation {
                        reference: previous,
                        kind: after,
                        ratio,
                    },
                    (None, Some(next)) => DockInformation {
                        reference: next,
                        kind: before,
                        ratio,
                    },
                    (None, None) => DockInformation {
                        reference: parent,
                        kind: DockKind::Fill,
                        ratio: None,
                    },
                }
            }
        };
        Ok(info)
    }

    /// The rect a node would occupy if docked `kind` of `reference` with `ratio`
    /// (defaults to half), for drop previews.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `reference` is not docked.
    pub fn dock_bounds(
        &self,
        tree: &DockTree,
        reference: NodeId,
        kind: DockKind,
        ratio: Option<f32>,
    ) -> DockResult<Rect> {
        let mut reference = reference;
        if let Some(parent) = tree.parent(reference) {
            if tree.container(parent)?.kind() == ContainerKind::Fill {
                reference = parent;
            }
        }
        let rect = tree.container(reference)?.rect();
        let Some(orientation) = kind.orientation() else {
            return Ok(rect);
        };

        let ratio = ratio.unwrap_or(0.5).clamp(0.0, 1.0);
        let extent = orientation.varying(rect.size());
        let size = (extent * ratio - self.bar_size * 0.5).max(0.0);
        let start = orientation.varying_pos(rect.min);
        let offset = if kind.inserts_before() {
            start
        } else {
            start + extent - size
        };
        Ok(orientation.slice(rect, offset, size))
    }
}

/// Scale `ratios` so they sum to 1. An all-zero vector becomes an even split.
pub fn normalize(ratios: &mut [f32]) {
    let total: f32 = ratios.iter().sum();
    if total <= f32::EPSILON {
        let even = 1.0 / ratios.len().max(1) as f32;
        ratios.iter_mut().for_each(|r| *r = even);
    } else {
        ratios.iter_mut().for_each(|r| *r /= total);
    }
}
