//! The dock-node tree: an arena of nodes, each owning exactly one [`Container`].
//!
//! Parent links are plain ids into the same arena, so the tree can never hold a
//! dangling reference; [`crate::integrity`] checks the remaining invariants.

use egui::{Rect, Vec2};

use crate::container::{ChildLayout, Container, DockContainer as _};
use crate::error::{DockError, DockResult};
use crate::panel::PanelId;

/// Identifies a [`DockNode`] inside a [`DockTree`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DockNode {
    pub container: Container,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DockNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of dock nodes plus the root.
///
/// Nodes can exist detached (no parent, not the root) between structural steps;
/// a node only counts as docked once it is reachable from the root.
#[derive(Clone, Debug, Default)]
pub struct DockTree {
    nodes: ahash::HashMap<NodeId, DockNode>,
    root: Option<NodeId>,
    next_id: u64,
}

impl DockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Install `node` as root, detaching it from any former parent.
    ///
    /// The previous root (if any) stays in the arena, detached.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `node` is not in the arena.
    pub fn set_root(&mut self, node: NodeId) -> DockResult<()> {
        if !self.nodes.contains_key(&node) {
            return Err(DockError::NodeNotFound(node));
        }
        self.detach_from_parent(node);
        self.root = Some(node);
        Ok(())
    }

    pub fn clear_root(&mut self) {
        self.root = None;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&DockNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut DockNode> {
        self.nodes.get_mut(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DockNode)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// The container of `id`.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `id` is not in the arena.
    pub fn container(&self, id: NodeId) -> DockResult<&Container> {
        self.nodes
            .get(&id)
            .map(|node| &node.container)
            .ok_or(DockError::NodeNotFound(id))
    }

    /// The container of `id`, mutably.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `id` is not in the arena.
    pub fn container_mut(&mut self, id: NodeId) -> DockResult<&mut Container> {
        self.nodes
            .get_mut(&id)
            .map(|node| &mut node.container)
            .ok_or(DockError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Index of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Add a detached node to the arena.
    pub fn insert(&mut self, container: Container) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            DockNode {
                container,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Detach `child` from its prior parent and append it to `parent`.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if either node is missing and
    /// [`DockError::WouldCreateCycle`] if `child` is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> DockResult<()> {
        self.validate_new_child(parent, child)?;
        self.detach_from_parent(child);
        let index = self.children(parent).len();
        self.attach(parent, index, child);
        Ok(())
    }

    /// Splice `child` immediately before `reference` in `parent`'s child list.
    ///
    /// # Errors
    /// As [`Self::add_child`], plus [`DockError::ReferenceNotFound`] if `reference`
    /// is not a child of `parent`.
    pub fn add_child_before(
        &mut self,
        parent: NodeId,
        reference: NodeId,
        child: NodeId,
    ) -> DockResult<()> {
        self.insert_adjacent(parent, reference, child, true)
    }

    /// Splice `child` immediately after `reference` in `parent`'s child list.
    ///
    /// # Errors
    /// As [`Self::add_child_before`].
    pub fn add_child_after(
        &mut self,
        parent: NodeId,
        reference: NodeId,
        child: NodeId,
    ) -> DockResult<()> {
        self.insert_adjacent(parent, reference, child, false)
    }

    /// Insert `child` at `index` (clamped) of `parent`'s child list.
    ///
    /// # Errors
    /// As [`Self::add_child`].
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> DockResult<()> {
        self.validate_new_child(parent, child)?;
        self.detach_from_parent(child);
        let index = index.min(self.children(parent).len());
        self.attach(parent, index, child);
        Ok(())
    }

    fn insert_adjacent(
        &mut self,
        parent: NodeId,
        reference: NodeId,
        child: NodeId,
        before: bool,
    ) -> DockResult<()> {
        self.validate_new_child(parent, child)?;
        if reference == child || !self.children(parent).contains(&reference) {
            return Err(DockError::ReferenceNotFound { parent, reference });
        }

        self.detach_from_parent(child);
        let Some(position) = self.children(parent).iter().position(|&c| c == reference) else {
            return Err(DockError::ReferenceNotFound { parent, reference });
        };
        let index = if before { position } else { position + 1 };
        self.attach(parent, index, child);
        Ok(())
    }

    fn validate_new_child(&self, parent: NodeId, child: NodeId) -> DockResult<()> {
        if !self.contains(parent) {
            return Err(DockError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(DockError::NodeNotFound(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DockError::WouldCreateCycle {
                node: child,
                reference: parent,
            });
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if self.root == Some(child) {
            self.root = None;
        }
    }

    /// Remove `id` from its parent's child list. No-op for parentless nodes.
    ///
    /// Returns the index the node used to occupy.
    pub fn detach_from_parent(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.nodes.get_mut(&id)?.parent.take()?;
        let siblings = &mut self.nodes.get_mut(&parent)?.children;
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.remove(index);
        Some(index)
    }

    /// `true` if `ancestor` is `node` or lies on the path from `node` to the root.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `true` if `id` is reachable from the root.
    pub fn is_docked(&self, id: NodeId) -> bool {
        self.root.is_some_and(|root| self.is_ancestor_or_self(root, id))
    }

    pub fn find_panel(&self, panel: PanelId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.container.panel_id() == Some(panel))
            .map(|(id, _)| *id)
    }

    /// Panels in the subtree rooted at `id`, depth-first in child order.
    pub fn panels_in_subtree(&self, id: NodeId) -> Vec<PanelId> {
        let mut panels = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            panels.extend(node.container.panel_id());
            stack.extend(node.children.iter().rev());
        }
        panels
    }

    /// Detach the subtree rooted at `id` and drop every node in it, disposing
    /// their containers. Returns the panels that were hosted in the subtree.
    pub fn dispose_subtree(&mut self, id: NodeId) -> Vec<PanelId> {
        self.detach_from_parent(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let mut panels = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(mut node) = self.nodes.remove(&id) else {
                continue;
            };
            panels.extend(node.container.panel_id());
            node.container.dispose();
            stack.extend(node.children.into_iter().rev());
        }
        panels
    }

    /// Drop a single node that no longer has children. Its parent link is cut first.
    pub fn dispose_node(&mut self, id: NodeId) {
        self.detach_from_parent(id);
        if self.root == Some(id) {
            self.root = None;
        }
        if let Some(mut node) = self.nodes.remove(&id) {
            for child in node.children.drain(..) {
                if let Some(child) = self.nodes.get_mut(&child) {
                    child.parent = None;
                }
            }
            node.container.dispose();
        }
    }

    // ------------------------------------------------------------------------
    // Layout

    /// Minimum size of the subtree rooted at `id`.
    pub fn min_size(&self, id: NodeId) -> Vec2 {
        let Some(node) = self.nodes.get(&id) else {
            return Vec2::ZERO;
        };
        let children: Vec<Vec2> = node.children.iter().map(|&c| self.min_size(c)).collect();
        node.container.measure_minimum(&children)
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(&id).map(|node| node.container.rect())
    }

    fn child_layouts(&self, id: NodeId) -> Vec<ChildLayout> {
        self.children(id)
            .iter()
            .map(|&child| ChildLayout {
                id: child,
                min_size: self.min_size(child),
            })
            .collect()
    }

    /// Let the container of `id` adopt its current child list, then lay out the
    /// children it produced rects for.
    ///
    /// With `relayout_even_if_equal == false` this is a no-op when the child list
    /// (identity and order) is unchanged since the previous call.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] for a missing node and
    /// [`DockError::InsufficientChildren`] for a splitter left with fewer than two children.
    pub fn perform_layout(&mut self, id: NodeId, relayout_even_if_equal: bool) -> DockResult<()> {
        let children = self.child_layouts(id);
        let rects = self
            .container_mut(id)?
            .layout_children(&children, relayout_even_if_equal)?;
        if let Some(rects) = rects {
            log::trace!("layout {id:?}: {} children", children.len());
            for (child, rect) in children.iter().zip(rects) {
                self.resize(child.id, rect)?;
            }
        }
        Ok(())
    }

    /// Move/resize the subtree rooted at `id`.
    ///
    /// # Errors
    /// As [`Self::perform_layout`].
    pub fn resize(&mut self, id: NodeId, rect: Rect) -> DockResult<()> {
        let children = self.child_layouts(id);
        let rects = self.container_mut(id)?.resize(rect, &children);
        for (child, rect) in children.iter().zip(rects) {
            self.resize(child.id, rect)?;
        }
        Ok(())
    }

    /// Re-apply the current rect of `id` to its subtree, enforcing minimum sizes anew.
    ///
    /// # Errors
    /// As [`Self::perform_layout`].
    pub fn refresh(&mut self, id: NodeId) -> DockResult<()> {
        let rect = self.container(id)?.rect();
        self.resize(id, rect)
    }

    /// Lay out `id` after its child list changed, then refresh every ancestor so
    /// changed minimum sizes propagate up the chain.
    ///
    /// # Errors
    /// As [`Self::perform_layout`].
    pub fn relayout_from(&mut self, id: NodeId) -> DockResult<()> {
        self.perform_layout(id, true)?;
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            self.refresh(ancestor)?;
            current = self.parent(ancestor);
        }
        Ok(())
    }

    /// Make `child` the active tab of `parent`.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `parent` is not in the arena.
    pub fn set_active_child(&mut self, parent: NodeId, child: NodeId) -> DockResult<()> {
        self.container_mut(parent)?.set_active_child(child);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Splitter access

    fn varying_minimums(&self, id: NodeId) -> DockResult<Vec<f32>> {
        let Some(split) = self.container(id)?.as_split() else {
            return Ok(Vec::new());
        };
        let orientation = split.orientation();
        Ok(self
            .children(id)
            .iter()
            .map(|&child| orientation.varying(self.min_size(child)))
            .collect())
    }

    /// Ratio vector of the splitter at `id`, `None` for non-splitters.
    pub fn ratios(&self, id: NodeId) -> Option<Vec<f32>> {
        let split = self.get(id)?.container.as_split()?;
        Some(split.sizing.ratios())
    }

    /// Apply a ratio vector to the splitter at `id` and lay out its children.
    ///
    /// Non-splitter nodes are left untouched.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `id` or one of its children is missing.
    pub fn set_ratios(&mut self, id: NodeId, ratios: &[f32]) -> DockResult<()> {
        if self.ratios(id).is_none() {
            return Ok(());
        }
        let minimums = self.varying_minimums(id)?;
        let rects = match self.container_mut(id)?.as_split_mut() {
            Some(split) => split.sizing.set_ratios(ratios, &minimums),
            None => return Ok(()),
        };
        self.resize_children(id, rects)
    }

    /// Restore previously saved pixel sizes of the splitter at `id`.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `id` or one of its children is missing.
    pub fn load_sizes(&mut self, id: NodeId, sizes: &[f32]) -> DockResult<()> {
        if self.ratios(id).is_none() {
            return Ok(());
        }
        let minimums = self.varying_minimums(id)?;
        let rects = match self.container_mut(id)?.as_split_mut() {
            Some(split) => split.sizing.load_sizes(sizes, &minimums),
            None => return Ok(()),
        };
        self.resize_children(id, rects)
    }

    /// Give `child` the share `ratio` of its parent splitter.
    ///
    /// # Errors
    /// [`DockError::NoParent`] for a parentless node and
    /// [`DockError::ReferenceNotFound`] if the splitter does not list it.
    pub fn set_child_ratio(&mut self, child: NodeId, ratio: f32) -> DockResult<()> {
        let parent = self.parent(child).ok_or(DockError::NoParent(child))?;
        if self.ratios(parent).is_none() {
            return Ok(());
        }
        let minimums = self.varying_minimums(parent)?;
        let rects = self
            .container_mut(parent)?
            .as_split_mut()
            .and_then(|split| split.sizing.set_child_ratio(child, ratio, &minimums));
        match rects {
            Some(rects) => self.resize_children(parent, rects),
            None => Err(DockError::ReferenceNotFound {
                parent,
                reference: child,
            }),
        }
    }

    /// Drag bar `bar` of the splitter at `id` by `delta` pixels.
    ///
    /// # Errors
    /// [`DockError::NodeNotFound`] if `id` or one of its children is missing.
    pub fn drag_bar(&mut self, id: NodeId, bar: usize, delta: f32) -> DockResult<()> {
        if self.ratios(id).is_none() {
            return Ok(());
        }
        let minimums = self.varying_minimums(id)?;
        let rects = self
            .container_mut(id)?
            .as_split_mut()
            .and_then(|split| split.sizing.drag_bar(bar, delta, &minimums));
        match rects {
            Some(rects) => self.resize_children(id, rects),
            None => Ok(()),
        }
    }

    fn resize_children(&mut self, id: NodeId, rects: Vec<Rect>) -> DockResult<()> {
        let children = self.children(id).to_vec();
        for (child, rect) in children.into_iter().zip(rects) {
            self.resize(child, rect)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, vec2};

    fn panel(tree: &mut DockTree, id: u64) -> NodeId {
        tree.insert(Container::panel(PanelId::from_u64(id), Vec2::ZERO))
    }

    #[test]
    fn add_child_moves_the_node_from_its_old_parent() {
        let mut tree = DockTree::new();
        let a = tree.insert(Container::tabs());
        let b = tree.insert(Container::tabs());
        let leaf = panel(&mut tree, 1);

        tree.add_child(a, leaf).unwrap();
        tree.add_child(b, leaf).unwrap();

        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[leaf]);
        assert_eq!(tree.parent(leaf), Some(b));
    }

    #[test]
    fn adjacent_insertion_and_missing_reference() {
        let mut tree = DockTree::new();
        let parent = tree.insert(Container::tabs());
        let a = panel(&mut tree, 1);
        let b = panel(&mut tree, 2);
        let c = panel(&mut tree, 3);
        let stray = panel(&mut tree, 4);

        tree.add_child(parent, a).unwrap();
        tree.add_child_before(parent, a, b).unwrap();
        tree.add_child_after(parent, a, c).unwrap();
        assert_eq!(tree.children(parent), &[b, a, c]);

        let err = tree.add_child_after(parent, stray, c);
        assert!(matches!(err, Err(DockError::ReferenceNotFound { .. })));
        assert_eq!(tree.children(parent), &[b, a, c]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut tree = DockTree::new();
        let outer = tree.insert(Container::tabs());
        let inner = tree.insert(Container::tabs());
        tree.add_child(outer, inner).unwrap();

        let err = tree.add_child(inner, outer);
        assert!(matches!(err, Err(DockError::WouldCreateCycle { .. })));
        assert_eq!(tree.parent(outer), None);
    }

    #[test]
    fn detaching_the_root_is_a_noop() {
        let mut tree = DockTree::new();
        let root = panel(&mut tree, 1);
        tree.set_root(root).unwrap();
        assert_eq!(tree.detach_from_parent(root), None);
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn dispose_subtree_returns_hosted_panels() {
        let mut tree = DockTree::new();
        let root = tree.insert(Container::tabs());
        let a = panel(&mut tree, 1);
        let b = panel(&mut tree, 2);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.set_root(root).unwrap();

        let panels = tree.dispose_subtree(root);
        assert_eq!(panels, vec![PanelId::from_u64(1), PanelId::from_u64(2)]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn dispose_subtree_walks_nested_groups_in_tree_order() {
        let mut tree = DockTree::new();
        let root = tree.insert(Container::tabs());
        let inner = tree.insert(Container::tabs());
        let a = panel(&mut tree, 1);
        let b = panel(&mut tree, 2);
        let c = panel(&mut tree, 3);
        let d = panel(&mut tree, 4);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, inner).unwrap();
        tree.add_child(inner, b).unwrap();
        tree.add_child(inner, c).unwrap();
        tree.add_child(root, d).unwrap();
        tree.set_root(root).unwrap();

        let expected = tree.panels_in_subtree(root);
        let panels = tree.dispose_subtree(root);
        assert_eq!(panels, expected);
        assert_eq!(panels, [1, 2, 3, 4].map(PanelId::from_u64).to_vec());
        assert!(tree.is_empty());
    }

    #[test]
    fn layout_reaches_leaves() {
        let mut tree = DockTree::new();
        let root = tree.insert(Container::tabs());
        let a = panel(&mut tree, 1);
        tree.add_child(root, a).unwrap();
        tree.set_root(root).unwrap();

        let rect = Rect::from_min_size(Pos2::ZERO, vec2(320.0, 200.0));
        tree.resize(root, rect).unwrap();
        tree.perform_layout(root, false).unwrap();
        assert_eq!(tree.rect(a), Some(rect));
    }
}
