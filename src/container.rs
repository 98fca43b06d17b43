//! The container contract shared by every dock node payload.
//!
//! A [`DockNode`](crate::DockNode) owns exactly one [`Container`]. Leaves wrap a panel,
//! composites arrange their children either as a splitter ([`SplitContainer`]) or as a
//! tab group ([`FillContainer`]). The tree drives layout; containers only turn a rect and
//! the minimum sizes of their children into child rects.

use egui::{Pos2, Rect, Vec2, pos2, vec2};
use itertools::Itertools as _;

use crate::error::DockResult;
use crate::node::NodeId;
use crate::panel::PanelId;
use crate::splitter::SplitterSizing;

/// The type tag persisted for every node of the dock graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Panel,
    Row,
    Column,
    Fill,
}

/// Axis selector for splitters.
///
/// `Row` lays children out left-to-right (the varying dimension is the width),
/// `Column` top-to-bottom (the varying dimension is the height).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Row,
    Column,
}

impl Orientation {
    pub fn from_kind(kind: ContainerKind) -> Option<Self> {
        match kind {
            ContainerKind::Row => Some(Self::Row),
            ContainerKind::Column => Some(Self::Column),
            ContainerKind::Panel | ContainerKind::Fill => None,
        }
    }

    pub fn kind(self) -> ContainerKind {
        match self {
            Self::Row => ContainerKind::Row,
            Self::Column => ContainerKind::Column,
        }
    }

    /// The component of `v` along the splitter axis.
    pub fn varying(self, v: Vec2) -> f32 {
        match self {
            Self::Row => v.x,
            Self::Column => v.y,
        }
    }

    /// The component of `v` across the splitter axis.
    pub fn fixed(self, v: Vec2) -> f32 {
        match self {
            Self::Row => v.y,
            Self::Column => v.x,
        }
    }

    pub fn varying_pos(self, p: Pos2) -> f32 {
        match self {
            Self::Row => p.x,
            Self::Column => p.y,
        }
    }

    pub fn compose(self, varying: f32, fixed: f32) -> Vec2 {
        match self {
            Self::Row => vec2(varying, fixed),
            Self::Column => vec2(fixed, varying),
        }
    }

    /// A slice of `bounds` starting at `offset` along the axis, `size` long,
    /// spanning the full fixed dimension of `bounds`.
    pub fn slice(self, bounds: Rect, offset: f32, size: f32) -> Rect {
        match self {
            Self::Row => {
                Rect::from_min_size(pos2(offset, bounds.min.y), vec2(size, bounds.height()))
            }
            Self::Column => {
                Rect::from_min_size(pos2(bounds.min.x, offset), vec2(bounds.width(), size))
            }
        }
    }
}

/// Role of a fill (tab group) container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRole {
    /// A regular tab group. Collapses once fewer than two tabs remain.
    #[default]
    Tabs,

    /// The document area. Never collapses, even when empty.
    DocumentManager,
}

/// Per-node state record of the persisted graph.
///
/// Geometry is always present. Panel nodes additionally carry their type name and the
/// opaque blob produced by the panel content.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    pub width: f32,
    pub height: f32,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub document_manager: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_child: Option<usize>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub content: serde_json::Value,
}

/// What the parent knows about one child while laying it out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildLayout {
    pub id: NodeId,
    pub min_size: Vec2,
}

/// Capability set every container implements.
pub trait DockContainer {
    fn kind(&self) -> ContainerKind;

    /// Fewest children this container may hold before it structurally collapses.
    fn minimum_child_count(&self) -> usize;

    /// Minimum size of this container given the minimum sizes of its children.
    fn measure_minimum(&self, children: &[Vec2]) -> Vec2;

    fn rect(&self) -> Rect;

    fn current_size(&self) -> Vec2 {
        self.rect().size()
    }

    /// Move/resize the container. Returns one rect per child, in child order.
    fn resize(&mut self, rect: Rect, children: &[ChildLayout]) -> Vec<Rect>;

    /// Adopt a new child list.
    ///
    /// Returns `Ok(None)` when the child list is unchanged and
    /// `relayout_even_if_equal` is false, otherwise one rect per child.
    fn layout_children(
        &mut self,
        children: &[ChildLayout],
        relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>>;

    fn set_active_child(&mut self, _child: NodeId) {}

    fn dispose(&mut self) {}

    fn save_state(&self, state: &mut ContainerState) {
        let size = self.current_size();
        state.width = size.x;
        state.height = size.y;
    }

    fn load_state(&mut self, state: &ContainerState);
}

// ----------------------------------------------------------------------------

/// Leaf container showing one panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelLeaf {
    pub panel: PanelId,
    pub min_size: Vec2,
    rect: Rect,
}

impl PanelLeaf {
    pub fn new(panel: PanelId, min_size: Vec2) -> Self {
        Self {
            panel,
            min_size,
            rect: Rect::ZERO,
        }
    }
}

impl DockContainer for PanelLeaf {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Panel
    }

    fn minimum_child_count(&self) -> usize {
        0
    }

    fn measure_minimum(&self, _children: &[Vec2]) -> Vec2 {
        self.min_size
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn resize(&mut self, rect: Rect, _children: &[ChildLayout]) -> Vec<Rect> {
        self.rect = rect;
        Vec::new()
    }

    fn layout_children(
        &mut self,
        _children: &[ChildLayout],
        _relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>> {
        Ok(None)
    }

    fn load_state(&mut self, state: &ContainerState) {
        self.rect = Rect::from_min_size(self.rect.min, vec2(state.width, state.height));
    }
}

// ----------------------------------------------------------------------------

/// Tab group: every child gets the full rect, one of them is active.
#[derive(Clone, Debug, PartialEq)]
pub struct FillContainer {
    pub role: FillRole,
    children: Vec<NodeId>,
    active: Option<NodeId>,
    rect: Rect,
}

impl FillContainer {
    pub fn new(role: FillRole) -> Self {
        Self {
            role,
            children: Vec::new(),
            active: None,
            rect: Rect::ZERO,
        }
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn is_document_manager(&self) -> bool {
        self.role == FillRole::DocumentManager
    }
}

impl DockContainer for FillContainer {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Fill
    }

    fn minimum_child_count(&self) -> usize {
        match self.role {
            FillRole::Tabs => 2,
            FillRole::DocumentManager => 0,
        }
    }

    fn measure_minimum(&self, children: &[Vec2]) -> Vec2 {
        children.iter().fold(Vec2::ZERO, |acc, min| acc.max(*min))
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn resize(&mut self, rect: Rect, children: &[ChildLayout]) -> Vec<Rect> {
        self.rect = rect;
        vec![rect; children.len()]
    }

    fn layout_children(
        &mut self,
        children: &[ChildLayout],
        relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>> {
        let unchanged = self.children.iter().copied().eq(children.iter().map(|c| c.id));
        if unchanged && !relayout_even_if_equal {
            return Ok(None);
        }

        self.children = children.iter().map(|c| c.id).collect();
        if !self.active.is_some_and(|active| self.children.contains(&active)) {
            self.active = self.children.first().copied();
        }
        Ok(Some(vec![self.rect; children.len()]))
    }

    fn set_active_child(&mut self, child: NodeId) {
        if self.children.contains(&child) {
            self.active = Some(child);
        }
    }

    fn dispose(&mut self) {
        self.children.clear();
        self.active = None;
    }

    fn save_state(&self, state: &mut ContainerState) {
        state.width = self.rect.width();
        state.height = self.rect.height();
        state.document_manager = self.is_document_manager();
        state.active_child = self
            .active
            .and_then(|active| self.children.iter().position(|&c| c == active));
    }

    fn load_state(&mut self, state: &ContainerState) {
        self.rect = Rect::from_min_size(self.rect.min, vec2(state.width, state.height));
        if state.document_manager {
            self.role = FillRole::DocumentManager;
        }
        if let Some(child) = state.active_child.and_then(|index| self.children.get(index)) {
            self.active = Some(*child);
        }
    }
}

// ----------------------------------------------------------------------------

/// Row or column splitter. All arithmetic lives in [`SplitterSizing`].
#[derive(Clone, Debug, PartialEq)]
pub struct SplitContainer {
    pub sizing: SplitterSizing,
}

impl SplitContainer {
    /// A splitter over `children` inside `bounds`.
    ///
    /// # Errors
    /// [`DockError::InsufficientChildren`] for fewer than two children.
    pub fn new(
        orientation: Orientation,
        bar_size: f32,
        children: Vec<NodeId>,
        bounds: Rect,
    ) -> DockResult<Self> {
        Ok(Self {
            sizing: SplitterSizing::new(orientation, bar_size, children, bounds)?,
        })
    }

    pub fn orientation(&self) -> Orientation {
        self.sizing.orientation()
    }

    fn varying_minimums(&self, children: &[ChildLayout]) -> Vec<f32> {
        let orientation = self.orientation();
        children
            .iter()
            .map(|c| orientation.varying(c.min_size))
            .collect()
    }
}

impl DockContainer for SplitContainer {
    fn kind(&self) -> ContainerKind {
        self.orientation().kind()
    }

    fn minimum_child_count(&self) -> usize {
        2
    }

    fn measure_minimum(&self, children: &[Vec2]) -> Vec2 {
        let orientation = self.orientation();
        let bars = self.sizing.bar_size() * children.len().saturating_sub(1) as f32;
        let varying = children.iter().map(|m| orientation.varying(*m)).sum::<f32>() + bars;
        let fixed = children
            .iter()
            .map(|m| orientation.fixed(*m))
            .fold(0.0, f32::max);
        orientation.compose(varying, fixed)
    }

    fn rect(&self) -> Rect {
        self.sizing.bounds()
    }

    fn resize(&mut self, rect: Rect, children: &[ChildLayout]) -> Vec<Rect> {
        let minimums = self.varying_minimums(children);
        self.sizing.resize(rect, &minimums)
    }

    fn layout_children(
        &mut self,
        children: &[ChildLayout],
        relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>> {
        let ids = children.iter().map(|c| c.id).collect_vec();
        let minimums = self.varying_minimums(children);
        self.sizing
            .perform_layout(&ids, &minimums, relayout_even_if_equal)
    }

    fn dispose(&mut self) {
        self.sizing.clear();
    }

    fn load_state(&mut self, state: &ContainerState) {
        let min = self.sizing.bounds().min;
        self.sizing
            .set_bounds(Rect::from_min_size(min, vec2(state.width, state.height)));
    }
}

// ----------------------------------------------------------------------------

/// The payload owned by a dock node.
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Panel(PanelLeaf),
    Split(SplitContainer),
    Fill(FillContainer),
}

impl Container {
    pub fn panel(panel: PanelId, min_size: Vec2) -> Self {
        Self::Panel(PanelLeaf::new(panel, min_size))
    }

    pub fn tabs() -> Self {
        Self::Fill(FillContainer::new(FillRole::Tabs))
    }

    pub fn document_manager() -> Self {
        Self::Fill(FillContainer::new(FillRole::DocumentManager))
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, Self::Panel(_))
    }

    pub fn panel_id(&self) -> Option<PanelId> {
        match self {
            Self::Panel(leaf) => Some(leaf.panel),
            Self::Split(_) | Self::Fill(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitContainer> {
        match self {
            Self::Split(split) => Some(split),
            Self::Panel(_) | Self::Fill(_) => None,
        }
    }

    pub fn as_split_mut(&mut self) -> Option<&mut SplitContainer> {
        match self {
            Self::Split(split) => Some(split),
            Self::Panel(_) | Self::Fill(_) => None,
        }
    }

    pub fn as_fill(&self) -> Option<&FillContainer> {
        match self {
            Self::Fill(fill) => Some(fill),
            Self::Panel(_) | Self::Split(_) => None,
        }
    }

    fn inner(&self) -> &dyn DockContainer {
        match self {
            Self::Panel(c) => c,
            Self::Split(c) => c,
            Self::Fill(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DockContainer {
        match self {
            Self::Panel(c) => c,
            Self::Split(c) => c,
            Self::Fill(c) => c,
        }
    }
}

impl DockContainer for Container {
    fn kind(&self) -> ContainerKind {
        self.inner().kind()
    }

    fn minimum_child_count(&self) -> usize {
        self.inner().minimum_child_count()
    }

    fn measure_minimum(&self, children: &[Vec2]) -> Vec2 {
        self.inner().measure_minimum(children)
    }

    fn rect(&self) -> Rect {
        self.inner().rect()
    }

    fn resize(&mut self, rect: Rect, children: &[ChildLayout]) -> Vec<Rect> {
        self.inner_mut().resize(rect, children)
    }

    fn layout_children(
        &mut self,
        children: &[ChildLayout],
        relayout_even_if_equal: bool,
    ) -> DockResult<Option<Vec<Rect>>> {
        self.inner_mut()
            .layout_children(children, relayout_even_if_equal)
    }

    fn set_active_child(&mut self, child: NodeId) {
        self.inner_mut().set_active_child(child);
    }

    fn dispose(&mut self) {
        self.inner_mut().dispose();
    }

    fn save_state(&self, state: &mut ContainerState) {
        self.inner().save_state(state);
    }

    fn load_state(&mut self, state: &ContainerState) {
        self.inner_mut().load_state(state);
    }
}
