//! The aggregate owned by a manager: the dock tree plus everything that lives
//! outside of it (floating dialogs, collapser margins).

use egui::Rect;

use crate::container::Container;
use crate::error::DockResult;
use crate::layout::DockKind;
use crate::node::{DockTree, NodeId};
use crate::panel::PanelId;

/// A floating panel's window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dialog {
    pub panel: PanelId,
    pub rect: Rect,
    pub hidden: bool,

    /// Collapsed to its header.
    pub collapsed: bool,
}

/// A panel parked in a side margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collapser {
    pub panel: PanelId,
    pub side: DockKind,

    /// Slid out of the margin.
    pub shown: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DockModel {
    pub tree: DockTree,
    document_node: Option<NodeId>,

    /// Back to front.
    dialogs: Vec<Dialog>,
    collapsers: Vec<Collapser>,
}

impl DockModel {
    /// An empty model without a document area.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model whose root is an empty document area sized to `rect`.
    ///
    /// # Errors
    /// Only if the fresh tree cannot be laid out.
    pub fn with_document_manager(rect: Rect) -> DockResult<Self> {
        let mut tree = DockTree::new();
        let document = tree.insert(Container::document_manager());
        tree.set_root(document)?;
        tree.resize(document, rect)?;
        Ok(Self {
            tree,
            document_node: Some(document),
            dialogs: Vec::new(),
            collapsers: Vec::new(),
        })
    }

    /// The document area, if it is still part of the tree.
    pub fn document_node(&self) -> Option<NodeId> {
        self.document_node.filter(|&node| self.tree.is_docked(node))
    }

    pub fn set_document_node(&mut self, node: Option<NodeId>) {
        self.document_node = node;
    }

    /// `true` if `node` is reachable from the root.
    pub fn exists_in_model(&self, node: NodeId) -> bool {
        self.tree.is_docked(node)
    }

    // Dialogs ----------------------------------------------------------------

    /// Dialogs back to front.
    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    pub fn dialog(&self, panel: PanelId) -> Option<&Dialog> {
        self.dialogs.iter().find(|d| d.panel == panel)
    }

    pub fn dialog_mut(&mut self, panel: PanelId) -> Option<&mut Dialog> {
        self.dialogs.iter_mut().find(|d| d.panel == panel)
    }

    /// Add a dialog on top of all others. Returns `false` if the panel already had one.
    pub fn add_dialog(&mut self, dialog: Dialog) -> bool {
        if self.dialog(dialog.panel).is_some() {
            return false;
        }
        self.dialogs.push(dialog);
        true
    }

    pub fn remove_dialog(&mut self, panel: PanelId) -> Option<Dialog> {
        let index = self.dialogs.iter().position(|d| d.panel == panel)?;
        Some(self.dialogs.remove(index))
    }

    pub fn bring_to_front(&mut self, panel: PanelId) {
        if let Some(dialog) = self.remove_dialog(panel) {
            self.dialogs.push(dialog);
        }
    }

    pub fn is_topmost(&self, panel: PanelId) -> bool {
        self.dialogs.last().is_some_and(|d| d.panel == panel)
    }

    // Collapsers -------------------------------------------------------------

    pub fn collapsers(&self) -> &[Collapser] {
        &self.collapsers
    }

    pub fn collapser(&self, panel: PanelId) -> Option<&Collapser> {
        self.collapsers.iter().find(|c| c.panel == panel)
    }

    pub fn collapser_mut(&mut self, panel: PanelId) -> Option<&mut Collapser> {
        self.collapsers.iter_mut().find(|c| c.panel == panel)
    }

    pub fn add_collapser(&mut self, panel: PanelId, side: DockKind) {
        match self.collapser_mut(panel) {
            Some(collapser) => collapser.side = side,
            None => self.collapsers.push(Collapser {
                panel,
                side,
                shown: false,
            }),
        }
    }

    pub fn remove_collapser(&mut self, panel: PanelId) -> Option<Collapser> {
        let index = self.collapsers.iter().position(|c| c.panel == panel)?;
        Some(self.collapsers.remove(index))
    }

    /// Collapsers parked on `side`, in the order they were added.
    pub fn collapsers_on(&self, side: DockKind) -> impl Iterator<Item = &Collapser> + '_ {
        self.collapsers.iter().filter(move |c| c.side == side)
    }
}
