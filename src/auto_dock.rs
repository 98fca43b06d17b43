//! Remember where a panel was docked so it can be put back after a trip outside the
//! tree (collapser margin, popup window).

use crate::layout::{DockInformation, DockKind, DockLayoutEngine};
use crate::node::{DockTree, NodeId};

/// Dock information of every level between a panel's node and the root,
/// innermost first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutoDock {
    hierarchy: Vec<(NodeId, DockInformation)>,
}

impl AutoDock {
    /// Walk from `node` up to (but excluding) the root, recording how each level is docked.
    pub fn scan(engine: &DockLayoutEngine, tree: &DockTree, node: NodeId) -> Self {
        let mut hierarchy = Vec::new();
        let mut current = node;
        while tree.parent(current).is_some() {
            if let Ok(info) = engine.query_dock_information(tree, current) {
                hierarchy.push((current, info));
            }
            let Some(parent) = tree.parent(current) else {
                break;
            };
            current = parent;
        }
        log::trace!("auto-dock scan of {node:?}: {} levels", hierarchy.len());
        Self { hierarchy }
    }

    pub fn is_empty(&self) -> bool {
        self.hierarchy.is_empty()
    }

    pub fn levels(&self) -> impl Iterator<Item = &DockInformation> + '_ {
        self.hierarchy.iter().map(|(_, info)| info)
    }

    /// Which margin a collapsed panel goes to: the first horizontal docking wins,
    /// any vertical docking sends it down. Defaults to down.
    pub fn collapser_side(&self) -> DockKind {
        for info in self.levels() {
            match info.kind {
                DockKind::Left | DockKind::Right => return info.kind,
                DockKind::Up | DockKind::Down => return DockKind::Down,
                DockKind::Fill => {}
            }
        }
        DockKind::Down
    }

    /// The first recorded docking whose reference is still part of the tree.
    ///
    /// `None` means nothing survived; callers fall back to the document area.
    pub fn restore_target(&self, tree: &DockTree) -> Option<DockInformation> {
        self.levels()
            .find(|info| tree.is_docked(info.reference))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use egui::{Pos2, Rect, Vec2, vec2};

    use super::*;
    use crate::container::Container;
    use crate::panel::PanelId;

    fn panel(tree: &mut DockTree, id: u64) -> NodeId {
        tree.insert(Container::panel(PanelId::from_u64(id), Vec2::ZERO))
    }

    #[test]
    fn scan_records_every_level_and_picks_the_collapser_side() {
        let engine = DockLayoutEngine::new(2.0);
        let mut tree = DockTree::new();
        let a = panel(&mut tree, 1);
        let b = panel(&mut tree, 2);
        let c = panel(&mut tree, 3);
        let host = Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0));
        engine.dock_root(&mut tree, a, host).unwrap();
        engine.dock_right(&mut tree, a, b, None).unwrap();
        engine.dock_fill(&mut tree, b, c).unwrap();

        let auto = AutoDock::scan(&engine, &tree, c);
        let kinds: Vec<DockKind> = auto.levels().map(|info| info.kind).collect();
        assert_eq!(kinds, vec![DockKind::Fill, DockKind::Right]);
        assert_eq!(auto.collapser_side(), DockKind::Right);
    }

    #[test]
    fn restore_skips_references_that_no_longer_exist() {
        let engine = DockLayoutEngine::new(2.0);
        let mut tree = DockTree::new();
        let a = panel(&mut tree, 1);
        let b = panel(&mut tree, 2);
        let c = panel(&mut tree, 3);
        let host = Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0));
        engine.dock_root(&mut tree, a, host).unwrap();
        engine.dock_down(&mut tree, a, b, None).unwrap();
        engine.dock_fill(&mut tree, b, c).unwrap();

        let auto = AutoDock::scan(&engine, &tree, c);
        engine.undock(&mut tree, c).unwrap();
        engine.close(&mut tree, b).unwrap();

        let target = auto.restore_target(&tree).unwrap();
        assert_eq!(target.reference, a);
        assert_eq!(target.kind, DockKind::Down);
        assert_eq!(auto.collapser_side(), DockKind::Down);
    }

    #[test]
    fn root_panel_has_nothing_to_restore() {
        let engine = DockLayoutEngine::new(2.0);
        let mut tree = DockTree::new();
        let a = panel(&mut tree, 1);
        engine
            .dock_root(&mut tree, a, Rect::from_min_size(Pos2::ZERO, vec2(10.0, 10.0)))
            .unwrap();
        let auto = AutoDock::scan(&engine, &tree, a);
        assert!(auto.is_empty());
        assert_eq!(auto.restore_target(&tree), None);
    }
}
