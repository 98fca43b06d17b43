//! Randomized dock/undock/close sequences against the structural invariants.

use egui::{Pos2, Rect, Vec2, vec2};

use crate::container::Container;
use crate::integrity;
use crate::layout::{DockKind, DockLayoutEngine};
use crate::model::DockModel;
use crate::node::{DockTree, NodeId};
use crate::panel::PanelId;

fn assert_tree_ok(tree: &DockTree, step: usize) {
    let issues = integrity::tree_integrity_issues(tree);
    assert!(
        issues.is_empty(),
        "tree integrity failed after step {step}:\n{}",
        issues.join("\n")
    );
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0xD0C3_D0C3_D0C3_D0C3)
    }

    fn next_u64(&mut self) -> u64 {
        // Simple LCG: deterministic, fast, no dependency.
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 33) as usize % upper
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() >> 40) & 1 != 0
    }

    fn next_ratio(&mut self) -> Option<f32> {
        if self.next_bool() {
            Some(self.next_usize(101) as f32 / 100.0)
        } else {
            None
        }
    }

    fn next_kind(&mut self) -> DockKind {
        match self.next_usize(5) {
            0 => DockKind::Left,
            1 => DockKind::Right,
            2 => DockKind::Up,
            3 => DockKind::Down,
            _ => DockKind::Fill,
        }
    }
}

fn host() -> Rect {
    Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 720.0))
}

fn docked_nodes(tree: &DockTree) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = tree.node_ids().filter(|&id| tree.is_docked(id)).collect();
    nodes.sort();
    nodes
}

fn docked_panels(tree: &DockTree) -> Vec<NodeId> {
    docked_nodes(tree)
        .into_iter()
        .filter(|&id| tree.container(id).is_ok_and(|c| c.panel_id().is_some()))
        .collect()
}

/// The root covers the host and every docked node has been laid out.
fn assert_geometry(tree: &DockTree, step: usize) {
    let Some(root) = tree.root() else {
        return;
    };
    assert_eq!(tree.rect(root), Some(host()), "root rect after step {step}");
    for node in docked_nodes(tree) {
        let rect = tree.rect(node);
        assert!(
            rect.is_some_and(|r| r.is_finite()),
            "{node:?} has no usable rect after step {step}: {rect:?}"
        );
    }
}

fn run(seed: u64, steps: usize) {
    let engine = DockLayoutEngine::new(4.0);
    let mut model = DockModel::with_document_manager(host()).unwrap();
    let mut rng = Rng::new(seed);
    let mut next_panel = 0;
    let mut floating: Vec<PanelId> = Vec::new();

    for step in 0..steps {
        let tree = &mut model.tree;
        match rng.next_usize(4) {
            // Dock a new or a floating panel next to a random docked node.
            0 | 1 => {
                let panel = if !floating.is_empty() && rng.next_bool() {
                    floating.swap_remove(rng.next_usize(floating.len()))
                } else {
                    next_panel += 1;
                    PanelId::from_u64(next_panel)
                };
                let min_size = Vec2::splat(rng.next_usize(40) as f32);
                let node = tree.insert(Container::panel(panel, min_size));
                let candidates = docked_nodes(tree);
                if candidates.is_empty() {
                    engine.dock_root(tree, node, host()).unwrap();
                } else {
                    let reference = candidates[rng.next_usize(candidates.len())];
                    engine
                        .dock(tree, reference, node, rng.next_kind(), rng.next_ratio())
                        .unwrap();
                }
            }

            // Undock a panel, the way floating it does.
            2 => {
                let panels = docked_panels(tree);
                if panels.is_empty() {
                    continue;
                }
                let node = panels[rng.next_usize(panels.len())];
                let panel = tree.container(node).unwrap().panel_id().unwrap();
                let closed = engine.close(tree, node).unwrap();
                assert_eq!(closed, vec![panel]);
                assert!(!tree.contains(node));
                floating.push(panel);
            }

            // Close any node except the document area.
            _ => {
                let document = model.document_node();
                let tree = &mut model.tree;
                let candidates: Vec<NodeId> = docked_nodes(tree)
                    .into_iter()
                    .filter(|&id| {
                        document.is_none_or(|document| !tree.is_ancestor_or_self(id, document))
                    })
                    .collect();
                if candidates.is_empty() {
                    continue;
                }
                let node = candidates[rng.next_usize(candidates.len())];
                let expected = tree.panels_in_subtree(node);
                let closed = engine.close(tree, node).unwrap();
                assert_eq!(closed.len(), expected.len());
            }
        }

        assert_tree_ok(&model.tree, step);
        assert_geometry(&model.tree, step);
        assert!(
            model.document_node().is_some(),
            "document area lost after step {step}"
        );

        if rng.next_usize(10) == 0 {
            let root = model.tree.root().unwrap();
            let size = vec2(
                400.0 + rng.next_usize(1000) as f32,
                300.0 + rng.next_usize(600) as f32,
            );
            model
                .tree
                .resize(root, Rect::from_min_size(Pos2::ZERO, size))
                .unwrap();
            assert_tree_ok(&model.tree, step);
            model.tree.resize(root, host()).unwrap();
        }
    }
}

#[test]
fn random_layout_operations_keep_the_tree_valid() {
    for seed in 0..32 {
        run(seed, 200);
    }
}

#[test]
fn detached_nodes_never_dangle() {
    let engine = DockLayoutEngine::new(4.0);
    let mut model = DockModel::with_document_manager(host()).unwrap();
    let mut rng = Rng::new(7);
    let mut ids = Vec::new();

    for id in 1..=24 {
        let tree = &mut model.tree;
        let node = tree.insert(Container::panel(PanelId::from_u64(id), Vec2::ZERO));
        let candidates = docked_nodes(tree);
        let reference = candidates[rng.next_usize(candidates.len())];
        engine
            .dock(tree, reference, node, rng.next_kind(), rng.next_ratio())
            .unwrap();
        ids.push(node);
    }
    for &node in &ids {
        if model.tree.contains(node) {
            engine.undock(&mut model.tree, node).unwrap();
            assert_eq!(model.tree.parent(node), None);
            model.tree.dispose_node(node);
        }
    }

    // Only the document area survives.
    let document = model.document_node().unwrap();
    assert_eq!(model.tree.root(), Some(document));
    assert!(model.tree.children(document).is_empty());
    assert_eq!(model.tree.len(), 1);
    assert_tree_ok(&model.tree, ids.len());
}
