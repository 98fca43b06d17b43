use std::collections::{HashMap, HashSet};
use std::hash::{Hash as _, Hasher as _};

use crate::container::{Container, DockContainer as _};
use crate::node::{DockTree, NodeId};

/// Human-readable list of everything wrong with `tree`. Empty means valid.
///
/// Checks: single parent per node, child lists and parent pointers agreeing,
/// acyclicity, reachability of every node from the root, active tabs being members,
/// and splitters tracking exactly their children.
pub fn tree_integrity_issues(tree: &DockTree) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();

    let Some(root) = tree.root() else {
        if !tree.is_empty() {
            issues.push(format!(
                "integrity: root=None but {} nodes remain",
                tree.len()
            ));
        }
        return issues;
    };

    let Some(root_node) = tree.get(root) else {
        issues.push(format!("integrity: root {root:?} missing"));
        return issues;
    };
    if let Some(parent) = root_node.parent() {
        issues.push(format!("integrity: root {root:?} has parent {parent:?}"));
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut parent_of: HashMap<NodeId, NodeId> = HashMap::new();
    let mut stack: Vec<NodeId> = vec![root];

    while let Some(node_id) = stack.pop() {
        if !visited.insert(node_id) {
            issues.push(format!("integrity: node {node_id:?} reached twice (cycle?)"));
            continue;
        }

        let Some(node) = tree.get(node_id) else {
            issues.push(format!("integrity: missing node {node_id:?} (reachable)"));
            continue;
        };

        let children = node.children();

        match &node.container {
            Container::Panel(_) => {
                if !children.is_empty() {
                    issues.push(format!(
                        "integrity: panel node {node_id:?} has children={children:?}"
                    ));
                }
            }
            Container::Fill(fill) => {
                if let Some(active) = fill.active() {
                    if !children.contains(&active) {
                        issues.push(format!(
                            "integrity: fill {node_id:?} active {active:?} not in children={children:?}"
                        ));
                    }
                }
            }
            Container::Split(split) => {
                if split.sizing.children() != children {
                    issues.push(format!(
                        "integrity: splitter {node_id:?} tracks {:?} but has children={children:?}",
                        split.sizing.children()
                    ));
                }
                if split.sizing.container_sizes().len() != children.len() {
                    issues.push(format!(
                        "integrity: splitter {node_id:?} has {} sizes for {} children",
                        split.sizing.container_sizes().len(),
                        children.len()
                    ));
                }
            }
        }

        if node.container.is_composite()
            && Some(node_id) != tree.root()
            && children.len() < node.container.minimum_child_count()
        {
            issues.push(format!(
                "integrity: composite {node_id:?} has {} children, minimum is {}",
                children.len(),
                node.container.minimum_child_count()
            ));
        }

        let mut local_set: HashSet<NodeId> = HashSet::new();
        for child in children {
            if !local_set.insert(*child) {
                issues.push(format!(
                    "integrity: parent {node_id:?} contains duplicate child {child:?}"
                ));
            }
        }

        for &child in children {
            let Some(child_node) = tree.get(child) else {
                issues.push(format!(
                    "integrity: parent {node_id:?} references missing child {child:?}"
                ));
                continue;
            };

            if child_node.parent() != Some(node_id) {
                issues.push(format!(
                    "integrity: child {child:?} of {node_id:?} points at parent {:?}",
                    child_node.parent()
                ));
            }

            if let Some(prev_parent) = parent_of.insert(child, node_id) {
                issues.push(format!(
                    "integrity: child {child:?} has multiple parents {prev_parent:?} and {node_id:?}"
                ));
            }

            stack.push(child);
        }
    }

    let total = tree.len();
    if visited.len() != total {
        issues.push(format!(
            "integrity: unreachable nodes {} of {}",
            total.saturating_sub(visited.len()),
            total
        ));
    }

    issues
}

/// Stable fingerprint of an issue list, for deduplicating repeated reports.
pub fn hash_issues(lines: &[String]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}

/// Log the issues of `tree` once per distinct issue set.
///
/// `last_hash` keeps the fingerprint of the previously reported set.
pub fn warn_on_integrity_issues(tree: &DockTree, last_hash: &mut Option<u64>) -> bool {
    let issues = tree_integrity_issues(tree);
    if issues.is_empty() {
        *last_hash = None;
        return true;
    }
    let hash = hash_issues(&issues);
    if *last_hash != Some(hash) {
        *last_hash = Some(hash);
        for issue in &issues {
            log::warn!("{issue}");
        }
    }
    false
}
