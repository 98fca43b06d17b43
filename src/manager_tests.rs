use std::cell::RefCell;
use std::rc::Rc;

use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde_json::json;

use crate::config::DockConfig;
use crate::container::{ContainerKind, DockContainer as _};
use crate::dock_builder::{DockBuilder, SplitDirection};
use crate::error::DockError;
use crate::events::DockEvent;
use crate::integrity;
use crate::layout::DockKind;
use crate::manager::DockManager;
use crate::node::NodeId;
use crate::panel::{
    InstanceType, PanelAttributes, PanelContent, PanelId, PanelTypeMetadata, SurfaceHandle,
};
use crate::panel_state::{
    Animation, AnimationStatus, Animator, PanelContainerState, TransitionOutcome,
};

use PanelContainerState::{Docked, Floating, InCollapser, Maximized, Minimized, PopupWindow};

#[derive(Default)]
struct TestContent {
    locked: bool,
    broken: bool,
    state: serde_json::Value,
}

impl PanelContent for TestContent {
    fn initialize(
        &mut self,
        attributes: &mut PanelAttributes,
        options: &serde_json::Value,
    ) -> Result<SurfaceHandle, Box<dyn std::error::Error>> {
        if self.broken {
            return Err("no surface available".into());
        }
        if let Some(title) = options.get("title").and_then(|t| t.as_str()) {
            title.clone_into(&mut attributes.title);
        }
        self.state = options.clone();
        Ok(SurfaceHandle(7))
    }

    fn can_close(&self) -> bool {
        !self.locked
    }

    fn load_state(&mut self, state: &serde_json::Value) {
        self.state = state.clone();
    }

    fn save_state(&self) -> serde_json::Value {
        self.state.clone()
    }
}

/// Never finishes on its own; tests call `complete_animation`.
struct HeldAnimator;

impl Animator for HeldAnimator {
    fn start(&mut self, _animation: &Animation) -> AnimationStatus {
        AnimationStatus::Running
    }
}

fn host() -> Rect {
    Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 800.0))
}

fn manager_with(config: DockConfig) -> DockManager {
    env_logger::builder().is_test(true).try_init().ok();

    let mut manager = DockManager::new(config, host()).unwrap();
    manager
        .register_panel_type(PanelTypeMetadata::new("editor", || {
            Box::new(TestContent::default())
        }))
        .unwrap();
    manager
        .register_panel_type(PanelTypeMetadata::new("locked", || {
            Box::new(TestContent {
                locked: true,
                ..Default::default()
            })
        }))
        .unwrap();
    manager
        .register_panel_type(PanelTypeMetadata::new("broken", || {
            Box::new(TestContent {
                broken: true,
                ..Default::default()
            })
        }))
        .unwrap();
    manager
        .register_panel_type(
            PanelTypeMetadata::new("console", || Box::new(TestContent::default()))
                .instance_type(InstanceType::Singleton),
        )
        .unwrap();
    manager
}

fn manager() -> DockManager {
    manager_with(DockConfig {
        debug_integrity: true,
        ..Default::default()
    })
}

fn record(manager: &mut DockManager) -> Rc<RefCell<Vec<DockEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    manager.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn editor(manager: &mut DockManager, title: &str) -> PanelId {
    manager
        .create_panel("editor", &json!({ "title": title }))
        .unwrap()
}

fn titled(manager: &DockManager, title: &str) -> PanelId {
    manager
        .panels()
        .find(|p| p.title() == title)
        .map(|p| p.id)
        .unwrap()
}

fn assert_tree_ok(manager: &DockManager) {
    let issues = integrity::tree_integrity_issues(manager.tree());
    assert!(
        issues.is_empty(),
        "tree integrity failed:\n{}",
        issues.join("\n")
    );
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn kind(manager: &DockManager, node: NodeId) -> ContainerKind {
    manager.tree().container(node).unwrap().kind()
}

/// `a` in the document area, `b` docked right of it with a quarter of the width.
fn two_panels(manager: &mut DockManager) -> (PanelId, PanelId) {
    let a = editor(manager, "a");
    let b = editor(manager, "b");
    manager.dock_to_document(a).unwrap();
    let document = manager.document_node().unwrap();
    manager.dock_right(document, b, Some(0.25)).unwrap();
    (a, b)
}

#[test]
fn new_panels_dock_into_the_document_area() {
    let mut m = manager();
    let events = record(&mut m);

    let a = editor(&mut m, "main.rs");
    assert_eq!(m.panel_state(a), None);

    let node = m.dock_to_document(a).unwrap();
    let document = m.document_node().unwrap();
    assert_eq!(m.tree().parent(node), Some(document));
    assert_eq!(m.panel_state(a), Some(Docked));
    assert_eq!(m.active_panel(), Some(a));

    let panel = m.panel(a).unwrap();
    assert_eq!(panel.title(), "main.rs");
    assert!(panel.visible);
    assert_eq!(Some(panel.frame_rect), m.tree().rect(node));

    let events = events.borrow();
    assert!(events.contains(&DockEvent::Docked { panel: a, node }), "{events:?}");
    assert!(events.contains(&DockEvent::ActivePanelChanged {
        panel: Some(a),
        previous: None,
    }));
    assert_tree_ok(&m);
}

#[test]
fn singletons_are_reused_and_failed_panels_are_not_registered() {
    let mut m = manager();
    let first = m.create_panel("console", &json!(null)).unwrap();
    let second = m.create_panel("console", &json!(null)).unwrap();
    assert_eq!(first, second);

    let err = m.create_panel("broken", &json!(null));
    assert!(
        matches!(
            err,
            Err(DockError::ContentInitialization { ref panel_type, .. }) if panel_type == "broken"
        ),
        "{err:?}"
    );
    assert!(!m.registry().has_instances("broken"));
    assert_eq!(m.panels().count(), 1);

    assert!(matches!(
        m.create_panel("ghost", &json!(null)),
        Err(DockError::UnknownPanelType(_))
    ));
}

#[test]
fn docking_left_of_the_document_area_splits_the_root() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    let b = editor(&mut m, "b");
    m.dock_to_document(a).unwrap();
    let document = m.document_node().unwrap();

    let node = m.dock_left(document, b, Some(0.3)).unwrap();
    let root = m.tree().root().unwrap();
    assert_eq!(kind(&m, root), ContainerKind::Row);
    assert_eq!(m.tree().children(root), &[node, document]);

    let ratios = m.tree().ratios(root).unwrap();
    assert!(approx(ratios[0], 0.3), "{ratios:?}");
    assert!(approx(ratios[1], 0.7), "{ratios:?}");
    assert_eq!(Some(m.panel(b).unwrap().frame_rect), m.tree().rect(node));
    assert_tree_ok(&m);
}

#[test]
fn docking_errors() {
    let mut m = manager();
    let (a, _b) = two_panels(&mut m);
    let document = m.document_node().unwrap();

    assert!(matches!(
        m.dock_left(document, a, None),
        Err(DockError::AlreadyDocked(panel)) if panel == a
    ));

    let c = editor(&mut m, "c");
    let gone = m.dock_down(document, c, None).unwrap();
    m.close_panel(c).unwrap();
    let d = editor(&mut m, "d");
    assert!(matches!(
        m.dock_left(gone, d, None),
        Err(DockError::NodeNotFound(node)) if node == gone
    ));
    assert_eq!(m.panel_state(d), None);
    assert_tree_ok(&m);
}

#[test]
fn floating_and_docking_back() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    let b = editor(&mut m, "b");
    m.dock_to_document(a).unwrap();
    let document = m.document_node().unwrap();
    let node = m.dock_down(document, b, Some(0.4)).unwrap();
    let docked_rect = m.tree().rect(node).unwrap();

    let outcome = m.undock(b).unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Completed {
            from: Docked,
            to: Floating
        }
    );
    assert_eq!(m.panel_node(b), None);
    assert_eq!(m.tree().root(), Some(document));
    assert_eq!(m.model().dialog(b).unwrap().rect, docked_rect);
    assert!(m.model().is_topmost(b));

    let moved = Rect::from_min_size(pos2(40.0, 50.0), vec2(300.0, 200.0));
    m.set_dialog_rect(b, moved).unwrap();
    assert_eq!(m.panel(b).unwrap().frame_rect, moved);

    let node = m.dock_down(document, b, Some(0.4)).unwrap();
    assert_eq!(m.panel_state(b), Some(Docked));
    assert!(m.model().dialog(b).is_none());
    let root = m.tree().root().unwrap();
    assert_eq!(kind(&m, root), ContainerKind::Column);
    assert_eq!(m.tree().children(root), &[document, node]);
    assert!(approx(m.tree().ratios(root).unwrap()[1], 0.4));
    assert_tree_ok(&m);
}

#[test]
fn floating_a_new_panel_uses_the_default_size() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    m.float_panel(a, None).unwrap();

    let rect = m.model().dialog(a).unwrap().rect;
    assert_eq!(rect.size(), m.config().default_dialog_size);
    assert_eq!(rect.center(), host().center());
    assert_eq!(m.panel_state(a), Some(Floating));
    assert_eq!(m.tree().children(m.document_node().unwrap()), &[] as &[NodeId]);
}

#[test]
fn close_veto_keeps_everything() {
    let mut m = manager();
    let events = record(&mut m);
    let locked = m.create_panel("locked", &json!(null)).unwrap();
    let node = m.dock_to_document(locked).unwrap();
    let document = m.document_node().unwrap();

    assert!(matches!(m.close_panel(locked), Err(DockError::CloseVetoed(p)) if p == locked));
    assert!(matches!(m.close_node(document), Err(DockError::CloseVetoed(p)) if p == locked));
    assert_eq!(m.panel_node(locked), Some(node));
    assert!(m.panel(locked).is_some());
    assert!(
        !events
            .borrow()
            .iter()
            .any(|e| matches!(e, DockEvent::Closed { .. }))
    );
}

#[test]
fn closing_collapses_the_layout() {
    let mut m = manager();
    let (a, b) = two_panels(&mut m);
    let document = m.document_node().unwrap();
    let events = record(&mut m);

    m.close_panel(b).unwrap();
    assert_eq!(m.tree().root(), Some(document));
    assert!(m.panel(b).is_none());
    assert_eq!(m.panel_state(b), None);
    assert_eq!(m.registry().instances("editor"), &[a]);
    assert_eq!(m.active_panel(), None);
    assert!(events.borrow().contains(&DockEvent::Closed { panel: b }));
    assert_tree_ok(&m);

    m.close_node(document).unwrap();
    assert!(m.tree().is_empty());
    assert!(m.panel(a).is_none());
    assert_eq!(m.document_node(), None);

    // With no tree left, the next panel becomes the root.
    let c = editor(&mut m, "c");
    let node = m.dock_to_document(c).unwrap();
    assert_eq!(m.tree().root(), Some(node));
    assert_eq!(m.tree().rect(node), Some(host()));
}

#[test]
fn unpin_then_pin_docks_back_in_place() {
    let mut m = manager();
    let (_a, b) = two_panels(&mut m);
    let document = m.document_node().unwrap();
    let events = record(&mut m);

    m.unpin_panel(b).unwrap();
    assert_eq!(m.panel_state(b), Some(InCollapser));
    assert_eq!(m.panel_node(b), None);
    assert_eq!(m.tree().root(), Some(document));
    let collapser = *m.model().collapser(b).unwrap();
    assert_eq!(collapser.side, DockKind::Right);
    assert!(!m.panel(b).unwrap().visible);

    assert!(m.expand(b).unwrap());
    assert!(m.model().collapser(b).unwrap().shown);
    let slide_out = m.panel(b).unwrap().frame_rect;
    assert_eq!(slide_out.right(), host().right());
    assert!(approx(slide_out.width(), m.config().collapser_panel_size));

    let document_dock = m.dock_left(document, b, None);
    assert!(matches!(
        document_dock,
        Err(DockError::TransitionRejected { state: InCollapser, .. })
    ));

    m.pin_panel(b).unwrap();
    assert_eq!(m.panel_state(b), Some(Docked));
    assert!(m.model().collapser(b).is_none());
    let root = m.tree().root().unwrap();
    assert_eq!(kind(&m, root), ContainerKind::Row);
    assert_eq!(m.tree().children(root)[0], document);
    assert!(approx(m.tree().ratios(root).unwrap()[1], 0.25));

    let events = events.borrow();
    assert!(events.contains(&DockEvent::Unpinned { panel: b }));
    assert!(events.contains(&DockEvent::Pinned { panel: b }));
    assert!(events.contains(&DockEvent::Expanded { panel: b }));
    assert_tree_ok(&m);
}

#[test]
fn unpin_is_rejected_without_collapsers() {
    let mut m = manager_with(DockConfig {
        enable_collapsers: false,
        ..Default::default()
    });
    let (_a, b) = two_panels(&mut m);
    assert_eq!(m.unpin_panel(b).unwrap(), TransitionOutcome::Rejected);
    assert_eq!(m.panel_state(b), Some(Docked));
    assert!(m.panel_node(b).is_some());
}

#[test]
fn popup_round_trip() {
    let mut m = manager();
    let (_a, b) = two_panels(&mut m);
    let document = m.document_node().unwrap();

    m.show_popup(b).unwrap();
    assert_eq!(m.panel_state(b), Some(PopupWindow));
    assert_eq!(m.tree().root(), Some(document));

    m.hide_popup(b).unwrap();
    assert_eq!(m.panel_state(b), Some(Docked));
    let info = m.query_dock_information(b).unwrap();
    assert_eq!(info.reference, document);
    assert_eq!(info.kind, DockKind::Right);
    assert!(approx(info.ratio.unwrap(), 0.25));
    assert_tree_ok(&m);
}

#[test]
fn minimized_panels_stack_from_the_right() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    let b = editor(&mut m, "b");
    let a_rect = Rect::from_min_size(pos2(10.0, 10.0), vec2(300.0, 200.0));
    let b_rect = Rect::from_min_size(pos2(400.0, 10.0), vec2(300.0, 200.0));
    m.float_panel(a, Some(a_rect)).unwrap();
    m.float_panel(b, Some(b_rect)).unwrap();

    m.minimize(a).unwrap();
    m.minimize(b).unwrap();
    assert_eq!(m.panel_state(a), Some(Minimized));
    assert!(m.model().dialog(a).unwrap().hidden);

    let slot = m.config().minimized_slot_size;
    let first = m.panel(a).unwrap().frame_rect;
    let second = m.panel(b).unwrap().frame_rect;
    assert_eq!(first.size(), slot);
    assert!(approx(first.left(), 1000.0 - slot.x));
    assert!(approx(first.bottom(), 800.0));
    assert!(approx(
        second.left(),
        1000.0 - 2.0 * slot.x - m.config().minimized_slot_spacing
    ));

    m.restore(a).unwrap();
    assert_eq!(m.panel_state(a), Some(Floating));
    assert_eq!(m.panel(a).unwrap().frame_rect, a_rect);
    assert!(!m.model().dialog(a).unwrap().hidden);
    // The remaining slot moves into the freed position.
    assert!(approx(m.panel(b).unwrap().frame_rect.left(), 1000.0 - slot.x));
}

#[test]
fn maximized_panels_follow_the_host() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    let node = m.dock_to_document(a).unwrap();
    let events = record(&mut m);

    m.maximize(a).unwrap();
    assert_eq!(m.panel_state(a), Some(Maximized));
    assert_eq!(m.panel(a).unwrap().frame_rect, host());
    assert_eq!(m.panel_node(a), Some(node));

    let bigger = Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 900.0));
    m.resize(bigger).unwrap();
    assert_eq!(m.panel(a).unwrap().frame_rect, bigger);
    assert_eq!(m.tree().rect(m.document_node().unwrap()), Some(bigger));

    m.restore(a).unwrap();
    assert_eq!(m.panel_state(a), Some(Docked));
    assert_eq!(Some(m.panel(a).unwrap().frame_rect), m.tree().rect(node));
    assert!(m.panel(a).unwrap().header_visible);

    let events = events.borrow();
    assert!(events.contains(&DockEvent::ContainerResized { rect: bigger }));
    assert!(events.contains(&DockEvent::StateChanged {
        panel: a,
        from: Docked,
        to: Maximized,
    }));
}

#[test]
fn animations_hold_the_machine_until_completed() {
    let mut m = manager().with_animator(HeldAnimator);
    let a = editor(&mut m, "a");
    m.dock_to_document(a).unwrap();
    let events = record(&mut m);

    let outcome = m.maximize(a).unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Started {
            from: Docked,
            to: Maximized
        }
    );
    assert!(m.is_transitioning(a));
    assert!(matches!(m.minimize(a), Err(DockError::TransitionInProgress(p)) if p == a));
    assert!(
        !events
            .borrow()
            .iter()
            .any(|e| matches!(e, DockEvent::StateChanged { .. }))
    );

    m.complete_animation(a).unwrap();
    assert_eq!(m.panel_state(a), Some(Maximized));
    assert!(!m.is_transitioning(a));
    assert!(events.borrow().contains(&DockEvent::StateChanged {
        panel: a,
        from: Docked,
        to: Maximized,
    }));
    assert!(matches!(
        m.complete_animation(a),
        Err(DockError::NoTransitionInFlight(_))
    ));
}

#[test]
fn floating_panels_collapse_to_their_header() {
    let mut m = manager();
    let (a, _b) = two_panels(&mut m);
    let c = editor(&mut m, "c");
    m.float_panel(c, None).unwrap();

    assert!(m.collapse(c).unwrap());
    assert!(m.model().dialog(c).unwrap().collapsed);
    assert!(m.expand(c).unwrap());
    assert!(!m.model().dialog(c).unwrap().collapsed);

    // Docked panels have nothing to collapse.
    assert!(!m.collapse(a).unwrap());
}

#[test]
fn activating_a_tab_selects_it() {
    let mut m = manager();
    let a = editor(&mut m, "a");
    let b = editor(&mut m, "b");
    let a_node = m.dock_to_document(a).unwrap();
    m.dock_to_document(b).unwrap();
    let document = m.document_node().unwrap();
    let events = record(&mut m);

    m.set_active_panel(Some(a)).unwrap();
    let fill = m.tree().container(document).unwrap().as_fill().unwrap();
    assert_eq!(fill.active(), Some(a_node));
    assert_eq!(
        events.borrow().as_slice(),
        &[DockEvent::ActivePanelChanged {
            panel: Some(a),
            previous: Some(b),
        }]
    );
    assert!(matches!(
        m.set_active_panel(Some(PanelId::from_u64(999))),
        Err(DockError::PanelNotFound(_))
    ));
}

#[test]
fn splitter_operations_keep_panel_rects_in_sync() {
    let mut m = manager();
    let (a, b) = two_panels(&mut m);
    let root = m.tree().root().unwrap();

    m.set_splitter_ratios(root, &[0.5, 0.5]).unwrap();
    let b_node = m.panel_node(b).unwrap();
    assert_eq!(Some(m.panel(b).unwrap().frame_rect), m.tree().rect(b_node));

    m.drag_splitter_bar(root, 0, -100.0).unwrap();
    let ratios = m.tree().ratios(root).unwrap();
    assert!(ratios[0] < 0.5, "{ratios:?}");
    assert_eq!(Some(m.panel(b).unwrap().frame_rect), m.tree().rect(b_node));

    m.reorder(b_node, 0).unwrap();
    assert_eq!(m.tree().children(root)[0], b_node);
    let a_node = m.panel_node(a).unwrap();
    assert_eq!(Some(m.panel(a).unwrap().frame_rect), m.tree().rect(a_node));
    assert_tree_ok(&m);
}

#[test]
fn save_and_load_restore_the_layout() {
    let mut m = manager();
    let (_a, _b) = two_panels(&mut m);
    let c = editor(&mut m, "c");
    let c_rect = Rect::from_min_size(pos2(50.0, 60.0), vec2(300.0, 200.0));
    m.float_panel(c, Some(c_rect)).unwrap();
    let d = editor(&mut m, "d");
    m.float_panel(d, None).unwrap();
    m.minimize(d).unwrap();
    let json = m.save_state().unwrap();

    let mut loaded = manager();
    loaded.load_state(&json).unwrap();
    assert_eq!(loaded.panels().count(), 4);

    let a = titled(&loaded, "a");
    let b = titled(&loaded, "b");
    let c = titled(&loaded, "c");
    let d = titled(&loaded, "d");
    assert_eq!(loaded.panel_state(a), Some(Docked));
    assert_eq!(loaded.panel_state(b), Some(Docked));
    assert_eq!(loaded.panel_state(c), Some(Floating));
    assert_eq!(loaded.panel_state(d), Some(Minimized));
    assert_eq!(loaded.model().dialog(c).unwrap().rect, c_rect);
    assert_eq!(
        loaded.panel(a).unwrap().content.save_state(),
        json!({ "title": "a" })
    );

    let root = loaded.tree().root().unwrap();
    assert_eq!(kind(&loaded, root), ContainerKind::Row);
    let document = loaded.document_node().unwrap();
    assert_eq!(loaded.tree().children(root)[0], document);
    assert_eq!(loaded.tree().parent(loaded.panel_node(a).unwrap()), Some(document));
    assert!(approx(loaded.tree().ratios(root).unwrap()[1], 0.25));
    assert_tree_ok(&loaded);

    assert_eq!(loaded.registry().instances("editor").len(), 4);
}

#[test]
fn failed_load_keeps_the_live_layout() {
    let mut m = manager();
    let (a, b) = two_panels(&mut m);
    let before = m.snapshot();

    let bad = json!({
        "graphInfo": {
            "containerType": "row",
            "state": { "width": 100.0, "height": 100.0 },
            "children": [
                { "containerType": "panel", "state": { "width": 50.0, "height": 100.0, "panelType": "editor" } },
                { "containerType": "panel", "state": { "width": 50.0, "height": 100.0, "panelType": "ghost" } }
            ]
        },
        "dialogsInfo": []
    });
    let err = m.load_state(&bad.to_string());
    assert!(matches!(err, Err(DockError::UnknownPanelType(ref t)) if t == "ghost"), "{err:?}");

    assert!(m.load_state("{ not json").is_err());
    assert_eq!(m.snapshot(), before);
    assert_eq!(m.panel_state(a), Some(Docked));
    assert_eq!(m.panel_state(b), Some(Docked));
    assert_eq!(m.registry().instances("editor"), &[a, b]);
}

#[test]
fn builder_layouts_install_into_the_manager() {
    let mut m = manager();
    let old = editor(&mut m, "old");
    m.dock_to_document(old).unwrap();

    let mut b = DockBuilder::new();
    let dockspace = b.add_node();
    let (left, _main) = b.split_node(dockspace, SplitDirection::Left, 0.25).unwrap();
    b.dock_panes(["editor", "console"], left).unwrap();
    m.install_layout(b.finish(dockspace)).unwrap();

    assert!(m.panel(old).is_none());
    assert_eq!(m.panels().count(), 2);
    assert!(m.panels().all(|p| m.panel_state(p.id) == Some(Docked)));

    let root = m.tree().root().unwrap();
    assert_eq!(kind(&m, root), ContainerKind::Row);
    let children = m.tree().children(root).to_vec();
    let [tabs, document] = children[..] else {
        panic!("expected two children");
    };
    assert_eq!(kind(&m, tabs), ContainerKind::Fill);
    assert_eq!(m.document_node(), Some(document));
    assert!(approx(m.tree().ratios(root).unwrap()[0], 0.25));

    let c = editor(&mut m, "c");
    let node = m.dock_to_document(c).unwrap();
    assert_eq!(m.tree().parent(node), Some(document));
    assert_tree_ok(&m);
}

#[test]
fn minimum_sizes_reach_the_tree() {
    struct Wide;

    impl PanelContent for Wide {
        fn initialize(
            &mut self,
            _attributes: &mut PanelAttributes,
            _options: &serde_json::Value,
        ) -> Result<SurfaceHandle, Box<dyn std::error::Error>> {
            Ok(SurfaceHandle::default())
        }

        fn min_size(&self) -> Vec2 {
            vec2(600.0, 0.0)
        }
    }

    let mut m = manager();
    m.register_panel_type(PanelTypeMetadata::new("wide", || Box::new(Wide)))
        .unwrap();
    let a = editor(&mut m, "a");
    m.dock_to_document(a).unwrap();
    let wide = m.create_panel("wide", &json!(null)).unwrap();
    let document = m.document_node().unwrap();
    let node = m.dock_right(document, wide, Some(0.1)).unwrap();

    assert!(m.tree().rect(node).unwrap().width() >= 600.0 - 1e-3);
    assert_tree_ok(&m);
}
