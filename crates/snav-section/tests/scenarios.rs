//! End-to-end navigation scenarios.
//!
//! A: nearest candidate by distance.
//! B: row sibling shortcut skips the geometric search.
//! C: a vetoed leave keeps focus and fires no notification.
//! D: entering a last-focused section restores its remembered item.
//! E: removal evicts from the visible set without an intersection report.
//! F: an empty visible set sends the search straight to the full pool.
//!
//! The remaining tests cover the other hand-off paths.

use std::cell::RefCell;
use std::rc::Rc;

use snav_core::event::{KeyCode, KeyEvent, KeyEventKind};
use snav_core::geometry::Rect;
use snav_core::nav::{
    AllowedAngles, CandidatesSearchType, Direction, EnterTo, NavigationMode, SectionKind,
};
use snav_dom::{Document, NodeFlags, NodeId};
use snav_section::{
    IgnoreReason, IntersectionEntry, LeaveEvent, MoveKind, NavOutcome, Navigator, PartialConfig,
    SectionId, VisibilityTracker, find_closest,
};

// ── Helpers ─────────────────────────────────────────────────────────────

const SIZE: f64 = 50.0;

fn add_item(nav: &mut Navigator, parent: NodeId, x: f64, y: f64) -> NodeId {
    let doc = nav.document_mut();
    let node = doc.create_element(NodeFlags::ITEM, Rect::new(x, y, SIZE, SIZE));
    doc.append_child(parent, node).unwrap();
    node
}

fn add_container(nav: &mut Navigator, parent: NodeId) -> NodeId {
    let doc = nav.document_mut();
    let node = doc.create_element(NodeFlags::empty(), Rect::default());
    doc.append_child(parent, node).unwrap();
    node
}

type EnterLog = Rc<RefCell<Vec<(NodeId, NodeId)>>>;

fn record_enters(nav: &mut Navigator, id: SectionId) -> EnterLog {
    let log: EnterLog = Rc::default();
    let sink = Rc::clone(&log);
    nav.customize_section(
        id,
        PartialConfig::new().on_enter(move |root: NodeId, item: NodeId| {
            sink.borrow_mut().push((root, item));
        }),
    )
    .unwrap();
    log
}

/// Two side-by-side sections:
///
/// ```text
///  left:  a0 (0,0)    a1 (100,0)
///  right: b0 (200,0)  b1 (300,0)
///                     b2 (300,100)
/// ```
struct TwoSections {
    nav: Navigator,
    left: SectionId,
    right: SectionId,
    left_root: NodeId,
    right_root: NodeId,
    a: [NodeId; 2],
    b: [NodeId; 3],
}

fn two_sections() -> TwoSections {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let left_root = add_container(&mut nav, body);
    let right_root = add_container(&mut nav, body);
    let a = [
        add_item(&mut nav, left_root, 0.0, 0.0),
        add_item(&mut nav, left_root, 100.0, 0.0),
    ];
    let b = [
        add_item(&mut nav, right_root, 200.0, 0.0),
        add_item(&mut nav, right_root, 300.0, 0.0),
        add_item(&mut nav, right_root, 300.0, 100.0),
    ];
    let left = nav.attach_section("left", left_root).unwrap();
    let right = nav.attach_section("right", right_root).unwrap();
    TwoSections {
        nav,
        left,
        right,
        left_root,
        right_root,
        a,
        b,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario A
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_a_nearest_by_distance() {
    let mut doc = Document::new(Rect::from_size(800.0, 600.0));
    let body = doc.body();
    let mut add = |rect: Rect| {
        let node = doc.create_element(NodeFlags::ITEM, rect);
        doc.append_child(body, node).unwrap();
        node
    };
    let reference = add(Rect::new(100.0, 100.0, 50.0, 50.0));
    let far = add(Rect::new(200.0, 100.0, 50.0, 50.0));
    let near = add(Rect::new(160.0, 100.0, 50.0, 50.0));

    let found = find_closest(
        &doc,
        reference,
        [far, near],
        Direction::Right,
        NavigationMode::ClosestByDistance,
        &AllowedAngles::default(),
    );
    assert_eq!(found, Some(near));
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario B
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_b_row_shortcut_skips_search() {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let row = add_container(&mut nav, body);
    // Sibling order deliberately disagrees with geometry.
    let first = add_item(&mut nav, row, 0.0, 0.0);
    let second = add_item(&mut nav, row, 400.0, 0.0);
    let _third = add_item(&mut nav, row, 100.0, 0.0);
    let id = nav.attach_section("row", row).unwrap();
    nav.customize_section(id, PartialConfig::new().kind(SectionKind::Row))
        .unwrap();
    nav.focus(first).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(first),
            to: second,
            via: MoveKind::Shortcut
        }
    );
    assert_eq!(nav.stats().searches, 0);
    assert_eq!(nav.stats().shortcut_hits, 1);
}

#[test]
fn row_edge_falls_back_to_geometry() {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let row = add_container(&mut nav, body);
    let first = add_item(&mut nav, row, 0.0, 0.0);
    let last = add_item(&mut nav, row, 100.0, 0.0);
    let below = add_item(&mut nav, body, 0.0, 200.0);
    let id = nav.attach_section("row", row).unwrap();
    nav.customize_section(id, PartialConfig::new().kind(SectionKind::Row))
        .unwrap();
    nav.focus(last).unwrap();

    assert_eq!(nav.navigate(Direction::Right), NavOutcome::NoCandidate);
    assert_eq!(nav.stats().shortcut_hits, 0);
    assert_eq!(nav.stats().searches, 1);

    nav.focus(first).unwrap();
    let outcome = nav.navigate(Direction::Down);
    assert_eq!(outcome.moved_to(), Some(below));
    assert_eq!(nav.stats().shortcut_hits, 0);
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario C
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_c_veto_keeps_focus() {
    let TwoSections {
        mut nav,
        left,
        right,
        a,
        b,
        ..
    } = two_sections();
    let left_log = record_enters(&mut nav, left);
    let right_log = record_enters(&mut nav, right);
    nav.customize_section(
        left,
        PartialConfig::new().on_leave(|event: &LeaveEvent<'_>| {
            event.direction != Direction::Right
        }),
    )
    .unwrap();
    nav.focus(a[1]).unwrap();
    left_log.borrow_mut().clear();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Vetoed {
            from: a[1],
            to: b[0]
        }
    );
    assert_eq!(nav.document().active_element(), Some(a[1]));
    assert!(left_log.borrow().is_empty());
    assert!(right_log.borrow().is_empty());
    assert_eq!(nav.stats().vetoes, 1);
    assert_eq!(nav.stats().hand_offs, 0);
}

#[test]
fn leave_event_carries_context() {
    let TwoSections {
        mut nav,
        left,
        left_root,
        a,
        b,
        ..
    } = two_sections();
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    nav.customize_section(
        left,
        PartialConfig::new().on_leave(move |event: &LeaveEvent<'_>| {
            let right = event.sections.by_name("right").and_then(|s| s.root());
            *sink.borrow_mut() = Some((
                event.direction,
                event.root,
                event.previous,
                event.next,
                right,
            ));
            true
        }),
    )
    .unwrap();
    nav.focus(a[1]).unwrap();
    nav.navigate(Direction::Right);

    let right_root = nav.section(nav.section_by_name("right").unwrap()).unwrap().root();
    assert_eq!(
        *seen.borrow(),
        Some((Direction::Right, left_root, a[1], b[0], right_root))
    );
}

#[test]
fn local_moves_do_not_consult_the_guard() {
    let TwoSections {
        mut nav, right, b, ..
    } = two_sections();
    nav.customize_section(
        right,
        PartialConfig::new().on_leave(|_: &LeaveEvent<'_>| false),
    )
    .unwrap();
    nav.focus(b[0]).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(b[0]),
            to: b[1],
            via: MoveKind::Local
        }
    );
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario D
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_d_last_focused_is_restored() {
    let TwoSections {
        mut nav, right, a, b, ..
    } = two_sections();
    nav.customize_section(right, PartialConfig::new().enter_to(EnterTo::LastFocused))
        .unwrap();
    nav.focus(b[2]).unwrap();
    nav.focus(a[1]).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(a[1]),
            to: b[2],
            via: MoveKind::Entered(right)
        }
    );
    assert_eq!(nav.stats().hand_offs, 1);
}

#[test]
fn removed_last_focused_falls_back_to_resolved_item() {
    let TwoSections {
        mut nav, right, a, b, ..
    } = two_sections();
    nav.customize_section(right, PartialConfig::new().enter_to(EnterTo::LastFocused))
        .unwrap();
    nav.focus(b[2]).unwrap();
    nav.focus(a[1]).unwrap();
    nav.document_mut().remove(b[2]).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(outcome.moved_to(), Some(b[0]));
}

#[test]
fn calculated_entry_focuses_resolved_item() {
    let TwoSections {
        mut nav, right, a, b, ..
    } = two_sections();
    nav.focus(b[2]).unwrap();
    nav.focus(a[1]).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(a[1]),
            to: b[0],
            via: MoveKind::Entered(right)
        }
    );
}

#[test]
fn default_element_entry_uses_getter() {
    let TwoSections {
        mut nav, right, a, b, ..
    } = two_sections();
    let preferred = b[1];
    nav.customize_section(
        right,
        PartialConfig::new()
            .enter_to(EnterTo::DefaultElement)
            .default_element(move |_: &Document, _: NodeId| Some(preferred)),
    )
    .unwrap();
    nav.focus(a[1]).unwrap();
    assert_eq!(nav.navigate(Direction::Right).moved_to(), Some(b[1]));

    nav.customize_section(
        right,
        PartialConfig::new().default_element(|_: &Document, _: NodeId| None),
    )
    .unwrap();
    nav.focus(a[1]).unwrap();
    assert_eq!(nav.navigate(Direction::Right).moved_to(), Some(b[0]));
}

#[test]
fn leaving_into_unsectioned_area() {
    let TwoSections { mut nav, a, .. } = two_sections();
    let body = nav.document().body();
    let loose = add_item(&mut nav, body, 0.0, 300.0);
    nav.focus(a[0]).unwrap();

    let outcome = nav.navigate(Direction::Down);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(a[0]),
            to: loose,
            via: MoveKind::Unsectioned
        }
    );
}

#[test]
fn marked_but_unregistered_root_enters_directly() {
    let TwoSections {
        mut nav,
        right,
        right_root,
        a,
        b,
        ..
    } = two_sections();
    nav.customize_section(right, PartialConfig::new().enter_to(EnterTo::LastFocused))
        .unwrap();
    nav.focus(b[2]).unwrap();
    nav.detach_section(right).unwrap();
    assert!(
        nav.document()
            .flags(right_root)
            .unwrap()
            .contains(NodeFlags::SECTION_ROOT)
    );
    nav.focus(a[1]).unwrap();

    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Moved {
            from: Some(a[1]),
            to: b[0],
            via: MoveKind::Unsectioned
        }
    );
}

// ═════════════════════════════════════════════════════════════════════════
// Focus notifications
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn enter_observer_sees_every_focus_inside_root() {
    let TwoSections {
        mut nav,
        right,
        right_root,
        a,
        b,
        ..
    } = two_sections();
    let log = record_enters(&mut nav, right);
    nav.focus(a[1]).unwrap();
    nav.navigate(Direction::Right);
    nav.navigate(Direction::Right);
    nav.navigate(Direction::Right);

    assert_eq!(
        *log.borrow(),
        vec![(right_root, b[0]), (right_root, b[1])]
    );
    assert_eq!(nav.section(right).unwrap().last_focused(), Some(b[1]));
}

#[test]
fn nested_sections_are_notified_outermost_first() {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let outer_root = add_container(&mut nav, body);
    let inner_root = add_container(&mut nav, outer_root);
    let leaf = add_item(&mut nav, inner_root, 0.0, 0.0);
    let outer = nav.attach_section("outer", outer_root).unwrap();
    let inner = nav.attach_section("inner", inner_root).unwrap();

    let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    for (id, label) in [(outer, "outer"), (inner, "inner")] {
        let sink = Rc::clone(&order);
        nav.customize_section(
            id,
            PartialConfig::new().on_enter(move |_: NodeId, _: NodeId| {
                sink.borrow_mut().push(label);
            }),
        )
        .unwrap();
    }

    assert!(nav.focus(leaf).unwrap());
    assert_eq!(*order.borrow(), vec!["outer", "inner"]);
    assert_eq!(nav.section(outer).unwrap().last_focused(), Some(leaf));
    assert_eq!(nav.section(inner).unwrap().last_focused(), Some(leaf));

    assert!(!nav.focus(leaf).unwrap());
    assert_eq!(order.borrow().len(), 2);
}

#[test]
fn innermost_section_handles_keys() {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let outer_root = add_container(&mut nav, body);
    let inner_root = add_container(&mut nav, outer_root);
    let a = add_item(&mut nav, inner_root, 0.0, 0.0);
    let b = add_item(&mut nav, outer_root, 100.0, 0.0);
    let outer = nav.attach_section("outer", outer_root).unwrap();
    let inner = nav.attach_section("inner", inner_root).unwrap();
    nav.customize_section(
        outer,
        PartialConfig::new().on_leave(|_: &LeaveEvent<'_>| false),
    )
    .unwrap();
    nav.customize_section(
        inner,
        PartialConfig::new().on_leave(|_: &LeaveEvent<'_>| false),
    )
    .unwrap();
    nav.focus(a).unwrap();

    // Leaving the inner root is vetoed by the inner guard.
    assert_eq!(
        nav.navigate(Direction::Right),
        NavOutcome::Vetoed { from: a, to: b }
    );

    nav.customize_section(
        inner,
        PartialConfig::new().on_leave(|_: &LeaveEvent<'_>| true),
    )
    .unwrap();
    // The outer guard is never asked: the move is a hand-off from the inner
    // section into the outer section's own items.
    assert_eq!(
        nav.navigate(Direction::Right),
        NavOutcome::Moved {
            from: Some(a),
            to: b,
            via: MoveKind::Entered(outer)
        }
    );
}

#[test]
fn handing_off_to_an_enclosing_last_focused_section_keeps_focus() {
    let mut nav = Navigator::new(Rect::from_size(1280.0, 720.0));
    let body = nav.document().body();
    let outer_root = add_container(&mut nav, body);
    let inner_root = add_container(&mut nav, outer_root);
    let a = add_item(&mut nav, inner_root, 0.0, 0.0);
    let b = add_item(&mut nav, outer_root, 100.0, 0.0);
    let outer = nav.attach_section("outer", outer_root).unwrap();
    nav.attach_section("inner", inner_root).unwrap();
    nav.customize_section(outer, PartialConfig::new().enter_to(EnterTo::LastFocused))
        .unwrap();
    nav.focus(a).unwrap();
    nav.reset_stats();

    // The outer section remembers `a`, so entering it lands where focus is.
    let outcome = nav.navigate(Direction::Right);
    assert_eq!(
        outcome,
        NavOutcome::Unchanged {
            at: a,
            via: MoveKind::Entered(outer)
        }
    );
    assert!(!outcome.is_moved());
    assert_eq!(outcome.moved_to(), None);
    assert_eq!(nav.document().active_element(), Some(a));
    assert_eq!(nav.stats().moves, 0);
    assert_eq!(nav.stats().hand_offs, 0);

    nav.focus(b).unwrap();
    assert_eq!(nav.section(outer).unwrap().last_focused(), Some(b));
}

#[test]
fn focus_section_on_focused_item_is_unchanged() {
    let TwoSections {
        mut nav, left, a, ..
    } = two_sections();
    let first = nav.focus_section(left, Some(a[0])).unwrap();
    assert_eq!(first.moved_to(), Some(a[0]));
    assert_eq!(nav.stats().moves, 1);

    let again = nav.focus_section(left, Some(a[0])).unwrap();
    assert_eq!(
        again,
        NavOutcome::Unchanged {
            at: a[0],
            via: MoveKind::Requested(left)
        }
    );
    assert_eq!(nav.stats().moves, 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Input filtering
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn repeat_handling_is_per_section() {
    let TwoSections {
        mut nav, left, a, ..
    } = two_sections();
    nav.customize_section(left, PartialConfig::new().handle_repeat(false))
        .unwrap();
    nav.focus(a[0]).unwrap();

    let held = KeyEvent::from_direction(Direction::Right).with_kind(KeyEventKind::Repeat);
    assert_eq!(nav.dispatch_key(held), NavOutcome::Ignored(IgnoreReason::Repeat));
    assert_eq!(nav.document().active_element(), Some(a[0]));

    nav.customize_section(left, PartialConfig::new().handle_repeat(true))
        .unwrap();
    assert_eq!(nav.dispatch_key(held).moved_to(), Some(a[1]));
}

#[test]
fn non_directional_keys_are_consumed() {
    let TwoSections { mut nav, a, .. } = two_sections();
    nav.focus(a[0]).unwrap();
    assert_eq!(
        nav.dispatch_key(KeyEvent::new(KeyCode::Enter)),
        NavOutcome::Ignored(IgnoreReason::NotDirectional)
    );
    assert_eq!(nav.stats().searches, 0);
}

#[test]
fn synthesized_keys_match_real_ones() {
    let TwoSections { mut nav, a, .. } = two_sections();
    nav.focus(a[0]).unwrap();
    let real = KeyEvent::new(KeyCode::from_name("ArrowRight").unwrap());
    assert_eq!(nav.dispatch_key(real).moved_to(), Some(a[1]));
    assert_eq!(nav.navigate(Direction::Left).moved_to(), Some(a[0]));
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario E
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_e_removal_evicts_synchronously() {
    let mut doc = Document::new(Rect::from_size(800.0, 600.0));
    let body = doc.body();
    let item = doc.create_element(NodeFlags::ITEM, Rect::new(10.0, 10.0, 50.0, 50.0));
    doc.append_child(body, item).unwrap();
    doc.take_mutations();

    let mut tracker = VisibilityTracker::new();
    tracker.start_observing([item], body);
    tracker.apply_intersections(&[IntersectionEntry {
        target: item,
        is_intersecting: true,
    }]);
    assert!(tracker.visible().contains(item));

    doc.remove(item).unwrap();
    let records = doc.take_mutations();
    tracker.on_mutations(&doc, &records);
    assert!(!tracker.visible().contains(item));
    assert!(!tracker.is_observed(item));
}

#[test]
fn pump_tracks_additions_and_scrolling() {
    let mut nav = Navigator::new(Rect::from_size(400.0, 300.0));
    let body = nav.document().body();
    let top = add_item(&mut nav, body, 0.0, 0.0);
    nav.start_observing(body);
    assert_eq!(nav.pump(), 1);

    let below = add_item(&mut nav, body, 0.0, 500.0);
    assert_eq!(nav.pump(), 1);
    assert_eq!(nav.visible_items().collect::<Vec<_>>(), vec![top]);
    assert!(nav.tracker().is_observed(below));

    nav.document_mut()
        .set_viewport(Rect::new(0.0, 400.0, 400.0, 300.0));
    assert_eq!(nav.pump(), 2);
    assert_eq!(nav.visible_items().collect::<Vec<_>>(), vec![below]);

    nav.stop_observing();
    assert_eq!(nav.visible_items().count(), 0);
}

// ═════════════════════════════════════════════════════════════════════════
// Scenario F
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_f_empty_visible_set_searches_full_pool_once() {
    let TwoSections { mut nav, a, .. } = two_sections();
    assert_eq!(
        nav.candidates_search_type(),
        CandidatesSearchType::VisibleFirst
    );
    assert!(nav.tracker().visible().is_empty());
    nav.focus(a[0]).unwrap();

    assert_eq!(nav.navigate(Direction::Right).moved_to(), Some(a[1]));
    assert_eq!(nav.stats().searches, 1);
    assert_eq!(nav.stats().fallback_searches, 0);
}

#[test]
fn visible_miss_falls_back_to_full_pool() {
    let mut nav = Navigator::new(Rect::from_size(400.0, 300.0));
    let body = nav.document().body();
    let here = add_item(&mut nav, body, 0.0, 0.0);
    let offscreen = add_item(&mut nav, body, 0.0, 600.0);
    nav.start_observing(body);
    nav.pump();
    assert_eq!(nav.visible_items().collect::<Vec<_>>(), vec![here]);
    nav.focus(here).unwrap();

    assert_eq!(nav.navigate(Direction::Down).moved_to(), Some(offscreen));
    assert_eq!(nav.stats().searches, 2);
    assert_eq!(nav.stats().fallback_searches, 1);
}

#[test]
fn search_type_all_ignores_visible_set() {
    let mut nav = Navigator::new(Rect::from_size(400.0, 300.0));
    let body = nav.document().body();
    let here = add_item(&mut nav, body, 0.0, 0.0);
    let offscreen = add_item(&mut nav, body, 0.0, 600.0);
    nav.start_observing(body);
    nav.pump();
    nav.set_candidates_search_type(CandidatesSearchType::All);
    nav.focus(here).unwrap();

    assert_eq!(nav.navigate(Direction::Down).moved_to(), Some(offscreen));
    assert_eq!(nav.stats().searches, 1);
    assert_eq!(nav.stats().fallback_searches, 0);
}

#[test]
fn visible_first_prefers_visible_candidate() {
    let mut nav = Navigator::new(Rect::from_size(400.0, 300.0));
    let body = nav.document().body();
    let here = add_item(&mut nav, body, 0.0, 100.0);
    // Closer, but its box lies left of the viewport.
    let hidden = add_item(&mut nav, body, -60.0, 100.0);
    let visible = add_item(&mut nav, body, 0.0, 0.0);
    nav.start_observing(body);
    nav.pump();
    assert!(!nav.tracker().visible().contains(hidden));
    nav.focus(here).unwrap();
    nav.customize_defaults(PartialConfig::new().allowed_angles(AllowedAngles::uniform(360.0)));

    assert_eq!(nav.navigate(Direction::Left).moved_to(), Some(visible));
    assert_eq!(nav.stats().fallback_searches, 0);

    nav.set_candidates_search_type(CandidatesSearchType::All);
    nav.focus(here).unwrap();
    assert_eq!(nav.navigate(Direction::Left).moved_to(), Some(hidden));
}
