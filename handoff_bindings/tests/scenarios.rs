// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end drag scenarios driven through a host session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use handoff_bindings::{
    DROPPABLE_ID, DragOptions, DropOptions, Error, Monitor, Provider, ProviderOptions, Scope,
    ScopePolicy, StoredData,
};
use handoff_host::{DragEvent, DragOutcome, EventKind, Host, LocalNode, NodeId};
use kurbo::{Point, Rect};

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    count: u32,
}

type Calls = Rc<RefCell<Vec<(Option<Counter>, Monitor)>>>;

fn recorder(calls: &Calls) -> impl Fn(Option<&Counter>, &Monitor) + 'static {
    let calls = calls.clone();
    move |payload, monitor| calls.borrow_mut().push((payload.cloned(), monitor.clone()))
}

fn element(host: &Host, parent: NodeId, bounds: Rect) -> NodeId {
    host.insert(parent, LocalNode::element(bounds)).unwrap()
}

#[test]
fn drag_hover_drop_end() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let scope = provider.scope();
    let card_1 = element(&host, host.body(), Rect::new(0.0, 0.0, 50.0, 50.0));
    let card_2 = element(&host, host.body(), Rect::new(0.0, 60.0, 50.0, 110.0));
    let zone = element(&host, host.body(), Rect::new(100.0, 0.0, 200.0, 100.0));

    let ended = Rc::new(Cell::new(false));
    let source_1 = scope.drag_source(
        DragOptions::new("1", Counter { count: 0 })
            .element(card_1)
            .on_end({
                let ended = ended.clone();
                move |_| ended.set(true)
            }),
    );
    let source_2 = scope.drag_source(DragOptions::new("2", Counter { count: 0 }).element(card_2));
    let hovers: Calls = Rc::default();
    let drops: Calls = Rc::default();
    let target = scope.drop_target(
        DropOptions::new("3")
            .element(zone)
            .on_hover(recorder(&hovers))
            .on_drop(recorder(&drops)),
    );

    let mut session = host.start_drag(card_1, Point::new(10.0, 10.0)).unwrap();
    host.run_pending();
    assert_eq!(provider.store().dragging_id().as_deref(), Some("1"));
    assert!(source_1.is_dragging());
    assert!(!source_2.is_dragging());

    assert!(session.move_to(Point::new(150.0, 40.0)));
    let expected = Monitor {
        position: Point::new(150.0, 40.0),
        dragging_id: Some(String::from("1")),
        droppable_id: Some(String::from("3")),
    };
    assert_eq!(
        hovers.borrow().last(),
        Some(&(Some(Counter { count: 0 }), expected.clone()))
    );
    assert!(target.is_over_current());

    assert_eq!(session.release(), DragOutcome::Dropped(zone));
    assert_eq!(*drops.borrow(), vec![(Some(Counter { count: 0 }), expected)]);
    assert!(!target.is_over());

    assert!(provider.store().data().is_none());
    assert!(!source_1.is_dragging());
    assert!(!ended.get());
    host.run_until_idle();
    assert!(ended.get());
}

#[test]
fn nested_targets_report_over_and_over_current() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let scope = provider.scope();
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let outer = element(&host, host.body(), Rect::new(100.0, 0.0, 300.0, 200.0));
    let inner = element(&host, outer, Rect::new(150.0, 50.0, 250.0, 150.0));
    let _source = scope.drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let a = scope.drop_target(DropOptions::new("A").element(outer));
    let b = scope.drop_target(DropOptions::new("B").element(inner));

    let mut session = host.start_drag(card, Point::ZERO).unwrap();
    host.run_pending();

    session.move_to(Point::new(110.0, 10.0));
    assert!(a.is_over() && a.is_over_current());
    assert!(!b.is_over());

    session.move_to(Point::new(200.0, 100.0));
    assert!(a.is_over());
    assert!(!a.is_over_current());
    assert!(b.is_over() && b.is_over_current());

    session.move_to(Point::new(110.0, 10.0));
    assert!(a.is_over() && a.is_over_current());
    assert!(!b.is_over());

    session.move_to(Point::new(500.0, 500.0));
    assert!(!a.is_over() && !b.is_over());

    session.move_to(Point::new(200.0, 100.0));
    assert!(a.is_over() && !a.is_over_current());
    assert!(b.is_over() && b.is_over_current());

    session.release();
    assert!(!a.is_over() && !b.is_over());
}

#[test]
fn first_move_onto_a_nested_target_marks_the_outer_one_over() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let scope = provider.scope();
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let outer = element(&host, host.body(), Rect::new(100.0, 0.0, 300.0, 200.0));
    let inner = element(&host, outer, Rect::new(150.0, 50.0, 250.0, 150.0));
    let _source = scope.drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let a = scope.drop_target(DropOptions::new("A").element(outer));
    let b = scope.drop_target(DropOptions::new("B").element(inner));

    let mut session = host.start_drag(card, Point::ZERO).unwrap();
    host.run_pending();
    assert!(session.move_to(Point::new(200.0, 100.0)));
    assert!(a.is_over() && !a.is_over_current());
    assert!(b.is_over() && b.is_over_current());

    session.move_to(Point::new(500.0, 500.0));
    assert!(!a.is_over() && !b.is_over());
}

#[test]
fn live_payload_reaches_the_drop() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let scope = provider.scope();
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let zone = element(&host, host.body(), Rect::new(20.0, 0.0, 40.0, 10.0));
    let source = scope.drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let drops: Calls = Rc::default();
    let _target = scope.drop_target(DropOptions::new("3").element(zone).on_drop(recorder(&drops)));

    let ids = Rc::new(Cell::new(0));
    let _watch = provider.store().subscribe_to_dragging_id({
        let ids = ids.clone();
        move |_| ids.set(ids.get() + 1)
    });

    let mut session = host.start_drag(card, Point::ZERO).unwrap();
    host.run_pending();
    assert_eq!(ids.get(), 1);
    for count in 1..=3 {
        source.set_data(Counter { count });
    }
    assert_eq!(
        provider.store().data(),
        Some(StoredData::new(Counter { count: 3 }, "1"))
    );
    assert_eq!(ids.get(), 1);

    session.move_to(Point::new(30.0, 5.0));
    session.release();
    assert_eq!(drops.borrow()[0].0, Some(Counter { count: 3 }));
}

#[test]
fn drop_without_a_drag_has_no_payload() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let zone = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let drops: Calls = Rc::default();
    let _target = provider
        .scope()
        .drop_target(DropOptions::new("3").element(zone).on_drop(recorder(&drops)));
    let event = host.dispatch(DragEvent::new(EventKind::Drop, zone, Point::new(1.0, 2.0)));
    assert!(event.default_prevented());
    let calls = drops.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, None);
    assert_eq!(calls[0].1.dragging_id, None);
    assert_eq!(calls[0].1.droppable_id.as_deref(), Some("3"));
}

#[test]
fn delegated_scopes_share_drags() {
    let host = Host::new();
    let left = element(&host, host.body(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let right = element(&host, host.body(), Rect::new(200.0, 0.0, 300.0, 100.0));
    let outer = Provider::<Counter>::root(&host);
    let inner = Provider::<Counter>::mount(&host, left, ProviderOptions::default()).unwrap();
    let card = element(&host, left, Rect::new(10.0, 10.0, 20.0, 20.0));

    let source = Scope::<Counter>::lookup(&host, card)
        .unwrap()
        .drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let drops: Calls = Rc::default();
    let target = outer
        .scope()
        .drop_target(DropOptions::new("right").element(right).on_drop(recorder(&drops)));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _watch = outer.state().subscribe_dragging({
        let seen = seen.clone();
        move |dragging| seen.borrow_mut().push(dragging)
    });

    let mut session = host.start_drag(card, Point::new(15.0, 15.0)).unwrap();
    host.run_pending();
    assert!(source.is_dragging());
    assert!(inner.state().is_dragging());
    session.move_to(Point::new(250.0, 50.0));
    assert!(target.is_over());
    session.release();
    assert_eq!(drops.borrow()[0].0, Some(Counter { count: 0 }));
    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[test]
fn isolated_scopes_do_not_see_each_other() {
    let host = Host::new();
    let panel = element(&host, host.body(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let outer = Provider::<Counter>::root(&host);
    let isolated = Provider::<Counter>::mount(
        &host,
        panel,
        ProviderOptions::default().policy(ScopePolicy::Isolate),
    )
    .unwrap();
    let card = element(&host, panel, Rect::new(10.0, 10.0, 20.0, 20.0));
    let _source = isolated
        .scope()
        .drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));

    let _session = host.start_drag(card, Point::new(15.0, 15.0)).unwrap();
    host.run_pending();
    assert!(isolated.state().is_dragging());
    assert!(!outer.state().is_dragging());
}

#[test]
fn limbo_records_the_cursor_outside_targets() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let zone = element(&host, host.body(), Rect::new(100.0, 0.0, 200.0, 100.0));
    let _source = provider
        .scope()
        .drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let _target = provider.scope().drop_target(DropOptions::new("3").element(zone));

    // Nothing is written before the drag start is recorded.
    let mut session = host.start_drag(card, Point::ZERO).unwrap();
    session.move_to(Point::new(50.0, 50.0));
    assert_eq!(provider.store().monitor(), None);

    host.run_pending();
    session.move_to(Point::new(60.0, 70.0));
    assert_eq!(
        provider.store().monitor(),
        Some(Monitor {
            position: Point::new(60.0, 70.0),
            dragging_id: Some(String::from("1")),
            droppable_id: None,
        })
    );

    session.move_to(Point::new(150.0, 50.0));
    assert_eq!(
        provider.store().monitor().and_then(|m| m.droppable_id).as_deref(),
        Some("3")
    );
    session.cancel();
    host.run_until_idle();
    assert_eq!(provider.store().monitor(), None);
}

#[test]
fn rebinding_keeps_one_listener_per_event() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let first = element(&host, host.body(), Rect::ZERO);
    let second = element(&host, host.body(), Rect::ZERO);
    let source = provider
        .scope()
        .drag_source(DragOptions::new("1", Counter { count: 0 }).element(first));
    let target = provider.scope().drop_target(DropOptions::new("3").element(second));

    for round in 0..5 {
        source.rebind();
        source.set_id(format!("s{round}"));
        source.set_enabled(false);
        source.set_enabled(true);
        target.rebind();
        target.set_id(format!("t{round}"));
    }
    for kind in [EventKind::DragStart, EventKind::DragEnd] {
        assert_eq!(host.listener_count(first, kind), 1);
    }
    for kind in [
        EventKind::DragEnter,
        EventKind::DragOver,
        EventKind::Drop,
        EventKind::DragLeave,
    ] {
        assert_eq!(host.listener_count(second, kind), 1);
    }
    assert_eq!(host.data_attr(second, DROPPABLE_ID).as_deref(), Some("t4"));

    source.set_element(Some(second));
    target.set_element(Some(first));
    assert_eq!(host.listener_count(first, EventKind::DragStart), 0);
    assert_eq!(host.listener_count(first, EventKind::DragOver), 1);
    assert_eq!(host.listener_count(second, EventKind::DragStart), 1);
    assert_eq!(host.listener_count(second, EventKind::DragOver), 0);
    assert_eq!(host.listener_count(second, EventKind::DragEnter), 0);
}

#[test]
#[should_panic(expected = "hover handler failed")]
fn hover_callback_panic_reaches_the_dispatcher() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let scope = provider.scope();
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let zone = element(&host, host.body(), Rect::new(20.0, 0.0, 40.0, 10.0));
    let _source = scope.drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    let _target = scope.drop_target(
        DropOptions::new("3")
            .element(zone)
            .on_hover(|_, _| panic!("hover handler failed")),
    );

    let mut session = host.start_drag(card, Point::ZERO).unwrap();
    host.run_pending();
    session.move_over(zone, Point::new(30.0, 5.0));
}

#[test]
#[should_panic(expected = "end handler failed")]
fn end_callback_panic_reaches_the_turn_runner() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let card = element(&host, host.body(), Rect::new(0.0, 0.0, 10.0, 10.0));
    let _source = provider.scope().drag_source(
        DragOptions::new("1", Counter { count: 0 })
            .element(card)
            .on_end(|_| panic!("end handler failed")),
    );

    let session = host.start_drag(card, Point::ZERO).unwrap();
    host.run_pending();
    session.cancel();
    host.run_pending();
}

#[test]
fn missing_provider_is_reported() {
    let host = Host::new();
    let node = element(&host, host.body(), Rect::ZERO);
    assert_eq!(
        Scope::<Counter>::lookup(&host, node).unwrap_err(),
        Error::MissingProvider { node }
    );
    let provider = Provider::<Counter>::root(&host);
    assert!(Scope::<Counter>::lookup(&host, node).is_ok());
    drop(provider);
    assert!(matches!(
        Scope::<Counter>::lookup(&host, node),
        Err(Error::MissingProvider { .. })
    ));
}

#[test]
fn removed_element_is_not_attached() {
    let host = Host::new();
    let provider = Provider::<Counter>::root(&host);
    let card = element(&host, host.body(), Rect::ZERO);
    host.remove(card);
    let source = provider
        .scope()
        .drag_source(DragOptions::new("1", Counter { count: 0 }).element(card));
    assert_eq!(source.bound_node(), None);
    let replacement = element(&host, host.body(), Rect::ZERO);
    source.set_element(Some(replacement));
    assert_eq!(source.bound_node(), Some(replacement));
}
