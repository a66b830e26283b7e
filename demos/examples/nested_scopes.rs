// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegated and isolated providers side by side.
//!
//! The left panel mounts its own provider but delegates to the root, so a card
//! dragged from it can land in the right panel. The sandbox panel isolates its
//! scope: its drags never reach the root's state.
//!
//! Run:
//! - `cargo run -p handoff_demos --example nested_scopes`

use handoff_bindings::{DragOptions, DropOptions, Provider, ProviderOptions, Scope, ScopePolicy};
use handoff_host::{Host, LocalNode, NodeId};
use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;

fn panel(host: &Host, bounds: Rect) -> NodeId {
    host.insert(host.body(), LocalNode::element(bounds)).unwrap()
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let host = Host::new();
    let root = Provider::<&'static str>::root(&host);
    let left = panel(&host, Rect::new(0.0, 0.0, 100.0, 100.0));
    let right = panel(&host, Rect::new(200.0, 0.0, 300.0, 100.0));
    let sandbox = panel(&host, Rect::new(0.0, 200.0, 100.0, 300.0));

    let left_scope =
        Provider::<&'static str>::mount(&host, left, ProviderOptions::default()).unwrap();
    let sandbox_scope = Provider::<&'static str>::mount(
        &host,
        sandbox,
        ProviderOptions::default().policy(ScopePolicy::Isolate),
    )
    .unwrap();
    println!("left panel: {:?}, sandbox: {:?}", left_scope.role(), sandbox_scope.role());

    let _watch = root.state().subscribe_dragging(|dragging| {
        println!("  root sees dragging = {dragging}");
    });

    let card = host
        .insert(left, LocalNode::element(Rect::new(10.0, 10.0, 40.0, 40.0)))
        .unwrap();
    let toy = host
        .insert(sandbox, LocalNode::element(Rect::new(10.0, 210.0, 40.0, 240.0)))
        .unwrap();

    // Bindings find their scope from their own element.
    let _card = Scope::<&'static str>::lookup(&host, card)
        .unwrap()
        .drag_source(DragOptions::new("card", "a letter").element(card));
    let _toy = Scope::<&'static str>::lookup(&host, toy)
        .unwrap()
        .drag_source(DragOptions::new("toy", "a toy").element(toy));
    let _inbox = Scope::<&'static str>::lookup(&host, right)
        .unwrap()
        .drop_target(
            DropOptions::new("inbox")
                .element(right)
                .on_drop(|payload, _| println!("  inbox received {payload:?}")),
        );

    println!("== drag from the left panel ==");
    let mut session = host.start_drag(card, Point::new(20.0, 20.0)).unwrap();
    host.run_pending();
    session.move_to(Point::new(250.0, 50.0));
    println!("  outcome {:?}", session.release());
    host.run_until_idle();

    println!("== drag inside the sandbox ==");
    let mut session = host.start_drag(toy, Point::new(20.0, 220.0)).unwrap();
    host.run_pending();
    println!("  sandbox dragging = {}", sandbox_scope.state().is_dragging());
    session.move_to(Point::new(250.0, 50.0));
    println!("  outcome {:?}", session.release());
    host.run_until_idle();
}
