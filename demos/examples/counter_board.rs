// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two counting cards and three drop zones, one nested in another.
//!
//! Each card's payload ticks while it is being dragged; the drop zone sees the
//! latest count. Zone 2 sits inside zone 1, so hovering it lights zone 1 as
//! "over" and zone 2 as "over current".
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p handoff_demos --example counter_board`

use handoff_bindings::{DragLayer, DragOptions, DragSource, DropOptions, DropTarget, Provider};
use handoff_host::{Host, LocalNode};
use kurbo::{Point, Rect, Vec2};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq)]
struct Card {
    counter: u32,
}

fn border(target: &DropTarget<Card>) -> &'static str {
    if target.is_over_current() {
        "solid"
    } else if target.is_over() {
        "dashed"
    } else {
        "none"
    }
}

fn report(label: &str, sources: &[&DragSource<Card>], zones: &[&DropTarget<Card>]) {
    let cards: Vec<String> = sources
        .iter()
        .map(|s| {
            let state = if s.is_dragging() { "dragging" } else { "idle" };
            format!("card {} {state} ({})", s.id(), s.data().counter)
        })
        .collect();
    let zones: Vec<String> = zones
        .iter()
        .map(|z| format!("zone {} {}", z.id(), border(z)))
        .collect();
    println!("== {label} ==\n  {}\n  {}", cards.join(", "), zones.join(", "));
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    let host = Host::new();
    let provider = Provider::<Card>::root(&host);
    let scope = provider.scope();

    let palette = host
        .insert(host.body(), LocalNode::element(Rect::new(0.0, 0.0, 120.0, 60.0)))
        .unwrap();
    let card_nodes = [
        Rect::new(10.0, 10.0, 50.0, 50.0),
        Rect::new(60.0, 10.0, 100.0, 50.0),
    ]
    .map(|r| host.insert(palette, LocalNode::element(r)).unwrap());
    let zone_1 = host
        .insert(host.body(), LocalNode::element(Rect::new(200.0, 0.0, 400.0, 200.0)))
        .unwrap();
    let zone_2 = host
        .insert(zone_1, LocalNode::element(Rect::new(250.0, 50.0, 350.0, 150.0)))
        .unwrap();
    let zone_3 = host
        .insert(host.body(), LocalNode::element(Rect::new(450.0, 0.0, 550.0, 100.0)))
        .unwrap();

    let sources: Vec<DragSource<Card>> = card_nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            scope.drag_source(
                DragOptions::new(format!("{}", i + 1), Card { counter: 0 })
                    .element(*node)
                    .on_start(|card| println!("  start {card:?}"))
                    .on_end(|card| println!("  end {card:?}")),
            )
        })
        .collect();
    sources[0].preview(
        DragLayer::new(|host| {
            host.insert(host.body(), LocalNode::default())
                .unwrap_or_else(|_| host.body())
        })
        .on_remove(|host, ghost| host.remove(ghost))
        .offset(Vec2::new(-4.0, 4.0)),
    );

    let zones: Vec<DropTarget<Card>> = [("1", zone_1), ("2", zone_2), ("3", zone_3)]
        .into_iter()
        .map(|(id, node)| {
            scope.drop_target(
                DropOptions::new(id)
                    .element(node)
                    .on_hover(|card, m| println!("  hover {card:?} at ({}, {})", m.x(), m.y()))
                    .on_drop(|card, m| println!("  drop {card:?} on {:?}", m.droppable_id))
                    .on_leave(|card, m| println!("  leave {card:?} from {:?}", m.droppable_id)),
            )
        })
        .collect();
    let source_refs: Vec<&DragSource<Card>> = sources.iter().collect();
    let zone_refs: Vec<&DropTarget<Card>> = zones.iter().collect();

    let mut session = host.start_drag(card_nodes[0], Point::new(20.0, 20.0)).unwrap();
    println!("ghost: {:?}", session.drag_image());
    host.run_pending();
    report("picked up card 1", &source_refs, &zone_refs);

    // The card's counter keeps ticking while it travels.
    for (counter, to) in (1_u32..).zip([
        Point::new(220.0, 20.0),
        Point::new(300.0, 100.0),
        Point::new(500.0, 50.0),
    ]) {
        sources[0].set_data(Card { counter });
        session.move_to(to);
        host.run_pending();
        report(&format!("cursor at ({}, {})", to.x, to.y), &source_refs, &zone_refs);
    }

    println!("outcome: {:?}", session.release());
    host.run_until_idle();
    report("released", &source_refs, &zone_refs);
}
