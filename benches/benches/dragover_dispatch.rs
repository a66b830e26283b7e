// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use handoff_bindings::{DragOptions, DropOptions, Provider};
use handoff_host::{DragEvent, EventKind, Host, LocalNode, NodeId};
use kurbo::{Point, Rect};

/// A chain of `depth` nested elements under the body, outermost first.
fn chain(host: &Host, depth: usize) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(depth);
    let mut parent = host.body();
    for i in 0..depth {
        let inset = i as f64;
        let node = host
            .insert(
                parent,
                LocalNode::element(Rect::new(inset, inset, 1000.0 - inset, 1000.0 - inset)),
            )
            .unwrap();
        out.push(node);
        parent = node;
    }
    out
}

fn bench_bubbling(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for depth in [4_usize, 32, 128] {
        let host = Host::new();
        let nodes = chain(&host, depth);
        let _listeners: Vec<_> = nodes
            .iter()
            .map(|n| {
                host.add_listener(*n, EventKind::DragOver, |e| {
                    black_box(e.current_target);
                })
            })
            .collect();
        let leaf = *nodes.last().unwrap();
        group.bench_function(format!("bubble_depth{}", depth), |b| {
            b.iter(|| host.dispatch(DragEvent::new(EventKind::DragOver, leaf, Point::ZERO)));
        });
    }
    group.finish();
}

fn bench_nested_targets(c: &mut Criterion) {
    let mut group = c.benchmark_group("bindings");
    for depth in [4_usize, 32] {
        let host = Host::new();
        let provider = Provider::<u32>::root(&host);
        let card = host.insert(host.body(), LocalNode::default()).unwrap();
        let _source = provider
            .scope()
            .drag_source(DragOptions::new("card", 1).element(card));
        let nodes = chain(&host, depth);
        let _targets: Vec<_> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                provider
                    .scope()
                    .drop_target(DropOptions::new(format!("t{i}")).element(*n))
            })
            .collect();
        group.bench_function(format!("hover_move_depth{}", depth), |b| {
            b.iter_batched(
                || {
                    let mut session = host.start_drag(card, Point::ZERO).unwrap();
                    host.run_pending();
                    session.move_to(Point::new(500.0, 500.0));
                    session
                },
                |mut session| {
                    for step in 0..16 {
                        let offset = f64::from(step);
                        session.move_to(Point::new(offset, 500.0));
                        session.move_to(Point::new(500.0, 500.0 - offset));
                    }
                    session.cancel();
                    host.run_until_idle();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bubbling, bench_nested_targets);
criterion_main!(benches);
