// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use handoff_store::{DragStore, Monitor, Observable, StoredData};
use kurbo::Point;

fn bench_cell_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("observable");
    for subscribers in [1_usize, 16, 256] {
        let cell = Observable::new(0_u64);
        let hits = Rc::new(Cell::new(0_u64));
        let _subs: Vec<_> = (0..subscribers)
            .map(|_| {
                let hits = hits.clone();
                cell.subscribe(move |v: &u64| hits.set(hits.get().wrapping_add(*v)))
            })
            .collect();
        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_function(format!("set_notify_n{}", subscribers), |b| {
            let mut next = 0_u64;
            b.iter(|| {
                next += 1;
                black_box(cell.set(next));
            });
        });
        group.bench_function(format!("set_unchanged_n{}", subscribers), |b| {
            let current = cell.get();
            b.iter(|| black_box(cell.set(current)));
        });
    }
    group.finish();
}

fn bench_monitor_writes(c: &mut Criterion) {
    let store = DragStore::new();
    store.set_data(StoredData::new(7_u32, "card"));
    let _sub = store.subscribe_to_monitor(|m| {
        black_box(m);
    });
    c.bench_function("store/set_monitor", |b| {
        let mut x = 0.0;
        b.iter(|| {
            x += 1.0;
            store.set_monitor(Some(Monitor {
                position: Point::new(x, 10.0),
                dragging_id: Some(String::from("card")),
                droppable_id: Some(String::from("zone")),
            }));
        });
    });
    c.bench_function("store/update_data_only", |b| {
        let mut n = 0_u32;
        b.iter(|| {
            n = n.wrapping_add(1);
            store.update_data_only(black_box(n));
        });
    });
}

criterion_group!(benches, bench_cell_fanout, bench_monitor_writes);
criterion_main!(benches);
