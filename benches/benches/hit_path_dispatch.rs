// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-path tracking benchmarks: dispatch over deep and wide forests,
//! hit testing over a grid of boxes, and pointer identity conversion.

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size, Vec2};
use understory_hit_path::adapter::{
    PointerIdentityAdapter, RawAction, RawBatch, RawPointer, ScreenOffset,
};
use understory_hit_path::filter::{FilterRef, PointerInputFilter};
use understory_hit_path::layout::{LayoutTree, LocalLayout};
use understory_hit_path::processor::EventProcessor;
use understory_hit_path::tracker::HitPathTracker;
use understory_hit_path::types::{
    ChangeBatch, PointerEvent, PointerEventPass, PointerId, PointerInputChange, PointerSample,
    PointerType,
};
use understory_hit_path::walker::HitTestWalker;

/// Claims half of each horizontal delta in Main.
struct Damper;

impl PointerInputFilter for Damper {
    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, _: Size) {
        if pass != PointerEventPass::Main {
            return;
        }
        for change in &mut event.changes {
            let delta = change.position_change();
            change.consume_position_change(Vec2::new(delta.x * 0.5, 0.0));
        }
    }

    fn on_cancel(&self) {}
}

fn chain(depth: usize) -> Vec<FilterRef> {
    (0..depth)
        .map(|_| Rc::new(Damper) as FilterRef)
        .collect()
}

fn moves(count: u64) -> ChangeBatch {
    (0..count)
        .map(|i| {
            let id = PointerId(i);
            let x = i as f64 * 10.0;
            let previous = PointerSample::new(0, Point::new(x, 5.0), true);
            let current = PointerSample::new(16, Point::new(x + 4.0, 5.0), true);
            (id, PointerInputChange::new(id, current, Some(previous)))
        })
        .collect()
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for &depth in &[4_usize, 16, 64] {
        let filters = chain(depth);
        let mut tracker = HitPathTracker::new();
        tracker.add_hit_path(PointerId(0), &filters);
        let template = moves(1);
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("chain_depth{}", depth), |b| {
            b.iter_batched(
                || template.clone(),
                |mut batch| black_box(tracker.dispatch_changes(&mut batch)),
                BatchSize::SmallInput,
            );
        });
    }
    for &fingers in &[2_u64, 10] {
        // Every finger shares the first four consumers, then branches.
        let shared = chain(4);
        let mut tracker = HitPathTracker::new();
        for i in 0..fingers {
            let path = shared.iter().cloned().chain(chain(4));
            tracker.add_hit_path(PointerId(i), path);
        }
        let template = moves(fingers);
        group.throughput(Throughput::Elements(fingers));
        group.bench_function(format!("shared_root_fingers{}", fingers), |b| {
            b.iter_batched(
                || template.clone(),
                |mut batch| black_box(tracker.dispatch_changes(&mut batch)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// A root panel holding an `n x n` grid of 10x10 cells, each with one consumer.
fn grid_tree(n: usize) -> LayoutTree {
    let mut tree = LayoutTree::new();
    let extent = n as f64 * 10.0;
    let root = tree.insert(
        None,
        LocalLayout::new(Vec2::ZERO, Size::new(extent, extent)),
    );
    tree.add_filter(root, Rc::new(Damper));
    for y in 0..n {
        for x in 0..n {
            let cell = tree.insert(
                Some(root),
                LocalLayout::new(
                    Vec2::new(x as f64 * 10.0, y as f64 * 10.0),
                    Size::new(10.0, 10.0),
                ),
            );
            tree.add_filter(cell, Rc::new(Damper));
        }
    }
    tree
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test");
    for &n in &[8_usize, 32, 64] {
        let tree = grid_tree(n);
        let walker = HitTestWalker::new(&tree);
        let mut rng = Rng::new(0xC0FF_EE00_D15E_A5E5);
        let extent = n as f64 * 10.0;
        let points: Vec<Point> = (0..256)
            .map(|_| Point::new(rng.next_f64() * extent, rng.next_f64() * extent))
            .collect();
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter(|| {
                let mut hits = 0;
                for p in &points {
                    hits += walker.hit_test(black_box(*p)).len();
                }
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn touch(count: u32, x_shift: f64) -> Vec<RawPointer> {
    (0..count)
        .map(|slot| {
            RawPointer::new(
                slot,
                PointerType::Touch,
                Point::new(slot as f64 * 10.0 + x_shift, 5.0),
            )
        })
        .collect()
}

fn bench_adapter(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter");
    let screen = ScreenOffset(Vec2::ZERO);
    for &count in &[1_u32, 10] {
        let mut adapter = PointerIdentityAdapter::new();
        let _ = adapter.convert(&RawBatch::new(RawAction::Down, 0, 0, touch(1, 0.0)), &screen);
        for i in 1..count {
            let _ = adapter.convert(
                &RawBatch::new(RawAction::PointerDown, i as usize, 0, touch(i + 1, 0.0)),
                &screen,
            );
        }
        let moved = RawBatch::new(RawAction::Move, 0, 16, touch(count, 2.0));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("convert_move_pointers{}", count), |b| {
            b.iter(|| black_box(adapter.convert(black_box(&moved), &screen)));
        });
    }
    group.finish();
}

fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("processor");
    let tree = grid_tree(32);
    let walker = HitTestWalker::new(&tree);
    let screen = ScreenOffset(Vec2::ZERO);
    group.bench_function("tap_grid_n32", |b| {
        b.iter_batched(
            EventProcessor::new,
            |mut processor| {
                let down = RawBatch::new(RawAction::Down, 0, 0, touch(1, 155.0));
                let up = RawBatch::new(RawAction::Up, 0, 16, touch(1, 155.0));
                processor.process(&down, &screen, &walker);
                black_box(processor.process(&up, &screen, &walker))
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

// Simple xorshift64* RNG for reproducible inputs.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }
}

criterion_group!(
    benches,
    bench_dispatch,
    bench_hit_test,
    bench_adapter,
    bench_processor
);
criterion_main!(benches);
