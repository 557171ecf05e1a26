// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit path basics.
//!
//! A panel holds two buttons. One finger presses the left button, drags off
//! it, and lifts; a second finger lands on the right button meanwhile. Every
//! consumer prints the passes it sees, showing Initial (outer to inner), Main
//! (inner to outer), and Final (outer to inner), and that a pointer keeps its
//! path after leaving the bounds it was hit in.
//!
//! Run:
//! - `cargo run -p understory_examples --example hit_path_basics`

use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use understory_hit_path::adapter::{RawAction, RawBatch, RawPointer, ScreenOffset};
use understory_hit_path::filter::PointerInputFilter;
use understory_hit_path::layout::{LayoutTree, LocalLayout};
use understory_hit_path::processor::EventProcessor;
use understory_hit_path::types::{PointerEvent, PointerEventPass, PointerType};
use understory_hit_path::walker::HitTestWalker;

struct Printer(&'static str);

impl PointerInputFilter for Printer {
    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, bounds: Size) {
        for change in &event.changes {
            let local = change.current.position.unwrap_or_default();
            println!(
                "  {:<6} {:<7?} {:?} {:?} at ({:.0}, {:.0}) in {}x{}",
                self.0,
                pass,
                change.id,
                event.event_type(),
                local.x,
                local.y,
                bounds.width,
                bounds.height,
            );
        }
    }

    fn on_cancel(&self) {
        println!("  {:<6} cancel", self.0);
    }
}

fn finger(slot: u32, x: f64, y: f64) -> RawPointer {
    RawPointer::new(slot, PointerType::Touch, Point::new(x, y))
}

fn main() {
    let mut tree = LayoutTree::new();
    let panel = tree.insert(
        None,
        LocalLayout::new(Vec2::new(0.0, 0.0), Size::new(200.0, 100.0)),
    );
    let left = tree.insert(
        Some(panel),
        LocalLayout::new(Vec2::new(10.0, 10.0), Size::new(80.0, 40.0)),
    );
    let right = tree.insert(
        Some(panel),
        LocalLayout::new(Vec2::new(110.0, 10.0), Size::new(80.0, 40.0)),
    );
    tree.add_filter(panel, Rc::new(Printer("panel")));
    tree.add_filter(left, Rc::new(Printer("left")));
    tree.add_filter(right, Rc::new(Printer("right")));

    let walker = HitTestWalker::new(&tree);
    let screen = ScreenOffset(Vec2::ZERO);
    let mut processor = EventProcessor::new();

    let batches = [
        (
            "finger 0 down on left",
            RawBatch::new(RawAction::Down, 0, 0, vec![finger(0, 20.0, 20.0)]),
        ),
        (
            "finger 1 down on right",
            RawBatch::new(
                RawAction::PointerDown,
                1,
                16,
                vec![finger(0, 20.0, 20.0), finger(1, 150.0, 30.0)],
            ),
        ),
        (
            "finger 0 drags off left",
            RawBatch::new(
                RawAction::Move,
                0,
                32,
                vec![finger(0, 60.0, 80.0), finger(1, 150.0, 30.0)],
            ),
        ),
        (
            "finger 0 lifts",
            RawBatch::new(
                RawAction::PointerUp,
                0,
                48,
                vec![finger(0, 60.0, 80.0), finger(1, 150.0, 30.0)],
            ),
        ),
        (
            "finger 1 lifts",
            RawBatch::new(RawAction::Up, 0, 64, vec![finger(1, 150.0, 30.0)]),
        ),
    ];

    for (label, batch) in &batches {
        println!("== {label} ==");
        let result = processor.process(batch, &screen, &walker);
        println!(
            "  -> dispatched={} movement_consumed={} tracked_nodes={}",
            result.dispatched_to_anything,
            result.any_movement_consumed,
            processor.tracker().node_count(),
        );
    }
}
