// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer identity.
//!
//! Platform slots are reused as soon as a finger lifts. This example feeds a
//! short touch sequence and a hovering stylus through the adapter and prints
//! the logical ids it assigns, showing that a new touch in a reused slot gets a
//! fresh id and that switching tools starts over.
//!
//! Run:
//! - `cargo run -p understory_examples --example pointer_identity`

use kurbo::{Point, Vec2};
use understory_hit_path::adapter::{
    PointerIdentityAdapter, RawAction, RawBatch, RawPointer, ScreenOffset,
};
use understory_hit_path::types::PointerType;

fn slots(tool: PointerType, slots: &[u32]) -> Vec<RawPointer> {
    slots
        .iter()
        .map(|s| RawPointer::new(*s, tool, Point::new(f64::from(*s) * 40.0, 10.0)))
        .collect()
}

fn main() {
    let mut adapter = PointerIdentityAdapter::new();
    // The window's content starts 8px right of the screen origin.
    let screen = ScreenOffset(Vec2::new(8.0, 0.0));
    let touch = PointerType::Touch;

    let sequence = [
        ("slot 0 down", RawBatch::new(RawAction::Down, 0, 0, slots(touch, &[0]))),
        (
            "slot 1 down",
            RawBatch::new(RawAction::PointerDown, 1, 10, slots(touch, &[0, 1])),
        ),
        (
            "slot 0 up",
            RawBatch::new(RawAction::PointerUp, 0, 20, slots(touch, &[0, 1])),
        ),
        (
            "slot 0 down again",
            RawBatch::new(RawAction::PointerDown, 0, 30, slots(touch, &[0, 1])),
        ),
        (
            "stylus hovers",
            RawBatch::new(RawAction::HoverEnter, 0, 40, slots(PointerType::Stylus, &[0])),
        ),
        ("cancel", RawBatch::new(RawAction::Cancel, 0, 50, Vec::new())),
    ];

    for (label, batch) in &sequence {
        match adapter.convert(batch, &screen) {
            Some(event) => {
                println!("{label}:");
                for p in &event.pointers {
                    println!(
                        "  {:?} down={} at {:?}",
                        p.id, p.sample.down, p.sample.position
                    );
                }
            }
            None => println!("{label}: cancelled"),
        }
        println!("  tracked slots: {}", adapter.tracked());
    }
}
