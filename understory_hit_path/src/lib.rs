// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_hit_path --heading-base-level=0

//! Understory Hit Path: multi-pointer hit-path tracking and dispatch for UI input.
//!
//! ## Overview
//!
//! This crate routes pointer input (touch, mouse, stylus, hover) to the input
//! consumers under each pointer and keeps routing it there for the rest of
//! the gesture, even as the pointer leaves their bounds.
//!
//! - [`adapter`]: maps platform slots, which are reused as soon as a finger
//!   lifts, to stable logical [`PointerId`](types::PointerId)s.
//! - [`walker`]: resolves a position to the chain of consumers under it,
//!   outermost first, over any [`SpatialTree`](walker::SpatialTree).
//! - [`tracker`]: the [`HitPathTracker`](tracker::HitPathTracker) forest. Hit
//!   paths sharing a prefix share nodes. Each batch is dispatched in three
//!   passes: Initial (outer to inner), Main (inner to outer), and Final (outer
//!   to inner).
//! - [`processor`]: the [`EventProcessor`](processor::EventProcessor) façade
//!   tying the three together.
//! - [`layout`]: [`LayoutTree`](layout::LayoutTree), a small ready-made spatial tree.
//!
//! ## Consumption
//!
//! Consumers receive [`PointerEvent`](types::PointerEvent)s in local
//! coordinates and may claim part of a pointer's movement or its press/release
//! transition. Claims accumulate across consumers and passes and are never
//! cleared, so an ancestor in Main sees only what its descendants left.
//!
//! ## Lifecycle
//!
//! - A pointer going down is hit-tested once; its path stays until it goes up
//!   or stops appearing in batches.
//! - A hovering pointer is hit-tested on every batch. Consumers it newly
//!   covers see [`Enter`](types::PointerEventType::Enter), consumers it left
//!   see [`Exit`](types::PointerEventType::Exit) once and are then dropped from
//!   its path.
//! - Positions are localized against a consumer's current
//!   [`placement`](filter::PointerInputFilter::placement), so moving a node
//!   mid-gesture does not skew what it sees.
//! - A consumer may retain paths through its
//!   [`CustomEventDispatcher`](tracker::CustomEventDispatcher), deferring their
//!   removal until it releases them.
//! - Consumers reporting themselves detached are cancelled and pruned before
//!   the next batch; during dispatch they are skipped immediately.
//! - Cancel notifies every consumer, innermost first, and clears all state.
//!
//! ## Minimal usage
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kurbo::{Point, Size, Vec2};
//! use understory_hit_path::adapter::{RawAction, RawBatch, RawPointer, ScreenOffset};
//! use understory_hit_path::filter::PointerInputFilter;
//! use understory_hit_path::layout::{LayoutTree, LocalLayout};
//! use understory_hit_path::processor::EventProcessor;
//! use understory_hit_path::types::{PointerEvent, PointerEventPass, PointerType};
//! use understory_hit_path::walker::HitTestWalker;
//!
//! #[derive(Default)]
//! struct Presses(Cell<u32>);
//!
//! impl PointerInputFilter for Presses {
//!     fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, _: Size) {
//!         if pass == PointerEventPass::Main {
//!             for change in &mut event.changes {
//!                 if change.changed_to_down() {
//!                     change.consume_down_change();
//!                     self.0.set(self.0.get() + 1);
//!                 }
//!             }
//!         }
//!     }
//!     fn on_cancel(&self) {}
//! }
//!
//! let button = Rc::new(Presses::default());
//! let mut tree = LayoutTree::new();
//! let node = tree.insert(None, LocalLayout::new(Vec2::new(10.0, 10.0), Size::new(40.0, 20.0)));
//! tree.add_filter(node, button.clone());
//!
//! let mut processor = EventProcessor::new();
//! let finger = vec![RawPointer::new(0, PointerType::Touch, Point::new(20.0, 15.0))];
//! let result = processor.process(
//!     &RawBatch::new(RawAction::Down, 0, 0, finger),
//!     &ScreenOffset(Vec2::ZERO),
//!     &HitTestWalker::new(&tree),
//! );
//! assert!(result.dispatched_to_anything);
//! assert_eq!(button.0.get(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): builds Kurbo with `std`.
//! - `libm`: builds Kurbo with `libm` for `no_std` targets.
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade at `debug`
//! and `trace` levels; install any logger to see them.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapter;
pub mod filter;
pub mod layout;
pub mod processor;
pub mod tracker;
pub mod types;
pub mod walker;

#[cfg(test)]
mod test_support;
