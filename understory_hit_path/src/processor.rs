// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch processing: adapter, hit testing, tracker, result.
//!
//! [`EventProcessor`] owns a [`PointerIdentityAdapter`] and a
//! [`HitPathTracker`]. For each batch it:
//!
//! 1) prunes consumers that detached since the last batch;
//! 2) converts the raw batch (a cancel cancels everything instead);
//! 3) pairs each sample with the pointer's previous sample, forgetting
//!    pointers the batch no longer lists;
//! 4) hit-tests pointers that just went down, and hovering pointers unless the
//!    batch is a hover exit, adding their paths;
//! 5) dispatches Initial, Main, and Final;
//! 6) removes the paths of pointers that were released.
//!
//! Hover paths stay tracked between batches so the tracker can tell which
//! consumers the pointer entered or left.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use kurbo::Point;

use crate::adapter::{PointerIdentityAdapter, PositionCalculator, RawBatch};
use crate::tracker::HitPathTracker;
use crate::types::{
    ChangeBatch, PointerEventType, PointerId, PointerInputChange, PointerInputEvent,
    PointerSample, ProcessResult,
};
use crate::walker::HitTester;

/// Drives pointer batches through hit testing and dispatch.
#[derive(Debug, Default)]
pub struct EventProcessor {
    adapter: PointerIdentityAdapter,
    tracker: HitPathTracker,
    // Last sample of every pressed pointer.
    previous: BTreeMap<PointerId, PointerSample>,
}

impl EventProcessor {
    /// Create a processor with an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The hit paths currently tracked.
    pub fn tracker(&self) -> &HitPathTracker {
        &self.tracker
    }

    /// Process one platform batch.
    ///
    /// `positions` maps screen coordinates into the root space `hit_tester`
    /// works in.
    pub fn process<H: HitTester + ?Sized>(
        &mut self,
        batch: &RawBatch,
        positions: &dyn PositionCalculator,
        hit_tester: &H,
    ) -> ProcessResult {
        self.tracker.remove_detached_pointer_input_filters();
        match self.adapter.convert(batch, positions) {
            Some(event) => self.dispatch(&event, hit_tester),
            None => {
                self.process_cancel();
                ProcessResult::default()
            }
        }
    }

    /// Process a batch that already carries logical pointer ids.
    pub fn process_event<H: HitTester + ?Sized>(
        &mut self,
        event: &PointerInputEvent,
        hit_tester: &H,
    ) -> ProcessResult {
        self.tracker.remove_detached_pointer_input_filters();
        self.dispatch(event, hit_tester)
    }

    /// Cancel every in-flight pointer and forget all pointer state.
    pub fn process_cancel(&mut self) {
        self.tracker.process_cancel();
        self.previous.clear();
        self.adapter.reset();
    }

    fn dispatch<H: HitTester + ?Sized>(
        &mut self,
        event: &PointerInputEvent,
        hit_tester: &H,
    ) -> ProcessResult {
        let mut batch = self.changes_for(event);

        let exiting = event.event_type == PointerEventType::Exit;
        let needs_path: Vec<(PointerId, Point)> = batch
            .values()
            .filter(|c| {
                (c.changed_to_down_ignore_consumed() && !self.tracker.has_hit_path(c.id))
                    || (c.is_hovering() && !exiting)
            })
            .filter_map(|c| c.current.position.map(|p| (c.id, p)))
            .collect();
        for (id, position) in needs_path {
            let path = hit_tester.hit_test(position);
            if !path.is_empty() {
                self.tracker.add_hit_path(id, path);
            }
        }

        let dispatched_to_anything = self.tracker.dispatch_changes(&mut batch);
        let any_movement_consumed = batch
            .values()
            .any(|c| c.position_change() != c.position_change_ignore_consumed());

        for change in batch
            .values()
            .filter(|c| c.changed_to_up_ignore_consumed())
        {
            self.tracker.remove_hit_path(change.id);
        }

        ProcessResult {
            dispatched_to_anything,
            any_movement_consumed,
        }
    }

    fn changes_for(&mut self, event: &PointerInputEvent) -> ChangeBatch {
        self.previous
            .retain(|id, _| event.pointers.iter().any(|p| p.id == *id));
        event
            .pointers
            .iter()
            .map(|p| {
                let previous = if p.sample.down {
                    self.previous.insert(p.id, p.sample)
                } else {
                    self.previous.remove(&p.id)
                };
                (p.id, PointerInputChange::new(p.id, p.sample, previous))
            })
            .collect()
    }
}
