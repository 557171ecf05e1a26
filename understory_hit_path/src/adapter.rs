// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform batches to logical pointer samples.
//!
//! Platforms report pointers by slot index and reuse slots as soon as a finger
//! lifts. [`PointerIdentityAdapter`] maps each continuous pointer lifecycle to
//! its own [`PointerId`]:
//!
//! - A slot going down (or starting to hover) without a mapping gets a fresh id.
//! - Up and pointer-up emit the slot one last time as released, then forget it,
//!   so the next down on that slot gets a new id.
//! - Hover exit keeps the mapping, so exit then enter keeps the id, and a mouse
//!   that hovers then presses continues the hover's id.
//! - A single-pointer batch from a different tool than the previous
//!   single-pointer batch starts over, so a touch after mouse hover on slot 0
//!   is a new pointer.
//! - Cancel forgets every mapping and yields nothing.
//!
//! Ids come from a counter owned by the adapter and never repeat within it.
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_hit_path::adapter::{PointerIdentityAdapter, RawAction, RawBatch, RawPointer, ScreenOffset};
//! use understory_hit_path::types::PointerType;
//!
//! let mut adapter = PointerIdentityAdapter::new();
//! let screen = ScreenOffset(Vec2::ZERO);
//! let finger = |x| RawPointer::new(0, PointerType::Touch, Point::new(x, 0.0));
//!
//! let down = adapter.convert(&RawBatch::new(RawAction::Down, 0, 1, vec![finger(1.0)]), &screen).unwrap();
//! let up = adapter.convert(&RawBatch::new(RawAction::Up, 0, 2, vec![finger(1.0)]), &screen).unwrap();
//! let again = adapter.convert(&RawBatch::new(RawAction::Down, 0, 3, vec![finger(1.0)]), &screen).unwrap();
//! assert_eq!(down.pointers[0].id, up.pointers[0].id);
//! assert!(!up.pointers[0].sample.down);
//! assert_ne!(up.pointers[0].id, again.pointers[0].id);
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use crate::types::{
    Modifiers, PointerButtons, PointerEventType, PointerId, PointerInputEvent,
    PointerInputEventData, PointerSample, PointerType,
};

/// Action of a raw platform batch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RawAction {
    /// The first pointer went down.
    Down,
    /// An additional pointer went down; see [`RawBatch::action_index`].
    PointerDown,
    /// Pressed pointers moved.
    Move,
    /// The last pointer went up.
    Up,
    /// One of several pointers went up; see [`RawBatch::action_index`].
    PointerUp,
    /// The gesture was aborted by the platform.
    Cancel,
    /// A hovering pointer came into range.
    HoverEnter,
    /// A hovering pointer moved.
    HoverMove,
    /// A hovering pointer left range.
    HoverExit,
    /// A wheel or trackpad scroll.
    Scroll,
}

/// One slot of a raw batch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPointer {
    /// Platform slot, reused across lifecycles.
    pub slot: u32,
    /// Device kind.
    pub tool: PointerType,
    /// Event-local position, possibly shifted by a transient offset. Not used.
    pub position: Point,
    /// Position in screen space.
    pub screen_position: Point,
    /// Raw scroll axes. Positive `y` scrolls content up.
    pub scroll: Vec2,
}

impl RawPointer {
    /// A slot at `screen_position` with no local offset and no scroll.
    pub fn new(slot: u32, tool: PointerType, screen_position: Point) -> Self {
        Self {
            slot,
            tool,
            position: screen_position,
            screen_position,
            scroll: Vec2::ZERO,
        }
    }

    /// Replace the raw scroll axes.
    #[must_use]
    pub fn with_scroll(mut self, scroll: Vec2) -> Self {
        self.scroll = scroll;
        self
    }
}

/// A platform input batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBatch {
    /// What happened.
    pub action: RawAction,
    /// Index into `pointers` of the slot the action is about.
    pub action_index: usize,
    /// Timestamp in milliseconds.
    pub event_time: u64,
    /// Buttons held during the batch.
    pub buttons: PointerButtons,
    /// Keyboard modifiers held during the batch.
    pub modifiers: Modifiers,
    /// Every slot the platform reports, in platform order.
    pub pointers: Vec<RawPointer>,
}

impl RawBatch {
    /// A batch with no buttons or modifiers held.
    pub fn new(
        action: RawAction,
        action_index: usize,
        event_time: u64,
        pointers: Vec<RawPointer>,
    ) -> Self {
        Self {
            action,
            action_index,
            event_time,
            buttons: PointerButtons::empty(),
            modifiers: Modifiers::empty(),
            pointers,
        }
    }

    /// Replace the held buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Replace the held keyboard modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// How the batch reads as a whole to consumers.
    fn event_type(&self) -> PointerEventType {
        match self.action {
            RawAction::Down | RawAction::PointerDown => PointerEventType::Press,
            RawAction::Up | RawAction::PointerUp => PointerEventType::Release,
            RawAction::Move | RawAction::HoverMove => PointerEventType::Move,
            RawAction::HoverEnter => PointerEventType::Enter,
            RawAction::HoverExit => PointerEventType::Exit,
            RawAction::Scroll => PointerEventType::Scroll,
            RawAction::Cancel => PointerEventType::Unknown,
        }
    }

    fn acting_slot(&self) -> Option<u32> {
        self.pointers.get(self.action_index).map(|p| p.slot)
    }
}

/// Converts between screen space and the root space of the receiver.
pub trait PositionCalculator {
    /// Screen position to root space.
    fn screen_to_local(&self, position_on_screen: Point) -> Point;

    /// Root-space position to screen space.
    fn local_to_screen(&self, local: Point) -> Point;
}

/// A receiver whose root sits at a fixed offset on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScreenOffset(pub Vec2);

impl PositionCalculator for ScreenOffset {
    fn screen_to_local(&self, position_on_screen: Point) -> Point {
        position_on_screen - self.0
    }

    fn local_to_screen(&self, local: Point) -> Point {
        local + self.0
    }
}

/// Maps platform slots to logical pointer ids.
#[derive(Clone, Debug, Default)]
pub struct PointerIdentityAdapter {
    next_id: u64,
    ids: BTreeMap<u32, PointerId>,
    previous_tool: Option<PointerType>,
}

impl PointerIdentityAdapter {
    /// Create an adapter with no mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every slot mapping. The id counter keeps counting.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.previous_tool = None;
    }

    /// Number of slots currently mapped.
    pub fn tracked(&self) -> usize {
        self.ids.len()
    }

    fn allocate(&mut self) -> PointerId {
        let id = PointerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Convert a platform batch. Returns `None` for cancel.
    ///
    /// Positions come from each slot's screen position mapped through
    /// `positions`; the batch itself is not modified.
    pub fn convert(
        &mut self,
        batch: &RawBatch,
        positions: &dyn PositionCalculator,
    ) -> Option<PointerInputEvent> {
        if batch.action == RawAction::Cancel {
            log::debug!("cancel: forgetting {} pointer slots", self.ids.len());
            self.reset();
            return None;
        }
        self.clear_on_device_change(batch);

        if matches!(
            batch.action,
            RawAction::Down | RawAction::PointerDown | RawAction::HoverEnter
        ) && let Some(slot) = batch.acting_slot()
            && !self.ids.contains_key(&slot)
        {
            let id = self.allocate();
            self.ids.insert(slot, id);
        }

        let hovering = matches!(
            batch.action,
            RawAction::HoverEnter | RawAction::HoverMove | RawAction::HoverExit
        );
        let up_index = matches!(batch.action, RawAction::Up | RawAction::PointerUp)
            .then_some(batch.action_index);
        let scrolling = batch.action == RawAction::Scroll;

        let mut pointers = Vec::with_capacity(batch.pointers.len());
        for (index, raw) in batch.pointers.iter().enumerate() {
            let id = match self.ids.get(&raw.slot) {
                Some(id) => *id,
                None => {
                    let id = self.allocate();
                    // An exit for a pointer never seen entering stays one-off.
                    let one_off =
                        batch.action == RawAction::HoverExit && index == batch.action_index;
                    if !one_off {
                        self.ids.insert(raw.slot, id);
                    }
                    id
                }
            };
            let down = !hovering
                && up_index != Some(index)
                && (!scrolling || !batch.buttons.is_empty());
            let scroll_delta = if scrolling {
                Vec2::new(raw.scroll.x, -raw.scroll.y)
            } else {
                Vec2::ZERO
            };
            pointers.push(PointerInputEventData {
                id,
                sample: PointerSample {
                    uptime: batch.event_time,
                    position: Some(positions.screen_to_local(raw.screen_position)),
                    down,
                    pointer_type: raw.tool,
                    buttons: batch.buttons,
                    modifiers: batch.modifiers,
                    scroll_delta,
                },
            });
        }

        if up_index.is_some()
            && let Some(slot) = batch.acting_slot()
        {
            self.ids.remove(&slot);
        }
        if self.ids.len() > batch.pointers.len() {
            self.ids
                .retain(|slot, _| batch.pointers.iter().any(|p| p.slot == *slot));
        }

        Some(PointerInputEvent {
            uptime: batch.event_time,
            event_type: batch.event_type(),
            pointers,
        })
    }

    fn clear_on_device_change(&mut self, batch: &RawBatch) {
        let [only] = batch.pointers.as_slice() else {
            return;
        };
        if self.previous_tool.is_some_and(|tool| tool != only.tool) {
            log::debug!("tool changed to {:?}, forgetting pointer slots", only.tool);
            self.ids.clear();
        }
        self.previous_tool = Some(only.tool);
    }
}
