// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: pointer identities, samples, changes, passes, and results.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use kurbo::{Point, Vec2};

/// Logical identity of one continuous pointer lifecycle.
///
/// Ids are handed out by [`PointerIdentityAdapter`](crate::adapter::PointerIdentityAdapter)
/// in increasing order and are never reused by the same adapter instance.
/// A finger that lifts and lands again, even on the same platform slot, gets a new id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PointerId(pub u64);

/// Kind of device producing a pointer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointerType {
    /// The platform did not say.
    #[default]
    Unknown,
    /// A finger on a touch surface.
    Touch,
    /// A mouse or trackpad cursor.
    Mouse,
    /// The tip of a stylus.
    Stylus,
    /// The eraser end of a stylus.
    Eraser,
}

bitflags::bitflags! {
    /// Buttons held while a sample was taken.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PointerButtons: u8 {
        /// Left mouse button, or stylus contact.
        const PRIMARY   = 0b0000_0001;
        /// Right mouse button, or stylus barrel button.
        const SECONDARY = 0b0000_0010;
        /// Middle mouse button.
        const TERTIARY  = 0b0000_0100;
        /// Browser back.
        const BACK      = 0b0000_1000;
        /// Browser forward.
        const FORWARD   = 0b0001_0000;
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers active while a sample was taken.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either shift key.
        const SHIFT     = 0b0000_0001;
        /// Either control key.
        const CONTROL   = 0b0000_0010;
        /// Either alt (option) key.
        const ALT       = 0b0000_0100;
        /// The "windows" key on PC, "command" on Mac.
        const META      = 0b0000_1000;
        /// Caps lock is on.
        const CAPS_LOCK = 0b0001_0000;
        /// Num lock is on.
        const NUM_LOCK  = 0b0010_0000;
    }
}

/// Immutable data for one logical pointer in one batch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerSample {
    /// Timestamp in milliseconds.
    pub uptime: u64,
    /// Position in the coordinate space of the receiver.
    ///
    /// Root space in batches, local space when handed to a consumer.
    /// `None` when the platform did not report a location.
    pub position: Option<Point>,
    /// Whether the pointer is pressed.
    pub down: bool,
    /// Device kind.
    pub pointer_type: PointerType,
    /// Buttons held.
    pub buttons: PointerButtons,
    /// Keyboard modifiers held.
    pub modifiers: Modifiers,
    /// Scroll amount carried by this sample. Positive `y` scrolls content down.
    pub scroll_delta: Vec2,
}

impl PointerSample {
    /// Create a sample at `position` with no buttons and no scroll.
    pub fn new(uptime: u64, position: Point, down: bool) -> Self {
        Self {
            uptime,
            position: Some(position),
            down,
            pointer_type: PointerType::Touch,
            buttons: PointerButtons::empty(),
            modifiers: Modifiers::empty(),
            scroll_delta: Vec2::ZERO,
        }
    }

    /// Replace the device kind.
    #[must_use]
    pub fn with_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    /// Replace the held buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Replace the keyboard modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the scroll delta.
    #[must_use]
    pub fn with_scroll_delta(mut self, scroll_delta: Vec2) -> Self {
        self.scroll_delta = scroll_delta;
        self
    }

    fn translated(mut self, origin: Vec2) -> Self {
        self.position = self.position.map(|p| p - origin);
        self
    }
}

/// One pointer in a [`PointerInputEvent`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerInputEventData {
    /// Logical identity.
    pub id: PointerId,
    /// Data for this batch.
    pub sample: PointerSample,
}

/// A batch of logical pointer samples, as produced by the adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInputEvent {
    /// Timestamp of the batch in milliseconds.
    pub uptime: u64,
    /// What the platform reported for the batch as a whole.
    ///
    /// Only [`PointerEventType::Exit`] changes processing: hovering pointers
    /// are not hit-tested again, so their paths see the exit.
    pub event_type: PointerEventType,
    /// One entry per pointer, in platform order.
    pub pointers: Vec<PointerInputEventData>,
}

/// How much of a [`PointerInputChange`] has been claimed by consumers.
///
/// Consumption only ever grows during a batch.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ConsumedData {
    /// Sum of the positional deltas consumers have claimed.
    pub position_change: Vec2,
    /// Whether the press/release transition has been claimed.
    pub down_change: bool,
}

/// The change of one pointer between the previous batch and the current one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerInputChange {
    /// Logical identity.
    pub id: PointerId,
    /// Data for this batch.
    pub current: PointerSample,
    /// Data from the previous batch, absent on first appearance.
    pub previous: Option<PointerSample>,
    consumed: ConsumedData,
}

impl PointerInputChange {
    /// Create an unconsumed change.
    pub fn new(id: PointerId, current: PointerSample, previous: Option<PointerSample>) -> Self {
        Self {
            id,
            current,
            previous,
            consumed: ConsumedData::default(),
        }
    }

    /// Consumption recorded so far.
    pub fn consumed(&self) -> ConsumedData {
        self.consumed
    }

    fn previous_down(&self) -> bool {
        self.previous.is_some_and(|p| p.down)
    }

    /// True if the pointer is not pressed and was not pressed before this batch.
    pub fn is_hovering(&self) -> bool {
        !self.previous_down() && !self.current.down
    }

    /// True if the pointer went down in this batch and nobody claimed it.
    pub fn changed_to_down(&self) -> bool {
        !self.consumed.down_change && self.changed_to_down_ignore_consumed()
    }

    /// True if the pointer went down in this batch.
    pub fn changed_to_down_ignore_consumed(&self) -> bool {
        !self.previous_down() && self.current.down
    }

    /// True if the pointer went up in this batch and nobody claimed it.
    pub fn changed_to_up(&self) -> bool {
        !self.consumed.down_change && self.changed_to_up_ignore_consumed()
    }

    /// True if the pointer went up in this batch.
    pub fn changed_to_up_ignore_consumed(&self) -> bool {
        self.previous_down() && !self.current.down
    }

    /// Movement since the previous batch, before any consumption.
    ///
    /// Zero if either sample lacks a position.
    pub fn position_change_ignore_consumed(&self) -> Vec2 {
        match (self.previous.and_then(|p| p.position), self.current.position) {
            (Some(previous), Some(current)) => current - previous,
            _ => Vec2::ZERO,
        }
    }

    /// Movement still unclaimed by consumers.
    pub fn position_change(&self) -> Vec2 {
        self.position_change_ignore_consumed() - self.consumed.position_change
    }

    /// True if some movement is still unclaimed.
    pub fn position_changed(&self) -> bool {
        self.position_change() != Vec2::ZERO
    }

    /// True if any consumer claimed part of this change.
    pub fn any_change_consumed(&self) -> bool {
        self.consumed.down_change || self.consumed.position_change != Vec2::ZERO
    }

    /// Claim `delta` of the movement. Claims from successive consumers add up.
    pub fn consume_position_change(&mut self, delta: Vec2) {
        self.consumed.position_change += delta;
    }

    /// Claim the press/release transition.
    pub fn consume_down_change(&mut self) {
        self.consumed.down_change = true;
    }

    /// Claim the remaining movement and the press/release transition.
    pub fn consume_all_changes(&mut self) {
        let residual = self.position_change();
        self.consume_position_change(residual);
        self.consume_down_change();
    }

    /// A copy whose positions are relative to `origin`, consumption included.
    pub(crate) fn localized(&self, origin: Vec2) -> Self {
        Self {
            id: self.id,
            current: self.current.translated(origin),
            previous: self.previous.map(|p| p.translated(origin)),
            consumed: self.consumed,
        }
    }

    /// Take over consumption recorded on a copy handed to a consumer.
    ///
    /// Positions are left alone; only the claims flow back.
    pub(crate) fn adopt_consumption(&mut self, from: &Self) {
        debug_assert_eq!(self.id, from.id, "consumption merged across pointers");
        self.consumed.position_change = from.consumed.position_change;
        self.consumed.down_change |= from.consumed.down_change;
    }
}

/// Changes of one batch keyed by pointer, in root coordinates.
pub type ChangeBatch = BTreeMap<PointerId, PointerInputChange>;

/// Coarse classification of a [`PointerEvent`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerEventType {
    /// No changes.
    Unknown,
    /// At least one pointer went down.
    Press,
    /// At least one pointer went up.
    Release,
    /// A wheel or trackpad scroll.
    Scroll,
    /// Anything else: movement or a stationary update.
    Move,
    /// A hovering pointer arrived over the consumer.
    Enter,
    /// A hovering pointer left the consumer, or stopped hovering.
    Exit,
}

/// The changes one consumer receives in one pass.
///
/// Positions are in the consumer's local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Changes routed through the consumer, ordered by pointer id.
    pub changes: Vec<PointerInputChange>,
    hover: Option<PointerEventType>,
}

impl PointerEvent {
    /// Wrap a list of changes.
    pub fn new(changes: Vec<PointerInputChange>) -> Self {
        Self {
            changes,
            hover: None,
        }
    }

    /// Mark the event as a hover transition for the receiving consumer.
    pub(crate) fn with_hover(mut self, hover: Option<PointerEventType>) -> Self {
        self.hover = hover;
        self
    }

    /// Keyboard modifiers held by any of the pointers.
    pub fn modifiers(&self) -> Modifiers {
        self.changes
            .iter()
            .fold(Modifiers::empty(), |m, c| m | c.current.modifiers)
    }

    /// Look up the change for `id`.
    pub fn change(&self, id: PointerId) -> Option<&PointerInputChange> {
        self.changes.iter().find(|c| c.id == id)
    }

    /// Look up the change for `id` mutably, typically to consume it.
    pub fn change_mut(&mut self, id: PointerId) -> Option<&mut PointerInputChange> {
        self.changes.iter_mut().find(|c| c.id == id)
    }

    /// Classify the event.
    ///
    /// [`Enter`](PointerEventType::Enter) and [`Exit`](PointerEventType::Exit)
    /// are decided by the tracker per consumer. Otherwise press wins over
    /// release, which wins over scroll.
    pub fn event_type(&self) -> PointerEventType {
        if let Some(hover) = self.hover {
            hover
        } else if self.changes.is_empty() {
            PointerEventType::Unknown
        } else if self
            .changes
            .iter()
            .any(PointerInputChange::changed_to_down_ignore_consumed)
        {
            PointerEventType::Press
        } else if self
            .changes
            .iter()
            .any(PointerInputChange::changed_to_up_ignore_consumed)
        {
            PointerEventType::Release
        } else if self
            .changes
            .iter()
            .any(|c| c.current.scroll_delta != Vec2::ZERO)
        {
            PointerEventType::Scroll
        } else {
            PointerEventType::Move
        }
    }
}

/// Dispatch pass, in the order they run.
///
/// Initial runs from the outermost consumer inwards, Main from the innermost
/// outwards, and Final from the outermost inwards again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerEventPass {
    /// Ancestors see the event before descendants.
    Initial,
    /// Descendants react first; the usual place to consume.
    Main,
    /// Ancestors observe what descendants consumed.
    Final,
}

/// Outcome of processing one batch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ProcessResult {
    /// At least one consumer received the batch.
    pub dispatched_to_anything: bool,
    /// At least one pointer's movement was partly or fully consumed.
    pub any_movement_consumed: bool,
}
