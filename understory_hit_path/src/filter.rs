// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input consumers: the capability a hit path routes events to.
//!
//! Consumers are shared as [`FilterRef`] (`Rc<dyn PointerInputFilter>`) and
//! identified by pointer identity, so the same consumer reached through two
//! hit paths is one node in the tracker's forest. All methods take `&self`;
//! consumers that keep state use interior mutability, which lets them be
//! re-entered from nested dispatch (for example while they broadcast a custom
//! event).
//!
//! Positions handed to a consumer are relative to its own origin, taken from
//! [`PointerInputFilter::placement`] at the time of each invocation.

use alloc::rc::Rc;
use core::any::Any;
use kurbo::{Rect, Size};

use crate::tracker::CustomEventDispatcher;
use crate::types::{PointerEvent, PointerEventPass};

/// Something that receives pointer events routed through hit paths.
pub trait PointerInputFilter {
    /// Called once, the first time the consumer joins a tracker's forest.
    ///
    /// The handle stays valid for as long as the tracker lives.
    fn on_init(&self, _dispatcher: CustomEventDispatcher) {}

    /// Receive the changes routed through this consumer for one pass.
    ///
    /// Positions are in local space. `bounds` is the size of the consumer's
    /// region as recorded by the most recent hit test through it.
    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, bounds: Size);

    /// Receive a custom event broadcast by another consumer.
    fn on_custom_event(&self, _event: &dyn Any, _pass: PointerEventPass) {}

    /// All in-flight pointers routed through this consumer are cancelled.
    fn on_cancel(&self);

    /// Whether the consumer is still part of the UI.
    ///
    /// Detached consumers are skipped during dispatch and pruned before the
    /// next batch.
    fn is_attached(&self) -> bool {
        true
    }

    /// Current root-space region of the consumer.
    ///
    /// Asked before every invocation, so a consumer whose layout moves during
    /// a gesture keeps receiving positions relative to where it is now.
    /// `None` uses the region recorded by the last hit test through it.
    fn placement(&self) -> Option<Rect> {
        None
    }
}

/// Shared handle to a consumer.
pub type FilterRef = Rc<dyn PointerInputFilter>;

/// Whether two handles refer to the same consumer.
pub fn same_filter(a: &FilterRef, b: &FilterRef) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
