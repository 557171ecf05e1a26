// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording consumer shared by the unit tests.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use kurbo::{Point, Rect, Size};

use crate::filter::PointerInputFilter;
use crate::layout::LayoutHandle;
use crate::tracker::CustomEventDispatcher;
use crate::types::{
    PointerEvent, PointerEventPass, PointerEventType, PointerId, PointerInputChange, PointerSample,
};
use crate::walker::HitTarget;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Init(&'static str),
    Event(
        &'static str,
        PointerEventPass,
        PointerEventType,
        Vec<PointerInputChange>,
    ),
    Custom(&'static str, PointerEventPass, Option<u32>),
    Cancel(&'static str),
}

pub(crate) type Log = Rc<RefCell<Vec<Call>>>;

type Hook = Box<dyn Fn(&Recorder, &mut PointerEvent, PointerEventPass)>;

pub(crate) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Logs every callback, then runs an optional hook on pointer events.
pub(crate) struct Recorder {
    pub(crate) name: &'static str,
    log: Log,
    attached: Cell<bool>,
    dispatcher: RefCell<Option<CustomEventDispatcher>>,
    hook: RefCell<Option<Hook>>,
    pub(crate) last_bounds: Cell<Size>,
    placement: Cell<Option<Rect>>,
    follows: RefCell<Option<LayoutHandle>>,
}

impl Recorder {
    pub(crate) fn new(name: &'static str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            name,
            log: Rc::clone(log),
            attached: Cell::new(true),
            dispatcher: RefCell::new(None),
            hook: RefCell::new(None),
            last_bounds: Cell::new(Size::ZERO),
            placement: Cell::new(None),
            follows: RefCell::new(None),
        })
    }

    pub(crate) fn detach(&self) {
        self.attached.set(false);
    }

    /// Report `rect` as the current region from now on.
    pub(crate) fn place(&self, rect: Rect) {
        self.placement.set(Some(rect));
    }

    /// Report wherever `handle`'s node currently is.
    pub(crate) fn follow(&self, handle: LayoutHandle) {
        *self.follows.borrow_mut() = Some(handle);
    }

    pub(crate) fn set_hook(
        &self,
        hook: impl Fn(&Self, &mut PointerEvent, PointerEventPass) + 'static,
    ) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn dispatcher(&self) -> Option<CustomEventDispatcher> {
        self.dispatcher.borrow().clone()
    }
}

impl PointerInputFilter for Recorder {
    fn on_init(&self, dispatcher: CustomEventDispatcher) {
        self.log.borrow_mut().push(Call::Init(self.name));
        *self.dispatcher.borrow_mut() = Some(dispatcher);
    }

    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, bounds: Size) {
        self.last_bounds.set(bounds);
        self.log.borrow_mut().push(Call::Event(
            self.name,
            pass,
            event.event_type(),
            event.changes.clone(),
        ));
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook(self, event, pass);
        }
    }

    fn on_custom_event(&self, event: &dyn Any, pass: PointerEventPass) {
        self.log.borrow_mut().push(Call::Custom(
            self.name,
            pass,
            event.downcast_ref::<u32>().copied(),
        ));
    }

    fn on_cancel(&self) {
        self.log.borrow_mut().push(Call::Cancel(self.name));
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn placement(&self) -> Option<Rect> {
        match self.follows.borrow().as_ref() {
            Some(handle) => Some(handle.placement()),
            None => self.placement.get(),
        }
    }
}

/// Pointer-event invocations only, as `(name, pass)`.
pub(crate) fn passes(log: &Log) -> Vec<(&'static str, PointerEventPass)> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Event(name, pass, _, _) => Some((*name, *pass)),
            _ => None,
        })
        .collect()
}

/// Pointer-event invocations as `(name, pass, type)`.
pub(crate) fn typed_passes(log: &Log) -> Vec<(&'static str, PointerEventPass, PointerEventType)> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Event(name, pass, kind, _) => Some((*name, *pass, *kind)),
            _ => None,
        })
        .collect()
}

pub(crate) fn target(recorder: &Rc<Recorder>) -> HitTarget {
    HitTarget::new(Rc::<Recorder>::clone(recorder))
}

/// A hovering change for `id` at `to`, previously hovering at `from` if given.
pub(crate) fn hover(id: u64, from: Option<Point>, to: Point) -> PointerInputChange {
    PointerInputChange::new(
        PointerId(id),
        PointerSample::new(1, to, false),
        from.map(|p| PointerSample::new(0, p, false)),
    )
}

/// A change for `id` at `to`, previously pressed at `from` if given.
pub(crate) fn change(id: u64, from: Option<Point>, to: Point, down: bool) -> PointerInputChange {
    PointerInputChange::new(
        PointerId(id),
        PointerSample::new(1, to, down),
        from.map(|p| PointerSample::new(0, p, true)),
    )
}
