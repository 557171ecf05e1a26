// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end processing over a shared layout tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use understory_hit_path::adapter::{RawAction, RawBatch, RawPointer, ScreenOffset};
use understory_hit_path::filter::PointerInputFilter;
use understory_hit_path::layout::{LayoutHandle, LayoutId, LayoutTree, LocalLayout};
use understory_hit_path::processor::EventProcessor;
use understory_hit_path::types::{PointerEvent, PointerEventPass, PointerId, PointerType};

type Log = Rc<RefCell<Vec<String>>>;
type Reaction = Box<dyn Fn(&mut PointerEvent, PointerEventPass)>;

/// Logs invocations as `"name Pass [ids]"` and answers attachment and
/// placement from its layout node.
struct Probe {
    name: &'static str,
    handle: LayoutHandle,
    log: Log,
    reaction: RefCell<Option<Reaction>>,
    last_position: Cell<Option<Point>>,
}

impl Probe {
    fn install(
        tree: &Rc<RefCell<LayoutTree>>,
        node: LayoutId,
        name: &'static str,
        log: &Log,
    ) -> Rc<Self> {
        let probe = Rc::new(Self {
            name,
            handle: tree.borrow().handle(node),
            log: Rc::clone(log),
            reaction: RefCell::new(None),
            last_position: Cell::new(None),
        });
        tree.borrow_mut().add_filter(node, probe.clone());
        probe
    }

    fn react(&self, reaction: impl Fn(&mut PointerEvent, PointerEventPass) + 'static) {
        *self.reaction.borrow_mut() = Some(Box::new(reaction));
    }
}

impl PointerInputFilter for Probe {
    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, _: Size) {
        let ids: Vec<u64> = event.changes.iter().map(|c| c.id.0).collect();
        if let Some(at) = event.changes.first().and_then(|c| c.current.position) {
            self.last_position.set(Some(at));
        }
        self.log
            .borrow_mut()
            .push(format!("{} {pass:?} {ids:?}", self.name));
        if let Some(reaction) = self.reaction.borrow().as_ref() {
            reaction(event, pass);
        }
    }

    fn on_cancel(&self) {
        self.log.borrow_mut().push(format!("{} cancel", self.name));
    }

    fn is_attached(&self) -> bool {
        self.handle.is_attached()
    }

    fn placement(&self) -> Option<Rect> {
        Some(self.handle.placement())
    }
}

fn place(tree: &Rc<RefCell<LayoutTree>>, parent: Option<LayoutId>, x: f64, w: f64) -> LayoutId {
    tree.borrow_mut().insert(
        parent,
        LocalLayout::new(Vec2::new(x, 0.0), Size::new(w, 100.0)),
    )
}

fn touch(slots: &[(u32, f64)]) -> Vec<RawPointer> {
    slots
        .iter()
        .map(|(slot, x)| RawPointer::new(*slot, PointerType::Touch, Point::new(*x, 50.0)))
        .collect()
}

fn drain(log: &Log) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

#[test]
fn consumer_removing_its_own_node_mid_dispatch() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let panel = place(&tree, None, 0.0, 100.0);
    let button = place(&tree, Some(panel), 10.0, 20.0);
    Probe::install(&tree, panel, "panel", &log);
    let probe = Probe::install(&tree, button, "button", &log);
    {
        let tree = Rc::clone(&tree);
        probe.react(move |_, pass| {
            if pass == PointerEventPass::Main {
                tree.borrow_mut().remove(button);
            }
        });
    }

    let mut processor = EventProcessor::new();
    let screen = ScreenOffset(Vec2::ZERO);
    let down = RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 15.0)]));
    assert!(processor.process(&down, &screen, &*tree).dispatched_to_anything);
    assert_eq!(
        drain(&log),
        [
            "panel Initial [0]",
            "button Initial [0]",
            "button Main [0]",
            "panel Main [0]",
            "panel Final [0]",
        ]
    );

    let moved = RawBatch::new(RawAction::Move, 0, 2, touch(&[(0, 16.0)]));
    assert!(processor.process(&moved, &screen, &*tree).dispatched_to_anything);
    assert_eq!(
        drain(&log),
        [
            "button cancel",
            "panel Initial [0]",
            "panel Main [0]",
            "panel Final [0]",
        ]
    );
}

#[test]
fn fingers_share_their_common_ancestor() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let row = place(&tree, None, 0.0, 100.0);
    let left = place(&tree, Some(row), 0.0, 50.0);
    let right = place(&tree, Some(row), 50.0, 50.0);
    Probe::install(&tree, row, "row", &log);
    Probe::install(&tree, left, "left", &log);
    Probe::install(&tree, right, "right", &log);

    let mut processor = EventProcessor::new();
    let screen = ScreenOffset(Vec2::ZERO);
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 10.0)])),
        &screen,
        &*tree,
    );
    drain(&log);
    processor.process(
        &RawBatch::new(RawAction::PointerDown, 1, 2, touch(&[(0, 10.0), (1, 60.0)])),
        &screen,
        &*tree,
    );
    assert_eq!(
        drain(&log),
        [
            "row Initial [0, 1]",
            "left Initial [0]",
            "left Main [0]",
            "right Initial [1]",
            "right Main [1]",
            "row Main [0, 1]",
            "row Final [0, 1]",
            "left Final [0]",
            "right Final [1]",
        ]
    );

    processor.process(
        &RawBatch::new(RawAction::PointerUp, 0, 3, touch(&[(0, 10.0), (1, 60.0)])),
        &screen,
        &*tree,
    );
    drain(&log);
    processor.process(
        &RawBatch::new(RawAction::Move, 0, 4, touch(&[(1, 61.0)])),
        &screen,
        &*tree,
    );
    assert_eq!(
        drain(&log),
        [
            "row Initial [1]",
            "right Initial [1]",
            "right Main [1]",
            "row Main [1]",
            "row Final [1]",
            "right Final [1]",
        ]
    );
}

#[test]
fn overlapping_siblings_only_topmost_receives() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let below = place(&tree, None, 0.0, 100.0);
    let above = place(&tree, None, 0.0, 100.0);
    Probe::install(&tree, below, "below", &log);
    Probe::install(&tree, above, "above", &log);

    let mut processor = EventProcessor::new();
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 10.0)])),
        &ScreenOffset(Vec2::ZERO),
        &*tree,
    );
    assert!(drain(&log).iter().all(|line| line.starts_with("above")));
}

#[test]
fn consumed_drag_is_reported() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let slider = place(&tree, None, 0.0, 100.0);
    let probe = Probe::install(&tree, slider, "slider", &log);
    probe.react(|event, pass| {
        if pass == PointerEventPass::Main {
            for change in &mut event.changes {
                let delta = change.position_change();
                change.consume_position_change(Vec2::new(delta.x, 0.0));
            }
        }
    });

    let mut processor = EventProcessor::new();
    let screen = ScreenOffset(Vec2::ZERO);
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 10.0)])),
        &screen,
        &*tree,
    );
    let result = processor.process(
        &RawBatch::new(RawAction::Move, 0, 2, touch(&[(0, 30.0)])),
        &screen,
        &*tree,
    );
    assert!(result.dispatched_to_anything);
    assert!(result.any_movement_consumed);
}

#[test]
fn node_moved_mid_gesture_keeps_local_positions() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let panel = place(&tree, None, 0.0, 300.0);
    let knob = place(&tree, Some(panel), 0.0, 20.0);
    let probe = Probe::install(&tree, knob, "knob", &log);

    let mut processor = EventProcessor::new();
    let screen = ScreenOffset(Vec2::ZERO);
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 5.0)])),
        &screen,
        &*tree,
    );
    assert_eq!(probe.last_position.get(), Some(Point::new(5.0, 50.0)));

    // Moving the panel moves the knob with it.
    tree.borrow_mut().set_offset(panel, Vec2::new(100.0, 0.0));
    processor.process(
        &RawBatch::new(RawAction::Move, 0, 2, touch(&[(0, 105.0)])),
        &screen,
        &*tree,
    );
    assert_eq!(probe.last_position.get(), Some(Point::new(5.0, 50.0)));
    assert_eq!(
        drain(&log),
        [
            "knob Initial [0]",
            "knob Main [0]",
            "knob Final [0]",
            "knob Initial [0]",
            "knob Main [0]",
            "knob Final [0]",
        ]
    );
}

#[test]
fn finger_missing_from_later_batches_is_dropped() {
    let tree = Rc::new(RefCell::new(LayoutTree::new()));
    let log = Log::default();
    let surface = place(&tree, None, 0.0, 100.0);
    Probe::install(&tree, surface, "surface", &log);

    let mut processor = EventProcessor::new();
    let screen = ScreenOffset(Vec2::ZERO);
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 1, touch(&[(0, 10.0)])),
        &screen,
        &*tree,
    );
    processor.process(
        &RawBatch::new(RawAction::PointerDown, 1, 2, touch(&[(0, 10.0), (1, 60.0)])),
        &screen,
        &*tree,
    );
    drain(&log);
    processor.process(
        &RawBatch::new(RawAction::Move, 0, 3, touch(&[(1, 61.0)])),
        &screen,
        &*tree,
    );
    assert!(!processor.tracker().has_hit_path(PointerId(0)));
    assert_eq!(
        drain(&log),
        ["surface Initial [1]", "surface Main [1]", "surface Final [1]"]
    );
    processor.process(
        &RawBatch::new(RawAction::Up, 0, 4, touch(&[(1, 61.0)])),
        &screen,
        &*tree,
    );
    assert!(!processor.tracker().has_hit_path(PointerId(0)));
    assert!(processor.tracker().is_empty());
}
