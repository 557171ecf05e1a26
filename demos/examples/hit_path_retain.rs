// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained hit paths and custom events.
//!
//! A button retains the press it receives so its release animation keeps
//! routing to it, broadcasts a `Clicked` event to the card around it when the
//! finger lifts, and releases the path once the animation ends. Afterwards the
//! card is removed from the layout and its consumers are pruned as detached.
//!
//! Run:
//! - `cargo run -p understory_examples --example hit_path_retain`

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use understory_hit_path::adapter::{RawAction, RawBatch, RawPointer, ScreenOffset};
use understory_hit_path::filter::PointerInputFilter;
use understory_hit_path::layout::{LayoutHandle, LayoutTree, LocalLayout};
use understory_hit_path::processor::EventProcessor;
use understory_hit_path::tracker::CustomEventDispatcher;
use understory_hit_path::types::{PointerEvent, PointerEventPass, PointerId, PointerType};

#[derive(Debug)]
struct Clicked(PointerId);

struct Button {
    layout: LayoutHandle,
    dispatcher: RefCell<Option<CustomEventDispatcher>>,
    held: Cell<Option<PointerId>>,
}

impl Button {
    fn finish_animation(&self) {
        let dispatcher = self.dispatcher.borrow();
        if let (Some(id), Some(dispatcher)) = (self.held.take(), dispatcher.as_ref()) {
            println!("  button releases {id:?}");
            dispatcher.release_hit_paths([id]);
        }
    }
}

impl PointerInputFilter for Button {
    fn on_init(&self, dispatcher: CustomEventDispatcher) {
        *self.dispatcher.borrow_mut() = Some(dispatcher);
    }

    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, _: Size) {
        if pass != PointerEventPass::Main {
            return;
        }
        let dispatcher = self.dispatcher.borrow();
        let Some(dispatcher) = dispatcher.as_ref() else {
            return;
        };
        for change in &mut event.changes {
            if change.changed_to_down() {
                change.consume_down_change();
                self.held.set(Some(change.id));
                println!("  button retains {:?}", change.id);
                dispatcher.retain_hit_paths([change.id]);
            } else if change.changed_to_up() {
                change.consume_down_change();
                dispatcher.dispatch_custom_event(&Clicked(change.id));
            }
        }
    }

    fn on_cancel(&self) {
        println!("  button cancel");
        self.held.set(None);
    }

    fn is_attached(&self) -> bool {
        self.layout.is_attached()
    }

    fn placement(&self) -> Option<Rect> {
        Some(self.layout.placement())
    }
}

struct Card {
    layout: LayoutHandle,
}

impl PointerInputFilter for Card {
    fn on_pointer_event(&self, event: &mut PointerEvent, pass: PointerEventPass, _: Size) {
        if pass == PointerEventPass::Main {
            println!("  card sees {:?}", event.event_type());
        }
    }

    fn on_custom_event(&self, event: &dyn Any, pass: PointerEventPass) {
        if let Some(clicked) = event.downcast_ref::<Clicked>() {
            println!("  card hears {clicked:?} in {pass:?}");
        }
    }

    fn on_cancel(&self) {
        println!("  card cancel");
    }

    fn is_attached(&self) -> bool {
        self.layout.is_attached()
    }

    fn placement(&self) -> Option<Rect> {
        Some(self.layout.placement())
    }
}

fn finger(x: f64, y: f64) -> Vec<RawPointer> {
    vec![RawPointer::new(0, PointerType::Touch, Point::new(x, y))]
}

fn main() {
    let tree = RefCell::new(LayoutTree::new());
    let (card_node, button) = {
        let mut tree = tree.borrow_mut();
        let card_node = tree.insert(
            None,
            LocalLayout::new(Vec2::new(20.0, 20.0), Size::new(160.0, 120.0)),
        );
        let button_node = tree.insert(
            Some(card_node),
            LocalLayout::new(Vec2::new(40.0, 80.0), Size::new(80.0, 30.0)),
        );
        let card = Rc::new(Card {
            layout: tree.handle(card_node),
        });
        let button = Rc::new(Button {
            layout: tree.handle(button_node),
            dispatcher: RefCell::new(None),
            held: Cell::new(None),
        });
        tree.add_filter(card_node, card);
        tree.add_filter(button_node, button.clone());
        (card_node, button)
    };

    let screen = ScreenOffset(Vec2::ZERO);
    let mut processor = EventProcessor::new();
    let pointer = PointerId(0);

    println!("== press ==");
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 0, finger(70.0, 110.0)),
        &screen,
        &tree,
    );

    println!("== lift ==");
    processor.process(
        &RawBatch::new(RawAction::Up, 0, 80, finger(70.0, 110.0)),
        &screen,
        &tree,
    );
    println!(
        "  path kept while retained: {}",
        processor.tracker().has_hit_path(pointer)
    );

    println!("== animation ends ==");
    button.finish_animation();
    println!(
        "  path kept after release: {}",
        processor.tracker().has_hit_path(pointer)
    );

    println!("== second press, then the card is removed ==");
    processor.process(
        &RawBatch::new(RawAction::Down, 0, 200, finger(70.0, 110.0)),
        &screen,
        &tree,
    );
    tree.borrow_mut().remove(card_node);
    let result = processor.process(
        &RawBatch::new(RawAction::Move, 0, 216, finger(75.0, 110.0)),
        &screen,
        &tree,
    );
    println!(
        "  dispatched={} tracker_empty={}",
        result.dispatched_to_anything,
        processor.tracker().is_empty()
    );
}
