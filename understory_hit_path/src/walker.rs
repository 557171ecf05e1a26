// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing: turn a position into an outermost-first chain of consumers.
//!
//! The walker reads any [`SpatialTree`] and produces the [`HitTarget`] chain
//! that [`HitPathTracker::add_hit_path`](crate::tracker::HitPathTracker::add_hit_path)
//! expects.
//!
//! ## Rules
//!
//! - Siblings are tested topmost first (reverse paint order). The first sibling
//!   whose subtree contributes at least one consumer wins; later siblings are
//!   not tested. Overlapping siblings never both receive the pointer.
//! - A node contributes its own consumers when its region `[0, w) × [0, h)`
//!   contains the point in local space. Descendants are tested regardless, so a
//!   child extending past its parent can still be hit.
//! - Regions with zero area never contain anything. Non-finite positions hit
//!   nothing. Detached nodes are skipped along with their subtrees.
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Point, Size, Vec2};
//! use understory_hit_path::filter::PointerInputFilter;
//! use understory_hit_path::layout::{LayoutTree, LocalLayout};
//! use understory_hit_path::types::{PointerEvent, PointerEventPass};
//! use understory_hit_path::walker::HitTestWalker;
//!
//! struct Nop;
//! impl PointerInputFilter for Nop {
//!     fn on_pointer_event(&self, _: &mut PointerEvent, _: PointerEventPass, _: Size) {}
//!     fn on_cancel(&self) {}
//! }
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.insert(None, LocalLayout::new(Vec2::ZERO, Size::new(100.0, 100.0)));
//! let button = tree.insert(Some(root), LocalLayout::new(Vec2::new(10.0, 10.0), Size::new(20.0, 20.0)));
//! tree.add_filter(root, Rc::new(Nop));
//! tree.add_filter(button, Rc::new(Nop));
//!
//! let chain = HitTestWalker::new(&tree).hit_test(Point::new(15.0, 15.0));
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain[1].origin, Vec2::new(10.0, 10.0));
//! assert!(HitTestWalker::new(&tree).hit_test(Point::new(f64::NAN, 1.0)).is_empty());
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use kurbo::{Point, Size, Vec2};

use crate::filter::FilterRef;

/// Read access to a spatial hierarchy of consumers.
pub trait SpatialTree {
    /// Node handle.
    type Node: Copy;

    /// Top-level nodes in paint order, bottom first.
    fn roots(&self) -> &[Self::Node];

    /// Children of `node` in paint order, bottom first.
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// Offset of `node`'s origin in its parent's space.
    fn offset(&self, node: Self::Node) -> Vec2;

    /// Size of `node`'s region, anchored at its origin.
    fn size(&self, node: Self::Node) -> Size;

    /// Consumers attached to `node`, outermost first.
    fn filters(&self, node: Self::Node) -> &[FilterRef];

    /// Whether `node` is still placed in the tree.
    fn is_attached(&self, node: Self::Node) -> bool;
}

/// One element of a hit chain.
#[derive(Clone)]
pub struct HitTarget {
    /// The consumer.
    pub filter: FilterRef,
    /// Origin of the consumer's node in root space.
    pub origin: Vec2,
    /// Size of the consumer's node.
    pub size: Size,
}

impl core::fmt::Debug for HitTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HitTarget")
            .field("filter", &Rc::as_ptr(&self.filter).cast::<()>())
            .field("origin", &self.origin)
            .field("size", &self.size)
            .finish()
    }
}

impl HitTarget {
    /// A target at the root origin with an empty size.
    pub fn new(filter: FilterRef) -> Self {
        Self {
            filter,
            origin: Vec2::ZERO,
            size: Size::ZERO,
        }
    }

    /// Replace the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Replace the size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

impl From<FilterRef> for HitTarget {
    fn from(filter: FilterRef) -> Self {
        Self::new(filter)
    }
}

impl From<&FilterRef> for HitTarget {
    fn from(filter: &FilterRef) -> Self {
        Self::new(Rc::clone(filter))
    }
}

/// Anything that can resolve a root-space position to a hit chain.
pub trait HitTester {
    /// Consumers under `position`, outermost first.
    fn hit_test(&self, position: Point) -> Vec<HitTarget>;
}

/// Depth-first hit tester over a [`SpatialTree`].
pub struct HitTestWalker<'a, T: SpatialTree + ?Sized> {
    tree: &'a T,
}

impl<T: SpatialTree + ?Sized> core::fmt::Debug for HitTestWalker<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HitTestWalker").finish_non_exhaustive()
    }
}

impl<'a, T: SpatialTree + ?Sized> HitTestWalker<'a, T> {
    /// Walk `tree`.
    pub fn new(tree: &'a T) -> Self {
        Self { tree }
    }

    /// Consumers under `position`, outermost first.
    pub fn hit_test(&self, position: Point) -> Vec<HitTarget> {
        let mut out = Vec::new();
        if position.x.is_finite() && position.y.is_finite() {
            self.hit_siblings(self.tree.roots(), position, Vec2::ZERO, &mut out);
        }
        out
    }

    fn hit_siblings(
        &self,
        siblings: &[T::Node],
        position: Point,
        parent_origin: Vec2,
        out: &mut Vec<HitTarget>,
    ) -> bool {
        siblings
            .iter()
            .rev()
            .any(|node| self.hit_node(*node, position, parent_origin, out))
    }

    /// Returns whether the subtree contributed anything.
    fn hit_node(
        &self,
        node: T::Node,
        position: Point,
        parent_origin: Vec2,
        out: &mut Vec<HitTarget>,
    ) -> bool {
        if !self.tree.is_attached(node) {
            return false;
        }
        let mark = out.len();
        let origin = parent_origin + self.tree.offset(node);
        let size = self.tree.size(node);
        if contains(size, position - origin) {
            out.extend(self.tree.filters(node).iter().map(|filter| HitTarget {
                filter: Rc::clone(filter),
                origin,
                size,
            }));
        }
        self.hit_siblings(self.tree.children(node), position, origin, out);
        out.len() > mark
    }
}

fn contains(size: Size, local: Point) -> bool {
    size.width > 0.0
        && size.height > 0.0
        && local.x >= 0.0
        && local.y >= 0.0
        && local.x < size.width
        && local.y < size.height
}

impl<T: SpatialTree + ?Sized> HitTester for HitTestWalker<'_, T> {
    fn hit_test(&self, position: Point) -> Vec<HitTarget> {
        Self::hit_test(self, position)
    }
}

/// Borrows the tree only for the duration of the hit test, leaving consumers
/// free to mutate it while events are dispatched.
impl<T: SpatialTree> HitTester for RefCell<T> {
    fn hit_test(&self, position: Point) -> Vec<HitTarget> {
        HitTestWalker::new(&*self.borrow()).hit_test(position)
    }
}
