// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small retained tree of placed boxes carrying consumers.
//!
//! [`LayoutTree`] is a ready-made [`SpatialTree`]: each node has an offset
//! relative to its parent, a size, a z-index, and a list of consumers.
//! Children are kept in paint order (z-index, then insertion order).
//!
//! It does not perform layout. Upstream code computes positions and sizes and
//! writes them here.
//!
//! Every node has a [`LayoutHandle`]: a shared view of whether the node is
//! still in the tree and where it currently sits in root space. Consumers
//! keep one to answer
//! [`PointerInputFilter::is_attached`](crate::filter::PointerInputFilter::is_attached)
//! and [`PointerInputFilter::placement`](crate::filter::PointerInputFilter::placement).
//! Moving or resizing a node updates the handles of the node and its
//! descendants; removing it detaches them.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use kurbo::{Rect, Size, Vec2};

use crate::filter::FilterRef;
use crate::walker::SpatialTree;

/// Identifier for a node in a [`LayoutTree`].
///
/// A slot index plus a generation counter. Removing a node makes its id stale;
/// reusing the slot bumps the generation, so stale ids never alias new nodes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayoutId(u32, u32);

impl LayoutId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Local placement of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LocalLayout {
    /// Offset of the node's origin in its parent's space.
    pub offset: Vec2,
    /// Size of the node's region.
    pub size: Size,
    /// Z-order among siblings. Higher is painted on top.
    pub z_index: i32,
}

impl LocalLayout {
    /// A placement at `offset` with `size` and z-index 0.
    pub fn new(offset: Vec2, size: Size) -> Self {
        Self {
            offset,
            size,
            z_index: 0,
        }
    }
}

#[derive(Debug, Default)]
struct LiveLayout {
    attached: Cell<bool>,
    origin: Cell<Vec2>,
    size: Cell<Size>,
}

/// Shared view of a layout node's current state.
///
/// Stays valid after the node is removed, reporting it as detached.
#[derive(Clone, Debug, Default)]
pub struct LayoutHandle(Rc<LiveLayout>);

impl LayoutHandle {
    /// A handle that is not attached to anything.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Whether the node is still in its tree.
    pub fn is_attached(&self) -> bool {
        self.0.attached.get()
    }

    /// Root-space region of the node as currently laid out.
    pub fn placement(&self) -> Rect {
        Rect::from_origin_size(self.0.origin.get().to_point(), self.0.size.get())
    }
}

struct Node {
    generation: u32,
    parent: Option<LayoutId>,
    children: Vec<LayoutId>,
    local: LocalLayout,
    filters: Vec<FilterRef>,
    handle: LayoutHandle,
}

/// Tree of placed boxes.
#[derive(Default)]
pub struct LayoutTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<LayoutId>,
}

impl core::fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("LayoutTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl LayoutTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent` (or as a root if `None`), topmost among
    /// siblings sharing its z-index.
    ///
    /// A stale `parent` inserts a root.
    pub fn insert(&mut self, parent: Option<LayoutId>, local: LocalLayout) -> LayoutId {
        let parent = parent.filter(|p| self.is_alive(*p));
        let parent_origin = parent.and_then(|p| self.origin(p)).unwrap_or_default();
        let node = |generation| Node {
            generation,
            parent,
            children: Vec::new(),
            local,
            filters: Vec::new(),
            handle: LayoutHandle(Rc::new(LiveLayout {
                attached: Cell::new(true),
                origin: Cell::new(parent_origin + local.offset),
                size: Cell::new(local.size),
            })),
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node(generation)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "LayoutId slots are 32-bit."
        )]
        let id = LayoutId(idx as u32, generation);
        self.siblings_mut(parent).push(id);
        self.sort_siblings(parent);
        id
    }

    /// Remove a node and its subtree, detaching their [`LayoutHandle`]s.
    pub fn remove(&mut self, id: LayoutId) {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return;
        };
        self.siblings_mut(parent).retain(|c| *c != id);
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: LayoutId) {
        let Some(node) = self
            .nodes
            .get_mut(id.idx())
            .and_then(|slot| slot.take_if(|n| n.generation == id.1))
        else {
            return;
        };
        node.handle.0.attached.set(false);
        self.free_list.push(id.idx());
        for child in node.children {
            self.free_subtree(child);
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: LayoutId) -> bool {
        self.node(id).is_some()
    }

    /// Attach a consumer to `id`, inside any consumers added before it.
    pub fn add_filter(&mut self, id: LayoutId, filter: FilterRef) {
        if let Some(n) = self.node_mut(id) {
            n.filters.push(filter);
        }
    }

    /// Live view of `id`. Detached if `id` is stale.
    pub fn handle(&self, id: LayoutId) -> LayoutHandle {
        self.node(id)
            .map_or_else(LayoutHandle::detached, |n| n.handle.clone())
    }

    /// Update the offset relative to the parent.
    pub fn set_offset(&mut self, id: LayoutId, offset: Vec2) {
        if let Some(n) = self.node_mut(id) {
            n.local.offset = offset;
            self.refresh_origins(id);
        }
    }

    /// Update the size.
    pub fn set_size(&mut self, id: LayoutId, size: Size) {
        if let Some(n) = self.node_mut(id) {
            n.local.size = size;
            n.handle.0.size.set(size);
        }
    }

    /// Update the z-index, reordering the node among its siblings.
    pub fn set_z_index(&mut self, id: LayoutId, z_index: i32) {
        let Some(n) = self.node_mut(id) else {
            return;
        };
        n.local.z_index = z_index;
        let parent = n.parent;
        self.sort_siblings(parent);
    }

    /// Local placement of a live node.
    pub fn local(&self, id: LayoutId) -> Option<LocalLayout> {
        self.node(id).map(|n| n.local)
    }

    /// Root-space origin of a live node.
    pub fn origin(&self, id: LayoutId) -> Option<Vec2> {
        self.node(id).map(|n| n.handle.0.origin.get())
    }

    // Handles cache root-space origins; recompute them below `id`.
    fn refresh_origins(&self, id: LayoutId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let parent_origin = node.parent.and_then(|p| self.origin(p)).unwrap_or_default();
        node.handle.0.origin.set(parent_origin + node.local.offset);
        for child in &node.children {
            self.refresh_origins(*child);
        }
    }

    fn node(&self, id: LayoutId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: LayoutId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn siblings_mut(&mut self, parent: Option<LayoutId>) -> &mut Vec<LayoutId> {
        let node = parent.and_then(|p| {
            self.nodes
                .get_mut(p.idx())?
                .as_mut()
                .filter(|n| n.generation == p.1)
        });
        match node {
            Some(n) => &mut n.children,
            None => &mut self.roots,
        }
    }

    // Stable, so equal z-indices keep insertion order.
    fn sort_siblings(&mut self, parent: Option<LayoutId>) {
        let mut siblings = core::mem::take(self.siblings_mut(parent));
        siblings.sort_by_key(|id| self.node(*id).map_or(0, |n| n.local.z_index));
        *self.siblings_mut(parent) = siblings;
    }
}

impl SpatialTree for LayoutTree {
    type Node = LayoutId;

    fn roots(&self) -> &[LayoutId] {
        &self.roots
    }

    fn children(&self, node: LayoutId) -> &[LayoutId] {
        self.node(node).map_or(&[], |n| &n.children)
    }

    fn offset(&self, node: LayoutId) -> Vec2 {
        self.node(node).map_or(Vec2::ZERO, |n| n.local.offset)
    }

    fn size(&self, node: LayoutId) -> Size {
        self.node(node).map_or(Size::ZERO, |n| n.local.size)
    }

    fn filters(&self, node: LayoutId) -> &[FilterRef] {
        self.node(node).map_or(&[], |n| &n.filters)
    }

    fn is_attached(&self, node: LayoutId) -> bool {
        self.is_alive(node)
    }
}
