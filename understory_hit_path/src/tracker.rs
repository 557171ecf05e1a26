// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-path forest: which consumers each pointer is routed through.
//!
//! The [`HitPathTracker`] stores one node per consumer reachable along a
//! hit path. Paths that share a prefix share nodes, so a batch touching two
//! pointers under the same ancestor invokes that ancestor once with both
//! changes and splits where the paths diverge.
//!
//! ## Dispatch order
//!
//! For each top-level node, in insertion order:
//!
//! 1) Initial at the node, then each child subtree (recursively), then Main at the node.
//! 2) After every top-level subtree finished Main, Final at the node, then each child subtree.
//!
//! A parent `P` with children `C1` (pointer 3) and `C2` (pointer 5) therefore sees:
//! `Initial P`, `Initial C1`, `Main C1`, `Initial C2`, `Main C2`, `Main P`,
//! `Final P`, `Final C1`, `Final C2`.
//!
//! Before every invocation the consumer is asked whether it is still attached;
//! a detached consumer is skipped along with its subtree.
//!
//! Positions are localized against the consumer's
//! [`placement`](PointerInputFilter::placement) at the time of each
//! invocation, falling back to the region recorded when it was hit.
//!
//! ## Stale pointers
//!
//! Every batch describes all pointers the platform still reports. Ids tracked
//! by the forest but missing from a batch are removed before dispatch, going
//! through retention like any other removal.
//!
//! ## Hover
//!
//! Hovering pointers are hit-tested again on every batch. Nodes on the new
//! path are marked as hit; for consumers that only see hovering pointers:
//!
//! - a node hit now but not last time receives [`Enter`](PointerEventType::Enter);
//! - a node hit last time but not now receives [`Exit`](PointerEventType::Exit)
//!   and loses those pointers once the batch is dispatched;
//! - a batch where no hovering pointer moved and nothing entered or exited is
//!   not dispatched at all.
//!
//! ## Re-entrancy
//!
//! The forest sits behind `Rc<RefCell<_>>` shared with every
//! [`CustomEventDispatcher`]. No borrow is held while consumer code runs and
//! traversals walk snapshots of child keys, re-resolving each key through the
//! arena. Consumers may therefore retain, release, or broadcast from any
//! callback, and may detach themselves or others.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use kurbo::{Point, Size, Vec2};

use crate::filter::{FilterRef, PointerInputFilter, same_filter};
use crate::types::{
    ChangeBatch, PointerEvent, PointerEventPass, PointerEventType, PointerId, PointerInputChange,
};
use crate::walker::HitTarget;

/// Generational handle of a node in the forest.
///
/// Keys go stale when their node is pruned; a stale key never aliases a
/// newer node reusing the slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKey(u32, u32);

impl NodeKey {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

struct DispatchNode {
    generation: u32,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    filter: FilterRef,
    pointer_ids: BTreeSet<PointerId>,
    origin: Vec2,
    bounds: Size,
    // Hit by the latest hit test, and whether it was at the previous dispatch.
    is_in: bool,
    was_in: bool,
    // Root-space hover positions last delivered.
    hover_positions: Vec<(PointerId, Option<Point>)>,
    // Enter or Exit for the batch being dispatched.
    hover: Option<PointerEventType>,
}

#[derive(Default)]
struct Forest {
    nodes: Vec<Option<DispatchNode>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<NodeKey>,
    retained: BTreeSet<PointerId>,
    deferred: BTreeSet<PointerId>,
    // Keyed by allocation address; the weak keeps the address from being reused.
    initialized: BTreeMap<usize, Weak<dyn PointerInputFilter>>,
}

impl Forest {
    fn node(&self, key: NodeKey) -> Option<&DispatchNode> {
        self.nodes
            .get(key.idx())?
            .as_ref()
            .filter(|n| n.generation == key.1)
    }

    fn node_mut(&mut self, key: NodeKey) -> Option<&mut DispatchNode> {
        self.nodes
            .get_mut(key.idx())?
            .as_mut()
            .filter(|n| n.generation == key.1)
    }

    fn children_of(&self, parent: Option<NodeKey>) -> &[NodeKey] {
        match parent {
            None => &self.roots,
            Some(key) => self.node(key).map_or(&[], |n| &n.children),
        }
    }

    fn insert(&mut self, parent: Option<NodeKey>, target: &HitTarget, id: PointerId) -> NodeKey {
        let node = |generation| DispatchNode {
            generation,
            parent,
            children: Vec::new(),
            filter: Rc::clone(&target.filter),
            pointer_ids: BTreeSet::from([id]),
            origin: target.origin,
            bounds: target.size,
            is_in: true,
            was_in: false,
            hover_positions: Vec::new(),
            hover: None,
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
            reason = "NodeKey slots are 32-bit."
        )]
        let key = NodeKey(idx as u32, generation);
        match parent.and_then(|p| self.node_mut(p)) {
            Some(p) => p.children.push(key),
            None => self.roots.push(key),
        }
        key
    }

    /// Record `filter` as initialized. Returns true the first time.
    fn mark_initialized(&mut self, filter: &FilterRef) -> bool {
        let addr = Rc::as_ptr(filter).cast::<()>().addr();
        if self.initialized.contains_key(&addr) {
            return false;
        }
        self.initialized.retain(|_, weak| weak.strong_count() > 0);
        self.initialized.insert(addr, Rc::downgrade(filter));
        true
    }

    fn unlink(&mut self, key: NodeKey) {
        let parent = self.node(key).and_then(|n| n.parent);
        match parent.and_then(|p| self.node_mut(p)) {
            Some(p) => p.children.retain(|c| *c != key),
            None => self.roots.retain(|c| *c != key),
        }
    }

    /// Free `key` and its descendants. The caller unlinks `key` first.
    fn free_subtree(&mut self, key: NodeKey) -> usize {
        let Some(node) = self.nodes.get_mut(key.idx()) else {
            return 0;
        };
        let Some(node) = node.take_if(|n| n.generation == key.1) else {
            return 0;
        };
        self.free_list.push(key.idx());
        1 + node
            .children
            .iter()
            .map(|c| self.free_subtree(*c))
            .sum::<usize>()
    }

    fn keys_preorder(&self) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            order.push(key);
            if let Some(node) = self.node(key) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Drop empty childless nodes, cascading towards the root.
    fn prune(&mut self) -> usize {
        let mut pruned = 0;
        // Reverse pre-order visits every node after all of its descendants.
        for key in self.keys_preorder().into_iter().rev() {
            let empty = self
                .node(key)
                .is_some_and(|n| n.pointer_ids.is_empty() && n.children.is_empty());
            if empty {
                self.unlink(key);
                pruned += self.free_subtree(key);
            }
        }
        pruned
    }

    fn remove_hit_path(&mut self, id: PointerId) {
        if self.retained.contains(&id) {
            log::debug!("removal of {id:?} deferred while retained");
            self.deferred.insert(id);
            return;
        }
        let mut touched = false;
        for node in self.nodes.iter_mut().flatten() {
            touched |= node.pointer_ids.remove(&id);
        }
        if touched {
            let pruned = self.prune();
            log::debug!("removed hit path {id:?}, pruned {pruned} nodes");
        }
    }

    /// Ids routed through any node.
    fn tracked_ids(&self) -> BTreeSet<PointerId> {
        self.roots
            .iter()
            .filter_map(|k| self.node(*k))
            .flat_map(|n| n.pointer_ids.iter().copied())
            .collect()
    }

    /// Decide each node's hover transition for `batch`.
    ///
    /// Returns false when no consumer would see anything new: every routed
    /// pointer is hovering, none moved or scrolled, and nothing entered or
    /// exited.
    fn prepare_hover(&mut self, batch: &ChangeBatch) -> bool {
        let mut changed = false;
        for node in self.nodes.iter_mut().flatten() {
            node.hover = None;
            let relevant: Vec<&PointerInputChange> = node
                .pointer_ids
                .iter()
                .filter_map(|id| batch.get(id))
                .collect();
            if relevant.is_empty() {
                continue;
            }
            if !relevant.iter().all(|c| c.is_hovering()) {
                changed = true;
                continue;
            }
            let positions: Vec<(PointerId, Option<Point>)> = relevant
                .iter()
                .map(|c| (c.id, c.current.position))
                .collect();
            let moved = positions != node.hover_positions;
            node.hover_positions = positions;
            let scrolled = relevant.iter().any(|c| c.current.scroll_delta != Vec2::ZERO);
            if node.is_in != node.was_in && !scrolled {
                node.hover = Some(if node.is_in {
                    PointerEventType::Enter
                } else {
                    PointerEventType::Exit
                });
                changed = true;
            } else {
                changed |= moved || scrolled;
            }
        }
        changed
    }

    /// Drop hovering pointers from the nodes they were not hit on, then reset
    /// the hit marks for the next batch. Retained pointers stay.
    fn settle_hover(&mut self, batch: &ChangeBatch) {
        let retained = &self.retained;
        let mut left = false;
        for node in self.nodes.iter_mut().flatten() {
            if !node.is_in {
                let before = node.pointer_ids.len();
                node.pointer_ids.retain(|id| {
                    retained.contains(id)
                        || !batch.get(id).is_some_and(PointerInputChange::is_hovering)
                });
                left |= node.pointer_ids.len() != before;
            }
            node.was_in = node.is_in;
            node.is_in = false;
            node.hover = None;
        }
        if left {
            let pruned = self.prune();
            log::debug!("hover left {pruned} nodes");
        }
    }

    fn retain(&mut self, ids: impl IntoIterator<Item = PointerId>) {
        self.retained.extend(ids);
    }

    fn release(&mut self, ids: impl IntoIterator<Item = PointerId>) {
        for id in ids {
            self.retained.remove(&id);
            if self.deferred.remove(&id) {
                log::debug!("applying deferred removal of {id:?}");
                self.remove_hit_path(id);
            }
        }
    }

    fn clear(&mut self) {
        for (idx, slot) in self.nodes.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.roots.clear();
        self.retained.clear();
        self.deferred.clear();
    }
}

/// A node's dispatch data, copied out so no borrow outlives the lookup.
struct Visit {
    filter: FilterRef,
    pointer_ids: Vec<PointerId>,
    children: Vec<NodeKey>,
    origin: Vec2,
    bounds: Size,
    hover: Option<PointerEventType>,
}

impl Visit {
    fn of(forest: &RefCell<Forest>, key: NodeKey) -> Option<Self> {
        let forest = forest.borrow();
        let node = forest.node(key)?;
        Some(Self {
            filter: Rc::clone(&node.filter),
            pointer_ids: node.pointer_ids.iter().copied().collect(),
            children: node.children.clone(),
            origin: node.origin,
            bounds: node.bounds,
            hover: node.hover,
        })
    }

    fn relevant(&self, batch: &ChangeBatch) -> Vec<PointerId> {
        self.pointer_ids
            .iter()
            .copied()
            .filter(|id| batch.contains_key(id))
            .collect()
    }

    /// Hand local copies of the relevant changes to the consumer and merge
    /// back what it consumed. Returns whether the consumer was invoked.
    fn deliver(&self, relevant: &[PointerId], batch: &mut ChangeBatch, pass: PointerEventPass) -> bool {
        if !self.filter.is_attached() {
            return false;
        }
        let (origin, bounds) = self
            .filter
            .placement()
            .map_or((self.origin, self.bounds), |r| (r.origin().to_vec2(), r.size()));
        let mut event = PointerEvent::new(
            relevant
                .iter()
                .filter_map(|id| batch.get(id))
                .map(|c| c.localized(origin))
                .collect(),
        )
        .with_hover(self.hover);
        log::trace!("{pass:?} pass for {relevant:?}");
        self.filter.on_pointer_event(&mut event, pass, bounds);
        for local in &event.changes {
            if relevant.contains(&local.id)
                && let Some(shared) = batch.get_mut(&local.id)
            {
                shared.adopt_consumption(local);
            }
        }
        true
    }
}

fn dispatch_main(forest: &RefCell<Forest>, key: NodeKey, batch: &mut ChangeBatch) -> bool {
    let Some(visit) = Visit::of(forest, key) else {
        return false;
    };
    let relevant = visit.relevant(batch);
    if relevant.is_empty() {
        return false;
    }
    let mut dispatched = visit.deliver(&relevant, batch, PointerEventPass::Initial);
    if visit.filter.is_attached() {
        for child in &visit.children {
            dispatched |= dispatch_main(forest, *child, batch);
        }
    }
    dispatched |= visit.deliver(&relevant, batch, PointerEventPass::Main);
    dispatched
}

fn dispatch_final(forest: &RefCell<Forest>, key: NodeKey, batch: &mut ChangeBatch) {
    let Some(visit) = Visit::of(forest, key) else {
        return;
    };
    let relevant = visit.relevant(batch);
    if relevant.is_empty() {
        return;
    }
    visit.deliver(&relevant, batch, PointerEventPass::Final);
    if visit.filter.is_attached() {
        for child in &visit.children {
            dispatch_final(forest, *child, batch);
        }
    }
}

fn is_origin(filter: &FilterRef, origin: &Weak<dyn PointerInputFilter>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(filter), origin.as_ptr())
}

fn custom_main(
    forest: &RefCell<Forest>,
    key: NodeKey,
    event: &dyn Any,
    origin: &Weak<dyn PointerInputFilter>,
) {
    let Some(visit) = Visit::of(forest, key) else {
        return;
    };
    let skip = is_origin(&visit.filter, origin);
    if !skip && visit.filter.is_attached() {
        visit.filter.on_custom_event(event, PointerEventPass::Initial);
    }
    if visit.filter.is_attached() {
        for child in &visit.children {
            custom_main(forest, *child, event, origin);
        }
    }
    if !skip && visit.filter.is_attached() {
        visit.filter.on_custom_event(event, PointerEventPass::Main);
    }
}

fn custom_final(
    forest: &RefCell<Forest>,
    key: NodeKey,
    event: &dyn Any,
    origin: &Weak<dyn PointerInputFilter>,
) {
    let Some(visit) = Visit::of(forest, key) else {
        return;
    };
    if !visit.filter.is_attached() {
        return;
    }
    if !is_origin(&visit.filter, origin) {
        visit.filter.on_custom_event(event, PointerEventPass::Final);
    }
    if visit.filter.is_attached() {
        for child in &visit.children {
            custom_final(forest, *child, event, origin);
        }
    }
}

/// Cancel `key` and its descendants, children before parents.
fn cancel_subtree(forest: &RefCell<Forest>, key: NodeKey) {
    let Some(visit) = Visit::of(forest, key) else {
        return;
    };
    for child in &visit.children {
        cancel_subtree(forest, *child);
    }
    visit.filter.on_cancel();
}

fn remove_detached_under(forest: &RefCell<Forest>, parent: Option<NodeKey>) {
    let children = forest.borrow().children_of(parent).to_vec();
    for child in children {
        let Some(filter) = forest.borrow().node(child).map(|n| Rc::clone(&n.filter)) else {
            continue;
        };
        if filter.is_attached() {
            remove_detached_under(forest, Some(child));
            continue;
        }
        cancel_subtree(forest, child);
        let mut forest = forest.borrow_mut();
        if forest.node(child).is_some() {
            forest.unlink(child);
            let removed = forest.free_subtree(child);
            log::debug!("removed {removed} nodes under a detached consumer");
        }
    }
}

/// Handle given to a consumer in [`PointerInputFilter::on_init`].
///
/// Lets the consumer broadcast custom events to the rest of the forest and
/// keep hit paths alive past their natural removal. The handle refers to the
/// tracker weakly; once the tracker is dropped every call is a no-op.
#[derive(Clone)]
pub struct CustomEventDispatcher {
    forest: Weak<RefCell<Forest>>,
    origin: Weak<dyn PointerInputFilter>,
}

impl core::fmt::Debug for CustomEventDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomEventDispatcher")
            .field("tracker_alive", &(self.forest.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

impl CustomEventDispatcher {
    fn new(forest: &Rc<RefCell<Forest>>, origin: &FilterRef) -> Self {
        Self {
            forest: Rc::downgrade(forest),
            origin: Rc::downgrade(origin),
        }
    }

    /// Broadcast `event` to every other consumer in the forest.
    ///
    /// Runs Initial, Main, and Final in the same order as pointer dispatch.
    /// Nodes bound to the sending consumer are skipped, their subtrees are not.
    pub fn dispatch_custom_event(&self, event: &dyn Any) {
        let Some(forest) = self.forest.upgrade() else {
            return;
        };
        let roots = forest.borrow().roots.clone();
        for root in &roots {
            custom_main(&forest, *root, event, &self.origin);
        }
        for root in &roots {
            custom_final(&forest, *root, event, &self.origin);
        }
    }

    /// Keep the hit paths of `ids` alive until they are released.
    pub fn retain_hit_paths(&self, ids: impl IntoIterator<Item = PointerId>) {
        if let Some(forest) = self.forest.upgrade() {
            forest.borrow_mut().retain(ids);
        }
    }

    /// Stop retaining `ids`, applying any removal deferred meanwhile.
    pub fn release_hit_paths(&self, ids: impl IntoIterator<Item = PointerId>) {
        if let Some(forest) = self.forest.upgrade() {
            forest.borrow_mut().release(ids);
        }
    }
}

/// Forest of consumers hit by in-flight pointers.
pub struct HitPathTracker {
    forest: Rc<RefCell<Forest>>,
}

impl Default for HitPathTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for HitPathTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let forest = self.forest.borrow();
        f.debug_struct("HitPathTracker")
            .field("nodes", &forest.nodes.iter().flatten().count())
            .field("roots", &forest.roots.len())
            .field("retained", &forest.retained)
            .field("deferred", &forest.deferred)
            .finish_non_exhaustive()
    }
}

impl HitPathTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            forest: Rc::new(RefCell::new(Forest::default())),
        }
    }

    /// Route `pointer_id` through `path`, outermost consumer first.
    ///
    /// Existing nodes matching a prefix of `path` are reused; the rest is
    /// created. Each node along the path records the target's origin and size.
    /// Consumers joining the forest for the first time get
    /// [`PointerInputFilter::on_init`] once the forest is updated.
    pub fn add_hit_path<I>(&mut self, pointer_id: PointerId, path: I)
    where
        I: IntoIterator,
        I::Item: Into<HitTarget>,
    {
        let mut fresh = Vec::new();
        {
            let mut guard = self.forest.borrow_mut();
            let forest = &mut *guard;
            let mut parent = None;
            let mut merging = true;
            let mut created = 0_usize;
            for target in path {
                let target = target.into();
                if merging {
                    let existing = forest.children_of(parent).iter().copied().find(|k| {
                        forest
                            .node(*k)
                            .is_some_and(|n| same_filter(&n.filter, &target.filter))
                    });
                    if let Some(key) = existing
                        && let Some(node) = forest.node_mut(key)
                    {
                        node.pointer_ids.insert(pointer_id);
                        node.origin = target.origin;
                        node.bounds = target.size;
                        node.is_in = true;
                        parent = Some(key);
                        continue;
                    }
                    merging = false;
                }
                if forest.mark_initialized(&target.filter) {
                    fresh.push(Rc::clone(&target.filter));
                }
                parent = Some(forest.insert(parent, &target, pointer_id));
                created += 1;
            }
            log::debug!("added hit path {pointer_id:?} ({created} new nodes)");
        }
        for filter in fresh {
            filter.on_init(CustomEventDispatcher::new(&self.forest, &filter));
        }
    }

    /// Remove `pointer_id` from every node and prune emptied nodes.
    ///
    /// While the id is retained the removal is recorded and applied on release.
    pub fn remove_hit_path(&mut self, pointer_id: PointerId) {
        self.forest.borrow_mut().remove_hit_path(pointer_id);
    }

    /// Keep the hit paths of `ids` alive until they are released.
    pub fn retain_hit_paths(&mut self, ids: impl IntoIterator<Item = PointerId>) {
        self.forest.borrow_mut().retain(ids);
    }

    /// Stop retaining `ids`, applying any removal deferred meanwhile.
    pub fn release_hit_paths(&mut self, ids: impl IntoIterator<Item = PointerId>) {
        self.forest.borrow_mut().release(ids);
    }

    /// Run Initial, Main, and Final over the forest.
    ///
    /// `batch` is in root coordinates and lists every pointer still down or
    /// hovering; tracked ids missing from it are removed first. Consumers see
    /// local copies; what they consume is accumulated back into `batch`.
    /// Returns whether any consumer was invoked.
    pub fn dispatch_changes(&mut self, batch: &mut ChangeBatch) -> bool {
        self.remove_stale_ids(batch);
        if batch.is_empty() {
            return false;
        }
        let changed = self.forest.borrow_mut().prepare_hover(batch);
        let mut dispatched = false;
        if changed {
            let roots = self.forest.borrow().roots.clone();
            for root in &roots {
                dispatched |= dispatch_main(&self.forest, *root, batch);
            }
            for root in &roots {
                dispatch_final(&self.forest, *root, batch);
            }
        } else {
            log::trace!("hovering pointers unchanged, skipping dispatch");
        }
        self.forest.borrow_mut().settle_hover(batch);
        dispatched
    }

    fn remove_stale_ids(&mut self, batch: &ChangeBatch) {
        let mut forest = self.forest.borrow_mut();
        let stale: Vec<PointerId> = forest
            .tracked_ids()
            .into_iter()
            .filter(|id| !batch.contains_key(id))
            .collect();
        for id in stale {
            log::debug!("{id:?} missing from batch");
            forest.remove_hit_path(id);
        }
    }

    /// Cancel every node, children before parents, then forget everything.
    ///
    /// Retention and deferred removals are cleared too.
    pub fn process_cancel(&mut self) {
        let roots = self.forest.borrow().roots.clone();
        if !roots.is_empty() {
            log::debug!("cancelling {} top-level hit paths", roots.len());
        }
        for root in roots {
            cancel_subtree(&self.forest, root);
        }
        self.forest.borrow_mut().clear();
    }

    /// Cancel and remove every subtree whose consumer reports being detached.
    ///
    /// Attached ancestors keep their pointer ids.
    pub fn remove_detached_pointer_input_filters(&mut self) {
        remove_detached_under(&self.forest, None);
    }

    /// Whether the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.forest.borrow().roots.is_empty()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.forest.borrow().nodes.iter().flatten().count()
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> Vec<NodeKey> {
        self.forest.borrow().roots.clone()
    }

    /// Children of `key` in insertion order; empty if `key` is stale.
    pub fn children_of(&self, key: NodeKey) -> Vec<NodeKey> {
        self.forest.borrow().children_of(Some(key)).to_vec()
    }

    /// Pointer ids routed through `key`, ascending; empty if `key` is stale.
    pub fn pointer_ids_of(&self, key: NodeKey) -> Vec<PointerId> {
        self.forest
            .borrow()
            .node(key)
            .map(|n| n.pointer_ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Consumer bound to `key`.
    pub fn filter_of(&self, key: NodeKey) -> Option<FilterRef> {
        self.forest.borrow().node(key).map(|n| Rc::clone(&n.filter))
    }

    /// Whether any node routes `pointer_id`.
    pub fn has_hit_path(&self, pointer_id: PointerId) -> bool {
        let forest = self.forest.borrow();
        forest
            .roots
            .iter()
            .filter_map(|k| forest.node(*k))
            .any(|n| n.pointer_ids.contains(&pointer_id))
    }

    /// Whether `pointer_id` is currently retained.
    pub fn is_retained(&self, pointer_id: PointerId) -> bool {
        self.forest.borrow().retained.contains(&pointer_id)
    }
}
