// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target binding.
//!
//! A [`DropTarget`] tags one element with its id and handles `dragenter`,
//! `dragover`, `drop`, and `dragleave` there:
//!
//! - `dragenter`: set `is_over` when the entered node is this element or one
//!   of its descendants. It bubbles past nested targets, which stop only
//!   `dragover`.
//! - `dragover`: accept the drop, stop propagation so outer targets stay
//!   quiet, set `is_over` and `is_over_current`, write the monitor, and call
//!   `on_hover`.
//! - `drop`: the same bookkeeping, but both flags reset and `on_drop` runs.
//! - `dragleave`: reset the flags now; on the next turn write the monitor (if a
//!   drag is still active) and call `on_leave`.
//!
//! `is_over_current` compares the id tagged on the node under the cursor with
//! this target's id, so it is true only when no nested target sits in between.
//! An outer target keeps `is_over` while the cursor moves within its own
//! subtree. Both flags reset when the drag ends.

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};

use handoff_host::{DragEvent, EventKind, ListenerHandle, NodeId};
use handoff_store::{Monitor, Observable, Subscription};
use kurbo::Point;

use crate::provider::Scope;

/// Dataset key a bound target is tagged with.
pub const DROPPABLE_ID: &str = "droppableId";

type DropCallback<T> = Rc<dyn Fn(Option<&T>, &Monitor)>;

/// Construction options for a [`DropTarget`].
pub struct DropOptions<T> {
    id: String,
    element: Option<NodeId>,
    on_hover: Option<DropCallback<T>>,
    on_drop: Option<DropCallback<T>>,
    on_leave: Option<DropCallback<T>>,
}

impl<T> core::fmt::Debug for DropOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DropOptions")
            .field("id", &self.id)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

impl<T> DropOptions<T> {
    /// A target identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element: None,
            on_hover: None,
            on_drop: None,
            on_leave: None,
        }
    }

    /// Attach to `node`. A document handle attaches to its body.
    pub fn element(mut self, node: NodeId) -> Self {
        self.element = Some(node);
        self
    }

    /// Called on every `dragover` with the payload and the fresh monitor.
    pub fn on_hover(mut self, f: impl Fn(Option<&T>, &Monitor) + 'static) -> Self {
        self.on_hover = Some(Rc::new(f));
        self
    }

    /// Called on `drop`.
    pub fn on_drop(mut self, f: impl Fn(Option<&T>, &Monitor) + 'static) -> Self {
        self.on_drop = Some(Rc::new(f));
        self
    }

    /// Called on the turn after `dragleave`.
    pub fn on_leave(mut self, f: impl Fn(Option<&T>, &Monitor) + 'static) -> Self {
        self.on_leave = Some(Rc::new(f));
        self
    }
}

struct Bound {
    node: NodeId,
    tag: String,
    _listeners: [ListenerHandle; 4],
}

struct TargetInner<T> {
    scope: Scope<T>,
    id: RefCell<String>,
    element: Cell<Option<NodeId>>,
    on_hover: RefCell<Option<DropCallback<T>>>,
    on_drop: RefCell<Option<DropCallback<T>>>,
    on_leave: RefCell<Option<DropCallback<T>>>,
    is_over: Observable<bool>,
    is_over_current: Observable<bool>,
    bound: RefCell<Option<Bound>>,
    watch: RefCell<Option<Subscription>>,
}

/// A bound drop target.
pub struct DropTarget<T: Clone + 'static> {
    inner: Rc<TargetInner<T>>,
}

impl<T: Clone + 'static> core::fmt::Debug for DropTarget<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DropTarget")
            .field("id", &self.inner.id.borrow())
            .field("element", &self.inner.element.get())
            .field("is_over", &self.inner.is_over.get())
            .field("is_over_current", &self.inner.is_over_current.get())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> DropTarget<T> {
    /// Bind a target in `scope`.
    pub fn new(scope: &Scope<T>, options: DropOptions<T>) -> Self {
        let inner = Rc::new(TargetInner {
            scope: scope.clone(),
            id: RefCell::new(options.id),
            element: Cell::new(options.element),
            on_hover: RefCell::new(options.on_hover),
            on_drop: RefCell::new(options.on_drop),
            on_leave: RefCell::new(options.on_leave),
            is_over: Observable::new(false),
            is_over_current: Observable::new(false),
            bound: RefCell::new(None),
            watch: RefCell::new(None),
        });
        inner.watch_drag_end();
        inner.bind();
        Self { inner }
    }

    /// Whether the cursor is over this target or a descendant of it.
    pub fn is_over(&self) -> bool {
        self.inner.is_over.get()
    }

    /// Whether the cursor is over this target and not a nested target.
    pub fn is_over_current(&self) -> bool {
        self.inner.is_over_current.get()
    }

    /// Observe [`DropTarget::is_over`].
    pub fn subscribe_is_over(&self, f: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.is_over.subscribe(f)
    }

    /// Observe [`DropTarget::is_over_current`].
    pub fn subscribe_is_over_current(&self, f: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.is_over_current.subscribe(f)
    }

    /// The target id.
    pub fn id(&self) -> String {
        self.inner.id.borrow().clone()
    }

    /// Change the id and re-tag the node.
    pub fn set_id(&self, id: impl Into<String>) {
        let id = id.into();
        if *self.inner.id.borrow() == id {
            return;
        }
        *self.inner.id.borrow_mut() = id;
        self.inner.bind();
    }

    /// The element the target is configured for.
    pub fn element(&self) -> Option<NodeId> {
        self.inner.element.get()
    }

    /// Move the binding to another element, or detach with `None`.
    pub fn set_element(&self, element: Option<NodeId>) {
        if self.inner.element.replace(element) != element {
            self.inner.bind();
        }
    }

    /// The node listeners are attached to right now, if any.
    pub fn bound_node(&self) -> Option<NodeId> {
        self.inner.bound.borrow().as_ref().map(|b| b.node)
    }

    /// Replace the hover callback.
    pub fn set_on_hover(&self, f: impl Fn(Option<&T>, &Monitor) + 'static) {
        *self.inner.on_hover.borrow_mut() = Some(Rc::new(f));
    }

    /// Replace the drop callback.
    pub fn set_on_drop(&self, f: impl Fn(Option<&T>, &Monitor) + 'static) {
        *self.inner.on_drop.borrow_mut() = Some(Rc::new(f));
    }

    /// Replace the leave callback.
    pub fn set_on_leave(&self, f: impl Fn(Option<&T>, &Monitor) + 'static) {
        *self.inner.on_leave.borrow_mut() = Some(Rc::new(f));
    }

    /// Detach and attach again.
    pub fn rebind(&self) {
        self.inner.bind();
    }
}

impl<T> TargetInner<T> {
    fn unbind(&self) {
        let Some(bound) = self.bound.borrow_mut().take() else {
            return;
        };
        let host = self.scope.host();
        // Leave the tag alone if another target re-tagged the node since.
        if host.data_attr(bound.node, DROPPABLE_ID).as_deref() == Some(bound.tag.as_str()) {
            host.remove_data_attr(bound.node, DROPPABLE_ID);
        }
        tracing::trace!(node = ?bound.node, "drop target unbound");
    }
}

impl<T: Clone + 'static> TargetInner<T> {
    fn watch_drag_end(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let watch = self.scope.store().subscribe_to_dragging_id(move |id| {
            if id.is_none()
                && let Some(inner) = weak.upgrade()
            {
                inner.reset();
            }
        });
        *self.watch.borrow_mut() = Some(watch);
    }

    fn reset(&self) {
        self.is_over.set(false);
        self.is_over_current.set(false);
    }

    fn bind(self: &Rc<Self>) {
        self.unbind();
        self.reset();
        let host = self.scope.host();
        let Some(node) = self.element.get().and_then(|n| host.resolve_target(n)) else {
            return;
        };
        let tag = self.id.borrow().clone();
        host.set_data_attr(node, DROPPABLE_ID, tag.clone());
        let enter = self.listen(node, EventKind::DragEnter, Self::on_drag_enter);
        let over = self.listen(node, EventKind::DragOver, Self::on_drag_over);
        let drop = self.listen(node, EventKind::Drop, Self::on_drop);
        let leave = self.listen(node, EventKind::DragLeave, Self::on_drag_leave);
        *self.bound.borrow_mut() = Some(Bound {
            node,
            tag,
            _listeners: [enter, over, drop, leave],
        });
        tracing::trace!(?node, id = %self.id.borrow(), "drop target bound");
    }

    fn listen(
        self: &Rc<Self>,
        node: NodeId,
        kind: EventKind,
        handler: fn(&Rc<Self>, &mut DragEvent),
    ) -> ListenerHandle {
        let weak: Weak<Self> = Rc::downgrade(self);
        self.scope.host().add_listener(node, kind, move |event| {
            if let Some(inner) = weak.upgrade() {
                handler(&inner, event);
            }
        })
    }

    fn snapshot(&self, position: Point, droppable_id: Option<String>) -> Monitor {
        Monitor {
            position,
            dragging_id: self.scope.store().dragging_id(),
            droppable_id,
        }
    }

    fn over_id(&self, event: &DragEvent) -> Option<String> {
        self.scope.host().data_attr(event.target, DROPPABLE_ID)
    }

    fn on_drag_enter(self: &Rc<Self>, event: &mut DragEvent) {
        let entered_own_subtree = self
            .bound
            .borrow()
            .as_ref()
            .is_some_and(|bound| self.scope.host().is_within(event.target, bound.node));
        if entered_own_subtree {
            self.is_over.set(true);
        }
    }

    fn on_drag_over(self: &Rc<Self>, event: &mut DragEvent) {
        event.stop_propagation();
        event.prevent_default();
        let over_id = self.over_id(event);
        let current = over_id.as_deref() == Some(self.id.borrow().as_str());
        self.is_over.set(true);
        self.is_over_current.set(current);
        let monitor = self.snapshot(event.client, over_id);
        self.scope.store().set_monitor(Some(monitor.clone()));
        let payload = self.scope.store().payload();
        let on_hover = self.on_hover.borrow().clone();
        if let Some(on_hover) = on_hover {
            on_hover(payload.as_ref(), &monitor);
        }
    }

    fn on_drop(self: &Rc<Self>, event: &mut DragEvent) {
        event.stop_propagation();
        event.prevent_default();
        self.reset();
        let monitor = self.snapshot(event.client, self.over_id(event));
        self.scope.store().set_monitor(Some(monitor.clone()));
        let payload = self.scope.store().payload();
        tracing::debug!(
            target_id = %self.id.borrow(),
            dragging_id = ?monitor.dragging_id,
            "dropped"
        );
        let on_drop = self.on_drop.borrow().clone();
        if let Some(on_drop) = on_drop {
            on_drop(payload.as_ref(), &monitor);
        }
    }

    fn on_drag_leave(self: &Rc<Self>, event: &mut DragEvent) {
        let entering_own_subtree = match (event.related_target, self.bound.borrow().as_ref()) {
            (Some(entered), Some(bound)) => self.scope.host().is_within(entered, bound.node),
            _ => false,
        };
        if !entering_own_subtree {
            self.is_over.set(false);
        }
        self.is_over_current.set(false);
        let position = event.client;
        let over_id = self.over_id(event);
        let weak = Rc::downgrade(self);
        self.scope.host().defer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish_leave(position, over_id);
            }
        });
    }

    fn finish_leave(&self, position: Point, over_id: Option<String>) {
        let store = self.scope.store();
        let monitor = self.snapshot(position, over_id);
        if store.is_dragging() {
            store.set_monitor(Some(monitor.clone()));
        }
        let payload = store.payload();
        let on_leave = self.on_leave.borrow().clone();
        if let Some(on_leave) = on_leave {
            on_leave(payload.as_ref(), &monitor);
        }
    }
}

impl<T> Drop for TargetInner<T> {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use crate::source::DragOptions;
    use handoff_host::{Host, LocalNode};

    #[test]
    fn binding_tags_and_unbinding_untags() {
        let host = Host::new();
        let provider = Provider::<u32>::root(&host);
        let zone = host.insert(host.body(), LocalNode::default()).unwrap();
        let target = provider.scope().drop_target(DropOptions::new("3").element(zone));
        assert_eq!(host.data_attr(zone, DROPPABLE_ID).as_deref(), Some("3"));
        target.set_id("4");
        assert_eq!(host.data_attr(zone, DROPPABLE_ID).as_deref(), Some("4"));
        assert_eq!(host.listener_count(zone, EventKind::DragOver), 1);
        assert_eq!(host.listener_count(zone, EventKind::DragEnter), 1);
        drop(target);
        assert_eq!(host.data_attr(zone, DROPPABLE_ID), None);
        assert_eq!(host.listener_count(zone, EventKind::DragOver), 0);
        assert_eq!(host.listener_count(zone, EventKind::DragEnter), 0);
    }

    #[test]
    fn document_handle_binds_to_body() {
        let host = Host::new();
        let provider = Provider::<u32>::root(&host);
        let target = provider
            .scope()
            .drop_target(DropOptions::new("page").element(host.document()));
        assert_eq!(target.bound_node(), Some(host.body()));
        assert_eq!(host.data_attr(host.body(), DROPPABLE_ID).as_deref(), Some("page"));
    }

    #[test]
    fn hover_accepts_and_reports_payload() {
        let host = Host::new();
        let provider = Provider::<u32>::root(&host);
        let card = host.insert(host.body(), LocalNode::default()).unwrap();
        let zone = host.insert(host.body(), LocalNode::default()).unwrap();
        let _source = provider
            .scope()
            .drag_source(DragOptions::new("1", 9).element(card));
        let seen = Rc::new(RefCell::new(None));
        let target = provider.scope().drop_target(
            DropOptions::new("3").element(zone).on_hover({
                let seen = seen.clone();
                move |payload, monitor| {
                    *seen.borrow_mut() = Some((payload.copied(), monitor.droppable_id.clone()));
                }
            }),
        );
        let mut session = host.start_drag(card, Point::ZERO).unwrap();
        host.run_pending();
        assert!(session.move_over(zone, Point::new(4.0, 5.0)));
        assert!(target.is_over());
        assert!(target.is_over_current());
        assert_eq!(*seen.borrow(), Some((Some(9), Some(String::from("3")))));
        let monitor = provider.store().monitor().unwrap();
        assert_eq!(monitor.position, Point::new(4.0, 5.0));
        assert_eq!(monitor.dragging_id.as_deref(), Some("1"));
    }

    #[test]
    fn leave_resets_now_and_reports_next_turn() {
        let host = Host::new();
        let provider = Provider::<u32>::root(&host);
        let card = host.insert(host.body(), LocalNode::default()).unwrap();
        let zone = host.insert(host.body(), LocalNode::default()).unwrap();
        let _source = provider
            .scope()
            .drag_source(DragOptions::new("1", 0).element(card));
        let left = Rc::new(Cell::new(0));
        let target = provider.scope().drop_target(
            DropOptions::new("3").element(zone).on_leave({
                let left = left.clone();
                move |_, _| left.set(left.get() + 1)
            }),
        );
        let mut session = host.start_drag(card, Point::ZERO).unwrap();
        host.run_pending();
        session.move_over(zone, Point::ZERO);
        session.move_over(host.body(), Point::new(1.0, 1.0));
        assert!(!target.is_over());
        assert_eq!(left.get(), 0);
        host.run_pending();
        assert_eq!(left.get(), 1);
    }
}
