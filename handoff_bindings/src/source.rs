// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-source binding.
//!
//! A [`DragSource`] makes one element draggable and publishes its payload to
//! the scope's store when a drag from that element starts.
//!
//! ## Event handling
//!
//! - `dragstart`: stop propagation so an enclosing source does not also start,
//!   register the [`DragLayer`] ghost image if one is set, then on the next turn
//!   write `{payload, id}` to the store and call `on_start`.
//! - `dragend`: clear the store now, then on the next turn call `on_end` with
//!   the latest payload. A `dragend` that arrives before the start write ran
//!   cancels that write.
//!
//! `is_dragging` follows the store's dragging id: it is true exactly while
//! that id equals this source's id.

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};

use handoff_host::{DragEvent, EventKind, Host, ListenerHandle, NodeFlags, NodeId};
use handoff_store::{Observable, StoredData, Subscription};
use kurbo::Vec2;

use crate::provider::Scope;

/// Dataset key a bound source is tagged with.
pub const DRAGGABLE_ID: &str = "draggableId";

type Callback<T> = Rc<dyn Fn(&T)>;

/// Construction options for a [`DragSource`].
pub struct DragOptions<T> {
    id: String,
    data: T,
    element: Option<NodeId>,
    enabled: bool,
    on_start: Option<Callback<T>>,
    on_end: Option<Callback<T>>,
}

impl<T: core::fmt::Debug> core::fmt::Debug for DragOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragOptions")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("element", &self.element)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<T> DragOptions<T> {
    /// A source identified by `id` carrying `data`.
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
            element: None,
            enabled: true,
            on_start: None,
            on_end: None,
        }
    }

    /// Attach to `node`.
    pub fn element(mut self, node: NodeId) -> Self {
        self.element = Some(node);
        self
    }

    /// Start enabled or disabled. Enabled by default.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Called with the payload once the drag start is recorded.
    pub fn on_start(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }

    /// Called with the latest payload on the turn after the drag ends.
    pub fn on_end(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.on_end = Some(Rc::new(f));
        self
    }
}

/// A custom ghost image for a drag.
///
/// `get` produces the node to render (it may create one); `on_remove`, if set,
/// is called on the next turn to clean it up.
#[derive(Clone)]
pub struct DragLayer {
    get: Rc<dyn Fn(&Host) -> NodeId>,
    remove: Option<Rc<dyn Fn(&Host, NodeId)>>,
    offset: Vec2,
}

impl core::fmt::Debug for DragLayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragLayer")
            .field("offset", &self.offset)
            .field("removes", &self.remove.is_some())
            .finish_non_exhaustive()
    }
}

impl DragLayer {
    /// Cursor offset used when none is given.
    pub const DEFAULT_OFFSET: Vec2 = Vec2::new(-10.0, 10.0);

    /// A layer whose image node comes from `get`.
    pub fn new(get: impl Fn(&Host) -> NodeId + 'static) -> Self {
        Self {
            get: Rc::new(get),
            remove: None,
            offset: Self::DEFAULT_OFFSET,
        }
    }

    /// Clean up the image node on the turn after the drag starts.
    pub fn on_remove(mut self, f: impl Fn(&Host, NodeId) + 'static) -> Self {
        self.remove = Some(Rc::new(f));
        self
    }

    /// Cursor offset within the image.
    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

struct Bound {
    node: NodeId,
    _listeners: [ListenerHandle; 2],
}

struct SourceInner<T> {
    scope: Scope<T>,
    id: RefCell<String>,
    data: RefCell<T>,
    element: Cell<Option<NodeId>>,
    enabled: Cell<bool>,
    on_start: RefCell<Option<Callback<T>>>,
    on_end: RefCell<Option<Callback<T>>>,
    preview: RefCell<Option<DragLayer>>,
    is_dragging: Observable<bool>,
    bound: RefCell<Option<Bound>>,
    // Bumped on every dragend; a pending start write from an older epoch is void.
    epoch: Cell<u64>,
    watch: RefCell<Option<Subscription>>,
}

/// A bound drag source.
///
/// Dropping it detaches its listeners and clears the node's draggable mark.
pub struct DragSource<T: Clone + 'static> {
    inner: Rc<SourceInner<T>>,
}

impl<T: Clone + 'static> core::fmt::Debug for DragSource<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragSource")
            .field("id", &self.inner.id.borrow())
            .field("element", &self.inner.element.get())
            .field("enabled", &self.inner.enabled.get())
            .field("is_dragging", &self.inner.is_dragging.get())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> DragSource<T> {
    /// Bind a source in `scope`.
    pub fn new(scope: &Scope<T>, options: DragOptions<T>) -> Self {
        let inner = Rc::new(SourceInner {
            scope: scope.clone(),
            id: RefCell::new(options.id),
            data: RefCell::new(options.data),
            element: Cell::new(options.element),
            enabled: Cell::new(options.enabled),
            on_start: RefCell::new(options.on_start),
            on_end: RefCell::new(options.on_end),
            preview: RefCell::new(None),
            is_dragging: Observable::new(false),
            bound: RefCell::new(None),
            epoch: Cell::new(0),
            watch: RefCell::new(None),
        });
        inner.watch_dragging_id();
        inner.bind();
        Self { inner }
    }

    /// Whether this source is the one being dragged.
    pub fn is_dragging(&self) -> bool {
        self.inner.is_dragging.get()
    }

    /// Observe [`DragSource::is_dragging`]. Called only when it flips.
    pub fn subscribe_is_dragging(&self, f: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.is_dragging.subscribe(f)
    }

    /// Use `layer` as the ghost image for future drags.
    pub fn preview(&self, layer: DragLayer) {
        *self.inner.preview.borrow_mut() = Some(layer);
    }

    /// Replace the payload.
    ///
    /// While this source is being dragged the store's copy is updated too, so
    /// targets see the new value without a second drag start.
    pub fn set_data(&self, data: T) {
        *self.inner.data.borrow_mut() = data;
        if self.inner.is_dragging.get() {
            let data = self.inner.data.borrow().clone();
            self.inner.scope.store().update_data_only(data);
        }
    }

    /// The current payload.
    pub fn data(&self) -> T {
        self.inner.data.borrow().clone()
    }

    /// The source id.
    pub fn id(&self) -> String {
        self.inner.id.borrow().clone()
    }

    /// Change the id, re-deriving `is_dragging` and re-tagging the node.
    pub fn set_id(&self, id: impl Into<String>) {
        let id = id.into();
        if *self.inner.id.borrow() == id {
            return;
        }
        *self.inner.id.borrow_mut() = id;
        let current = self.inner.scope.store().dragging_id();
        self.inner.sync_is_dragging(current.as_deref());
        self.inner.bind();
    }

    /// Whether the source responds to drags.
    pub fn enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Enable or disable. Disabling detaches the listeners.
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.replace(enabled) != enabled {
            self.inner.bind();
        }
    }

    /// The element the source is configured for.
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

    /// Replace the start callback.
    pub fn set_on_start(&self, f: impl Fn(&T) + 'static) {
        *self.inner.on_start.borrow_mut() = Some(Rc::new(f));
    }

    /// Replace the end callback.
    pub fn set_on_end(&self, f: impl Fn(&T) + 'static) {
        *self.inner.on_end.borrow_mut() = Some(Rc::new(f));
    }

    /// Detach and attach again, for example after the element was recreated
    /// under the same handle.
    pub fn rebind(&self) {
        self.inner.bind();
    }
}

impl<T> SourceInner<T> {
    fn unbind(&self) {
        let Some(bound) = self.bound.borrow_mut().take() else {
            return;
        };
        let host = self.scope.host();
        host.toggle_flags(bound.node, NodeFlags::DRAGGABLE, false);
        host.remove_data_attr(bound.node, DRAGGABLE_ID);
        tracing::trace!(node = ?bound.node, "drag source unbound");
    }
}

impl<T: Clone + 'static> SourceInner<T> {
    fn watch_dragging_id(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let watch = self.scope.store().subscribe_to_dragging_id(move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.sync_is_dragging(id.as_deref());
            }
        });
        *self.watch.borrow_mut() = Some(watch);
        let current = self.scope.store().dragging_id();
        self.sync_is_dragging(current.as_deref());
    }

    fn sync_is_dragging(&self, dragging_id: Option<&str>) {
        let mine = dragging_id == Some(self.id.borrow().as_str());
        self.is_dragging.set(mine);
    }

    fn bind(self: &Rc<Self>) {
        self.unbind();
        if !self.enabled.get() {
            return;
        }
        let host = self.scope.host();
        let Some(node) = self.element.get().filter(|n| host.is_alive(*n)) else {
            return;
        };
        host.toggle_flags(node, NodeFlags::DRAGGABLE, true);
        host.set_data_attr(node, DRAGGABLE_ID, self.id.borrow().clone());
        let start = self.listen(node, EventKind::DragStart, Self::on_drag_start);
        let end = self.listen(node, EventKind::DragEnd, Self::on_drag_end);
        *self.bound.borrow_mut() = Some(Bound {
            node,
            _listeners: [start, end],
        });
        tracing::trace!(?node, id = %self.id.borrow(), "drag source bound");
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

    fn on_drag_start(self: &Rc<Self>, event: &mut DragEvent) {
        event.stop_propagation();
        let host = self.scope.host().clone();
        let layer = self.preview.borrow().clone();
        if let (Some(layer), Some(transfer)) = (layer, event.data_transfer.as_mut()) {
            let image = (layer.get)(&host);
            transfer.set_drag_image(image, layer.offset);
            if let Some(remove) = layer.remove {
                let weak_host = host.downgrade();
                host.defer(move || {
                    if let Some(host) = weak_host.upgrade() {
                        remove(&host, image);
                    }
                });
            }
        }
        let epoch = self.epoch.get();
        let weak = Rc::downgrade(self);
        host.defer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.record_start(epoch);
            }
        });
    }

    fn record_start(&self, epoch: u64) {
        if self.epoch.get() != epoch {
            tracing::debug!(id = %self.id.borrow(), "drag ended before its start was recorded");
            return;
        }
        let data = self.data.borrow().clone();
        let id = self.id.borrow().clone();
        tracing::debug!(id = %id, "drag started");
        self.scope.store().set_data(StoredData::new(data.clone(), id));
        let on_start = self.on_start.borrow().clone();
        if let Some(on_start) = on_start {
            on_start(&data);
        }
    }

    fn on_drag_end(self: &Rc<Self>, _event: &mut DragEvent) {
        self.epoch.set(self.epoch.get().wrapping_add(1));
        let weak = Rc::downgrade(self);
        self.scope.host().defer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish();
            }
        });
        tracing::debug!(id = %self.id.borrow(), "drag ended");
        self.scope.store().clear_data();
    }

    fn finish(&self) {
        let data = self.data.borrow().clone();
        let on_end = self.on_end.borrow().clone();
        if let Some(on_end) = on_end {
            on_end(&data);
        }
    }
}

impl<T> Drop for SourceInner<T> {
    fn drop(&mut self) {
        self.unbind();
    }
}
