/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Single-threaded reactive values.
//!
//! A [`Store`] holds a value and pushes every change to its subscribers. A
//! [`Derived`] computes its value from one or two other readables and
//! recomputes synchronously whenever one of them changes, but only while
//! somebody is subscribed to it.
//!
//! Every subscription is represented by a [`Subscription`] handle. Dropping
//! the handle (or calling [`Subscription::unsubscribe`]) detaches the
//! callback; from that point on it is never invoked again. A subscription
//! to a [`Derived`] also keeps that derivation wired to its sources, so the
//! `Derived` value itself may be dropped once subscribed.
//!
//! ```ignore
//! let enabled = Store::new(true);
//! let label = derived(&enabled, |on| if on { "on" } else { "off" });
//! let _sub = label.subscribe(Box::new(|v| log::info!("avatar video is {v}")));
//! enabled.set(false);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

/// A value that can be read and observed.
pub trait Readable<T> {
    /// Current value.
    fn get(&self) -> T;

    /// Registers `callback`; it is invoked immediately with the current
    /// value and then on every change until the returned handle is dropped.
    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription;
}

/// Handle that keeps a callback attached to a [`Readable`].
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// A handle that is not attached to anything.
    pub fn noop() -> Self {
        Self {
            cancel: RefCell::new(None),
        }
    }

    /// Detaches the callback. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct SubscriberList<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<T>)>>,
}

impl<T> SubscriberList<T> {
    fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    fn add(&self, callback: Callback<T>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    // Callbacks may subscribe or unsubscribe while being notified, so the
    // list is copied before anyone is called.
    fn snapshot(&self) -> Vec<Callback<T>> {
        self.entries
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

struct StoreInner<T> {
    value: RefCell<T>,
    subscribers: SubscriberList<T>,
    notifying: Cell<bool>,
    pending: Cell<bool>,
}

impl<T: Clone> StoreInner<T> {
    fn notify(&self) {
        if self.notifying.get() {
            // Delivered by the pass that is already running.
            self.pending.set(true);
            return;
        }
        self.notifying.set(true);
        loop {
            self.pending.set(false);
            let value = self.value.borrow().clone();
            for callback in self.subscribers.snapshot() {
                callback(&value);
            }
            if !self.pending.get() {
                break;
            }
        }
        self.notifying.set(false);
    }
}

/// A writable reactive value.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                value: RefCell::new(value),
                subscribers: SubscriberList::new(),
                notifying: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    /// Replaces the value and notifies every subscriber.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.notify();
    }

    /// Mutates the value in place and notifies every subscriber.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.inner.value.borrow_mut());
        self.inner.notify();
    }

    /// Notifies subscribers with the unchanged value.
    pub fn touch(&self) {
        self.inner.notify();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakStore<T> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning counterpart of [`Store`].
pub struct WeakStore<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T> Clone for WeakStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakStore<T> {
    pub fn upgrade(&self) -> Option<Store<T>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<T: Clone + 'static> Readable<T> for Store<T> {
    fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        let callback: Callback<T> = Rc::from(callback);
        let id = self.inner.subscribers.add(callback.clone());
        let current = self.inner.value.borrow().clone();
        callback(&current);

        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.subscribers.remove(id);
            }
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Derived
// ---------------------------------------------------------------------------

type Connector<T> = Box<dyn Fn(Weak<DerivedInner<T>>) -> Vec<Subscription>>;

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T>,
    connect: Connector<T>,
    value: RefCell<Option<T>>,
    subscribers: SubscriberList<T>,
    upstream: RefCell<Vec<Subscription>>,
    wiring: Cell<bool>,
    busy: Cell<bool>,
    dirty: Cell<bool>,
}

impl<T: Clone + 'static> DerivedInner<T> {
    fn attach(self: &Rc<Self>) {
        // Sources call back immediately on subscribe; those calls are
        // folded into the single evaluation below.
        self.wiring.set(true);
        let upstream = (self.connect)(Rc::downgrade(self));
        *self.upstream.borrow_mut() = upstream;
        self.wiring.set(false);

        self.busy.set(true);
        let value = (self.compute)();
        *self.value.borrow_mut() = Some(value);
        self.busy.set(false);
    }

    fn detach(&self) {
        let upstream = std::mem::take(&mut *self.upstream.borrow_mut());
        drop(upstream);
        *self.value.borrow_mut() = None;
    }

    fn invalidate(&self) {
        if self.wiring.get() || self.subscribers.len() == 0 {
            return;
        }
        if self.busy.get() {
            self.dirty.set(true);
            return;
        }
        self.busy.set(true);
        loop {
            self.dirty.set(false);
            let next = (self.compute)();
            *self.value.borrow_mut() = Some(next.clone());
            for callback in self.subscribers.snapshot() {
                callback(&next);
            }
            if !self.dirty.get() || self.subscribers.len() == 0 {
                break;
            }
        }
        self.busy.set(false);
    }
}

/// A value computed from other readables.
///
/// Created with [`derived`] or [`derived2`].
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Derived<T> {
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Whether the derivation is currently attached to its sources.
    pub fn is_connected(&self) -> bool {
        !self.inner.upstream.borrow().is_empty()
    }
}

impl<T: Clone + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        if let Some(value) = self.inner.value.borrow().as_ref() {
            return value.clone();
        }
        (self.inner.compute)()
    }

    fn subscribe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        let callback: Callback<T> = Rc::from(callback);
        let first = self.inner.subscribers.len() == 0;
        let id = self.inner.subscribers.add(callback.clone());
        if first {
            self.inner.attach();
        }
        let current = self.get();
        callback(&current);

        // The handle keeps the derivation alive; its sources only hold it
        // weakly.
        let inner = self.inner.clone();
        Subscription::new(move || {
            inner.subscribers.remove(id);
            if inner.subscribers.len() == 0 {
                inner.detach();
            }
        })
    }
}

impl<T> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("subscribers", &self.inner.subscribers.len())
            .field("connected", &!self.inner.upstream.borrow().is_empty())
            .finish()
    }
}

fn watch<A, T, R>(source: &R) -> impl Fn(Weak<DerivedInner<T>>) -> Subscription
where
    A: 'static,
    T: Clone + 'static,
    R: Readable<A> + Clone + 'static,
{
    let source = source.clone();
    move |inner: Weak<DerivedInner<T>>| {
        source.subscribe(Box::new(move |_: &A| {
            if let Some(inner) = inner.upgrade() {
                inner.invalidate();
            }
        }))
    }
}

fn build<T: Clone + 'static>(compute: Box<dyn Fn() -> T>, connect: Connector<T>) -> Derived<T> {
    Derived {
        inner: Rc::new(DerivedInner {
            compute,
            connect,
            value: RefCell::new(None),
            subscribers: SubscriberList::new(),
            upstream: RefCell::new(Vec::new()),
            wiring: Cell::new(false),
            busy: Cell::new(false),
            dirty: Cell::new(false),
        }),
    }
}

/// Derives a value from a single source.
pub fn derived<A, T, R, F>(source: &R, f: F) -> Derived<T>
where
    A: 'static,
    T: Clone + 'static,
    R: Readable<A> + Clone + 'static,
    F: Fn(A) -> T + 'static,
{
    let reader = source.clone();
    let watch_source = watch::<A, T, R>(source);
    build(
        Box::new(move || f(reader.get())),
        Box::new(move |inner: Weak<DerivedInner<T>>| vec![watch_source(inner)]),
    )
}

/// Derives a value from two sources; recomputes when either changes.
pub fn derived2<A, B, T, RA, RB, F>(a: &RA, b: &RB, f: F) -> Derived<T>
where
    A: 'static,
    B: 'static,
    T: Clone + 'static,
    RA: Readable<A> + Clone + 'static,
    RB: Readable<B> + Clone + 'static,
    F: Fn(A, B) -> T + 'static,
{
    let reader_a = a.clone();
    let reader_b = b.clone();
    let watch_a = watch::<A, T, RA>(a);
    let watch_b = watch::<B, T, RB>(b);
    build(
        Box::new(move || f(reader_a.get(), reader_b.get())),
        Box::new(move |inner: Weak<DerivedInner<T>>| {
            vec![watch_a(inner.clone()), watch_b(inner)]
        }),
    )
}
