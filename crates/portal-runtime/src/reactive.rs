#![forbid(unsafe_code)]

//! Change notification with explicit teardown.
//!
//! Listeners are registered with [`Emitter::subscribe`] (or
//! [`Observable::subscribe`]) and receive a [`Subscription`] handle. The
//! handle is the disposer: calling [`Subscription::dispose`] or dropping it
//! removes the listener. A [`DisposeBag`] collects the handles owned by one
//! view so all of them are released together, exactly once, at teardown.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); the owning event
//! loop is the only mutator.
//!
//! # Invariants
//!
//! 1. A disposed listener is never invoked again.
//! 2. Listeners may subscribe or dispose from inside a callback; the
//!    listener set is snapshotted before each emission.
//! 3. [`Observable`] versions advance only when the value actually changes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle for a registered listener. Releasing it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(disposer: impl FnOnce() + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Remove the listener now.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.disposer.is_some())
            .finish()
    }
}

/// Owns the subscriptions of one view and releases them together.
#[derive(Debug, Default)]
pub struct DisposeBag {
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

impl DisposeBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a subscription.
    ///
    /// Adding to an already disposed bag releases the subscription at once.
    pub fn add(&mut self, subscription: Subscription) {
        if self.disposed {
            subscription.dispose();
        } else {
            self.subscriptions.push(subscription);
        }
    }

    /// Release every held subscription. Returns how many were released;
    /// later calls release nothing.
    pub fn dispose_all(&mut self) -> usize {
        self.disposed = true;
        let count = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        count
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Multicast event source.
pub struct Emitter<T> {
    listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }
}

impl<T: 'static> Emitter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `value` to every current listener, in registration order.
    pub fn emit(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

/// A shared value with versioned change notification.
pub struct Observable<T> {
    value: Rc<RefCell<T>>,
    version: Rc<Cell<u64>>,
    changes: Emitter<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            version: Rc::clone(&self.version),
            changes: self.changes.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            version: Rc::new(Cell::new(0)),
            changes: Emitter::new(),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replace the value. Equal values are ignored.
    pub fn set(&self, value: T) {
        if *self.value.borrow() == value {
            return;
        }
        *self.value.borrow_mut() = value.clone();
        self.version.set(self.version.get() + 1);
        self.changes.emit(&value);
    }

    /// Subscribe to changes of the value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value.borrow())
            .field("version", &self.version.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<i32>>>, impl Fn(&i32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &i32| sink.borrow_mut().push(*value))
    }

    #[test]
    fn emitter_delivers_until_disposed() {
        let emitter = Emitter::new();
        let (seen, callback) = recorder();
        let subscription = emitter.subscribe(callback);
        emitter.emit(&1);
        subscription.dispose();
        emitter.emit(&2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let emitter = Emitter::new();
        let (seen, callback) = recorder();
        {
            let _subscription = emitter.subscribe(callback);
            emitter.emit(&7);
        }
        emitter.emit(&8);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn dispose_bag_releases_exactly_once() {
        let emitter = Emitter::new();
        let (seen, callback) = recorder();
        let mut bag = DisposeBag::new();
        bag.add(emitter.subscribe(callback));
        assert_eq!(bag.dispose_all(), 1);
        assert_eq!(bag.dispose_all(), 0);
        emitter.emit(&3);
        assert!(seen.borrow().is_empty());
        assert!(bag.is_disposed());
    }

    #[test]
    fn adding_to_disposed_bag_releases_immediately() {
        let emitter: Emitter<i32> = Emitter::new();
        let mut bag = DisposeBag::new();
        bag.dispose_all();
        bag.add(emitter.subscribe(|_| {}));
        assert!(bag.is_empty());
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_during_emit() {
        let emitter: Emitter<i32> = Emitter::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));
        let (slot_in, count_in) = (Rc::clone(&slot), Rc::clone(&count));
        let subscription = emitter.subscribe(move |_| {
            count_in.set(count_in.get() + 1);
            slot_in.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(subscription);
        emitter.emit(&1);
        emitter.emit(&2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter: Emitter<i32> = Emitter::new();
        let subscription = emitter.subscribe(|_| {});
        drop(emitter);
        subscription.dispose();
    }

    #[test]
    fn observable_versions_only_on_change() {
        let observable = Observable::new(1);
        let (seen, callback) = recorder();
        let _subscription = observable.subscribe(callback);
        observable.set(1);
        assert_eq!(observable.version(), 0);
        observable.set(5);
        assert_eq!(observable.version(), 1);
        assert_eq!(observable.get(), 5);
        assert_eq!(*seen.borrow(), vec![5]);
    }
}
