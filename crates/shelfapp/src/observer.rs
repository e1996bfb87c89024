//! # Listener Registry
//!
//! [`Observers`] is the subject half of a plain observer pattern, shared by the
//! drag [`crate::drag::EventBus`] and the [`crate::autosave::AutoSaveCoordinator`].
//!
//! ## Isolation
//!
//! A listener that panics is caught, logged at `error`, and skipped. The remaining
//! listeners still run and the notifying component's state is untouched: state is
//! always updated *before* notification, and the notification only ever sees an
//! immutable reference to a snapshot.
//!
//! ## Re-entrancy
//!
//! The listener list is copied before dispatch, so a listener may subscribe or
//! unsubscribe (itself included) while being notified. Changes take effect from the
//! next notification.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

pub struct Observers<T> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Listener<T>)>>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Invoke every listener in subscription order.
    ///
    /// Returns the number of listeners that panicked.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<(ListenerId, Listener<T>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        let mut failures = 0;
        for (id, listener) in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(value))) {
                failures += 1;
                tracing::error!(
                    listener = id.0,
                    reason = panic_message(panic.as_ref()),
                    "listener panicked; continuing with remaining listeners"
                );
            }
        }
        failures
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
