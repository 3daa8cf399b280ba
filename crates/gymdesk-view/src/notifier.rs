// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Listener = Rc<dyn Fn(bool)>;

/// Token returned by [`SelectionFlag::subscribe`]. Only meaningful for the
/// flag that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
struct FlagInner {
    value: Cell<bool>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

/// Observable per-record `is_selected` flag.
///
/// Clones share the same flag, so the UI layer can hold a handle and toggle
/// it while the owning controller listens for changes. Listeners run
/// synchronously on the calling thread and only when the value changes.
#[derive(Clone, Default)]
pub struct SelectionFlag {
    inner: Rc<FlagInner>,
}

impl SelectionFlag {
    pub fn new(value: bool) -> Self {
        let flag = Self::default();
        flag.inner.value.set(value);
        flag
    }

    pub fn get(&self) -> bool {
        self.inner.value.get()
    }

    /// Stores `value` and notifies listeners. Returns whether the value changed.
    pub fn set(&self, value: bool) -> bool {
        if self.inner.value.replace(value) == value {
            return false;
        }

        // Listeners may unsubscribe while being notified.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
        true
    }

    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }

    pub fn subscribe(&self, listener: impl Fn(bool) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription(id)
    }

    /// Removes a listener. Unknown or already-released tokens are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.0);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl fmt::Debug for SelectionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionFlag")
            .field("value", &self.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionFlag;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn listeners_fire_only_on_change() {
        let flag = SelectionFlag::new(false);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        flag.subscribe(move |_| seen.set(seen.get() + 1));

        assert!(flag.set(true));
        assert!(!flag.set(true));
        assert!(flag.set(false));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications_and_is_idempotent() {
        let flag = SelectionFlag::default();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let subscription = flag.subscribe(move |_| seen.set(seen.get() + 1));
        assert_eq!(flag.listener_count(), 1);

        assert!(flag.unsubscribe(subscription));
        assert!(!flag.unsubscribe(subscription));
        assert_eq!(flag.listener_count(), 0);

        flag.toggle();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn clones_share_value_and_listeners() {
        let flag = SelectionFlag::new(false);
        let handle = flag.clone();
        let last = Rc::new(Cell::new(None));
        let sink = Rc::clone(&last);
        flag.subscribe(move |value| sink.set(Some(value)));

        handle.set(true);
        assert!(flag.get());
        assert_eq!(last.get(), Some(true));
        assert_eq!(handle.listener_count(), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_notification() {
        let flag = SelectionFlag::default();
        let slot = Rc::new(Cell::new(None));
        let handle = flag.clone();
        let own = Rc::clone(&slot);
        let subscription = flag.subscribe(move |_| {
            if let Some(token) = own.get() {
                handle.unsubscribe(token);
            }
        });
        slot.set(Some(subscription));

        flag.set(true);
        assert_eq!(flag.listener_count(), 0);
    }
}
