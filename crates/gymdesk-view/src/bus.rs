// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gymdesk_app::ScreenKind;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Data changes other screens may care about (a removed supplier, a
/// reloaded member list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DataEvent {
    Loaded { screen: ScreenKind, count: usize },
    Upserted { screen: ScreenKind, id: i64 },
    Removed { screen: ScreenKind, ids: Vec<i64> },
}

impl DataEvent {
    pub const fn screen(&self) -> ScreenKind {
        match self {
            Self::Loaded { screen, .. }
            | Self::Upserted { screen, .. }
            | Self::Removed { screen, .. } => *screen,
        }
    }
}

/// Application-scoped publish/subscribe channel. Cloning yields another
/// handle to the same bus; it is created once at startup and handed to every
/// controller.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Sender<DataEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<DataEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber and forgets the ones whose
    /// receiver has been dropped. Returns the number of deliveries.
    pub fn publish(&self, event: DataEvent) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::trace!(
            screen = event.screen().as_str(),
            subscribers = subscribers.len(),
            "data event published"
        );
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::{DataEvent, EventBus};
    use gymdesk_app::ScreenKind;

    #[test]
    fn every_subscriber_receives_published_events() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.clone().subscribe();

        let delivered = bus.publish(DataEvent::Removed {
            screen: ScreenKind::Members,
            ids: vec![3],
        });

        assert_eq!(delivered, 2);
        for rx in [first, second] {
            assert_eq!(
                rx.try_recv().ok(),
                Some(DataEvent::Removed {
                    screen: ScreenKind::Members,
                    ids: vec![3],
                })
            );
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(DataEvent::Loaded {
            screen: ScreenKind::Products,
            count: 0,
        });

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_iter().count(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        let delivered = bus.publish(DataEvent::Upserted {
            screen: ScreenKind::Suppliers,
            id: 9,
        });
        assert_eq!(delivered, 0);
    }
}
