//! Event Bus
//!
//! Typed publish/subscribe channel for cross-component notifications.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::i18n::Language;

/// Notifications shared between components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Profile picture changed
    AvatarUpdated { headshot_url: String },
    /// Signed in or out
    AuthChanged {
        signed_in: bool,
        username: Option<String>,
    },
    /// Interface language changed
    LanguageChanged { language: Language },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AvatarUpdated { .. } => "avatar-updated",
            Self::AuthChanged { .. } => "auth-change",
            Self::LanguageChanged { .. } => "language-change",
        }
    }
}

/// Receiving end handed to a subscriber
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<AppEvent>,
}

impl Subscription {
    /// Drain every event published since the last call
    pub fn drain(&self) -> Vec<AppEvent> {
        self.rx.try_iter().collect()
    }
}

/// Fan-out bus; subscribers that were dropped are pruned on publish
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<AppEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn publish(&mut self, event: AppEvent) {
        tracing::debug!(event = event.name(), subscribers = self.subscribers.len(), "publish");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(AppEvent::AvatarUpdated {
            headshot_url: "https://cdn.example/p.png".to_string(),
        });

        for sub in [&a, &b] {
            assert_eq!(
                sub.drain(),
                vec![AppEvent::AvatarUpdated {
                    headshot_url: "https://cdn.example/p.png".to_string()
                }]
            );
        }
    }

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut bus = EventBus::new();
        let sub = bus.subscribe();

        bus.publish(AppEvent::AuthChanged { signed_in: true, username: Some("mia".into()) });
        bus.publish(AppEvent::AuthChanged { signed_in: false, username: None });

        let events = sub.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "auth-change");
        assert!(matches!(events[1], AppEvent::AuthChanged { signed_in: false, .. }));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscribers.len(), 2);

        bus.publish(AppEvent::LanguageChanged { language: Language::Japanese });
        assert_eq!(bus.subscribers.len(), 1);
        assert_eq!(keep.drain().len(), 1);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let mut bus = EventBus::new();
        bus.publish(AppEvent::AuthChanged { signed_in: true, username: None });
        let late = bus.subscribe();
        assert!(late.drain().is_empty());
    }
}
