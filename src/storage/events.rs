use tokio::sync::broadcast::{self, error::RecvError};

use crate::constants::storage::FAVORITES_KEY;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoritesEvent {
    /// a favorite was added or removed through the store.
    Updated,
    /// a key in local storage was written.
    StorageChanged { key: String },
}

impl FavoritesEvent {
    pub fn touches_favorites(&self) -> bool {
        match self {
            FavoritesEvent::Updated => true,
            FavoritesEvent::StorageChanged { key } => key == FAVORITES_KEY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<FavoritesEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        EventBus { sender }
    }

    pub fn publish(&self, event: FavoritesEvent) {
        // no subscribers is fine, nobody is looking at a list right now
        if let Ok(receivers) = self.sender.send(event.clone()) {
            tracing::trace!(?event, receivers, "published favorites event");
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(32)
    }
}

#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<FavoritesEvent>,
}

impl Subscription {
    /// waits for the next event. returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<FavoritesEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "favorites subscriber lagged behind");
                Some(FavoritesEvent::Updated)
            }
            Err(RecvError::Closed) => None,
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(FavoritesEvent::Updated);

        assert_eq!(first.recv().await, Some(FavoritesEvent::Updated));
        assert_eq!(second.recv().await, Some(FavoritesEvent::Updated));
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_receiver() {
        let bus = EventBus::default();
        let subscription = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(bus.subscriber_count(), 0);

        // publishing into an empty bus is not an error
        bus.publish(FavoritesEvent::Updated);
    }

    #[tokio::test]
    async fn lagging_subscriber_is_told_to_refresh() {
        let bus = EventBus::new(1);
        let mut subscription = bus.subscribe();

        bus.publish(FavoritesEvent::StorageChanged { key: "deviceId".into() });
        bus.publish(FavoritesEvent::StorageChanged { key: "deviceId".into() });

        assert_eq!(subscription.recv().await, Some(FavoritesEvent::Updated));
    }

    #[tokio::test]
    async fn closed_bus_ends_the_subscription() {
        let bus = EventBus::default();
        let mut subscription = bus.subscribe();
        drop(bus);

        assert_eq!(subscription.recv().await, None);
    }

    #[test]
    fn only_favorites_keys_trigger_refresh() {
        assert!(FavoritesEvent::Updated.touches_favorites());
        assert!(FavoritesEvent::StorageChanged { key: FAVORITES_KEY.into() }.touches_favorites());
        assert!(!FavoritesEvent::StorageChanged { key: "deviceId".into() }.touches_favorites());
    }
}
