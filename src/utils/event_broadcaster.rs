use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Keyed fan-out over tokio broadcast channels.
///
/// One channel per key, created on first use. Events published to a key
/// reach only the receivers subscribed at that moment; nothing is retained
/// for later subscribers. Channels without receivers are dropped by
/// [`EventBroadcaster::cleanup_idle`].
///
/// ```rust,no_run
/// use huddle::utils::EventBroadcaster;
///
/// # async fn example() {
/// let broadcaster = EventBroadcaster::<String, String>::new(64);
/// let mut receiver = broadcaster.subscribe("Team.t1".to_string()).await;
/// broadcaster.publish("Team.t1".to_string(), "renamed".to_string()).await;
/// assert_eq!(receiver.recv().await.unwrap(), "renamed");
/// # }
/// ```
pub struct EventBroadcaster<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    channels: Arc<RwLock<HashMap<K, broadcast::Sender<V>>>>,
    buffer_size: usize,
}

impl<K, V> EventBroadcaster<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// `buffer_size` bounds how far a slow receiver may lag before it starts
    /// missing events.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }

    pub async fn subscribe(&self, key: K) -> broadcast::Receiver<V> {
        self.get_or_create(key).await.subscribe()
    }

    /// Deliver `event` to the current subscribers of `key` and return how
    /// many received it. Publishing to a key nobody listens on is a no-op
    /// and does not allocate a channel.
    pub async fn publish(&self, key: K, event: V) -> usize {
        let sender = {
            let channels = self.channels.read().await;
            match channels.get(&key) {
                Some(sender) => sender.clone(),
                None => return 0,
            }
        };
        sender.send(event).unwrap_or(0)
    }

    pub async fn receiver_count(&self, key: &K) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(key)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Remove all channels with no active receivers; returns how many went.
    pub async fn cleanup_idle(&self) -> usize {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    async fn get_or_create(&self, key: K) -> broadcast::Sender<V> {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&key) {
                return sender.clone();
            }
        }

        let mut channels = self.channels.write().await;

        // Another task may have created it while we waited for the write lock
        if let Some(sender) = channels.get(&key) {
            sender.clone()
        } else {
            let (sender, _) = broadcast::channel(self.buffer_size);
            channels.insert(key, sender.clone());
            sender
        }
    }
}

impl<K, V> Clone for EventBroadcaster<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            buffer_size: self.buffer_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_and_publish() {
        let broadcaster = EventBroadcaster::<String, String>::new(10);
        let mut receiver = broadcaster.subscribe("Team.t1".to_string()).await;

        let delivered = broadcaster
            .publish("Team.t1".to_string(), "renamed".to_string())
            .await;
        assert_eq!(delivered, 1);
        assert_eq!(receiver.recv().await.unwrap(), "renamed");
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive() {
        let broadcaster = EventBroadcaster::<String, i32>::new(10);
        let mut first = broadcaster.subscribe("k".to_string()).await;
        let mut second = broadcaster.subscribe("k".to_string()).await;

        assert_eq!(broadcaster.publish("k".to_string(), 42).await, 2);
        assert_eq!(first.recv().await.unwrap(), 42);
        assert_eq!(second.recv().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let broadcaster = EventBroadcaster::<&'static str, i32>::new(10);
        assert_eq!(broadcaster.publish("k", 1).await, 0);
        assert_eq!(broadcaster.channel_count().await, 0);

        let mut receiver = broadcaster.subscribe("k").await;
        broadcaster.publish("k", 2).await;
        assert_eq!(receiver.recv().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let broadcaster = EventBroadcaster::<&'static str, i32>::new(10);
        let mut team = broadcaster.subscribe("Team.t1").await;
        let _other = broadcaster.subscribe("Team.t2").await;

        broadcaster.publish("Team.t2", 7).await;
        broadcaster.publish("Team.t1", 8).await;
        assert_eq!(team.recv().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn cleanup_idle_drops_unused_channels() {
        let broadcaster = EventBroadcaster::<i32, String>::new(10);
        {
            let _receiver = broadcaster.subscribe(1).await;
            assert_eq!(broadcaster.receiver_count(&1).await, 1);
        }
        assert_eq!(broadcaster.receiver_count(&1).await, 0);
        assert_eq!(broadcaster.publish(1, "x".to_string()).await, 0);

        assert_eq!(broadcaster.cleanup_idle().await, 1);
        assert_eq!(broadcaster.channel_count().await, 0);
    }
}
