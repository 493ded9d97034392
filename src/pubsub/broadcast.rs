use std::time::Duration;

use async_trait::async_trait;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use super::{Event, EventBus, EventStream, Topic};
use crate::utils::EventBroadcaster;

const DEFAULT_BUFFER_SIZE: usize = 256;

/// In-process bus: one tokio broadcast channel per topic string.
#[derive(Clone)]
pub struct BroadcastEventBus {
    broadcaster: EventBroadcaster<String, Event>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            broadcaster: EventBroadcaster::new(buffer_size),
        }
    }

    pub async fn subscriber_count(&self, topic: &Topic) -> usize {
        self.broadcaster.receiver_count(&topic.to_string()).await
    }

    /// Periodically drop channels whose subscribers have all gone away.
    pub fn spawn_idle_cleanup(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = broadcaster.cleanup_idle().await;
                if removed > 0 {
                    debug!("Removed {} idle event channels", removed);
                }
            }
        })
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    async fn publish(&self, topic: &Topic, event: Event) -> usize {
        let delivered = self.broadcaster.publish(topic.to_string(), event).await;
        debug!("Published to {} ({} receivers)", topic, delivered);
        delivered
    }

    async fn subscribe(&self, topic: &Topic) -> EventStream {
        let receiver = self.broadcaster.subscribe(topic.to_string()).await;
        let topic = topic.to_string();
        let stream = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Subscriber on {} lagged, skipped {} events", topic, skipped);
                None
            }
        });
        Box::pin(stream)
    }
}
