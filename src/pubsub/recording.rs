use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BroadcastEventBus, Event, EventBus, EventStream, Topic, TopicKind};

/// Bus that keeps a log of every publish, in order, and still delivers to
/// live subscribers.
#[derive(Clone, Default)]
pub struct RecordingEventBus {
    inner: BroadcastEventBus,
    log: Arc<Mutex<Vec<(Topic, Event)>>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(Topic, Event)> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn published_on(&self, topic: &Topic) -> Vec<Event> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn count_kind(&self, kind: TopicKind) -> usize {
        self.published()
            .iter()
            .filter(|(topic, _)| topic.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish(&self, topic: &Topic, event: Event) -> usize {
        if let Ok(mut log) = self.log.lock() {
            log.push((topic.clone(), event.clone()));
        }
        self.inner.publish(topic, event).await
    }

    async fn subscribe(&self, topic: &Topic) -> EventStream {
        self.inner.subscribe(topic).await
    }
}
