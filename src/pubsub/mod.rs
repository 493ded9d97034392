//! Publish/subscribe seam between mutations and live subscribers.
//!
//! Services never reach for a global channel registry; they receive an
//! [`EventBus`] through the request context so tests can swap in
//! [`RecordingEventBus`].

pub mod broadcast;
pub mod event;
pub mod recording;
pub mod topic;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

pub use broadcast::BroadcastEventBus;
pub use event::{Event, LiveUpdate};
pub use recording::RecordingEventBus;
pub use topic::{Topic, TopicKind};

pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Deliver `event` to everyone subscribed to `topic` right now and
    /// return how many subscribers received it.
    async fn publish(&self, topic: &Topic, event: Event) -> usize;

    /// Events published on `topic` from this point on.
    async fn subscribe(&self, topic: &Topic) -> EventStream;
}
