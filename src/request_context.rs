use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::Actor;
use crate::data_loader::RequestLoader;
use crate::database::entities::notifications;
use crate::pubsub::{Event, EventBus, LiveUpdate, Topic};
use crate::services::AuthorizationService;

/// Everything a mutation needs to know about the request that issued it.
/// Built once per inbound request and passed explicitly to every service.
pub struct RequestContext {
    pub actor: Actor,
    pub loader: RequestLoader,
    /// Connection that originated the request, echoed on published events.
    pub mutator_id: Option<String>,
    bus: Arc<dyn EventBus>,
}

impl RequestContext {
    pub fn new(
        actor: Actor,
        db: DatabaseConnection,
        bus: Arc<dyn EventBus>,
        mutator_id: Option<String>,
    ) -> Self {
        Self {
            actor,
            loader: RequestLoader::new(db),
            mutator_id,
            bus,
        }
    }

    pub fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.actor, &self.loader)
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    pub fn operation_id(&self) -> &str {
        self.loader.share()
    }

    pub async fn publish(&self, topic: Topic, data: LiveUpdate) -> usize {
        debug!("{} on {}", data.type_name(), topic);
        let event = Event::Update {
            data,
            operation_id: self.operation_id().to_string(),
            mutator_id: self.mutator_id.clone(),
        };
        self.bus.publish(&topic, event).await
    }

    pub async fn publish_notification(&self, notification: &notifications::Model) -> usize {
        self.publish(
            Topic::notification(&notification.user_id),
            LiveUpdate::NotificationAdded {
                notification: notification.clone(),
            },
        )
        .await
    }

    /// Publish on a feature channel as `{"<name>": payload, "mutatorId": ..}`.
    pub async fn publish_feature<T: Serialize + Sync>(
        &self,
        topic: Topic,
        name: &str,
        payload: &T,
    ) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Dropping {} event on {}: {}", name, topic, e);
                return 0;
            }
        };
        let event = Event::Feature {
            name: name.to_string(),
            payload,
            mutator_id: self.mutator_id.clone(),
        };
        self.bus.publish(&topic, event).await
    }
}
