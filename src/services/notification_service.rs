use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};

use crate::database::entities::{notifications, Notifications};
use crate::errors::{CoreError, CoreResult};
use crate::pubsub::{LiveUpdate, Topic};
use crate::request_context::RequestContext;

#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The caller's notifications, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> CoreResult<Vec<notifications::Model>> {
        let user_id = ctx.actor.require_user_id()?;
        Ok(Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::StartAt)
            .all(&self.db)
            .await?)
    }

    pub async fn clear(&self, ctx: &RequestContext, notification_id: &str) -> CoreResult<String> {
        let user_id = ctx.actor.require_user_id()?;
        let notification = Notifications::find_by_id(notification_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Notification", notification_id))?;
        if notification.user_id != user_id {
            return Err(CoreError::forbidden("Notification belongs to another user"));
        }

        notification
            .delete(&self.db)
            .await
            .map_err(|e| CoreError::database("clear notification", e))?;

        ctx.publish(
            Topic::notification(user_id),
            LiveUpdate::NotificationCleared {
                notification_id: notification_id.to_string(),
            },
        )
        .await;
        Ok(notification_id.to_string())
    }
}
