use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{respond, ClearNotificationPayload};

#[derive(Default)]
pub struct NotificationMutation;

#[Object]
impl NotificationMutation {
    async fn clear_notification(
        &self,
        ctx: &Context<'_>,
        notification_id: String,
    ) -> Result<ClearNotificationPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .notifications()
            .clear(&request, &notification_id)
            .await;

        respond(result, |notification_id| ClearNotificationPayload {
            notification_id: Some(notification_id),
            ..Default::default()
        })
    }
}
