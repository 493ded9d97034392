use std::pin::Pin;

use async_graphql::*;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::database::ids::team_member_id;
use crate::pubsub::{Event, EventStream, LiveUpdate, Topic};

pub type EnvelopeStream = Pin<Box<dyn Stream<Item = Json<Event>> + Send>>;

#[derive(Default)]
pub struct Subscription;

/// Forward every envelope published on the subscribed topics.
fn envelopes(mut events: EventStream, label: String) -> EnvelopeStream {
    let stream = async_stream::stream! {
        while let Some(event) = events.next().await {
            yield Json(event);
        }
        debug!("Event stream for {} closed", label);
    };
    Box::pin(stream)
}

/// End `events` after the removal of `team_member_id` has been delivered.
fn until_removed(mut events: EventStream, team_member_id: String) -> EventStream {
    let stream = async_stream::stream! {
        while let Some(event) = events.next().await {
            let removed = matches!(
                event.live_update(),
                Some(LiveUpdate::TeamMemberRemoved { team_member, .. }) if team_member.id == team_member_id
            );
            yield event;
            if removed {
                debug!("{} left the team, closing its event stream", team_member_id);
                break;
            }
        }
    };
    Box::pin(stream)
}

#[Subscription]
impl Subscription {
    /// Membership, rename, archival and provider changes of a team
    /// The stream ends once the subscriber is removed from the team.
    async fn team_events(&self, ctx: &Context<'_>, team_id: String) -> Result<EnvelopeStream> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let user_id = request
            .authorization()
            .require_org_leader_or_team_member(&team_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        let topic = Topic::team(&team_id);
        let events = context.app.bus().subscribe(&topic).await;
        let events = until_removed(events, team_member_id(user_id, &team_id));
        Ok(envelopes(events, topic.to_string()))
    }

    /// Notifications for the caller, plus teams they were added to
    async fn notification_events(&self, ctx: &Context<'_>) -> Result<EnvelopeStream> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let user_id = request
            .authorization()
            .require_authenticated()
            .map_err(core_error_to_graphql_error)?;

        let notifications = Topic::notification(user_id);
        let memberships = Topic::team_member(user_id);
        let label = notifications.to_string();
        let events = futures_util::stream::select(
            context.app.bus().subscribe(&notifications).await,
            context.app.bus().subscribe(&memberships).await,
        );
        Ok(envelopes(Box::pin(events), label))
    }

    async fn project_events(&self, ctx: &Context<'_>, team_id: String) -> Result<EnvelopeStream> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        request
            .authorization()
            .require_team_member(&team_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        let topic = Topic::project(&team_id);
        let events = context.app.bus().subscribe(&topic).await;
        Ok(envelopes(events, topic.to_string()))
    }

    /// Repository links added to or removed from a team
    #[graphql(name = "githubRepoEvents")]
    async fn github_repo_events(
        &self,
        ctx: &Context<'_>,
        team_id: String,
    ) -> Result<EnvelopeStream> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        request
            .authorization()
            .require_team_member(&team_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        let added = Topic::github_repo_added(&team_id);
        let removed = Topic::github_repo_removed(&team_id);
        let events = futures_util::stream::select(
            context.app.bus().subscribe(&added).await,
            context.app.bus().subscribe(&removed).await,
        );
        Ok(envelopes(Box::pin(events), format!("{} / {}", added, removed)))
    }
}
