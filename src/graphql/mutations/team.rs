use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{
    respond, AddTeamPayload, ArchiveTeamPayload, Notification, Team, TeamMember,
    UpdateTeamPayload,
};

#[derive(Default)]
pub struct TeamMutation;

#[Object]
impl TeamMutation {
    /// Create a team in an organization with the caller as its lead
    async fn add_team(
        &self,
        ctx: &Context<'_>,
        org_id: String,
        name: String,
    ) -> Result<AddTeamPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context.app.teams().add_team(&request, &org_id, &name).await;

        respond(result, |(team, team_member)| AddTeamPayload {
            team: Some(Team::from(team)),
            team_member: Some(TeamMember::from(team_member)),
            ..Default::default()
        })
    }

    async fn update_team_name(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        name: String,
    ) -> Result<UpdateTeamPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .teams()
            .update_team_name(&request, &team_id, &name)
            .await;

        respond(result, |team| UpdateTeamPayload {
            team: Some(Team::from(team)),
            ..Default::default()
        })
    }

    /// Archive a team. A team with no projects and a single member is
    /// deleted outright.
    async fn archive_team(&self, ctx: &Context<'_>, team_id: String) -> Result<ArchiveTeamPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context.app.teams().archive_team(&request, &team_id).await;

        respond(result, |archived| ArchiveTeamPayload {
            team: Some(Team::from(archived.team)),
            hard_deleted: archived.hard_deleted,
            notifications: archived
                .notifications
                .into_iter()
                .map(Notification::from)
                .collect(),
            ..Default::default()
        })
    }
}
