use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{
    respond, AcceptTeamInvitationPayload, InviteToTeamPayload, PromoteToTeamLeadPayload,
    RemoveTeamMemberPayload, Team, TeamInvitation, TeamMember,
};

#[derive(Default)]
pub struct TeamMemberMutation;

#[Object]
impl TeamMemberMutation {
    /// Invite someone by email. A removed member is reactivated right away.
    async fn invite_to_team(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        email: String,
    ) -> Result<InviteToTeamPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .team_members()
            .invite_to_team(&request, &team_id, &email)
            .await;

        respond(result, |invite| InviteToTeamPayload {
            invitation: invite.invitation.map(TeamInvitation::from),
            rejoined: invite.rejoined.is_some(),
            team_member: invite.rejoined.map(TeamMember::from),
            ..Default::default()
        })
    }

    /// Join a team from an invitation, reactivating an earlier membership if
    /// there is one
    async fn accept_team_invitation(
        &self,
        ctx: &Context<'_>,
        invitation_id: String,
    ) -> Result<AcceptTeamInvitationPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .team_members()
            .accept_team_invitation(&request, &invitation_id)
            .await;

        respond(result, |accepted| AcceptTeamInvitationPayload {
            team: Some(Team::from(accepted.team)),
            team_member: Some(TeamMember::from(accepted.team_member)),
            rejoined: accepted.rejoined,
            ..Default::default()
        })
    }

    async fn remove_team_member(
        &self,
        ctx: &Context<'_>,
        team_member_id: String,
    ) -> Result<RemoveTeamMemberPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .team_members()
            .remove_team_member(&request, &team_member_id)
            .await;

        respond(result, |removed| RemoveTeamMemberPayload {
            team_member: Some(TeamMember::from(removed.team_member)),
            reassigned_project_ids: removed.reassigned_project_ids,
            ..Default::default()
        })
    }

    async fn promote_to_team_lead(
        &self,
        ctx: &Context<'_>,
        team_member_id: String,
    ) -> Result<PromoteToTeamLeadPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .team_members()
            .promote_to_team_lead(&request, &team_member_id)
            .await;

        respond(result, |promoted| PromoteToTeamLeadPayload {
            old_lead: promoted.old_lead.map(TeamMember::from),
            new_lead: Some(TeamMember::from(promoted.new_lead)),
            ..Default::default()
        })
    }
}
