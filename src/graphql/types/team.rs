use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::{team_invitations, team_members, teams};
use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::User;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[graphql(name = "orgId")]
    pub org_id: String,
    #[graphql(name = "isArchived")]
    pub is_archived: bool,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<teams::Model> for Team {
    fn from(model: teams::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            org_id: model.org_id,
            is_archived: model.is_archived,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[ComplexObject]
impl Team {
    /// Active members, lead first
    #[graphql(name = "teamMembers")]
    async fn team_members(&self, ctx: &Context<'_>) -> Result<Vec<TeamMember>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let members = context
            .app
            .teams()
            .team_members(&request, &self.id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(members.into_iter().map(TeamMember::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct TeamMember {
    /// `<userId>::<teamId>`
    pub id: String,
    #[graphql(name = "teamId")]
    pub team_id: String,
    #[graphql(name = "userId")]
    pub user_id: String,
    #[graphql(name = "preferredName")]
    pub preferred_name: String,
    pub email: String,
    #[graphql(name = "isLead")]
    pub is_lead: bool,
    #[graphql(name = "isNotRemoved")]
    pub is_not_removed: bool,
}

impl From<team_members::Model> for TeamMember {
    fn from(model: team_members::Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            user_id: model.user_id,
            preferred_name: model.preferred_name,
            email: model.email,
            is_lead: model.is_lead,
            is_not_removed: model.is_not_removed,
        }
    }
}

#[ComplexObject]
impl TeamMember {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let request = request_context(ctx)?;
        let user = request
            .loader
            .users()
            .load(&self.user_id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(user.map(|user| User::from(user.as_ref().clone())))
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct TeamInvitation {
    pub id: String,
    #[graphql(name = "teamId")]
    pub team_id: String,
    pub email: String,
    #[graphql(name = "invitedBy")]
    pub invited_by: String,
    #[graphql(name = "acceptedAt")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<team_invitations::Model> for TeamInvitation {
    fn from(model: team_invitations::Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            email: model.email,
            invited_by: model.invited_by,
            accepted_at: model.accepted_at,
            created_at: model.created_at,
        }
    }
}
