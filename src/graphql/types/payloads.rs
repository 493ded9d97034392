//! Mutation payloads. Each carries the affected entities on success or a
//! [`StandardMutationError`] when the operation was refused.

use async_graphql::*;

use crate::errors::CoreResult;
use crate::graphql::errors::{payload_error, StandardMutationError};
use crate::graphql::types::{
    GitHubRepo, IntegrationProvider, Notification, Organization, Project, Team, TeamInvitation,
    TeamMember, User,
};

pub trait MutationPayload: Default {
    fn failed(error: StandardMutationError) -> Self;
}

/// Build a payload from a service result. Only internal failures escape as
/// GraphQL errors.
pub fn respond<T, P, F>(result: CoreResult<T>, build: F) -> Result<P>
where
    P: MutationPayload,
    F: FnOnce(T) -> P,
{
    match result {
        Ok(value) => Ok(build(value)),
        Err(err) => Ok(P::failed(payload_error(err)?)),
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct AuthPayload {
    pub error: Option<StandardMutationError>,
    #[graphql(name = "authToken")]
    pub auth_token: Option<String>,
    pub user: Option<User>,
}

impl MutationPayload for AuthPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct CreateOrganizationPayload {
    pub error: Option<StandardMutationError>,
    pub organization: Option<Organization>,
}

impl MutationPayload for CreateOrganizationPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct AddTeamPayload {
    pub error: Option<StandardMutationError>,
    pub team: Option<Team>,
    #[graphql(name = "teamMember")]
    pub team_member: Option<TeamMember>,
}

impl MutationPayload for AddTeamPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct UpdateTeamPayload {
    pub error: Option<StandardMutationError>,
    pub team: Option<Team>,
}

impl MutationPayload for UpdateTeamPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// `hardDeleted` is set when the team had no projects and a single member.
#[derive(SimpleObject, Default, Clone, Debug)]
pub struct ArchiveTeamPayload {
    pub error: Option<StandardMutationError>,
    pub team: Option<Team>,
    #[graphql(name = "hardDeleted")]
    pub hard_deleted: bool,
    pub notifications: Vec<Notification>,
}

impl MutationPayload for ArchiveTeamPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct InviteToTeamPayload {
    pub error: Option<StandardMutationError>,
    pub invitation: Option<TeamInvitation>,
    /// Set instead of `invitation` when a removed member was reactivated
    #[graphql(name = "teamMember")]
    pub team_member: Option<TeamMember>,
    pub rejoined: bool,
}

impl MutationPayload for InviteToTeamPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// `rejoined` is set when an earlier membership was reactivated.
#[derive(SimpleObject, Default, Clone, Debug)]
pub struct AcceptTeamInvitationPayload {
    pub error: Option<StandardMutationError>,
    pub team: Option<Team>,
    #[graphql(name = "teamMember")]
    pub team_member: Option<TeamMember>,
    pub rejoined: bool,
}

impl MutationPayload for AcceptTeamInvitationPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct RemoveTeamMemberPayload {
    pub error: Option<StandardMutationError>,
    #[graphql(name = "teamMember")]
    pub team_member: Option<TeamMember>,
    #[graphql(name = "reassignedProjectIds")]
    pub reassigned_project_ids: Vec<String>,
}

impl MutationPayload for RemoveTeamMemberPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct PromoteToTeamLeadPayload {
    pub error: Option<StandardMutationError>,
    #[graphql(name = "oldLead")]
    pub old_lead: Option<TeamMember>,
    #[graphql(name = "newLead")]
    pub new_lead: Option<TeamMember>,
}

impl MutationPayload for PromoteToTeamLeadPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct ProjectPayload {
    pub error: Option<StandardMutationError>,
    pub project: Option<Project>,
}

impl MutationPayload for ProjectPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct ClearNotificationPayload {
    pub error: Option<StandardMutationError>,
    #[graphql(name = "notificationId")]
    pub notification_id: Option<String>,
}

impl MutationPayload for ClearNotificationPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct ProviderPayload {
    pub error: Option<StandardMutationError>,
    pub provider: Option<IntegrationProvider>,
}

impl MutationPayload for ProviderPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// `rehydrated` is set when an earlier link to the repository was reactivated.
#[derive(SimpleObject, Default, Clone, Debug)]
pub struct AddGitHubRepoPayload {
    pub error: Option<StandardMutationError>,
    pub repo: Option<GitHubRepo>,
    pub rehydrated: bool,
}

impl MutationPayload for AddGitHubRepoPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(SimpleObject, Default, Clone, Debug)]
pub struct GitHubRepoPayload {
    pub error: Option<StandardMutationError>,
    pub repo: Option<GitHubRepo>,
}

impl MutationPayload for GitHubRepoPayload {
    fn failed(error: StandardMutationError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreError;
    use crate::graphql::errors::ErrorCode;

    #[test]
    fn refused_operations_fill_only_the_error() {
        let payload: ProjectPayload = respond(
            Err::<(), _>(CoreError::forbidden("Not on team")),
            |_| ProjectPayload::default(),
        )
        .unwrap();
        let error = payload.error.unwrap();
        assert_eq!(error.code, ErrorCode::Forbidden);
        assert!(payload.project.is_none());
    }

    #[test]
    fn internal_failures_escape() {
        let result: Result<ProjectPayload> = respond(
            Err::<(), _>(CoreError::internal("Database error")),
            |_| ProjectPayload::default(),
        );
        assert!(result.is_err());
    }
}
