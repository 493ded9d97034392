use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{GitHubRepo, Notification, Project, Team, TeamMember, User};

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    /// The authenticated caller
    async fn viewer(&self, ctx: &Context<'_>) -> Result<User> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let user = context
            .app
            .accounts()
            .viewer(&request)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(User::from(user))
    }

    /// A team visible to its members and to the organization's leaders
    async fn team(&self, ctx: &Context<'_>, team_id: String) -> Result<Team> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let team = context
            .app
            .teams()
            .get_team(&request, &team_id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(Team::from(team))
    }

    /// The caller's active, non-archived teams
    async fn teams(&self, ctx: &Context<'_>) -> Result<Vec<Team>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let teams = context
            .app
            .teams()
            .list_teams(&request)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(teams.into_iter().map(Team::from).collect())
    }

    async fn team_members(&self, ctx: &Context<'_>, team_id: String) -> Result<Vec<TeamMember>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let members = context
            .app
            .teams()
            .team_members(&request, &team_id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(members.into_iter().map(TeamMember::from).collect())
    }

    /// The caller's notifications, newest first
    async fn notifications(&self, ctx: &Context<'_>) -> Result<Vec<Notification>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let notifications = context
            .app
            .notifications()
            .list(&request)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(notifications.into_iter().map(Notification::from).collect())
    }

    async fn projects(&self, ctx: &Context<'_>, team_id: String) -> Result<Vec<Project>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let projects = context
            .app
            .projects()
            .list_projects(&request, &team_id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(projects.into_iter().map(Project::from).collect())
    }

    /// Active repository links of a team
    #[graphql(name = "githubRepos")]
    async fn github_repos(&self, ctx: &Context<'_>, team_id: String) -> Result<Vec<GitHubRepo>> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let repos = context
            .app
            .github()
            .list_repos(&request, &team_id)
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(repos.into_iter().map(GitHubRepo::from).collect())
    }
}
