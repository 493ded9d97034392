use async_graphql::*;

use crate::graphql::context::{request_context, GraphQLContext};
use crate::graphql::types::{
    respond, AddGitHubRepoPayload, GitHubRepo, GitHubRepoPayload, IntegrationProvider,
    IntegrationService, ProviderPayload,
};

#[derive(Default)]
pub struct IntegrationMutation;

#[Object]
impl IntegrationMutation {
    /// Link the team to a provider account
    async fn add_provider(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        service: IntegrationService,
        access_token: String,
        provider_user_name: String,
    ) -> Result<ProviderPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .add_provider(
                &request,
                &team_id,
                service.into(),
                &access_token,
                &provider_user_name,
            )
            .await;

        respond(result, |provider| ProviderPayload {
            provider: Some(IntegrationProvider::from(provider)),
            ..Default::default()
        })
    }

    async fn remove_provider(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        service: IntegrationService,
    ) -> Result<ProviderPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .remove_provider(&request, &team_id, service.into())
            .await;

        respond(result, |provider| ProviderPayload {
            provider: Some(IntegrationProvider::from(provider)),
            ..Default::default()
        })
    }

    /// Link a GitHub repository to the team. Webhook registration continues
    /// in the background after this returns.
    #[graphql(name = "addGitHubRepo")]
    async fn add_github_repo(
        &self,
        ctx: &Context<'_>,
        team_id: String,
        name_with_owner: String,
    ) -> Result<AddGitHubRepoPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .add_github_repo(&request, &team_id, &name_with_owner)
            .await;

        // Dropping `added.webhook` leaves the registration task running
        respond(result, |added| AddGitHubRepoPayload {
            repo: Some(GitHubRepo::from(added.repo)),
            rehydrated: added.rehydrated,
            ..Default::default()
        })
    }

    #[graphql(name = "removeGitHubRepo")]
    async fn remove_github_repo(
        &self,
        ctx: &Context<'_>,
        github_repo_id: String,
    ) -> Result<GitHubRepoPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .remove_github_repo(&request, &github_repo_id)
            .await;

        respond(result, |repo| GitHubRepoPayload {
            repo: Some(GitHubRepo::from(repo)),
            ..Default::default()
        })
    }

    async fn join_integration(
        &self,
        ctx: &Context<'_>,
        github_repo_id: String,
    ) -> Result<GitHubRepoPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .join_integration(&request, &github_repo_id)
            .await;

        respond(result, |repo| GitHubRepoPayload {
            repo: Some(GitHubRepo::from(repo)),
            ..Default::default()
        })
    }

    /// Leave a repository integration; the last user out deactivates it
    async fn leave_integration(
        &self,
        ctx: &Context<'_>,
        github_repo_id: String,
    ) -> Result<GitHubRepoPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let request = request_context(ctx)?;
        let result = context
            .app
            .github()
            .leave_integration(&request, &github_repo_id)
            .await;

        respond(result, |repo| GitHubRepoPayload {
            repo: Some(GitHubRepo::from(repo)),
            ..Default::default()
        })
    }
}
