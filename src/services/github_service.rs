//! Team integration with GitHub: provider links and repositories.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::database::entities::integration_providers::IntegrationService;
use crate::database::entities::{
    github_repos, integration_providers, GithubRepos, IntegrationProviders,
};
use crate::errors::{CoreError, CoreResult};
use crate::integrations::github::parse_name_with_owner;
use crate::integrations::GitHubApi;
use crate::pubsub::{LiveUpdate, Topic, TopicKind};
use crate::request_context::RequestContext;

/// How the detached webhook registration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Registered { webhook_id: i64 },
    /// The repository already had a hook from an earlier registration
    AlreadyRegistered { webhook_id: i64 },
    Failed { message: String },
}

#[derive(Debug)]
pub struct AddedGitHubRepo {
    pub repo: github_repos::Model,
    /// An existing row was reactivated instead of inserting a new one
    pub rehydrated: bool,
    /// Resolves once the background webhook registration finishes
    pub webhook: oneshot::Receiver<WebhookOutcome>,
}

#[derive(Clone)]
pub struct GitHubService {
    db: DatabaseConnection,
    api: Arc<dyn GitHubApi>,
    webhook_callback_url: String,
}

impl GitHubService {
    pub fn new(
        db: DatabaseConnection,
        api: Arc<dyn GitHubApi>,
        webhook_callback_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            api,
            webhook_callback_url: webhook_callback_url.into(),
        }
    }

    async fn find_provider(
        &self,
        team_id: &str,
        service: IntegrationService,
    ) -> CoreResult<Option<integration_providers::Model>> {
        Ok(IntegrationProviders::find()
            .filter(integration_providers::Column::TeamId.eq(team_id))
            .filter(integration_providers::Column::Service.eq(service.as_str()))
            .one(&self.db)
            .await?)
    }

    async fn find_repo(&self, github_repo_id: &str) -> CoreResult<github_repos::Model> {
        GithubRepos::find_by_id(github_repo_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("GitHubRepo", github_repo_id))
    }

    /// Link the team to a provider account, reactivating an earlier link.
    pub async fn add_provider(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        service: IntegrationService,
        access_token: &str,
        provider_user_name: &str,
    ) -> CoreResult<integration_providers::Model> {
        let user_id = ctx.authorization().require_team_member(team_id).await?;
        if access_token.trim().is_empty() {
            return Err(CoreError::validation("Access token cannot be empty"));
        }

        let provider = match self.find_provider(team_id, service).await? {
            Some(existing) => {
                let active: integration_providers::ActiveModel = existing.into();
                active
                    .rehydrate(user_id, access_token, provider_user_name)
                    .update(&self.db)
                    .await
            }
            None => {
                integration_providers::ActiveModel::new(
                    team_id,
                    user_id,
                    service,
                    access_token,
                    provider_user_name,
                )
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| CoreError::database("save integration provider", e))?;

        info!("Team {} linked to {} as {}", team_id, service.as_str(), provider_user_name);
        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::ProviderUpdated {
                provider: provider.clone(),
            },
        )
        .await;
        Ok(provider)
    }

    /// Deactivate the team's provider link and every repository using it.
    pub async fn remove_provider(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        service: IntegrationService,
    ) -> CoreResult<integration_providers::Model> {
        ctx.authorization().require_team_member(team_id).await?;
        let provider = self
            .find_provider(team_id, service)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CoreError::validation("GitHub provider not found"))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;
        let active: integration_providers::ActiveModel = provider.into();
        let provider = active.deactivate().update(&txn).await?;
        let mut removed = Vec::new();
        if service == IntegrationService::GitHub {
            let repos = GithubRepos::find()
                .filter(github_repos::Column::TeamId.eq(team_id))
                .filter(github_repos::Column::IsActive.eq(true))
                .all(&txn)
                .await?;
            for repo in repos {
                let active: github_repos::ActiveModel = repo.into();
                removed.push(active.deactivate().update(&txn).await?);
            }
        }
        txn.commit()
            .await
            .map_err(|e| CoreError::database("remove integration provider", e))?;

        info!(
            "Team {} unlinked from {} ({} repos deactivated)",
            team_id,
            service.as_str(),
            removed.len()
        );
        ctx.publish(
            Topic::team(team_id),
            LiveUpdate::ProviderUpdated {
                provider: provider.clone(),
            },
        )
        .await;
        for repo in &removed {
            ctx.publish_feature(
                Topic::github_repo_removed(team_id),
                TopicKind::GithubRepoRemoved.as_str(),
                repo,
            )
            .await;
        }
        Ok(provider)
    }

    /// Link a repository to the team.
    ///
    /// Keyed by (team, `owner/name`): adding a repository that was linked
    /// before reactivates that row. The webhook is registered by a detached
    /// task after commit; its outcome arrives on [`AddedGitHubRepo::webhook`]
    /// and never affects the result.
    pub async fn add_github_repo(
        &self,
        ctx: &RequestContext,
        team_id: &str,
        name_with_owner: &str,
    ) -> CoreResult<AddedGitHubRepo> {
        let user_id = ctx.authorization().require_team_member(team_id).await?;

        let provider = self
            .find_provider(team_id, IntegrationService::GitHub)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CoreError::validation("GitHub provider not found"))?;
        parse_name_with_owner(name_with_owner)?;

        let info = self
            .api
            .fetch_repository(&provider.access_token, name_with_owner)
            .await
            .map_err(|e| {
                warn!("GitHub lookup of {} failed: {}", name_with_owner, e);
                CoreError::from(e)
            })?;
        let name_with_owner = info.full_name.as_str();

        // A concurrent add of the same repository wins the insert; this one
        // then finds its row and rehydrates it
        let (repo, rehydrated) = match self.save_repo(team_id, name_with_owner, user_id).await {
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!("{} was added concurrently, rehydrating", name_with_owner);
                self.save_repo(team_id, name_with_owner, user_id).await
            }
            saved => saved,
        }
        .map_err(|e| CoreError::database("save github repo", e))?;

        info!(
            "Team {} {} {}",
            team_id,
            if rehydrated { "rehydrated" } else { "added" },
            repo.name_with_owner
        );

        let webhook = self.spawn_webhook_registration(provider.access_token.clone(), repo.clone());

        ctx.publish_feature(
            Topic::github_repo_added(team_id),
            TopicKind::GithubRepoAdded.as_str(),
            &repo,
        )
        .await;

        Ok(AddedGitHubRepo {
            repo,
            rehydrated,
            webhook,
        })
    }

    /// Rehydrate the team's row for the repository or insert a new one.
    /// Returns the row and whether it already existed.
    async fn save_repo(
        &self,
        team_id: &str,
        name_with_owner: &str,
        user_id: &str,
    ) -> Result<(github_repos::Model, bool), DbErr> {
        let txn = self.db.begin().await?;
        let existing = GithubRepos::find()
            .filter(github_repos::Column::TeamId.eq(team_id))
            .filter(github_repos::Column::NameWithOwner.eq(name_with_owner))
            .one(&txn)
            .await?;
        let saved = match existing {
            Some(repo) => (repo.rehydrate(user_id).update(&txn).await?, true),
            None => {
                let repo = github_repos::ActiveModel::new(team_id, name_with_owner, user_id)
                    .insert(&txn)
                    .await?;
                (repo, false)
            }
        };
        txn.commit().await?;
        Ok(saved)
    }

    fn spawn_webhook_registration(
        &self,
        access_token: String,
        repo: github_repos::Model,
    ) -> oneshot::Receiver<WebhookOutcome> {
        let (done, outcome) = oneshot::channel();

        if let Some(webhook_id) = repo.webhook_id {
            let _ = done.send(WebhookOutcome::AlreadyRegistered { webhook_id });
            return outcome;
        }

        let api = Arc::clone(&self.api);
        let db = self.db.clone();
        let callback_url = self.webhook_callback_url.clone();
        tokio::spawn(async move {
            let result = api
                .create_webhook(&access_token, &repo.name_with_owner, &callback_url)
                .await;
            let outcome = match result {
                Ok(hook) => match repo.with_webhook(hook.id).update(&db).await {
                    Ok(_) => {
                        debug!("Webhook {} registered for {}", hook.id, repo.name_with_owner);
                        WebhookOutcome::Registered {
                            webhook_id: hook.id,
                        }
                    }
                    Err(e) => {
                        warn!("Could not record webhook for {}: {}", repo.name_with_owner, e);
                        WebhookOutcome::Failed {
                            message: e.to_string(),
                        }
                    }
                },
                Err(e) => {
                    warn!("Webhook registration for {} failed: {}", repo.name_with_owner, e);
                    WebhookOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            };
            // The caller may have dropped the receiver
            let _ = done.send(outcome);
        });

        outcome
    }

    pub async fn remove_github_repo(
        &self,
        ctx: &RequestContext,
        github_repo_id: &str,
    ) -> CoreResult<github_repos::Model> {
        ctx.authorization().require_authenticated()?;
        let repo = self.find_repo(github_repo_id).await?;
        ctx.authorization()
            .require_team_member(&repo.team_id)
            .await?;

        let active: github_repos::ActiveModel = repo.into();
        let repo = active
            .deactivate()
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("remove github repo", e))?;

        ctx.publish_feature(
            Topic::github_repo_removed(&repo.team_id),
            TopicKind::GithubRepoRemoved.as_str(),
            &repo,
        )
        .await;
        Ok(repo)
    }

    pub async fn join_integration(
        &self,
        ctx: &RequestContext,
        github_repo_id: &str,
    ) -> CoreResult<github_repos::Model> {
        ctx.authorization().require_authenticated()?;
        let repo = self.find_repo(github_repo_id).await?;
        let user_id = ctx
            .authorization()
            .require_team_member(&repo.team_id)
            .await?;
        if !repo.is_active {
            return Err(CoreError::validation("Integration is not active"));
        }
        if repo.has_user(user_id) {
            return Ok(repo);
        }

        let repo = repo
            .with_user(user_id)
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("join integration", e))?;

        ctx.publish_feature(
            Topic::github_repo_added(&repo.team_id),
            TopicKind::GithubRepoAdded.as_str(),
            &repo,
        )
        .await;
        Ok(repo)
    }

    /// Leave a repository integration; the last user out deactivates it.
    pub async fn leave_integration(
        &self,
        ctx: &RequestContext,
        github_repo_id: &str,
    ) -> CoreResult<github_repos::Model> {
        ctx.authorization().require_authenticated()?;
        let repo = self.find_repo(github_repo_id).await?;
        let user_id = ctx
            .authorization()
            .require_team_member(&repo.team_id)
            .await?;
        if !repo.has_user(user_id) {
            return Err(CoreError::validation("Not a member of this integration"));
        }

        let repo = repo
            .without_user(user_id)
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("leave integration", e))?;

        if !repo.is_active {
            ctx.publish_feature(
                Topic::github_repo_removed(&repo.team_id),
                TopicKind::GithubRepoRemoved.as_str(),
                &repo,
            )
            .await;
        }
        Ok(repo)
    }

    pub async fn list_repos(
        &self,
        ctx: &RequestContext,
        team_id: &str,
    ) -> CoreResult<Vec<github_repos::Model>> {
        ctx.authorization().require_team_member(team_id).await?;
        Ok(GithubRepos::find()
            .filter(github_repos::Column::TeamId.eq(team_id))
            .filter(github_repos::Column::IsActive.eq(true))
            .order_by_asc(github_repos::Column::NameWithOwner)
            .all(&self.db)
            .await?)
    }
}
