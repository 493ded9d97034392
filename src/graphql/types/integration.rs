use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::integration_providers::IntegrationService as ServiceKind;
use crate::database::entities::{github_repos, integration_providers};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum IntegrationService {
    #[graphql(name = "GITHUB")]
    GitHub,
}

impl From<IntegrationService> for ServiceKind {
    fn from(value: IntegrationService) -> Self {
        match value {
            IntegrationService::GitHub => ServiceKind::GitHub,
        }
    }
}

/// A team's link to a provider account. The access token is never exposed.
#[derive(SimpleObject, Clone, Debug)]
pub struct IntegrationProvider {
    pub id: String,
    #[graphql(name = "teamId")]
    pub team_id: String,
    #[graphql(name = "userId")]
    pub user_id: String,
    pub service: String,
    #[graphql(name = "providerUserName")]
    pub provider_user_name: String,
    #[graphql(name = "isActive")]
    pub is_active: bool,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<integration_providers::Model> for IntegrationProvider {
    fn from(model: integration_providers::Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            user_id: model.user_id,
            service: model.service,
            provider_user_name: model.provider_user_name,
            is_active: model.is_active,
            updated_at: model.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct GitHubRepo {
    pub id: String,
    #[graphql(name = "teamId")]
    pub team_id: String,
    #[graphql(name = "nameWithOwner")]
    pub name_with_owner: String,
    #[graphql(name = "adminUserId")]
    pub admin_user_id: String,
    #[graphql(name = "userIds")]
    pub user_ids: Vec<String>,
    #[graphql(name = "isActive")]
    pub is_active: bool,
    #[graphql(name = "webhookId")]
    pub webhook_id: Option<i64>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<github_repos::Model> for GitHubRepo {
    fn from(model: github_repos::Model) -> Self {
        let user_ids = model.user_ids();
        Self {
            id: model.id,
            team_id: model.team_id,
            name_with_owner: model.name_with_owner,
            admin_user_id: model.admin_user_id,
            user_ids,
            is_active: model.is_active,
            webhook_id: model.webhook_id,
            updated_at: model.updated_at,
        }
    }
}
