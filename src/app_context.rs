use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{Actor, AuthTokenCodec};
use crate::errors::{CoreError, CoreResult};
use crate::integrations::GitHubApi;
use crate::pubsub::EventBus;
use crate::request_context::RequestContext;
use crate::services::{
    AccountService, GitHubService, NotificationService, ProjectService, TeamMemberService,
    TeamService,
};

/// Shared application context exposing the services to the GraphQL and HTTP layers.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    bus: Arc<dyn EventBus>,
    tokens: Arc<AuthTokenCodec>,
    account_service: Arc<AccountService>,
    team_service: Arc<TeamService>,
    team_member_service: Arc<TeamMemberService>,
    notification_service: Arc<NotificationService>,
    project_service: Arc<ProjectService>,
    github_service: Arc<GitHubService>,
}

impl AppContext {
    pub fn new(
        db: DatabaseConnection,
        bus: Arc<dyn EventBus>,
        tokens: Arc<AuthTokenCodec>,
        github_api: Arc<dyn GitHubApi>,
        webhook_callback_url: impl Into<String>,
    ) -> Self {
        let account_service = Arc::new(AccountService::new(db.clone(), Arc::clone(&tokens)));
        let team_service = Arc::new(TeamService::new(db.clone()));
        let team_member_service = Arc::new(TeamMemberService::new(db.clone()));
        let notification_service = Arc::new(NotificationService::new(db.clone()));
        let project_service = Arc::new(ProjectService::new(db.clone()));
        let github_service = Arc::new(GitHubService::new(
            db.clone(),
            github_api,
            webhook_callback_url,
        ));

        Self {
            db,
            bus,
            tokens,
            account_service,
            team_service,
            team_member_service,
            notification_service,
            project_service,
            github_service,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    pub fn tokens(&self) -> &Arc<AuthTokenCodec> {
        &self.tokens
    }

    pub fn accounts(&self) -> &AccountService {
        &self.account_service
    }

    pub fn teams(&self) -> &TeamService {
        &self.team_service
    }

    pub fn team_members(&self) -> &TeamMemberService {
        &self.team_member_service
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notification_service
    }

    pub fn projects(&self) -> &ProjectService {
        &self.project_service
    }

    pub fn github(&self) -> &GitHubService {
        &self.github_service
    }

    /// Resolve an `Authorization` header value. No header means anonymous.
    pub fn authenticate(&self, header: Option<&str>) -> CoreResult<Actor> {
        self.tokens
            .actor_from_header(header)
            .map_err(CoreError::from)
    }

    /// Fresh per-request context with its own loader.
    pub fn request_context(&self, actor: Actor, mutator_id: Option<String>) -> RequestContext {
        RequestContext::new(actor, self.db.clone(), Arc::clone(&self.bus), mutator_id)
    }
}
