//! Shared setup for the integration tests: an in-memory database, a
//! recording event bus and a scripted GitHub API.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use huddle::app_context::AppContext;
use huddle::auth::{Actor, AuthTokenCodec};
use huddle::database::entities::{organizations, team_members, teams, users};
use huddle::database::establish_connection;
use huddle::database::migrations::Migrator;
use huddle::errors::{IntegrationError, IntegrationResult};
use huddle::integrations::{GitHubApi, RepositoryInfo, WebhookInfo};
use huddle::pubsub::RecordingEventBus;
use huddle::request_context::RequestContext;

pub const MUTATOR_ID: &str = "tab-1";

/// GitHub stand-in that counts calls and fails on request.
#[derive(Default)]
pub struct FakeGitHub {
    pub repository_lookups: AtomicUsize,
    pub webhooks_created: AtomicUsize,
    pub fail_lookup: AtomicBool,
    pub fail_webhook: AtomicBool,
    next_webhook_id: AtomicI64,
}

impl FakeGitHub {
    pub fn lookups(&self) -> usize {
        self.repository_lookups.load(Ordering::SeqCst)
    }

    pub fn webhooks(&self) -> usize {
        self.webhooks_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn fetch_repository(
        &self,
        _access_token: &str,
        name_with_owner: &str,
    ) -> IntegrationResult<RepositoryInfo> {
        self.repository_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(IntegrationError::Upstream {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        Ok(RepositoryInfo {
            id: 7,
            full_name: name_with_owner.to_string(),
            private: false,
            default_branch: Some("main".to_string()),
            html_url: Some(format!("https://github.com/{}", name_with_owner)),
        })
    }

    async fn create_webhook(
        &self,
        _access_token: &str,
        _name_with_owner: &str,
        _callback_url: &str,
    ) -> IntegrationResult<WebhookInfo> {
        if self.fail_webhook.load(Ordering::SeqCst) {
            return Err(IntegrationError::Upstream {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        self.webhooks_created.fetch_add(1, Ordering::SeqCst);
        let id = 1000 + self.next_webhook_id.fetch_add(1, Ordering::SeqCst);
        Ok(WebhookInfo { id })
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub bus: RecordingEventBus,
    pub github: Arc<FakeGitHub>,
    pub app: Arc<AppContext>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let bus = RecordingEventBus::new();
        let github = Arc::new(FakeGitHub::default());
        let tokens = Arc::new(AuthTokenCodec::new(
            b"integration-test-secret",
            chrono::Duration::hours(1),
        ));
        let app = Arc::new(AppContext::new(
            db.clone(),
            Arc::new(bus.clone()),
            tokens,
            github.clone(),
            "http://localhost:4000/webhooks/github",
        ));

        Self {
            db,
            bus,
            github,
            app,
        }
    }

    /// Insert a user directly, skipping password hashing.
    pub async fn user(&self, name: &str) -> users::Model {
        let email = format!("{}@example.com", name.to_lowercase());
        users::ActiveModel::new(&email, name, String::new())
            .insert(&self.db)
            .await
            .unwrap()
    }

    /// A fresh request for `user`, with its own loader.
    pub fn ctx(&self, user: &users::Model) -> RequestContext {
        self.app
            .request_context(Actor::user(user.id.clone()), Some(MUTATOR_ID.to_string()))
    }

    pub fn anonymous(&self) -> RequestContext {
        self.app.request_context(Actor::anonymous(), None)
    }

    pub async fn org(&self, leader: &users::Model) -> organizations::Model {
        self.app
            .accounts()
            .create_organization(&self.ctx(leader), "Acme")
            .await
            .unwrap()
    }

    /// An organization led by `lead` holding one team that `lead` leads.
    pub async fn team(&self, lead: &users::Model) -> teams::Model {
        let org = self.org(lead).await;
        let (team, _) = self
            .app
            .teams()
            .add_team(&self.ctx(lead), &org.id, "Core")
            .await
            .unwrap();
        team
    }

    /// Invite `user` on behalf of `inviter` and accept as `user`.
    pub async fn join(
        &self,
        team: &teams::Model,
        inviter: &users::Model,
        user: &users::Model,
    ) -> team_members::Model {
        let invite = self
            .app
            .team_members()
            .invite_to_team(&self.ctx(inviter), &team.id, &user.email)
            .await
            .unwrap();
        self.app
            .team_members()
            .accept_team_invitation(&self.ctx(user), &invite.invitation.unwrap().id)
            .await
            .unwrap()
            .team_member
    }
}
