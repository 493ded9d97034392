use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::info;

use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::AuthTokenCodec;
use crate::database::entities::organization_users::OrgRole;
use crate::database::entities::{organization_users, organizations, users, Users};
use crate::errors::{AuthError, CoreError, CoreResult};
use crate::request_context::RequestContext;
use crate::services::ValidationService;

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: users::Model,
    pub auth_token: String,
}

#[derive(Clone)]
pub struct AccountService {
    db: DatabaseConnection,
    tokens: Arc<AuthTokenCodec>,
}

impl AccountService {
    pub fn new(db: DatabaseConnection, tokens: Arc<AuthTokenCodec>) -> Self {
        Self { db, tokens }
    }

    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        preferred_name: &str,
    ) -> CoreResult<AuthenticatedUser> {
        let email = ValidationService::normalize_email(email)?;
        validate_password(password)?;
        let preferred_name = match preferred_name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };

        let existing = Users::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("find user by email", e))?;
        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = hash_password(password)?;
        let user = users::ActiveModel::new(&email, &preferred_name, password_hash)
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::database("create user", e))?;

        info!("Created account {}", user.id);
        let auth_token = self.tokens.issue(&user.id, user.tms())?;
        Ok(AuthenticatedUser { user, auth_token })
    }

    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthenticatedUser> {
        let email = email.trim().to_lowercase();
        let user = Users::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("find user by email", e))?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let auth_token = self.tokens.issue(&user.id, user.tms())?;
        Ok(AuthenticatedUser { user, auth_token })
    }

    pub async fn viewer(&self, ctx: &RequestContext) -> CoreResult<users::Model> {
        let user_id = ctx.actor.require_user_id()?;
        let user = ctx
            .loader
            .users()
            .load(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
        Ok(user.as_ref().clone())
    }

    /// New organization with the caller as its leader.
    pub async fn create_organization(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> CoreResult<organizations::Model> {
        let user_id = ctx.actor.require_user_id()?;
        let name = ValidationService::validate_org_name(name)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::database("begin transaction", e))?;
        let organization = organizations::ActiveModel::new(&name).insert(&txn).await?;
        organization_users::ActiveModel::new(&organization.id, user_id, OrgRole::Leader)
            .insert(&txn)
            .await?;
        txn.commit()
            .await
            .map_err(|e| CoreError::database("create organization", e))?;

        info!("User {} created organization {}", user_id, organization.id);
        Ok(organization)
    }
}
