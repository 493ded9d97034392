use crate::auth::Actor;
use crate::data_loader::RequestLoader;
use crate::database::entities::organization_users::organization_user_id;
use crate::database::ids::team_member_id;
use crate::errors::{CoreError, CoreResult};

/// Membership and role predicates for one request's actor.
///
/// `is_*` answer the question; `require_*` turn a `false` into a
/// `Forbidden` error (or `Unauthorized` for anonymous callers). Lookups go
/// through the request loader, so checking the same team twice costs one
/// query. Super users pass every predicate.
pub struct AuthorizationService<'a> {
    actor: &'a Actor,
    loader: &'a RequestLoader,
}

impl<'a> AuthorizationService<'a> {
    pub fn new(actor: &'a Actor, loader: &'a RequestLoader) -> Self {
        Self { actor, loader }
    }

    pub fn require_authenticated(&self) -> CoreResult<&'a str> {
        self.actor.require_user_id()
    }

    pub async fn is_team_member(&self, team_id: &str) -> CoreResult<bool> {
        if self.actor.is_super_user() {
            return Ok(true);
        }
        let Some(user_id) = self.actor.user_id.as_deref() else {
            return Ok(false);
        };
        let member = self
            .loader
            .team_members()
            .load(&team_member_id(user_id, team_id))
            .await?;
        Ok(member.map(|m| m.is_active()).unwrap_or(false))
    }

    pub async fn is_team_lead(&self, team_id: &str) -> CoreResult<bool> {
        if self.actor.is_super_user() {
            return Ok(true);
        }
        let Some(user_id) = self.actor.user_id.as_deref() else {
            return Ok(false);
        };
        let member = self
            .loader
            .team_members()
            .load(&team_member_id(user_id, team_id))
            .await?;
        Ok(member.map(|m| m.is_active_lead()).unwrap_or(false))
    }

    pub async fn is_org_member(&self, org_id: &str) -> CoreResult<bool> {
        if self.actor.is_super_user() {
            return Ok(true);
        }
        let Some(user_id) = self.actor.user_id.as_deref() else {
            return Ok(false);
        };
        let row = self
            .loader
            .organization_users()
            .load(&organization_user_id(user_id, org_id))
            .await?;
        Ok(row.is_some())
    }

    pub async fn is_org_leader(&self, org_id: &str) -> CoreResult<bool> {
        if self.actor.is_super_user() {
            return Ok(true);
        }
        let Some(user_id) = self.actor.user_id.as_deref() else {
            return Ok(false);
        };
        let row = self
            .loader
            .organization_users()
            .load(&organization_user_id(user_id, org_id))
            .await?;
        Ok(row.map(|r| r.is_leader()).unwrap_or(false))
    }

    /// True for members of the team and for leaders of the team's org.
    pub async fn is_org_leader_or_team_member(&self, team_id: &str) -> CoreResult<bool> {
        if self.is_team_member(team_id).await? {
            return Ok(true);
        }
        match self.loader.teams().load(team_id).await? {
            Some(team) => self.is_org_leader(&team.org_id).await,
            None => Ok(false),
        }
    }

    pub async fn require_team_member(&self, team_id: &str) -> CoreResult<&'a str> {
        let user_id = self.require_authenticated()?;
        if !self.is_team_member(team_id).await? {
            return Err(CoreError::forbidden("Not on team"));
        }
        Ok(user_id)
    }

    pub async fn require_team_lead(&self, team_id: &str) -> CoreResult<&'a str> {
        let user_id = self.require_authenticated()?;
        if !self.is_team_lead(team_id).await? {
            return Err(CoreError::forbidden("Not team lead"));
        }
        Ok(user_id)
    }

    pub async fn require_org_member(&self, org_id: &str) -> CoreResult<&'a str> {
        let user_id = self.require_authenticated()?;
        if !self.is_org_member(org_id).await? {
            return Err(CoreError::forbidden("Not on organization"));
        }
        Ok(user_id)
    }

    pub async fn require_org_leader(&self, org_id: &str) -> CoreResult<&'a str> {
        let user_id = self.require_authenticated()?;
        if !self.is_org_leader(org_id).await? {
            return Err(CoreError::forbidden("Not organization leader"));
        }
        Ok(user_id)
    }

    pub async fn require_org_leader_or_team_member(&self, team_id: &str) -> CoreResult<&'a str> {
        let user_id = self.require_authenticated()?;
        if !self.is_org_leader_or_team_member(team_id).await? {
            return Err(CoreError::forbidden(
                "Not organization leader or team member",
            ));
        }
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SUPER_USER_ROLE;
    use crate::database::entities::{organization_users, team_members, teams, users};
    use crate::database::migrations::Migrator;
    use crate::errors::CoreErrorKind;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (DatabaseConnection, users::Model, teams::Model) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let user = users::ActiveModel::new("lead@example.com", "Lead", String::new())
            .insert(&db)
            .await
            .unwrap();
        let team = teams::ActiveModel::new("o1", "Core").insert(&db).await.unwrap();
        team_members::ActiveModel::new(&team.id, &user, true)
            .insert(&db)
            .await
            .unwrap();
        organization_users::ActiveModel::new(
            "o1",
            &user.id,
            organization_users::OrgRole::Member,
        )
        .insert(&db)
        .await
        .unwrap();
        (db, user, team)
    }

    #[tokio::test]
    async fn members_pass_and_outsiders_are_forbidden() {
        let (db, user, team) = setup().await;
        let loader = RequestLoader::new(db);

        let member = Actor::user(user.id.clone());
        let auth = AuthorizationService::new(&member, &loader);
        assert!(auth.is_team_member(&team.id).await.unwrap());
        assert!(auth.is_team_lead(&team.id).await.unwrap());
        assert!(auth.is_org_member("o1").await.unwrap());
        assert!(!auth.is_org_leader("o1").await.unwrap());
        let err = auth.require_org_leader("o1").await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Forbidden);

        let outsider = Actor::user("someone-else");
        let auth = AuthorizationService::new(&outsider, &loader);
        let err = auth.require_team_member(&team.id).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Forbidden);
        assert!(!auth.is_org_leader_or_team_member(&team.id).await.unwrap());
    }

    #[tokio::test]
    async fn anonymous_callers_are_unauthorized() {
        let (db, _, team) = setup().await;
        let loader = RequestLoader::new(db);
        let anonymous = Actor::anonymous();
        let auth = AuthorizationService::new(&anonymous, &loader);

        let err = auth.require_team_lead(&team.id).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn super_users_bypass_predicates() {
        let (db, _, team) = setup().await;
        let loader = RequestLoader::new(db);
        let su = Actor::user("ops").with_role(SUPER_USER_ROLE);
        let auth = AuthorizationService::new(&su, &loader);

        assert!(auth.require_team_lead(&team.id).await.is_ok());
        assert_eq!(loader.fetch_count(), 0);
    }

    #[tokio::test]
    async fn repeated_checks_hit_the_loader_cache() {
        let (db, user, team) = setup().await;
        let loader = RequestLoader::new(db);
        let actor = Actor::user(user.id.clone());
        let auth = AuthorizationService::new(&actor, &loader);

        auth.require_team_member(&team.id).await.unwrap();
        auth.require_team_lead(&team.id).await.unwrap();
        assert_eq!(loader.team_members().fetch_count(), 1);
    }
}
