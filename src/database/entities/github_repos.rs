use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

/// A repository linked to a team. Unique per (team_id, name_with_owner); a
/// removed repo is rehydrated rather than duplicated when added again.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "github_repos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub team_id: String,
    pub name_with_owner: String,
    pub admin_user_id: String,
    pub user_ids: String, // JSON: users who joined this integration
    pub is_active: bool,
    pub webhook_id: Option<i64>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Teams,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn encode_user_ids(user_ids: &[String]) -> String {
    serde_json::to_string(user_ids).unwrap_or_else(|_| "[]".to_string())
}

impl ActiveModel {
    pub fn new(team_id: &str, name_with_owner: &str, admin_user_id: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(short_id()),
            team_id: Set(team_id.to_string()),
            name_with_owner: Set(name_with_owner.to_string()),
            admin_user_id: Set(admin_user_id.to_string()),
            user_ids: Set(encode_user_ids(&[admin_user_id.to_string()])),
            is_active: Set(true),
            webhook_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn deactivate(mut self) -> Self {
        self.is_active = Set(false);
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}

impl Model {
    pub fn user_ids(&self) -> Vec<String> {
        serde_json::from_str::<Vec<String>>(&self.user_ids).unwrap_or_default()
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.user_ids().iter().any(|id| id == user_id)
    }

    /// Reactivate and make sure `user_id` is among the joined users.
    pub fn rehydrate(&self, user_id: &str) -> ActiveModel {
        let mut user_ids = self.user_ids();
        if !user_ids.iter().any(|id| id == user_id) {
            user_ids.push(user_id.to_string());
        }
        let mut active: ActiveModel = self.clone().into();
        active.is_active = Set(true);
        active.admin_user_id = Set(user_id.to_string());
        active.user_ids = Set(encode_user_ids(&user_ids));
        active.updated_at = Set(chrono::Utc::now());
        active
    }

    pub fn with_user(&self, user_id: &str) -> ActiveModel {
        let mut user_ids = self.user_ids();
        if !user_ids.iter().any(|id| id == user_id) {
            user_ids.push(user_id.to_string());
        }
        let mut active: ActiveModel = self.clone().into();
        active.user_ids = Set(encode_user_ids(&user_ids));
        active.updated_at = Set(chrono::Utc::now());
        active
    }

    /// Remove `user_id`; the repo deactivates when nobody is left.
    pub fn without_user(&self, user_id: &str) -> ActiveModel {
        let user_ids: Vec<String> = self
            .user_ids()
            .into_iter()
            .filter(|id| id != user_id)
            .collect();
        let mut active: ActiveModel = self.clone().into();
        if user_ids.is_empty() {
            active.is_active = Set(false);
        }
        active.user_ids = Set(encode_user_ids(&user_ids));
        active.updated_at = Set(chrono::Utc::now());
        active
    }

    pub fn with_webhook(&self, webhook_id: i64) -> ActiveModel {
        let mut active: ActiveModel = self.clone().into();
        active.webhook_id = Set(Some(webhook_id));
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn repo(user_ids: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: "r1".into(),
            team_id: "t1".into(),
            name_with_owner: "acme/api".into(),
            admin_user_id: "u1".into(),
            user_ids: user_ids.into(),
            is_active: false,
            webhook_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rehydrate_reactivates_without_duplicating_users() {
        let active = repo(r#"["u1"]"#).rehydrate("u1");
        assert_eq!(active.is_active, ActiveValue::Set(true));
        assert_eq!(active.user_ids, ActiveValue::Set(r#"["u1"]"#.to_string()));
    }

    #[test]
    fn last_user_leaving_deactivates() {
        let active = repo(r#"["u1"]"#).without_user("u1");
        assert_eq!(active.is_active, ActiveValue::Set(false));
        assert_eq!(active.user_ids, ActiveValue::Set("[]".to_string()));

        let still_used = repo(r#"["u1","u2"]"#).without_user("u1");
        assert_eq!(still_used.user_ids, ActiveValue::Set(r#"["u2"]"#.to_string()));
        assert!(matches!(still_used.is_active, ActiveValue::Unchanged(false)));
    }
}
