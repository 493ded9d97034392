use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub preferred_name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub tms: String, // JSON: ids of teams with an active membership
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(email: &str, preferred_name: &str, password_hash: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(short_id()),
            email: Set(email.to_string()),
            preferred_name: Set(preferred_name.to_string()),
            password_hash: Set(password_hash),
            tms: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl Model {
    pub fn tms(&self) -> Vec<String> {
        serde_json::from_str::<Vec<String>>(&self.tms).unwrap_or_default()
    }

    pub fn is_on_team(&self, team_id: &str) -> bool {
        self.tms().iter().any(|id| id == team_id)
    }

    /// Active model with `team_id` added to `tms`, or `None` when already present.
    pub fn join_tms(&self, team_id: &str) -> Option<ActiveModel> {
        let mut tms = self.tms();
        if tms.iter().any(|id| id == team_id) {
            return None;
        }
        tms.push(team_id.to_string());
        Some(self.with_tms(&tms))
    }

    /// Active model with `team_id` removed from `tms`, or `None` when absent.
    pub fn leave_tms(&self, team_id: &str) -> Option<ActiveModel> {
        let tms = self.tms();
        if !tms.iter().any(|id| id == team_id) {
            return None;
        }
        let remaining: Vec<String> = tms.into_iter().filter(|id| id != team_id).collect();
        Some(self.with_tms(&remaining))
    }

    fn with_tms(&self, tms: &[String]) -> ActiveModel {
        let mut active: ActiveModel = self.clone().into();
        active.tms = Set(serde_json::to_string(tms).unwrap_or_else(|_| "[]".to_string()));
        active.updated_at = Set(chrono::Utc::now());
        active
    }
}
