use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub team_id: String,
    pub team_member_id: String,
    pub content: String,
    pub status: String, // "active", "stuck", "done", "future"
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Active,
    Stuck,
    Done,
    Future,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Stuck => "stuck",
            ProjectStatus::Done => "done",
            ProjectStatus::Future => "future",
        }
    }
}

impl ActiveModel {
    pub fn new(team_id: &str, team_member_id: &str, content: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(short_id()),
            team_id: Set(team_id.to_string()),
            team_member_id: Set(team_member_id.to_string()),
            content: Set(content.to_string()),
            status: Set(ProjectStatus::Active.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn reassign(mut self, team_member_id: &str) -> Self {
        self.team_member_id = Set(team_member_id.to_string());
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}
