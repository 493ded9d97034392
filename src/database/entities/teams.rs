use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub org_id: String,
    pub is_archived: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrgId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMembers.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(org_id: &str, name: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(short_id()),
            name: Set(name.to_string()),
            org_id: Set(org_id.to_string()),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn rename(mut self, name: &str) -> Self {
        self.name = Set(name.to_string());
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn archive(mut self) -> Self {
        self.is_archived = Set(true);
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}
