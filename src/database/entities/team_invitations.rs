use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "team_invitations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub team_id: String,
    pub email: String,
    pub invited_by: String,
    pub accepted_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
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

impl ActiveModel {
    pub fn new(team_id: &str, email: &str, invited_by: &str) -> Self {
        Self {
            id: Set(short_id()),
            team_id: Set(team_id.to_string()),
            email: Set(email.to_lowercase()),
            invited_by: Set(invited_by.to_string()),
            accepted_at: Set(None),
            created_at: Set(chrono::Utc::now()),
        }
    }

    pub fn accept(mut self) -> Self {
        self.accepted_at = Set(Some(chrono::Utc::now()));
        self
    }
}

impl Model {
    pub fn is_pending(&self) -> bool {
        self.accepted_at.is_none()
    }
}
