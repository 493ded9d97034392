use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::team_member_id;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    /// `<userId>::<teamId>`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub preferred_name: String,
    pub email: String,
    pub is_lead: bool,
    pub is_not_removed: bool,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(team_id: &str, user: &super::users::Model, is_lead: bool) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(team_member_id(&user.id, team_id)),
            team_id: Set(team_id.to_string()),
            user_id: Set(user.id.clone()),
            preferred_name: Set(user.preferred_name.clone()),
            email: Set(user.email.clone()),
            is_lead: Set(is_lead),
            is_not_removed: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn reactivate(mut self) -> Self {
        self.is_not_removed = Set(true);
        self.is_lead = Set(false);
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn remove(mut self) -> Self {
        self.is_not_removed = Set(false);
        self.is_lead = Set(false);
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn set_lead(mut self, is_lead: bool) -> Self {
        self.is_lead = Set(is_lead);
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.is_not_removed
    }

    pub fn is_active_lead(&self) -> bool {
        self.is_not_removed && self.is_lead
    }
}
