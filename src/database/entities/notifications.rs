use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::ids::short_id;

/// A user-targeted fact rendered by the client as a toast or inbox item.
/// Rows are inserted and eventually cleared, never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub team_id: Option<String>,
    pub payload: String, // JSON, shape depends on kind
    pub start_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    TeamArchived,
    TeamInvitation,
    AddedToTeam,
    RejoinedTeam,
    KickedOut,
    PromotedToLead,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TeamArchived => "TEAM_ARCHIVED",
            NotificationKind::TeamInvitation => "TEAM_INVITATION",
            NotificationKind::AddedToTeam => "ADDED_TO_TEAM",
            NotificationKind::RejoinedTeam => "REJOINED_TEAM",
            NotificationKind::KickedOut => "KICKED_OUT",
            NotificationKind::PromotedToLead => "PROMOTED_TO_LEAD",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "TEAM_ARCHIVED" => Ok(NotificationKind::TeamArchived),
            "TEAM_INVITATION" => Ok(NotificationKind::TeamInvitation),
            "ADDED_TO_TEAM" => Ok(NotificationKind::AddedToTeam),
            "REJOINED_TEAM" => Ok(NotificationKind::RejoinedTeam),
            "KICKED_OUT" => Ok(NotificationKind::KickedOut),
            "PROMOTED_TO_LEAD" => Ok(NotificationKind::PromotedToLead),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }
}

impl ActiveModel {
    pub fn new(
        user_id: &str,
        kind: NotificationKind,
        team_id: Option<&str>,
        payload: Value,
    ) -> Self {
        Self {
            id: Set(short_id()),
            user_id: Set(user_id.to_string()),
            kind: Set(kind.as_str().to_string()),
            team_id: Set(team_id.map(str::to_string)),
            payload: Set(payload.to_string()),
            start_at: Set(chrono::Utc::now()),
        }
    }
}

impl Model {
    pub fn get_payload(&self) -> Value {
        serde_json::from_str(&self.payload).unwrap_or(Value::Null)
    }
}
