use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "organization_users")]
pub struct Model {
    /// `<userId>::<orgId>`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub org_id: String,
    pub user_id: String,
    pub role: String, // "leader", "member"
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrgId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrgRole {
    Leader,
    Member,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Leader => "leader",
            OrgRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "leader" => Ok(OrgRole::Leader),
            "member" => Ok(OrgRole::Member),
            _ => Err(format!("Invalid organization role: {}", s)),
        }
    }
}

pub fn organization_user_id(user_id: &str, org_id: &str) -> String {
    format!("{}::{}", user_id, org_id)
}

impl ActiveModel {
    pub fn new(org_id: &str, user_id: &str, role: OrgRole) -> Self {
        Self {
            id: Set(organization_user_id(user_id, org_id)),
            org_id: Set(org_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(role.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

impl Model {
    pub fn is_leader(&self) -> bool {
        matches!(OrgRole::from_str(&self.role), Ok(OrgRole::Leader))
    }
}
