use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::database::ids::short_id;

/// Link between a team and an external service account, holding the bearer
/// token used for outbound calls on the team's behalf.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "integration_providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub service: String,
    #[serde(skip)]
    pub access_token: String,
    pub provider_user_name: String,
    pub is_active: bool,
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
pub enum IntegrationService {
    GitHub,
}

impl IntegrationService {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationService::GitHub => "github",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "github" => Ok(IntegrationService::GitHub),
            _ => Err(format!("Unsupported integration service: {}", s)),
        }
    }
}

impl ActiveModel {
    pub fn new(
        team_id: &str,
        user_id: &str,
        service: IntegrationService,
        access_token: &str,
        provider_user_name: &str,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(short_id()),
            team_id: Set(team_id.to_string()),
            user_id: Set(user_id.to_string()),
            service: Set(service.as_str().to_string()),
            access_token: Set(access_token.to_string()),
            provider_user_name: Set(provider_user_name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn rehydrate(mut self, user_id: &str, access_token: &str, provider_user_name: &str) -> Self {
        self.user_id = Set(user_id.to_string());
        self.access_token = Set(access_token.to_string());
        self.provider_user_name = Set(provider_user_name.to_string());
        self.is_active = Set(true);
        self.updated_at = Set(chrono::Utc::now());
        self
    }

    pub fn deactivate(mut self) -> Self {
        self.is_active = Set(false);
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}
