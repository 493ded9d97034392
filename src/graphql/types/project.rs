use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::projects;

#[derive(SimpleObject, Clone, Debug)]
pub struct Project {
    pub id: String,
    #[graphql(name = "teamId")]
    pub team_id: String,
    #[graphql(name = "teamMemberId")]
    pub team_member_id: String,
    pub content: String,
    pub status: String,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<projects::Model> for Project {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            team_member_id: model.team_member_id,
            content: model.content,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
