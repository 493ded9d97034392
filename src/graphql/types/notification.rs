use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::notifications;

#[derive(SimpleObject, Clone, Debug)]
pub struct Notification {
    pub id: String,
    #[graphql(name = "userId")]
    pub user_id: String,
    /// e.g. `TEAM_ARCHIVED`, `REJOINED_TEAM`
    pub kind: String,
    #[graphql(name = "teamId")]
    pub team_id: Option<String>,
    pub payload: Json<serde_json::Value>,
    #[graphql(name = "startAt")]
    pub start_at: DateTime<Utc>,
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        let payload = Json(model.get_payload());
        Self {
            id: model.id,
            user_id: model.user_id,
            kind: model.kind,
            team_id: model.team_id,
            payload,
            start_at: model.start_at,
        }
    }
}
