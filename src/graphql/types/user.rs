use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::{organizations, users};

#[derive(SimpleObject, Clone, Debug)]
pub struct User {
    pub id: String,
    pub email: String,
    #[graphql(name = "preferredName")]
    pub preferred_name: String,
    /// Ids of the teams the user is an active member of
    pub tms: Vec<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        let tms = model.tms();
        Self {
            id: model.id,
            email: model.email,
            preferred_name: model.preferred_name,
            tms,
            created_at: model.created_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<organizations::Model> for Organization {
    fn from(model: organizations::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}
