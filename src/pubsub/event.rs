//! Envelopes delivered to subscribers.
//!
//! Live-update channels carry
//! `{"data": {...}, "operationId": "...", "mutatorId": "..."}`; feature
//! channels carry `{"<eventName>": {...}, "mutatorId": "..."}`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::database::entities::{
    integration_providers, notifications, projects, team_members, teams,
};

/// Typed body of a live-update envelope. Serialized with a `__typename` tag
/// so clients can dispatch without knowing the topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum LiveUpdate {
    TeamAdded {
        team: teams::Model,
        team_member: team_members::Model,
    },
    TeamUpdated {
        team: teams::Model,
    },
    TeamArchived {
        team: teams::Model,
        hard_deleted: bool,
        user_ids: Vec<String>,
    },
    TeamMemberAdded {
        team_member: team_members::Model,
        rejoined: bool,
    },
    TeamMemberRemoved {
        team_member: team_members::Model,
        reassigned_project_ids: Vec<String>,
    },
    TeamLeadChanged {
        old_lead: Option<team_members::Model>,
        new_lead: team_members::Model,
    },
    NotificationAdded {
        notification: notifications::Model,
    },
    NotificationCleared {
        notification_id: String,
    },
    ProjectCreated {
        project: projects::Model,
    },
    ProjectDeleted {
        project: projects::Model,
    },
    ProviderUpdated {
        provider: integration_providers::Model,
    },
}

impl LiveUpdate {
    pub fn type_name(&self) -> &'static str {
        match self {
            LiveUpdate::TeamAdded { .. } => "TeamAdded",
            LiveUpdate::TeamUpdated { .. } => "TeamUpdated",
            LiveUpdate::TeamArchived { .. } => "TeamArchived",
            LiveUpdate::TeamMemberAdded { .. } => "TeamMemberAdded",
            LiveUpdate::TeamMemberRemoved { .. } => "TeamMemberRemoved",
            LiveUpdate::TeamLeadChanged { .. } => "TeamLeadChanged",
            LiveUpdate::NotificationAdded { .. } => "NotificationAdded",
            LiveUpdate::NotificationCleared { .. } => "NotificationCleared",
            LiveUpdate::ProjectCreated { .. } => "ProjectCreated",
            LiveUpdate::ProjectDeleted { .. } => "ProjectDeleted",
            LiveUpdate::ProviderUpdated { .. } => "ProviderUpdated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Update {
        data: LiveUpdate,
        operation_id: String,
        mutator_id: Option<String>,
    },
    Feature {
        name: String,
        payload: Value,
        mutator_id: Option<String>,
    },
}

impl Event {
    pub fn mutator_id(&self) -> Option<&str> {
        match self {
            Event::Update { mutator_id, .. } | Event::Feature { mutator_id, .. } => {
                mutator_id.as_deref()
            }
        }
    }

    /// Feature envelopes are not correlated to an operation.
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Event::Update { operation_id, .. } => Some(operation_id),
            Event::Feature { .. } => None,
        }
    }

    pub fn live_update(&self) -> Option<&LiveUpdate> {
        match self {
            Event::Update { data, .. } => Some(data),
            Event::Feature { .. } => None,
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Event::Update {
                data,
                operation_id,
                mutator_id,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("data", data)?;
                map.serialize_entry("operationId", operation_id)?;
                map.serialize_entry("mutatorId", mutator_id)?;
                map.end()
            }
            Event::Feature {
                name,
                payload,
                mutator_id,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(name, payload)?;
                map.serialize_entry("mutatorId", mutator_id)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn team() -> teams::Model {
        let now = chrono::Utc::now();
        teams::Model {
            id: "t1".into(),
            name: "Core".into(),
            org_id: "o1".into(),
            is_archived: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn update_envelope_shape() {
        let event = Event::Update {
            data: LiveUpdate::TeamArchived {
                team: team(),
                hard_deleted: false,
                user_ids: vec!["u1".into()],
            },
            operation_id: "op-1".into(),
            mutator_id: Some("conn-9".into()),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["operationId"], "op-1");
        assert_eq!(value["mutatorId"], "conn-9");
        assert_eq!(value["data"]["__typename"], "TeamArchived");
        assert_eq!(value["data"]["hardDeleted"], false);
        assert_eq!(value["data"]["team"]["isArchived"], true);
        assert_eq!(value["data"]["userIds"], json!(["u1"]));
    }

    #[test]
    fn feature_envelope_is_keyed_by_event_name() {
        let event = Event::Feature {
            name: "githubRepoAdded".into(),
            payload: json!({"nameWithOwner": "acme/api"}),
            mutator_id: None,
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({"githubRepoAdded": {"nameWithOwner": "acme/api"}, "mutatorId": null})
        );
        assert_eq!(event.operation_id(), None);
    }
}
