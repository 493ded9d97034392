use uuid::Uuid;

const SHORT_ID_LEN: usize = 12;

/// Generated row identifier: the first 12 hex digits of a v4 uuid.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// TeamMember ids are derived from the pair they join, so a second row for
/// the same (user, team) cannot be inserted.
pub fn team_member_id(user_id: &str, team_id: &str) -> String {
    format!("{}::{}", user_id, team_id)
}

/// Inverse of [`team_member_id`].
pub fn split_team_member_id(team_member_id: &str) -> Option<(&str, &str)> {
    team_member_id
        .split_once("::")
        .filter(|(user_id, team_id)| !user_id.is_empty() && !team_id.is_empty())
}
