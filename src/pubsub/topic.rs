use std::fmt;

/// Channel family. Live-update kinds are PascalCase entity names, feature
/// channels use the camelCase event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    Team,
    TeamMember,
    Notification,
    Project,
    GithubRepoAdded,
    GithubRepoRemoved,
}

impl TopicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKind::Team => "Team",
            TopicKind::TeamMember => "TeamMember",
            TopicKind::Notification => "Notification",
            TopicKind::Project => "Project",
            TopicKind::GithubRepoAdded => "githubRepoAdded",
            TopicKind::GithubRepoRemoved => "githubRepoRemoved",
        }
    }
}

/// `<kind>.<entityId>`, e.g. `Team.t1` or `Notification.<userId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    pub kind: TopicKind,
    pub entity_id: String,
}

impl Topic {
    pub fn new(kind: TopicKind, entity_id: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
        }
    }

    pub fn team(team_id: &str) -> Self {
        Self::new(TopicKind::Team, team_id)
    }

    /// Per-user channel announcing teams the user was added to.
    pub fn team_member(user_id: &str) -> Self {
        Self::new(TopicKind::TeamMember, user_id)
    }

    pub fn notification(user_id: &str) -> Self {
        Self::new(TopicKind::Notification, user_id)
    }

    pub fn project(team_id: &str) -> Self {
        Self::new(TopicKind::Project, team_id)
    }

    pub fn github_repo_added(team_id: &str) -> Self {
        Self::new(TopicKind::GithubRepoAdded, team_id)
    }

    pub fn github_repo_removed(team_id: &str) -> Self {
        Self::new(TopicKind::GithubRepoRemoved, team_id)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.as_str(), self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_render_as_kind_dot_id() {
        assert_eq!(Topic::team("t1").to_string(), "Team.t1");
        assert_eq!(Topic::notification("u1").to_string(), "Notification.u1");
        assert_eq!(Topic::team_member("u1").to_string(), "TeamMember.u1");
        assert_eq!(
            Topic::github_repo_added("t1").to_string(),
            "githubRepoAdded.t1"
        );
    }
}
