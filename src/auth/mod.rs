//! Caller identity.
//!
//! An [`Actor`] is derived once per request from the bearer token and then
//! passed explicitly to every service call.

pub mod password;
pub mod token;

use std::collections::BTreeSet;

use crate::errors::{CoreError, CoreResult};

pub use token::{AuthTokenClaims, AuthTokenCodec};

/// Role granting access to every team and organization.
pub const SUPER_USER_ROLE: &str = "su";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: Option<String>,
    tms: BTreeSet<String>,
    roles: BTreeSet<String>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            tms: BTreeSet::new(),
            roles: BTreeSet::new(),
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            tms: BTreeSet::new(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_tms<I, S>(mut self, tms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tms.extend(tms.into_iter().map(Into::into));
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_super_user(&self) -> bool {
        self.has_role(SUPER_USER_ROLE)
    }

    /// Team ids carried by the token. May lag behind the store; predicates
    /// consult TeamMember rows instead.
    pub fn tms(&self) -> impl Iterator<Item = &str> {
        self.tms.iter().map(String::as_str)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn require_user_id(&self) -> CoreResult<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| CoreError::unauthorized("User is not authenticated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn anonymous_actor_has_no_user() {
        let actor = Actor::anonymous();
        assert!(!actor.is_authenticated());
        let err = actor.require_user_id().unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Unauthorized);
    }

    #[test]
    fn roles_and_tms_accumulate() {
        let actor = Actor::user("u1")
            .with_tms(["t1", "t2"])
            .with_role(SUPER_USER_ROLE);
        assert_eq!(actor.require_user_id().unwrap(), "u1");
        assert!(actor.is_super_user());
        assert_eq!(actor.tms().collect::<Vec<_>>(), vec!["t1", "t2"]);
    }
}
