use crate::errors::{CoreError, CoreResult};

pub const MAX_TEAM_NAME_LEN: usize = 50;
pub const MAX_PROJECT_CONTENT_LEN: usize = 2000;

pub struct ValidationService;

impl ValidationService {
    /// Trimmed, non-empty, at most 50 characters.
    pub fn validate_team_name(name: &str) -> CoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Team name cannot be empty"));
        }
        if name.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(CoreError::validation(format!(
                "Team name cannot exceed {} characters",
                MAX_TEAM_NAME_LEN
            )));
        }
        Ok(name.to_string())
    }

    pub fn validate_org_name(name: &str) -> CoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Organization name cannot be empty"));
        }
        Ok(name.to_string())
    }

    /// Lowercased and trimmed; rejects anything without a local part and a
    /// dotted domain.
    pub fn normalize_email(email: &str) -> CoreResult<String> {
        let email = email.trim().to_lowercase();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            return Err(CoreError::validation(format!("Invalid email: {}", email)));
        }
        Ok(email)
    }

    pub fn validate_project_content(content: &str) -> CoreResult<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::validation("Project content cannot be empty"));
        }
        if content.chars().count() > MAX_PROJECT_CONTENT_LEN {
            return Err(CoreError::validation("Project content is too long"));
        }
        Ok(content.to_string())
    }
}
