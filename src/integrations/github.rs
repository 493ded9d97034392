//! GitHub REST calls made on a team's behalf.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{IntegrationError, IntegrationResult};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const CLIENT_AGENT: &str = "huddle-server";
const WEBHOOK_EVENTS: [&str; 2] = ["issues", "pull_request"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub default_branch: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookInfo {
    pub id: i64,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn fetch_repository(
        &self,
        access_token: &str,
        name_with_owner: &str,
    ) -> IntegrationResult<RepositoryInfo>;

    async fn create_webhook(
        &self,
        access_token: &str,
        name_with_owner: &str,
        callback_url: &str,
    ) -> IntegrationResult<WebhookInfo>;
}

/// Split `owner/repo`, rejecting anything else.
pub fn parse_name_with_owner(name_with_owner: &str) -> IntegrationResult<(&str, &str)> {
    let invalid = || IntegrationError::InvalidRepositoryName(name_with_owner.to_string());
    let (owner, repo) = name_with_owner.split_once('/').ok_or_else(invalid)?;
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !valid_part(owner) || !valid_part(repo) {
        return Err(invalid());
    }
    Ok((owner, repo))
}

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>) -> IntegrationResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, name_with_owner: &str, suffix: &str) -> IntegrationResult<String> {
        let (owner, repo) = parse_name_with_owner(name_with_owner)?;
        Ok(format!("{}/repos/{}/{}{}", self.api_url, owner, repo, suffix))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> IntegrationResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::upstream_error(status, response).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| IntegrationError::MalformedResponse(e.to_string()))
    }

    async fn upstream_error(status: StatusCode, response: reqwest::Response) -> IntegrationError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<UpstreamErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);
        IntegrationError::Upstream {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn fetch_repository(
        &self,
        access_token: &str,
        name_with_owner: &str,
    ) -> IntegrationResult<RepositoryInfo> {
        let url = self.repo_url(name_with_owner, "")?;
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn create_webhook(
        &self,
        access_token: &str,
        name_with_owner: &str,
        callback_url: &str,
    ) -> IntegrationResult<WebhookInfo> {
        let url = self.repo_url(name_with_owner, "/hooks")?;
        let body = json!({
            "name": "web",
            "active": true,
            "events": WEBHOOK_EVENTS,
            "config": {
                "url": callback_url,
                "content_type": "json",
            },
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, ACCEPT_JSON)
            .json(&body)
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_repo() {
        assert_eq!(parse_name_with_owner("acme/api").unwrap(), ("acme", "api"));
        assert_eq!(
            parse_name_with_owner("my-org/repo.rs").unwrap(),
            ("my-org", "repo.rs")
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["acme", "/api", "acme/", "acme/api/extra", "ac me/api"] {
            assert!(
                matches!(
                    parse_name_with_owner(name),
                    Err(IntegrationError::InvalidRepositoryName(_))
                ),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn builds_repo_urls_without_double_slashes() {
        let client = GitHubClient::new("https://github.example/api/").unwrap();
        assert_eq!(
            client.repo_url("acme/api", "/hooks").unwrap(),
            "https://github.example/api/repos/acme/api/hooks"
        );
    }

    #[test]
    fn repository_payload_tolerates_missing_optionals() {
        let info: RepositoryInfo =
            serde_json::from_str(r#"{"id": 7, "full_name": "acme/api"}"#).unwrap();
        assert_eq!(info.id, 7);
        assert!(!info.private);
        assert!(info.default_branch.is_none());
    }
}
