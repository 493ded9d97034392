pub mod github;

pub use github::{GitHubApi, GitHubClient, RepositoryInfo, WebhookInfo};
