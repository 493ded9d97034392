use clap::Args;

use crate::integrations::github::DEFAULT_API_URL;

/// Settings for `huddle serve`. Every flag falls back to a `HUDDLE_*` variable.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    #[clap(short, long, env = "HUDDLE_PORT", default_value = "4000")]
    pub port: u16,
    #[clap(short, long, env = "HUDDLE_DATABASE", default_value = "huddle.db")]
    pub database: String,
    /// HS256 secret used to sign and verify auth tokens
    #[clap(long, env = "HUDDLE_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,
    #[clap(long, env = "HUDDLE_TOKEN_TTL_HOURS", default_value = "720")]
    pub token_ttl_hours: i64,
    #[clap(long, env = "HUDDLE_GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,
    /// Public URL GitHub posts webhook deliveries to
    #[clap(
        long,
        env = "HUDDLE_WEBHOOK_CALLBACK_URL",
        default_value = "http://localhost:4000/webhooks/github"
    )]
    pub webhook_callback_url: String,
    #[clap(long, env = "HUDDLE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
    /// Seconds between sweeps of topics nobody subscribes to
    #[clap(long, env = "HUDDLE_CHANNEL_CLEANUP_SECS", default_value = "300")]
    pub channel_cleanup_secs: u64,
}

impl ServerConfig {
    pub fn token_validity(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.max(1))
    }

    pub fn channel_cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.channel_cleanup_secs.max(1))
    }
}
