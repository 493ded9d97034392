pub mod app;
pub mod handlers;

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::app_context::AppContext;
use crate::auth::AuthTokenCodec;
use crate::config::ServerConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::integrations::GitHubClient;
use crate::pubsub::BroadcastEventBus;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    /// Apply pending migrations
    Up,
    /// Roll back every applied migration
    Down,
    /// Drop all tables and apply every migration again
    Fresh,
    /// List applied and pending migrations
    Status,
}

pub async fn start_server(config: &ServerConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Schema is up to date ({})", database_url);

    let bus = BroadcastEventBus::new();
    bus.spawn_idle_cleanup(config.channel_cleanup_interval());

    let tokens = Arc::new(AuthTokenCodec::new(
        config.auth_secret.as_bytes(),
        config.token_validity(),
    ));
    let github = Arc::new(GitHubClient::new(config.github_api_url.as_str())?);
    let app = Arc::new(AppContext::new(
        db,
        Arc::new(bus),
        tokens,
        github,
        config.webhook_callback_url.as_str(),
    ));

    let router = app::create_app(app, config.cors_origin.as_deref())?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, router).await?;

    Ok(())
}

fn log_routes() {
    for (path, purpose) in [
        ("/health", "liveness probe"),
        ("/graphql", "queries and mutations (GET serves the playground)"),
        ("/graphql/ws", "subscriptions over graphql-ws"),
    ] {
        info!("  {:<12} {}", path, purpose);
    }
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let db = establish_connection(&get_database_url(Some(database_path))).await?;

    match direction {
        MigrateDirection::Up => Migrator::up(&db, None).await?,
        MigrateDirection::Down => Migrator::down(&db, None).await?,
        MigrateDirection::Fresh => Migrator::fresh(&db).await?,
        MigrateDirection::Status => Migrator::status(&db).await?,
    }

    info!("Migration {:?} finished for {}", direction, database_path);
    Ok(())
}
