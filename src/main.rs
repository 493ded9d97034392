use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use huddle::config::ServerConfig;
use huddle::server::{self, MigrateDirection};

/// Team collaboration API server
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Verbosity for huddle's own logs; SQL statements stay at warn
    #[arg(short, long, global = true, value_enum, env = "HUDDLE_LOG_LEVEL", default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the GraphQL API and subscriptions
    Serve(ServerConfig),
    /// Manage the database schema
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Subcommand)]
enum DbCommand {
    /// Create the schema in a fresh database file
    Init {
        #[arg(short, long, env = "HUDDLE_DATABASE", default_value = "huddle.db")]
        database: String,
    },
    /// Apply or roll back migrations
    Migrate {
        #[command(subcommand)]
        direction: MigrateDirection,
        #[arg(short, long, env = "HUDDLE_DATABASE", default_value = "huddle.db")]
        database: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Command::Serve(config) => server::start_server(&config).await?,
        Command::Db(DbCommand::Init { database }) => {
            info!("Creating schema in {}", database);
            server::migrate_database(&database, MigrateDirection::Up).await?;
        }
        Command::Db(DbCommand::Migrate {
            direction,
            database,
        }) => {
            info!("Migrating {} ({:?})", database, direction);
            server::migrate_database(&database, direction).await?;
        }
    }

    Ok(())
}

fn init_tracing(level: LogLevel) {
    let level = LevelFilter::from(level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,sea_orm=warn,{}", level)))
        .without_time()
        .init();
}
