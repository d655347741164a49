mod analytics;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{analytics::AnalyticsCommands, config::ConfigCommands};

#[derive(Debug, Parser)]
#[command(name = "mshmap-cli")]
#[command(about = "MSH Map analytics command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Recalculate analytics or build the weekly report
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let fallback_level =
        std::env::var("MSHMAP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db(command).await?,
        Some(Commands::Analytics { command }) => {
            let app_config = mshmap_core::load_app_config()?;
            let analytics_config = mshmap_core::load_analytics_config_or_default(
                app_config.analytics_config_path.as_deref(),
            )?;
            let pool = connect(&app_config).await?;
            analytics::run(&pool, &analytics_config, command).await?;
        }
        Some(Commands::Config { command }) => config::run(command)?,
        None => println!("mshmap-cli: use --help to list commands"),
    }

    Ok(())
}

async fn connect(config: &mshmap_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = mshmap_db::PoolConfig::from_app_config(config);
    let pool = mshmap_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = mshmap_core::load_app_config()?;
    let pool = connect(&config).await?;

    match command {
        DbCommands::Ping => {
            mshmap_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = mshmap_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}
