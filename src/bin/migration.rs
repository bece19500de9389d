use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use stockroom_api::{config, db, migrator::Migrator};

/// Apply or roll back the stockroom schema.
#[derive(Parser)]
#[command(name = "migration", version)]
struct Cli {
    /// Database URL; falls back to the application configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the most recent migration
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Print applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = match cli.database_url {
        Some(url) => url,
        None => {
            config::load_config()
                .context("failed to load application config")?
                .database_url
        }
    };
    config::init_tracing("info", false);

    info!("Connecting to database");
    let pool = db::establish_connection(&database_url)
        .await
        .context("failed to connect to database")?;

    match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => {
            Migrator::up(&pool, None).await?;
            info!("Migration completed successfully");
        }
        Commands::Down { steps } => {
            Migrator::down(&pool, Some(steps)).await?;
            info!(steps, "Rollback completed");
        }
        Commands::Status => {
            Migrator::status(&pool).await?;
        }
        Commands::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
