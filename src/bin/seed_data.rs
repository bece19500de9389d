//! Seed data script - populates an empty database with a demo organization
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 5 user accounts (password `changeme`) and 2 employee records
//! - 6 materials and 2 suppliers
//! - inventory batches in every expiry state
//! - 2 inbox messages
//! - 10 invoices spread over the last six months

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use stockroom_api::{
    auth::{AuthConfig, AuthService},
    config::{self, AppConfig},
    db,
    events::{self, EventSender},
    handlers::AppServices,
    seed,
};

#[derive(Parser)]
#[command(name = "seed-data", about = "Populate the database with demo data")]
struct Args {
    /// Database URL; falls back to the application configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Do not run pending migrations first
    #[arg(long)]
    skip_migrations: bool,
    /// Seed even when users already exist
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // An explicit URL is enough to seed; the full config is only required without one.
    let cfg = match (config::load_config(), args.database_url.as_deref()) {
        (Ok(cfg), _) => cfg,
        (Err(_), Some(url)) => AppConfig::new(url.to_string(), "development".to_string()),
        (Err(e), None) => return Err(e).context("failed to load application config"),
    };
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| cfg.database_url.clone());

    info!("=== Stockroom seed data ===");
    let pool = db::establish_connection(&database_url)
        .await
        .context("failed to connect to database")?;
    if !args.skip_migrations {
        db::run_migrations(&pool).await?;
    }
    let pool = Arc::new(pool);

    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    tokio::spawn(events::process_events(event_rx));

    let auth = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
    let services = AppServices::new(pool, EventSender::new(event_tx), auth);

    let summary = seed::run(&services, Utc::now().date_naive(), args.force).await?;
    if summary.skipped {
        info!("Database already has users; nothing seeded (use --force to seed anyway)");
    } else {
        info!(
            users = summary.users,
            materials = summary.materials,
            suppliers = summary.suppliers,
            batches = summary.batches,
            messages = summary.messages,
            employees = summary.employees,
            invoices = summary.invoices,
            "=== Seed data complete ==="
        );
        info!("Sign in with POST /api/login using any seeded username and the demo password");
    }

    Ok(())
}
