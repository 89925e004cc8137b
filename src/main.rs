use dotenvy::dotenv;
use filament_tracker::{
    bot,
    config::{brands, database},
    core::{brand, settings, threshold::ThresholdPolicy},
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and create any missing tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 4. Seed the brand list on first run
    let config = brands::load_default_config()?;
    brand::seed_default_brands(&db, &config.seed_brands()).await?;

    // 5. Thresholds are loaded once here and shared with every command
    let thresholds = ThresholdPolicy::new(settings::load_thresholds(&db).await?);
    let mut changes = thresholds.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let current = *changes.borrow_and_update();
            info!(
                "Stock thresholds changed: low < {}g, critical < {}g",
                current.low, current.critical
            );
        }
    });

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db, thresholds).await?;

    Ok(())
}
