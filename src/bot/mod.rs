//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the filament tracker,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (filament, spool, usage, stock, settings, data)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{core::threshold::ThresholdPolicy, errors::Error};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Longest message the bot sends in one piece, leaving room under Discord's 2000 limit.
pub const MAX_MESSAGE_LEN: usize = 1900;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the threshold policy
/// that status displays evaluate against.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Low/critical cutoffs shared with the settings commands
    pub thresholds: ThresholdPolicy,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and threshold policy.
    #[must_use]
    pub const fn new(database: DatabaseConnection, thresholds: ThresholdPolicy) -> Self {
        Self {
            database,
            thresholds,
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, database, thresholds))]
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    thresholds: ThresholdPolicy,
) -> Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, thresholds))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))
}

pub use commands::*;
pub use handlers::*;
