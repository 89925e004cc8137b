//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Filament Tracker Help**\n\
        Here is a summary of all available commands.\n\n\
        **Everyday Commands**\n\
        • `/use_filament <filament> <grams>` - Records a print, drawing from open spools first.\n\
        • `/stock` - Shows stock levels and totals.\n\
        • `/filament show <filament>` - Shows one filament and its spools.\n\n\
        **Inventory Commands**\n\
        • `/filament <subcommand>` - Add, list, show, delete or price filaments.\n\
        • `/spool <subcommand>` - Add, weigh, empty or delete spools.\n\
        • `/containers <subcommand>` - Manage reusable spool bodies.\n\
        • `/brand <subcommand>` - Manage the brand suggestion list.\n\n\
        **Data & Settings**\n\
        • `/settings show|update` - Stock thresholds and currency.\n\
        • `/export` - Download the inventory as CSV.\n\
        • `/import <file>` - Import a CSV export.\n\
        • `/purge confirm:True` - Remove all filaments and spools.\n\
        • `/ping` - Checks if the bot is responsive.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
