//! Settings Discord commands - stock thresholds and currency.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::{
            report,
            settings::{self, SettingsUpdate},
        },
        errors::Result,
    };

    /// Parent command for application settings.
    #[poise::command(slash_command, subcommands("settings_show", "settings_update"))]
    pub async fn settings(ctx: Context<'_>) -> Result<()> {
        ctx.say(
            "Settings commands:\n\
            `/settings show` - Show thresholds and currency\n\
            `/settings update` - Change thresholds or currency",
        )
        .await?;
        Ok(())
    }

    /// Shows the current thresholds and currency.
    #[poise::command(slash_command, rename = "show")]
    pub async fn settings_show(ctx: Context<'_>) -> Result<()> {
        let current = settings::get_settings(&ctx.data().database).await?;
        ctx.say(format!(
            "⚙️ Low threshold: {}\nCritical threshold: {}\nCurrency: {}",
            report::format_grams(current.low_threshold),
            report::format_grams(current.critical_threshold),
            current.currency
        ))
        .await?;
        Ok(())
    }

    /// Changes thresholds or currency. Status displays use the new values at once.
    #[poise::command(slash_command, rename = "update")]
    pub async fn settings_update(
        ctx: Context<'_>,
        #[description = "Grams below which a filament is low"] low_threshold: Option<f64>,
        #[description = "Grams below which a filament is critical"] critical_threshold: Option<
            f64,
        >,
        #[description = "Currency code (e.g., 'DKK', 'EUR')"] currency: Option<String>,
    ) -> Result<()> {
        let update = SettingsUpdate {
            low_threshold,
            critical_threshold,
            currency,
        };
        if update == SettingsUpdate::default() {
            ctx.say("Nothing to change. Pass at least one option.")
                .await?;
            return Ok(());
        }

        let saved =
            settings::update_settings(&ctx.data().database, &ctx.data().thresholds, update).await?;
        ctx.say(format!(
            "✅ Settings saved. Low < {}, critical < {}, currency {}.",
            report::format_grams(saved.low_threshold),
            report::format_grams(saved.critical_threshold),
            saved.currency
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
