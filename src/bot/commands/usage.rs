//! Usage Discord command - records filament consumed by a print.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::filament_id_from, handlers::autocomplete},
        core::{filament, report, usage},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Records grams used from a filament, drawing from opened spools first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn use_filament(
        ctx: Context<'_>,
        #[description = "Filament that was used"]
        #[autocomplete = "autocomplete::autocomplete_filament"]
        filament: String,
        #[description = "Grams used"] grams: f64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let filament_id = filament_id_from(&filament)?;

        let result = match usage::record_usage(db, filament_id, grams).await {
            Ok(result) => result,
            Err(Error::NoStockAvailable { .. }) => {
                ctx.say(format!(
                    "❌ Filament #{filament_id} has no spool with filament left. Add one with `/spool add`."
                ))
                .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let icon = if result.insufficient_filament { "⚠️" } else { "✅" };
        let mut text = format!("{icon} {}", result.summary());
        for allocation in &result.allocations {
            write!(
                &mut text,
                "\n• Spool #{}: -{} → {} left{}",
                allocation.spool_id,
                report::format_grams(allocation.grams_used),
                report::format_grams(allocation.remaining_after),
                if allocation.was_emptied { " (emptied)" } else { "" }
            )?;
        }

        if let Some(stock) = filament::get_filament_by_id(db, filament_id).await? {
            let status = ctx.data().thresholds.status(stock.weight_remaining());
            write!(
                &mut text,
                "\n{} {} now at {}",
                status.emoji(),
                stock.display_name(),
                report::format_grams(stock.weight_remaining())
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
