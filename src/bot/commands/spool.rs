//! Spool Discord commands - add, weigh, empty and delete individual spools.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::filament_id_from, handlers::autocomplete},
        core::{
            report,
            spool::{self, DEFAULT_SPOOL_WEIGHT, NewSpool},
        },
        errors::Result,
    };

    /// Parent command for the spool ledger.
    #[poise::command(
        slash_command,
        subcommands("spool_add", "spool_set_remaining", "spool_empty", "spool_delete")
    )]
    pub async fn spool(ctx: Context<'_>) -> Result<()> {
        let help_text = "Spool commands. Available subcommands:\n\
            `/spool add` - Add a spool to a filament\n\
            `/spool set_remaining` - Record a new remaining weight after weighing\n\
            `/spool empty` - Mark a spool as used up\n\
            `/spool delete` - Delete a spool";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a spool to an existing filament.
    #[poise::command(slash_command, rename = "add")]
    pub async fn spool_add(
        ctx: Context<'_>,
        #[description = "Filament the spool belongs to"]
        #[autocomplete = "autocomplete::autocomplete_filament"]
        filament: String,
        #[description = "Net weight in grams. Defaults to 1000."] total_weight: Option<f64>,
        #[description = "Grams left, if already opened"] weight_remaining: Option<f64>,
        #[description = "Price paid per kg"] price_per_kg: Option<f64>,
        #[description = "This is a refill"] refill: Option<bool>,
        #[description = "The spool body is kept for refills"] reusable: Option<bool>,
        #[description = "Spool body material (e.g., 'cardboard')"] material: Option<String>,
    ) -> Result<()> {
        let filament_id = filament_id_from(&filament)?;
        let total = total_weight.unwrap_or(DEFAULT_SPOOL_WEIGHT);

        let new_spool = NewSpool {
            weight_remaining: weight_remaining.unwrap_or(total),
            is_refill: refill.unwrap_or(false),
            is_reusable: reusable.unwrap_or(false),
            spool_material: material,
            purchase_price_per_kg: price_per_kg,
            ..NewSpool::full(total)
        };
        let spool = spool::add_spool_to_filament(&ctx.data().database, filament_id, new_spool)
            .await?;

        ctx.say(format!(
            "✅ Added spool #{} ({}) to filament #{filament_id}.",
            spool.id,
            report::format_grams(spool.weight_remaining)
        ))
        .await?;
        Ok(())
    }

    /// Records the weight left on a spool, e.g. after putting it on a scale.
    #[poise::command(slash_command, rename = "set_remaining")]
    pub async fn spool_set_remaining(
        ctx: Context<'_>,
        #[description = "Spool id (shown by /filament show)"] spool_id: i64,
        #[description = "Grams of filament left"] grams: f64,
    ) -> Result<()> {
        let spool = spool::set_weight_remaining(&ctx.data().database, spool_id, grams).await?;

        let message = if spool.is_empty() {
            format!("📭 Spool #{spool_id} is now empty.")
        } else {
            format!(
                "✅ Spool #{spool_id} has {} left {}",
                report::format_grams(spool.weight_remaining),
                report::format_progress_bar(spool.percent_remaining(), None)
            )
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Marks a spool as used up, whatever weight is recorded on it.
    #[poise::command(slash_command, rename = "empty")]
    pub async fn spool_empty(
        ctx: Context<'_>,
        #[description = "Spool id (shown by /filament show)"] spool_id: i64,
    ) -> Result<()> {
        spool::mark_spool_empty(&ctx.data().database, spool_id).await?;
        ctx.say(format!("📭 Spool #{spool_id} marked as empty."))
            .await?;
        Ok(())
    }

    /// Deletes a spool. A reusable body holding it becomes free.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn spool_delete(
        ctx: Context<'_>,
        #[description = "Spool id (shown by /filament show)"] spool_id: i64,
    ) -> Result<()> {
        spool::delete_spool(&ctx.data().database, spool_id).await?;
        ctx.say(format!("🗑️ Deleted spool #{spool_id}.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
