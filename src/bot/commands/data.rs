//! Data Discord commands - CSV export/import, purge and reusable spool bodies.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::say_lines},
        core::{exchange, filament, reusable},
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Sends the whole inventory as a CSV file.
    #[poise::command(slash_command)]
    pub async fn export(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;

        let csv = exchange::export_csv_string(&ctx.data().database).await?;
        let rows = csv.lines().count().saturating_sub(1);
        let file_name = format!("filaments-{}.csv", chrono::Utc::now().format("%Y-%m-%d"));

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📤 Exported {rows} spool row(s)."))
                .attachment(serenity::CreateAttachment::bytes(csv.into_bytes(), file_name)),
        )
        .await?;
        Ok(())
    }

    /// Imports filaments and spools from a CSV export.
    #[poise::command(slash_command)]
    pub async fn import(
        ctx: Context<'_>,
        #[description = "CSV file produced by /export"] file: serenity::Attachment,
    ) -> Result<()> {
        ctx.defer().await?;

        let bytes = file.download().await?;
        info!("Importing {} ({} bytes)", file.filename, bytes.len());
        let summary = exchange::import_csv(&ctx.data().database, bytes.as_slice()).await?;

        ctx.say(format!(
            "📥 Imported {} filament(s) with {} spool(s). {} reusable bod(ies) tracked, {} blank row(s) skipped.",
            summary.filaments_created,
            summary.spools_created,
            summary.containers_created,
            summary.rows_skipped
        ))
        .await?;
        Ok(())
    }

    /// Deletes every filament and spool. Brands and settings are kept.
    #[poise::command(slash_command)]
    pub async fn purge(
        ctx: Context<'_>,
        #[description = "Set to True to really delete everything"] confirm: bool,
    ) -> Result<()> {
        if !confirm {
            ctx.say("Nothing deleted. Run `/purge confirm:True` to remove all filaments.")
                .await?;
            return Ok(());
        }

        let removed = filament::purge_inventory(&ctx.data().database).await?;
        ctx.say(format!("🧹 Removed {removed} filament(s) and their spools."))
            .await?;
        Ok(())
    }

    /// Parent command for reusable spool bodies.
    #[poise::command(
        slash_command,
        subcommands(
            "containers_list",
            "containers_add",
            "containers_assign",
            "containers_delete"
        )
    )]
    pub async fn containers(ctx: Context<'_>) -> Result<()> {
        ctx.say(
            "Reusable spool commands:\n\
            `/containers list` - List tracked spool bodies\n\
            `/containers add` - Register a spare body\n\
            `/containers assign` - Put a body on a spool, or free it\n\
            `/containers delete` - Stop tracking a body",
        )
        .await?;
        Ok(())
    }

    /// Lists tracked spool bodies and what they hold.
    #[poise::command(slash_command, rename = "list")]
    pub async fn containers_list(ctx: Context<'_>) -> Result<()> {
        let bodies = reusable::get_all_reusable_spools(&ctx.data().database).await?;
        if bodies.is_empty() {
            ctx.say("No reusable spool bodies are tracked yet.").await?;
            return Ok(());
        }

        let free = bodies.iter().filter(|b| !b.in_use).count();
        let mut lines = vec![format!(
            "♻️ {} bod(ies), {free} free for a refill",
            bodies.len()
        )];
        lines.extend(bodies.iter().map(|b| match b.current_spool_id {
            Some(spool_id) => format!("• #{} {} holding spool #{spool_id}", b.id, b.material),
            None => format!("• #{} {} free", b.id, b.material),
        }));
        say_lines(ctx, &lines).await
    }

    /// Registers a spare spool body.
    #[poise::command(slash_command, rename = "add")]
    pub async fn containers_add(
        ctx: Context<'_>,
        #[description = "Body material (e.g., 'plastic', 'cardboard')"] material: Option<String>,
    ) -> Result<()> {
        let material = material.unwrap_or_else(|| reusable::DEFAULT_BODY_MATERIAL.to_string());
        let body = reusable::add_reusable_spool(&ctx.data().database, material).await?;
        ctx.say(format!("♻️ Tracking spare body #{} ({}).", body.id, body.material))
            .await?;
        Ok(())
    }

    /// Puts a body on a spool, or frees it when no spool is given.
    #[poise::command(slash_command, rename = "assign")]
    pub async fn containers_assign(
        ctx: Context<'_>,
        #[description = "Body id"] body_id: i64,
        #[description = "Spool id. Leave empty to free the body."] spool_id: Option<i64>,
    ) -> Result<()> {
        let body = reusable::assign_reusable_spool(&ctx.data().database, body_id, spool_id).await?;
        let message = body.current_spool_id.map_or_else(
            || format!("♻️ Body #{} is free.", body.id),
            |spool_id| format!("♻️ Body #{} now holds spool #{spool_id}.", body.id),
        );
        ctx.say(message).await?;
        Ok(())
    }

    /// Stops tracking a body.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn containers_delete(
        ctx: Context<'_>,
        #[description = "Body id"] body_id: i64,
    ) -> Result<()> {
        reusable::delete_reusable_spool(&ctx.data().database, body_id).await?;
        ctx.say(format!("🗑️ Body #{body_id} is no longer tracked."))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
