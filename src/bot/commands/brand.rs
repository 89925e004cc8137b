//! Brand Discord commands - manage the brand suggestion list.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::say_lines, handlers::autocomplete},
        core::brand,
        errors::{Error, Result},
    };

    /// Parent command for the brand list.
    #[poise::command(slash_command, subcommands("brand_add", "brand_list", "brand_delete"))]
    pub async fn brand(ctx: Context<'_>) -> Result<()> {
        ctx.say(
            "Brand commands:\n\
            `/brand add` - Add a brand suggestion\n\
            `/brand list` - List known brands\n\
            `/brand delete` - Remove a brand suggestion",
        )
        .await?;
        Ok(())
    }

    /// Adds a brand to the suggestion list.
    #[poise::command(slash_command, rename = "add")]
    pub async fn brand_add(
        ctx: Context<'_>,
        #[description = "Brand name"] name: String,
    ) -> Result<()> {
        let added = brand::add_brand(&ctx.data().database, &name).await?;
        ctx.say(format!("✅ Brand '{}' is on the list.", added.name))
            .await?;
        Ok(())
    }

    /// Lists all known brands.
    #[poise::command(slash_command, rename = "list")]
    pub async fn brand_list(ctx: Context<'_>) -> Result<()> {
        let brands = brand::get_all_brands(&ctx.data().database).await?;
        if brands.is_empty() {
            ctx.say("No brands yet. Use `/brand add` to add one!").await?;
            return Ok(());
        }

        let lines: Vec<String> = brands
            .iter()
            .map(|b| format!("• {} (#{})", b.name, b.id))
            .collect();
        say_lines(ctx, &lines).await
    }

    /// Removes a brand from the suggestion list. Filaments are not affected.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn brand_delete(
        ctx: Context<'_>,
        #[description = "Brand to remove"]
        #[autocomplete = "autocomplete::autocomplete_brand"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(found) = brand::get_all_brands(db)
            .await?
            .into_iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim()))
        else {
            return Err(Error::Validation {
                message: format!("No brand named '{name}'"),
            });
        };

        brand::delete_brand(db, found.id).await?;
        ctx.say(format!("🗑️ Removed brand '{}'.", found.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
