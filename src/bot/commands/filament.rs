//! Filament Discord commands - add, list, show, delete and price override.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context, MAX_MESSAGE_LEN,
            commands::{filament_id_from, say_lines},
            handlers::autocomplete,
        },
        core::{
            filament::{self, FilamentDetails, NewFilament},
            report, settings,
            spool::{DEFAULT_SPOOL_WEIGHT, NewSpool},
        },
        errors::Result,
    };
    use std::fmt::Write;

    /// Parent command for the filament catalog.
    #[poise::command(
        slash_command,
        subcommands(
            "filament_add",
            "filament_list",
            "filament_show",
            "filament_delete",
            "filament_price"
        )
    )]
    pub async fn filament(ctx: Context<'_>) -> Result<()> {
        let help_text = "Filament commands. Available subcommands:\n\
            `/filament add` - Add a filament with its first spools\n\
            `/filament list` - List all filaments with stock status\n\
            `/filament show` - Show one filament and its spools\n\
            `/filament delete` - Delete a filament and all of its spools\n\
            `/filament price` - Set or clear the manual price per kg";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a filament, optionally with a number of identical spools.
    #[allow(clippy::too_many_arguments)] // one parameter per slash option
    #[poise::command(slash_command, rename = "add")]
    pub async fn filament_add(
        ctx: Context<'_>,
        #[description = "Manufacturer (e.g., 'Bambu Lab')"]
        #[autocomplete = "autocomplete::autocomplete_brand"]
        brand: String,
        #[description = "Material (e.g., 'PLA')"]
        #[autocomplete = "autocomplete::autocomplete_material"]
        filament_type: String,
        #[description = "Color name (e.g., 'Galaxy Black')"] color_name: String,
        #[description = "Hex color code. Defaults to #000000."] color_code: Option<String>,
        #[description = "Finish (e.g., 'Matte', 'Silk')"] finish: Option<String>,
        #[description = "Diameter in mm. Defaults to 1.75."] diameter: Option<f64>,
        #[description = "Number of spools to add. Defaults to 1, use 0 for none."] spools: Option<
            u32,
        >,
        #[description = "Net weight per spool in grams. Defaults to 1000."] spool_weight: Option<
            f64,
        >,
        #[description = "Price paid per kg"] price_per_kg: Option<f64>,
        #[description = "Spools are refills"] refill: Option<bool>,
        #[description = "Spool bodies are kept for refills"] reusable: Option<bool>,
        #[description = "Where the filament is stored"] location: Option<String>,
    ) -> Result<()> {
        let mut details = FilamentDetails::new(&brand, &filament_type, &color_name);
        if let Some(code) = color_code {
            details.color_code = code;
        }
        if let Some(d) = diameter {
            details.diameter = d;
        }
        details.finish = finish;
        details.location = location;

        let template = NewSpool {
            is_refill: refill.unwrap_or(false),
            is_reusable: reusable.unwrap_or(false),
            purchase_price_per_kg: price_per_kg,
            ..NewSpool::full(spool_weight.unwrap_or(DEFAULT_SPOOL_WEIGHT))
        };
        let mut new_filament = NewFilament::new(details);
        for _ in 0..spools.unwrap_or(1) {
            new_filament = new_filament.with_spool(template.clone());
        }

        let stock = filament::create_filament(&ctx.data().database, new_filament).await?;
        ctx.say(format!(
            "✅ Added **{}** with {} spool(s), {} total.",
            stock.label(),
            stock.spool_count(),
            report::format_grams(stock.total_weight())
        ))
        .await?;
        Ok(())
    }

    /// Lists every filament with its remaining stock and status.
    #[poise::command(slash_command, rename = "list")]
    pub async fn filament_list(ctx: Context<'_>) -> Result<()> {
        let filaments = filament::get_all_filaments(&ctx.data().database).await?;

        if filaments.is_empty() {
            ctx.say("No filaments yet. Use `/filament add` to create one!")
                .await?;
            return Ok(());
        }

        let thresholds = ctx.data().thresholds.current();
        let lines: Vec<String> = filaments
            .iter()
            .map(|stock| report::format_stock_line(stock, &thresholds))
            .collect();

        say_lines(ctx, &lines).await
    }

    /// Shows one filament with all of its spools.
    #[poise::command(slash_command, rename = "show")]
    pub async fn filament_show(
        ctx: Context<'_>,
        #[description = "Filament to show"]
        #[autocomplete = "autocomplete::autocomplete_filament"]
        filament: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let filament_id = filament_id_from(&filament)?;
        let thresholds = ctx.data().thresholds.current();

        let filament_report = report::generate_filament_report(db, filament_id, &thresholds).await?;
        let currency = settings::get_settings(db).await?.currency;
        let stock = &filament_report.stock;
        let f = &stock.filament;

        let mut text = String::new();
        writeln!(
            &mut text,
            "{} **{}** ({})",
            filament_report.status.emoji(),
            stock.label(),
            filament_report.status
        )?;
        writeln!(&mut text, "Color: {} | Diameter: {:.2} mm", f.color_code, f.diameter)?;
        writeln!(
            &mut text,
            "Remaining: {} of {} {}",
            report::format_grams(stock.weight_remaining()),
            report::format_grams(stock.total_weight()),
            report::format_progress_bar(filament_report.progress_percent, None)
        )?;
        writeln!(
            &mut text,
            "Price: {}/kg | Value on hand: {}",
            report::format_price(filament_report.price_per_kg, &currency),
            report::format_price(filament_report.remaining_value, &currency)
        )?;
        if let Some(location) = &f.location {
            writeln!(&mut text, "Location: {location}")?;
        }
        if let Some(notes) = &f.notes {
            writeln!(&mut text, "Notes: {notes}")?;
        }

        for spool in &stock.spools {
            let state = if spool.is_empty() {
                "empty"
            } else if spool.is_opened() {
                "opened"
            } else {
                "sealed"
            };
            write!(
                &mut text,
                "\n• Spool #{}: {} / {} ({state})",
                spool.id,
                report::format_grams(spool.weight_remaining),
                report::format_grams(spool.total_weight)
            )?;
            if spool.is_refill {
                text.push_str(" refill");
            }
            if spool.is_reusable {
                text.push_str(" ♻️");
            }
        }

        let lines: Vec<String> = text.lines().map(ToString::to_string).collect();
        for chunk in report::chunk_lines(&lines, MAX_MESSAGE_LEN) {
            ctx.say(chunk).await?;
        }
        Ok(())
    }

    /// Deletes a filament together with all of its spools.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn filament_delete(
        ctx: Context<'_>,
        #[description = "Filament to delete"]
        #[autocomplete = "autocomplete::autocomplete_filament"]
        filament: String,
    ) -> Result<()> {
        let filament_id = filament_id_from(&filament)?;
        let removed = filament::delete_filament(&ctx.data().database, filament_id).await?;

        ctx.say(format!(
            "🗑️ Deleted filament #{filament_id} and {removed} spool(s)."
        ))
        .await?;
        Ok(())
    }

    /// Sets the manual price per kg, or clears it when no price is given.
    #[poise::command(slash_command, rename = "price")]
    pub async fn filament_price(
        ctx: Context<'_>,
        #[description = "Filament to price"]
        #[autocomplete = "autocomplete::autocomplete_filament"]
        filament: String,
        #[description = "Price per kg. Leave empty to clear the override."] price_per_kg: Option<
            f64,
        >,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let filament_id = filament_id_from(&filament)?;
        let updated = filament::set_price_override(db, filament_id, price_per_kg).await?;
        let currency = settings::get_settings(db).await?.currency;

        let message = updated.price_per_kg.map_or_else(
            || format!("✅ Price override cleared for filament #{filament_id}."),
            |price| {
                format!(
                    "✅ Filament #{filament_id} now priced at {}/kg.",
                    report::format_price(price, &currency)
                )
            },
        );
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
