//! Stock Discord command - inventory overview with status counts.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, commands::say_lines},
        core::{filament, report, settings, threshold::StockStatus},
        errors::Result,
    };

    /// Shows stock totals and every filament that is low or critical.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stock(
        ctx: Context<'_>,
        #[description = "List every filament, not only low and critical ones"] all: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let thresholds = ctx.data().thresholds.current();
        let currency = settings::get_settings(db).await?.currency;

        let filaments = filament::get_all_filaments(db).await?;
        let stats = report::StockStatistics::from_stock(&filaments, &thresholds);

        let mut lines = vec![
            "📦 **Filament Stock**".to_string(),
            format!(
                "{} filament(s), {} spool(s), {} on hand worth {}",
                stats.filaments,
                stats.spools,
                report::format_grams(stats.weight_remaining),
                report::format_price(stats.stock_value, &currency)
            ),
            format!(
                "{} {} ok | {} {} low | {} {} critical",
                StockStatus::Ok.emoji(),
                stats.ok,
                StockStatus::Low.emoji(),
                stats.low,
                StockStatus::Critical.emoji(),
                stats.critical
            ),
            format!(
                "Thresholds: low < {} | critical < {}",
                report::format_grams(thresholds.low),
                report::format_grams(thresholds.critical)
            ),
            String::new(),
        ];

        let show_all = all.unwrap_or(false);
        lines.extend(
            filaments
                .iter()
                .filter(|stock| show_all || stock.status(&thresholds) != StockStatus::Ok)
                .map(|stock| report::format_stock_line(stock, &thresholds)),
        );

        say_lines(ctx, &lines).await
    }
}

// Re-export all commands
pub use inner::*;
