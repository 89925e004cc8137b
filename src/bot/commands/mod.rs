//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Brand suggestion list commands
pub mod brand;
/// Export, import, purge and reusable spool commands
pub mod data;
/// Filament catalog commands
pub mod filament;
/// General utility commands
pub mod general;
/// Settings commands
pub mod settings;
/// Spool ledger commands
pub mod spool;
/// Stock overview command
pub mod stock;
/// Usage recording command
pub mod usage;

use crate::{
    bot::{BotData, Context, MAX_MESSAGE_LEN},
    core::{filament::parse_filament_ref, report},
    errors::{Error, Result},
};

// Export commands
pub use brand::*;
pub use data::*;
pub use filament::*;
pub use general::*;
pub use settings::*;
pub use spool::*;
pub use stock::*;
pub use usage::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        filament(),
        spool(),
        use_filament(),
        stock(),
        settings(),
        brand(),
        containers(),
        export(),
        import(),
        purge(),
    ]
}

/// Resolves a filament option (an autocomplete label or a bare id) to an id.
pub(crate) fn filament_id_from(input: &str) -> Result<i64> {
    parse_filament_ref(input).ok_or_else(|| Error::Validation {
        message: format!("'{input}' is not a filament. Pick one from the suggestions."),
    })
}

/// Sends `lines` split over as many messages as needed.
pub(crate) async fn say_lines(ctx: Context<'_>, lines: &[String]) -> Result<()> {
    for chunk in report::chunk_lines(lines, MAX_MESSAGE_LEN) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
