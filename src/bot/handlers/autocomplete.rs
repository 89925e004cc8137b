//! Autocomplete handlers for Discord slash command parameters.
//!
//! Filament suggestions are labels ending in `#<id>` so the command can
//! resolve them exactly; brand suggestions are plain names.

use crate::{
    bot::Context,
    core::{brand, filament},
};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Suggests filaments whose name contains `partial`, newest first.
pub async fn autocomplete_filament(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(filaments) = filament::get_all_filaments(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    filaments
        .iter()
        .map(filament::FilamentStock::label)
        .filter(|label| label.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggests known brands matching `partial`.
pub async fn autocomplete_brand(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = &ctx.data().database;

    let limit = u64::try_from(MAX_SUGGESTIONS).unwrap_or(u64::MAX);
    let Ok(brands) = brand::search_brands(db, partial, limit).await else {
        return Vec::new();
    };

    brands.into_iter().map(|b| b.name).collect()
}

/// Suggests common filament materials.
pub async fn autocomplete_material(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    let materials = [
        "PLA", "PLA+", "PETG", "ABS", "ASA", "TPU", "PC", "Nylon", "PVA", "HIPS",
    ];

    let partial_lower = partial.to_lowercase();
    materials
        .iter()
        .filter(|m| m.to_lowercase().contains(&partial_lower))
        .map(|&m| m.to_string())
        .collect()
}
