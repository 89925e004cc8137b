//! Brand suggestion list.
//!
//! Brands are only offered as input suggestions. Filaments store the brand as
//! free text, so removing a brand here never touches any filament.

use crate::{
    entities::{Brand, brand},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::info;

/// Lists all brands alphabetically.
pub async fn get_all_brands(db: &DatabaseConnection) -> Result<Vec<brand::Model>> {
    Brand::find()
        .order_by_asc(brand::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Brands whose name contains `partial`, for autocomplete.
pub async fn search_brands(
    db: &DatabaseConnection,
    partial: &str,
    limit: u64,
) -> Result<Vec<brand::Model>> {
    Brand::find()
        .filter(brand::Column::Name.contains(partial.trim()))
        .order_by_asc(brand::Column::Name)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a brand. Adding a name that already exists returns the existing row.
pub async fn add_brand(db: &DatabaseConnection, name: &str) -> Result<brand::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Brand name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = Brand::find()
        .filter(brand::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let brand = brand::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    brand.insert(db).await.map_err(Into::into)
}

/// Removes a brand from the suggestion list.
pub async fn delete_brand(db: &DatabaseConnection, brand_id: i64) -> Result<()> {
    let brand = Brand::find_by_id(brand_id)
        .one(db)
        .await?
        .ok_or(Error::BrandNotFound { id: brand_id })?;
    brand.delete(db).await?;
    Ok(())
}

/// Seeds the list with `names` when it is empty. Returns how many were added.
pub async fn seed_default_brands(db: &DatabaseConnection, names: &[String]) -> Result<usize> {
    if Brand::find().count(db).await? > 0 {
        return Ok(0);
    }

    let mut added = 0;
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        add_brand(db, name).await?;
        added += 1;
    }
    info!("Seeded {added} brands");
    Ok(added)
}
