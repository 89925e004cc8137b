//! Reusable spool tracking - keeps the spool-body ledger in step with the spools.
//!
//! A reusable body is tracked as soon as a reusable spool with filament on it
//! enters the ledger. When that spool runs out (or is deleted) the body is
//! released: it stays in the table, marked free, ready for the next refill.

use crate::{
    entities::{ReusableSpool, Spool, reusable_spool, spool},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use std::collections::HashSet;
use tracing::debug;

/// Body material recorded when the spool does not name one.
pub const DEFAULT_BODY_MATERIAL: &str = "plastic";

/// Starts tracking the body of `spool` if it is reusable, has filament left and
/// no body already points at it. Returns the new record when one was created.
pub async fn track_spool<C>(
    db: &C,
    spool: &spool::Model,
    created_at: DateTime<Utc>,
) -> Result<Option<reusable_spool::Model>>
where
    C: ConnectionTrait,
{
    if !spool.is_reusable || spool.weight_remaining <= 0.0 {
        return Ok(None);
    }

    let already_tracked = ReusableSpool::find()
        .filter(reusable_spool::Column::CurrentSpoolId.eq(spool.id))
        .one(db)
        .await?
        .is_some();
    if already_tracked {
        return Ok(None);
    }

    let body = reusable_spool::ActiveModel {
        material: Set(body_material(spool)),
        in_use: Set(true),
        current_spool_id: Set(Some(spool.id)),
        created_at: Set(created_at),
        ..Default::default()
    };
    let body = body.insert(db).await?;
    debug!("Tracking reusable body {} for spool {}", body.id, spool.id);
    Ok(Some(body))
}

/// Frees every body that currently holds `spool_id`. Returns how many were freed.
pub async fn release_for_spool<C>(db: &C, spool_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    release_where(db, reusable_spool::Column::CurrentSpoolId.eq(spool_id)).await
}

/// Frees every body that holds one of `spool_ids`.
pub async fn release_for_spools<C>(db: &C, spool_ids: &[i64]) -> Result<u64>
where
    C: ConnectionTrait,
{
    if spool_ids.is_empty() {
        return Ok(0);
    }
    release_where(
        db,
        reusable_spool::Column::CurrentSpoolId.is_in(spool_ids.iter().copied()),
    )
    .await
}

/// Frees every body that holds any spool at all.
pub(crate) async fn release_all<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    release_where(db, reusable_spool::Column::CurrentSpoolId.is_not_null()).await
}

async fn release_where<C>(db: &C, condition: sea_orm::sea_query::SimpleExpr) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ReusableSpool::update_many()
        .col_expr(reusable_spool::Column::InUse, Expr::value(false))
        .col_expr(
            reusable_spool::Column::CurrentSpoolId,
            Expr::value(Option::<i64>::None),
        )
        .filter(condition)
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        debug!("Released {} reusable bodies", result.rows_affected);
    }
    Ok(result.rows_affected)
}

/// Tracks every reusable spool with filament left that no body points at yet.
///
/// Running it twice over the same data creates nothing the second time.
/// New records take the spool's own creation time.
pub async fn track_untracked_spools<C>(db: &C) -> Result<usize>
where
    C: ConnectionTrait,
{
    let candidates = Spool::find()
        .filter(spool::Column::IsReusable.eq(true))
        .filter(spool::Column::WeightRemaining.gt(0.0))
        .order_by_asc(spool::Column::Id)
        .all(db)
        .await?;

    let tracked: HashSet<i64> = ReusableSpool::find()
        .filter(reusable_spool::Column::CurrentSpoolId.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .filter_map(|body| body.current_spool_id)
        .collect();

    let mut created = 0;
    for spool in candidates.iter().filter(|s| !tracked.contains(&s.id)) {
        let body = reusable_spool::ActiveModel {
            material: Set(body_material(spool)),
            in_use: Set(true),
            current_spool_id: Set(Some(spool.id)),
            created_at: Set(spool.created_at),
            ..Default::default()
        };
        body.insert(db).await?;
        created += 1;
    }
    Ok(created)
}

fn body_material(spool: &spool::Model) -> String {
    spool
        .spool_material
        .clone()
        .unwrap_or_else(|| DEFAULT_BODY_MATERIAL.to_string())
}

/// Lists every tracked body, oldest first.
pub async fn get_all_reusable_spools(db: &DatabaseConnection) -> Result<Vec<reusable_spool::Model>> {
    ReusableSpool::find()
        .order_by_asc(reusable_spool::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists bodies that are free for a refill.
pub async fn get_free_reusable_spools(
    db: &DatabaseConnection,
) -> Result<Vec<reusable_spool::Model>> {
    ReusableSpool::find()
        .filter(reusable_spool::Column::InUse.eq(false))
        .order_by_asc(reusable_spool::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a spare body that is not holding any spool.
pub async fn add_reusable_spool(
    db: &DatabaseConnection,
    material: String,
) -> Result<reusable_spool::Model> {
    let material = material.trim();
    if material.is_empty() {
        return Err(Error::Validation {
            message: "Spool body material cannot be empty".to_string(),
        });
    }

    let body = reusable_spool::ActiveModel {
        material: Set(material.to_string()),
        in_use: Set(false),
        current_spool_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    body.insert(db).await.map_err(Into::into)
}

/// Puts a body on `spool_id`, or frees it with `None`.
///
/// The referenced spool must exist and must not already sit in another body.
pub async fn assign_reusable_spool(
    db: &DatabaseConnection,
    body_id: i64,
    spool_id: Option<i64>,
) -> Result<reusable_spool::Model> {
    let mut body: reusable_spool::ActiveModel = ReusableSpool::find_by_id(body_id)
        .one(db)
        .await?
        .ok_or(Error::ReusableSpoolNotFound { id: body_id })?
        .into();

    if let Some(spool_id) = spool_id {
        Spool::find_by_id(spool_id)
            .one(db)
            .await?
            .ok_or(Error::SpoolNotFound { id: spool_id })?;

        if let Some(holder) = get_body_for_spool(db, spool_id)
            .await?
            .filter(|b| b.id != body_id)
        {
            return Err(Error::Validation {
                message: format!("Spool #{spool_id} is already held by body #{}", holder.id),
            });
        }
    }

    body.in_use = Set(spool_id.is_some());
    body.current_spool_id = Set(spool_id);
    body.update(db).await.map_err(Into::into)
}

/// Permanently removes a body from tracking.
pub async fn delete_reusable_spool(db: &DatabaseConnection, body_id: i64) -> Result<()> {
    let body = ReusableSpool::find_by_id(body_id)
        .one(db)
        .await?
        .ok_or(Error::ReusableSpoolNotFound { id: body_id })?;
    body.delete(db).await?;
    Ok(())
}

/// Finds the body currently holding `spool_id`.
pub async fn get_body_for_spool<C>(db: &C, spool_id: i64) -> Result<Option<reusable_spool::Model>>
where
    C: ConnectionTrait,
{
    ReusableSpool::find()
        .filter(reusable_spool::Column::CurrentSpoolId.eq(spool_id))
        .one(db)
        .await
        .map_err(Into::into)
}
