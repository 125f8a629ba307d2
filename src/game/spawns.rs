// Lazy, deterministic spawn generation for the grid cell around a player.

use chrono::{DateTime, Utc};

use crate::db::{Database, SpawnView};
use crate::engine::config::{DEFAULT_RADIUS_KM, GC_MARGIN_CELLS, LIVE_CHECK_MARGIN_CELLS};
use crate::engine::rng::Lcg;
use crate::engine::spatial::{BoundingBox, Cell};
use crate::engine::spawn::{plan_spawns, SpawnPools};
use crate::error::Result;
use crate::metrics;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The area already had live spawns; nothing was written.
    AlreadyPopulated { live: i64 },
    Generated { created: usize, expired_removed: u64 },
}

/// Populate the cell containing `(lat, lng)` if nothing live is nearby.
///
/// The check, the expired-spawn sweep and the insert run under the
/// database's spawn lock, so two requests for the same empty cell produce
/// one layout.
pub async fn generate_spawns_near(
    db: &Database,
    lat: f64,
    lng: f64,
    now: DateTime<Utc>,
) -> Result<GenerationOutcome> {
    let cell = Cell::containing(lat, lng);
    let _guard = db.spawn_lock().await;

    let live = db
        .count_live_spawns(&cell.bounds(LIVE_CHECK_MARGIN_CELLS), now)
        .await?;
    if live > 0 {
        tracing::debug!(cell_lat = cell.lat, cell_lng = cell.lng, live, "Cell already populated");
        return Ok(GenerationOutcome::AlreadyPopulated { live });
    }

    let expired_removed = db
        .delete_expired_spawns(&cell.bounds(GC_MARGIN_CELLS), now)
        .await?;

    let creatures = db.list_creatures().await?;
    let pools = SpawnPools::from_creatures(creatures.iter().map(|c| (c.id.as_str(), &c.rarity)));
    let season_active = db.current_season(now).await?.is_some();

    let mut rng = Lcg::new(cell.seed(super::today(now)));
    let planned = plan_spawns(&mut rng, cell, &pools, season_active, now);
    db.insert_spawns(&planned, now).await?;

    metrics::SPAWN_CELLS_GENERATED_TOTAL.inc();
    for spawn in &planned {
        metrics::SPAWNS_CREATED_TOTAL
            .with_label_values(&[spawn.rarity.as_str()])
            .inc();
    }
    tracing::info!(
        cell_lat = cell.lat,
        cell_lng = cell.lng,
        created = planned.len(),
        expired_removed,
        "Generated spawns"
    );

    Ok(GenerationOutcome::Generated {
        created: planned.len(),
        expired_removed,
    })
}

/// Radius for a spawn/presence query. Missing, invalid or non-positive
/// values fall back to the default.
pub fn effective_radius_km(radius: Option<f64>) -> f64 {
    match radius {
        Some(r) if r.is_finite() && r > 0.0 => r,
        _ => DEFAULT_RADIUS_KM,
    }
}

/// Live spawns within `radius_km` of the point, generating the local cell
/// first if the area turns out to be empty.
pub async fn spawns_near(
    db: &Database,
    lat: f64,
    lng: f64,
    radius_km: Option<f64>,
    now: DateTime<Utc>,
) -> Result<Vec<SpawnView>> {
    let area = BoundingBox::from_radius_km(lat, lng, effective_radius_km(radius_km));
    let rows = db.live_spawns_in(&area, now).await?;
    if !rows.is_empty() {
        return Ok(rows);
    }
    generate_spawns_near(db, lat, lng, now).await?;
    Ok(db.live_spawns_in(&area, now).await?)
}
