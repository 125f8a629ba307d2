// Catching a creature and everything a catch feeds: XP, quests, season
// points and the species' beast.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{BeastInstance, Creature, Database, PlayerStats};
use crate::engine::beast::can_evolve;
use crate::engine::config::DEFAULT_CATCH_XP;
use crate::engine::creature::Rarity;
use crate::engine::player::{self, level_bounds, XpAward};
use crate::engine::season::points_for_rarity;
use crate::error::{Error, Result};
use crate::metrics;

// Each lost race means another award for the same user landed.
const MAX_AWARD_ATTEMPTS: usize = 32;

/// Award `base_xp` to the user, applying the streak rules for today.
///
/// The award is computed from a snapshot of the stats row and only written
/// if the row is unchanged, so concurrent awards all count.
pub async fn award_xp(
    db: &Database,
    user_id: &str,
    base_xp: i64,
    now: DateTime<Utc>,
) -> Result<XpAward> {
    let today = super::today(now);
    for _ in 0..MAX_AWARD_ATTEMPTS {
        let previous = db.get_or_create_stats(user_id, now).await?.into_inner().progress();
        let award = player::award_xp(&previous, base_xp, today);
        if db.save_xp_award(user_id, &previous, &award, today, now).await? {
            if award.level_up {
                tracing::info!(user_id, level = award.level, "Player levelled up");
            }
            return Ok(award);
        }
        tracing::debug!(user_id, "Stats changed during XP award, retrying");
    }
    Err(Error::InvalidInput("stats changed, try again".to_string()))
}

/// What the player is trying to catch.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchTarget {
    /// A live spawn; the spawn is consumed.
    Spawn(String),
    /// A creature by id, without a spawn.
    Creature(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchOutcome {
    pub creature: Creature,
    #[serde(rename = "user_id")]
    pub user_id: String,
    #[serde(flatten)]
    pub award: XpAward,
    pub beast_instance: BeastInstance,
    pub can_evolve: bool,
    /// Season total after this catch; `None` outside a season.
    pub season_points: Option<i64>,
}

/// Resolve the target and store the catch row. A spawn is consumed in the
/// same transaction as the insert.
async fn store_catch(
    db: &Database,
    user_id: &str,
    target: &CatchTarget,
    lat: Option<f64>,
    lng: Option<f64>,
    now: DateTime<Utc>,
) -> Result<Creature> {
    match target {
        CatchTarget::Spawn(spawn_id) => db
            .take_spawn_as_catch(spawn_id, user_id, lat, lng, now)
            .await?
            .ok_or(Error::NotFound("spawn")),
        CatchTarget::Creature(creature_id) => {
            let creature = db
                .get_creature(creature_id)
                .await?
                .ok_or(Error::NotFound("creature"))?;
            db.insert_catch(user_id, &creature.id, lat, lng, now)
                .await?;
            Ok(creature)
        }
    }
}

/// Record a catch for `user_id`, who must already exist.
pub async fn record_catch(
    db: &Database,
    user_id: &str,
    target: &CatchTarget,
    lat: Option<f64>,
    lng: Option<f64>,
    now: DateTime<Utc>,
) -> Result<CatchOutcome> {
    let creature = store_catch(db, user_id, target, lat, lng, now).await?;

    let rarity = Rarity::from_str_name(&creature.rarity);
    let base_xp = rarity.map(|r| r.catch_xp()).unwrap_or(DEFAULT_CATCH_XP);
    let award = award_xp(db, user_id, base_xp, now).await?;

    super::quests::advance_quests(db, user_id, &creature, super::today(now)).await?;

    let season_points = match db.current_season(now).await? {
        Some(season) => {
            let entry = db
                .add_season_points(&season.id, user_id, points_for_rarity(&creature.rarity), now)
                .await?;
            Some(entry.get().points)
        }
        None => None,
    };

    let beast = db.add_beast_catch(user_id, &creature.id, now).await?;
    if beast.was_created() {
        tracing::debug!(user_id, creature = %creature.id, "New beast");
    }
    let beast = beast.into_inner();
    let evolvable = can_evolve(beast.stage, beast.level);

    metrics::CATCHES_TOTAL
        .with_label_values(&[creature.rarity.as_str()])
        .inc();
    tracing::info!(
        user_id,
        creature = %creature.id,
        xp_gained = award.xp_gained,
        season_points = ?season_points,
        "Catch recorded"
    );

    Ok(CatchOutcome {
        creature,
        user_id: user_id.to_string(),
        award,
        beast_instance: beast,
        can_evolve: evolvable,
        season_points,
    })
}

/// Player stats with the XP bracket of the current level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    #[serde(flatten)]
    pub stats: PlayerStats,
    pub current_level_xp: i64,
    pub next_level_xp: Option<i64>,
}

impl StatsView {
    pub fn from_stats(stats: PlayerStats) -> Self {
        let (current_level_xp, next_level_xp) = level_bounds(stats.level);
        StatsView {
            stats,
            current_level_xp,
            next_level_xp,
        }
    }
}

pub async fn player_stats(db: &Database, user_id: &str, now: DateTime<Utc>) -> Result<StatsView> {
    let stats = db.get_or_create_stats(user_id, now).await?.into_inner();
    Ok(StatsView::from_stats(stats))
}
