// Procedural spawn layout planning.
//
// Given a seeded generator, a cell and the creature pools, produce the list of
// spawns to insert. Draw order per spawn is fixed: angle, distance, TTL
// jitter, rarity roll, pool pick. Changing it changes every layout.

use chrono::{DateTime, Duration, Utc};

use super::config::*;
use super::creature::Rarity;
use super::rng::Lcg;
use super::spatial::Cell;

/// Creature ids grouped by rarity.
#[derive(Debug, Clone, Default)]
pub struct SpawnPools {
    common: Vec<String>,
    uncommon: Vec<String>,
    rare: Vec<String>,
    legendary: Vec<String>,
}

impl SpawnPools {
    /// Build pools from `(creature_id, rarity)` pairs. Unknown rarities are
    /// never spawned.
    pub fn from_creatures<I, S, R>(creatures: I) -> Self
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: AsRef<str>,
    {
        let mut pools = SpawnPools::default();
        for (id, rarity) in creatures {
            if let Some(rarity) = Rarity::from_str_name(rarity.as_ref()) {
                pools.pool_mut(rarity).push(id.into());
            }
        }
        pools
    }

    pub fn pool(&self, rarity: Rarity) -> &[String] {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Uncommon => &self.uncommon,
            Rarity::Rare => &self.rare,
            Rarity::Legendary => &self.legendary,
        }
    }

    fn pool_mut(&mut self, rarity: Rarity) -> &mut Vec<String> {
        match rarity {
            Rarity::Common => &mut self.common,
            Rarity::Uncommon => &mut self.uncommon,
            Rarity::Rare => &mut self.rare,
            Rarity::Legendary => &mut self.legendary,
        }
    }

    pub fn has_legendary(&self) -> bool {
        !self.legendary.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        Rarity::ALL.iter().all(|r| self.pool(*r).is_empty())
    }
}

/// One spawn ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSpawn {
    pub creature_id: String,
    pub rarity: Rarity,
    pub lat: f64,
    pub lng: f64,
    pub expires_at: DateTime<Utc>,
}

/// Map a uniform roll to a rarity tier.
pub fn roll_rarity(roll: f64, legendary_eligible: bool) -> Rarity {
    if legendary_eligible && roll >= LEGENDARY_ROLL_MIN {
        Rarity::Legendary
    } else if roll < COMMON_ROLL_MAX {
        Rarity::Common
    } else if roll < UNCOMMON_ROLL_MAX {
        Rarity::Uncommon
    } else {
        Rarity::Rare
    }
}

/// Plan the spawns for `cell`.
///
/// Legendary creatures are only rolled while a season is active and the
/// legendary pool is non-empty. An empty rarity pool falls back to common; if
/// common is empty too the slot is skipped, but its draws are still consumed.
pub fn plan_spawns(
    rng: &mut Lcg,
    cell: Cell,
    pools: &SpawnPools,
    season_active: bool,
    now: DateTime<Utc>,
) -> Vec<PlannedSpawn> {
    let legendary_eligible = season_active && pools.has_legendary();
    let mut planned = Vec::with_capacity(SPAWN_COUNT_PER_CELL);

    for _ in 0..SPAWN_COUNT_PER_CELL {
        let angle = rng.next_f64() * std::f64::consts::PI * 2.0;
        let dist = rng.next_f64() * SPAWN_DIST_RANGE_DEG + SPAWN_MIN_DIST_DEG;
        let lat = cell.lat + angle.cos() * dist;
        let lng = cell.lng + angle.sin() * dist;

        let jitter = rng.next_f64() * (SPAWN_TTL_JITTER_HOURS * 2.0) - SPAWN_TTL_JITTER_HOURS;
        let ttl_ms = ((SPAWN_TTL_HOURS + jitter) * 3_600_000.0) as i64;
        let expires_at = now + Duration::milliseconds(ttl_ms);

        let mut rarity = roll_rarity(rng.next_f64(), legendary_eligible);
        if pools.pool(rarity).is_empty() {
            rarity = Rarity::Common;
        }
        let pick = rng.next_f64();

        let pool = pools.pool(rarity);
        if pool.is_empty() {
            continue;
        }
        let idx = ((pick * pool.len() as f64) as usize).min(pool.len() - 1);

        planned.push(PlannedSpawn {
            creature_id: pool[idx].clone(),
            rarity,
            lat,
            lng,
            expires_at,
        });
    }

    planned
}
