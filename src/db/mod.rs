// Database access layer (SQLite via sqlx).

pub mod seed;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tokio::sync::{Mutex, MutexGuard};

use crate::engine::beast::{beast_level, beast_xp_after_catch};
use crate::engine::config::{BEAST_XP_CAP, BEAST_XP_PER_CATCH, BEAST_XP_PER_LEVEL, MAX_BEAST_LEVEL};
use crate::engine::player::{Progress, XpAward};
use crate::engine::spatial::BoundingBox;
use crate::engine::spawn::PlannedSpawn;

/// Format an instant the way SQLite's `datetime()` does.
pub fn sql_datetime(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn sql_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Result of a get-or-create lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum GetOrCreate<T> {
    Existed(T),
    Created(T),
}

impl<T> GetOrCreate<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, GetOrCreate::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            GetOrCreate::Existed(v) | GetOrCreate::Created(v) => v,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            GetOrCreate::Existed(v) | GetOrCreate::Created(v) => v,
        }
    }
}

// ── Row types ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creature {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub rarity: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub creature_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CreatureEvolution {
    pub id: String,
    pub base_creature_id: String,
    pub stage: i64,
    pub name: String,
    pub image_url: String,
}

/// A live spawn joined with its creature.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpawnView {
    pub id: String,
    pub creature_id: String,
    pub lat: f64,
    pub lng: f64,
    pub expires_at: Option<String>,
    pub name: String,
    pub image_url: Option<String>,
    pub rarity: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub creature_type: String,
}

/// A catch joined with its creature.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatchView {
    pub id: String,
    pub creature_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub caught_at: String,
    pub name: String,
    pub image_url: Option<String>,
    pub rarity: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub creature_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerStats {
    pub user_id: String,
    pub xp: i64,
    pub coins: i64,
    pub level: i64,
    pub streak: i64,
    pub last_active_date: Option<String>,
    pub updated_at: String,
}

impl PlayerStats {
    pub fn progress(&self) -> Progress {
        Progress {
            xp: self.xp,
            level: self.level,
            streak: self.streak,
            last_active: self
                .last_active_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestDef {
    pub id: String,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub quest_type: String,
    pub target_value: Option<String>,
    pub required: i64,
    pub xp_reward: i64,
    pub coin_reward: i64,
}

/// A user's daily quest joined with its definition.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyQuestView {
    pub id: String,
    pub progress: i64,
    pub claimed: bool,
    pub title: String,
    pub description: String,
    pub required: i64,
    pub xp_reward: i64,
    pub coin_reward: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub quest_type: String,
    pub target_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BeastInstance {
    pub id: String,
    pub user_id: String,
    pub base_creature_id: String,
    pub stage: i64,
    pub level: i64,
    pub beast_xp: i64,
    pub evolved_at: Option<String>,
    pub first_caught_at: String,
}

/// A beast joined with its current evolution stage and species.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BeastView {
    pub id: String,
    pub base_creature_id: String,
    pub stage: i64,
    pub level: i64,
    pub beast_xp: i64,
    pub evolved_at: Option<String>,
    pub first_caught_at: String,
    pub current_name: String,
    pub current_image: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub creature_type: String,
    pub rarity: String,
    pub total_caught: i64,
}

/// A season joined with its exclusive creature, if any.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Season {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub element: String,
    pub exclusive_creature_id: Option<String>,
    pub starts_at: String,
    pub ends_at: String,
    pub excl_name: Option<String>,
    pub excl_image: Option<String>,
    pub excl_rarity: Option<String>,
    pub excl_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeasonEntry {
    pub id: String,
    pub season_id: String,
    pub user_id: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub display_name: Option<String>,
    pub xp: i64,
    pub level: i64,
    pub streak: i64,
    pub species_count: i64,
    pub total_caught: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeasonLeaderboardRow {
    pub user_id: String,
    pub display_name: Option<String>,
    pub level: i64,
    pub streak: i64,
    pub points: i64,
}

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        display_name TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS creatures (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        image_url TEXT,
        rarity TEXT NOT NULL,
        type TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spawns (
        id TEXT PRIMARY KEY,
        creature_id TEXT NOT NULL REFERENCES creatures(id),
        lat REAL NOT NULL,
        lng REAL NOT NULL,
        expires_at TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    // spawn_id is a plain reference: spawns are deleted once caught or expired
    r#"
    CREATE TABLE IF NOT EXISTS catches (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        creature_id TEXT NOT NULL REFERENCES creatures(id),
        spawn_id TEXT,
        lat REAL,
        lng REAL,
        caught_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_spawns_lat_lng ON spawns(lat, lng)",
    "CREATE INDEX IF NOT EXISTS idx_spawns_expires ON spawns(expires_at)",
    "CREATE INDEX IF NOT EXISTS idx_catches_user ON catches(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_catches_lat_lng ON catches(lat, lng)",
    r#"
    CREATE TABLE IF NOT EXISTS player_stats (
        user_id TEXT PRIMARY KEY REFERENCES users(id),
        xp INTEGER NOT NULL DEFAULT 0,
        coins INTEGER NOT NULL DEFAULT 0,
        level INTEGER NOT NULL DEFAULT 1,
        streak INTEGER NOT NULL DEFAULT 0,
        last_active_date TEXT,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quest_defs (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        type TEXT NOT NULL,
        target_value TEXT,
        required INTEGER NOT NULL,
        xp_reward INTEGER NOT NULL DEFAULT 50,
        coin_reward INTEGER NOT NULL DEFAULT 10
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_quests (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        quest_def_id TEXT NOT NULL REFERENCES quest_defs(id),
        date TEXT NOT NULL,
        progress INTEGER NOT NULL DEFAULT 0,
        claimed INTEGER NOT NULL DEFAULT 0,
        claimed_at TEXT,
        UNIQUE(user_id, quest_def_id, date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_daily_quests_user_date ON daily_quests(user_id, date)",
    r#"
    CREATE TABLE IF NOT EXISTS creature_evolutions (
        id TEXT PRIMARY KEY,
        base_creature_id TEXT NOT NULL REFERENCES creatures(id),
        stage INTEGER NOT NULL,
        name TEXT NOT NULL,
        image_url TEXT NOT NULL,
        UNIQUE(base_creature_id, stage)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS beast_instances (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        base_creature_id TEXT NOT NULL REFERENCES creatures(id),
        stage INTEGER NOT NULL DEFAULT 1,
        level INTEGER NOT NULL DEFAULT 1,
        beast_xp INTEGER NOT NULL DEFAULT 0,
        evolved_at TEXT,
        first_caught_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(user_id, base_creature_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_beast_instances_user ON beast_instances(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS seasons (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        theme TEXT NOT NULL,
        element TEXT NOT NULL,
        exclusive_creature_id TEXT REFERENCES creatures(id),
        starts_at TEXT NOT NULL,
        ends_at TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS season_entries (
        id TEXT PRIMARY KEY,
        season_id TEXT NOT NULL REFERENCES seasons(id),
        user_id TEXT NOT NULL REFERENCES users(id),
        points INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(season_id, user_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_season_entries_season ON season_entries(season_id, points DESC)",
];

const SPAWN_VIEW_SELECT: &str = r#"
    SELECT s.id, s.creature_id, s.lat, s.lng, s.expires_at,
           c.name, c.image_url, c.rarity, c.type
    FROM spawns s JOIN creatures c ON c.id = s.creature_id
"#;

const DAILY_QUEST_SELECT: &str = r#"
    SELECT dq.id, dq.progress, dq.claimed,
           qd.title, qd.description, qd.required, qd.xp_reward, qd.coin_reward,
           qd.type, qd.target_value
    FROM daily_quests dq JOIN quest_defs qd ON qd.id = dq.quest_def_id
"#;

const SEASON_SELECT: &str = r#"
    SELECT s.id, s.name, s.theme, s.element, s.exclusive_creature_id, s.starts_at, s.ends_at,
           c.name AS excl_name, c.image_url AS excl_image,
           c.rarity AS excl_rarity, c.type AS excl_type
    FROM seasons s
    LEFT JOIN creatures c ON c.id = s.exclusive_creature_id
"#;

const BEAST_COLUMNS: &str =
    "id, user_id, base_creature_id, stage, level, beast_xp, evolved_at, first_caught_at";

pub struct Database {
    pool: SqlitePool,
    spawn_lock: Mutex<()>,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory database lives and dies with its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;
        let db = Self {
            pool,
            spawn_lock: Mutex::new(()),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Serializes spawn generation across request handlers.
    pub async fn spawn_lock(&self) -> MutexGuard<'_, ()> {
        self.spawn_lock.lock().await
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, display_name, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Ensure a user row exists, filling in `display_name` when it is missing.
    pub async fn ensure_user(
        &self,
        id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<GetOrCreate<User>, sqlx::Error> {
        if let Some(user) = self.get_user(id).await? {
            if user.display_name.is_some() {
                return Ok(GetOrCreate::Existed(user));
            }
            sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
                .bind(display_name)
                .bind(id)
                .execute(&self.pool)
                .await?;
            return Ok(GetOrCreate::Existed(User {
                display_name: Some(display_name.to_string()),
                ..user
            }));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET display_name = COALESCE(users.display_name, excluded.display_name)
            RETURNING id, display_name, created_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(sql_datetime(now))
        .fetch_one(&self.pool)
        .await?;
        Ok(GetOrCreate::Created(user))
    }

    pub async fn set_display_name(&self, id: &str, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Creatures ─────────────────────────────────────────────────────

    pub async fn list_creatures(&self) -> Result<Vec<Creature>, sqlx::Error> {
        sqlx::query_as::<_, Creature>(
            "SELECT id, name, image_url, rarity, type FROM creatures ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_creature(&self, id: &str) -> Result<Option<Creature>, sqlx::Error> {
        sqlx::query_as::<_, Creature>(
            "SELECT id, name, image_url, rarity, type FROM creatures WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_evolution(
        &self,
        base_creature_id: &str,
        stage: i64,
    ) -> Result<Option<CreatureEvolution>, sqlx::Error> {
        sqlx::query_as::<_, CreatureEvolution>(
            "SELECT id, base_creature_id, stage, name, image_url FROM creature_evolutions WHERE base_creature_id = ? AND stage = ?",
        )
        .bind(base_creature_id)
        .bind(stage)
        .fetch_optional(&self.pool)
        .await
    }

    // ── Spawns ────────────────────────────────────────────────────────

    pub async fn count_live_spawns(
        &self,
        area: &BoundingBox,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM spawns
            WHERE lat BETWEEN ? AND ? AND lng BETWEEN ? AND ?
            AND (expires_at IS NULL OR expires_at > ?)
            "#,
        )
        .bind(area.min_lat)
        .bind(area.max_lat)
        .bind(area.min_lng)
        .bind(area.max_lng)
        .bind(sql_datetime(now))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_expired_spawns(
        &self,
        area: &BoundingBox,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM spawns
            WHERE lat BETWEEN ? AND ? AND lng BETWEEN ? AND ?
            AND expires_at IS NOT NULL AND expires_at <= ?
            "#,
        )
        .bind(area.min_lat)
        .bind(area.max_lat)
        .bind(area.min_lng)
        .bind(area.max_lng)
        .bind(sql_datetime(now))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every expired spawn, wherever it is.
    pub async fn purge_expired_spawns(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM spawns WHERE expires_at IS NOT NULL AND expires_at <= ?")
                .bind(sql_datetime(now))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Insert a whole layout in one transaction.
    pub async fn insert_spawns(
        &self,
        spawns: &[PlannedSpawn],
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let created_at = sql_datetime(now);
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(spawns.len());
        for spawn in spawns {
            let id = new_id();
            sqlx::query(
                "INSERT INTO spawns (id, creature_id, lat, lng, expires_at, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&spawn.creature_id)
            .bind(spawn.lat)
            .bind(spawn.lng)
            .bind(sql_datetime(spawn.expires_at))
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn live_spawns_in(
        &self,
        area: &BoundingBox,
        now: DateTime<Utc>,
    ) -> Result<Vec<SpawnView>, sqlx::Error> {
        let sql = format!(
            "{SPAWN_VIEW_SELECT} WHERE s.lat BETWEEN ? AND ? AND s.lng BETWEEN ? AND ? AND (s.expires_at IS NULL OR s.expires_at > ?) ORDER BY s.expires_at"
        );
        sqlx::query_as::<_, SpawnView>(&sql)
            .bind(area.min_lat)
            .bind(area.max_lat)
            .bind(area.min_lng)
            .bind(area.max_lng)
            .bind(sql_datetime(now))
            .fetch_all(&self.pool)
            .await
    }

    /// Remove a live spawn and record it as `user_id`'s catch in one
    /// transaction, returning the caught creature. Expired or unknown spawns
    /// yield `None` and change nothing.
    pub async fn take_spawn_as_catch(
        &self,
        spawn_id: &str,
        user_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Creature>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let creature_id: Option<String> = sqlx::query_scalar(
            "DELETE FROM spawns WHERE id = ? AND (expires_at IS NULL OR expires_at > ?) RETURNING creature_id",
        )
        .bind(spawn_id)
        .bind(sql_datetime(now))
        .fetch_optional(&mut *tx)
        .await?;
        let Some(creature_id) = creature_id else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO catches (id, user_id, creature_id, spawn_id, lat, lng, caught_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(user_id)
        .bind(&creature_id)
        .bind(spawn_id)
        .bind(lat)
        .bind(lng)
        .bind(sql_datetime(now))
        .execute(&mut *tx)
        .await?;

        let creature = sqlx::query_as::<_, Creature>(
            "SELECT id, name, image_url, rarity, type FROM creatures WHERE id = ?",
        )
        .bind(&creature_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(creature))
    }

    // ── Catches ───────────────────────────────────────────────────────

    /// Record a catch that did not come from a spawn.
    pub async fn insert_catch(
        &self,
        user_id: &str,
        creature_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<String, sqlx::Error> {
        let id = new_id();
        sqlx::query(
            "INSERT INTO catches (id, user_id, creature_id, lat, lng, caught_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(creature_id)
        .bind(lat)
        .bind(lng)
        .bind(sql_datetime(now))
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn list_catches(&self, user_id: &str) -> Result<Vec<CatchView>, sqlx::Error> {
        sqlx::query_as::<_, CatchView>(
            r#"
            SELECT ca.id, ca.creature_id, ca.lat, ca.lng, ca.caught_at,
                   c.name, c.image_url, c.rarity, c.type
            FROM catches ca JOIN creatures c ON c.id = ca.creature_id
            WHERE ca.user_id = ?
            ORDER BY ca.caught_at DESC, ca.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// (total catches, distinct species) for a user.
    pub async fn catch_counts(&self, user_id: &str) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(DISTINCT creature_id) FROM catches WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn has_caught(&self, user_id: &str, creature_id: &str) -> Result<bool, sqlx::Error> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT id FROM catches WHERE user_id = ? AND creature_id = ? LIMIT 1")
                .bind(user_id)
                .bind(creature_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    // ── Player stats ──────────────────────────────────────────────────

    pub async fn get_stats(&self, user_id: &str) -> Result<Option<PlayerStats>, sqlx::Error> {
        sqlx::query_as::<_, PlayerStats>(
            "SELECT user_id, xp, coins, level, streak, last_active_date, updated_at FROM player_stats WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_or_create_stats(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GetOrCreate<PlayerStats>, sqlx::Error> {
        if let Some(stats) = self.get_stats(user_id).await? {
            return Ok(GetOrCreate::Existed(stats));
        }
        sqlx::query("INSERT OR IGNORE INTO player_stats (user_id, updated_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(sql_datetime(now))
            .execute(&self.pool)
            .await?;
        let stats = self
            .get_stats(user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(GetOrCreate::Created(stats))
    }

    /// Store an award computed from `previous`. Only applies if the row
    /// still matches `previous`; returns false when another award got there
    /// first.
    pub async fn save_xp_award(
        &self,
        user_id: &str,
        previous: &Progress,
        award: &XpAward,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE player_stats SET xp = ?, level = ?, streak = ?, last_active_date = ?, updated_at = ?
            WHERE user_id = ? AND xp = ? AND streak = ? AND last_active_date IS ?
            "#,
        )
        .bind(award.xp)
        .bind(award.level)
        .bind(award.streak)
        .bind(sql_date(today))
        .bind(sql_datetime(now))
        .bind(user_id)
        .bind(previous.xp)
        .bind(previous.streak)
        .bind(previous.last_active.map(sql_date))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn add_coins(
        &self,
        user_id: &str,
        coins: i64,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE player_stats SET coins = coins + ?, updated_at = ? WHERE user_id = ?")
            .bind(coins)
            .bind(sql_datetime(now))
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Quests ────────────────────────────────────────────────────────

    pub async fn list_quest_defs(&self) -> Result<Vec<QuestDef>, sqlx::Error> {
        sqlx::query_as::<_, QuestDef>(
            "SELECT id, title, description, type, target_value, required, xp_reward, coin_reward FROM quest_defs ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_daily_quests(&self, user_id: &str, date: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM daily_quests WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn insert_daily_quests(
        &self,
        user_id: &str,
        date: &str,
        quest_def_ids: &[&str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for def_id in quest_def_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO daily_quests (id, user_id, quest_def_id, date) VALUES (?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(user_id)
            .bind(def_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn list_daily_quests(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<DailyQuestView>, sqlx::Error> {
        let sql = format!("{DAILY_QUEST_SELECT} WHERE dq.user_id = ? AND dq.date = ? ORDER BY dq.rowid");
        sqlx::query_as::<_, DailyQuestView>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_daily_quest(
        &self,
        quest_id: &str,
        user_id: &str,
    ) -> Result<Option<DailyQuestView>, sqlx::Error> {
        let sql = format!("{DAILY_QUEST_SELECT} WHERE dq.id = ? AND dq.user_id = ?");
        sqlx::query_as::<_, DailyQuestView>(&sql)
            .bind(quest_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Count one more step on an open quest, capped at `required`.
    /// Returns false if the quest was already complete or claimed.
    pub async fn advance_quest_progress(
        &self,
        quest_id: &str,
        required: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE daily_quests SET progress = MIN(progress + 1, ?) WHERE id = ? AND claimed = 0 AND progress < ?",
        )
        .bind(required)
        .bind(quest_id)
        .bind(required)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the claimed flag. Returns false if it was already set.
    pub async fn mark_quest_claimed(
        &self,
        quest_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE daily_quests SET claimed = 1, claimed_at = ? WHERE id = ? AND claimed = 0")
                .bind(sql_datetime(now))
                .bind(quest_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Beasts ────────────────────────────────────────────────────────

    pub async fn get_beast(
        &self,
        beast_id: &str,
        user_id: &str,
    ) -> Result<Option<BeastInstance>, sqlx::Error> {
        let sql = format!("SELECT {BEAST_COLUMNS} FROM beast_instances WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, BeastInstance>(&sql)
            .bind(beast_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Feed one catch to the user's beast of this species, creating it at
    /// stage 1 on the first catch.
    pub async fn add_beast_catch(
        &self,
        user_id: &str,
        base_creature_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GetOrCreate<BeastInstance>, sqlx::Error> {
        let id = new_id();
        let first_xp = beast_xp_after_catch(None);
        let sql = format!(
            r#"
            INSERT INTO beast_instances (id, user_id, base_creature_id, stage, level, beast_xp, first_caught_at)
            VALUES (?, ?, ?, 1, ?, ?, ?)
            ON CONFLICT(user_id, base_creature_id) DO UPDATE SET
                beast_xp = MIN(beast_instances.beast_xp + ?, ?),
                level = MIN(MIN(beast_instances.beast_xp + ?, ?) / ? + 1, ?)
            RETURNING {BEAST_COLUMNS}
            "#
        );
        let beast = sqlx::query_as::<_, BeastInstance>(&sql)
            .bind(&id)
            .bind(user_id)
            .bind(base_creature_id)
            .bind(beast_level(first_xp))
            .bind(first_xp)
            .bind(sql_datetime(now))
            .bind(BEAST_XP_PER_CATCH)
            .bind(BEAST_XP_CAP)
            .bind(BEAST_XP_PER_CATCH)
            .bind(BEAST_XP_CAP)
            .bind(BEAST_XP_PER_LEVEL)
            .bind(MAX_BEAST_LEVEL)
            .fetch_one(&self.pool)
            .await?;
        if beast.id == id {
            Ok(GetOrCreate::Created(beast))
        } else {
            Ok(GetOrCreate::Existed(beast))
        }
    }

    /// Move a beast from `from_stage` to `to_stage`. Returns false if the
    /// stage changed underneath us.
    pub async fn set_beast_stage(
        &self,
        beast_id: &str,
        from_stage: i64,
        to_stage: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE beast_instances SET stage = ?, evolved_at = ? WHERE id = ? AND stage = ?",
        )
        .bind(to_stage)
        .bind(sql_datetime(now))
        .bind(beast_id)
        .bind(from_stage)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_beasts(&self, user_id: &str) -> Result<Vec<BeastView>, sqlx::Error> {
        sqlx::query_as::<_, BeastView>(
            r#"
            SELECT bi.id, bi.base_creature_id, bi.stage, bi.level, bi.beast_xp,
                   bi.evolved_at, bi.first_caught_at,
                   COALESCE(ce.name, c.name) AS current_name,
                   COALESCE(ce.image_url, c.image_url) AS current_image,
                   c.type, c.rarity,
                   (SELECT COUNT(*) FROM catches ca
                    WHERE ca.user_id = bi.user_id AND ca.creature_id = bi.base_creature_id) AS total_caught
            FROM beast_instances bi
            JOIN creatures c ON c.id = bi.base_creature_id
            LEFT JOIN creature_evolutions ce
                   ON ce.base_creature_id = bi.base_creature_id AND ce.stage = bi.stage
            WHERE bi.user_id = ?
            ORDER BY bi.first_caught_at ASC, bi.rowid ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    // ── Seasons ───────────────────────────────────────────────────────

    /// The season running at `now`; the earliest-starting one if several overlap.
    pub async fn current_season(&self, now: DateTime<Utc>) -> Result<Option<Season>, sqlx::Error> {
        let sql = format!("{SEASON_SELECT} WHERE ? BETWEEN s.starts_at AND s.ends_at ORDER BY s.starts_at LIMIT 1");
        sqlx::query_as::<_, Season>(&sql)
            .bind(sql_datetime(now))
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_season_entry(
        &self,
        season_id: &str,
        user_id: &str,
    ) -> Result<Option<SeasonEntry>, sqlx::Error> {
        sqlx::query_as::<_, SeasonEntry>(
            "SELECT id, season_id, user_id, points FROM season_entries WHERE season_id = ? AND user_id = ?",
        )
        .bind(season_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Add points to a user's season entry, creating it on first use.
    pub async fn add_season_points(
        &self,
        season_id: &str,
        user_id: &str,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<GetOrCreate<SeasonEntry>, sqlx::Error> {
        let updated_at = sql_datetime(now);
        if self.get_season_entry(season_id, user_id).await?.is_some() {
            let entry = sqlx::query_as::<_, SeasonEntry>(
                "UPDATE season_entries SET points = points + ?, updated_at = ? WHERE season_id = ? AND user_id = ? RETURNING id, season_id, user_id, points",
            )
            .bind(points)
            .bind(&updated_at)
            .bind(season_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            return Ok(GetOrCreate::Existed(entry));
        }

        let entry = sqlx::query_as::<_, SeasonEntry>(
            r#"
            INSERT INTO season_entries (id, season_id, user_id, points, updated_at) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(season_id, user_id) DO UPDATE
                SET points = season_entries.points + excluded.points, updated_at = excluded.updated_at
            RETURNING id, season_id, user_id, points
            "#,
        )
        .bind(new_id())
        .bind(season_id)
        .bind(user_id)
        .bind(points)
        .bind(&updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(GetOrCreate::Created(entry))
    }

    /// 1 + number of entries in the season with strictly more points.
    pub async fn season_rank(&self, season_id: &str, points: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) + 1 FROM season_entries WHERE season_id = ? AND points > ?",
        )
        .bind(season_id)
        .bind(points)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn season_leaderboard(
        &self,
        season_id: &str,
        limit: i64,
    ) -> Result<Vec<SeasonLeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, SeasonLeaderboardRow>(
            r#"
            SELECT u.id AS user_id, u.display_name,
                   COALESCE(ps.level, 1) AS level, COALESCE(ps.streak, 0) AS streak,
                   se.points
            FROM season_entries se
            JOIN users u ON u.id = se.user_id
            LEFT JOIN player_stats ps ON ps.user_id = se.user_id
            WHERE se.season_id = ?
            ORDER BY se.points DESC, se.updated_at ASC
            LIMIT ?
            "#,
        )
        .bind(season_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    // ── Leaderboards ──────────────────────────────────────────────────

    pub async fn leaderboard_global(&self, limit: i64) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT u.id AS user_id, u.display_name,
                   ps.xp, ps.level, ps.streak,
                   COUNT(DISTINCT ca.creature_id) AS species_count,
                   COUNT(ca.id) AS total_caught
            FROM users u
            JOIN player_stats ps ON ps.user_id = u.id
            LEFT JOIN catches ca ON ca.user_id = u.id
            GROUP BY u.id
            ORDER BY ps.xp DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Players with at least one catch inside `area`, counting only those catches.
    pub async fn leaderboard_local(
        &self,
        area: &BoundingBox,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT u.id AS user_id, u.display_name,
                   ps.xp, ps.level, ps.streak,
                   COUNT(DISTINCT ca.creature_id) AS species_count,
                   COUNT(ca.id) AS total_caught
            FROM users u
            JOIN player_stats ps ON ps.user_id = u.id
            JOIN catches ca ON ca.user_id = u.id
            WHERE ca.lat BETWEEN ? AND ? AND ca.lng BETWEEN ? AND ?
            GROUP BY u.id
            ORDER BY ps.xp DESC
            LIMIT ?
            "#,
        )
        .bind(area.min_lat)
        .bind(area.max_lat)
        .bind(area.min_lng)
        .bind(area.max_lng)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// 1 + number of players with strictly more XP.
    pub async fn xp_rank(&self, xp: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) + 1 FROM player_stats WHERE xp > ?")
            .bind(xp)
            .fetch_one(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::engine::creature::Rarity;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    async fn add_creature(db: &Database, id: &str, rarity: &str, ctype: &str) {
        sqlx::query("INSERT INTO creatures (id, name, image_url, rarity, type) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(id)
            .bind(format!("/creatures/{id}.svg"))
            .bind(rarity)
            .bind(ctype)
            .execute(&db.pool)
            .await
            .unwrap();
    }

    fn planned(creature_id: &str, lat: f64, lng: f64, expires_at: DateTime<Utc>) -> PlannedSpawn {
        PlannedSpawn {
            creature_id: creature_id.to_string(),
            rarity: Rarity::Common,
            lat,
            lng,
            expires_at,
        }
    }

    #[test]
    fn test_sql_datetime_format() {
        assert_eq!(sql_datetime(now()), "2026-10-14 12:00:00");
        assert_eq!(sql_date(now().date_naive()), "2026-10-14");
    }

    #[tokio::test]
    async fn test_ensure_user_get_or_create() {
        let db = test_db().await;
        let first = db.ensure_user("u1", "EmberScout01", now()).await.unwrap();
        assert!(first.was_created());
        assert_eq!(first.get().display_name.as_deref(), Some("EmberScout01"));

        let second = db.ensure_user("u1", "Other", now()).await.unwrap();
        assert!(!second.was_created());
        assert_eq!(second.into_inner().display_name.as_deref(), Some("EmberScout01"));

        assert!(db.set_display_name("u1", "Ash").await.unwrap());
        assert!(!db.set_display_name("missing", "Ash").await.unwrap());
    }

    #[tokio::test]
    async fn test_live_spawn_queries_respect_expiry() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        let area = BoundingBox::around(10.0, 10.0, 0.01);

        db.insert_spawns(
            &[
                planned("ember-fox", 10.001, 10.001, now() + Duration::hours(1)),
                planned("ember-fox", 10.002, 10.002, now() - Duration::hours(1)),
                planned("ember-fox", 20.0, 20.0, now() + Duration::hours(1)),
            ],
            now(),
        )
        .await
        .unwrap();

        assert_eq!(db.count_live_spawns(&area, now()).await.unwrap(), 1);
        let live = db.live_spawns_in(&area, now()).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].creature_type, "fire");

        assert_eq!(db.delete_expired_spawns(&area, now()).await.unwrap(), 1);
        assert_eq!(db.delete_expired_spawns(&area, now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_take_spawn_only_once() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        let ids = db
            .insert_spawns(&[planned("ember-fox", 1.0, 1.0, now() + Duration::hours(2))], now())
            .await
            .unwrap();

        db.ensure_user("u1", "n", now()).await.unwrap();

        let taken = db
            .take_spawn_as_catch(&ids[0], "u1", Some(1.0), Some(1.0), now())
            .await
            .unwrap();
        assert_eq!(taken.map(|c| c.id).as_deref(), Some("ember-fox"));
        assert!(db
            .take_spawn_as_catch(&ids[0], "u1", None, None, now())
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.catch_counts("u1").await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_failed_catch_keeps_spawn() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        let ids = db
            .insert_spawns(&[planned("ember-fox", 1.0, 1.0, now() + Duration::hours(2))], now())
            .await
            .unwrap();
        let area = BoundingBox::around(1.0, 1.0, 0.1);

        // no such user: the catch insert violates its foreign key
        let result = db.take_spawn_as_catch(&ids[0], "ghost", None, None, now()).await;
        assert!(result.is_err());
        assert_eq!(db.count_live_spawns(&area, now()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_take_expired_spawn_fails() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        let ids = db
            .insert_spawns(&[planned("ember-fox", 1.0, 1.0, now() - Duration::minutes(1))], now())
            .await
            .unwrap();
        db.ensure_user("u1", "n", now()).await.unwrap();
        assert!(db
            .take_spawn_as_catch(&ids[0], "u1", None, None, now())
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.catch_counts("u1").await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_insert_spawns_is_all_or_nothing() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        let area = BoundingBox::around(1.0, 1.0, 0.1);
        let result = db
            .insert_spawns(
                &[
                    planned("ember-fox", 1.0, 1.0, now() + Duration::hours(1)),
                    planned("no-such-creature", 1.0, 1.0, now() + Duration::hours(1)),
                ],
                now(),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(db.count_live_spawns(&area, now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats_get_or_create() {
        let db = test_db().await;
        db.ensure_user("u1", "n", now()).await.unwrap();
        let created = db.get_or_create_stats("u1", now()).await.unwrap();
        assert!(created.was_created());
        let stats = created.into_inner();
        assert_eq!((stats.xp, stats.level, stats.coins, stats.streak), (0, 1, 0, 0));
        assert!(stats.progress().last_active.is_none());

        let award = XpAward {
            xp: 120,
            level: 2,
            streak: 1,
            xp_gained: 120,
            streak_bonus: 0,
            level_up: true,
        };
        let previous = stats.progress();
        assert!(db
            .save_xp_award("u1", &previous, &award, now().date_naive(), now())
            .await
            .unwrap());
        // a second write based on the same snapshot is stale
        assert!(!db
            .save_xp_award("u1", &previous, &award, now().date_naive(), now())
            .await
            .unwrap());
        db.add_coins("u1", 15, now()).await.unwrap();

        let existed = db.get_or_create_stats("u1", now()).await.unwrap();
        assert!(!existed.was_created());
        let stats = existed.into_inner();
        assert_eq!(stats.xp, 120);
        assert_eq!(stats.coins, 15);
        assert_eq!(stats.progress().last_active, Some(now().date_naive()));
    }

    #[tokio::test]
    async fn test_season_points_upsert() {
        let db = test_db().await;
        db.ensure_user("u1", "n", now()).await.unwrap();
        db.ensure_user("u2", "m", now()).await.unwrap();
        sqlx::query("INSERT INTO seasons (id, name, theme, element, starts_at, ends_at) VALUES ('s1', 'S', 'T', 'fire', '2026-10-01 00:00:00', '2026-10-31 23:59:59')")
            .execute(&db.pool)
            .await
            .unwrap();

        let first = db.add_season_points("s1", "u1", 4, now()).await.unwrap();
        assert!(first.was_created());
        assert_eq!(first.get().points, 4);
        let second = db.add_season_points("s1", "u1", 10, now()).await.unwrap();
        assert!(!second.was_created());
        assert_eq!(second.get().points, 14);

        db.add_season_points("s1", "u2", 14, now()).await.unwrap();
        assert_eq!(db.season_rank("s1", 14).await.unwrap(), 1);
        assert_eq!(db.season_rank("s1", 3).await.unwrap(), 3);

        let season = db.current_season(now()).await.unwrap().unwrap();
        assert_eq!(season.id, "s1");
        let later = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();
        assert!(db.current_season(later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quest_claim_flag_flips_once() {
        let db = test_db().await;
        db.ensure_user("u1", "n", now()).await.unwrap();
        sqlx::query("INSERT INTO quest_defs (id, title, description, type, required) VALUES ('q1', 'T', 'D', 'catch_any', 1)")
            .execute(&db.pool)
            .await
            .unwrap();
        db.insert_daily_quests("u1", "2026-10-14", &["q1"]).await.unwrap();
        // duplicate insert is ignored by the unique constraint
        db.insert_daily_quests("u1", "2026-10-14", &["q1"]).await.unwrap();
        assert_eq!(db.count_daily_quests("u1", "2026-10-14").await.unwrap(), 1);

        let quest = db.list_daily_quests("u1", "2026-10-14").await.unwrap().remove(0);
        assert!(!quest.claimed);
        assert!(db.mark_quest_claimed(&quest.id, now()).await.unwrap());
        assert!(!db.mark_quest_claimed(&quest.id, now()).await.unwrap());
        assert!(db.get_daily_quest(&quest.id, "u1").await.unwrap().unwrap().claimed);
        assert!(db.get_daily_quest(&quest.id, "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quest_progress_caps_at_required() {
        let db = test_db().await;
        db.ensure_user("u1", "n", now()).await.unwrap();
        sqlx::query("INSERT INTO quest_defs (id, title, description, type, required) VALUES ('q2', 'T', 'D', 'catch_any', 2)")
            .execute(&db.pool)
            .await
            .unwrap();
        db.insert_daily_quests("u1", "2026-10-14", &["q2"]).await.unwrap();
        let quest = db.list_daily_quests("u1", "2026-10-14").await.unwrap().remove(0);

        assert!(db.advance_quest_progress(&quest.id, 2).await.unwrap());
        assert!(db.advance_quest_progress(&quest.id, 2).await.unwrap());
        assert!(!db.advance_quest_progress(&quest.id, 2).await.unwrap());
        let quest = db.get_daily_quest(&quest.id, "u1").await.unwrap().unwrap();
        assert_eq!(quest.progress, 2);
    }

    #[tokio::test]
    async fn test_beast_catch_upsert() {
        let db = test_db().await;
        add_creature(&db, "ember-fox", "common", "fire").await;
        db.ensure_user("u1", "n", now()).await.unwrap();

        let first = db.add_beast_catch("u1", "ember-fox", now()).await.unwrap();
        assert!(first.was_created());
        let first = first.into_inner();
        assert_eq!((first.stage, first.level, first.beast_xp), (1, 2, 50));

        let second = db.add_beast_catch("u1", "ember-fox", now()).await.unwrap();
        assert!(!second.was_created());
        let second = second.into_inner();
        assert_eq!(second.id, first.id);
        assert_eq!((second.level, second.beast_xp), (3, 100));

        for _ in 0..20 {
            db.add_beast_catch("u1", "ember-fox", now()).await.unwrap();
        }
        let capped = db.get_beast(&first.id, "u1").await.unwrap().unwrap();
        assert_eq!((capped.level, capped.beast_xp), (15, 700));
    }
}
