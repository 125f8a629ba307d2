// Game flows over the database: spawning, catching, quests, beasts, seasons.
//
// Every entry point takes `now` from the caller so tests can pin the clock.

pub mod beasts;
pub mod catch;
pub mod leaderboard;
pub mod quests;
pub mod seasons;
pub mod spawns;

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::{Database, GetOrCreate, User};
use crate::engine::names::generate_display_name;
use crate::error::Result;

/// Calendar day (UTC) used for streaks and daily quests.
pub fn today(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Make sure the player row exists and has a display name.
pub async fn ensure_player(
    db: &Database,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<GetOrCreate<User>> {
    let user = db
        .ensure_user(user_id, &generate_display_name(user_id), now)
        .await?;
    if user.was_created() {
        tracing::info!(user_id, "New player registered");
    }
    Ok(user)
}

/// Stored display name, or the generated one.
pub fn display_name_or_generated(user_id: &str, stored: Option<String>) -> String {
    stored
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| generate_display_name(user_id))
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::db::Database;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    pub async fn seeded_db() -> Database {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.seed(now()).await.unwrap();
        db
    }
}
