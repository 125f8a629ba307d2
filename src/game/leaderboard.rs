// XP leaderboards, global or around a point.

use serde::{Deserialize, Serialize};

use super::display_name_or_generated;
use crate::db::{Database, LeaderboardRow};
use crate::engine::config::{LEADERBOARD_LIMIT, LOCAL_LEADERBOARD_RADIUS_KM};
use crate::engine::spatial::BoundingBox;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardMode {
    Global,
    Local,
}

impl LeaderboardMode {
    /// Anything other than `local` means global.
    pub fn from_query(mode: Option<&str>) -> Self {
        match mode {
            Some("local") => LeaderboardMode::Local,
            _ => LeaderboardMode::Global,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub rank: i64,
    pub user_id: String,
    pub display_name: String,
    pub level: i64,
    pub xp: i64,
    pub streak: i64,
    pub total_caught: i64,
    pub species_count: i64,
    pub is_me: bool,
}

impl RankEntry {
    fn from_row(rank: i64, row: LeaderboardRow, caller: Option<&str>) -> Self {
        RankEntry {
            rank,
            is_me: caller == Some(row.user_id.as_str()),
            display_name: display_name_or_generated(&row.user_id, row.display_name),
            user_id: row.user_id,
            level: row.level,
            xp: row.xp,
            streak: row.streak,
            total_caught: row.total_caught,
            species_count: row.species_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<RankEntry>,
    pub user_entry: Option<RankEntry>,
    pub mode: LeaderboardMode,
}

/// Top players by XP. Local mode needs a position; without one it falls
/// back to global.
pub async fn leaderboard(
    db: &Database,
    mode: LeaderboardMode,
    position: Option<(f64, f64)>,
    caller: Option<&str>,
) -> Result<Leaderboard> {
    let rows = match (mode, position) {
        (LeaderboardMode::Local, Some((lat, lng))) => {
            let area = BoundingBox::from_radius_km(lat, lng, LOCAL_LEADERBOARD_RADIUS_KM);
            db.leaderboard_local(&area, LEADERBOARD_LIMIT).await?
        }
        _ => db.leaderboard_global(LEADERBOARD_LIMIT).await?,
    };

    let entries: Vec<RankEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| RankEntry::from_row(i as i64 + 1, row, caller))
        .collect();

    let mut user_entry = entries.iter().find(|e| e.is_me).cloned();
    if let (true, Some(user_id)) = (user_entry.is_none(), caller) {
        if let Some(stats) = db.get_stats(user_id).await? {
            let rank = db.xp_rank(stats.xp).await?;
            let (total_caught, species_count) = db.catch_counts(user_id).await?;
            let stored_name = db.get_user(user_id).await?.and_then(|u| u.display_name);
            user_entry = Some(RankEntry {
                rank,
                user_id: user_id.to_string(),
                display_name: display_name_or_generated(user_id, stored_name),
                level: stats.level,
                xp: stats.xp,
                streak: stats.streak,
                total_caught,
                species_count,
                is_me: true,
            });
        }
    }

    Ok(Leaderboard {
        entries,
        user_entry,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catch::{record_catch, CatchTarget};
    use crate::game::ensure_player;
    use crate::game::testing::*;

    async fn catch_at(db: &Database, user: &str, creature: &str, lat: f64, lng: f64) {
        ensure_player(db, user, now()).await.unwrap();
        record_catch(
            db,
            user,
            &CatchTarget::Creature(creature.into()),
            Some(lat),
            Some(lng),
            now(),
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_mode_from_query() {
        assert_eq!(LeaderboardMode::from_query(Some("local")), LeaderboardMode::Local);
        assert_eq!(LeaderboardMode::from_query(Some("global")), LeaderboardMode::Global);
        assert_eq!(LeaderboardMode::from_query(Some("LOCAL")), LeaderboardMode::Global);
        assert_eq!(LeaderboardMode::from_query(None), LeaderboardMode::Global);
    }

    #[tokio::test]
    async fn test_global_orders_by_xp() {
        let db = seeded_db().await;
        catch_at(&db, "london", "ember-fox", 51.5, -0.12).await;
        catch_at(&db, "tokyo", "inferno-drake", 35.68, 139.69).await;
        catch_at(&db, "tokyo", "ember-fox", 35.68, 139.69).await;

        let board = leaderboard(&db, LeaderboardMode::Global, None, Some("london"))
            .await
            .unwrap();
        assert_eq!(board.mode, LeaderboardMode::Global);
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].user_id, "tokyo");
        assert_eq!(board.entries[0].xp, 100);
        assert_eq!(board.entries[0].total_caught, 2);
        assert_eq!(board.entries[0].species_count, 2);
        let me = board.user_entry.unwrap();
        assert_eq!((me.rank, me.user_id.as_str()), (2, "london"));
    }

    #[tokio::test]
    async fn test_local_counts_only_nearby_players() {
        let db = seeded_db().await;
        catch_at(&db, "london", "ember-fox", 51.5, -0.12).await;
        catch_at(&db, "tokyo", "inferno-drake", 35.68, 139.69).await;

        let board = leaderboard(&db, LeaderboardMode::Local, Some((51.51, -0.1)), Some("tokyo"))
            .await
            .unwrap();
        assert_eq!(board.mode, LeaderboardMode::Local);
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].user_id, "london");
        // the caller is appended with their global XP rank
        let me = board.user_entry.unwrap();
        assert_eq!((me.rank, me.xp), (1, 80));
    }

    #[tokio::test]
    async fn test_local_without_position_is_global() {
        let db = seeded_db().await;
        catch_at(&db, "london", "ember-fox", 51.5, -0.12).await;
        let board = leaderboard(&db, LeaderboardMode::Local, None, None).await.unwrap();
        assert_eq!(board.entries.len(), 1);
        assert!(board.user_entry.is_none());
    }
}
