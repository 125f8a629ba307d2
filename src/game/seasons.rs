// Current season summary and the season points leaderboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::display_name_or_generated;
use crate::db::{Database, Season};
use crate::engine::config::LEADERBOARD_LIMIT;
use crate::engine::season::{milestones, Milestone, Tier};
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct ExclusiveCreature {
    pub id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub creature_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonInfo {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub element: String,
    pub starts_at: String,
    pub ends_at: String,
    pub exclusive_creature: Option<ExclusiveCreature>,
}

impl From<Season> for SeasonInfo {
    fn from(s: Season) -> Self {
        let exclusive_creature = s.exclusive_creature_id.map(|id| ExclusiveCreature {
            id,
            name: s.excl_name,
            image_url: s.excl_image,
            rarity: s.excl_rarity,
            creature_type: s.excl_type,
        });
        SeasonInfo {
            id: s.id,
            name: s.name,
            theme: s.theme,
            element: s.element,
            starts_at: s.starts_at,
            ends_at: s.ends_at,
            exclusive_creature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonStanding {
    pub points: i64,
    pub tier: Option<Tier>,
    pub rank: i64,
    pub has_exclusive: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season: Option<SeasonInfo>,
    pub user_entry: Option<SeasonStanding>,
    pub milestones: Vec<Milestone>,
}

pub async fn current_season_summary(
    db: &Database,
    user_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SeasonSummary> {
    let Some(season) = db.current_season(now).await? else {
        return Ok(SeasonSummary {
            season: None,
            user_entry: None,
            milestones: milestones(),
        });
    };

    let user_entry = match user_id {
        Some(user_id) => {
            let points = db
                .get_season_entry(&season.id, user_id)
                .await?
                .map(|e| e.points)
                .unwrap_or(0);
            let rank = db.season_rank(&season.id, points).await?;
            let has_exclusive = match &season.exclusive_creature_id {
                Some(creature_id) => db.has_caught(user_id, creature_id).await?,
                None => false,
            };
            Some(SeasonStanding {
                points,
                tier: Tier::for_points(points),
                rank,
                has_exclusive,
            })
        }
        None => None,
    };

    Ok(SeasonSummary {
        season: Some(season.into()),
        user_entry,
        milestones: milestones(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonRankEntry {
    pub rank: i64,
    pub user_id: String,
    pub display_name: String,
    pub level: i64,
    pub streak: i64,
    pub points: i64,
    pub tier: Option<Tier>,
    pub is_me: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonBoard {
    pub entries: Vec<SeasonRankEntry>,
    pub user_entry: Option<SeasonRankEntry>,
}

pub async fn season_leaderboard(
    db: &Database,
    user_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SeasonBoard> {
    let Some(season) = db.current_season(now).await? else {
        return Ok(SeasonBoard {
            entries: Vec::new(),
            user_entry: None,
        });
    };

    let rows = db.season_leaderboard(&season.id, LEADERBOARD_LIMIT).await?;
    let entries: Vec<SeasonRankEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| SeasonRankEntry {
            rank: i as i64 + 1,
            is_me: user_id == Some(row.user_id.as_str()),
            display_name: display_name_or_generated(&row.user_id, row.display_name),
            user_id: row.user_id,
            level: row.level,
            streak: row.streak,
            tier: Tier::for_points(row.points),
            points: row.points,
        })
        .collect();

    let mut user_entry = entries.iter().find(|e| e.is_me).cloned();
    if let (true, Some(user_id)) = (user_entry.is_none(), user_id) {
        if let Some(entry) = db.get_season_entry(&season.id, user_id).await? {
            let rank = db.season_rank(&season.id, entry.points).await?;
            let stored_name = db.get_user(user_id).await?.and_then(|u| u.display_name);
            let stats = db.get_stats(user_id).await?;
            user_entry = Some(SeasonRankEntry {
                rank,
                user_id: user_id.to_string(),
                display_name: display_name_or_generated(user_id, stored_name),
                level: stats.as_ref().map(|s| s.level).unwrap_or(1),
                streak: stats.as_ref().map(|s| s.streak).unwrap_or(0),
                points: entry.points,
                tier: Tier::for_points(entry.points),
                is_me: true,
            });
        }
    }

    Ok(SeasonBoard {
        entries,
        user_entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catch::{record_catch, CatchTarget};
    use crate::game::ensure_player;
    use crate::game::testing::*;
    use chrono::TimeZone;

    async fn catch(db: &Database, user: &str, creature: &str) {
        ensure_player(db, user, now()).await.unwrap();
        record_catch(db, user, &CatchTarget::Creature(creature.into()), None, None, now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_summary_without_season() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let summary = current_season_summary(&db, Some("hunter"), now()).await.unwrap();
        assert!(summary.season.is_none());
        assert!(summary.user_entry.is_none());
        assert_eq!(summary.milestones.len(), 4);
    }

    #[tokio::test]
    async fn test_summary_with_caller() {
        let db = seeded_db().await;
        catch(&db, "hunter", "eclipse-lord").await;
        catch(&db, "rival", "inferno-drake").await;

        let summary = current_season_summary(&db, Some("hunter"), now()).await.unwrap();
        let season = summary.season.unwrap();
        assert_eq!(season.id, "season-2026-10");
        assert_eq!(season.exclusive_creature.unwrap().id, "eclipse-lord");

        let entry = summary.user_entry.unwrap();
        assert_eq!(entry.points, 10);
        assert_eq!(entry.tier, Some(Tier::Bronze));
        assert_eq!(entry.rank, 1);
        assert!(entry.has_exclusive);

        let rival = current_season_summary(&db, Some("rival"), now())
            .await
            .unwrap()
            .user_entry
            .unwrap();
        assert_eq!((rival.points, rival.rank, rival.tier), (4, 2, None));
        assert!(!rival.has_exclusive);

        let newcomer = current_season_summary(&db, Some("newcomer"), now())
            .await
            .unwrap()
            .user_entry
            .unwrap();
        assert_eq!((newcomer.points, newcomer.rank), (0, 3));
    }

    #[tokio::test]
    async fn test_season_board_marks_caller() {
        let db = seeded_db().await;
        catch(&db, "hunter", "ember-fox").await;
        catch(&db, "rival", "inferno-drake").await;

        let board = season_leaderboard(&db, Some("hunter"), now()).await.unwrap();
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].user_id, "rival");
        assert_eq!(board.entries[0].rank, 1);
        let me = board.user_entry.unwrap();
        assert!(me.is_me);
        assert_eq!((me.rank, me.points), (2, 1));
    }

    #[tokio::test]
    async fn test_season_board_after_season_ends() {
        let db = seeded_db().await;
        catch(&db, "hunter", "ember-fox").await;
        let later = Utc.with_ymd_and_hms(2026, 11, 5, 0, 0, 0).unwrap();
        let board = season_leaderboard(&db, Some("hunter"), later).await.unwrap();
        assert!(board.entries.is_empty());
        assert!(board.user_entry.is_none());
    }
}
