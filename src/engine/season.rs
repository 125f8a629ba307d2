// Season points, tiers and the auto-rolling monthly season.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::config::DEFAULT_SEASON_POINTS;
use super::creature::Rarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Tiers in ascending order of their point threshold.
    pub const ASCENDING: [Tier; 4] = [Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Platinum];

    pub fn min_points(&self) -> i64 {
        match self {
            Tier::Bronze => 10,
            Tier::Silver => 50,
            Tier::Gold => 150,
            Tier::Platinum => 350,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }

    /// Highest tier reached with `points`, or `None` below bronze.
    pub fn for_points(points: i64) -> Option<Tier> {
        Self::ASCENDING
            .iter()
            .copied()
            .filter(|t| points >= t.min_points())
            .last()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub points: i64,
    pub tier: Tier,
    pub label: &'static str,
}

pub fn milestones() -> Vec<Milestone> {
    vec![
        Milestone { points: 10, tier: Tier::Bronze, label: "Bronze Crest" },
        Milestone { points: 50, tier: Tier::Silver, label: "Silver Crest" },
        Milestone { points: 150, tier: Tier::Gold, label: "Gold Crest" },
        Milestone { points: 350, tier: Tier::Platinum, label: "Platinum Crown" },
    ]
}

/// Season points for catching a creature of the given rarity name.
pub fn points_for_rarity(rarity: &str) -> i64 {
    Rarity::from_str_name(rarity)
        .map(|r| r.season_points())
        .unwrap_or(DEFAULT_SEASON_POINTS)
}

struct SeasonTheme {
    element: &'static str,
    name: &'static str,
    theme: &'static str,
}

const SEASON_THEMES: [SeasonTheme; 5] = [
    SeasonTheme {
        element: "nature",
        name: "Verdant Awakening",
        theme: "The forests stir with ancient energy. Seek the beasts hidden among the roots.",
    },
    SeasonTheme {
        element: "fire",
        name: "The Phoenix Age",
        theme: "An ancient firebird awakens across the world. Catch it before the season ends.",
    },
    SeasonTheme {
        element: "crystal",
        name: "Crystal Convergence",
        theme: "Gemstone creatures emerge from deep underground. Hunt the prismatic beasts.",
    },
    SeasonTheme {
        element: "wind",
        name: "Storm Season",
        theme: "Gale-force winds carry new beasts into the open. Brave the storm.",
    },
    SeasonTheme {
        element: "shadow",
        name: "Eclipse Reign",
        theme: "Darkness blankets the land. Only the boldest hunters venture out.",
    },
];

/// Definition of the season covering the calendar month of `now`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeason {
    pub id: String,
    pub name: &'static str,
    pub theme: &'static str,
    pub element: &'static str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

pub fn monthly_season(now: DateTime<Utc>) -> MonthlySeason {
    let month_index = now.month0() as usize;
    let theme = &SEASON_THEMES[month_index % SEASON_THEMES.len()];

    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or_default();
    let next_first = if now.month() == 12 {
        NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(now.year(), now.month() + 1, 1)
    }
    .unwrap_or_default();

    let starts_at = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap_or_default());
    let ends_at = Utc.from_utc_datetime(&next_first.and_hms_opt(0, 0, 0).unwrap_or_default())
        - Duration::seconds(1);

    MonthlySeason {
        id: format!("season-{}-{:02}", now.year(), now.month()),
        name: theme.name,
        theme: theme.theme,
        element: theme.element,
        starts_at,
        ends_at,
    }
}
