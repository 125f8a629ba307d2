// Player progression: XP, levels and daily streaks.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::config::{LEVEL_THRESHOLDS, MAX_STREAK_MULTIPLIER, STREAK_BONUS_STEP};

/// The parts of a player's stats row that an XP award depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub xp: i64,
    pub level: i64,
    pub streak: i64,
    pub last_active: Option<NaiveDate>,
}

impl Default for Progress {
    fn default() -> Self {
        Progress {
            xp: 0,
            level: 1,
            streak: 0,
            last_active: None,
        }
    }
}

/// Outcome of one XP award.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub xp: i64,
    pub level: i64,
    pub streak: i64,
    pub xp_gained: i64,
    pub streak_bonus: i64,
    pub level_up: bool,
}

/// Level for a total XP: the highest level whose threshold is met.
pub fn xp_to_level(xp: i64) -> i64 {
    let mut level = 1;
    for (i, threshold) in LEVEL_THRESHOLDS.iter().enumerate().skip(1) {
        if xp >= *threshold {
            level = i as i64 + 1;
        } else {
            break;
        }
    }
    level
}

/// XP thresholds bracketing `level`: (start of this level, start of the next).
/// The next threshold is `None` at the top level.
pub fn level_bounds(level: i64) -> (i64, Option<i64>) {
    let idx = level.max(1) as usize;
    let current = LEVEL_THRESHOLDS.get(idx - 1).copied().unwrap_or(0);
    let next = LEVEL_THRESHOLDS.get(idx).copied();
    (current, next)
}

/// Streak after activity on `today`.
///
/// Activity the day after the last active day extends the streak. Activity on
/// the same day leaves it alone. Anything else starts over at 1.
pub fn next_streak(streak: i64, last_active: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match last_active {
        Some(last) if last == today - Duration::days(1) => streak + 1,
        Some(last) if last == today => streak,
        _ => 1,
    }
}

/// Extra XP granted for an ongoing streak: 10% of the base per streak day,
/// up to 7 days. No bonus on the first day.
pub fn streak_bonus(base_xp: i64, streak: i64) -> i64 {
    if streak <= 1 {
        return 0;
    }
    let multiplier = STREAK_BONUS_STEP * streak.min(MAX_STREAK_MULTIPLIER) as f64;
    (base_xp as f64 * multiplier).floor() as i64
}

/// Apply an award of `base_xp` on `today` to `progress`.
pub fn award_xp(progress: &Progress, base_xp: i64, today: NaiveDate) -> XpAward {
    let streak = next_streak(progress.streak, progress.last_active, today);
    let bonus = streak_bonus(base_xp, streak);
    let xp = progress.xp + base_xp + bonus;
    let level = xp_to_level(xp);
    XpAward {
        xp,
        level,
        streak,
        xp_gained: base_xp + bonus,
        streak_bonus: bonus,
        level_up: level > progress.level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_xp_to_level_thresholds() {
        assert_eq!(xp_to_level(0), 1);
        assert_eq!(xp_to_level(99), 1);
        assert_eq!(xp_to_level(100), 2);
        assert_eq!(xp_to_level(249), 2);
        assert_eq!(xp_to_level(250), 3);
        assert_eq!(xp_to_level(4199), 8);
        assert_eq!(xp_to_level(4200), 9);
        assert_eq!(xp_to_level(7500), 11);
        assert_eq!(xp_to_level(1_000_000), 11);
    }

    #[test]
    fn test_level_bounds() {
        assert_eq!(level_bounds(1), (0, Some(100)));
        assert_eq!(level_bounds(3), (250, Some(500)));
        assert_eq!(level_bounds(11), (7500, None));
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        assert_eq!(next_streak(3, Some(day(9)), day(10)), 4);
    }

    #[test]
    fn test_streak_same_day_unchanged() {
        assert_eq!(next_streak(3, Some(day(10)), day(10)), 3);
        assert_eq!(next_streak(1, Some(day(10)), day(10)), 1);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        assert_eq!(next_streak(5, Some(day(7)), day(10)), 1);
        assert_eq!(next_streak(0, None, day(10)), 1);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let last = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(next_streak(2, Some(last), day(1)), 3);
    }

    #[test]
    fn test_streak_bonus() {
        assert_eq!(streak_bonus(80, 1), 0);
        assert_eq!(streak_bonus(20, 2), 4);
        assert_eq!(streak_bonus(20, 3), 6);
        assert_eq!(streak_bonus(40, 7), 28);
        // capped at 7 days
        assert_eq!(streak_bonus(40, 30), 28);
    }

    #[test]
    fn test_first_rare_catch_award() {
        let award = award_xp(&Progress::default(), 80, day(10));
        assert_eq!(award.xp, 80);
        assert_eq!(award.level, 1);
        assert_eq!(award.streak, 1);
        assert_eq!(award.streak_bonus, 0);
        assert_eq!(award.xp_gained, 80);
        assert!(!award.level_up);
    }

    #[test]
    fn test_award_with_streak_and_level_up() {
        let progress = Progress {
            xp: 90,
            level: 1,
            streak: 2,
            last_active: Some(day(9)),
        };
        let award = award_xp(&progress, 20, day(10));
        assert_eq!(award.streak, 3);
        assert_eq!(award.streak_bonus, 6);
        assert_eq!(award.xp, 116);
        assert_eq!(award.level, 2);
        assert!(award.level_up);
    }
}
