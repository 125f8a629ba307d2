// Per-species beast leveling and evolution rules.

use thiserror::Error;

use super::config::{
    BEAST_XP_CAP, BEAST_XP_PER_CATCH, BEAST_XP_PER_LEVEL, MAX_BEAST_LEVEL, MAX_BEAST_STAGE,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolveRejection {
    #[error("already at max stage")]
    AlreadyMaxStage,
    #[error("Level {0} required")]
    LevelRequired(i64),
}

pub fn beast_level(beast_xp: i64) -> i64 {
    (beast_xp / BEAST_XP_PER_LEVEL + 1).min(MAX_BEAST_LEVEL)
}

/// Beast XP after one more catch. `None` means this is the first catch of
/// the species.
pub fn beast_xp_after_catch(current: Option<i64>) -> i64 {
    match current {
        None => BEAST_XP_PER_CATCH,
        Some(xp) => (xp + BEAST_XP_PER_CATCH).min(BEAST_XP_CAP),
    }
}

/// Minimum level needed to evolve out of `stage`, if it can evolve at all.
pub fn evolve_level_requirement(stage: i64) -> Option<i64> {
    match stage {
        1 => Some(5),
        2 => Some(10),
        _ => None,
    }
}

pub fn can_evolve(stage: i64, level: i64) -> bool {
    stage < MAX_BEAST_STAGE
        && evolve_level_requirement(stage).is_some_and(|required| level >= required)
}

/// Validate an evolution and return the new stage.
pub fn check_evolution(stage: i64, level: i64) -> Result<i64, EvolveRejection> {
    if stage >= MAX_BEAST_STAGE {
        return Err(EvolveRejection::AlreadyMaxStage);
    }
    match evolve_level_requirement(stage) {
        Some(required) if level < required => Err(EvolveRejection::LevelRequired(required)),
        Some(_) => Ok(stage + 1),
        None => Err(EvolveRejection::AlreadyMaxStage),
    }
}

/// Beast XP still needed for the next level; 0 at the level cap.
pub fn xp_to_next_level(level: i64, beast_xp: i64) -> i64 {
    if level < MAX_BEAST_LEVEL {
        level * BEAST_XP_PER_LEVEL - beast_xp
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beast_level_formula() {
        assert_eq!(beast_level(0), 1);
        assert_eq!(beast_level(49), 1);
        assert_eq!(beast_level(50), 2);
        assert_eq!(beast_level(200), 5);
        assert_eq!(beast_level(700), 15);
        assert_eq!(beast_level(5000), 15);
    }

    #[test]
    fn test_first_catch_starts_at_level_two() {
        let xp = beast_xp_after_catch(None);
        assert_eq!(xp, 50);
        assert_eq!(beast_level(xp), 2);
    }

    #[test]
    fn test_beast_xp_caps_at_max_level() {
        assert_eq!(beast_xp_after_catch(Some(650)), 700);
        assert_eq!(beast_xp_after_catch(Some(700)), 700);
        assert_eq!(beast_level(beast_xp_after_catch(Some(700))), MAX_BEAST_LEVEL);
    }

    #[test]
    fn test_can_evolve() {
        assert!(!can_evolve(1, 4));
        assert!(can_evolve(1, 5));
        assert!(!can_evolve(2, 9));
        assert!(can_evolve(2, 10));
        assert!(!can_evolve(3, 15));
    }

    #[test]
    fn test_check_evolution() {
        assert_eq!(check_evolution(1, 5), Ok(2));
        assert_eq!(check_evolution(2, 12), Ok(3));
        assert_eq!(
            check_evolution(1, 4),
            Err(EvolveRejection::LevelRequired(5))
        );
        assert_eq!(
            check_evolution(2, 9),
            Err(EvolveRejection::LevelRequired(10))
        );
        assert_eq!(check_evolution(3, 15), Err(EvolveRejection::AlreadyMaxStage));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(EvolveRejection::AlreadyMaxStage.to_string(), "already at max stage");
        assert_eq!(EvolveRejection::LevelRequired(10).to_string(), "Level 10 required");
    }

    #[test]
    fn test_xp_to_next_level() {
        assert_eq!(xp_to_next_level(2, 50), 50);
        assert_eq!(xp_to_next_level(2, 80), 20);
        assert_eq!(xp_to_next_level(15, 700), 0);
    }
}
