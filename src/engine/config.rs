// Game tuning constants shared by the spawn, progression and season engines.

// Spawn grid
pub const CELL_SIZE_DEG: f64 = 0.005; // ~500 m per cell edge
pub const SPAWN_COUNT_PER_CELL: usize = 12;
pub const SPAWN_TTL_HOURS: f64 = 6.0;
pub const SPAWN_TTL_JITTER_HOURS: f64 = 2.0;
pub const SPAWN_MIN_DIST_DEG: f64 = 0.0005;
pub const SPAWN_DIST_RANGE_DEG: f64 = 0.004;
/// Cells around the target cell checked for live spawns before generating.
pub const LIVE_CHECK_MARGIN_CELLS: f64 = 1.0;
/// Cells around the target cell swept for expired spawns on generation.
pub const GC_MARGIN_CELLS: f64 = 3.0;

// Rarity roll boundaries, cumulative
pub const COMMON_ROLL_MAX: f64 = 0.50;
pub const UNCOMMON_ROLL_MAX: f64 = 0.75;
pub const LEGENDARY_ROLL_MIN: f64 = 0.92;

// Distances
pub const KM_PER_DEGREE: f64 = 111.0;
pub const DEFAULT_RADIUS_KM: f64 = 1.0;
pub const LOCAL_LEADERBOARD_RADIUS_KM: f64 = 50.0;
pub const LEADERBOARD_LIMIT: i64 = 20;

// Player progression
pub const LEVEL_THRESHOLDS: [i64; 11] = [0, 100, 250, 500, 900, 1400, 2100, 3000, 4200, 5700, 7500];
pub const DEFAULT_CATCH_XP: i64 = 20;
pub const MAX_STREAK_MULTIPLIER: i64 = 7;
pub const STREAK_BONUS_STEP: f64 = 0.1;

// Beasts
pub const BEAST_XP_PER_CATCH: i64 = 50;
pub const BEAST_XP_PER_LEVEL: i64 = 50;
pub const MAX_BEAST_LEVEL: i64 = 15;
pub const MAX_BEAST_STAGE: i64 = 3;
pub const BEAST_XP_CAP: i64 = (MAX_BEAST_LEVEL - 1) * BEAST_XP_PER_LEVEL;

// Quests
pub const DAILY_QUEST_COUNT: usize = 3;

// Seasons
pub const DEFAULT_SEASON_POINTS: i64 = 1;
