// Daily quest rules: what a quest counts, and which quests a player gets.

use serde::{Deserialize, Serialize};

use super::config::DAILY_QUEST_COUNT;

const KNUTH_MULTIPLIER: u32 = 2_654_435_761;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    CatchAny,
    CatchRarity,
    CatchType,
}

impl QuestKind {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "catch_any" => Some(Self::CatchAny),
            "catch_rarity" => Some(Self::CatchRarity),
            "catch_type" => Some(Self::CatchType),
            _ => None,
        }
    }

    pub fn to_str_name(&self) -> &'static str {
        match self {
            Self::CatchAny => "catch_any",
            Self::CatchRarity => "catch_rarity",
            Self::CatchType => "catch_type",
        }
    }

    /// Whether a catch of a creature with `rarity` and `creature_type`
    /// counts towards a quest of this kind targeting `target`.
    pub fn matches(&self, target: Option<&str>, rarity: &str, creature_type: &str) -> bool {
        match self {
            Self::CatchAny => true,
            Self::CatchRarity => target == Some(rarity),
            Self::CatchType => target == Some(creature_type),
        }
    }
}

/// Multiply-by-31 hash over UTF-16 code units.
pub fn string_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32))
}

fn avalanche(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 13;
    x = x.wrapping_mul(0xc2b2_ae35);
    x ^= x >> 16;
    x
}

/// Pick the daily quests for `user_id` on `date` (`YYYY-MM-DD`).
///
/// Every definition gets a sort key derived from the user/date hash and its
/// own id, so the pick is stable for a user all day and differs between users
/// and days. Returns indices into `def_ids`.
pub fn select_daily_quests<S: AsRef<str>>(user_id: &str, date: &str, def_ids: &[S]) -> Vec<usize> {
    let seed = string_hash(&format!("{user_id}{date}"));
    let mut keyed: Vec<(u32, &str, usize)> = def_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let id = id.as_ref();
            let key = avalanche(seed ^ string_hash(id).wrapping_mul(KNUTH_MULTIPLIER));
            (key, id, i)
        })
        .collect();
    keyed.sort();
    keyed
        .into_iter()
        .take(DAILY_QUEST_COUNT)
        .map(|(_, _, i)| i)
        .collect()
}
