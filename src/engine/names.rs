// Generated display names for players who have not picked one.

use super::quests::string_hash;

const NAME_ADJ: [&str; 12] = [
    "Ember", "Breeze", "Crystal", "Shadow", "Grove", "Gale", "Void", "Prism", "Storm", "Inferno",
    "Moss", "Arcane",
];
const NAME_NOUN: [&str; 12] = [
    "Hunter", "Roamer", "Seeker", "Walker", "Scout", "Tracker", "Warden", "Stalker", "Wanderer",
    "Chaser", "Ranger", "Drifter",
];

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 20;

/// Deterministic name such as `EmberScout07` derived from the user id.
pub fn generate_display_name(user_id: &str) -> String {
    let h = string_hash(user_id);
    let adj = NAME_ADJ[h as usize % NAME_ADJ.len()];
    let noun = NAME_NOUN[(h >> 4) as usize % NAME_NOUN.len()];
    let num = (h >> 8) % 100;
    format!("{adj}{noun}{num:02}")
}

/// Trimmed name if it is an acceptable length.
pub fn validate_display_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_is_stable() {
        assert_eq!(generate_display_name("abc"), generate_display_name("abc"));
    }

    #[test]
    fn test_generated_name_for_known_id() {
        // string_hash("a") = 97: 97 % 12 = 1, (97 >> 4) % 12 = 6, (97 >> 8) % 100 = 0
        assert_eq!(generate_display_name("a"), "BreezeWarden00");
    }

    #[test]
    fn test_validate_display_name() {
        assert_eq!(validate_display_name("  Ash  "), Some("Ash"));
        assert_eq!(validate_display_name("A"), None);
        assert_eq!(validate_display_name("   "), None);
        assert_eq!(validate_display_name(&"x".repeat(21)), None);
        assert_eq!(validate_display_name(&"x".repeat(20)).map(str::len), Some(20));
    }
}
