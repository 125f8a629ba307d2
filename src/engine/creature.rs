use serde::{Deserialize, Serialize};

/// Creature rarity tier. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }

    /// Player XP for one catch of this rarity.
    pub fn catch_xp(&self) -> i64 {
        match self {
            Rarity::Common => 20,
            Rarity::Uncommon => 40,
            Rarity::Rare => 80,
            Rarity::Legendary => 120,
        }
    }

    /// Season points for one catch of this rarity.
    pub fn season_points(&self) -> i64 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 4,
            Rarity::Legendary => 10,
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_round_trips_through_name() {
        for rarity in Rarity::ALL {
            assert_eq!(Rarity::from_str_name(rarity.as_str()), Some(rarity));
        }
        assert_eq!(Rarity::from_str_name("mythic"), None);
    }

    #[test]
    fn test_rarity_tables() {
        assert_eq!(Rarity::Common.catch_xp(), 20);
        assert_eq!(Rarity::Legendary.catch_xp(), 120);
        assert_eq!(Rarity::Rare.season_points(), 4);
        assert_eq!(Rarity::Legendary.season_points(), 10);
    }
}
