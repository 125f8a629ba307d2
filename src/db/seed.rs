// Static game content and the current monthly season.

use chrono::{DateTime, Utc};

use super::{sql_datetime, Database};
use crate::engine::season::monthly_season;

struct CreatureSeed {
    id: &'static str,
    name: &'static str,
    rarity: &'static str,
    creature_type: &'static str,
}

struct EvolutionSeed {
    id: &'static str,
    base_creature_id: &'static str,
    stage: i64,
    // stage art reuses the creature of the same name
    creature_id: &'static str,
    name: &'static str,
}

struct QuestSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    quest_type: &'static str,
    target_value: Option<&'static str>,
    required: i64,
    xp_reward: i64,
    coin_reward: i64,
}

const fn creature(
    id: &'static str,
    name: &'static str,
    rarity: &'static str,
    creature_type: &'static str,
) -> CreatureSeed {
    CreatureSeed { id, name, rarity, creature_type }
}

const CREATURES: &[CreatureSeed] = &[
    creature("grove-shell", "Grove Shell", "common", "nature"),
    creature("moss-turtle", "Moss Turtle", "uncommon", "nature"),
    creature("ancient-verdant", "Ancient Verdant", "rare", "nature"),
    creature("ember-fox", "Ember Fox", "common", "fire"),
    creature("blaze-hound", "Blaze Hound", "uncommon", "fire"),
    creature("inferno-drake", "Inferno Drake", "rare", "fire"),
    creature("crystal-newt", "Crystal Newt", "common", "crystal"),
    creature("prism-salamander", "Prism Salamander", "uncommon", "crystal"),
    creature("gem-titan", "Gem Titan", "rare", "crystal"),
    creature("breeze-hawk", "Breeze Hawk", "common", "wind"),
    creature("gale-raptor", "Gale Raptor", "uncommon", "wind"),
    creature("storm-sovereign", "Storm Sovereign", "rare", "wind"),
    creature("shadow-lynx", "Shadow Lynx", "uncommon", "shadow"),
    creature("void-panther", "Void Panther", "rare", "shadow"),
    creature("ember-phoenix", "Ember Phoenix", "rare", "fire"),
    creature("eclipse-lord", "Eclipse Lord", "legendary", "shadow"),
];

const fn evo(
    id: &'static str,
    base_creature_id: &'static str,
    stage: i64,
    creature_id: &'static str,
    name: &'static str,
) -> EvolutionSeed {
    EvolutionSeed { id, base_creature_id, stage, creature_id, name }
}

const EVOLUTIONS: &[EvolutionSeed] = &[
    evo("evo-gs-1", "grove-shell", 1, "grove-shell", "Grove Shell"),
    evo("evo-gs-2", "grove-shell", 2, "moss-turtle", "Moss Turtle"),
    evo("evo-gs-3", "grove-shell", 3, "ancient-verdant", "Ancient Verdant"),
    evo("evo-ef-1", "ember-fox", 1, "ember-fox", "Ember Fox"),
    evo("evo-ef-2", "ember-fox", 2, "blaze-hound", "Blaze Hound"),
    evo("evo-ef-3", "ember-fox", 3, "inferno-drake", "Inferno Drake"),
    evo("evo-cn-1", "crystal-newt", 1, "crystal-newt", "Crystal Newt"),
    evo("evo-cn-2", "crystal-newt", 2, "prism-salamander", "Prism Salamander"),
    evo("evo-cn-3", "crystal-newt", 3, "gem-titan", "Gem Titan"),
    evo("evo-bh-1", "breeze-hawk", 1, "breeze-hawk", "Breeze Hawk"),
    evo("evo-bh-2", "breeze-hawk", 2, "gale-raptor", "Gale Raptor"),
    evo("evo-bh-3", "breeze-hawk", 3, "storm-sovereign", "Storm Sovereign"),
    evo("evo-sl-1", "shadow-lynx", 1, "shadow-lynx", "Shadow Lynx"),
    evo("evo-sl-2", "shadow-lynx", 2, "void-panther", "Void Panther"),
    evo("evo-sl-3", "shadow-lynx", 3, "eclipse-lord", "Eclipse Lord"),
    evo("evo-ep-1", "ember-phoenix", 1, "ember-phoenix", "Ember Phoenix"),
    evo("evo-el-1", "eclipse-lord", 1, "eclipse-lord", "Eclipse Lord"),
];

const QUEST_DEFS: &[QuestSeed] = &[
    QuestSeed {
        id: "q-catch-3",
        title: "Early Hunt",
        description: "Catch 3 beasts",
        quest_type: "catch_any",
        target_value: None,
        required: 3,
        xp_reward: 50,
        coin_reward: 10,
    },
    QuestSeed {
        id: "q-catch-5",
        title: "Beast Hunter",
        description: "Catch 5 beasts",
        quest_type: "catch_any",
        target_value: None,
        required: 5,
        xp_reward: 100,
        coin_reward: 20,
    },
    QuestSeed {
        id: "q-catch-10",
        title: "Beast Master",
        description: "Catch 10 beasts today",
        quest_type: "catch_any",
        target_value: None,
        required: 10,
        xp_reward: 200,
        coin_reward: 50,
    },
    QuestSeed {
        id: "q-catch-rare",
        title: "Rare Find",
        description: "Catch a rare beast",
        quest_type: "catch_rarity",
        target_value: Some("rare"),
        required: 1,
        xp_reward: 150,
        coin_reward: 30,
    },
    QuestSeed {
        id: "q-catch-uncommon",
        title: "Getting Warmer",
        description: "Catch an uncommon beast",
        quest_type: "catch_rarity",
        target_value: Some("uncommon"),
        required: 1,
        xp_reward: 80,
        coin_reward: 15,
    },
    QuestSeed {
        id: "q-catch-fire",
        title: "Fire Starter",
        description: "Catch 2 fire-type beasts",
        quest_type: "catch_type",
        target_value: Some("fire"),
        required: 2,
        xp_reward: 90,
        coin_reward: 18,
    },
    QuestSeed {
        id: "q-catch-nature",
        title: "Into the Wild",
        description: "Catch 2 nature-type beasts",
        quest_type: "catch_type",
        target_value: Some("nature"),
        required: 2,
        xp_reward: 90,
        coin_reward: 18,
    },
    QuestSeed {
        id: "q-catch-shadow",
        title: "Shadow Chaser",
        description: "Catch a shadow-type beast",
        quest_type: "catch_type",
        target_value: Some("shadow"),
        required: 1,
        xp_reward: 120,
        coin_reward: 25,
    },
];

pub const SEASON_EXCLUSIVE_CREATURE: &str = "eclipse-lord";

fn image_url(creature_id: &str) -> String {
    format!("/creatures/{creature_id}.svg")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub creatures: usize,
    pub evolutions: usize,
    pub quest_defs: usize,
    pub season_id: String,
    pub purged_spawns: u64,
}

impl Database {
    /// Upsert static content and this month's season, then drop expired spawns.
    /// Safe to run on every start.
    pub async fn seed(&self, now: DateTime<Utc>) -> Result<SeedReport, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for c in CREATURES {
            sqlx::query(
                r#"
                INSERT INTO creatures (id, name, image_url, rarity, type) VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name, image_url = excluded.image_url,
                    rarity = excluded.rarity, type = excluded.type
                "#,
            )
            .bind(c.id)
            .bind(c.name)
            .bind(image_url(c.id))
            .bind(c.rarity)
            .bind(c.creature_type)
            .execute(&mut *tx)
            .await?;
        }

        for e in EVOLUTIONS {
            sqlx::query(
                r#"
                INSERT INTO creature_evolutions (id, base_creature_id, stage, name, image_url)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    base_creature_id = excluded.base_creature_id, stage = excluded.stage,
                    name = excluded.name, image_url = excluded.image_url
                "#,
            )
            .bind(e.id)
            .bind(e.base_creature_id)
            .bind(e.stage)
            .bind(e.name)
            .bind(image_url(e.creature_id))
            .execute(&mut *tx)
            .await?;
        }

        for q in QUEST_DEFS {
            sqlx::query(
                r#"
                INSERT INTO quest_defs (id, title, description, type, target_value, required, xp_reward, coin_reward)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title, description = excluded.description,
                    type = excluded.type, target_value = excluded.target_value,
                    required = excluded.required, xp_reward = excluded.xp_reward,
                    coin_reward = excluded.coin_reward
                "#,
            )
            .bind(q.id)
            .bind(q.title)
            .bind(q.description)
            .bind(q.quest_type)
            .bind(q.target_value)
            .bind(q.required)
            .bind(q.xp_reward)
            .bind(q.coin_reward)
            .execute(&mut *tx)
            .await?;
        }

        let season = monthly_season(now);
        sqlx::query(
            r#"
            INSERT INTO seasons (id, name, theme, element, exclusive_creature_id, starts_at, ends_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, theme = excluded.theme, element = excluded.element,
                exclusive_creature_id = excluded.exclusive_creature_id,
                starts_at = excluded.starts_at, ends_at = excluded.ends_at
            "#,
        )
        .bind(&season.id)
        .bind(season.name)
        .bind(season.theme)
        .bind(season.element)
        .bind(SEASON_EXCLUSIVE_CREATURE)
        .bind(sql_datetime(season.starts_at))
        .bind(sql_datetime(season.ends_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let purged_spawns = self.purge_expired_spawns(now).await?;

        let report = SeedReport {
            creatures: CREATURES.len(),
            evolutions: EVOLUTIONS.len(),
            quest_defs: QUEST_DEFS.len(),
            season_id: season.id,
            purged_spawns,
        };
        tracing::info!(
            creatures = report.creatures,
            evolutions = report.evolutions,
            quest_defs = report.quest_defs,
            season = %report.season_id,
            purged_spawns = report.purged_spawns,
            "Seed complete"
        );
        Ok(report)
    }
}
