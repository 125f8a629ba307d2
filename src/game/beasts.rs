// Beast roster and evolution.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{BeastView, CreatureEvolution, Database};
use crate::engine::beast::{can_evolve, check_evolution, xp_to_next_level};
use crate::error::{Error, Result};
use crate::metrics;

#[derive(Debug, Clone, Serialize)]
pub struct BeastSummary {
    #[serde(flatten)]
    pub beast: BeastView,
    pub can_evolve: bool,
    pub xp_to_next_level: i64,
}

impl From<BeastView> for BeastSummary {
    fn from(beast: BeastView) -> Self {
        BeastSummary {
            can_evolve: can_evolve(beast.stage, beast.level),
            xp_to_next_level: xp_to_next_level(beast.level, beast.beast_xp),
            beast,
        }
    }
}

pub async fn beast_roster(db: &Database, user_id: &str) -> Result<Vec<BeastSummary>> {
    let beasts = db.list_beasts(user_id).await?;
    Ok(beasts.into_iter().map(BeastSummary::from).collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolveOutcome {
    pub id: String,
    pub stage: i64,
    pub level: i64,
    pub beast_xp: i64,
    pub evo: Option<CreatureEvolution>,
}

pub async fn evolve_beast(
    db: &Database,
    user_id: &str,
    beast_id: &str,
    now: DateTime<Utc>,
) -> Result<EvolveOutcome> {
    let beast = db
        .get_beast(beast_id, user_id)
        .await?
        .ok_or(Error::NotFound("beast"))?;
    let new_stage = check_evolution(beast.stage, beast.level)?;

    if !db.set_beast_stage(&beast.id, beast.stage, new_stage, now).await? {
        // evolved concurrently; re-validate against the stored stage
        let current = db
            .get_beast(beast_id, user_id)
            .await?
            .ok_or(Error::NotFound("beast"))?;
        check_evolution(current.stage, current.level)?;
        return Err(Error::InvalidInput("beast changed, try again".to_string()));
    }

    let evo = db.get_evolution(&beast.base_creature_id, new_stage).await?;
    metrics::EVOLUTIONS_TOTAL
        .with_label_values(&[new_stage.to_string().as_str()])
        .inc();
    tracing::info!(user_id, beast_id, stage = new_stage, "Beast evolved");

    Ok(EvolveOutcome {
        id: beast.id,
        stage: new_stage,
        level: beast.level,
        beast_xp: beast.beast_xp,
        evo,
    })
}
