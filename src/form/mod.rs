//! Recent-form index over logged box scores.
//!
//! Serves two consumers: the scorer reads last-5 hit rates against the
//! current line, and the ledger resolver reads actual stat values for a
//! specific game date.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::{GameLog, Side, StatCategory};
use crate::normalize;

/// Hit count over a player's recent valid games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L5Sample {
    pub hits: u32,
    pub valid: u32,
}

#[derive(Debug, Default)]
pub struct RecentFormIndex {
    // Normalized player name -> logs ordered newest first.
    logs: HashMap<String, Vec<GameLog>>,
}

const SAMPLE_SIZE: usize = 5;

impl RecentFormIndex {
    pub fn build(mut logs: Vec<GameLog>) -> Self {
        let mut by_player: HashMap<String, Vec<GameLog>> = HashMap::new();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        for log in logs {
            by_player
                .entry(normalize::player_name(&log.player))
                .or_default()
                .push(log);
        }
        RecentFormIndex { logs: by_player }
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Hit rate of the last up-to-5 logged games against today's line.
    /// Only games where the stat was actually recorded count as valid; a
    /// game hits when its recorded value lands on the picked side of the
    /// line. `None` when the player has no logged games at all.
    pub fn hit_rate(
        &self,
        player_norm: &str,
        stat: StatCategory,
        line: f64,
        side: Side,
    ) -> Option<L5Sample> {
        let logs = self.logs.get(player_norm)?;
        let sample: Vec<&GameLog> = logs.iter().take(SAMPLE_SIZE).collect();
        if sample.is_empty() {
            return None;
        }
        let mut hits = 0u32;
        let mut valid = 0u32;
        for log in sample {
            let Some(actual) = log.stat_value(stat) else {
                continue;
            };
            valid += 1;
            let hit = match side {
                Side::Over => actual > line,
                Side::Under => actual < line,
            };
            if hit {
                hits += 1;
            }
        }
        Some(L5Sample { hits, valid })
    }

    /// Actual stat value from the game logged on `date`, for resolution.
    /// `None` when no game was logged or the box score omitted the stat.
    pub fn actual_on(&self, player_norm: &str, date: NaiveDate, stat: StatCategory) -> Option<f64> {
        self.logs
            .get(player_norm)?
            .iter()
            .find(|log| log.date == date)
            .and_then(|log| log.stat_value(stat))
    }
}
