//! Matchup-difficulty ("ease") index.
//!
//! The ease feed ranks how friendly each opponent is to each stat, split by
//! defending position and by time window. Positive values mean the matchup
//! favors the OVER, negative the UNDER. Missing entries are neutral zero so
//! a sparse feed degrades gracefully rather than skewing scores.

use std::collections::HashMap;

use serde::Deserialize;

use crate::model::{Position, StatCategory};

/// Sampling windows the ease feed is published over, weighted so recent
/// form dominates without drowning out the season baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Window {
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "2w")]
    TwoWeek,
    #[serde(rename = "season")]
    Season,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::OneWeek, Window::TwoWeek, Window::Season];

    pub fn weight(self) -> f64 {
        match self {
            Window::OneWeek => 0.50,
            Window::TwoWeek => 0.30,
            Window::Season => 0.20,
        }
    }
}

/// Per-opponent ease values for the base stats of one (position, window)
/// slice. Combined stats are averaged from these on lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EaseValues {
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub rebounds: f64,
    #[serde(default)]
    pub assists: f64,
    #[serde(default)]
    pub threes: f64,
    #[serde(default)]
    pub steals: f64,
    #[serde(default)]
    pub blocks: f64,
    #[serde(default)]
    pub turnovers: f64,
}

impl EaseValues {
    fn base(&self, stat: StatCategory) -> f64 {
        match stat {
            StatCategory::Points => self.points,
            StatCategory::Rebounds => self.rebounds,
            StatCategory::Assists => self.assists,
            StatCategory::Threes => self.threes,
            StatCategory::Steals => self.steals,
            StatCategory::Blocks => self.blocks,
            StatCategory::Turnovers => self.turnovers,
            _ => 0.0,
        }
    }
}

/// Blended positional + team-general ease for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct EaseComposite {
    pub positional: f64,
    pub team: f64,
    pub blended: f64,
}

/// Feed shape: position (or "All") → window → opponent team code → values.
pub type EaseFeed = HashMap<String, HashMap<Window, HashMap<String, EaseValues>>>;

/// In-memory ease table. Lookups never fail; anything missing is neutral.
#[derive(Debug, Default)]
pub struct EaseIndex {
    table: EaseFeed,
}

/// Share of the blended value that comes from the positional slice when the
/// player's position is known.
const POSITIONAL_SHARE: f64 = 0.70;

impl EaseIndex {
    pub fn new(table: EaseFeed) -> Self {
        EaseIndex { table }
    }

    /// Neutral index used when the ease feed is missing or unreadable.
    pub fn empty() -> Self {
        EaseIndex::default()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Window-weighted ease of one slice for one stat, averaging components
    /// for combined stats.
    fn slice_value(&self, slice: &str, opponent: &str, stat: StatCategory) -> f64 {
        let Some(windows) = self.table.get(slice) else {
            return 0.0;
        };
        let components = stat.components();
        let total: f64 = components
            .iter()
            .map(|component| {
                Window::ALL
                    .iter()
                    .map(|w| {
                        let v = windows
                            .get(w)
                            .and_then(|teams| teams.get(opponent))
                            .map(|values| values.base(*component))
                            .unwrap_or(0.0);
                        v * w.weight()
                    })
                    .sum::<f64>()
            })
            .sum();
        total / components.len() as f64
    }

    /// Composite ease for a candidate. Positional slice weighted 70/30
    /// against the team-general ("All") slice; team-only when the position
    /// could not be parsed.
    pub fn composite(
        &self,
        stat: StatCategory,
        position: Option<Position>,
        opponent: &str,
    ) -> EaseComposite {
        let team = self.slice_value("All", opponent, stat);
        match position {
            Some(pos) => {
                let positional = self.slice_value(pos.as_str(), opponent, stat);
                EaseComposite {
                    positional,
                    team,
                    blended: POSITIONAL_SHARE * positional + (1.0 - POSITIONAL_SHARE) * team,
                }
            }
            None => EaseComposite {
                positional: 0.0,
                team,
                blended: team,
            },
        }
    }
}
