use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize;

/// Age assumed when the projection feed omits it. Only consulted where age
/// scaling applies (back-to-back and blowout penalties).
pub const DEFAULT_AGE: u32 = 25;

/// A player-prop stat category. Closed set: the seven base box-score stats
/// plus the four combined markets the books quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Points,
    Rebounds,
    Assists,
    Threes,
    Steals,
    Blocks,
    Turnovers,
    PointsRebounds,
    PointsAssists,
    ReboundsAssists,
    PointsReboundsAssists,
}

impl StatCategory {
    pub const ALL: [StatCategory; 11] = [
        StatCategory::Points,
        StatCategory::Rebounds,
        StatCategory::Assists,
        StatCategory::Threes,
        StatCategory::Steals,
        StatCategory::Blocks,
        StatCategory::Turnovers,
        StatCategory::PointsRebounds,
        StatCategory::PointsAssists,
        StatCategory::ReboundsAssists,
        StatCategory::PointsReboundsAssists,
    ];

    /// Short key used in ledger pick IDs and alert keys.
    pub fn key(self) -> &'static str {
        match self {
            StatCategory::Points => "p",
            StatCategory::Rebounds => "r",
            StatCategory::Assists => "a",
            StatCategory::Threes => "3",
            StatCategory::Steals => "s",
            StatCategory::Blocks => "b",
            StatCategory::Turnovers => "to",
            StatCategory::PointsRebounds => "pr",
            StatCategory::PointsAssists => "pa",
            StatCategory::ReboundsAssists => "ra",
            StatCategory::PointsReboundsAssists => "pra",
        }
    }

    /// Market key as quoted by the odds feed.
    pub fn market_key(self) -> &'static str {
        match self {
            StatCategory::Points => "player_points",
            StatCategory::Rebounds => "player_rebounds",
            StatCategory::Assists => "player_assists",
            StatCategory::Threes => "player_threes",
            StatCategory::Steals => "player_steals",
            StatCategory::Blocks => "player_blocks",
            StatCategory::Turnovers => "player_turnovers",
            StatCategory::PointsRebounds => "player_points_rebounds",
            StatCategory::PointsAssists => "player_points_assists",
            StatCategory::ReboundsAssists => "player_rebounds_assists",
            StatCategory::PointsReboundsAssists => "player_points_rebounds_assists",
        }
    }

    /// Display label for rationale text.
    pub fn label(self) -> &'static str {
        match self {
            StatCategory::Points => "Points",
            StatCategory::Rebounds => "Rebounds",
            StatCategory::Assists => "Assists",
            StatCategory::Threes => "Threes",
            StatCategory::Steals => "Steals",
            StatCategory::Blocks => "Blocks",
            StatCategory::Turnovers => "Turnovers",
            StatCategory::PointsRebounds => "Pts+Reb",
            StatCategory::PointsAssists => "Pts+Ast",
            StatCategory::ReboundsAssists => "Reb+Ast",
            StatCategory::PointsReboundsAssists => "Pts+Reb+Ast",
        }
    }

    /// Base-stat components. A base stat is its own single component; combined
    /// stats list the stats whose projections/ease values/actuals are summed
    /// or averaged.
    pub fn components(self) -> &'static [StatCategory] {
        use StatCategory::*;
        match self {
            Points => &[Points],
            Rebounds => &[Rebounds],
            Assists => &[Assists],
            Threes => &[Threes],
            Steals => &[Steals],
            Blocks => &[Blocks],
            Turnovers => &[Turnovers],
            PointsRebounds => &[Points, Rebounds],
            PointsAssists => &[Points, Assists],
            ReboundsAssists => &[Rebounds, Assists],
            PointsReboundsAssists => &[Points, Rebounds, Assists],
        }
    }

    /// Edge weight. Rarer stats get more credit per unit of edge; combined
    /// stats get less because their raw edges run larger.
    pub fn weight(self) -> f64 {
        match self {
            StatCategory::Points => 1.0,
            StatCategory::Rebounds => 1.5,
            StatCategory::Assists => 1.6,
            StatCategory::Threes => 1.7,
            StatCategory::Steals => 3.5,
            StatCategory::Blocks => 3.5,
            StatCategory::Turnovers => 2.5,
            StatCategory::PointsRebounds => 0.9,
            StatCategory::PointsAssists => 0.9,
            StatCategory::ReboundsAssists => 1.1,
            StatCategory::PointsReboundsAssists => 0.85,
        }
    }

    /// Stats whose typical magnitude is small enough that the minimum
    /// projection floor would filter out legitimate plays.
    pub fn exempt_from_projection_floor(self) -> bool {
        matches!(
            self,
            StatCategory::Steals | StatCategory::Blocks | StatCategory::Turnovers
        )
    }
}

impl std::fmt::Display for StatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the posted line the pick takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Over,
    Under,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Over => f.write_str("OVER"),
            Side::Under => f.write_str("UNDER"),
        }
    }
}

/// On-court position as used by the ease rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    /// Parse the first token of a feed position string ("PG/SG" → PG).
    /// Unknown strings yield `None`, which falls back to team-general ease.
    pub fn parse(raw: &str) -> Option<Position> {
        match raw.split('/').next().unwrap_or("").trim() {
            "PG" => Some(Position::PG),
            "SG" => Some(Position::SG),
            "SF" => Some(Position::SF),
            "PF" => Some(Position::PF),
            "C" => Some(Position::C),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }
}

/// Per-stat statistical projections for one player. Combined categories are
/// derived on access, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projections {
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

impl Projections {
    pub fn value(&self, stat: StatCategory) -> f64 {
        stat.components().iter().map(|c| self.base(*c)).sum()
    }

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

/// One player's projection record for a single run. Rebuilt fresh every
/// pipeline run from the projection feed; not persisted beyond the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub name: String,
    #[serde(default)]
    pub team: String,
    /// Raw feed position, possibly multi-slot ("PG/SG").
    #[serde(default)]
    pub position: String,
    /// Opponent as quoted by the feed ("@ BOS", "vs LAL", "BOS").
    #[serde(default)]
    pub opponent: String,
    /// Projected minutes.
    #[serde(default)]
    pub minutes: f64,
    /// Free-text injury designation; "out" excludes the player.
    #[serde(default)]
    pub injury: Option<String>,
    /// Free-text roster status; used for rookie detection.
    #[serde(default)]
    pub status: Option<String>,
    /// Days of rest before this game. Zero means a back-to-back-adjacent
    /// schedule spot even when the b2b flag is unset.
    #[serde(default)]
    pub rest_days: Option<u32>,
    /// Second night of a back-to-back.
    #[serde(default)]
    pub back_to_back: bool,
    #[serde(default)]
    pub age: Option<u32>,
    /// Last-3-games aggregate value index.
    #[serde(default)]
    pub last3_value: Option<f64>,
    /// Last-5-games aggregate value index (consumed by the rookie gate).
    #[serde(default)]
    pub last5_value: Option<f64>,
    /// Global value-consistency indicator.
    #[serde(default)]
    pub value_consistency: Option<f64>,
    /// Sharp-money signal and its floor/ceiling variants.
    #[serde(default)]
    pub sharp: Option<f64>,
    #[serde(default)]
    pub sharp_floor: Option<f64>,
    #[serde(default)]
    pub sharp_ceiling: Option<f64>,
    /// Scheduled tip-off.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Game over/under total.
    #[serde(default)]
    pub game_total: Option<f64>,
    pub projections: Projections,
}

impl PlayerProjection {
    pub fn normalized_name(&self) -> String {
        normalize::player_name(&self.name)
    }

    pub fn parsed_position(&self) -> Option<Position> {
        Position::parse(&self.position)
    }

    pub fn opponent_code(&self) -> String {
        normalize::opponent_code(&self.opponent)
    }

    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    pub fn is_out(&self) -> bool {
        self.injury
            .as_deref()
            .is_some_and(|i| i.to_lowercase().contains("out"))
    }

    pub fn is_rookie(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("rookie"))
    }
}

/// One logged box-score line from the recent-form feed. A stat the box score
/// did not record is `None`; a recorded zero is a real observation and the
/// two must never be conflated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    pub player: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub rebounds: Option<f64>,
    #[serde(default)]
    pub assists: Option<f64>,
    #[serde(default)]
    pub threes: Option<f64>,
    #[serde(default)]
    pub steals: Option<f64>,
    #[serde(default)]
    pub blocks: Option<f64>,
    #[serde(default)]
    pub turnovers: Option<f64>,
}

impl GameLog {
    /// Actual value for a stat category, summing components for combined
    /// categories. `None` when any component was not recorded.
    pub fn stat_value(&self, stat: StatCategory) -> Option<f64> {
        stat.components().iter().map(|c| self.base(*c)).sum()
    }

    fn base(&self, stat: StatCategory) -> Option<f64> {
        match stat {
            StatCategory::Points => self.points,
            StatCategory::Rebounds => self.rebounds,
            StatCategory::Assists => self.assists,
            StatCategory::Threes => self.threes,
            StatCategory::Steals => self.steals,
            StatCategory::Blocks => self.blocks,
            StatCategory::Turnovers => self.turnovers,
            _ => None,
        }
    }
}
