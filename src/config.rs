use std::path::PathBuf;

use chrono::FixedOffset;
use clap::Parser;

use crate::engine::Settings;

/// NBA player-prop pick scoring and resolution engine
#[derive(Parser, Debug, Clone)]
#[command(name = "prop-prophet", version, about)]
pub struct Config {
    /// Player projection feed (JSON)
    #[arg(long, env = "PROJECTIONS_PATH", default_value = "data/projections.json")]
    pub projections_path: PathBuf,

    /// Matchup ease rankings feed (JSON); missing file degrades to neutral
    #[arg(long, env = "EASE_PATH", default_value = "data/ease.json")]
    pub ease_path: PathBuf,

    /// Sportsbook odds feed (JSON)
    #[arg(long, env = "ODDS_PATH", default_value = "data/odds.json")]
    pub odds_path: PathBuf,

    /// Box-score game log feed (JSON)
    #[arg(long, env = "GAMELOGS_PATH", default_value = "data/gamelogs.json")]
    pub gamelogs_path: PathBuf,

    /// History ledger file
    #[arg(long, env = "LEDGER_PATH", default_value = "history/ledger.json")]
    pub ledger_path: PathBuf,

    /// Alert deduplication log
    #[arg(long, env = "ALERTS_PATH", default_value = "history/alerts.json")]
    pub alerts_path: PathBuf,

    /// Output file for the day's sorted picks plus the running record
    #[arg(long, env = "PICKS_OUT", default_value = "out/picks.json")]
    pub picks_out: PathBuf,

    /// Operating timezone as a fixed UTC offset in hours (Pacific by default)
    #[arg(long, env = "TZ_OFFSET_HOURS", default_value = "-8", allow_hyphen_values = true)]
    pub tz_offset_hours: i32,

    /// Minutes before the earliest tip-off that the ledger commit window opens
    #[arg(long, env = "LOCK_WINDOW_MINS", default_value = "40")]
    pub lock_window_mins: i64,

    /// Minutes after the earliest tip-off that the commit window stays open
    #[arg(long, env = "LOCK_GRACE_MINS", default_value = "10")]
    pub lock_grace_mins: i64,

    /// Minimum projected minutes for a player to be considered
    #[arg(long, env = "MIN_MINUTES", default_value = "20.0")]
    pub min_minutes: f64,

    /// Minutes threshold for the top-tier downgrade gate
    #[arg(long, env = "GATE_MINUTES", default_value = "23.0")]
    pub gate_minutes: f64,

    /// Minimum weighted edge for a candidate to survive generation
    #[arg(long, env = "MIN_WEIGHTED_EDGE", default_value = "0.1")]
    pub min_weighted_edge: f64,

    /// Divisor turning weighted edge into base confidence
    #[arg(long, env = "EDGE_K", default_value = "5.0")]
    pub edge_k: f64,

    /// Confidence ceiling after all adjustments
    #[arg(long, env = "CONFIDENCE_CAP", default_value = "0.99")]
    pub confidence_cap: f64,

    /// Minimum score for a pick to appear in output
    #[arg(long, env = "MIN_SCORE", default_value = "6.5")]
    pub min_score: f64,

    /// Score threshold for the LOCK tier
    #[arg(long, env = "TIER_LOCK", default_value = "11.0")]
    pub tier_lock: f64,

    /// Score threshold for the DIAMOND tier
    #[arg(long, env = "TIER_DIAMOND", default_value = "9.5")]
    pub tier_diamond: f64,

    /// Score threshold for the ELITE tier
    #[arg(long, env = "TIER_ELITE", default_value = "8.5")]
    pub tier_elite: f64,

    /// Score threshold for the STRONG PLAY tier
    #[arg(long, env = "TIER_STRONG", default_value = "7.5")]
    pub tier_strong: f64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(-12..=14).contains(&self.tz_offset_hours) {
            anyhow::bail!("tz_offset_hours must be a valid UTC offset (-12 to 14)");
        }
        if self.lock_window_mins < 0 || self.lock_grace_mins < 0 {
            anyhow::bail!("lock window minutes must be non-negative");
        }
        if self.edge_k <= 0.0 {
            anyhow::bail!("edge_k must be positive");
        }
        if !(0.5..=1.0).contains(&self.confidence_cap) {
            anyhow::bail!("confidence_cap must be between 0.5 and 1.0");
        }
        if self.min_minutes < 0.0 || self.gate_minutes < 0.0 {
            anyhow::bail!("minutes thresholds must be non-negative");
        }
        let tiers = [
            self.tier_strong,
            self.tier_elite,
            self.tier_diamond,
            self.tier_lock,
        ];
        if !tiers.windows(2).all(|w| w[0] < w[1]) {
            anyhow::bail!("tier thresholds must be strictly increasing: strong < elite < diamond < lock");
        }
        if self.min_score > self.tier_strong {
            anyhow::bail!("min_score must not exceed the STRONG tier threshold");
        }
        Ok(())
    }

    pub fn timezone(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.tz_offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("invalid timezone offset: {}", self.tz_offset_hours))
    }

    /// Calibration settings for the engine, defaults overridden by flags.
    pub fn settings(&self) -> Settings {
        Settings {
            min_minutes: self.min_minutes,
            gate_minutes: self.gate_minutes,
            min_weighted_edge: self.min_weighted_edge,
            edge_k: self.edge_k,
            confidence_cap: self.confidence_cap,
            min_score: self.min_score,
            tier_lock: self.tier_lock,
            tier_diamond: self.tier_diamond,
            tier_elite: self.tier_elite,
            tier_strong: self.tier_strong,
            ..Settings::default()
        }
    }
}
