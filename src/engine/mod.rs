//! The pick engine: candidate generation, confidence scoring, gates, and
//! rationale text, orchestrated by [`run`].

pub mod explain;
pub mod gates;
pub mod generator;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ease::{EaseComposite, EaseIndex};
use crate::form::RecentFormIndex;
use crate::market::MarketIndex;
use crate::model::{PlayerProjection, Side, StatCategory};
use scoring::{Grade, ScoreOutcome, Tier};

/// Calibration constants. Defaults carry the values the grade and tier
/// breakpoints were tuned against; every one is overridable from config.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Minimum projected minutes to consider a player at all.
    pub min_minutes: f64,
    /// Minutes threshold below which top tiers are downgraded.
    pub gate_minutes: f64,
    /// Minimum raw projection for a candidate (steals/blocks/turnovers exempt).
    pub min_projection: f64,
    /// Minimum weighted edge for a candidate to survive generation.
    pub min_weighted_edge: f64,
    /// Divisor turning weighted edge into base confidence.
    pub edge_k: f64,
    /// Ceiling applied after all adjustments.
    pub confidence_cap: f64,
    /// Picks scoring under this are dropped from output.
    pub min_score: f64,
    /// Tier breakpoints, descending.
    pub tier_lock: f64,
    pub tier_diamond: f64,
    pub tier_elite: f64,
    pub tier_strong: f64,
    /// Rest and schedule penalties.
    pub no_rest_penalty: f64,
    pub b2b_penalty_young: f64,
    pub b2b_penalty_vet: f64,
    pub vet_age: u32,
    /// Game-environment thresholds.
    pub high_total: f64,
    pub low_total: f64,
    pub total_adjust: f64,
    pub blowout_spread: f64,
    pub blowout_penalty: f64,
    pub blowout_vet_penalty: f64,
    /// Sharp-signal thresholds and bonuses.
    pub sharp_threshold: f64,
    pub sharp_bonus: f64,
    pub floor_bonus: f64,
    pub ceiling_bonus: f64,
    pub consistency_threshold: f64,
    pub consistency_adjust: f64,
    /// Ease-contradiction magnitude that triggers the cap and the lock gate.
    pub contradiction_ease: f64,
    /// Confidence caps.
    pub b2b_cap: f64,
    pub contradiction_cap: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_minutes: 20.0,
            gate_minutes: 23.0,
            min_projection: 1.0,
            min_weighted_edge: 0.1,
            edge_k: 5.0,
            confidence_cap: 0.99,
            min_score: 6.5,
            tier_lock: 11.0,
            tier_diamond: 9.5,
            tier_elite: 8.5,
            tier_strong: 7.5,
            no_rest_penalty: 0.05,
            b2b_penalty_young: 0.03,
            b2b_penalty_vet: 0.08,
            vet_age: 30,
            high_total: 235.0,
            low_total: 215.0,
            total_adjust: 0.04,
            blowout_spread: 10.0,
            blowout_penalty: 0.20,
            blowout_vet_penalty: 0.10,
            sharp_threshold: 1.5,
            sharp_bonus: 0.06,
            floor_bonus: 0.03,
            ceiling_bonus: 0.03,
            consistency_threshold: 1.5,
            consistency_adjust: 0.04,
            contradiction_ease: 0.15,
            b2b_cap: 0.89,
            contradiction_cap: 0.84,
        }
    }
}

/// A fully scored, gated pick ready for output and the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Pick {
    pub player: String,
    pub team: String,
    pub position: String,
    pub opponent: String,
    pub stat: StatCategory,
    pub side: Side,
    pub line: f64,
    pub projection: f64,
    pub edge: f64,
    pub weighted_edge: f64,
    pub ease: EaseComposite,
    pub confidence: f64,
    pub grade: Grade,
    pub score: f64,
    pub tier: Tier,
    pub rationale: String,
    pub start_time: Option<DateTime<Utc>>,
}

/// Run the full pipeline over one set of feed indexes. Returns picks sorted
/// by score, best first.
pub fn run(
    players: &[PlayerProjection],
    market: &MarketIndex,
    ease: &EaseIndex,
    form: &RecentFormIndex,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Vec<Pick> {
    let candidates = generator::generate(players, market, settings, now);
    tracing::info!(candidates = candidates.len(), "generated candidates");

    let mut picks: Vec<Pick> = Vec::new();
    for candidate in candidates {
        let composite = ease.composite(
            candidate.stat,
            candidate.player.parsed_position(),
            &candidate.player.opponent_code(),
        );
        let l5 = form.hit_rate(
            &candidate.player.normalized_name(),
            candidate.stat,
            candidate.line,
            candidate.side,
        );

        let breakdown = match scoring::score(&candidate, composite, l5, settings) {
            ScoreOutcome::Scored(b) => b,
            ScoreOutcome::Disqualified => {
                tracing::debug!(
                    player = %candidate.player.name,
                    stat = %candidate.stat,
                    "disqualified on zero-for-five form"
                );
                continue;
            }
        };

        if breakdown.score < settings.min_score {
            continue;
        }

        let gated = gates::apply(&candidate, &breakdown, composite, l5, settings);
        let rationale = explain::rationale(&candidate, &gated, composite, l5);

        picks.push(Pick {
            player: candidate.player.name.clone(),
            team: candidate.player.team.clone(),
            position: candidate.player.position.clone(),
            opponent: candidate.player.opponent_code(),
            stat: candidate.stat,
            side: candidate.side,
            line: candidate.line,
            projection: candidate.projection,
            edge: candidate.edge,
            weighted_edge: candidate.weighted_edge,
            ease: composite,
            confidence: gated.confidence,
            grade: gated.grade,
            score: gated.score,
            tier: gated.tier,
            rationale,
            start_time: candidate.start_time,
        });
    }

    picks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    picks
}
