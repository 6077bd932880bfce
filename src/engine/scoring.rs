//! Confidence scoring pipeline.
//!
//! Pure over its inputs: a candidate, its ease composite, and its last-5
//! sample go in; a [`ScoreBreakdown`] recording every adjustment comes out.
//! Nothing here touches feeds, clocks, or the ledger.

use serde::{Deserialize, Serialize};

use crate::ease::EaseComposite;
use crate::form::L5Sample;
use crate::model::Side;

use super::generator::Candidate;
use super::Settings;

/// Letter grade over the final confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(s)
    }
}

/// Pick tier. Ordered worst to best so `Ord` matches quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "SOLID PLAY")]
    Solid,
    #[serde(rename = "STRONG PLAY")]
    Strong,
    #[serde(rename = "ELITE")]
    Elite,
    #[serde(rename = "DIAMOND")]
    Diamond,
    #[serde(rename = "LOCK")]
    Lock,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Solid => "SOLID PLAY",
            Tier::Strong => "STRONG PLAY",
            Tier::Elite => "ELITE",
            Tier::Diamond => "DIAMOND",
            Tier::Lock => "LOCK",
        };
        f.write_str(s)
    }
}

/// The last-5 adjustment actually applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L5Adjustment {
    pub hits: u32,
    pub valid: u32,
    pub multiplier: f64,
}

/// Every number the pipeline produced, kept separately so the rationale
/// formatter and the gates can reason about how the confidence was reached.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub base_confidence: f64,
    pub ease_adjustment: f64,
    pub l5: Option<L5Adjustment>,
    pub context_adjustment: f64,
    pub capped_by_b2b: bool,
    pub capped_by_contradiction: bool,
    pub confidence: f64,
    pub grade: Grade,
    pub score: f64,
    pub tier: Tier,
}

/// Scoring either yields a breakdown or throws the candidate out entirely.
#[derive(Debug)]
pub enum ScoreOutcome {
    Scored(ScoreBreakdown),
    /// Zero hits across exactly five valid games. The market has already
    /// adjusted past this player; no confidence floor applies.
    Disqualified,
}

const MIN_CONFIDENCE: f64 = 0.01;
const SCORE_MULTIPLIER: f64 = 2.5;

/// Band-based ease adjustment magnitude for a blended ease value.
fn ease_band(magnitude: f64) -> f64 {
    if magnitude >= 1.00 {
        0.15
    } else if magnitude >= 0.70 {
        0.12
    } else if magnitude >= 0.50 {
        0.08
    } else if magnitude >= 0.30 {
        0.05
    } else {
        0.0
    }
}

/// Whether the pick side agrees with the sign of the blended ease.
pub fn ease_aligned(side: Side, blended: f64) -> bool {
    match side {
        Side::Over => blended > 0.0,
        Side::Under => blended < 0.0,
    }
}

fn l5_multiplier(sample: L5Sample) -> Option<L5Adjustment> {
    // Thin samples carry no signal either way.
    if sample.valid < 3 {
        return None;
    }
    let multiplier = match sample.hits {
        5 => 1.20,
        4 => 1.15,
        3 => 1.00,
        2 => 0.90,
        _ => 0.85,
    };
    Some(L5Adjustment {
        hits: sample.hits,
        valid: sample.valid,
        multiplier,
    })
}

pub fn grade_for(confidence: f64) -> Grade {
    if confidence >= 0.90 {
        Grade::APlus
    } else if confidence >= 0.85 {
        Grade::A
    } else if confidence >= 0.80 {
        Grade::AMinus
    } else if confidence >= 0.75 {
        Grade::BPlus
    } else if confidence >= 0.70 {
        Grade::B
    } else if confidence >= 0.60 {
        Grade::C
    } else {
        Grade::D
    }
}

pub fn tier_for(score: f64, settings: &Settings) -> Tier {
    if score >= settings.tier_lock {
        Tier::Lock
    } else if score >= settings.tier_diamond {
        Tier::Diamond
    } else if score >= settings.tier_elite {
        Tier::Elite
    } else if score >= settings.tier_strong {
        Tier::Strong
    } else {
        Tier::Solid
    }
}

/// Run the full confidence pipeline for one candidate.
pub fn score(
    candidate: &Candidate<'_>,
    ease: EaseComposite,
    l5: Option<L5Sample>,
    settings: &Settings,
) -> ScoreOutcome {
    if let Some(sample) = l5 {
        if sample.hits == 0 && sample.valid == 5 {
            return ScoreOutcome::Disqualified;
        }
    }

    let base_confidence = 0.5 + candidate.weighted_edge / settings.edge_k;

    let band = ease_band(ease.blended.abs());
    let ease_adjustment = if band == 0.0 {
        0.0
    } else if ease_aligned(candidate.side, ease.blended) {
        band
    } else {
        -band
    };

    let mut confidence = base_confidence + ease_adjustment;

    let l5_adjustment = l5.and_then(l5_multiplier);
    if let Some(adj) = l5_adjustment {
        confidence *= adj.multiplier;
    }

    let context_adjustment = context_adjustment(candidate, settings);
    confidence += context_adjustment;

    let mut capped_by_b2b = false;
    if candidate.player.back_to_back && confidence > settings.b2b_cap {
        confidence = settings.b2b_cap;
        capped_by_b2b = true;
    }

    let contradicted = ease.blended.abs() >= settings.contradiction_ease
        && !ease_aligned(candidate.side, ease.blended);
    let mut capped_by_contradiction = false;
    if contradicted && confidence > settings.contradiction_cap {
        confidence = settings.contradiction_cap;
        capped_by_contradiction = true;
    }

    let confidence = confidence.clamp(MIN_CONFIDENCE, settings.confidence_cap);

    let grade = grade_for(confidence);
    let score = candidate.weighted_edge * confidence * SCORE_MULTIPLIER;
    let tier = tier_for(score, settings);

    ScoreOutcome::Scored(ScoreBreakdown {
        base_confidence,
        ease_adjustment,
        l5: l5_adjustment,
        context_adjustment,
        capped_by_b2b,
        capped_by_contradiction,
        confidence,
        grade,
        score,
        tier,
    })
}

/// Additive schedule, game-environment, and sharp-signal modifiers.
fn context_adjustment(candidate: &Candidate<'_>, settings: &Settings) -> f64 {
    let player = candidate.player;
    let side = candidate.side;
    let mut adjustment = 0.0;

    if player.rest_days == Some(0) {
        adjustment -= settings.no_rest_penalty;
    }
    if player.back_to_back {
        adjustment -= if player.age_or_default() >= settings.vet_age {
            settings.b2b_penalty_vet
        } else {
            settings.b2b_penalty_young
        };
    }

    if let Some(total) = player.game_total {
        let pace = if total >= settings.high_total {
            Some(true)
        } else if total <= settings.low_total {
            Some(false)
        } else {
            None
        };
        if let Some(fast) = pace {
            let aligned = (fast && side == Side::Over) || (!fast && side == Side::Under);
            adjustment += if aligned {
                settings.total_adjust
            } else {
                -settings.total_adjust
            };
        }
    }

    // Big spreads threaten fourth-quarter minutes, which only hurts overs.
    if side == Side::Over {
        if let Some(spread) = candidate.spread {
            if spread.abs() >= settings.blowout_spread {
                adjustment -= settings.blowout_penalty;
                if player.age_or_default() >= settings.vet_age {
                    adjustment -= settings.blowout_vet_penalty;
                }
            }
        }
    }

    if let Some(sharp) = player.sharp {
        let agrees = (side == Side::Over && sharp >= settings.sharp_threshold)
            || (side == Side::Under && sharp <= -settings.sharp_threshold);
        if agrees {
            adjustment += settings.sharp_bonus;
        }
    }
    if side == Side::Over && player.sharp_floor.is_some_and(|f| f > -1.0) {
        adjustment += settings.floor_bonus;
    }
    if side == Side::Under && player.sharp_ceiling.is_some_and(|c| c < 1.0) {
        adjustment += settings.ceiling_bonus;
    }

    if side == Side::Over {
        if let Some(vc) = player.value_consistency {
            if vc >= settings.consistency_threshold {
                adjustment += settings.consistency_adjust;
            } else if vc <= -settings.consistency_threshold {
                adjustment -= settings.consistency_adjust;
            }
        }
    }

    adjustment
}
