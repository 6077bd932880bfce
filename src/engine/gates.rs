//! Tier gates and downgrades applied after scoring.
//!
//! The scorer trusts its numbers; this layer distrusts the top tiers. A pick
//! can carry a lock-grade score and still not deserve the lock label when
//! its minutes, experience, or form say otherwise.

use crate::ease::EaseComposite;
use crate::form::L5Sample;

use super::generator::Candidate;
use super::scoring::{ease_aligned, ScoreBreakdown, Tier};
use super::Settings;

/// Rookie form threshold: below this L5 value a rookie pick loses its top
/// tier even on full minutes.
const ROOKIE_VALUE_FLOOR: f64 = 1.0;

/// Apply every gate to a scored breakdown, returning the (possibly
/// downgraded) final breakdown.
pub fn apply(
    candidate: &Candidate<'_>,
    breakdown: &ScoreBreakdown,
    ease: EaseComposite,
    l5: Option<L5Sample>,
    settings: &Settings,
) -> ScoreBreakdown {
    let mut result = breakdown.clone();
    let player = candidate.player;

    // Minutes gate: thin playing time caps everything above STRONG.
    if player.minutes < settings.gate_minutes && result.tier > Tier::Strong {
        tracing::debug!(player = %player.name, minutes = player.minutes, "minutes gate");
        result.tier = Tier::Strong;
    }

    // Rookie gate: unproven players need both form and minutes for a top tier.
    if player.is_rookie() && result.tier > Tier::Strong {
        let weak_form = player
            .last5_value
            .is_none_or(|v| v < ROOKIE_VALUE_FLOOR);
        if weak_form || player.minutes < settings.gate_minutes {
            tracing::debug!(player = %player.name, "rookie gate");
            result.tier = Tier::Strong;
        }
    }

    if result.tier == Tier::Lock {
        // A lock must not fight a meaningful matchup signal.
        let contradicted = ease.blended.abs() >= settings.contradiction_ease
            && !ease_aligned(candidate.side, ease.blended);
        if contradicted {
            result.tier = Tier::Diamond;
        }
        // Nor carry nearly dead recent form.
        if l5.is_some_and(|s| s.hits == 1 && s.valid == 5) {
            result.tier = Tier::Diamond;
        }
    }

    // Score consistency: a downgraded pick must also sort below real locks.
    if result.tier < Tier::Lock && result.score >= settings.tier_lock {
        result.score = settings.tier_lock - 0.01;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::{score, ScoreOutcome};
    use crate::model::{PlayerProjection, Projections, Side, StatCategory};
    use approx::assert_relative_eq;

    fn player(minutes: f64) -> PlayerProjection {
        PlayerProjection {
            name: "Test Wing".to_string(),
            team: "BOS".to_string(),
            position: "SF".to_string(),
            opponent: "@ LAL".to_string(),
            minutes,
            injury: None,
            status: None,
            rest_days: Some(1),
            back_to_back: false,
            age: Some(27),
            last3_value: None,
            last5_value: None,
            value_consistency: None,
            sharp: None,
            sharp_floor: None,
            sharp_ceiling: None,
            start_time: None,
            game_total: None,
            projections: Projections::default(),
        }
    }

    fn candidate<'a>(p: &'a PlayerProjection, projection: f64, line: f64) -> Candidate<'a> {
        let side = if projection > line { Side::Over } else { Side::Under };
        let edge = (projection - line).abs();
        Candidate {
            player: p,
            stat: StatCategory::Points,
            side,
            line,
            projection,
            edge,
            weighted_edge: edge,
            start_time: None,
            spread: None,
        }
    }

    fn ease(blended: f64) -> EaseComposite {
        EaseComposite {
            positional: blended,
            team: blended,
            blended,
        }
    }

    fn breakdown_for(
        c: &Candidate<'_>,
        e: EaseComposite,
        l5: Option<L5Sample>,
        s: &Settings,
    ) -> ScoreBreakdown {
        match score(c, e, l5, s) {
            ScoreOutcome::Scored(b) => b,
            ScoreOutcome::Disqualified => panic!("unexpected disqualification"),
        }
    }

    // A 4.6-point points edge with clean context clamps confidence at 0.99
    // and scores 11.385, a natural lock.
    fn lock_numbers() -> (f64, f64) {
        (29.1, 24.5)
    }

    #[test]
    fn low_minutes_downgrade_elite_and_above() {
        let settings = Settings::default();
        let p = player(21.0);
        let (proj, line) = lock_numbers();
        let c = candidate(&p, proj, line);
        let b = breakdown_for(&c, ease(0.0), None, &settings);
        assert_eq!(b.tier, Tier::Lock, "precondition: scores as a lock");

        let gated = apply(&c, &b, ease(0.0), None, &settings);
        assert_eq!(gated.tier, Tier::Strong);
    }

    #[test]
    fn rookie_with_weak_form_loses_top_tier() {
        let settings = Settings::default();
        let mut p = player(34.0);
        p.status = Some("Rookie".to_string());
        p.last5_value = Some(0.4);
        let (proj, line) = lock_numbers();
        let c = candidate(&p, proj, line);
        let b = breakdown_for(&c, ease(0.0), None, &settings);

        let gated = apply(&c, &b, ease(0.0), None, &settings);
        assert_eq!(gated.tier, Tier::Strong);
    }

    #[test]
    fn proven_rookie_keeps_the_tier() {
        let settings = Settings::default();
        let mut p = player(34.0);
        p.status = Some("Rookie".to_string());
        p.last5_value = Some(1.6);
        let (proj, line) = lock_numbers();
        let c = candidate(&p, proj, line);
        let b = breakdown_for(&c, ease(0.0), None, &settings);

        let gated = apply(&c, &b, ease(0.0), None, &settings);
        assert_eq!(gated.tier, b.tier);
    }

    #[test]
    fn lock_fighting_the_matchup_becomes_diamond() {
        let settings = Settings::default();
        let p = player(34.0);
        // Needs an edge big enough to stay a lock through the 0.84 cap:
        // we 5.3 * 0.84 * 2.5 = 11.13.
        let c = candidate(&p, 29.8, 24.5);
        let b = breakdown_for(&c, ease(-0.2), None, &settings);
        assert_eq!(b.tier, Tier::Lock, "precondition: survives the cap as a lock");

        let gated = apply(&c, &b, ease(-0.2), None, &settings);
        assert_eq!(gated.tier, Tier::Diamond);
    }

    #[test]
    fn lock_with_one_of_five_form_becomes_diamond() {
        let settings = Settings::default();
        let p = player(34.0);
        // 0.85 multiplier needs a bigger raw edge to still reach lock:
        // base 0.5 + 5.6/5 = 1.62, *0.85 clamps to 0.99; 5.6*0.99*2.5 = 13.86.
        let c = candidate(&p, 30.1, 24.5);
        let sample = Some(L5Sample { hits: 1, valid: 5 });
        let b = breakdown_for(&c, ease(0.0), sample, &settings);
        assert_eq!(b.tier, Tier::Lock);

        let gated = apply(&c, &b, ease(0.0), sample, &settings);
        assert_eq!(gated.tier, Tier::Diamond);
        assert!(
            gated.score < settings.tier_lock,
            "downgraded pick must sort below real locks"
        );
    }

    #[test]
    fn score_correction_lands_just_under_the_lock_threshold() {
        let settings = Settings::default();
        let p = player(21.0);
        let (proj, line) = lock_numbers();
        let c = candidate(&p, proj, line);
        let b = breakdown_for(&c, ease(0.0), None, &settings);
        assert!(b.score >= settings.tier_lock);

        let gated = apply(&c, &b, ease(0.0), None, &settings);
        assert_relative_eq!(gated.score, settings.tier_lock - 0.01);
    }

    #[test]
    fn clean_lock_passes_untouched() {
        let settings = Settings::default();
        let p = player(34.0);
        let (proj, line) = lock_numbers();
        let c = candidate(&p, proj, line);
        let sample = Some(L5Sample { hits: 4, valid: 5 });
        let b = breakdown_for(&c, ease(0.4), sample, &settings);
        assert_eq!(b.tier, Tier::Lock);

        let gated = apply(&c, &b, ease(0.4), sample, &settings);
        assert_eq!(gated.tier, Tier::Lock);
        assert_relative_eq!(gated.score, b.score);
    }
}
