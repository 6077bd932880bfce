//! Narrative rationale for a pick, formatted from the final breakdown.
//!
//! Pure text over numbers the pipeline already computed. Turnovers read
//! inverted: an opponent that is "easy" for turnovers is one that forces
//! them, so the matchup language flips while the numeric sign convention
//! stays shared with the other stats.

use crate::ease::EaseComposite;
use crate::form::L5Sample;
use crate::model::{Side, StatCategory};

use super::generator::Candidate;
use super::scoring::ScoreBreakdown;

pub fn rationale(
    candidate: &Candidate<'_>,
    breakdown: &ScoreBreakdown,
    ease: EaseComposite,
    l5: Option<L5Sample>,
) -> String {
    let mut lines = Vec::with_capacity(4);
    lines.push(opener(candidate));
    if let Some(sample) = l5 {
        lines.push(form_line(sample));
    }
    if candidate.player.last3_value.is_some_and(|v| v >= 1.5) {
        lines.push("Riding a hot stretch over the last three games.".to_string());
    }
    if let Some(line) = matchup_line(candidate, ease) {
        lines.push(line);
    }
    if let Some(line) = risk_line(candidate, breakdown) {
        lines.push(line);
    }
    lines.join(" ")
}

fn opener(candidate: &Candidate<'_>) -> String {
    format!(
        "{} projects {:.1} {} against a {:.1} line ({} {:.1}, edge {:.1}).",
        candidate.player.name,
        candidate.projection,
        candidate.stat.label(),
        candidate.line,
        candidate.side,
        candidate.line,
        candidate.edge,
    )
}

fn form_line(sample: L5Sample) -> String {
    format!(
        "Has cleared this number in {} of the last {} games.",
        sample.hits, sample.valid
    )
}

fn matchup_line(candidate: &Candidate<'_>, ease: EaseComposite) -> Option<String> {
    if ease.blended.abs() < 0.30 {
        return None;
    }
    let favorable = match candidate.side {
        Side::Over => ease.blended > 0.0,
        Side::Under => ease.blended < 0.0,
    };
    let opponent = candidate.player.opponent_code();
    let text = if candidate.stat == StatCategory::Turnovers {
        if favorable == (candidate.side == Side::Over) {
            format!("{} pressures ball handlers into turnovers.", opponent)
        } else {
            format!("{} rarely forces turnovers.", opponent)
        }
    } else if favorable {
        format!(
            "{} has been giving up {} to his position.",
            opponent,
            candidate.stat.label()
        )
    } else {
        format!(
            "Tough matchup: {} defends {} well.",
            opponent,
            candidate.stat.label()
        )
    };
    Some(text)
}

fn risk_line(candidate: &Candidate<'_>, breakdown: &ScoreBreakdown) -> Option<String> {
    let mut risks = Vec::new();
    if candidate.player.back_to_back {
        risks.push("second night of a back-to-back");
    }
    if candidate.player.rest_days == Some(0) {
        risks.push("no rest day");
    }
    if breakdown.capped_by_contradiction {
        risks.push("pick runs against the matchup numbers");
    }
    if candidate.side == Side::Over
        && candidate.spread.is_some_and(|s| s.abs() >= 10.0)
    {
        risks.push("blowout risk could cut fourth-quarter minutes");
    }
    if risks.is_empty() {
        None
    } else {
        Some(format!("Risk: {}.", risks.join("; ")))
    }
}
