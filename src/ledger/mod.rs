//! History ledger: every pick the engine has ever committed, merged
//! idempotently per day, resolved against actual box scores, and aggregated
//! into a running record.

pub mod store;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring::Tier;
use crate::engine::Pick;
use crate::form::RecentFormIndex;
use crate::model::{Side, StatCategory};
use crate::normalize;

/// Resolution state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PickResult {
    Pending,
    Win,
    Loss,
    Push,
}

/// One persisted pick. Identity is `{player}-{statKey}-{localDate}`; the
/// record stays mutable while pending and freezes once settled. Entries are
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPick {
    pub id: String,
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub stat: StatCategory,
    pub side: Side,
    pub line: f64,
    pub tier: Tier,
    pub score: f64,
    /// Game date in the operating timezone.
    pub date: NaiveDate,
    pub result: PickResult,
    #[serde(default)]
    pub actual: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

/// Win/loss record for one slice of the ledger. Pushes count neither way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierRecord {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub pct: u32,
}

impl TierRecord {
    fn tally(&mut self, result: PickResult) {
        match result {
            PickResult::Win => self.wins += 1,
            PickResult::Loss => self.losses += 1,
            PickResult::Push => self.pushes += 1,
            PickResult::Pending => {}
        }
    }

    fn finish(&mut self) {
        let total = self.wins + self.losses;
        self.pct = if total > 0 {
            ((self.wins as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
    }
}

/// Aggregate record: the whole season plus each headline tier.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LedgerStats {
    pub overall: TierRecord,
    pub locks: TierRecord,
    pub diamond: TierRecord,
    pub elite: TierRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub picks: Vec<HistoryPick>,
}

/// Ledger identity of a pick: stable across reruns within the same local day.
pub fn pick_id(player: &str, stat: StatCategory, date: NaiveDate) -> String {
    format!("{}-{}-{}", normalize::player_name(player), stat.key(), date)
}

/// The game's calendar date in the operating timezone, falling back to the
/// run's local date when the feed omitted a start time.
fn local_date(start_time: Option<DateTime<Utc>>, tz: FixedOffset, now: DateTime<Utc>) -> NaiveDate {
    start_time.unwrap_or(now).with_timezone(&tz).date_naive()
}

/// Whether the commit window is open: within `window_mins` before the
/// earliest candidate tip-off, up to `grace_mins` after. Fails closed when
/// no candidate carries a start time.
pub fn commit_window_open(
    picks: &[Pick],
    now: DateTime<Utc>,
    window_mins: i64,
    grace_mins: i64,
) -> bool {
    let Some(earliest) = picks.iter().filter_map(|p| p.start_time).min() else {
        return false;
    };
    let open = earliest - chrono::Duration::minutes(window_mins);
    let close = earliest + chrono::Duration::minutes(grace_mins);
    now >= open && now <= close
}

impl Ledger {
    /// Merge today's picks into the ledger. Reruns within the same local day
    /// update pending entries in place (tier, line, side, score); settled
    /// entries are never touched; nothing is ever removed.
    pub fn merge(&mut self, picks: &[Pick], tz: FixedOffset, now: DateTime<Utc>) {
        let mut added = 0usize;
        let mut updated = 0usize;

        for pick in picks {
            let date = local_date(pick.start_time, tz, now);
            let id = pick_id(&pick.player, pick.stat, date);

            match self.picks.iter_mut().find(|h| h.id == id) {
                Some(existing) => {
                    if existing.result != PickResult::Pending {
                        continue;
                    }
                    existing.tier = pick.tier;
                    existing.line = pick.line;
                    existing.side = pick.side;
                    existing.score = pick.score;
                    updated += 1;
                }
                None => {
                    self.picks.push(HistoryPick {
                        id,
                        player: pick.player.clone(),
                        team: pick.team.clone(),
                        opponent: pick.opponent.clone(),
                        stat: pick.stat,
                        side: pick.side,
                        line: pick.line,
                        tier: pick.tier,
                        score: pick.score,
                        date,
                        result: PickResult::Pending,
                        actual: None,
                        recorded_at: now,
                        settled_at: None,
                    });
                    added += 1;
                }
            }
        }

        tracing::info!(added, updated, total = self.picks.len(), "ledger merged");
    }

    /// Settle pending picks whose game date has fully passed in the
    /// operating timezone. Today's games are never touched, even finished
    /// ones; they settle on tomorrow's run once the box scores are final.
    pub fn resolve(&mut self, form: &RecentFormIndex, tz: FixedOffset, now: DateTime<Utc>) {
        let today = now.with_timezone(&tz).date_naive();
        let mut settled = 0usize;

        for pick in &mut self.picks {
            if pick.result != PickResult::Pending || pick.date >= today {
                continue;
            }
            let Some(actual) =
                form.actual_on(&normalize::player_name(&pick.player), pick.date, pick.stat)
            else {
                tracing::debug!(id = %pick.id, "no box score yet, staying pending");
                continue;
            };

            pick.result = if actual == pick.line {
                PickResult::Push
            } else {
                let hit = match pick.side {
                    Side::Over => actual > pick.line,
                    Side::Under => actual < pick.line,
                };
                if hit {
                    PickResult::Win
                } else {
                    PickResult::Loss
                }
            };
            pick.actual = Some(actual);
            pick.settled_at = Some(now);
            settled += 1;
        }

        if settled > 0 {
            tracing::info!(settled, "ledger resolved");
        }
    }

    /// Running record across all settled picks, plus each headline tier.
    pub fn aggregate(&self) -> LedgerStats {
        let mut stats = LedgerStats::default();
        for pick in &self.picks {
            if pick.result == PickResult::Pending {
                continue;
            }
            stats.overall.tally(pick.result);
            match pick.tier {
                Tier::Lock => stats.locks.tally(pick.result),
                Tier::Diamond => stats.diamond.tally(pick.result),
                Tier::Elite => stats.elite.tally(pick.result),
                _ => {}
            }
        }
        stats.overall.finish();
        stats.locks.finish();
        stats.diamond.finish();
        stats.elite.finish();
        stats
    }
}
