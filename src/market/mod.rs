//! Market line index built from the odds feed.
//!
//! Quotes are grouped per (player, stat market), averaged across books, and
//! rounded to the nearest half point. Events that have already tipped off are
//! excluded outright; a pick against a live line is worthless downstream.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::StatCategory;
use crate::normalize;

/// One event from the odds feed.
#[derive(Debug, Clone, Deserialize)]
pub struct OddsEvent {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    #[serde(default)]
    pub markets: Vec<BookMarket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

/// Player-prop outcomes carry the player in `description` and the line in
/// `point`; game-level spread outcomes carry the team in `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub point: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone)]
struct Quote {
    point: f64,
    start_time: Option<DateTime<Utc>>,
    spread: Option<f64>,
}

/// Aggregated line for one (player, stat) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketLine {
    /// Book-average line, rounded to the nearest half point.
    pub line: f64,
    pub start_time: Option<DateTime<Utc>>,
    /// Point-spread magnitude of the event, when any book posted one.
    pub spread: Option<f64>,
}

/// Multimap from (normalized player name, stat) to book quotes.
#[derive(Debug, Default)]
pub struct MarketIndex {
    quotes: HashMap<(String, StatCategory), Vec<Quote>>,
}

const SPREADS_KEY: &str = "spreads";

/// Round to the nearest half point, matching how books quote lines.
pub fn round_half(x: f64) -> f64 {
    (x * 2.0).round() / 2.0
}

fn stat_for_market_key(key: &str) -> Option<StatCategory> {
    StatCategory::ALL.iter().copied().find(|s| s.market_key() == key)
}

impl MarketIndex {
    /// Build the index from the raw feed, skipping events whose start time
    /// has already passed.
    pub fn build(events: &[OddsEvent], now: DateTime<Utc>) -> Self {
        let mut quotes: HashMap<(String, StatCategory), Vec<Quote>> = HashMap::new();

        for event in events {
            if event.commence_time.is_some_and(|t| t <= now) {
                tracing::debug!(event = %event.id, "skipping started event");
                continue;
            }

            // Largest spread magnitude any book posted for this event.
            let spread = event
                .bookmakers
                .iter()
                .flat_map(|b| &b.markets)
                .filter(|m| m.key == SPREADS_KEY)
                .flat_map(|m| &m.outcomes)
                .filter_map(|o| o.point)
                .map(f64::abs)
                .fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a| a.max(v)))
                });

            for book in &event.bookmakers {
                for market in &book.markets {
                    let Some(stat) = stat_for_market_key(&market.key) else {
                        continue;
                    };
                    for outcome in &market.outcomes {
                        let (Some(player), Some(point)) =
                            (outcome.description.as_deref(), outcome.point)
                        else {
                            continue;
                        };
                        // Over/Under outcomes quote the same point; keep one
                        // side to avoid double-weighting books.
                        if outcome.name != "Over" {
                            continue;
                        }
                        quotes
                            .entry((normalize::player_name(player), stat))
                            .or_default()
                            .push(Quote {
                                point,
                                start_time: event.commence_time,
                                spread,
                            });
                    }
                }
            }
        }

        MarketIndex { quotes }
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Aggregated line for one player and stat, or `None` when no book
    /// quotes it or the game has since started.
    pub fn line(
        &self,
        player_norm: &str,
        stat: StatCategory,
        now: DateTime<Utc>,
    ) -> Option<MarketLine> {
        let quotes = self
            .quotes
            .get(&(player_norm.to_string(), stat))
            .filter(|q| !q.is_empty())?;

        // Re-check staleness at lookup time; a long run can cross a tip-off.
        let live: Vec<&Quote> = quotes
            .iter()
            .filter(|q| !q.start_time.is_some_and(|t| t <= now))
            .collect();
        if live.is_empty() {
            return None;
        }

        let avg = live.iter().map(|q| q.point).sum::<f64>() / live.len() as f64;
        Some(MarketLine {
            line: round_half(avg),
            start_time: live.iter().find_map(|q| q.start_time),
            spread: live.iter().find_map(|q| q.spread),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prop_outcome(player: &str, point: f64, name: &str) -> Outcome {
        Outcome {
            name: name.to_string(),
            description: Some(player.to_string()),
            point: Some(point),
            price: Some(1.9),
        }
    }

    fn event(id: &str, commence: Option<DateTime<Utc>>, books: Vec<Bookmaker>) -> OddsEvent {
        OddsEvent {
            id: id.to_string(),
            home_team: "Boston Celtics".to_string(),
            away_team: "Los Angeles Lakers".to_string(),
            commence_time: commence,
            bookmakers: books,
        }
    }

    fn book(key: &str, market_key: &str, outcomes: Vec<Outcome>) -> Bookmaker {
        Bookmaker {
            key: key.to_string(),
            markets: vec![BookMarket {
                key: market_key.to_string(),
                outcomes,
            }],
        }
    }

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn averages_books_and_rounds_to_half_point() {
        let events = vec![event(
            "e1",
            Some(t("2026-01-21T03:00:00Z")),
            vec![
                book(
                    "draftkings",
                    "player_points",
                    vec![prop_outcome("Jayson Tatum", 27.5, "Over")],
                ),
                book(
                    "fanduel",
                    "player_points",
                    vec![prop_outcome("Jayson Tatum", 28.5, "Over")],
                ),
            ],
        )];
        let now = t("2026-01-21T00:00:00Z");
        let idx = MarketIndex::build(&events, now);
        let line = idx
            .line("jayson tatum", StatCategory::Points, now)
            .expect("line should exist");
        assert_relative_eq!(line.line, 28.0);
    }

    #[test]
    fn rounding_lands_on_half_points() {
        assert_relative_eq!(round_half(24.3), 24.5);
        assert_relative_eq!(round_half(24.2), 24.0);
        assert_relative_eq!(round_half(24.75), 25.0);
    }

    #[test]
    fn started_events_are_excluded_at_build() {
        let events = vec![event(
            "e1",
            Some(t("2026-01-20T23:00:00Z")),
            vec![book(
                "draftkings",
                "player_points",
                vec![prop_outcome("Jayson Tatum", 27.5, "Over")],
            )],
        )];
        let now = t("2026-01-21T00:00:00Z");
        let idx = MarketIndex::build(&events, now);
        assert!(idx.line("jayson tatum", StatCategory::Points, now).is_none());
    }

    #[test]
    fn lookup_rechecks_staleness() {
        let tip = t("2026-01-21T01:00:00Z");
        let events = vec![event(
            "e1",
            Some(tip),
            vec![book(
                "draftkings",
                "player_points",
                vec![prop_outcome("Jayson Tatum", 27.5, "Over")],
            )],
        )];
        let build_time = t("2026-01-21T00:00:00Z");
        let idx = MarketIndex::build(&events, build_time);
        assert!(idx
            .line("jayson tatum", StatCategory::Points, build_time)
            .is_some());
        // Same index queried after tip-off must refuse the line.
        assert!(idx
            .line("jayson tatum", StatCategory::Points, tip)
            .is_none());
    }

    #[test]
    fn spread_magnitude_is_captured() {
        let events = vec![event(
            "e1",
            Some(t("2026-01-21T03:00:00Z")),
            vec![Bookmaker {
                key: "draftkings".to_string(),
                markets: vec![
                    BookMarket {
                        key: "spreads".to_string(),
                        outcomes: vec![Outcome {
                            name: "Boston Celtics".to_string(),
                            description: None,
                            point: Some(-11.5),
                            price: Some(1.9),
                        }],
                    },
                    BookMarket {
                        key: "player_points".to_string(),
                        outcomes: vec![prop_outcome("Jayson Tatum", 27.5, "Over")],
                    },
                ],
            }],
        )];
        let now = t("2026-01-21T00:00:00Z");
        let idx = MarketIndex::build(&events, now);
        let line = idx
            .line("jayson tatum", StatCategory::Points, now)
            .expect("line should exist");
        assert_relative_eq!(line.spread.expect("spread captured"), 11.5);
    }

    #[test]
    fn under_outcomes_do_not_double_weight() {
        let events = vec![event(
            "e1",
            Some(t("2026-01-21T03:00:00Z")),
            vec![book(
                "draftkings",
                "player_points",
                vec![
                    prop_outcome("Jayson Tatum", 27.5, "Over"),
                    prop_outcome("Jayson Tatum", 27.5, "Under"),
                ],
            )],
        )];
        let now = t("2026-01-21T00:00:00Z");
        let idx = MarketIndex::build(&events, now);
        let line = idx
            .line("jayson tatum", StatCategory::Points, now)
            .expect("line should exist");
        assert_relative_eq!(line.line, 27.5);
    }
}
