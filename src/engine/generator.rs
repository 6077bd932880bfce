//! Candidate generation: the eligibility filters between raw projections and
//! the scorer. A candidate only exists where a book actually posted a line.

use chrono::{DateTime, Utc};

use crate::market::MarketIndex;
use crate::model::{PlayerProjection, Side, StatCategory};

use super::Settings;

/// One scoreable (player, stat) pairing with its market context.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub player: &'a PlayerProjection,
    pub stat: StatCategory,
    pub side: Side,
    pub line: f64,
    pub projection: f64,
    pub edge: f64,
    pub weighted_edge: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub spread: Option<f64>,
}

/// Cross players with stat categories and keep only the pairings that clear
/// every eligibility filter.
pub fn generate<'a>(
    players: &'a [PlayerProjection],
    market: &MarketIndex,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();

    for player in players {
        if player.minutes < settings.min_minutes {
            continue;
        }
        if player.is_out() {
            tracing::debug!(player = %player.name, "excluded: ruled out");
            continue;
        }
        if player.start_time.is_some_and(|t| t <= now) {
            tracing::debug!(player = %player.name, "excluded: game already started");
            continue;
        }

        let name_norm = player.normalized_name();
        for stat in StatCategory::ALL {
            let projection = player.projections.value(stat);
            if projection < settings.min_projection && !stat.exempt_from_projection_floor() {
                continue;
            }

            let Some(market_line) = market.line(&name_norm, stat, now) else {
                continue;
            };

            // Equality means no edge at all; skip rather than pick a side.
            if projection == market_line.line {
                continue;
            }
            let side = if projection > market_line.line {
                Side::Over
            } else {
                Side::Under
            };
            let edge = (projection - market_line.line).abs();
            let weighted_edge = edge * stat.weight();
            if weighted_edge < settings.min_weighted_edge {
                continue;
            }

            candidates.push(Candidate {
                player,
                stat,
                side,
                line: market_line.line,
                projection,
                edge,
                weighted_edge,
                start_time: market_line.start_time.or(player.start_time),
                spread: market_line.spread,
            });
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{BookMarket, Bookmaker, MarketIndex, OddsEvent, Outcome};
    use crate::model::Projections;
    use approx::assert_relative_eq;

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn player(name: &str, minutes: f64, projections: Projections) -> PlayerProjection {
        PlayerProjection {
            name: name.to_string(),
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
            start_time: Some(t("2026-01-21T03:00:00Z")),
            game_total: None,
            projections,
        }
    }

    fn market_with_points_line(player_name: &str, line: f64) -> MarketIndex {
        let events = vec![OddsEvent {
            id: "e1".to_string(),
            home_team: "Boston Celtics".to_string(),
            away_team: "Los Angeles Lakers".to_string(),
            commence_time: Some(t("2026-01-21T03:00:00Z")),
            bookmakers: vec![Bookmaker {
                key: "draftkings".to_string(),
                markets: vec![BookMarket {
                    key: "player_points".to_string(),
                    outcomes: vec![Outcome {
                        name: "Over".to_string(),
                        description: Some(player_name.to_string()),
                        point: Some(line),
                        price: Some(1.9),
                    }],
                }],
            }],
        }];
        MarketIndex::build(&events, t("2026-01-21T00:00:00Z"))
    }

    #[test]
    fn side_and_edge_follow_projection_vs_line() {
        let players = vec![player(
            "Jayson Tatum",
            36.0,
            Projections {
                points: 28.0,
                ..Default::default()
            },
        )];
        let market = market_with_points_line("Jayson Tatum", 24.5);
        let candidates = generate(
            &players,
            &market,
            &Settings::default(),
            t("2026-01-21T00:00:00Z"),
        );
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.side, Side::Over);
        assert_relative_eq!(c.edge, 3.5);
        assert_relative_eq!(c.weighted_edge, 3.5);
    }

    #[test]
    fn projection_below_line_takes_the_under() {
        let players = vec![player(
            "Jayson Tatum",
            36.0,
            Projections {
                points: 21.0,
                ..Default::default()
            },
        )];
        let market = market_with_points_line("Jayson Tatum", 24.5);
        let candidates = generate(
            &players,
            &market,
            &Settings::default(),
            t("2026-01-21T00:00:00Z"),
        );
        assert_eq!(candidates[0].side, Side::Under);
        assert_relative_eq!(candidates[0].edge, 3.5);
    }

    #[test]
    fn low_minutes_and_ruled_out_players_are_excluded() {
        let mut bench = player(
            "Bench Guy",
            12.0,
            Projections {
                points: 28.0,
                ..Default::default()
            },
        );
        let market = market_with_points_line("Bench Guy", 24.5);
        let now = t("2026-01-21T00:00:00Z");
        assert!(generate(&[bench.clone()], &market, &Settings::default(), now).is_empty());

        bench.minutes = 36.0;
        bench.injury = Some("Out (knee)".to_string());
        assert!(generate(&[bench], &market, &Settings::default(), now).is_empty());
    }

    #[test]
    fn started_games_are_excluded_even_with_a_cached_line() {
        let players = vec![player(
            "Jayson Tatum",
            36.0,
            Projections {
                points: 28.0,
                ..Default::default()
            },
        )];
        let market = market_with_points_line("Jayson Tatum", 24.5);
        // After tip-off the player filter and the line lookup both refuse.
        let after_tip = t("2026-01-21T03:30:00Z");
        assert!(generate(&players, &market, &Settings::default(), after_tip).is_empty());
    }

    #[test]
    fn tiny_weighted_edges_are_dropped() {
        let players = vec![player(
            "Jayson Tatum",
            36.0,
            Projections {
                points: 24.55,
                ..Default::default()
            },
        )];
        let market = market_with_points_line("Jayson Tatum", 24.5);
        let candidates = generate(
            &players,
            &market,
            &Settings::default(),
            t("2026-01-21T00:00:00Z"),
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn projection_floor_exempts_low_volume_stats() {
        let players = vec![player(
            "Rim Protector",
            30.0,
            Projections {
                blocks: 0.8,
                ..Default::default()
            },
        )];
        let events = vec![OddsEvent {
            id: "e1".to_string(),
            home_team: "Boston Celtics".to_string(),
            away_team: "Los Angeles Lakers".to_string(),
            commence_time: Some(t("2026-01-21T03:00:00Z")),
            bookmakers: vec![Bookmaker {
                key: "draftkings".to_string(),
                markets: vec![BookMarket {
                    key: "player_blocks".to_string(),
                    outcomes: vec![Outcome {
                        name: "Over".to_string(),
                        description: Some("Rim Protector".to_string()),
                        point: Some(1.5),
                        price: Some(1.9),
                    }],
                }],
            }],
        }];
        let market = MarketIndex::build(&events, t("2026-01-21T00:00:00Z"));
        let candidates = generate(
            &players,
            &market,
            &Settings::default(),
            t("2026-01-21T00:00:00Z"),
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].side, Side::Under);
    }
}
