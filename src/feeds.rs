//! Thin adapters over the JSON files the collectors drop off.
//!
//! Scraping, odds fetching, and box-score collection live in other services;
//! this crate only reads what they wrote.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::ease::{EaseFeed, EaseIndex};
use crate::market::OddsEvent;
use crate::model::{GameLog, PlayerProjection};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("reading feed {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing feed {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, FeedError> {
    let data = fs::read_to_string(path).map_err(|source| FeedError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| FeedError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_projections(path: &Path) -> Result<Vec<PlayerProjection>, FeedError> {
    load(path)
}

pub fn load_odds(path: &Path) -> Result<Vec<OddsEvent>, FeedError> {
    load(path)
}

pub fn load_game_logs(path: &Path) -> Result<Vec<GameLog>, FeedError> {
    load(path)
}

/// Ease degrades instead of failing: a missing or unreadable feed becomes a
/// neutral index with a warning, since picks are still valid without it.
pub fn load_ease(path: &Path) -> EaseIndex {
    match load::<EaseFeed>(path) {
        Ok(feed) => EaseIndex::new(feed),
        Err(err) => {
            tracing::warn!(%err, "ease feed unavailable, scoring without matchup data");
            EaseIndex::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn projections_parse_with_optional_fields_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projections.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"[{{
                "name": "Jayson Tatum",
                "team": "BOS",
                "position": "SF",
                "opponent": "@ LAL",
                "minutes": 36.0,
                "projections": {{ "points": 28.0, "rebounds": 8.5 }}
            }}]"#
        )
        .unwrap();

        let players = load_projections(&path).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Jayson Tatum");
        assert!(players[0].age.is_none());
        assert!(!players[0].back_to_back);
    }

    #[test]
    fn missing_required_feed_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_projections(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, FeedError::Read { .. }));
    }

    #[test]
    fn malformed_feed_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odds.json");
        std::fs::write(&path, "[{").unwrap();
        let err = load_odds(&path).unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    #[test]
    fn game_logs_distinguish_missing_stats_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamelogs.json");
        std::fs::write(
            &path,
            r#"[{ "player": "Test Guard", "date": "2026-01-20", "points": 0.0 }]"#,
        )
        .unwrap();

        let logs = load_game_logs(&path).unwrap();
        assert_eq!(logs[0].points, Some(0.0));
        assert_eq!(logs[0].threes, None);
    }

    #[test]
    fn missing_ease_degrades_to_neutral() {
        let dir = tempfile::tempdir().unwrap();
        let idx = load_ease(&dir.path().join("nope.json"));
        assert!(idx.is_empty());
    }

    #[test]
    fn ease_feed_parses_nested_windows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ease.json");
        std::fs::write(
            &path,
            r#"{ "PG": { "1w": { "BOS": { "points": 0.8 } } } }"#,
        )
        .unwrap();
        let idx = load_ease(&path);
        assert!(!idx.is_empty());
    }
}
