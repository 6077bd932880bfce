//! Text normalization for cross-feed matching.
//!
//! The projection, odds, and game-log feeds each spell player names slightly
//! differently ("C.J. McCollum" vs "CJ McCollum"). All indexes key on the
//! normalized form so the feeds line up.

/// Canonical lookup form of a player name: periods stripped, whitespace
/// collapsed to single spaces, lowercased.
pub fn player_name(raw: &str) -> String {
    raw.replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract the opponent team code from feed strings like "@ BOS", "vs LAL",
/// or a bare "BOS".
pub fn opponent_code(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('@').trim();
    let s = s
        .strip_prefix("vs.")
        .or_else(|| s.strip_prefix("vs"))
        .map(str::trim)
        .unwrap_or(s);
    s.to_uppercase()
}
