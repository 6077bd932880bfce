use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

mod config;
mod ease;
mod engine;
mod feeds;
mod form;
mod ledger;
mod market;
mod model;
mod normalize;

use config::Config;
use engine::scoring::Tier;
use engine::Pick;
use ledger::store::AlertLog;
use ledger::{Ledger, LedgerStats};
use market::MarketIndex;

/// What the downstream publisher reads: the day's board plus the running
/// record.
#[derive(Serialize)]
struct PicksOutput<'a> {
    generated_at: chrono::DateTime<Utc>,
    picks: &'a [Pick],
    record: LedgerStats,
}

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let tz = config.timezone()?;
    let settings = config.settings();
    let now = Utc::now();

    // Load feeds. Projections, odds, and game logs are required; ease
    // degrades to neutral on its own.
    let players = feeds::load_projections(&config.projections_path)
        .context("projection feed is required")?;
    let odds = feeds::load_odds(&config.odds_path).context("odds feed is required")?;
    let game_logs =
        feeds::load_game_logs(&config.gamelogs_path).context("game log feed is required")?;
    let ease = feeds::load_ease(&config.ease_path);
    info!(
        players = players.len(),
        events = odds.len(),
        game_logs = game_logs.len(),
        "feeds loaded"
    );

    let market = MarketIndex::build(&odds, now);
    if market.is_empty() {
        warn!("no upcoming markets in the odds feed; today's board will be empty");
    }
    let form = form::RecentFormIndex::build(game_logs);
    if form.is_empty() {
        warn!("no game logs loaded; form adjustments and resolution will be skipped");
    }

    let picks = engine::run(&players, &market, &ease, &form, &settings, now);
    info!(picks = picks.len(), "board generated");
    for pick in &picks {
        info!(
            player = %pick.player,
            stat = %pick.stat,
            side = %pick.side,
            line = pick.line,
            score = format!("{:.2}", pick.score),
            tier = %pick.tier,
            "pick"
        );
    }

    // Ledger work. Any failure past this point must not half-write history;
    // the save itself is atomic and a failed save is fatal.
    let mut history = Ledger::load(&config.ledger_path)?;

    if ledger::commit_window_open(&picks, now, config.lock_window_mins, config.lock_grace_mins) {
        history.merge(&picks, tz, now);
    } else {
        info!("outside the commit window; board published without a ledger merge");
    }

    history.resolve(&form, tz, now);
    let record = history.aggregate();
    info!(
        wins = record.overall.wins,
        losses = record.overall.losses,
        pushes = record.overall.pushes,
        pct = record.overall.pct,
        lock_pct = record.locks.pct,
        "running record"
    );

    history
        .save(&config.ledger_path)
        .context("failed to persist the ledger")?;

    let output = PicksOutput {
        generated_at: now,
        picks: &picks,
        record,
    };
    write_output(&output, &config)?;

    queue_lock_alerts(&picks, &config, tz, now)?;

    Ok(())
}

fn write_output(output: &PicksOutput<'_>, config: &Config) -> Result<()> {
    if let Some(dir) = config.picks_out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let data = serde_json::to_string_pretty(output)?;
    std::fs::write(&config.picks_out, data)
        .with_context(|| format!("writing {}", config.picks_out.display()))?;
    info!(path = %config.picks_out.display(), "picks written");
    Ok(())
}

/// Queue notifications for lock-tier picks, at most once per unique pick per
/// day. Delivery itself belongs to the notifier service; this only records
/// intent.
fn queue_lock_alerts(
    picks: &[Pick],
    config: &Config,
    tz: chrono::FixedOffset,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let locks: Vec<&Pick> = picks.iter().filter(|p| p.tier == Tier::Lock).collect();
    if locks.is_empty() {
        return Ok(());
    }

    let mut alerts = AlertLog::load(&config.alerts_path)?;
    let mut queued = 0usize;
    for pick in locks {
        let date = pick
            .start_time
            .unwrap_or(now)
            .with_timezone(&tz)
            .date_naive();
        let key = AlertLog::key(date, &pick.player, pick.stat, pick.side, pick.line);
        if alerts.mark_sent(key, now) {
            info!(player = %pick.player, stat = %pick.stat, "lock alert queued");
            queued += 1;
        }
    }
    if queued > 0 {
        alerts
            .save(&config.alerts_path)
            .context("failed to persist the alert log")?;
    }
    Ok(())
}
