//! Flat-file persistence for the ledger and the alert log.
//!
//! Writes go through a temp file in the same directory followed by a rename,
//! so a crash mid-write can never leave a truncated history behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Side, StatCategory};

use super::Ledger;

fn load_json<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let tmp = path.with_extension("tmp");
    let data = serde_json::to_string_pretty(value).context("serializing")?;
    {
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(data.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("syncing {}", tmp.display()))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

impl Ledger {
    /// Load the ledger, treating a missing file as an empty history.
    pub fn load(path: &Path) -> anyhow::Result<Ledger> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        save_json(self, path)
    }
}

/// Record of which pick alerts have already gone out. Keys include side and
/// line, so a line move re-alerts while a plain rerun stays silent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AlertLog {
    sent: BTreeMap<String, DateTime<Utc>>,
}

impl AlertLog {
    pub fn load(path: &Path) -> anyhow::Result<AlertLog> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        save_json(self, path)
    }

    pub fn key(date: NaiveDate, player: &str, stat: StatCategory, side: Side, line: f64) -> String {
        format!("{}_{}_{}_{}_{}", date, player, stat.key(), side, line)
    }

    /// Mark an alert sent. Returns true when this is the first send for the
    /// key, false when it was already delivered.
    pub fn mark_sent(&mut self, key: String, now: DateTime<Utc>) -> bool {
        use std::collections::btree_map::Entry;
        match self.sent.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
            Entry::Occupied(_) => false,
        }
    }
}
