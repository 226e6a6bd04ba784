//! On-disk analytics cache keyed by per-sprint file checksums.
//!
//! Any added, removed, or touched sprint invalidates the whole record.

use crate::error::Result;
use crate::io::{atomic_write, modified_time, remove_if_exists};
use crate::metrics::Metrics;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub last_calculated: DateTime<Utc>,
    pub sprint_count: usize,
    pub metrics: Metrics,
    pub sprint_checksums: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct AnalyticsCache {
    path: PathBuf,
    data: Option<CacheRecord>,
}

impl AnalyticsCache {
    /// Open the cache at `.stride/analytics.json` under `root`.
    pub fn open(root: &Path) -> Self {
        Self::load(paths::analytics_path(root))
    }

    /// Load a cache file. Missing or unparseable files yield an empty cache.
    pub fn load(path: PathBuf) -> Self {
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<CacheRecord>(&raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt analytics cache");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable analytics cache");
                None
            }
        };
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self) -> Option<&CacheRecord> {
        self.data.as_ref()
    }

    /// True only when the stored checksums match `current` exactly.
    pub fn is_valid(&self, current: &BTreeMap<String, String>) -> bool {
        let Some(record) = &self.data else {
            return false;
        };
        let stored = &record.sprint_checksums;
        stored.len() == current.len()
            && current
                .iter()
                .all(|(id, checksum)| stored.get(id) == Some(checksum))
    }

    /// Replace the record and persist it.
    pub fn save(&mut self, metrics: &Metrics, checksums: BTreeMap<String, String>) -> Result<()> {
        let record = CacheRecord {
            last_calculated: Utc::now(),
            sprint_count: checksums.len(),
            metrics: metrics.clone(),
            sprint_checksums: checksums,
        };
        let json = serde_json::to_string_pretty(&record)?;
        atomic_write(&self.path, json.as_bytes())?;
        self.data = Some(record);
        Ok(())
    }

    pub fn cached_metrics(&self) -> Option<&Metrics> {
        self.data.as_ref().map(|r| &r.metrics)
    }

    pub fn cache_age(&self) -> Option<String> {
        self.cache_age_at(Utc::now())
    }

    pub fn cache_age_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.data
            .as_ref()
            .map(|r| relative_age(now - r.last_calculated))
    }

    /// Delete the persisted record and forget the in-memory copy.
    pub fn clear(&mut self) -> Result<()> {
        remove_if_exists(&self.path)?;
        self.data = None;
        Ok(())
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{n} {unit}s ago")
    } else {
        format!("{n} {unit} ago")
    }
}

fn relative_age(age: chrono::Duration) -> String {
    let days = age.num_days();
    let hours = age.num_hours();
    let minutes = age.num_minutes();
    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "just now".to_string()
    }
}

// ---------------------------------------------------------------------------
// Checksums
// ---------------------------------------------------------------------------

/// MD5 over the modification times of the tracked sprint files.
///
/// A folder with none of the tracked files hashes its own name.
pub fn sprint_checksum(folder: &Path) -> String {
    let mut parts: Vec<String> = paths::CHECKSUM_FILES
        .iter()
        .filter_map(|name| {
            let mtime = modified_time(&folder.join(name))?;
            let since = mtime.duration_since(UNIX_EPOCH).ok()?;
            Some(format!("{name}:{}.{:09}", since.as_secs(), since.subsec_nanos()))
        })
        .collect();

    if parts.is_empty() {
        parts.push(
            folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    }
    format!("{:x}", md5::compute(parts.join("|")))
}

pub fn all_checksums(folders: &[PathBuf]) -> BTreeMap<String, String> {
    folders
        .iter()
        .filter_map(|folder| {
            let id = folder.file_name()?.to_string_lossy().into_owned();
            Some((id, sprint_checksum(folder)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
