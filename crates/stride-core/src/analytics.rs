//! Entry points tying the folder scan, metrics, and cache together.

use crate::cache::{all_checksums, AnalyticsCache};
use crate::config::StrideConfig;
use crate::error::Result;
use crate::metrics::{Metrics, MetricsCalculator};
use crate::sprint_data::{parse_all_sprints, parse_sprint, scan_sprint_folders, SprintSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Metrics for every analytics folder, served from cache when nothing changed.
///
/// With no sprint folders this returns [`Metrics::empty`] and leaves the
/// cache alone. A failed cache write is logged and the fresh metrics are
/// still returned.
pub fn get_metrics(root: &Path, config: &StrideConfig, use_cache: bool, force_refresh: bool) -> Metrics {
    let folders = scan_sprint_folders(root, &config.analytics_prefix);
    if folders.is_empty() {
        tracing::debug!("no sprint folders; skipping analytics");
        return Metrics::empty();
    }

    let mut cache = AnalyticsCache::open(root);
    let checksums = all_checksums(&folders);

    if use_cache && !force_refresh && cache.is_valid(&checksums) {
        if let Some(metrics) = cache.cached_metrics() {
            tracing::debug!(sprints = folders.len(), "analytics cache hit");
            return metrics.clone();
        }
    }

    tracing::debug!(sprints = folders.len(), force_refresh, "recomputing analytics");
    let sprints = parse_all_sprints(&folders);
    let metrics = MetricsCalculator::new(&sprints).calculate_all();

    if let Err(e) = cache.save(&metrics, checksums) {
        tracing::warn!(path = %cache.path().display(), error = %e, "failed to write analytics cache");
    }
    metrics
}

pub fn clear_analytics_cache(root: &Path) -> Result<()> {
    AnalyticsCache::open(root).clear()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
    pub last_calculated: DateTime<Utc>,
    pub sprint_count: usize,
    pub cache_age: String,
}

/// Summary of the persisted cache, or `None` when there is none.
pub fn get_cache_info(root: &Path) -> Option<CacheInfo> {
    let cache = AnalyticsCache::open(root);
    let record = cache.record()?;
    Some(CacheInfo {
        last_calculated: record.last_calculated,
        sprint_count: record.sprint_count,
        cache_age: cache.cache_age()?,
    })
}

/// Analytics view of one sprint, if its folder is part of the analytics scan.
pub fn get_sprint_summary(root: &Path, config: &StrideConfig, sprint_id: &str) -> Option<SprintSummary> {
    scan_sprint_folders(root, &config.analytics_prefix)
        .into_iter()
        .find(|f| f.file_name().is_some_and(|n| n == sprint_id))
        .map(|folder| SprintSummary::from(&parse_sprint(&folder)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write_sprint(root: &Path, id: &str, files: &[(&str, &str)]) {
        let dir = paths::sprint_dir(root, id);
        std::fs::create_dir_all(&dir).unwrap();
        for (name, body) in files {
            std::fs::write(dir.join(name), body).unwrap();
        }
    }

    fn project() -> (TempDir, StrideConfig) {
        let dir = TempDir::new().unwrap();
        let config = StrideConfig::default();
        write_sprint(
            dir.path(),
            "sprint-001",
            &[
                (
                    "project.md",
                    "---\nstatus: completed\ncreated: 2024-01-01\ncompleted: 2024-01-03\n---\n# One\n",
                ),
                ("plan.md", "- [x] a\n- [x] b\n"),
                ("implementation.md", "## [Timestamp: 2024-01-02] Stride: A\n"),
                ("retrospective.md", "- went well\n"),
            ],
        );
        write_sprint(
            dir.path(),
            "sprint-002",
            &[
                ("project.md", "# Two\n\nStatus: active\n"),
                ("plan.md", "- [x] a\n- [ ] b\n"),
            ],
        );
        (dir, config)
    }

    #[test]
    fn no_sprints_returns_empty_without_cache() {
        let dir = TempDir::new().unwrap();
        let metrics = get_metrics(dir.path(), &StrideConfig::default(), true, false);
        assert_eq!(metrics, Metrics::empty());
        assert!(!paths::analytics_path(dir.path()).exists());
        assert!(get_cache_info(dir.path()).is_none());
    }

    #[test]
    fn computes_and_caches() {
        let (dir, config) = project();
        let metrics = get_metrics(dir.path(), &config, true, false);
        assert_eq!(metrics.counts.total_sprints, 2);
        assert_eq!(metrics.counts.completed_sprints, 1);
        assert_eq!(metrics.counts.active_sprints, 1);
        assert_eq!(metrics.tasks.total_tasks, 4);
        assert_eq!(metrics.tasks.sprint_velocity, 2.0);
        assert_eq!(metrics.duration.average_duration, 2.0);

        let info = get_cache_info(dir.path()).unwrap();
        assert_eq!(info.sprint_count, 2);
        assert_eq!(info.cache_age, "just now");
    }

    #[test]
    fn valid_cache_is_returned_verbatim() {
        let (dir, config) = project();
        let folders = scan_sprint_folders(dir.path(), &config.analytics_prefix);
        let mut doctored = Metrics::empty();
        doctored.counts.total_sprints = 99;
        AnalyticsCache::open(dir.path())
            .save(&doctored, all_checksums(&folders))
            .unwrap();

        assert_eq!(get_metrics(dir.path(), &config, true, false).counts.total_sprints, 99);
        assert_eq!(get_metrics(dir.path(), &config, false, false).counts.total_sprints, 2);
    }

    #[test]
    fn force_refresh_bypasses_cache() {
        let (dir, config) = project();
        let folders = scan_sprint_folders(dir.path(), &config.analytics_prefix);
        let mut doctored = Metrics::empty();
        doctored.counts.total_sprints = 99;
        AnalyticsCache::open(dir.path())
            .save(&doctored, all_checksums(&folders))
            .unwrap();

        assert_eq!(get_metrics(dir.path(), &config, true, true).counts.total_sprints, 2);
        // The refresh overwrote the doctored record.
        assert_eq!(get_metrics(dir.path(), &config, true, false).counts.total_sprints, 2);
    }

    #[test]
    fn stale_checksums_trigger_recompute() {
        let (dir, config) = project();
        let mut doctored = Metrics::empty();
        doctored.counts.total_sprints = 99;
        let stale: BTreeMap<String, String> =
            [("sprint-001".to_string(), "old".to_string())].into_iter().collect();
        AnalyticsCache::open(dir.path()).save(&doctored, stale).unwrap();

        assert_eq!(get_metrics(dir.path(), &config, true, false).counts.total_sprints, 2);
    }

    #[test]
    fn clear_removes_cache() {
        let (dir, config) = project();
        get_metrics(dir.path(), &config, true, false);
        assert!(get_cache_info(dir.path()).is_some());
        clear_analytics_cache(dir.path()).unwrap();
        assert!(get_cache_info(dir.path()).is_none());
    }

    #[test]
    fn sprint_summary_lookup() {
        let (dir, config) = project();
        let summary = get_sprint_summary(dir.path(), &config, "sprint-002").unwrap();
        assert_eq!(summary.title, "Two");
        assert_eq!(summary.status, "active");
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.task_completion_rate, 50.0);
        assert!(get_sprint_summary(dir.path(), &config, "sprint-404").is_none());
    }

    #[test]
    fn prefix_selects_folders() {
        let (dir, _) = project();
        write_sprint(dir.path(), "spike-auth", &[("plan.md", "- [ ] a\n")]);
        let config = StrideConfig {
            analytics_prefix: "spike-".to_string(),
            ..StrideConfig::default()
        };
        let metrics = get_metrics(dir.path(), &config, false, false);
        assert_eq!(metrics.counts.total_sprints, 1);
    }
}
