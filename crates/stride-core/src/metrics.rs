//! Cross-sprint analytics over [`SprintData`].
//!
//! Every ratio is 0 when its denominator is 0.

use crate::sprint_data::SprintData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Metric sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub total_sprints: usize,
    pub active_sprints: usize,
    pub completed_sprints: usize,
    pub abandoned_sprints: usize,
    pub paused_sprints: usize,
    pub completion_rate: f64,
    pub abandonment_rate: f64,
    pub active_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationMetrics {
    pub has_duration_data: bool,
    pub average_duration: f64,
    pub median_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub std_dev: f64,
    pub durations_under_3_days: usize,
    pub durations_3_to_7_days: usize,
    pub durations_over_7_days: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastest_sprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slowest_sprint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub task_completion_rate: f64,
    pub average_tasks_per_sprint: f64,
    pub average_completed_per_sprint: f64,
    pub sprint_velocity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub sprints_with_planning: usize,
    pub sprints_with_implementation: usize,
    pub sprints_with_retrospective: usize,
    pub sprints_with_design: usize,
    pub sprints_with_proposal: usize,
    pub planning_coverage: f64,
    pub implementation_coverage: f64,
    pub retrospective_coverage: f64,
    pub process_adoption_rate: f64,
    pub average_retrospective_length: f64,
    pub average_learnings_count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
            Trend::InsufficientData => "insufficient_data",
        }
    }

    /// Compare a recent mean against an older one with a ±10% band.
    fn classify(older: f64, recent: f64) -> Self {
        if recent > older * 1.1 {
            Trend::Improving
        } else if recent < older * 0.9 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub has_trend_data: bool,
    pub sprints_last_7_days: usize,
    pub sprints_last_30_days: usize,
    pub sprints_last_90_days: usize,
    pub sprints_by_week: BTreeMap<String, usize>,
    pub sprints_by_month: BTreeMap<String, usize>,
    pub velocity_trend: Trend,
    pub completion_rate_trend: Trend,
}

impl Default for Trends {
    fn default() -> Self {
        Self {
            has_trend_data: false,
            sprints_last_7_days: 0,
            sprints_last_30_days: 0,
            sprints_last_90_days: 0,
            sprints_by_week: BTreeMap::new(),
            sprints_by_month: BTreeMap::new(),
            velocity_trend: Trend::InsufficientData,
            completion_rate_trend: Trend::InsufficientData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub health_score: u32,
    pub productivity_level: String,
    pub process_maturity: String,
    pub overall_status: String,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            health_score: 0,
            productivity_level: "none".to_string(),
            process_maturity: "none".to_string(),
            overall_status: "no_data".to_string(),
        }
    }
}

/// The full metrics tree, as persisted in the analytics cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub counts: Counts,
    pub duration: DurationMetrics,
    pub tasks: TaskMetrics,
    pub quality: QualityMetrics,
    pub trends: Trends,
    pub summary: Summary,
}

impl Metrics {
    /// Zeroed "no data" shape returned when there are no sprints.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.counts.total_sprints > 0
    }
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn ratio(part: usize, whole: usize) -> f64 {
    crate::markdown::percentage(part, whole)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1); 0 for fewer than two samples.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

// ---------------------------------------------------------------------------
// MetricsCalculator
// ---------------------------------------------------------------------------

pub struct MetricsCalculator<'a> {
    sprints: &'a [SprintData],
}

impl<'a> MetricsCalculator<'a> {
    pub fn new(sprints: &'a [SprintData]) -> Self {
        Self { sprints }
    }

    pub fn calculate_all(&self) -> Metrics {
        self.calculate_all_at(Utc::now())
    }

    /// All sections, with recency windows measured from `now`.
    pub fn calculate_all_at(&self, now: DateTime<Utc>) -> Metrics {
        if self.sprints.is_empty() {
            return Metrics::empty();
        }
        Metrics {
            counts: self.counts(),
            duration: self.duration(),
            tasks: self.tasks(),
            quality: self.quality(),
            trends: self.trends(now),
            summary: self.summary(),
        }
    }

    pub fn counts(&self) -> Counts {
        let total = self.sprints.len();
        let with_status =
            |status: &str| self.sprints.iter().filter(|s| s.status.eq_ignore_ascii_case(status)).count();

        let active = with_status("active");
        let completed = with_status("completed");
        let abandoned = with_status("abandoned");
        let paused = with_status("paused");

        Counts {
            total_sprints: total,
            active_sprints: active,
            completed_sprints: completed,
            abandoned_sprints: abandoned,
            paused_sprints: paused,
            completion_rate: ratio(completed, total),
            abandonment_rate: ratio(abandoned, total),
            active_ratio: ratio(active, total),
        }
    }

    pub fn duration(&self) -> DurationMetrics {
        let durations: Vec<f64> = self
            .sprints
            .iter()
            .filter_map(|s| s.duration_days)
            .filter(|&d| d > 0.0)
            .collect();

        if durations.is_empty() {
            return DurationMetrics::default();
        }

        let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        DurationMetrics {
            has_duration_data: true,
            average_duration: mean(&durations),
            median_duration: median(&durations),
            min_duration: min,
            max_duration: max,
            std_dev: std_dev(&durations),
            durations_under_3_days: durations.iter().filter(|&&d| d <= 3.0).count(),
            durations_3_to_7_days: durations.iter().filter(|&&d| d > 3.0 && d <= 7.0).count(),
            durations_over_7_days: durations.iter().filter(|&&d| d > 7.0).count(),
            fastest_sprint: self.sprint_with_duration(min),
            slowest_sprint: self.sprint_with_duration(max),
        }
    }

    fn sprint_with_duration(&self, days: f64) -> Option<String> {
        self.sprints
            .iter()
            .find(|s| s.duration_days == Some(days))
            .map(|s| s.sprint_id.clone())
    }

    /// Totals span every sprint; per-sprint averages and velocity count only
    /// completed sprints.
    pub fn tasks(&self) -> TaskMetrics {
        let total_tasks: usize = self.sprints.iter().map(|s| s.total_tasks).sum();
        let completed_tasks: usize = self.sprints.iter().map(|s| s.completed_tasks).sum();
        let pending_tasks: usize = self.sprints.iter().map(|s| s.pending_tasks).sum();

        let finished: Vec<&SprintData> = self.sprints.iter().filter(|s| s.is_completed()).collect();
        let (avg_tasks, avg_completed) = if finished.is_empty() {
            (0.0, 0.0)
        } else {
            let n = finished.len() as f64;
            (
                finished.iter().map(|s| s.total_tasks).sum::<usize>() as f64 / n,
                finished.iter().map(|s| s.completed_tasks).sum::<usize>() as f64 / n,
            )
        };

        TaskMetrics {
            total_tasks,
            completed_tasks,
            pending_tasks,
            task_completion_rate: ratio(completed_tasks, total_tasks),
            average_tasks_per_sprint: avg_tasks,
            average_completed_per_sprint: avg_completed,
            sprint_velocity: avg_completed,
        }
    }

    pub fn quality(&self) -> QualityMetrics {
        let total = self.sprints.len();
        let count = |f: fn(&SprintData) -> bool| self.sprints.iter().filter(|s| f(s)).count();

        let planning = count(|s| s.has_planning);
        let implementation = count(|s| s.has_implementation);
        let retrospective = count(|s| s.has_retrospective);

        let retros: Vec<&SprintData> = self.sprints.iter().filter(|s| s.has_retrospective).collect();
        let lengths: Vec<f64> = retros.iter().map(|s| s.retrospective_length as f64).collect();
        let learnings: Vec<f64> = retros.iter().map(|s| s.learnings_count as f64).collect();

        QualityMetrics {
            sprints_with_planning: planning,
            sprints_with_implementation: implementation,
            sprints_with_retrospective: retrospective,
            sprints_with_design: count(|s| s.has_design),
            sprints_with_proposal: count(|s| s.has_proposal),
            planning_coverage: ratio(planning, total),
            implementation_coverage: ratio(implementation, total),
            retrospective_coverage: ratio(retrospective, total),
            process_adoption_rate: ratio(planning + implementation + retrospective, total * 3),
            average_retrospective_length: mean(&lengths),
            average_learnings_count: mean(&learnings),
        }
    }

    pub fn trends(&self, now: DateTime<Utc>) -> Trends {
        if self.sprints.is_empty() {
            return Trends::default();
        }

        let mut sorted: Vec<&SprintData> = self.sprints.iter().collect();
        sorted.sort_by_key(|s| s.created_date);

        let within = |days: i64| {
            sorted
                .iter()
                .filter(|s| (now - s.created_date).num_days() <= days)
                .count()
        };

        let mut by_week = BTreeMap::new();
        let mut by_month = BTreeMap::new();
        for s in &sorted {
            *by_week
                .entry(s.created_date.format("%Y-W%U").to_string())
                .or_insert(0) += 1;
            *by_month
                .entry(s.created_date.format("%Y-%m").to_string())
                .or_insert(0) += 1;
        }

        Trends {
            has_trend_data: true,
            sprints_last_7_days: within(7),
            sprints_last_30_days: within(30),
            sprints_last_90_days: within(90),
            sprints_by_week: by_week,
            sprints_by_month: by_month,
            velocity_trend: velocity_trend(&sorted),
            completion_rate_trend: completion_trend(&sorted),
        }
    }

    pub fn summary(&self) -> Summary {
        let counts = self.counts();
        let tasks = self.tasks();
        let quality = self.quality();

        let score = health_score(&counts, &tasks, &quality);
        Summary {
            health_score: score,
            productivity_level: productivity_level(tasks.sprint_velocity).to_string(),
            process_maturity: process_maturity(quality.process_adoption_rate).to_string(),
            overall_status: overall_status(score).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trend and summary rules
// ---------------------------------------------------------------------------

const MIN_TREND_SPRINTS: usize = 4;

/// Older vs. recent half by mean completed tasks.
///
/// Sprints with no completed tasks are left out of each half's mean; a half
/// with none left averages to 0.
fn velocity_trend(sorted: &[&SprintData]) -> Trend {
    if sorted.len() < MIN_TREND_SPRINTS {
        return Trend::InsufficientData;
    }
    let (older, recent) = sorted.split_at(sorted.len() / 2);
    let velocity = |half: &[&SprintData]| {
        let done: Vec<f64> = half
            .iter()
            .filter(|s| s.completed_tasks > 0)
            .map(|s| s.completed_tasks as f64)
            .collect();
        mean(&done)
    };
    Trend::classify(velocity(older), velocity(recent))
}

fn completion_trend(sorted: &[&SprintData]) -> Trend {
    if sorted.len() < MIN_TREND_SPRINTS {
        return Trend::InsufficientData;
    }
    let (older, recent) = sorted.split_at(sorted.len() / 2);
    let rate = |half: &[&SprintData]| {
        ratio(half.iter().filter(|s| s.is_completed()).count(), half.len())
    };
    Trend::classify(rate(older), rate(recent))
}

/// Weighted blend of the four headline rates, truncated to an integer.
pub fn health_score(counts: &Counts, tasks: &TaskMetrics, quality: &QualityMetrics) -> u32 {
    let score = counts.completion_rate * 0.4
        + tasks.task_completion_rate * 0.3
        + quality.process_adoption_rate * 0.2
        + (100.0 - counts.abandonment_rate) * 0.1;
    score.max(0.0) as u32
}

pub fn productivity_level(velocity: f64) -> &'static str {
    if velocity >= 10.0 {
        "high"
    } else if velocity >= 5.0 {
        "medium"
    } else if velocity > 0.0 {
        "low"
    } else {
        "none"
    }
}

pub fn process_maturity(adoption: f64) -> &'static str {
    if adoption >= 80.0 {
        "mature"
    } else if adoption >= 50.0 {
        "developing"
    } else if adoption > 0.0 {
        "early"
    } else {
        "none"
    }
}

pub fn overall_status(health_score: u32) -> &'static str {
    match health_score {
        80.. => "excellent",
        60..=79 => "good",
        40..=59 => "fair",
        _ => "needs_improvement",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn sprint(id: &str, status: &str) -> SprintData {
        SprintData {
            sprint_id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            status: status.to_string(),
            created_date: now(),
            completed_date: None,
            duration_days: None,
            total_tasks: 0,
            completed_tasks: 0,
            pending_tasks: 0,
            task_completion_rate: 0.0,
            has_planning: false,
            has_implementation: false,
            has_retrospective: false,
            has_design: false,
            has_proposal: false,
            retrospective_length: 0,
            learnings_count: 0,
            folder_path: PathBuf::from(id),
            files_present: Vec::new(),
        }
    }

    fn with_tasks(mut s: SprintData, done: usize, total: usize) -> SprintData {
        s.total_tasks = total;
        s.completed_tasks = done;
        s.pending_tasks = total - done;
        s
    }

    fn aged(mut s: SprintData, days: i64) -> SprintData {
        s.created_date = now() - Duration::days(days);
        s
    }

    #[test]
    fn empty_input_short_circuits() {
        let metrics = MetricsCalculator::new(&[]).calculate_all_at(now());
        assert_eq!(metrics, Metrics::empty());
        assert!(!metrics.has_data());
        assert_eq!(metrics.summary.overall_status, "no_data");
        assert_eq!(metrics.summary.productivity_level, "none");
        assert!(!metrics.trends.has_trend_data);
    }

    #[test]
    fn counts_by_status_case_insensitive() {
        let sprints = vec![
            sprint("s1", "Completed"),
            sprint("s2", "completed"),
            sprint("s3", "ACTIVE"),
            sprint("s4", "abandoned"),
            sprint("s5", "paused"),
            sprint("s6", "unknown"),
            sprint("s7", "active"),
            sprint("s8", "active"),
        ];
        let counts = MetricsCalculator::new(&sprints).counts();
        assert_eq!(counts.total_sprints, 8);
        assert_eq!(counts.completed_sprints, 2);
        assert_eq!(counts.active_sprints, 3);
        assert_eq!(counts.abandoned_sprints, 1);
        assert_eq!(counts.paused_sprints, 1);
        assert_eq!(counts.completion_rate, 25.0);
        assert_eq!(counts.abandonment_rate, 12.5);
        assert_eq!(counts.active_ratio, 37.5);
    }

    #[test]
    fn duration_stats_and_buckets() {
        let mut sprints = Vec::new();
        for (id, days) in [("a", 2.0), ("b", 3.0), ("c", 5.0), ("d", 10.0), ("e", -1.0)] {
            let mut s = sprint(id, "completed");
            s.duration_days = Some(days);
            sprints.push(s);
        }
        sprints.push(sprint("f", "active"));

        let d = MetricsCalculator::new(&sprints).duration();
        assert!(d.has_duration_data);
        assert_eq!(d.average_duration, 5.0);
        assert_eq!(d.median_duration, 4.0);
        assert_eq!(d.min_duration, 2.0);
        assert_eq!(d.max_duration, 10.0);
        assert!((d.std_dev - 3.559_026).abs() < 1e-5);
        assert_eq!(d.durations_under_3_days, 2);
        assert_eq!(d.durations_3_to_7_days, 1);
        assert_eq!(d.durations_over_7_days, 1);
        assert_eq!(d.fastest_sprint.as_deref(), Some("a"));
        assert_eq!(d.slowest_sprint.as_deref(), Some("d"));
    }

    #[test]
    fn duration_without_data() {
        let d = MetricsCalculator::new(&[sprint("a", "active")]).duration();
        assert_eq!(d, DurationMetrics::default());
    }

    #[test]
    fn single_duration_has_zero_std_dev() {
        let mut s = sprint("a", "completed");
        s.duration_days = Some(4.0);
        let d = MetricsCalculator::new(&[s]).duration();
        assert_eq!(d.std_dev, 0.0);
        assert_eq!(d.median_duration, 4.0);
    }

    #[test]
    fn velocity_counts_only_completed_sprints() {
        let sprints = vec![
            with_tasks(sprint("a", "completed"), 8, 10),
            with_tasks(sprint("b", "completed"), 4, 4),
            with_tasks(sprint("c", "active"), 1, 20),
        ];
        let t = MetricsCalculator::new(&sprints).tasks();
        assert_eq!(t.total_tasks, 34);
        assert_eq!(t.completed_tasks, 13);
        assert_eq!(t.pending_tasks, 21);
        assert!((t.task_completion_rate - 38.235_294).abs() < 1e-5);
        assert_eq!(t.average_tasks_per_sprint, 7.0);
        assert_eq!(t.sprint_velocity, 6.0);
    }

    #[test]
    fn task_metrics_without_completed_sprints() {
        let t = MetricsCalculator::new(&[with_tasks(sprint("a", "active"), 0, 0)]).tasks();
        assert_eq!(t.task_completion_rate, 0.0);
        assert_eq!(t.sprint_velocity, 0.0);
    }

    #[test]
    fn quality_coverage_and_adoption() {
        let mut a = sprint("a", "completed");
        a.has_planning = true;
        a.has_implementation = true;
        a.has_retrospective = true;
        a.retrospective_length = 300;
        a.learnings_count = 6;
        let mut b = sprint("b", "active");
        b.has_planning = true;
        b.has_design = true;

        let q = MetricsCalculator::new(&[a, b]).quality();
        assert_eq!(q.planning_coverage, 100.0);
        assert_eq!(q.implementation_coverage, 50.0);
        assert_eq!(q.retrospective_coverage, 50.0);
        assert!((q.process_adoption_rate - 66.666_666).abs() < 1e-4);
        assert_eq!(q.average_retrospective_length, 300.0);
        assert_eq!(q.average_learnings_count, 6.0);
        assert_eq!(q.sprints_with_design, 1);
    }

    #[test]
    fn recency_windows_and_buckets() {
        let sprints = vec![
            aged(sprint("a", "active"), 2),
            aged(sprint("b", "active"), 20),
            aged(sprint("c", "active"), 60),
            aged(sprint("d", "active"), 200),
        ];
        let t = MetricsCalculator::new(&sprints).trends(now());
        assert!(t.has_trend_data);
        assert_eq!(t.sprints_last_7_days, 1);
        assert_eq!(t.sprints_last_30_days, 2);
        assert_eq!(t.sprints_last_90_days, 3);
        assert_eq!(t.sprints_by_month.get("2024-06"), Some(&2));
        assert_eq!(t.sprints_by_month.get("2024-05"), Some(&1));
        assert_eq!(t.sprints_by_month.values().sum::<usize>(), 4);
        assert_eq!(t.sprints_by_week.values().sum::<usize>(), 4);
    }

    #[test]
    fn velocity_trend_improving() {
        let mut sprints = Vec::new();
        for i in 0..8 {
            let done = if i < 4 { 2 } else { 5 };
            sprints.push(aged(with_tasks(sprint(&format!("s{i}"), "completed"), done, 5), 80 - i));
        }
        let t = MetricsCalculator::new(&sprints).trends(now());
        assert_eq!(t.velocity_trend, Trend::Improving);
        assert_eq!(t.completion_rate_trend, Trend::Stable);
    }

    #[test]
    fn velocity_trend_declining_and_insufficient() {
        let mut sprints = Vec::new();
        for i in 0..4 {
            let done = if i < 2 { 10 } else { 3 };
            sprints.push(aged(with_tasks(sprint(&format!("s{i}"), "active"), done, 10), 40 - i));
        }
        let t = MetricsCalculator::new(&sprints).trends(now());
        assert_eq!(t.velocity_trend, Trend::Declining);

        let t = MetricsCalculator::new(&sprints[..3]).trends(now());
        assert_eq!(t.velocity_trend, Trend::InsufficientData);
        assert_eq!(t.completion_rate_trend, Trend::InsufficientData);
    }

    #[test]
    fn completion_trend_improving() {
        let sprints = vec![
            aged(sprint("a", "completed"), 40),
            aged(sprint("b", "active"), 30),
            aged(sprint("c", "completed"), 20),
            aged(sprint("d", "completed"), 10),
        ];
        let t = MetricsCalculator::new(&sprints).trends(now());
        assert_eq!(t.completion_rate_trend, Trend::Improving);
    }

    #[test]
    fn health_score_perfect() {
        let counts = Counts {
            completion_rate: 100.0,
            abandonment_rate: 0.0,
            ..Counts::default()
        };
        let tasks = TaskMetrics {
            task_completion_rate: 100.0,
            ..TaskMetrics::default()
        };
        let quality = QualityMetrics {
            process_adoption_rate: 100.0,
            ..QualityMetrics::default()
        };
        assert_eq!(health_score(&counts, &tasks, &quality), 100);
    }

    #[test]
    fn health_score_truncates() {
        let counts = Counts {
            completion_rate: 50.0,
            abandonment_rate: 25.0,
            ..Counts::default()
        };
        let tasks = TaskMetrics {
            task_completion_rate: 33.3,
            ..TaskMetrics::default()
        };
        // 20 + 9.99 + 0 + 7.5 = 37.49
        assert_eq!(health_score(&counts, &tasks, &QualityMetrics::default()), 37);
    }

    #[test]
    fn thresholds() {
        assert_eq!(productivity_level(10.0), "high");
        assert_eq!(productivity_level(5.0), "medium");
        assert_eq!(productivity_level(0.5), "low");
        assert_eq!(productivity_level(0.0), "none");
        assert_eq!(process_maturity(80.0), "mature");
        assert_eq!(process_maturity(50.0), "developing");
        assert_eq!(process_maturity(1.0), "early");
        assert_eq!(process_maturity(0.0), "none");
        assert_eq!(overall_status(80), "excellent");
        assert_eq!(overall_status(60), "good");
        assert_eq!(overall_status(40), "fair");
        assert_eq!(overall_status(39), "needs_improvement");
    }

    #[test]
    fn full_tree_for_one_sprint() {
        let mut s = with_tasks(sprint("sprint-001", "completed"), 4, 4);
        s.has_planning = true;
        s.has_implementation = true;
        s.has_retrospective = true;
        let metrics = MetricsCalculator::new(&[s]).calculate_all_at(now());
        assert!(metrics.has_data());
        assert_eq!(metrics.summary.health_score, 100);
        assert_eq!(metrics.summary.overall_status, "excellent");
        assert_eq!(metrics.summary.productivity_level, "low");
        assert_eq!(metrics.summary.process_maturity, "mature");
    }

    #[test]
    fn metrics_json_keys() {
        let metrics = MetricsCalculator::new(&[sprint("a", "active")]).calculate_all_at(now());
        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["counts"]["total_sprints"], 1);
        assert_eq!(value["trends"]["velocity_trend"], "insufficient_data");
        assert!(value["summary"]["health_score"].is_u64());
        assert!(value["duration"].get("fastest_sprint").is_none());
    }
}
