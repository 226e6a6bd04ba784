//! Analytics view of a sprint folder.
//!
//! This is a separate reading of the sprint documents from [`crate::sprint`]:
//! metadata comes from `project.md` (frontmatter or heuristics), task counts
//! are raw checkbox markers anywhere in `plan.md`, and status is free text.
//! The two views are kept apart because the metrics engine and the
//! interactive commands depend on each independently.

use crate::io::{modified_time, read_optional};
use crate::paths;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// SprintData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintData {
    pub sprint_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub duration_days: Option<f64>,

    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub task_completion_rate: f64,

    pub has_planning: bool,
    pub has_implementation: bool,
    pub has_retrospective: bool,
    pub has_design: bool,
    pub has_proposal: bool,

    /// Word count of `retrospective.md`.
    pub retrospective_length: usize,
    /// Bullet count of `retrospective.md`.
    pub learnings_count: usize,

    pub folder_path: PathBuf,
    pub files_present: Vec<String>,
}

impl SprintData {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    /// Share of the planning / implementation / retrospective documents present, 0-100.
    pub fn process_compliance_score(&self) -> f64 {
        let present = [
            self.has_planning,
            self.has_implementation,
            self.has_retrospective,
        ]
        .iter()
        .filter(|&&b| b)
        .count();
        present as f64 / 3.0 * 100.0
    }
}

// ---------------------------------------------------------------------------
// SprintSummary
// ---------------------------------------------------------------------------

/// Single-sprint analytics view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintSummary {
    pub sprint_id: String,
    pub title: String,
    pub status: String,
    pub created_date: DateTime<Utc>,
    pub duration_days: Option<f64>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub task_completion_rate: f64,
    pub has_planning: bool,
    pub has_implementation: bool,
    pub has_retrospective: bool,
    pub process_compliance_score: f64,
}

impl From<&SprintData> for SprintSummary {
    fn from(data: &SprintData) -> Self {
        Self {
            sprint_id: data.sprint_id.clone(),
            title: data.title.clone(),
            status: data.status.clone(),
            created_date: data.created_date,
            duration_days: data.duration_days,
            total_tasks: data.total_tasks,
            completed_tasks: data.completed_tasks,
            task_completion_rate: data.task_completion_rate,
            has_planning: data.has_planning,
            has_implementation: data.has_implementation,
            has_retrospective: data.has_retrospective,
            process_compliance_score: data.process_compliance_score(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn sprint_number(name: &str, prefix: &str) -> u64 {
    name.strip_prefix(prefix)
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Sprint folders whose name starts with `prefix`, ordered by sprint number.
pub fn scan_sprint_folders(root: &Path, prefix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(paths::sprints_dir(root)) else {
        return Vec::new();
    };

    let mut folders: Vec<(u64, String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(prefix)
                .then(|| (sprint_number(&name, prefix), name, entry.path()))
        })
        .collect();

    folders.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    folders.into_iter().map(|(_, _, path)| path).collect()
}

/// Parses each scanned folder, keeping the scan order.
pub fn parse_all_sprints(folders: &[PathBuf]) -> Vec<SprintData> {
    folders.iter().map(|folder| parse_sprint(folder)).collect()
}

// ---------------------------------------------------------------------------
// Folder parsing
// ---------------------------------------------------------------------------

const PRESENCE_ORDER: [&str; 6] = [
    paths::PROJECT_MD,
    paths::PLAN_MD,
    paths::IMPLEMENTATION_MD,
    paths::RETROSPECTIVE_MD,
    paths::DESIGN_MD,
    paths::PROPOSAL_MD,
];

pub fn parse_sprint(folder: &Path) -> SprintData {
    let sprint_id = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let project = parse_project_file(&folder.join(paths::PROJECT_MD));
    let plan = parse_plan_file(&folder.join(paths::PLAN_MD));
    let retro = parse_retrospective_file(&folder.join(paths::RETROSPECTIVE_MD));

    let has = |name: &str| folder.join(name).exists();
    let files_present = PRESENCE_ORDER
        .iter()
        .filter(|name| has(**name))
        .map(|name| name.to_string())
        .collect();

    let created_date = project.created_date.unwrap_or_else(Utc::now);
    let duration_days = project
        .completed_date
        .map(|done| (done - created_date).num_milliseconds() as f64 / 86_400_000.0);

    SprintData {
        title: project.title.unwrap_or_else(|| sprint_id.clone()),
        description: project.description.unwrap_or_default(),
        status: project.status.unwrap_or_else(|| "unknown".to_string()),
        created_date,
        completed_date: project.completed_date,
        duration_days,
        total_tasks: plan.total,
        completed_tasks: plan.completed,
        pending_tasks: plan.total - plan.completed,
        task_completion_rate: crate::markdown::percentage(plan.completed, plan.total),
        has_planning: has(paths::PLAN_MD),
        has_implementation: has(paths::IMPLEMENTATION_MD),
        has_retrospective: has(paths::RETROSPECTIVE_MD),
        has_design: has(paths::DESIGN_MD),
        has_proposal: has(paths::PROPOSAL_MD),
        retrospective_length: retro.word_count,
        learnings_count: retro.learnings_count,
        folder_path: folder.to_path_buf(),
        files_present,
        sprint_id,
    }
}

// ---------------------------------------------------------------------------
// project.md
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ProjectMeta {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    created_date: Option<DateTime<Utc>>,
    completed_date: Option<DateTime<Utc>>,
}

const CREATED_KEYS: [&str; 4] = ["created", "created_date", "start", "start_date"];
const COMPLETED_KEYS: [&str; 4] = ["completed", "completed_date", "end", "end_date"];
const DESCRIPTION_MAX_CHARS: usize = 200;

static FRONTMATTER_RE: OnceLock<Regex> = OnceLock::new();
static H1_RE: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_RE: OnceLock<Regex> = OnceLock::new();
static STATUS_RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static CONTENT_DATE_RES: OnceLock<Vec<Regex>> = OnceLock::new();

fn frontmatter_re() -> &'static Regex {
    FRONTMATTER_RE.get_or_init(|| Regex::new(r"(?s)\A---\n(.*?)\n---").unwrap())
}

fn h1_re() -> &'static Regex {
    H1_RE.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap())
}

fn description_re() -> &'static Regex {
    DESCRIPTION_RE.get_or_init(|| {
        Regex::new(r"(?ms)^#[ \t]+[^\n]+\n\n(.+?)(?:\n#{1,6}\s|\n---|\z)").unwrap()
    })
}

/// Status keywords probed in order; the first family with a hit wins.
fn status_res() -> &'static [(&'static str, Regex)] {
    STATUS_RES.get_or_init(|| {
        [
            (
                "completed",
                r"(?i)\[✓\].*completed|\[x\].*completed|status.*completed",
            ),
            (
                "active",
                r"(?i)\[⚡\].*active|\[>\].*active|status.*active|in progress",
            ),
            (
                "paused",
                r"(?i)\[⏸\].*paused|\[//\].*paused|status.*paused",
            ),
            (
                "abandoned",
                r"(?i)\[✗\].*abandoned|\[-\].*abandoned|status.*abandoned",
            ),
        ]
        .into_iter()
        .map(|(status, pattern)| (status, Regex::new(pattern).unwrap()))
        .collect()
    })
}

fn content_date_res() -> &'static [Regex] {
    CONTENT_DATE_RES.get_or_init(|| {
        [
            r"(?i)created[:\s]+(\d{4}-\d{2}-\d{2})",
            r"(?i)start[:\s]+(\d{4}-\d{2}-\d{2})",
            r"(?i)date[:\s]+(\d{4}-\d{2}-\d{2})",
        ]
        .into_iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Parse an ISO-8601 date or datetime. Naive values are taken as UTC.
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn yaml_string(map: &serde_yaml::Mapping, key: &str) -> Option<String> {
    match map.get(key)? {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_date(map: &serde_yaml::Mapping, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| yaml_string(map, key))
        .find_map(|raw| parse_iso_date(&raw))
}

fn apply_frontmatter(content: &str, meta: &mut ProjectMeta) {
    let Some(caps) = frontmatter_re().captures(content) else {
        return;
    };
    let map: serde_yaml::Mapping = match serde_yaml::from_str(&caps[1]) {
        Ok(map) => map,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable project frontmatter");
            return;
        }
    };
    meta.title = yaml_string(&map, "title");
    meta.description = yaml_string(&map, "description");
    meta.status = yaml_string(&map, "status");
    meta.created_date = first_date(&map, &CREATED_KEYS);
    meta.completed_date = first_date(&map, &COMPLETED_KEYS);
}

fn parse_project_file(path: &Path) -> ProjectMeta {
    let Some(raw) = read_optional(path) else {
        return ProjectMeta::default();
    };
    let content = raw.replace("\r\n", "\n");
    let mut meta = ProjectMeta::default();
    apply_frontmatter(&content, &mut meta);

    if meta.title.is_none() {
        meta.title = h1_re()
            .captures(&content)
            .map(|caps| caps[1].trim().to_string());
    }

    if meta.description.is_none() {
        meta.description = description_re()
            .captures(&content)
            .map(|caps| caps[1].trim().chars().take(DESCRIPTION_MAX_CHARS).collect());
    }

    if meta.status.is_none() {
        meta.status = status_res()
            .iter()
            .find(|(_, re)| re.is_match(&content))
            .map(|(status, _)| status.to_string());
    }

    if meta.created_date.is_none() {
        meta.created_date = content_date_res()
            .iter()
            .filter_map(|re| re.captures(&content))
            .find_map(|caps| parse_iso_date(&caps[1]));
    }

    if meta.created_date.is_none() {
        meta.created_date = modified_time(path).map(DateTime::from);
    }

    meta
}

// ---------------------------------------------------------------------------
// plan.md / retrospective.md
// ---------------------------------------------------------------------------

static TASK_MARKER_RE: OnceLock<Regex> = OnceLock::new();
static BULLET_RE: OnceLock<Regex> = OnceLock::new();

fn task_marker_re() -> &'static Regex {
    TASK_MARKER_RE.get_or_init(|| Regex::new(r"^\s*[-*]\s*\[(.)\]").unwrap())
}

fn bullet_re() -> &'static Regex {
    BULLET_RE.get_or_init(|| Regex::new(r"^\s*[-*]\s+\S").unwrap())
}

#[derive(Debug, Default)]
struct PlanCounts {
    total: usize,
    completed: usize,
}

/// Count every checkbox marker in the plan, regardless of stride grouping.
fn parse_plan_file(path: &Path) -> PlanCounts {
    let Some(content) = read_optional(path) else {
        return PlanCounts::default();
    };
    content
        .lines()
        .filter_map(|line| task_marker_re().captures(line))
        .fold(PlanCounts::default(), |mut acc, caps| {
            acc.total += 1;
            if caps[1].eq_ignore_ascii_case("x") {
                acc.completed += 1;
            }
            acc
        })
}

#[derive(Debug, Default)]
struct RetroStats {
    word_count: usize,
    learnings_count: usize,
}

fn parse_retrospective_file(path: &Path) -> RetroStats {
    let Some(content) = read_optional(path) else {
        return RetroStats::default();
    };
    RetroStats {
        word_count: content.split_whitespace().count(),
        learnings_count: content.lines().filter(|l| bullet_re().is_match(l)).count(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn folder(root: &Path, id: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = paths::sprint_dir(root, id);
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn scan_filters_prefix_and_sorts_numerically() {
        let dir = TempDir::new().unwrap();
        for id in ["sprint-10", "sprint-2", "SPRINT-AB12", "sprint-001", "other"] {
            folder(dir.path(), id, &[]);
        }
        std::fs::write(paths::sprints_dir(dir.path()).join("sprint-5"), "file").unwrap();

        let names: Vec<String> = scan_sprint_folders(dir.path(), "sprint-")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["sprint-001", "sprint-2", "sprint-10"]);
    }

    #[test]
    fn parse_all_keeps_scan_order() {
        let dir = TempDir::new().unwrap();
        folder(dir.path(), "sprint-10", &[("project.md", "# Ten\n")]);
        folder(dir.path(), "sprint-2", &[("project.md", "# Two\n")]);

        let folders = scan_sprint_folders(dir.path(), "sprint-");
        let sprints = parse_all_sprints(&folders);
        let ids: Vec<&str> = sprints.iter().map(|s| s.sprint_id.as_str()).collect();
        assert_eq!(ids, vec!["sprint-2", "sprint-10"]);
        assert_eq!(sprints[0].title, "Two");
        assert_eq!(sprints[1].title, "Ten");
    }

    #[test]
    fn scan_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(scan_sprint_folders(dir.path(), "sprint-").is_empty());
    }

    #[test]
    fn frontmatter_metadata() {
        let dir = TempDir::new().unwrap();
        let f = folder(
            dir.path(),
            "sprint-001",
            &[(
                "project.md",
                "---\ntitle: Search revamp\nstatus: Completed\ncreated: 2024-03-01\ncompleted: 2024-03-05T12:00:00\n---\n# Ignored heading\n",
            )],
        );
        let data = parse_sprint(&f);
        assert_eq!(data.title, "Search revamp");
        assert_eq!(data.status, "Completed");
        assert!(data.is_completed());
        assert_eq!(
            data.created_date,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(data.duration_days, Some(4.5));
    }

    #[test]
    fn heuristic_metadata() {
        let dir = TempDir::new().unwrap();
        let f = folder(
            dir.path(),
            "sprint-002",
            &[(
                "project.md",
                "# Billing cleanup\n\nRemove the legacy invoice path.\nKeep refunds.\n\n## Status\nCurrently in progress.\nCreated: 2024-02-10\n",
            )],
        );
        let data = parse_sprint(&f);
        assert_eq!(data.title, "Billing cleanup");
        assert_eq!(
            data.description,
            "Remove the legacy invoice path.\nKeep refunds."
        );
        assert_eq!(data.status, "active");
        assert_eq!(
            data.created_date,
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
        );
        assert!(data.duration_days.is_none());
    }

    #[test]
    fn status_family_order() {
        let dir = TempDir::new().unwrap();
        let f = folder(
            dir.path(),
            "sprint-003",
            &[("project.md", "# X\n\nstatus: abandoned\n[x] completed review\n")],
        );
        assert_eq!(parse_sprint(&f).status, "completed");
    }

    #[test]
    fn missing_project_defaults() {
        let dir = TempDir::new().unwrap();
        let f = folder(dir.path(), "sprint-004", &[]);
        let data = parse_sprint(&f);
        assert_eq!(data.title, "sprint-004");
        assert_eq!(data.status, "unknown");
        assert_eq!(data.description, "");
        assert!(data.files_present.is_empty());
        assert_eq!(data.process_compliance_score(), 0.0);
    }

    #[test]
    fn plan_counts_all_markers() {
        let dir = TempDir::new().unwrap();
        let f = folder(
            dir.path(),
            "sprint-005",
            &[(
                "plan.md",
                "- [x] a\n* [X] b\n  - [ ] c\n-[ ] d\n### **Stride 1: S**\n- [>] e\n",
            )],
        );
        let data = parse_sprint(&f);
        assert_eq!(data.total_tasks, 5);
        assert_eq!(data.completed_tasks, 2);
        assert_eq!(data.pending_tasks, 3);
        assert_eq!(data.task_completion_rate, 40.0);
        assert!(data.has_planning);
    }

    #[test]
    fn retrospective_stats_and_presence() {
        let dir = TempDir::new().unwrap();
        let f = folder(
            dir.path(),
            "sprint-006",
            &[
                ("retrospective.md", "## What Worked\n- pairing helped\n* small PRs\n\nplain text\n"),
                ("implementation.md", ""),
                ("plan.md", ""),
                ("design.md", ""),
            ],
        );
        let data = parse_sprint(&f);
        assert_eq!(data.learnings_count, 2);
        assert_eq!(data.retrospective_length, 11);
        assert_eq!(
            data.files_present,
            vec!["plan.md", "implementation.md", "retrospective.md", "design.md"]
        );
        assert_eq!(data.process_compliance_score(), 100.0);
        assert!(data.has_design);
        assert!(!data.has_proposal);
    }

    #[test]
    fn summary_projection() {
        let dir = TempDir::new().unwrap();
        let f = folder(dir.path(), "sprint-007", &[("plan.md", "- [x] a\n- [ ] b\n")]);
        let data = parse_sprint(&f);
        let summary = SprintSummary::from(&data);
        assert_eq!(summary.sprint_id, "sprint-007");
        assert_eq!(summary.total_tasks, 2);
        assert!((summary.process_compliance_score - 33.333).abs() < 0.01);
    }

    #[test]
    fn iso_dates() {
        assert!(parse_iso_date("2024-01-05").is_some());
        assert!(parse_iso_date("2024-01-05T10:30:00").is_some());
        assert!(parse_iso_date("2024-01-05 10:30").is_some());
        assert!(parse_iso_date("2024-01-05T10:30:00+02:00").is_some());
        assert!(parse_iso_date("yesterday").is_none());
    }
}
