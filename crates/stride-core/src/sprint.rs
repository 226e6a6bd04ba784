use crate::io::read_optional;
use crate::markdown::{self, CheckboxItem, ImplementationLogEntry, StrideInfo};
use crate::paths;
use crate::types::SprintStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Implementation log entries attached to a detailed sprint by default.
pub const RECENT_LOG_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// SprintProgress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SprintProgress {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_percentage: f64,
    pub strides: Vec<StrideInfo>,
    pub acceptance_criteria_total: usize,
    pub acceptance_criteria_completed: usize,
    pub acceptance_criteria_percentage: f64,
}

impl SprintProgress {
    /// Roll stride tasks and acceptance criteria up into one progress record.
    pub fn from_parts(strides: Vec<StrideInfo>, acceptance: &[CheckboxItem]) -> Self {
        let total_tasks: usize = strides.iter().map(StrideInfo::total_tasks).sum();
        let completed_tasks: usize = strides.iter().map(StrideInfo::completed_tasks).sum();
        let (ac_completed, ac_total, ac_percentage) = markdown::calculate_completion(acceptance);

        Self {
            total_tasks,
            completed_tasks,
            completion_percentage: markdown::percentage(completed_tasks, total_tasks),
            strides,
            acceptance_criteria_total: ac_total,
            acceptance_criteria_completed: ac_completed,
            acceptance_criteria_percentage: ac_percentage,
        }
    }

    /// The first stride, in plan order, with unfinished tasks.
    pub fn current_stride(&self) -> Option<&StrideInfo> {
        self.strides
            .iter()
            .find(|s| s.completed_tasks() < s.total_tasks())
    }

    pub fn completed_strides(&self) -> usize {
        self.strides.iter().filter(|s| s.is_complete()).count()
    }
}

// ---------------------------------------------------------------------------
// Sprint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Sprint {
    pub id: String,
    pub title: String,
    pub status: SprintStatus,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<SprintProgress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<CheckboxItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_logs: Vec<ImplementationLogEntry>,
}

impl Sprint {
    /// Resolve a sprint directory by id. `None` when it is not a directory.
    pub fn load(root: &Path, id: &str, include_progress: bool) -> Option<Self> {
        Self::load_with_log_limit(root, id, include_progress, RECENT_LOG_LIMIT)
    }

    pub fn load_with_log_limit(
        root: &Path,
        id: &str,
        include_progress: bool,
        log_limit: usize,
    ) -> Option<Self> {
        if paths::validate_sprint_id(id).is_err() {
            tracing::debug!(id, "rejecting sprint id");
            return None;
        }
        let dir = paths::sprint_dir(root, id);
        let meta = std::fs::metadata(&dir).ok().filter(|m| m.is_dir())?;

        let updated_at: DateTime<Utc> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());
        let created_at: DateTime<Utc> = meta.created().map(DateTime::from).unwrap_or(updated_at);

        let mut sprint = Self {
            id: id.to_string(),
            title: sprint_title(&dir),
            status: resolve_status(&dir),
            path: dir,
            created_at,
            updated_at,
            progress: None,
            acceptance_criteria: Vec::new(),
            recent_logs: Vec::new(),
        };

        if include_progress {
            sprint.progress = Some(resolve_progress(&sprint.path));
            sprint.acceptance_criteria = acceptance_criteria(&sprint.path);
            sprint.recent_logs = recent_logs(&sprint.path, log_limit);
        }

        Some(sprint)
    }

    /// Every sprint directory under `.stride/sprints`, newest first.
    ///
    /// Entries that vanish or fail to resolve mid-scan are skipped.
    pub fn list(root: &Path) -> Vec<Self> {
        let Ok(entries) = std::fs::read_dir(paths::sprints_dir(root)) else {
            return Vec::new();
        };

        let mut sprints: Vec<Self> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let id = entry.file_name().to_string_lossy().into_owned();
                Self::load(root, &id, false)
            })
            .collect();

        sprints.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        sprints
    }
}

// ---------------------------------------------------------------------------
// Resolution from sprint documents
// ---------------------------------------------------------------------------

/// Status from which documents exist: retrospective, then implementation.
pub fn resolve_status(dir: &Path) -> SprintStatus {
    if dir.join(paths::RETROSPECTIVE_MD).exists() {
        SprintStatus::Completed
    } else if dir.join(paths::IMPLEMENTATION_MD).exists() {
        SprintStatus::Active
    } else {
        SprintStatus::Proposed
    }
}

/// Stride rollup from `plan.md` plus acceptance criteria from `proposal.md`.
pub fn resolve_progress(dir: &Path) -> SprintProgress {
    SprintProgress::from_parts(plan_strides(dir), &acceptance_criteria(dir))
}

fn sprint_title(dir: &Path) -> String {
    read_optional(&dir.join(paths::PROPOSAL_MD))
        .map(|content| markdown::extract_title(&content))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

fn acceptance_criteria(dir: &Path) -> Vec<CheckboxItem> {
    read_optional(&dir.join(paths::PROPOSAL_MD))
        .map(|content| {
            let section = markdown::extract_section(&content, "Acceptance Criteria", 2);
            markdown::parse_checkboxes(&section)
        })
        .unwrap_or_default()
}

fn plan_strides(dir: &Path) -> Vec<StrideInfo> {
    read_optional(&dir.join(paths::PLAN_MD))
        .map(|content| markdown::parse_strides(&content))
        .unwrap_or_default()
}

fn recent_logs(dir: &Path, limit: usize) -> Vec<ImplementationLogEntry> {
    read_optional(&dir.join(paths::IMPLEMENTATION_MD))
        .map(|content| markdown::parse_implementation_logs(&content, Some(limit)))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
