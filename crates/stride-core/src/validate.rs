//! Structural checks of a sprint's documents against the stride templates.

use crate::paths;
use crate::sprint::Sprint;
use crate::types::SprintStatus;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Passes when there are no errors, and with `strict` no warnings either.
    pub fn passes(&self, strict: bool) -> bool {
        self.is_valid() && !(strict && !self.warnings.is_empty())
    }

    fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => self.errors.push(message),
            Severity::Warning => self.warnings.push(message),
            Severity::Info => self.info.push(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Template rules
// ---------------------------------------------------------------------------

struct TemplateRules {
    file: &'static str,
    required: &'static [&'static str],
    /// Severity of a missing required section.
    missing: Severity,
    optional: &'static [&'static str],
    /// Matches `[...]` placeholders left over from the template.
    placeholder_re: fn() -> &'static Regex,
}

const PROPOSAL: TemplateRules = TemplateRules {
    file: paths::PROPOSAL_MD,
    required: &["Why", "What", "Acceptance Criteria", "Success Definition", "Impact"],
    missing: Severity::Error,
    optional: &["Dependencies", "Risks & Assumptions", "Milestone Alignment"],
    placeholder_re: proposal_placeholder_re,
};

const PLAN: TemplateRules = TemplateRules {
    file: paths::PLAN_MD,
    required: &["Overview", "Strides", "Approach", "Dependencies", "Risks"],
    missing: Severity::Error,
    optional: &["Validation Plan", "Completion Conditions"],
    placeholder_re: plan_placeholder_re,
};

const DESIGN: TemplateRules = TemplateRules {
    file: paths::DESIGN_MD,
    required: &["Architecture", "Data Flow", "APIs / Interfaces", "Data Models"],
    missing: Severity::Warning,
    optional: &["Decisions & Trade-offs", "Security & Compliance Considerations"],
    placeholder_re: design_placeholder_re,
};

const RETROSPECTIVE: TemplateRules = TemplateRules {
    file: paths::RETROSPECTIVE_MD,
    required: &["What Worked", "What Didn't", "Lessons Learned", "Recommendations"],
    missing: Severity::Error,
    optional: &["Project Context Updates"],
    placeholder_re: retrospective_placeholder_re,
};

static H2_RE: OnceLock<Regex> = OnceLock::new();
static PLAN_STRIDE_RE: OnceLock<Regex> = OnceLock::new();
static LOG_ENTRY_RE: OnceLock<Regex> = OnceLock::new();
static PROPOSAL_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static PLAN_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static DESIGN_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static RETROSPECTIVE_PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn h2_re() -> &'static Regex {
    H2_RE.get_or_init(|| Regex::new(r"(?m)^##[ \t]+([^#\n]+)").unwrap())
}

fn plan_stride_re() -> &'static Regex {
    PLAN_STRIDE_RE.get_or_init(|| Regex::new(r"(?i)###\s+\*\*Stride\s+\d+:").unwrap())
}

fn log_entry_re() -> &'static Regex {
    LOG_ENTRY_RE.get_or_init(|| Regex::new(r"(?i)##\s+\[Timestamp:").unwrap())
}

/// H2 heading texts with `**` emphasis removed.
fn h2_sections(content: &str) -> BTreeSet<String> {
    h2_re()
        .captures_iter(content)
        .map(|caps| caps[1].trim().replace("**", ""))
        .collect()
}

fn proposal_placeholder_re() -> &'static Regex {
    PROPOSAL_PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\[(?:Explain|Describe|State|List|Brief)[^\]]*\]").unwrap())
}

fn plan_placeholder_re() -> &'static Regex {
    PLAN_PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\[(?:Brief|Describe|Explain|List)[^\]]*\]").unwrap())
}

fn design_placeholder_re() -> &'static Regex {
    DESIGN_PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\[(?:Describe|Explain|List)[^\]]*\]").unwrap())
}

fn retrospective_placeholder_re() -> &'static Regex {
    RETROSPECTIVE_PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\[(?:Identify|Extract|State|Document)[^\]]*\]").unwrap())
}

fn has_checkbox(content: &str) -> bool {
    content.contains("- [ ]") || content.contains("- [x]")
}

fn missing_from<'a>(wanted: &[&'a str], sections: &BTreeSet<String>) -> Vec<&'a str> {
    wanted
        .iter()
        .copied()
        .filter(|s| !sections.contains(*s))
        .collect()
}

impl TemplateRules {
    /// Section, placeholder, and optional-section checks shared by every
    /// templated document. Returns the H2 sections found.
    fn check(&self, content: &str, report: &mut ValidationReport) -> BTreeSet<String> {
        let sections = h2_sections(content);

        let missing = missing_from(self.required, &sections);
        if !missing.is_empty() {
            let label = if self.missing == Severity::Error {
                "required"
            } else {
                "recommended"
            };
            report.push(
                self.missing,
                format!("{}: Missing {label} sections: {}", self.file, missing.join(", ")),
            );
        }

        let placeholders = (self.placeholder_re)().find_iter(content).count();
        if placeholders > 0 {
            report.push(
                Severity::Warning,
                format!("{}: Contains {placeholders} template placeholders", self.file),
            );
        }

        let optional = missing_from(self.optional, &sections);
        if !optional.is_empty() {
            report.push(
                Severity::Info,
                format!("{}: Optional sections not included: {}", self.file, optional.join(", ")),
            );
        }
        sections
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn read_document(dir: &Path, file: &str, report: &mut ValidationReport) -> Option<String> {
    let path = dir.join(file);
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            report.push(Severity::Error, format!("{file}: Failed to read file: {e}"));
            None
        }
    }
}

pub fn validate_sprint(sprint: &Sprint) -> ValidationReport {
    let dir = sprint.path.as_path();
    let mut report = ValidationReport::default();

    check_files(dir, sprint.status, &mut report);

    if let Some(content) = read_document(dir, paths::PROPOSAL_MD, &mut report) {
        let sections = PROPOSAL.check(&content, &mut report);
        if sections.contains("Acceptance Criteria") && !has_checkbox(&content) {
            report.push(
                Severity::Warning,
                format!("{}: Acceptance Criteria section has no checkboxes", paths::PROPOSAL_MD),
            );
        }
    }

    if let Some(content) = read_document(dir, paths::PLAN_MD, &mut report) {
        PLAN.check(&content, &mut report);
        check_plan(&content, &mut report);
    }

    if let Some(content) = read_document(dir, paths::DESIGN_MD, &mut report) {
        DESIGN.check(&content, &mut report);
    }

    if let Some(content) = read_document(dir, paths::IMPLEMENTATION_MD, &mut report) {
        check_implementation(&content, &mut report);
    }

    if let Some(content) = read_document(dir, paths::RETROSPECTIVE_MD, &mut report) {
        RETROSPECTIVE.check(&content, &mut report);
    }

    if dir.join(paths::RETROSPECTIVE_MD).exists() && !dir.join(paths::IMPLEMENTATION_MD).exists() {
        report.push(
            Severity::Error,
            format!(
                "Found {} but missing {}",
                paths::RETROSPECTIVE_MD,
                paths::IMPLEMENTATION_MD
            ),
        );
    }

    report
}

fn check_files(dir: &Path, status: SprintStatus, report: &mut ValidationReport) {
    let has = |name: &str| dir.join(name).exists();

    for required in [paths::PROPOSAL_MD, paths::PLAN_MD] {
        if !has(required) {
            report.push(Severity::Error, format!("Missing required file: {required}"));
        }
    }

    match status {
        SprintStatus::Active if !has(paths::IMPLEMENTATION_MD) => report.push(
            Severity::Warning,
            format!("Sprint is ACTIVE but missing {}", paths::IMPLEMENTATION_MD),
        ),
        SprintStatus::Completed => {
            if !has(paths::IMPLEMENTATION_MD) {
                report.push(
                    Severity::Error,
                    format!("Sprint is COMPLETED but missing {}", paths::IMPLEMENTATION_MD),
                );
            }
            if !has(paths::RETROSPECTIVE_MD) {
                report.push(
                    Severity::Warning,
                    format!("Sprint is COMPLETED but missing {}", paths::RETROSPECTIVE_MD),
                );
            }
        }
        _ => {}
    }

    if !has(paths::DESIGN_MD) {
        report.push(
            Severity::Warning,
            format!(
                "Optional file missing: {} (recommended for complex sprints)",
                paths::DESIGN_MD
            ),
        );
    }
}

fn check_plan(content: &str, report: &mut ValidationReport) {
    let strides = plan_stride_re().find_iter(content).count();
    if strides == 0 {
        report.push(
            Severity::Error,
            format!(
                "{}: No strides defined (should have ### **Stride N: Name**)",
                paths::PLAN_MD
            ),
        );
    } else {
        report.push(
            Severity::Info,
            format!("{}: Found {strides} stride(s) defined", paths::PLAN_MD),
        );
    }

    if has_checkbox(content) {
        let tasks = content.matches("- [ ]").count() + content.matches("- [x]").count();
        report.push(
            Severity::Info,
            format!("{}: Found {tasks} task(s) defined", paths::PLAN_MD),
        );
    } else {
        report.push(
            Severity::Warning,
            format!("{}: No tasks defined (should have checkbox items)", paths::PLAN_MD),
        );
    }
}

fn check_implementation(content: &str, report: &mut ValidationReport) {
    let file = paths::IMPLEMENTATION_MD;
    let entries = log_entry_re().find_iter(content).count();
    if entries == 0 {
        report.push(
            Severity::Warning,
            format!("{file}: No timestamped log entries found"),
        );
    } else {
        report.push(
            Severity::Info,
            format!("{file}: Found {entries} log entry/entries"),
        );
    }

    for heading in ["### Tasks Addressed", "### Decisions", "### Changes Made"] {
        if !content.contains(heading) {
            report.push(
                Severity::Warning,
                format!("{file}: Missing '{heading}' subsections"),
            );
        }
    }

    if content.contains("[Stride Name]") || content.contains("[Task ID") {
        report.push(
            Severity::Warning,
            format!("{file}: Contains template placeholders that should be replaced"),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
