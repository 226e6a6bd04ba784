//! Structural extraction from sprint markdown documents.
//!
//! Every function here is total over arbitrary text: missing or malformed
//! structure yields empty results, never an error. The exact heading wording
//! (`### **Stride N: Name**`, `## [Timestamp: T] Stride: S`, ...) is the
//! contract with the sprint document templates.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();
static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static STRIDE_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
static TITLE_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn checkbox_re() -> &'static Regex {
    CHECKBOX_RE.get_or_init(|| Regex::new(r"^\s*-\s+\[([ xX])\]\s+(.+)$").unwrap())
}

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap())
}

fn stride_heading_re() -> &'static Regex {
    STRIDE_HEADING_RE
        .get_or_init(|| Regex::new(r"^###\s+\*\*Stride\s+(\d+):\s+(.+?)\*\*").unwrap())
}

fn timestamp_re() -> &'static Regex {
    TIMESTAMP_RE.get_or_init(|| {
        Regex::new(r"^##\s+\[Timestamp:\s+([^\]]+)\]\s+Stride:\s+(.+)").unwrap()
    })
}

fn title_prefix_re() -> &'static Regex {
    TITLE_PREFIX_RE.get_or_init(|| {
        Regex::new(r"^(Proposal|Plan|Implementation|Design|Retrospective):\s*").unwrap()
    })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxItem {
    pub text: String,
    pub checked: bool,
    /// 1-based line within the scanned text.
    pub line_number: usize,
}

/// One `### **Stride N: Name**` block from `plan.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideInfo {
    pub number: u32,
    pub name: String,
    pub purpose: String,
    pub tasks: Vec<CheckboxItem>,
    pub completion_definition: String,
}

impl StrideInfo {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.checked).count()
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn completion_percentage(&self) -> f64 {
        percentage(self.completed_tasks(), self.total_tasks())
    }

    pub fn is_complete(&self) -> bool {
        self.total_tasks() > 0 && self.completed_tasks() == self.total_tasks()
    }
}

/// One `## [Timestamp: T] Stride: S` block from `implementation.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationLogEntry {
    pub timestamp: String,
    pub stride_name: String,
    pub tasks_addressed: Vec<String>,
    pub decisions: Vec<String>,
    pub notes: Vec<String>,
    pub changes: Vec<String>,
}

/// Checkboxes collected under one H3/H4 heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckboxGroup {
    pub category: String,
    pub items: Vec<CheckboxItem>,
}

/// `completed / total * 100`, or 0 when there is nothing to complete.
pub fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Checkboxes
// ---------------------------------------------------------------------------

fn parse_checkbox_line(line: &str, line_number: usize) -> Option<CheckboxItem> {
    let caps = checkbox_re().captures(line)?;
    Some(CheckboxItem {
        text: caps[2].trim().to_string(),
        checked: caps[1].eq_ignore_ascii_case("x"),
        line_number,
    })
}

pub fn parse_checkboxes(text: &str) -> Vec<CheckboxItem> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_checkbox_line(line, i + 1))
        .collect()
}

/// `(completed, total, percentage)` for a checkbox list.
pub fn calculate_completion(items: &[CheckboxItem]) -> (usize, usize, f64) {
    let total = items.len();
    let completed = items.iter().filter(|i| i.checked).count();
    (completed, total, percentage(completed, total))
}

/// Group checkboxes under their closest preceding H3/H4 heading.
///
/// Checkboxes before any such heading land in `"General"`. Groups keep
/// first-seen order, and a heading with no checkboxes still yields an empty
/// group.
pub fn group_checkboxes_by_category(text: &str) -> Vec<CheckboxGroup> {
    let mut groups: Vec<CheckboxGroup> = Vec::new();
    let mut current = "General".to_string();

    fn group_mut<'a>(groups: &'a mut Vec<CheckboxGroup>, category: &str) -> &'a mut CheckboxGroup {
        let idx = match groups.iter().position(|g| g.category == category) {
            Some(idx) => idx,
            None => {
                groups.push(CheckboxGroup {
                    category: category.to_string(),
                    items: Vec::new(),
                });
                groups.len() - 1
            }
        };
        &mut groups[idx]
    }

    for (i, line) in text.lines().enumerate() {
        if let Some(caps) = heading_re().captures(line) {
            if matches!(&caps[1], "###" | "####") {
                current = caps[2].trim().to_string();
                group_mut(&mut groups, &current);
            }
        }
        if let Some(item) = parse_checkbox_line(line, i + 1) {
            group_mut(&mut groups, &current).items.push(item);
        }
    }

    groups
}

// ---------------------------------------------------------------------------
// Sections and titles
// ---------------------------------------------------------------------------

/// Body of the first section whose heading line starts with
/// `"#" * level + " " + heading`.
///
/// The body ends at the next line opening a heading of the same level; deeper
/// headings stay inside. Returns an empty string when the heading is absent.
pub fn extract_section(text: &str, heading: &str, level: usize) -> String {
    let prefix = "#".repeat(level);
    let target = format!("{prefix} {heading}");
    let terminator = format!("{prefix} ");

    let mut lines = text.lines();
    if !lines.by_ref().any(|l| l.trim().starts_with(&target)) {
        return String::new();
    }

    let body: Vec<&str> = lines.take_while(|l| !l.starts_with(&terminator)).collect();
    body.join("\n").trim().to_string()
}

/// First H1 text with a leading document-type prefix (`Proposal:`, `Plan:`, ...) removed.
pub fn extract_title(text: &str) -> String {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title_prefix_re().replace(title.trim(), "").into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stride blocks
// ---------------------------------------------------------------------------

/// Subsection of a stride block currently receiving content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrideSection {
    None,
    Purpose,
    Tasks,
    Completion,
}

/// Classification of a single `plan.md` line.
#[derive(Debug)]
enum PlanLine<'a> {
    StrideHeading { number: u32, name: &'a str },
    PurposeMarker,
    TasksMarker,
    CompletionMarker,
    Break,
    Content(&'a str),
}

impl<'a> PlanLine<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(caps) = stride_heading_re().captures(line) {
            if let Ok(number) = caps[1].parse() {
                let name = caps.get(2).map_or("", |m| m.as_str()).trim();
                return PlanLine::StrideHeading { number, name };
            }
        }
        if line.starts_with("**Purpose:**") {
            PlanLine::PurposeMarker
        } else if line.starts_with("**Tasks:**") {
            PlanLine::TasksMarker
        } else if line.starts_with("**Completion Definition:**") {
            PlanLine::CompletionMarker
        } else if line.starts_with("###") || line.starts_with("---") {
            PlanLine::Break
        } else {
            PlanLine::Content(line)
        }
    }
}

/// Free-text lines feed purpose/completion unless blank or a `[placeholder]`.
fn is_prose(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with('[')
}

fn push_prose(field: &mut String, line: &str) {
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(line.trim());
}

/// Parse the stride blocks of a plan, in document order.
pub fn parse_strides(text: &str) -> Vec<StrideInfo> {
    let mut strides = Vec::new();
    let mut current: Option<StrideInfo> = None;
    let mut section = StrideSection::None;

    for (i, line) in text.lines().enumerate() {
        let kind = PlanLine::classify(line);

        if let PlanLine::StrideHeading { number, name } = kind {
            strides.extend(current.take());
            current = Some(StrideInfo::new(number, name));
            section = StrideSection::None;
            continue;
        }

        let Some(stride) = current.as_mut() else {
            continue;
        };

        section = match (section, kind) {
            (_, PlanLine::PurposeMarker) => StrideSection::Purpose,
            (_, PlanLine::TasksMarker) => StrideSection::Tasks,
            (_, PlanLine::CompletionMarker) => StrideSection::Completion,
            (_, PlanLine::Break) => StrideSection::None,
            (StrideSection::Purpose, PlanLine::Content(l)) => {
                if is_prose(l) {
                    push_prose(&mut stride.purpose, l);
                }
                StrideSection::Purpose
            }
            (StrideSection::Completion, PlanLine::Content(l)) => {
                if is_prose(l) {
                    push_prose(&mut stride.completion_definition, l);
                }
                StrideSection::Completion
            }
            (StrideSection::Tasks, PlanLine::Content(l)) => {
                stride.tasks.extend(parse_checkbox_line(l, i + 1));
                StrideSection::Tasks
            }
            (s, _) => s,
        };
    }

    strides.extend(current);
    strides
}

// ---------------------------------------------------------------------------
// Implementation log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogSection {
    None,
    TasksAddressed,
    Decisions,
    Notes,
    Changes,
}

impl LogSection {
    /// Subsection switch for a line, or `None` when the line is not a marker.
    fn from_marker(line: &str) -> Option<Self> {
        if line.starts_with("### Tasks Addressed") {
            Some(LogSection::TasksAddressed)
        } else if line.starts_with("### Decisions") {
            Some(LogSection::Decisions)
        } else if line.starts_with("### Notes") {
            Some(LogSection::Notes)
        } else if line.starts_with("### Changes Made") {
            Some(LogSection::Changes)
        } else if line.starts_with("---") {
            Some(LogSection::None)
        } else {
            None
        }
    }

    fn target<'a>(self, entry: &'a mut ImplementationLogEntry) -> Option<&'a mut Vec<String>> {
        match self {
            LogSection::None => None,
            LogSection::TasksAddressed => Some(&mut entry.tasks_addressed),
            LogSection::Decisions => Some(&mut entry.decisions),
            LogSection::Notes => Some(&mut entry.notes),
            LogSection::Changes => Some(&mut entry.changes),
        }
    }
}

/// A `- item` bullet with the dash stripped, skipping `[placeholder]` items.
fn log_bullet(line: &str) -> Option<&str> {
    let item = line.strip_prefix('-')?.trim();
    if item.is_empty() || item.starts_with('[') {
        None
    } else {
        Some(item)
    }
}

/// Parse implementation log entries, most recent (last in file) first.
pub fn parse_implementation_logs(text: &str, limit: Option<usize>) -> Vec<ImplementationLogEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ImplementationLogEntry> = None;
    let mut section = LogSection::None;

    for line in text.lines() {
        if let Some(caps) = timestamp_re().captures(line) {
            entries.extend(current.take());
            current = Some(ImplementationLogEntry {
                timestamp: caps[1].trim().to_string(),
                stride_name: caps[2].trim().to_string(),
                ..ImplementationLogEntry::default()
            });
            section = LogSection::None;
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(next) = LogSection::from_marker(line) {
            section = next;
            continue;
        }

        if let (Some(target), Some(item)) = (section.target(entry), log_bullet(line)) {
            target.push(item.to_string());
        }
    }

    entries.extend(current);
    entries.reverse();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
# Plan: Auth Rework

## Strides

### **Stride 1: Foundation**

**Purpose:**
Lay down the schema
and migrations.
[Describe the purpose]

**Tasks:**
- [x] Create users table
- [X] Add index
- [ ] Seed fixtures

**Completion Definition:**
All migrations apply cleanly.

---

### **Stride 2: API**

**Tasks:**
- [ ] Login endpoint
- [x] Logout endpoint
";

    #[test]
    fn checkboxes_basic() {
        let items = parse_checkboxes("intro\n- [x] foo\n- [ ] bar\n  - [X] nested\n-[ ] nope");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "foo");
        assert!(items[0].checked);
        assert_eq!(items[0].line_number, 2);
        assert!(!items[1].checked);
        assert_eq!(items[1].line_number, 3);
        assert!(items[2].checked);
        assert_eq!(items[2].line_number, 4);
    }

    #[test]
    fn checkboxes_ignore_other_marks() {
        assert!(parse_checkboxes("- [>] moving\n- [-] dropped\n* [x] star").is_empty());
    }

    #[test]
    fn completion_counts() {
        assert_eq!(calculate_completion(&[]), (0, 0, 0.0));
        let items = parse_checkboxes("- [x] a\n- [ ] b\n- [x] c");
        let (done, total, pct) = calculate_completion(&items);
        assert_eq!((done, total), (2, 3));
        assert!((pct - 66.666_666).abs() < 0.001);
    }

    #[test]
    fn section_extraction() {
        let doc = "## A\nfoo\n## B\nbar";
        assert_eq!(extract_section(doc, "A", 2), "foo");
        assert_eq!(extract_section(doc, "B", 2), "bar");
        assert_eq!(extract_section(doc, "C", 2), "");
    }

    #[test]
    fn section_keeps_deeper_headings() {
        let doc = "# T\n## Acceptance Criteria\n### Core\n- [ ] one\n## Next\n- [ ] two";
        let section = extract_section(doc, "Acceptance Criteria", 2);
        assert_eq!(section, "### Core\n- [ ] one");
        assert_eq!(parse_checkboxes(&section).len(), 1);
    }

    #[test]
    fn title_strips_known_prefix() {
        assert_eq!(extract_title("intro\n# Proposal: Faster builds\n# Other"), "Faster builds");
        assert_eq!(extract_title("# Release notes"), "Release notes");
        assert_eq!(extract_title("## Not a title"), "");
        assert_eq!(extract_title("# proposal: lowercase"), "proposal: lowercase");
    }

    #[test]
    fn strides_parse_fields() {
        let strides = parse_strides(PLAN);
        assert_eq!(strides.len(), 2);

        let first = &strides[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.name, "Foundation");
        assert_eq!(first.purpose, "Lay down the schema and migrations.");
        assert_eq!(first.completion_definition, "All migrations apply cleanly.");
        assert_eq!(first.total_tasks(), 3);
        assert_eq!(first.completed_tasks(), 2);
        assert_eq!(first.tasks[0].line_number, 13);

        let second = &strides[1];
        assert_eq!(second.name, "API");
        assert_eq!(second.total_tasks(), 2);
        assert_eq!(second.completion_percentage(), 50.0);
    }

    #[test]
    fn strides_follow_document_order() {
        let plan = "### **Stride 3: Late**\n**Tasks:**\n- [ ] x\n### **Stride 1: Early**\n";
        let numbers: Vec<u32> = parse_strides(plan).iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![3, 1]);
    }

    #[test]
    fn strides_heading_resets_subsection() {
        let plan = "\
### **Stride 1: One**
**Tasks:**
- [ ] inside
### Notes
- [ ] outside
";
        let strides = parse_strides(plan);
        assert_eq!(strides[0].total_tasks(), 1);
    }

    #[test]
    fn strides_non_matching_stride_heading_does_not_hang() {
        let plan = "### **Stride 1: One**\n**Tasks:**\n- [ ] a\n### Stride retrospective\n- [ ] b\n";
        let strides = parse_strides(plan);
        assert_eq!(strides.len(), 1);
        assert_eq!(strides[0].total_tasks(), 1);
    }

    #[test]
    fn strides_empty_input() {
        assert!(parse_strides("").is_empty());
        assert!(parse_strides("# Plan\n- [ ] loose task").is_empty());
    }

    const IMPL: &str = "\
# Implementation: Auth Rework

## [Timestamp: 2024-01-01 10:00] Stride: Foundation

### Tasks Addressed
- Create users table
- [Task ID - description]

### Decisions
- Use UUID keys

---

## [Timestamp: 2024-01-02 09:00] Stride: Foundation

### Changes Made
- migrations/001.sql
### Notes
- Index is partial

## [Timestamp: 2024-01-03 16:30] Stride: API
### Tasks Addressed
- Logout endpoint
";

    #[test]
    fn logs_most_recent_first() {
        let logs = parse_implementation_logs(IMPL, None);
        let stamps: Vec<&str> = logs.iter().map(|l| l.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec!["2024-01-03 16:30", "2024-01-02 09:00", "2024-01-01 10:00"]
        );
        assert_eq!(logs[0].stride_name, "API");
    }

    #[test]
    fn logs_subsections_and_placeholders() {
        let logs = parse_implementation_logs(IMPL, None);
        let oldest = &logs[2];
        assert_eq!(oldest.tasks_addressed, vec!["Create users table"]);
        assert_eq!(oldest.decisions, vec!["Use UUID keys"]);

        let middle = &logs[1];
        assert_eq!(middle.changes, vec!["migrations/001.sql"]);
        assert_eq!(middle.notes, vec!["Index is partial"]);
    }

    #[test]
    fn logs_limit() {
        let logs = parse_implementation_logs(IMPL, Some(2));
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].timestamp, "2024-01-03 16:30");
    }

    #[test]
    fn logs_rule_clears_subsection() {
        let text = "## [Timestamp: T1] Stride: S\n### Notes\n- kept\n---\n- dropped\n";
        let logs = parse_implementation_logs(text, None);
        assert_eq!(logs[0].notes, vec!["kept"]);
    }

    #[test]
    fn grouped_checkboxes() {
        let text = "\
- [ ] loose
### Backend
- [x] api
#### Storage
- [ ] db
### Empty
### Backend
- [ ] more api
";
        let groups = group_checkboxes_by_category(text);
        let names: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["General", "Backend", "Storage", "Empty"]);
        assert_eq!(groups[1].items.len(), 2);
        assert!(groups[3].items.is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_strides(PLAN), parse_strides(PLAN));
        assert_eq!(
            parse_implementation_logs(IMPL, None),
            parse_implementation_logs(IMPL, None)
        );
    }
}
