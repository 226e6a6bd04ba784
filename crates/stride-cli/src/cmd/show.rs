use crate::cmd::status::load_detailed;
use crate::output::{
    checkbox, print_fields, print_json, print_table, progress_bar, relative_time, section,
    truncate, WIDE_BAR_WIDTH,
};
use anyhow::Context;
use std::path::Path;
use stride_core::{
    config::StrideConfig,
    io::read_optional,
    markdown::{self, CheckboxGroup},
    paths,
    sprint::Sprint,
};

/// Log entries shown without `--full`.
const LOGS_SHOWN: usize = 3;

const DOCUMENTS: [(&str, &str); 5] = [
    ("proposal", paths::PROPOSAL_MD),
    ("plan", paths::PLAN_MD),
    ("design", paths::DESIGN_MD),
    ("implementation", paths::IMPLEMENTATION_MD),
    ("retrospective", paths::RETROSPECTIVE_MD),
];

pub struct ShowOptions<'a> {
    pub full: bool,
    pub file: Option<&'a str>,
    pub tasks: bool,
    pub timeline: bool,
    pub acceptance: bool,
}

pub fn run(root: &Path, id: &str, opts: ShowOptions<'_>, json: bool) -> anyhow::Result<()> {
    let config = StrideConfig::load(root).context("failed to load config")?;
    let sprint = load_detailed(root, &config, id)?;

    if let Some(kind) = opts.file {
        return show_document(&sprint, kind, json);
    }

    let groups = acceptance_groups(&sprint);

    if json {
        print_json(&serde_json::json!({
            "sprint": sprint,
            "acceptance_criteria_groups": groups,
            "files": present_documents(&sprint),
        }))?;
        return Ok(());
    }

    print_header(&sprint);

    // Focus views: --acceptance, then --tasks, then --timeline.
    if opts.acceptance {
        if sprint.acceptance_criteria.is_empty() {
            println!("No acceptance criteria defined.");
        }
        print_acceptance(&sprint, &groups);
        return Ok(());
    }
    if opts.tasks {
        print_tasks(&sprint);
        return Ok(());
    }
    if opts.timeline {
        print_timeline(&sprint, opts.full);
        return Ok(());
    }

    print_acceptance(&sprint, &groups);
    print_strides(&sprint);
    print_logs(&sprint, opts.full);

    section("Files");
    for (_, file) in DOCUMENTS {
        let mark = if sprint.path.join(file).exists() { "+" } else { "-" };
        println!("  {mark} {file}");
    }
    Ok(())
}

fn show_document(sprint: &Sprint, kind: &str, json: bool) -> anyhow::Result<()> {
    let Some((_, file)) = DOCUMENTS.iter().find(|(k, _)| *k == kind) else {
        let kinds: Vec<&str> = DOCUMENTS.iter().map(|(k, _)| *k).collect();
        anyhow::bail!("invalid document '{kind}'; choose from: {}", kinds.join(", "));
    };

    let content = read_optional(&sprint.path.join(file));
    if json {
        print_json(&serde_json::json!({
            "sprint": sprint.id,
            "file": file,
            "content": content,
        }))?;
        return Ok(());
    }

    match content {
        Some(text) => print!("{text}"),
        None => println!("{file} does not exist for {}.", sprint.id),
    }
    Ok(())
}

fn present_documents(sprint: &Sprint) -> Vec<&'static str> {
    DOCUMENTS
        .iter()
        .map(|(_, file)| *file)
        .filter(|file| sprint.path.join(file).exists())
        .collect()
}

/// Acceptance criteria from `proposal.md`, grouped under their subheadings.
fn acceptance_groups(sprint: &Sprint) -> Vec<CheckboxGroup> {
    read_optional(&sprint.path.join(paths::PROPOSAL_MD))
        .map(|content| {
            let section = markdown::extract_section(&content, "Acceptance Criteria", 2);
            markdown::group_checkboxes_by_category(&section)
        })
        .unwrap_or_default()
        .into_iter()
        .filter(|g| !g.items.is_empty())
        .collect()
}

fn print_header(sprint: &Sprint) {
    let mut fields = vec![
        ("Sprint", sprint.id.clone()),
        ("Title", sprint.title.clone()),
        ("Status", sprint.status.as_str().to_uppercase()),
    ];
    if let Some(progress) = sprint.progress.as_ref().filter(|p| p.total_tasks > 0) {
        fields.push((
            "Progress",
            progress_bar(progress.completed_tasks, progress.total_tasks, 30),
        ));
        fields.push((
            "Acceptance",
            format!(
                "{}/{}",
                progress.acceptance_criteria_completed, progress.acceptance_criteria_total
            ),
        ));
    }
    fields.push(("Created", sprint.created_at.format("%Y-%m-%d %H:%M").to_string()));
    fields.push(("Updated", relative_time(sprint.updated_at)));
    print_fields(&fields);
}

fn print_acceptance(sprint: &Sprint, groups: &[CheckboxGroup]) {
    if sprint.acceptance_criteria.is_empty() {
        return;
    }
    section("Acceptance Criteria");
    for group in groups {
        println!("  {}", group.category);
        for item in &group.items {
            println!("    {} {}", checkbox(item.checked), item.text);
        }
    }
    let (done, total, pct) = markdown::calculate_completion(&sprint.acceptance_criteria);
    println!("  Completion: {done}/{total} ({pct:.0}%)");
}

fn print_strides(sprint: &Sprint) {
    let Some(progress) = sprint.progress.as_ref().filter(|p| !p.strides.is_empty()) else {
        return;
    };
    let current = progress.current_stride().map(|s| s.number);

    section("Strides");
    let rows: Vec<Vec<String>> = progress
        .strides
        .iter()
        .map(|stride| {
            let marker = if Some(stride.number) == current { "→ " } else { "" };
            let bar = if stride.total_tasks() > 0 {
                progress_bar(stride.completed_tasks(), stride.total_tasks(), WIDE_BAR_WIDTH)
            } else {
                "no tasks".to_string()
            };
            let purpose = if stride.purpose.is_empty() {
                "-".to_string()
            } else {
                truncate(&stride.purpose, 60)
            };
            vec![
                format!("{marker}Stride {}", stride.number),
                truncate(&stride.name, 30),
                bar,
                purpose,
            ]
        })
        .collect();
    print_table(&["STRIDE", "NAME", "PROGRESS", "PURPOSE"], rows);
}

fn print_tasks(sprint: &Sprint) {
    let Some(progress) = sprint.progress.as_ref().filter(|p| !p.strides.is_empty()) else {
        println!("No tasks found.");
        return;
    };
    for stride in &progress.strides {
        section(&format!("Stride {}: {}", stride.number, stride.name));
        if stride.tasks.is_empty() {
            println!("  no tasks defined");
        }
        for task in &stride.tasks {
            println!("  {} {}", checkbox(task.checked), task.text);
        }
    }
}

/// Every attached log entry, newest first, one summary line each.
fn print_timeline(sprint: &Sprint, full: bool) {
    if sprint.recent_logs.is_empty() {
        println!("No implementation activity yet.");
        return;
    }
    section("Implementation Timeline");
    let shown = if full {
        sprint.recent_logs.len()
    } else {
        LOGS_SHOWN
    };
    for (i, log) in sprint.recent_logs.iter().take(shown).enumerate() {
        let marker = if i == 0 { "●" } else { "○" };
        println!("  {marker} {} - {}", log.timestamp, log.stride_name);
        if !log.tasks_addressed.is_empty() {
            let first: Vec<&str> = log.tasks_addressed.iter().take(2).map(String::as_str).collect();
            let more = if log.tasks_addressed.len() > 2 { " ..." } else { "" };
            println!("      Tasks: {}{more}", first.join(", "));
        }
        if !log.changes.is_empty() {
            println!("      Files: {} changed", log.changes.len());
        }
    }
    let hidden = sprint.recent_logs.len().saturating_sub(shown);
    if hidden > 0 {
        println!("  ... {hidden} earlier entries (use --full to see all)");
    }
}

fn print_logs(sprint: &Sprint, full: bool) {
    if sprint.recent_logs.is_empty() {
        return;
    }
    section("Recent Activity");
    let shown = if full {
        sprint.recent_logs.len()
    } else {
        LOGS_SHOWN
    };
    for log in sprint.recent_logs.iter().take(shown) {
        println!("  {} | Stride: {}", log.timestamp, log.stride_name);
        let limit = |n: usize| if full { usize::MAX } else { n };
        for (label, items, n) in [
            ("Tasks", &log.tasks_addressed, 3),
            ("Decisions", &log.decisions, 2),
            ("Changes", &log.changes, 3),
            ("Notes", &log.notes, 2),
        ] {
            if items.is_empty() {
                continue;
            }
            println!("    {label}:");
            for item in items.iter().take(limit(n)) {
                let text = if full { item.clone() } else { truncate(item, 80) };
                println!("      - {text}");
            }
        }
    }
}
