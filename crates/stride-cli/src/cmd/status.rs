use crate::output::{
    print_fields, print_json, print_table, progress_bar, relative_time, section, truncate,
    BAR_WIDTH, WIDE_BAR_WIDTH,
};
use anyhow::Context;
use std::path::Path;
use stride_core::{config::StrideConfig, sprint::Sprint, types::SprintStatus};

/// Sprint ids listed per status row before collapsing to "+N more".
const IDS_SHOWN: usize = 3;

pub fn run(root: &Path, id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = StrideConfig::load(root).context("failed to load config")?;
    match id {
        Some(id) => sprint_status(root, &config, id, json),
        None => project_status(root, &config, json),
    }
}

pub(crate) fn load_detailed(root: &Path, config: &StrideConfig, id: &str) -> anyhow::Result<Sprint> {
    Sprint::load_with_log_limit(root, id, true, config.recent_log_limit)
        .with_context(|| format!("sprint '{id}' not found"))
}

fn sprint_status(root: &Path, config: &StrideConfig, id: &str, json: bool) -> anyhow::Result<()> {
    let sprint = load_detailed(root, config, id)?;
    let progress = sprint.progress.clone().unwrap_or_default();

    if json {
        print_json(&serde_json::json!({
            "id": sprint.id,
            "title": sprint.title,
            "status": sprint.status,
            "updated_at": sprint.updated_at,
            "progress": progress,
            "current_stride": progress.current_stride(),
            "acceptance_criteria": sprint.acceptance_criteria,
            "recent_logs": sprint.recent_logs,
        }))?;
        return Ok(());
    }

    println!("{} - {}", sprint.id, sprint.title);
    println!("Status: {}", sprint.status.as_str().to_uppercase());
    println!("Updated {}", relative_time(sprint.updated_at));

    section("Progress");
    print_fields(&[
        (
            "Tasks",
            progress_bar(progress.completed_tasks, progress.total_tasks, WIDE_BAR_WIDTH),
        ),
        (
            "Acceptance Criteria",
            progress_bar(
                progress.acceptance_criteria_completed,
                progress.acceptance_criteria_total,
                WIDE_BAR_WIDTH,
            ),
        ),
        (
            "Strides",
            progress_bar(progress.completed_strides(), progress.strides.len(), WIDE_BAR_WIDTH),
        ),
    ]);

    match progress.current_stride() {
        Some(stride) => {
            section(&format!("Current: Stride {}: {}", stride.number, stride.name));
            if !stride.purpose.is_empty() {
                println!("Purpose: {}", stride.purpose);
            }
            for task in stride.tasks.iter().filter(|t| !t.checked) {
                println!("  [ ] {}", task.text);
            }
            println!(
                "Completed: {}/{} tasks",
                stride.completed_tasks(),
                stride.total_tasks()
            );
        }
        None if !progress.strides.is_empty() => {
            println!();
            println!("All strides completed.");
        }
        None => {}
    }

    let mut next_steps = Vec::new();
    let open_criteria = sprint.acceptance_criteria.iter().filter(|c| !c.checked).count();
    if open_criteria > 0 {
        next_steps.push(format!(
            "Complete remaining acceptance criteria ({open_criteria} pending)"
        ));
    }
    if let Some(stride) = progress.current_stride() {
        let remaining = stride.total_tasks() - stride.completed_tasks();
        next_steps.push(format!("Work on {remaining} remaining task(s) in current stride"));
    }
    if progress.total_tasks == 0 {
        next_steps.push("Define strides and tasks in plan.md to track progress".to_string());
    } else if progress.completed_tasks == progress.total_tasks
        && sprint.status != SprintStatus::Completed
    {
        next_steps.push("All tasks complete; validate and write the retrospective".to_string());
    }
    if !next_steps.is_empty() {
        section("Next Steps");
        for step in next_steps {
            println!("  - {step}");
        }
    }

    if let Some(latest) = sprint.recent_logs.first() {
        section("Recent Activity");
        println!("  {} - {}", latest.timestamp, latest.stride_name);
        if !latest.tasks_addressed.is_empty() {
            let shown: Vec<&str> = latest.tasks_addressed.iter().take(2).map(String::as_str).collect();
            println!("  Tasks: {}", shown.join(", "));
        }
        if !latest.changes.is_empty() {
            println!("  Changes: {} file(s) modified", latest.changes.len());
            for change in latest.changes.iter().take(3) {
                println!("    - {}", truncate(change, 70));
            }
        }
        if sprint.recent_logs.len() > 1 {
            println!("  ... {} earlier log entries", sprint.recent_logs.len() - 1);
        }
    }
    Ok(())
}

fn project_status(root: &Path, config: &StrideConfig, json: bool) -> anyhow::Result<()> {
    let sprints = Sprint::list(root);
    let by_status = |status: SprintStatus| {
        sprints
            .iter()
            .filter(|s| s.status == status)
            .collect::<Vec<&Sprint>>()
    };

    if json {
        let counts: serde_json::Map<String, serde_json::Value> = SprintStatus::all()
            .iter()
            .map(|&status| {
                let ids: Vec<&str> = by_status(status).iter().map(|s| s.id.as_str()).collect();
                (status.to_string(), serde_json::json!(ids))
            })
            .collect();
        print_json(&serde_json::json!({
            "project": config.project,
            "total_sprints": sprints.len(),
            "sprints_by_status": counts,
        }))?;
        return Ok(());
    }

    if sprints.is_empty() {
        println!("No sprints found in this project.");
        println!("Sprints live under .stride/sprints/<id>/.");
        return Ok(());
    }

    println!("{}: {} sprint(s)", config.project, sprints.len());
    println!();

    let rows: Vec<Vec<String>> = SprintStatus::all()
        .iter()
        .filter_map(|&status| {
            let group = by_status(status);
            if group.is_empty() {
                return None;
            }
            let mut ids: Vec<&str> = group.iter().take(IDS_SHOWN).map(|s| s.id.as_str()).collect();
            let extra = group.len().saturating_sub(IDS_SHOWN);
            let more = format!("(+{extra} more)");
            if extra > 0 {
                ids.push(&more);
            }
            Some(vec![
                status.as_str().to_uppercase(),
                group.len().to_string(),
                ids.join(", "),
            ])
        })
        .collect();
    print_table(&["STATUS", "COUNT", "SPRINTS"], rows);

    let active = by_status(SprintStatus::Active);
    if !active.is_empty() {
        section("Active Sprints");
        for sprint in active.iter().take(IDS_SHOWN) {
            let Ok(detailed) = load_detailed(root, config, &sprint.id) else {
                continue;
            };
            let progress = detailed.progress.unwrap_or_default();
            let current = progress
                .current_stride()
                .map(|s| format!("Stride {}", s.number))
                .unwrap_or_else(|| "Complete".to_string());
            println!("  {} - {}", sprint.id, truncate(&detailed.title, 40));
            println!(
                "    Progress: {}",
                progress_bar(progress.completed_tasks, progress.total_tasks, BAR_WIDTH)
            );
            println!("    Current: {current}");
        }
        if active.len() > IDS_SHOWN {
            println!("  ... and {} more active sprint(s)", active.len() - IDS_SHOWN);
        }
    }
    Ok(())
}
