use crate::output::{
    print_json, print_table, progress_bar, relative_time, truncate, BAR_WIDTH, TITLE_WIDTH,
    WIDE_BAR_WIDTH,
};
use std::path::Path;
use stride_core::{sprint::Sprint, types::SprintStatus};

pub fn run(
    root: &Path,
    status: Option<SprintStatus>,
    verbose: bool,
    json: bool,
) -> anyhow::Result<()> {
    let sprints: Vec<Sprint> = Sprint::list(root)
        .into_iter()
        .filter(|s| status.map_or(true, |wanted| s.status == wanted))
        .filter_map(|s| Sprint::load(root, &s.id, true))
        .collect();

    if json {
        let items: Vec<serde_json::Value> = sprints
            .iter()
            .map(|s| {
                let progress = s.progress.clone().unwrap_or_default();
                serde_json::json!({
                    "id": s.id,
                    "title": s.title,
                    "status": s.status,
                    "completed_tasks": progress.completed_tasks,
                    "total_tasks": progress.total_tasks,
                    "completion_percentage": progress.completion_percentage,
                    "strides": progress.strides.len(),
                    "completed_strides": progress.completed_strides(),
                    "current_stride": progress.current_stride().map(|c| c.number),
                    "created_at": s.created_at,
                    "updated_at": s.updated_at,
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if sprints.is_empty() {
        println!("No sprints found.");
        return Ok(());
    }

    let bar_width = if verbose { WIDE_BAR_WIDTH } else { BAR_WIDTH };
    let rows: Vec<Vec<String>> = sprints
        .iter()
        .map(|s| {
            let progress = s.progress.clone().unwrap_or_default();
            let bar = if progress.total_tasks > 0 {
                progress_bar(progress.completed_tasks, progress.total_tasks, bar_width)
            } else {
                "no tasks".to_string()
            };
            let mut row = vec![
                s.id.clone(),
                truncate(&s.title, TITLE_WIDTH),
                s.status.as_str().to_uppercase(),
                bar,
            ];
            if verbose {
                row.push(format!("{}/{}", progress.completed_strides(), progress.strides.len()));
                row.push(
                    progress
                        .current_stride()
                        .map(|c| truncate(&c.name, 30))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            row.push(relative_time(s.updated_at));
            row
        })
        .collect();

    if verbose {
        print_table(
            &["ID", "TITLE", "STATUS", "PROGRESS", "STRIDES", "CURRENT STRIDE", "UPDATED"],
            rows,
        );
    } else {
        print_table(&["ID", "TITLE", "STATUS", "PROGRESS", "UPDATED"], rows);
    }
    Ok(())
}
