use crate::output::{label, print_fields, print_json, print_table, progress_bar, section};
use anyhow::Context;
use std::path::Path;
use stride_core::{analytics, config::StrideConfig, metrics::Metrics};

pub struct MetricsOptions<'a> {
    pub detailed: bool,
    pub refresh: bool,
    pub clear_cache: bool,
    pub sprint: Option<&'a str>,
}

pub fn run(root: &Path, opts: MetricsOptions<'_>, json: bool) -> anyhow::Result<()> {
    let config = StrideConfig::load(root).context("failed to load config")?;

    if opts.clear_cache {
        analytics::clear_analytics_cache(root).context("failed to clear analytics cache")?;
        if json {
            print_json(&serde_json::json!({ "cleared": true }))?;
        } else {
            println!("Analytics cache cleared.");
        }
        return Ok(());
    }

    if let Some(id) = opts.sprint {
        return sprint_summary(root, &config, id, json);
    }

    let metrics = analytics::get_metrics(root, &config, !opts.refresh, opts.refresh);

    if json {
        print_json(&metrics)?;
        return Ok(());
    }

    if !metrics.has_data() {
        println!("No sprint data found.");
        println!("Analytics read .stride/sprints/{}*/ folders.", config.analytics_prefix);
        return Ok(());
    }

    print_overview(&metrics);
    if opts.detailed {
        print_detailed(&metrics);
    }

    if !opts.refresh {
        if let Some(info) = analytics::get_cache_info(root) {
            println!();
            println!(
                "Cached data from {}. Use --refresh to recalculate.",
                info.cache_age
            );
        }
    }
    Ok(())
}

fn sprint_summary(root: &Path, config: &StrideConfig, id: &str, json: bool) -> anyhow::Result<()> {
    let summary = analytics::get_sprint_summary(root, config, id)
        .with_context(|| format!("sprint '{id}' not found in analytics folders"))?;

    if json {
        print_json(&summary)?;
        return Ok(());
    }

    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
    println!("{} - {}", summary.sprint_id, summary.title);
    print_fields(&[
        ("Status", summary.status.clone()),
        ("Created", summary.created_date.format("%Y-%m-%d").to_string()),
        (
            "Duration",
            summary
                .duration_days
                .map(|d| format!("{d:.1} days"))
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Tasks",
            progress_bar(summary.completed_tasks, summary.total_tasks, 20),
        ),
        ("Task completion", format!("{:.1}%", summary.task_completion_rate)),
        ("Planning", yes_no(summary.has_planning)),
        ("Implementation", yes_no(summary.has_implementation)),
        ("Retrospective", yes_no(summary.has_retrospective)),
        (
            "Process compliance",
            format!("{:.0}%", summary.process_compliance_score),
        ),
    ]);
    Ok(())
}

fn print_overview(m: &Metrics) {
    section("Sprint Distribution");
    print_fields(&[
        ("Total sprints", m.counts.total_sprints.to_string()),
        ("Active", m.counts.active_sprints.to_string()),
        ("Completed", m.counts.completed_sprints.to_string()),
        ("Abandoned", m.counts.abandoned_sprints.to_string()),
        ("Success rate", format!("{:.1}%", m.counts.completion_rate)),
        ("Abandonment rate", format!("{:.1}%", m.counts.abandonment_rate)),
    ]);

    section("Performance");
    let mut perf = Vec::new();
    if m.duration.has_duration_data {
        perf.push((
            "Avg duration",
            format!("{:.1} days", m.duration.average_duration),
        ));
    }
    perf.push((
        "Sprint velocity",
        format!("{:.1} tasks/sprint", m.tasks.sprint_velocity),
    ));
    perf.push((
        "Task completion",
        format!("{:.1}%", m.tasks.task_completion_rate),
    ));
    print_fields(&perf);

    section("Quality");
    print_fields(&[
        ("Planning coverage", format!("{:.0}%", m.quality.planning_coverage)),
        (
            "Implementation coverage",
            format!("{:.0}%", m.quality.implementation_coverage),
        ),
        (
            "Retrospective coverage",
            format!("{:.0}%", m.quality.retrospective_coverage),
        ),
        ("Process adoption", format!("{:.0}%", m.quality.process_adoption_rate)),
    ]);

    section("Project Health");
    let score = m.summary.health_score as usize;
    print_fields(&[
        ("Health score", format!("{score}/100")),
        ("", progress_bar(score.min(100), 100, 50)),
        ("Productivity", label(&m.summary.productivity_level)),
        ("Process maturity", label(&m.summary.process_maturity)),
        ("Overall status", label(&m.summary.overall_status)),
    ]);

    if m.trends.has_trend_data {
        section("Trends");
        print_fields(&[
            ("Last 7 days", format!("{} sprints", m.trends.sprints_last_7_days)),
            ("Last 30 days", format!("{} sprints", m.trends.sprints_last_30_days)),
            ("Velocity trend", label(m.trends.velocity_trend.as_str())),
            ("Completion trend", label(m.trends.completion_rate_trend.as_str())),
        ]);
    }
}

fn print_detailed(m: &Metrics) {
    let d = &m.duration;
    if d.has_duration_data {
        section("Duration");
        print_fields(&[
            ("Average", format!("{:.1} days", d.average_duration)),
            ("Median", format!("{:.1} days", d.median_duration)),
            ("Min", format!("{:.1} days", d.min_duration)),
            ("Max", format!("{:.1} days", d.max_duration)),
            ("Std dev", format!("{:.1} days", d.std_dev)),
            ("<= 3 days", d.durations_under_3_days.to_string()),
            ("3-7 days", d.durations_3_to_7_days.to_string()),
            ("> 7 days", d.durations_over_7_days.to_string()),
            ("Fastest", d.fastest_sprint.clone().unwrap_or_default()),
            ("Slowest", d.slowest_sprint.clone().unwrap_or_default()),
        ]);
    }

    let t = &m.tasks;
    section("Tasks");
    print_fields(&[
        ("Total", t.total_tasks.to_string()),
        ("Completed", t.completed_tasks.to_string()),
        ("Pending", t.pending_tasks.to_string()),
        ("Avg per completed sprint", format!("{:.1}", t.average_tasks_per_sprint)),
        ("Avg completed per sprint", format!("{:.1}", t.average_completed_per_sprint)),
    ]);

    let q = &m.quality;
    section("Process Artifacts");
    print_table(
        &["DOCUMENT", "SPRINTS"],
        vec![
            vec!["proposal".to_string(), q.sprints_with_proposal.to_string()],
            vec!["plan".to_string(), q.sprints_with_planning.to_string()],
            vec!["design".to_string(), q.sprints_with_design.to_string()],
            vec![
                "implementation".to_string(),
                q.sprints_with_implementation.to_string(),
            ],
            vec![
                "retrospective".to_string(),
                q.sprints_with_retrospective.to_string(),
            ],
        ],
    );
    print_fields(&[
        (
            "Avg retrospective words",
            format!("{:.0}", q.average_retrospective_length),
        ),
        ("Avg learnings", format!("{:.1}", q.average_learnings_count)),
    ]);

    if !m.trends.sprints_by_month.is_empty() {
        section("Sprints by Month");
        let rows: Vec<Vec<String>> = m
            .trends
            .sprints_by_month
            .iter()
            .map(|(month, n)| vec![month.clone(), n.to_string()])
            .collect();
        print_table(&["MONTH", "SPRINTS"], rows);
    }
}
