use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TITLE_WIDTH: usize = 50;
pub const BAR_WIDTH: usize = 15;
pub const WIDE_BAR_WIDTH: usize = 20;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(cell));
    format!("{cell}{}", " ".repeat(fill))
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Column widths in characters; progress bars are multi-byte.
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(display_width(cell));
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Two-column key/value block with the keys aligned.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| display_width(k)).max().unwrap_or(0);
    for (key, value) in fields {
        println!("  {}  {value}", pad(key, width));
    }
}

pub fn section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "=".repeat(display_width(title)));
}

/// `█████░░░░░ 5/10` style bar. An empty total renders an empty bar.
pub fn progress_bar(completed: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (width * completed.min(total)) / total
    };
    format!(
        "{}{} {completed}/{total}",
        "█".repeat(filled),
        "░".repeat(width - filled)
    )
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Cut `text` to `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", text.chars().take(keep).collect::<String>())
}

pub fn relative_time(at: DateTime<Utc>) -> String {
    relative_time_at(at, Utc::now())
}

/// "just now" / "N minutes ago" / … up to a week, then the plain date.
pub fn relative_time_at(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    let ago = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => ago(s / 60, "minute"),
        s if s < 86_400 => ago(s / 3_600, "hour"),
        s if s < 604_800 => ago(s / 86_400, "day"),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}

/// `needs_improvement` → `Needs Improvement`.
pub fn label(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
