use crate::output::{print_fields, print_json};
use anyhow::Context;
use std::path::Path;
use stride_core::{
    sprint::Sprint,
    validate::{validate_sprint, ValidationReport},
};

pub fn run(
    root: &Path,
    id: Option<&str>,
    all: bool,
    strict: bool,
    verbose: bool,
    json: bool,
) -> anyhow::Result<()> {
    let sprints = match id {
        Some(id) => vec![Sprint::load(root, id, false)
            .with_context(|| format!("sprint '{id}' not found"))?],
        None if all => Sprint::list(root),
        None => anyhow::bail!("provide a sprint id or --all"),
    };

    let results: Vec<(Sprint, ValidationReport)> = sprints
        .into_iter()
        .map(|sprint| {
            let report = validate_sprint(&sprint);
            (sprint, report)
        })
        .collect();

    if json {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|(sprint, report)| {
                serde_json::json!({
                    "id": sprint.id,
                    "status": sprint.status,
                    "valid": report.passes(strict),
                    "errors": report.errors,
                    "warnings": report.warnings,
                    "info": report.info,
                })
            })
            .collect();
        print_json(&items)?;
    } else if results.is_empty() {
        println!("No sprints found to validate.");
    } else {
        for (sprint, report) in &results {
            print_report(sprint, report, verbose);
        }
        if results.len() > 1 {
            print_summary(&results, verbose);
        }
    }

    let failed = results
        .iter()
        .filter(|(_, report)| !report.passes(strict))
        .count();
    if failed > 0 {
        if strict {
            anyhow::bail!("{failed} sprint(s) failed validation (strict: warnings count as errors)");
        }
        anyhow::bail!("{failed} sprint(s) failed validation");
    }
    Ok(())
}

fn print_numbered(heading: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!("{heading}:");
    for (i, message) in messages.iter().enumerate() {
        println!("  {}. {message}", i + 1);
    }
    println!();
}

fn print_report(sprint: &Sprint, report: &ValidationReport, verbose: bool) {
    println!("{}", "=".repeat(60));
    println!("Validating: {}", sprint.id);
    println!(
        "Status: {} | Path: {}",
        sprint.status.as_str().to_uppercase(),
        sprint.path.display()
    );
    println!("{}", "=".repeat(60));
    println!();

    print_numbered("ERRORS", &report.errors);
    print_numbered("WARNINGS", &report.warnings);
    if verbose {
        print_numbered("INFO", &report.info);
    }

    let verdict = if !report.errors.is_empty() {
        "FAILED"
    } else if !report.warnings.is_empty() {
        "PASSED WITH WARNINGS"
    } else {
        "VALID"
    };
    println!(
        "{verdict}: {} error(s), {} warning(s), {} info message(s)",
        report.errors.len(),
        report.warnings.len(),
        report.info.len()
    );
    println!();
}

fn print_summary(results: &[(Sprint, ValidationReport)], verbose: bool) {
    let count = |f: fn(&ValidationReport) -> bool| results.iter().filter(|(_, r)| f(r)).count();
    let total = |f: fn(&ValidationReport) -> usize| results.iter().map(|(_, r)| f(r)).sum::<usize>();

    println!("VALIDATION SUMMARY");
    let mut fields = vec![
        ("Sprints validated", results.len().to_string()),
        (
            "Sprints with errors",
            count(|r| !r.errors.is_empty()).to_string(),
        ),
        (
            "Sprints with warnings",
            count(|r| !r.warnings.is_empty()).to_string(),
        ),
        ("Total errors", total(|r| r.errors.len()).to_string()),
        ("Total warnings", total(|r| r.warnings.len()).to_string()),
    ];
    if verbose {
        fields.push(("Total info messages", total(|r| r.info.len()).to_string()));
    }
    print_fields(&fields);
}
