//! Output rendering for tool reports.
//!
//! Supports `human` (default) and `json` outputs. The human form lists each
//! issue as `<file>:<line> (<CATEGORY>)` followed by its indented text and,
//! when the analyzer supplied one, its merge key.

use crate::models::{Issue, RevisionOutcome, ToolReport};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt::Write;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors("human") {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors("human") {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// Print reports in the requested format.
pub fn print_reports(reports: &[ToolReport], output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_json(reports)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", error_prefix(), e),
        },
        _ => print!("{}", render_human(reports, use_colors(output))),
    }
}

/// One issue as shown to humans.
pub fn render_issue(issue: &Issue) -> String {
    match issue.custom_hash() {
        Some(hash) => format!("{}\n [{}]", issue, hash),
        None => issue.to_string(),
    }
}

/// Render all reports (pure) for printing and tests.
pub fn render_human(reports: &[ToolReport], color: bool) -> String {
    let paint = |s: String| if color { s.bold().to_string() } else { s };
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(out, "{}", paint(format!("### Tool {}", r.tool)));
        for rev in &r.revisions {
            let _ = writeln!(out, "{}\n", paint(format!("## Revision {}:", rev.revision)));
            match &rev.outcome {
                RevisionOutcome::Full { issues } => list(&mut out, issues),
                RevisionOutcome::Diff {
                    against,
                    added,
                    removed,
                } => {
                    let _ = writeln!(out, "# Added (since {}):", against);
                    list(&mut out, added);
                    let _ = writeln!(out, "# Removed (since {}):", against);
                    list(&mut out, removed);
                }
                RevisionOutcome::Failed { error } => {
                    let msg = format!("failed: {}", error);
                    let msg = if color { msg.red().to_string() } else { msg };
                    let _ = writeln!(out, "{}\n", msg);
                }
            }
        }
        let s = &r.summary;
        let _ = writeln!(
            out,
            "{}",
            paint(format!(
                "— Summary — revisions={} issues={} added={} removed={} failed={}",
                s.revisions, s.issues, s.added, s.removed, s.failed
            ))
        );
    }
    out
}

fn list(out: &mut String, issues: &[Issue]) {
    for issue in issues {
        let _ = writeln!(out, "{}\n", render_issue(issue));
    }
    let _ = writeln!(out, "Total: {}\n", issues.len());
}

/// Compose the JSON document (pure) for testing/snapshot purposes.
pub fn compose_json(reports: &[ToolReport]) -> JsonVal {
    let failed: usize = reports.iter().map(|r| r.summary.failed).sum();
    json!({
        "tools": reports,
        "failed": failed,
    })
}
