//! Output rendering for validation summaries and archive previews.
//!
//! Supports `human` (default), `json` and `markdown` outputs. The markdown
//! form is the submission report from `generate_report`; the JSON form is the
//! summary exactly as it is persisted.

use crate::models::{ExtractedFile, LintIssue, Severity, ValidationSummary};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt::Write as _;

/// Scores below this get the recommendations block.
pub const RECOMMENDATION_THRESHOLD: u32 = 70;

fn use_colors(output: &str) -> bool {
    output == "human" && std::env::var_os("NO_COLOR").is_none()
}

/// Render a summary as the markdown report shown to students.
///
/// Pure: the same summary always yields byte-identical text.
pub fn generate_report(summary: &ValidationSummary) -> String {
    let mut report = String::from("## Validation Report\n\n");
    let _ = write!(report, "**Overall Score: {}/100**\n\n", summary.overall_score);
    let _ = writeln!(report, "- Files validated: {}", summary.total_files);
    let _ = writeln!(report, "- Total errors: {}", summary.total_errors);
    let _ = write!(report, "- Total warnings: {}\n\n", summary.total_warnings);

    if summary.total_errors > 0 || summary.total_warnings > 0 {
        report.push_str("### Issues Found:\n\n");
        for result in summary.results.iter().filter(|r| r.has_issues()) {
            let _ = write!(
                report,
                "#### {} (Score: {}/{})\n\n",
                result.file, result.score, result.max_score
            );
            for issue in &result.errors {
                report_issue(&mut report, "❌ **Error**", issue);
            }
            for issue in &result.warnings {
                report_issue(&mut report, "⚠️ **Warning**", issue);
            }
        }
    } else {
        report.push_str("✅ **Great job!** No issues found in your code.\n\n");
    }

    if summary.overall_score < RECOMMENDATION_THRESHOLD {
        report.push_str("### Recommendations:\n\n");
        report.push_str("- Review and fix the errors listed above\n");
        report.push_str("- Consider addressing warnings to improve code quality\n");
        report.push_str("- Test your code in a browser to ensure it works as expected\n\n");
    }
    report
}

fn report_issue(report: &mut String, label: &str, issue: &LintIssue) {
    let _ = write!(
        report,
        "{} (Line {}, Col {}): {} `[{}]`\n\n",
        label, issue.line, issue.column, issue.message, issue.rule
    );
}

/// Print a validation summary in the requested format.
pub fn print_summary(summary: &ValidationSummary, output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_summary_json(summary))),
        "markdown" => print!("{}", generate_report(summary)),
        _ => {
            let color = use_colors(output);
            for res in &summary.results {
                let issues = res
                    .errors
                    .iter()
                    .map(|i| (Severity::Error, i))
                    .chain(res.warnings.iter().map(|i| (Severity::Warning, i)));
                for (sev, is) in issues {
                    println!("{}", human_issue_line(&res.file, sev, is, color));
                }
            }
            for res in &summary.results {
                let line = format!("{} {}/{}", res.file, res.score, res.max_score);
                if color {
                    println!("{}", line.bright_black());
                } else {
                    println!("{}", line);
                }
            }
            let line = summary_line(summary);
            if color {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
    }
}

fn human_issue_line(file: &str, sev: Severity, is: &LintIssue, color: bool) -> String {
    let (icon, tag) = match sev {
        Severity::Error => ("✖", "⟦error⟧"),
        Severity::Warning => ("▲", "⟦warn⟧"),
    };
    let location = format!("{}:{}:{}", file, is.line, is.column);
    if !color {
        return format!("{} {} {} ❲{}❳ — {}", icon, tag, location, is.rule, is.message);
    }
    let (icon, tag) = match sev {
        Severity::Error => (icon.red().to_string(), tag.red().bold().to_string()),
        Severity::Warning => (icon.yellow().to_string(), tag.yellow().bold().to_string()),
    };
    format!("{} {} {} ❲{}❳ — {}", icon, tag, location.bold(), is.rule, is.message)
}

/// The one-line footer of the human output.
pub fn summary_line(summary: &ValidationSummary) -> String {
    format!(
        "— Summary — score={}/100 files={} errors={} warnings={}",
        summary.overall_score, summary.total_files, summary.total_errors, summary.total_warnings
    )
}

/// Print the preview listing of an archive.
pub fn print_preview(files: &[ExtractedFile], output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_preview_json(files))),
        _ => {
            let color = use_colors(output);
            for f in files {
                let size = format!("({} bytes)", f.content.len());
                if color {
                    println!("{} {}", f.path.bold(), size.bright_black());
                } else {
                    println!("{} {}", f.path, size);
                }
            }
            let line = format!("— Summary — files={}", files.len());
            if color {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
    }
}

fn pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_default()
}

/// Compose the summary JSON object (pure) for testing/snapshot purposes.
pub fn compose_summary_json(summary: &ValidationSummary) -> JsonVal {
    serde_json::to_value(summary).unwrap_or(JsonVal::Null)
}

/// Compose the preview JSON object (pure): a `path -> content` map plus a count.
pub fn compose_preview_json(files: &[ExtractedFile]) -> JsonVal {
    let map: serde_json::Map<String, JsonVal> = files
        .iter()
        .map(|f| (f.path.clone(), JsonVal::String(f.content.clone())))
        .collect();
    json!({"files": map, "summary": {"files": files.len()}})
}
