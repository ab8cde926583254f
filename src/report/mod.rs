pub mod feedback;
pub mod markdown;
pub mod types;

pub use feedback::generate_feedback;
pub use types::Feedback;

use clap::ValueEnum;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use types::Severity;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize feedback: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How the feedback is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary for a terminal
    #[default]
    Terminal,
    /// The Markdown summary
    Markdown,
    /// The full feedback bundle as JSON
    Json,
    /// Minimal HTML summary
    Html,
}

/// Render feedback in the given format to stdout, or to `output_path` when set.
#[instrument(skip(feedback), fields(pr = %feedback.summary_report.pr_id, score = feedback.summary_report.overall_score))]
pub fn output(
    feedback: &Feedback,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    let rendered = match format {
        OutputFormat::Terminal => {
            if let Some(path) = output_path {
                debug!(path = %path.display(), "terminal format written to file as markdown");
                feedback.markdown_summary.clone()
            } else {
                debug!("writing report to terminal");
                print_terminal_report(feedback);
                return Ok(());
            }
        }
        OutputFormat::Markdown => feedback.markdown_summary.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(feedback)?,
        OutputFormat::Html => markdown::generate_html_summary(&feedback.summary_report),
    };

    match output_path {
        None => {
            debug!(?format, "writing report to stdout");
            println!("{}", rendered);
        }
        Some(path) => {
            debug!(?format, path = %path.display(), "writing report to file");
            std::fs::write(path, rendered)?;
        }
    }
    Ok(())
}

/// Print the summary report to the terminal with colors.
///
/// PR #123: AI Code Review
/// Score: 83/100 | Issues: 4 (1 critical, 2 warning, 1 suggestion)
///
/// ═══ Top Issues ═══
/// • CRITICAL Hardcoded API Key (src/auth/login.ts:3)
///
/// ═══ src/auth/login.ts ═══
///   line 3  CRITICAL Hardcoded API Key
fn print_terminal_report(feedback: &Feedback) {
    let report = &feedback.summary_report;
    let stats = &report.issue_stats;

    println!();
    println!("PR #{}: {}", report.pr_id, report.title.bold());
    println!(
        "Score: {} | Issues: {} ({} critical, {} warning, {} suggestion)",
        colorize_score(report.overall_score),
        stats.total,
        stats.critical,
        stats.warning,
        stats.suggestion
    );
    println!("Analyzed at {} in {}ms", report.analysis_time, report.duration);
    println!();

    println!("═══ Top Issues ═══");
    if report.top_issues.is_empty() {
        println!("  No issues found.");
    }
    for issue in &report.top_issues {
        let location = match issue.line {
            Some(line) => format!(" ({}:{})", issue.file, line),
            None => format!(" ({})", issue.file),
        };
        println!("  • {} {}{}", colorize_severity(issue.severity), issue.title, location);
    }
    println!();

    for file in &report.file_reports {
        println!("═══ {} ═══", file.filename);
        for comment in &file.comments {
            println!(
                "  line {:<4} {} {}",
                comment.line,
                colorize_severity(comment.severity),
                comment.message.lines().next().unwrap_or_default()
            );
        }
        println!();
    }
}

fn colorize_severity(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::Warning => "WARNING".yellow().bold(),
        Severity::Suggestion => "SUGGESTION".cyan().bold(),
    }
}

fn colorize_score(score: u32) -> colored::ColoredString {
    let text = format!("{}/100", score);
    match score {
        90..=100 => text.green().bold(),
        70..=89 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::feedback::tests::{result_with, sample_result};
    use crate::report::feedback::DEFAULT_TITLE;

    fn sample_feedback() -> Feedback {
        generate_feedback(&sample_result(), DEFAULT_TITLE)
    }

    #[test]
    fn test_output_markdown_to_file() {
        let feedback = sample_feedback();
        let path = std::env::temp_dir().join("pr_review_test_output.md");
        output(&feedback, OutputFormat::Markdown, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, feedback.markdown_summary);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_json_to_file() {
        let feedback = sample_feedback();
        let path = std::env::temp_dir().join("pr_review_test_output.json");
        output(&feedback, OutputFormat::Json, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["summaryReport"]["overallScore"], 83);
        assert_eq!(json["summaryReport"]["prId"], 123);
        assert_eq!(json["inlineComments"].as_array().unwrap().len(), 4);
        assert_eq!(json["inlineComments"][0]["suggestionId"], "security-1");
        assert!(json["markdownSummary"].as_str().unwrap().starts_with("# AI Code Review"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_html_to_file() {
        let path = std::env::temp_dir().join("pr_review_test_output.html");
        output(&sample_feedback(), OutputFormat::Html, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<h1>Code Review Summary for PR #123</h1>"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_terminal_format_to_file_writes_markdown() {
        let feedback = sample_feedback();
        let path = std::env::temp_dir().join("pr_review_test_terminal.md");
        output(&feedback, OutputFormat::Terminal, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, feedback.markdown_summary);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_to_unwritable_path_fails() {
        let path = std::env::temp_dir().join("pr_review_missing_dir").join("out.md");
        let err = output(&sample_feedback(), OutputFormat::Markdown, Some(&path)).unwrap_err();
        assert!(matches!(err, ReportError::FileWrite(_)));
    }

    #[test]
    fn test_output_to_terminal() {
        // Should not panic
        output(&sample_feedback(), OutputFormat::Terminal, None).unwrap();
        let clean = generate_feedback(&result_with(vec![]), DEFAULT_TITLE);
        output(&clean, OutputFormat::Terminal, None).unwrap();
    }

    #[test]
    fn test_score_colors() {
        colored::control::set_override(false);
        assert_eq!(colorize_score(100).to_string(), "100/100");
        assert_eq!(colorize_severity(Severity::Warning).to_string(), "WARNING");
    }
}
