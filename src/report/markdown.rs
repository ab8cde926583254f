use std::collections::BTreeMap;

use super::feedback::severity_emoji;
use super::types::{InlineComment, IssueStats, Severity, SummaryReport};

const FOOTER: &str = "---\n*Generated by AI-Powered Code Review Assistant*";

/// First line of a comment body without its emoji and bold markers,
/// e.g. "Critical: Hardcoded API Key".
fn headline(comment: &InlineComment) -> String {
    let first = comment.message.lines().next().unwrap_or_default();
    let first = first
        .strip_prefix(severity_emoji(comment.severity))
        .unwrap_or(first)
        .trim_start();
    first.replace("**", "")
}

fn push_counts(md: &mut String, stats: &IssueStats) {
    md.push_str(&format!("  - {} Critical: {}\n", severity_emoji(Severity::Critical), stats.critical));
    md.push_str(&format!("  - {} Warning: {}\n", severity_emoji(Severity::Warning), stats.warning));
    md.push_str(&format!("  - {} Suggestion: {}\n", severity_emoji(Severity::Suggestion), stats.suggestion));
}

/// Render a summary report as Markdown. Output depends only on the report.
pub fn generate_markdown_summary(report: &SummaryReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {} for PR #{}\n\n", report.title, report.pr_id));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Overall Score**: {}/100\n", report.overall_score));
    md.push_str(&format!("- **Total Issues**: {}\n", report.issue_stats.total));
    push_counts(&mut md, &report.issue_stats);
    md.push_str(&format!("- **Analysis Time**: {}\n", report.analysis_time));
    md.push_str(&format!("- **Duration**: {}ms\n\n", report.duration));

    if !report.top_issues.is_empty() {
        md.push_str("## Top Issues\n\n");
        for issue in &report.top_issues {
            md.push_str(&format!(
                "- {} **{}**: {} in `{}`",
                severity_emoji(issue.severity),
                issue.severity,
                issue.title,
                issue.file
            ));
            if let Some(line) = issue.line {
                md.push_str(&format!(" at line {}", line));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    if !report.file_reports.is_empty() {
        md.push_str("## Files\n\n");
        for file in &report.file_reports {
            md.push_str(&format!("### {}\n\n", file.filename));
            md.push_str(&format!("- Total Issues: {}\n", file.issues.total));
            push_counts(&mut md, &file.issues);
            md.push('\n');

            if file.comments.is_empty() {
                continue;
            }
            md.push_str("#### Issues\n\n");
            let mut by_line: BTreeMap<usize, Vec<&InlineComment>> = BTreeMap::new();
            for comment in &file.comments {
                by_line.entry(comment.line).or_default().push(comment);
            }
            for (line, comments) in by_line {
                md.push_str(&format!("**Line {}**:\n\n", line));
                for comment in comments {
                    md.push_str(&format!("- {} {}\n", severity_emoji(comment.severity), headline(comment)));
                }
                md.push('\n');
            }
        }
    }

    md.push_str(FOOTER);
    md
}

/// Minimal HTML rendering with the score and severity counts.
pub fn generate_html_summary(report: &SummaryReport) -> String {
    let stats = &report.issue_stats;
    format!(
        "<h1>Code Review Summary for PR #{}</h1>\n\
         <p>Score: {}/100</p>\n\
         <p>Total Issues: {}</p>\n\
         <ul>\n  \
         <li>🚨 Critical: {}</li>\n  \
         <li>⚠️ Warning: {}</li>\n  \
         <li>💡 Suggestion: {}</li>\n\
         </ul>",
        report.pr_id,
        report.overall_score,
        stats.total,
        stats.critical,
        stats.warning,
        stats.suggestion
    )
}
