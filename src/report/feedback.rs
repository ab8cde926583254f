use tracing::{debug, info};

use super::markdown::generate_markdown_summary;
use super::types::{
    AnalysisResult, Category, CodeIssue, Feedback, FileReport, InlineComment, IssueStats, Severity,
    SummaryReport, TopIssue,
};

/// Title used when the caller does not supply one.
pub const DEFAULT_TITLE: &str = "AI Code Review";
/// Number of issues listed in a summary report's top issues.
pub const TOP_ISSUES_LIMIT: usize = 5;

pub fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🚨",
        Severity::Warning => "⚠️",
        Severity::Suggestion => "💡",
    }
}

/// One sentence on why issues of this category matter.
pub fn category_explanation(category: Category) -> &'static str {
    match category {
        Category::Security => {
            "Security issues can lead to vulnerabilities that may be exploited by attackers."
        }
        Category::Performance => {
            "Performance issues can cause your application to run slowly or use excessive resources."
        }
        Category::CodeStyle => {
            "Code style issues affect readability and maintainability of your codebase."
        }
        Category::Maintainability => {
            "Maintainability issues make your code harder to understand, modify, or extend."
        }
        Category::Architecture => {
            "Architectural issues can lead to design problems that affect the entire system."
        }
    }
}

/// Render an issue as a review comment body.
pub fn format_inline_comment(issue: &CodeIssue) -> String {
    let mut comment = format!(
        "{} **{}: {}**\n\n{}\n\n",
        severity_emoji(issue.severity),
        issue.severity,
        issue.title,
        issue.description
    );
    if let Some(snippet) = &issue.snippet {
        comment.push_str(&format!("```\n{}\n```\n\n", snippet));
    }
    comment.push_str(&format!(
        "**Why it matters**: {}\n",
        category_explanation(issue.category)
    ));
    if let Some(remediation) = &issue.remediation {
        comment.push_str(&format!("\n**Recommendation**: {}", remediation));
    }
    comment
}

/// One comment per issue that has a line number; the rest are dropped.
pub fn generate_inline_comments(result: &AnalysisResult) -> Vec<InlineComment> {
    info!(pr = %result.pr_id, "generating inline comments");
    let comments: Vec<InlineComment> = result
        .issues
        .iter()
        .filter_map(|issue| {
            let Some(line) = issue.location.line else {
                debug!(title = %issue.title, file = %issue.location.file, "skipping issue without line number");
                return None;
            };
            Some(InlineComment {
                file: issue.location.file.clone(),
                line,
                message: format_inline_comment(issue),
                severity: issue.severity,
                category: issue.category,
                suggestion_id: issue.id.clone(),
            })
        })
        .collect();
    info!(comments = comments.len(), "generated inline comments");
    comments
}

fn stats<'a>(severities: impl Iterator<Item = &'a Severity>) -> IssueStats {
    let mut stats = IssueStats::default();
    for severity in severities {
        match severity {
            Severity::Critical => stats.critical += 1,
            Severity::Warning => stats.warning += 1,
            Severity::Suggestion => stats.suggestion += 1,
        }
        stats.total += 1;
    }
    stats
}

/// Inline comments grouped per file, most critical files first
/// (critical count, then warning count, then total, all descending).
pub fn generate_file_reports(result: &AnalysisResult) -> Vec<FileReport> {
    let mut groups: Vec<(String, Vec<InlineComment>)> = Vec::new();
    for comment in generate_inline_comments(result) {
        match groups.iter_mut().find(|(file, _)| *file == comment.file) {
            Some((_, comments)) => comments.push(comment),
            None => groups.push((comment.file.clone(), vec![comment])),
        }
    }

    let mut reports: Vec<FileReport> = groups
        .into_iter()
        .map(|(filename, comments)| FileReport {
            filename,
            issues: stats(comments.iter().map(|c| &c.severity)),
            comments,
        })
        .collect();

    reports.sort_by(|a, b| {
        b.issues
            .critical
            .cmp(&a.issues.critical)
            .then(b.issues.warning.cmp(&a.issues.warning))
            .then(b.issues.total.cmp(&a.issues.total))
    });
    reports
}

/// 100 minus 10 per critical, 3 per warning and 1 per suggestion, floored at 0.
pub fn score(critical: usize, warning: usize, suggestion: usize) -> u32 {
    let penalty = critical
        .saturating_mul(10)
        .saturating_add(warning.saturating_mul(3))
        .saturating_add(suggestion);
    100usize.saturating_sub(penalty) as u32
}

/// The `limit` most severe issues, keeping detection order within a severity.
pub fn top_issues(result: &AnalysisResult, limit: usize) -> Vec<TopIssue> {
    let mut sorted: Vec<&CodeIssue> = result.issues.iter().collect();
    sorted.sort_by_key(|issue| issue.severity);
    sorted
        .into_iter()
        .take(limit)
        .map(|issue| TopIssue {
            severity: issue.severity,
            category: issue.category,
            title: issue.title.clone(),
            file: issue.location.file.clone(),
            line: issue.location.line,
        })
        .collect()
}

pub fn generate_summary_report(result: &AnalysisResult, title: &str) -> SummaryReport {
    info!(pr = %result.pr_id, "generating summary report");
    let summary = &result.summary;
    let overall_score = score(
        summary.critical_count,
        summary.warning_count,
        summary.suggestion_count,
    );

    let report = SummaryReport {
        pr_id: result.pr_id.clone(),
        title: title.to_string(),
        overall_score,
        issue_stats: IssueStats {
            critical: summary.critical_count,
            warning: summary.warning_count,
            suggestion: summary.suggestion_count,
            total: summary.total_issues,
        },
        top_issues: top_issues(result, TOP_ISSUES_LIMIT),
        file_reports: generate_file_reports(result),
        analysis_time: result
            .metadata
            .analyzed_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        duration: result.metadata.duration,
    };
    info!(score = overall_score, "generated summary report");
    report
}

/// Inline comments, summary report and its Markdown rendering in one go.
pub fn generate_feedback(result: &AnalysisResult, title: &str) -> Feedback {
    info!(pr = %result.pr_id, "generating feedback");
    let summary_report = generate_summary_report(result, title);
    let markdown_summary = generate_markdown_summary(&summary_report);
    Feedback {
        inline_comments: generate_inline_comments(result),
        summary_report,
        markdown_summary,
    }
}
