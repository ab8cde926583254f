use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::pr::PrId;

/// How urgent an issue is. Ordered most severe first, so sorting ascending
/// puts critical issues at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Suggestion => write!(f, "Suggestion"),
        }
    }
}

/// Which analyzer produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Security,
    Performance,
    CodeStyle,
    Maintainability,
    Architecture,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Security,
        Category::Performance,
        Category::CodeStyle,
        Category::Maintainability,
        Category::Architecture,
    ];

    /// Lowercase prefix used in generated issue ids.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Performance => "performance",
            Category::CodeStyle => "style",
            Category::Maintainability => "maintainability",
            Category::Architecture => "architecture",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Security => write!(f, "Security"),
            Category::Performance => write!(f, "Performance"),
            Category::CodeStyle => write!(f, "CodeStyle"),
            Category::Maintainability => write!(f, "Maintainability"),
            Category::Architecture => write!(f, "Architecture"),
        }
    }
}

/// Where an issue was found. `line` is an approximation (see `analysis::scan::line_of`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Location {
    pub fn file(file: &str) -> Self {
        Self {
            file: file.to_string(),
            line: None,
            column: None,
        }
    }

    pub fn line(file: &str, line: usize) -> Self {
        Self {
            file: file.to_string(),
            line: Some(line),
            column: None,
        }
    }
}

/// A single finding from an analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeIssue {
    /// Unique per detection: `{category}-{kind}-{uuid}`
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl CodeIssue {
    pub fn new(
        kind: &str,
        category: Category,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            id: format!("{}-{}-{}", category.slug(), kind, Uuid::new_v4().simple()),
            title: title.into(),
            description: description.into(),
            category,
            severity,
            location,
            snippet: None,
            remediation: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// Issue counts for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_issues: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub suggestion_count: usize,
    /// Every category is present, zero when it found nothing.
    pub issues_by_category: BTreeMap<Category, usize>,
}

impl AnalysisSummary {
    pub fn from_issues(issues: &[CodeIssue]) -> Self {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let issues_by_category = Category::ALL
            .iter()
            .map(|&c| (c, issues.iter().filter(|i| i.category == c).count()))
            .collect();

        Self {
            total_issues: issues.len(),
            critical_count: count(Severity::Critical),
            warning_count: count(Severity::Warning),
            suggestion_count: count(Severity::Suggestion),
            issues_by_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub analyzed_at: DateTime<Utc>,
    /// Wall-clock milliseconds spent running the analyzers
    pub duration: u64,
}

/// Output of `analysis::analyze_pull_request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub pr_id: PrId,
    pub issues: Vec<CodeIssue>,
    pub summary: AnalysisSummary,
    pub metadata: AnalysisMetadata,
}

/// A review comment anchored to a file line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineComment {
    pub file: String,
    pub line: usize,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    /// Id of the `CodeIssue` this comment was built from
    pub suggestion_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub critical: usize,
    pub warning: usize,
    pub suggestion: usize,
    pub total: usize,
}

/// Inline comments for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub issues: IssueStats,
    pub comments: Vec<InlineComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopIssue {
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub pr_id: PrId,
    pub title: String,
    /// 0-100, see `feedback::score`
    pub overall_score: u32,
    pub issue_stats: IssueStats,
    pub top_issues: Vec<TopIssue>,
    pub file_reports: Vec<FileReport>,
    /// RFC 3339 timestamp of the analysis
    pub analysis_time: String,
    pub duration: u64,
}

/// Everything the review produces for one pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub inline_comments: Vec<InlineComment>,
    pub summary_report: SummaryReport,
    pub markdown_summary: String,
}
