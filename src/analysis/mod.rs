pub mod architecture;
pub mod maintainability;
pub mod performance;
pub mod scan;
pub mod security;
pub mod style;

use async_trait::async_trait;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

use crate::pr::{self, FileChange, PullRequestPayload};
use crate::report::types::{AnalysisMetadata, AnalysisResult, AnalysisSummary, Category, CodeIssue};

/// Core trait that all category analyzers implement.
/// Analyzers hold no mutable state and must be Send + Sync to run concurrently via tokio::join!.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Human-readable name of this analyzer (e.g., "Security Analysis")
    fn name(&self) -> &str;

    /// Category assigned to every issue this analyzer reports.
    fn category(&self) -> Category;

    /// Scan the changed files and return issues in detection order.
    /// Missing file content is scanned as an empty string.
    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue>;
}

/// Run all five analyzers concurrently over the payload's changed files.
///
/// Issues are concatenated in a fixed order: security, performance, code
/// style, maintainability, architecture.
pub async fn analyze_pull_request(payload: &PullRequestPayload) -> AnalysisResult {
    let started = Instant::now();
    info!(
        pr = %payload.id,
        repository = %payload.repository,
        branch = %payload.branch,
        files = payload.changes.len(),
        "starting analysis"
    );

    let files = pr::extract_code(payload);

    let security = security::SecurityAnalyzer::new();
    let performance = performance::PerformanceAnalyzer::new();
    let style = style::CodeStyleAnalyzer::new();
    let maintainability = maintainability::MaintainabilityAnalyzer::new();
    let architecture = architecture::ArchitectureAnalyzer::new();

    let (sec, perf, sty, maint, arch) = tokio::join!(
        security.analyze(files).instrument(info_span!("analyze", analyzer = "security")),
        performance.analyze(files).instrument(info_span!("analyze", analyzer = "performance")),
        style.analyze(files).instrument(info_span!("analyze", analyzer = "style")),
        maintainability
            .analyze(files)
            .instrument(info_span!("analyze", analyzer = "maintainability")),
        architecture.analyze(files).instrument(info_span!("analyze", analyzer = "architecture")),
    );

    let analyzers: [&dyn Analyzer; 5] = [&security, &performance, &style, &maintainability, &architecture];
    let batches = [sec, perf, sty, maint, arch];
    for (analyzer, batch) in analyzers.iter().zip(&batches) {
        debug!(
            analyzer = analyzer.name(),
            category = %analyzer.category(),
            issues = batch.len(),
            "analyzer result"
        );
    }

    let issues: Vec<CodeIssue> = batches.into_iter().flatten().collect();
    let summary = AnalysisSummary::from_issues(&issues);
    let duration = started.elapsed().as_millis() as u64;

    info!(
        pr = %payload.id,
        issues = summary.total_issues,
        critical = summary.critical_count,
        duration_ms = duration,
        "completed analysis"
    );

    AnalysisResult {
        pr_id: payload.id.clone(),
        issues,
        summary,
        metadata: AnalysisMetadata {
            analyzed_at: Utc::now(),
            duration,
        },
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::pr::{FileStatus, PrId};
    use crate::report::types::Severity;

    /// Helper to create a minimal payload for testing.
    pub fn test_payload(changes: Vec<FileChange>) -> PullRequestPayload {
        PullRequestPayload {
            id: PrId::Number(1),
            title: "Test PR".to_string(),
            description: None,
            branch: "feature/test".to_string(),
            base: "main".to_string(),
            repository: "owner/repo".to_string(),
            author: "testuser".to_string(),
            changes,
        }
    }

    /// Helper to create a modified file with the given content.
    pub fn test_file(filename: &str, content: &str) -> FileChange {
        FileChange {
            filename: filename.to_string(),
            content: Some(content.to_string()),
            patch: None,
            status: FileStatus::Modified,
        }
    }

    /// Everything about an issue except its random id.
    pub fn fingerprint(issues: &[CodeIssue]) -> Vec<(String, Severity, Category, String, Option<usize>)> {
        issues
            .iter()
            .map(|i| {
                (
                    i.title.clone(),
                    i.severity,
                    i.category,
                    i.location.file.clone(),
                    i.location.line,
                )
            })
            .collect()
    }

    fn sample_payload() -> PullRequestPayload {
        crate::pr::parse_payload(include_str!("../../tests/fixtures/sample_payload.json")).unwrap()
    }

    #[tokio::test]
    async fn test_empty_pr_has_no_issues() {
        let result = analyze_pull_request(&test_payload(vec![])).await;
        assert_eq!(result.summary.total_issues, 0);
        assert!(result.issues.is_empty());
        assert_eq!(result.summary.issues_by_category.len(), 5);
        assert_eq!(crate::report::feedback::score(0, 0, 0), 100);
    }

    #[tokio::test]
    async fn test_summary_invariants_hold() {
        let result = analyze_pull_request(&sample_payload()).await;
        let s = &result.summary;
        assert!(s.total_issues > 0);
        assert_eq!(s.total_issues, result.issues.len());
        assert_eq!(s.critical_count + s.warning_count + s.suggestion_count, s.total_issues);
        assert_eq!(s.issues_by_category.values().sum::<usize>(), s.total_issues);
        for category in Category::ALL {
            let n = result.issues.iter().filter(|i| i.category == category).count();
            assert_eq!(s.issues_by_category[&category], n);
        }
        assert_eq!(result.pr_id, PrId::Number(123));
    }

    #[tokio::test]
    async fn test_issues_come_in_category_order() {
        let result = analyze_pull_request(&sample_payload()).await;
        let categories: Vec<Category> = result.issues.iter().map(|i| i.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }

    #[tokio::test]
    async fn test_sample_payload_flags_expected_issues() {
        let result = analyze_pull_request(&sample_payload()).await;
        let has = |title: &str, severity: Severity| {
            result.issues.iter().any(|i| i.title == title && i.severity == severity)
        };
        assert!(has("Hardcoded API Key", Severity::Critical));
        assert!(has("Potential SQL Injection", Severity::Critical));
        assert!(has("Nested Loop Detected", Severity::Warning));
        assert!(has("Architectural Layer Violation", Severity::Warning));
    }

    #[tokio::test]
    async fn test_repeated_runs_match_except_ids() {
        let payload = sample_payload();
        let first = analyze_pull_request(&payload).await;
        let second = analyze_pull_request(&payload).await;
        assert_eq!(fingerprint(&first.issues), fingerprint(&second.issues));
        assert_eq!(first.summary, second.summary);
    }

    #[tokio::test]
    async fn test_file_without_content_is_tolerated() {
        let file = FileChange {
            filename: "src/deleted.ts".to_string(),
            content: None,
            patch: None,
            status: FileStatus::Removed,
        };
        let result = analyze_pull_request(&test_payload(vec![file])).await;
        assert_eq!(result.summary.total_issues, 0);
    }
}
