use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use super::scan::{block_end, line_count, line_of, max_depth, outermost_block};
use super::Analyzer;
use crate::pr::FileChange;
use crate::report::types::{Category, CodeIssue, Location, Severity};

/// Brace depth above which a file is reported as deeply nested.
pub const MAX_NESTING_DEPTH: isize = 4;
/// Line count above which a function is reported as long.
pub const MAX_FUNCTION_LINES: usize = 15;
/// Minimum characters between the outer braces for a block to be inspected.
pub const LONG_BLOCK_MIN_CHARS: usize = 500;
/// Statement terminators above which an inspected block is reported.
pub const MAX_BLOCK_STATEMENTS: usize = 15;

static FUNCTION_DECLARATION: OnceLock<Regex> = OnceLock::new();
static TECH_DEBT_COMMENT: OnceLock<Regex> = OnceLock::new();

fn function_declaration() -> &'static Regex {
    FUNCTION_DECLARATION
        .get_or_init(|| Regex::new(r"function\s+\w+\s*\([^)]*\)").expect("valid function regex"))
}

fn tech_debt_comment() -> &'static Regex {
    TECH_DEBT_COMMENT
        .get_or_init(|| Regex::new(r"//\s*(TODO|FIXME|HACK|XXX)").expect("valid tech debt regex"))
}

/// Maintainability Analyzer
///
/// Flags:
/// - files whose brace nesting exceeds `MAX_NESTING_DEPTH` (one issue per file, no line)
/// - `function name(...)` declarations longer than `MAX_FUNCTION_LINES`
/// - large blocks with more than `MAX_BLOCK_STATEMENTS` semicolons
/// - TODO / FIXME / HACK / XXX line comments
pub struct MaintainabilityAnalyzer;

impl MaintainabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_nesting_depth(&self, file: &FileChange) -> Option<CodeIssue> {
        let depth = max_depth(file.content());
        if depth <= MAX_NESTING_DEPTH {
            return None;
        }
        Some(
            CodeIssue::new(
                "nesting-depth",
                Category::Maintainability,
                Severity::Warning,
                "Deep Nesting",
                format!("Code has a nesting depth of {}", depth),
                Location::file(&file.filename),
            )
            .with_remediation(
                "Refactor code to reduce nesting by extracting functions or using early returns",
            ),
        )
    }

    /// The body runs from the first occurrence of the declaration text to its
    /// matching closing brace. An unclosed body counts as the declaration alone.
    fn check_long_functions(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        let mut issues = Vec::new();
        for m in function_declaration().find_iter(content) {
            let decl = m.as_str();
            let Some(start) = content.find(decl) else {
                continue;
            };
            let end = block_end(content, start + decl.len()).unwrap_or(start + decl.len());
            let lines = line_count(&content[start..end]);
            if lines > MAX_FUNCTION_LINES {
                issues.push(
                    CodeIssue::new(
                        "long-function",
                        Category::Maintainability,
                        Severity::Warning,
                        "Long Function",
                        format!("Function is {} lines long", lines),
                        Location::line(&file.filename, line_of(content, decl)),
                    )
                    .with_remediation(
                        "Break down long functions into smaller, more focused functions",
                    ),
                );
            }
        }
        issues
    }

    fn check_long_code_blocks(&self, file: &FileChange) -> Option<CodeIssue> {
        let content = file.content();
        let block = outermost_block(content, LONG_BLOCK_MIN_CHARS)?;
        let statements = block.matches(';').count();
        if statements <= MAX_BLOCK_STATEMENTS {
            return None;
        }
        let head: String = block.chars().take(30).collect();
        Some(
            CodeIssue::new(
                "long-code-block",
                Category::Maintainability,
                Severity::Warning,
                "Long Code Block",
                format!("Code block contains {} statements", statements),
                Location::line(&file.filename, line_of(content, &head)),
            )
            .with_remediation("Break down long code blocks into smaller, more focused functions"),
        )
    }

    fn check_tech_debt(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        tech_debt_comment()
            .find_iter(content)
            .map(|m| {
                CodeIssue::new(
                    "tech-debt",
                    Category::Maintainability,
                    Severity::Suggestion,
                    "Technical Debt Marker",
                    "Comment indicates technical debt",
                    Location::line(&file.filename, line_of(content, m.as_str())),
                )
                .with_snippet(m.as_str())
                .with_remediation("Address technical debt or create a ticket to track it")
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for MaintainabilityAnalyzer {
    fn name(&self) -> &str {
        "Maintainability Analysis"
    }

    fn category(&self) -> Category {
        Category::Maintainability
    }

    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue> {
        let mut issues = Vec::new();
        for file in files {
            issues.extend(self.check_nesting_depth(file));
            issues.extend(self.check_long_functions(file));
            issues.extend(self.check_long_code_blocks(file));
            issues.extend(self.check_tech_debt(file));
        }
        issues
    }
}
