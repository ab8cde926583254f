use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use super::scan::line_of;
use super::Analyzer;
use crate::pr::FileChange;
use crate::report::types::{Category, CodeIssue, Location, Severity};

static MIXED_CASE_DECLARATION: OnceLock<Regex> = OnceLock::new();
static CONSOLE_STATEMENT: OnceLock<Regex> = OnceLock::new();
static NUMBER_LITERAL: OnceLock<Regex> = OnceLock::new();

fn mixed_case_declaration() -> &'static Regex {
    MIXED_CASE_DECLARATION.get_or_init(|| {
        Regex::new(r"\b(let|const|var)\s+([a-z]+[A-Z][a-z]*|[A-Z][a-z]*[A-Z])")
            .expect("valid naming regex")
    })
}

fn console_statement() -> &'static Regex {
    CONSOLE_STATEMENT.get_or_init(|| {
        Regex::new(r"console\.(log|debug|info|warn|error)\(").expect("valid console regex")
    })
}

fn number_literal() -> &'static Regex {
    NUMBER_LITERAL.get_or_init(|| Regex::new(r"[2-9][0-9]*").expect("valid number regex"))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Integer literals of 2 or more that stand alone: not glued to a word
/// character on either side, so `x2`, `v8engine` and the `5` in `15` are skipped.
fn magic_numbers(content: &str) -> impl Iterator<Item = &str> {
    let bytes = content.as_bytes();
    number_literal().find_iter(content).filter_map(move |m| {
        let before = m.start().checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(m.end()).copied();
        if before.is_some_and(is_word_byte) || after.is_some_and(is_word_byte) {
            None
        } else {
            Some(m.as_str())
        }
    })
}

/// Code Style Analyzer
///
/// Flags unusual capitalization in declarations, leftover console
/// statements, and magic numbers. Intentionally coarse: every standalone
/// integer of 2 or more counts as a magic number.
pub struct CodeStyleAnalyzer;

impl CodeStyleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_naming(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        mixed_case_declaration()
            .find_iter(content)
            .map(|m| {
                CodeIssue::new(
                    "inconsistent-naming",
                    Category::CodeStyle,
                    Severity::Suggestion,
                    "Inconsistent Variable Naming",
                    "Variable names should follow a consistent naming convention",
                    Location::line(&file.filename, line_of(content, m.as_str())),
                )
                .with_snippet(m.as_str())
                .with_remediation(
                    "Use camelCase for variables and functions, PascalCase for classes and interfaces",
                )
            })
            .collect()
    }

    fn check_console_statements(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        console_statement()
            .find_iter(content)
            .map(|m| {
                CodeIssue::new(
                    "console-statement",
                    Category::CodeStyle,
                    Severity::Suggestion,
                    "Console Statement",
                    "Console statements should not be committed to production code",
                    Location::line(&file.filename, line_of(content, m.as_str())),
                )
                .with_snippet(m.as_str())
                .with_remediation("Remove console statements or use a proper logging library")
            })
            .collect()
    }

    fn check_magic_numbers(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        magic_numbers(content)
            .map(|number| {
                CodeIssue::new(
                    "magic-number",
                    Category::CodeStyle,
                    Severity::Suggestion,
                    "Magic Number",
                    "Magic numbers make code harder to understand and maintain",
                    Location::line(&file.filename, line_of(content, number)),
                )
                .with_snippet(number)
                .with_remediation("Replace magic numbers with named constants")
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for CodeStyleAnalyzer {
    fn name(&self) -> &str {
        "Code Style Analysis"
    }

    fn category(&self) -> Category {
        Category::CodeStyle
    }

    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue> {
        let mut issues = Vec::new();
        for file in files {
            issues.extend(self.check_naming(file));
            issues.extend(self.check_console_statements(file));
            issues.extend(self.check_magic_numbers(file));
        }
        issues
    }
}
