use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use super::scan::{brace_delta, line_of};
use super::Analyzer;
use crate::pr::FileChange;
use crate::report::types::{Category, CodeIssue, Location, Severity};

/// Estimated property count at which an object literal is reported.
pub const LARGE_OBJECT_PROPERTIES: usize = 10;

static NESTED_LOOP: OnceLock<Regex> = OnceLock::new();
static CHAINED_ARRAY_METHODS: OnceLock<Regex> = OnceLock::new();
static LINE_COMMENT: OnceLock<Regex> = OnceLock::new();
static CONST_OBJECT_OPEN: OnceLock<Regex> = OnceLock::new();

/// A `for (...)` header followed, before the first closing brace, by another one.
fn nested_loop() -> &'static Regex {
    NESTED_LOOP.get_or_init(|| {
        Regex::new(r"for\s*\([^{]*\)\s*\{[^}]*for\s*\([^{]*\)").expect("valid nested loop regex")
    })
}

fn chained_array_methods() -> &'static Regex {
    CHAINED_ARRAY_METHODS.get_or_init(|| {
        Regex::new(
            r"\.(map|filter|forEach|reduce|find|some|every)\s*\([^)]*\)\s*\.(map|filter|forEach|reduce|find|some|every)",
        )
        .expect("valid chained method regex")
    })
}

fn line_comment() -> &'static Regex {
    LINE_COMMENT.get_or_init(|| Regex::new(r"(?m)//.*$").expect("valid comment regex"))
}

fn const_object_open() -> &'static Regex {
    CONST_OBJECT_OPEN.get_or_init(|| Regex::new(r"const\s+\w+\s*=\s*\{").expect("valid object regex"))
}

/// Performance Analyzer
///
/// Flags nested `for` loops, chains of array methods that each allocate an
/// intermediate array, and `const` object literals with many properties.
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_nested_loops(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        nested_loop()
            .find_iter(content)
            .map(|m| {
                CodeIssue::new(
                    "nested-loop",
                    Category::Performance,
                    Severity::Warning,
                    "Nested Loop Detected",
                    "Nested loops can lead to O(n²) time complexity",
                    Location::line(&file.filename, line_of(content, m.as_str())),
                )
                .with_snippet(m.as_str())
                .with_remediation(
                    "Consider alternatives like using hash maps or optimizing the algorithm",
                )
            })
            .collect()
    }

    /// Chains may span lines, so matching runs over the file joined into one
    /// line and each match is mapped back by searching for its first 20 characters.
    fn check_chained_array_methods(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        let lines: Vec<&str> = content.split('\n').collect();
        let joined = lines.join(" ");

        chained_array_methods()
            .find_iter(&joined)
            .map(|m| {
                let text = m.as_str();
                let head: String = text.chars().take(20).collect();
                let line = match lines.iter().position(|l| l.contains(head.as_str())) {
                    Some(idx) => idx + 1,
                    None => {
                        let short: String = text.chars().take(10).collect();
                        line_of(content, &short)
                    }
                };
                CodeIssue::new(
                    "chained-array-methods",
                    Category::Performance,
                    Severity::Warning,
                    "Chained Array Methods",
                    "Multiple chained array methods create unnecessary intermediate arrays",
                    Location::line(&file.filename, line),
                )
                .with_snippet(text)
                .with_remediation(
                    "Consider combining operations into a single method or using a for loop",
                )
            })
            .collect()
    }

    /// Property count is estimated as commas + 1 over the whole declaration,
    /// line comments excluded.
    fn check_large_object_literals(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        let stripped = line_comment().replace_all(content, "");

        let mut declarations: Vec<String> = Vec::new();
        let mut current: Option<(String, isize)> = None;
        for line in stripped.split('\n') {
            current = match current.take() {
                None if const_object_open().is_match(line) => {
                    let depth = brace_delta(line);
                    // balanced on its opening line: complete, the next line is not appended
                    if depth <= 0 {
                        declarations.push(line.to_string());
                        None
                    } else {
                        Some((line.to_string(), depth))
                    }
                }
                None => None,
                Some((mut text, depth)) => {
                    text.push('\n');
                    text.push_str(line);
                    let depth = depth + brace_delta(line);
                    if depth == 0 {
                        declarations.push(text);
                        None
                    } else {
                        Some((text, depth))
                    }
                }
            };
        }

        declarations
            .iter()
            .filter_map(|decl| {
                let properties = decl.matches(',').count() + 1;
                if properties < LARGE_OBJECT_PROPERTIES {
                    return None;
                }
                let first_line = decl.split('\n').next().unwrap_or_default();
                Some(
                    CodeIssue::new(
                        "large-object",
                        Category::Performance,
                        Severity::Suggestion,
                        "Large Object Literal",
                        format!(
                            "Large object literal with approximately {} properties may impact performance and memory usage",
                            properties
                        ),
                        Location::line(&file.filename, line_of(content, first_line)),
                    )
                    .with_remediation(
                        "Consider breaking down large objects or lazy loading properties",
                    ),
                )
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for PerformanceAnalyzer {
    fn name(&self) -> &str {
        "Performance Analysis"
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue> {
        let mut issues = Vec::new();
        for file in files {
            issues.extend(self.check_nested_loops(file));
            issues.extend(self.check_chained_array_methods(file));
            issues.extend(self.check_large_object_literals(file));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::test_file;

    const PROCESSOR: &str = r#"function processData(items) {
  for (let i = 0; i < items.length; i++) {
    for (let j = 0; j < items.length; j++) {
      if (items[i] === items[j] && i !== j) {
        console.log('Duplicate found');
      }
    }
  }

  const result = items
    .map(x => x * 2)
    .filter(x => x > 10);

  const config = {
    option1: true,
    option2: false,
    option3: 'value3',
    option4: 123,
    option5: null,
    option6: undefined,
    option7: 'seven',
    option8: { nested: true },
    option9: new Date(),
    option10: /regex/,
    option11: true,
    option12: false
  };
}
"#;

    async fn run(content: &str) -> Vec<CodeIssue> {
        PerformanceAnalyzer::new()
            .analyze(&[test_file("src/utils/dataProcessor.ts", content)])
            .await
    }

    #[tokio::test]
    async fn test_detects_nested_loop() {
        let issues = run(PROCESSOR).await;
        let nested: Vec<_> = issues.iter().filter(|i| i.title == "Nested Loop Detected").collect();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].severity, Severity::Warning);
        assert_eq!(nested[0].location.line, Some(2));
    }

    #[tokio::test]
    async fn test_single_loop_is_fine() {
        let issues = run("for (let i = 0; i < n; i++) {\n  total += i;\n}\n").await;
        assert!(issues.iter().all(|i| i.title != "Nested Loop Detected"));
    }

    #[tokio::test]
    async fn test_detects_chained_methods_across_lines() {
        let issues = run(PROCESSOR).await;
        let chained: Vec<_> = issues.iter().filter(|i| i.title == "Chained Array Methods").collect();
        assert_eq!(chained.len(), 1);
        // the 20-char head spans the line join, so the 10-char fallback locates it
        assert_eq!(chained[0].location.line, Some(11));
    }

    #[tokio::test]
    async fn test_chained_methods_on_one_line() {
        let issues = run("const r = xs.filter(Boolean).map(String);").await;
        let chained: Vec<_> = issues.iter().filter(|i| i.title == "Chained Array Methods").collect();
        assert_eq!(chained.len(), 1);
        assert_eq!(chained[0].location.line, Some(1));
    }

    #[tokio::test]
    async fn test_detects_large_object_literal() {
        let issues = run(PROCESSOR).await;
        let large: Vec<_> = issues.iter().filter(|i| i.title == "Large Object Literal").collect();
        assert_eq!(large.len(), 1);
        assert_eq!(large[0].severity, Severity::Suggestion);
        assert_eq!(large[0].location.line, Some(14));
        assert!(large[0].description.contains("approximately 12 properties"));
    }

    #[tokio::test]
    async fn test_small_object_literal_is_fine() {
        let issues = run("const point = {\n  x: 1,\n  y: 2\n};\n").await;
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_commented_commas_are_ignored() {
        let content = "const a = {\n  x: 1, // ,,,,,,,,,,,,\n  y: 2\n};\n";
        assert!(run(content).await.is_empty());
    }

    #[tokio::test]
    async fn test_one_line_object_literal() {
        let issues = run("const o = { a: 1, b: 2, c: 3, d: 4, e: 5, f: 6, g: 7, h: 8, i: 9, j: 10 };").await;
        assert!(issues.iter().any(|i| i.title == "Large Object Literal"));
    }
}
