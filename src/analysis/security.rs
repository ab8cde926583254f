use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use super::scan::line_of;
use super::Analyzer;
use crate::pr::FileChange;
use crate::report::types::{Category, CodeIssue, Location, Severity};

static SECRET_PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
static SQL_INJECTION: OnceLock<Regex> = OnceLock::new();
static XSS: OnceLock<Regex> = OnceLock::new();

/// Keyword assigned to a quoted literal, optionally quoted itself (object keys).
fn secret_patterns() -> &'static [(Regex, &'static str)] {
    SECRET_PATTERNS.get_or_init(|| {
        [
            ("password", "Hardcoded Password"),
            ("api_?key", "Hardcoded API Key"),
            ("secret", "Hardcoded Secret"),
            ("token", "Hardcoded Token"),
        ]
        .into_iter()
        .map(|(keyword, title)| {
            let pattern = format!(r#"(?i)['"]?{}['"]?\s*[:=]\s*['"][^'"]+['"]"#, keyword);
            (Regex::new(&pattern).expect("valid secret regex"), title)
        })
        .collect()
    })
}

fn sql_injection() -> &'static Regex {
    SQL_INJECTION.get_or_init(|| {
        Regex::new(r#"(?i)\b(sql|query)\s*[=:]\s*['"`].*(\$\{.*\}|\s*\+\s*\w+\s*\+\s*).*['"`]"#)
            .expect("valid sql regex")
    })
}

fn xss() -> &'static Regex {
    XSS.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(innerHTML|outerHTML|document\.write|document\.body\.innerHTML)\s*[=:]\s*(['"`].*(\$\{.*\}|\s*\+\s*\w+\s*\+\s*).*['"`]|['"`].*['"`]\s*\+\s*\w+)"#,
        )
        .expect("valid xss regex")
    })
}

/// Security Analyzer
///
/// Flags, per file:
/// - hardcoded passwords, API keys, secrets and tokens (one issue per match)
/// - SQL built by interpolation or concatenation (at most one per file)
/// - HTML sinks fed by interpolation or concatenation (at most one per file)
pub struct SecurityAnalyzer;

impl SecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_hardcoded_secrets(&self, file: &FileChange) -> Vec<CodeIssue> {
        let content = file.content();
        let mut issues = Vec::new();
        for (pattern, title) in secret_patterns() {
            for m in pattern.find_iter(content) {
                issues.push(
                    CodeIssue::new(
                        "hardcoded",
                        Category::Security,
                        Severity::Critical,
                        *title,
                        "Found potential hardcoded secret in the code",
                        Location::line(&file.filename, line_of(content, m.as_str())),
                    )
                    .with_snippet(m.as_str())
                    .with_remediation(
                        "Use environment variables or a secure secrets manager instead of hardcoding secrets",
                    ),
                );
            }
        }
        issues
    }

    fn check_sql_injection(&self, file: &FileChange) -> Option<CodeIssue> {
        if !sql_injection().is_match(file.content()) {
            return None;
        }
        Some(
            CodeIssue::new(
                "sql-injection",
                Category::Security,
                Severity::Critical,
                "Potential SQL Injection",
                "String interpolation or concatenation in SQL queries can lead to SQL injection attacks",
                Location::file(&file.filename),
            )
            .with_remediation(
                "Use parameterized queries or prepared statements instead of string interpolation",
            ),
        )
    }

    fn check_xss(&self, file: &FileChange) -> Option<CodeIssue> {
        if !xss().is_match(file.content()) {
            return None;
        }
        Some(
            CodeIssue::new(
                "xss",
                Category::Security,
                Severity::Critical,
                "Potential XSS Vulnerability",
                "Directly inserting user input into HTML can lead to XSS attacks",
                Location::file(&file.filename),
            )
            .with_remediation(
                "Use textContent instead of innerHTML or sanitize input with a library like DOMPurify",
            ),
        )
    }
}

#[async_trait]
impl Analyzer for SecurityAnalyzer {
    fn name(&self) -> &str {
        "Security Analysis"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue> {
        let mut issues = Vec::new();
        for file in files {
            issues.extend(self.check_hardcoded_secrets(file));
            issues.extend(self.check_sql_injection(file));
            issues.extend(self.check_xss(file));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{fingerprint, test_file};

    const VULNERABLE: &str = r#"
      function login(username, password) {
        const query = "SELECT * FROM users WHERE username = '" + username + "' AND password = '" + password + "'";
        // Execute query
        const apiKey = "1234567890abcdef";
        const secretKey = "secret_abc123xyz";
        document.innerHTML = "<div>" + userInput + "</div>";
      }
    "#;

    async fn run(content: &str) -> Vec<CodeIssue> {
        SecurityAnalyzer::new()
            .analyze(&[test_file("src/auth/login.ts", content)])
            .await
    }

    #[tokio::test]
    async fn test_detects_hardcoded_api_key() {
        let issues = run(r#"const apiKey = "1234567890abcdef";"#).await;
        let key = issues
            .iter()
            .find(|i| i.title == "Hardcoded API Key")
            .expect("api key issue");
        assert_eq!(key.severity, Severity::Critical);
        assert_eq!(key.category, Category::Security);
        assert_eq!(key.location.line, Some(1));
        assert_eq!(key.snippet.as_deref(), Some(r#"apiKey = "1234567890abcdef""#));
    }

    #[tokio::test]
    async fn test_one_issue_per_secret_match() {
        let issues = run("const password = 'a';\nconst b = 1;\nconst PASSWORD = \"b\";").await;
        let passwords: Vec<_> = issues.iter().filter(|i| i.title == "Hardcoded Password").collect();
        assert_eq!(passwords.len(), 2);
        assert_eq!(passwords[0].location.line, Some(1));
        assert_eq!(passwords[1].location.line, Some(3));
    }

    #[tokio::test]
    async fn test_detects_quoted_object_keys() {
        let issues = run(r#"const config = { "token": "abc" };"#).await;
        assert!(issues.iter().any(|i| i.title == "Hardcoded Token"));
    }

    #[tokio::test]
    async fn test_detects_sql_injection_once_per_file() {
        let content = "const query = \"SELECT * FROM t WHERE a = \" + a + \" AND\";\nconst sql = `DELETE FROM t WHERE id = ${id}`;";
        let issues = run(content).await;
        let sql: Vec<_> = issues.iter().filter(|i| i.title == "Potential SQL Injection").collect();
        assert_eq!(sql.len(), 1);
        assert_eq!(sql[0].location.line, None);
    }

    #[tokio::test]
    async fn test_detects_xss() {
        let issues = run(VULNERABLE).await;
        assert!(issues.iter().any(|i| i.title == "Potential XSS Vulnerability"));
        assert!(issues.iter().any(|i| i.title == "Potential SQL Injection"));
        // "secretKey" is not followed by an assignment operator, only apiKey counts
        assert_eq!(issues.iter().filter(|i| i.title.starts_with("Hardcoded")).count(), 1);
        assert!(issues.iter().all(|i| i.severity == Severity::Critical));
    }

    #[tokio::test]
    async fn test_xss_reported_once_per_file() {
        let content = "el.innerHTML = \"<b>\" + name + \"</b>\";\nother.innerHTML = \"<i>\" + title + \"</i>\";";
        let issues = run(content).await;
        let xss: Vec<_> = issues.iter().filter(|i| i.title == "Potential XSS Vulnerability").collect();
        assert_eq!(xss.len(), 1);
        assert_eq!(xss[0].location.line, None);
    }

    #[tokio::test]
    async fn test_no_findings_on_clean_code() {
        let issues = run("function add(a, b) {\n  return a + b;\n}\n").await;
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(SecurityAnalyzer::new().analyze(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_idempotent() {
        let first = run(VULNERABLE).await;
        let second = run(VULNERABLE).await;
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }
}
