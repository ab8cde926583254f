use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use super::Analyzer;
use crate::pr::FileChange;
use crate::report::types::{Category, CodeIssue, Location, Severity};

/// Architectural layer a file belongs to, judged from its path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Data,
    Controller,
    Service,
    View,
    Utility,
    Unknown,
}

impl Layer {
    pub fn classify(path: &str) -> Self {
        fn has(path: &str, dirs: &[&str]) -> bool {
            dirs.iter().any(|d| path.contains(d))
        }
        if has(path, &["/models/", "/entities/"]) {
            Layer::Data
        } else if has(path, &["/controllers/", "/handlers/"]) {
            Layer::Controller
        } else if has(path, &["/services/"]) {
            Layer::Service
        } else if has(path, &["/views/", "/components/"]) {
            Layer::View
        } else if has(path, &["/utils/", "/helpers/"]) {
            Layer::Utility
        } else {
            Layer::Unknown
        }
    }
}

/// Path with a trailing `.ext` removed, e.g. "src/a/user.ts" -> "src/a/user".
fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(idx)
            if idx + 1 < path.len()
                && path[idx + 1..].bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') =>
        {
            &path[..idx]
        }
        _ => path,
    }
}

/// Whether `content` imports or requires something ending in `stem`.
fn imports(content: &str, stem: &str) -> bool {
    let stem = regex::escape(stem);
    let patterns = [
        format!(r#"(?i)import.*from\s+['"].*{}['"]"#, stem),
        format!(r#"(?i)require\(['"].*{}['"]\)"#, stem),
    ];
    patterns.iter().any(|p| match Regex::new(p) {
        Ok(re) => re.is_match(content),
        Err(e) => {
            warn!(pattern = %p, error = %e, "skipping import pattern");
            false
        }
    })
}

/// Architecture Analyzer
///
/// Classifies each changed file into a layer by path and flags data access
/// in controllers, view code in services, and pairs of changed files that
/// depend on each other.
pub struct ArchitectureAnalyzer;

impl ArchitectureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_layer_violations(&self, file: &FileChange, layer: Layer) -> Option<CodeIssue> {
        let content = file.content();
        match layer {
            Layer::Controller
                if ["new Model", ".findOne", ".save()"].iter().any(|s| content.contains(s)) =>
            {
                Some(
                    CodeIssue::new(
                        "layer-violation",
                        Category::Architecture,
                        Severity::Warning,
                        "Architectural Layer Violation",
                        "Direct data access in controller layer",
                        Location::file(&file.filename),
                    )
                    .with_remediation(
                        "Move data access code to the service layer or repository layer",
                    ),
                )
            }
            Layer::Service if ["render", "template", "html"].iter().any(|s| content.contains(s)) => {
                Some(
                    CodeIssue::new(
                        "view-in-service",
                        Category::Architecture,
                        Severity::Warning,
                        "View Logic in Service",
                        "View-related code found in service layer",
                        Location::file(&file.filename),
                    )
                    .with_remediation("Move view logic to appropriate view/template layer"),
                )
            }
            _ => None,
        }
    }

    /// Reports `file` once for every other changed file that it imports and
    /// whose content mentions `file`'s path stem. Quadratic in the number of
    /// changed files.
    fn check_circular_dependencies(&self, file: &FileChange, files: &[FileChange]) -> Vec<CodeIssue> {
        let content = file.content();
        let own_stem = strip_extension(&file.filename);
        files
            .iter()
            .filter(|other| other.filename != file.filename)
            .filter(|other| {
                imports(content, strip_extension(&other.filename)) && other.content().contains(own_stem)
            })
            .map(|other| {
                CodeIssue::new(
                    "circular-dependency",
                    Category::Architecture,
                    Severity::Warning,
                    "Circular Dependency",
                    format!(
                        "Circular dependency between {} and {}",
                        file.filename, other.filename
                    ),
                    Location::file(&file.filename),
                )
                .with_remediation(
                    "Refactor code to break the circular dependency, possibly by extracting common code to a third module",
                )
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for ArchitectureAnalyzer {
    fn name(&self) -> &str {
        "Architecture Analysis"
    }

    fn category(&self) -> Category {
        Category::Architecture
    }

    async fn analyze(&self, files: &[FileChange]) -> Vec<CodeIssue> {
        let mut issues = Vec::new();
        for file in files {
            let layer = Layer::classify(&file.filename);
            issues.extend(self.check_layer_violations(file, layer));
            issues.extend(self.check_circular_dependencies(file, files));
        }
        issues
    }
}
