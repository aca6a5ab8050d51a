//! Shared data models for validation results, summaries and rule sets.
//!
//! JSON field names are camelCase because summaries are persisted as an
//! opaque blob next to the submission record and read back by clients.

pub mod rules;

use serde::{Deserialize, Serialize};

/// Upper bound of every per-file score.
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// File type selected once per path and matched to pick a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Html,
    Css,
    Js,
    Other,
}

impl FileKind {
    /// Classify by the lowercase text after the last `.` of the path.
    pub fn from_path(path: &str) -> Self {
        match extension_of(path).as_deref() {
            Some("html") => FileKind::Html,
            Some("css") => FileKind::Css,
            Some("js") => FileKind::Js,
            _ => FileKind::Other,
        }
    }
}

/// Lowercase extension of a path, or `None` when it contains no dot.
pub fn extension_of(path: &str) -> Option<String> {
    path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One diagnostic at a specific source position.
pub struct LintIssue {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub rule: String,
}

impl LintIssue {
    pub fn new(line: usize, column: usize, message: impl Into<String>, rule: &str) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            rule: rule.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Validation outcome for a single file.
pub struct LintResult {
    pub file: String,
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
    pub score: u32,
    pub max_score: u32,
}

impl LintResult {
    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Aggregate validation outcome for all files of one submission.
pub struct ValidationSummary {
    pub total_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub overall_score: u32,
    pub results: Vec<LintResult>,
    pub html_validation: bool,
    pub css_validation: bool,
    pub js_validation: bool,
}

impl ValidationSummary {
    /// Freeze collected per-file results into a summary.
    ///
    /// `overall_score` is the rounded mean of file scores, 0 when nothing was
    /// validated. Type flags are derived from the results themselves.
    pub fn from_results(results: Vec<LintResult>) -> Self {
        let total_errors = results.iter().map(|r| r.errors.len()).sum();
        let total_warnings = results.iter().map(|r| r.warnings.len()).sum();
        let overall_score = if results.is_empty() {
            0
        } else {
            let sum: u64 = results.iter().map(|r| u64::from(r.score)).sum();
            let n = results.len() as u64;
            // round half up, as the scores are never negative
            ((2 * sum + n) / (2 * n)) as u32
        };
        let has = |kind: FileKind| results.iter().any(|r| FileKind::from_path(&r.file) == kind);
        Self {
            total_files: results.len(),
            total_errors,
            total_warnings,
            overall_score,
            html_validation: has(FileKind::Html),
            css_validation: has(FileKind::Css),
            js_validation: has(FileKind::Js),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A decoded archive entry, consumed immediately by the orchestrator.
pub struct ExtractedFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Persisted check result attached to a submission.
pub struct CheckRecord {
    pub validation_results: ValidationSummary,
    pub report: String,
    pub validated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(file: &str, score: u32, errors: usize, warnings: usize) -> LintResult {
        LintResult {
            file: file.into(),
            errors: (0..errors).map(|i| LintIssue::new(i + 1, 1, "e", "r")).collect(),
            warnings: (0..warnings)
                .map(|i| LintIssue::new(i + 1, 1, "w", "r"))
                .collect(),
            score,
            max_score: MAX_SCORE,
        }
    }

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path("index.HTML"), FileKind::Html);
        assert_eq!(FileKind::from_path("css/site.css"), FileKind::Css);
        assert_eq!(FileKind::from_path("app.min.js"), FileKind::Js);
        assert_eq!(FileKind::from_path("logo.png"), FileKind::Other);
        assert_eq!(FileKind::from_path("README.md"), FileKind::Other);
        assert_eq!(FileKind::from_path("js"), FileKind::Other);
        assert_eq!(FileKind::from_path("app.json"), FileKind::Other);
    }

    #[test]
    fn test_summary_of_empty_results_scores_zero() {
        let s = ValidationSummary::from_results(Vec::new());
        assert_eq!(s.overall_score, 0);
        assert_eq!(s.total_files, 0);
        assert!(!s.html_validation && !s.css_validation && !s.js_validation);
    }

    #[test]
    fn test_summary_mean_is_rounded() {
        let s = ValidationSummary::from_results(vec![result("a.js", 100, 0, 0), result("b.css", 80, 1, 1)]);
        assert_eq!(s.overall_score, 90);
        let s = ValidationSummary::from_results(vec![result("a.js", 90, 0, 0), result("b.js", 85, 0, 0)]);
        // 87.5 rounds up
        assert_eq!(s.overall_score, 88);
        let s = ValidationSummary::from_results(vec![
            result("a.js", 100, 0, 0),
            result("b.js", 100, 0, 0),
            result("c.js", 99, 0, 0),
        ]);
        assert_eq!(s.overall_score, 100);
    }

    #[test]
    fn test_summary_totals_match_results() {
        let s = ValidationSummary::from_results(vec![
            result("index.html", 70, 2, 5),
            result("site.css", 91, 0, 3),
        ]);
        assert_eq!(s.total_files, 2);
        assert_eq!(s.total_errors, 2);
        assert_eq!(s.total_warnings, 8);
        assert!(s.html_validation && s.css_validation && !s.js_validation);
    }

    #[test]
    fn test_summary_json_uses_camel_case() {
        let s = ValidationSummary::from_results(vec![result("a.js", 96, 0, 1)]);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["totalFiles"], 1);
        assert_eq!(v["overallScore"], 96);
        assert_eq!(v["jsValidation"], true);
        assert_eq!(v["results"][0]["maxScore"], 100);
        assert_eq!(v["results"][0]["warnings"][0]["column"], 1);
        let back: ValidationSummary = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }
}
