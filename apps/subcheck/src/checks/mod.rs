//! Per-file-type validators.
//!
//! Each validator owns an immutable `RuleSet` and a rule engine that turns
//! `(filename, content)` into findings. The engine may fail with
//! `EngineFailure`; `FileValidator::validate` always converts that into data
//! (a single `validation-error` issue at 1:1 and score 0), so callers only
//! ever see a `LintResult`.

pub mod css;
pub mod html;
pub mod js;

use crate::error::EngineFailure;
use crate::models::rules::RuleSet;
use crate::models::{FileKind, LintIssue, LintResult, Severity, MAX_SCORE};
use tracing::{debug, warn};

/// Rule id used for synthesized engine-failure issues.
pub const VALIDATION_ERROR_RULE: &str = "validation-error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Points deducted per issue from `MAX_SCORE`.
pub struct Penalty {
    pub error: u32,
    pub warning: u32,
}

impl Penalty {
    /// `max(0, 100 - error*E - warning*W)`.
    pub fn score(&self, errors: usize, warnings: usize) -> u32 {
        let lost = (errors as u64)
            .saturating_mul(u64::from(self.error))
            .saturating_add((warnings as u64).saturating_mul(u64::from(self.warning)));
        u64::from(MAX_SCORE).saturating_sub(lost) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub issue: LintIssue,
}

/// Collects findings for enabled rules only, with the severity the rule set
/// assigns.
pub struct Reporter<'a> {
    rules: &'a RuleSet,
    findings: Vec<Finding>,
}

impl<'a> Reporter<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            findings: Vec::new(),
        }
    }

    pub fn enabled(&self, rule: &str) -> bool {
        self.rules.is_enabled(rule)
    }

    pub fn report(&mut self, rule: &str, line: usize, column: usize, message: impl Into<String>) {
        if let Some(severity) = self.rules.severity(rule) {
            self.findings.push(Finding {
                severity,
                issue: LintIssue::new(line, column, message, rule),
            });
        }
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

pub trait FileValidator: Send + Sync {
    fn kind(&self) -> FileKind;

    fn penalty(&self) -> Penalty;

    /// Prefix of the synthesized message when the engine fails.
    fn failure_label(&self) -> &'static str;

    /// Run the rule engine over the content.
    fn lint(&self, content: &str) -> Result<Vec<Finding>, EngineFailure>;

    /// Validate one file. Never fails.
    fn validate(&self, file: &str, content: &str) -> LintResult {
        let result = finish(file, self.lint(content), self.penalty(), self.failure_label());
        debug!(file, score = result.score, errors = result.errors.len(), warnings = result.warnings.len(), "validated");
        result
    }
}

/// Turn the engine outcome into a `LintResult`: findings are ordered by
/// position and split by severity; a failure becomes one synthetic error.
pub fn finish(
    file: &str,
    outcome: Result<Vec<Finding>, EngineFailure>,
    penalty: Penalty,
    failure_label: &str,
) -> LintResult {
    match outcome {
        Ok(mut findings) => {
            findings.sort_by_key(|f| (f.issue.line, f.issue.column));
            let (errs, warns): (Vec<_>, Vec<_>) = findings
                .into_iter()
                .partition(|f| f.severity == Severity::Error);
            let errors: Vec<LintIssue> = errs.into_iter().map(|f| f.issue).collect();
            let warnings: Vec<LintIssue> = warns.into_iter().map(|f| f.issue).collect();
            let score = penalty.score(errors.len(), warnings.len());
            LintResult {
                file: file.to_string(),
                errors,
                warnings,
                score,
                max_score: MAX_SCORE,
            }
        }
        Err(failure) => {
            warn!(file, reason = %failure, "rule engine failed; recording validation error");
            LintResult {
                file: file.to_string(),
                errors: vec![LintIssue::new(
                    1,
                    1,
                    format!("{} validation failed: {}", failure_label, failure),
                    VALIDATION_ERROR_RULE,
                )],
                warnings: Vec::new(),
                score: 0,
                max_score: MAX_SCORE,
            }
        }
    }
}
