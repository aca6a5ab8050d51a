//! Validation orchestrator.
//!
//! Dispatches every `(path, content)` pair to the validator selected by its
//! `FileKind`, skips everything that is not html/css/js, and freezes the
//! per-file results into a `ValidationSummary`. Files are validated in
//! parallel; results keep the input order.

use crate::checks::css::{self, CssValidator};
use crate::checks::html::{self, HtmlValidator};
use crate::checks::js::{self, JsValidator};
use crate::checks::FileValidator;
use crate::config::RulesCfg;
use crate::models::rules::{RuleLevel, RuleSet};
use crate::models::{ExtractedFile, FileKind, ValidationSummary};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// The three per-type validators, each holding its own immutable rule set.
pub struct Validators {
    pub html: HtmlValidator,
    pub css: CssValidator,
    pub js: JsValidator,
}

impl Validators {
    pub fn new(html: HtmlValidator, css: CssValidator, js: JsValidator) -> Self {
        Self { html, css, js }
    }

    /// Build validators from the default rule sets with configured level
    /// overrides applied. Unknown rule ids are logged and ignored.
    pub fn configured(rules: &RulesCfg) -> Self {
        Self {
            html: HtmlValidator::new(apply("html", html::default_rules(), &rules.html)),
            css: CssValidator::new(apply("css", css::default_rules(), &rules.css)),
            js: JsValidator::new(apply("js", js::default_rules(), &rules.js)),
        }
    }

    pub fn for_kind(&self, kind: FileKind) -> Option<&dyn FileValidator> {
        match kind {
            FileKind::Html => Some(&self.html),
            FileKind::Css => Some(&self.css),
            FileKind::Js => Some(&self.js),
            FileKind::Other => None,
        }
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self::new(HtmlValidator::default(), CssValidator::default(), JsValidator::default())
    }
}

fn apply(kind: &str, defaults: RuleSet, overrides: &HashMap<String, RuleLevel>) -> RuleSet {
    let (rules, unknown) = defaults.with_overrides(overrides);
    for id in unknown {
        warn!(validator = kind, rule = %id, "ignoring override for unknown rule");
    }
    rules
}

/// Validate a set of files and aggregate the outcome.
///
/// Only `.html`, `.css` and `.js` paths are validated; a path that appears
/// more than once is validated for its first occurrence only.
pub fn validate_submission(files: &[ExtractedFile], validators: &Validators) -> ValidationSummary {
    let mut seen: HashSet<&str> = HashSet::new();
    let targets: Vec<(&ExtractedFile, &dyn FileValidator)> = files
        .iter()
        .filter(|f| seen.insert(f.path.as_str()))
        .filter_map(|f| validators.for_kind(FileKind::from_path(&f.path)).map(|v| (f, v)))
        .collect();

    let results = targets
        .par_iter()
        .map(|(f, v)| v.validate(&f.path, &f.content))
        .collect::<Vec<_>>();

    let summary = ValidationSummary::from_results(results);
    info!(
        files = summary.total_files,
        skipped = files.len() - summary.total_files,
        errors = summary.total_errors,
        warnings = summary.total_warnings,
        score = summary.overall_score,
        "validated submission"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::VALIDATION_ERROR_RULE;

    fn files(pairs: &[(&str, &str)]) -> Vec<ExtractedFile> {
        pairs
            .iter()
            .map(|(p, c)| ExtractedFile {
                path: p.to_string(),
                content: c.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_html_fragment_scenario() {
        let input = files(&[("index.html", "<html><body><img src='a.png'></body></html>")]);
        let s = validate_submission(&input, &Validators::default());
        assert_eq!(s.total_files, 1);
        assert!(s.html_validation);
        assert!(!s.css_validation && !s.js_validation);
        assert!(s.results[0].score < 100);
        let rules: Vec<&str> = s.results[0]
            .errors
            .iter()
            .chain(&s.results[0].warnings)
            .map(|i| i.rule.as_str())
            .collect();
        for expected in ["doctype-first", "title-require", "alt-require"] {
            assert!(rules.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_clean_js_and_css_scenario() {
        let input = files(&[("app.js", "const x = 1;\n"), ("style.css", "body { color: red; }\n")]);
        let s = validate_submission(&input, &Validators::default());
        assert_eq!(s.total_files, 2);
        assert!(s.results.iter().all(|r| r.score == 100));
        assert_eq!(s.overall_score, 100);
        assert!(s.js_validation && s.css_validation && !s.html_validation);
    }

    #[test]
    fn test_other_extensions_are_skipped() {
        let input = files(&[
            ("logo.png", "\u{fffd}PNG"),
            ("README.md", "# hi"),
            ("data.json", "{}"),
            ("lib/app.js", "const x = 1;\n"),
        ]);
        let s = validate_submission(&input, &Validators::default());
        assert_eq!(s.total_files, 1);
        assert_eq!(s.results[0].file, "lib/app.js");
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let s = validate_submission(&[], &Validators::default());
        assert_eq!(s.total_files, 0);
        assert_eq!(s.overall_score, 0);
    }

    #[test]
    fn test_results_keep_input_order_and_unique_paths() {
        let input = files(&[
            ("z.js", "const z = 1;\n"),
            ("a.css", "a { color: red; }\n"),
            ("z.js", "var broken = \n"),
            ("m.html", "<p>x</p>"),
        ]);
        let s = validate_submission(&input, &Validators::default());
        let order: Vec<&str> = s.results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(order, vec!["z.js", "a.css", "m.html"]);
        assert_eq!(s.results[0].score, 100);
    }

    #[test]
    fn test_engine_failure_does_not_abort_other_files() {
        let input = files(&[("bad.css", "body { color: red;"), ("ok.js", "const x = 1;\n")]);
        let s = validate_submission(&input, &Validators::default());
        assert_eq!(s.total_files, 2);
        assert_eq!(s.results[0].score, 0);
        assert_eq!(s.results[0].errors[0].rule, VALIDATION_ERROR_RULE);
        assert_eq!(s.results[1].score, 100);
        assert_eq!(s.overall_score, 50);
        assert_eq!(s.total_errors, 1);
    }

    #[test]
    fn test_configured_overrides_change_scoring() {
        let src = "const a = \"x\";\n";
        let s = validate_submission(&files(&[("a.js", src)]), &Validators::default());
        assert_eq!(s.results[0].score, 96);

        let mut rules = RulesCfg::default();
        rules.js.insert("quotes".into(), RuleLevel::Off);
        rules.js.insert("no-such-rule".into(), RuleLevel::Error);
        let s = validate_submission(&files(&[("a.js", src)]), &Validators::configured(&rules));
        assert_eq!(s.results[0].score, 100);

        let mut rules = RulesCfg::default();
        rules.js.insert("quotes".into(), RuleLevel::Error);
        let s = validate_submission(&files(&[("a.js", src)]), &Validators::configured(&rules));
        assert_eq!(s.results[0].score, 88);
        assert_eq!(s.results[0].errors[0].rule, "quotes");
    }
}
