//! JavaScript validator.
//!
//! Scripts are parsed with `oxc_parser` and resolved with `oxc_semantic`.
//! Parse errors, early errors and invalid regular expression literals are
//! engine failures. Everything else is a rule over the AST nodes (`rules`),
//! the symbol table (`bindings`) or the raw source layout (`layout`).

mod bindings;
mod globals;
mod layout;
mod regexp;
mod rules;

use super::{FileValidator, Finding, Penalty, Reporter};
use crate::error::EngineFailure;
use crate::models::rules::{RuleLevel, RuleSet};
use crate::models::FileKind;
use crate::utils::LineIndex;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_semantic::{Semantic, SemanticBuilder};
use oxc_span::SourceType;

/// Default rule set for scripts.
pub fn default_rules() -> RuleSet {
    use RuleLevel::*;
    RuleSet::new(&[
        ("semi", Error),
        ("no-duplicate-imports", Error),
        ("no-unreachable", Error),
        ("valid-typeof", Error),
        ("no-dupe-keys", Error),
        ("no-dupe-args", Error),
        ("no-func-assign", Error),
        ("no-invalid-regexp", Error),
        ("no-empty", Error),
        ("no-debugger", Error),
        ("no-self-assign", Error),
        ("no-unused-vars", Warn),
        ("no-undef", Warn),
        ("quotes", Warn),
        ("indent", Warn),
        ("no-multiple-empty-lines", Warn),
        ("no-trailing-spaces", Warn),
        ("eol-last", Warn),
        ("no-var", Warn),
        ("prefer-const", Warn),
    ])
}

pub struct JsValidator {
    rules: RuleSet,
}

impl JsValidator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl Default for JsValidator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl FileValidator for JsValidator {
    fn kind(&self) -> FileKind {
        FileKind::Js
    }

    fn penalty(&self) -> Penalty {
        Penalty {
            error: 12,
            warning: 4,
        }
    }

    fn failure_label(&self) -> &'static str {
        "JavaScript"
    }

    fn lint(&self, content: &str) -> Result<Vec<Finding>, EngineFailure> {
        let allocator = Allocator::default();
        let index = LineIndex::new(content);
        let program = parse(&allocator, content, &index)?;
        let built = SemanticBuilder::new().with_check_syntax_error(true).build(program);
        if !built.errors.is_empty() {
            return Err(failure(&built.errors, &index));
        }
        let semantic = built.semantic;
        rules::check_regexp_literals(&semantic, content, &index)?;

        let mut pass = Pass {
            rep: Reporter::new(&self.rules),
            index,
            src: content,
            semantic: &semantic,
        };
        pass.check_nodes();
        pass.check_bindings();
        let layout = pass.layout();
        pass.check_indent(&layout);
        pass.check_lines(&layout);
        Ok(pass.rep.into_findings())
    }
}

/// Parse as a classic script. A file that only parses as a module (it uses
/// `import`/`export`) is linted as one; otherwise the script errors stand.
fn parse<'a>(allocator: &'a Allocator, src: &'a str, index: &LineIndex<'_>) -> Result<&'a Program<'a>, EngineFailure> {
    let script = Parser::new(allocator, src, SourceType::default().with_module(false)).parse();
    if script.errors.is_empty() && !script.panicked {
        return Ok(allocator.alloc(script.program));
    }
    let module = Parser::new(allocator, src, SourceType::default().with_module(true)).parse();
    if module.errors.is_empty() && !module.panicked {
        return Ok(allocator.alloc(module.program));
    }
    Err(failure(&script.errors, index))
}

/// Engine failure for the first diagnostic, anchored at its first label.
fn failure(diagnostics: &[OxcDiagnostic], index: &LineIndex<'_>) -> EngineFailure {
    let Some(first) = diagnostics.first() else {
        let (line, col) = index.position(usize::MAX);
        return EngineFailure::at("Unexpected end of input", line, col);
    };
    let offset = first
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map_or(0, |label| label.offset());
    let (line, col) = index.position(offset);
    EngineFailure::at(&first.message, line, col)
}

/// One lint run over a resolved program.
struct Pass<'v, 'a> {
    rep: Reporter<'v>,
    index: LineIndex<'a>,
    src: &'a str,
    semantic: &'v Semantic<'a>,
}

impl Pass<'_, '_> {
    fn report(&mut self, rule: &str, offset: u32, message: &str) {
        let (line, col) = self.index.position(offset as usize);
        self.rep.report(rule, line, col, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::VALIDATION_ERROR_RULE;
    use crate::models::Severity;

    pub(super) fn lint(src: &str) -> Vec<Finding> {
        JsValidator::default().lint(src).unwrap()
    }

    /// Sorted rule ids of all findings.
    pub(super) fn rules(src: &str) -> Vec<String> {
        let mut out: Vec<String> = lint(src).into_iter().map(|f| f.issue.rule).collect();
        out.sort();
        out
    }

    /// Findings of one rule in source order.
    pub(super) fn messages(findings: &[Finding], rule: &str) -> Vec<(usize, usize, String)> {
        let mut out: Vec<_> = findings
            .iter()
            .filter(|f| f.issue.rule == rule)
            .map(|f| (f.issue.line, f.issue.column, f.issue.message.clone()))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_clean_script_scores_full() {
        let r = JsValidator::default().validate("app.js", "const x = 1;\n");
        assert!(!r.has_issues(), "{:?}", r);
        assert_eq!(r.score, 100);

        let src = "'use strict';\n\nconst items = ['a', 'b'];\n\nfunction render(list) {\n  const out = [];\n  for (const item of list) {\n    if (item === 'a') {\n      out.push(`<li>${item}</li>`);\n    } else {\n      out.push(item.toUpperCase());\n    }\n  }\n  switch (out.length) {\n  case 0:\n    return null;\n  default:\n    return out;\n  }\n}\n\ndocument.addEventListener('DOMContentLoaded', () => {\n  const list = render(items);\n  console.log(list, {\n    count: list.length,\n  });\n});\n";
        assert!(lint(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn test_syntax_errors_become_validation_error() {
        let r = JsValidator::default().validate("broken.js", "function f( {\n");
        assert_eq!(r.score, 0);
        assert_eq!(r.errors.len(), 1);
        assert!(r.warnings.is_empty());
        assert_eq!(r.errors[0].rule, VALIDATION_ERROR_RULE);
        assert_eq!((r.errors[0].line, r.errors[0].column), (1, 1));
        assert!(r.errors[0].message.starts_with("JavaScript validation failed: "));
        assert!(r.errors[0].message.ends_with(')'));

        let r = JsValidator::default().validate("broken.js", "let s = 'open;\n");
        assert_eq!(r.errors[0].rule, VALIDATION_ERROR_RULE);
        assert!(r.errors[0].message.ends_with("(1:9)"), "{}", r.errors[0].message);

        let r = JsValidator::default().validate("broken.js", "let a = 1;\nlet a = 2;\n");
        assert_eq!(r.errors[0].rule, VALIDATION_ERROR_RULE);
        assert_eq!(r.score, 0);
    }

    #[test]
    fn test_label_at_end_of_input_is_a_syntax_error() {
        for src in ["a:", "\ta:", "typeofvar:", "loop:\n", "a: b:"] {
            let r = JsValidator::default().validate("label.js", src);
            assert_eq!(r.errors.len(), 1, "{:?}", src);
            assert_eq!(r.errors[0].rule, VALIDATION_ERROR_RULE, "{:?}", src);
            assert_eq!(r.score, 0);
        }
        assert!(lint("outer: for (const a of [1]) {\n  console.log(a);\n  break outer;\n}\n").is_empty());
    }

    #[test]
    fn test_odd_inputs_never_panic() {
        let corpus = [
            "", " ", "\n", "(", ")", "((", "[}", "{", "}", "`", "`${", "`${a", "`${`", "/*", "/* é", "//",
            "'", "\"\\", "/[/", "x = /a", "x = /(a/;", "x = /a/gg;", "function", "function (", "class {",
            "class A { #", "if (", "for (;;", "for (const x of", "let {", "let [a, ...b,] = c;", "a ?.",
            "a?.b\n", "é", "const é = 'ü';\n", "\u{a0}a:", "a\u{a0}:", "\u{feff}x;\n", "0x", "1e", "1_",
            "#!", "#!/usr/bin/env node\nx;\n", "<!--", "-->", "x\u{2028}y;\n", "😀", "'😀\n", "async () =>",
            "yield", "await x;\n", "import", "import x from", "export {", "export default", "new.target",
            "super()", "return", "break;\n", "a\n\n\n\n", "\r\n\r\n", "\t\t}", "x = `a\n${b}\nc`;\n",
            "new RegExp('(', 'u');\n", "RegExp(`[`);\n", "typeof a === `strnig`;\n", "({ a, a: 1, [b]: 2 });\n",
            "((a, a) => a);\n", "function f(...a) {}\n", "label: {\n  break label;\n}\n",
        ];
        let v = JsValidator::default();
        for src in corpus {
            let r = v.validate("odd.js", src);
            assert!(r.score <= r.max_score, "{:?}", src);
            if r.errors.iter().any(|e| e.rule == VALIDATION_ERROR_RULE) {
                assert_eq!(r.errors.len(), 1, "{:?}", src);
                assert_eq!(r.score, 0, "{:?}", src);
            }
        }
    }

    #[test]
    fn test_module_syntax_is_accepted() {
        let src = "import { a } from './a.js';\nexport const b = a + 1;\n";
        assert!(lint(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn test_missing_semicolon_scoring() {
        // one error and one warning: 100 - 12 - 4
        let r = JsValidator::default().validate("a.js", "const a = \"x\"\n");
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].rule, "semi");
        assert_eq!((r.errors[0].line, r.errors[0].column), (1, 14));
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].rule, "quotes");
        assert_eq!(r.score, 84);
    }

    #[test]
    fn test_default_severities() {
        let rules = default_rules();
        assert_eq!(rules.severity("semi"), Some(Severity::Error));
        assert_eq!(rules.severity("no-unreachable"), Some(Severity::Error));
        assert_eq!(rules.severity("quotes"), Some(Severity::Warning));
        assert_eq!(rules.severity("no-unused-vars"), Some(Severity::Warning));
        assert_eq!(rules.severity("no-console"), None);
    }
}
