//! HTML validator.
//!
//! A single pass over the tokenizer's event stream applies the structural
//! rules: tag/attribute case, attribute quoting, doctype presence and form,
//! tag pairing, special-character escaping, id uniqueness, required
//! `src`/`alt`/`title`, dash-case ids and classes, ad-keyword and unsafe
//! characters in attribute values, and space-only indentation.
//!
//! The engine cannot fail; `lint` always returns `Ok`.

mod parser;

use self::parser::{tokenize, Attr, Event};
use super::{FileValidator, Finding, Penalty, Reporter};
use crate::error::EngineFailure;
use crate::models::rules::{RuleLevel, RuleSet};
use crate::models::FileKind;
use crate::utils::LineIndex;
use regex::Regex;
use std::collections::HashSet;

/// Default rule set for HTML documents.
pub fn default_rules() -> RuleSet {
    use RuleLevel::*;
    RuleSet::new(&[
        ("tagname-lowercase", Error),
        ("attr-lowercase", Error),
        ("attr-value-double-quotes", Error),
        ("doctype-first", Error),
        ("tag-pair", Error),
        ("spec-char-escape", Error),
        ("id-unique", Error),
        ("src-not-empty", Error),
        ("title-require", Error),
        ("alt-require", Warn),
        ("doctype-html5", Warn),
        ("id-class-value", Warn),
        ("space-tab-mixed-disabled", Warn),
        ("id-class-ad-disabled", Warn),
        ("attr-unsafe-chars", Warn),
    ])
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "command", "embed", "frame", "hr", "img",
    "input", "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Mixed-case SVG names that are correct as written.
const SVG_CAMEL_CASE: &[&str] = &[
    "clipPath", "foreignObject", "linearGradient", "radialGradient", "textPath", "feGaussianBlur",
    "feColorMatrix", "feOffset", "feBlend", "feMerge", "feMergeNode", "feFlood", "feComposite",
    "viewBox", "preserveAspectRatio", "gradientUnits", "gradientTransform", "patternUnits",
    "stdDeviation", "stopColor", "stopOpacity", "textLength", "lengthAdjust", "markerWidth",
    "markerHeight", "refX", "refY", "pathLength", "clipPathUnits", "maskUnits",
];

pub struct HtmlValidator {
    rules: RuleSet,
    dash_case: Regex,
    ad_keyword: Regex,
    unsafe_chars: Regex,
}

impl HtmlValidator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            dash_case: Regex::new(r"^[a-z\d]+(-[a-z\d]+)*$").expect("static pattern"),
            ad_keyword: Regex::new(r"(?i)(^|[-_])ad([-_]|$)").expect("static pattern"),
            unsafe_chars: Regex::new(
                r"[\x{0}-\x{9}\x{b}\x{c}\x{e}-\x{1f}\x{7f}-\x{9f}\x{ad}\x{600}-\x{604}\x{70f}\x{17b4}\x{17b5}\x{200c}-\x{200f}\x{2028}-\x{202f}\x{2060}-\x{206f}\x{feff}\x{fff0}-\x{ffff}]",
            )
            .expect("static pattern"),
        }
    }
}

impl Default for HtmlValidator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl FileValidator for HtmlValidator {
    fn kind(&self) -> FileKind {
        FileKind::Html
    }

    fn penalty(&self) -> Penalty {
        Penalty {
            error: 10,
            warning: 2,
        }
    }

    fn failure_label(&self) -> &'static str {
        "HTML"
    }

    fn lint(&self, content: &str) -> Result<Vec<Finding>, EngineFailure> {
        let mut pass = Pass::new(self, content);
        for event in tokenize(content) {
            pass.visit(&event);
        }
        pass.finish();
        Ok(pass.rep.into_findings())
    }
}

struct OpenTag<'a> {
    name: String,
    raw: &'a str,
    line: usize,
}

/// State of one lint pass over a document.
struct Pass<'v, 'a> {
    v: &'v HtmlValidator,
    rep: Reporter<'v>,
    index: LineIndex<'a>,
    src: &'a str,
    seen_significant: bool,
    stack: Vec<OpenTag<'a>>,
    ids: HashSet<&'a str>,
    html_offset: Option<usize>,
    head_seen: bool,
    in_head: bool,
    title_seen: bool,
    /// Offset and accumulated text of a `<title>` currently open.
    title_text: Option<String>,
}

impl<'v, 'a> Pass<'v, 'a> {
    fn new(v: &'v HtmlValidator, src: &'a str) -> Self {
        Self {
            v,
            rep: Reporter::new(&v.rules),
            index: LineIndex::new(src),
            src,
            seen_significant: false,
            stack: Vec::new(),
            ids: HashSet::new(),
            html_offset: None,
            head_seen: false,
            in_head: false,
            title_seen: false,
            title_text: None,
        }
    }

    fn report_at(&mut self, rule: &str, offset: usize, message: String) {
        let (line, col) = self.index.position(offset);
        self.rep.report(rule, line, col, message);
    }

    fn visit(&mut self, event: &Event<'a>) {
        self.check_doctype_first(event);
        match event {
            Event::Doctype { content, offset } => {
                let body = content.get("DOCTYPE".len()..).unwrap_or("").trim();
                if !body.eq_ignore_ascii_case("html") {
                    self.report_at(
                        "doctype-html5",
                        *offset,
                        "Invalid doctype. Use: \"<!DOCTYPE html>\"".to_string(),
                    );
                }
            }
            Event::Start {
                name,
                attrs,
                self_closing,
                raw,
                offset,
            } => self.on_start(name, attrs, *self_closing, raw, *offset),
            Event::End { name, raw, offset } => self.on_end(name, raw, *offset),
            Event::Text { text, offset } => {
                if let Some(buf) = self.title_text.as_mut() {
                    buf.push_str(text);
                }
                self.check_special_chars(text, *offset);
                self.check_indentation(text, *offset);
            }
            Event::RawText { .. } | Event::Comment { .. } => {}
        }
    }

    fn check_doctype_first(&mut self, event: &Event<'a>) {
        if self.seen_significant {
            return;
        }
        match event {
            Event::Comment { .. } => return,
            Event::Text { text, .. } if text.trim().is_empty() => return,
            _ => {}
        }
        self.seen_significant = true;
        if !matches!(event, Event::Doctype { .. }) {
            self.report_at(
                "doctype-first",
                event.offset(),
                "Doctype must be declared first.".to_string(),
            );
        }
    }

    fn on_start(&mut self, name: &'a str, attrs: &[Attr<'a>], self_closing: bool, raw: &'a str, offset: usize) {
        let lower = name.to_ascii_lowercase();
        if name != lower && !SVG_CAMEL_CASE.contains(&name) {
            self.report_at(
                "tagname-lowercase",
                offset,
                format!("The html element name of [ {} ] must be in lowercase.", name),
            );
        }

        for attr in attrs {
            self.check_attr(attr);
        }
        self.check_required_attrs(&lower, attrs, offset);

        match lower.as_str() {
            "html" => {
                self.html_offset.get_or_insert(offset);
            }
            "head" => {
                self.head_seen = true;
                self.in_head = true;
            }
            "title" if !self_closing => {
                if self.in_head {
                    self.title_seen = true;
                }
                self.title_text = Some(String::new());
            }
            _ => {}
        }

        if !self_closing && !VOID_ELEMENTS.contains(&lower.as_str()) {
            let (line, _) = self.index.position(offset);
            self.stack.push(OpenTag {
                name: lower,
                raw,
                line,
            });
        }
    }

    fn on_end(&mut self, name: &'a str, raw: &'a str, offset: usize) {
        let lower = name.to_ascii_lowercase();
        if name != lower && !SVG_CAMEL_CASE.contains(&name) {
            self.report_at(
                "tagname-lowercase",
                offset,
                format!("The html element name of [ {} ] must be in lowercase.", name),
            );
        }

        match lower.as_str() {
            "head" => {
                self.in_head = false;
                if !self.title_seen {
                    self.report_at(
                        "title-require",
                        offset,
                        "<title></title> must be present in <head> tag.".to_string(),
                    );
                }
            }
            "title" => {
                if let Some(text) = self.title_text.take() {
                    if text.trim().is_empty() {
                        self.report_at(
                            "title-require",
                            offset,
                            "<title></title> can not be empty.".to_string(),
                        );
                    }
                }
            }
            _ => {}
        }

        if VOID_ELEMENTS.contains(&lower.as_str()) {
            return;
        }
        match self.stack.iter().rposition(|t| t.name == lower) {
            Some(pos) => {
                if pos + 1 < self.stack.len() {
                    let missing: String = self.stack[pos + 1..]
                        .iter()
                        .rev()
                        .map(|t| format!("</{}>", t.name))
                        .collect();
                    let last = &self.stack[self.stack.len() - 1];
                    let msg = format!(
                        "Tag must be paired, missing: [ {} ], start tag match failed [ {} ] on line {}.",
                        missing, last.raw, last.line
                    );
                    self.report_at("tag-pair", offset, msg);
                }
                self.stack.truncate(pos);
            }
            None => self.report_at(
                "tag-pair",
                offset,
                format!("Tag must be paired, no start tag: [ {} ]", raw),
            ),
        }
    }

    fn finish(&mut self) {
        let end = self.src.len();
        if !self.stack.is_empty() {
            let missing: String = self
                .stack
                .iter()
                .rev()
                .map(|t| format!("</{}>", t.name))
                .collect();
            let last = &self.stack[self.stack.len() - 1];
            let msg = format!(
                "Tag must be paired, missing: [ {} ], open tag match failed [ {} ] on line {}.",
                missing, last.raw, last.line
            );
            self.report_at("tag-pair", end, msg);
        }
        // A full document needs a head with a title even when <head> is omitted.
        if !self.title_seen {
            if let Some(html_offset) = self.html_offset {
                if !self.head_seen {
                    self.report_at(
                        "title-require",
                        html_offset,
                        "<title></title> must be present in <head> tag.".to_string(),
                    );
                } else if self.in_head {
                    self.report_at(
                        "title-require",
                        end,
                        "<title></title> must be present in <head> tag.".to_string(),
                    );
                }
            }
        }
    }

    fn check_attr(&mut self, attr: &Attr<'a>) {
        let name_lower = attr.name.to_ascii_lowercase();
        if attr.name != name_lower && !SVG_CAMEL_CASE.contains(&attr.name) {
            self.report_at(
                "attr-lowercase",
                attr.offset,
                format!("The attribute name of [ {} ] must be in lowercase.", attr.name),
            );
        }

        let badly_quoted = (attr.has_value && !attr.value.is_empty() && attr.quote != Some('"'))
            || (attr.value.is_empty() && attr.quote == Some('\''));
        if badly_quoted {
            self.report_at(
                "attr-value-double-quotes",
                attr.offset,
                format!("The value of attribute [ {} ] must be in double quotes.", attr.name),
            );
        }

        if name_lower == "id" && !attr.value.is_empty() {
            if !self.ids.insert(attr.value) {
                self.report_at(
                    "id-unique",
                    attr.offset,
                    format!("The id value [ {} ] must be unique.", attr.value),
                );
            }
        }

        if name_lower == "id" || name_lower == "class" {
            let values: Vec<&str> = if name_lower == "id" {
                vec![attr.value.trim()]
            } else {
                attr.value.split_whitespace().collect()
            };
            let values: Vec<&str> = values.into_iter().filter(|v| !v.is_empty()).collect();
            if values.iter().any(|v| !self.v.dash_case.is_match(v)) {
                self.report_at(
                    "id-class-value",
                    attr.offset,
                    "The id and class attribute values must be in lowercase and split by a dash.".to_string(),
                );
            }
            if values.iter().any(|v| self.v.ad_keyword.is_match(v)) {
                self.report_at(
                    "id-class-ad-disabled",
                    attr.offset,
                    format!("The value of attribute [ {} ] cannot use the ad keyword.", attr.name),
                );
            }
        }

        if let Some(m) = self.v.unsafe_chars.find(attr.value) {
            let ch = m.as_str().chars().next().unwrap_or('\0');
            let code = ch as u32;
            let escaped = if code <= 0xFF {
                format!("\\x{:02X}", code)
            } else {
                format!("\\u{:04X}", code)
            };
            self.report_at(
                "attr-unsafe-chars",
                attr.offset,
                format!(
                    "The value of attribute [ {} ] cannot contain an unsafe char [ {} ].",
                    attr.name, escaped
                ),
            );
        }
    }

    fn check_required_attrs(&mut self, tag: &str, attrs: &[Attr<'a>], offset: usize) {
        let get = |name: &str| attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name));

        let src_attr = match tag {
            "img" | "script" | "embed" | "bgsound" | "iframe" | "frame" => Some("src"),
            "link" => Some("href"),
            "object" => Some("data"),
            _ => None,
        };
        if let Some(attr_name) = src_attr {
            if let Some(a) = get(attr_name) {
                if a.value.is_empty() {
                    self.report_at(
                        "src-not-empty",
                        a.offset,
                        format!(
                            "The attribute [ {} ] of the tag [ {} ] must have a value.",
                            attr_name, tag
                        ),
                    );
                }
            }
        }

        match tag {
            "img" if get("alt").is_none() => self.report_at(
                "alt-require",
                offset,
                "An alt attribute must be present on <img> elements.".to_string(),
            ),
            "area" if get("href").is_some() && get("alt").map_or(true, |a| a.value.is_empty()) => {
                self.report_at(
                    "alt-require",
                    offset,
                    "The alt attribute of area[href] must have a value.".to_string(),
                )
            }
            "input"
                if get("type").is_some_and(|t| t.value.eq_ignore_ascii_case("image"))
                    && get("alt").map_or(true, |a| a.value.is_empty()) =>
            {
                self.report_at(
                    "alt-require",
                    offset,
                    "The alt attribute of input[type=image] must have a value.".to_string(),
                )
            }
            _ => {}
        }
    }

    fn check_special_chars(&mut self, text: &str, offset: usize) {
        if !self.rep.enabled("spec-char-escape") {
            return;
        }
        for (i, ch) in text.char_indices() {
            let bad = match ch {
                '<' | '>' => Some(ch.to_string()),
                '&' if text[..i].ends_with(' ') && text[i + 1..].starts_with(' ') => Some("&".to_string()),
                _ => None,
            };
            if let Some(c) = bad {
                self.report_at(
                    "spec-char-escape",
                    offset + i,
                    format!("Special characters must be escaped : [ {} ].", c),
                );
            }
        }
    }

    /// Leading whitespace of every line in a text run must be spaces only.
    fn check_indentation(&mut self, text: &str, offset: usize) {
        if !self.rep.enabled("space-tab-mixed-disabled") {
            return;
        }
        let mut line_start = 0;
        for line in text.split('\n') {
            let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
            let indent = &line[..indent_len];
            // the first segment only counts when the text run starts a line
            let at_line_start = line_start > 0
                || offset == 0
                || self.src.as_bytes().get(offset - 1) == Some(&b'\n');
            if at_line_start && indent.contains('\t') {
                self.report_at(
                    "space-tab-mixed-disabled",
                    offset + line_start,
                    "Please use space for indentation.".to_string(),
                );
            }
            line_start += line.len() + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn lint(src: &str) -> Vec<Finding> {
        HtmlValidator::default().lint(src).unwrap()
    }

    fn rules_of(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.issue.rule.as_str()).collect()
    }

    const CLEAN: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>Portfolio</title>\n  <link rel=\"stylesheet\" href=\"style.css\">\n</head>\n<body>\n  <main id=\"main\" class=\"page-body wide\">\n    <img src=\"a.png\" alt=\"A\">\n    <p>Fish &amp; chips</p>\n  </main>\n  <script src=\"app.js\"></script>\n</body>\n</html>\n";

    #[test]
    fn test_clean_document_has_no_findings() {
        let findings = lint(CLEAN);
        assert!(findings.is_empty(), "{:?}", findings);
        let r = HtmlValidator::default().validate("index.html", CLEAN);
        assert_eq!(r.score, 100);
    }

    #[test]
    fn test_fragment_without_doctype_title_and_alt() {
        let findings = lint("<html><body><img src='a.png'></body></html>");
        let rules = rules_of(&findings);
        assert!(rules.contains(&"doctype-first"));
        assert!(rules.contains(&"title-require"));
        assert!(rules.contains(&"alt-require"));
        assert!(rules.contains(&"attr-value-double-quotes"));
        let r = HtmlValidator::default().validate("index.html", "<html><body><img src='a.png'></body></html>");
        assert_eq!(r.errors.len(), 3);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.score, 68);
    }

    #[test]
    fn test_doctype_first_reports_first_significant_event() {
        let findings = lint("\n<!-- hi -->\n<p>x</p>");
        let f = findings.iter().find(|f| f.issue.rule == "doctype-first").unwrap();
        assert_eq!((f.issue.line, f.issue.column), (3, 1));
        assert_eq!(f.severity, Severity::Error);
    }

    #[test]
    fn test_legacy_doctype_warns() {
        let findings = lint("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\">\n<p>x</p>");
        assert_eq!(rules_of(&findings), vec!["doctype-html5"]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_tag_pair_missing_and_orphan_end_tags() {
        let src = "<!DOCTYPE html>\n<div>\n<span><b>x</span>\n</p>\n";
        let findings = lint(src);
        let msgs: Vec<_> = findings
            .iter()
            .filter(|f| f.issue.rule == "tag-pair")
            .map(|f| f.issue.message.as_str())
            .collect();
        assert_eq!(
            msgs,
            vec![
                "Tag must be paired, missing: [ </b> ], start tag match failed [ <b> ] on line 3.",
                "Tag must be paired, no start tag: [ </p> ]",
                "Tag must be paired, missing: [ </div> ], open tag match failed [ <div> ] on line 2.",
            ]
        );
    }

    #[test]
    fn test_case_rules_and_svg_exceptions() {
        let src = "<!DOCTYPE html>\n<DIV onClick=\"x()\"></DIV>\n<svg viewBox=\"0 0 1 1\"><linearGradient></linearGradient></svg>";
        let findings = lint(src);
        let rules = rules_of(&findings);
        assert_eq!(rules.iter().filter(|r| **r == "tagname-lowercase").count(), 2);
        assert_eq!(rules.iter().filter(|r| **r == "attr-lowercase").count(), 1);
        let attr = findings.iter().find(|f| f.issue.rule == "attr-lowercase").unwrap();
        assert_eq!((attr.issue.line, attr.issue.column), (2, 6));
    }

    #[test]
    fn test_id_rules() {
        let src = "<!DOCTYPE html>\n<p id=\"a\"></p><p id=\"a\"></p><p id=\"Main_Box\" class=\"ok top-ad\"></p>";
        let findings = lint(src);
        let rules = rules_of(&findings);
        assert!(rules.contains(&"id-unique"));
        assert_eq!(rules.iter().filter(|r| **r == "id-class-value").count(), 1);
        assert_eq!(rules.iter().filter(|r| **r == "id-class-ad-disabled").count(), 1);
    }

    #[test]
    fn test_special_chars_and_empty_src() {
        let src = "<!DOCTYPE html>\n<p>1 < 2 & 3</p><img src=\"\" alt=\"\"><script>if (a < b) {}</script>";
        let findings = lint(src);
        let rules = rules_of(&findings);
        assert_eq!(rules.iter().filter(|r| **r == "spec-char-escape").count(), 2);
        assert!(rules.contains(&"src-not-empty"));
        let lt = findings.iter().find(|f| f.issue.rule == "spec-char-escape").unwrap();
        assert_eq!((lt.issue.line, lt.issue.column), (2, 6));
    }

    #[test]
    fn test_title_rules() {
        let findings = lint("<!DOCTYPE html>\n<html><head></head><body></body></html>");
        assert_eq!(rules_of(&findings), vec!["title-require"]);
        let findings = lint("<!DOCTYPE html>\n<html><head><title> </title></head></html>");
        assert_eq!(findings[0].issue.message, "<title></title> can not be empty.");
    }

    #[test]
    fn test_tab_indentation_and_unsafe_chars() {
        let src = "<!DOCTYPE html>\n<ul>\n\t<li><a href=\"x\u{ad}\">x</a></li>\n</ul>\n";
        let findings = lint(src);
        let rules = rules_of(&findings);
        assert!(rules.contains(&"space-tab-mixed-disabled"));
        let unsafe_char = findings.iter().find(|f| f.issue.rule == "attr-unsafe-chars").unwrap();
        assert!(unsafe_char.issue.message.contains("\\xAD"));
    }

    #[test]
    fn test_odd_inputs_never_panic() {
        let corpus = [
            "", "<", "<!", "<!-", "<!--", "<!-- x -", "<![CDATA[", "<?xml", "<a", "<a href", "<a href=",
            "<a href='", "<a href=\"x", "<a =>", "<a / >", "</", "</a", "</div", "</1>", "<div>\u{e9}",
            "<p>\u{a0}&", "&", " & ", "<script>", "<script>if (a < b) {", "<style>a{", "<!DOCTYPE", "<!doctype",
            "<img src=\"\u{ad}", "<\u{1f600}>", "<a b=\"c\" b=\"d\">", "<title></title><title>",
            "\t<p>\n\t\t</p>", "<p id=\"\u{e9}\" id=\"\u{e9}\">", "<svg viewBox=\"0\"><path/></svg>",
            "\u{feff}<!DOCTYPE html>", "<html><head><title>", "</html></html>", "<br/><br />",
        ];
        let v = HtmlValidator::default();
        for src in corpus {
            let r = v.validate("odd.html", src);
            assert!(r.score <= r.max_score, "{:?}", src);
            assert!(r.errors.iter().chain(&r.warnings).all(|i| i.line >= 1 && i.column >= 1), "{:?}", src);
        }
    }

    #[test]
    fn test_disabled_rule_is_not_reported() {
        let (rules, _) = default_rules().with_overrides(
            &[("alt-require".to_string(), RuleLevel::Off)].into_iter().collect(),
        );
        let v = HtmlValidator::new(rules);
        let findings = v.lint("<!DOCTYPE html>\n<img src=\"a.png\">").unwrap();
        assert!(findings.is_empty());
    }
}
