//! CSS validator.
//!
//! Parses the stylesheet into a node tree (parse failures are engine
//! failures) and walks it once, applying the structural rules per block and
//! the value rules per declaration. Line-based stylistic rules run over the
//! raw text afterwards. Messages carry the rule id as a `(rule)` suffix.

mod known;
mod parser;

use self::known::*;
use self::parser::{AtRule, Decl, Node, Rule};
use super::{FileValidator, Finding, Penalty, Reporter};
use crate::error::EngineFailure;
use crate::models::rules::{RuleLevel, RuleSet};
use crate::models::FileKind;
use crate::utils::{numbered_lines, LineIndex};
use regex::Regex;
use std::collections::{HashMap, HashSet};

const RULE_IDS: &[&str] = &[
    "block-no-empty",
    "color-no-invalid-hex",
    "comment-no-empty",
    "declaration-block-no-duplicate-properties",
    "declaration-block-no-shorthand-property-overrides",
    "font-family-no-duplicate-names",
    "function-calc-no-unspaced-operator",
    "function-linear-gradient-no-nonstandard-direction",
    "keyframe-declaration-no-important",
    "media-feature-name-no-unknown",
    "no-duplicate-at-import-rules",
    "no-duplicate-selectors",
    "no-empty-source",
    "no-extra-semicolons",
    "no-invalid-double-slash-comments",
    "property-no-unknown",
    "selector-pseudo-class-no-unknown",
    "selector-pseudo-element-no-unknown",
    "selector-type-no-unknown",
    "string-no-newline",
    "unit-no-unknown",
    "at-rule-no-unknown",
    "indentation",
    "max-empty-lines",
    "no-eol-whitespace",
];

/// Default rule set for stylesheets. Every rule reports as an error.
pub fn default_rules() -> RuleSet {
    let levels: Vec<(&'static str, RuleLevel)> =
        RULE_IDS.iter().map(|id| (*id, RuleLevel::Error)).collect();
    RuleSet::new(&levels)
}

const INDENT_WIDTH: usize = 2;
const MAX_EMPTY_LINES: usize = 2;

/// Functional pseudo-classes whose argument is itself a selector list.
const SELECTOR_ARGUMENT_PSEUDOS: &[&str] = &[
    "not", "is", "where", "has", "matches", "any", "-webkit-any", "-moz-any", "host",
    "host-context", "slotted", "current", "past", "future", "cue",
];

const SIDES: &[&str] = &["top", "bottom", "left", "right"];

pub struct CssValidator {
    rules: RuleSet,
    angle: Regex,
}

impl CssValidator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            angle: Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:deg|grad|rad|turn)$")
                .expect("static pattern"),
        }
    }

    /// False only when the first gradient argument is a malformed direction.
    fn standard_direction(&self, words: &[&str]) -> bool {
        let Some(first) = words.first() else {
            return true;
        };
        let starts_numeric = first
            .trim_start_matches(['-', '+'])
            .starts_with(|c: char| c.is_ascii_digit() || c == '.');
        if starts_numeric {
            return words.len() == 1 && (*first == "0" || self.angle.is_match(first));
        }
        if *first == "to" {
            let sides = &words[1..];
            let known = sides.iter().all(|s| SIDES.contains(s));
            let distinct_axes = match sides {
                [a] => SIDES.contains(a),
                [a, b] => {
                    let vertical = |s: &str| s == "top" || s == "bottom";
                    vertical(*a) != vertical(*b)
                }
                _ => false,
            };
            return known && distinct_axes;
        }
        !SIDES.contains(first)
    }
}

impl Default for CssValidator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl FileValidator for CssValidator {
    fn kind(&self) -> FileKind {
        FileKind::Css
    }

    fn penalty(&self) -> Penalty {
        Penalty {
            error: 8,
            warning: 3,
        }
    }

    fn failure_label(&self) -> &'static str {
        "CSS"
    }

    fn lint(&self, content: &str) -> Result<Vec<Finding>, EngineFailure> {
        let mut pass = Pass {
            v: self,
            rep: Reporter::new(&self.rules),
            index: LineIndex::new(content),
            src: content,
            imports: HashSet::new(),
            selectors: HashMap::new(),
        };
        if content.trim().is_empty() {
            pass.report("no-empty-source", 0, "Unexpected empty source");
            return Ok(pass.rep.into_findings());
        }

        let sheet = parser::parse(content)?;
        for &offset in &sheet.extra_semicolons {
            pass.report("no-extra-semicolons", offset, "Unexpected extra semicolon");
        }
        pass.walk(&sheet.nodes, 0, &Scope::default());
        pass.check_lines();
        Ok(pass.rep.into_findings())
    }
}

/// Where a block sits: its enclosing at-rules.
#[derive(Debug, Clone, Default)]
struct Scope {
    in_keyframes: bool,
    /// Enclosing at-rule preludes, used to key duplicate selectors.
    key: String,
}

struct Pass<'v, 'a> {
    v: &'v CssValidator,
    rep: Reporter<'v>,
    index: LineIndex<'a>,
    src: &'a str,
    imports: HashSet<String>,
    /// Normalized selector (with scope) → line of first use.
    selectors: HashMap<String, usize>,
}

impl<'v, 'a> Pass<'v, 'a> {
    fn report(&mut self, rule: &str, offset: usize, text: &str) {
        let (line, col) = self.index.position(offset);
        self.report_pos(rule, line, col, text);
    }

    fn report_pos(&mut self, rule: &str, line: usize, col: usize, text: &str) {
        self.rep.report(rule, line, col, format!("{} ({})", text, rule));
    }

    fn walk(&mut self, nodes: &[Node<'a>], depth: usize, scope: &Scope) {
        let mut props: HashSet<String> = HashSet::new();
        // (vendor prefix, unprefixed name, raw name) of declarations so far
        let mut seen: Vec<(String, String, &'a str)> = Vec::new();

        for node in nodes {
            self.check_indent(node.offset(), depth);
            match node {
                Node::Comment(c) => {
                    if c.text.trim().is_empty() {
                        self.report("comment-no-empty", c.offset, "Unexpected empty comment");
                    }
                }
                Node::Decl(d) => {
                    self.declaration(d, scope);

                    let key = if d.prop.starts_with("--") {
                        d.prop.to_string()
                    } else {
                        d.prop.to_ascii_lowercase()
                    };
                    if !props.insert(key) {
                        self.report(
                            "declaration-block-no-duplicate-properties",
                            d.offset,
                            &format!("Unexpected duplicate \"{}\"", d.prop),
                        );
                    }

                    let lower = d.prop.to_ascii_lowercase();
                    let base = unprefixed(&lower).to_string();
                    let prefix = lower[..lower.len() - base.len()].to_string();
                    if let Some((_, longhands)) = SHORTHANDS.iter().find(|(s, _)| *s == base) {
                        let overridden = seen
                            .iter()
                            .find(|(p, name, _)| *p == prefix && longhands.contains(&name.as_str()));
                        if let Some((_, _, raw)) = overridden {
                            let msg = format!("Unexpected shorthand \"{}\" after \"{}\"", d.prop, raw);
                            self.report("declaration-block-no-shorthand-property-overrides", d.offset, &msg);
                        }
                    }
                    seen.push((prefix, base, d.prop));
                }
                Node::Rule(r) => self.rule(r, depth, scope),
                Node::AtRule(a) => self.at_rule(a, depth, scope),
            }
        }
    }

    fn rule(&mut self, r: &Rule<'a>, depth: usize, scope: &Scope) {
        if r.selector.starts_with("//") {
            self.report(
                "no-invalid-double-slash-comments",
                r.offset,
                "Unexpected double-slash CSS comment",
            );
        } else if !scope.in_keyframes {
            self.check_selector(r.selector, r.offset);
            let key = format!("{}{}", scope.key, normalize_selector(r.selector));
            let (line, _) = self.index.position(r.offset);
            match self.selectors.get(&key) {
                Some(&first) => {
                    let msg = format!(
                        "Unexpected duplicate selector \"{}\", first used at line {}",
                        r.selector, first
                    );
                    self.report("no-duplicate-selectors", r.offset, &msg);
                }
                None => {
                    self.selectors.insert(key, line);
                }
            }
        }
        for at in newline_strings(r.selector) {
            self.report("string-no-newline", r.offset + at, "Unexpected newline in string");
        }

        if r.body.nodes.is_empty() {
            self.report("block-no-empty", r.offset, "Unexpected empty block");
        }
        self.walk(&r.body.nodes, depth + 1, scope);
        self.check_indent(r.body.close, depth);
    }

    fn at_rule(&mut self, a: &AtRule<'a>, depth: usize, scope: &Scope) {
        let name = a.name.to_ascii_lowercase();
        let base = unprefixed(&name);
        if !AT_RULES.contains(&base) {
            self.report(
                "at-rule-no-unknown",
                a.offset,
                &format!("Unexpected unknown at-rule \"@{}\"", a.name),
            );
        }

        match base {
            "media" => {
                self.check_media_features(a.params, a.params_offset);
                self.check_units(a.params, a.params_offset);
            }
            "import" => {
                let (url, media) = import_target(a.params);
                if !self.imports.insert(format!("{}|{}", url, media)) {
                    self.report(
                        "no-duplicate-at-import-rules",
                        a.offset,
                        &format!("Unexpected duplicate @import rule {}", url),
                    );
                }
            }
            _ => {}
        }
        for at in newline_strings(a.params) {
            self.report("string-no-newline", a.params_offset + at, "Unexpected newline in string");
        }

        if let Some(body) = &a.body {
            if body.nodes.is_empty() {
                self.report("block-no-empty", a.offset, "Unexpected empty block");
            }
            let inner = Scope {
                in_keyframes: scope.in_keyframes || base == "keyframes",
                key: format!("{}@{} {}|", scope.key, name, a.params),
            };
            self.walk(&body.nodes, depth + 1, &inner);
            self.check_indent(body.close, depth);
        }
    }

    fn declaration(&mut self, d: &Decl<'a>, scope: &Scope) {
        if d.prop.starts_with("//") {
            self.report(
                "no-invalid-double-slash-comments",
                d.offset,
                "Unexpected double-slash CSS comment",
            );
            return;
        }

        let lower = d.prop.to_ascii_lowercase();
        let interpolated = d.prop.contains(['$', '@', '{']);
        if !lower.starts_with("--")
            && !has_vendor_prefix(&lower)
            && !interpolated
            && !PROPERTIES.contains(&lower.as_str())
        {
            self.report(
                "property-no-unknown",
                d.offset,
                &format!("Unexpected unknown property \"{}\"", d.prop),
            );
        }

        if scope.in_keyframes && d.important {
            self.report("keyframe-declaration-no-important", d.offset, "Unexpected !important");
        }

        for at in newline_strings(d.value) {
            self.report("string-no-newline", d.value_offset + at, "Unexpected newline in string");
        }
        let masked = mask(d.value);
        self.check_hex_colors(d.value, &masked, d.value_offset);
        if lower != "unicode-range" {
            self.check_units(d.value, d.value_offset);
        }
        self.check_calc(&masked, d.value_offset);
        self.check_gradients(&masked, d.value_offset);
        if lower == "font-family" {
            self.check_font_families(d.value, d.value_offset);
        }
    }

    fn check_hex_colors(&mut self, value: &str, masked: &str, base: usize) {
        for (i, _) in masked.match_indices('#') {
            let len = masked[i + 1..]
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric())
                .count();
            if len == 0 {
                continue;
            }
            let hex = &value[i + 1..i + 1 + len];
            let valid = matches!(len, 3 | 4 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit());
            if !valid {
                self.report(
                    "color-no-invalid-hex",
                    base + i,
                    &format!("Unexpected invalid hex color \"#{}\"", hex),
                );
            }
        }
    }

    /// Numbers followed by letters must carry a known unit.
    fn check_units(&mut self, text: &str, base: usize) {
        if !self.rep.enabled("unit-no-unknown") {
            return;
        }
        let masked = mask(text);
        let bytes = masked.as_bytes();
        let is_word = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'%' | b'#' | b'+' | b'\\');
        let mut i = 0;
        while i < bytes.len() {
            if !is_word(bytes[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < bytes.len() && is_word(bytes[i]) {
                i += 1;
            }
            if let Some((unit_start, unit)) = dimension_unit(&masked[start..i]) {
                if !UNITS.contains(&unit.to_ascii_lowercase().as_str()) {
                    self.report(
                        "unit-no-unknown",
                        base + start + unit_start,
                        &format!("Unexpected unknown unit \"{}\"", unit),
                    );
                }
            }
        }
    }

    fn check_calc(&mut self, masked: &str, base: usize) {
        let lower = masked.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        let mut from = 0;
        while let Some(found) = lower[from..].find("calc(") {
            let at = from + found;
            let open = at + "calc(".len();
            let close = matching_paren(bytes, open).unwrap_or(bytes.len());
            from = close;
            if at > 0 && (bytes[at - 1].is_ascii_alphanumeric() || bytes[at - 1] == b'_') {
                continue;
            }
            let inner = &bytes[open..close];
            for j in 0..inner.len() {
                let op = inner[j];
                if op != b'+' && op != b'-' {
                    continue;
                }
                // part of an identifier such as `var(--gap)` or `1e+3`
                if j > 0 && op == b'-' && (inner[j - 1].is_ascii_alphabetic() || matches!(inner[j - 1], b'-' | b'_')) {
                    continue;
                }
                if op == b'+' && j >= 2 && inner[j - 1] == b'e' && inner[j - 2].is_ascii_digit() {
                    continue;
                }
                let prev = inner[..j].iter().rev().copied().find(|b| !b.is_ascii_whitespace());
                match prev {
                    None | Some(b'(' | b',' | b'+' | b'-' | b'*' | b'/') => continue,
                    Some(_) => {}
                }
                let sign = op as char;
                if !inner[j - 1].is_ascii_whitespace() {
                    self.report(
                        "function-calc-no-unspaced-operator",
                        base + open + j,
                        &format!("Expected single space before \"{}\" operator", sign),
                    );
                }
                if inner.get(j + 1).map_or(true, |b| !b.is_ascii_whitespace()) {
                    self.report(
                        "function-calc-no-unspaced-operator",
                        base + open + j,
                        &format!("Expected single space after \"{}\" operator", sign),
                    );
                }
            }
        }
    }

    fn check_gradients(&mut self, masked: &str, base: usize) {
        let lower = masked.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        for (at, _) in lower.match_indices("linear-gradient(") {
            // skip vendor-prefixed forms, which use the legacy direction syntax
            let prefix = &lower[..at];
            let word_start = prefix
                .char_indices()
                .rev()
                .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
                .map_or(0, |(p, c)| p + c.len_utf8());
            let word_prefix = &prefix[word_start..];
            if !word_prefix.is_empty() && word_prefix != "repeating-" {
                continue;
            }
            let open = at + "linear-gradient(".len();
            let close = matching_paren(bytes, open).unwrap_or(bytes.len());
            let args = &lower[open..close];
            let Some(comma) = top_level_comma(args) else {
                continue;
            };
            let first: Vec<&str> = args[..comma].split_whitespace().collect();
            if !self.v.standard_direction(&first) {
                self.report(
                    "function-linear-gradient-no-nonstandard-direction",
                    base + word_start,
                    "Unexpected nonstandard direction",
                );
            }
        }
    }

    fn check_font_families(&mut self, value: &str, base: usize) {
        let mut seen = HashSet::new();
        for (start, part) in split_top_level_commas(value) {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lead = part.len() - part.trim_start().len();
            let name = trimmed.trim_matches(|c| c == '"' || c == '\'');
            if !seen.insert(name.to_ascii_lowercase()) {
                self.report(
                    "font-family-no-duplicate-names",
                    base + start + lead,
                    &format!("Unexpected duplicate name {}", name),
                );
            }
        }
    }

    fn check_media_features(&mut self, params: &str, base: usize) {
        let masked = mask(params);
        let bytes = masked.as_bytes();
        // (open offset, contains nested parens)
        let mut stack: Vec<(usize, bool)> = Vec::new();
        let mut names = Vec::new();
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'(' => {
                    if let Some(top) = stack.last_mut() {
                        top.1 = true;
                    }
                    stack.push((i, false));
                }
                b')' => {
                    if let Some((open, nested)) = stack.pop() {
                        if !nested {
                            names.extend(feature_names(&masked[open + 1..i], open + 1));
                        }
                    }
                }
                _ => {}
            }
        }
        for (at, name) in names {
            let lower = name.to_ascii_lowercase();
            if has_vendor_prefix(&lower) {
                continue;
            }
            let bare = lower
                .strip_prefix("min-")
                .or_else(|| lower.strip_prefix("max-"))
                .unwrap_or(&lower);
            if !MEDIA_FEATURES.contains(&bare) && !MEDIA_FEATURES.contains(&lower.as_str()) {
                self.report(
                    "media-feature-name-no-unknown",
                    base + at,
                    &format!("Unexpected unknown media feature name \"{}\"", name),
                );
            }
        }
    }

    fn check_selector(&mut self, selector: &str, base: usize) {
        let scan = scan_selector(selector);
        for (at, name) in scan.types {
            let lower = name.to_ascii_lowercase();
            if lower.contains('-') || !lower.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            if !TYPE_SELECTORS.contains(&lower.as_str()) {
                self.report(
                    "selector-type-no-unknown",
                    base + at,
                    &format!("Unexpected unknown type selector \"{}\"", name),
                );
            }
        }
        for pseudo in scan.pseudos {
            let lower = pseudo.name.to_ascii_lowercase();
            if lower.is_empty() || has_vendor_prefix(&lower) {
                continue;
            }
            if pseudo.element {
                if !PSEUDO_ELEMENTS.contains(&lower.as_str()) {
                    self.report(
                        "selector-pseudo-element-no-unknown",
                        base + pseudo.offset,
                        &format!("Unexpected unknown pseudo-element selector \"::{}\"", pseudo.name),
                    );
                }
            } else if !PSEUDO_CLASSES.contains(&lower.as_str())
                && !LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str())
            {
                self.report(
                    "selector-pseudo-class-no-unknown",
                    base + pseudo.offset,
                    &format!("Unexpected unknown pseudo-class selector \":{}\"", pseudo.name),
                );
            }
        }
    }

    /// A node or closing brace that starts its line must be indented two
    /// spaces per nesting level.
    fn check_indent(&mut self, offset: usize, depth: usize) {
        if !self.rep.enabled("indentation") {
            return;
        }
        let (line, _) = self.index.position(offset);
        let lead = &self.src[self.index.line_start(line)..offset];
        if !lead.bytes().all(|b| b == b' ' || b == b'\t') {
            return;
        }
        let expected = depth * INDENT_WIDTH;
        if lead.len() != expected || lead.contains('\t') {
            self.report(
                "indentation",
                offset,
                &format!("Expected indentation of {} spaces", expected),
            );
        }
    }

    fn check_lines(&mut self) {
        let mut lines: Vec<(usize, &str)> = numbered_lines(self.src).collect();
        if self.src.ends_with('\n') {
            lines.pop();
        }
        let mut empty_run = 0;
        for (n, line) in lines {
            if line.trim().is_empty() {
                empty_run += 1;
                if empty_run == MAX_EMPTY_LINES + 1 {
                    self.report_pos(
                        "max-empty-lines",
                        n,
                        1,
                        &format!("Expected no more than {} empty lines", MAX_EMPTY_LINES),
                    );
                }
            } else {
                empty_run = 0;
            }
            let kept = line.trim_end_matches([' ', '\t']);
            if kept.len() < line.len() {
                self.report_pos(
                    "no-eol-whitespace",
                    n,
                    kept.chars().count() + 1,
                    "Unexpected whitespace at end of line",
                );
            }
        }
    }
}

/// Copy of `text` with string literals, comments and `url()` arguments
/// blanked out, keeping every byte offset intact.
fn mask(text: &str) -> String {
    let b = text.as_bytes();
    let mut out = b.to_vec();
    let blank = |out: &mut Vec<u8>, from: usize, to: usize| out[from..to].fill(b' ');
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            q @ (b'"' | b'\'') => {
                let start = i;
                i += 1;
                while i < b.len() && b[i] != q {
                    if b[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                let end = (i + 1).min(b.len());
                blank(&mut out, start, end);
                i = end;
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/").map_or(b.len(), |e| i + 2 + e + 2);
                blank(&mut out, i, end);
                i = end;
            }
            b'u' | b'U'
                if b.len() >= i + 4
                    && b[i..i + 4].eq_ignore_ascii_case(b"url(")
                    && (i == 0 || !(b[i - 1].is_ascii_alphanumeric() || b[i - 1] == b'-')) =>
            {
                let open = i + 4;
                let close = text[open..].find(')').map_or(b.len(), |e| open + e);
                blank(&mut out, open, close);
                i = close;
            }
            _ => i += 1,
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| " ".repeat(b.len()))
}

/// Offsets of string literals that contain an unescaped line break.
fn newline_strings(text: &str) -> Vec<usize> {
    let b = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < b.len() {
        if let q @ (b'"' | b'\'') = b[i] {
            let start = i;
            let mut has_newline = false;
            i += 1;
            while i < b.len() && b[i] != q {
                match b[i] {
                    b'\\' => i += 1,
                    b'\n' => has_newline = true,
                    _ => {}
                }
                i += 1;
            }
            if has_newline {
                found.push(start);
            }
        }
        i += 1;
    }
    found
}

/// Offset and text of the unit of a dimension token such as `10px`.
fn dimension_unit(word: &str) -> Option<(usize, &str)> {
    let body = word.trim_start_matches(['-', '+']);
    let sign = word.len() - body.len();
    let digits = body
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    if digits == 0 || !body.as_bytes()[..digits].iter().any(u8::is_ascii_digit) {
        return None;
    }
    let unit = &body[digits..];
    if unit.is_empty() || !unit.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some((sign + digits, unit))
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn top_level_comma(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split on commas outside strings and parentheses, keeping part offsets.
fn split_top_level_commas(text: &str) -> Vec<(usize, &str)> {
    let masked = mask(text);
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in masked.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

/// Selector list with whitespace collapsed and parts sorted, so that
/// `a, b` and `b,a` compare equal.
fn normalize_selector(selector: &str) -> String {
    let mut parts: Vec<String> = split_top_level_commas(selector)
        .into_iter()
        .map(|(_, p)| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    parts.sort();
    parts.join(",")
}

/// `@import` target and media list.
fn import_target(params: &str) -> (String, String) {
    let p = params.trim();
    let (target, rest) = if p.get(..4).is_some_and(|s| s.eq_ignore_ascii_case("url(")) {
        match p.find(')') {
            Some(end) => (&p[4..end], &p[end + 1..]),
            None => (&p[4..], ""),
        }
    } else {
        match p.find(char::is_whitespace) {
            Some(end) => (&p[..end], &p[end..]),
            None => (p, ""),
        }
    };
    let url = target.trim().trim_matches(|c| c == '"' || c == '\'');
    (url.to_string(), rest.trim().to_ascii_lowercase())
}

/// Feature names inside one innermost media condition, e.g. `min-width: 1px`
/// or `400px <= width`.
fn feature_names(group: &str, base: usize) -> Vec<(usize, &str)> {
    let lead = |s: &str| s.len() - s.trim_start().len();
    if let Some(colon) = group.find(':') {
        let name = group[..colon].trim();
        return vec![(base + lead(group), name)];
    }
    if group.contains(['<', '>', '=']) {
        let mut out = Vec::new();
        let mut start = 0;
        for (i, c) in group.char_indices().chain(std::iter::once((group.len(), '<'))) {
            if matches!(c, '<' | '>' | '=') {
                let part = &group[start..i];
                let name = part.trim();
                if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    out.push((base + start + lead(part), name));
                }
                start = i + c.len_utf8();
            }
        }
        return out;
    }
    let name = group.trim();
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) && !name.contains(char::is_whitespace) {
        vec![(base + lead(group), name)]
    } else {
        Vec::new()
    }
}

struct Pseudo<'a> {
    offset: usize,
    name: &'a str,
    element: bool,
}

struct SelectorScan<'a> {
    types: Vec<(usize, &'a str)>,
    pseudos: Vec<Pseudo<'a>>,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'\\') || b >= 0x80
}

fn scan_selector(selector: &str) -> SelectorScan<'_> {
    let masked = mask(selector);
    let b = masked.as_bytes();
    let ident_end = |mut i: usize| {
        while i < b.len() && is_ident_byte(b[i]) {
            if b[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        i.min(b.len())
    };
    let mut scan = SelectorScan {
        types: Vec::new(),
        pseudos: Vec::new(),
    };
    let mut compound_start = true;
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            c if c.is_ascii_whitespace() || matches!(c, b'>' | b'+' | b'~' | b',' | b'(') => {
                compound_start = true;
                i += 1;
            }
            b'[' => {
                i = masked[i..].find(']').map_or(b.len(), |e| i + e + 1);
                compound_start = false;
            }
            b'.' | b'#' => {
                i = ident_end(i + 1);
                compound_start = false;
            }
            b':' => {
                let element = b.get(i + 1) == Some(&b':');
                let offset = i;
                let start = if element { i + 2 } else { i + 1 };
                i = ident_end(start);
                let name = &selector[start..i];
                scan.pseudos.push(Pseudo {
                    offset,
                    name,
                    element,
                });
                compound_start = false;
                if b.get(i) == Some(&b'(') {
                    if SELECTOR_ARGUMENT_PSEUDOS.contains(&name.to_ascii_lowercase().as_str()) {
                        compound_start = true;
                        i += 1;
                    } else {
                        i = matching_paren(b, i + 1).map_or(b.len(), |e| e + 1);
                    }
                }
            }
            c if is_ident_byte(c) && !c.is_ascii_digit() => {
                let start = i;
                i = ident_end(i);
                if compound_start && b.get(i) != Some(&b'|') {
                    scan.types.push((start, &selector[start..i]));
                }
                compound_start = false;
            }
            _ => {
                compound_start = false;
                i += 1;
            }
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::VALIDATION_ERROR_RULE;

    fn lint(src: &str) -> Vec<Finding> {
        CssValidator::default().lint(src).unwrap()
    }

    fn rules_of(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.issue.rule.as_str()).collect()
    }

    fn count(findings: &[Finding], rule: &str) -> usize {
        findings.iter().filter(|f| f.issue.rule == rule).count()
    }

    #[test]
    fn test_clean_stylesheet_scores_full() {
        let r = CssValidator::default().validate("style.css", "body { color: red; }\n");
        assert!(!r.has_issues(), "{:?}", r);
        assert_eq!(r.score, 100);

        let src = "@import url(\"reset.css\");\n\n:root {\n  --accent: #0af;\n}\n\n@media (max-width: 600px) and (prefers-color-scheme: dark) {\n  .card > h2::before,\n  a:hover {\n    margin: 0 auto;\n    width: calc(100% - 2rem);\n    background: linear-gradient(to top right, #fff, #000);\n    font-family: \"Open Sans\", Arial, sans-serif;\n  }\n}\n\n@keyframes fade {\n  from { opacity: 0; }\n  50% { opacity: 0.5; }\n}\n";
        assert!(lint(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn test_parse_failure_becomes_validation_error() {
        let r = CssValidator::default().validate("broken.css", "body { color: red;");
        assert_eq!(r.score, 0);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].rule, VALIDATION_ERROR_RULE);
        assert_eq!(r.errors[0].message, "CSS validation failed: Unclosed block (1:1)");
        assert_eq!((r.errors[0].line, r.errors[0].column), (1, 1));
    }

    #[test]
    fn test_odd_inputs_never_panic() {
        let corpus = [
            "", "{", "}", "a{", "a{}", "a { color", "a { color:", "a { color: red", "/*", "/* \u{e9}", "@",
            "@media", "@media {", "@media (", "a { b: url(", "a { b: url(x", "a { content: '", "a { color: #",
            "a { color: #\u{e9}; }", "a { width: 1\u{e9}; }", "\u{e9} { x: y; }", "a { background: linear-gradient(",
            "a { background: linear-gradient(45", "a { background: \u{a0}linear-gradient(to, ); }",
            "a { width: calc(", "a { width: calc(1px +", "a { width: calc(-1px-2px); }", "a{;;}",
            "@font-face{src:url()}", "a:nth-child( { }", "[", "a[href { }", "a { b: \u{a0}; }",
            "a { --x: {}; }", "\u{feff}a{}", "\u{1f600}{}", "a { font-family: ,,; }", "a{}\r\n\r\n\r\n\r\n",
            "\t\ta { color: red; }", "a { color: red !; }", "@import", "@import url(", "a { margin: 0 0 0 0 0; }",
        ];
        let v = CssValidator::default();
        for src in corpus {
            let r = v.validate("odd.css", src);
            assert!(r.score <= r.max_score, "{:?}", src);
            if r.errors.iter().any(|e| e.rule == VALIDATION_ERROR_RULE) {
                assert_eq!(r.errors.len(), 1, "{:?}", src);
                assert_eq!(r.score, 0, "{:?}", src);
            }
        }
        let deep = v.validate("deep.css", &"a{".repeat(10_000));
        assert_eq!(deep.errors[0].rule, VALIDATION_ERROR_RULE);
    }

    #[test]
    fn test_empty_source() {
        let findings = lint("  \n");
        assert_eq!(rules_of(&findings), vec!["no-empty-source"]);
        assert_eq!(findings[0].issue.message, "Unexpected empty source (no-empty-source)");
    }

    #[test]
    fn test_block_and_comment_rules() {
        let findings = lint("a {}\n/* */\nb { color: red;; }\n");
        assert_eq!(count(&findings, "block-no-empty"), 1);
        assert_eq!(count(&findings, "comment-no-empty"), 1);
        assert_eq!(count(&findings, "no-extra-semicolons"), 1);
        let semi = findings.iter().find(|f| f.issue.rule == "no-extra-semicolons").unwrap();
        assert_eq!((semi.issue.line, semi.issue.column), (3, 16));
    }

    #[test]
    fn test_declaration_block_rules() {
        let src = "a {\n  padding-top: 1px;\n  padding: 0;\n  color: red;\n  COLOR: blue;\n  font-family: Arial, \"arial\", serif;\n}\n";
        let findings = lint(src);
        let shorthand = findings
            .iter()
            .find(|f| f.issue.rule == "declaration-block-no-shorthand-property-overrides")
            .unwrap();
        assert_eq!(
            shorthand.issue.message,
            "Unexpected shorthand \"padding\" after \"padding-top\" (declaration-block-no-shorthand-property-overrides)"
        );
        let dup = findings
            .iter()
            .find(|f| f.issue.rule == "declaration-block-no-duplicate-properties")
            .unwrap();
        assert_eq!(dup.issue.line, 5);
        assert_eq!(count(&findings, "font-family-no-duplicate-names"), 1);
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn test_value_rules() {
        let src = "a {\n  color: #ff;\n  width: calc(100%+1px);\n  margin: 10pxx;\n  background: linear-gradient(top, #fff, #000);\n  content: url(#notacolor);\n}\n";
        let findings = lint(src);
        let hex = findings.iter().find(|f| f.issue.rule == "color-no-invalid-hex").unwrap();
        assert_eq!(hex.issue.message, "Unexpected invalid hex color \"#ff\" (color-no-invalid-hex)");
        assert_eq!((hex.issue.line, hex.issue.column), (2, 10));
        assert_eq!(count(&findings, "color-no-invalid-hex"), 1);
        assert_eq!(count(&findings, "function-calc-no-unspaced-operator"), 2);
        let unit = findings.iter().find(|f| f.issue.rule == "unit-no-unknown").unwrap();
        assert_eq!(unit.issue.message, "Unexpected unknown unit \"pxx\" (unit-no-unknown)");
        assert_eq!(count(&findings, "function-linear-gradient-no-nonstandard-direction"), 1);
    }

    #[test]
    fn test_gradient_directions() {
        let v = CssValidator::default();
        assert!(v.standard_direction(&["45deg"]));
        assert!(v.standard_direction(&["to", "left"]));
        assert!(v.standard_direction(&["red"]));
        assert!(!v.standard_direction(&["45"]));
        assert!(!v.standard_direction(&["to", "top", "bottom"]));
        assert!(!v.standard_direction(&["left"]));
    }

    #[test]
    fn test_gradient_after_non_ascii_separator() {
        let src = "a {\n  background: url(a.png),\u{a0}linear-gradient(red, blue);\n}\n";
        let r = CssValidator::default().validate("a.css", src);
        assert!(r.errors.iter().all(|e| e.rule != VALIDATION_ERROR_RULE), "{:?}", r);
        assert_eq!(count(&lint(src), "function-linear-gradient-no-nonstandard-direction"), 0);

        let findings = lint("a {\n  background: url(a.png),\u{a0}linear-gradient(45, red, blue);\n}\n");
        let bad = findings
            .iter()
            .find(|f| f.issue.rule == "function-linear-gradient-no-nonstandard-direction")
            .unwrap();
        assert_eq!((bad.issue.line, bad.issue.column), (2, 27));
    }

    #[test]
    fn test_unknown_names() {
        let src = "@foo;\n@media (min-widht: 10px) {\n  foo { colr: red; }\n}\na:hovr::befor {\n  color: red;\n}\nmy-element, svg, a:before { color: red; }\n";
        let findings = lint(src);
        let msgs: Vec<_> = findings.iter().map(|f| f.issue.message.as_str()).collect();
        assert!(msgs.contains(&"Unexpected unknown at-rule \"@foo\" (at-rule-no-unknown)"));
        assert!(msgs.contains(&"Unexpected unknown media feature name \"min-widht\" (media-feature-name-no-unknown)"));
        assert!(msgs.contains(&"Unexpected unknown type selector \"foo\" (selector-type-no-unknown)"));
        assert!(msgs.contains(&"Unexpected unknown property \"colr\" (property-no-unknown)"));
        assert!(msgs.contains(&"Unexpected unknown pseudo-class selector \":hovr\" (selector-pseudo-class-no-unknown)"));
        assert!(msgs.contains(&"Unexpected unknown pseudo-element selector \"::befor\" (selector-pseudo-element-no-unknown)"));
        assert_eq!(findings.len(), 6, "{:?}", msgs);
    }

    #[test]
    fn test_duplicates_across_rules() {
        let src = "@import \"a.css\";\n@import url(a.css);\na, b { color: red; }\nb,a { margin: 0; }\n@media print {\n  a, b { color: red; }\n}\n";
        let findings = lint(src);
        assert_eq!(count(&findings, "no-duplicate-at-import-rules"), 1);
        let dup = findings.iter().find(|f| f.issue.rule == "no-duplicate-selectors").unwrap();
        assert_eq!(
            dup.issue.message,
            "Unexpected duplicate selector \"b,a\", first used at line 3 (no-duplicate-selectors)"
        );
        assert_eq!(count(&findings, "no-duplicate-selectors"), 1);
    }

    #[test]
    fn test_keyframes_and_double_slash() {
        let src = "@keyframes spin {\n  to { transform: rotate(1turn) !important; }\n}\na {\n  // color: red;\n  margin: 0;\n}\n";
        let findings = lint(src);
        assert_eq!(
            rules_of(&findings),
            vec!["keyframe-declaration-no-important", "no-invalid-double-slash-comments"]
        );
    }

    #[test]
    fn test_string_newline() {
        let findings = lint("a {\n  content: \"one\ntwo\";\n}\n");
        assert_eq!(rules_of(&findings), vec!["string-no-newline"]);
        assert_eq!(findings[0].issue.line, 2);
    }

    #[test]
    fn test_stylistic_rules() {
        let src = "a {\n    color: red; \n}\n\n\n\nb {\n  color: blue;\n  }\n";
        let findings = lint(src);
        let indents: Vec<_> = findings
            .iter()
            .filter(|f| f.issue.rule == "indentation")
            .map(|f| (f.issue.line, f.issue.message.as_str()))
            .collect();
        assert_eq!(
            indents,
            vec![
                (2, "Expected indentation of 2 spaces (indentation)"),
                (9, "Expected indentation of 0 spaces (indentation)"),
            ]
        );
        let eol = findings.iter().find(|f| f.issue.rule == "no-eol-whitespace").unwrap();
        assert_eq!((eol.issue.line, eol.issue.column), (2, 16));
        let empty = findings.iter().find(|f| f.issue.rule == "max-empty-lines").unwrap();
        assert_eq!(empty.issue.line, 6);
    }

    #[test]
    fn test_all_rules_default_to_error() {
        let r = CssValidator::default().validate("a.css", "a {}\n");
        assert_eq!(r.errors.len(), 1);
        assert!(r.warnings.is_empty());
        assert_eq!(r.score, 92);
    }
}
