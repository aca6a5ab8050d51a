//! Layout rules: indentation, blank lines, trailing whitespace and the final
//! newline.
//!
//! Indentation comes from a bracket scan over the raw source. Literals and
//! comments are opaque to the scan; the AST tells it where statements, case
//! clauses and block braces start.

use super::Pass;
use oxc_ast::ast::Statement;
use oxc_ast::AstKind;
use oxc_span::{GetSpan, Span};
use std::collections::{HashMap, HashSet};

const INDENT: usize = 2;
const MAX_EMPTY_LINES: usize = 2;

#[derive(Default)]
pub(super) struct Layout {
    /// Statement start → number of brace-less bodies it sits in.
    statements: HashMap<usize, usize>,
    cases: HashSet<usize>,
    blocks: HashSet<usize>,
    /// Literal start → end.
    literals: HashMap<usize, usize>,
    templates: Vec<(usize, usize)>,
}

impl Layout {
    fn literal(&mut self, span: Span) {
        let end = self.literals.entry(span.start as usize).or_insert(0);
        *end = (*end).max(span.end as usize);
    }

    fn list(&mut self, body: &[Statement<'_>]) {
        for stmt in body {
            self.statements.insert(stmt.span().start as usize, 0);
        }
    }

    /// Body of an `if` or loop: a block brings its own list, anything else
    /// sits one level deeper than its owner.
    fn body(&mut self, stmt: &Statement<'_>, owner: Span) {
        if matches!(stmt, Statement::BlockStatement(_)) {
            return;
        }
        let extra = self.statements.get(&(owner.start as usize)).copied().unwrap_or(0);
        self.statements.insert(stmt.span().start as usize, extra + 1);
    }

    fn brace(&mut self, src: &str, span: Span) {
        if src.as_bytes().get(span.start as usize) == Some(&b'{') {
            self.blocks.insert(span.start as usize);
        }
    }
}

impl Pass<'_, '_> {
    pub(super) fn layout(&self) -> Layout {
        let src = self.src;
        let mut layout = Layout::default();
        for node in self.semantic.nodes().iter() {
            match node.kind() {
                AstKind::StringLiteral(s) => layout.literal(s.span),
                AstKind::Directive(d) => layout.literal(d.expression.span),
                AstKind::RegExpLiteral(r) => layout.literal(r.span),
                AstKind::TemplateLiteral(t) => {
                    layout.literal(t.span);
                    layout.templates.push((t.span.start as usize, t.span.end as usize));
                }
                AstKind::Program(p) => layout.list(&p.body),
                AstKind::BlockStatement(b) => {
                    layout.brace(src, b.span);
                    layout.list(&b.body);
                }
                AstKind::FunctionBody(b) => {
                    layout.brace(src, b.span);
                    layout.list(&b.statements);
                }
                AstKind::StaticBlock(b) => {
                    layout.brace(src, b.span);
                    layout.list(&b.body);
                }
                AstKind::ClassBody(b) => {
                    layout.brace(src, b.span);
                    for element in b.body.iter() {
                        layout.statements.insert(element.span().start as usize, 0);
                    }
                }
                AstKind::SwitchStatement(s) => {
                    let from = s.discriminant.span().end as usize;
                    if let Some(open) = src.get(from..).and_then(|rest| rest.find('{')) {
                        layout.blocks.insert(from + open);
                    }
                    for case in s.cases.iter() {
                        layout.cases.insert(case.span.start as usize);
                    }
                }
                AstKind::SwitchCase(c) => layout.list(&c.consequent),
                AstKind::IfStatement(s) => {
                    layout.body(&s.consequent, s.span);
                    match &s.alternate {
                        // `else if` stays at the level of its `if`
                        Some(alt @ Statement::IfStatement(_)) => {
                            let extra = layout.statements.get(&(s.span.start as usize)).copied().unwrap_or(0);
                            layout.statements.insert(alt.span().start as usize, extra);
                        }
                        Some(alt) => layout.body(alt, s.span),
                        None => {}
                    }
                }
                AstKind::ForStatement(s) => layout.body(&s.body, s.span),
                AstKind::ForInStatement(s) => layout.body(&s.body, s.span),
                AstKind::ForOfStatement(s) => layout.body(&s.body, s.span),
                AstKind::WhileStatement(s) => layout.body(&s.body, s.span),
                AstKind::DoWhileStatement(s) => layout.body(&s.body, s.span),
                _ => {}
            }
        }
        layout
    }

    pub(super) fn check_indent(&mut self, layout: &Layout) {
        let src = self.src;
        let bytes = src.as_bytes();
        // (offset of the open bracket, indent of its line)
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut line_indent = 0;
        let mut line_start = 0;
        let mut fresh = true;
        let mut prev: Option<u8> = None;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\n' {
                fresh = true;
                line_start = i + 1;
                i += 1;
                continue;
            }
            if matches!(b, b' ' | b'\t' | b'\r') {
                i += 1;
                continue;
            }
            let literal_end = layout.literals.get(&i).copied();
            let comment_end = match (literal_end, b, bytes.get(i + 1)) {
                (None, b'/', Some(b'/')) => Some(src[i..].find('\n').map_or(bytes.len(), |p| i + p)),
                (None, b'/', Some(b'*')) => Some(src[i + 2..].find("*/").map_or(bytes.len(), |p| i + p + 4)),
                _ => None,
            };
            if let Some(end) = comment_end {
                fresh = false;
                i = end;
                continue;
            }
            if fresh {
                fresh = false;
                let top = stack.last().copied();
                let lead = &src[line_start..i];
                line_indent = match expected_indent(layout, i, b, top, prev) {
                    Some(expected) => {
                        if lead.len() != expected || lead.contains('\t') {
                            let message = format!(
                                "Expected indentation of {} {} but found {}.",
                                expected,
                                if expected == 1 { "space" } else { "spaces" },
                                describe_indent(lead)
                            );
                            self.report("indent", line_start as u32, &message);
                        }
                        expected
                    }
                    None => lead.len(),
                };
            }
            if let Some(end) = literal_end {
                prev = Some(b'"');
                i = end.max(i + 1);
                continue;
            }
            match b {
                b'(' | b'[' | b'{' => stack.push((i, line_indent)),
                b')' | b']' | b'}' => {
                    stack.pop();
                }
                _ => {}
            }
            prev = Some(b);
            i += 1;
        }
    }

    pub(super) fn check_lines(&mut self, layout: &Layout) {
        let inside = |offset: usize| layout.templates.iter().any(|(s, e)| *s < offset && offset < *e);

        let mut raw_lines: Vec<&str> = self.src.split('\n').collect();
        if self.src.ends_with('\n') {
            raw_lines.pop();
        }
        let mut offset = 0;
        let mut empty_run = 0;
        for (idx, raw) in raw_lines.iter().enumerate() {
            let n = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let start = offset;
            let newline = start + raw.len();
            offset = newline + 1;

            if line.trim().is_empty() && !inside(start) {
                empty_run += 1;
                if empty_run == MAX_EMPTY_LINES + 1 {
                    self.rep.report(
                        "no-multiple-empty-lines",
                        n,
                        1,
                        format!("More than {} blank lines not allowed.", MAX_EMPTY_LINES),
                    );
                }
            } else {
                empty_run = 0;
            }

            if !inside(newline) {
                let kept = line.trim_end_matches(|c: char| c.is_whitespace());
                if kept.len() < line.len() {
                    self.rep
                        .report("no-trailing-spaces", n, kept.chars().count() + 1, "Trailing spaces not allowed.");
                }
            }
        }

        if !self.src.is_empty() && !self.src.ends_with('\n') {
            let (line, col) = self.index.position(self.src.len());
            self.rep
                .report("eol-last", line, col, "Newline required at end of file but not found.");
        }
    }
}

/// Indent required for a line whose first significant byte `b` sits at
/// `at`, or `None` when the line continues an expression and is left alone.
fn expected_indent(layout: &Layout, at: usize, b: u8, top: Option<(usize, usize)>, prev: Option<u8>) -> Option<usize> {
    let base = top.map_or(0, |(_, indent)| indent + INDENT);
    if matches!(b, b')' | b']' | b'}') {
        return Some(top.map_or(0, |(_, indent)| indent));
    }
    if layout.cases.contains(&at) {
        return Some(base.saturating_sub(INDENT));
    }
    if let Some(extra) = layout.statements.get(&at) {
        return Some(base + extra * INDENT);
    }
    let after_separator = matches!(prev, Some(b'(' | b'[' | b'{' | b','));
    let in_list = top.is_some_and(|(open, _)| !layout.blocks.contains(&open));
    (after_separator && in_list).then_some(base)
}

fn describe_indent(lead: &str) -> String {
    let spaces = lead.bytes().filter(|b| *b == b' ').count();
    let tabs = lead.bytes().filter(|b| *b == b'\t').count();
    let plural = |n: usize, unit: &str| format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" });
    match (spaces, tabs) {
        (0, 0) => "0".to_string(),
        (s, 0) => plural(s, "space"),
        (0, t) => plural(t, "tab"),
        (s, t) => format!("{} and {}", plural(s, "space"), plural(t, "tab")),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{lint, messages, rules};
    use super::describe_indent;

    #[test]
    fn test_indent() {
        let findings = lint("function f() {\n    return 1;\n}\nif (f()) {\n\tf();\n}\nif (f())\n  f();\nconst o = f(\n  1,\n  2\n);\nconst v = [1, 2]\n  .map((n) => n * 2);\nconsole.log(o, v);\n");
        assert_eq!(
            messages(&findings, "indent"),
            vec![
                (2, 1, "Expected indentation of 2 spaces but found 4.".to_string()),
                (5, 1, "Expected indentation of 2 spaces but found 1 tab.".to_string()),
            ]
        );
    }

    #[test]
    fn test_brackets_in_literals_and_comments_do_not_nest() {
        let src = "const a = '{[(';\n// {\n/* ( */\nconst re = /[(]/;\nconst t = `${a} }`;\nif (a) {\n  console.log(a, re, t);\n}\n";
        assert!(rules(src).is_empty(), "{:?}", rules(src));
    }

    #[test]
    fn test_else_if_chain_and_braceless_else() {
        let src = "const a = 1;\nif (a === 1) {\n  console.log(a);\n} else if (a === 2)\n  console.log(2);\nelse\n  console.log(3);\n";
        assert!(rules(src).is_empty(), "{:?}", rules(src));
    }

    #[test]
    fn test_line_rules() {
        let findings = lint("const a = 1;   \n\n\n\nconst b = `x  \n`;\nconsole.log(a, b);");
        assert_eq!(
            messages(&findings, "no-trailing-spaces"),
            vec![(1, 13, "Trailing spaces not allowed.".to_string())]
        );
        assert_eq!(
            messages(&findings, "no-multiple-empty-lines"),
            vec![(4, 1, "More than 2 blank lines not allowed.".to_string())]
        );
        assert_eq!(
            messages(&findings, "eol-last"),
            vec![(7, 19, "Newline required at end of file but not found.".to_string())]
        );
    }

    #[test]
    fn test_describe_indent() {
        assert_eq!(describe_indent(""), "0");
        assert_eq!(describe_indent("    "), "4 spaces");
        assert_eq!(describe_indent("\t"), "1 tab");
        assert_eq!(describe_indent(" \t\t"), "1 space and 2 tabs");
    }
}
