//! Rules over single AST nodes and statement lists.

use super::bindings::bound_names;
use super::{regexp, Pass};
use crate::error::EngineFailure;
use crate::utils::LineIndex;
use oxc_ast::ast::{
    Argument, AssignmentExpression, AssignmentTarget, BinaryExpression, Expression, FormalParameters,
    ObjectExpression, ObjectPropertyKind, Program, PropertyKey, PropertyKind, Statement, VariableDeclarationKind,
};
use oxc_ast::AstKind;
use oxc_semantic::{AstNode, Semantic};
use oxc_span::{GetSpan, Span};
use oxc_syntax::operator::{AssignmentOperator, BinaryOperator, UnaryOperator};
use std::collections::{HashMap, HashSet};

const TYPEOF_RESULTS: &[&str] = &[
    "symbol", "undefined", "object", "boolean", "number", "string", "function", "bigint",
];

/// Regular expression literals are checked like the parser checks any other
/// token: an invalid one fails the whole file.
pub(super) fn check_regexp_literals(
    semantic: &Semantic<'_>,
    src: &str,
    index: &LineIndex<'_>,
) -> Result<(), EngineFailure> {
    for node in semantic.nodes().iter() {
        let AstKind::RegExpLiteral(lit) = node.kind() else {
            continue;
        };
        let text = lit.span.source_text(src);
        let Some(close) = text.rfind('/').filter(|close| *close > 0) else {
            continue;
        };
        let (body, flags) = (&text[1..close], &text[close + 1..]);
        let unicode = flags.contains('u') || flags.contains('v');
        let reason = if regexp::valid_flags(flags) {
            regexp::check_pattern(body, unicode).err()
        } else {
            Some("Invalid regular expression flags")
        };
        if let Some(reason) = reason {
            let (line, col) = index.position(lit.span.start as usize);
            let message = format!("Invalid regular expression: /{}/{}: {}", body, flags, reason);
            return Err(EngineFailure::at(&message, line, col));
        }
    }
    Ok(())
}

impl<'a> Pass<'_, 'a> {
    pub(super) fn check_nodes(&mut self) {
        let semantic = self.semantic;
        let mut quoted = HashSet::new();
        for node in semantic.nodes().iter() {
            match node.kind() {
                AstKind::StringLiteral(lit) => self.check_quotes(lit.span, &mut quoted),
                AstKind::Directive(d) => self.check_quotes(d.expression.span, &mut quoted),
                AstKind::TemplateLiteral(t) if t.expressions.is_empty() => {
                    let tagged = matches!(
                        semantic.nodes().parent_kind(node.id()),
                        Some(AstKind::TaggedTemplateExpression(_))
                    );
                    if !tagged && !t.span.source_text(self.src).contains('\n') {
                        self.report("quotes", t.span.start, "Strings must use singlequote.");
                    }
                }
                AstKind::BinaryExpression(e) => self.check_typeof(e),
                AstKind::NewExpression(e) => self.check_regexp_call(e.span, &e.callee, &e.arguments),
                AstKind::CallExpression(e) => self.check_regexp_call(e.span, &e.callee, &e.arguments),
                AstKind::ObjectExpression(o) => self.check_dupe_keys(o),
                AstKind::FormalParameters(params) => self.check_dupe_args(params),
                AstKind::AssignmentExpression(e) => self.check_self_assign(e),
                AstKind::Program(p) => {
                    self.check_unreachable(&p.body);
                    self.check_duplicate_imports(p);
                }
                AstKind::BlockStatement(b) => {
                    let text = b.span.source_text(self.src);
                    if b.body.is_empty() && text.len() >= 2 && text[1..text.len() - 1].trim().is_empty() {
                        self.report("no-empty", b.span.start, "Empty block statement.");
                    }
                    self.check_unreachable(&b.body);
                }
                AstKind::FunctionBody(b) => self.check_unreachable(&b.statements),
                AstKind::StaticBlock(b) => self.check_unreachable(&b.body),
                AstKind::SwitchCase(c) => self.check_unreachable(&c.consequent),
                AstKind::SwitchStatement(s) if s.cases.is_empty() => {
                    self.report("no-empty", s.span.start, "Empty switch statement.");
                }
                AstKind::VariableDeclaration(d) => {
                    if d.kind == VariableDeclarationKind::Var {
                        self.report("no-var", d.span.start, "Unexpected var, use let or const instead.");
                    }
                    if !self.in_for_head(node, d.span) {
                        self.check_semi(d.span);
                    }
                }
                AstKind::DebuggerStatement(s) => {
                    self.report("no-debugger", s.span.start, "Unexpected 'debugger' statement.");
                    self.check_semi(s.span);
                }
                AstKind::ExportNamedDeclaration(d) if d.declaration.is_none() => self.check_semi(d.span),
                AstKind::ExpressionStatement(s) if !self.is_arrow_expression_body(node) => self.check_semi(s.span),
                AstKind::ReturnStatement(s) => self.check_semi(s.span),
                AstKind::ThrowStatement(s) => self.check_semi(s.span),
                AstKind::BreakStatement(s) => self.check_semi(s.span),
                AstKind::ContinueStatement(s) => self.check_semi(s.span),
                AstKind::DoWhileStatement(s) => self.check_semi(s.span),
                AstKind::ImportDeclaration(d) => self.check_semi(d.span),
                AstKind::ExportAllDeclaration(d) => self.check_semi(d.span),
                AstKind::PropertyDefinition(p) => self.check_semi(p.span),
                _ => {}
            }
        }
    }

    /// Whether `span` (a declaration or declarator under `node`) sits in the
    /// head of a `for`, `for-in` or `for-of` loop.
    pub(super) fn in_for_head(&self, node: &AstNode<'a>, span: Span) -> bool {
        let nodes = self.semantic.nodes();
        let mut id = node.id();
        for _ in 0..4 {
            let Some(parent) = nodes.parent_node(id) else {
                return false;
            };
            let body = match parent.kind() {
                AstKind::ForStatement(f) => f.body.span(),
                AstKind::ForInStatement(f) => f.body.span(),
                AstKind::ForOfStatement(f) => f.body.span(),
                _ => {
                    id = parent.id();
                    continue;
                }
            };
            return span.end <= body.start;
        }
        false
    }

    /// `() => x` keeps `x` as the lone statement of its body.
    fn is_arrow_expression_body(&self, node: &AstNode<'a>) -> bool {
        let nodes = self.semantic.nodes();
        nodes
            .parent_node(node.id())
            .and_then(|body| nodes.parent_kind(body.id()))
            .is_some_and(|kind| matches!(kind, AstKind::ArrowFunctionExpression(arrow) if arrow.expression))
    }

    fn check_semi(&mut self, span: Span) {
        if span.source_text(self.src).ends_with(';') {
            return;
        }
        let rest = self.src.get(span.end as usize..).unwrap_or("");
        if rest.trim_start_matches([' ', '\t']).starts_with(';') {
            return;
        }
        self.report("semi", span.end, "Missing semicolon.");
    }

    /// String literals are seen both as directives and as their expression.
    fn check_quotes(&mut self, span: Span, seen: &mut HashSet<u32>) {
        if seen.insert(span.start) && span.source_text(self.src).starts_with('"') {
            self.report("quotes", span.start, "Strings must use singlequote.");
        }
    }

    fn check_typeof(&mut self, e: &BinaryExpression<'_>) {
        if !matches!(
            e.operator,
            BinaryOperator::Equality
                | BinaryOperator::Inequality
                | BinaryOperator::StrictEquality
                | BinaryOperator::StrictInequality
        ) {
            return;
        }
        for (side, other) in [(&e.left, &e.right), (&e.right, &e.left)] {
            let is_typeof = matches!(side, Expression::UnaryExpression(u) if u.operator == UnaryOperator::Typeof);
            if !is_typeof {
                continue;
            }
            if let Some(value) = static_string(other) {
                if !TYPEOF_RESULTS.contains(&value.as_str()) {
                    self.report("valid-typeof", other.span().start, "Invalid typeof comparison value.");
                }
            }
        }
    }

    /// `RegExp(...)` and `new RegExp(...)` with literal arguments.
    fn check_regexp_call(&mut self, span: Span, callee: &Expression<'_>, arguments: &[Argument<'_>]) {
        let Expression::Identifier(id) = callee else {
            return;
        };
        if id.name.as_str() != "RegExp" {
            return;
        }
        let Some(pattern) = arguments.first().and_then(argument_string) else {
            return;
        };
        let flags = match arguments.get(1) {
            None => String::new(),
            Some(arg) => match argument_string(arg) {
                Some(flags) => flags,
                None => return,
            },
        };
        if !regexp::valid_flags(&flags) {
            let message = format!("Invalid flags supplied to RegExp constructor '{}'.", flags);
            self.report("no-invalid-regexp", span.start, &message);
            return;
        }
        let unicode = flags.contains('u') || flags.contains('v');
        if let Err(reason) = regexp::check_pattern(&pattern, unicode) {
            let message = format!("Invalid regular expression: /{}/{}: {}.", pattern, flags, reason);
            self.report("no-invalid-regexp", span.start, &message);
        }
    }

    /// A getter and a setter may share a name; anything else may not.
    fn check_dupe_keys(&mut self, object: &ObjectExpression<'_>) {
        let mut seen: HashMap<String, (bool, bool, bool)> = HashMap::new();
        for prop in object.properties.iter() {
            let ObjectPropertyKind::ObjectProperty(prop) = prop else {
                continue;
            };
            let name = match &prop.key {
                PropertyKey::StaticIdentifier(id) => id.name.to_string(),
                PropertyKey::StringLiteral(s) => s.value.to_string(),
                PropertyKey::NumericLiteral(n) => n.value.to_string(),
                _ => continue,
            };
            let entry = seen.entry(name.clone()).or_default();
            let (init, get, set) = *entry;
            let dupe = match prop.kind {
                PropertyKind::Init => init || get || set,
                PropertyKind::Get => init || get,
                PropertyKind::Set => init || set,
            };
            match prop.kind {
                PropertyKind::Init => entry.0 = true,
                PropertyKind::Get => entry.1 = true,
                PropertyKind::Set => entry.2 = true,
            }
            if dupe {
                self.report("no-dupe-keys", prop.span.start, &format!("Duplicate key '{}'.", name));
            }
        }
    }

    fn check_dupe_args(&mut self, params: &FormalParameters<'_>) {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for param in params.items.iter() {
            bound_names(&param.pattern, &mut names);
        }
        for id in names {
            if !seen.insert(id.name.as_str()) {
                self.report("no-dupe-args", id.span.start, &format!("Duplicate param '{}'.", id.name));
            }
        }
    }

    fn check_self_assign(&mut self, e: &AssignmentExpression<'_>) {
        if e.operator != AssignmentOperator::Assign {
            return;
        }
        let simple_left = matches!(
            e.left,
            AssignmentTarget::AssignmentTargetIdentifier(_) | AssignmentTarget::StaticMemberExpression(_)
        );
        let simple_right = matches!(e.right, Expression::Identifier(_) | Expression::StaticMemberExpression(_));
        if !(simple_left && simple_right) {
            return;
        }
        let left = e.left.span().source_text(self.src);
        let right = e.right.span().source_text(self.src);
        if left == right {
            let message = format!("'{}' is assigned to itself.", right);
            self.report("no-self-assign", e.right.span().start, &message);
        }
    }

    /// Reports the first statement after one that always completes abruptly.
    fn check_unreachable(&mut self, body: &[Statement<'_>]) {
        let mut dead = false;
        for stmt in body {
            if dead {
                if hoisted(stmt) {
                    continue;
                }
                self.report("no-unreachable", stmt.span().start, "Unreachable code.");
                return;
            }
            dead = terminates(stmt);
        }
    }

    fn check_duplicate_imports(&mut self, program: &Program<'_>) {
        let mut seen = HashSet::new();
        for stmt in program.body.iter() {
            if let Statement::ImportDeclaration(d) = stmt {
                let source = d.source.value.as_str();
                if !seen.insert(source) {
                    self.report("no-duplicate-imports", d.span.start, &format!("'{}' import is duplicated.", source));
                }
            }
        }
    }
}

fn terminates(stmt: &Statement<'_>) -> bool {
    match stmt {
        Statement::ReturnStatement(_)
        | Statement::ThrowStatement(_)
        | Statement::BreakStatement(_)
        | Statement::ContinueStatement(_) => true,
        Statement::BlockStatement(b) => b.body.iter().any(terminates),
        Statement::IfStatement(s) => terminates(&s.consequent) && s.alternate.as_ref().is_some_and(terminates),
        _ => false,
    }
}

/// Declarations that are fine after a `return`.
fn hoisted(stmt: &Statement<'_>) -> bool {
    match stmt {
        Statement::FunctionDeclaration(_) | Statement::EmptyStatement(_) => true,
        Statement::VariableDeclaration(d) => {
            d.kind == VariableDeclarationKind::Var && d.declarations.iter().all(|d| d.init.is_none())
        }
        _ => false,
    }
}

/// Cooked value of a string literal or substitution-free template.
fn static_string(e: &Expression<'_>) -> Option<String> {
    match e {
        Expression::StringLiteral(s) => Some(s.value.to_string()),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() => t
            .quasis
            .first()
            .and_then(|q| q.value.cooked.as_ref())
            .map(|cooked| cooked.to_string()),
        _ => None,
    }
}

fn argument_string(arg: &Argument<'_>) -> Option<String> {
    arg.as_expression().and_then(static_string)
}
