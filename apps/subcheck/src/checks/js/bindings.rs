//! Rules over the symbol table: undefined names, unused bindings,
//! `prefer-const` and reassigned functions.

use super::{globals, Pass};
use oxc_ast::ast::{BindingIdentifier, BindingPattern, BindingPatternKind, ClassType, FunctionType, VariableDeclarationKind};
use oxc_ast::AstKind;
use oxc_semantic::{AstNode, Reference};
use oxc_span::{GetSpan, Span};
use oxc_syntax::operator::UnaryOperator;
use oxc_syntax::symbol::SymbolFlags;
use std::collections::HashMap;

/// What the unused rules need to know about one declared name.
struct Binding<'s> {
    name: &'s str,
    span: Span,
    used: bool,
    assigned: bool,
}

/// Identifiers a binding pattern declares, in source order.
pub(super) fn bound_names<'p, 'a>(pattern: &'p BindingPattern<'a>, out: &mut Vec<&'p BindingIdentifier<'a>>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => out.push(id),
        BindingPatternKind::AssignmentPattern(p) => bound_names(&p.left, out),
        BindingPatternKind::ObjectPattern(p) => {
            for prop in p.properties.iter() {
                bound_names(&prop.value, out);
            }
            if let Some(rest) = &p.rest {
                bound_names(&rest.argument, out);
            }
        }
        BindingPatternKind::ArrayPattern(p) => {
            for element in p.elements.iter().flatten() {
                bound_names(element, out);
            }
            if let Some(rest) = &p.rest {
                bound_names(&rest.argument, out);
            }
        }
    }
}

impl<'a> Pass<'_, 'a> {
    pub(super) fn check_bindings(&mut self) {
        let semantic = self.semantic;
        let symbols = semantic.symbols();
        let nodes = semantic.nodes();
        let root = semantic.scopes().root_scope_id();
        let mut params = HashMap::new();

        for id in symbols.symbol_ids() {
            let name = symbols.get_name(id);
            let span = symbols.get_span(id);
            let flags = symbols.get_flags(id);
            let decl = nodes.get_node(symbols.get_declaration(id));

            let mut used = false;
            let mut written = false;
            for reference in symbols.get_resolved_references(id) {
                if reference.is_write() {
                    written = true;
                    if flags.contains(SymbolFlags::Function) {
                        let at = nodes.get_node(reference.node_id()).kind().span().start;
                        self.report("no-func-assign", at, &format!("'{}' is a function.", name));
                    }
                }
                used |= self.is_use(reference);
            }

            let for_head = self.in_for_head(decl, decl.kind().span());
            let initialized = match decl.kind() {
                AstKind::VariableDeclarator(d) => {
                    let never_reassigned = !written && (d.init.is_some() || for_head);
                    if d.kind == VariableDeclarationKind::Let && never_reassigned {
                        let message = format!("'{}' is never reassigned. Use 'const' instead.", name);
                        self.report("prefer-const", span.start, &message);
                    }
                    d.init.is_some()
                }
                _ => false,
            };

            let binding = Binding {
                name,
                span,
                used,
                assigned: written || initialized || for_head,
            };
            if matches!(decl.kind(), AstKind::FormalParameter(_)) {
                params.insert(span.start, binding);
            } else if !binding.used && self.reports_unused(decl, flags, symbols.get_scope_id(id) == root) {
                self.report_unused(&binding);
            }
        }

        self.check_params(&params);
        self.check_undefined();
    }

    /// A read counts, except `x += 1` or `x++` standing alone as a
    /// statement, which only feeds the binding itself.
    fn is_use(&self, reference: &Reference) -> bool {
        if !reference.is_read() {
            return false;
        }
        if !reference.is_write() {
            return true;
        }
        let nodes = self.semantic.nodes();
        let mut id = reference.node_id();
        for _ in 0..4 {
            let Some(parent) = nodes.parent_node(id) else {
                return true;
            };
            if matches!(parent.kind(), AstKind::AssignmentExpression(_) | AstKind::UpdateExpression(_)) {
                return !matches!(nodes.parent_kind(parent.id()), Some(AstKind::ExpressionStatement(_)));
            }
            id = parent.id();
        }
        true
    }

    /// Top-level names of a script are shared through the global object.
    /// Catch parameters, expression names and class members are never
    /// reported.
    fn reports_unused(&self, decl: &AstNode<'a>, flags: SymbolFlags, top_level: bool) -> bool {
        if top_level || flags.contains(SymbolFlags::CatchVariable) {
            return false;
        }
        match decl.kind() {
            AstKind::VariableDeclarator(_) => true,
            AstKind::Function(f) => f.r#type != FunctionType::FunctionExpression,
            AstKind::Class(c) => c.r#type != ClassType::ClassExpression,
            _ => false,
        }
    }

    fn report_unused(&mut self, binding: &Binding<'_>) {
        let message = if binding.assigned {
            format!("'{}' is assigned a value but never used.", binding.name)
        } else {
            format!("'{}' is defined but never used.", binding.name)
        };
        self.report("no-unused-vars", binding.span.start, &message);
    }

    /// Parameters before the last used one are needed for position.
    fn check_params(&mut self, params: &HashMap<u32, Binding<'_>>) {
        let semantic = self.semantic;
        for node in semantic.nodes().iter() {
            let AstKind::FormalParameters(list) = node.kind() else {
                continue;
            };
            let mut names = Vec::new();
            for param in list.items.iter() {
                bound_names(&param.pattern, &mut names);
            }
            if let Some(rest) = &list.rest {
                bound_names(&rest.argument, &mut names);
            }
            let bindings: Vec<&Binding<'_>> = names.iter().filter_map(|id| params.get(&id.span.start)).collect();
            let after = bindings.iter().rposition(|b| b.used).map_or(0, |last| last + 1);
            for binding in &bindings[after..] {
                self.report_unused(binding);
            }
        }
    }

    fn check_undefined(&mut self) {
        let semantic = self.semantic;
        let nodes = semantic.nodes();
        let symbols = semantic.symbols();
        let mut missing = Vec::new();
        for (name, ids) in semantic.scopes().root_unresolved_references() {
            let name: &str = name;
            if globals::is_global(name) {
                continue;
            }
            for &id in ids.iter() {
                let node = nodes.get_node(symbols.get_reference(id).node_id());
                let under_typeof = matches!(
                    nodes.parent_kind(node.id()),
                    Some(AstKind::UnaryExpression(u)) if u.operator == UnaryOperator::Typeof
                );
                if !under_typeof {
                    missing.push((node.kind().span().start, name));
                }
            }
        }
        missing.sort_unstable();
        for (at, name) in missing {
            self.report("no-undef", at, &format!("'{}' is not defined.", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{lint, messages, rules};

    #[test]
    fn test_scope_rules() {
        let findings = lint("function f(a, b, c) {\n  let x = 1;\n  let y = 2;\n  y += b;\n  return undefinedThing;\n}\nf();\n");
        assert_eq!(
            messages(&findings, "no-undef"),
            vec![(5, 10, "'undefinedThing' is not defined.".to_string())]
        );
        assert_eq!(
            messages(&findings, "no-unused-vars"),
            vec![
                (1, 18, "'c' is defined but never used.".to_string()),
                (2, 7, "'x' is assigned a value but never used.".to_string()),
                (3, 7, "'y' is assigned a value but never used.".to_string()),
            ]
        );
        assert_eq!(
            messages(&findings, "prefer-const"),
            vec![(2, 7, "'x' is never reassigned. Use 'const' instead.".to_string())]
        );
    }

    #[test]
    fn test_globals_and_typeof_are_defined() {
        assert!(rules("if (typeof jQuery === 'undefined') {\n  console.log(window.innerWidth);\n}\n").is_empty());
        assert!(rules("document.querySelector('#a').addEventListener('click', (e) => {\n  e.preventDefault();\n});\n").is_empty());
        assert_eq!(rules("jQuery('#a');\n"), vec!["no-undef"]);
    }

    #[test]
    fn test_top_level_bindings_are_not_unused() {
        assert!(rules("const x = 1;\nfunction handler() {}\n").is_empty());
        assert_eq!(rules("function outer() {\n  function inner() {}\n}\n"), vec!["no-unused-vars"]);
    }

    #[test]
    fn test_catch_and_expression_names_are_not_unused() {
        let src = "try {\n  JSON.parse('x');\n} catch (err) {\n  console.log('bad');\n}\nconst f = function named() {};\nf();\n";
        assert!(rules(src).is_empty(), "{:?}", rules(src));
    }

    #[test]
    fn test_loops_and_destructuring() {
        let src = "for (let i = 0; i < 3; i++) {\n  console.log(i);\n}\nfor (const [k, v] of Object.entries({})) {\n  console.log(k, v);\n}\nconst { p, q: [r] } = { p: 1, q: [2] };\nconsole.log(p, r);\n";
        assert!(rules(src).is_empty(), "{:?}", rules(src));
        assert_eq!(rules("for (let item of [1]) {\n  console.log(item);\n}\n"), vec!["prefer-const"]);
    }

    #[test]
    fn test_reassigned_function_is_reported_once_per_write() {
        let findings = lint("function foo() {}\nfoo = 1;\nfoo = 2;\n");
        assert_eq!(
            messages(&findings, "no-func-assign"),
            vec![
                (2, 1, "'foo' is a function.".to_string()),
                (3, 1, "'foo' is a function.".to_string()),
            ]
        );
    }
}
