//! Stylesheet parser producing a nested node tree with byte offsets.
//!
//! Recognises rules, at-rules (with or without a block), declarations and
//! comments. Fails on the same inputs a CSS engine refuses to parse:
//! unclosed blocks, comments and strings, a stray `}` and declarations
//! without a colon.

use crate::error::EngineFailure;
use crate::utils::LineIndex;

/// Blocks nested deeper than this fail the parse instead of the stack.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<'a> {
    pub selector: &'a str,
    pub offset: usize,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule<'a> {
    /// Name without the `@`.
    pub name: &'a str,
    pub params: &'a str,
    pub params_offset: usize,
    pub offset: usize,
    pub body: Option<Block<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl<'a> {
    pub prop: &'a str,
    /// Value without a trailing `!important`.
    pub value: &'a str,
    pub value_offset: usize,
    pub important: bool,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment<'a> {
    /// Text between `/*` and `*/`.
    pub text: &'a str,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub nodes: Vec<Node<'a>>,
    /// Offset of the closing `}`.
    pub close: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    Rule(Rule<'a>),
    AtRule(AtRule<'a>),
    Decl(Decl<'a>),
    Comment(Comment<'a>),
}

impl Node<'_> {
    pub fn offset(&self) -> usize {
        match self {
            Node::Rule(r) => r.offset,
            Node::AtRule(a) => a.offset,
            Node::Decl(d) => d.offset,
            Node::Comment(c) => c.offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet<'a> {
    pub nodes: Vec<Node<'a>>,
    /// Offsets of semicolons that terminate nothing.
    pub extra_semicolons: Vec<usize>,
}

pub fn parse(src: &str) -> Result<Stylesheet<'_>, EngineFailure> {
    let mut p = Parser {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        index: LineIndex::new(src),
        extra_semicolons: Vec::new(),
    };
    let (nodes, _) = p.block(0)?;
    Ok(Stylesheet {
        nodes,
        extra_semicolons: p.extra_semicolons,
    })
}

enum Terminator {
    Open,
    Semicolon,
    Close,
    Eof,
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    index: LineIndex<'a>,
    extra_semicolons: Vec<usize>,
}

impl<'a> Parser<'a> {
    fn fail(&self, reason: &str, offset: usize) -> EngineFailure {
        let (line, col) = self.index.position(offset);
        EngineFailure::at(reason, line, col)
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Parse nodes until the matching `}` (returned) or end of input at the top level.
    fn block(&mut self, depth: usize) -> Result<(Vec<Node<'a>>, Option<usize>), EngineFailure> {
        let mut nodes = Vec::new();
        loop {
            self.skip_ws();
            let Some(&c) = self.bytes.get(self.pos) else {
                return Ok((nodes, None));
            };
            match c {
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    let end = self.comment_end(start)?;
                    nodes.push(Node::Comment(Comment {
                        text: &self.src[start + 2..end - 2],
                        offset: start,
                    }));
                    self.pos = end;
                }
                b'}' => {
                    if depth == 0 {
                        return Err(self.fail("Unexpected }", self.pos));
                    }
                    let close = self.pos;
                    self.pos += 1;
                    return Ok((nodes, Some(close)));
                }
                b';' => {
                    self.extra_semicolons.push(self.pos);
                    self.pos += 1;
                }
                _ => nodes.push(self.statement(depth)?),
            }
        }
    }

    fn comment_end(&self, start: usize) -> Result<usize, EngineFailure> {
        self.src
            .get(start + 2..)
            .and_then(|s| s.find("*/"))
            .map(|i| start + 2 + i + 2)
            .ok_or_else(|| self.fail("Unclosed comment", start))
    }

    /// Scan from the current position to the first `{`, `;` or `}` outside
    /// strings, comments and parentheses.
    fn scan(&self) -> Result<(usize, Terminator), EngineFailure> {
        let mut i = self.pos;
        let mut parens = 0usize;
        while i < self.bytes.len() {
            match self.bytes[i] {
                q @ (b'"' | b'\'') => {
                    let start = i;
                    i += 1;
                    loop {
                        match self.bytes.get(i).copied() {
                            None => return Err(self.fail("Unclosed string", start)),
                            Some(b'\\') => i += 2,
                            Some(b) if b == q => break,
                            Some(_) => i += 1,
                        }
                    }
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.comment_end(i)? - 1;
                }
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' if parens == 0 => return Ok((i, Terminator::Open)),
                b';' if parens == 0 => return Ok((i, Terminator::Semicolon)),
                b'}' if parens == 0 => return Ok((i, Terminator::Close)),
                _ => {}
            }
            i += 1;
        }
        Ok((self.bytes.len(), Terminator::Eof))
    }

    fn statement(&mut self, depth: usize) -> Result<Node<'a>, EngineFailure> {
        let start = self.pos;
        let (end, term) = self.scan()?;
        let text = self.src[start..end].trim_end();

        if let Terminator::Open = term {
            if depth >= MAX_DEPTH {
                return Err(self.fail("Blocks nested too deeply", end));
            }
            self.pos = end + 1;
            let (nodes, close) = self.block(depth + 1)?;
            let close = close.ok_or_else(|| self.fail("Unclosed block", start))?;
            let body = Block { nodes, close };
            return Ok(if text.starts_with('@') {
                self.at_rule(text, start, Some(body))
            } else {
                Node::Rule(Rule {
                    selector: text,
                    offset: start,
                    body,
                })
            });
        }

        self.pos = match term {
            Terminator::Semicolon => end + 1,
            _ => end,
        };
        if text.starts_with('@') {
            return Ok(self.at_rule(text, start, None));
        }
        let colon = text
            .find(':')
            .ok_or_else(|| self.fail("Unknown word", start))?;
        Ok(Node::Decl(declaration(text, start, colon)))
    }

    fn at_rule(&self, text: &'a str, start: usize, body: Option<Block<'a>>) -> Node<'a> {
        let name_len = text[1..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
            .count();
        let name = &text[1..1 + name_len];
        let rest = &text[1 + name_len..];
        let params = rest.trim();
        let params_offset = start + 1 + name_len + (rest.len() - rest.trim_start().len());
        Node::AtRule(AtRule {
            name,
            params,
            params_offset,
            offset: start,
            body,
        })
    }
}

fn declaration(text: &str, start: usize, colon: usize) -> Decl<'_> {
    let prop = text[..colon].trim_end();
    let raw = &text[colon + 1..];
    let lead = raw.len() - raw.trim_start().len();
    let mut value = raw.trim();
    let mut important = false;
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            important = true;
            value = value[..bang].trim_end();
        }
    }
    Decl {
        prop,
        value,
        value_offset: start + colon + 1 + lead,
        important,
        offset: start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_structure() {
        let sheet = parse("@media (min-width: 10px) {\n  a:hover { color: red !important; }\n}\n/* x */").unwrap();
        assert_eq!(sheet.nodes.len(), 2);
        let Node::AtRule(media) = &sheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(media.name, "media");
        assert_eq!(media.params, "(min-width: 10px)");
        assert_eq!(media.params_offset, 7);
        let Node::Rule(rule) = &media.body.as_ref().unwrap().nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(rule.selector, "a:hover");
        let Node::Decl(decl) = &rule.body.nodes[0] else {
            panic!("expected declaration");
        };
        assert_eq!((decl.prop, decl.value, decl.important), ("color", "red", true));
        assert!(matches!(sheet.nodes[1], Node::Comment(Comment { text: " x ", .. })));
    }

    #[test]
    fn test_statement_at_rule_and_extra_semicolons() {
        let sheet = parse("@import url(\"a;b.css\");;\na { ; }").unwrap();
        let Node::AtRule(import) = &sheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(import.params, "url(\"a;b.css\")");
        assert!(import.body.is_none());
        assert_eq!(sheet.extra_semicolons, vec![23, 29]);
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let sheet = parse("a{color:red;margin:0}").unwrap();
        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(rule.body.nodes.len(), 2);
        assert_eq!(rule.body.close, 20);
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(parse("a { color: red;").unwrap_err().reason, "Unclosed block (1:1)");
        assert_eq!(parse("a {}\n}").unwrap_err().reason, "Unexpected } (2:1)");
        assert_eq!(parse("/* open").unwrap_err().reason, "Unclosed comment (1:1)");
        assert_eq!(parse("a { content: \"x; }").unwrap_err().reason, "Unclosed string (1:14)");
        assert_eq!(parse("a { color red; }").unwrap_err().reason, "Unknown word (1:5)");
    }

    #[test]
    fn test_deep_nesting_fails_cleanly() {
        let deep = "a{".repeat(10_000);
        assert_eq!(parse(&deep).unwrap_err().reason, "Blocks nested too deeply (1:258)");
        let ok = format!("{}{}", "a{".repeat(20), "}".repeat(20));
        assert!(parse(&ok).is_ok());
    }
}
