//! Template tokenizer and block builder.
//!
//! Tokenizing splits template source into a flat list of directives:
//! literal spans and everything the `$` sigil introduces —
//!
//! | Form | Directive |
//! |------|-----------|
//! | `$$` | literal `$` (stays in the span) |
//! | `$(...)` | comment, discarded |
//! | `$[expr]` | escaped substitution |
//! | `${expr}` | raw substitution |
//! | `$<path>` | include |
//! | `$if expr:` / `$elif expr:` / `$else:` | conditional chain |
//! | `$switch expr:` / `$case expr:` / `$default:` | dispatch |
//! | `$for x from lo..hi:` / `..=hi:` | range loop (exclusive / inclusive) |
//! | `$for x in expr:` | iteration loop |
//! | `$with expr:` | scope rebinding |
//! | `$end` | block terminator |
//!
//! One whitespace byte directly after an opener's colon or after `$end` is
//! a separator, not output: `$if x: yes$end` renders `yes`.
//!
//! Building then pairs openers with terminators into a [`Node`] tree:
//! `if`/`elif`/`else` collapse into a single conditional chain, each
//! `switch` owns its case arms, and every loop or `with` owns its body.

use crate::error::Error;
use crate::expr::{self, Expr};
use crate::render::Options;
use crate::scan::Scanner;

// ── Flat directives ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Directive {
    pub line: u32,
    pub kind: DirectiveKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DirectiveKind {
    Span(String),
    SubEsc(Expr),
    SubRaw(Expr),
    Include(String),
    If(Expr),
    Elif(Expr),
    Else,
    Switch(Expr),
    Case(Expr),
    Default,
    ForRange {
        var: String,
        inclusive: bool,
        lo: Expr,
        hi: Expr,
    },
    ForIter {
        var: String,
        iter: Expr,
    },
    With(Expr),
    End,
}

// ── Tokenizer ─────────────────────────────────────────────────────────────────

/// Split template source into a flat directive list.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Directive>, Error> {
    let mut scan = Scanner::new(src);
    let mut directives = Vec::new();
    let mut span: Vec<u8> = Vec::new();
    let mut span_line = 1u32;

    loop {
        let line = scan.line();
        let Some(c) = scan.bump() else { break };

        if c != b'$' {
            if span.is_empty() {
                span_line = line;
            }
            span.push(c);
            continue;
        }

        // `$$` collapses to a literal dollar inside the current span.
        if scan.eat(b'$') {
            if span.is_empty() {
                span_line = line;
            }
            span.push(b'$');
            continue;
        }

        flush_span(&mut directives, &mut span, span_line);

        match scan.peek() {
            None => return Err(Error::syntax(line, "expected keyword")),

            Some(b'(') => {
                scan.bump();
                loop {
                    match scan.bump() {
                        Some(b')') => break,
                        Some(_) => {}
                        None => {
                            return Err(Error::syntax(scan.line(), "unterminated comment"));
                        }
                    }
                }
            }

            Some(open @ (b'[' | b'{')) => {
                scan.bump();
                let (term, close) = if open == b'[' { ("]", b']') } else { ("}", b'}') };
                let expr = expr::parse_expr(&mut scan, Some(term))?;
                if !scan.eat(close) {
                    return Err(Error::syntax(
                        scan.line(),
                        "expected closing bracket for substitution",
                    ));
                }
                let kind = if open == b'[' {
                    DirectiveKind::SubEsc(expr)
                } else {
                    DirectiveKind::SubRaw(expr)
                };
                directives.push(Directive { line, kind });
            }

            Some(b'<') => {
                scan.bump();
                let start = scan.offset();
                loop {
                    match scan.peek() {
                        Some(b'>') => break,
                        Some(_) => {
                            scan.bump();
                        }
                        None => {
                            return Err(Error::syntax(scan.line(), "unterminated include"));
                        }
                    }
                }
                let path = scan.slice_from(start).to_owned();
                scan.bump();
                directives.push(Directive {
                    line,
                    kind: DirectiveKind::Include(path),
                });
            }

            Some(_) => {
                let kind = lex_keyword_directive(&mut scan, line)?;
                directives.push(Directive { line, kind });
            }
        }
    }

    flush_span(&mut directives, &mut span, span_line);
    Ok(directives)
}

fn flush_span(directives: &mut Vec<Directive>, span: &mut Vec<u8>, line: u32) {
    if !span.is_empty() {
        directives.push(Directive {
            line,
            kind: DirectiveKind::Span(String::from_utf8_lossy(span).into_owned()),
        });
        span.clear();
    }
}

const KEYWORDS: &[&str] = &[
    "default", "switch", "case", "elif", "else", "with", "end", "for", "if",
];

/// Longest-match keyword scan with an identifier-boundary check, so `$endx`
/// is an unknown keyword rather than `end` followed by junk.
fn match_keyword(scan: &mut Scanner) -> Option<&'static str> {
    for keyword in KEYWORDS {
        if scan.starts_with(keyword) {
            let boundary = match scan.peek_ahead(keyword.len()) {
                None => true,
                Some(c) => !c.is_ascii_alphanumeric() && c != b'_',
            };
            if boundary {
                scan.eat_str(keyword);
                return Some(keyword);
            }
        }
    }
    None
}

fn lex_keyword_directive(scan: &mut Scanner, line: u32) -> Result<DirectiveKind, Error> {
    let Some(keyword) = match_keyword(scan) else {
        return Err(Error::syntax(line, "unknown keyword"));
    };

    let kind = match keyword {
        "if" => DirectiveKind::If(parse_clause(scan)?),
        "elif" => DirectiveKind::Elif(parse_clause(scan)?),
        "switch" => DirectiveKind::Switch(parse_clause(scan)?),
        "case" => DirectiveKind::Case(parse_clause(scan)?),
        "with" => DirectiveKind::With(parse_clause(scan)?),

        "else" | "default" => {
            if !scan.eat(b':') {
                return Err(Error::syntax(scan.line(), "expected colon"));
            }
            eat_separator(scan);
            if keyword == "else" {
                DirectiveKind::Else
            } else {
                DirectiveKind::Default
            }
        }

        "end" => {
            eat_separator(scan);
            DirectiveKind::End
        }

        "for" => lex_for(scan)?,

        _ => unreachable!("keyword table is exhaustive"),
    };

    Ok(kind)
}

/// Parse the `expr:` clause of an opener, consuming the colon and the
/// separator byte after it.
fn parse_clause(scan: &mut Scanner) -> Result<Expr, Error> {
    let expr = expr::parse_expr(scan, Some(":"))?;
    if !scan.eat(b':') {
        return Err(Error::syntax(scan.line(), "expected colon"));
    }
    eat_separator(scan);
    Ok(expr)
}

/// One whitespace byte directly after a directive separates it from the
/// body and is not part of the output.
fn eat_separator(scan: &mut Scanner) {
    if matches!(scan.peek(), Some(c) if c.is_ascii_whitespace()) {
        scan.bump();
    }
}

/// Parse the tail of a `$for` directive: a loop variable, a `from`/`in`
/// preposition, and the bound expressions.
fn lex_for(scan: &mut Scanner) -> Result<DirectiveKind, Error> {
    scan.skip_whitespace();

    let start = scan.offset();
    match scan.peek() {
        Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
            scan.bump();
        }
        _ => return Err(Error::syntax(scan.line(), "expected identifier for loop")),
    }
    while matches!(scan.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
        scan.bump();
    }
    let var = scan.slice_from(start).to_owned();

    scan.skip_whitespace();
    let word_start = scan.offset();
    while matches!(scan.peek(), Some(c) if c.is_ascii_alphabetic()) {
        scan.bump();
    }

    match scan.slice_from(word_start) {
        "from" => {
            let lo = expr::parse_expr(scan, Some(".."))?;
            if !scan.eat_str("..") {
                return Err(Error::syntax(scan.line(), "expected range"));
            }
            let inclusive = scan.eat(b'=');
            let hi = parse_clause(scan)?;
            Ok(DirectiveKind::ForRange {
                var,
                inclusive,
                lo,
                hi,
            })
        }
        "in" => {
            let iter = parse_clause(scan)?;
            Ok(DirectiveKind::ForIter { var, iter })
        }
        "" => Err(Error::syntax(scan.line(), "expected preposition for loop")),
        _ => Err(Error::syntax(scan.line(), "invalid loop preposition")),
    }
}

// ── Directive tree ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Span {
        line: u32,
        text: String,
    },
    SubEsc {
        line: u32,
        expr: Expr,
    },
    SubRaw {
        line: u32,
        expr: Expr,
    },
    Include {
        line: u32,
        path: String,
        body: Vec<Node>,
    },
    /// An `if`/`elif`/`else` chain.  The first truthy arm renders.
    Cond {
        arms: Vec<CondArm>,
        otherwise: Option<Vec<Node>>,
    },
    Switch {
        line: u32,
        subject: Expr,
        cases: Vec<CaseArm>,
        default: Option<Vec<Node>>,
    },
    ForRange {
        line: u32,
        var: String,
        inclusive: bool,
        lo: Expr,
        hi: Expr,
        body: Vec<Node>,
    },
    ForIter {
        line: u32,
        var: String,
        iter: Expr,
        body: Vec<Node>,
    },
    With {
        line: u32,
        expr: Expr,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CondArm {
    pub line: u32,
    pub cond: Expr,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CaseArm {
    pub line: u32,
    pub value: Expr,
    pub body: Vec<Node>,
}

// ── Block builder ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    /// Top level: end-of-input closes, `$end` is an error.
    Top,
    /// Loop or `with` body: only `$end` closes.
    Block,
    /// `if`/`elif` arm: `$elif`, `$else`, or `$end` closes.
    CondArm,
    /// `else` arm: only `$end` closes.
    CondElse,
    /// `case`/`default` arm: the next `$case`/`$default` or `$end` closes.
    SwitchArm,
}

enum Closer {
    Eof,
    End,
    Elif { line: u32, cond: Expr },
    Else,
    Case { line: u32, value: Expr },
    Default { line: u32 },
}

type Directives = std::vec::IntoIter<Directive>;

/// Pair openers with terminators, producing the directive tree.
pub(crate) fn build(directives: Vec<Directive>) -> Result<Vec<Node>, Error> {
    let mut iter = directives.into_iter();
    let (nodes, _) = build_nodes(&mut iter, Ctx::Top)?;
    Ok(nodes)
}

fn build_nodes(iter: &mut Directives, ctx: Ctx) -> Result<(Vec<Node>, Closer), Error> {
    let mut nodes = Vec::new();

    loop {
        let Some(directive) = iter.next() else {
            if ctx == Ctx::Top {
                return Ok((nodes, Closer::Eof));
            }
            return Err(Error::syntax(0, "unexpected end of file"));
        };
        let line = directive.line;

        match directive.kind {
            DirectiveKind::Span(text) => nodes.push(Node::Span { line, text }),
            DirectiveKind::SubEsc(expr) => nodes.push(Node::SubEsc { line, expr }),
            DirectiveKind::SubRaw(expr) => nodes.push(Node::SubRaw { line, expr }),
            DirectiveKind::Include(path) => nodes.push(Node::Include {
                line,
                path,
                body: Vec::new(),
            }),

            DirectiveKind::If(cond) => nodes.push(build_cond(iter, line, cond)?),
            DirectiveKind::Switch(subject) => nodes.push(build_switch(iter, line, subject)?),

            DirectiveKind::ForRange {
                var,
                inclusive,
                lo,
                hi,
            } => {
                let body = build_block(iter)?;
                nodes.push(Node::ForRange {
                    line,
                    var,
                    inclusive,
                    lo,
                    hi,
                    body,
                });
            }
            DirectiveKind::ForIter { var, iter: iterable } => {
                let body = build_block(iter)?;
                nodes.push(Node::ForIter {
                    line,
                    var,
                    iter: iterable,
                    body,
                });
            }
            DirectiveKind::With(expr) => {
                let body = build_block(iter)?;
                nodes.push(Node::With { line, expr, body });
            }

            DirectiveKind::Elif(cond) => {
                if ctx == Ctx::CondArm {
                    return Ok((nodes, Closer::Elif { line, cond }));
                }
                return Err(Error::syntax(line, "unexpected subclause"));
            }
            DirectiveKind::Else => {
                if ctx == Ctx::CondArm {
                    return Ok((nodes, Closer::Else));
                }
                return Err(Error::syntax(line, "unexpected subclause"));
            }

            DirectiveKind::Case(value) => {
                if ctx == Ctx::SwitchArm {
                    return Ok((nodes, Closer::Case { line, value }));
                }
                return Err(Error::syntax(line, "case outside of switch"));
            }
            DirectiveKind::Default => {
                if ctx == Ctx::SwitchArm {
                    return Ok((nodes, Closer::Default { line }));
                }
                return Err(Error::syntax(line, "case outside of switch"));
            }

            DirectiveKind::End => {
                if ctx == Ctx::Top {
                    return Err(Error::syntax(line, "unexpected block terminator"));
                }
                return Ok((nodes, Closer::End));
            }
        }
    }
}

/// Body of a loop or `with`: runs to the matching `$end`.
fn build_block(iter: &mut Directives) -> Result<Vec<Node>, Error> {
    let (nodes, _) = build_nodes(iter, Ctx::Block)?;
    Ok(nodes)
}

fn build_cond(iter: &mut Directives, line: u32, cond: Expr) -> Result<Node, Error> {
    let mut arms = Vec::new();
    let mut arm_line = line;
    let mut arm_cond = cond;

    loop {
        let (body, closer) = build_nodes(iter, Ctx::CondArm)?;
        arms.push(CondArm {
            line: arm_line,
            cond: arm_cond,
            body,
        });

        match closer {
            Closer::End => return Ok(Node::Cond { arms, otherwise: None }),
            Closer::Elif { line, cond } => {
                arm_line = line;
                arm_cond = cond;
            }
            Closer::Else => {
                let (body, _) = build_nodes(iter, Ctx::CondElse)?;
                return Ok(Node::Cond {
                    arms,
                    otherwise: Some(body),
                });
            }
            _ => unreachable!("cond arms close on end, elif, or else"),
        }
    }
}

fn build_switch(iter: &mut Directives, line: u32, subject: Expr) -> Result<Node, Error> {
    let mut cases = Vec::new();
    let mut default: Option<Vec<Node>> = None;

    // Only arms may follow the opener; literal spans (formatting between the
    // switch head and its first case) are dropped.
    let mut next = loop {
        match iter.next() {
            None => return Err(Error::syntax(0, "unexpected end of file")),
            Some(Directive {
                kind: DirectiveKind::Span(_),
                ..
            }) => continue,
            Some(Directive {
                kind: DirectiveKind::Case(value),
                line,
            }) => break Closer::Case { line, value },
            Some(Directive {
                kind: DirectiveKind::Default,
                line,
            }) => break Closer::Default { line },
            Some(Directive {
                kind: DirectiveKind::End,
                ..
            }) => break Closer::End,
            Some(d) => return Err(Error::syntax(d.line, "expected case")),
        }
    };

    loop {
        match next {
            Closer::End => {
                return Ok(Node::Switch {
                    line,
                    subject,
                    cases,
                    default,
                });
            }
            Closer::Case { line, value } => {
                if default.is_some() {
                    return Err(Error::syntax(line, "cannot have case after default"));
                }
                let (body, closer) = build_nodes(iter, Ctx::SwitchArm)?;
                cases.push(CaseArm { line, value, body });
                next = closer;
            }
            Closer::Default { line } => {
                if default.is_some() {
                    return Err(Error::syntax(line, "cannot have case after default"));
                }
                let (body, closer) = build_nodes(iter, Ctx::SwitchArm)?;
                default = Some(body);
                next = closer;
            }
            _ => unreachable!("switch arms close on end, case, or default"),
        }
    }
}

// ── Template ──────────────────────────────────────────────────────────────────

/// A parsed template, ready to render any number of times.
#[derive(Debug)]
pub struct Template {
    pub(crate) nodes: Vec<Node>,
}

impl Template {
    /// Tokenize, build, and resolve includes.
    ///
    /// `opts` supplies the include search path and resolve callback; a
    /// default [`Options`] searches the current directory.
    pub fn parse(src: &str, opts: &Options) -> Result<Template, Error> {
        let directives = tokenize(src)?;
        let mut nodes = build(directives)?;
        crate::include::resolve(&mut nodes, opts, &mut Vec::new())?;
        Ok(Template { nodes })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
