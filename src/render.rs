//! Renderer and output sinks.
//!
//! Rendering walks the directive tree, evaluating expressions against the
//! current scope and pushing bytes at the emit callback.  Three entry points
//! share identical semantics and differ only in where the bytes go: a
//! caller-supplied callback ([`render`]), a writer ([`render_to_file`]), or
//! a growable buffer ([`render_to_buffer`]).
//!
//! The first error aborts the render; bytes already emitted stay emitted.

use std::io;
use std::path::PathBuf;

use crate::error::Error;
use crate::eval::{eval, truthy, value_eq};
use crate::expr::Expr;
use crate::template::{Node, Template};
use crate::value::{JsonValue, Kind};

// ── Options ───────────────────────────────────────────────────────────────────

/// Caller-supplied knobs for parsing and rendering.  The default value is a
/// valid zero configuration: includes resolve against the current directory,
/// escaped substitutions use the stock HTML escape, and a zero-byte emit is
/// an IO error.
#[derive(Default)]
pub struct Options {
    /// Ordered include search path.
    pub search: Option<Vec<PathBuf>>,
    /// Include resolve callback; see [`crate::include`] for how it combines
    /// with `search`.
    pub resolve: Option<Box<dyn Fn(&str) -> Option<String>>>,
    /// Replacement escape function for `$[...]` substitutions.
    pub escape: Option<Box<dyn Fn(&str) -> String>>,
    /// Treat a zero return from the emit callback as "no bytes written,
    /// keep going" instead of an IO error.
    pub ignore_emit_zero: bool,
}

/// The stock escape for `$[...]`: `&`, `'`, `"`, `<`, `>` become decimal
/// character references; every other byte passes through untouched.
pub fn escape_default(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' | '\'' | '"' | '<' | '>' => {
                out.push_str(&format!("&#{:02};", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

// ── Sink ──────────────────────────────────────────────────────────────────────

struct Sink<'a> {
    emit: &'a mut dyn FnMut(&str) -> usize,
    written: usize,
    ignore_zero: bool,
}

impl Sink<'_> {
    fn write(&mut self, data: &str, line: u32) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        let wrote = (self.emit)(data);
        if wrote == 0 && !self.ignore_zero {
            return Err(Error::io_error(line, "failed to write output"));
        }
        self.written += wrote;
        Ok(())
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

fn render_nodes<V: JsonValue>(
    nodes: &[Node],
    scope: &V,
    root: &V,
    sink: &mut Sink<'_>,
    opts: &Options,
) -> Result<(), Error> {
    for node in nodes {
        match node {
            Node::Span { line, text } => sink.write(text, *line)?,

            Node::SubRaw { line, expr } => {
                let text = substitution_text(expr, *line, scope, root)?;
                sink.write(&text, *line)?;
            }

            Node::SubEsc { line, expr } => {
                let text = substitution_text(expr, *line, scope, root)?;
                let escaped = match &opts.escape {
                    Some(escape) => escape(&text),
                    None => escape_default(&text),
                };
                sink.write(&escaped, *line)?;
            }

            Node::Include { path, body, .. } => {
                render_nodes(body, scope, root, sink, opts).map_err(|e| e.with_file(path))?;
            }

            Node::Cond { arms, otherwise } => {
                let mut matched = false;
                for arm in arms {
                    let cond = eval(&arm.cond, scope, root)?;
                    if truthy(&cond) {
                        render_nodes(&arm.body, scope, root, sink, opts)?;
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    if let Some(body) = otherwise {
                        render_nodes(body, scope, root, sink, opts)?;
                    }
                }
            }

            Node::Switch {
                subject,
                cases,
                default,
                ..
            } => {
                let subject = eval(subject, scope, root)?;
                let mut matched = false;
                for case in cases {
                    let branch = eval(&case.value, scope, root)?;
                    if value_eq(&subject, &branch) {
                        render_nodes(&case.body, scope, root, sink, opts)?;
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    if let Some(body) = default {
                        render_nodes(body, scope, root, sink, opts)?;
                    }
                }
            }

            Node::ForRange {
                line,
                var,
                inclusive,
                lo,
                hi,
                body,
            } => {
                let anonymous = check_binding(var, scope, *line)?;

                let lo = eval(lo, scope, root)?;
                let hi = eval(hi, scope, root)?;
                if lo.kind() != Kind::Number || hi.kind() != Kind::Number {
                    return Err(Error::type_error(*line, "loop indices must be numbers"));
                }

                let mut current = lo.as_number();
                let limit = hi.as_number() + if *inclusive { 1.0 } else { 0.0 };
                while current < limit {
                    if anonymous {
                        render_nodes(body, scope, root, sink, opts)?;
                    } else {
                        let inner = child_scope(scope, var, V::from_number(current));
                        render_nodes(body, &inner, root, sink, opts)?;
                    }
                    current += 1.0;
                }
            }

            Node::ForIter {
                line,
                var,
                iter,
                body,
            } => {
                let anonymous = check_binding(var, scope, *line)?;

                let iterable = eval(iter, scope, root)?;
                let len = iterable.len();
                match iterable.kind() {
                    Kind::String | Kind::Array | Kind::Object => {}
                    _ => {
                        return Err(Error::type_error(*line, "loop values must be iterable"));
                    }
                }

                if anonymous {
                    for _ in 0..len {
                        render_nodes(body, scope, root, sink, opts)?;
                    }
                } else {
                    for binding in iter_bindings(&iterable) {
                        let inner = child_scope(scope, var, binding);
                        render_nodes(body, &inner, root, sink, opts)?;
                    }
                }
            }

            Node::With { expr, body, .. } => {
                let scope = eval(expr, scope, root)?;
                render_nodes(body, &scope, root, sink, opts)?;
            }
        }
    }

    Ok(())
}

/// Render a substitution expression to text: strings emit their bytes, any
/// other value emits its JSON form.
fn substitution_text<V: JsonValue>(
    expr: &Expr,
    line: u32,
    scope: &V,
    root: &V,
) -> Result<String, Error> {
    let value = eval(expr, scope, root)?;
    if value.kind() == Kind::String {
        Ok(value.as_str().to_owned())
    } else {
        value
            .print()
            .ok_or_else(|| Error::json_error(line, "failed to serialise substitution value"))
    }
}

/// A loop binding named `_` is anonymous and reuses the outer scope; any
/// other name needs an object scope to extend.
fn check_binding<V: JsonValue>(var: &str, scope: &V, line: u32) -> Result<bool, Error> {
    if var == "_" {
        return Ok(true);
    }
    if scope.kind() != Kind::Object {
        return Err(Error::type_error(line, "cannot bind in non-object scope"));
    }
    Ok(false)
}

/// Fresh per-iteration scope: the current scope minus any existing binding
/// for `var`, plus `var` bound to `value`.
fn child_scope<V: JsonValue>(scope: &V, var: &str, value: V) -> V {
    let mut inner = V::new_object();
    for key in scope.keys() {
        if key != var {
            if let Some(member) = scope.get(&key) {
                inner.insert(&key, member.clone());
            }
        }
    }
    inner.insert(var, value);
    inner
}

/// The per-iteration values of a `for ... in` loop: single-character
/// strings of a string, elements of an array, keys of an object.
fn iter_bindings<V: JsonValue>(iterable: &V) -> Vec<V> {
    match iterable.kind() {
        Kind::String => iterable
            .as_str()
            .chars()
            .map(|c| V::from_str(&c.to_string()))
            .collect(),
        Kind::Array => (0..iterable.len())
            .filter_map(|i| iterable.at(i).cloned())
            .collect(),
        _ => iterable.keys().iter().map(|k| V::from_str(k)).collect(),
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

impl Template {
    /// Render against `root`, pushing output at `emit`.
    ///
    /// `emit` returns the number of bytes it accepted; zero aborts with an
    /// IO error unless [`Options::ignore_emit_zero`] is set.  Returns the
    /// total bytes written.
    pub fn render<V: JsonValue>(
        &self,
        root: &V,
        mut emit: impl FnMut(&str) -> usize,
        opts: &Options,
    ) -> Result<usize, Error> {
        let mut sink = Sink {
            emit: &mut emit,
            written: 0,
            ignore_zero: opts.ignore_emit_zero,
        };
        render_nodes(&self.nodes, root, root, &mut sink, opts)?;
        Ok(sink.written)
    }
}

/// Parse `src` and render it against `root`, pushing output at `emit`.
pub fn render<V: JsonValue>(
    src: &str,
    root: &V,
    emit: impl FnMut(&str) -> usize,
    opts: &Options,
) -> Result<usize, Error> {
    Template::parse(src, opts)?.render(root, emit, opts)
}

/// Parse `src` and render it against `root` into a writer.
pub fn render_to_file<V: JsonValue>(
    src: &str,
    root: &V,
    file: &mut impl io::Write,
    opts: &Options,
) -> Result<usize, Error> {
    render(
        src,
        root,
        |data| match file.write_all(data.as_bytes()) {
            Ok(()) => data.len(),
            Err(_) => 0,
        },
        opts,
    )
}

/// Parse `src` and render it against `root` into a fresh buffer.
pub fn render_to_buffer<V: JsonValue>(
    src: &str,
    root: &V,
    opts: &Options,
) -> Result<String, Error> {
    let mut buffer = String::new();
    render(
        src,
        root,
        |data| {
            buffer.push_str(data);
            data.len()
        },
        opts,
    )?;
    Ok(buffer)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
