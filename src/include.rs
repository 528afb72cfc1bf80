//! Include resolution.
//!
//! `$<path>` directives are resolved at parse time: the referenced template
//! is located, read, parsed, and spliced in as the include node's body, so
//! rendering never touches the filesystem.
//!
//! How the identifier is located depends on the options:
//!
//! | `search` | `resolve` | Behaviour |
//! |----------|-----------|-----------|
//! | unset | unset | look up the identifier in the current directory |
//! | set   | unset | try each search directory in order; first hit wins |
//! | unset | set   | callback returns the *path* to read |
//! | set   | set   | callback returns the template *contents* directly |
//!
//! A stack of resolved paths rides along through nested includes; resolving
//! a path that is already on the stack is a recursive include.  Contents
//! obtained straight from a callback carry no path and are exempt.

use std::fs;
use std::path::PathBuf;

use crate::error::Error;
use crate::render::Options;
use crate::template::{self, Node};

/// Resolve every include beneath `nodes`, splicing parsed bodies in place.
pub(crate) fn resolve(
    nodes: &mut [Node],
    opts: &Options,
    stack: &mut Vec<String>,
) -> Result<(), Error> {
    for node in nodes.iter_mut() {
        match node {
            Node::Include { line, path, body } => {
                *body = load(path, *line, opts, stack).map_err(|e| e.with_file(path))?;
            }

            Node::Cond { arms, otherwise } => {
                for arm in arms.iter_mut() {
                    resolve(&mut arm.body, opts, stack)?;
                }
                if let Some(body) = otherwise {
                    resolve(body, opts, stack)?;
                }
            }

            Node::Switch { cases, default, .. } => {
                for case in cases.iter_mut() {
                    resolve(&mut case.body, opts, stack)?;
                }
                if let Some(body) = default {
                    resolve(body, opts, stack)?;
                }
            }

            Node::ForRange { body, .. } | Node::ForIter { body, .. } | Node::With { body, .. } => {
                resolve(body, opts, stack)?;
            }

            Node::Span { .. } | Node::SubEsc { .. } | Node::SubRaw { .. } => {}
        }
    }

    Ok(())
}

/// Locate, read, and parse one included template.
fn load(
    ident: &str,
    line: u32,
    opts: &Options,
    stack: &mut Vec<String>,
) -> Result<Vec<Node>, Error> {
    let (resolved, src) = locate(ident, line, opts)?;

    if let Some(path) = &resolved {
        if stack.iter().any(|entry| entry == path) {
            return Err(Error::include_error(
                line,
                format!("recursive include of '{path}'"),
            ));
        }
        stack.push(path.clone());
    }

    let result = parse_nested(&src, opts, stack);

    if resolved.is_some() {
        stack.pop();
    }

    result
}

fn parse_nested(src: &str, opts: &Options, stack: &mut Vec<String>) -> Result<Vec<Node>, Error> {
    let directives = template::tokenize(src)?;
    let mut nodes = template::build(directives)?;
    resolve(&mut nodes, opts, stack)?;
    Ok(nodes)
}

/// Produce the resolved path (when one exists) and the template source.
fn locate(ident: &str, line: u32, opts: &Options) -> Result<(Option<String>, String), Error> {
    if let Some(resolve_cb) = &opts.resolve {
        let resolved = resolve_cb(ident)
            .ok_or_else(|| Error::include_error(line, "failed to resolve include"))?;

        // With a search path alongside, the callback supplies the contents
        // themselves and the filesystem is bypassed.
        if opts.search.is_some() {
            return Ok((None, resolved));
        }

        let src = fs::read_to_string(&resolved)
            .map_err(|_| Error::include_error(line, "failed to read include"))?;
        return Ok((Some(resolved), src));
    }

    let cwd = [PathBuf::from(".")];
    let dirs = opts.search.as_deref().unwrap_or(&cwd);

    for dir in dirs {
        let candidate = dir.join(ident);
        if let Ok(src) = fs::read_to_string(&candidate) {
            return Ok((Some(candidate.to_string_lossy().into_owned()), src));
        }
    }

    Err(Error::include_error(line, "failed to resolve include"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
