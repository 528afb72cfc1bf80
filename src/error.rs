//! Typed rendering errors.
//!
//! Every fallible stage — template tokenizer, expression parser, evaluator,
//! include resolver, renderer — reports a structured [`Error`] rather than a
//! bare string, so callers can dispatch on [`ErrorCode`] and report the
//! 1-based source line.  When a failure happens inside an included template,
//! [`Error::file`] carries the include identifier as written in the
//! `$<...>` directive.

use std::fmt;

/// Broad classification of a templating failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unclassified failure.
    Unknown,
    /// Out of memory.
    Alloc,
    /// Emit callback or filesystem failure.
    Io,
    /// Inconsistent caller-supplied options.
    Opts,
    /// Value backend failed to parse or print.
    Json,
    /// Malformed template or expression.
    Syntax,
    /// Type mismatch at evaluation time.
    Type,
    /// Well-typed but invalid operand (bad index, bad arity, ...).
    Value,
    /// Reference to an undefined identifier or missing key.
    Name,
    /// Include resolution failure or recursive include.
    Include,
}

impl ErrorCode {
    /// Short human-readable name, as printed by the CLI.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Unknown",
            ErrorCode::Alloc => "Memory",
            ErrorCode::Io => "IO",
            ErrorCode::Opts => "Option",
            ErrorCode::Json => "JSON",
            ErrorCode::Syntax => "Syntax",
            ErrorCode::Type => "Type",
            ErrorCode::Value => "Value",
            ErrorCode::Name => "Name",
            ErrorCode::Include => "Include",
        }
    }
}

/// A templating error: code, source line, optional include identifier, and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    /// 1-based line in the template (or included template) source.
    pub line: u32,
    /// Identifier of the include the error surfaced through, if any.
    pub file: Option<String>,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Error {
            code,
            line,
            file: None,
            message: message.into(),
        }
    }

    pub(crate) fn syntax(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Syntax, line, message)
    }

    pub(crate) fn type_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Type, line, message)
    }

    pub(crate) fn value_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Value, line, message)
    }

    pub(crate) fn name_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Name, line, message)
    }

    pub(crate) fn include_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Include, line, message)
    }

    pub(crate) fn io_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Io, line, message)
    }

    pub(crate) fn json_error(line: u32, message: impl Into<String>) -> Self {
        Error::new(ErrorCode::Json, line, message)
    }

    /// Tag this error with the include identifier it surfaced through.
    ///
    /// The innermost include wins: a tag that is already present is kept.
    pub(crate) fn with_file(mut self, file: &str) -> Self {
        if self.file.is_none() {
            self.file = Some(file.to_owned());
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(
                f,
                "{} error: {} ({}:{})",
                self.code.name(),
                self.message,
                file,
                self.line
            ),
            None => write!(
                f,
                "{} error: {} (line {})",
                self.code.name(),
                self.message,
                self.line
            ),
        }
    }
}

impl std::error::Error for Error {}

// ── Tests ─────────────────────────────────────────────────────────────────────
