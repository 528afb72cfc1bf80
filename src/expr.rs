//! Expression lexer, AST, and parser.
//!
//! Expressions appear inside substitution directives (`$[...]`, `${...}`)
//! and after block keywords (`$if ...:`, `$case ...:`, ...).  The lexer
//! consumes bytes from the shared template [`Scanner`] until it reaches the
//! caller's terminator sequence at bracket-nesting depth zero, leaving the
//! terminator itself for the caller to consume.
//!
//! Operator precedence (lowest → highest):
//!   ternary  →  logic (`&&` `||`)  →  comparison (`==` `!=` `<` `<=` `>` `>=`)
//!   →  bitwise (`&` `|` `^`)  →  additive (`+` `-`)
//!   →  multiplicative (`*` `/` `//` `%`)  →  exponent (`**`)
//!   →  unary (`+` `-` `!` `~`)  →  postfix (`.name`, `.name(...)`, `[...]`)
//!
//! All binary levels are left-associative.  A single `=` lexes as `==`.

use crate::error::Error;
use crate::scan::Scanner;

// ── Lexemes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LexKind {
    // Literals
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Ident(String),

    // Punctuation
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,

    // Operators
    Either, // ||
    Both,   // &&
    Not,    // !
    Eq,     // == (also a bare =)
    Neq,    // !=
    Gt,
    Gte,
    Lt,
    Lte,
    Add,
    Sub,
    Mul,
    Div,
    Quot, // //
    Mod,
    Exp,    // **
    BitAnd, // &
    BitOr,  // |
    BitXor, // ^
    Comp,   // ~
    Root,   // @
    Opt,    // ?
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub line: u32,
    pub kind: LexKind,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

/// Lex one expression from `scan`.
///
/// Stops at end of input, or at `term` when bracket nesting (`()`, `[]`,
/// `{}`) is balanced.  The terminator is not consumed.
pub fn lex(scan: &mut Scanner, term: Option<&str>) -> Result<Vec<Lexeme>, Error> {
    let mut lexemes: Vec<Lexeme> = Vec::new();
    let mut depth = 0i32;

    loop {
        if scan.is_eof() {
            break;
        }
        if let Some(t) = term {
            if depth <= 0 && scan.starts_with(t) {
                break;
            }
        }

        let line = scan.line();
        let Some(c) = scan.bump() else { break };

        let kind = match c {
            c if c.is_ascii_whitespace() => continue,

            b'(' => LexKind::LParen,
            b')' => LexKind::RParen,
            b'[' => LexKind::LBrack,
            b']' => LexKind::RBrack,
            b'{' => LexKind::LBrace,
            b'}' => LexKind::RBrace,
            b',' => LexKind::Comma,
            b'.' => LexKind::Dot,
            b':' => LexKind::Colon,

            b'|' => {
                if scan.eat(b'|') {
                    LexKind::Either
                } else {
                    LexKind::BitOr
                }
            }
            b'&' => {
                if scan.eat(b'&') {
                    LexKind::Both
                } else {
                    LexKind::BitAnd
                }
            }
            b'^' => LexKind::BitXor,
            b'~' => LexKind::Comp,
            b'=' => {
                scan.eat(b'=');
                LexKind::Eq
            }
            b'!' => {
                if scan.eat(b'=') {
                    LexKind::Neq
                } else {
                    LexKind::Not
                }
            }
            b'>' => {
                if scan.eat(b'=') {
                    LexKind::Gte
                } else {
                    LexKind::Gt
                }
            }
            b'<' => {
                if scan.eat(b'=') {
                    LexKind::Lte
                } else {
                    LexKind::Lt
                }
            }
            b'+' => LexKind::Add,
            b'-' => LexKind::Sub,
            b'*' => {
                if scan.eat(b'*') {
                    LexKind::Exp
                } else {
                    LexKind::Mul
                }
            }
            b'/' => {
                if scan.eat(b'/') {
                    LexKind::Quot
                } else {
                    LexKind::Div
                }
            }
            b'%' => LexKind::Mod,
            b'@' => LexKind::Root,
            b'?' => LexKind::Opt,

            b'"' | b'\'' => lex_string(scan, c)?,
            b'0'..=b'9' => lex_number(scan, c, line)?,
            c if c.is_ascii_alphabetic() || c == b'_' => lex_ident(scan),

            _ => return Err(Error::syntax(line, "unexpected character")),
        };

        match kind {
            LexKind::LParen | LexKind::LBrack | LexKind::LBrace => depth += 1,
            LexKind::RParen | LexKind::RBrack | LexKind::RBrace => depth -= 1,
            _ => {}
        }

        lexemes.push(Lexeme { line, kind });
    }

    Ok(lexemes)
}

/// Lex a quoted string.  The opening quote has been consumed.
///
/// Escapes: `\a \b \e \f \n \r \t \v \\ \' \"` and `\xHH` (exactly two hex
/// digits, denoting the scalar U+00HH).
fn lex_string(scan: &mut Scanner, quote: u8) -> Result<LexKind, Error> {
    let mut bytes: Vec<u8> = Vec::new();

    loop {
        let line = scan.line();
        let Some(c) = scan.bump() else {
            return Err(Error::syntax(line, "unterminated string"));
        };

        if c == quote {
            break;
        }

        if c != b'\\' {
            bytes.push(c);
            continue;
        }

        let Some(esc) = scan.bump() else {
            return Err(Error::syntax(line, "unterminated string"));
        };
        let decoded = match esc {
            b'a' => 0x07,
            b'b' => 0x08,
            b'e' => 0x1b,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'\\' => b'\\',
            b'\'' => b'\'',
            b'"' => b'"',
            b'x' => {
                let hi = scan.bump().and_then(hex_digit);
                let lo = scan.bump().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => hi << 4 | lo,
                    _ => return Err(Error::syntax(line, "invalid hex literal")),
                }
            }
            _ => return Err(Error::syntax(line, "invalid string escape")),
        };

        let mut buf = [0u8; 4];
        bytes.extend_from_slice((decoded as char).encode_utf8(&mut buf).as_bytes());
    }

    Ok(LexKind::Str(String::from_utf8_lossy(&bytes).into_owned()))
}

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Lex a numeric literal.  The first digit has been consumed.
///
/// `0b`/`0o`/`0x` select base 2/8/16 (integral only); decimal literals may
/// carry a fraction and an `e`/`E` exponent.  A decimal literal with a
/// leading zero and an empty exponent are both rejected, and the literal
/// must end at punctuation, whitespace, or end of input.
fn lex_number(scan: &mut Scanner, first: u8, line: u32) -> Result<LexKind, Error> {
    let start = scan.offset() - 1;

    let mut base = 10u32;
    if first == b'0' {
        match scan.peek() {
            Some(b'b') => base = 2,
            Some(b'o') => base = 8,
            Some(b'x') => base = 16,
            Some(d) if d.is_ascii_digit() => {
                return Err(Error::syntax(line, "decimal literal with leading zero"));
            }
            _ => {}
        }
        if base != 10 {
            scan.bump();
        }
    }

    let number = if base == 10 {
        while matches!(scan.peek(), Some(b'0'..=b'9')) {
            scan.bump();
        }

        // A fraction only begins when a digit follows the dot, so that range
        // bounds like `1..5` keep their `..` intact.
        if scan.peek() == Some(b'.') && matches!(scan.peek2(), Some(b'0'..=b'9')) {
            scan.bump();
            while matches!(scan.peek(), Some(b'0'..=b'9')) {
                scan.bump();
            }
        }

        if matches!(scan.peek(), Some(b'e' | b'E')) {
            scan.bump();
            if matches!(scan.peek(), Some(b'+' | b'-')) {
                scan.bump();
            }
            let digits = scan.offset();
            while matches!(scan.peek(), Some(b'0'..=b'9')) {
                scan.bump();
            }
            if scan.offset() == digits {
                return Err(Error::syntax(scan.line(), "exponent cannot be empty"));
            }
        }

        scan.slice_from(start).parse::<f64>().unwrap_or(0.0)
    } else {
        let mut n = 0.0f64;
        while let Some(c) = scan.peek() {
            let digit = match (c as char).to_digit(base) {
                Some(d) => d,
                None => break,
            };
            n = n * base as f64 + digit as f64;
            scan.bump();
        }
        n
    };

    match scan.peek() {
        None => {}
        Some(c) if c.is_ascii_whitespace() || c.is_ascii_punctuation() => {}
        _ => return Err(Error::syntax(scan.line(), "unexpected character")),
    }

    Ok(LexKind::Number(number))
}

/// Lex an identifier or reserved word.  The first byte has been consumed.
fn lex_ident(scan: &mut Scanner) -> LexKind {
    let start = scan.offset() - 1;
    while matches!(scan.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
        scan.bump();
    }

    match scan.slice_from(start) {
        "null" => LexKind::Null,
        "true" => LexKind::Bool(true),
        "false" => LexKind::Bool(false),
        ident => LexKind::Ident(ident.to_owned()),
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Comp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Either,
    Both,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    BitAnd,
    BitOr,
    BitXor,
    Add,
    Sub,
    Mul,
    Div,
    Quot,
    Mod,
    Exp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub line: u32,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Expr>),
    /// Key/value pairs, evaluated positionally.
    Object(Vec<(Expr, Expr)>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `@` — the top-level root value.
    Root,
    /// Bare identifier, resolved against the current scope.
    Ident(String),
    /// `target.name`
    Lookup(Box<Expr>, String),
    /// `target.name(args...)`
    Method(Box<Expr>, String, Vec<Expr>),
    /// `target[index]` or `target[index, upper]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        upper: Option<Box<Expr>>,
    },
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    end_line: u32,
}

impl Parser {
    fn new(lexemes: Vec<Lexeme>, end_line: u32) -> Self {
        Parser {
            lexemes,
            pos: 0,
            end_line,
        }
    }

    fn peek(&self) -> Option<&LexKind> {
        self.lexemes.get(self.pos).map(|l| &l.kind)
    }

    fn next(&mut self) -> Option<Lexeme> {
        let lex = self.lexemes.get(self.pos).cloned();
        if lex.is_some() {
            self.pos += 1;
        }
        lex
    }

    fn eat(&mut self, kind: &LexKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Line of the current lexeme, or of the end of the expression.
    fn line(&self) -> u32 {
        self.lexemes
            .get(self.pos)
            .map(|l| l.line)
            .unwrap_or(self.end_line)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_ternary(&mut self) -> Result<Expr, Error> {
        let cond = self.parse_logic()?;
        if !self.eat(&LexKind::Opt) {
            return Ok(cond);
        }

        let line = cond.line;
        let then = self.parse_logic()?;
        if !self.eat(&LexKind::Colon) {
            return Err(Error::syntax(self.line(), "expected colon for ternary"));
        }
        let otherwise = self.parse_logic()?;

        Ok(Expr {
            line,
            kind: ExprKind::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)),
        })
    }

    fn parse_logic(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(LexKind::Both) => BinOp::Both,
                Some(LexKind::Either) => BinOp::Either,
                _ => break,
            };
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_comparison()?;
            lhs = binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_bitwise()?;
        loop {
            let op = match self.peek() {
                Some(LexKind::Eq) => BinOp::Eq,
                Some(LexKind::Neq) => BinOp::Neq,
                Some(LexKind::Lt) => BinOp::Lt,
                Some(LexKind::Lte) => BinOp::Lte,
                Some(LexKind::Gt) => BinOp::Gt,
                Some(LexKind::Gte) => BinOp::Gte,
                _ => break,
            };
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_bitwise()?;
            lhs = binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bitwise(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(LexKind::BitAnd) => BinOp::BitAnd,
                Some(LexKind::BitOr) => BinOp::BitOr,
                Some(LexKind::BitXor) => BinOp::BitXor,
                _ => break,
            };
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(LexKind::Add) => BinOp::Add,
                Some(LexKind::Sub) => BinOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_exponent()?;
        loop {
            let op = match self.peek() {
                Some(LexKind::Mul) => BinOp::Mul,
                Some(LexKind::Div) => BinOp::Div,
                Some(LexKind::Quot) => BinOp::Quot,
                Some(LexKind::Mod) => BinOp::Mod,
                _ => break,
            };
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_exponent()?;
            lhs = binary(line, op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_exponent(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(&LexKind::Exp) {
            let line = self.line();
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = binary(line, BinOp::Exp, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let op = match self.peek() {
            Some(LexKind::Add) => UnaryOp::Pos,
            Some(LexKind::Sub) => UnaryOp::Neg,
            Some(LexKind::Not) => UnaryOp::Not,
            Some(LexKind::Comp) => UnaryOp::Comp,
            _ => return self.parse_call(),
        };
        let line = self.line();
        self.pos += 1;
        let operand = self.parse_unary()?;
        Ok(Expr {
            line,
            kind: ExprKind::Unary(op, Box::new(operand)),
        })
    }

    fn parse_call(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.eat(&LexKind::Dot) {
                let line = self.line();
                let name = match self.next() {
                    Some(Lexeme {
                        kind: LexKind::Ident(name),
                        ..
                    }) => name,
                    _ => return Err(Error::syntax(line, "expected identifier after dot")),
                };

                if self.eat(&LexKind::LParen) {
                    let mut args = Vec::new();
                    if !self.eat(&LexKind::RParen) {
                        loop {
                            args.push(self.parse_ternary()?);
                            if !self.eat(&LexKind::Comma) {
                                break;
                            }
                        }
                        if !self.eat(&LexKind::RParen) {
                            return Err(Error::syntax(
                                self.line(),
                                "expected closing parenthesis after arguments",
                            ));
                        }
                    }
                    expr = Expr {
                        line,
                        kind: ExprKind::Method(Box::new(expr), name, args),
                    };
                } else {
                    expr = Expr {
                        line,
                        kind: ExprKind::Lookup(Box::new(expr), name),
                    };
                }
            } else if self.eat(&LexKind::LBrack) {
                let line = expr.line;
                let index = self.parse_ternary()?;
                let upper = if self.eat(&LexKind::Comma) {
                    Some(Box::new(self.parse_ternary()?))
                } else {
                    None
                };
                if !self.eat(&LexKind::RBrack) {
                    return Err(Error::syntax(
                        self.line(),
                        "expected closing bracket after subscription",
                    ));
                }
                expr = Expr {
                    line,
                    kind: ExprKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        upper,
                    },
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let Some(lex) = self.next() else {
            return Err(Error::syntax(self.end_line, "unexpected end of file"));
        };
        let line = lex.line;

        let kind = match lex.kind {
            LexKind::Null => ExprKind::Null,
            LexKind::Bool(b) => ExprKind::Bool(b),
            LexKind::Number(n) => ExprKind::Number(n),
            LexKind::Str(s) => ExprKind::Str(s),
            LexKind::Root => ExprKind::Root,
            LexKind::Ident(name) => ExprKind::Ident(name),

            LexKind::LParen => {
                let inner = self.parse_ternary()?;
                if !self.eat(&LexKind::RParen) {
                    return Err(Error::syntax(
                        self.line(),
                        "expected closing parenthesis after group",
                    ));
                }
                return Ok(inner);
            }

            LexKind::LBrack => {
                let mut items = Vec::new();
                if !self.eat(&LexKind::RBrack) {
                    loop {
                        items.push(self.parse_ternary()?);
                        if !self.eat(&LexKind::Comma) {
                            break;
                        }
                    }
                    if !self.eat(&LexKind::RBrack) {
                        return Err(Error::syntax(
                            self.line(),
                            "expected closing bracket after array values",
                        ));
                    }
                }
                ExprKind::Array(items)
            }

            LexKind::LBrace => {
                let mut entries = Vec::new();
                if !self.eat(&LexKind::RBrace) {
                    loop {
                        let key = self.parse_ternary()?;
                        if !self.eat(&LexKind::Colon) {
                            return Err(Error::syntax(
                                self.line(),
                                "expected colon after object key",
                            ));
                        }
                        let value = self.parse_ternary()?;
                        entries.push((key, value));
                        if !self.eat(&LexKind::Comma) {
                            break;
                        }
                    }
                    if !self.eat(&LexKind::RBrace) {
                        return Err(Error::syntax(
                            self.line(),
                            "expected closing brace after object entries",
                        ));
                    }
                }
                ExprKind::Object(entries)
            }

            _ => return Err(Error::syntax(line, "expected expression")),
        };

        Ok(Expr { line, kind })
    }
}

fn binary(line: u32, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr {
        line,
        kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
    }
}

/// Lex and parse one expression, up to `term`.
///
/// The whole lexeme list must be consumed; leftovers are a syntax error.
pub fn parse_expr(scan: &mut Scanner, term: Option<&str>) -> Result<Expr, Error> {
    let lexemes = lex(scan, term)?;
    if lexemes.is_empty() {
        return Err(Error::syntax(
            scan.line(),
            "unterminated expression in substitution",
        ));
    }

    let mut parser = Parser::new(lexemes, scan.line());
    let expr = parser.parse_ternary()?;
    if !parser.at_end() {
        return Err(Error::syntax(parser.line(), "extra tokens in expression"));
    }

    Ok(expr)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<LexKind> {
        let mut scan = Scanner::new(src);
        lex(&mut scan, None)
            .expect("lex failed")
            .into_iter()
            .map(|l| l.kind)
            .collect()
    }

    fn lex_err(src: &str) -> Error {
        let mut scan = Scanner::new(src);
        lex(&mut scan, None).expect_err("lex should fail")
    }

    fn parse(src: &str) -> Expr {
        let mut scan = Scanner::new(src);
        parse_expr(&mut scan, None).expect("parse failed")
    }

    fn parse_err(src: &str) -> Error {
        let mut scan = Scanner::new(src);
        parse_expr(&mut scan, None).expect_err("parse should fail")
    }

    // ── Lexer ─────────────────────────────────────────────────────────────────

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            lex_all("|| | && & == = != ** * // /"),
            vec![
                LexKind::Either,
                LexKind::BitOr,
                LexKind::Both,
                LexKind::BitAnd,
                LexKind::Eq,
                LexKind::Eq,
                LexKind::Neq,
                LexKind::Exp,
                LexKind::Mul,
                LexKind::Quot,
                LexKind::Div,
            ]
        );
    }

    #[test]
    fn number_bases() {
        assert_eq!(lex_all("0b101"), vec![LexKind::Number(5.0)]);
        assert_eq!(lex_all("0o17"), vec![LexKind::Number(15.0)]);
        assert_eq!(lex_all("0xff"), vec![LexKind::Number(255.0)]);
        assert_eq!(lex_all("42"), vec![LexKind::Number(42.0)]);
    }

    #[test]
    fn decimal_fraction_and_exponent() {
        assert_eq!(lex_all("2.5"), vec![LexKind::Number(2.5)]);
        assert_eq!(lex_all("1e3"), vec![LexKind::Number(1000.0)]);
        assert_eq!(lex_all("2E-2"), vec![LexKind::Number(0.02)]);
        assert_eq!(lex_all("1.5e+1"), vec![LexKind::Number(15.0)]);
    }

    #[test]
    fn range_dots_are_not_a_fraction() {
        assert_eq!(
            lex_all("1..5"),
            vec![
                LexKind::Number(1.0),
                LexKind::Dot,
                LexKind::Dot,
                LexKind::Number(5.0),
            ]
        );
    }

    #[test]
    fn leading_zero_rejected() {
        assert_eq!(lex_err("042").message, "decimal literal with leading zero");
    }

    #[test]
    fn empty_exponent_rejected() {
        assert_eq!(lex_err("1e").message, "exponent cannot be empty");
        assert_eq!(lex_err("1e+").message, "exponent cannot be empty");
    }

    #[test]
    fn number_must_terminate_cleanly() {
        assert_eq!(lex_err("5x").message, "unexpected character");
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex_all(r#""a\tb\n\\\"'""#),
            vec![LexKind::Str("a\tb\n\\\"'".into())]
        );
        assert_eq!(lex_all(r#"'\x41\x0a'"#), vec![LexKind::Str("A\n".into())]);
    }

    #[test]
    fn bad_escapes_rejected() {
        assert_eq!(lex_err(r#""\q""#).message, "invalid string escape");
        assert_eq!(lex_err(r#""\x4""#).message, "invalid hex literal");
        assert_eq!(lex_err(r#""\xgg""#).message, "invalid hex literal");
    }

    #[test]
    fn unterminated_string_rejected() {
        assert_eq!(lex_err("\"abc").message, "unterminated string");
    }

    #[test]
    fn reserved_words() {
        assert_eq!(
            lex_all("null true false nullx"),
            vec![
                LexKind::Null,
                LexKind::Bool(true),
                LexKind::Bool(false),
                LexKind::Ident("nullx".into()),
            ]
        );
    }

    #[test]
    fn terminator_stops_lexing_at_depth_zero() {
        let mut scan = Scanner::new("a[0]:rest");
        let lexemes = lex(&mut scan, Some(":")).expect("lex failed");
        assert_eq!(lexemes.len(), 4);
        // The terminator is left for the caller.
        assert_eq!(scan.peek(), Some(b':'));
    }

    #[test]
    fn terminator_ignored_inside_brackets() {
        let mut scan = Scanner::new("{1: 2}:");
        let lexemes = lex(&mut scan, Some(":")).expect("lex failed");
        assert_eq!(lexemes.len(), 5);
        assert_eq!(scan.peek(), Some(b':'));
    }

    #[test]
    fn newlines_tracked_inside_strings() {
        let mut scan = Scanner::new("\"a\nb\" x");
        lex(&mut scan, None).expect("lex failed");
        assert_eq!(scan.line(), 2);
    }

    // ── Parser ────────────────────────────────────────────────────────────────

    fn binop_of(expr: &Expr) -> BinOp {
        match &expr.kind {
            ExprKind::Binary(op, _, _) => *op,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn precedence_mul_over_add() {
        let expr = parse("2 + 3 * 4");
        assert_eq!(binop_of(&expr), BinOp::Add);
        if let ExprKind::Binary(_, _, rhs) = &expr.kind {
            assert_eq!(binop_of(rhs), BinOp::Mul);
        }
    }

    #[test]
    fn precedence_exp_over_mul() {
        let expr = parse("2 * 3 ** 4");
        assert_eq!(binop_of(&expr), BinOp::Mul);
        if let ExprKind::Binary(_, _, rhs) = &expr.kind {
            assert_eq!(binop_of(rhs), BinOp::Exp);
        }
    }

    #[test]
    fn left_associativity() {
        let expr = parse("10 - 4 - 3");
        assert_eq!(binop_of(&expr), BinOp::Sub);
        if let ExprKind::Binary(_, lhs, _) = &expr.kind {
            assert_eq!(binop_of(lhs), BinOp::Sub);
        }
    }

    #[test]
    fn comparison_below_bitwise() {
        let expr = parse("1 & 2 == 3");
        assert_eq!(binop_of(&expr), BinOp::Eq);
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expr = parse("(2 + 3) * 4");
        assert_eq!(binop_of(&expr), BinOp::Mul);
    }

    #[test]
    fn ternary_shape() {
        let expr = parse("a ? 1 : 2");
        assert!(matches!(expr.kind, ExprKind::Ternary(..)));
    }

    #[test]
    fn ternary_missing_colon() {
        assert_eq!(parse_err("a ? 1").message, "expected colon for ternary");
    }

    #[test]
    fn lookup_method_and_index() {
        assert!(matches!(parse("a.b").kind, ExprKind::Lookup(..)));
        assert!(matches!(parse("a.b()").kind, ExprKind::Method(..)));
        assert!(matches!(
            parse("a[0]").kind,
            ExprKind::Index { upper: None, .. }
        ));
        assert!(matches!(
            parse("a[1, 2]").kind,
            ExprKind::Index { upper: Some(_), .. }
        ));
    }

    #[test]
    fn chained_postfix() {
        // a.b[0].c(1) — postfix operations stack left to right.
        let expr = parse("a.b[0].c(1)");
        match expr.kind {
            ExprKind::Method(target, name, args) => {
                assert_eq!(name, "c");
                assert_eq!(args.len(), 1);
                assert!(matches!(target.kind, ExprKind::Index { .. }));
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn container_literals() {
        assert!(matches!(parse("[]").kind, ExprKind::Array(ref v) if v.is_empty()));
        assert!(matches!(parse("[1, 2]").kind, ExprKind::Array(ref v) if v.len() == 2));
        assert!(matches!(parse("{}").kind, ExprKind::Object(ref v) if v.is_empty()));
        assert!(
            matches!(parse("{'a': 1, 'b': 2}").kind, ExprKind::Object(ref v) if v.len() == 2)
        );
    }

    #[test]
    fn object_missing_colon() {
        assert_eq!(parse_err("{'a' 1}").message, "expected colon after object key");
    }

    #[test]
    fn unary_chains() {
        assert!(matches!(
            parse("--1").kind,
            ExprKind::Unary(UnaryOp::Neg, _)
        ));
        assert!(matches!(parse("!x").kind, ExprKind::Unary(UnaryOp::Not, _)));
        assert!(matches!(parse("~5").kind, ExprKind::Unary(UnaryOp::Comp, _)));
    }

    #[test]
    fn leftover_lexemes_rejected() {
        assert_eq!(parse_err("1 2").message, "extra tokens in expression");
    }

    #[test]
    fn empty_expression_rejected() {
        assert_eq!(
            parse_err("").message,
            "unterminated expression in substitution"
        );
    }

    #[test]
    fn dot_without_identifier() {
        assert_eq!(parse_err("a.1").message, "expected identifier after dot");
    }
}
