//! Tree-walking expression evaluator.
//!
//! `eval` consumes an [`Expr`] together with the current scope and the
//! top-level root value and produces a freshly owned value.  The scope is
//! read-only; anything taken from it is cloned before it is returned or
//! placed into a container.  `@` always denotes the root passed to the
//! render call, which is threaded separately so that `with`- and
//! `for`-introduced scopes do not shadow it.

use crate::error::Error;
use crate::expr::{BinOp, Expr, ExprKind, UnaryOp};
use crate::methods;
use crate::value::{JsonValue, Kind};

/// Truthiness: `null` is false, booleans are themselves, numbers are
/// nonzero, strings are nonempty, containers are nonempty.
pub(crate) fn truthy<V: JsonValue>(value: &V) -> bool {
    match value.kind() {
        Kind::Null => false,
        Kind::Boolean => value.as_bool(),
        Kind::Number => value.as_number() != 0.0,
        Kind::String => !value.as_str().is_empty(),
        Kind::Array | Kind::Object => value.len() > 0,
    }
}

/// Equality under `==`, `!=`, and `case` matching.
///
/// Different kinds never compare equal.  Arrays and objects always compare
/// unequal, even to themselves.
pub(crate) fn value_eq<V: JsonValue>(lhs: &V, rhs: &V) -> bool {
    if lhs.kind() != rhs.kind() {
        return false;
    }
    match lhs.kind() {
        Kind::Null => true,
        Kind::Boolean => lhs.as_bool() == rhs.as_bool(),
        Kind::Number => lhs.as_number() == rhs.as_number(),
        Kind::String => lhs.as_str() == rhs.as_str(),
        Kind::Array | Kind::Object => false,
    }
}

/// Reinterpret a whole finite double as a 64-bit pattern for the bitwise
/// operators.  Negative values wrap two's-complement; values at or beyond
/// 2^64 saturate to the all-ones mask.
fn to_bits(n: f64) -> u64 {
    if n < 0.0 {
        n as i64 as u64
    } else {
        n as u64
    }
}

/// Evaluate `expr` against `scope`, with `root` reachable through `@`.
pub fn eval<V: JsonValue>(expr: &Expr, scope: &V, root: &V) -> Result<V, Error> {
    match &expr.kind {
        ExprKind::Null => Ok(V::null()),
        ExprKind::Bool(b) => Ok(V::from_bool(*b)),
        ExprKind::Number(n) => Ok(V::from_number(*n)),
        ExprKind::Str(s) => Ok(V::from_str(s)),

        ExprKind::Array(items) => {
            let mut array = V::new_array();
            for item in items {
                array.push(eval(item, scope, root)?);
            }
            Ok(array)
        }

        ExprKind::Object(entries) => {
            let mut object = V::new_object();
            for (key_expr, value_expr) in entries {
                let key = eval(key_expr, scope, root)?;
                match key.kind() {
                    // A null key drops the pair; the value is still
                    // evaluated, for its errors.
                    Kind::Null => {
                        eval(value_expr, scope, root)?;
                    }
                    Kind::String => {
                        let value = eval(value_expr, scope, root)?;
                        object.insert(key.as_str(), value);
                    }
                    _ => {
                        return Err(Error::type_error(
                            key_expr.line,
                            "object key must be string or null",
                        ));
                    }
                }
            }
            Ok(object)
        }

        ExprKind::Unary(op, operand) => eval_unary(expr.line, *op, operand, scope, root),
        ExprKind::Binary(op, lhs, rhs) => eval_binary(expr.line, *op, lhs, rhs, scope, root),

        ExprKind::Ternary(cond, then, otherwise) => {
            let value = eval(cond, scope, root)?;
            if truthy(&value) {
                eval(then, scope, root)
            } else {
                eval(otherwise, scope, root)
            }
        }

        ExprKind::Root => Ok(root.clone()),

        ExprKind::Ident(name) => lookup_member(expr.line, scope, name),

        ExprKind::Lookup(target, name) => {
            let object = eval(target, scope, root)?;
            lookup_member(expr.line, &object, name)
        }

        ExprKind::Method(target, name, args) => {
            let receiver = eval(target, scope, root)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, scope, root)?);
            }
            methods::call(name, &receiver, &values, expr.line)
        }

        ExprKind::Index {
            target,
            index,
            upper,
        } => eval_index(expr, target, index, upper.as_deref(), scope, root),
    }
}

fn lookup_member<V: JsonValue>(line: u32, object: &V, name: &str) -> Result<V, Error> {
    if object.kind() != Kind::Object {
        return Err(Error::type_error(
            line,
            "can only lookup properties of object",
        ));
    }
    match object.get(name) {
        Some(value) => Ok(value.clone()),
        None => Err(Error::name_error(line, format!("'{name}' is undefined"))),
    }
}

fn eval_unary<V: JsonValue>(
    line: u32,
    op: UnaryOp,
    operand: &Expr,
    scope: &V,
    root: &V,
) -> Result<V, Error> {
    let value = eval(operand, scope, root)?;

    match op {
        UnaryOp::Not => Ok(V::from_bool(!truthy(&value))),

        UnaryOp::Pos | UnaryOp::Neg => {
            if value.kind() != Kind::Number {
                return Err(Error::type_error(line, "operand must be number"));
            }
            let n = value.as_number();
            Ok(V::from_number(if op == UnaryOp::Neg { -n } else { n }))
        }

        UnaryOp::Comp => {
            if value.kind() != Kind::Number {
                return Err(Error::type_error(
                    operand.line,
                    "bitwise operands must be numbers",
                ));
            }
            let n = value.as_number();
            if n.fract() != 0.0 {
                return Err(Error::value_error(
                    operand.line,
                    "bitwise operands must be whole numbers",
                ));
            }
            Ok(V::from_number(!to_bits(n) as f64))
        }
    }
}

fn eval_binary<V: JsonValue>(
    line: u32,
    op: BinOp,
    lhs_expr: &Expr,
    rhs_expr: &Expr,
    scope: &V,
    root: &V,
) -> Result<V, Error> {
    // Short-circuit logic first; the right operand may never run.
    if let BinOp::Either | BinOp::Both = op {
        let lhs = eval(lhs_expr, scope, root)?;
        if (op == BinOp::Either) == truthy(&lhs) {
            return Ok(lhs);
        }
        return eval(rhs_expr, scope, root);
    }

    match op {
        BinOp::Eq | BinOp::Neq => {
            let lhs = eval(lhs_expr, scope, root)?;
            let rhs = eval(rhs_expr, scope, root)?;
            Ok(V::from_bool((op == BinOp::Eq) == value_eq(&lhs, &rhs)))
        }

        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
            let lhs = eval(lhs_expr, scope, root)?;
            let rhs = eval(rhs_expr, scope, root)?;

            if lhs.kind() != rhs.kind() {
                return Err(Error::type_error(line, "can only compare similar types"));
            }
            let ordering = match lhs.kind() {
                Kind::Number => lhs.as_number().partial_cmp(&rhs.as_number()),
                Kind::String => Some(lhs.as_str().cmp(rhs.as_str())),
                _ => {
                    return Err(Error::type_error(
                        line,
                        "can only compare number or string",
                    ));
                }
            };

            let holds = match ordering {
                Some(std::cmp::Ordering::Less) => op == BinOp::Lt || op == BinOp::Lte,
                Some(std::cmp::Ordering::Greater) => op == BinOp::Gt || op == BinOp::Gte,
                Some(std::cmp::Ordering::Equal) => op == BinOp::Lte || op == BinOp::Gte,
                // NaN compares false against everything.
                None => false,
            };
            Ok(V::from_bool(holds))
        }

        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Quot | BinOp::Mod
        | BinOp::Exp => eval_arithmetic(line, op, lhs_expr, rhs_expr, scope, root),

        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
            let lhs = eval(lhs_expr, scope, root)?;
            let a = bitwise_operand(&lhs, lhs_expr.line)?;
            let rhs = eval(rhs_expr, scope, root)?;
            let b = bitwise_operand(&rhs, rhs_expr.line)?;

            let bits = match op {
                BinOp::BitAnd => a & b,
                BinOp::BitOr => a | b,
                BinOp::BitXor => a ^ b,
                _ => unreachable!(),
            };
            Ok(V::from_number(bits as f64))
        }

        BinOp::Either | BinOp::Both => unreachable!("handled above"),
    }
}

fn bitwise_operand<V: JsonValue>(value: &V, line: u32) -> Result<u64, Error> {
    if value.kind() != Kind::Number {
        return Err(Error::type_error(line, "bitwise operands must be numbers"));
    }
    let n = value.as_number();
    if n.fract() != 0.0 {
        return Err(Error::value_error(
            line,
            "bitwise operands must be whole numbers",
        ));
    }
    Ok(to_bits(n))
}

fn eval_arithmetic<V: JsonValue>(
    line: u32,
    op: BinOp,
    lhs_expr: &Expr,
    rhs_expr: &Expr,
    scope: &V,
    root: &V,
) -> Result<V, Error> {
    let lhs = eval(lhs_expr, scope, root)?;
    let lhs_kind = lhs.kind();
    let sequence = matches!(lhs_kind, Kind::String | Kind::Array);

    if lhs_kind != Kind::Number && !(sequence && matches!(op, BinOp::Add | BinOp::Mul)) {
        return Err(Error::type_error(lhs_expr.line, "operands must be numbers"));
    }

    let rhs = eval(rhs_expr, scope, root)?;

    if !(sequence && op == BinOp::Add) && rhs.kind() != Kind::Number {
        return Err(Error::type_error(rhs_expr.line, "operands must be numbers"));
    }

    if sequence && op == BinOp::Add {
        // `+` concatenates like sequences.
        if rhs.kind() != lhs_kind {
            return Err(Error::type_error(
                line,
                "sequence concatenation requires similar types",
            ));
        }
        return Ok(match lhs_kind {
            Kind::String => {
                let mut s = lhs.as_str().to_owned();
                s.push_str(rhs.as_str());
                V::from_str(&s)
            }
            _ => {
                let mut array = V::new_array();
                for i in 0..lhs.len() {
                    if let Some(item) = lhs.at(i) {
                        array.push(item.clone());
                    }
                }
                for i in 0..rhs.len() {
                    if let Some(item) = rhs.at(i) {
                        array.push(item.clone());
                    }
                }
                array
            }
        });
    }

    if sequence && op == BinOp::Mul {
        // `*` repeats a sequence a whole number of times.
        if rhs.as_number().fract() != 0.0 {
            return Err(Error::value_error(
                rhs_expr.line,
                "sequence multiplication rhs must be whole",
            ));
        }
        let count = rhs.as_number().max(0.0) as usize;
        return Ok(repeat_sequence(&lhs, count));
    }

    let a = lhs.as_number();
    let b = rhs.as_number();
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Quot => (a / b).floor(),
        BinOp::Mod => a % b,
        BinOp::Exp => a.powf(b),
        _ => unreachable!(),
    };
    Ok(V::from_number(result))
}

/// Repeat a string or array `count` times.  Used by `*` and `repeat`.
pub(crate) fn repeat_sequence<V: JsonValue>(value: &V, count: usize) -> V {
    match value.kind() {
        Kind::String => V::from_str(&value.as_str().repeat(count)),
        _ => {
            let mut array = V::new_array();
            for _ in 0..count {
                for i in 0..value.len() {
                    if let Some(item) = value.at(i) {
                        array.push(item.clone());
                    }
                }
            }
            array
        }
    }
}

fn eval_index<V: JsonValue>(
    expr: &Expr,
    target: &Expr,
    index: &Expr,
    upper: Option<&Expr>,
    scope: &V,
    root: &V,
) -> Result<V, Error> {
    let value = eval(target, scope, root)?;
    let idx = eval(index, scope, root)?;
    let upper_value = match upper {
        Some(u) => Some((u, eval(u, scope, root)?)),
        None => None,
    };

    match value.kind() {
        Kind::String | Kind::Array => {
            let len = value.len() as f64;
            let i = sequence_index(&idx, index.line, len)?;

            if let Some((upper_expr, upper_val)) = upper_value {
                let j = sequence_index(&upper_val, upper_expr.line, len)?;

                // Clamp both endpoints to [0, len]; an inverted range is empty.
                let i = i.clamp(0.0, len) as usize;
                let j = (j.clamp(0.0, len) as usize).max(i);

                Ok(match value.kind() {
                    Kind::String => {
                        let slice: String =
                            value.as_str().chars().skip(i).take(j - i).collect();
                        V::from_str(&slice)
                    }
                    _ => {
                        let mut array = V::new_array();
                        for k in i..j {
                            if let Some(item) = value.at(k) {
                                array.push(item.clone());
                            }
                        }
                        array
                    }
                })
            } else {
                if i < 0.0 || i >= len {
                    return Err(Error::value_error(index.line, "index out of range"));
                }
                let i = i as usize;

                Ok(match value.kind() {
                    Kind::String => match value.as_str().chars().nth(i) {
                        Some(c) => V::from_str(&c.to_string()),
                        None => V::from_str(""),
                    },
                    _ => match value.at(i) {
                        Some(item) => item.clone(),
                        None => V::null(),
                    },
                })
            }
        }

        Kind::Object => {
            if let Some((upper_expr, _)) = upper_value {
                return Err(Error::type_error(
                    upper_expr.line,
                    "cannot range-index an object",
                ));
            }
            if idx.kind() != Kind::String {
                return Err(Error::type_error(index.line, "index must be a string"));
            }
            match value.get(idx.as_str()) {
                Some(member) => Ok(member.clone()),
                None => Err(Error::value_error(index.line, "index out of range")),
            }
        }

        _ => Err(Error::type_error(
            expr.line,
            "can only index string, array, or object",
        )),
    }
}

/// Check an index operand: must be a whole number; negative values count
/// from the end.
fn sequence_index<V: JsonValue>(idx: &V, line: u32, len: f64) -> Result<f64, Error> {
    if idx.kind() != Kind::Number {
        return Err(Error::type_error(line, "index must be a number"));
    }
    let n = idx.as_number();
    if n.fract() != 0.0 {
        return Err(Error::value_error(line, "indices must be whole numbers"));
    }
    Ok(if n < 0.0 { n + len } else { n })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::scan::Scanner;
    use serde_json::{json, Value};

    fn eval_with(src: &str, scope: &Value) -> Result<Value, Error> {
        let mut scan = Scanner::new(src);
        let expr = crate::expr::parse_expr(&mut scan, None)?;
        eval(&expr, scope, scope)
    }

    fn ok(src: &str) -> Value {
        eval_with(src, &json!({})).expect("eval failed")
    }

    fn ok_scope(src: &str, scope: &Value) -> Value {
        eval_with(src, scope).expect("eval failed")
    }

    fn err(src: &str) -> Error {
        eval_with(src, &json!({})).expect_err("eval should fail")
    }

    #[test]
    fn literals() {
        assert_eq!(ok("null"), json!(null));
        assert_eq!(ok("true"), json!(true));
        assert_eq!(ok("42"), json!(42));
        assert_eq!(ok("'hi'"), json!("hi"));
    }

    #[test]
    fn container_literals() {
        assert_eq!(ok("[1, 2, 3]"), json!([1, 2, 3]));
        assert_eq!(ok("{'a': 1, 'b': [2]}"), json!({"a": 1, "b": [2]}));
    }

    #[test]
    fn null_object_key_drops_pair() {
        assert_eq!(ok("{null: 1, 'b': 2}"), json!({"b": 2}));
    }

    #[test]
    fn non_string_object_key_rejected() {
        let e = err("{1: 2}");
        assert_eq!(e.code, ErrorCode::Type);
        assert_eq!(e.message, "object key must be string or null");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(ok("2 + 3"), json!(5));
        assert_eq!(ok("10 - 4"), json!(6));
        assert_eq!(ok("3 * 4"), json!(12));
        assert_eq!(ok("7 / 2"), json!(3.5));
        assert_eq!(ok("7 // 2"), json!(3));
        assert_eq!(ok("-7 // 2"), json!(-4));
        assert_eq!(ok("7 % 3"), json!(1));
        assert_eq!(ok("2 ** 10"), json!(1024));
    }

    #[test]
    fn string_concat_and_repeat() {
        assert_eq!(ok("'ab' + 'cd'"), json!("abcd"));
        assert_eq!(ok("'ab' * 3"), json!("ababab"));
    }

    #[test]
    fn array_concat_and_repeat() {
        assert_eq!(ok("[1] + [2, 3]"), json!([1, 2, 3]));
        assert_eq!(ok("[1, 2] * 2"), json!([1, 2, 1, 2]));
    }

    #[test]
    fn mixed_concat_rejected() {
        let e = err("'a' + [1]");
        assert_eq!(e.message, "sequence concatenation requires similar types");
    }

    #[test]
    fn fractional_repeat_rejected() {
        let e = err("'a' * 1.5");
        assert_eq!(e.code, ErrorCode::Value);
        assert_eq!(e.message, "sequence multiplication rhs must be whole");
    }

    #[test]
    fn arithmetic_type_errors() {
        assert_eq!(err("null + 1").message, "operands must be numbers");
        assert_eq!(err("1 + 'a'").message, "operands must be numbers");
        assert_eq!(err("'a' - 'b'").message, "operands must be numbers");
    }

    #[test]
    fn logic_returns_operand() {
        assert_eq!(ok("0 || 'x'"), json!("x"));
        assert_eq!(ok("'a' || 'b'"), json!("a"));
        assert_eq!(ok("0 && 'x'"), json!(0));
        assert_eq!(ok("1 && 'x'"), json!("x"));
    }

    #[test]
    fn short_circuit_skips_rhs() {
        // The right side would be a name error if evaluated.
        assert_eq!(ok("1 || nosuch"), json!(1));
        assert_eq!(ok("0 && nosuch"), json!(0));
    }

    #[test]
    fn equality() {
        assert_eq!(ok("null == null"), json!(true));
        assert_eq!(ok("1 == 1.0"), json!(true));
        assert_eq!(ok("'a' == 'a'"), json!(true));
        assert_eq!(ok("1 == '1'"), json!(false));
        assert_eq!(ok("1 != 2"), json!(true));
        // Containers never compare equal.
        assert_eq!(ok("[1] == [1]"), json!(false));
        assert_eq!(ok("{} == {}"), json!(false));
    }

    #[test]
    fn ordered_comparison() {
        assert_eq!(ok("1 < 2"), json!(true));
        assert_eq!(ok("2 <= 2"), json!(true));
        assert_eq!(ok("'abc' < 'abd'"), json!(true));
        assert_eq!(ok("'b' >= 'a'"), json!(true));
    }

    #[test]
    fn comparison_type_errors() {
        assert_eq!(err("1 < 'a'").message, "can only compare similar types");
        assert_eq!(err("[1] < [2]").message, "can only compare number or string");
    }

    #[test]
    fn bitwise() {
        assert_eq!(ok("5 & 3"), json!(1));
        assert_eq!(ok("5 | 2"), json!(7));
        assert_eq!(ok("5 ^ 3"), json!(6));
        assert_eq!(ok("~0"), json!(u64::MAX as f64));
    }

    #[test]
    fn hex_max_is_the_all_ones_mask() {
        assert_eq!(ok("0xffffffffffffffff & 0xff"), json!(255));
        assert_eq!(ok("0xffffffffffffffff ^ 0xffffffffffffffff"), json!(0));
    }

    #[test]
    fn bitwise_requires_whole_numbers() {
        assert_eq!(err("1.5 & 1").message, "bitwise operands must be whole numbers");
        assert_eq!(err("'a' | 1").message, "bitwise operands must be numbers");
        assert_eq!(err("~'a'").message, "bitwise operands must be numbers");
    }

    #[test]
    fn unary() {
        assert_eq!(ok("-5"), json!(-5));
        assert_eq!(ok("+5"), json!(5));
        assert_eq!(ok("!0"), json!(true));
        assert_eq!(ok("!'x'"), json!(false));
        assert_eq!(err("-'a'").message, "operand must be number");
    }

    #[test]
    fn ternary_evaluates_one_branch() {
        assert_eq!(ok("1 ? 'yes' : nosuch"), json!("yes"));
        assert_eq!(ok("0 ? nosuch : 'no'"), json!("no"));
    }

    #[test]
    fn root_clones_top_level() {
        let scope = json!({"a": 1});
        assert_eq!(ok_scope("@", &scope), scope);
    }

    #[test]
    fn ident_lookup() {
        let scope = json!({"name": "world"});
        assert_eq!(ok_scope("name", &scope), json!("world"));
    }

    #[test]
    fn missing_ident_is_name_error() {
        let e = err("nosuch");
        assert_eq!(e.code, ErrorCode::Name);
        assert_eq!(e.message, "'nosuch' is undefined");
    }

    #[test]
    fn lookup_chain() {
        let scope = json!({"a": {"b": {"c": 7}}});
        assert_eq!(ok_scope("a.b.c", &scope), json!(7));
    }

    #[test]
    fn lookup_on_non_object_rejected() {
        let scope = json!({"a": 1});
        let e = eval_with("a.b", &scope).expect_err("should fail");
        assert_eq!(e.message, "can only lookup properties of object");
    }

    #[test]
    fn string_indexing() {
        let scope = json!({"s": "hello"});
        assert_eq!(ok_scope("s[0]", &scope), json!("h"));
        assert_eq!(ok_scope("s[-1]", &scope), json!("o"));
        assert_eq!(ok_scope("s[1, 3]", &scope), json!("el"));
        assert_eq!(ok_scope("s[0, 5]", &scope), json!("hello"));
    }

    #[test]
    fn array_indexing() {
        let scope = json!({"a": [10, 20, 30]});
        assert_eq!(ok_scope("a[1]", &scope), json!(20));
        assert_eq!(ok_scope("a[-1]", &scope), json!(30));
        assert_eq!(ok_scope("a[1, 3]", &scope), json!([20, 30]));
    }

    #[test]
    fn index_out_of_range() {
        let scope = json!({"s": "abc"});
        let e = eval_with("s[3]", &scope).expect_err("should fail");
        assert_eq!(e.code, ErrorCode::Value);
        assert_eq!(e.message, "index out of range");
        assert!(eval_with("s[-4]", &scope).is_err());
    }

    #[test]
    fn range_clamps_and_empties() {
        let scope = json!({"s": "abc"});
        assert_eq!(ok_scope("s[0, 99]", &scope), json!("abc"));
        assert_eq!(ok_scope("s[-99, 2]", &scope), json!("ab"));
        assert_eq!(ok_scope("s[2, 1]", &scope), json!(""));
    }

    #[test]
    fn fractional_index_rejected() {
        let scope = json!({"a": [1]});
        let e = eval_with("a[0.5]", &scope).expect_err("should fail");
        assert_eq!(e.message, "indices must be whole numbers");
    }

    #[test]
    fn object_indexing() {
        let scope = json!({"o": {"k": 5}});
        assert_eq!(ok_scope("o['k']", &scope), json!(5));
        let e = eval_with("o['nope']", &scope).expect_err("should fail");
        assert_eq!(e.code, ErrorCode::Value);
        let e = eval_with("o[1]", &scope).expect_err("should fail");
        assert_eq!(e.message, "index must be a string");
        let e = eval_with("o['a', 'b']", &scope).expect_err("should fail");
        assert_eq!(e.message, "cannot range-index an object");
    }

    #[test]
    fn index_on_scalar_rejected() {
        assert_eq!(
            err("5[0]").message,
            "can only index string, array, or object"
        );
    }

    #[test]
    fn scope_is_not_mutated() {
        let scope = json!({"a": [1, 2], "b": {"c": 3}});
        let before = scope.clone();
        let _ = ok_scope("a + [9]", &scope);
        let _ = ok_scope("{'x': b}", &scope);
        assert_eq!(scope, before);
    }

    #[test]
    fn truthiness_table() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(truthy(&json!(true)));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!(0.5)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("x")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!([0])));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!({"a": null})));
    }
}
