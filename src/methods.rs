//! Method catalog for `receiver.name(args...)` expressions.
//!
//! Dispatch is tolerant by design: an unknown method name and a receiver of
//! the wrong type both yield `null`, so templates can probe values without
//! erroring.  A known name called with the wrong number of arguments is a
//! value error.

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::error::Error;
use crate::eval::{repeat_sequence, truthy, value_eq};
use crate::value::{JsonValue, Kind};

/// Name and argument count of every method.
const METHODS: &[(&str, usize)] = &[
    ("boolean", 0),
    ("contains", 1),
    ("datetime", 0),
    ("find", 1),
    ("join", 1),
    ("keys", 0),
    ("length", 0),
    ("lower", 0),
    ("nan", 0),
    ("number", 0),
    ("real", 0),
    ("repeat", 1),
    ("replace", 2),
    ("reverse", 0),
    ("round", 0),
    ("sort", 0),
    ("string", 0),
    ("type", 0),
    ("upper", 0),
    ("values", 0),
];

/// Dispatch a method call on an evaluated receiver.
pub(crate) fn call<V: JsonValue>(
    name: &str,
    receiver: &V,
    args: &[V],
    line: u32,
) -> Result<V, Error> {
    let arity = match METHODS.iter().find(|(n, _)| *n == name) {
        Some((_, arity)) => *arity,
        None => return Ok(V::null()),
    };

    if args.len() != arity {
        return Err(Error::value_error(
            line,
            if args.len() > arity {
                "too many arguments to method"
            } else {
                "not enough arguments to method"
            },
        ));
    }

    Ok(match name {
        // ── Conversions ───────────────────────────────────────────────────────
        "boolean" => V::from_bool(truthy(receiver)),

        "number" => match receiver.kind() {
            Kind::Null => V::from_number(0.0),
            Kind::Boolean => V::from_number(if receiver.as_bool() { 1.0 } else { 0.0 }),
            Kind::Number => receiver.clone(),
            Kind::String => {
                V::from_number(receiver.as_str().trim().parse::<f64>().unwrap_or(0.0))
            }
            _ => V::null(),
        },

        "string" => match receiver.print() {
            Some(json) => V::from_str(&json),
            None => V::null(),
        },

        "type" => V::from_str(receiver.kind().name()),

        // ── Inspection ────────────────────────────────────────────────────────
        "length" => match receiver.kind() {
            Kind::String | Kind::Array | Kind::Object => V::from_number(receiver.len() as f64),
            _ => V::null(),
        },

        "keys" => match receiver.kind() {
            Kind::Object => {
                let mut array = V::new_array();
                for key in receiver.keys() {
                    array.push(V::from_str(&key));
                }
                array
            }
            Kind::Array | Kind::String => {
                let mut array = V::new_array();
                for i in 0..receiver.len() {
                    array.push(V::from_number(i as f64));
                }
                array
            }
            _ => V::null(),
        },

        "values" => match receiver.kind() {
            Kind::Object => {
                let mut array = V::new_array();
                for key in receiver.keys() {
                    if let Some(member) = receiver.get(&key) {
                        array.push(member.clone());
                    }
                }
                array
            }
            Kind::Array => {
                let mut array = V::new_array();
                for i in 0..receiver.len() {
                    if let Some(item) = receiver.at(i) {
                        array.push(item.clone());
                    }
                }
                array
            }
            Kind::String => {
                let mut array = V::new_array();
                for c in receiver.as_str().chars() {
                    array.push(V::from_str(&c.to_string()));
                }
                array
            }
            _ => V::null(),
        },

        // ── Search ────────────────────────────────────────────────────────────
        "contains" => match find_in(receiver, &args[0]) {
            Some(found) => V::from_bool(found >= 0.0),
            None => V::null(),
        },

        "find" => match find_in(receiver, &args[0]) {
            Some(found) => V::from_number(found),
            None => V::null(),
        },

        // ── Sequence operations ───────────────────────────────────────────────
        "join" => {
            if receiver.kind() != Kind::Array || args[0].kind() != Kind::String {
                return Ok(V::null());
            }
            let mut parts = Vec::with_capacity(receiver.len());
            for i in 0..receiver.len() {
                match receiver.at(i) {
                    Some(item) if item.kind() == Kind::String => {
                        parts.push(item.as_str().to_owned());
                    }
                    _ => return Ok(V::null()),
                }
            }
            V::from_str(&parts.join(args[0].as_str()))
        }

        "repeat" => {
            if !matches!(receiver.kind(), Kind::String | Kind::Array)
                || args[0].kind() != Kind::Number
            {
                return Ok(V::null());
            }
            let count = args[0].as_number();
            if count.fract() != 0.0 {
                return Err(Error::value_error(
                    line,
                    "sequence multiplication rhs must be whole",
                ));
            }
            repeat_sequence(receiver, count.max(0.0) as usize)
        }

        "replace" => {
            if receiver.kind() != Kind::String
                || args[0].kind() != Kind::String
                || args[1].kind() != Kind::String
            {
                return Ok(V::null());
            }
            V::from_str(&receiver.as_str().replace(args[0].as_str(), args[1].as_str()))
        }

        "reverse" => match receiver.kind() {
            Kind::String => V::from_str(&receiver.as_str().chars().rev().collect::<String>()),
            Kind::Array => {
                let mut array = V::new_array();
                for i in (0..receiver.len()).rev() {
                    if let Some(item) = receiver.at(i) {
                        array.push(item.clone());
                    }
                }
                array
            }
            _ => V::null(),
        },

        "sort" => sort_array(receiver),

        // ── Strings ───────────────────────────────────────────────────────────
        "lower" => match receiver.kind() {
            Kind::String => V::from_str(&receiver.as_str().to_ascii_lowercase()),
            _ => V::null(),
        },

        "upper" => match receiver.kind() {
            Kind::String => V::from_str(&receiver.as_str().to_ascii_uppercase()),
            _ => V::null(),
        },

        "datetime" => match receiver.kind() {
            Kind::String => format_datetime(receiver.as_str())
                .map_or_else(V::null, |s| V::from_str(&s)),
            _ => V::null(),
        },

        // ── Numbers ───────────────────────────────────────────────────────────
        "round" => match receiver.kind() {
            Kind::Number => V::from_number(receiver.as_number().round()),
            _ => V::null(),
        },

        "nan" => match receiver.kind() {
            Kind::Number => V::from_bool(receiver.as_number().is_nan()),
            _ => V::null(),
        },

        "real" => match receiver.kind() {
            Kind::Number => V::from_bool(receiver.as_number().is_finite()),
            _ => V::null(),
        },

        _ => unreachable!("name was found in the method table"),
    })
}

/// Shared search for `contains` and `find`: substring position for
/// string×string, element position for array×any.  `None` means the
/// receiver/argument combination is unsupported; `-1.0` means not found.
fn find_in<V: JsonValue>(receiver: &V, needle: &V) -> Option<f64> {
    match receiver.kind() {
        Kind::String => {
            if needle.kind() != Kind::String {
                return None;
            }
            let haystack = receiver.as_str();
            match haystack.find(needle.as_str()) {
                Some(byte_pos) => Some(haystack[..byte_pos].chars().count() as f64),
                None => Some(-1.0),
            }
        }
        Kind::Array => {
            for i in 0..receiver.len() {
                if let Some(item) = receiver.at(i) {
                    if value_eq(item, needle) {
                        return Some(i as f64);
                    }
                }
            }
            Some(-1.0)
        }
        _ => None,
    }
}

/// Sort an array of all-numbers (ascending) or all-strings (byte order).
/// Anything else yields `null`.
fn sort_array<V: JsonValue>(receiver: &V) -> V {
    if receiver.kind() != Kind::Array {
        return V::null();
    }

    let mut items: Vec<&V> = Vec::with_capacity(receiver.len());
    for i in 0..receiver.len() {
        if let Some(item) = receiver.at(i) {
            items.push(item);
        }
    }

    if items.iter().all(|v| v.kind() == Kind::Number) {
        items.sort_by(|a, b| a.as_number().total_cmp(&b.as_number()));
    } else if items.iter().all(|v| v.kind() == Kind::String) {
        items.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    } else {
        return V::null();
    }

    let mut array = V::new_array();
    for item in items {
        array.push((*item).clone());
    }
    array
}

/// Format the current local time with an strftime-style pattern.
/// `None` on an invalid pattern.
fn format_datetime(pattern: &str) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(Local::now().format_with_items(items.into_iter()).to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::{json, Value};

    fn call_v(name: &str, receiver: Value, args: &[Value]) -> Value {
        call(name, &receiver, args, 1).expect("method failed")
    }

    #[test]
    fn unknown_method_yields_null() {
        assert_eq!(call_v("bogus", json!(1), &[]), json!(null));
    }

    #[test]
    fn wrong_arity_is_value_error() {
        let err = call("length", &json!("abc"), &[json!(1)], 7).expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Value);
        assert_eq!(err.message, "too many arguments to method");
        assert_eq!(err.line, 7);

        let err = call("contains", &json!("abc"), &[], 1).expect_err("should fail");
        assert_eq!(err.message, "not enough arguments to method");
    }

    #[test]
    fn boolean_uses_truthiness() {
        assert_eq!(call_v("boolean", json!(""), &[]), json!(false));
        assert_eq!(call_v("boolean", json!([0]), &[]), json!(true));
    }

    #[test]
    fn number_conversions() {
        assert_eq!(call_v("number", json!(null), &[]), json!(0));
        assert_eq!(call_v("number", json!(true), &[]), json!(1));
        assert_eq!(call_v("number", json!(2.5), &[]), json!(2.5));
        assert_eq!(call_v("number", json!("42"), &[]), json!(42));
        assert_eq!(call_v("number", json!(" 1.5 "), &[]), json!(1.5));
        assert_eq!(call_v("number", json!("nope"), &[]), json!(0));
        assert_eq!(call_v("number", json!([]), &[]), json!(null));
    }

    #[test]
    fn string_serializes_to_json() {
        assert_eq!(call_v("string", json!(5), &[]), json!("5"));
        assert_eq!(call_v("string", json!("a"), &[]), json!("\"a\""));
        assert_eq!(call_v("string", json!([1, 2]), &[]), json!("[1,2]"));
    }

    #[test]
    fn type_names() {
        assert_eq!(call_v("type", json!(null), &[]), json!("null"));
        assert_eq!(call_v("type", json!(1), &[]), json!("number"));
        assert_eq!(call_v("type", json!({}), &[]), json!("object"));
    }

    #[test]
    fn length_by_kind() {
        assert_eq!(call_v("length", json!("abc"), &[]), json!(3));
        assert_eq!(call_v("length", json!([1, 2]), &[]), json!(2));
        assert_eq!(call_v("length", json!({"a": 1}), &[]), json!(1));
        assert_eq!(call_v("length", json!(5), &[]), json!(null));
    }

    #[test]
    fn keys_and_values() {
        assert_eq!(
            call_v("keys", json!({"b": 1, "a": 2}), &[]),
            json!(["b", "a"])
        );
        assert_eq!(call_v("keys", json!([7, 8]), &[]), json!([0, 1]));
        assert_eq!(call_v("keys", json!("ab"), &[]), json!([0, 1]));
        assert_eq!(
            call_v("values", json!({"b": 1, "a": 2}), &[]),
            json!([1, 2])
        );
        assert_eq!(call_v("values", json!([7, 8]), &[]), json!([7, 8]));
        assert_eq!(call_v("values", json!("ab"), &[]), json!(["a", "b"]));
        assert_eq!(call_v("keys", json!(1), &[]), json!(null));
    }

    #[test]
    fn contains_and_find() {
        assert_eq!(call_v("contains", json!("hello"), &[json!("ell")]), json!(true));
        assert_eq!(call_v("contains", json!("hello"), &[json!("xyz")]), json!(false));
        assert_eq!(call_v("find", json!("hello"), &[json!("llo")]), json!(2));
        assert_eq!(call_v("find", json!("hello"), &[json!("z")]), json!(-1));
        assert_eq!(call_v("contains", json!([1, 2]), &[json!(2)]), json!(true));
        assert_eq!(call_v("find", json!([1, 2]), &[json!(2)]), json!(1));
        assert_eq!(call_v("find", json!([1, 2]), &[json!(9)]), json!(-1));
        assert_eq!(call_v("contains", json!(5), &[json!(5)]), json!(null));
        assert_eq!(call_v("contains", json!("a"), &[json!(1)]), json!(null));
    }

    #[test]
    fn join_arrays_of_strings() {
        assert_eq!(
            call_v("join", json!(["a", "b", "c"]), &[json!(", ")]),
            json!("a, b, c")
        );
        assert_eq!(call_v("join", json!([]), &[json!(",")]), json!(""));
        assert_eq!(call_v("join", json!(["a", 1]), &[json!(",")]), json!(null));
        assert_eq!(call_v("join", json!("ab"), &[json!(",")]), json!(null));
    }

    #[test]
    fn repeat_sequences() {
        assert_eq!(call_v("repeat", json!("ab"), &[json!(2)]), json!("abab"));
        assert_eq!(call_v("repeat", json!([1]), &[json!(3)]), json!([1, 1, 1]));
        assert_eq!(call_v("repeat", json!("ab"), &[json!("x")]), json!(null));
        assert!(call("repeat", &json!("ab"), &[json!(1.5)], 1).is_err());
    }

    #[test]
    fn replace_strings() {
        assert_eq!(
            call_v("replace", json!("a-b-c"), &[json!("-"), json!("+")]),
            json!("a+b+c")
        );
        assert_eq!(
            call_v("replace", json!(5), &[json!("-"), json!("+")]),
            json!(null)
        );
    }

    #[test]
    fn reverse_and_sort() {
        assert_eq!(call_v("reverse", json!("abc"), &[]), json!("cba"));
        assert_eq!(call_v("reverse", json!([1, 2, 3]), &[]), json!([3, 2, 1]));
        assert_eq!(call_v("reverse", json!(5), &[]), json!(null));
        assert_eq!(call_v("sort", json!([3, 1, 2]), &[]), json!([1, 2, 3]));
        assert_eq!(call_v("sort", json!(["b", "a"]), &[]), json!(["a", "b"]));
        assert_eq!(call_v("sort", json!([1, "a"]), &[]), json!(null));
    }

    #[test]
    fn case_folding_is_ascii() {
        assert_eq!(call_v("lower", json!("AbC"), &[]), json!("abc"));
        assert_eq!(call_v("upper", json!("AbC"), &[]), json!("ABC"));
        assert_eq!(call_v("lower", json!(5), &[]), json!(null));
    }

    #[test]
    fn numeric_classification() {
        assert_eq!(call_v("round", json!(2.5), &[]), json!(3));
        assert_eq!(call_v("round", json!(-2.5), &[]), json!(-3));
        assert_eq!(call_v("nan", json!(1.0), &[]), json!(false));
        assert_eq!(call_v("real", json!(1.0), &[]), json!(true));
        assert_eq!(call_v("round", json!("x"), &[]), json!(null));
    }

    #[test]
    fn datetime_formats_current_time() {
        let v = call_v("datetime", json!("%Y"), &[]);
        let year: f64 = v.as_str().unwrap().parse().expect("year");
        assert!(year >= 2024.0);
        // Invalid pattern falls back to null.
        assert_eq!(call_v("datetime", json!("%!"), &[]), json!(null));
        assert_eq!(call_v("datetime", json!(5), &[]), json!(null));
    }

    #[test]
    fn string_number_round_trip() {
        for n in [0.0, 1.0, -3.0, 2.5, 1e9] {
            let s = call_v("string", json!(n), &[]);
            let back = call_v("number", s, &[]);
            assert_eq!(back.as_f64().unwrap(), n);
        }
    }
}
