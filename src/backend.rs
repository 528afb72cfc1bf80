//! `serde_json` implementation of the value capability.
//!
//! Whole finite numbers are stored as JSON integers so that substituting a
//! loop counter renders `1`, not `1.0`.  Object iteration order is insertion
//! order (the `preserve_order` feature of `serde_json`).

use serde_json::{Map, Number, Value};

use crate::value::{JsonValue, Kind};

impl JsonValue for Value {
    fn parse(src: &str) -> Option<Self> {
        serde_json::from_str(src).ok()
    }

    fn print(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    fn null() -> Self {
        Value::Null
    }

    fn from_bool(value: bool) -> Self {
        Value::Bool(value)
    }

    fn from_number(value: f64) -> Self {
        // Integral values in i64 range become JSON integers; the rest stay
        // floating point.  Non-finite values have no JSON form and map to
        // null, like the C JSON libraries.
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value <= i64::MAX as f64
        {
            Value::Number(Number::from(value as i64))
        } else {
            Number::from_f64(value).map_or(Value::Null, Value::Number)
        }
    }

    fn from_str(value: &str) -> Self {
        Value::String(value.to_owned())
    }

    fn new_array() -> Self {
        Value::Array(Vec::new())
    }

    fn new_object() -> Self {
        Value::Object(Map::new())
    }

    fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    fn as_bool(&self) -> bool {
        self.as_bool().unwrap_or(false)
    }

    fn as_number(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    fn len(&self) -> usize {
        match self {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn at(&self, index: usize) -> Option<&Self> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn push(&mut self, value: Self) {
        if let Value::Array(items) = self {
            items.push(value);
        }
    }

    fn insert(&mut self, key: &str, value: Self) {
        if let Value::Object(map) = self {
            map.insert(key.to_owned(), value);
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
