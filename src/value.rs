//! Abstract JSON value capability.
//!
//! The engine never commits to a concrete JSON representation.  Everything it
//! does with values — construction, inspection, indexing, container growth —
//! goes through the [`JsonValue`] trait, and rendering is generic over any
//! implementation.  [`crate::backend`] provides the stock implementation for
//! `serde_json::Value`; embedders with their own document model implement the
//! trait themselves.
//!
//! Ownership maps onto plain Rust ownership: values returned by the
//! constructors and by `Clone` are owned by the caller and released by
//! `Drop`; `at`/`get` borrow from the container.

/// The six type tags of the value model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// The name reported by the `type` method in expressions.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

/// Capability interface over an immutable, JSON-shaped value model.
///
/// Numbers are IEEE-754 binary64.  Arrays are ordered; objects preserve
/// insertion order for key enumeration and iteration.
///
/// The primitive accessors (`as_bool`, `as_number`, `as_str`) are only
/// called after a [`kind`](JsonValue::kind) check; implementations may
/// return any default for a mismatched kind.
pub trait JsonValue: Clone {
    /// Parse a JSON document.  `None` on malformed input.
    fn parse(src: &str) -> Option<Self>;

    /// Serialize to a JSON string.  `None` if the value cannot be printed.
    fn print(&self) -> Option<String>;

    fn null() -> Self;
    fn from_bool(value: bool) -> Self;
    fn from_number(value: f64) -> Self;
    fn from_str(value: &str) -> Self;
    fn new_array() -> Self;
    fn new_object() -> Self;

    fn kind(&self) -> Kind;
    fn as_bool(&self) -> bool;
    fn as_number(&self) -> f64;
    fn as_str(&self) -> &str;

    /// String length in scalar values, array element count, or object entry
    /// count.  Zero for the other kinds.
    fn len(&self) -> usize;

    /// Zero-based array element access.
    fn at(&self, index: usize) -> Option<&Self>;

    /// Object member access by key.
    fn get(&self, key: &str) -> Option<&Self>;

    /// Append to an array.  No-op on other kinds.
    fn push(&mut self, value: Self);

    /// Set an object member, replacing any existing entry.  No-op on other
    /// kinds.
    fn insert(&mut self, key: &str, value: Self);

    /// Object keys in iteration order.
    fn keys(&self) -> Vec<String>;
}
