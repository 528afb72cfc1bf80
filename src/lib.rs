//! Lattice — a text-templating engine over a JSON-shaped value model.
//!
//! A template is a byte stream of literal spans interleaved with directives
//! introduced by the `$` sigil:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `$$` | a literal `$` |
//! | `$(comment)` | discarded |
//! | `$[expr]` | substitution, escaped (HTML by default) |
//! | `${expr}` | substitution, raw |
//! | `$<path>` | include another template |
//! | `$if e:` ... `$elif e:` ... `$else:` ... `$end` | conditional chain |
//! | `$switch e:` `$case e:` ... `$default:` ... `$end` | dispatch |
//! | `$for x from lo..hi:` ... `$end` | range loop (`..=` for inclusive) |
//! | `$for x in e:` ... `$end` | iterate string / array / object keys |
//! | `$with e:` ... `$end` | rebind the scope |
//! | `$end` | close the innermost block |
//!
//! Expressions operate on an abstract value model supplied by the caller
//! through the [`JsonValue`] trait; the engine itself never commits to a
//! concrete JSON representation.  An implementation for `serde_json::Value`
//! ships in [`backend`].
//!
//! ```
//! use serde_json::json;
//! use lattice::{render_to_buffer, Options};
//!
//! let root = json!({"name": "world", "items": ["a", "b"]});
//! let out = render_to_buffer(
//!     "Hello, ${name}!$for x in items:<${x}>$end",
//!     &root,
//!     &Options::default(),
//! ).unwrap();
//! assert_eq!(out, "Hello, world!<a><b>");
//! ```
//!
//! Bare identifiers resolve against the *current scope* — the root value at
//! the top level, rebound by `$with` and extended per iteration by `$for` —
//! while `@` always denotes the root passed to the render call.
//!
//! Rendering is synchronous and reentrant; errors come back as a typed
//! [`Error`] carrying a code, the source line, and the include identifier
//! when the failure surfaced inside an included template.

pub mod backend;
pub mod cli;
pub mod error;
pub mod render;
pub mod template;
pub mod value;

mod eval;
mod expr;
mod include;
mod methods;
mod scan;

pub use error::{Error, ErrorCode};
pub use render::{escape_default, render, render_to_buffer, render_to_file, Options};
pub use template::Template;
pub use value::{JsonValue, Kind};
