//! `blobl-lang` provides a parser and evaluator for blobl, a small mapping
//! language for reshaping JSON messages flowing through a stream pipeline.
//!
//! A mapping mixes constant literals with dynamic sub-expressions. Literals
//! with no dynamic part are resolved once, at parse time; a container holding
//! at least one dynamic element is deferred and re-evaluated per message.
//!
//! ## Examples
//!
//! ```rs
//! use blobl_lang::{Engine, Value};
//!
//! let engine = Engine::default();
//! let message: Value = serde_json::from_str(r#"{"doc": {"id": 42}}"#).unwrap();
//!
//! let output = engine
//!     .eval(r#"{"id": json("doc.id"), "tags": ["imported"]}"#, vec![message])
//!     .unwrap();
//!
//! // Parse once, evaluate per message
//! use blobl_lang::Context;
//!
//! let mapping = blobl_lang::parse(r#"[1, json("doc.id")]"#).unwrap();
//! let message: Value = serde_json::from_str(r#"{"doc": {"id": 42}}"#).unwrap();
//! let result = mapping.exec(&Context::new().with_value(&message));
//! ```
mod engine;
mod error;
mod number;
mod parser;
mod query;
mod value;

pub use engine::{Engine, Mapping};
pub use error::{Error, InnerError};
pub use number::Number;
pub use parser::error::ParseError;
pub use query::context::{Context, Metadata};
pub use query::error::EvalError;
pub use query::{EvalResult, Function};
pub use value::{Object, Value};

/// Parses a mapping into an immutable, reusable [`Mapping`].
pub fn parse(code: &str) -> Result<Mapping, Error> {
    engine::parse(code)
}
