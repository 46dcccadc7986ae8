//! Builds [`Type`](recap_core::Type) trees from generic schema mappings, the
//! format other tooling loads from JSON or YAML schema files, and emits them
//! back in the same shape.
//!
//! ```
//! use recap_core::{Registry, Type};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let ty = recap_schema::from_value(&registry, &json!({"type": "int", "bits": 32, "signed": false}))
//!     .expect("valid schema");
//! assert_eq!(ty, Type::int(32, false));
//! ```

mod emit;
mod parse;

pub use emit::to_value;
pub use parse::{from_mapping, from_value, Parser};
