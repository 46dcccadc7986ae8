//! In-memory model for recap schemas.
//!
//! A [`Type`] tree is built either directly through its constructors or from a
//! generic schema mapping with [`from_value`]. Named references inside a tree
//! are [`Proxy`] nodes, expanded against a [`Registry`] on demand.

pub use recap_core::{
    builtin_types, AttrValue, Attributes, Proxy, Registry, Type, TypeError, TypeId, TypeKind,
};
pub use recap_schema::{from_mapping, from_value, to_value, Parser};

/// Parses `value` against the process wide registry.
pub fn parse_global(value: &serde_json::Value) -> Result<Type, TypeError> {
    log::trace!("Parsing schema against the global registry");
    from_value(Registry::global(), value)
}
