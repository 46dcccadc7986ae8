use log::warn;
use recap_core::{AttrValue, Type, TypeKind};
use serde_json::{Map, Value};

/// Writes `ty` back out as a schema mapping that [`crate::from_value`]
/// accepts, using the long field names (`max_length`, `element_type`, ...).
///
/// An extra attribute never replaces a key written for the type itself. Types
/// that pass [`Type::validate`] carry no such attributes.
pub fn to_value(ty: &Type) -> Value {
    let mut mapping = Map::new();
    if let Some(alias) = ty.alias() {
        mapping.insert("alias".to_string(), alias.into());
    }
    match ty.kind() {
        TypeKind::Proxy(proxy) => {
            mapping.insert("type".to_string(), proxy.target_alias().into());
        }
        kind => {
            mapping.insert("type".to_string(), kind.tag().into());
        }
    }
    match ty.kind() {
        TypeKind::Null | TypeKind::Bool | TypeKind::Proxy(_) => {}
        TypeKind::Int { bits, signed } => {
            mapping.insert("bits".to_string(), (*bits).into());
            mapping.insert("signed".to_string(), (*signed).into());
        }
        TypeKind::Float { bits } => {
            mapping.insert("bits".to_string(), (*bits).into());
        }
        TypeKind::String {
            max_length,
            variable,
        }
        | TypeKind::Bytes {
            max_length,
            variable,
        } => {
            mapping.insert("max_length".to_string(), (*max_length).into());
            mapping.insert("variable".to_string(), (*variable).into());
        }
        TypeKind::List {
            element_type,
            length,
            variable,
        } => {
            mapping.insert("element_type".to_string(), to_value(element_type));
            if let Some(length) = length {
                mapping.insert("length".to_string(), (*length).into());
            }
            mapping.insert("variable".to_string(), (*variable).into());
        }
        TypeKind::Map {
            key_type,
            value_type,
        } => {
            mapping.insert("key_type".to_string(), to_value(key_type));
            mapping.insert("value_type".to_string(), to_value(value_type));
        }
        TypeKind::Struct { fields } => {
            mapping.insert(
                "fields".to_string(),
                Value::Array(fields.iter().map(to_value).collect()),
            );
        }
        TypeKind::Enum { symbols } => {
            mapping.insert(
                "symbols".to_string(),
                Value::Array(symbols.iter().map(|s| s.as_str().into()).collect()),
            );
        }
        TypeKind::Union { alternatives } => {
            mapping.insert(
                "alternatives".to_string(),
                Value::Array(alternatives.iter().map(to_value).collect()),
            );
        }
    }
    if let Some(logical) = ty.logical() {
        mapping.insert("logical".to_string(), logical.into());
    }
    if let Some(doc) = ty.doc() {
        mapping.insert("doc".to_string(), doc.into());
    }
    for (name, value) in ty.extra_attrs() {
        if mapping.contains_key(name.as_str()) {
            warn!("Dropping extra attribute '{name}' that shadows a field of {ty}");
            continue;
        }
        mapping.insert(name.clone(), attr_to_value(value));
    }
    Value::Object(mapping)
}

fn attr_to_value(value: &AttrValue) -> Value {
    match value {
        AttrValue::Null => Value::Null,
        AttrValue::Bool(b) => (*b).into(),
        AttrValue::Int(i) => (*i).into(),
        AttrValue::Float(f) => (*f).into(),
        AttrValue::String(s) => s.as_str().into(),
    }
}
