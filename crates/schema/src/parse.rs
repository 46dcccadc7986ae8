use log::trace;
use recap_core::{AttrValue, Attributes, IndexMap, Registry, Type, TypeError, TypeKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The keys of one mapping that have not been consumed yet, in source order.
type Fields<'a> = IndexMap<&'a str, &'a Value>;

pub fn from_mapping(registry: &Registry, mapping: &Map<String, Value>) -> Result<Type, TypeError> {
    Parser::new(registry).parse_mapping(mapping)
}

pub fn from_value(registry: &Registry, value: &Value) -> Result<Type, TypeError> {
    Parser::new(registry).parse(value)
}

/// Recursively turns schema mappings into types, binding every mapping that
/// carries an `alias` key in the registry.
///
/// Aliases bound while parsing nested mappings stay bound even if an
/// enclosing mapping later fails.
pub struct Parser<'r> {
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Parser { registry }
    }

    pub fn parse(&self, value: &Value) -> Result<Type, TypeError> {
        match value {
            Value::Object(mapping) => self.parse_mapping(mapping),
            v => Err(TypeError::Validation(format!(
                "Expected a type mapping, found {v}"
            ))),
        }
    }

    pub fn parse_mapping(&self, mapping: &Map<String, Value>) -> Result<Type, TypeError> {
        let mut fields: Fields = mapping.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let alias = match fields.shift_remove("alias") {
            None | Some(Value::Null) => None,
            Some(Value::String(alias)) => Some(alias.as_str()),
            Some(v) => {
                return Err(TypeError::invalid_value(
                    "alias",
                    format!("expected string, found {v}"),
                ))
            }
        };

        let ty = match fields.shift_remove("type") {
            None | Some(Value::Null) => {
                return Err(TypeError::Validation(
                    "'type' is a required field and was not found in the mapping".to_string(),
                ))
            }
            Some(Value::Array(types)) => {
                let alternatives = self.parse_elements(types)?;
                with_base(Type::union(alternatives), fields)?
            }
            Some(Value::String(tag)) => self.parse_tagged(tag, fields)?,
            Some(v) => {
                return Err(TypeError::invalid_value(
                    "type",
                    format!("must be a string or list, found {v}"),
                ))
            }
        };

        ty.validate_node()?;
        match alias.filter(|a| !a.is_empty()) {
            Some(alias) => {
                let ty = ty.with_alias(alias);
                self.registry.register(alias, ty.clone())?;
                Ok(ty)
            }
            None => Ok(ty),
        }
    }

    /// A union member, struct field or list element: either a full mapping or
    /// a bare type name standing for `{"type": name}`.
    fn parse_element(&self, value: &Value) -> Result<Type, TypeError> {
        match value {
            Value::Object(mapping) => self.parse_mapping(mapping),
            Value::String(tag) => {
                let ty = self.parse_tagged(tag, Fields::default())?;
                ty.validate_node()?;
                Ok(ty)
            }
            v => Err(TypeError::Validation(format!(
                "Expected a type mapping or type name, found {v}"
            ))),
        }
    }

    fn parse_elements(&self, values: &[Value]) -> Result<Vec<Type>, TypeError> {
        values.iter().map(|v| self.parse_element(v)).collect()
    }

    fn parse_tagged(&self, tag: &str, mut fields: Fields) -> Result<Type, TypeError> {
        let kind = match tag {
            "null" => TypeKind::Null,
            "bool" => TypeKind::Bool,
            "int" => TypeKind::Int {
                bits: required(&mut fields, &["bits"], tag)?.to_u32("bits")?,
                signed: optional_bool(&mut fields, "signed")?.unwrap_or(true),
            },
            "float" => TypeKind::Float {
                bits: required(&mut fields, &["bits"], tag)?.to_u32("bits")?,
            },
            "string" => TypeKind::String {
                max_length: required(&mut fields, &["max_length", "bytes"], tag)?
                    .to_u64("max_length")?,
                variable: optional_bool(&mut fields, "variable")?.unwrap_or(true),
            },
            "bytes" => TypeKind::Bytes {
                max_length: required(&mut fields, &["max_length", "bytes"], tag)?
                    .to_u64("max_length")?,
                variable: optional_bool(&mut fields, "variable")?.unwrap_or(true),
            },
            "list" => {
                let element_type =
                    self.parse_element(required_value(&mut fields, &["element_type", "values"], tag)?)?;
                let length = match optional(&mut fields, "length")? {
                    Some(length) => Some(length.to_u64("length")?),
                    None => None,
                };
                TypeKind::List {
                    element_type: Box::new(element_type),
                    length,
                    variable: optional_bool(&mut fields, "variable")?.unwrap_or(true),
                }
            }
            "map" => {
                let key_type = required_value(&mut fields, &["key_type", "keys"], tag)?;
                let value_type = required_value(&mut fields, &["value_type", "values"], tag)?;
                TypeKind::Map {
                    key_type: Box::new(self.parse_element(key_type)?),
                    value_type: Box::new(self.parse_element(value_type)?),
                }
            }
            "struct" => {
                let members = match take(&mut fields, &["fields"])? {
                    None => Vec::new(),
                    Some(Value::Array(members)) => self.parse_elements(members)?,
                    Some(v) => {
                        return Err(TypeError::invalid_value(
                            "fields",
                            format!("expected list, found {v}"),
                        ))
                    }
                };
                TypeKind::Struct { fields: members }
            }
            "enum" => TypeKind::Enum {
                symbols: symbols(required_value(&mut fields, &["symbols"], tag)?)?,
            },
            "union" => match required_value(&mut fields, &["alternatives", "types"], tag)? {
                Value::Array(alternatives) => TypeKind::Union {
                    alternatives: self.parse_elements(alternatives)?,
                },
                v => {
                    return Err(TypeError::invalid_value(
                        "alternatives",
                        format!("expected list, found {v}"),
                    ))
                }
            },
            alias => {
                trace!("Deferring {alias} to a proxy");
                let overrides = fields
                    .into_iter()
                    .map(|(name, value)| attr_value(name, value).map(|v| (name, v)))
                    .collect::<Result<Attributes, TypeError>>()?;
                return Ok(Type::proxy(alias).with_attrs(overrides));
            }
        };
        with_base(Type::new(kind), fields)
    }
}

/// Applies the remaining keys of a concrete type's mapping: `doc` and
/// `logical` become base fields, everything else an extra attribute.
fn with_base(mut ty: Type, fields: Fields) -> Result<Type, TypeError> {
    for (name, value) in fields {
        ty = match (name, value) {
            ("doc" | "logical", Value::Null) => ty,
            ("doc", Value::String(doc)) => ty.with_doc(doc.as_str()),
            ("logical", Value::String(logical)) => ty.with_logical(logical.as_str()),
            ("doc" | "logical", v) => {
                return Err(TypeError::invalid_value(
                    name,
                    format!("expected string, found {v}"),
                ))
            }
            _ => ty.with_attr(name, attr_value(name, value)?),
        };
    }
    Ok(ty)
}

fn attr_value(name: &str, value: &Value) -> Result<AttrValue, TypeError> {
    AttrValue::deserialize(value).map_err(|_| {
        TypeError::invalid_value(name, format!("expected a scalar, found {value}"))
    })
}

/// Removes every name in `names`, which are synonyms for one field, and
/// returns the value given. Setting two of them is an error.
fn take<'a>(fields: &mut Fields<'a>, names: &[&str]) -> Result<Option<&'a Value>, TypeError> {
    let mut found: Option<(&str, &'a Value)> = None;
    for name in names {
        match (fields.shift_remove(*name), found) {
            (None | Some(Value::Null), _) => {}
            (Some(_), Some((first, _))) => {
                return Err(TypeError::invalid_value(
                    name,
                    format!("conflicts with '{first}'"),
                ))
            }
            (Some(value), None) => found = Some((*name, value)),
        }
    }
    Ok(found.map(|(_, value)| value))
}

fn required_value<'a>(
    fields: &mut Fields<'a>,
    names: &[&str],
    tag: &str,
) -> Result<&'a Value, TypeError> {
    take(fields, names)?.ok_or_else(|| TypeError::missing_field(names[0], tag))
}

fn required(fields: &mut Fields, names: &[&str], tag: &str) -> Result<AttrValue, TypeError> {
    attr_value(names[0], required_value(fields, names, tag)?)
}

fn optional(fields: &mut Fields, name: &str) -> Result<Option<AttrValue>, TypeError> {
    match fields.shift_remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => attr_value(name, value).map(Some),
    }
}

fn optional_bool(fields: &mut Fields, name: &str) -> Result<Option<bool>, TypeError> {
    optional(fields, name)?.map(|v| v.to_bool(name)).transpose()
}

fn symbols(value: &Value) -> Result<Vec<String>, TypeError> {
    let Value::Array(values) = value else {
        return Err(TypeError::invalid_value(
            "symbols",
            format!("expected list, found {value}"),
        ));
    };
    values
        .iter()
        .map(|v| match v {
            Value::String(symbol) => Ok(symbol.clone()),
            v => Err(TypeError::invalid_value(
                "symbols",
                format!("expected string, found {v}"),
            )),
        })
        .collect()
}
