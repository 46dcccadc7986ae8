mod proxy;

pub use proxy::Proxy;

use crate::{AttrValue, Attributes, Registry, TypeError};
use itertools::Itertools;
use log::warn;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Null,
    Bool,
    Int {
        bits: u32,
        signed: bool,
    },
    Float {
        bits: u32,
    },
    String {
        max_length: u64,
        variable: bool,
    },
    Bytes {
        max_length: u64,
        variable: bool,
    },
    List {
        element_type: Box<Type>,
        length: Option<u64>,
        variable: bool,
    },
    Map {
        key_type: Box<Type>,
        value_type: Box<Type>,
    },
    Struct {
        fields: Vec<Type>,
    },
    Enum {
        symbols: Vec<String>,
    },
    Union {
        alternatives: Vec<Type>,
    },
    Proxy(Proxy),
}

impl TypeKind {
    /// The tag used for this variant in schema mappings.
    pub fn tag(&self) -> &'static str {
        match self {
            TypeKind::Null => "null",
            TypeKind::Bool => "bool",
            TypeKind::Int { .. } => "int",
            TypeKind::Float { .. } => "float",
            TypeKind::String { .. } => "string",
            TypeKind::Bytes { .. } => "bytes",
            TypeKind::List { .. } => "list",
            TypeKind::Map { .. } => "map",
            TypeKind::Struct { .. } => "struct",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Union { .. } => "union",
            TypeKind::Proxy(_) => "proxy",
        }
    }

    /// Mapping keys this variant reads as its own fields, synonyms included.
    /// None of them may appear among a type's extra attributes.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            TypeKind::Null | TypeKind::Bool => &[],
            TypeKind::Int { .. } => &["bits", "signed"],
            TypeKind::Float { .. } => &["bits"],
            TypeKind::String { .. } | TypeKind::Bytes { .. } => {
                &["max_length", "bytes", "variable"]
            }
            TypeKind::List { .. } => &["element_type", "values", "length", "variable"],
            TypeKind::Map { .. } => &["key_type", "keys", "value_type", "values"],
            TypeKind::Struct { .. } => &["fields"],
            TypeKind::Enum { .. } => &["symbols"],
            TypeKind::Union { .. } => &["alternatives", "types"],
            TypeKind::Proxy(_) => &[],
        }
    }
}

/// A schema type: one variant plus the attributes every variant carries.
///
/// Equality is structural. Proxies are compared by target alias and overrides,
/// never by what they resolve to.
#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    kind: TypeKind,
    logical: Option<String>,
    alias: Option<String>,
    doc: Option<String>,
    extra_attrs: Attributes,
}

impl From<TypeKind> for Type {
    #[inline]
    fn from(kind: TypeKind) -> Self {
        Type::new(kind)
    }
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            logical: None,
            alias: None,
            doc: None,
            extra_attrs: Attributes::default(),
        }
    }

    pub fn null() -> Self {
        TypeKind::Null.into()
    }

    pub fn bool() -> Self {
        TypeKind::Bool.into()
    }

    pub fn int(bits: u32, signed: bool) -> Self {
        TypeKind::Int { bits, signed }.into()
    }

    pub fn float(bits: u32) -> Self {
        TypeKind::Float { bits }.into()
    }

    pub fn string(max_length: u64, variable: bool) -> Self {
        TypeKind::String {
            max_length,
            variable,
        }
        .into()
    }

    pub fn bytes(max_length: u64, variable: bool) -> Self {
        TypeKind::Bytes {
            max_length,
            variable,
        }
        .into()
    }

    pub fn list(element_type: Type, length: Option<u64>, variable: bool) -> Self {
        TypeKind::List {
            element_type: Box::new(element_type),
            length,
            variable,
        }
        .into()
    }

    pub fn map(key_type: Type, value_type: Type) -> Self {
        TypeKind::Map {
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
        }
        .into()
    }

    pub fn structure(fields: Vec<Type>) -> Self {
        TypeKind::Struct { fields }.into()
    }

    pub fn enumeration<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        TypeKind::Enum {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
        .into()
    }

    pub fn union(alternatives: Vec<Type>) -> Self {
        TypeKind::Union { alternatives }.into()
    }

    pub fn proxy(target_alias: impl Into<String>) -> Self {
        TypeKind::Proxy(Proxy::new(target_alias)).into()
    }

    /// On a proxy this is an override applied to the resolved type.
    pub fn with_logical(self, logical: impl Into<String>) -> Self {
        if self.is_proxy() {
            return self.with_attr("logical", AttrValue::String(logical.into()));
        }
        Type {
            logical: Some(logical.into()),
            ..self
        }
    }

    /// Only recorded here; binding the name happens in [`Registry::declare`].
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// On a proxy this is an override applied to the resolved type.
    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        if self.is_proxy() {
            return self.with_attr("doc", AttrValue::String(doc.into()));
        }
        Type {
            doc: Some(doc.into()),
            ..self
        }
    }

    /// On a proxy the attributes are its overrides, so any cached resolution
    /// is dropped.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.extra_attrs.insert(name, value);
        self.invalidate();
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        for (name, value) in attrs.iter() {
            self.extra_attrs.insert(name.clone(), value.clone());
        }
        self.invalidate();
        self
    }

    fn invalidate(&mut self) {
        if let TypeKind::Proxy(proxy) = &mut self.kind {
            proxy.invalidate();
        }
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn logical(&self) -> Option<&str> {
        self.logical.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn extra_attrs(&self) -> &Attributes {
        &self.extra_attrs
    }

    #[inline]
    pub fn is_proxy(&self) -> bool {
        matches!(self.kind, TypeKind::Proxy(_))
    }

    /// Checks the invariants of this type and every type nested in it.
    pub fn validate(&self) -> Result<(), TypeError> {
        self.validate_node()?;
        match &self.kind {
            TypeKind::List { element_type, .. } => element_type.validate(),
            TypeKind::Map {
                key_type,
                value_type,
            } => {
                key_type.validate()?;
                value_type.validate()
            }
            TypeKind::Struct { fields } => fields.iter().try_for_each(Type::validate),
            TypeKind::Union { alternatives } => alternatives.iter().try_for_each(Type::validate),
            TypeKind::Null
            | TypeKind::Bool
            | TypeKind::Int { .. }
            | TypeKind::Float { .. }
            | TypeKind::String { .. }
            | TypeKind::Bytes { .. }
            | TypeKind::Enum { .. }
            | TypeKind::Proxy(_) => Ok(()),
        }
    }

    /// Checks the invariants of this type alone, assuming nested types were
    /// already checked.
    pub fn validate_node(&self) -> Result<(), TypeError> {
        self.validate_attr_names()?;
        match &self.kind {
            TypeKind::Null
            | TypeKind::Bool
            | TypeKind::String { .. }
            | TypeKind::Bytes { .. }
            | TypeKind::Map { .. }
            | TypeKind::Struct { .. }
            | TypeKind::Union { .. } => Ok(()),
            TypeKind::Int { bits, .. } | TypeKind::Float { bits } => {
                if *bits == 0 {
                    return Err(TypeError::invalid_value(
                        "bits",
                        format!("'{}' requires a positive bit width", self.tag()),
                    ));
                }
                Ok(())
            }
            TypeKind::List {
                length, variable, ..
            } => {
                if !variable && length.is_none() {
                    warn!("Fixed size list without 'length' - {self}");
                }
                Ok(())
            }
            TypeKind::Enum { symbols } => {
                if symbols.is_empty() {
                    warn!("Enum without symbols");
                }
                match symbols.iter().duplicates().next() {
                    None => Ok(()),
                    Some(symbol) => Err(TypeError::invalid_value(
                        "symbols",
                        format!("duplicate symbol {symbol}"),
                    )),
                }
            }
            TypeKind::Proxy(proxy) => {
                if proxy.target_alias().is_empty() {
                    return Err(TypeError::Validation(
                        "Proxy requires a non-empty alias".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Extra attributes share the mapping with the variant's own keys, so a
    /// name the parser would read back as something else is rejected.
    fn validate_attr_names(&self) -> Result<(), TypeError> {
        let base: &[&str] = match self.kind {
            TypeKind::Proxy(_) => &["type", "alias"],
            _ => &["type", "alias", "doc", "logical"],
        };
        match self
            .extra_attrs
            .iter()
            .map(|(name, _)| name.as_str())
            .find(|name| base.contains(name) || self.kind.field_names().contains(name))
        {
            None => Ok(()),
            Some(name) => Err(TypeError::invalid_value(
                name,
                format!("reserved for '{}' and cannot be an extra attribute", self.tag()),
            )),
        }
    }

    /// Expands a proxy into the concrete type it names, with its overrides
    /// applied. The result is cached on the proxy. Other types resolve to
    /// themselves.
    pub fn resolve<'a>(&'a self, registry: &Registry) -> Result<&'a Type, TypeError> {
        match &self.kind {
            TypeKind::Proxy(proxy) => proxy.resolve(registry, &self.extra_attrs),
            _ => Ok(self),
        }
    }

    /// Rebuilds this type with every directly nested type passed through `f`.
    /// Base attributes are kept as they are.
    pub fn try_map_children<F>(&self, mut f: F) -> Result<Type, TypeError>
    where
        F: FnMut(&Type) -> Result<Type, TypeError>,
    {
        let kind = match &self.kind {
            TypeKind::List {
                element_type,
                length,
                variable,
            } => TypeKind::List {
                element_type: Box::new(f(element_type)?),
                length: *length,
                variable: *variable,
            },
            TypeKind::Map {
                key_type,
                value_type,
            } => TypeKind::Map {
                key_type: Box::new(f(key_type)?),
                value_type: Box::new(f(value_type)?),
            },
            TypeKind::Struct { fields } => TypeKind::Struct {
                fields: fields.iter().map(&mut f).collect::<Result<_, _>>()?,
            },
            TypeKind::Union { alternatives } => TypeKind::Union {
                alternatives: alternatives.iter().map(&mut f).collect::<Result<_, _>>()?,
            },
            kind @ (TypeKind::Null
            | TypeKind::Bool
            | TypeKind::Int { .. }
            | TypeKind::Float { .. }
            | TypeKind::String { .. }
            | TypeKind::Bytes { .. }
            | TypeKind::Enum { .. }
            | TypeKind::Proxy(_)) => kind.clone(),
        };
        Ok(Type {
            kind,
            logical: self.logical.clone(),
            alias: self.alias.clone(),
            doc: self.doc.clone(),
            extra_attrs: self.extra_attrs.clone(),
        })
    }

    pub(crate) fn apply_overrides(&mut self, overrides: &Attributes) -> Result<(), TypeError> {
        overrides
            .iter()
            .try_for_each(|(name, value)| self.apply_attribute(name, value))
    }

    /// Overwrites a first-class field named `name`, or merges the value into
    /// `extra_attrs` when this variant has no such field.
    fn apply_attribute(&mut self, name: &str, value: &AttrValue) -> Result<(), TypeError> {
        match (name, &mut self.kind) {
            ("type", _) => {
                return Err(TypeError::invalid_value(
                    name,
                    format!("cannot override with {value}"),
                ))
            }
            ("doc", _) => self.doc = value.to_optional_string(name)?,
            ("logical", _) => self.logical = value.to_optional_string(name)?,
            ("alias", _) => self.alias = value.to_optional_string(name)?,
            ("bits", TypeKind::Int { bits, .. } | TypeKind::Float { bits }) => {
                *bits = value.to_u32(name)?
            }
            ("signed", TypeKind::Int { signed, .. }) => *signed = value.to_bool(name)?,
            (
                "max_length" | "bytes",
                TypeKind::String { max_length, .. } | TypeKind::Bytes { max_length, .. },
            ) => *max_length = value.to_u64(name)?,
            (
                "variable",
                TypeKind::String { variable, .. }
                | TypeKind::Bytes { variable, .. }
                | TypeKind::List { variable, .. },
            ) => *variable = value.to_bool(name)?,
            ("length", TypeKind::List { length, .. }) => {
                *length = if value.is_null() {
                    None
                } else {
                    Some(value.to_u64(name)?)
                }
            }
            ("element_type" | "values", TypeKind::List { .. })
            | ("key_type" | "keys" | "value_type" | "values", TypeKind::Map { .. })
            | ("fields", TypeKind::Struct { .. })
            | ("symbols", TypeKind::Enum { .. })
            | ("alternatives" | "types", TypeKind::Union { .. }) => {
                return Err(TypeError::invalid_value(
                    name,
                    format!("cannot override with {value}"),
                ))
            }
            _ => {
                self.extra_attrs.insert(name, value.clone());
            }
        }
        Ok(())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeKind::Null => write!(f, "null"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Int { bits, signed } => {
                write!(f, "{}int{bits}", if *signed { "" } else { "u" })
            }
            TypeKind::Float { bits } => write!(f, "float{bits}"),
            TypeKind::String {
                max_length,
                variable,
            } => write_sized(f, "string", *max_length, *variable),
            TypeKind::Bytes {
                max_length,
                variable,
            } => write_sized(f, "bytes", *max_length, *variable),
            TypeKind::List {
                element_type,
                length: Some(length),
                ..
            } => write!(f, "[{element_type}; {length}]"),
            TypeKind::List { element_type, .. } => write!(f, "[{element_type}]"),
            TypeKind::Map {
                key_type,
                value_type,
            } => write!(f, "{{{key_type}, {value_type}}}"),
            TypeKind::Struct { fields } => {
                let fields = fields.iter().map(|field| {
                    match field.extra_attrs.get("name").and_then(AttrValue::as_str) {
                        Some(name) => format!("{name}: {field}"),
                        None => field.to_string(),
                    }
                });
                write!(f, "struct {{{}}}", fields.format(", "))
            }
            TypeKind::Enum { symbols } => write!(f, "enum {{{}}}", symbols.iter().join(", ")),
            TypeKind::Union { alternatives } => {
                write!(f, "{}", alternatives.iter().map(|m| m.to_string()).join(" | "))
            }
            TypeKind::Proxy(proxy) => write!(f, "{}", proxy.target_alias()),
        }
    }
}

fn write_sized(f: &mut Formatter<'_>, name: &str, max_length: u64, variable: bool) -> std::fmt::Result {
    if variable {
        write!(f, "{name}({max_length})")
    } else {
        write!(f, "{name}[{max_length}]")
    }
}
