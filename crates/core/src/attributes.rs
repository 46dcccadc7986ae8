use crate::{impl_from, IndexMap, TypeError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A scalar attached to a type outside of its fixed fields, e.g. `precision`,
/// `unit` or a proxy override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl_from! {
    bool, AttrValue, AttrValue::Bool;
    i64, AttrValue, AttrValue::Int;
    f64, AttrValue, AttrValue::Float;
    String, AttrValue, AttrValue::String;
}

impl From<&'_ str> for AttrValue {
    #[inline]
    fn from(value: &'_ str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<i32> for AttrValue {
    #[inline]
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<u32> for AttrValue {
    #[inline]
    fn from(value: u32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_bool(&self, field: &str) -> Result<bool, TypeError> {
        match self {
            AttrValue::Bool(b) => Ok(*b),
            v => Err(TypeError::invalid_value(field, format!("expected bool, found {v}"))),
        }
    }

    pub fn to_u64(&self, field: &str) -> Result<u64, TypeError> {
        match self {
            AttrValue::Int(i) if *i >= 0 => Ok(*i as u64),
            v => Err(TypeError::invalid_value(
                field,
                format!("expected non-negative integer, found {v}"),
            )),
        }
    }

    pub fn to_u32(&self, field: &str) -> Result<u32, TypeError> {
        let value = self.to_u64(field)?;
        u32::try_from(value).map_err(|e| TypeError::invalid_value(field, e))
    }

    /// Strings set the value, `null` clears it.
    pub fn to_optional_string(&self, field: &str) -> Result<Option<String>, TypeError> {
        match self {
            AttrValue::Null => Ok(None),
            AttrValue::String(s) => Ok(Some(s.clone())),
            v => Err(TypeError::invalid_value(field, format!("expected string, found {v}"))),
        }
    }
}

/// Insertion ordered attribute bag. Equality ignores order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the previous value bound to `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
