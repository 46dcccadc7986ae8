use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeError {
    /// A required field is missing or a value has the wrong shape.
    Validation(String),
    AliasCollision(String),
    AliasNotFound(String),
    /// Carries the alias chain that revisited itself, e.g. `a -> b -> a`.
    CyclicAlias(String),
    /// A registry can hold at most `u32::MAX + 1` types.
    RegistryFull(usize),
}

impl Error for TypeError {}

impl Display for TypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeError::Validation(m) => write!(f, "Validation Error: {m}"),
            TypeError::AliasCollision(m) => write!(f, "Alias {m} is already used"),
            TypeError::AliasNotFound(m) => write!(f, "No type with alias {m} found"),
            TypeError::CyclicAlias(m) => write!(f, "Cyclic Alias: {m}"),
            TypeError::RegistryFull(n) => write!(f, "Registry is full at {n} types"),
        }
    }
}

impl TypeError {
    pub fn missing_field(field: &str, tag: &str) -> Self {
        TypeError::Validation(format!("'{field}' attribute is required for '{tag}' type"))
    }

    pub fn invalid_value<T: Display>(field: &str, message: T) -> Self {
        TypeError::Validation(format!("Invalid value for '{field}' - {message}"))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TypeError::Validation(_))
    }
}
