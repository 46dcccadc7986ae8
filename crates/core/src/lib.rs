mod attributes;
mod error;
mod macros;
mod registry;
mod types;

pub type IndexMap<K, V> = indexmap::map::IndexMap<K, V, FxBuildHasher>;
pub type IndexSet<V> = indexmap::set::IndexSet<V, FxBuildHasher>;

pub use attributes::{AttrValue, Attributes};
pub use error::TypeError;
use fxhash::FxBuildHasher;
pub use registry::{builtin_types, Registry, TypeId};
pub use types::{Proxy, Type, TypeKind};
