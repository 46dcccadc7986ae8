mod builtins;
mod resolve;

pub use builtins::builtin_types;

use crate::{IndexMap, Type, TypeError};
use log::debug;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stable handle to a canonical type stored in a [`Registry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for TypeId {
    type Error = TypeError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index)
            .map(TypeId)
            .map_err(|_| TypeError::RegistryFull(index))
    }
}

#[derive(Debug, Default)]
struct Arena {
    types: Vec<Type>,
    aliases: IndexMap<String, TypeId>,
}

impl Arena {
    fn bind(&mut self, name: String, ty: Type) -> Result<TypeId, TypeError> {
        let id = TypeId::try_from(self.types.len())?;
        self.types.push(ty);
        self.aliases.insert(name, id);
        Ok(id)
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Maps alias names to canonical types.
///
/// Every read hands out an independent copy, so callers can never change a
/// registered definition. Names are bound once and never removed.
#[derive(Debug)]
pub struct Registry {
    arena: RwLock<Arena>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry seeded with [`builtin_types`].
    pub fn new() -> Self {
        let mut arena = Arena::default();
        for ((name, ty), index) in builtin_types().into_iter().zip(0u32..) {
            arena.types.push(ty);
            arena.aliases.insert(name.to_string(), TypeId(index));
        }
        Registry {
            arena: RwLock::new(arena),
        }
    }

    pub fn empty() -> Self {
        Registry {
            arena: RwLock::new(Arena::default()),
        }
    }

    /// Process wide registry, seeded on first access.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    // a poisoned lock still holds a consistent arena, every write is a single bind
    fn read(&self) -> RwLockReadGuard<'_, Arena> {
        self.arena.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arena> {
        self.arena.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, name: impl Into<String>, ty: Type) -> Result<TypeId, TypeError> {
        let name = name.into();
        let mut arena = self.write();
        if arena.aliases.contains_key(&name) {
            return Err(TypeError::AliasCollision(name));
        }
        debug!("Registered alias {name} as {ty}");
        arena.bind(name, ty)
    }

    /// Validates `ty` and binds it under its own alias, if it has a non-empty
    /// one. Fails when the alias is already taken.
    pub fn declare(&self, ty: Type) -> Result<Type, TypeError> {
        ty.validate()?;
        if let Some(alias) = ty.alias().filter(|a| !a.is_empty()) {
            self.register(alias, ty.clone())?;
        }
        Ok(ty)
    }

    pub fn lookup(&self, name: &str) -> Result<Type, TypeError> {
        let arena = self.read();
        arena
            .aliases
            .get(name)
            .map(|id| arena.types[id.index()].clone())
            .ok_or_else(|| TypeError::AliasNotFound(name.to_string()))
    }

    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.read().aliases.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<Type> {
        self.read().types.get(id.index()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().aliases.contains_key(name)
    }

    /// Bound names, in registration order.
    pub fn aliases(&self) -> Vec<String> {
        self.read().aliases.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
