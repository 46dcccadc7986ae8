use crate::{Attributes, Registry, Type, TypeError};
use std::sync::OnceLock;

/// A by-name reference to a type bound in a [`Registry`].
///
/// The resolved copy is memoized. Concurrent first resolutions may both
/// compute it; only one is kept. Clones start unresolved.
#[derive(Debug)]
pub struct Proxy {
    target_alias: String,
    resolved: OnceLock<Box<Type>>,
}

impl Proxy {
    pub fn new(target_alias: impl Into<String>) -> Self {
        Proxy {
            target_alias: target_alias.into(),
            resolved: OnceLock::new(),
        }
    }

    pub fn target_alias(&self) -> &str {
        &self.target_alias
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Drops the memoized copy, for when the overrides it was built from change.
    pub(crate) fn invalidate(&mut self) {
        self.resolved = OnceLock::new();
    }

    pub(crate) fn resolve(
        &self,
        registry: &Registry,
        overrides: &Attributes,
    ) -> Result<&Type, TypeError> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved.as_ref());
        }
        let resolved = registry.resolve_alias(&self.target_alias, overrides)?;
        Ok(self.resolved.get_or_init(|| Box::new(resolved)).as_ref())
    }
}

impl Clone for Proxy {
    fn clone(&self) -> Self {
        Proxy::new(self.target_alias.clone())
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.target_alias == other.target_alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn resolution_is_cached() {
        let registry = Registry::new();
        let proxy = Type::proxy("int16");
        let TypeKind::Proxy(inner) = proxy.kind() else {
            unreachable!()
        };
        assert!(!inner.is_resolved());
        let first = proxy.resolve(&registry).unwrap() as *const Type;
        assert!(inner.is_resolved());
        let second = proxy.resolve(&registry).unwrap() as *const Type;
        assert_eq!(first, second);
    }

    #[test]
    fn cache_does_not_affect_equality() {
        let registry = Registry::new();
        let resolved = Type::proxy("int16");
        resolved.resolve(&registry).unwrap();
        assert_eq!(resolved, Type::proxy("int16"));
    }

    #[test]
    fn cached_value_survives_later_registry_changes() {
        let registry = Registry::empty();
        registry.register("id", Type::int(32, true)).unwrap();
        let proxy = Type::proxy("id");
        assert_eq!(proxy.resolve(&registry).unwrap(), &Type::int(32, true));

        let other = Registry::empty();
        other.register("id", Type::int(64, true)).unwrap();
        assert_eq!(proxy.resolve(&other).unwrap(), &Type::int(32, true));
        assert_eq!(Type::proxy("id").resolve(&other).unwrap(), &Type::int(64, true));
    }

    #[test]
    fn clone_does_not_carry_cache() {
        let registry = Registry::new();
        let base = Type::proxy("int8");
        assert_eq!(base.resolve(&registry).unwrap(), &Type::int(8, true));

        let widened = base.clone().with_attr("bits", 16);
        assert_eq!(widened.resolve(&registry).unwrap(), &Type::int(16, true));
        assert_eq!(base.resolve(&registry).unwrap(), &Type::int(8, true));
    }

    #[test]
    fn new_overrides_reset_cache() {
        let registry = Registry::new();
        let proxy = Type::proxy("uuid");
        proxy.resolve(&registry).unwrap();
        let documented = proxy.with_attr("doc", "user id");
        assert_eq!(
            documented.resolve(&registry).unwrap().doc(),
            Some("user id")
        );
    }

    #[test]
    fn concurrent_resolution_shares_one_copy() {
        let registry = Arc::new(Registry::new());
        let proxy = Arc::new(Type::proxy("timestamp64").with_attr("timezone", "Asia/Tokyo"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let proxy = proxy.clone();
                thread::spawn(move || {
                    let resolved = proxy.resolve(&registry).unwrap();
                    (resolved.clone(), resolved as *const Type as usize)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let cached = proxy.resolve(&registry).unwrap();
        let expected = Type::int(64, true)
            .with_logical("Timestamp")
            .with_attr("unit", "millisecond")
            .with_attr("timezone", "Asia/Tokyo");
        assert_eq!(cached, &expected);
        for (resolved, address) in results {
            assert_eq!(resolved, expected);
            assert_eq!(address, cached as *const Type as usize);
        }
    }
}
