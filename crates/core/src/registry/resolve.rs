use crate::{Attributes, IndexSet, Registry, Type, TypeError, TypeKind};
use itertools::Itertools;
use log::trace;

impl Registry {
    /// Follows `alias` through any chain of proxies to a concrete type and
    /// returns a copy of it with every override layer applied, the layer
    /// closest to the concrete type first so `overrides` win.
    pub fn resolve_alias(&self, alias: &str, overrides: &Attributes) -> Result<Type, TypeError> {
        let mut visited: IndexSet<String> = IndexSet::default();
        let mut layers = vec![overrides.clone()];
        let mut current = alias.to_string();
        loop {
            if !visited.insert(current.clone()) {
                return Err(TypeError::CyclicAlias(format!(
                    "{} -> {current}",
                    visited.iter().join(" -> ")
                )));
            }
            let target = self.lookup(&current)?;
            trace!("Alias {current} is {target}");
            let next = match target.kind() {
                TypeKind::Proxy(proxy) => Some(proxy.target_alias().to_string()),
                _ => None,
            };
            match next {
                Some(next) => {
                    layers.push(target.extra_attrs().clone());
                    current = next;
                }
                None => {
                    let mut resolved = target;
                    for layer in layers.iter().rev() {
                        resolved.apply_overrides(layer)?;
                    }
                    return Ok(resolved);
                }
            }
        }
    }

    /// Expands every proxy in `ty`. A proxy naming an alias that is already
    /// being expanded further up the tree stays a proxy, so recursive
    /// schemas come back with a back-reference instead of an endless copy.
    pub fn resolve_tree(&self, ty: &Type) -> Result<Type, TypeError> {
        self.expand(ty, &mut Vec::new())
    }

    fn expand(&self, ty: &Type, path: &mut Vec<String>) -> Result<Type, TypeError> {
        if let TypeKind::Proxy(proxy) = ty.kind() {
            let target = proxy.target_alias();
            if path.iter().any(|p| p == target) {
                trace!("Keeping back-reference to {target}");
                return Ok(ty.clone());
            }
            let resolved = ty.resolve(self)?.clone();
            path.push(target.to_string());
            let expanded = self.expand(&resolved, path);
            path.pop();
            return expanded;
        }

        let pushed = match ty.alias() {
            Some(alias) if !path.iter().any(|p| p == alias) => {
                path.push(alias.to_string());
                true
            }
            _ => false,
        };
        let expanded = ty.try_map_children(|child| self.expand(child, path));
        if pushed {
            path.pop();
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttrValue;
    use pretty_assertions::assert_eq;

    fn overrides<const N: usize>(values: [(&str, AttrValue); N]) -> Attributes {
        values.into_iter().collect()
    }

    #[test]
    fn uuid_with_doc_override() {
        let registry = Registry::new();
        let proxy = Type::proxy("uuid").with_attrs(overrides([("doc", "user id".into())]));
        let resolved = proxy.resolve(&registry).unwrap();
        assert_eq!(
            resolved,
            &Type::string(36, false)
                .with_logical("UUID")
                .with_doc("user id")
        );
        assert_eq!(registry.lookup("uuid").unwrap().doc(), None);
    }

    #[test]
    fn missing_target() {
        let registry = Registry::new();
        assert_eq!(
            Type::proxy("nope").resolve(&registry),
            Err(TypeError::AliasNotFound("nope".to_string()))
        );
    }

    #[test]
    fn chains_apply_outer_overrides_last() {
        let registry = Registry::new();
        registry
            .register(
                "created_at",
                Type::proxy("timestamp64").with_attrs(overrides([
                    ("timezone", "Europe/Paris".into()),
                    ("doc", "creation time".into()),
                ])),
            )
            .unwrap();
        let resolved = registry
            .resolve_alias("created_at", &overrides([("doc", "row creation".into())]))
            .unwrap();
        assert_eq!(
            resolved,
            Type::int(64, true)
                .with_logical("Timestamp")
                .with_attr("unit", "millisecond")
                .with_attr("timezone", "Europe/Paris")
                .with_doc("row creation")
        );
    }

    #[test]
    fn two_alias_cycle_is_an_error() {
        let registry = Registry::empty();
        registry.register("A", Type::proxy("B")).unwrap();
        registry.register("B", Type::proxy("A")).unwrap();
        assert_eq!(
            Type::proxy("A").resolve(&registry),
            Err(TypeError::CyclicAlias("A -> B -> A".to_string()))
        );
    }

    #[test]
    fn self_cycle_is_an_error() {
        let registry = Registry::empty();
        registry.register("loop", Type::proxy("loop")).unwrap();
        assert!(matches!(
            registry.resolve_alias("loop", &Attributes::new()),
            Err(TypeError::CyclicAlias(_))
        ));
    }

    #[test]
    fn resolve_tree_expands_nested_proxies() {
        let registry = Registry::new();
        let tree = Type::structure(vec![
            Type::proxy("int32").with_attr("name", "id"),
            Type::list(Type::proxy("uuid"), None, true),
            Type::union(vec![Type::null(), Type::proxy("float64")]),
        ]);
        assert_eq!(
            registry.resolve_tree(&tree).unwrap(),
            Type::structure(vec![
                Type::int(32, true).with_attr("name", "id"),
                Type::list(Type::string(36, false).with_logical("UUID"), None, true),
                Type::union(vec![Type::null(), Type::float(64)]),
            ])
        );
    }

    #[test]
    fn resolve_tree_keeps_back_references() {
        let registry = Registry::new();
        let node = Type::structure(vec![
            Type::proxy("int64").with_attr("name", "value"),
            Type::union(vec![Type::null(), Type::proxy("Node")]).with_attr("name", "next"),
        ])
        .with_alias("Node");
        registry.declare(node).unwrap();

        let expanded = registry.resolve_tree(&Type::proxy("Node")).unwrap();
        assert_eq!(
            expanded,
            Type::structure(vec![
                Type::int(64, true).with_attr("name", "value"),
                Type::union(vec![Type::null(), Type::proxy("Node")]).with_attr("name", "next"),
            ])
            .with_alias("Node")
        );
    }

    #[test]
    fn resolve_tree_reports_cycles_in_chains() {
        let registry = Registry::empty();
        registry.register("A", Type::proxy("B")).unwrap();
        registry.register("B", Type::proxy("A")).unwrap();
        let tree = Type::list(Type::proxy("A"), None, true);
        assert!(matches!(
            registry.resolve_tree(&tree),
            Err(TypeError::CyclicAlias(_))
        ));
    }
}
