//! Module registry: the ordered set of modules in the project graph.

use crate::module::Module;
use crate::result::{ForjaError, ForjaResult};
use std::collections::HashMap;

/// Ordered registry of project modules
///
/// Iteration order is registration order. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from modules, rejecting duplicate names
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> ForjaResult<Self> {
        let mut registry = Self::new();
        for module in modules {
            registry.register(module)?;
        }
        Ok(registry)
    }

    /// Register a module
    pub fn register(&mut self, module: Module) -> ForjaResult<()> {
        if self.index.contains_key(module.name()) {
            return Err(ForjaError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        self.index.insert(module.name().to_string(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// All modules in registration order
    #[must_use]
    pub fn all_modules(&self) -> &[Module] {
        &self.modules
    }

    /// Apply a policy to every module, stopping at the first failure.
    ///
    /// An empty registry makes this a no-op.
    pub fn apply_to_all<F>(&mut self, mut policy: F) -> ForjaResult<()>
    where
        F: FnMut(&mut Module) -> ForjaResult<()>,
    {
        for module in &mut self.modules {
            policy(module)?;
        }
        Ok(())
    }

    /// Look up a module by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&i| &self.modules[i])
    }

    /// Look up a module by name, failing if absent
    pub fn require(&self, name: &str) -> ForjaResult<&Module> {
        self.get(name).ok_or_else(|| ForjaError::UnknownModule {
            name: name.to_string(),
        })
    }

    /// Mutable lookup
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Module> {
        match self.index.get(name) {
            Some(&i) => self.modules.get_mut(i),
            None => None,
        }
    }

    /// Number of modules
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry has no modules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate modules
    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }
}

impl<'a> IntoIterator for &'a ModuleRegistry {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ModuleRegistry {
        ModuleRegistry::from_modules([
            Module::new("core", "src/core"),
            Module::new("http", "src/protocol/http"),
            Module::new("dist", "src/dist"),
        ])
        .unwrap()
    }

    #[test]
    fn test_preserves_registration_order() {
        let registry = sample();
        let names: Vec<_> = registry.all_modules().iter().map(Module::name).collect();
        assert_eq!(names, vec!["core", "http", "dist"]);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = ModuleRegistry::from_modules([Module::new("core", "a"), Module::new("core", "b")])
            .unwrap_err();
        assert!(matches!(err, ForjaError::DuplicateModule { ref name } if name == "core"));
    }

    #[test]
    fn test_empty_registry_apply_is_noop() {
        let mut registry = ModuleRegistry::new();
        let mut calls = 0;
        registry
            .apply_to_all(|_| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_apply_to_all_visits_every_module() {
        let mut registry = sample();
        registry
            .apply_to_all(|m| {
                m.apply_plugin("checkstyle");
                Ok(())
            })
            .unwrap();
        assert!(registry.iter().all(|m| m.has_plugin("checkstyle")));
    }

    #[test]
    fn test_apply_to_all_stops_on_error() {
        let mut registry = sample();
        let mut visited = Vec::new();
        let result = registry.apply_to_all(|m| {
            visited.push(m.name().to_string());
            if m.name() == "http" {
                return Err(ForjaError::config("broken"));
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(visited, vec!["core", "http"]);
    }

    #[test]
    fn test_lookup() {
        let mut registry = sample();
        assert_eq!(registry.get("http").unwrap().name(), "http");
        assert!(registry.get("missing").is_none());
        assert!(registry.require("missing").is_err());
        registry.get_mut("dist").unwrap().apply_plugin("publishing");
        assert!(registry.get("dist").unwrap().has_plugin("publishing"));
        assert_eq!(registry.len(), 3);
    }
}
