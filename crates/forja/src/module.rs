//! Modules: independently buildable units of a project.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Per-module explicit settings that propagation must never overwrite
pub type OverrideMap = BTreeMap<String, String>;

/// Set of plugins applied to a module
///
/// Grows as policy is applied; there is no way to remove a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginSet(BTreeSet<String>);

impl PluginSet {
    /// Create an empty plugin set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a plugin. Returns `true` if it was not applied before.
    pub fn apply(&mut self, plugin: impl Into<String>) -> bool {
        self.0.insert(plugin.into())
    }

    /// Check whether a plugin is applied
    #[must_use]
    pub fn contains(&self, plugin: &str) -> bool {
        self.0.contains(plugin)
    }

    /// Iterate plugins in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of applied plugins
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no plugin is applied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PluginSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Where an effective configuration value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Set explicitly on the module
    Override,
    /// Applied from the project-wide policy bundle
    Propagated,
}

/// A resolved configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    /// The value
    pub value: String,
    /// Where it came from
    pub provenance: Provenance,
}

/// Effective configuration of a module, keyed by namespaced setting key
pub type EffectiveConfig = BTreeMap<String, ConfigValue>;

/// One independently buildable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    name: String,
    dir: PathBuf,
    plugins: PluginSet,
    overrides: OverrideMap,
    effective: EffectiveConfig,
}

impl Module {
    /// Create a module rooted at `dir`
    #[must_use]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            plugins: PluginSet::new(),
            overrides: OverrideMap::new(),
            effective: EffectiveConfig::new(),
        }
    }

    /// Add plugins
    #[must_use]
    pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for plugin in plugins {
            self.plugins.apply(plugin);
        }
        self
    }

    /// Add an explicit override
    #[must_use]
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_override(key, value);
        self
    }

    /// Module name (immutable identity)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Applied plugins
    #[must_use]
    pub const fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Apply a plugin to the module
    pub fn apply_plugin(&mut self, plugin: impl Into<String>) -> bool {
        self.plugins.apply(plugin)
    }

    /// Check whether a plugin is applied
    #[must_use]
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }

    /// Explicit per-module overrides
    #[must_use]
    pub const fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Set an explicit override. It takes effect immediately.
    pub fn set_override(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.effective.insert(
            key.clone(),
            ConfigValue {
                value: value.clone(),
                provenance: Provenance::Override,
            },
        );
        self.overrides.insert(key, value);
    }

    /// Effective configuration
    #[must_use]
    pub const fn effective(&self) -> &EffectiveConfig {
        &self.effective
    }

    /// Effective value of a setting
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.effective.get(key).map(|v| v.value.as_str())
    }

    /// Set a propagated value unless the key is explicitly overridden.
    ///
    /// Returns `true` if the effective configuration changed.
    pub(crate) fn propagate_setting(&mut self, key: &str, value: &str) -> bool {
        if let Some(explicit) = self.overrides.get(key) {
            // Keep the effective entry in sync with the override map.
            let entry = ConfigValue {
                value: explicit.clone(),
                provenance: Provenance::Override,
            };
            return self.effective.insert(key.to_string(), entry.clone()) != Some(entry);
        }
        let entry = ConfigValue {
            value: value.to_string(),
            provenance: Provenance::Propagated,
        };
        self.effective.insert(key.to_string(), entry.clone()) != Some(entry)
    }
}
