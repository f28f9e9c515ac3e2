//! Cross-cutting policy propagation.
//!
//! A [`PolicyBundle`] describes the settings every module receives: quality
//! gate toolchain versions, source encoding, jar manifest metadata and the
//! plugins applied everywhere. [`ConfigurationPropagator`] validates the bundle
//! once and then applies it to modules. Applying it any number of times yields
//! the same effective configuration, and explicit module overrides always win.

use crate::module::Module;
use crate::registry::ModuleRegistry;
use crate::result::{ForjaError, ForjaResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Quality-gate and coverage tools with pinned versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Style checker
    Checkstyle,
    /// Static bug finder
    Spotbugs,
    /// Coverage agent and report generator
    Jacoco,
}

impl Tool {
    /// All tools
    pub const ALL: [Self; 3] = [Self::Checkstyle, Self::Spotbugs, Self::Jacoco];

    /// Lowercase tool name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkstyle => "checkstyle",
            Self::Spotbugs => "spotbugs",
            Self::Jacoco => "jacoco",
        }
    }

    /// Plugin a module must carry for the tool version to apply, if any
    #[must_use]
    pub const fn required_plugin(self) -> Option<&'static str> {
        match self {
            // checkstyle and spotbugs are applied to every module by the bundle
            Self::Checkstyle | Self::Spotbugs => None,
            Self::Jacoco => Some("jacoco"),
        }
    }

    /// Setting key for the tool version
    #[must_use]
    pub fn setting_key(self) -> String {
        format!("toolchain.{}", self.as_str())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = ForjaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "checkstyle" => Ok(Self::Checkstyle),
            "spotbugs" => Ok(Self::Spotbugs),
            "jacoco" => Ok(Self::Jacoco),
            other => Err(ForjaError::config(format!("unknown tool '{other}'"))),
        }
    }
}

/// Known toolchain versions per tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainCatalog {
    known: BTreeMap<Tool, BTreeSet<String>>,
}

impl ToolchainCatalog {
    /// Empty catalog: every version is unknown
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog of released versions this crate has been used with
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with_versions(Tool::Checkstyle, ["8.18", "8.19", "8.20", "8.21", "8.22", "8.23"])
            .with_versions(Tool::Spotbugs, ["3.1.10", "3.1.11", "3.1.12", "4.0.0"])
            .with_versions(Tool::Jacoco, ["0.8.2", "0.8.3", "0.8.4", "0.8.5"])
    }

    /// Add known versions for a tool
    #[must_use]
    pub fn with_versions<I, S>(mut self, tool: Tool, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known
            .entry(tool)
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Check whether a version is known
    #[must_use]
    pub fn is_known(&self, tool: Tool, version: &str) -> bool {
        self.known.get(&tool).is_some_and(|v| v.contains(version))
    }

    /// Fail if a version is not known
    pub fn validate(&self, tool: Tool, version: &str) -> ForjaResult<()> {
        if self.is_known(tool, version) {
            return Ok(());
        }
        let known = self
            .known
            .get(&tool)
            .map(|v| v.iter().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        Err(ForjaError::UnknownToolchain {
            tool: tool.to_string(),
            version: version.to_string(),
            known,
        })
    }
}

/// Project-wide settings applied to every module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PolicyBundle {
    /// Artifact group
    pub group: Option<String>,
    /// Source encoding for compilation
    pub encoding: String,
    /// Pinned tool versions
    pub toolchains: BTreeMap<Tool, String>,
    /// Jar manifest attributes
    pub manifest: BTreeMap<String, String>,
    /// Plugins applied to every module
    pub plugins: Vec<String>,
}

impl Default for PolicyBundle {
    fn default() -> Self {
        Self {
            group: None,
            encoding: "UTF-8".to_string(),
            toolchains: BTreeMap::new(),
            manifest: BTreeMap::new(),
            plugins: vec![
                "checkstyle".to_string(),
                "signing".to_string(),
                "spotbugs".to_string(),
            ],
        }
    }
}

impl PolicyBundle {
    /// Create the default bundle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artifact group
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Pin a tool version
    #[must_use]
    pub fn with_toolchain(mut self, tool: Tool, version: impl Into<String>) -> Self {
        self.toolchains.insert(tool, version.into());
        self
    }

    /// Add a manifest attribute
    #[must_use]
    pub fn with_manifest(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.manifest.insert(key.into(), value.into());
        self
    }

    /// Flatten the bundle into individual settings
    #[must_use]
    pub fn settings(&self) -> Vec<Setting> {
        let mut settings = Vec::new();
        if let Some(ref group) = self.group {
            settings.push(Setting::new("group", group));
        }
        settings.push(Setting::new("encoding", &self.encoding).requires("java"));
        for (tool, version) in &self.toolchains {
            let mut setting = Setting::new(tool.setting_key(), version);
            if let Some(plugin) = tool.required_plugin() {
                setting = setting.requires(plugin);
            }
            settings.push(setting);
        }
        for (attribute, value) in &self.manifest {
            settings.push(Setting::new(format!("manifest.{attribute}"), value).requires("java"));
        }
        settings
    }
}

/// A single propagated setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Namespaced key
    pub key: String,
    /// Value
    pub value: String,
    /// Plugin the module must carry for this setting to apply
    pub requires_plugin: Option<String>,
}

impl Setting {
    /// Create an unconditional setting
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            requires_plugin: None,
        }
    }

    /// Gate the setting on a plugin
    #[must_use]
    pub fn requires(mut self, plugin: impl Into<String>) -> Self {
        self.requires_plugin = Some(plugin.into());
        self
    }

    /// Whether the setting applies to a module
    #[must_use]
    pub fn applies_to(&self, module: &Module) -> bool {
        self.requires_plugin
            .as_deref()
            .map_or(true, |plugin| module.has_plugin(plugin))
    }
}

/// Result of propagating to one module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    /// Plugins newly applied
    pub plugins_applied: usize,
    /// Effective settings that changed
    pub settings_changed: usize,
    /// Settings skipped because the gating plugin is absent
    pub settings_skipped: usize,
}

impl PropagationOutcome {
    /// Whether propagation left the module untouched
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.plugins_applied == 0 && self.settings_changed == 0
    }
}

/// Applies a validated policy bundle to modules
#[derive(Debug, Clone)]
pub struct ConfigurationPropagator {
    bundle: PolicyBundle,
    settings: Vec<Setting>,
}

impl ConfigurationPropagator {
    /// Validate a bundle against a catalog.
    ///
    /// Any unknown toolchain version is reported here, before a single
    /// module is touched.
    pub fn new(bundle: PolicyBundle, catalog: &ToolchainCatalog) -> ForjaResult<Self> {
        for (tool, version) in &bundle.toolchains {
            catalog.validate(*tool, version)?;
        }
        if bundle.encoding.trim().is_empty() {
            return Err(ForjaError::config("policy encoding must not be empty"));
        }
        let settings = bundle.settings();
        Ok(Self { bundle, settings })
    }

    /// The validated bundle
    #[must_use]
    pub const fn bundle(&self) -> &PolicyBundle {
        &self.bundle
    }

    /// Apply the bundle to one module
    pub fn propagate(&self, module: &mut Module) -> PropagationOutcome {
        let mut outcome = PropagationOutcome::default();
        for plugin in &self.bundle.plugins {
            if module.apply_plugin(plugin.as_str()) {
                outcome.plugins_applied += 1;
            }
        }
        for setting in &self.settings {
            if !setting.applies_to(module) {
                outcome.settings_skipped += 1;
                continue;
            }
            if module.propagate_setting(&setting.key, &setting.value) {
                outcome.settings_changed += 1;
            }
        }
        debug!(
            module = module.name(),
            plugins_applied = outcome.plugins_applied,
            settings_changed = outcome.settings_changed,
            settings_skipped = outcome.settings_skipped,
            "propagated policy"
        );
        outcome
    }

    /// Apply the bundle to every module of a registry
    pub fn propagate_all(&self, registry: &mut ModuleRegistry) -> ForjaResult<()> {
        registry.apply_to_all(|module| {
            self.propagate(module);
            Ok(())
        })
    }
}
