//! Project description file (`forja.yaml`).

use crate::coverage::{ExclusionRules, ModuleCoverage, MODULE_DESCRIPTOR};
use crate::module::{Module, OverrideMap};
use crate::propagate::{ConfigurationPropagator, PolicyBundle, Tool, ToolchainCatalog};
use crate::registry::ModuleRegistry;
use crate::result::{ForjaError, ForjaResult};
use crate::toggle::{FeatureToggleResolver, FlagSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default project file name
pub const PROJECT_FILE: &str = "forja.yaml";

/// One module as declared in the project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Module name
    pub name: String,
    /// Module directory, relative to the project root
    pub dir: PathBuf,
    /// Plugins applied by the module itself
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Explicit settings that win over the policy
    #[serde(default)]
    pub overrides: OverrideMap,
    /// Execution-data location, relative to the module directory
    #[serde(default)]
    pub execution_data: Option<PathBuf>,
    /// Class trees, relative to the module directory
    #[serde(default)]
    pub class_dirs: Vec<PathBuf>,
    /// Source directories, relative to the module directory
    #[serde(default)]
    pub source_dirs: Vec<PathBuf>,
}

/// `coverage:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSection {
    /// Class identity globs dropped before merging
    #[serde(default = "default_exclusions")]
    pub exclude: Vec<String>,
}

impl Default for CoverageSection {
    fn default() -> Self {
        Self {
            exclude: default_exclusions(),
        }
    }
}

fn default_exclusions() -> Vec<String> {
    vec![MODULE_DESCRIPTOR.to_string()]
}

/// Parsed project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Declared modules, in order
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    /// Policy applied to every module
    #[serde(default)]
    pub policy: PolicyBundle,
    /// Toolchain versions accepted in addition to the built-in catalog
    #[serde(default)]
    pub known_toolchains: BTreeMap<Tool, Vec<String>>,
    /// Coverage settings
    #[serde(default)]
    pub coverage: CoverageSection,
    /// Notice file, relative to the project root
    #[serde(default)]
    pub notice: Option<PathBuf>,
    /// Additional feature flags
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
    #[serde(skip)]
    root: PathBuf,
}

impl ProjectConfig {
    /// Parse and validate a project rooted at the current directory
    pub fn from_yaml(yaml: &str) -> ForjaResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml)?;
        config.root = PathBuf::from(".");
        config.validate()?;
        Ok(config)
    }

    /// Load a project file; paths resolve against its directory
    pub fn load(path: &Path) -> ForjaResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ForjaError::config(format!("cannot read project file {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&yaml)?;
        config.root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        debug!(path = %path.display(), modules = config.modules.len(), "loaded project");
        Ok(config)
    }

    /// Set the directory relative paths resolve against
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check structural rules that serde cannot express
    pub fn validate(&self) -> ForjaResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.modules {
            if entry.name.trim().is_empty() {
                return Err(ForjaError::config("module name must not be empty"));
            }
            if entry.dir.is_absolute() {
                return Err(ForjaError::config(format!(
                    "module '{}' directory must be relative to the project",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ForjaError::DuplicateModule {
                    name: entry.name.clone(),
                });
            }
        }
        if self.policy.encoding.trim().is_empty() {
            return Err(ForjaError::config("policy encoding must not be empty"));
        }
        Ok(())
    }

    /// Directory of a declared module
    #[must_use]
    pub fn module_dir(&self, entry: &ModuleEntry) -> PathBuf {
        self.root.join(&entry.dir)
    }

    /// Modules as declared, before policy is applied
    pub fn registry(&self) -> ForjaResult<ModuleRegistry> {
        ModuleRegistry::from_modules(self.modules.iter().map(|entry| {
            entry.overrides.iter().fold(
                Module::new(&entry.name, self.module_dir(entry)).with_plugins(&entry.plugins),
                |module, (key, value)| module.with_override(key, value),
            )
        }))
    }

    /// Built-in catalog extended with the project's additions
    #[must_use]
    pub fn catalog(&self) -> ToolchainCatalog {
        self.known_toolchains
            .iter()
            .fold(ToolchainCatalog::builtin(), |catalog, (tool, versions)| {
                catalog.with_versions(*tool, versions)
            })
    }

    /// Propagator for the project policy
    pub fn propagator(&self) -> ForjaResult<ConfigurationPropagator> {
        ConfigurationPropagator::new(self.policy.clone(), &self.catalog())
    }

    /// Modules with the policy applied
    pub fn configured_registry(&self) -> ForjaResult<ModuleRegistry> {
        let propagator = self.propagator()?;
        let mut registry = self.registry()?;
        propagator.propagate_all(&mut registry)?;
        Ok(registry)
    }

    /// Coverage inputs: conventional locations unless declared
    #[must_use]
    pub fn coverage_inputs(&self) -> Vec<ModuleCoverage> {
        self.modules
            .iter()
            .map(|entry| {
                let dir = self.module_dir(entry);
                let module = Module::new(&entry.name, &dir);
                let mut input = ModuleCoverage::conventional(&module);
                if let Some(ref data) = entry.execution_data {
                    input.execution_data = Some(dir.join(data));
                }
                if !entry.class_dirs.is_empty() {
                    input.class_dirs = entry.class_dirs.iter().map(|d| dir.join(d)).collect();
                }
                if !entry.source_dirs.is_empty() {
                    input.source_dirs = entry.source_dirs.iter().map(|d| dir.join(d)).collect();
                }
                input
            })
            .collect()
    }

    /// Compiled coverage exclusion rules
    pub fn exclusions(&self) -> ForjaResult<ExclusionRules> {
        ExclusionRules::new(&self.coverage.exclude)
    }

    /// Resolver with built-in and project flags declared
    #[must_use]
    pub fn resolver(&self) -> FeatureToggleResolver {
        self.flags
            .iter()
            .cloned()
            .fold(FeatureToggleResolver::with_builtin_flags(), FeatureToggleResolver::with_flag)
    }

    /// Notice file location, if declared
    #[must_use]
    pub fn notice_path(&self) -> Option<PathBuf> {
        self.notice.as_ref().map(|notice| self.root.join(notice))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::module::Provenance;

    const PROJECT: &str = r#"
name: example
modules:
  - name: core
    dir: src/core
    plugins: [java, jacoco, publishing]
    overrides: { encoding: ISO-8859-1 }
  - name: http
    dir: src/http
    plugins: [java]
    class_dirs: [target/classes]
  - name: docs
    dir: docs
policy:
  group: org.example
  toolchains: { checkstyle: "8.23", jacoco: "0.8.4" }
  manifest: { Specification-Title: Example }
known_toolchains: { checkstyle: ["8.24"] }
notice: NOTICE
flags:
  - name: release
    env: RELEASE
"#;

    #[test]
    fn test_parse() {
        let config = ProjectConfig::from_yaml(PROJECT).unwrap();
        assert_eq!(config.name.as_deref(), Some("example"));
        assert_eq!(config.modules.len(), 3);
        assert_eq!(config.policy.encoding, "UTF-8");
        assert_eq!(config.coverage.exclude, vec![MODULE_DESCRIPTOR]);
        assert_eq!(config.notice_path(), Some(PathBuf::from("./NOTICE")));
    }

    #[test]
    fn test_configured_registry() {
        let registry = ProjectConfig::from_yaml(PROJECT)
            .unwrap()
            .configured_registry()
            .unwrap();
        let core = registry.require("core").unwrap();
        assert_eq!(core.setting("encoding"), Some("ISO-8859-1"));
        assert_eq!(core.effective()["encoding"].provenance, Provenance::Override);
        assert_eq!(core.setting("toolchain.jacoco"), Some("0.8.4"));
        assert!(core.has_plugin("spotbugs"));

        let http = registry.require("http").unwrap();
        assert_eq!(http.setting("encoding"), Some("UTF-8"));
        assert_eq!(http.setting("toolchain.jacoco"), None);

        let docs = registry.require("docs").unwrap();
        assert_eq!(docs.setting("encoding"), None);
        assert_eq!(docs.setting("group"), Some("org.example"));
    }

    #[test]
    fn test_catalog_additions() {
        let config = ProjectConfig::from_yaml(PROJECT).unwrap();
        assert!(config.catalog().is_known(Tool::Checkstyle, "8.24"));
        assert!(config.catalog().is_known(Tool::Checkstyle, "8.23"));
    }

    #[test]
    fn test_unknown_toolchain_fails_before_modules_change() {
        let yaml = "modules: [{ name: core, dir: core }]\npolicy: { toolchains: { jacoco: \"9.9.9\" } }\n";
        let err = ProjectConfig::from_yaml(yaml)
            .unwrap()
            .configured_registry()
            .unwrap_err();
        assert!(matches!(err, ForjaError::UnknownToolchain { .. }));
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let yaml = "modules:\n  - { name: a, dir: a }\n  - { name: a, dir: b }\n";
        assert!(matches!(
            ProjectConfig::from_yaml(yaml).unwrap_err(),
            ForjaError::DuplicateModule { .. }
        ));
    }

    #[test]
    fn test_absolute_module_dir_rejected() {
        let yaml = "modules:\n  - { name: a, dir: /abs }\n";
        assert!(ProjectConfig::from_yaml(yaml).unwrap_err().is_configuration());
    }

    #[test]
    fn test_coverage_inputs() {
        let config = ProjectConfig::from_yaml(PROJECT).unwrap().with_root("/p");
        let inputs = config.coverage_inputs();
        assert_eq!(
            inputs[0].execution_data.as_deref(),
            Some(Path::new("/p/src/core/build/jacoco/test.exec"))
        );
        assert_eq!(inputs[1].class_dirs, vec![PathBuf::from("/p/src/http/target/classes")]);
    }

    #[test]
    fn test_empty_exclusions_disable_filtering() {
        let config = ProjectConfig::from_yaml("coverage: { exclude: [] }").unwrap();
        assert!(!config.exclusions().unwrap().is_excluded(MODULE_DESCRIPTOR));
    }

    #[test]
    fn test_project_flags_are_declared() {
        let resolver = ProjectConfig::from_yaml(PROJECT)
            .unwrap()
            .resolver()
            .with_env([("RELEASE", "yes")]);
        assert!(resolver.resolve("release"));
        assert!(!resolver.resolve(crate::toggle::CI));
    }

    #[test]
    fn test_load_resolves_against_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, PROJECT).unwrap();
        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.root(), dir.path());
        let registry = config.registry().unwrap();
        assert_eq!(registry.require("core").unwrap().dir(), dir.path().join("src/core"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ProjectConfig::load(Path::new("/no/such/forja.yaml")).unwrap_err();
        assert!(err.is_configuration());
    }
}
