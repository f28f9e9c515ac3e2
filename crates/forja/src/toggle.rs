//! Feature toggles resolved from build properties, environment and defaults.
//!
//! Resolution order is fixed: an explicit property wins, then the environment
//! variable, then the static default. Resolution never fails; a value that
//! cannot be read as a boolean is treated as if it were not set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Continuous-integration detection flag
pub const CI: &str = "ci";

/// Optional static analysis flag
pub const ENABLE_SPOTBUGS: &str = "enableSpotBugs";

/// Parse a boolean the way build properties are written
///
/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitive and
/// trimmed. Anything else is `None`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Declaration of one feature flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Flag name
    pub name: String,
    /// Property names that set the flag, checked in order
    #[serde(default)]
    pub properties: Vec<String>,
    /// Environment variable consulted when no property is set
    #[serde(default)]
    pub env: Option<String>,
    /// Value when neither property nor environment decide
    #[serde(default)]
    pub default: bool,
}

impl FlagSpec {
    /// Create a flag whose only property is its own name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            properties: vec![name.clone()],
            name,
            env: None,
            default: false,
        }
    }

    /// Add a property alias
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Set the environment variable
    #[must_use]
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Set the default
    #[must_use]
    pub const fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

/// Which input decided a flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "source", content = "name")]
pub enum FlagSource {
    /// An explicit build property
    Property(String),
    /// An environment variable
    Environment(String),
    /// The static default (also used for undeclared flags)
    Default,
}

/// A resolved flag value together with its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Flag name
    pub name: String,
    /// Resolved value
    pub value: bool,
    /// Deciding input
    pub source: FlagSource,
}

/// Resolves feature flags from properties, environment and defaults
#[derive(Debug, Clone, Default)]
pub struct FeatureToggleResolver {
    specs: BTreeMap<String, FlagSpec>,
    properties: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
}

impl FeatureToggleResolver {
    /// Create a resolver with no flags, properties or environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with the built-in flags declared: `ci` (env `CI`) and
    /// `enableSpotBugs` (properties `enableSpotBugs`/`enableSpotbugs`)
    #[must_use]
    pub fn with_builtin_flags() -> Self {
        Self::new()
            .with_flag(FlagSpec::new(CI).with_env("CI"))
            .with_flag(FlagSpec::new(ENABLE_SPOTBUGS).with_property("enableSpotbugs"))
    }

    /// Declare a flag, replacing an earlier declaration with the same name
    #[must_use]
    pub fn with_flag(mut self, spec: FlagSpec) -> Self {
        self.specs.insert(spec.name.clone(), spec);
        self
    }

    /// Set a build property. An empty value means the property is present.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Parse `key` or `key=value` property arguments
    #[must_use]
    pub fn with_property_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').unwrap_or((arg, ""));
            self.properties.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Use an explicit environment snapshot
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Snapshot the process environment for the declared flags
    #[must_use]
    pub fn with_process_env(self) -> Self {
        let vars: Vec<(String, String)> = self
            .specs
            .values()
            .filter_map(|spec| spec.env.clone())
            .filter_map(|var| std::env::var(&var).ok().map(|value| (var, value)))
            .collect();
        self.with_env(vars)
    }

    /// Declared flag names
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Resolve a flag to a boolean
    #[must_use]
    pub fn resolve(&self, name: &str) -> bool {
        self.explain(name).value
    }

    /// Resolve a flag and report which input decided it
    #[must_use]
    pub fn explain(&self, name: &str) -> Resolution {
        let Some(spec) = self.specs.get(name) else {
            // Undeclared flags: the property of the same name, else false
            let resolution = self.property_value(name).map_or_else(
                || Resolution {
                    name: name.to_string(),
                    value: false,
                    source: FlagSource::Default,
                },
                |value| Resolution {
                    name: name.to_string(),
                    value,
                    source: FlagSource::Property(name.to_string()),
                },
            );
            debug!(flag = name, value = resolution.value, "resolved undeclared flag");
            return resolution;
        };

        let resolution = self.decide(spec);
        debug!(
            flag = name,
            value = resolution.value,
            source = ?resolution.source,
            "resolved flag"
        );
        resolution
    }

    /// Resolve every declared flag
    #[must_use]
    pub fn resolve_all(&self) -> Vec<Resolution> {
        self.specs.values().map(|spec| self.decide(spec)).collect()
    }

    fn decide(&self, spec: &FlagSpec) -> Resolution {
        for property in &spec.properties {
            if let Some(value) = self.property_value(property) {
                return Resolution {
                    name: spec.name.clone(),
                    value,
                    source: FlagSource::Property(property.clone()),
                };
            }
        }
        if let Some(ref var) = spec.env {
            if let Some(value) = self.env.get(var).map(String::as_str).and_then(parse_bool) {
                return Resolution {
                    name: spec.name.clone(),
                    value,
                    source: FlagSource::Environment(var.clone()),
                };
            }
        }
        Resolution {
            name: spec.name.clone(),
            value: spec.default,
            source: FlagSource::Default,
        }
    }

    fn property_value(&self, key: &str) -> Option<bool> {
        let raw = self.properties.get(key)?;
        if raw.trim().is_empty() {
            return Some(true);
        }
        parse_bool(raw)
    }
}
