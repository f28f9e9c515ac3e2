//! Class-artifact trees and their collision-free merge.

use crate::result::{ForjaError, ForjaResult};
use glob::{MatchOptions, Pattern};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Synthetic module descriptor that every modular module compiles to the same
/// identity; merging two of them aborts report generation
pub const MODULE_DESCRIPTOR: &str = "module-info.class";

const CLASS_EXTENSION: &str = "class";

/// Identities excluded from the merged class set
///
/// Patterns are globs matched against the path relative to the class tree
/// root and against the bare file name.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<Pattern>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new([Pattern::escape(MODULE_DESCRIPTOR)]).unwrap_or_else(|_| Self::none())
    }
}

impl ExclusionRules {
    /// Build rules from glob patterns
    pub fn new<I, S>(patterns: I) -> ForjaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Rules that exclude nothing
    #[must_use]
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Pattern sources
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Whether an identity is excluded
    #[must_use]
    pub fn is_excluded(&self, identity: &str) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };
        let file_name = identity.rsplit('/').next().unwrap_or(identity);
        self.patterns
            .iter()
            .any(|p| p.matches_with(identity, options) || p.matches_with(file_name, options))
    }
}

impl Serialize for ExclusionRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.patterns())
    }
}

/// A compiled-output directory contributed by a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassTree {
    /// Contributing module
    pub module: String,
    /// Tree root
    pub root: PathBuf,
}

impl ClassTree {
    /// Create a class tree
    #[must_use]
    pub fn new(module: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            root: root.into(),
        }
    }
}

/// One compiled class in the merged set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassArtifact {
    /// Report-internal identity: path relative to the tree root, `/`-separated
    pub identity: String,
    /// Contributing module
    pub module: String,
    /// Location on disk
    pub path: PathBuf,
}

/// Classes of every module, merged without duplicate identities
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassArtifactSet {
    trees: Vec<ClassTree>,
    artifacts: BTreeMap<String, ClassArtifact>,
    excluded: Vec<ClassArtifact>,
}

impl ClassArtifactSet {
    /// Walk every tree and merge its classes.
    ///
    /// Excluded identities are dropped from every contributor. Any other
    /// identity contributed more than once is a fatal collision.
    pub fn merge(trees: &[ClassTree], rules: &ExclusionRules) -> ForjaResult<Self> {
        let mut contributors: BTreeMap<String, Vec<ClassArtifact>> = BTreeMap::new();
        let mut excluded = Vec::new();

        for tree in trees {
            for artifact in walk_tree(tree)? {
                if rules.is_excluded(&artifact.identity) {
                    debug!(
                        module = %artifact.module,
                        identity = %artifact.identity,
                        "excluded class from merge"
                    );
                    excluded.push(artifact);
                } else {
                    contributors
                        .entry(artifact.identity.clone())
                        .or_default()
                        .push(artifact);
                }
            }
        }

        let mut artifacts = BTreeMap::new();
        for (identity, mut claimants) in contributors {
            if claimants.len() > 1 {
                return Err(ForjaError::MergeCollision {
                    identity,
                    modules: claimants.into_iter().map(|a| a.module).collect(),
                });
            }
            if let Some(artifact) = claimants.pop() {
                artifacts.insert(identity, artifact);
            }
        }

        Ok(Self {
            trees: trees.to_vec(),
            artifacts,
            excluded,
        })
    }

    /// Trees that were merged
    #[must_use]
    pub fn trees(&self) -> &[ClassTree] {
        &self.trees
    }

    /// Merged classes ordered by identity
    pub fn artifacts(&self) -> impl Iterator<Item = &ClassArtifact> {
        self.artifacts.values()
    }

    /// Merged identities in order
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// Look up a merged class
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&ClassArtifact> {
        self.artifacts.get(identity)
    }

    /// Classes dropped by the exclusion rules
    #[must_use]
    pub fn excluded(&self) -> &[ClassArtifact] {
        &self.excluded
    }

    /// Number of merged classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the merged set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Copy the merged classes into one directory tree rooted at `dir`.
    ///
    /// Returns the number of files written.
    pub fn stage(&self, dir: &Path) -> ForjaResult<usize> {
        self.stage_with(dir, |_| {})
    }

    /// Stage, calling `on_file` after each copied class
    pub fn stage_with<F>(&self, dir: &Path, mut on_file: F) -> ForjaResult<usize>
    where
        F: FnMut(&ClassArtifact),
    {
        std::fs::create_dir_all(dir)?;
        for artifact in self.artifacts.values() {
            let target = dir.join(&artifact.identity);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&artifact.path, &target)?;
            on_file(artifact);
        }
        Ok(self.artifacts.len())
    }
}

fn walk_tree(tree: &ClassTree) -> ForjaResult<Vec<ClassArtifact>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(&tree.root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().map_or(true, |ext| ext != CLASS_EXTENSION)
        {
            continue;
        }
        let relative = entry.path().strip_prefix(&tree.root).unwrap_or(entry.path());
        found.push(ClassArtifact {
            identity: identity_of(relative),
            module: tree.module.clone(),
            path: entry.path().to_path_buf(),
        });
    }
    Ok(found)
}

fn identity_of(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_class(root: &Path, identity: &str) {
        let path = root.join(identity);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, identity.as_bytes()).unwrap();
    }

    #[test]
    fn test_default_rules_exclude_module_descriptor() {
        let rules = ExclusionRules::default();
        assert!(rules.is_excluded("module-info.class"));
        assert!(rules.is_excluded("org/example/module-info.class"));
        assert!(!rules.is_excluded("org/example/Main.class"));
        assert_eq!(rules.patterns().collect::<Vec<_>>(), vec!["module-info.class"]);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExclusionRules::new(["org/example/gen/*.class"]).unwrap();
        assert!(rules.is_excluded("org/example/gen/Parser.class"));
        assert!(!rules.is_excluded("org/example/gen/sub/Parser.class"));
        assert!(!rules.is_excluded("module-info.class"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ExclusionRules::new(["[unclosed"]).is_err());
    }

    #[test]
    fn test_identity_uses_forward_slashes() {
        assert_eq!(identity_of(Path::new("org").join("a").join("B.class").as_path()), "org/a/B.class");
    }

    #[test]
    fn test_walk_ignores_non_class_files() {
        let dir = TempDir::new().unwrap();
        write_class(dir.path(), "org/a/A.class");
        std::fs::write(dir.path().join("org/a/messages.properties"), "x").unwrap();
        let found = walk_tree(&ClassTree::new("a", dir.path())).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identity, "org/a/A.class");
    }

    #[test]
    fn test_stage_copies_merged_classes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("classes");
        write_class(&root, "org/a/A.class");
        write_class(&root, "module-info.class");
        let set = ClassArtifactSet::merge(
            &[ClassTree::new("a", &root)],
            &ExclusionRules::default(),
        )
        .unwrap();

        let staged = dir.path().join("staged");
        let mut seen = Vec::new();
        let count = set
            .stage_with(&staged, |a| seen.push(a.identity.clone()))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(seen, vec!["org/a/A.class".to_string()]);
        assert!(staged.join("org/a/A.class").is_file());
        assert!(!staged.join("module-info.class").exists());
    }
}
