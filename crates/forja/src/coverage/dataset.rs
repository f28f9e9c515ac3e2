//! Execution data and the lazily filtered coverage dataset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File extension of execution-data files written by the coverage agent
pub const EXECUTION_DATA_EXTENSION: &str = "exec";

/// Raw coverage samples written by one module's test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDataFile {
    /// Owning module
    pub module: String,
    /// Expected location on disk
    pub path: PathBuf,
}

impl ExecutionDataFile {
    /// Create a reference to a module's execution data
    #[must_use]
    pub fn new(module: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
        }
    }

    /// Whether the path carries the execution-data extension
    #[must_use]
    pub fn has_execution_extension(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext == EXECUTION_DATA_EXTENSION)
    }

    /// Whether the file can be handed to the report generator, given a
    /// probe answering "does this path exist as a file"
    #[must_use]
    pub fn is_usable_with(&self, exists: impl Fn(&Path) -> bool) -> bool {
        self.has_execution_extension() && exists(&self.path)
    }
}

/// The union of every module's execution data that exists
///
/// Candidates are stored as declared. Existence is evaluated each time the
/// dataset is read, never when it is built, so files written after
/// construction are picked up and files never written are simply absent.
#[derive(Debug, Clone, Default)]
pub struct CoverageDataset {
    candidates: Vec<ExecutionDataFile>,
}

impl CoverageDataset {
    /// Create a dataset from candidate files
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = ExecutionDataFile>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Add a candidate
    pub fn push(&mut self, file: ExecutionDataFile) {
        self.candidates.push(file);
    }

    /// All declared candidates, existing or not
    #[must_use]
    pub fn candidates(&self) -> &[ExecutionDataFile] {
        &self.candidates
    }

    /// Candidates accepted by an arbitrary existence probe
    pub fn files_where<'a, P>(&'a self, exists: P) -> impl Iterator<Item = &'a ExecutionDataFile>
    where
        P: Fn(&Path) -> bool + 'a,
    {
        self.candidates
            .iter()
            .filter(move |file| file.is_usable_with(&exists))
    }

    /// Candidates that exist on disk right now
    pub fn files(&self) -> impl Iterator<Item = &ExecutionDataFile> {
        self.files_where(Path::is_file)
    }

    /// Paths of the files that exist on disk right now
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().map(|file| file.path.clone()).collect()
    }

    /// Whether a module currently has usable execution data
    #[must_use]
    pub fn has_data_for(&self, module: &str) -> bool {
        self.files().any(|file| file.module == module)
    }

    /// Number of usable files right now
    #[must_use]
    pub fn len(&self) -> usize {
        self.files().count()
    }

    /// Whether no usable file exists right now
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files().next().is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_extension_filter() {
        assert!(ExecutionDataFile::new("a", "build/jacoco/test.exec").has_execution_extension());
        assert!(!ExecutionDataFile::new("a", "build/jacoco/test.exec.tmp").has_execution_extension());
        assert!(!ExecutionDataFile::new("a", "build/jacoco").has_execution_extension());
    }

    #[test]
    fn test_filter_is_evaluated_lazily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.exec");
        let dataset = CoverageDataset::new([ExecutionDataFile::new("core", &path)]);

        assert!(dataset.is_empty());
        assert!(!dataset.has_data_for("core"));

        // Written after the dataset was built
        std::fs::write(&path, b"samples").unwrap();
        assert_eq!(dataset.paths(), vec![path]);
        assert!(dataset.has_data_for("core"));
        assert_eq!(dataset.candidates().len(), 1);
    }

    #[test]
    fn test_directory_is_not_execution_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.exec");
        std::fs::create_dir(&path).unwrap();
        let dataset = CoverageDataset::new([ExecutionDataFile::new("core", path)]);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_files_where_uses_probe() {
        let dataset = CoverageDataset::new([
            ExecutionDataFile::new("a", "/virtual/a.exec"),
            ExecutionDataFile::new("b", "/virtual/b.exec"),
        ]);
        let present: Vec<_> = dataset
            .files_where(|p| p.ends_with("b.exec"))
            .map(|f| f.module.as_str())
            .collect();
        assert_eq!(present, vec!["b"]);
    }

    proptest! {
        #[test]
        fn prop_dataset_is_exactly_existing_files(mask in proptest::collection::vec(any::<bool>(), 0..12)) {
            let dir = TempDir::new().unwrap();
            let mut dataset = CoverageDataset::default();
            let mut expected = BTreeSet::new();
            for (i, exists) in mask.iter().enumerate() {
                let path = dir.path().join(format!("m{i}.exec"));
                if *exists {
                    std::fs::write(&path, b"x").unwrap();
                    expected.insert(path.clone());
                }
                dataset.push(ExecutionDataFile::new(format!("m{i}"), path));
            }
            let actual: BTreeSet<_> = dataset.paths().into_iter().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
