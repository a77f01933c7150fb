//! Source loader - reads checked artifacts relative to a repository root

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the shared consensus types, relative to the repository root
pub const SHARED_TYPES_PATH: &str = "rusty-shared-types/src/lib.rs";

/// Reads source artifacts from a fixed repository root
#[derive(Debug, Clone)]
pub struct SourceLoader {
    root: PathBuf,
}

impl SourceLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root all paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Read an artifact into memory.
    ///
    /// Returns `None` when the file is missing or unreadable.
    pub fn load(&self, rel: &str) -> Option<String> {
        let path = self.resolve(rel);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("loaded {} ({} bytes)", path.display(), content.len());
                Some(content)
            }
            Err(e) => {
                debug!("cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Check that an artifact exists, without reading it
    pub fn exists(&self, rel: &str) -> bool {
        self.resolve(rel).exists()
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_existing_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("rusty-shared-types/src")).unwrap();
        fs::write(temp.path().join(SHARED_TYPES_PATH), "pub struct A {}").unwrap();

        let loader = SourceLoader::new(temp.path());
        assert_eq!(loader.load(SHARED_TYPES_PATH).as_deref(), Some("pub struct A {}"));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let loader = SourceLoader::new(temp.path());
        assert!(loader.load(SHARED_TYPES_PATH).is_none());
    }

    #[test]
    fn test_load_directory_is_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        let loader = SourceLoader::new(temp.path());
        assert!(loader.load("docs").is_none());
        assert!(loader.exists("docs"));
    }

    #[test]
    fn test_exists() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();
        let loader = SourceLoader::new(temp.path());
        assert!(loader.exists("README.md"));
        assert!(!loader.exists("MISSING.md"));
    }

    #[test]
    fn test_default_root() {
        assert_eq!(SourceLoader::default().root(), Path::new("."));
    }
}
