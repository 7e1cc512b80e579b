//! Generator catalog
//!
//! Generators are executables in a single directory; the file name is the
//! generator name. Entries starting with `.` or `_` are hidden.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ProjectError;

/// Directory-backed list of generator scripts
#[derive(Debug, Clone)]
pub struct GeneratorCatalog {
    dir: PathBuf,
}

impl GeneratorCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All visible generators, keyed by name
    pub fn list(&self) -> Result<BTreeMap<String, PathBuf>> {
        let mut generators = BTreeMap::new();

        if !self.dir.is_dir() {
            debug!("Generator directory {} does not exist", self.dir.display());
            return Ok(generators);
        }

        let entries = fs::read_dir(&self.dir).with_context(|| {
            format!("Failed to read generator directory: {}", self.dir.display())
        })?;

        for entry in entries {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if is_hidden(&name) {
                continue;
            }

            let path = entry.path();
            // is_file follows symlinks
            if path.is_file() {
                generators.insert(name, path);
            }
        }

        Ok(generators)
    }

    /// Resolve a generator by exact name
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        match self.list()?.remove(name) {
            Some(path) => Ok(path),
            None => bail!(ProjectError::GeneratorNotFound(name.to_string())),
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_with(files: &[&str]) -> (TempDir, GeneratorCatalog) {
        let temp = TempDir::new().unwrap();
        for file in files {
            fs::write(temp.path().join(file), "#!/bin/sh\n").unwrap();
        }
        let catalog = GeneratorCatalog::new(temp.path());
        (temp, catalog)
    }

    #[test]
    fn test_list_excludes_hidden() {
        let (_temp, catalog) = catalog_with(&["basic", "kernel", ".swp", "_common"]);
        let names: Vec<_> = catalog.list().unwrap().into_keys().collect();
        assert_eq!(names, vec!["basic".to_string(), "kernel".to_string()]);
    }

    #[test]
    fn test_list_skips_directories() {
        let (temp, catalog) = catalog_with(&["basic"]);
        fs::create_dir(temp.path().join("lib")).unwrap();
        assert_eq!(catalog.list().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = GeneratorCatalog::new(temp.path().join("nope"));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_exact_name() {
        let (temp, catalog) = catalog_with(&["basic", "basic-full"]);
        assert_eq!(catalog.resolve("basic").unwrap(), temp.path().join("basic"));
    }

    #[test]
    fn test_resolve_unknown() {
        let (_temp, catalog) = catalog_with(&["basic"]);
        let err = catalog.resolve("bas").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProjectError>(),
            Some(&ProjectError::GeneratorNotFound("bas".into()))
        );
    }

    #[test]
    fn test_resolve_hidden_is_not_found() {
        let (_temp, catalog) = catalog_with(&["_common"]);
        assert!(catalog.resolve("_common").is_err());
    }
}
