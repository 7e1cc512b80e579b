//! Project registry
//!
//! The registry is a JSON object mapping project names to records. It is read
//! in full, changed in memory, and written back atomically; nothing is cached
//! between commands.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::atomic;
use crate::error::ProjectError;
use crate::record::ProjectRecord;

/// Base name used when a root has no final path segment
const FALLBACK_NAME: &str = "project";

/// In-memory copy of the registry document
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    projects: BTreeMap<String, ProjectRecord>,
}

impl Registry {
    /// Empty registry that will be saved to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            projects: BTreeMap::new(),
        }
    }

    /// Load the registry, starting empty if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let projects: BTreeMap<String, ProjectRecord> = atomic::read_json(path)?.unwrap_or_default();

        for (key, record) in &projects {
            if *key != record.name {
                bail!(ProjectError::InvalidRegistry(format!(
                    "entry '{}' holds record named '{}'",
                    key, record.name
                )));
            }
        }

        debug!("Loaded {} projects from {}", projects.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            projects,
        })
    }

    /// Atomically write the registry back to disk
    pub fn save(&self) -> Result<()> {
        atomic::write_json(&self.path, &self.projects)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.get(name)
    }

    /// Records in name order
    pub fn records(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.projects.values()
    }

    /// Insert or replace a record under its own name
    pub fn insert(&mut self, record: ProjectRecord) -> Option<ProjectRecord> {
        self.projects.insert(record.name.clone(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<ProjectRecord> {
        self.projects.remove(name)
    }

    /// Names of every record writing to `output`
    pub fn names_with_output(&self, output: &Path) -> Vec<String> {
        self.projects
            .values()
            .filter(|record| record.output == output)
            .map(|record| record.name.clone())
            .collect()
    }

    /// The record whose root is the longest prefix of `dir`.
    ///
    /// Roots are compared component-wise. Equal-length roots resolve to the
    /// first record in name order.
    pub fn find_by_dir(&self, dir: &Path) -> Option<&ProjectRecord> {
        let mut best: Option<(usize, &ProjectRecord)> = None;

        for record in self.projects.values() {
            if !dir.starts_with(&record.root) {
                continue;
            }
            let len = record.root.as_os_str().len();
            if best.map_or(true, |(best_len, _)| len > best_len) {
                best = Some((len, record));
            }
        }

        best.map(|(_, record)| record)
    }

    /// Find a record by explicit name, or by directory when no name is given
    pub fn lookup(&self, name: Option<&str>, cwd: &Path) -> Result<&ProjectRecord> {
        match name {
            Some(name) => match self.get(name) {
                Some(record) => Ok(record),
                None => bail!(ProjectError::ProjectNotFound(name.to_string())),
            },
            None => match self.find_by_dir(cwd) {
                Some(record) => Ok(record),
                None => bail!(ProjectError::ProjectNotFoundForDirectory(cwd.to_path_buf())),
            },
        }
    }

    /// First unused name of the form `base`, `base1`, `base2`, ... where
    /// `base` is the last segment of `root`
    pub fn unique_name(&self, root: &Path) -> String {
        let base = root
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_NAME);

        if !self.contains(base) {
            return base.to_string();
        }

        (1..)
            .map(|i| format!("{}{}", base, i))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
