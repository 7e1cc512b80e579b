//! Project lifecycle: init, run, clear, find, list
//!
//! Every operation loads the registry, works on it in memory and saves it
//! atomically before returning. Concurrent invocations are not coordinated;
//! the last writer wins.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::GeneratorCatalog;
use crate::config::{Config, FailurePolicy};
use crate::error::ProjectError;
use crate::paths;
use crate::record::{self, ProjectRecord};
use crate::registry::Registry;
use crate::runner::{self, Executor, SystemExecutor};

/// Arguments to [`ProjectManager::init`]
#[derive(Debug, Clone, Default)]
pub struct InitRequest {
    /// Explicit project name; synthesized from `root` when absent
    pub name: Option<String>,
    /// Source tree (default: cwd)
    pub root: Option<PathBuf>,
    /// Index directory (default: `<output_dir>/<name>` from the config)
    pub output: Option<PathBuf>,
    /// Generator name (default: configured default)
    pub generator: Option<String>,
    /// Runner file name (default: configured default)
    pub runner_name: Option<String>,
}

/// Snapshot produced by [`ProjectManager::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub generators: BTreeMap<String, PathBuf>,
    pub projects: Vec<ProjectRecord>,
}

/// Ties the catalog, runner builder, executor and registry together
pub struct ProjectManager<E = SystemExecutor> {
    config: Config,
    catalog: GeneratorCatalog,
    executor: E,
}

impl ProjectManager<SystemExecutor> {
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, SystemExecutor)
    }
}

impl<E: Executor> ProjectManager<E> {
    /// Create a manager that runs generators through `executor`
    pub fn with_executor(config: Config, executor: E) -> Self {
        let catalog = GeneratorCatalog::new(&config.generator_dir);
        Self {
            config,
            catalog,
            executor,
        }
    }

    pub fn catalog(&self) -> &GeneratorCatalog {
        &self.catalog
    }

    fn load(&self) -> Result<Registry> {
        Registry::load(&self.config.registry_file)
    }

    /// Create (or replace) a project and generate its index
    pub fn init(&self, request: InitRequest, cwd: &Path) -> Result<ProjectRecord> {
        let generator = request
            .generator
            .unwrap_or_else(|| self.config.default_generator.clone());
        let generator_path = self.catalog.resolve(&generator)?;

        let root = paths::normalize(request.root.as_deref().unwrap_or(cwd), cwd);
        let runner_name = request
            .runner_name
            .unwrap_or_else(|| self.config.runner_name.clone());

        let mut registry = self.load()?;

        // Without -o the index goes to a fresh directory named after the project
        let (output, default_name) = match request.output.as_deref() {
            Some(output) => (paths::normalize(output, cwd), None),
            None => {
                let name = request
                    .name
                    .clone()
                    .unwrap_or_else(|| registry.unique_name(&root));
                (paths::normalize(&self.config.output_dir.join(&name), cwd), Some(name))
            }
        };

        let evicted = registry.names_with_output(&output);
        if let Some(name) = request.name.as_deref() {
            if registry.contains(name) && !evicted.iter().any(|e| e == name) {
                bail!(ProjectError::ProjectNameConflict(name.to_string()));
            }
        }

        let mut sources = source_roots(&registry);
        sources.push(root.clone());

        for name in &evicted {
            if let Some(old) = registry.remove(name) {
                info!("Replacing project '{}' at {}", old.name, old.output.display());
                remove_artifacts(&old.output, &sources);
            }
        }

        let name = match request.name.or(default_name) {
            Some(name) => name,
            None => registry.unique_name(&root),
        };

        let runner = runner::build(&generator_path, &runner_name, &root, &output)?;
        let outcome = self.generate(&generator, &runner);

        if let Err(err) = outcome {
            // Nothing will point at the new output; evictions stay persisted
            remove_artifacts(&output, &sources);
            registry.save()?;
            return Err(err);
        }

        let record = ProjectRecord {
            name,
            root,
            output,
            generator,
            runner,
            updated_at: record::now(),
        };
        registry.insert(record.clone());
        registry.save()?;

        info!("Initialized project '{}'", record.name);
        Ok(record)
    }

    /// Regenerate a project's index, rebuilding its runner if it went missing
    pub fn run(&self, name: Option<&str>, cwd: &Path) -> Result<ProjectRecord> {
        let mut registry = self.load()?;
        let cwd = paths::normalize(cwd, cwd);
        let mut record = registry.lookup(name, &cwd)?.clone();

        if !record.runner.exists() {
            let generator_path = self.catalog.resolve(&record.generator)?;
            let runner_name = record
                .runner
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(self.config.runner_name.as_str())
                .to_string();
            info!("Rebuilding missing runner {}", record.runner.display());
            record.runner = runner::build(&generator_path, &runner_name, &record.root, &record.output)?;
        }

        self.generate(&record.generator, &record.runner)?;

        record.touch();
        registry.insert(record.clone());
        registry.save()?;
        Ok(record)
    }

    /// Delete a project's index files and forget the project
    pub fn clear(&self, name: Option<&str>, cwd: &Path) -> Result<ProjectRecord> {
        let mut registry = self.load()?;
        let cwd = paths::normalize(cwd, cwd);
        let target = registry.lookup(name, &cwd)?.name.clone();
        let sources = source_roots(&registry);

        let record = match registry.remove(&target) {
            Some(record) => record,
            None => bail!(ProjectError::ProjectNotFound(target)),
        };
        remove_artifacts(&record.output, &sources);
        registry.save()?;

        info!("Cleared project '{}'", record.name);
        Ok(record)
    }

    /// Project whose root contains `cwd`
    pub fn find(&self, cwd: &Path) -> Result<ProjectRecord> {
        let registry = self.load()?;
        let dir = paths::normalize(cwd, cwd);
        registry.lookup(None, &dir).cloned()
    }

    /// Catalog and registry contents, optionally filtered
    pub fn list(&self, generator: Option<&str>, names: &[String]) -> Result<Listing> {
        let mut generators = self.catalog.list()?;
        if let Some(wanted) = generator {
            generators.retain(|name, _| name == wanted);
        }

        let registry = self.load()?;
        let projects = registry
            .records()
            .filter(|record| generator.map_or(true, |g| record.generator == g))
            .filter(|record| names.is_empty() || names.contains(&record.name))
            .cloned()
            .collect();

        Ok(Listing {
            generators,
            projects,
        })
    }

    /// Every available generator
    pub fn generators(&self) -> Result<BTreeMap<String, PathBuf>> {
        self.catalog.list()
    }

    /// Path of a single generator
    pub fn generator_path(&self, name: &str) -> Result<PathBuf> {
        self.catalog.resolve(name)
    }

    /// Execute a runner and apply the configured failure policy
    fn generate(&self, generator: &str, runner: &Path) -> Result<()> {
        let code = self.executor.execute(runner, &[])?;
        if code == Some(0) {
            return Ok(());
        }

        match self.config.on_generator_failure {
            FailurePolicy::Ignore => {
                warn!(
                    "Generator '{}' exited with {:?}; recording the run anyway",
                    generator, code
                );
                Ok(())
            }
            FailurePolicy::Fail => bail!(ProjectError::GeneratorFailed {
                name: generator.to_string(),
                code,
            }),
        }
    }
}

fn source_roots(registry: &Registry) -> Vec<PathBuf> {
    registry.records().map(|record| record.root.clone()).collect()
}

/// Remove the files directly under `output`, then the directory itself.
///
/// Best effort: failures are logged and otherwise ignored. An output that is
/// one of `sources` or contains one is left alone.
fn remove_artifacts(output: &Path, sources: &[PathBuf]) {
    if let Some(root) = sources.iter().find(|root| root.starts_with(output)) {
        warn!(
            "Not removing {}: it contains the source tree {}",
            output.display(),
            root.display()
        );
        return;
    }

    let entries = match fs::read_dir(output) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping cleanup of {}: {}", output.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            debug!("Failed to remove {}: {}", path.display(), e);
        }
    }

    if let Err(e) = fs::remove_dir(output) {
        debug!("Failed to remove {}: {}", output.display(), e);
    }
}
