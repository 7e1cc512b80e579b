//! Runner scripts and external command execution
//!
//! A runner is a two-line shell script written into a project's output
//! directory. It calls the generator with the project's root and output, so a
//! later refresh does not need to resolve the generator again.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Render the runner script body
pub fn script(generator: &Path, root: &Path, output: &Path) -> String {
    format!(
        "#!/bin/sh\n{} {} {}\n",
        generator.display(),
        root.display(),
        output.display()
    )
}

/// Write `<output>/<runner_name>` and make it executable
pub fn build(generator: &Path, runner_name: &str, root: &Path, output: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let runner = output.join(runner_name);
    fs::write(&runner, script(generator, root, output))
        .with_context(|| format!("Failed to write runner: {}", runner.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&runner)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&runner, perms)
            .with_context(|| format!("Failed to make runner executable: {}", runner.display()))?;
    }

    debug!("Wrote runner {}", runner.display());
    Ok(runner)
}

/// Synchronous external command capability.
///
/// Returns the exit code, or `None` when the process was killed by a signal.
pub trait Executor {
    fn execute(&self, program: &Path, args: &[&OsStr]) -> Result<Option<i32>>;
}

/// Runs commands as child processes with inherited stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, program: &Path, args: &[&OsStr]) -> Result<Option<i32>> {
        info!("Running {}", program.display());
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to execute {}", program.display()))?;
        Ok(status.code())
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, program: &Path, args: &[&OsStr]) -> Result<Option<i32>> {
        (**self).execute(program, args)
    }
}
