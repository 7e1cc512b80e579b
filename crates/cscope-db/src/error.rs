//! User-facing error kinds
//!
//! Library functions return `anyhow::Result` and raise these with `bail!`.
//! Callers that need to branch on the kind use `downcast_ref::<ProjectError>()`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the current command without touching the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("Generator not found: {0}")]
    GeneratorNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("No project found for directory: {}", .0.display())]
    ProjectNotFoundForDirectory(PathBuf),

    #[error("Project name already in use: {0}")]
    ProjectNameConflict(String),

    #[error("Generator '{name}' failed ({})", exit_description(.code))]
    GeneratorFailed { name: String, code: Option<i32> },

    #[error("Invalid registry: {0}")]
    InvalidRegistry(String),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        let errors = [
            ProjectError::GeneratorNotFound("basic".into()),
            ProjectError::ProjectNotFound("p1".into()),
            ProjectError::ProjectNotFoundForDirectory(PathBuf::from("/tmp/x")),
            ProjectError::ProjectNameConflict("p1".into()),
            ProjectError::GeneratorFailed { name: "basic".into(), code: Some(2) },
            ProjectError::InvalidRegistry("bad".into()),
        ];
        for err in errors {
            assert!(!err.to_string().contains('\n'));
        }
    }

    #[test]
    fn test_generator_failed_message() {
        let err = ProjectError::GeneratorFailed { name: "basic".into(), code: Some(3) };
        assert_eq!(err.to_string(), "Generator 'basic' failed (exit status 3)");

        let err = ProjectError::GeneratorFailed { name: "basic".into(), code: None };
        assert_eq!(err.to_string(), "Generator 'basic' failed (terminated by signal)");
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ProjectError::ProjectNotFound("p1".into()).into();
        assert_eq!(
            err.downcast_ref::<ProjectError>(),
            Some(&ProjectError::ProjectNotFound("p1".into()))
        );
    }
}
