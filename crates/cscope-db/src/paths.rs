//! Standard paths and path normalization

use std::path::{Component, Path, PathBuf};

/// Standard cscope-db directories
pub struct Paths {
    /// Config directory (~/.config/cscope-db)
    pub config: PathBuf,
    /// Data directory (~/.local/share/cscope-db)
    pub data: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("cscope-db");

        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("cscope-db");

        Self { config, data }
    }

    /// Default location of the config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.yaml")
    }

    /// Default generator script directory
    pub fn generators(&self) -> PathBuf {
        self.config.join("generators")
    }

    /// Default registry document
    pub fn registry(&self) -> PathBuf {
        self.data.join("projects.json")
    }

    /// Default parent of per-project index directories
    pub fn indexes(&self) -> PathBuf {
        self.data.join("indexes")
    }
}

/// Normalize `path` to an absolute, canonical form.
///
/// Relative paths are joined onto `cwd`. `.` and `..` are folded lexically, then
/// the longest existing ancestor is canonicalized (resolving symlinks) and the
/// missing tail is re-appended, so the result is stable for locations that do
/// not exist yet.
pub fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let lexical = fold_components(&absolute);

    let mut existing = lexical.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in tail.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
}

fn fold_components(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other.as_os_str()),
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::new();
        assert!(paths.config_file().ends_with("cscope-db/config.yaml"));
        assert!(paths.generators().ends_with("cscope-db/generators"));
        assert!(paths.registry().ends_with("cscope-db/projects.json"));
        assert!(paths.indexes().ends_with("cscope-db/indexes"));
    }

    #[test]
    fn test_fold_components() {
        assert_eq!(
            fold_components(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(fold_components(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_relative_joins_cwd() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().canonicalize().unwrap();

        let normalized = normalize(Path::new("out"), &cwd);
        assert_eq!(normalized, cwd.join("out"));
    }

    #[test]
    fn test_normalize_equal_spellings_of_missing_dir() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        fs::create_dir_all(base.join("a")).unwrap();

        let one = normalize(&base.join("a/../a/out"), Path::new("/"));
        let two = normalize(&base.join("a/./out/"), Path::new("/"));
        assert_eq!(one, two);
        assert!(one.is_absolute());
        assert!(one.ends_with("a/out"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_resolves_symlinks() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        let link = temp.path().join("link");
        fs::create_dir_all(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(
            normalize(&link.join("out"), Path::new("/")),
            normalize(&real.join("out"), Path::new("/"))
        );
    }
}
