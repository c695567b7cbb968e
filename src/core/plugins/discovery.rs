use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

/// Entry files are `base.<anything>`.
pub const ENTRY_STEM: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    pub folder_name: String,
    pub entry_module_path: PathBuf,
}

impl DiscoveredPlugin {
    /// Namespace the entry module is isolated under.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.folder_name, ENTRY_STEM)
    }
}

/// Immediate subdirectories of `plugins_root` that contain an entry file,
/// sorted by folder name. A missing root has no plugins.
pub fn discover(plugins_root: &Path) -> LauncherResult<Vec<DiscoveredPlugin>> {
    if !plugins_root.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(plugins_root).map_err(|source| LauncherError::Io {
        path: plugins_root.to_path_buf(),
        source,
    })?;

    let mut plugins = Vec::new();
    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        let Some(entry_module_path) = find_entry_file(&folder) else {
            continue;
        };
        plugins.push(DiscoveredPlugin {
            folder_name: entry.file_name().to_string_lossy().to_string(),
            entry_module_path,
        });
    }

    plugins.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    Ok(plugins)
}

fn find_entry_file(folder: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(folder)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_stem().is_some_and(|stem| stem == ENTRY_STEM))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn only_folders_with_entry_file_are_plugins() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for dir in ["beta", "alpha", "empty", "wrong"] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        std::fs::write(root.join("alpha/base.toml"), "").unwrap();
        std::fs::write(root.join("beta/base.rs"), "").unwrap();
        std::fs::write(root.join("wrong/main.rs"), "").unwrap();
        std::fs::write(root.join("base.toml"), "").unwrap();

        let found = discover(root).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.folder_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(found[0].namespace(), "alpha.base");
        assert!(found[1].entry_module_path.ends_with("beta/base.rs"));
    }

    #[test]
    fn missing_root_has_no_plugins() {
        let tmp = TempDir::new().unwrap();
        assert!(discover(&tmp.path().join("plugins")).unwrap().is_empty());
    }
}
