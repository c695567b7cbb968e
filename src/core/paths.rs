use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

/// Directory under `saves/` that holds the launcher's own state.
pub const LAUNCHER_DIR_NAME: &str = "reporocket";

/// Filesystem layout of a launcher working root.
///
/// ```text
/// <root>/
///   applications/<package>/...
///   saves/reporocket/{settings,config,errorlogs}.json
///   saves/reporocket/artwork/<package>.png
///   saves/<package>/            (cloud save mirror)
///   themes/<theme>/theme.yaml
///   plugins/<plugin>/base.*
/// ```
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.root.join("applications")
    }

    pub fn package_dir(&self, package_name: &str) -> PathBuf {
        self.applications_dir().join(package_name)
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.root.join("saves")
    }

    pub fn launcher_saves_dir(&self) -> PathBuf {
        self.saves_dir().join(LAUNCHER_DIR_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.launcher_saves_dir().join("settings.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.launcher_saves_dir().join("config.json")
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.launcher_saves_dir().join("errorlogs.json")
    }

    pub fn artwork_dir(&self) -> PathBuf {
        self.launcher_saves_dir().join("artwork")
    }

    pub fn artwork_path(&self, package_name: &str) -> PathBuf {
        self.artwork_dir().join(format!("{package_name}.png"))
    }

    pub fn cloud_save_mirror(&self, package_name: &str) -> PathBuf {
        self.saves_dir().join(package_name)
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join("themes")
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    /// Create every directory the launcher expects to exist.
    pub fn ensure_structure(&self) -> LauncherResult<()> {
        for dir in [
            self.applications_dir(),
            self.launcher_saves_dir(),
            self.themes_dir(),
            self.plugins_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| LauncherError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Package names become directory names under `applications/` and
/// `saves/`, so they must be a single plain path component. The launcher's
/// own saves directory name is reserved in any letter case.
pub fn validate_package_name(name: &str) -> LauncherResult<()> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed != name;
    if invalid {
        return Err(LauncherError::Other(format!("Invalid package name: {name:?}")));
    }
    if name.eq_ignore_ascii_case(LAUNCHER_DIR_NAME) {
        return Err(LauncherError::Other(format!(
            "Package name {name:?} is reserved by the launcher"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_names_must_be_single_components() {
        assert!(validate_package_name("thing").is_ok());
        assert!(validate_package_name("My Game 2").is_ok());
        assert!(validate_package_name("").is_err());
        assert!(validate_package_name("..").is_err());
        assert!(validate_package_name("a/b").is_err());
        assert!(validate_package_name(" padded").is_err());
    }

    #[test]
    fn launcher_state_directory_is_not_a_package_name() {
        assert!(validate_package_name("reporocket").is_err());
        assert!(validate_package_name("RepoRocket").is_err());
        assert!(validate_package_name("reporocket2").is_ok());
    }

    #[test]
    fn layout_matches_documented_tree() {
        let paths = LauncherPaths::new("/work");
        assert_eq!(
            paths.package_dir("thing"),
            PathBuf::from("/work/applications/thing")
        );
        assert_eq!(
            paths.config_path(),
            PathBuf::from("/work/saves/reporocket/config.json")
        );
        assert_eq!(
            paths.artwork_path("thing"),
            PathBuf::from("/work/saves/reporocket/artwork/thing.png")
        );
        assert_eq!(
            paths.cloud_save_mirror("thing"),
            PathBuf::from("/work/saves/thing")
        );
    }
}
