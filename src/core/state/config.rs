use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Per-package record in `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfigEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_save_location: Option<PathBuf>,
}

/// `config.json`: package name -> [`AppConfigEntry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AppConfig {
    entries: BTreeMap<String, AppConfigEntry>,
}

impl AppConfig {
    pub fn get(&self, package_name: &str) -> Option<&AppConfigEntry> {
        self.entries.get(package_name)
    }

    pub fn executable(&self, package_name: &str) -> Option<&Path> {
        self.get(package_name)?.executable.as_deref()
    }

    pub fn cloud_save_location(&self, package_name: &str) -> Option<&Path> {
        self.get(package_name)?.cloud_save_location.as_deref()
    }

    pub fn set_executable(&mut self, package_name: &str, executable: PathBuf) {
        self.entry_mut(package_name).executable = Some(executable);
    }

    pub fn set_cloud_save_location(&mut self, package_name: &str, location: PathBuf) {
        self.entry_mut(package_name).cloud_save_location = Some(location);
    }

    pub fn remove(&mut self, package_name: &str) -> Option<AppConfigEntry> {
        self.entries.remove(package_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, package_name: &str) -> &mut AppConfigEntry {
        self.entries.entry(package_name.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_map_without_empty_fields() {
        let mut config = AppConfig::default();
        config.set_executable("thing", PathBuf::from("applications/thing/thing.exe"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "thing": { "executable": "applications/thing/thing.exe" } })
        );
    }

    #[test]
    fn reads_entries_written_by_older_launchers() {
        let raw = r#"{
            "a": { "executable": "x.exe", "cloud_save_location": "/saves/a" },
            "b": {}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.executable("a"), Some(Path::new("x.exe")));
        assert_eq!(config.cloud_save_location("a"), Some(Path::new("/saves/a")));
        assert_eq!(config.executable("b"), None);
        assert_eq!(config.executable("missing"), None);
    }

    #[test]
    fn cloud_save_location_keeps_executable() {
        let mut config = AppConfig::default();
        config.set_executable("thing", PathBuf::from("run.sh"));
        config.set_cloud_save_location("thing", PathBuf::from("/cloud"));
        let entry = config.get("thing").unwrap();
        assert_eq!(entry.executable.as_deref(), Some(Path::new("run.sh")));
        assert_eq!(entry.cloud_save_location.as_deref(), Some(Path::new("/cloud")));

        assert!(config.remove("thing").is_some());
        assert!(config.is_empty());
    }
}
