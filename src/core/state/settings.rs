use serde::{Deserialize, Serialize};

use crate::core::sources::RepoSourceKind;
use crate::core::theme::DEFAULT_THEME;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WindowMode {
    #[default]
    Windowed,
    Fullscreen,
}

/// UI preferences persisted in `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherSettings {
    pub theme: String,
    pub fullscreen: WindowMode,
    pub repo_source: RepoSourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_emulation: Option<bool>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            fullscreen: WindowMode::Windowed,
            repo_source: RepoSourceKind::GitHub,
            enable_emulation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_display_names_on_disk() {
        let settings = LauncherSettings {
            theme: "Neon".into(),
            fullscreen: WindowMode::Fullscreen,
            repo_source: RepoSourceKind::InternetArchive,
            enable_emulation: Some(true),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "theme": "Neon",
                "fullscreen": "Fullscreen",
                "repo_source": "Internet Archive",
                "enable_emulation": true
            })
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: LauncherSettings = serde_json::from_str(r#"{"repo_source":"GitLab"}"#).unwrap();
        assert_eq!(settings.theme, DEFAULT_THEME);
        assert_eq!(settings.fullscreen, WindowMode::Windowed);
        assert_eq!(settings.repo_source, RepoSourceKind::GitLab);
        assert_eq!(settings.enable_emulation, None);
    }
}
