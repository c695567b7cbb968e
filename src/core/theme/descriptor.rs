use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::core::error::{LauncherError, LauncherResult};

pub const THEME_FILE: &str = "theme.yaml";

/// A recognized theme key, or any other CSS property passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeProperty {
    PanelBackground,
    MainBackground,
    TextColor,
    ButtonColor,
    ButtonHoverColor,
    FontFamily,
    Passthrough(String),
}

impl ThemeProperty {
    pub fn from_key(key: &str) -> Self {
        match key {
            "panel-background" => Self::PanelBackground,
            "main-background" => Self::MainBackground,
            "text-color" => Self::TextColor,
            "button-color" => Self::ButtonColor,
            "button-hover-color" => Self::ButtonHoverColor,
            "font-family" => Self::FontFamily,
            other => Self::Passthrough(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::PanelBackground => "panel-background",
            Self::MainBackground => "main-background",
            Self::TextColor => "text-color",
            Self::ButtonColor => "button-color",
            Self::ButtonHoverColor => "button-hover-color",
            Self::FontFamily => "font-family",
            Self::Passthrough(key) => key,
        }
    }
}

/// Parsed `themes/<name>/theme.yaml`, entries kept in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub name: String,
    pub folder: PathBuf,
    pub entries: Vec<(ThemeProperty, String)>,
}

impl ThemeDescriptor {
    pub fn load(themes_dir: &Path, name: &str) -> LauncherResult<Self> {
        let folder = themes_dir.join(name);
        let file = folder.join(THEME_FILE);
        if !file.is_file() {
            return Err(LauncherError::ThemeFileMissing(file));
        }

        let text = std::fs::read_to_string(&file).map_err(|source| LauncherError::Io {
            path: file.clone(),
            source,
        })?;
        Self::from_yaml(name, folder, &text)
    }

    pub fn from_yaml(name: &str, folder: PathBuf, text: &str) -> LauncherResult<Self> {
        let document: Value = serde_yaml::from_str(text)
            .map_err(|e| LauncherError::ThemeLoad(format!("{name}/{THEME_FILE}: {e}")))?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => Default::default(),
            _ => {
                return Err(LauncherError::ThemeLoad(format!(
                    "{name}/{THEME_FILE} must be a mapping of property: value"
                )))
            }
        };

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = scalar_to_string(&key).ok_or_else(|| {
                LauncherError::ThemeLoad(format!("{name}: theme keys must be scalars"))
            })?;
            let value = scalar_to_string(&value).ok_or_else(|| {
                LauncherError::ThemeLoad(format!("{name}: value of {key} must be a scalar"))
            })?;
            entries.push((ThemeProperty::from_key(&key), value));
        }

        Ok(Self {
            name: name.to_string(),
            folder,
            entries,
        })
    }

    /// Font file referenced by `font-family`, resolved against the theme folder.
    pub fn font_path(&self) -> Option<PathBuf> {
        self.entries
            .iter()
            .find(|(property, _)| *property == ThemeProperty::FontFamily)
            .map(|(_, value)| self.folder.join(value))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
