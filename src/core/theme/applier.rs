use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::descriptor::{ThemeDescriptor, THEME_FILE};
use super::font::{FileFontLoader, FontLoader};
use super::stylesheet::{build_stylesheet, default_dark, Stylesheet};
use super::DEFAULT_THEME;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::package::installer::extract_archive;

/// The theme currently in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTheme {
    pub name: String,
    pub stylesheet: Stylesheet,
}

/// Owns the active-theme slot. A theme either applies completely or the
/// previous one stays.
pub struct ThemeApplier {
    themes_dir: PathBuf,
    font_loader: Box<dyn FontLoader>,
    active: ActiveTheme,
}

impl ThemeApplier {
    pub fn new(themes_dir: PathBuf) -> Self {
        Self {
            themes_dir,
            font_loader: Box::new(FileFontLoader),
            active: ActiveTheme {
                name: DEFAULT_THEME.to_string(),
                stylesheet: default_dark(),
            },
        }
    }

    pub fn with_font_loader(mut self, font_loader: Box<dyn FontLoader>) -> Self {
        self.font_loader = font_loader;
        self
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn active(&self) -> &ActiveTheme {
        &self.active
    }

    /// Resolve the font (the only side effect) and build the rules without
    /// touching the active slot.
    pub fn render(&self, descriptor: &ThemeDescriptor) -> LauncherResult<Stylesheet> {
        let font_family = match descriptor.font_path() {
            Some(font_path) => Some(self.font_loader.load_font(&font_path).map_err(|e| {
                let reason = match &e {
                    LauncherError::Io { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                LauncherError::ThemeLoad(format!("Failed to load font {:?}: {reason}", font_path))
            })?),
            None => None,
        };
        Ok(build_stylesheet(descriptor, font_family.as_deref()))
    }

    /// Render `descriptor` and make it the active theme.
    pub fn apply(&mut self, descriptor: &ThemeDescriptor) -> LauncherResult<&Stylesheet> {
        let stylesheet = self.render(descriptor)?;
        debug!(
            "Theme {} produced {} rules",
            descriptor.name,
            stylesheet.rules.len()
        );
        self.active = ActiveTheme {
            name: descriptor.name.clone(),
            stylesheet,
        };
        Ok(&self.active.stylesheet)
    }

    /// Switch to the theme called `name`. The built-in theme needs no file.
    pub fn change_theme(&mut self, name: &str) -> LauncherResult<&Stylesheet> {
        if name == DEFAULT_THEME {
            self.active = ActiveTheme {
                name: DEFAULT_THEME.to_string(),
                stylesheet: default_dark(),
            };
            return Ok(&self.active.stylesheet);
        }

        let descriptor = ThemeDescriptor::load(&self.themes_dir, name)?;
        let stylesheet = self.apply(&descriptor)?;
        info!("Applied theme {}", name);
        Ok(stylesheet)
    }

    /// Built-in theme first, then every folder holding a `theme.yaml`.
    pub fn list_themes(&self) -> LauncherResult<Vec<String>> {
        let mut themes = Vec::new();
        if self.themes_dir.exists() {
            let entries =
                std::fs::read_dir(&self.themes_dir).map_err(|source| LauncherError::Io {
                    path: self.themes_dir.clone(),
                    source,
                })?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.join(THEME_FILE).is_file() {
                    themes.push(entry.file_name().to_string_lossy().to_string());
                }
            }
        }
        themes.sort();
        themes.insert(0, DEFAULT_THEME.to_string());
        Ok(themes)
    }

    /// Unpack a `.rrct` theme bundle (a zip) into `themes/<file stem>/`.
    pub fn import_rrct(&self, bundle: &Path) -> LauncherResult<String> {
        let name = bundle
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| LauncherError::Other(format!("No theme name in {:?}", bundle)))?;

        let folder = self.themes_dir.join(&name);
        extract_archive(bundle, &folder, |_| {})?;
        info!("Imported theme {} into {:?}", name, folder);
        Ok(name)
    }
}
