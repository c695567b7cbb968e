use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error_log::ErrorLog;
use super::persist::{load_json_or_default, write_json_pretty};
use super::settings::LauncherSettings;
use crate::core::downloader::ArchiveFetcher;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::package::{PackageInstaller, PackageManager};
use crate::core::paths::LauncherPaths;
use crate::core::plugins::{PluginHost, PluginRegistry, PluginReport};
use crate::core::tasks::InstallTasks;
use crate::core::theme::{Stylesheet, ThemeApplier};

/// Everything the launcher keeps between operations. Loaded once at
/// startup, written back whenever config or settings change.
pub struct AppState {
    pub paths: LauncherPaths,
    pub http_client: Client,
    pub config: AppConfig,
    pub settings: LauncherSettings,
    pub error_log: ErrorLog,
    pub themes: ThemeApplier,
    pub tasks: InstallTasks,
    pub plugins: PluginHost,
}

impl AppState {
    /// Prepare the working root and read persisted state from it.
    ///
    /// Corrupt JSON and a theme that fails to apply are recorded in the
    /// error log and replaced by defaults; only IO failures on the root
    /// itself are returned.
    pub fn load(root: impl Into<PathBuf>) -> LauncherResult<Self> {
        let paths = LauncherPaths::new(root);
        paths.ensure_structure()?;

        let error_log = ErrorLog::new(paths.error_log_path());
        error_log.ensure_exists()?;

        let config = load_json_or_default::<AppConfig>(&paths.config_path())?;
        if let Some(e) = &config.recovered {
            error_log.record("Error reading config.json", e);
        }
        let settings = load_json_or_default::<LauncherSettings>(&paths.settings_path())?;
        if let Some(e) = &settings.recovered {
            error_log.record("Error reading settings.json", e);
        }

        let mut state = Self {
            themes: ThemeApplier::new(paths.themes_dir()),
            http_client: build_http_client()?,
            config: config.value,
            settings: settings.value,
            error_log,
            tasks: InstallTasks::default(),
            plugins: PluginHost::default(),
            paths,
        };

        let saved_theme = state.settings.theme.clone();
        if let Err(e) = state.themes.change_theme(&saved_theme) {
            state.record_error("Error applying theme", &e);
        }

        info!("Launcher state loaded from {:?}", state.paths.root());
        Ok(state)
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn save_config(&self) -> LauncherResult<()> {
        write_json_pretty(&self.paths.config_path(), &self.config)
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        write_json_pretty(&self.paths.settings_path(), &self.settings)
    }

    pub fn record_error(&self, context: &str, err: &LauncherError) {
        self.error_log.record(context, err);
    }

    /// Apply `name` and remember it. A failure keeps the previous theme
    /// and the previous setting, and is logged once.
    pub fn change_theme(&mut self, name: &str) -> LauncherResult<Stylesheet> {
        let stylesheet = match self.themes.change_theme(name) {
            Ok(stylesheet) => stylesheet.clone(),
            Err(e) => {
                self.record_error("Error applying theme", &e);
                return Err(e);
            }
        };

        self.settings.theme = name.to_string();
        self.save_settings()?;
        Ok(stylesheet)
    }

    /// Swap in the plugin table the embedding binary built.
    pub fn set_plugin_registry(&mut self, registry: PluginRegistry) {
        self.plugins = PluginHost::new(registry);
    }

    /// Run every plugin under `plugins/` that has not been attempted yet.
    /// Plugins receive the whole state, so the host is taken out while they
    /// run.
    pub fn load_plugins(&mut self) -> PluginReport {
        let mut host = std::mem::take(&mut self.plugins);
        let plugins_root = self.paths.plugins_dir();
        let report = host.load_all(&plugins_root, self);
        self.plugins = host;

        for failure in &report.failures {
            self.record_error("Error loading plugin", failure);
        }
        if !report.failures.is_empty() {
            warn!("{} plugin(s) failed to load", report.failures.len());
        }
        report
    }

    pub fn fetcher(&self) -> ArchiveFetcher {
        ArchiveFetcher::new(self.http_client.clone(), self.paths.applications_dir())
    }

    pub fn installer(&self) -> PackageInstaller {
        PackageInstaller::new(self.paths.applications_dir())
    }

    pub fn package_manager(&self) -> PackageManager {
        PackageManager::new(self.paths.applications_dir())
    }
}
