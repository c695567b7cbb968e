use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info, warn};

use super::discovery::{discover, DiscoveredPlugin};
use super::{Plugin, PluginFactory};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::AppState;

/// Folder name -> factory table, filled by the embedding binary.
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, folder_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(folder_name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, folder_name: &str) -> bool {
        self.factories.contains_key(folder_name)
    }

    fn instantiate(&self, plugin: &DiscoveredPlugin) -> LauncherResult<Box<dyn Plugin>> {
        let factory = self
            .factories
            .get(&plugin.folder_name)
            .ok_or_else(|| LauncherError::PluginLoad {
                plugin: plugin.folder_name.clone(),
                reason: format!(
                    "no registered module for {} ({:?})",
                    plugin.namespace(),
                    plugin.entry_module_path
                ),
            })?;

        catch_unwind(AssertUnwindSafe(|| factory())).map_err(|payload| {
            LauncherError::PluginLoad {
                plugin: plugin.folder_name.clone(),
                reason: format!(
                    "module panicked while loading: {}",
                    panic_message(payload.as_ref())
                ),
            }
        })
    }
}

/// Outcome of one `load_all` pass. `skipped` lists plugin folders with no
/// module compiled into this binary.
#[derive(Debug, Default)]
pub struct PluginReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<LauncherError>,
}

#[derive(Default)]
pub struct PluginHost {
    registry: PluginRegistry,
    attempted: HashSet<String>,
}

impl PluginHost {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            attempted: HashSet::new(),
        }
    }

    /// Load every discovered plugin not attempted before. One plugin failing
    /// (error or panic) never stops the others, and the call itself cannot
    /// fail.
    pub fn load_all(&mut self, plugins_root: &Path, host: &mut AppState) -> PluginReport {
        let mut report = PluginReport::default();

        let discovered = match discover(plugins_root) {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!("Could not scan plugins in {:?}: {}", plugins_root, e);
                report.failures.push(e);
                return report;
            }
        };

        for plugin in discovered {
            if !self.attempted.insert(plugin.folder_name.clone()) {
                continue;
            }
            if !self.registry.contains(&plugin.folder_name) {
                debug!(
                    "No module registered for plugin folder {}, skipping",
                    plugin.folder_name
                );
                report.skipped.push(plugin.folder_name);
                continue;
            }

            match self.load_one(&plugin, host) {
                Ok(()) => {
                    info!("Loaded plugin {}", plugin.folder_name);
                    report.loaded.push(plugin.folder_name);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(e);
                }
            }
        }

        report
    }

    fn load_one(&self, plugin: &DiscoveredPlugin, host: &mut AppState) -> LauncherResult<()> {
        let mut instance = self.registry.instantiate(plugin)?;

        let outcome = catch_unwind(AssertUnwindSafe(|| instance.init_plugin(host)));
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LauncherError::PluginLoad {
                plugin: plugin.folder_name.clone(),
                reason: e.to_string(),
            }),
            Err(payload) => Err(LauncherError::PluginLoad {
                plugin: plugin.folder_name.clone(),
                reason: format!("init_plugin panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
