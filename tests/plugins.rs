use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reporocket_lib::core::error::{LauncherError, LauncherResult};
use reporocket_lib::core::plugins::{Plugin, PluginRegistry};
use reporocket_lib::core::state::AppState;
use tempfile::TempDir;

struct Recorder {
    calls: Arc<AtomicUsize>,
}

impl Plugin for Recorder {
    fn init_plugin(&mut self, _host: &mut AppState) -> LauncherResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct EnablesEmulation;

impl Plugin for EnablesEmulation {
    fn init_plugin(&mut self, host: &mut AppState) -> LauncherResult<()> {
        host.settings.enable_emulation = Some(true);
        host.save_settings()
    }
}

struct Broken;

impl Plugin for Broken {
    fn init_plugin(&mut self, _host: &mut AppState) -> LauncherResult<()> {
        Err(LauncherError::Other("missing dependency".into()))
    }
}

fn plugin_folder(state: &AppState, name: &str, entry: &str) {
    let dir = state.paths.plugins_dir().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(entry), "").unwrap();
}

#[test]
fn failing_plugin_does_not_stop_siblings() {
    let tmp = TempDir::new().unwrap();
    let mut state = AppState::load(tmp.path()).unwrap();
    plugin_folder(&state, "a_recorder", "base.toml");
    plugin_folder(&state, "b_broken", "base.rs");
    plugin_folder(&state, "c_emulation", "base.json");
    // no entry file: not a plugin
    std::fs::create_dir_all(state.paths.plugins_dir().join("d_assets")).unwrap();
    // entry file but nothing registered for it
    plugin_folder(&state, "e_not_compiled_in", "base.py");

    let calls = Arc::new(AtomicUsize::new(0));
    let recorder_calls = calls.clone();
    let mut registry = PluginRegistry::new();
    registry
        .register("a_recorder", move || {
            Box::new(Recorder {
                calls: recorder_calls.clone(),
            }) as Box<dyn Plugin>
        })
        .register("b_broken", || Box::new(Broken) as Box<dyn Plugin>)
        .register("c_emulation", || Box::new(EnablesEmulation) as Box<dyn Plugin>);
    state.set_plugin_registry(registry);

    let report = state.load_plugins();
    assert_eq!(report.loaded, vec!["a_recorder", "c_emulation"]);
    assert_eq!(report.skipped, vec!["e_not_compiled_in"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        LauncherError::PluginLoad { plugin, .. } if plugin == "b_broken"
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.settings.enable_emulation, Some(true));

    let entries = state.error_log.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].error.contains("b_broken"));

    // a second pass does not re-run anything
    let again = state.load_plugins();
    assert!(again.loaded.is_empty() && again.skipped.is_empty() && again.failures.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn plugin_changes_to_state_are_persisted() {
    let tmp = TempDir::new().unwrap();
    let mut state = AppState::load(tmp.path()).unwrap();
    plugin_folder(&state, "emulation", "base.toml");

    let mut registry = PluginRegistry::new();
    registry.register("emulation", || Box::new(EnablesEmulation) as Box<dyn Plugin>);
    state.set_plugin_registry(registry);
    state.load_plugins();

    let reloaded = AppState::load(tmp.path()).unwrap();
    assert_eq!(reloaded.settings.enable_emulation, Some(true));
}

#[test]
fn unregistered_plugin_folders_are_not_logged_as_errors() {
    let tmp = TempDir::new().unwrap();
    let mut state = AppState::load(tmp.path()).unwrap();
    plugin_folder(&state, "community_theme_pack", "base.py");

    let report = state.load_plugins();
    assert!(report.failures.is_empty());
    assert_eq!(report.skipped, vec!["community_theme_pack"]);
    assert!(state.error_log.entries().is_empty());
}
