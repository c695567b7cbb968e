// ─── Commands ───
// Front-end entry points. Every failure is written to the error log here
// and handed back to the caller as a LauncherError.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::artwork::{ArtworkClient, GameMatch, GridImage};
use crate::core::downloader::RemoteAsset;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::package::{locate, ExecutableCandidate};
use crate::core::paths::validate_package_name;
use crate::core::plugins::PluginRegistry;
use crate::core::saves;
use crate::core::sources::{Release, RepoSourceKind, RepoSummary, Source};
use crate::core::state::{AppState, ErrorLog, LauncherSettings, WindowMode};
use crate::core::tasks::{self, InstallEvent, InstallOutcome};
use crate::core::theme::Stylesheet;

pub type SharedState = Arc<Mutex<AppState>>;

/// One row of the library view.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    pub name: String,
    pub executable: Option<PathBuf>,
    pub cloud_save_location: Option<PathBuf>,
    pub artwork: Option<PathBuf>,
}

fn recorded<T>(log: &ErrorLog, context: &str, result: LauncherResult<T>) -> LauncherResult<T> {
    result.map_err(|e| {
        log.record(context, &e);
        e
    })
}

async fn error_log(state: &SharedState) -> ErrorLog {
    state.lock().await.error_log.clone()
}

/// Load the working root, then run every registered plugin once.
pub async fn startup(root: PathBuf, registry: PluginRegistry) -> LauncherResult<SharedState> {
    let mut state = AppState::load(root)?;
    state.set_plugin_registry(registry);
    let report = state.load_plugins();
    info!(
        "Startup complete: {} plugin(s) loaded, {} failed",
        report.loaded.len(),
        report.failures.len()
    );
    Ok(Arc::new(Mutex::new(state)))
}

// ─── Remote search ───

async fn source_for(state: &SharedState, kind: Option<RepoSourceKind>) -> (Source, ErrorLog) {
    let state = state.lock().await;
    let kind = kind.unwrap_or(state.settings.repo_source);
    (
        Source::new(kind, state.http_client.clone()),
        state.error_log.clone(),
    )
}

pub async fn search(
    state: &SharedState,
    kind: Option<RepoSourceKind>,
    query: &str,
) -> LauncherResult<Vec<RepoSummary>> {
    let (source, log) = source_for(state, kind).await;
    recorded(&log, "Error fetching results", source.search(query).await)
}

pub async fn list_releases(
    state: &SharedState,
    kind: Option<RepoSourceKind>,
    repo: &RepoSummary,
) -> LauncherResult<Vec<Release>> {
    let (source, log) = source_for(state, kind).await;
    recorded(&log, "Error fetching releases", source.releases(repo).await)
}

// ─── Download + install ───

/// Fetch `url` into the library as `package_name` (or the URL's file stem).
/// The state lock is released before the download starts.
pub async fn download_and_install(
    state: &SharedState,
    url: &str,
    package_name: Option<String>,
    events: UnboundedSender<InstallEvent>,
) -> LauncherResult<InstallOutcome> {
    let asset = RemoteAsset::new(url);
    let package_name = package_name.unwrap_or_else(|| asset.default_package_name());

    let (log, prepared) = {
        let state = state.lock().await;
        let prepared = validate_package_name(&package_name)
            .and_then(|()| state.tasks.try_begin(&package_name))
            .map(|guard| (state.fetcher(), state.installer(), guard));
        (state.error_log.clone(), prepared)
    };
    let (fetcher, installer, guard) = recorded(&log, "Error during download", prepared)?;

    let outcome = tasks::download_and_install(fetcher, installer, guard, asset, events).await;
    recorded(&log, "Error during download", outcome)
}

// ─── Library ───

pub async fn list_library(state: &SharedState) -> LauncherResult<Vec<LibraryEntry>> {
    let state = state.lock().await;
    let names = recorded(
        &state.error_log,
        "Error reading library",
        state.package_manager().list().await,
    )?;

    Ok(names
        .into_iter()
        .map(|name| {
            let artwork = state.paths.artwork_path(&name);
            LibraryEntry {
                executable: state.config.executable(&name).map(PathBuf::from),
                cloud_save_location: state.config.cloud_save_location(&name).map(PathBuf::from),
                artwork: artwork.is_file().then_some(artwork),
                name,
            }
        })
        .collect())
}

pub async fn locate_executables(
    state: &SharedState,
    package_name: &str,
) -> LauncherResult<Vec<ExecutableCandidate>> {
    let (log, package_dir) = {
        let state = state.lock().await;
        (state.error_log.clone(), state.paths.package_dir(package_name))
    };

    let result = scan_package(package_name, package_dir).await;
    recorded(&log, "Error locating executables", result)
}

async fn scan_package(
    package_name: &str,
    package_dir: PathBuf,
) -> LauncherResult<Vec<ExecutableCandidate>> {
    validate_package_name(package_name)?;
    if !package_dir.is_dir() {
        return Err(LauncherError::PackageNotFound(package_name.to_string()));
    }
    tokio::task::spawn_blocking(move || locate(&package_dir))
        .await
        .map_err(|e| LauncherError::Other(format!("Executable scan failed: {e}")))
}

pub async fn set_executable(
    state: &SharedState,
    package_name: &str,
    executable: PathBuf,
) -> LauncherResult<()> {
    let mut state = state.lock().await;
    let result = store_executable(&mut state, package_name, &executable);
    recorded(&state.error_log, "Error setting executable", result)?;
    info!("Executable for {} set to {:?}", package_name, executable);
    Ok(())
}

fn store_executable(
    state: &mut AppState,
    package_name: &str,
    executable: &std::path::Path,
) -> LauncherResult<()> {
    validate_package_name(package_name)?;
    if !executable.is_file() && !executable.is_dir() {
        return Err(LauncherError::Other(format!(
            "Executable {:?} does not exist",
            executable
        )));
    }
    state
        .config
        .set_executable(package_name, executable.to_path_buf());
    state.save_config()
}

/// Start the configured executable. Returns the child's process id.
pub async fn launch_app(state: &SharedState, package_name: &str) -> LauncherResult<u32> {
    let state = state.lock().await;
    let result = state
        .config
        .executable(package_name)
        .ok_or_else(|| LauncherError::ExecutableNotConfigured(package_name.to_string()))
        .and_then(|executable| state.package_manager().launch(package_name, executable));

    match result {
        Ok(child) => Ok(child.id()),
        Err(e) => {
            state.record_error("Error launching app", &e);
            if e.is_permission_denied() {
                warn!("{} needs a different executable", package_name);
            }
            Err(e)
        }
    }
}

/// Remove the package directory, its config entry and its artwork.
pub async fn delete_app(state: &SharedState, package_name: &str) -> LauncherResult<()> {
    let mut state = state.lock().await;
    let result = match state.package_manager().delete(package_name).await {
        // Already gone from disk; the config entry and artwork still go.
        Err(LauncherError::PackageNotFound(_)) => {
            debug!("No directory to delete for {}", package_name);
            Ok(())
        }
        other => other,
    };
    recorded(&state.error_log, "Error deleting app", result)?;

    if state.config.remove(package_name).is_some() {
        let saved = state.save_config();
        recorded(&state.error_log, "Error deleting app", saved)?;
    }

    let artwork = state.paths.artwork_path(package_name);
    if artwork.is_file() {
        let removed = std::fs::remove_file(&artwork).map_err(|e| LauncherError::io(&artwork, e));
        recorded(&state.error_log, "Error deleting app", removed)?;
    }
    Ok(())
}

// ─── Cloud saves ───

pub async fn set_cloud_save_location(
    state: &SharedState,
    package_name: &str,
    location: PathBuf,
) -> LauncherResult<()> {
    {
        let mut state = state.lock().await;
        let result = validate_package_name(package_name).and_then(|()| {
            state
                .config
                .set_cloud_save_location(package_name, location.clone());
            state.save_config()
        });
        recorded(&state.error_log, "Error setting cloud save location", result)?;
    }
    sync_cloud_save(state, package_name).await
}

pub async fn sync_cloud_save(state: &SharedState, package_name: &str) -> LauncherResult<()> {
    let (log, paths, location) = {
        let state = state.lock().await;
        (
            state.error_log.clone(),
            state.paths.clone(),
            state.config.cloud_save_location(package_name).map(PathBuf::from),
        )
    };

    let package_name = package_name.to_string();
    let result = match location {
        Some(location) => tokio::task::spawn_blocking(move || {
            saves::sync_cloud_save(&paths, &package_name, &location)
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Cloud save sync failed: {e}")))
        .and_then(|synced| synced),
        None => Err(LauncherError::Other(format!(
            "No cloud save location configured for {package_name}"
        ))),
    };
    recorded(&log, "Error syncing cloud save", result)
}

// ─── Themes ───

pub async fn list_themes(state: &SharedState) -> LauncherResult<Vec<String>> {
    let state = state.lock().await;
    recorded(&state.error_log, "Error loading themes", state.themes.list_themes())
}

/// Failures are logged by [`AppState::change_theme`].
pub async fn change_theme(state: &SharedState, name: &str) -> LauncherResult<Stylesheet> {
    state.lock().await.change_theme(name)
}

pub async fn import_theme(state: &SharedState, bundle: PathBuf) -> LauncherResult<String> {
    let state = state.lock().await;
    recorded(
        &state.error_log,
        "Error importing RRCT",
        state.themes.import_rrct(&bundle),
    )
}

// ─── Settings ───

pub async fn settings(state: &SharedState) -> LauncherSettings {
    state.lock().await.settings.clone()
}

pub async fn set_fullscreen(state: &SharedState, mode: WindowMode) -> LauncherResult<()> {
    let mut state = state.lock().await;
    state.settings.fullscreen = mode;
    let saved = state.save_settings();
    recorded(&state.error_log, "Error saving settings", saved)
}

pub async fn set_repo_source(state: &SharedState, kind: RepoSourceKind) -> LauncherResult<()> {
    let mut state = state.lock().await;
    state.settings.repo_source = kind;
    let saved = state.save_settings();
    recorded(&state.error_log, "Error saving settings", saved)
}

/// Write a sample entry so users can check the error log is reachable.
pub async fn record_test_error(state: &SharedState) {
    let log = error_log(state).await;
    log.record(
        "Test error",
        &LauncherError::Other("This is a test error for dumping.".into()),
    );
}

// ─── Artwork ───

async fn artwork_client(state: &SharedState, api_key: &str) -> (ArtworkClient, ErrorLog) {
    let state = state.lock().await;
    (
        ArtworkClient::new(state.http_client.clone(), api_key),
        state.error_log.clone(),
    )
}

pub async fn search_artwork(
    state: &SharedState,
    api_key: &str,
    term: &str,
) -> LauncherResult<Vec<GameMatch>> {
    let (client, log) = artwork_client(state, api_key).await;
    recorded(&log, "Error searching artwork", client.search_games(term).await)
}

pub async fn artwork_grids(
    state: &SharedState,
    api_key: &str,
    game_id: u64,
    page: usize,
) -> LauncherResult<Vec<GridImage>> {
    let (client, log) = artwork_client(state, api_key).await;
    recorded(
        &log,
        "Error loading artwork",
        client.landscape_grids(game_id, page).await,
    )
}

pub async fn apply_artwork(
    state: &SharedState,
    api_key: &str,
    package_name: &str,
    image_url: &str,
) -> LauncherResult<PathBuf> {
    let (client, log) = artwork_client(state, api_key).await;
    let paths = state.lock().await.paths.clone();
    recorded(
        &log,
        "Error downloading artwork",
        client.download(&paths, image_url, package_name).await,
    )
}
