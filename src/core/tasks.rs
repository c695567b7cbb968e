// ─── Install Tasks ───
// fetch -> install -> locate, at most one run per package name.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::core::downloader::{ArchiveFetcher, FetchProgress, RemoteAsset};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::package::installer::{ExtractProgress, PackageInstaller};
use crate::core::package::locator::locate;
use crate::core::package::model::{ExecutableCandidate, InstalledPackage};

/// Names with a download or install in flight.
#[derive(Debug, Clone, Default)]
pub struct InstallTasks {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl InstallTasks {
    /// Claim `package_name` until the returned guard is dropped.
    pub fn try_begin(&self, package_name: &str) -> LauncherResult<TaskGuard> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if !in_flight.insert(package_name.to_string()) {
            return Err(LauncherError::PackageBusy(package_name.to_string()));
        }
        Ok(TaskGuard {
            tasks: self.clone(),
            package_name: package_name.to_string(),
        })
    }

    pub fn is_busy(&self, package_name: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(package_name)
    }
}

#[derive(Debug)]
pub struct TaskGuard {
    tasks: InstallTasks,
    package_name: String,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tasks
            .in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&self.package_name);
    }
}

/// Progress reported to the front end, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum InstallEvent {
    Downloading(FetchProgress),
    Extracting(ExtractProgress),
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub package: InstalledPackage,
    pub candidates: Vec<ExecutableCandidate>,
}

/// Download `asset` and install it as `package_name`. Never writes the
/// config; choosing an executable is a separate step.
pub async fn download_and_install(
    fetcher: ArchiveFetcher,
    installer: PackageInstaller,
    guard: TaskGuard,
    asset: RemoteAsset,
    events: UnboundedSender<InstallEvent>,
) -> LauncherResult<InstallOutcome> {
    let package_name = guard.package_name.clone();

    let download_events = events.clone();
    let local_path = fetcher
        .fetch(&asset, &package_name, |progress| {
            let _ = download_events.send(InstallEvent::Downloading(progress));
        })
        .await?;
    debug!("Fetched {:?}", local_path);

    let outcome = tokio::task::spawn_blocking(move || -> LauncherResult<InstallOutcome> {
        let package = installer.install(&local_path, &package_name, |progress| {
            let _ = events.send(InstallEvent::Extracting(progress));
        })?;
        let candidates = locate(&package.install_root);
        Ok(InstallOutcome {
            package,
            candidates,
        })
    })
    .await
    .map_err(|e| LauncherError::Other(format!("Install task failed: {e}")))??;

    info!(
        "{} ready with {} executable candidate(s)",
        outcome.package.name,
        outcome.candidates.len()
    );
    drop(guard);
    Ok(outcome)
}
