use std::path::{Path, PathBuf};
use std::process::{Child, Command};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::validate_package_name;

/// Manages installed packages on disk.
pub struct PackageManager {
    applications_dir: PathBuf,
}

impl PackageManager {
    pub fn new(applications_dir: PathBuf) -> Self {
        Self { applications_dir }
    }

    /// Installed package names, sorted.
    pub async fn list(&self) -> LauncherResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.applications_dir.exists() {
            return Ok(names);
        }

        let mut entries = tokio::fs::read_dir(&self.applications_dir)
            .await
            .map_err(|e| LauncherError::Io {
                path: self.applications_dir.clone(),
                source: e,
            })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| LauncherError::Io {
            path: self.applications_dir.clone(),
            source: e,
        })? {
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove `applications/<name>/` and everything in it.
    pub async fn delete(&self, package_name: &str) -> LauncherResult<()> {
        validate_package_name(package_name)?;
        let package_dir = self.applications_dir.join(package_name);
        if !package_dir.exists() {
            return Err(LauncherError::PackageNotFound(package_name.to_string()));
        }

        tokio::fs::remove_dir_all(&package_dir)
            .await
            .map_err(|e| LauncherError::Io {
                path: package_dir,
                source: e,
            })?;

        info!("Deleted package {}", package_name);
        Ok(())
    }

    /// Start `executable` from its own directory. The child is not waited on.
    pub fn launch(&self, package_name: &str, executable: &Path) -> LauncherResult<Child> {
        if !executable.is_file() && !executable.is_dir() {
            return Err(LauncherError::ExecutableNotConfigured(
                package_name.to_string(),
            ));
        }

        let mut cmd = launch_command(executable);
        if let Some(parent) = executable.parent().filter(|p| !p.as_os_str().is_empty()) {
            cmd.current_dir(parent);
        }
        configure_platform_spawn(&mut cmd);

        debug!("Command (copy/paste): {}", format_command_for_logs(&cmd));
        let child = cmd.spawn().map_err(|source| {
            warn!("Could not start {:?}: {}", executable, source);
            LauncherError::Launch {
                path: executable.to_path_buf(),
                source,
            }
        })?;

        info!("Launched {} (pid {})", package_name, child.id());
        Ok(child)
    }
}

/// Scripts and bundles go through the platform's interpreter or opener;
/// anything else is run directly.
fn launch_command(executable: &Path) -> Command {
    let file_name = executable
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if cfg!(target_os = "windows") && file_name.ends_with(".bat") {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(executable);
        cmd
    } else if cfg!(target_os = "macos") && file_name.ends_with(".app") {
        let mut cmd = Command::new("open");
        cmd.arg(executable);
        cmd
    } else if !cfg!(target_os = "windows") && file_name.ends_with(".sh") {
        let mut cmd = Command::new("sh");
        cmd.arg(executable);
        cmd
    } else {
        Command::new(executable)
    }
}

fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NEW_CONSOLE: u32 = 0x00000010;
        cmd.creation_flags(CREATE_NEW_CONSOLE);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

fn format_command_for_logs(cmd: &Command) -> String {
    let program = shell_escape(&cmd.get_program().to_string_lossy());
    let args = cmd
        .get_args()
        .map(|arg| shell_escape(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
