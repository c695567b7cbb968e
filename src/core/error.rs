use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("{service} API error: {message}")]
    Api { service: String, message: String },

    // ── Archive ─────────────────────────────────────────
    #[error("Corrupt archive {path:?}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    // ── Themes ──────────────────────────────────────────
    #[error("Theme file not found: {0:?}")]
    ThemeFileMissing(PathBuf),

    #[error("Failed to load theme: {0}")]
    ThemeLoad(String),

    // ── Plugins ─────────────────────────────────────────
    #[error("Failed loading plugin {plugin}: {reason}")]
    PluginLoad { plugin: String, reason: String },

    // ── Persisted state ─────────────────────────────────
    #[error("Malformed JSON in {path:?}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Library ─────────────────────────────────────────
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Package {0} already has a download or install in progress")]
    PackageBusy(String),

    #[error("No executable configured for {0}")]
    ExecutableNotConfigured(String),

    #[error("Failed to launch {path:?}")]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is an OS permission denial. `launch_app` logs a
    /// hint to pick a different executable when it is.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            LauncherError::Io { source, .. } | LauncherError::Launch { source, .. } => {
                source.kind() == std::io::ErrorKind::PermissionDenied
                    || matches!(source.raw_os_error(), Some(5))
            }
            _ => false,
        }
    }
}

// Front ends receive errors as plain messages.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_detected_for_launch_errors() {
        let err = LauncherError::Launch {
            path: PathBuf::from("game.exe"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());

        let other = LauncherError::PackageNotFound("thing".into());
        assert!(!other.is_permission_denied());
    }

    #[test]
    fn io_cause_is_reported_once_in_the_chain() {
        let err = LauncherError::io(
            "saves/reporocket/config.json",
            std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
        );
        let chain = crate::core::state::error_log::traceback(&err);
        assert_eq!(chain.matches("disk on fire").count(), 1);
        assert!(chain.starts_with("IO error at \"saves/reporocket/config.json\""));
    }

    #[test]
    fn serializes_as_display_message() {
        let err = LauncherError::PackageBusy("thing".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            "\"Package thing already has a download or install in progress\""
        );
    }
}
