use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::persist::write_json_pretty;
use crate::core::error::LauncherResult;

/// One record in `errorlogs.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorLogEntry {
    pub error: String,
    pub traceback: String,
}

/// Append-only error log. Nothing in the launcher reads it back at runtime;
/// it exists for bug reports.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create the log as an empty array if it does not exist yet.
    pub fn ensure_exists(&self) -> LauncherResult<()> {
        if !self.path.exists() {
            write_json_pretty(&self.path, &Vec::<ErrorLogEntry>::new())?;
        }
        Ok(())
    }

    /// Current entries. An unreadable or malformed log reads as empty.
    pub fn entries(&self) -> Vec<ErrorLogEntry> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn append(&self, entry: ErrorLogEntry) -> LauncherResult<()> {
        let mut entries = self.entries();
        entries.push(entry);
        write_json_pretty(&self.path, &entries)
    }

    /// Log `err` under `context` and persist it. Never fails: a log that
    /// cannot be written is only reported through tracing.
    pub fn record(&self, context: &str, err: &(dyn std::error::Error + 'static)) {
        let message = format!("{context}: {err}");
        error!("{}", message);

        let entry = ErrorLogEntry {
            error: message,
            traceback: traceback(err),
        };
        if let Err(e) = self.append(entry) {
            warn!("Could not write error log {:?}: {}", self.path, e);
        }
    }
}

/// Render the error's cause chain, outermost first.
pub fn traceback(err: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
