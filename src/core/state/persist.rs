use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

/// A value read from disk, plus the parse error it was recovered from.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub recovered: Option<LauncherError>,
}

/// Read a JSON file, falling back to `T::default()`.
///
/// A missing, empty or malformed file is replaced on disk by the
/// serialized default so the next start reads a well-formed document.
/// Only IO failures are returned as errors.
pub fn load_json_or_default<T>(path: &Path) -> LauncherResult<Loaded<T>>
where
    T: DeserializeOwned + Serialize + Default,
{
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            let value = T::default();
            write_json_pretty(path, &value)?;
            return Ok(Loaded {
                value,
                recovered: None,
            });
        }
        Err(source) => {
            return Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if raw.trim().is_empty() {
        let value = T::default();
        write_json_pretty(path, &value)?;
        return Ok(Loaded {
            value,
            recovered: None,
        });
    }

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Loaded {
            value,
            recovered: None,
        }),
        Err(source) => {
            warn!("Resetting malformed {:?}: {}", path, source);
            let value = T::default();
            write_json_pretty(path, &value)?;
            Ok(Loaded {
                value,
                recovered: Some(LauncherError::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                }),
            })
        }
    }
}

pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, json).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })
}
