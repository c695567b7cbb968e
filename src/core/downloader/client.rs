use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::validate_package_name;

/// Bytes written per progress step.
pub const CHUNK_SIZE: usize = 1024;

const DEFAULT_FILE_NAME: &str = "download";

/// A resolved download target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteAsset {
    pub url: String,
    pub suggested_file_name: String,
}

impl RemoteAsset {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let suggested_file_name = file_name_from_url(&url);
        Self {
            url,
            suggested_file_name,
        }
    }

    /// Library name used when the caller has none: the file name without
    /// its last extension (`thing.zip` -> `thing`).
    pub fn default_package_name(&self) -> String {
        Path::new(&self.suggested_file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| self.suggested_file_name.clone())
    }
}

/// Cumulative progress of a single fetch. `total_bytes` is zero when the
/// server did not report a content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchProgress {
    pub bytes_written: u64,
    pub total_bytes: u64,
}

impl FetchProgress {
    pub fn is_indeterminate(&self) -> bool {
        self.total_bytes == 0
    }
}

/// Streams release assets into `applications/<package>/`.
pub struct ArchiveFetcher {
    client: Client,
    applications_dir: PathBuf,
}

impl ArchiveFetcher {
    pub fn new(client: Client, applications_dir: PathBuf) -> Self {
        Self {
            client,
            applications_dir,
        }
    }

    /// Download `asset` to `applications/<package_name>/<file name>`.
    ///
    /// `on_progress` is called after every chunk with the cumulative byte
    /// count. There is no retry; a failed fetch may leave a partial file.
    pub async fn fetch<F>(
        &self,
        asset: &RemoteAsset,
        package_name: &str,
        mut on_progress: F,
    ) -> LauncherResult<PathBuf>
    where
        F: FnMut(FetchProgress),
    {
        validate_package_name(package_name)?;

        let dest_dir = self.applications_dir.join(package_name);
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|source| LauncherError::Io {
                path: dest_dir.clone(),
                source,
            })?;
        let dest = dest_dir.join(&asset.suggested_file_name);

        info!("Downloading {} -> {:?}", asset.url, dest);
        let response = self.client.get(&asset.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: asset.url.clone(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length().unwrap_or(0);
        let mut bytes_written = 0_u64;

        // Scoped so the handle is closed before the installer reopens the file.
        {
            let mut file =
                tokio::fs::File::create(&dest)
                    .await
                    .map_err(|source| LauncherError::Io {
                        path: dest.clone(),
                        source,
                    })?;

            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                for piece in chunk.chunks(CHUNK_SIZE) {
                    file.write_all(piece)
                        .await
                        .map_err(|source| LauncherError::Io {
                            path: dest.clone(),
                            source,
                        })?;
                    bytes_written += piece.len() as u64;
                    on_progress(FetchProgress {
                        bytes_written,
                        total_bytes,
                    });
                }
            }

            file.flush().await.map_err(|source| LauncherError::Io {
                path: dest.clone(),
                source,
            })?;
        }

        debug!("Downloaded {} bytes from {}", bytes_written, asset.url);
        Ok(dest)
    }
}

/// Final `/`-delimited segment of the URL path.
fn file_name_from_url(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => DEFAULT_FILE_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_path_segment() {
        let asset = RemoteAsset::new("https://example.com/releases/v1/thing.zip");
        assert_eq!(asset.suggested_file_name, "thing.zip");
        assert_eq!(asset.default_package_name(), "thing");
    }

    #[test]
    fn query_string_is_not_part_of_file_name() {
        let asset = RemoteAsset::new("https://example.com/dl/game.exe?token=abc#frag");
        assert_eq!(asset.suggested_file_name, "game.exe");
    }

    #[test]
    fn trailing_slash_falls_back_to_default_name() {
        let asset = RemoteAsset::new("https://example.com/dl/");
        assert_eq!(asset.suggested_file_name, "download");
        assert_eq!(asset.default_package_name(), "download");
    }

    #[test]
    fn unparseable_urls_still_yield_a_name() {
        let asset = RemoteAsset::new("not a url/with/file.bin?x=1");
        assert_eq!(asset.suggested_file_name, "file.bin");
    }

    #[test]
    fn zero_total_means_indeterminate() {
        let progress = FetchProgress {
            bytes_written: 10,
            total_bytes: 0,
        };
        assert!(progress.is_indeterminate());
    }
}
