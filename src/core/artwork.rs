// ─── Artwork ───
// Cover art from SteamGridDB, stored as saves/reporocket/artwork/<name>.png.

use std::path::PathBuf;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::endpoint;
use crate::core::paths::{validate_package_name, LauncherPaths};

const STEAMGRIDDB_API_BASE: &str = "https://www.steamgriddb.com/api/v2";
const SERVICE: &str = "SteamGridDB";

/// Grids shown per page in the artwork picker.
pub const GRIDS_PER_PAGE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridImage {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub thumb: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl GridImage {
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    errors: Vec<String>,
}

pub struct ArtworkClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ArtworkClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, STEAMGRIDDB_API_BASE)
    }

    pub fn with_base_url(client: Client, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_games(&self, term: &str) -> LauncherResult<Vec<GameMatch>> {
        let url = endpoint(SERVICE, &self.base_url, &["search", "autocomplete", term])?;
        self.get_data(url).await
    }

    /// Landscape grids for `game_id`, page `page` (0-based).
    pub async fn landscape_grids(&self, game_id: u64, page: usize) -> LauncherResult<Vec<GridImage>> {
        let game_id = game_id.to_string();
        let url = endpoint(SERVICE, &self.base_url, &["grids", "game", game_id.as_str()])?;
        let grids: Vec<GridImage> = self.get_data(url).await?;
        Ok(landscape_page(grids, page))
    }

    /// Save the image at `image_url` as the artwork of `package_name`.
    pub async fn download(
        &self,
        paths: &LauncherPaths,
        image_url: &str,
        package_name: &str,
    ) -> LauncherResult<PathBuf> {
        validate_package_name(package_name)?;

        let resp = self.client.get(image_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: image_url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;

        let dest = paths.artwork_path(package_name);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::io(parent, source))?;
        }
        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|source| LauncherError::io(&dest, source))?;

        info!("Saved artwork for {} to {:?}", package_name, dest);
        Ok(dest)
    }

    async fn get_data<T: serde::de::DeserializeOwned>(&self, url: Url) -> LauncherResult<Vec<T>> {
        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LauncherError::Api {
                service: SERVICE.into(),
                message: format!("{} returned {}", url, status),
            });
        }

        let envelope = resp.json::<Envelope<T>>().await?;
        if !envelope.success {
            return Err(LauncherError::Api {
                service: SERVICE.into(),
                message: envelope.errors.join("; "),
            });
        }
        Ok(envelope.data)
    }
}

/// Keep landscape grids only, then take page `page` of [`GRIDS_PER_PAGE`].
pub fn landscape_page(grids: Vec<GridImage>, page: usize) -> Vec<GridImage> {
    grids
        .into_iter()
        .filter(GridImage::is_landscape)
        .skip(page.saturating_mul(GRIDS_PER_PAGE))
        .take(GRIDS_PER_PAGE)
        .collect()
}
