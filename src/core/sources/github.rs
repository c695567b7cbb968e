use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, trim_base_url, Release, RepoSource, RepoSummary, SEARCH_LIMIT};
use crate::core::downloader::RemoteAsset;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::endpoint;

const GITHUB_API_BASE: &str = "https://api.github.com";
const SERVICE: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<GitHubRepo>,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    owner: GitHubOwner,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    browser_download_url: String,
}

pub struct GitHubSource {
    client: Client,
    base_url: String,
}

impl GitHubSource {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GITHUB_API_BASE)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
        }
    }
}

#[async_trait]
impl RepoSource for GitHubSource {
    async fn search(&self, query: &str) -> LauncherResult<Vec<RepoSummary>> {
        let url = format!("{}/search/repositories", self.base_url);
        let resp: SearchResponse =
            get_json(SERVICE, self.client.get(&url).query(&[("q", query)])).await?;

        Ok(resp
            .items
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|repo| RepoSummary {
                id: format!("{}/{}", repo.owner.login, repo.name),
                name: repo.name,
                owner: repo.owner.login,
                description: repo.description,
            })
            .collect())
    }

    async fn releases(&self, repo: &RepoSummary) -> LauncherResult<Vec<Release>> {
        if repo.owner.is_empty() || repo.name.is_empty() {
            return Err(LauncherError::Api {
                service: SERVICE.into(),
                message: format!("Repository {:?} has no owner/name", repo.id),
            });
        }

        let url = endpoint(
            SERVICE,
            &self.base_url,
            &["repos", repo.owner.as_str(), repo.name.as_str(), "releases"],
        )?;
        let releases: Vec<GitHubRelease> = get_json(SERVICE, self.client.get(url)).await?;

        Ok(releases
            .into_iter()
            .map(|release| Release {
                name: release.tag_name,
                assets: release
                    .assets
                    .into_iter()
                    .map(|asset| RemoteAsset::new(asset.browser_download_url))
                    .collect(),
            })
            .collect())
    }
}
