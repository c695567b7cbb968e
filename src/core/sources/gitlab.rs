use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, trim_base_url, Release, RepoSource, RepoSummary, SEARCH_LIMIT};
use crate::core::downloader::RemoteAsset;
use crate::core::error::LauncherResult;
use crate::core::http::endpoint;

const GITLAB_API_BASE: &str = "https://gitlab.com/api/v4";
const SERVICE: &str = "GitLab";

#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    name: String,
    namespace: GitLabNamespace,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabNamespace {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitLabRelease {
    tag_name: String,
    #[serde(default)]
    assets: GitLabAssets,
}

#[derive(Debug, Default, Deserialize)]
struct GitLabAssets {
    #[serde(default)]
    links: Vec<GitLabLink>,
    #[serde(default)]
    sources: Vec<GitLabSourceArchive>,
}

#[derive(Debug, Deserialize)]
struct GitLabLink {
    url: String,
    direct_asset_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabSourceArchive {
    url: String,
}

pub struct GitLabSource {
    client: Client,
    base_url: String,
}

impl GitLabSource {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GITLAB_API_BASE)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
        }
    }
}

#[async_trait]
impl RepoSource for GitLabSource {
    async fn search(&self, query: &str) -> LauncherResult<Vec<RepoSummary>> {
        let url = format!("{}/projects", self.base_url);
        let projects: Vec<GitLabProject> =
            get_json(SERVICE, self.client.get(&url).query(&[("search", query)])).await?;

        Ok(projects
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|project| RepoSummary {
                id: project.id.to_string(),
                name: project.name,
                owner: project.namespace.name,
                description: project.description,
            })
            .collect())
    }

    /// Release links come first (direct asset URL when present), then the
    /// generated source archives.
    async fn releases(&self, repo: &RepoSummary) -> LauncherResult<Vec<Release>> {
        let url = endpoint(SERVICE, &self.base_url, &["projects", repo.id.as_str(), "releases"])?;
        let releases: Vec<GitLabRelease> = get_json(SERVICE, self.client.get(url)).await?;

        Ok(releases
            .into_iter()
            .map(|release| {
                let links = release
                    .assets
                    .links
                    .into_iter()
                    .map(|link| link.direct_asset_url.unwrap_or(link.url));
                let sources = release.assets.sources.into_iter().map(|source| source.url);
                Release {
                    name: release.tag_name,
                    assets: links.chain(sources).map(RemoteAsset::new).collect(),
                }
            })
            .collect())
    }
}
