// ─── Release Sources ───
// Search and release listing on GitHub, GitLab and the Internet Archive,
// normalized into RepoSummary / Release / RemoteAsset.

pub mod github;
pub mod gitlab;
pub mod internet_archive;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::downloader::RemoteAsset;
use crate::core::error::{LauncherError, LauncherResult};

pub use github::GitHubSource;
pub use gitlab::GitLabSource;
pub use internet_archive::InternetArchiveSource;

/// Search results are cut to this many entries.
pub const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepoSourceKind {
    #[default]
    GitHub,
    GitLab,
    #[serde(rename = "Internet Archive")]
    InternetArchive,
}

impl RepoSourceKind {
    pub const ALL: [RepoSourceKind; 3] = [
        RepoSourceKind::GitHub,
        RepoSourceKind::GitLab,
        RepoSourceKind::InternetArchive,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RepoSourceKind::GitHub => "GitHub",
            RepoSourceKind::GitLab => "GitLab",
            RepoSourceKind::InternetArchive => "Internet Archive",
        }
    }
}

impl fmt::Display for RepoSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RepoSourceKind {
    type Err = LauncherError;

    /// Accepts display names and short forms (`github`, `gitlab`, `archive`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "github" => Ok(RepoSourceKind::GitHub),
            "gitlab" => Ok(RepoSourceKind::GitLab),
            "internetarchive" | "archive" | "ia" => Ok(RepoSourceKind::InternetArchive),
            _ => Err(LauncherError::Other(format!("Unsupported repository: {raw}"))),
        }
    }
}

/// A search hit. `id` is whatever the platform needs to list releases:
/// `owner/name` on GitHub, the numeric project id on GitLab, the item
/// identifier on the Internet Archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub name: String,
    pub assets: Vec<RemoteAsset>,
}

#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn search(&self, query: &str) -> LauncherResult<Vec<RepoSummary>>;
    async fn releases(&self, repo: &RepoSummary) -> LauncherResult<Vec<Release>>;
}

/// Dispatcher without Box<dyn>
pub enum Source {
    GitHub(GitHubSource),
    GitLab(GitLabSource),
    InternetArchive(InternetArchiveSource),
}

impl Source {
    pub fn new(kind: RepoSourceKind, client: Client) -> Self {
        match kind {
            RepoSourceKind::GitHub => Self::GitHub(GitHubSource::new(client)),
            RepoSourceKind::GitLab => Self::GitLab(GitLabSource::new(client)),
            RepoSourceKind::InternetArchive => {
                Self::InternetArchive(InternetArchiveSource::new(client))
            }
        }
    }

    /// Same as [`Source::new`] against another host (mirrors, tests).
    pub fn with_base_url(kind: RepoSourceKind, client: Client, base_url: &str) -> Self {
        match kind {
            RepoSourceKind::GitHub => Self::GitHub(GitHubSource::with_base_url(client, base_url)),
            RepoSourceKind::GitLab => Self::GitLab(GitLabSource::with_base_url(client, base_url)),
            RepoSourceKind::InternetArchive => Self::InternetArchive(
                InternetArchiveSource::with_base_url(client, base_url),
            ),
        }
    }

    pub async fn search(&self, query: &str) -> LauncherResult<Vec<RepoSummary>> {
        match self {
            Source::GitHub(s) => s.search(query).await,
            Source::GitLab(s) => s.search(query).await,
            Source::InternetArchive(s) => s.search(query).await,
        }
    }

    pub async fn releases(&self, repo: &RepoSummary) -> LauncherResult<Vec<Release>> {
        match self {
            Source::GitHub(s) => s.releases(repo).await,
            Source::GitLab(s) => s.releases(repo).await,
            Source::InternetArchive(s) => s.releases(repo).await,
        }
    }
}

/// GET `request` and decode the JSON body; non-2xx becomes an API error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    service: &str,
    request: reqwest::RequestBuilder,
) -> LauncherResult<T> {
    let resp = request.send().await?;
    let status = resp.status();
    let url = resp.url().to_string();
    debug!("{} responded {} for {}", service, status, url);

    if !status.is_success() {
        return Err(LauncherError::Api {
            service: service.to_string(),
            message: format!("{} returned {}", url, status),
        });
    }

    Ok(resp.json::<T>().await?)
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_display_and_short_names() {
        for kind in RepoSourceKind::ALL {
            assert_eq!(kind.display_name().parse::<RepoSourceKind>().unwrap(), kind);
        }
        assert_eq!(
            "internet-archive".parse::<RepoSourceKind>().unwrap(),
            RepoSourceKind::InternetArchive
        );
        assert!("sourceforge".parse::<RepoSourceKind>().is_err());
    }

    #[test]
    fn kind_serializes_with_display_names() {
        assert_eq!(
            serde_json::to_string(&RepoSourceKind::InternetArchive).unwrap(),
            "\"Internet Archive\""
        );
        assert_eq!(
            serde_json::from_str::<RepoSourceKind>("\"GitLab\"").unwrap(),
            RepoSourceKind::GitLab
        );
    }
}
