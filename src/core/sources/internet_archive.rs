use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, trim_base_url, Release, RepoSource, RepoSummary, SEARCH_LIMIT};
use crate::core::downloader::RemoteAsset;
use crate::core::error::LauncherResult;
use crate::core::http::endpoint;

const ARCHIVE_BASE: &str = "https://archive.org";
const SERVICE: &str = "Internet Archive";

/// Item files that are catalogue data rather than downloads.
const SKIPPED_FORMATS: [&str; 3] = ["Metadata", "Text", "Item Image"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchDocs,
}

#[derive(Debug, Deserialize)]
struct SearchDocs {
    #[serde(default)]
    docs: Vec<ArchiveDoc>,
}

#[derive(Debug, Deserialize)]
struct ArchiveDoc {
    identifier: String,
    title: Option<String>,
    #[serde(default)]
    creator: Option<Creator>,
}

/// `creator` is a string for single-author items and an array otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Creator {
    One(String),
    Many(Vec<String>),
}

impl Creator {
    fn joined(self) -> String {
        match self {
            Creator::One(name) => name,
            Creator::Many(names) => names.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    files: Vec<ArchiveFile>,
}

#[derive(Debug, Deserialize)]
struct ArchiveFile {
    name: String,
    #[serde(default)]
    format: String,
}

pub struct InternetArchiveSource {
    client: Client,
    base_url: String,
}

impl InternetArchiveSource {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, ARCHIVE_BASE)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
        }
    }

    /// Item files may sit in subfolders (`disc1/game.zip`); each folder and
    /// the file name are encoded as separate path segments.
    fn download_asset(&self, identifier: &str, file_name: &str) -> LauncherResult<RemoteAsset> {
        let mut segments = vec!["download", identifier];
        segments.extend(file_name.split('/').filter(|segment| !segment.is_empty()));
        let url = endpoint(SERVICE, &self.base_url, &segments)?.to_string();

        // Keep the item's own name on disk instead of the percent-encoded segment.
        let suggested_file_name = file_name
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| RemoteAsset::new(url.clone()).suggested_file_name);
        Ok(RemoteAsset {
            url,
            suggested_file_name,
        })
    }
}

#[async_trait]
impl RepoSource for InternetArchiveSource {
    async fn search(&self, query: &str) -> LauncherResult<Vec<RepoSummary>> {
        let url = format!("{}/advancedsearch.php", self.base_url);
        let rows = SEARCH_LIMIT.to_string();
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("fl[]", "identifier"),
            ("fl[]", "title"),
            ("fl[]", "creator"),
            ("rows", rows.as_str()),
            ("output", "json"),
        ]);
        let resp: SearchResponse = get_json(SERVICE, request).await?;

        Ok(resp
            .response
            .docs
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|doc| RepoSummary {
                name: doc.title.unwrap_or_else(|| doc.identifier.clone()),
                owner: doc.creator.map(Creator::joined).unwrap_or_default(),
                id: doc.identifier,
                description: None,
            })
            .collect())
    }

    /// One release per downloadable file of the item.
    async fn releases(&self, repo: &RepoSummary) -> LauncherResult<Vec<Release>> {
        let url = endpoint(SERVICE, &self.base_url, &["metadata", repo.id.as_str()])?;
        let metadata: MetadataResponse = get_json(SERVICE, self.client.get(url)).await?;

        metadata
            .files
            .into_iter()
            .filter(|file| !SKIPPED_FORMATS.contains(&file.format.as_str()))
            .map(|file| {
                Ok(Release {
                    assets: vec![self.download_asset(&repo.id, &file.name)?],
                    name: file.name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_asset_keeps_plain_file_name() {
        let source = InternetArchiveSource::with_base_url(Client::new(), "https://archive.test/");
        let asset = source.download_asset("doom-shareware", "DOOM 1.9.zip").unwrap();
        assert_eq!(asset.url, "https://archive.test/download/doom-shareware/DOOM%201.9.zip");
        assert_eq!(asset.suggested_file_name, "DOOM 1.9.zip");
    }

    #[test]
    fn download_asset_encodes_reserved_characters() {
        let source = InternetArchiveSource::with_base_url(Client::new(), "https://archive.test");
        let asset = source.download_asset("sonic", "Game #1?.zip").unwrap();
        assert_eq!(asset.url, "https://archive.test/download/sonic/Game%20%231%3F.zip");
        assert_eq!(asset.suggested_file_name, "Game #1?.zip");

        let nested = source.download_asset("sonic", "disc1/Game.zip").unwrap();
        assert_eq!(nested.url, "https://archive.test/download/sonic/disc1/Game.zip");
        assert_eq!(nested.suggested_file_name, "Game.zip");
    }

    #[test]
    fn creator_accepts_string_or_list() {
        let one: ArchiveDoc =
            serde_json::from_str(r#"{"identifier":"a","creator":"id Software"}"#).unwrap();
        assert_eq!(one.creator.unwrap().joined(), "id Software");

        let many: ArchiveDoc =
            serde_json::from_str(r#"{"identifier":"b","creator":["A","B"]}"#).unwrap();
        assert_eq!(many.creator.unwrap().joined(), "A, B");
    }
}
