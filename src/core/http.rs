use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING};
use reqwest::{Client, Url};

use crate::core::error::{LauncherError, LauncherResult};

const APP_USER_AGENT: &str = "RepoRocket/0.1.0";

/// Shared client for downloads and API calls. GitHub rejects requests
/// without a user agent, and identity encoding keeps `content-length`
/// meaningful for progress reporting.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    default_headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// `base_url` with `segments` appended, each percent-encoded as exactly one
/// path segment (`AC/DC` -> `AC%2FDC`).
pub fn endpoint(service: &str, base_url: &str, segments: &[&str]) -> LauncherResult<Url> {
    let invalid = || LauncherError::Api {
        service: service.to_string(),
        message: format!("invalid base URL {base_url}"),
    };
    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded_individually() {
        let url = endpoint("Test", "https://api.test/v2", &["search", "AC/DC #1?"]).unwrap();
        assert_eq!(url.as_str(), "https://api.test/v2/search/AC%2FDC%20%231%3F");

        let root = endpoint("Test", "http://127.0.0.1:8080", &["metadata", "item"]).unwrap();
        assert_eq!(root.as_str(), "http://127.0.0.1:8080/metadata/item");
    }

    #[test]
    fn unparseable_base_is_an_api_error() {
        let err = endpoint("Test", "not a url", &["x"]).unwrap_err();
        assert!(matches!(err, LauncherError::Api { service, .. } if service == "Test"));
    }
}
