//! GitHub Releases API implementation

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{GitHubConfig, USER_AGENT};
use crate::error::ReleaseError;
use crate::release::{Asset, Release, ReleaseSource};

/// Response from the releases/latest endpoint
#[derive(Debug, Deserialize)]
struct LatestReleaseResponse {
    tag_name: String,
    #[serde(default)]
    assets: Vec<AssetResponse>,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    name: String,
    browser_download_url: String,
}

/// Release source backed by the GitHub REST API
pub struct GitHubReleases {
    client: reqwest::Client,
    api_base_url: String,
    download_base_url: String,
    token: Option<String>,
}

impl GitHubReleases {
    /// Creates a GitHubReleases client against custom base URLs
    pub fn new(
        api_base_url: &str,
        download_base_url: &str,
        token: Option<String>,
    ) -> Result<Self, ReleaseError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            download_base_url: download_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &GitHubConfig) -> Result<Self, ReleaseError> {
        Self::new(
            &config.api_base_url,
            &config.download_base_url,
            config.resolve_token(),
        )
    }

    fn api_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &self.token
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn check_status(response: &reqwest::Response, what: &str) -> Result<(), ReleaseError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ReleaseError::NotFound(what.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ReleaseError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub returned status {}: {}", status, response.url());
            return Err(ReleaseError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleases {
    async fn latest_release(&self, repo: &str) -> Result<Release, ReleaseError> {
        let url = format!("{}/repos/{}/releases/latest", self.api_base_url, repo);
        debug!("Fetching latest release: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.api_headers())
            .send()
            .await?;

        Self::check_status(&response, repo)?;

        let body: LatestReleaseResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub release response: {}", e);
            ReleaseError::InvalidResponse(e.to_string())
        })?;

        let assets = body
            .assets
            .into_iter()
            .map(|a| Asset {
                name: a.name,
                download_url: a.browser_download_url,
            })
            .collect();

        Ok(Release::new(body.tag_name, assets))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ReleaseError> {
        debug!("Downloading {}", url);

        let response = self.client.get(url).send().await?;
        Self::check_status(&response, url)?;

        Ok(response.text().await?)
    }

    fn download_url(&self, repo: &str, tag: &str, filename: &str) -> String {
        format!(
            "{}/{}/releases/download/{}/{}",
            self.download_base_url, repo, tag, filename
        )
    }
}
