//! Search Console API client
//!
//! Thin reqwest-based wrapper over the two Webmasters v3 endpoints the
//! diagnostic exercises: `sites.list` and `searchanalytics.query`.

use crate::{
    error::{GscError, GscResult},
    types::{
        SearchAnalyticsRequest, SearchAnalyticsResponse, SearchConsoleApi, SiteEntry,
        SitesListResponse,
    },
    utils::http::HttpClient,
};
use url::Url;

/// Base URL of the Search Console (Webmasters) v3 API
pub const SEARCH_CONSOLE_BASE_URL: &str = "https://www.googleapis.com/webmasters/v3";

/// Bearer-authenticated Search Console API client
#[derive(Debug, Clone)]
pub struct SearchConsoleClient {
    base_url: String,
    access_token: String,
    http_client: HttpClient,
}

impl SearchConsoleClient {
    /// Create a client around an already-obtained OAuth access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: SEARCH_CONSOLE_BASE_URL.to_string(),
            access_token: access_token.into(),
            http_client: HttpClient::new(),
        }
    }

    /// Set custom base URL (for testing)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn sites_url(&self) -> String {
        format!("{}/sites", self.base_url)
    }

    /// Build the analytics query URL with the property URL percent-encoded
    /// as a single path segment.
    fn analytics_url(&self, site_url: &str) -> GscResult<String> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| GscError::ConfigError(format!("Invalid base URL: {}", self.base_url)))?
            .push("sites")
            .push(site_url)
            .push("searchAnalytics")
            .push("query");
        Ok(url.to_string())
    }
}

#[async_trait::async_trait]
impl SearchConsoleApi for SearchConsoleClient {
    async fn list_sites(&self) -> GscResult<Vec<SiteEntry>> {
        let url = self.sites_url();
        log::debug!("GET {url}");

        let response: SitesListResponse = self.http_client.get_json(&url, &self.access_token).await?;

        log::debug!("sites.list returned {} entries", response.site_entry.len());
        Ok(response.site_entry)
    }

    async fn query_search_analytics(
        &self,
        site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> GscResult<SearchAnalyticsResponse> {
        let url = self.analytics_url(site_url)?;
        log::debug!(
            "POST {url} ({} to {})",
            request.start_date,
            request.end_date
        );

        let response: SearchAnalyticsResponse = self
            .http_client
            .post_json(&url, &self.access_token, request)
            .await?;

        log::debug!("searchanalytics.query returned {} rows", response.rows.len());
        Ok(response)
    }
}
