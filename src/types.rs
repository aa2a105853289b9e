//! Core types and traits for the Search Console diagnostic

use crate::error::GscResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn unknown_site_url() -> String {
    "Unknown".to_string()
}

fn unknown_permission() -> String {
    "Unknown permission".to_string()
}

/// A verified Search Console property the authenticated account can see
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteEntry {
    /// Property URL, e.g. `https://example.com/` or `sc-domain:example.com`
    #[serde(rename = "siteUrl", default = "unknown_site_url")]
    pub site_url: String,
    /// Permission level of the account on this property
    #[serde(rename = "permissionLevel", default = "unknown_permission")]
    pub permission_level: String,
}

/// Response body of the `sites.list` endpoint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SitesListResponse {
    #[serde(rename = "siteEntry", default)]
    pub site_entry: Vec<SiteEntry>,
}

/// Request body for the `searchanalytics.query` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dimensions: Vec<String>,
    pub row_limit: u32,
}

impl SearchAnalyticsRequest {
    /// Build the fixed sample query used by the diagnostic: the trailing
    /// 7-day window ending at `end`, no grouping dimensions, a single row.
    pub fn trailing_week(end: NaiveDate) -> Self {
        Self {
            start_date: end - chrono::Duration::days(7),
            end_date: end,
            dimensions: Vec::new(),
            row_limit: 1,
        }
    }
}

/// One aggregated row of a search analytics query
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SearchAnalyticsRow {
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
}

/// Response body of the `searchanalytics.query` endpoint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<SearchAnalyticsRow>,
}

/// The two Search Console API operations the diagnostic exercises
#[async_trait::async_trait]
pub trait SearchConsoleApi: Send + Sync + std::fmt::Debug {
    /// List the properties the authenticated account has access to
    async fn list_sites(&self) -> GscResult<Vec<SiteEntry>>;

    /// Run a search analytics query against one property
    async fn query_search_analytics(
        &self,
        site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> GscResult<SearchAnalyticsResponse>;
}

/// Factory for an authenticated API client. The diagnostic only ever calls
/// this single operation; swapping it out is how tests substitute mocks.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> GscResult<Box<dyn SearchConsoleApi>>;
}
