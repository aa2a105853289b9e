//! Behavior tests for the diagnostic sequence
//!
//! These drive `run_diagnostic` against mocked collaborators and assert both
//! the printed report and which API operations were (not) reached.

use gsc_diagnostic::{
    run_diagnostic, Connector, DiagnosticConfig, GscError, GscResult, SearchAnalyticsRequest,
    SearchAnalyticsResponse, SearchAnalyticsRow, SearchConsoleApi, SiteEntry,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct MockApi {
    sites: Vec<SiteEntry>,
    rows: Vec<SearchAnalyticsRow>,
    list_error: Option<GscError>,
    query_error: Option<GscError>,
    list_calls: Arc<AtomicUsize>,
    query_calls: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<(String, SearchAnalyticsRequest)>>>,
}

impl MockApi {
    fn with_sites(sites: Vec<SiteEntry>) -> Self {
        Self {
            sites,
            ..Default::default()
        }
    }

    fn with_rows(mut self, rows: Vec<SearchAnalyticsRow>) -> Self {
        self.rows = rows;
        self
    }
}

fn site(url: &str, permission: &str) -> SiteEntry {
    SiteEntry {
        site_url: url.to_string(),
        permission_level: permission.to_string(),
    }
}

#[async_trait::async_trait]
impl SearchConsoleApi for MockApi {
    async fn list_sites(&self) -> GscResult<Vec<SiteEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.sites.clone()),
        }
    }

    async fn query_search_analytics(
        &self,
        site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> GscResult<SearchAnalyticsResponse> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((site_url.to_string(), request.clone()));
        match &self.query_error {
            Some(error) => Err(error.clone()),
            None => Ok(SearchAnalyticsResponse {
                rows: self.rows.clone(),
            }),
        }
    }
}

/// Connector that hands out clones of a mock API
struct OkConnector(MockApi);

#[async_trait::async_trait]
impl Connector for OkConnector {
    async fn connect(&self) -> GscResult<Box<dyn SearchConsoleApi>> {
        Ok(Box::new(self.0.clone()))
    }
}

/// Connector whose acquisition step fails
struct FailingConnector(GscError);

#[async_trait::async_trait]
impl Connector for FailingConnector {
    async fn connect(&self) -> GscResult<Box<dyn SearchConsoleApi>> {
        Err(self.0.clone())
    }
}

async fn run(config: &DiagnosticConfig, base_dir: &Path, connector: &dyn Connector) -> String {
    let mut buffer = Vec::new();
    run_diagnostic(config, base_dir, connector, &mut buffer)
        .await
        .expect("writing to a Vec cannot fail");
    String::from_utf8(buffer).expect("diagnostic output is UTF-8")
}

#[tokio::test]
async fn reports_unset_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let connector = OkConnector(MockApi::default());

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("GSC_CREDENTIALS_PATH: Not set"));
    assert!(output.contains("GSC_OAUTH_CLIENT_SECRETS_FILE: Not set"));
    assert!(output.contains("GSC_SKIP_OAUTH: false"));
}

#[tokio::test]
async fn reports_set_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = DiagnosticConfig {
        credentials_path: Some("/etc/gsc/key.json".to_string()),
        oauth_secrets_path: Some("/etc/gsc/secrets.json".to_string()),
        skip_oauth: true,
    };
    let connector = OkConnector(MockApi::default());

    let output = run(&config, dir.path(), &connector).await;

    assert!(output.contains("GSC_CREDENTIALS_PATH: Set"));
    assert!(output.contains("GSC_OAUTH_CLIENT_SECRETS_FILE: Set"));
    assert!(output.contains("GSC_SKIP_OAUTH: true"));
}

#[tokio::test]
async fn reports_credential_file_presence() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("service_account_credentials.json"), "{}").unwrap();
    let connector = OkConnector(MockApi::default());

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("service_account_credentials.json: Found"));
    assert!(output.contains("client_secrets.json: Not found"));
    assert!(output.contains("token.json (OAuth token): Not found"));
}

#[tokio::test]
async fn connect_failure_skips_all_api_calls() {
    let dir = tempfile::tempdir().unwrap();
    // The mock API exists but is never handed out; its counters must stay 0.
    let api = MockApi::with_sites(vec![site("https://example.com/", "siteOwner")]);
    let list_calls = api.list_calls.clone();
    let query_calls = api.query_calls.clone();
    drop(api);
    let connector = FailingConnector(GscError::AuthError("token exchange rejected".to_string()));

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Failed to connect: Authentication failed: token exchange rejected"));
    assert!(output.contains("Error type: AuthError"));
    assert_eq!(list_calls.load(Ordering::SeqCst), 0);
    assert_eq!(query_calls.load(Ordering::SeqCst), 0);
    assert!(output.contains("Test completed"), "closing banner always prints");
    assert!(!output.contains("4. Testing API access"));
}

#[tokio::test]
async fn connect_failure_prints_targeted_hint() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FailingConnector(GscError::AuthError(format!(
        "client secrets file not found: {}",
        dir.path().join("client_secrets.json").display()
    )));

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Tip: OAuth client secrets file not found"));
    assert!(output.contains("Expected location:"));
}

#[tokio::test]
async fn empty_site_list_skips_analytics() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::default();
    let query_calls = api.query_calls.clone();
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Successfully connected to GSC API!"));
    assert!(output.contains("No Search Console properties found."));
    assert!(output.contains("The service account doesn't have access to any properties"));
    assert!(output.contains("add the service account email to your GSC properties"));
    assert_eq!(query_calls.load(Ordering::SeqCst), 0);
    assert!(!output.contains("5. Testing search analytics"));
}

#[tokio::test]
async fn listing_failure_prints_kind_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi {
        list_error: Some(GscError::HttpError {
            message: "Request failed with status: 500 Internal Server Error".to_string(),
            status_code: Some(500),
            response_body: None,
        }),
        ..Default::default()
    };
    let query_calls = api.query_calls.clone();
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Error listing properties:"));
    assert!(output.contains("Error type: HttpError"));
    assert_eq!(query_calls.load(Ordering::SeqCst), 0);
    assert!(output.contains("Test completed"));
}

#[tokio::test]
async fn properties_are_enumerated_one_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::with_sites(vec![
        site("https://a.example/", "siteOwner"),
        site("https://b.example/", "siteFullUser"),
        site("sc-domain:c.example", "siteRestrictedUser"),
    ]);
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Found 3 Search Console properties:"));
    assert!(output.contains("   1. https://a.example/ (siteOwner)"));
    assert!(output.contains("   2. https://b.example/ (siteFullUser)"));
    assert!(output.contains("   3. sc-domain:c.example (siteRestrictedUser)"));
}

#[tokio::test]
async fn analytics_request_targets_first_property_over_trailing_week() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::with_sites(vec![
        site("https://example.com/", "siteOwner"),
        site("https://other.example/", "siteOwner"),
    ])
    .with_rows(vec![SearchAnalyticsRow {
        clicks: 42,
        impressions: 100,
    }]);
    let query_calls = api.query_calls.clone();
    let last_query = api.last_query.clone();
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert_eq!(query_calls.load(Ordering::SeqCst), 1);
    let (queried_site, request) = last_query.lock().unwrap().clone().unwrap();
    assert_eq!(queried_site, "https://example.com/");

    let today = chrono::Local::now().date_naive();
    assert_eq!(request.end_date, today);
    assert_eq!(request.start_date, today - chrono::Duration::days(7));
    assert_eq!(request.row_limit, 1);
    assert!(request.dimensions.is_empty());

    assert!(output.contains("Successfully retrieved data for https://example.com/"));
    assert!(output.contains("Total clicks (last 7 days): 42"));
    assert!(output.contains("Total impressions: 100"));
}

#[tokio::test]
async fn analytics_without_rows_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::with_sites(vec![site("https://example.com/", "siteOwner")]);
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("No data available for https://example.com/ in the last 7 days"));
}

#[tokio::test]
async fn analytics_failure_prints_message_without_kind() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi {
        sites: vec![site("https://example.com/", "siteOwner")],
        query_error: Some(GscError::ApiError("quota exceeded".to_string())),
        ..Default::default()
    };
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Error testing search analytics: API error: quota exceeded"));
    // The analytics step reports the message only; no "Error type:" line
    // appears anywhere in a run where connect and listing succeed.
    assert!(!output.contains("Error type:"));
    assert!(output.contains("Test completed"));
}

#[tokio::test]
async fn zeroed_metrics_render_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let api = MockApi::with_sites(vec![site("https://example.com/", "siteOwner")])
        .with_rows(vec![SearchAnalyticsRow::default()]);
    let connector = OkConnector(api);

    let output = run(&DiagnosticConfig::default(), dir.path(), &connector).await;

    assert!(output.contains("Total clicks (last 7 days): 0"));
    assert!(output.contains("Total impressions: 0"));
}
