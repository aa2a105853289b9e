//! Credential resolution and token acquisition
//!
//! Exposes a single operation, [`get_search_console_client`], that turns the
//! configuration snapshot into an authenticated [`SearchConsoleClient`].
//! Credential sources are tried in the same order as the wider project:
//! an explicit service-account key path, a key file next to the binary, and
//! finally the cached OAuth token unless OAuth is disabled.
//!
//! The interactive authorization flow is out of scope; a missing or
//! unrefreshable cached token is reported as an error instead.

use crate::{
    client::SearchConsoleClient,
    config::{DiagnosticConfig, CLIENT_SECRETS_FILE, SERVICE_ACCOUNT_FILE, TOKEN_FILE},
    error::{GscError, GscResult},
    types::{Connector, SearchConsoleApi},
    utils::http::HttpClient,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Google's OAuth 2.0 token endpoint
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Read-only Search Console scope requested for service-account tokens
const SEARCH_CONSOLE_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";

/// Tokens are treated as expired this many seconds before their deadline
const EXPIRY_SKEW_SECS: i64 = 60;

fn default_token_uri() -> String {
    TOKEN_ENDPOINT.to_string()
}

/// Which credential artifact will be used for this run
#[derive(Debug, Clone, PartialEq, Eq)]
enum CredentialSource {
    /// Service-account key file
    ServiceAccount(PathBuf),
    /// Cached OAuth token, optionally backed by a client secrets file
    CachedOauth {
        token_path: PathBuf,
        secrets_path: PathBuf,
    },
}

fn resolve_source(config: &DiagnosticConfig, base_dir: &Path) -> GscResult<CredentialSource> {
    if let Some(path) = &config.credentials_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(GscError::AuthError(format!(
                "service account credentials file not found: {} (from GSC_CREDENTIALS_PATH)",
                path.display()
            )));
        }
        return Ok(CredentialSource::ServiceAccount(path));
    }

    let default_key = base_dir.join(SERVICE_ACCOUNT_FILE);
    if default_key.exists() {
        return Ok(CredentialSource::ServiceAccount(default_key));
    }

    if !config.skip_oauth {
        let secrets_path = config
            .oauth_secrets_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join(CLIENT_SECRETS_FILE));
        return Ok(CredentialSource::CachedOauth {
            token_path: base_dir.join(TOKEN_FILE),
            secrets_path,
        });
    }

    Err(GscError::ConfigError(format!(
        "no credential source available: expected {SERVICE_ACCOUNT_FILE} in {} or an OAuth setup, and OAuth is disabled",
        base_dir.display()
    )))
}

/// Service-account key file, as downloaded from the Google Cloud Console
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

/// JWT claim set for the service-account bearer grant
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Cached OAuth token file (`token.json`), in the layout the Google auth
/// libraries persist
#[derive(Debug, Deserialize)]
struct StoredToken {
    #[serde(alias = "access_token")]
    token: Option<String>,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
    expiry: Option<String>,
}

impl StoredToken {
    /// Whether the cached access token is past (or within skew of) its expiry.
    /// Tokens without a parseable expiry are used as-is.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry.as_deref().and_then(parse_expiry) {
            Some(expiry) => expiry <= now + chrono::Duration::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }
}

/// Parse the `expiry` field. Google writes either RFC 3339 or a naive
/// ISO timestamp (implicitly UTC), depending on the library version.
fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// OAuth client secrets file (`client_secrets.json`), installed-app or
/// web-app layout
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<OauthClientInfo>,
    web: Option<OauthClientInfo>,
}

#[derive(Debug, Deserialize)]
struct OauthClientInfo {
    client_id: String,
    client_secret: String,
}

/// Token endpoint response for both grant types
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtain an authenticated Search Console client, or fail with an error
/// describing what is missing. This is the one operation the diagnostic
/// calls into the auth layer for.
pub async fn get_search_console_client(
    config: &DiagnosticConfig,
    base_dir: &Path,
) -> GscResult<SearchConsoleClient> {
    let http = HttpClient::new();
    let access_token = match resolve_source(config, base_dir)? {
        CredentialSource::ServiceAccount(path) => {
            log::debug!("authenticating with service account key {}", path.display());
            service_account_token(&http, &path).await?
        }
        CredentialSource::CachedOauth {
            token_path,
            secrets_path,
        } => {
            log::debug!("authenticating with cached OAuth token {}", token_path.display());
            cached_oauth_token(&http, &token_path, &secrets_path).await?
        }
    };
    Ok(SearchConsoleClient::new(access_token))
}

/// Exchange a signed JWT assertion for a service-account access token
async fn service_account_token(http: &HttpClient, key_path: &Path) -> GscResult<String> {
    let raw = fs::read_to_string(key_path).map_err(|e| {
        GscError::AuthError(format!("cannot read {}: {e}", key_path.display()))
    })?;
    let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
        GscError::ParseError(format!("invalid service account key {}: {e}", key_path.display()))
    })?;

    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SEARCH_CONSOLE_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + 3600,
    };

    let encoding_key =
        jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            GscError::AuthError(format!(
                "invalid private key in {}: {e}",
                key_path.display()
            ))
        })?;
    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    let assertion = jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| GscError::AuthError(format!("failed to sign JWT assertion: {e}")))?;

    let response: TokenResponse = http
        .post_form_json(
            &key.token_uri,
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ],
        )
        .await?;

    Ok(response.access_token)
}

/// Load the cached OAuth access token, refreshing it through the token
/// endpoint when it has expired
async fn cached_oauth_token(
    http: &HttpClient,
    token_path: &Path,
    secrets_path: &Path,
) -> GscResult<String> {
    if !token_path.exists() {
        return Err(GscError::AuthError(format!(
            "cached OAuth token not found: {} (run the authorization flow first, or provide {})",
            token_path.display(),
            SERVICE_ACCOUNT_FILE
        )));
    }

    let raw = fs::read_to_string(token_path).map_err(|e| {
        GscError::AuthError(format!("cannot read {}: {e}", token_path.display()))
    })?;
    let stored: StoredToken = serde_json::from_str(&raw).map_err(|e| {
        GscError::ParseError(format!("invalid token file {}: {e}", token_path.display()))
    })?;

    if !stored.is_expired(Utc::now()) {
        if let Some(token) = stored.token.clone() {
            return Ok(token);
        }
    }

    let Some(refresh_token) = stored.refresh_token.clone() else {
        return Err(GscError::AuthError(format!(
            "cached OAuth token in {} is expired or missing and has no refresh token",
            token_path.display()
        )));
    };

    let (client_id, client_secret) = oauth_client_credentials(&stored, secrets_path)?;
    log::debug!("refreshing OAuth token via {}", stored.token_uri);

    let response: TokenResponse = http
        .post_form_json(
            &stored.token_uri,
            &[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

    Ok(response.access_token)
}

/// Client credentials for the refresh grant: the cached token carries them
/// itself in newer layouts, otherwise they come from the secrets file
fn oauth_client_credentials(
    stored: &StoredToken,
    secrets_path: &Path,
) -> GscResult<(String, String)> {
    if let (Some(id), Some(secret)) = (stored.client_id.clone(), stored.client_secret.clone()) {
        return Ok((id, secret));
    }

    if !secrets_path.exists() {
        return Err(GscError::AuthError(format!(
            "client secrets file not found: {} (needed to refresh the cached token)",
            secrets_path.display()
        )));
    }

    let raw = fs::read_to_string(secrets_path).map_err(|e| {
        GscError::AuthError(format!("cannot read {}: {e}", secrets_path.display()))
    })?;
    let secrets: ClientSecretsFile = serde_json::from_str(&raw).map_err(|e| {
        GscError::ParseError(format!("invalid client secrets {}: {e}", secrets_path.display()))
    })?;

    let info = secrets.installed.or(secrets.web).ok_or_else(|| {
        GscError::ParseError(format!(
            "client secrets {} has neither an \"installed\" nor a \"web\" section",
            secrets_path.display()
        ))
    })?;
    Ok((info.client_id, info.client_secret))
}

/// The production [`Connector`]: wires the auth layer to the real API client
pub struct GscConnector {
    config: DiagnosticConfig,
    base_dir: PathBuf,
}

impl GscConnector {
    pub fn new(config: DiagnosticConfig, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }
}

#[async_trait::async_trait]
impl Connector for GscConnector {
    async fn connect(&self) -> GscResult<Box<dyn SearchConsoleApi>> {
        let client = get_search_console_client(&self.config, &self.base_dir).await?;
        Ok(Box::new(client))
    }
}
