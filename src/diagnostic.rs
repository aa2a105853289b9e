//! The connection diagnostic itself
//!
//! One strictly sequential pass: report configuration, report credential
//! files, connect, list properties, run one sample analytics query. Every
//! fallible call into the auth layer or the API is guarded locally and
//! reported as text; nothing is retried and no error escapes to the caller
//! except failures of the output sink itself.

use crate::{
    config::{
        CredentialFiles, DiagnosticConfig, CLIENT_SECRETS_FILE, CREDENTIALS_PATH_VAR,
        OAUTH_SECRETS_VAR, SERVICE_ACCOUNT_FILE, SKIP_OAUTH_VAR, TOKEN_FILE,
    },
    types::{Connector, SearchAnalyticsRequest},
};
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

const BANNER: &str = "============================================================";

fn set_or_not(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "Set"
    } else {
        "Not set"
    }
}

fn found_or_not(present: bool) -> &'static str {
    if present {
        "Found"
    } else {
        "Not found"
    }
}

/// Best-effort classifier that turns a connection failure message into a
/// targeted tip. Matches on substrings of the error text, so it will simply
/// stop matching if upstream messages change; it is not part of any contract.
pub fn connection_hint(message: &str, base_dir: &Path) -> Option<String> {
    if message.contains(SERVICE_ACCOUNT_FILE) {
        Some(format!(
            "Make sure your service account credentials file is in the correct location\n   Expected location: {}",
            base_dir.join(SERVICE_ACCOUNT_FILE).display()
        ))
    } else if message.contains(CLIENT_SECRETS_FILE) {
        Some(format!(
            "OAuth client secrets file not found\n   Expected location: {}",
            base_dir.join(CLIENT_SECRETS_FILE).display()
        ))
    } else if message.contains("401") || message.contains("403") {
        Some("Authentication failed. Check your credentials and permissions".to_string())
    } else {
        None
    }
}

/// Run the full connection diagnostic, writing progress to `out`.
///
/// The connector failing skips every later step; a listing failure skips
/// only the analytics step. The closing banner always prints. Only errors
/// from the sink itself propagate.
pub async fn run_diagnostic<W: Write>(
    config: &DiagnosticConfig,
    base_dir: &Path,
    connector: &dyn Connector,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "Google Search Console Connection Test")?;
    writeln!(out, "{BANNER}\n")?;

    // 1. Environment configuration, presence only
    writeln!(out, "1. Checking environment variables...")?;
    writeln!(out, "   {CREDENTIALS_PATH_VAR}: {}", set_or_not(&config.credentials_path))?;
    writeln!(out, "   {OAUTH_SECRETS_VAR}: {}", set_or_not(&config.oauth_secrets_path))?;
    writeln!(out, "   {SKIP_OAUTH_VAR}: {}", config.skip_oauth)?;

    // 2. Credential files next to the binary
    writeln!(out, "\n2. Checking credential files...")?;
    let files = CredentialFiles::probe(base_dir);
    writeln!(out, "   {SERVICE_ACCOUNT_FILE}: {}", found_or_not(files.service_account))?;
    writeln!(out, "   {CLIENT_SECRETS_FILE}: {}", found_or_not(files.client_secrets))?;
    writeln!(out, "   {TOKEN_FILE} (OAuth token): {}", found_or_not(files.token))?;

    // 3. Client acquisition
    writeln!(out, "\n3. Attempting to connect to Google Search Console API...")?;
    let api = match connector.connect().await {
        Ok(api) => {
            writeln!(out, "   {} Successfully connected to GSC API!", "✓".green())?;
            api
        }
        Err(error) => {
            writeln!(out, "   {} Failed to connect: {error}", "✗".red())?;
            writeln!(out, "   Error type: {}", error.kind())?;
            if let Some(hint) = connection_hint(&error.to_string(), base_dir) {
                writeln!(out, "\n   Tip: {hint}")?;
            }
            return finish(out);
        }
    };

    // 4. List properties
    writeln!(out, "\n4. Testing API access by listing properties...")?;
    let sites = match api.list_sites().await {
        Ok(sites) => sites,
        Err(error) => {
            writeln!(out, "   {} Error listing properties: {error}", "✗".red())?;
            writeln!(out, "   Error type: {}", error.kind())?;
            return finish(out);
        }
    };

    if sites.is_empty() {
        writeln!(out, "   No Search Console properties found.")?;
        writeln!(out, "   This could mean:")?;
        writeln!(out, "   - The service account doesn't have access to any properties")?;
        writeln!(out, "   - You need to add the service account email to your GSC properties")?;
        return finish(out);
    }

    writeln!(out, "   {} Found {} Search Console properties:", "✓".green(), sites.len())?;
    writeln!(out, "\n   Properties:")?;
    for (i, site) in sites.iter().enumerate() {
        writeln!(out, "   {}. {} ({})", i + 1, site.site_url, site.permission_level)?;
    }

    // 5. One sample analytics query against the first property
    writeln!(out, "\n5. Testing search analytics on first property...")?;
    let first_site = &sites[0].site_url;
    let request = SearchAnalyticsRequest::trailing_week(chrono::Local::now().date_naive());

    match api.query_search_analytics(first_site, &request).await {
        Ok(response) => {
            if let Some(row) = response.rows.first() {
                writeln!(out, "   {} Successfully retrieved data for {first_site}", "✓".green())?;
                writeln!(out, "     Total clicks (last 7 days): {}", row.clicks)?;
                writeln!(out, "     Total impressions: {}", row.impressions)?;
            } else {
                writeln!(out, "   No data available for {first_site} in the last 7 days")?;
            }
        }
        // Message only here, no error type line
        Err(error) => {
            writeln!(out, "   {} Error testing search analytics: {error}", "✗".red())?;
        }
    }

    finish(out)
}

fn finish<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "Test completed")?;
    writeln!(out, "{BANNER}")?;
    Ok(())
}
