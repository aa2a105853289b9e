//! Configuration snapshot and credential file probing
//!
//! The diagnostic never reads process globals itself; everything it needs is
//! captured once into a [`DiagnosticConfig`] and passed in explicitly.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable pointing at a service-account key file
pub const CREDENTIALS_PATH_VAR: &str = "GSC_CREDENTIALS_PATH";
/// Environment variable pointing at an OAuth client secrets file
pub const OAUTH_SECRETS_VAR: &str = "GSC_OAUTH_CLIENT_SECRETS_FILE";
/// Environment variable disabling the OAuth fallback
pub const SKIP_OAUTH_VAR: &str = "GSC_SKIP_OAUTH";

/// Service-account key file expected next to the binary
pub const SERVICE_ACCOUNT_FILE: &str = "service_account_credentials.json";
/// OAuth client secrets file expected next to the binary
pub const CLIENT_SECRETS_FILE: &str = "client_secrets.json";
/// Cached OAuth token file expected next to the binary
pub const TOKEN_FILE: &str = "token.json";

/// Snapshot of the environment configuration, read once at startup
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Value of `GSC_CREDENTIALS_PATH`, if set and non-empty
    pub credentials_path: Option<String>,
    /// Value of `GSC_OAUTH_CLIENT_SECRETS_FILE`, if set and non-empty
    pub oauth_secrets_path: Option<String>,
    /// Whether `GSC_SKIP_OAUTH` was set to a truthy value
    pub skip_oauth: bool,
}

impl DiagnosticConfig {
    /// Capture the three `GSC_*` environment variables. No format validation
    /// is performed; empty strings count as unset.
    pub fn from_env() -> Self {
        Self {
            credentials_path: non_empty_var(CREDENTIALS_PATH_VAR),
            oauth_secrets_path: non_empty_var(OAUTH_SECRETS_VAR),
            skip_oauth: env::var(SKIP_OAUTH_VAR)
                .map(|value| is_truthy(&value))
                .unwrap_or(false),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Truthy values are exactly `true`, `1` and `yes`, case-insensitively.
fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Presence flags for the three well-known credential files
#[derive(Debug, Clone)]
pub struct CredentialFiles {
    /// Directory the files were probed in
    pub base_dir: PathBuf,
    pub service_account: bool,
    pub client_secrets: bool,
    pub token: bool,
}

impl CredentialFiles {
    /// Check for the three credential files in `dir`. Existence only, the
    /// contents are never inspected here.
    pub fn probe(dir: &Path) -> Self {
        Self {
            base_dir: dir.to_path_buf(),
            service_account: dir.join(SERVICE_ACCOUNT_FILE).exists(),
            client_secrets: dir.join(CLIENT_SECRETS_FILE).exists(),
            token: dir.join(TOKEN_FILE).exists(),
        }
    }
}

/// Directory containing the running binary, the analogue of "the script's
/// own directory". Falls back to the current directory if the executable
/// path cannot be resolved.
pub fn executable_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
