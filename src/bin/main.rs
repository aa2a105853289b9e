//! GSC Diagnostic CLI - one-shot Google Search Console connection test
//!
//! Reads the `GSC_*` environment variables, looks for credential files next
//! to the binary, connects to the Search Console API, lists accessible
//! properties and runs one sample analytics query. All outcomes are reported
//! on stdout; the process exits 0 regardless of how many steps failed.

use clap::Parser;
use gsc_diagnostic::{
    auth::GscConnector,
    config::{executable_dir, DiagnosticConfig},
    run_diagnostic,
};

/// Verify that a Google Search Console API integration is reachable and
/// authorized. Configuration comes from the GSC_CREDENTIALS_PATH,
/// GSC_OAUTH_CLIENT_SECRETS_FILE and GSC_SKIP_OAUTH environment variables;
/// there are no flags beyond --help and --version.
#[derive(Parser)]
#[command(name = "gsc-diagnostic")]
#[command(about = "Google Search Console connection test")]
#[command(version)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let _cli = Cli::parse();

    let config = DiagnosticConfig::from_env();
    let base_dir = executable_dir();
    let connector = GscConnector::new(config.clone(), base_dir.clone());

    let mut stdout = std::io::stdout().lock();
    run_diagnostic(&config, &base_dir, &connector, &mut stdout).await?;

    Ok(())
}
