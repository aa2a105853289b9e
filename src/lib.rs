//! # GSC Diagnostic
//!
//! A small library and CLI tool that checks whether a Google Search Console
//! (GSC) API integration is reachable and authorized. One diagnostic pass
//! reports environment configuration, credential file presence, client
//! acquisition, accessible site properties, and one sample search analytics
//! query over the trailing 7 days.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gsc_diagnostic::{
//!     auth::GscConnector, config::{executable_dir, DiagnosticConfig}, run_diagnostic,
//! };
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = DiagnosticConfig::from_env();
//!     let base_dir = executable_dir();
//!     let connector = GscConnector::new(config.clone(), base_dir.clone());
//!
//!     run_diagnostic(&config, &base_dir, &connector, &mut std::io::stdout()).await
//! }
//! ```
//!
//! Every auth or API failure is reported as a printed status line rather
//! than an error; only sink write failures propagate.

pub mod auth;
pub mod client;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod types;
pub mod utils;

// Re-export common types
pub use client::SearchConsoleClient;
pub use config::{CredentialFiles, DiagnosticConfig};
pub use diagnostic::{connection_hint, run_diagnostic};
pub use error::{GscError, GscResult};
pub use types::{
    Connector, SearchAnalyticsRequest, SearchAnalyticsResponse, SearchAnalyticsRow,
    SearchConsoleApi, SiteEntry,
};
