//! HTTP utilities for talking to Google APIs

use crate::error::{GscError, GscResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client wrapper with bearer-token JSON helpers
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("gsc-diagnostic/0.1.0")
                .build()
                .expect("Failed to create HTTP client"),
            default_timeout: Duration::from_millis(15000),
        }
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .user_agent("gsc-diagnostic/0.1.0")
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .expect("Failed to create HTTP client"),
            default_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Make a bearer-authenticated GET request and deserialize the JSON response
    pub async fn get_json<T>(&self, url: &str, bearer_token: &str) -> GscResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .timeout(self.default_timeout)
            .send()
            .await?;

        self.handle_response_json(response).await
    }

    /// Make a bearer-authenticated POST request with a JSON body and
    /// deserialize the JSON response
    pub async fn post_json<T, B>(&self, url: &str, bearer_token: &str, body: &B) -> GscResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .timeout(self.default_timeout)
            .json(body)
            .send()
            .await?;

        self.handle_response_json(response).await
    }

    /// Make an unauthenticated POST request with form data and deserialize
    /// the JSON response (token endpoint exchanges)
    pub async fn post_form_json<T>(&self, url: &str, form_data: &[(&str, &str)]) -> GscResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .timeout(self.default_timeout)
            .form(form_data)
            .send()
            .await?;

        self.handle_response_json(response).await
    }

    /// Handle HTTP response and deserialize as JSON
    async fn handle_response_json<T>(&self, response: Response) -> GscResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            let json = response.json::<T>().await?;
            Ok(json)
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            Err(GscError::HttpError {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
