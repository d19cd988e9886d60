//! Shared HTTP plumbing for the backend adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::ports::ApiError;

/// Thin wrapper around `reqwest::Client` that joins endpoint paths onto
/// the configured base URL and maps failures to [`ApiError`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl BackendClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::network(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.config.endpoint(path))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.post(path, body).await?;
        Self::decode(response).await
    }

    /// POST where the response body is irrelevant.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.post(path, body).await.map(|_| ())
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::backend(status.as_u16(), message));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::backend(status.as_u16(), message));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::decode(e.to_string()))
    }
}
