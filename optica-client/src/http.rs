//! HTTP transport for the retail backend API

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::envelope::ApiEnvelope;

/// HTTP client for making network requests to the retail backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    /// Set the staff session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            tracing::debug!(status = %status, body = %text, "backend returned an error");
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::GONE => Err(ClientError::Gone(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(Into::into)
    }
}

/// Unwrap a response envelope, surfacing backend error codes.
pub fn take_data<T>(envelope: ApiEnvelope<T>, what: &str) -> ClientResult<T> {
    if !envelope.is_ok() {
        return Err(ClientError::Backend {
            code: envelope.code,
            message: envelope.message,
        });
    }
    envelope
        .into_data()
        .ok_or_else(|| ClientError::InvalidResponse(format!("missing {what} payload")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_data_unwraps_success() {
        let envelope = ApiEnvelope::ok(7);
        assert_eq!(take_data(envelope, "number").unwrap(), 7);
    }

    #[test]
    fn take_data_surfaces_backend_codes() {
        let envelope: ApiEnvelope<()> = ApiEnvelope::error("E4040", "voucher not found");
        match take_data(envelope, "voucher") {
            Err(ClientError::Backend { code, message }) => {
                assert_eq!(code, "E4040");
                assert_eq!(message, "voucher not found");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[test]
    fn take_data_rejects_empty_success() {
        let envelope: ApiEnvelope<i32> = ApiEnvelope {
            code: "OK".to_string(),
            message: "Success".to_string(),
            data: None,
        };
        assert!(matches!(
            take_data(envelope, "number"),
            Err(ClientError::InvalidResponse(_))
        ));
    }
}
