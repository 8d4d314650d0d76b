//! reqwest-backed implementation of the collaborator traits
//!
//! One [`RfpHttpClient`] talks to both remote services: the *portal*
//! (categories, documents, reviews) and the *model service* (prediction,
//! generation, precedents, uploads).

mod categorization;
pub mod endpoints;
mod generation;
mod persistence;
mod response;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::SdkError;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// HTTP client for the portal and model services
pub struct RfpHttpClient {
    portal_url: String,
    model_url: String,
    auth_token: Option<String>,
    http_client: reqwest::Client,
}

impl RfpHttpClient {
    /// Create a client for the given portal and model service base URLs
    pub fn new(
        portal_url: impl Into<String>,
        model_url: impl Into<String>,
    ) -> Result<Self, SdkError> {
        let portal_url = portal_url.into();
        let model_url = model_url.into();
        if portal_url.trim().is_empty() {
            return Err(SdkError::invalid_request("Portal URL cannot be empty"));
        }
        if model_url.trim().is_empty() {
            return Err(SdkError::invalid_request("Model service URL cannot be empty"));
        }

        Ok(Self {
            portal_url: portal_url.trim_end_matches('/').to_string(),
            model_url: model_url.trim_end_matches('/').to_string(),
            auth_token: None,
            http_client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Replace the request timeout (generation over a large sheet is slow)
    pub fn with_timeout(mut self, secs: u64) -> Result<Self, SdkError> {
        self.http_client = build_http_client(secs)?;
        Ok(self)
    }

    /// Bearer token sent with every portal request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    pub fn portal_url(&self) -> &str {
        &self.portal_url
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }

    fn portal_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.portal_url, path)
    }

    fn model_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.model_url, path)
    }

    fn portal_headers(&self) -> Result<HeaderMap, SdkError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| SdkError::authentication("Invalid auth token format"))?,
            );
        }
        Ok(headers)
    }

    fn model_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, SdkError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SdkError::Network { source: e })
}
