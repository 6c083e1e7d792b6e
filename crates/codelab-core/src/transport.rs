//! Transport to a remote execution service
//!
//! The dispatcher only talks to [`ExecutionTransport`]; [`HttpTransport`] is
//! the reqwest-backed implementation used outside of tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::endpoint::EndpointDescriptor;
use crate::errors::CodeLabError;
use crate::protocol::{SubmissionBody, SubmissionResponse};

#[async_trait]
pub trait ExecutionTransport: Send + Sync {
    /// Submit source for execution
    async fn submit(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
        body: &SubmissionBody,
    ) -> Result<SubmissionResponse, CodeLabError>;

    /// Fetch the current state of a pending submission
    async fn poll(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
        token: &str,
    ) -> Result<SubmissionResponse, CodeLabError>;

    /// Check that the endpoint answers at all
    async fn probe(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), CodeLabError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn apply_headers(
        mut builder: reqwest::RequestBuilder,
        headers: &BTreeMap<String, String>,
    ) -> reqwest::RequestBuilder {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    async fn read_response(
        endpoint: &EndpointDescriptor,
        response: reqwest::Response,
    ) -> Result<SubmissionResponse, CodeLabError> {
        if !response.status().is_success() {
            return Err(CodeLabError::HttpStatus {
                endpoint: endpoint.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CodeLabError::transport(&endpoint.url, e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| CodeLabError::Decode(e.to_string()))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionTransport for HttpTransport {
    async fn submit(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
        body: &SubmissionBody,
    ) -> Result<SubmissionResponse, CodeLabError> {
        let url = endpoint.submit_url();
        log::debug!("POST {}", url);

        // Content-Type comes from the endpoint headers, so they go on before
        // the JSON body.
        let request = Self::apply_headers(self.client.post(&url), headers);
        let response = request
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| CodeLabError::transport(&endpoint.url, e.to_string()))?;

        Self::read_response(endpoint, response).await
    }

    async fn poll(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
        token: &str,
    ) -> Result<SubmissionResponse, CodeLabError> {
        let url = endpoint.poll_url(token);
        log::debug!("GET {}", url);

        let request = self.client.get(&url).timeout(self.timeout);
        let response = Self::apply_headers(request, headers)
            .send()
            .await
            .map_err(|e| CodeLabError::transport(&endpoint.url, e.to_string()))?;

        Self::read_response(endpoint, response).await
    }

    async fn probe(
        &self,
        endpoint: &EndpointDescriptor,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), CodeLabError> {
        let request = self.client.get(endpoint.languages_url()).timeout(self.timeout);
        let response = Self::apply_headers(request, headers)
            .send()
            .await
            .map_err(|e| CodeLabError::transport(&endpoint.url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(CodeLabError::HttpStatus {
                endpoint: endpoint.url.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
