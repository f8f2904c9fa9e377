//! GraphQL client for the attestation indexer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::attestation::types::{AttestationFilter, AttestationPayload, IndexQueryOutcome};
use crate::config::IndexConfig;

/// Source of indexed attestations.
#[async_trait]
pub trait AttestationIndex: Send + Sync {
    /// Run `query` with the filter's variables.
    async fn query(&self, query: &str, filter: &AttestationFilter) -> IndexQueryOutcome;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<AttestationPayload>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// HTTP implementation of [`AttestationIndex`].
#[derive(Debug, Clone)]
pub struct HttpAttestationIndex {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAttestationIndex {
    pub fn new(config: &IndexConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn fetch(&self, query: &str, filter: &AttestationFilter) -> reqwest::Result<GraphQlResponse> {
        self.client
            .post(&self.endpoint)
            .json(&GraphQlRequest {
                query,
                variables: filter.to_variables(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl AttestationIndex for HttpAttestationIndex {
    async fn query(&self, query: &str, filter: &AttestationFilter) -> IndexQueryOutcome {
        let response = match self.fetch(query, filter).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    recipient = %filter.recipient,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Attestation index request failed"
                );
                return IndexQueryOutcome::failed();
            }
        };

        for error in &response.errors {
            tracing::warn!(endpoint = %self.endpoint, message = %error.message, "Attestation index query error");
        }

        match response.data {
            Some(payload) => {
                tracing::debug!(
                    recipient = %filter.recipient,
                    count = payload.attestations.len(),
                    "Attestation index answered"
                );
                IndexQueryOutcome::ok(payload)
            }
            None => IndexQueryOutcome::null_payload(),
        }
    }
}
