//! # Coordination Service Transport
//!
//! `reqwest` implementation of [`ProposalTransport`].

use crate::errors::TransportError;
use crate::ports::outbound::{ProposalTransport, TransportResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP transport to the coordination service.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("cosigner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProposalTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connection(format!("cannot connect to {url}"))
                } else {
                    TransportError::Http(e)
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(url, status, "coordination service responded");

        Ok(TransportResponse { status, body })
    }
}
