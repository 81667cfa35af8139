use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tally_core::{CatalogGateway, CatalogProduct, GatewayError};
use tracing::debug;
use uuid::Uuid;

/// Catalog service client. One request covers the whole id set per call;
/// a transport error surfaces to the caller, there is no retry here.
pub struct HttpCatalogGateway {
    client: Client,
    base_url: String,
}

impl HttpCatalogGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl CatalogGateway for HttpCatalogGateway {
    async fn validate_products(&self, ids: &[Uuid]) -> Result<Vec<CatalogProduct>, GatewayError> {
        let url = format!("{}/products/validate", self.base_url);
        debug!(count = ids.len(), "validating products against catalog");

        let response = self
            .client
            .post(&url)
            .json(&ids)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Remote { status: status.as_u16(), message });
        }

        response
            .json::<Vec<CatalogProduct>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
