use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog record resolved for a prospective order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: Uuid,
    /// Unit price in minor units.
    pub price: i32,
    pub name: String,
}

/// A named, priced line forwarded to the payment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub price: i32,
    pub quantity: i32,
}

/// Opaque session handle returned by the payment service. Passed through
/// to the caller without interpretation.
pub type PaymentSession = serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("remote call failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("could not decode remote response: {0}")]
    Decode(String),
}

/// Outbound seam to the catalog service.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Resolve the given product ids against the catalog.
    ///
    /// Returns the records the catalog knows about; callers decide whether
    /// a partial result is acceptable. One call covers the whole id set.
    async fn validate_products(&self, ids: &[Uuid]) -> Result<Vec<CatalogProduct>, GatewayError>;
}

/// Outbound seam to the payment service.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for a persisted, priced order.
    async fn create_session(
        &self,
        order_id: Uuid,
        currency: &str,
        items: &[SessionLineItem],
    ) -> Result<PaymentSession, GatewayError>;
}
