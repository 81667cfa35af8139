use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tally_core::{GatewayError, PaymentGateway, PaymentSession, SessionLineItem};
use tracing::debug;
use uuid::Uuid;

/// Payment service client. Called exactly once per successful creation,
/// after the order is durably persisted; no idempotency key is attached.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest<'a> {
    order_id: Uuid,
    currency: &'a str,
    items: &'a [SessionLineItem],
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_session(
        &self,
        order_id: Uuid,
        currency: &str,
        items: &[SessionLineItem],
    ) -> Result<PaymentSession, GatewayError> {
        let url = format!("{}/payments/sessions", self.base_url);
        debug!(%order_id, "requesting payment session");

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest { order_id, currency, items })
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Remote { status: status.as_u16(), message });
        }

        response
            .json::<PaymentSession>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
