use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewOrder, Order, OrderStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("order {0} does not exist")]
    NotFound(Uuid),

    #[error("storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Transactional persistence of the order aggregate.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the order row and all item rows in a single transaction and
    /// return the hydrated aggregate. Status starts at PENDING.
    async fn create_with_items(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetch the aggregate including its items.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Page of raw order rows (no item hydration) plus the total count
    /// matching the filter. Offset-based: skip = (page - 1) * limit.
    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), StoreError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError>;

    /// Atomically set paid, status=PAID, paid_at and the charge id, and
    /// create the receipt. A receipt that already exists for the order is
    /// left untouched, so redelivered payment events are harmless.
    async fn apply_payment(
        &self,
        id: Uuid,
        charge_id: &str,
        receipt_url: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;
}
