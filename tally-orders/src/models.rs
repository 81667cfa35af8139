use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::CatalogProduct;
use uuid::Uuid;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid order status '{0}', possible values are PENDING, PAID, CANCELLED")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// The order aggregate as persisted. Item names are never stored; they are
/// joined in from the catalog at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// Sum of price x quantity in minor units, fixed at creation.
    pub total_amount: i64,
    /// Sum of quantities across line items, fixed at creation.
    pub total_items: i32,
    pub payment_charge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub receipt: Option<OrderReceipt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line within an order, with the unit price snapshotted at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i32,
}

/// Receipt reference created when the payment is applied. At most one per
/// order; the store enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub receipt_url: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload handed to the store: totals are derived exactly once by
/// the orchestrator, items carry their snapshotted prices.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub total_amount: i64,
    pub total_items: i32,
    pub items: Vec<OrderItem>,
}

/// An order line with its display name resolved from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i32,
    pub name: String,
}

/// Read model: an order with item names joined in live from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithProducts {
    pub id: Uuid,
    pub status: OrderStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub total_amount: i64,
    pub total_items: i32,
    pub payment_charge_id: Option<String>,
    pub items: Vec<NamedOrderItem>,
    #[serde(default)]
    pub receipt: Option<OrderReceipt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderWithProducts {
    /// Join catalog names onto the order's items. Ids the catalog response
    /// does not cover are returned as the error.
    pub fn join(order: Order, products: &[CatalogProduct]) -> Result<Self, Vec<Uuid>> {
        let by_id: HashMap<Uuid, &CatalogProduct> = products.iter().map(|p| (p.id, p)).collect();

        let mut missing = Vec::new();
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            match by_id.get(&item.product_id) {
                Some(product) => items.push(NamedOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    name: product.name.clone(),
                }),
                None => missing.push(item.product_id),
            }
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Self {
            id: order.id,
            status: order.status,
            paid: order.paid,
            paid_at: order.paid_at,
            total_amount: order.total_amount,
            total_items: order.total_items,
            payment_charge_id: order.payment_charge_id,
            items,
            receipt: order.receipt,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}
