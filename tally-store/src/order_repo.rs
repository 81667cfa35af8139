use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tally_orders::models::{NewOrder, Order, OrderItem, OrderReceipt, OrderStatus};
use tally_orders::repository::{OrderStore, StoreError};
use uuid::Uuid;

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    status: String,
    paid: bool,
    paid_at: Option<DateTime<Utc>>,
    total_amount: i64,
    total_items: i32,
    payment_charge_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: Uuid,
    quantity: i32,
    price: i32,
}

#[derive(sqlx::FromRow)]
struct ReceiptRow {
    receipt_url: String,
    created_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str =
    "id, status, paid, paid_at, total_amount, total_items, payment_charge_id, created_at, updated_at";

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>, receipt: Option<OrderReceipt>) -> Result<Order, StoreError> {
        let status: OrderStatus =
            self.status.parse().map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(Order {
            id: self.id,
            status,
            paid: self.paid,
            paid_at: self.paid_at,
            total_amount: self.total_amount,
            total_items: self.total_items,
            payment_charge_id: self.payment_charge_id,
            items,
            receipt,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PgOrderStore {
    async fn hydrate(&self, id: Uuid) -> Result<Order, StoreError> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_with_items(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let order_id: Uuid = sqlx::query_scalar(
            "INSERT INTO orders (status, total_amount, total_items) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_amount)
        .bind(order.total_items)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;

        self.hydrate(order_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let items = item_rows
            .into_iter()
            .map(|r| OrderItem { product_id: r.product_id, quantity: r.quantity, price: r.price })
            .collect();

        let receipt: Option<ReceiptRow> = sqlx::query_as(
            "SELECT receipt_url, created_at FROM order_receipts WHERE order_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let receipt =
            receipt.map(|r| OrderReceipt { receipt_url: r.receipt_url, created_at: r.created_at });

        Some(row.into_order(items, receipt)).transpose()
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), StoreError> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let (total, rows): (i64, Vec<OrderRow>) = match status {
            Some(status) => {
                let total = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(backend)?;
                let rows = sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC OFFSET $2 LIMIT $3"
                ))
                .bind(status.as_str())
                .bind(offset)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;
                (total, rows)
            }
            None => {
                let total = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(backend)?;
                let rows = sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC OFFSET $1 LIMIT $2"
                ))
                .bind(offset)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;
                (total, rows)
            }
        };

        let orders = rows
            .into_iter()
            .map(|row| row.into_order(Vec::new(), None))
            .collect::<Result<Vec<Order>, StoreError>>()?;

        Ok((orders, total as u64))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
        let result = sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        self.hydrate(id).await
    }

    async fn apply_payment(
        &self,
        id: Uuid,
        charge_id: &str,
        receipt_url: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let result = sqlx::query(
            "UPDATE orders SET status = $1, paid = TRUE, paid_at = $2, payment_charge_id = $3, updated_at = NOW() WHERE id = $4",
        )
        .bind(OrderStatus::Paid.as_str())
        .bind(paid_at)
        .bind(charge_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        // redelivered events must not create a second receipt
        sqlx::query(
            "INSERT INTO order_receipts (order_id, receipt_url) VALUES ($1, $2) ON CONFLICT (order_id) DO NOTHING",
        )
        .bind(id)
        .bind(receipt_url)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        self.hydrate(id).await
    }
}
