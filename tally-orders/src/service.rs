use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tally_core::{
    CatalogGateway, CatalogProduct, GatewayError, PaymentGateway, PaymentSession, SessionLineItem,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{NewOrder, Order, OrderItem, OrderStatus, OrderWithProducts};
use crate::pagination::{OrderPagination, PageMeta};
use crate::repository::{OrderStore, StoreError};

/// Fixed currency tag forwarded to the payment service.
pub const CURRENCY: &str = "usd";

/// A requested order line, before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub items: Vec<LineItemRequest>,
}

/// Reply to a successful creation: the priced order plus the session the
/// caller redirects the customer to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: OrderWithProducts,
    pub payment_session: PaymentSession,
}

#[derive(Debug, Serialize)]
pub struct PagedOrders {
    pub data: Vec<Order>,
    pub meta: PageMeta,
}

/// Payment-succeeded notification consumed off the bus. No reply channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidOrderEvent {
    pub order_id: Uuid,
    pub stripe_payment_id: String,
    pub receipt_url: String,
}

/// Why a creation request was rejected. Collapsed to one generic client
/// fault at the boundary; the tag survives for logs.
#[derive(Debug, thiserror::Error)]
pub enum CreateFailure {
    #[error("order has no line items")]
    EmptyOrder,

    #[error("line for product {0} has a non-positive quantity")]
    InvalidQuantity(Uuid),

    #[error("products not known to the catalog: {0:?}")]
    UnknownProducts(Vec<Uuid>),

    #[error("catalog validation call failed")]
    Catalog(#[source] GatewayError),

    #[error("order persistence failed")]
    Store(#[source] StoreError),
}

/// Why a read-time name resolution failed.
#[derive(Debug, thiserror::Error)]
pub enum NameResolutionFailure {
    #[error("catalog call failed")]
    Gateway(#[source] GatewayError),

    #[error("catalog response did not cover stored products: {0:?}")]
    Missing(Vec<Uuid>),
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order with id {0} not found")]
    NotFound(Uuid),

    /// Creation failed. The message is fixed; the cause is logged, not leaked.
    #[error("Check products failed")]
    CreateRejected(#[source] CreateFailure),

    /// The order was persisted but no session could be opened. Not rolled back.
    #[error("Failed to create payment session")]
    PaymentSession(#[source] GatewayError),

    #[error("Product name resolution failed")]
    NameResolution(#[source] NameResolutionFailure),

    #[error("storage error")]
    Store(#[from] StoreError),
}

/// The order lifecycle orchestrator.
///
/// Holds its three collaborators behind trait objects; connection
/// lifecycles belong to the process bootstrap, not to this type.
pub struct OrderService {
    catalog: Arc<dyn CatalogGateway>,
    payments: Arc<dyn PaymentGateway>,
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        payments: Arc<dyn PaymentGateway>,
        store: Arc<dyn OrderStore>,
    ) -> Self {
        Self { catalog, payments, store }
    }

    /// Create flow: validate products, snapshot prices, persist atomically,
    /// then open a payment session for the persisted order.
    ///
    /// Catalog validation must succeed before anything is written. A payment
    /// failure after persistence leaves the order PENDING with no session.
    pub async fn create(&self, req: CreateOrder) -> Result<CreatedOrder, OrderError> {
        if req.items.is_empty() {
            return Err(OrderError::CreateRejected(CreateFailure::EmptyOrder));
        }
        if let Some(bad) = req.items.iter().find(|line| line.quantity < 1) {
            return Err(OrderError::CreateRejected(CreateFailure::InvalidQuantity(bad.product_id)));
        }

        // 1. confirm the products
        let mut ids: Vec<Uuid> = req.items.iter().map(|line| line.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = self
            .catalog
            .validate_products(&ids)
            .await
            .map_err(|e| OrderError::CreateRejected(CreateFailure::Catalog(e)))?;

        let by_id: HashMap<Uuid, &CatalogProduct> = products.iter().map(|p| (p.id, p)).collect();
        let missing: Vec<Uuid> = ids.iter().copied().filter(|id| !by_id.contains_key(id)).collect();
        if !missing.is_empty() {
            return Err(OrderError::CreateRejected(CreateFailure::UnknownProducts(missing)));
        }

        // 2. snapshot prices and derive the totals
        let mut items = Vec::with_capacity(req.items.len());
        let mut total_amount: i64 = 0;
        let mut total_items: i32 = 0;
        for line in &req.items {
            let price = by_id[&line.product_id].price;
            total_amount += price as i64 * line.quantity as i64;
            total_items += line.quantity;
            items.push(OrderItem { product_id: line.product_id, quantity: line.quantity, price });
        }

        // 3. persist order + items in one transaction
        let order = self
            .store
            .create_with_items(NewOrder { total_amount, total_items, items })
            .await
            .map_err(|e| OrderError::CreateRejected(CreateFailure::Store(e)))?;

        info!(order_id = %order.id, total_amount, total_items, "order created");

        // 4. names for the reply come from the validation call; coverage was
        //    checked above
        let order = OrderWithProducts::join(order, &products)
            .map_err(|missing| OrderError::CreateRejected(CreateFailure::UnknownProducts(missing)))?;

        // 5. open the payment session for the persisted order
        let session_items: Vec<SessionLineItem> = order
            .items
            .iter()
            .map(|item| SessionLineItem {
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
            })
            .collect();

        let payment_session = self
            .payments
            .create_session(order.id, CURRENCY, &session_items)
            .await
            .map_err(OrderError::PaymentSession)?;

        Ok(CreatedOrder { order, payment_session })
    }

    /// Read flow: fetch the aggregate and re-resolve item names live.
    /// The catalog is the only source of truth for display names, so a
    /// failed resolution fails the read.
    pub async fn find_one(&self, id: Uuid) -> Result<OrderWithProducts, OrderError> {
        let order = self.store.find_by_id(id).await?.ok_or(OrderError::NotFound(id))?;

        let mut ids: Vec<Uuid> = order.items.iter().map(|item| item.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = self
            .catalog
            .validate_products(&ids)
            .await
            .map_err(|e| OrderError::NameResolution(NameResolutionFailure::Gateway(e)))?;

        OrderWithProducts::join(order, &products).map_err(|missing| {
            warn!(order_id = %id, ?missing, "catalog no longer resolves stored products");
            OrderError::NameResolution(NameResolutionFailure::Missing(missing))
        })
    }

    /// List flow: raw rows only, no item hydration and no catalog join.
    pub async fn find_all(&self, query: OrderPagination) -> Result<PagedOrders, OrderError> {
        let (data, total_count) = self.store.list(query.status, query.page, query.limit).await?;
        Ok(PagedOrders { data, meta: PageMeta::new(total_count, query.page, query.limit) })
    }

    /// Manual status change. A request for the current status is an
    /// idempotent no-op; any other requested status is written as-is, no
    /// transition table is consulted.
    pub async fn change_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderWithProducts, OrderError> {
        let current = self.find_one(id).await?;
        if current.status == status {
            return Ok(current);
        }

        let updated = self.store.update_status(id, status).await.map_err(not_found_or_store(id))?;
        info!(order_id = %id, status = %updated.status, "order status changed");

        // keep the names the lookup already resolved
        let mut result = current;
        result.status = updated.status;
        result.updated_at = updated.updated_at;
        Ok(result)
    }

    /// Apply a payment-succeeded event. Called unconditionally; redelivery
    /// is safe because the store guards the receipt insert.
    pub async fn apply_payment(&self, event: PaidOrderEvent) -> Result<Order, OrderError> {
        info!(order_id = %event.order_id, charge_id = %event.stripe_payment_id, "order paid");
        self.store
            .apply_payment(event.order_id, &event.stripe_payment_id, &event.receipt_url, Utc::now())
            .await
            .map_err(not_found_or_store(event.order_id))
    }
}

fn not_found_or_store(id: Uuid) -> impl Fn(StoreError) -> OrderError {
    move |e| match e {
        StoreError::NotFound(_) => OrderError::NotFound(id),
        other => OrderError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderReceipt;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubCatalog {
        products: Mutex<Vec<CatalogProduct>>,
        fail: bool,
    }

    impl StubCatalog {
        fn with(products: Vec<CatalogProduct>) -> Self {
            Self { products: Mutex::new(products), fail: false }
        }

        fn down() -> Self {
            Self { products: Mutex::new(Vec::new()), fail: true }
        }

        fn set_product(&self, product: CatalogProduct) {
            let mut products = self.products.lock().unwrap();
            products.retain(|p| p.id != product.id);
            products.push(product);
        }
    }

    #[async_trait]
    impl CatalogGateway for StubCatalog {
        async fn validate_products(&self, ids: &[Uuid]) -> Result<Vec<CatalogProduct>, GatewayError> {
            if self.fail {
                return Err(GatewayError::Transport("connection refused".into()));
            }
            let products = self.products.lock().unwrap();
            Ok(products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
        }
    }

    struct StubPayments {
        fail: bool,
        sessions: AtomicUsize,
    }

    impl StubPayments {
        fn ok() -> Self {
            Self { fail: false, sessions: AtomicUsize::new(0) }
        }

        fn down() -> Self {
            Self { fail: true, sessions: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl PaymentGateway for StubPayments {
        async fn create_session(
            &self,
            order_id: Uuid,
            currency: &str,
            _items: &[SessionLineItem],
        ) -> Result<PaymentSession, GatewayError> {
            if self.fail {
                return Err(GatewayError::Remote { status: 503, message: "unavailable".into() });
            }
            self.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({
                "id": format!("cs_test_{}", order_id.simple()),
                "currency": currency,
            }))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        orders: Mutex<Vec<Order>>,
        writes: AtomicUsize,
        receipts_created: AtomicUsize,
    }

    impl MemoryStore {
        fn order(&self, id: Uuid) -> Option<Order> {
            self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned()
        }

        fn len(&self) -> usize {
            self.orders.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OrderStore for MemoryStore {
        async fn create_with_items(&self, order: NewOrder) -> Result<Order, StoreError> {
            let now = Utc::now();
            let created = Order {
                id: Uuid::new_v4(),
                status: OrderStatus::Pending,
                paid: false,
                paid_at: None,
                total_amount: order.total_amount,
                total_items: order.total_items,
                payment_charge_id: None,
                items: order.items,
                receipt: None,
                created_at: now,
                updated_at: now,
            };
            self.orders.lock().unwrap().push(created.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(created)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
            Ok(self.order(id))
        }

        async fn list(
            &self,
            status: Option<OrderStatus>,
            page: u32,
            limit: u32,
        ) -> Result<(Vec<Order>, u64), StoreError> {
            let orders = self.orders.lock().unwrap();
            let matching: Vec<Order> = orders
                .iter()
                .filter(|o| status.map_or(true, |s| o.status == s))
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let skip = (page.saturating_sub(1) as usize) * limit as usize;
            let data = matching.into_iter().skip(skip).take(limit as usize).collect();
            Ok((data, total))
        }

        async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(StoreError::NotFound(id))?;
            order.status = status;
            order.updated_at = Utc::now();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(order.clone())
        }

        async fn apply_payment(
            &self,
            id: Uuid,
            charge_id: &str,
            receipt_url: &str,
            paid_at: DateTime<Utc>,
        ) -> Result<Order, StoreError> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(StoreError::NotFound(id))?;
            order.status = OrderStatus::Paid;
            order.paid = true;
            order.paid_at = Some(paid_at);
            order.payment_charge_id = Some(charge_id.to_string());
            if order.receipt.is_none() {
                order.receipt =
                    Some(OrderReceipt { receipt_url: receipt_url.to_string(), created_at: paid_at });
                self.receipts_created.fetch_add(1, Ordering::SeqCst);
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(order.clone())
        }
    }

    struct Harness {
        catalog: Arc<StubCatalog>,
        payments: Arc<StubPayments>,
        store: Arc<MemoryStore>,
        service: OrderService,
    }

    fn harness(catalog: StubCatalog, payments: StubPayments) -> Harness {
        let catalog = Arc::new(catalog);
        let payments = Arc::new(payments);
        let store = Arc::new(MemoryStore::default());
        let service =
            OrderService::new(catalog.clone(), payments.clone(), store.clone());
        Harness { catalog, payments, store, service }
    }

    fn widget(id: Uuid, price: i32) -> CatalogProduct {
        CatalogProduct { id, price, name: "Widget".into() }
    }

    fn request(lines: &[(Uuid, i32)]) -> CreateOrder {
        CreateOrder {
            items: lines
                .iter()
                .map(|&(product_id, quantity)| LineItemRequest { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_snapshots_prices_and_opens_a_session() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());

        let created = h.service.create(request(&[(product_id, 2)])).await.unwrap();

        assert_eq!(created.order.total_amount, 10);
        assert_eq!(created.order.total_items, 2);
        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.items.len(), 1);
        let item = &created.order.items[0];
        assert_eq!(item.product_id, product_id);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, 5);
        assert_eq!(item.name, "Widget");
        assert!(created.payment_session.get("id").is_some());
        assert_eq!(h.payments.sessions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_prices_duplicate_lines_independently() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 7)]), StubPayments::ok());

        let created =
            h.service.create(request(&[(product_id, 1), (product_id, 3)])).await.unwrap();

        assert_eq!(created.order.total_amount, 28);
        assert_eq!(created.order.total_items, 4);
        assert_eq!(created.order.items.len(), 2);
    }

    #[tokio::test]
    async fn create_with_unknown_product_writes_nothing() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(known, 5)]), StubPayments::ok());

        let err = h.service.create(request(&[(known, 1), (unknown, 1)])).await.unwrap_err();

        assert_eq!(err.to_string(), "Check products failed");
        match err {
            OrderError::CreateRejected(CreateFailure::UnknownProducts(ids)) => {
                assert_eq!(ids, vec![unknown]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.store.len(), 0);
        assert_eq!(h.payments.sessions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_with_catalog_down_writes_nothing() {
        let h = harness(StubCatalog::down(), StubPayments::ok());

        let err = h.service.create(request(&[(Uuid::new_v4(), 1)])).await.unwrap_err();

        assert_eq!(err.to_string(), "Check products failed");
        assert!(matches!(err, OrderError::CreateRejected(CreateFailure::Catalog(_))));
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn create_with_no_lines_is_rejected() {
        let h = harness(StubCatalog::with(vec![]), StubPayments::ok());

        let err = h.service.create(CreateOrder { items: vec![] }).await.unwrap_err();

        assert!(matches!(err, OrderError::CreateRejected(CreateFailure::EmptyOrder)));
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn payment_failure_keeps_the_persisted_order() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::down());

        let err = h.service.create(request(&[(product_id, 2)])).await.unwrap_err();

        assert!(matches!(err, OrderError::PaymentSession(_)));
        assert_eq!(h.store.len(), 1);
        let order = h.store.orders.lock().unwrap()[0].clone();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment_charge_id.is_none());
    }

    #[tokio::test]
    async fn totals_do_not_move_with_later_catalog_prices() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());

        let created = h.service.create(request(&[(product_id, 2)])).await.unwrap();

        h.catalog.set_product(CatalogProduct { id: product_id, price: 9, name: "Widget".into() });

        let read = h.service.find_one(created.order.id).await.unwrap();
        assert_eq!(read.total_amount, 10);
        assert_eq!(read.items[0].price, 5);
    }

    #[tokio::test]
    async fn reads_reflect_catalog_renames() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());

        let created = h.service.create(request(&[(product_id, 1)])).await.unwrap();

        h.catalog.set_product(CatalogProduct { id: product_id, price: 5, name: "Gadget".into() });

        let read = h.service.find_one(created.order.id).await.unwrap();
        assert_eq!(read.items[0].name, "Gadget");
    }

    #[tokio::test]
    async fn find_one_unknown_id_names_the_id() {
        let h = harness(StubCatalog::with(vec![]), StubPayments::ok());
        let id = Uuid::new_v4();

        let err = h.service.find_one(id).await.unwrap_err();

        assert!(matches!(err, OrderError::NotFound(got) if got == id));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[tokio::test]
    async fn find_one_fails_when_catalog_is_down() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());
        let created = h.service.create(request(&[(product_id, 1)])).await.unwrap();

        // simulate the catalog going away between create and read
        let down = harness(StubCatalog::down(), StubPayments::ok());
        let service = OrderService::new(down.catalog.clone(), h.payments.clone(), h.store.clone());

        let err = service.find_one(created.order.id).await.unwrap_err();
        assert!(matches!(err, OrderError::NameResolution(NameResolutionFailure::Gateway(_))));
    }

    #[tokio::test]
    async fn change_to_current_status_writes_nothing() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());
        let created = h.service.create(request(&[(product_id, 1)])).await.unwrap();
        let writes_before = h.store.writes.load(Ordering::SeqCst);

        let unchanged =
            h.service.change_status(created.order.id, OrderStatus::Pending).await.unwrap();

        assert_eq!(unchanged.status, OrderStatus::Pending);
        assert_eq!(h.store.writes.load(Ordering::SeqCst), writes_before);
    }

    #[tokio::test]
    async fn change_status_writes_any_requested_value() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());
        let created = h.service.create(request(&[(product_id, 1)])).await.unwrap();

        let updated =
            h.service.change_status(created.order.id, OrderStatus::Cancelled).await.unwrap();

        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(updated.items[0].name, "Widget");
        assert_eq!(
            h.store.order(created.order.id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn change_status_of_unknown_order_is_not_found() {
        let h = harness(StubCatalog::with(vec![]), StubPayments::ok());
        let id = Uuid::new_v4();

        let err = h.service.change_status(id, OrderStatus::Paid).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(got) if got == id));
    }

    #[tokio::test]
    async fn apply_payment_sets_all_paid_facts() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());
        let created = h.service.create(request(&[(product_id, 2)])).await.unwrap();

        let event = PaidOrderEvent {
            order_id: created.order.id,
            stripe_payment_id: "ch_123".into(),
            receipt_url: "https://pay.example/r/123".into(),
        };
        h.service.apply_payment(event).await.unwrap();

        let order = h.store.order(created.order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.paid);
        assert!(order.paid_at.is_some());
        assert_eq!(order.payment_charge_id.as_deref(), Some("ch_123"));
        let receipt = order.receipt.unwrap();
        assert_eq!(receipt.receipt_url, "https://pay.example/r/123");
    }

    #[tokio::test]
    async fn redelivered_payment_event_creates_one_receipt() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 5)]), StubPayments::ok());
        let created = h.service.create(request(&[(product_id, 2)])).await.unwrap();

        let event = PaidOrderEvent {
            order_id: created.order.id,
            stripe_payment_id: "ch_123".into(),
            receipt_url: "https://pay.example/r/123".into(),
        };
        h.service.apply_payment(event.clone()).await.unwrap();
        h.service.apply_payment(event).await.unwrap();

        assert_eq!(h.store.receipts_created.load(Ordering::SeqCst), 1);
        let order = h.store.order(created.order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn apply_payment_for_unknown_order_is_not_found() {
        let h = harness(StubCatalog::with(vec![]), StubPayments::ok());
        let event = PaidOrderEvent {
            order_id: Uuid::new_v4(),
            stripe_payment_id: "ch_void".into(),
            receipt_url: "https://pay.example/r/void".into(),
        };

        let err = h.service.apply_payment(event).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_all_filters_and_reports_last_page() {
        let product_id = Uuid::new_v4();
        let h = harness(StubCatalog::with(vec![widget(product_id, 2)]), StubPayments::ok());
        for _ in 0..5 {
            h.service.create(request(&[(product_id, 1)])).await.unwrap();
        }
        let paid_id = h.store.orders.lock().unwrap()[0].id;
        h.service
            .apply_payment(PaidOrderEvent {
                order_id: paid_id,
                stripe_payment_id: "ch_1".into(),
                receipt_url: "https://pay.example/r/1".into(),
            })
            .await
            .unwrap();

        let all = h
            .service
            .find_all(OrderPagination { page: 1, limit: 2, status: None })
            .await
            .unwrap();
        assert_eq!(all.data.len(), 2);
        assert_eq!(all.meta.last_page, 3);
        assert_eq!(all.meta.total_page, 3);
        assert_eq!(all.meta.page, 1);

        let paid = h
            .service
            .find_all(OrderPagination { page: 1, limit: 2, status: Some(OrderStatus::Paid) })
            .await
            .unwrap();
        assert_eq!(paid.data.len(), 1);
        assert_eq!(paid.meta.last_page, 1);
    }
}
