use std::sync::Arc;

use tally_orders::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
}
