pub mod models;
pub mod pagination;
pub mod repository;
pub mod service;

pub use models::{NamedOrderItem, NewOrder, Order, OrderItem, OrderReceipt, OrderStatus, OrderWithProducts};
pub use pagination::{OrderPagination, PageMeta};
pub use repository::{OrderStore, StoreError};
pub use service::OrderService;
