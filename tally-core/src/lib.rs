pub mod gateway;

pub use gateway::{
    CatalogGateway, CatalogProduct, GatewayError, PaymentGateway, PaymentSession, SessionLineItem,
};
