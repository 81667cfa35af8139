pub mod catalog;
pub mod payment;

pub use catalog::HttpCatalogGateway;
pub use payment::HttpPaymentGateway;
