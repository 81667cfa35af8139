use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tally_api::{app, worker, AppState};
use tally_gateway::{HttpCatalogGateway, HttpPaymentGateway};
use tally_orders::OrderService;
use tally_store::{Config, DbClient, PgOrderStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tally_api=debug,tally_orders=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Tally orders service on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");
    db.migrate().await.expect("Failed to run migrations");

    let catalog = HttpCatalogGateway::new(
        &config.catalog.base_url,
        Duration::from_millis(config.catalog.timeout_ms),
    )
    .expect("Failed to build catalog client");
    let payments = HttpPaymentGateway::new(
        &config.payment.base_url,
        Duration::from_millis(config.payment.timeout_ms),
    )
    .expect("Failed to build payment client");

    let orders = Arc::new(OrderService::new(
        Arc::new(catalog),
        Arc::new(payments),
        Arc::new(PgOrderStore::new(db.pool.clone())),
    ));

    tokio::spawn(worker::start_payment_worker(
        config.kafka.brokers.clone(),
        config.kafka.group_id.clone(),
        config.kafka.payment_topic.clone(),
        orders.clone(),
    ));

    let app = app(AppState { orders });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
