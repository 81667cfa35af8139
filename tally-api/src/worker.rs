use std::sync::Arc;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tally_orders::service::PaidOrderEvent;
use tally_orders::OrderService;
use tracing::{error, info};

/// Consumes payment-succeeded notifications. There is no reply channel:
/// failures are logged and the loop keeps running. Delivery is at least
/// once; the store's receipt guard makes reapplication harmless.
pub async fn start_payment_worker(
    brokers: String,
    group_id: String,
    topic: String,
    orders: Arc<OrderService>,
) {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Consumer creation failed");

    consumer.subscribe(&[topic.as_str()]).expect("Can't subscribe");

    info!("Payment worker started, listening to {}", topic);

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                if let Some(payload) = m.payload_view::<str>() {
                    match payload {
                        Ok(raw) => match serde_json::from_str::<PaidOrderEvent>(raw) {
                            Ok(event) => {
                                let order_id = event.order_id;
                                if let Err(e) = orders.apply_payment(event).await {
                                    error!("Failed to apply payment for order {}: {}", order_id, e);
                                }
                            }
                            Err(e) => error!("Malformed payment event: {}", e),
                        },
                        Err(e) => error!("Error reading payload: {}", e),
                    }
                }
            }
        }
    }
}
