use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tally_orders::service::OrderError;

/// Every failing operation replies with an RPC-style error object: a
/// status code plus a message, never a raw crash.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Order(OrderError),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Order(err) => match &err {
                OrderError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                // one generic message for the whole create flow; the cause
                // stays in the logs
                OrderError::CreateRejected(cause) => {
                    tracing::warn!(cause = ?cause, "order creation rejected");
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                OrderError::PaymentSession(source) => {
                    tracing::error!(error = ?source, "payment session creation failed");
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
                OrderError::NameResolution(source) => {
                    tracing::error!(error = ?source, "catalog name resolution failed");
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
                OrderError::Store(source) => {
                    tracing::error!(error = ?source, "storage failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
                }
            },
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}
