use axum::response::IntoResponse;
use prometheus::Encoder;

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&prometheus::gather(), &mut buffer).unwrap();
    (axum::http::StatusCode::OK, buffer)
}
