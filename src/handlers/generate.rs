use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    clock::SystemClock,
    config::settings::Settings,
    errors::AppError,
    middleware::rate_limit::RateLimiter,
    services::{metrics, qr, qr::EncodeError},
    types::{DataUrlResponse, OutputFormat, QrRequest},
};

// Identical inputs always produce identical output, so responses can be
// cached aggressively upstream.
const CACHE_POLICY: &str = "public, max-age=31536000, immutable";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let config = Arc::new(settings);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, Arc::new(SystemClock)));
        Self { config, limiter }
    }
}

#[axum::debug_handler]
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<QrRequest>,
) -> Result<Response, AppError> {
    let config = req.into_config().map_err(AppError::Validation)?;

    let response = match config.format {
        OutputFormat::Png => {
            let bytes = qr::encode_png(&config).map_err(|e| encode_error(&state.config, e))?;
            (
                [
                    (header::CONTENT_TYPE, "image/png"),
                    (header::CACHE_CONTROL, CACHE_POLICY),
                ],
                bytes,
            )
                .into_response()
        }
        OutputFormat::Svg => {
            let markup = qr::encode_svg(&config).map_err(|e| encode_error(&state.config, e))?;
            (
                [
                    (header::CONTENT_TYPE, "image/svg+xml"),
                    (header::CACHE_CONTROL, CACHE_POLICY),
                ],
                markup,
            )
                .into_response()
        }
        OutputFormat::DataUrl => {
            let data_url =
                qr::encode_data_url(&config).map_err(|e| encode_error(&state.config, e))?;
            (
                [(header::CACHE_CONTROL, CACHE_POLICY)],
                Json(DataUrlResponse {
                    success: true,
                    data_url,
                }),
            )
                .into_response()
        }
    };

    metrics::record_generated(config.format.as_str());
    info!(
        "Generated {} QR code for {}",
        config.format.as_str(),
        config.url
    );
    Ok(response)
}

fn encode_error(settings: &Settings, err: EncodeError) -> AppError {
    metrics::record_encode_failure();
    error!("QR encoding failed: {}", err);
    AppError::Encode {
        detail: (!settings.is_production()).then(|| err.to_string()),
    }
}

pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::build_router;
    use crate::config::rate_limit::RateLimitConfig;

    fn test_app() -> Router {
        build_router(AppState::new(Settings::default()))
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/v1/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_png_with_defaults() {
        let response = test_app()
            .oneshot(post_json(json!({"url": "https://example.com"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_POLICY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn test_generate_svg() {
        let response = test_app()
            .oneshot(post_json(
                json!({"url": "https://example.com", "format": "svg"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let markup = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(markup.starts_with("<svg"));
    }

    #[tokio::test]
    async fn test_generate_data_url() {
        let response = test_app()
            .oneshot(post_json(json!({
                "url": "https://example.com",
                "format": "dataURL",
                "size": 500,
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(
            body["dataURL"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[tokio::test]
    async fn test_invalid_url_returns_400_with_details() {
        let response = test_app()
            .oneshot(post_json(json!({"url": "not-a-url", "format": "svg"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid request parameters");
        let details = body["details"].as_array().unwrap();
        assert!(details.iter().any(|d| d["field"] == "url"));
    }

    #[tokio::test]
    async fn test_invalid_color_returns_400_naming_the_field() {
        let response = test_app()
            .oneshot(post_json(json!({
                "url": "https://example.com",
                "darkColor": "#12",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let details = body["details"].as_array().unwrap();
        assert!(details.iter().any(|d| d["field"] == "darkColor"));
    }

    #[tokio::test]
    async fn test_identical_requests_produce_identical_bytes() {
        let request = json!({
            "url": "https://example.com",
            "format": "png",
            "size": 300,
            "darkColor": "#000000",
            "lightColor": "#ffffff",
            "errorCorrectionLevel": "M",
            "margin": 4,
        });
        let app = test_app();

        let first = app.clone().oneshot(post_json(request.clone())).await.unwrap();
        let second = app.oneshot(post_json(request)).await.unwrap();

        let first = to_bytes(first.into_body(), usize::MAX).await.unwrap();
        let second = to_bytes(second.into_body(), usize::MAX).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_returns_405() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/v1/generate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_options_returns_200_with_empty_body() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/v1/generate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_preflight_carries_cors_headers() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/v1/generate")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_MAX_AGE],
            "86400"
        );
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_with_429_and_retry_after() {
        let settings = Settings {
            rate_limit: RateLimitConfig {
                generate_requests_per_minute: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let app = build_router(AppState::new(settings));

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post_json(json!({"url": "https://example.com"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(post_json(json!({"url": "https://example.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Too many requests");
    }
}
