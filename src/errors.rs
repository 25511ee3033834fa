use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("QR encoding failed")]
    Encode { detail: Option<String> },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Invalid request parameters",
                    "details": validation_details(&errors),
                })),
            )
                .into_response(),
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({
                    "success": false,
                    "error": "Too many requests",
                    "message": format!(
                        "Rate limit exceeded. Try again in {retry_after_secs} seconds."
                    ),
                })),
            )
                .into_response(),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({"error": "Method not allowed"})),
            )
                .into_response(),
            AppError::Encode { detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to generate QR code",
                    "message": detail
                        .unwrap_or_else(|| "An unexpected error occurred".to_string()),
                })),
            )
                .into_response(),
        }
    }
}

fn validation_details(errors: &ValidationErrors) -> Vec<serde_json::Value> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(|err| {
                let message = err
                    .message
                    .clone()
                    .unwrap_or_else(|| err.code.clone())
                    .into_owned();
                json!({"field": wire_field(field), "message": message})
            })
        })
        .collect()
}

// Validation errors are keyed by Rust field name; the wire contract is
// camelCase.
fn wire_field(field: &str) -> &str {
    match field {
        "dark_color" => "darkColor",
        "light_color" => "lightColor",
        "error_correction_level" => "errorCorrectionLevel",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_response_shape() {
        let mut errors = ValidationErrors::new();
        errors.add("url".into(), ValidationError::new("invalid_url"));
        errors.add(
            "dark_color".into(),
            ValidationError::new("invalid_hex_color"),
        );

        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid request parameters");
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.iter().any(|d| d["field"] == "url"));
        assert!(details.iter().any(|d| d["field"] == "darkColor"));
    }

    #[tokio::test]
    async fn test_rate_limited_response_carries_retry_after() {
        let response = AppError::RateLimited {
            retry_after_secs: 60,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Too many requests");
    }

    #[tokio::test]
    async fn test_method_not_allowed_body() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_encode_error_hides_detail_when_absent() {
        let response = AppError::Encode { detail: None }.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to generate QR code");
        assert_eq!(body["message"], "An unexpected error occurred");
    }
}
