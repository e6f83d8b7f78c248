//! HTTP request handlers for the Deduction Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{apply_relief, compute_deductions, compute_tax_breakdown};

use super::request::{BreakdownRequest, CalculationRequest};
use super::response::{ApiError, ApiErrorResponse, BreakdownResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/breakdown", post(breakdown_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a basic and supplemental amount and returns the full deduction result.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Err(error) = request.validate() {
        warn!(
            correlation_id = %correlation_id,
            error = %error.message,
            "Calculation request failed validation"
        );
        return error_response(ApiErrorResponse::bad_request(error));
    }

    let start_time = Instant::now();
    match compute_deductions(
        request.basic_amount,
        request.supplemental_amount,
        state.config().schedule(),
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                gross_amount = %result.gross_amount,
                tax = %result.tax,
                net_amount = %result.net_amount,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /breakdown endpoint.
///
/// Itemises the tax on a taxable amount band by band.
async fn breakdown_handler(
    State(state): State<AppState>,
    payload: Result<Json<BreakdownRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing breakdown request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Err(error) = request.validate() {
        warn!(
            correlation_id = %correlation_id,
            error = %error.message,
            "Breakdown request failed validation"
        );
        return error_response(ApiErrorResponse::bad_request(error));
    }

    let table = state.config().schedule().tier_table();
    match compute_tax_breakdown(request.taxable_amount, table) {
        Ok(breakdown) => {
            let tax = apply_relief(breakdown.total_tax_before_relief, table.relief());
            info!(
                correlation_id = %correlation_id,
                taxable_amount = %request.taxable_amount,
                bands_used = breakdown.entries.len(),
                tax = %tax,
                "Breakdown completed successfully"
            );
            json_response(
                StatusCode::OK,
                BreakdownResponse {
                    taxable_amount: request.taxable_amount,
                    entries: breakdown.entries,
                    total_tax_before_relief: breakdown.total_tax_before_relief,
                    relief: table.relief(),
                    tax,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Breakdown failed"
            );
            error_response(err.into())
        }
    }
}

/// Maps a JSON extraction failure to a `400` response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(ApiErrorResponse::bad_request(error))
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, api_error.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::DeductionResult;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/ke_2024").expect("Failed to load config");
        AppState::new(config)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn post(uri: &str, body: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec(), content_type)
    }

    #[tokio::test]
    async fn test_api_001_valid_request_returns_200() {
        let (status, body, content_type) = post(
            "/calculate",
            r#"{"basic_amount": "50000", "supplemental_amount": "10000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let result: DeductionResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.gross_amount, dec("60000"));
        assert_eq!(result.tax, dec("9303.15"));
        assert_eq!(result.net_amount, dec("44546.85"));
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let (status, body, _) = post("/calculate", "{invalid json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_basic_amount_returns_400() {
        let (status, body, _) = post("/calculate", r#"{"supplemental_amount": "10"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_api_004_negative_amount_returns_400() {
        let (status, body, _) = post("/calculate", r#"{"basic_amount": "-1"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_api_005_breakdown_returns_entries() {
        let (status, body, _) = post("/breakdown", r#"{"taxable_amount": "56400"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let response: BreakdownResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.entries.len(), 3);
        assert_eq!(response.total_tax_before_relief, dec("11703.15"));
        assert_eq!(response.relief, dec("2400"));
        assert_eq!(response.tax, dec("9303.15"));
    }

    #[tokio::test]
    async fn test_api_006_breakdown_negative_returns_400() {
        let (status, body, _) = post("/breakdown", r#"{"taxable_amount": "-5"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }
}
