//! HTTP request handlers for the shift ledger API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ledger::{LedgerOutcome, ShiftLedger};
use crate::models::{PayrollQuery, PayrollRow, ShiftId, ShiftRecord};

use super::request::{
    AllowanceRequest, CloseShiftRequest, OpenShiftsQuery, PayrollRequest, RegisterWorkerRequest,
    ReviewQuery, ShiftRequest,
};
use super::response::{ApiError, ApiErrorResponse, ReviewView, ShiftView, ShiftWriteResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/workers", post(register_worker_handler))
        .route("/shifts", post(record_shift_handler))
        .route("/shifts/close", post(close_shift_handler))
        .route("/shifts/open", get(open_shifts_handler))
        .route("/admin/shifts", get(review_handler))
        .route("/admin/payroll", get(payroll_handler))
        .route("/admin/shifts/:id/allowance", put(allowance_handler))
        .with_state(state)
}

/// Handler for POST /workers.
async fn register_worker_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterWorkerRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing worker registration");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    match state
        .ledger()
        .register_worker(&request.name, &request.phone)
    {
        Ok(worker) => {
            info!(
                correlation_id = %correlation_id,
                worker_id = %worker.id,
                "Worker registration completed"
            );
            json_response(StatusCode::CREATED, worker)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /shifts.
///
/// Opens a shift, records a complete one, or closes the open shift of the
/// day when an exit time is supplied.
async fn record_shift_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShiftRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing shift submission");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match record_shift(state.ledger(), request).await {
        Ok(outcome) => write_completed(correlation_id, start_time, &outcome),
        Err(err) => engine_error(correlation_id, err),
    }
}

async fn record_shift(ledger: &ShiftLedger, request: ShiftRequest) -> EngineResult<LedgerOutcome> {
    let worker = ledger.ensure_worker(&request.phone, request.name.as_deref())?;
    let submission = request.into_submission(worker.id)?;
    ledger.open_or_record_shift(submission).await
}

/// Handler for POST /shifts/close.
async fn close_shift_handler(
    State(state): State<AppState>,
    payload: Result<Json<CloseShiftRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing shift close");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match close_shift(state.ledger(), request).await {
        Ok(outcome) => write_completed(correlation_id, start_time, &outcome),
        Err(err) => engine_error(correlation_id, err),
    }
}

async fn close_shift(
    ledger: &ShiftLedger,
    request: CloseShiftRequest,
) -> EngineResult<LedgerOutcome> {
    let worker = ledger.ensure_worker(&request.phone, None)?;
    let submission = request.into_submission(worker.id)?;
    ledger.close_shift(submission).await
}

/// Handler for GET /shifts/open.
async fn open_shifts_handler(
    State(state): State<AppState>,
    query: Result<Query<OpenShiftsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    match open_shifts(state.ledger(), &query) {
        Ok(shifts) => {
            info!(
                correlation_id = %correlation_id,
                count = shifts.len(),
                "Open shifts listed"
            );
            let views: Vec<ShiftView> = shifts.iter().map(ShiftView::from).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

fn open_shifts(ledger: &ShiftLedger, query: &OpenShiftsQuery) -> EngineResult<Vec<ShiftRecord>> {
    let worker_id = match query.phone.as_deref() {
        Some(phone) => Some(ledger.ensure_worker(phone, None)?.id),
        None => None,
    };
    ledger.open_shifts(worker_id)
}

/// Handler for GET /admin/shifts.
async fn review_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing shift review");

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let result = state.admin_session(&headers).and_then(|session| {
        let filter = query.into_filter()?;
        state.ledger().review(&session, &filter)
    });

    match result {
        Ok(entries) => {
            info!(
                correlation_id = %correlation_id,
                count = entries.len(),
                "Shift review completed"
            );
            let views: Vec<ReviewView> = entries.iter().map(ReviewView::from).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /admin/payroll.
///
/// Amounts are rounded to two decimals in the response only.
async fn payroll_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<PayrollRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll request");

    let query: PayrollQuery = match query {
        Ok(Query(q)) => q.into(),
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let result = state
        .admin_session(&headers)
        .and_then(|session| state.ledger().payroll(&session, &query));

    match result {
        Ok(rows) => {
            info!(
                correlation_id = %correlation_id,
                rows = rows.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Payroll completed successfully"
            );
            let rows: Vec<PayrollRow> = rows.iter().map(PayrollRow::rounded).collect();
            json_response(StatusCode::OK, rows)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for PUT /admin/shifts/:id/allowance.
async fn allowance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AllowanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allowance correction");

    let shift_id = match path {
        Ok(Path(id)) => ShiftId(id),
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Invalid shift id"
            );
            return ApiErrorResponse::bad_request(ApiError::validation_error(format!(
                "Invalid shift id: {}",
                rejection.body_text()
            )))
            .into_response();
        }
    };

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let result = state.admin_session(&headers).and_then(|session| {
        state
            .ledger()
            .set_extra_allowance(&session, shift_id, request.extra_allowance)
    });

    match result {
        Ok(record) => json_response(StatusCode::OK, ShiftView::from(&record)),
        Err(err) => engine_error(correlation_id, err),
    }
}

fn write_completed(correlation_id: Uuid, start_time: Instant, outcome: &LedgerOutcome) -> Response {
    info!(
        correlation_id = %correlation_id,
        shift_id = %outcome.record.id,
        event = %outcome.event,
        delivered = outcome.delivery.is_delivered(),
        duration_us = start_time.elapsed().as_micros(),
        "Shift write completed successfully"
    );
    json_response(StatusCode::OK, ShiftWriteResponse::from(outcome))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
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
    ApiErrorResponse::bad_request(error).into_response()
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Query string error"
    );
    ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::notify::NotificationDispatcher;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "handler-test-token";

    fn create_test_state() -> AppState {
        let config = ConfigLoader::from_yaml(
            &format!(
                "payroll:\n  hourly_rate: \"9.00\"\n  car_allowance: \"5.00\"\nadmin:\n  token: \"{}\"\n",
                TOKEN
            ),
            "inline",
        )
        .expect("Failed to load config");
        let ledger = ShiftLedger::new(
            Arc::new(MemoryStore::new()),
            NotificationDispatcher::disabled(),
            config.payroll().clone(),
        );
        AppState::new(config, ledger)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_worker_returns_201() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json("/workers", json!({"name": "Ana", "phone": "600 111 222"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["phone"], "600111222");
    }

    #[tokio::test]
    async fn test_duplicate_registration_returns_409() {
        let state = create_test_state();
        let payload = json!({"name": "Ana", "phone": "600111222"});
        send(create_router(state.clone()), post_json("/workers", payload.clone())).await;

        let (status, body) = send(create_router(state), post_json("/workers", payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "WORKER_ALREADY_REGISTERED");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/shifts")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json("/shifts", json!({"phone": "600111222", "date": "2024-05-01"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("entry_time"));
    }

    #[tokio::test]
    async fn test_mistyped_field_returns_validation_error() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json(
                "/shifts",
                json!({
                    "phone": "600111222",
                    "date": "2024-05-01",
                    "entry_time": "09:00",
                    "car": "yes"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_worker_without_name_returns_404() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json(
                "/shifts",
                json!({"phone": "600111222", "date": "2024-05-01", "entry_time": "09:00"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "WORKER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .uri("/admin/payroll")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_payroll_month_without_year_returns_400() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .uri("/admin/payroll?month=5")
            .header("Authorization", format!("Bearer {}", TOKEN))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_allowance_on_non_numeric_id_returns_400() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .method("PUT")
            .uri("/admin/shifts/abc/allowance")
            .header("Authorization", format!("Bearer {}", TOKEN))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"extra_allowance": "3.00"}).to_string()))
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
