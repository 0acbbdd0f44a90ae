use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::admission::AdmissionRejection;
use crate::state::AppState;

mod installment;

pub fn router(state: AppState) -> Router {
    assert!(
        state.start_time.elapsed() < Duration::from_secs(86_400),
        "Application uptime exceeds 24 hours before router creation"
    );

    // CORS for the back-office web UI
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let installment_router = installment::router().with_state(state.clone());
    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .nest("/installment", installment_router)
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpError> {
    let uptime = state.start_time.elapsed().as_secs();
    assert!(
        uptime <= 31_536_000,
        "Uptime exceeds one year without restart"
    );
    let response = HealthResponse {
        status: "live",
        uptime_seconds: uptime,
    };
    Ok(Json(response))
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state
        .database
        .ping()
        .await
        .map_err(|err| HttpError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;

    let response = ReadyResponse {
        status: "ready",
        dedup_window_seconds: state.gate.dedup_window().as_secs(),
        ledger_entries: state.gate.ledger_entries(),
        rate_limiter_keys: state.gate.limiter_keys(),
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    dedup_window_seconds: u64,
    ledger_entries: usize,
    rate_limiter_keys: usize,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        info!("HTTP error: {}", self.message);
        let body = Json(json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// Wire form of the admission taxonomy: Thai `error` text shown verbatim by
/// the UI, machine-parseable `code`, plus the variant-specific fields.
impl IntoResponse for AdmissionRejection {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, body) = match self {
            Self::Duplicate { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "success": false,
                    "error": "การส่งข้อมูลซ้ำ กรุณารอสักครู่แล้วลองใหม่",
                    "code": code,
                    "retryAfter": retry_after_secs,
                }),
            ),
            Self::Validation { details } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "ข้อมูลไม่ถูกต้อง",
                    "details": details,
                    "code": code,
                }),
            ),
            Self::DuplicateImei { imeis } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": format!("พบ IMEI ซ้ำในคำขอ: {}", imeis.join(", ")),
                    "code": code,
                }),
            ),
            Self::ImeiConflict { imei, contract_no } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": format!("IMEI {imei} ถูกใช้ในสัญญา {contract_no} แล้ว"),
                    "code": code,
                    "conflictContract": contract_no,
                }),
            ),
            Self::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "success": false,
                    "error": "สร้างสัญญาผ่อนชำระเร็วเกินไป กรุณารอสักครู่",
                    "code": code,
                    "retryAfter": retry_after_secs,
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Error type of the create endpoint: either a named admission rejection or
/// an ordinary server fault.
#[derive(Debug)]
pub enum ApiError {
    Rejected(AdmissionRejection),
    Internal(HttpError),
}

impl From<AdmissionRejection> for ApiError {
    fn from(rejection: AdmissionRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        Self::Internal(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(rejection) => rejection.into_response(),
            Self::Internal(error) => error.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn duplicate_rejection_wire_shape() {
        let response = AdmissionRejection::Duplicate {
            retry_after_secs: 25,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_json(response).await;
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["code"], "DUPLICATE_SUBMISSION");
        assert_eq!(body["retryAfter"], 25);
        assert_eq!(body["error"], "การส่งข้อมูลซ้ำ กรุณารอสักครู่แล้วลองใหม่");
    }

    #[tokio::test]
    async fn validation_rejection_carries_all_details() {
        let response = AdmissionRejection::Validation {
            details: vec![
                "ไม่มีสินค้าในตะกร้า".to_string(),
                "กรุณากรอกเบอร์โทรศัพท์".to_string(),
            ],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], "ข้อมูลไม่ถูกต้อง");
        assert_eq!(body["details"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn duplicate_imei_rejection_lists_serials() {
        let response = AdmissionRejection::DuplicateImei {
            imeis: vec!["111".to_string()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "DUPLICATE_IMEI_IN_REQUEST");
        assert_eq!(body["error"], "พบ IMEI ซ้ำในคำขอ: 111");
    }

    #[tokio::test]
    async fn conflict_rejection_names_the_contract() {
        let response = AdmissionRejection::ImeiConflict {
            imei: "999".to_string(),
            contract_no: "C-100".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "IMEI_ALREADY_IN_USE");
        assert_eq!(body["conflictContract"], "C-100");
        assert_eq!(body["error"], "IMEI 999 ถูกใช้ในสัญญา C-100 แล้ว");
    }

    #[tokio::test]
    async fn rate_limit_rejection_wire_shape() {
        let response = AdmissionRejection::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_json(response).await;
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["retryAfter"], 42);
    }
}
