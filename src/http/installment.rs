//! HTTP handlers for the installment contract endpoints.
//!
//! `POST /create` runs the admission gate (duplicate, validation, IMEI
//! conflict, rate limit) before the contract is written. Requester identity
//! comes from headers set by the upstream auth layer; the client address is
//! the fallback identity for unauthenticated requests.

use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter};
use tracing::{error, info};

use crate::admission::fingerprint::Requester;
use crate::entities::{installment_item, installment_order};
use crate::models::installment::{
    ContractCreatedResponse, ContractItemView, ContractView, CreateContractRequest,
};
use crate::state::AppState;
use crate::store::INITIAL_STATUS;

use super::{ApiError, HttpError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_contract))
        .route("/{contract_no}", get(get_contract))
}

/// Create an installment contract, gated by the admission policy.
async fn create_contract(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractCreatedResponse>), ApiError> {
    let started = Instant::now();
    let requester = requester_from(&headers, addr.ip());
    info!(
        "Installment request start: user={} ip={} items={}",
        requester.key(),
        addr.ip(),
        payload.items.len()
    );

    let admission = state
        .gate
        .evaluate(&state.store, &requester, &payload)
        .await
        .map_err(|rejection| {
            info!(
                "Installment request rejected: user={} code={} duration_ms={}",
                requester.key(),
                rejection.code(),
                started.elapsed().as_millis()
            );
            rejection
        })?;

    let created = state
        .store
        .create_contract(
            &payload,
            requester.user_id.clone(),
            requester.user_name.clone(),
            addr.ip().to_string(),
        )
        .await;

    match created {
        Ok(contract_no) => {
            info!(
                "Installment request complete: user={} contract={} duration_ms={}",
                requester.key(),
                contract_no,
                started.elapsed().as_millis()
            );
            Ok((
                StatusCode::CREATED,
                Json(ContractCreatedResponse {
                    success: true,
                    contract_no,
                    status: INITIAL_STATUS.to_string(),
                    total_amount: payload.total_amount.unwrap_or(0.0),
                }),
            ))
        }
        Err(err) => {
            // Free the fingerprint so the operator can retry immediately
            // instead of waiting out the dedup window.
            if let Some(ticket) = admission.ticket {
                state.gate.release(ticket);
            }
            error!(
                "Installment creation failed for {}: {err}",
                requester.key()
            );
            Err(HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "เกิดข้อผิดพลาดในการสร้างสัญญา".to_string(),
            )
            .into())
        }
    }
}

/// Fetch one contract with its line items.
async fn get_contract(
    Path(contract_no): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ContractView>, HttpError> {
    let order = installment_order::Entity::find()
        .filter(installment_order::Column::ContractNo.eq(&contract_no))
        .one(&state.database)
        .await
        .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
        .ok_or_else(|| {
            HttpError::new(
                StatusCode::NOT_FOUND,
                format!("ไม่พบสัญญา {contract_no}"),
            )
        })?;

    let items = order
        .find_related(installment_item::Entity)
        .all(&state.database)
        .await
        .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    let customer_name = format!(
        "{} {}",
        order.customer_first_name.as_deref().unwrap_or(""),
        order.customer_last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();

    let view = ContractView {
        contract_no: order.contract_no,
        status: order.status,
        customer_name,
        company_name: order.company_name,
        phone_number: order.phone_number,
        plan_type: order.plan_type,
        total_amount: order.total_amount,
        down_payment: order.down_payment,
        items: items
            .into_iter()
            .map(|item| ContractItemView {
                name: item.name,
                imei: item.imei,
                price: item.price,
                qty: item.qty,
            })
            .collect(),
        created_at: order.created_at.with_timezone(&Utc),
    };

    Ok(Json(view))
}

fn requester_from(headers: &HeaderMap, addr: IpAddr) -> Requester {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    Requester {
        user_id: header("x-user-id"),
        user_name: header("x-user-name"),
        role: header("x-user-role"),
        addr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_addr() -> IpAddr {
        "192.168.1.20".parse().expect("test address")
    }

    #[test]
    fn requester_is_built_from_auth_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("U1"));
        headers.insert("x-user-name", HeaderValue::from_static("somchai"));
        headers.insert("x-user-role", HeaderValue::from_static("admin"));

        let requester = requester_from(&headers, test_addr());
        assert_eq!(requester.key(), "U1");
        assert_eq!(requester.user_name.as_deref(), Some("somchai"));
        assert!(requester.is_admin());
    }

    #[test]
    fn missing_headers_fall_back_to_client_address() {
        let requester = requester_from(&HeaderMap::new(), test_addr());
        assert_eq!(requester.key(), "192.168.1.20");
        assert!(!requester.is_admin());
    }

    #[test]
    fn blank_header_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("  "));
        let requester = requester_from(&headers, test_addr());
        assert_eq!(requester.key(), "192.168.1.20");
    }
}
