//! HTTP API for the faucet service

use crate::error::{FaucetError, FaucetResult};
use crate::service::{FaucetService, FaucetStatus, OperationReceipt};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use drip_common::types::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Fund request: any identity may attach value to the pool
#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub from: String,
    pub amount: String,
}

/// Public withdrawal request
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub caller: String,
    pub amount: String,
}

/// Request carrying only the caller identity (owner-only operations)
#[derive(Debug, Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

/// Success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    pub timestamp: String,
}

impl<T> SuccessResponse<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn parse_address(s: &str) -> FaucetResult<Address> {
    Address::from_hex(s).map_err(|e| FaucetError::InvalidAddress(e.to_string()))
}

fn parse_amount(s: &str) -> FaucetResult<u128> {
    s.parse::<u128>()
        .map_err(|_| FaucetError::InvalidAmount(format!("not a wei amount: {}", s)))
}

/// Fund handler
pub async fn fund_handler(
    State(service): State<Arc<FaucetService>>,
    Json(request): Json<FundRequest>,
) -> FaucetResult<Json<SuccessResponse<OperationReceipt>>> {
    info!(
        "Fund request: from={}, amount={} wei",
        request.from, request.amount
    );
    let from = parse_address(&request.from)?;
    let amount = parse_amount(&request.amount)?;
    let receipt = service.fund(from, amount).await?;
    Ok(Json(SuccessResponse::new(receipt)))
}

/// Withdraw handler (public, capped)
pub async fn withdraw_handler(
    State(service): State<Arc<FaucetService>>,
    Json(request): Json<WithdrawRequest>,
) -> FaucetResult<Json<SuccessResponse<OperationReceipt>>> {
    info!(
        "Withdraw request: caller={}, amount={} wei",
        request.caller, request.amount
    );
    let caller = parse_address(&request.caller)?;
    let amount = parse_amount(&request.amount)?;
    let receipt = service.withdraw(caller, amount).await?;
    Ok(Json(SuccessResponse::new(receipt)))
}

/// Withdraw-all handler (owner-only)
pub async fn withdraw_all_handler(
    State(service): State<Arc<FaucetService>>,
    Json(request): Json<CallerRequest>,
) -> FaucetResult<Json<SuccessResponse<OperationReceipt>>> {
    info!("Withdraw-all request: caller={}", request.caller);
    let caller = parse_address(&request.caller)?;
    let receipt = service.withdraw_all(caller).await?;
    Ok(Json(SuccessResponse::new(receipt)))
}

/// Decommission handler (owner-only, terminal)
pub async fn decommission_handler(
    State(service): State<Arc<FaucetService>>,
    Json(request): Json<CallerRequest>,
) -> FaucetResult<Json<SuccessResponse<OperationReceipt>>> {
    info!("Decommission request: caller={}", request.caller);
    let caller = parse_address(&request.caller)?;
    let receipt = service.decommission(caller).await?;
    Ok(Json(SuccessResponse::new(receipt)))
}

/// Owner handler
pub async fn owner_handler(
    State(service): State<Arc<FaucetService>>,
) -> Json<SuccessResponse<String>> {
    let owner = service.owner().await;
    Json(SuccessResponse::new(owner.to_hex()))
}

/// Environment balance lookup handler
pub async fn balance_handler(
    State(service): State<Arc<FaucetService>>,
    Path(address): Path<String>,
) -> FaucetResult<Json<SuccessResponse<String>>> {
    let address = parse_address(&address)?;
    let balance = service.balance_of(address).await;
    Ok(Json(SuccessResponse::new(balance.to_string())))
}

/// Status handler
pub async fn status_handler(
    State(service): State<Arc<FaucetService>>,
) -> FaucetResult<Json<SuccessResponse<FaucetStatus>>> {
    let status = service.status().await?;
    Ok(Json(SuccessResponse::new(status)))
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Root handler with info
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Drip Faucet",
        "version": "0.1.0",
        "description": "Custodial value dispenser for the drip network",
        "endpoints": {
            "POST /api/fund": "Fund the pool",
            "POST /api/withdraw": "Request a capped withdrawal",
            "POST /api/withdraw-all": "Drain the pool (owner only)",
            "POST /api/decommission": "Decommission the dispenser (owner only)",
            "GET /api/owner": "Owner identity",
            "GET /api/balance/:address": "Environment balance lookup",
            "GET /api/status": "Dispenser status",
            "GET /health": "Health check"
        }
    }))
}
