//! Error types for the dispenser and its HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Dispenser ledger errors. Every failure aborts the whole operation
/// with no partial state mutation; the caller decides whether to retry
/// with corrected parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller is not the owner")]
    Unauthorized,

    #[error("requested {requested} wei exceeds the per-call cap of {cap} wei")]
    LimitExceeded { requested: u128, cap: u128 },

    #[error("requested {requested} wei but only {available} wei available")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("dispenser has been decommissioned")]
    Inactive,

    #[error("balance arithmetic overflow")]
    Overflow,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Faucet service errors
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sled::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type FaucetResult<T> = Result<T, FaucetError>;

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match self {
            FaucetError::Ledger(LedgerError::Unauthorized) => (
                StatusCode::FORBIDDEN,
                "Caller is not the owner".to_string(),
                "UNAUTHORIZED",
            ),
            FaucetError::Ledger(err @ LedgerError::LimitExceeded { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string(), "LIMIT_EXCEEDED")
            }
            FaucetError::Ledger(err @ LedgerError::InsufficientBalance { .. }) => (
                StatusCode::CONFLICT,
                err.to_string(),
                "INSUFFICIENT_BALANCE",
            ),
            FaucetError::Ledger(LedgerError::Inactive) => (
                StatusCode::GONE,
                "Dispenser has been decommissioned".to_string(),
                "INACTIVE",
            ),
            FaucetError::Ledger(LedgerError::Overflow) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Balance arithmetic overflow".to_string(),
                "OVERFLOW",
            ),
            FaucetError::InvalidAddress(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid address: {}", msg),
                "INVALID_ADDRESS",
            ),
            FaucetError::InvalidAmount(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid amount: {}", msg),
                "INVALID_AMOUNT",
            ),
            FaucetError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", err),
                "DATABASE_ERROR",
            ),
            FaucetError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", msg),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": error_code,
            "message": error_message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));

        (status, body).into_response()
    }
}
