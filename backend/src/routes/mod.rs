pub mod claim;
pub mod health;
pub mod vesting;
pub mod ws;

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::ClaimError,
    session::{Capabilities, ClaimGate},
    solana::Ledger,
};

pub struct AppState<L> {
    pub caps: Capabilities<L>,
    pub lookup_debounce: Duration,
    /// Shared by `/claim` and every `/ws` session.
    pub claim_gate: ClaimGate,
}

impl<L> AppState<L> {
    pub fn new(caps: Capabilities<L>, lookup_debounce: Duration) -> Self {
        Self {
            caps,
            lookup_debounce,
            claim_gate: ClaimGate::default(),
        }
    }
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            caps: self.caps.clone(),
            lookup_debounce: self.lookup_debounce,
            claim_gate: self.claim_gate.clone(),
        }
    }
}

pub fn router<L: Ledger>(state: AppState<L>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/config", get(vesting::config::<L>))
        .route("/lookup", get(vesting::lookup::<L>))
        .route("/claim", post(claim::claim::<L>))
        .route("/ws", get(ws::ws_handler::<L>))
        .with_state(state)
}

/// Error body returned by the HTTP handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        let status = match &err {
            ClaimError::VestingNotFound => StatusCode::NOT_FOUND,
            ClaimError::SeedTooLong(_) => StatusCode::BAD_REQUEST,
            ClaimError::Decode(_) | ClaimError::Rpc(_) | ClaimError::Transaction(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
