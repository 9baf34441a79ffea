use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, error};

use super::{ApiError, AppState};
use crate::{
    models::{ClaimRequest, ClaimResponse},
    solana::Ledger,
};

pub async fn claim<L: Ledger>(
    State(state): State<AppState<L>>,
    Json(req): Json<ClaimRequest>,
) -> Result<axum::response::Response, ApiError> {
    let (Some(client), Some(wallet)) = (&state.caps.client, &state.caps.wallet) else {
        debug!("claim skipped, wallet or connection unavailable");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let Some(_permit) = state.claim_gate.try_acquire() else {
        return Err(ApiError::new(StatusCode::CONFLICT, "a claim is already in progress"));
    };

    let signature = client
        .submit_claim(wallet, &req.company_name)
        .await
        .map_err(|err| {
            error!(company = %req.company_name, %err, "❌ claim failed");
            ApiError::from(err)
        })?
        .to_string();

    let explorer_url = client.settings().explorer_tx_url(&signature);
    Ok(Json(ClaimResponse {
        signature,
        explorer_url,
    })
    .into_response())
}
