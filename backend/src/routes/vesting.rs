use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use super::{ApiError, AppState};
use crate::{
    lookup::LookupOutcome,
    models::{ConfigResponse, LookupQuery, LookupResponse},
    solana::Ledger,
};

pub async fn config<L: Ledger>(State(state): State<AppState<L>>) -> Json<Option<ConfigResponse>> {
    let wallet = state.caps.wallet.as_ref().map(|w| w.address().to_string());
    Json(state.caps.client.as_ref().map(|client| {
        let settings = client.settings();
        ConfigResponse {
            cluster: settings.cluster.clone(),
            program_id: settings.program_id.to_string(),
            mint: settings.mint.to_string(),
            token_program: settings.token_program.as_str(),
            wallet,
        }
    }))
}

pub async fn lookup<L: Ledger>(
    State(state): State<AppState<L>>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, ApiError> {
    let (Some(client), Some(wallet)) = (&state.caps.client, &state.caps.wallet) else {
        debug!("lookup skipped, wallet or connection unavailable");
        return Ok(Json(LookupResponse::Skipped));
    };

    let response = match client.lookup(&wallet.address(), &params.q).await? {
        LookupOutcome::Found(claim) => LookupResponse::Found(claim.summary(Utc::now())),
        LookupOutcome::NotFound => LookupResponse::NotFound { query: params.q },
    };
    Ok(Json(response))
}
