use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{error, info, warn};

use crate::api::{
    response::{assemble, METHOD_NOT_ALLOWED_MESSAGE},
    state::AppState,
    types::ClaimResponse,
};
use crate::domain::ClaimReceipt;
use crate::error::ClaimError;
use crate::validation::parse_claim_request;

/// Used only when no strategy could be configured
const DEFAULT_FAILURE_MESSAGE: &str = "Airdrop failed. See error details.";

/// POST claim endpoint
///
/// The body is read raw so that malformed JSON is reported as an invalid
/// address rather than an extractor rejection.
pub async fn claim(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<ClaimResponse>) {
    state.metrics().inc_received();

    let outcome = run_claim(&state, &body).await;
    match &outcome {
        Ok(_) => state.metrics().inc_succeeded(),
        Err(e) => state.metrics().record_error(e),
    }

    let failure_message = state
        .relayer
        .as_ref()
        .map(|relayer| relayer.strategy().failure_message())
        .unwrap_or(DEFAULT_FAILURE_MESSAGE);

    let (status, response) = assemble(&outcome, failure_message, state.expose_diagnostics);
    (status, Json(response))
}

async fn run_claim(state: &AppState, body: &[u8]) -> Result<ClaimReceipt, ClaimError> {
    let request = parse_claim_request(body).inspect_err(|e| {
        warn!("Invalid address format: {}", e);
    })?;

    let relayer = state.relayer.as_ref().map_err(|e| {
        error!("Claim for {} refused, relayer misconfigured: {}", request.recipient, e);
        ClaimError::Configuration(e.clone())
    })?;

    info!("Claim requested for {}", request.recipient);
    relayer.dispatch_detached(request.recipient).await
}

/// OPTIONS on the claim endpoint. Preflights carrying CORS headers are
/// answered by the CORS layer before reaching this.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the claim endpoint
pub async fn method_not_allowed() -> impl IntoResponse {
    warn!("{}", METHOD_NOT_ALLOWED_MESSAGE);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, OPTIONS")],
        Json(ClaimResponse::failure(METHOD_NOT_ALLOWED_MESSAGE)),
    )
}
