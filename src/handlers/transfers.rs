use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use super::json_body;
use crate::models::{AcceptTransferRequest, TransferRequest};
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn request_transfer(
    State(state): State<AppState>,
    session: Session,
    Path(ticket_id): Path<String>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(payload)?;
    let outcome = state
        .wallet
        .request_transfer(&session, &ticket_id, &request, state.now_ms())
        .await?;
    let message = outcome.message.clone();
    Ok(success(outcome, message))
}

/// Only the sender may cancel, so the user is loaded before checking.
pub async fn cancel_transfer(
    State(state): State<AppState>,
    mut session: Session,
    Path(transfer_id): Path<String>,
) -> Result<Response, AppError> {
    session.require_token()?;
    session.load(state.api()).await;

    let outcome = state
        .wallet
        .cancel_transfer(&session, &transfer_id, state.now_ms())
        .await?;
    let message = outcome.message.clone();
    Ok(success(outcome, message))
}

pub async fn accept_transfer(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<AcceptTransferRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(payload)?;
    let outcome = state.wallet.accept_transfer(&session, &request).await?;
    let message = outcome.message.clone();
    Ok(success(outcome, message))
}
