use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::classifier::Section;
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::data;

#[derive(Debug, Default, Deserialize)]
pub struct WalletQuery {
    pub section: Option<String>,
}

fn parse_section(raw: Option<&str>) -> Result<Option<Section>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<Section>().map(Some).map_err(|_| {
            AppError::ValidationError(format!(
                "Unknown section '{value}'. Use ACTIVE, PENDING, CANCELED or ENDED."
            ))
        }),
    }
}

/// The signed-in user's tickets, grouped by order and sectioned.
pub async fn list_tickets(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<WalletQuery>,
) -> Result<Response, AppError> {
    let section = parse_section(query.section.as_deref())?;
    session.require_token()?;
    // The user id decides who may see and cancel a transfer code.
    session.load(state.api()).await;

    let view = state
        .wallet
        .view(&session, state.now_ms(), section)
        .await?;
    Ok(data(view))
}

pub async fn ticket_qr(
    State(state): State<AppState>,
    session: Session,
    Path(ticket_id): Path<String>,
) -> Result<Response, AppError> {
    let payload = state
        .wallet
        .qr_payload(&session, &ticket_id, state.now_ms())
        .await?;
    Ok(data(payload))
}

pub async fn transfers_sent(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    session.require_token()?;
    let transfers = state.api().fetch_transfers_sent(&session).await?;
    Ok(data(transfers))
}

pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    session.require_token()?;
    let orders = state.api().fetch_my_orders(&session).await?;
    Ok(data(orders))
}
