use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::json_body;
use crate::classifier::format_price;
use crate::models::{Event, OrderItem, OrderReceipt};
use crate::services::Cart;
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, data};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutReceipt {
    order: OrderReceipt,
    total_items: u32,
    total_price: i64,
    total_label: String,
}

pub async fn list_events(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let events = state.api().fetch_events(&session).await?;
    Ok(data(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event: Event = state
        .api()
        .fetch_event(&session, &event_id)
        .await
        .map_err(|e| AppError::from_api(e, "Event not found."))?;
    Ok(data(event))
}

pub async fn list_ticket_types(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let ticket_types = state.api().fetch_ticket_types(&session).await?;
    Ok(data(ticket_types))
}

/// Price the requested quantities against the live ticket types and place
/// the order.
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    if !session.is_authenticated() {
        return Err(AppError::AuthError("Sign in to buy tickets.".to_string()));
    }

    let ticket_types = state.api().fetch_ticket_types(&session).await?;
    let mut cart = Cart::new();
    for item in &body.items {
        let ticket_type = ticket_types
            .iter()
            .find(|candidate| candidate.id == item.ticket_type_id)
            .filter(|candidate| match (&body.event_id, &candidate.event_id) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            })
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Unknown ticket type '{}'.",
                    item.ticket_type_id
                ))
            })?;
        cart.add_quantity(ticket_type, item.quantity)?;
    }

    // Rejected carts never reach the marketplace.
    let items = cart.order_items()?;
    let totals = cart.totals()?;
    let order = state
        .api()
        .create_order(&session, items)
        .await
        .map_err(|e| AppError::from_api(e, "Could not create the order."))?;
    info!(order_id = order.id.as_deref().unwrap_or(""), items = totals.items, "Order created");

    Ok(created(
        CheckoutReceipt {
            total_items: totals.items,
            total_price: totals.price,
            total_label: format_price(totals.price),
            order,
        },
        "Order created.",
    ))
}
