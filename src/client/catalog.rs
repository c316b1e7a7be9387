use serde_json::Value;

use super::{ApiClient, ApiError};
use crate::models::event::events_from_json;
use crate::models::order::CreateOrderRequest;
use crate::models::ticket::ticket_types_from_json;
use crate::models::{Event, OrderItem, OrderReceipt, TicketType};
use crate::session::Session;

impl ApiClient {
    pub async fn fetch_events(&self, session: &Session) -> Result<Vec<Event>, ApiError> {
        let payload: Value = self.get(session, &["events"]).await?;
        Ok(events_from_json(payload))
    }

    pub async fn fetch_event(&self, session: &Session, event_id: &str) -> Result<Event, ApiError> {
        self.get(session, &["events", event_id]).await
    }

    pub async fn fetch_ticket_types(&self, session: &Session) -> Result<Vec<TicketType>, ApiError> {
        let payload: Value = self.get(session, &["ticket-types"]).await?;
        Ok(ticket_types_from_json(payload))
    }

    pub async fn create_order(
        &self,
        session: &Session,
        items: Vec<OrderItem>,
    ) -> Result<OrderReceipt, ApiError> {
        self.post(session, &["orders"], &CreateOrderRequest { items })
            .await
    }

    pub async fn fetch_my_orders(&self, session: &Session) -> Result<Vec<OrderReceipt>, ApiError> {
        let payload: Value = self.get(session, &["orders", "me"]).await?;
        Ok(match payload {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}
