use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::event::Event;
use super::order::{OrderRef, OrderStatus, PaymentStatus};
use super::transfer::Transfer;
use super::{wire, RecordError};

/// A ticket owned by the current user, normalized from `/tickets/me`.
///
/// The QR payload is never serialized; it is handed out only through the
/// gated QR lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct Ticket {
    pub id: String,
    pub event: Option<Event>,
    pub event_id: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    /// Minor currency units.
    pub price: i64,
    #[serde(skip_serializing)]
    pub qr_code: Option<String>,
    pub used: bool,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order: OrderRef,
    pub transfer: Option<Transfer>,
}

impl Ticket {
    pub fn is_canceled(&self) -> bool {
        self.order_status == OrderStatus::Canceled || self.payment_status == PaymentStatus::Failed
    }

    pub fn is_paid(&self) -> bool {
        self.order_status == OrderStatus::Paid || self.payment_status == PaymentStatus::Succeeded
    }

    pub fn is_pending(&self) -> bool {
        !self.is_canceled() && !self.is_paid()
    }
}

impl TryFrom<Value> for Ticket {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;
        let id = wire::first_id(obj, &["id", "_id"]).ok_or(RecordError::MissingId)?;

        let event = obj
            .get("event")
            .and_then(Value::as_object)
            .map(Event::from_object);
        let event_id = event
            .as_ref()
            .and_then(|event| event.id.clone())
            .or_else(|| wire::first_id(obj, &["eventId", "event_id"]));

        let ticket_type = match obj.get("type") {
            Some(Value::Object(inner)) => wire::text(inner, "name"),
            _ => wire::first_text(obj, &["type", "ticketType"]),
        };

        Ok(Self {
            id,
            event,
            event_id,
            ticket_type,
            price: wire::integer(obj, "price").unwrap_or(0),
            qr_code: wire::text(obj, "qrCode"),
            used: wire::flag(obj, "used"),
            order_status: OrderStatus::from_raw(wire::text(obj, "orderStatus").as_deref()),
            payment_status: PaymentStatus::from_raw(wire::text(obj, "paymentStatus").as_deref()),
            order: OrderRef::from_ticket(obj),
            transfer: obj
                .get("transfer")
                .and_then(Value::as_object)
                .map(Transfer::from_object),
        })
    }
}

/// Ingest a `/tickets/me` payload. Records without an id are skipped; a
/// payload that is not an array yields no tickets.
pub fn tickets_from_json(value: Value) -> Vec<Ticket> {
    let Value::Array(items) = value else {
        warn!("Ticket payload is not a list, treating it as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match Ticket::try_from(item) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(index, error = %e, "Skipping ticket record");
                None
            }
        })
        .collect()
}

/// A purchasable ticket type from `/ticket-types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct TicketType {
    pub id: String,
    pub event_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
}

impl TryFrom<Value> for TicketType {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;
        Ok(Self {
            id: wire::first_id(obj, &["id", "_id"]).ok_or(RecordError::MissingId)?,
            event_id: wire::first_id(obj, &["eventId", "event_id"]).or_else(|| {
                obj.get("event")
                    .and_then(Value::as_object)
                    .and_then(|event| wire::first_id(event, &["id"]))
            }),
            name: wire::text(obj, "name"),
            description: wire::text(obj, "description"),
            price: wire::integer(obj, "price").unwrap_or(0),
        })
    }
}

pub fn ticket_types_from_json(value: Value) -> Vec<TicketType> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| TicketType::try_from(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transfer::TransferStatus;
    use serde_json::json;

    #[test]
    fn normalizes_a_full_record() {
        let ticket = Ticket::try_from(json!({
            "id": "t-1",
            "event": {"id": "e-1", "name": "Show", "dates": ["2025-05-01T20:00:00Z"]},
            "type": "VIP",
            "price": 15000,
            "qrCode": "QR-PAYLOAD",
            "used": false,
            "orderStatus": "PAID",
            "paymentStatus": "SUCCEEDED",
            "orderId": "O1",
            "transfer": {"id": "tr-1", "status": "EXPIRED"},
        }))
        .unwrap();

        assert_eq!(ticket.event_id.as_deref(), Some("e-1"));
        assert_eq!(ticket.ticket_type.as_deref(), Some("VIP"));
        assert_eq!(ticket.price, 15000);
        assert_eq!(ticket.order.id.as_deref(), Some("O1"));
        assert!(ticket.is_paid());
        assert_eq!(
            ticket.transfer.as_ref().map(|t| &t.status),
            Some(&TransferStatus::Expired)
        );
    }

    #[test]
    fn degrades_malformed_fields() {
        let ticket = Ticket::try_from(json!({
            "id": 10,
            "event": "not-an-object",
            "eventId": "e-9",
            "price": "n/a",
            "used": "yes",
            "orderStatus": 3,
            "transfer": [],
        }))
        .unwrap();

        assert_eq!(ticket.id, "10");
        assert_eq!(ticket.event, None);
        assert_eq!(ticket.event_id.as_deref(), Some("e-9"));
        assert_eq!(ticket.price, 0);
        assert!(!ticket.used);
        assert!(ticket.is_pending());
        assert_eq!(ticket.transfer, None);
    }

    #[test]
    fn rejects_records_without_id() {
        assert!(matches!(
            Ticket::try_from(json!({"price": 1})),
            Err(RecordError::MissingId)
        ));
        assert!(matches!(
            Ticket::try_from(json!([1, 2])),
            Err(RecordError::NotAnObject)
        ));
    }

    #[test]
    fn list_ingestion_skips_bad_records() {
        let tickets = tickets_from_json(json!([
            {"id": "a"},
            {"price": 5},
            "junk",
            {"id": "b"},
        ]));
        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(tickets_from_json(json!({"message": "nope"})).is_empty());
    }

    #[test]
    fn qr_payload_is_not_serialized() {
        let ticket = Ticket::try_from(json!({"id": "a", "qrCode": "SECRET"})).unwrap();
        let out = serde_json::to_value(&ticket).unwrap();
        assert!(out.get("qrCode").is_none());
        assert_eq!(out["id"], "a");
    }

    #[test]
    fn canceled_and_failed_both_count_as_canceled() {
        let canceled = Ticket::try_from(json!({"id": "a", "orderStatus": "CANCELED"})).unwrap();
        let failed = Ticket::try_from(json!({"id": "b", "paymentStatus": "FAILED"})).unwrap();
        assert!(canceled.is_canceled());
        assert!(failed.is_canceled());
        assert!(!failed.is_pending());
    }

    #[test]
    fn ticket_types_accept_nested_event() {
        let types = ticket_types_from_json(json!([
            {"id": 1, "name": "Pista", "price": 8000, "event": {"id": "e-1"}},
            {"name": "no id"},
        ]));
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].event_id.as_deref(), Some("e-1"));
    }
}
