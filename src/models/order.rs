use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::wire;

/// Order status as reported on a ticket. Anything other than `PAID` or
/// `CANCELED`, including absence, is pending; the raw label is kept because
/// it takes part in the fallback grouping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Paid,
    Canceled,
    Pending(Option<String>),
}

impl OrderStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("PAID") => Self::Paid,
            Some("CANCELED") => Self::Canceled,
            other => Self::Pending(other.map(str::to_string)),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Paid => Some("PAID"),
            Self::Canceled => Some("CANCELED"),
            Self::Pending(raw) => raw.as_deref(),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Failed,
    Pending(Option<String>),
}

impl PaymentStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("SUCCEEDED") => Self::Succeeded,
            Some("FAILED") => Self::Failed,
            other => Self::Pending(other.map(str::to_string)),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Succeeded => Some("SUCCEEDED"),
            Self::Failed => Some("FAILED"),
            Self::Pending(raw) => raw.as_deref(),
        }
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw().serialize(serializer)
    }
}

/// Normalized purchase-order linkage of a ticket.
///
/// The API sends the order as a nested object, a bare id, a handful of flat
/// aliases, or not at all. All shapes collapse into this one type at
/// ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: Option<String>,
    pub code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderRef {
    pub fn from_ticket(ticket: &wire::Object) -> Self {
        let nested = ticket.get("order").and_then(Value::as_object);
        let primitive = match ticket.get("order") {
            Some(value) if !value.is_object() => wire::id_value(value),
            _ => None,
        };

        let id = wire::first_id(
            ticket,
            &["orderId", "order_id", "orderID", "purchaseId", "purchase_id"],
        )
        .or_else(|| nested.and_then(|o| wire::first_id(o, &["id", "orderId", "_id"])))
        .or(primitive);

        let code = wire::first_id(
            ticket,
            &["orderCode", "order_code", "orderNumber", "order_number"],
        )
        .or_else(|| nested.and_then(|o| wire::first_id(o, &["code", "orderCode", "number"])));

        let created_at = wire::first_timestamp(ticket, &["orderCreatedAt", "order_created_at"])
            .or_else(|| nested.and_then(|o| wire::first_timestamp(o, &["createdAt", "created_at"])))
            .or_else(|| wire::first_timestamp(ticket, &["createdAt", "created_at"]));

        Self {
            id,
            code,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub ticket_type_id: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
}

/// What the API answers to an order creation or lists under `/orders/me`.
/// Unknown fields are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(default, deserialize_with = "wire::de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_id")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
