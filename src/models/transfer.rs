use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::wire;

/// Server-side state of a ticket transfer offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Pending,
    Accepted,
    Expired,
    Canceled,
    Other(String),
}

impl TransferStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "PENDING" => Self::Pending,
            "ACCEPTED" => Self::Accepted,
            "EXPIRED" => Self::Expired,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Expired => "EXPIRED",
            Self::Canceled => "CANCELED",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for TransferStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Option<String>,
    pub status: TransferStatus,
    pub code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub from_user_id: Option<String>,
}

impl Transfer {
    pub fn from_object(obj: &wire::Object) -> Self {
        let status = wire::text(obj, "status")
            .map(|raw| TransferStatus::from_raw(&raw))
            .unwrap_or_else(|| TransferStatus::Other(String::new()));

        Self {
            id: wire::first_id(obj, &["id", "_id"]),
            status,
            code: wire::first_id(obj, &["code"]),
            expires_at: wire::first_timestamp(obj, &["expiresAt", "expires_at"]),
            from_user_id: wire::first_id(obj, &["fromUserId", "from_user_id"]),
        }
    }
}

/// Body of `POST /tickets/{id}/transfer`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferRequest {
    pub to_email: String,
    pub to_phone: String,
    pub to_cpf: String,
    pub message: String,
}

/// Recipient data sent along with a transfer code to claim a ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcceptTransferRequest {
    pub code: String,
    pub to_cpf: String,
    pub to_email: String,
    pub to_phone: String,
    pub name: String,
}

impl AcceptTransferRequest {
    /// Returns the message to show when the form is incomplete.
    pub fn missing_fields(&self) -> Option<&'static str> {
        if self.code.trim().is_empty() {
            return Some("Enter the code you received.");
        }
        if [&self.to_cpf, &self.to_email, &self.to_phone]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Some("Complete CPF, e-mail and phone to claim the ticket.");
        }
        None
    }
}

/// Outcome of a transfer command as reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub message: Option<String>,
    pub code: Option<String>,
}

impl TransferReceipt {
    /// The share code may come at the top level or inside `transfer`.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let nested_code = obj
            .get("transfer")
            .and_then(Value::as_object)
            .and_then(|transfer| wire::first_id(transfer, &["code"]));

        Self {
            message: wire::text(obj, "message"),
            code: nested_code.or_else(|| wire::first_id(obj, &["code"])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_transfer_record() {
        let transfer = Transfer::from_object(
            json!({
                "id": "t1",
                "status": "PENDING",
                "code": "ABC123",
                "expiresAt": "2025-06-01T12:00:00Z",
                "fromUserId": 9,
            })
            .as_object()
            .unwrap(),
        );
        assert_eq!(transfer.status, TransferStatus::Pending);
        assert_eq!(transfer.from_user_id.as_deref(), Some("9"));
        assert!(transfer.expires_at.is_some());
    }

    #[test]
    fn unparseable_expiry_is_absent() {
        let transfer = Transfer::from_object(
            json!({"status": "PENDING", "expiresAt": "soon"})
                .as_object()
                .unwrap(),
        );
        assert_eq!(transfer.expires_at, None);
    }

    #[test]
    fn receipt_code_prefers_nested_transfer() {
        let receipt = TransferReceipt::from_json(&json!({
            "message": "ok",
            "code": "outer",
            "transfer": {"code": "inner"},
        }));
        assert_eq!(receipt.code.as_deref(), Some("inner"));
        assert_eq!(receipt.message.as_deref(), Some("ok"));

        let receipt = TransferReceipt::from_json(&json!({"code": "outer"}));
        assert_eq!(receipt.code.as_deref(), Some("outer"));
        assert_eq!(TransferReceipt::from_json(&Value::Null), TransferReceipt::default());
    }

    #[test]
    fn accept_form_requires_code_then_identity() {
        let mut form = AcceptTransferRequest::default();
        assert_eq!(form.missing_fields(), Some("Enter the code you received."));

        form.code = "XYZ".into();
        form.to_cpf = "123".into();
        assert_eq!(
            form.missing_fields(),
            Some("Complete CPF, e-mail and phone to claim the ticket.")
        );

        form.to_email = "a@b.c".into();
        form.to_phone = "+55 11 99999-0000".into();
        assert_eq!(form.missing_fields(), None);
    }
}
