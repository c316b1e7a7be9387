use serde::Serialize;

use crate::models::{Event, OrderStatus, PaymentStatus, Ticket};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Countdown text: `MM:SS`, or `HH:MM:SS` from one hour up. Fractional
/// seconds are truncated and negative input reads as zero.
pub fn format_remaining(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Minor units as reais, e.g. `15050` -> `R$ 150.50`.
pub fn format_price(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}R$ {}.{:02}", abs / 100, abs % 100)
}

pub fn event_date_label(event: Option<&Event>) -> String {
    let dates = event.map(|e| e.dates.as_slice()).unwrap_or_default();
    match dates {
        [] => "No date".to_string(),
        [only] => only.format(DATE_FORMAT).to_string(),
        [first, .., last] => format!(
            "From {} to {}",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        ),
    }
}

/// Make an image reference absolute against the API base URL.
pub fn resolve_image(base_url: &str, raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let base = base_url.trim_end_matches('/');
    if raw.starts_with('/') {
        Some(format!("{base}{raw}"))
    } else {
        Some(format!("{base}/{raw}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentLabel {
    Canceled,
    Paid,
    Failed,
    Pending,
}

impl PaymentLabel {
    pub fn of(ticket: &Ticket) -> Self {
        if ticket.order_status == OrderStatus::Canceled {
            Self::Canceled
        } else if ticket.is_paid() {
            Self::Paid
        } else if ticket.payment_status == PaymentStatus::Failed {
            Self::Failed
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseLabel {
    Validated,
    NotValidated,
}

impl UseLabel {
    pub fn of(ticket: &Ticket) -> Self {
        if ticket.used {
            Self::Validated
        } else {
            Self::NotValidated
        }
    }
}
