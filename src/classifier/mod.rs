//! Turns the flat ticket list into purchase-order groups sorted into the
//! wallet's lifecycle sections.
//!
//! Nothing here is stored: groups, sections and action gates are recomputed
//! from the latest ticket snapshot and the caller's `now_ms` every time.

pub mod display;
pub mod eligibility;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Event, OrderRef, Ticket};

pub use display::{event_date_label, format_price, format_remaining, resolve_image, PaymentLabel, UseLabel};
pub use eligibility::{
    can_cancel_transfer, can_display_qr, can_transfer, is_transfer_pending, remaining_transfer_ms,
    visible_transfer_code,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Active,
    Pending,
    Canceled,
    Ended,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Active,
        Section::Pending,
        Section::Canceled,
        Section::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Active => "ACTIVE",
            Section::Pending => "PENDING",
            Section::Canceled => "CANCELED",
            Section::Ended => "ENDED",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

/// Tickets bought together, as far as the client can tell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroup {
    pub key: String,
    pub order: OrderRef,
    pub event: Option<Event>,
    /// Raw image reference of the group's event, not yet made absolute.
    pub image: Option<String>,
    pub section: Section,
    pub is_ended: bool,
    pub all_canceled: bool,
    pub has_paid: bool,
    pub has_pending: bool,
    pub tickets: Vec<Ticket>,
}

impl OrderGroup {
    fn new(key: String, tickets: Vec<Ticket>, now_ms: i64) -> Self {
        let is_ended = tickets.iter().all(|ticket| {
            ticket
                .event
                .as_ref()
                .map(|event| event.has_ended(now_ms))
                .unwrap_or(false)
        });
        let all_canceled = tickets.iter().all(Ticket::is_canceled);
        let has_paid = tickets.iter().any(Ticket::is_paid);
        let has_pending = tickets.iter().any(Ticket::is_pending);

        let section = if all_canceled {
            Section::Canceled
        } else if is_ended {
            Section::Ended
        } else if has_paid {
            Section::Active
        } else {
            Section::Pending
        };

        let first = tickets.first();
        let event = first.and_then(|ticket| ticket.event.clone());

        Self {
            key,
            order: first.map(|ticket| ticket.order.clone()).unwrap_or_default(),
            image: event.as_ref().and_then(|event| event.image.clone()),
            event,
            section,
            is_ended,
            all_canceled,
            has_paid,
            has_pending,
            tickets,
        }
    }
}

/// Grouping key: the order id, else the order code, else a composite of
/// event, statuses and order time truncated to the second.
pub fn order_key(ticket: &Ticket) -> String {
    if let Some(id) = &ticket.order.id {
        return id.clone();
    }
    if let Some(code) = &ticket.order.code {
        return code.clone();
    }

    let created = ticket
        .order
        .created_at
        .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| "no-date".to_string());

    format!(
        "{}|{}|{}|{}",
        ticket.event_id.as_deref().unwrap_or("event"),
        ticket.order_status.raw().unwrap_or("status"),
        ticket.payment_status.raw().unwrap_or("payment"),
        created
    )
}

/// Partition tickets by order key, keeping first-seen key order and the
/// input order inside each group, and assign each group its section.
pub fn classify_order_groups(tickets: &[Ticket], now_ms: i64) -> Vec<OrderGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<Ticket>)> = Vec::new();

    for ticket in tickets {
        let key = order_key(ticket);
        match positions.get(&key) {
            Some(&position) => buckets[position].1.push(ticket.clone()),
            None => {
                positions.insert(key.clone(), buckets.len());
                buckets.push((key, vec![ticket.clone()]));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(key, tickets)| OrderGroup::new(key, tickets, now_ms))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SectionCounts {
    pub active: usize,
    pub pending: usize,
    pub canceled: usize,
    pub ended: usize,
}

impl SectionCounts {
    pub fn get(&self, section: Section) -> usize {
        match section {
            Section::Active => self.active,
            Section::Pending => self.pending,
            Section::Canceled => self.canceled,
            Section::Ended => self.ended,
        }
    }
}

pub fn section_counts(groups: &[OrderGroup]) -> SectionCounts {
    groups
        .iter()
        .fold(SectionCounts::default(), |mut counts, group| {
            match group.section {
                Section::Active => counts.active += 1,
                Section::Pending => counts.pending += 1,
                Section::Canceled => counts.canceled += 1,
                Section::Ended => counts.ended += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    // 2025-06-15T00:00:00Z
    const NOW: i64 = 1_749_945_600_000;

    fn ticket(value: Value) -> Ticket {
        Ticket::try_from(value).unwrap()
    }

    fn future_event() -> Value {
        json!({"id": "e-1", "name": "Show", "dates": ["2025-07-01T20:00:00Z"]})
    }

    fn past_event() -> Value {
        json!({"id": "e-0", "name": "Old show", "dates": ["2025-01-01T20:00:00Z", "2025-01-02T20:00:00Z"]})
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(classify_order_groups(&[], NOW).is_empty());
        assert_eq!(section_counts(&[]), SectionCounts::default());
    }

    #[test]
    fn end_to_end_two_orders() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "PAID", "event": future_event()})),
            ticket(json!({"id": "b", "orderId": "O2", "orderStatus": "CANCELED", "event": future_event()})),
            ticket(json!({"id": "c", "orderId": "O1", "orderStatus": "PAID", "event": future_event()})),
        ];

        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].key, "O1");
        assert_eq!(groups[0].section, Section::Active);
        let ids: Vec<_> = groups[0].tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(groups[0].tickets.iter().all(|t| can_transfer(t, NOW)));

        assert_eq!(groups[1].key, "O2");
        assert_eq!(groups[1].section, Section::Canceled);
        assert_eq!(groups[1].tickets.len(), 1);
        assert!(!can_transfer(&groups[1].tickets[0], NOW));

        let counts = section_counts(&groups);
        assert_eq!(counts.get(Section::Active), 1);
        assert_eq!(counts.get(Section::Canceled), 1);
        assert_eq!(counts.get(Section::Pending), 0);
    }

    #[test]
    fn every_ticket_lands_in_exactly_one_group() {
        let tickets: Vec<_> = (0..12)
            .map(|i| {
                ticket(json!({
                    "id": format!("t{i}"),
                    "orderId": format!("O{}", i % 4),
                    "orderStatus": if i % 3 == 0 { "PAID" } else { "CANCELED" },
                }))
            })
            .collect();

        let groups = classify_order_groups(&tickets, NOW);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["O0", "O1", "O2", "O3"]);

        let mut seen: Vec<_> = groups
            .iter()
            .flat_map(|g| g.tickets.iter().map(|t| t.id.clone()))
            .collect();
        assert_eq!(seen.len(), tickets.len());
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), tickets.len());

        for group in &groups {
            assert!(group.tickets.iter().all(|t| order_key(t) == group.key));
            let positions: Vec<_> = group
                .tickets
                .iter()
                .map(|t| tickets.iter().position(|x| x.id == t.id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn all_canceled_wins_over_everything() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "CANCELED", "event": past_event()})),
            ticket(json!({"id": "b", "orderId": "O1", "paymentStatus": "FAILED", "event": past_event()})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups[0].section, Section::Canceled);
        assert!(groups[0].is_ended);
    }

    #[test]
    fn partly_canceled_group_with_paid_ticket_stays_active() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "CANCELED", "event": future_event()})),
            ticket(json!({"id": "b", "orderId": "O1", "orderStatus": "PAID", "event": future_event()})),
            ticket(json!({"id": "c", "orderId": "O1", "event": future_event()})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert!(!groups[0].all_canceled);
        assert!(groups[0].has_paid);
        assert!(groups[0].has_pending);
        assert_eq!(groups[0].section, Section::Active);
    }

    #[test]
    fn ended_overrides_paid() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "PAID", "event": past_event()})),
            ticket(json!({"id": "b", "orderId": "O1", "paymentStatus": "SUCCEEDED", "event": past_event()})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups[0].section, Section::Ended);
    }

    #[test]
    fn group_is_ended_only_if_every_ticket_event_is_past() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "PAID", "event": past_event()})),
            ticket(json!({"id": "b", "orderId": "O1", "orderStatus": "PAID", "event": future_event()})),
            ticket(json!({"id": "c", "orderId": "O2", "orderStatus": "PAID", "event": {"id": "e-x"}})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert!(!groups[0].is_ended);
        assert_eq!(groups[0].section, Section::Active);
        assert!(!groups[1].is_ended);
        assert_eq!(groups[1].event.as_ref().and_then(|e| e.id.as_deref()), Some("e-x"));
    }

    #[test]
    fn unpaid_group_is_pending() {
        let tickets = vec![ticket(json!({"id": "a", "orderId": "O1", "event": future_event()}))];
        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups[0].section, Section::Pending);
        assert!(groups[0].has_pending);
    }

    #[test]
    fn fallback_key_separates_orders_and_keeps_one_order_together() {
        let tickets = vec![
            ticket(json!({"id": "a", "event": {"id": "e-1"}, "orderStatus": "PAID", "createdAt": "2025-06-01T10:00:00.100Z"})),
            ticket(json!({"id": "b", "event": {"id": "e-1"}, "orderStatus": "PAID", "createdAt": "2025-06-01T10:00:00.900Z"})),
            ticket(json!({"id": "c", "event": {"id": "e-1"}, "orderStatus": "PAID", "createdAt": "2025-06-01T10:00:01Z"})),
            ticket(json!({"id": "d", "event": {"id": "e-1"}, "orderStatus": "CANCELED", "createdAt": "2025-06-01T10:00:00Z"})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, "e-1|PAID|payment|2025-06-01T10:00:00");
        assert_eq!(groups[0].tickets.len(), 2);
        assert_eq!(groups[2].key, "e-1|CANCELED|payment|2025-06-01T10:00:00");
    }

    #[test]
    fn fallback_key_defaults() {
        let t = ticket(json!({"id": "a"}));
        assert_eq!(order_key(&t), "event|status|payment|no-date");
        let coded = ticket(json!({"id": "b", "orderCode": "SB-77"}));
        assert_eq!(order_key(&coded), "SB-77");
    }

    #[test]
    fn group_takes_event_and_image_from_first_ticket() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "event": {"id": "e-1", "thumb": "/a.png"}})),
            ticket(json!({"id": "b", "orderId": "O1", "event": {"id": "e-2", "thumb": "/b.png"}})),
        ];
        let groups = classify_order_groups(&tickets, NOW);
        assert_eq!(groups[0].image.as_deref(), Some("/a.png"));
        assert_eq!(
            groups[0].event.as_ref().and_then(|e| e.id.as_deref()),
            Some("e-1")
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let tickets = vec![
            ticket(json!({"id": "a", "orderId": "O1", "orderStatus": "PAID", "event": future_event()})),
            ticket(json!({"id": "b", "event": past_event(), "paymentStatus": "SUCCEEDED"})),
            ticket(json!({"id": "c"})),
        ];
        assert_eq!(
            classify_order_groups(&tickets, NOW),
            classify_order_groups(&tickets, NOW)
        );
    }

    #[test]
    fn section_parsing() {
        assert_eq!("active".parse::<Section>(), Ok(Section::Active));
        assert_eq!(" ENDED ".parse::<Section>(), Ok(Section::Ended));
        assert!("archived".parse::<Section>().is_err());
        assert_eq!(serde_json::to_value(Section::Canceled).unwrap(), json!("CANCELED"));
    }
}
