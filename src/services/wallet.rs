//! The signed-in user's ticket wallet.
//!
//! Keeps the last ticket list that loaded successfully for each session so a
//! transient API failure does not blank the wallet, and routes every
//! transfer command through "issue, then refetch": local state only changes
//! when a fresh `/tickets/me` arrives.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::classifier::{
    can_cancel_transfer, can_display_qr, can_transfer, classify_order_groups,
    event_date_label, format_price, format_remaining, is_transfer_pending,
    remaining_transfer_ms, resolve_image, section_counts, visible_transfer_code, OrderGroup,
    PaymentLabel, Section, SectionCounts, UseLabel,
};
use crate::client::{ApiClient, ApiError};
use crate::models::{AcceptTransferRequest, Event, OrderRef, Ticket, TransferRequest, TransferStatus};
use crate::session::Session;
use crate::utils::AppError;

const LOAD_FAILED: &str = "Could not load your tickets.";
const TRANSFER_FAILED: &str = "Transfer failed.";
const CANCEL_FAILED: &str = "Failed to cancel transfer.";
const ACCEPT_FAILED: &str = "Failed to accept transfer.";
const TRANSFER_REQUESTED: &str = "Transfer requested.";
const TRANSFER_CANCELED: &str = "Transfer canceled.";
const TRANSFER_ACCEPTED: &str = "Transfer accepted.";

const EVENT_IMAGE_LIMIT: usize = 4096;

struct Snapshot {
    tickets: Vec<Ticket>,
    fetched_at: Instant,
}

/// Image of an event that was looked up successfully; `None` when the event
/// has none.
struct EventImage {
    image: Option<String>,
    fetched_at: Instant,
}

/// Result of a refetch: the tickets to show and, when the fetch failed, the
/// message to show next to the previous list.
#[derive(Debug, Clone)]
pub struct Refresh {
    pub tickets: Vec<Ticket>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub payment_label: PaymentLabel,
    pub use_label: UseLabel,
    pub price_label: String,
    pub can_display_qr: bool,
    pub can_transfer: bool,
    pub transfer_pending: bool,
    pub transfer_expired: bool,
    pub remaining_ms: i64,
    pub remaining_label: Option<String>,
    pub can_cancel_transfer: bool,
    pub transfer_code: Option<String>,
}

impl TicketView {
    pub fn build(ticket: &Ticket, user_id: Option<&str>, now_ms: i64) -> Self {
        let transfer_pending = is_transfer_pending(ticket, now_ms);
        let remaining_ms = remaining_transfer_ms(ticket, now_ms);
        let transfer_code = visible_transfer_code(ticket, user_id, now_ms).map(str::to_string);

        // The share code is only exposed through `transfer_code`.
        let mut shown = ticket.clone();
        if let Some(transfer) = shown.transfer.as_mut() {
            transfer.code = None;
        }

        Self {
            payment_label: PaymentLabel::of(ticket),
            use_label: UseLabel::of(ticket),
            price_label: format_price(ticket.price),
            can_display_qr: can_display_qr(ticket, now_ms),
            can_transfer: can_transfer(ticket, now_ms),
            transfer_pending,
            transfer_expired: ticket
                .transfer
                .as_ref()
                .map(|transfer| transfer.status == TransferStatus::Expired)
                .unwrap_or(false),
            remaining_ms,
            remaining_label: transfer_pending.then(|| format_remaining(remaining_ms)),
            can_cancel_transfer: can_cancel_transfer(ticket, user_id, now_ms),
            transfer_code,
            ticket: shown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub key: String,
    pub section: Section,
    pub order: OrderRef,
    pub event: Option<Event>,
    pub date_label: String,
    pub image: Option<String>,
    pub tickets: Vec<TicketView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub now_ms: i64,
    pub counts: SectionCounts,
    pub groups: Vec<GroupView>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub ticket_id: String,
    pub qr_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    pub code: Option<String>,
}

pub struct TicketWallet {
    api: ApiClient,
    snapshot_limit: usize,
    snapshots: RwLock<HashMap<String, Snapshot>>,
    event_images: RwLock<HashMap<String, EventImage>>,
}

impl TicketWallet {
    pub fn new(api: ApiClient, snapshot_limit: usize) -> Self {
        Self {
            api,
            snapshot_limit: snapshot_limit.max(1),
            snapshots: RwLock::new(HashMap::new()),
            event_images: RwLock::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Refetch the session's tickets. A failed fetch keeps the previous list.
    pub async fn refresh(&self, session: &Session) -> Result<Refresh, AppError> {
        let token = session.require_token()?.to_string();

        match self.api.fetch_my_tickets(session).await {
            Ok(tickets) => {
                debug!(count = tickets.len(), "Ticket list refreshed");
                self.store_snapshot(token, tickets.clone()).await;
                Ok(Refresh {
                    tickets,
                    error: None,
                })
            }
            Err(e @ ApiError::Status { status: 401, .. }) => {
                Err(AppError::from_api(e, "Your session has expired."))
            }
            Err(e) => {
                warn!(error = %e, "Ticket refresh failed, keeping last good list");
                let tickets = self
                    .snapshots
                    .read()
                    .await
                    .get(&token)
                    .map(|snapshot| snapshot.tickets.clone())
                    .unwrap_or_default();
                Ok(Refresh {
                    tickets,
                    error: Some(LOAD_FAILED.to_string()),
                })
            }
        }
    }

    async fn store_snapshot(&self, token: String, tickets: Vec<Ticket>) {
        let mut snapshots = self.snapshots.write().await;
        make_room(&mut *snapshots, &token, self.snapshot_limit, |snapshot| {
            snapshot.fetched_at
        });
        snapshots.insert(
            token,
            Snapshot {
                tickets,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Classified, display-ready wallet. `section` narrows the groups; the
    /// counts always cover every section.
    pub async fn view(
        &self,
        session: &Session,
        now_ms: i64,
        section: Option<Section>,
    ) -> Result<WalletView, AppError> {
        let refresh = self.refresh(session).await?;
        let groups = classify_order_groups(&refresh.tickets, now_ms);
        let counts = section_counts(&groups);
        let images = self.group_images(session, &groups).await;
        let user_id = session.user_id();

        let groups = groups
            .into_iter()
            .zip(images)
            .filter(|(group, _)| section.map_or(true, |wanted| group.section == wanted))
            .map(|(group, image)| GroupView {
                date_label: event_date_label(group.event.as_ref()),
                tickets: group
                    .tickets
                    .iter()
                    .map(|ticket| TicketView::build(ticket, user_id, now_ms))
                    .collect(),
                key: group.key,
                section: group.section,
                order: group.order,
                event: group.event,
                image,
            })
            .collect();

        Ok(WalletView {
            now_ms,
            counts,
            groups,
            error: refresh.error,
        })
    }

    /// Absolute image per group. Events that came without an image are looked
    /// up and cached; failed lookups are not cached, so the next view retries.
    async fn group_images(&self, session: &Session, groups: &[OrderGroup]) -> Vec<Option<String>> {
        let base = self.api.base_url().to_string();

        let missing: Vec<String> = {
            let cache = self.event_images.read().await;
            let mut ids: Vec<String> = groups
                .iter()
                .filter(|group| group.image.is_none())
                .filter_map(|group| group.event.as_ref().and_then(|event| event.id.clone()))
                .filter(|id| !cache.contains_key(id))
                .collect();
            ids.sort();
            ids.dedup();
            ids
        };

        if !missing.is_empty() {
            let mut lookups = JoinSet::new();
            for event_id in missing {
                let api = self.api.clone();
                let session = session.clone();
                lookups.spawn(async move {
                    let looked_up = api.fetch_event(&session, &event_id).await;
                    (event_id, looked_up)
                });
            }

            let mut resolved = Vec::new();
            while let Some(joined) = lookups.join_next().await {
                match joined {
                    Ok((event_id, Ok(event))) => {
                        let absolute = event.image.and_then(|raw| resolve_image(&base, &raw));
                        resolved.push((event_id, absolute));
                    }
                    Ok((event_id, Err(e))) => {
                        debug!(event_id = %event_id, error = %e, "Event image lookup failed");
                    }
                    Err(e) => warn!(error = %e, "Event image lookup task failed"),
                }
            }

            let mut cache = self.event_images.write().await;
            for (event_id, image) in resolved {
                make_room(&mut *cache, &event_id, EVENT_IMAGE_LIMIT, |entry| entry.fetched_at);
                cache.insert(
                    event_id,
                    EventImage {
                        image,
                        fetched_at: Instant::now(),
                    },
                );
            }
        }

        let cache = self.event_images.read().await;
        groups
            .iter()
            .map(|group| match &group.image {
                Some(raw) => resolve_image(&base, raw),
                None => group
                    .event
                    .as_ref()
                    .and_then(|event| event.id.as_ref())
                    .and_then(|id| cache.get(id))
                    .and_then(|entry| entry.image.clone()),
            })
            .collect()
    }

    async fn find_ticket(&self, session: &Session, ticket_id: &str) -> Result<Ticket, AppError> {
        self.refresh(session)
            .await?
            .tickets
            .into_iter()
            .find(|ticket| ticket.id == ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{ticket_id}' not found")))
    }

    /// The ticket's QR payload, only while it may be redeemed.
    pub async fn qr_payload(
        &self,
        session: &Session,
        ticket_id: &str,
        now_ms: i64,
    ) -> Result<QrPayload, AppError> {
        let ticket = self.find_ticket(session, ticket_id).await?;
        if !can_display_qr(&ticket, now_ms) {
            return Err(AppError::Forbidden(
                "This ticket cannot be displayed right now.".to_string(),
            ));
        }
        let qr_code = ticket.qr_code.ok_or_else(|| {
            AppError::NotFound("This ticket has no QR code yet.".to_string())
        })?;
        Ok(QrPayload {
            ticket_id: ticket.id,
            qr_code,
        })
    }

    pub async fn request_transfer(
        &self,
        session: &Session,
        ticket_id: &str,
        request: &TransferRequest,
        now_ms: i64,
    ) -> Result<ActionOutcome, AppError> {
        let ticket = self.find_ticket(session, ticket_id).await?;
        if !can_transfer(&ticket, now_ms) {
            return Err(AppError::Forbidden(
                "This ticket cannot be transferred right now.".to_string(),
            ));
        }

        let receipt = self
            .api
            .request_transfer(session, &ticket.id, request)
            .await
            .map_err(|e| AppError::from_api(e, TRANSFER_FAILED))?;
        info!(ticket_id = %ticket.id, "Transfer requested");

        self.refetch_after_action(session).await;
        Ok(ActionOutcome {
            message: receipt
                .message
                .unwrap_or_else(|| TRANSFER_REQUESTED.to_string()),
            code: receipt.code,
        })
    }

    /// Withdraw a pending transfer. Only its sender may do so, and only until
    /// it expires.
    pub async fn cancel_transfer(
        &self,
        session: &Session,
        transfer_id: &str,
        now_ms: i64,
    ) -> Result<ActionOutcome, AppError> {
        let ticket = self
            .refresh(session)
            .await?
            .tickets
            .into_iter()
            .find(|ticket| {
                ticket
                    .transfer
                    .as_ref()
                    .and_then(|transfer| transfer.id.as_deref())
                    == Some(transfer_id)
            })
            .ok_or_else(|| AppError::NotFound(format!("Transfer '{transfer_id}' not found")))?;

        if !can_cancel_transfer(&ticket, session.user_id(), now_ms) {
            return Err(AppError::Forbidden(
                "Only the sender can cancel a pending transfer.".to_string(),
            ));
        }

        let receipt = self
            .api
            .cancel_transfer(session, transfer_id)
            .await
            .map_err(|e| AppError::from_api(e, CANCEL_FAILED))?;
        info!(transfer_id, ticket_id = %ticket.id, "Transfer canceled");

        self.refetch_after_action(session).await;
        Ok(ActionOutcome {
            message: receipt
                .message
                .unwrap_or_else(|| TRANSFER_CANCELED.to_string()),
            code: None,
        })
    }

    pub async fn accept_transfer(
        &self,
        session: &Session,
        request: &AcceptTransferRequest,
    ) -> Result<ActionOutcome, AppError> {
        if let Some(message) = request.missing_fields() {
            return Err(AppError::ValidationError(message.to_string()));
        }

        let receipt = self
            .api
            .accept_transfer(session, request)
            .await
            .map_err(|e| AppError::from_api(e, ACCEPT_FAILED))?;
        info!("Transfer accepted");

        if session.is_authenticated() {
            self.refetch_after_action(session).await;
        }
        Ok(ActionOutcome {
            message: receipt
                .message
                .unwrap_or_else(|| TRANSFER_ACCEPTED.to_string()),
            code: None,
        })
    }

    async fn refetch_after_action(&self, session: &Session) {
        match self.refresh(session).await {
            Ok(Refresh { error: None, .. }) => {}
            Ok(Refresh { error: Some(_), .. }) | Err(_) => {
                warn!("Refetch after transfer action failed; wallet shows the previous list")
            }
        }
    }
}

/// Evict the oldest entry when inserting `key` would exceed `limit`.
fn make_room<V>(
    map: &mut HashMap<String, V>,
    key: &str,
    limit: usize,
    stamp: impl Fn(&V) -> Instant,
) {
    if map.contains_key(key) || map.len() < limit {
        return;
    }
    if let Some(oldest) = map
        .iter()
        .min_by_key(|(_, value)| stamp(value))
        .map(|(key, _)| key.clone())
    {
        map.remove(&oldest);
    }
}
