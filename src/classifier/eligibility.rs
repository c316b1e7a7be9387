//! Per-ticket action gates. All of them take the current time explicitly so
//! a transfer whose `expiresAt` has passed stops counting as pending even
//! before the server flips its status to `EXPIRED`.

use crate::models::{Ticket, Transfer, TransferStatus};

fn pending_transfer(ticket: &Ticket) -> Option<&Transfer> {
    ticket
        .transfer
        .as_ref()
        .filter(|transfer| transfer.status == TransferStatus::Pending)
}

pub fn is_transfer_pending(ticket: &Ticket, now_ms: i64) -> bool {
    match pending_transfer(ticket) {
        Some(transfer) => transfer
            .expires_at
            .map(|expires_at| expires_at.timestamp_millis() > now_ms)
            .unwrap_or(true),
        None => false,
    }
}

/// A ticket mid-transfer cannot be redeemed by its current holder.
pub fn can_display_qr(ticket: &Ticket, now_ms: i64) -> bool {
    ticket.is_paid() && !is_transfer_pending(ticket, now_ms)
}

pub fn can_transfer(ticket: &Ticket, now_ms: i64) -> bool {
    !ticket.is_canceled()
        && can_display_qr(ticket, now_ms)
        && !ticket.used
        && !is_transfer_pending(ticket, now_ms)
}

pub fn remaining_transfer_ms(ticket: &Ticket, now_ms: i64) -> i64 {
    pending_transfer(ticket)
        .and_then(|transfer| transfer.expires_at)
        .map(|expires_at| (expires_at.timestamp_millis() - now_ms).max(0))
        .unwrap_or(0)
}

/// Only the sender may withdraw a transfer, and only while it is live.
pub fn can_cancel_transfer(ticket: &Ticket, user_id: Option<&str>, now_ms: i64) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    is_transfer_pending(ticket, now_ms)
        && ticket
            .transfer
            .as_ref()
            .and_then(|transfer| transfer.from_user_id.as_deref())
            == Some(user_id)
}

/// The share code is shown to the sender alongside the cancel action.
pub fn visible_transfer_code<'a>(
    ticket: &'a Ticket,
    user_id: Option<&str>,
    now_ms: i64,
) -> Option<&'a str> {
    if !can_cancel_transfer(ticket, user_id, now_ms) {
        return None;
    }
    ticket.transfer.as_ref().and_then(|transfer| transfer.code.as_deref())
}
