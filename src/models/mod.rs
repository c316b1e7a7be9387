//! Marketplace records, normalized from the API's loosely typed JSON.

pub mod event;
pub mod order;
pub mod ticket;
pub mod transfer;
pub mod user;
pub mod wire;

use thiserror::Error;

pub use event::Event;
pub use order::{OrderItem, OrderReceipt, OrderRef, OrderStatus, PaymentStatus};
pub use ticket::{Ticket, TicketType};
pub use transfer::{AcceptTransferRequest, Transfer, TransferReceipt, TransferRequest, TransferStatus};
pub use user::User;

/// Why a record could not be ingested at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no id")]
    MissingId,
}
