pub mod checkout;
pub mod wallet;

pub use checkout::Cart;
pub use wallet::{ActionOutcome, QrPayload, TicketWallet, WalletView};
