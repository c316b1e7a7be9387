use std::sync::Arc;

use crate::client::ApiClient;
use crate::clock::{Clock, SystemClock};
use crate::services::TicketWallet;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub wallet: Arc<TicketWallet>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(api: ApiClient, snapshot_limit: usize) -> Self {
        Self::with_clock(api, snapshot_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(api: ApiClient, snapshot_limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            wallet: Arc::new(TicketWallet::new(api, snapshot_limit)),
            clock,
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.wallet.api()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
