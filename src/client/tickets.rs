use reqwest::Method;
use serde_json::Value;

use super::{ApiClient, ApiError};
use crate::models::ticket::tickets_from_json;
use crate::models::{AcceptTransferRequest, Ticket, TransferReceipt, TransferRequest};
use crate::session::Session;

impl ApiClient {
    pub async fn fetch_my_tickets(&self, session: &Session) -> Result<Vec<Ticket>, ApiError> {
        let payload: Value = self.get(session, &["tickets", "me"]).await?;
        Ok(tickets_from_json(payload))
    }

    pub async fn fetch_transfers_sent(&self, session: &Session) -> Result<Value, ApiError> {
        self.get(session, &["tickets", "transfers", "sent"]).await
    }

    pub async fn request_transfer(
        &self,
        session: &Session,
        ticket_id: &str,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, ApiError> {
        let payload: Value = self
            .post(session, &["tickets", ticket_id, "transfer"], request)
            .await?;
        Ok(TransferReceipt::from_json(&payload))
    }

    pub async fn cancel_transfer(
        &self,
        session: &Session,
        transfer_id: &str,
    ) -> Result<TransferReceipt, ApiError> {
        let payload: Value = self
            .send::<(), _>(
                session,
                Method::POST,
                &["tickets", "transfer", transfer_id, "cancel"],
                None,
            )
            .await?;
        Ok(TransferReceipt::from_json(&payload))
    }

    /// Claim a transfer by code. The body carries the code next to the
    /// recipient's identity fields.
    pub async fn accept_transfer(
        &self,
        session: &Session,
        request: &AcceptTransferRequest,
    ) -> Result<TransferReceipt, ApiError> {
        let payload: Value = self
            .post(session, &["tickets", "transfer", "accept"], request)
            .await?;
        Ok(TransferReceipt::from_json(&payload))
    }
}
