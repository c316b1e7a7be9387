//! Typed client for the marketplace's HTTP API.
//!
//! Every call takes the caller's [`Session`]; its bearer token, when present,
//! is attached to the request. Non-2xx answers surface the server's
//! `message` so callers can show it verbatim.

mod auth;
mod catalog;
mod tickets;

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid marketplace api url: {0}")]
    InvalidBaseUrl(String),

    #[error("marketplace api unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("marketplace api answered {status}")]
    Status { status: u16, message: Option<String> },

    #[error("unexpected marketplace api payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(method = %method, url = %url, "Calling marketplace api");

        let mut request = self.http.request(method, url.clone());
        if let Some(token) = session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&bytes);
            warn!(
                status = status.as_u16(),
                url = %url,
                message = message.as_deref().unwrap_or(""),
                "Marketplace api rejected request"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        self.send::<(), T>(session, Method::GET, segments, None).await
    }

    async fn post<B, T>(&self, session: &Session, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(session, Method::POST, segments, Some(body)).await
    }
}

/// Pull a human readable message out of an error body. Validation errors
/// sometimes come as a list of messages.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object()?;
    match obj.get("message") {
        Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
        Some(Value::Array(messages)) => {
            let joined = messages
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => match obj.get("error") {
            Some(Value::String(error)) if !error.is_empty() => Some(error.clone()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoints_join_and_encode_segments() {
        let api = client("http://localhost:3002");
        assert_eq!(
            api.endpoint(&["tickets", "me"]).unwrap().as_str(),
            "http://localhost:3002/tickets/me"
        );

        let api = client("http://localhost:3002/api/");
        assert_eq!(
            api.endpoint(&["tickets", "a/b", "transfer"]).unwrap().as_str(),
            "http://localhost:3002/api/tickets/a%2Fb/transfer"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn error_messages_from_bodies() {
        assert_eq!(
            error_message(br#"{"message":"Ticket already used"}"#).as_deref(),
            Some("Ticket already used")
        );
        assert_eq!(
            error_message(br#"{"message":["toEmail must be an email","toCpf is required"]}"#)
                .as_deref(),
            Some("toEmail must be an email; toCpf is required")
        );
        assert_eq!(
            error_message(br#"{"error":"Unauthorized"}"#).as_deref(),
            Some("Unauthorized")
        );
        assert_eq!(error_message(b"<html>502</html>"), None);
        assert_eq!(error_message(br#"{"message":""}"#), None);
    }

    #[test]
    fn user_message_prefers_server_text() {
        let with_text = ApiError::Status {
            status: 400,
            message: Some("Code expired".into()),
        };
        let without = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(with_text.user_message("Transfer failed."), "Code expired");
        assert_eq!(without.user_message("Transfer failed."), "Transfer failed.");
        assert_eq!(without.status(), Some(500));
    }
}
