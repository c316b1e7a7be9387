//! The caller's identity, passed explicitly to every API call.
//!
//! A session starts anonymous or from a bearer token, may be loaded (user
//! fetched from `/auth/me`), and is cleared on logout. In the HTTP service it
//! is built per request from the `Authorization` header.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{ApiClient, ApiError};
use crate::models::user::LoginResponse;
use crate::models::User;
use crate::utils::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.id.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn require_token(&self) -> Result<&str, AppError> {
        self.token()
            .ok_or_else(|| AppError::AuthError("Sign in to see your tickets.".to_string()))
    }

    /// Fetch the current user. A failure leaves the session without a user
    /// but keeps the token.
    pub async fn load(&mut self, api: &ApiClient) {
        if self.token.is_none() {
            return;
        }
        match api.fetch_me(self).await {
            Ok(user) => self.user = Some(user),
            Err(e) => {
                debug!(error = %e, "Could not load current user");
                self.user = None;
            }
        }
    }

    /// Exchange a one-time code for a token. The session only changes when
    /// the API returns an access token.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        identifier: &str,
        code: &str,
    ) -> Result<LoginResponse, ApiError> {
        let response = api.login_with_code(identifier, code).await?;
        if let Some(token) = &response.access_token {
            self.token = Some(token.clone());
            self.user = response.user.clone();
            info!(user_id = self.user_id().unwrap_or(""), "Session opened");
        }
        Ok(response)
    }

    pub async fn update_profile(&mut self, api: &ApiClient, patch: &Value) -> Result<User, ApiError> {
        let changed = api.update_me(self, patch).await?;
        let merged = self.user.clone().unwrap_or_default().merged(&changed)?;
        self.user = Some(merged.clone());
        Ok(merged)
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(bearer_token(parts)
            .map(Session::with_token)
            .unwrap_or_default())
    }
}
