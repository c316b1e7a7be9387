use reqwest::Method;
use serde_json::Value;

use super::{ApiClient, ApiError};
use crate::models::user::{LoginCodeRequest, LoginRequest, LoginResponse};
use crate::models::User;
use crate::session::Session;

impl ApiClient {
    /// Ask the API to send a one-time login code to a phone or e-mail.
    pub async fn request_login_code(&self, identifier: &str) -> Result<Value, ApiError> {
        self.post(
            &Session::anonymous(),
            &["users", "request-code"],
            &LoginCodeRequest { identifier },
        )
        .await
    }

    pub async fn register_user(&self, payload: &Value) -> Result<Value, ApiError> {
        self.post(&Session::anonymous(), &["users", "register"], payload)
            .await
    }

    pub async fn login_with_code(
        &self,
        identifier: &str,
        code: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.post(
            &Session::anonymous(),
            &["auth", "login"],
            &LoginRequest { identifier, code },
        )
        .await
    }

    pub async fn fetch_me(&self, session: &Session) -> Result<User, ApiError> {
        self.get(session, &["auth", "me"]).await
    }

    pub async fn update_me(&self, session: &Session, patch: &Value) -> Result<Value, ApiError> {
        self.send(session, Method::PATCH, &["users", "me"], Some(patch))
            .await
    }

    pub async fn fetch_face_status(&self, session: &Session) -> Result<Value, ApiError> {
        self.get(session, &["users", "me", "face"]).await
    }

    pub async fn enroll_face(&self, session: &Session, payload: &Value) -> Result<Value, ApiError> {
        self.post(session, &["users", "me", "face", "enroll"], payload)
            .await
    }
}
