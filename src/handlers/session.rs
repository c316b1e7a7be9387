use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::json_body;
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, data, success};

const SESSION_EXPIRED: &str = "Your session has expired.";

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub identifier: String,
    pub code: String,
}

fn required(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(())
}

pub async fn request_code(
    State(state): State<AppState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    required(&body.identifier, "Enter your phone or e-mail.")?;

    let answer = state
        .api()
        .request_login_code(body.identifier.trim())
        .await
        .map_err(|e| AppError::from_api(e, "Could not send the code."))?;
    Ok(success(answer, "Code sent."))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    required(&body.identifier, "Enter your phone or e-mail.")?;
    required(&body.code, "Enter the code you received.")?;

    let mut session = Session::anonymous();
    let response = session
        .login(state.api(), body.identifier.trim(), body.code.trim())
        .await
        .map_err(|e| AppError::from_api(e, "Login failed."))?;

    if !session.is_authenticated() {
        return Err(AppError::AuthError(
            response.message.unwrap_or_else(|| "Login failed.".to_string()),
        ));
    }
    Ok(success(response, "Signed in."))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    let answer = state
        .api()
        .register_user(&body)
        .await
        .map_err(|e| AppError::from_api(e, "Registration failed."))?;
    Ok(created(answer, "Account created."))
}

pub async fn me(State(state): State<AppState>, mut session: Session) -> Result<Response, AppError> {
    session.require_token()?;
    session.load(state.api()).await;
    let user = session
        .user()
        .cloned()
        .ok_or_else(|| AppError::AuthError(SESSION_EXPIRED.to_string()))?;
    Ok(data(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    mut session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let patch = json_body(payload)?;
    if !patch.is_object() {
        return Err(AppError::ValidationError(
            "Profile changes must be a JSON object.".to_string(),
        ));
    }
    session.require_token()?;
    session.load(state.api()).await;

    let user = session
        .update_profile(state.api(), &patch)
        .await
        .map_err(|e| AppError::from_api(e, "Could not update your profile."))?;
    Ok(success(user, "Profile updated."))
}

pub async fn face_status(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    session.require_token()?;
    let status = state.api().fetch_face_status(&session).await?;
    Ok(data(status))
}

pub async fn enroll_face(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let body = json_body(payload)?;
    session.require_token()?;
    let answer = state
        .api()
        .enroll_face(&session, &body)
        .await
        .map_err(|e| AppError::from_api(e, "Face enrollment failed."))?;
    Ok(success(answer, "Face enrolled."))
}
