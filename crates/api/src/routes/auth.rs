//! Login flow handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use harvester_domain::constants::MASKED_TOKEN;
use harvester_domain::CaptchaChallenge;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SmsRequest {
    pub phone_number: String,
    pub captcha_id: String,
    pub captcha_code: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub phone_number: String,
    pub otp_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub show_token: bool,
}

/// Login state as reported to the caller. All fields are absent when no
/// session exists, yielding an empty object rather than an error.
#[derive(Debug, Serialize)]
pub struct LoginInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obtained_at: Option<DateTime<Utc>>,
}

pub async fn captcha(State(state): State<AppState>) -> ApiResult<Json<CaptchaChallenge>> {
    Ok(Json(state.auth.request_captcha().await?))
}

pub async fn request_sms(
    State(state): State<AppState>,
    Json(request): Json<SmsRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .request_sms(&request.phone_number, &request.captcha_id, &request.captcha_code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<StatusCode> {
    state.auth.verify_sms(&request.phone_number, &request.otp_code).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.auth.refresh_login().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn login_info(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> ApiResult<Json<LoginInfo>> {
    let info = match state.auth.current_session().await? {
        Some(session) => LoginInfo {
            phone_number: Some(session.phone_number),
            token: Some(if query.show_token {
                session.access_token
            } else {
                MASKED_TOKEN.to_owned()
            }),
            obtained_at: Some(session.obtained_at),
        },
        None => LoginInfo { phone_number: None, token: None, obtained_at: None },
    };
    Ok(Json(info))
}

pub async fn logout(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.auth.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}
