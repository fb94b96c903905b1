//! Authentication route handlers.
//!
//! There is no session model: a successful login only returns the account
//! summary for the client to keep.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};

use fashionhub_core::{AccountId, Email};

use crate::error::{Result, add_breadcrumb, set_sentry_user};
use crate::extract::{JsonBody, QueryParams};
use crate::models::Account;
use crate::services::RegisterAccount;
use crate::state::AppState;

/// Login form input.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `?email=` query parameters.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Envelope returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

impl AuthResponse {
    fn new(message: &'static str, account: Account) -> Self {
        Self {
            success: true,
            message,
            user_id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
        }
    }
}

/// Email availability answer.
#[derive(Debug, Serialize)]
pub struct EmailAvailability {
    pub success: bool,
    pub available: bool,
    pub message: &'static str,
}

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterAccount>,
) -> Result<Json<AuthResponse>> {
    let account = state.accounts().register(input).await?;

    let account_id = account.id.to_string();
    add_breadcrumb("auth", "Account registered", Some(&[("account_id", account_id.as_str())]));

    Ok(Json(AuthResponse::new(
        "Registration successful! You can now login with your credentials.",
        account,
    )))
}

/// Check credentials.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let account = state.accounts().login(&input.email, &input.password).await?;
    set_sentry_user(&account.id);
    Ok(Json(AuthResponse::new("Login successful", account)))
}

/// Report whether an email is still free.
pub async fn check_email(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<EmailAvailability>> {
    let available = state.accounts().email_available(&query.email).await?;
    Ok(Json(EmailAvailability {
        success: true,
        available,
        message: if available {
            "Email is available"
        } else {
            "Email already exists"
        },
    }))
}
