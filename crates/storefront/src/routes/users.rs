//! Account directory route handlers.

use axum::{
    Json,
    extract::State,
};
use serde::Serialize;

use fashionhub_core::AccountId;

use super::products::SearchQuery;
use crate::error::{AppError, Result};
use crate::extract::{PathParam, QueryParams};
use crate::models::Account;
use crate::state::AppState;

/// An account as shown in the directory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    pub full_name: String,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            full_name: account.full_name(),
            account,
        }
    }
}

/// A list of accounts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountList {
    pub success: bool,
    pub message: &'static str,
    pub users: Vec<AccountView>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl AccountList {
    fn new(message: &'static str, accounts: Vec<Account>, search_term: Option<String>) -> Self {
        let users: Vec<AccountView> = accounts.into_iter().map(AccountView::from).collect();
        Self {
            success: true,
            message,
            count: users.len(),
            users,
            search_term,
        }
    }
}

/// A single account.
#[derive(Debug, Serialize)]
pub struct AccountFound {
    pub success: bool,
    pub message: &'static str,
    pub user: AccountView,
}

/// Whether an email is registered.
#[derive(Debug, Serialize)]
pub struct EmailExists {
    pub success: bool,
    pub message: &'static str,
    pub exists: bool,
    pub email: String,
}

fn found(account: Account) -> Json<AccountFound> {
    Json(AccountFound {
        success: true,
        message: "User found successfully",
        user: account.into(),
    })
}

/// All accounts.
pub async fn index(State(state): State<AppState>) -> Result<Json<AccountList>> {
    let accounts = state.accounts().list_accounts().await?;
    Ok(Json(AccountList::new(
        "Users retrieved successfully",
        accounts,
        None,
    )))
}

/// Account by id.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<AccountFound>> {
    state
        .accounts()
        .get_by_id(AccountId::new(id))
        .await?
        .map(found)
        .ok_or_else(|| AppError::NotFound(format!("User not found with ID: {id}")))
}

/// Account by email.
pub async fn by_email(
    State(state): State<AppState>,
    PathParam(email): PathParam<String>,
) -> Result<Json<AccountFound>> {
    state
        .accounts()
        .get_by_email(&email)
        .await?
        .map(found)
        .ok_or_else(|| AppError::NotFound(format!("User not found with email: {email}")))
}

/// Name search.
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<AccountList>> {
    let accounts = state.accounts().search_accounts(&query.name).await?;
    Ok(Json(AccountList::new(
        "Search completed successfully",
        accounts,
        Some(query.name),
    )))
}

/// Whether an email is registered.
pub async fn exists(
    State(state): State<AppState>,
    PathParam(email): PathParam<String>,
) -> Result<Json<EmailExists>> {
    let exists = state.accounts().exists_by_email(&email).await?;
    Ok(Json(EmailExists {
        success: true,
        message: if exists { "Email exists" } else { "Email available" },
        exists,
        email,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::tests::{get_json, post_json, test_app};

    async fn seeded() -> axum::Router {
        let app = test_app(Vec::new(), Vec::new());
        for (first, last, email) in [
            ("Ann", "Lee", "ann@example.com"),
            ("Bob", "Stone", "bob@example.com"),
        ] {
            let body = json!({
                "firstName": first,
                "lastName": last,
                "email": email,
                "password": "secret1",
            });
            post_json(&app, "/api/auth/register", &body).await;
        }
        app
    }

    #[tokio::test]
    async fn test_directory() {
        let app = seeded().await;

        let (status, body) = get_json(&app, "/api/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["users"][0]["userId"], 5);
        assert_eq!(body["users"][0]["fullName"], "Ann Lee");
        assert!(body["users"][0].get("password").is_none());

        let (_, body) = get_json(&app, "/api/users/6").await;
        assert_eq!(body["user"]["email"], "bob@example.com");

        let (status, body) = get_json(&app, "/api/users/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = get_json(&app, "/api/users/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_email_lookups() {
        let app = seeded().await;

        let (_, body) = get_json(&app, "/api/users/email/ANN@example.com").await;
        assert_eq!(body["user"]["userId"], 5);

        let (_, body) = get_json(&app, "/api/users/exists/bob@example.com").await;
        assert_eq!(body["exists"], true);

        let (_, body) = get_json(&app, "/api/users/exists/carol@example.com").await;
        assert_eq!(body["exists"], false);
    }

    #[tokio::test]
    async fn test_search() {
        let app = seeded().await;

        let (_, body) = get_json(&app, "/api/users/search?name=STO").await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["searchTerm"], "STO");
    }
}
