#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::VerifyError;
use crate::login::{self, handle_login, handle_logout, require_session};
use crate::pages::{Pages, serve_index, serve_login, serve_result};
use crate::sheets::{GoogleSheets, SheetClient};
use crate::verify::{Verdict, verify_member};

/// State shared by every request
pub struct AppState {
    /// Member sheet
    pub sheets: Arc<dyn SheetClient>,
    /// Shared login password
    pub password: Option<String>,
    pub pages: Pages,
}

#[derive(Deserialize)]
struct VerifyQuery {
    #[serde(rename = "ID")]
    id: Option<String>,
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(Verdict::failure(self.user_message()))).into_response()
    }
}

/// Build the router with the session gate in front of every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/verify-result", get(serve_result))
        .route("/login", get(serve_login))
        .route(
            "/api/verify-subscription",
            get(verify_subscription).fallback(verify_method_not_allowed),
        )
        .route(
            "/api/auth/login",
            post(handle_login).fallback(login::method_not_allowed),
        )
        .route(
            "/api/auth/logout",
            post(handle_logout).fallback(login::method_not_allowed),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(require_session))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let sheets = GoogleSheets::new(
        &config.spreadsheet_id,
        &config.sheet_name,
        config.service_account.clone(),
    );

    // Setup app state
    let app_state = Arc::new(AppState {
        sheets: Arc::new(sheets),
        password: config.global_password.clone(),
        pages: Pages::new()?,
    });

    let app = router(app_state);

    // Start server
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(
        "Listening on http://{} (sheet {:?} of {})",
        address, config.sheet_name, config.spreadsheet_id
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle `GET /api/verify-subscription?ID=...`
async fn verify_subscription(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyQuery>,
) -> Result<Json<Verdict>, VerifyError> {
    let id = params.id.unwrap_or_default();

    match verify_member(state.sheets.as_ref(), &id).await {
        Ok(verdict) => Ok(Json(verdict)),
        Err(e) => {
            if e.status_code() >= 500 {
                error!("Error verifying subscription: {e}");
            }
            Err(e)
        }
    }
}

async fn verify_method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(Verdict::failure("Method not allowed")),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
