//! Shared-password login and the session cookie gate.
//!
//! There is no session store: a successful login sets the `auth-session`
//! cookie to a fixed sentinel value and the gate only checks that value.
//! Anyone who can set that cookie passes the gate.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, SecondsFormat, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::app::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth-session";

/// Cookie value marking an authenticated browser
pub const SESSION_SENTINEL: &str = "authenticated";

/// Session lifetime in hours
pub const SESSION_HOURS: i64 = 8;

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/login";

/// Path prefixes reachable without a session
pub const PUBLIC_PREFIXES: [&str; 3] = ["/login", "/api/auth/login", "/api/auth/logout"];

/// Login form body
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login answer
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// RFC 3339 expiry of the session cookie
    pub expires_at: String,
}

/// True when `path` can be served without a session.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// True when `target` is a path on this site. Browsers read `//host` and
/// `/\host` as links to another host.
pub fn is_same_site_path(target: &str) -> bool {
    let mut chars = target.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

/// True when the jar carries the session sentinel.
pub fn has_session(jar: &CookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .is_some_and(|cookie| cookie.value() == SESSION_SENTINEL)
}

/// Login URL that brings the visitor back to `path` afterwards.
pub fn login_redirect_target(path: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(path))
}

/// Session gate middleware
///
/// Requests to public paths, and requests carrying the session sentinel,
/// pass through. Everything else is redirected to the login page with the
/// original path as the `redirect` parameter.
pub async fn require_session(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) || has_session(&jar) {
        return next.run(request).await;
    }

    Redirect::temporary(&login_redirect_target(&path)).into_response()
}

/// Handle `POST /api/auth/login`
///
/// Compares the submitted password with the configured one and sets the
/// session cookie on a match.
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    let Some(expected) = state.password.as_deref() else {
        error!("Login attempted but GLOBAL_PASSWORD is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Server configuration error" })),
        )
            .into_response();
    };

    if body.password.as_deref() != Some(expected) {
        warn!("Rejected login with wrong password");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Password non corretta" })),
        )
            .into_response();
    }

    let expires_at = Utc::now() + Duration::hours(SESSION_HOURS);
    let cookie_expiry = match OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        Ok(at) => at,
        Err(e) => {
            error!("Could not compute session expiry: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server configuration error" })),
            )
                .into_response();
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, SESSION_SENTINEL))
        .http_only(true)
        .path("/")
        .expires(cookie_expiry)
        .same_site(SameSite::Strict);

    info!("Session opened until {}", expires_at.to_rfc3339());
    (
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            message: "Autenticazione riuscita".to_string(),
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
        .into_response()
}

/// Handle `POST /api/auth/logout`
///
/// Overwrites the session cookie with an empty, already expired one.
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .same_site(SameSite::Strict);

    (
        jar.add(cookie),
        Json(json!({ "success": true, "message": "Logout effettuato" })),
    )
}

/// Answer for auth endpoints called with the wrong method
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
}
