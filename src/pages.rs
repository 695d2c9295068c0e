//! Server-rendered pages.
//!
//! Templates live in `src/static/` and are compiled into the binary.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use handlebars::{Handlebars, RenderError, TemplateError};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::login::is_same_site_path;
use crate::verify::{Verdict, verify_member};

const CLUB_NAME: &str = "Flamingo Surf Club";

/// Compiled page templates
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    /// Compile every template.
    ///
    /// # Errors
    /// * Returns an error if any template fails to parse
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        registry.register_partial("head", include_str!("./static/head.hbs"))?;
        registry.register_partial("foot", include_str!("./static/foot.hbs"))?;
        registry.register_template_string("index", include_str!("./static/index.hbs"))?;
        registry.register_template_string("result", include_str!("./static/result.hbs"))?;
        registry.register_template_string("login", include_str!("./static/login.hbs"))?;

        Ok(Self { registry })
    }

    /// Identifier entry form
    pub fn render_index(&self) -> Result<String, RenderError> {
        self.registry.render(
            "index",
            &json!({
                "title": format!("{} - Verifica Iscrizione", CLUB_NAME),
                "club": CLUB_NAME,
                "logout": true,
            }),
        )
    }

    /// Login form; `redirect` is where a successful login should land
    pub fn render_login(&self, redirect: &str) -> Result<String, RenderError> {
        self.registry.render(
            "login",
            &json!({
                "title": format!("Accesso - {}", CLUB_NAME),
                "club": CLUB_NAME,
                "redirect": redirect,
            }),
        )
    }

    /// Verification outcome for `id`
    pub fn render_result(&self, id: &str, verdict: &Verdict) -> Result<String, RenderError> {
        self.registry.render(
            "result",
            &json!({
                "title": format!("Risultato Verifica - {}", CLUB_NAME),
                "club": CLUB_NAME,
                "logout": true,
                "id": id,
                "verdict": verdict,
                "previousEntries": verdict.previous_entries(),
            }),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

fn rendered(page: Result<String, RenderError>) -> Response {
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Serve the identifier form
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Response {
    rendered(state.pages.render_index())
}

/// Serve the login page
pub async fn serve_login(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoginQuery>,
) -> Response {
    let redirect = params
        .redirect
        .filter(|target| is_same_site_path(target))
        .unwrap_or_else(|| "/".to_string());

    rendered(state.pages.render_login(&redirect))
}

/// Run the lookup for `?id=` and render the outcome
///
/// A missing or blank identifier sends the visitor back to the form.
pub async fn serve_result(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResultQuery>,
) -> Response {
    let Some(id) = params.id.filter(|id| !id.trim().is_empty()) else {
        return Redirect::to("/").into_response();
    };

    let verdict = match verify_member(state.sheets.as_ref(), &id).await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!("Verification of {:?} failed: {}", id, e);
            Verdict::failure(e.user_message())
        }
    };

    rendered(state.pages.render_result(&id, &verdict))
}
