//! OAuth access tokens for a Google service account.
//!
//! The service account signs a short-lived RS256 assertion which the token
//! endpoint exchanges for a bearer token. Tokens are kept until a minute
//! before they expire.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::SheetError;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const ASSERTION_LIFETIME: i64 = 3600;
const EXPIRY_MARGIN: i64 = 60;

/// Pre-provisioned service account fields
#[derive(Debug, Clone, Default)]
pub struct ServiceAccount {
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    /// PEM encoded RSA key
    pub private_key: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Hands out bearer tokens for the sheets API
pub struct TokenSource {
    account: ServiceAccount,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount, client: Client) -> Self {
        Self {
            account,
            client,
            cached: Mutex::new(None),
        }
    }

    /// A valid bearer token, fetching a fresh one when needed.
    pub async fn token(&self) -> Result<String, SheetError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.assertion(now)?;
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            "Fetched access token for {:?}, valid for {}s",
            self.account.client_email, token.expires_in
        );

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        });

        Ok(value)
    }

    fn assertion(&self, now: i64) -> Result<String, SheetError> {
        let email = self
            .account
            .client_email
            .as_deref()
            .ok_or(SheetError::MissingCredential("GOOGLE_CLIENT_EMAIL"))?;
        let pem = self
            .account
            .private_key
            .as_deref()
            .ok_or(SheetError::MissingCredential("GOOGLE_PRIVATE_KEY"))?;

        let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id.clone();

        let claims = Claims {
            iss: email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + ASSERTION_LIFETIME,
        };

        Ok(encode(&header, &claims, &key)?)
    }
}
