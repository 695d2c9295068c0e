use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

use crate::service_account::ServiceAccount;

const DEFAULT_SPREADSHEET_ID: &str = "1vJPuwdbZ-hjuPmcNdymrdg401CQUsDKjTlKOep_afus";
const DEFAULT_SHEET_NAME: &str = "Check Ingressi";

/// Runtime settings, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Shared login password; logins fail with a server error when unset
    pub global_password: Option<String>,
    pub service_account: ServiceAccount,
}

impl Config {
    /// Load from the process environment, after reading `.env` if one exists.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            info!("No .env file loaded: {e}");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: try_load(&lookup, "HOST", "127.0.0.1"),
            port: try_load(&lookup, "PORT", "3000"),
            spreadsheet_id: try_load(&lookup, "SPREADSHEET_ID", DEFAULT_SPREADSHEET_ID),
            sheet_name: try_load(&lookup, "SHEET_NAME", DEFAULT_SHEET_NAME),
            global_password: optional(&lookup, "GLOBAL_PASSWORD"),
            service_account: ServiceAccount {
                project_id: optional(&lookup, "GOOGLE_PROJECT_ID"),
                private_key_id: optional(&lookup, "GOOGLE_PRIVATE_KEY_ID"),
                private_key: optional(&lookup, "GOOGLE_PRIVATE_KEY")
                    .map(|key| key.replace("\\n", "\n")),
                client_email: optional(&lookup, "GOOGLE_CLIENT_EMAIL"),
                client_id: optional(&lookup, "GOOGLE_CLIENT_ID"),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!("Environment variable {key} not found");
            None
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} value: {e}, using default: {default}");
            match default.parse() {
                Ok(value) => value,
                Err(_) => unreachable!("default for {key} must parse"),
            }
        }
    }
}
