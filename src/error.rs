use thiserror::Error;

use crate::columns::Column;

/// Failures talking to the remote spreadsheet service.
#[derive(Error, Debug)]
pub enum SheetError {
    /// A service account field needed to sign the token request is unset
    #[error("missing service account credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid service account key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    #[error("request to the sheets API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The spreadsheet (or the range inside it) does not exist
    #[error("spreadsheet range not found: {0}")]
    NotFound(String),

    #[error("sheets API returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl SheetError {
    /// True when the failure comes from local credential setup rather than the remote side.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SheetError::MissingCredential(_) | SheetError::InvalidKey(_)
        )
    }
}

/// Failures of a single membership lookup.
///
/// A missing member is not an error: it is a negative verdict.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("ID parameter is required")]
    MissingId,

    #[error("header row is empty")]
    EmptyHeader,

    #[error("missing columns: {0:?}")]
    MissingColumns(Vec<Column>),

    #[error("data range is empty")]
    EmptyData,

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl VerifyError {
    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            VerifyError::MissingId => 400,
            VerifyError::Sheet(SheetError::NotFound(_)) => 404,
            _ => 500,
        }
    }

    /// Localized message returned to the caller.
    pub fn user_message(&self) -> String {
        match self {
            VerifyError::MissingId => "ID parameter is required".to_string(),
            VerifyError::EmptyHeader => {
                "🌊 Errore durante la lettura dell'header. Riprova più tardi! 🌊".to_string()
            }
            VerifyError::MissingColumns(columns) => {
                let names: Vec<String> = columns
                    .iter()
                    .map(|column| column.display_name().to_string())
                    .collect();
                let noun = if names.len() == 1 { "Colonna" } else { "Colonne" };
                let verb = if names.len() == 1 {
                    "non trovata"
                } else {
                    "non trovate"
                };
                format!(
                    "🌊 {} {} {} nel foglio. Contatta l'amministratore! 🌊",
                    noun,
                    names.join(", "),
                    verb
                )
            }
            VerifyError::EmptyData => {
                "🌊 Errore durante la lettura dei dati. Riprova più tardi! 🌊".to_string()
            }
            VerifyError::Sheet(SheetError::NotFound(_)) => {
                "🌊 Foglio soci non trovato. Contatta l'amministratore! 🌊".to_string()
            }
            VerifyError::Sheet(e) if e.is_configuration() => {
                "🌊 Credenziali Google non configurate. Contatta l'amministratore! 🌊".to_string()
            }
            VerifyError::Sheet(_) => {
                "🌊 Errore durante la verifica. Riprova più tardi! 🌊".to_string()
            }
        }
    }
}
