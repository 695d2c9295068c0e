//! Membership lookup with visit counting.
//!
//! One lookup reads the header row, resolves the columns, reads the column
//! span holding them, finds the first row with the requested identifier and
//! writes back the incremented visit counter.
//!
//! The read-increment-write sequence is not atomic: two concurrent lookups of
//! the same member can both read the same count and one visit is lost.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::columns::{CellRange, ColumnMap, resolve_columns};
use crate::error::VerifyError;
use crate::sheets::SheetClient;

const UNSPECIFIED_TYPE: &str = "Non specificato";

/// Answer to a verification request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// The request was processed
    pub success: bool,
    /// A matching member row was found
    pub is_member: bool,
    pub message: String,
    /// Visit number after this visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<String>,
}

impl Verdict {
    pub fn not_found() -> Self {
        Self {
            success: true,
            is_member: false,
            message: "🦩 Ops! Non riusciamo a trovare il tuo ID nel nostro database. Controlla di aver inserito l'ID corretto! 🦩".to_string(),
            entries_count: None,
            membership_type: None,
        }
    }

    pub fn member(entries_count: u64, membership_type: String) -> Self {
        let warning = if entries_count > 1 { " ⚠️" } else { "" };
        Self {
            success: true,
            is_member: true,
            message: format!(
                "🌺 Ottimo! Sei un socio attivo del nostro surf club! 🏄‍♀️ **Questo è il tuo ingresso #{}!**{}",
                entries_count, warning
            ),
            entries_count: Some(entries_count),
            membership_type: Some(membership_type),
        }
    }

    /// Member found but the new count could not be saved
    pub fn member_unsaved(entries_count: u64) -> Self {
        Self {
            success: true,
            is_member: true,
            message: "🌺 ID verificato! Sei un socio attivo del nostro surf club! 🏄‍♀️ (Errore aggiornamento contatore)".to_string(),
            entries_count: Some(entries_count),
            membership_type: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            is_member: false,
            message: message.into(),
            entries_count: None,
            membership_type: None,
        }
    }

    /// Number of visits recorded before this one, when there were any.
    pub fn previous_entries(&self) -> Option<u64> {
        self.entries_count.filter(|count| *count > 1).map(|count| count - 1)
    }
}

/// A member row located in the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberRow {
    /// Zero-based row in the sheet (row 0 is the header)
    pub row: usize,
    pub entries: u64,
    pub membership_type: String,
}

/// Parse a visit counter cell; blank or unusable values count as zero.
///
/// # Examples
/// ```
/// use tessera::verify::parse_entries;
///
/// assert_eq!(parse_entries("5"), 5);
/// assert_eq!(parse_entries(" 7 "), 7);
/// assert_eq!(parse_entries(""), 0);
/// assert_eq!(parse_entries("n/a"), 0);
/// ```
pub fn parse_entries(cell: &str) -> u64 {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<u64>() {
        return n;
    }

    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => n as u64,
        _ => 0,
    }
}

/// Find the first row after the header whose identifier matches `id`.
///
/// `span_start` is the sheet column of the first cell in each row of `rows`.
pub(crate) fn find_member(
    rows: &[Vec<String>],
    columns: &ColumnMap,
    span_start: usize,
    id: &str,
) -> Option<MemberRow> {
    fn cell(row: &[String], col: usize, span_start: usize) -> Option<&str> {
        row.get(col - span_start).map(|s| s.as_str())
    }

    let id = id.trim();
    rows.iter().enumerate().skip(1).find_map(|(index, row)| {
        match cell(row, columns.uuid, span_start) {
            Some(value) if value.trim() == id => {}
            _ => return None,
        }

        let entries = cell(row, columns.entries, span_start).map(parse_entries).unwrap_or(0);
        let membership_type = match cell(row, columns.membership_type, span_start).map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => UNSPECIFIED_TYPE.to_string(),
        };

        Some(MemberRow {
            row: index,
            entries,
            membership_type,
        })
    })
}

/// Look up a member by identifier and count the visit.
///
/// A missing member yields a negative verdict rather than an error. A failed
/// counter write still yields a positive verdict with the incremented count.
pub async fn verify_member<C>(sheets: &C, id: &str) -> Result<Verdict, VerifyError>
where
    C: SheetClient + ?Sized,
{
    if id.trim().is_empty() {
        return Err(VerifyError::MissingId);
    }

    let header = sheets
        .read_range(&CellRange::Row(0))
        .await?
        .into_iter()
        .next()
        .unwrap_or_default();
    if header.is_empty() {
        return Err(VerifyError::EmptyHeader);
    }

    let columns = resolve_columns(&header).map_err(VerifyError::MissingColumns)?;
    let (first, last) = columns.span();

    let rows = sheets
        .read_range(&CellRange::Columns { first, last })
        .await?;
    if rows.is_empty() {
        return Err(VerifyError::EmptyData);
    }

    let Some(member) = find_member(&rows, &columns, first, id) else {
        debug!("No member row for {:?} among {} rows", id.trim(), rows.len() - 1);
        return Ok(Verdict::not_found());
    };

    let entries = member.entries.saturating_add(1);
    debug!(
        "Member {:?} at row {}: entries {} -> {}, columns {:?}",
        id.trim(),
        member.row + 1,
        member.entries,
        entries,
        columns
    );

    if let Err(e) = sheets.write_cell(member.row, columns.entries, entries).await {
        warn!(
            "Could not save entry count {} for row {}: {}",
            entries,
            member.row + 1,
            e
        );
        return Ok(Verdict::member_unsaved(entries));
    }

    Ok(Verdict::member(entries, member.membership_type))
}
