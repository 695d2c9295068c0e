//! Column addressing for the member sheet.
//!
//! The sheet has no fixed layout: on every request the header row is read and
//! the three columns the lookup needs are located by a case-insensitive
//! substring match on their labels.

/// A column the lookup needs to find in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Member identifier ("UUID")
    Uuid,
    /// Visit counter ("Ingressi")
    Entries,
    /// Membership type ("Tipo Tessera")
    MembershipType,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Uuid, Column::Entries, Column::MembershipType];

    /// Lowercase fragment a header label must contain.
    pub fn needle(&self) -> &'static str {
        match self {
            Column::Uuid => "uuid",
            Column::Entries => "ingressi",
            Column::MembershipType => "tipo tes",
        }
    }

    /// Name shown to operators when the column is missing.
    pub fn display_name(&self) -> &'static str {
        match self {
            Column::Uuid => "UUID",
            Column::Entries => "Ingressi",
            Column::MembershipType => "\"Tipo Tes\"",
        }
    }
}

/// Zero-based positions of the three resolved columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub uuid: usize,
    pub entries: usize,
    pub membership_type: usize,
}

impl ColumnMap {
    /// Smallest contiguous span `(first, last)` covering all three columns
    pub fn span(&self) -> (usize, usize) {
        let first = self.uuid.min(self.entries).min(self.membership_type);
        let last = self.uuid.max(self.entries).max(self.membership_type);
        (first, last)
    }
}

/// Index of the first header cell containing `needle`, ignoring case.
pub fn find_column<S: AsRef<str>>(headers: &[S], needle: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.as_ref().to_lowercase().contains(needle))
}

/// Resolve every required column.
///
/// All three lookups run before failing, so the error lists every missing
/// column at once.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<ColumnMap, Vec<Column>> {
    let mut missing = Vec::new();
    let mut found = [0usize; 3];

    for (slot, column) in Column::ALL.iter().enumerate() {
        match find_column(headers, column.needle()) {
            Some(index) => found[slot] = index,
            None => missing.push(*column),
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(ColumnMap {
        uuid: found[0],
        entries: found[1],
        membership_type: found[2],
    })
}

/// Convert a zero-based column index to its letter (0 = A, 26 = AA).
///
/// # Examples
/// ```
/// use tessera::columns::column_letter;
///
/// assert_eq!(column_letter(0), "A");
/// assert_eq!(column_letter(25), "Z");
/// assert_eq!(column_letter(26), "AA");
/// assert_eq!(column_letter(51), "AZ");
/// ```
pub fn column_letter(index: usize) -> String {
    let mut name = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}

/// A rectangular region of the member tab, addressed the way the remote API
/// expects it. Rows and columns are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRange {
    /// A whole row
    Row(usize),
    /// A contiguous run of whole columns
    Columns { first: usize, last: usize },
    /// A single cell
    Cell { row: usize, col: usize },
}

impl CellRange {
    /// Render as A1 notation against the named tab, e.g. `'Check Ingressi'!B7`.
    pub fn to_a1(&self, sheet_name: &str) -> String {
        let tab = quote_sheet_name(sheet_name);
        match self {
            CellRange::Row(row) => format!("{}!{}:{}", tab, row + 1, row + 1),
            CellRange::Columns { first, last } => {
                format!("{}!{}:{}", tab, column_letter(*first), column_letter(*last))
            }
            CellRange::Cell { row, col } => format!("{}!{}{}", tab, column_letter(*col), row + 1),
        }
    }
}

fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
