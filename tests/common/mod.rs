#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use tessera::columns::CellRange;
use tessera::error::SheetError;
use tessera::sheets::SheetClient;

/// In-memory member sheet that records every call
pub struct FakeSheet {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub reads: Mutex<Vec<CellRange>>,
    pub writes: Mutex<Vec<(usize, usize, u64)>>,
    pub fail_writes: bool,
    pub missing: bool,
}

impl FakeSheet {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self {
            rows: Mutex::new(
                rows.iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
            ),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fail_writes: false,
            missing: false,
        }
    }

    /// Standard club layout with a leading unrelated column
    pub fn club(members: &[(&str, &str, &str)]) -> Self {
        let mut rows: Vec<Vec<&str>> = vec![vec!["Nome", "UUID Socio", "Tipo Tessera", "Ingressi"]];
        for (id, kind, entries) in members {
            rows.push(vec!["someone", *id, *kind, *entries]);
        }
        let refs: Vec<&[&str]> = rows.iter().map(|row| row.as_slice()).collect();
        Self::new(&refs)
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn missing_spreadsheet(mut self) -> Self {
        self.missing = true;
        self
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<String> {
        self.rows.lock().unwrap().get(row)?.get(col).cloned()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn write_log(&self) -> Vec<(usize, usize, u64)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetClient for FakeSheet {
    async fn read_range(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetError> {
        self.reads.lock().unwrap().push(range.clone());
        if self.missing {
            return Err(SheetError::NotFound(range.to_a1("Check Ingressi")));
        }

        let rows = self.rows.lock().unwrap();
        let values: Vec<Vec<String>> = match range {
            CellRange::Row(r) => rows.get(*r).cloned().into_iter().collect(),
            CellRange::Columns { first, last } => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .filter(|(col, _)| col >= first && col <= last)
                        .map(|(_, cell)| cell.clone())
                        .collect()
                })
                .collect(),
            CellRange::Cell { row, col } => rows
                .get(*row)
                .and_then(|r| r.get(*col))
                .map(|cell| vec![vec![cell.clone()]])
                .unwrap_or_default(),
        };

        Ok(values)
    }

    async fn write_cell(&self, row: usize, col: usize, value: u64) -> Result<(), SheetError> {
        self.writes.lock().unwrap().push((row, col, value));
        if self.fail_writes {
            return Err(SheetError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }

        let mut rows = self.rows.lock().unwrap();
        if let Some(cells) = rows.get_mut(row) {
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value.to_string();
        }
        Ok(())
    }
}
