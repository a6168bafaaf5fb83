//! Untyped CSV table used by the load, deduplicate and clean stages.

use crate::error::{AdvisorError, Result};
use crate::schema::{self, RawRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// One input row; `index` is its 0-based position in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub index: usize,
    pub cells: Vec<String>,
}

/// A line whose cell count differs from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub index: usize,
    pub cells: usize,
    pub expected: usize,
}

impl MalformedRow {
    pub fn to_error(&self) -> AdvisorError {
        AdvisorError::invalid(
            Some(self.index),
            "<row>",
            format!("has {} cells, expected {}", self.cells, self.expected),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
    malformed: Vec<MalformedRow>,
}

impl RawTable {
    /// Build a table from in-memory rows; missing-value tokens are normalized to empty.
    ///
    /// Rows whose width differs from the header are set aside in [`RawTable::malformed`].
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self {
            headers,
            rows: Vec::with_capacity(rows.len()),
            malformed: Vec::new(),
        };
        for (index, cells) in rows.into_iter().enumerate() {
            table.push_row(index, cells);
        }
        table
    }

    fn push_row(&mut self, index: usize, cells: Vec<String>) {
        if cells.len() != self.headers.len() {
            self.malformed.push(MalformedRow {
                index,
                cells: cells.len(),
                expected: self.headers.len(),
            });
            return;
        }
        self.rows.push(RawRow {
            index,
            cells: cells.into_iter().map(normalize_cell).collect(),
        });
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(headers, rows))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Well-formed rows only.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn malformed(&self) -> &[MalformedRow] {
        &self.malformed
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail with every required column absent from the header.
    pub fn validate_schema(&self) -> Result<()> {
        let missing: Vec<String> = schema::required_columns()
            .filter(|c| self.column(c).is_none())
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::Schema { missing })
        }
    }

    /// Drop exact duplicate rows, keeping first occurrences. Returns the number dropped.
    pub fn deduplicate(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.cells.clone()));
        before - self.rows.len()
    }

    /// Remove a column if present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column(name) else {
            return false;
        };
        self.headers.remove(idx);
        for row in &mut self.rows {
            if idx < row.cells.len() {
                row.cells.remove(idx);
            }
        }
        true
    }

    pub fn record(&self, row: &RawRow) -> RawRecord {
        let mut record = RawRecord::new();
        for (header, cell) in self.headers.iter().zip(&row.cells) {
            record.set(header, cell.as_str());
        }
        record
    }

    /// Write `value` into every empty cell of column `idx`. Returns the number filled.
    pub fn fill_missing(&mut self, idx: usize, value: &str) -> usize {
        let mut filled = 0;
        for cell in self.rows.iter_mut().filter_map(|r| r.cells.get_mut(idx)) {
            if cell.is_empty() {
                *cell = value.to_string();
                filled += 1;
            }
        }
        filled
    }

    /// Keep only rows at the given positions.
    pub fn retain_positions(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.rows.retain(|_| flags.next().copied().unwrap_or(false));
    }
}

fn normalize_cell(cell: String) -> String {
    if schema::is_missing(&cell) {
        String::new()
    } else {
        cell
    }
}
