//! Clean stage: in-batch median and mode fills.

use super::raw::RawTable;
use crate::error::AdvisorError;
use crate::schema::{self, parse_number};
use crate::targets::median;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct CleanReport {
    /// Rows dropped because a numeric cell did not parse.
    pub rejected: Vec<AdvisorError>,
    pub numeric_filled: usize,
    pub categorical_filled: usize,
}

/// Most frequent non-empty value; ties go to the value seen first.
pub fn first_mode<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, v) in values.into_iter().filter(|v| !v.is_empty()).enumerate() {
        counts.entry(v).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(v, _)| v)
}

/// Reject unparseable numeric rows, then fill missing numerics with the
/// column median and missing categoricals with the column mode.
///
/// Statistics are computed over the rows that survive rejection. Amenities
/// is free text and stays empty when missing.
pub fn clean(table: &mut RawTable) -> CleanReport {
    let mut report = CleanReport::default();

    let numeric: Vec<(usize, &str)> = schema::NUMERIC_COLUMNS
        .iter()
        .filter_map(|c| table.column(c).map(|i| (i, *c)))
        .collect();

    let keep: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| {
            let bad = numeric.iter().find_map(|&(i, name)| {
                let cell = row.cells.get(i).map(String::as_str).unwrap_or("");
                if cell.is_empty() {
                    return None;
                }
                parse_number(cell, Some(row.index), name).err()
            });
            match bad {
                Some(err) => {
                    warn!(row = row.index, error = %err, "skipping row with unparseable numeric cell");
                    report.rejected.push(err);
                    false
                }
                None => true,
            }
        })
        .collect();
    table.retain_positions(&keep);

    let mut fills: Vec<(usize, String, bool)> = Vec::new();
    for &(i, name) in &numeric {
        let values: Vec<f64> = table
            .rows()
            .iter()
            .filter_map(|r| r.cells.get(i))
            .filter(|c| !c.is_empty())
            .filter_map(|c| c.trim().parse::<f64>().ok())
            .collect();
        match median(&values) {
            Some(m) => {
                debug!(column = name, median = m, "numeric fill value");
                fills.push((i, m.to_string(), true));
            }
            None => warn!(column = name, "no values to compute a median from"),
        }
    }

    let categorical: Vec<(usize, &str)> = schema::CATEGORICAL_COLUMNS
        .iter()
        .filter_map(|c| table.column(c).map(|i| (i, *c)))
        .collect();
    for &(i, name) in &categorical {
        let mode = first_mode(
            table
                .rows()
                .iter()
                .map(|r| r.cells.get(i).map(String::as_str).unwrap_or("")),
        )
        .map(str::to_string);
        match mode {
            Some(m) => {
                debug!(column = name, mode = %m, "categorical fill value");
                fills.push((i, m, false));
            }
            None => warn!(column = name, "no values to compute a mode from"),
        }
    }

    for (i, value, is_numeric) in &fills {
        let filled = table.fill_missing(*i, value);
        if *is_numeric {
            report.numeric_filled += filled;
        } else {
            report.categorical_filled += filled;
        }
    }

    report
}
