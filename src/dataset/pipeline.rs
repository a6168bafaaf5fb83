//! Raw CSV to labeled dataset.
//!
//! Stages run strictly in [`Stage`] order. Row-local failures are logged and
//! the row is skipped; schema and aggregate failures abort the run.

use super::clean::clean;
use super::labeled::{LabeledDataset, LabeledRow};
use super::raw::RawTable;
use crate::error::{AdvisorError, Result};
use crate::features::FeatureEngineer;
use crate::schema::{self, RawListing};
use crate::targets::{CityAggregates, TargetGenerator};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Load,
    Deduplicate,
    Clean,
    Engineer,
    ComputeAggregates,
    Label,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Deduplicate => "deduplicate",
            Stage::Clean => "clean",
            Stage::Engineer => "engineer",
            Stage::ComputeAggregates => "compute-aggregates",
            Stage::Label => "label",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Row counts reported by a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub rows_skipped: usize,
    pub rows_written: usize,
    pub good_investments: usize,
    pub cities: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetPipeline {
    engineer: FeatureEngineer,
    targets: TargetGenerator,
}

impl DatasetPipeline {
    pub fn new(engineer: FeatureEngineer, targets: TargetGenerator) -> Self {
        Self { engineer, targets }
    }

    pub fn engineer(&self) -> &FeatureEngineer {
        &self.engineer
    }

    /// Load `input`, build the labeled dataset and write it to `output`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<(LabeledDataset, DatasetSummary)> {
        info!(stage = %Stage::Load, path = %input.as_ref().display(), "reading raw listings");
        let table = RawTable::from_path(input)?;
        let (dataset, mut summary) = self.build(table)?;

        info!(stage = %Stage::Persist, path = %output.as_ref().display(), "writing labeled dataset");
        dataset.save(output)?;
        summary.rows_written = dataset.len();
        Ok((dataset, summary))
    }

    /// Every stage except persistence, on an already loaded table.
    pub fn build(&self, mut table: RawTable) -> Result<(LabeledDataset, DatasetSummary)> {
        table.validate_schema()?;
        let mut summary = DatasetSummary {
            rows_read: table.len() + table.malformed().len(),
            ..DatasetSummary::default()
        };
        for row in table.malformed() {
            warn!(row = row.index, error = %row.to_error(), "skipping malformed line");
            summary.rows_skipped += 1;
        }

        summary.duplicates_dropped = table.deduplicate();
        table.drop_column(schema::ID);
        info!(
            stage = %Stage::Deduplicate,
            dropped = summary.duplicates_dropped,
            remaining = table.len(),
            "removed duplicate rows"
        );

        let report = clean(&mut table);
        summary.rows_skipped += report.rejected.len();
        info!(
            stage = %Stage::Clean,
            rejected = report.rejected.len(),
            numeric_filled = report.numeric_filled,
            categorical_filled = report.categorical_filled,
            "filled missing values"
        );

        let mut features = Vec::with_capacity(table.len());
        for row in table.rows() {
            let engineered = RawListing::try_from_record(&table.record(row), Some(row.index))
                .and_then(|listing| self.engineer.engineer(&listing))
                .map_err(|e| e.at_row(row.index));
            match engineered {
                Ok(f) => features.push(f),
                Err(err) if err.is_row_local() => {
                    warn!(row = row.index, error = %err, "skipping invalid record");
                    summary.rows_skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        info!(stage = %Stage::Engineer, rows = features.len(), "derived features");

        if features.is_empty() {
            return Err(AdvisorError::EmptyDataset(
                "no valid rows left after cleaning".to_string(),
            ));
        }

        let aggregates = CityAggregates::compute(&features)?;
        summary.cities = aggregates.len();
        info!(stage = %Stage::ComputeAggregates, cities = aggregates.len(), "computed city medians");

        let rows = features
            .into_iter()
            .map(|f| {
                let labels = self.targets.label(&f, &aggregates)?;
                Ok(LabeledRow {
                    features: f,
                    labels,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let dataset = LabeledDataset::new(rows);
        summary.good_investments = dataset.good_count();
        summary.rows_written = dataset.len();
        info!(
            stage = %Stage::Label,
            rows = dataset.len(),
            good = summary.good_investments,
            "labeled listings"
        );

        Ok((dataset, summary))
    }
}
