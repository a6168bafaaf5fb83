//! The persisted, labeled dataset.
//!
//! Layout: raw columns, engineered columns, then the three label columns.
//! Floats are written with their shortest round-trip representation so a
//! reload compares equal to what was written.

use crate::error::{AdvisorError, Result};
use crate::features::contract::{self, ENGINEERED_COLUMNS};
use crate::features::{EngineeredFeatures, FeatureEngineer};
use crate::schema::{parse_number, RawListing, RawRecord, RAW_COLUMNS};
use crate::targets::Labels;
use std::io::{Read, Write};
use std::path::Path;

pub const INVESTMENT_SCORE: &str = "Investment_Score";
pub const GOOD_INVESTMENT: &str = "Good_Investment";
pub const FUTURE_PRICE: &str = "Future_Price_5Y";

pub const LABEL_COLUMNS: [&str; 3] = [INVESTMENT_SCORE, GOOD_INVESTMENT, FUTURE_PRICE];

/// Full persisted header.
pub fn persisted_header() -> Vec<&'static str> {
    RAW_COLUMNS
        .iter()
        .chain(ENGINEERED_COLUMNS.iter())
        .chain(LABEL_COLUMNS.iter())
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub features: EngineeredFeatures,
    pub labels: Labels,
}

fn flag_cell(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl LabeledRow {
    fn to_cells(&self) -> Vec<String> {
        let f = &self.features;
        let mut cells = f.listing.to_cells();
        cells.extend([
            f.price_per_sqft.to_string(),
            f.amenity_count.to_string(),
            flag_cell(f.is_furnished),
            flag_cell(f.is_ready_to_move),
            flag_cell(f.has_parking),
            flag_cell(f.has_security),
            f.facing_code.map(|c| c.to_string()).unwrap_or_default(),
            f.age_of_property.to_string(),
            f.school_density_score.to_string(),
            f.hospital_density_score.to_string(),
            self.labels.investment_score.to_string(),
            flag_cell(self.labels.good_investment),
            self.labels.future_price.to_string(),
        ]);
        cells
    }
}

/// Column lookup for one persisted record.
struct Cells<'a> {
    header: &'a [String],
    record: &'a csv::StringRecord,
    row: usize,
}

impl Cells<'_> {
    fn get(&self, column: &str) -> Result<&str> {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.record.get(i))
            .ok_or_else(|| AdvisorError::invalid(Some(self.row), column, "is missing"))
    }

    fn number(&self, column: &str) -> Result<f64> {
        parse_number(self.get(column)?, Some(self.row), column)
    }

    fn flag(&self, column: &str) -> Result<bool> {
        match self.get(column)? {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(AdvisorError::invalid(
                Some(self.row),
                column,
                format!("must be 0 or 1, got {other:?}"),
            )),
        }
    }

    fn integer<T: std::str::FromStr>(&self, column: &str) -> Result<T> {
        let cell = self.get(column)?;
        cell.parse::<T>().map_err(|_| {
            AdvisorError::invalid(Some(self.row), column, format!("is not an integer: {cell:?}"))
        })
    }

    fn row(&self) -> Result<LabeledRow> {
        let mut record = RawRecord::new();
        for column in RAW_COLUMNS {
            if let Ok(cell) = self.get(column) {
                record.set(column, cell);
            }
        }
        let listing = RawListing::try_from_record(&record, Some(self.row))?;

        let facing = self.get(contract::FACING_CODE)?;
        let facing_code = if facing.is_empty() {
            None
        } else {
            Some(self.integer::<u8>(contract::FACING_CODE)?)
        };

        let features = EngineeredFeatures {
            listing,
            price_per_sqft: self.number(contract::PRICE_PER_SQFT)?,
            amenity_count: self.integer(contract::AMENITY_COUNT)?,
            is_furnished: self.flag(contract::IS_FURNISHED)?,
            is_ready_to_move: self.flag(contract::IS_READY_TO_MOVE)?,
            has_parking: self.flag(contract::HAS_PARKING)?,
            has_security: self.flag(contract::HAS_SECURITY)?,
            facing_code,
            age_of_property: self.number(contract::AGE_OF_PROPERTY)?,
            school_density_score: self.number(contract::SCHOOL_DENSITY_SCORE)?,
            hospital_density_score: self.number(contract::HOSPITAL_DENSITY_SCORE)?,
        };
        let labels = Labels {
            investment_score: self.integer(INVESTMENT_SCORE)?,
            good_investment: self.flag(GOOD_INVESTMENT)?,
            future_price: self.number(FUTURE_PRICE)?,
        };
        Ok(LabeledRow { features, labels })
    }
}

/// Engineered and labeled listings in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    rows: Vec<LabeledRow>,
}

impl LabeledDataset {
    pub fn new(rows: Vec<LabeledRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn good_count(&self) -> usize {
        self.rows.iter().filter(|r| r.labels.good_investment).count()
    }

    pub fn features(&self) -> Vec<EngineeredFeatures> {
        self.rows.iter().map(|r| r.features.clone()).collect()
    }

    /// Keep the rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(persisted_header())?;
        for row in &self.rows {
            wtr.write_record(row.to_cells())?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    /// Read a persisted dataset; any malformed row aborts the load.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let missing: Vec<String> = persisted_header()
            .into_iter()
            .filter(|c| !header.iter().any(|h| h == c))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AdvisorError::Schema { missing });
        }

        let mut rows = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let cells = Cells {
                header: &header,
                record: &record,
                row,
            };
            rows.push(cells.row()?);
        }
        Ok(Self { rows })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_csv(std::io::BufReader::new(file))
    }

    /// Re-derive every row's features from its raw columns and compare with
    /// the stored engineered columns.
    pub fn verify_parity(&self, engineer: &FeatureEngineer) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            let derived = engineer
                .engineer(&row.features.listing)
                .map_err(|e| e.at_row(i))?;
            if derived != row.features {
                return Err(AdvisorError::ContractViolation(format!(
                    "row {i}: stored features differ from features derived with reference year {}",
                    engineer.reference_year()
                )));
            }
        }
        Ok(())
    }
}
