//! Raw listing schema.
//!
//! Column names are the wire format for both the input CSV and serving
//! requests. [`RawRecord`] is the untyped row (cell text per column) and
//! [`RawListing`] the typed view every downstream stage works with.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ID: &str = "ID";
pub const STATE: &str = "State";
pub const CITY: &str = "City";
pub const LOCALITY: &str = "Locality";
pub const PROPERTY_TYPE: &str = "Property_Type";
pub const BHK: &str = "BHK";
pub const SIZE_IN_SQFT: &str = "Size_in_SqFt";
pub const PRICE_IN_LAKHS: &str = "Price_in_Lakhs";
pub const YEAR_BUILT: &str = "Year_Built";
pub const FURNISHED_STATUS: &str = "Furnished_Status";
pub const FLOOR_NO: &str = "Floor_No";
pub const TOTAL_FLOORS: &str = "Total_Floors";
pub const NEARBY_SCHOOLS: &str = "Nearby_Schools";
pub const NEARBY_HOSPITALS: &str = "Nearby_Hospitals";
pub const PUBLIC_TRANSPORT_ACCESSIBILITY: &str = "Public_Transport_Accessibility";
pub const PARKING_SPACE: &str = "Parking_Space";
pub const SECURITY: &str = "Security";
pub const FACING: &str = "Facing";
pub const OWNER_TYPE: &str = "Owner_Type";
pub const AVAILABILITY_STATUS: &str = "Availability_Status";
pub const AMENITIES: &str = "Amenities";

/// Raw columns in persisted order.
pub const RAW_COLUMNS: [&str; 20] = [
    STATE,
    CITY,
    LOCALITY,
    PROPERTY_TYPE,
    BHK,
    SIZE_IN_SQFT,
    PRICE_IN_LAKHS,
    YEAR_BUILT,
    FURNISHED_STATUS,
    FLOOR_NO,
    TOTAL_FLOORS,
    NEARBY_SCHOOLS,
    NEARBY_HOSPITALS,
    PUBLIC_TRANSPORT_ACCESSIBILITY,
    PARKING_SPACE,
    SECURITY,
    FACING,
    OWNER_TYPE,
    AVAILABILITY_STATUS,
    AMENITIES,
];

/// Numeric raw columns; cleaned with the column median.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    BHK,
    SIZE_IN_SQFT,
    PRICE_IN_LAKHS,
    YEAR_BUILT,
    FLOOR_NO,
    TOTAL_FLOORS,
    NEARBY_SCHOOLS,
    NEARBY_HOSPITALS,
];

/// Categorical raw columns; cleaned with the column mode.
pub const CATEGORICAL_COLUMNS: [&str; 11] = [
    STATE,
    CITY,
    LOCALITY,
    PROPERTY_TYPE,
    FURNISHED_STATUS,
    PUBLIC_TRANSPORT_ACCESSIBILITY,
    PARKING_SPACE,
    SECURITY,
    FACING,
    OWNER_TYPE,
    AVAILABILITY_STATUS,
];

/// Columns whose absence from the input header is a schema error.
pub const OPTIONAL_COLUMNS: [&str; 2] = [SECURITY, AMENITIES];

/// Required input columns, in persisted order.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    RAW_COLUMNS
        .into_iter()
        .filter(|c| !OPTIONAL_COLUMNS.contains(c))
}

/// Cell spellings read as missing values, in batch input and serving requests alike.
pub const NA_TOKENS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

pub fn is_missing(value: &str) -> bool {
    NA_TOKENS.contains(&value)
}

/// One untyped row keyed by column name. Missing cells are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    cells: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell; an empty value or any of [`NA_TOKENS`] marks it missing.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        if is_missing(&value) {
            self.cells.remove(column);
        } else {
            self.cells.insert(column.to_string(), value);
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Present cells in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a record from a JSON object keyed by raw column names.
    ///
    /// Numbers and strings are accepted for every column; `null` means missing.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AdvisorError::invalid(None, "<request>", "must be a JSON object")
        })?;

        let mut record = RawRecord::new();
        for (key, v) in object {
            match v {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => record.set(key, s.clone()),
                serde_json::Value::Number(n) => record.set(key, n.to_string()),
                serde_json::Value::Bool(b) => record.set(key, b.to_string()),
                _ => {
                    return Err(AdvisorError::invalid(
                        None,
                        key,
                        "must be a string, number or null",
                    ))
                }
            }
        }
        Ok(record)
    }
}

/// A typed real-estate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub state: String,
    pub city: String,
    pub locality: String,
    pub property_type: String,
    pub bhk: f64,
    pub size_in_sqft: f64,
    pub price_in_lakhs: f64,
    pub year_built: f64,
    pub furnished_status: String,
    pub floor_no: f64,
    pub total_floors: f64,
    pub nearby_schools: f64,
    pub nearby_hospitals: f64,
    pub public_transport_accessibility: String,
    pub parking_space: String,
    pub security: Option<String>,
    pub facing: String,
    pub owner_type: String,
    pub availability_status: String,
    pub amenities: Option<String>,
}

fn text(record: &RawRecord, row: Option<usize>, column: &str) -> Result<String> {
    record
        .get(column)
        .map(str::to_string)
        .ok_or_else(|| AdvisorError::invalid(row, column, "is missing"))
}

/// Parse a numeric cell. Surrounding whitespace is tolerated.
pub fn parse_number(value: &str, row: Option<usize>, column: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| AdvisorError::invalid(row, column, format!("is not a number: {value:?}")))
}

fn number(record: &RawRecord, row: Option<usize>, column: &str) -> Result<f64> {
    let value = record
        .get(column)
        .ok_or_else(|| AdvisorError::invalid(row, column, "is missing"))?;
    parse_number(value, row, column)
}

impl RawListing {
    /// Type a raw record, naming the first offending field on failure.
    pub fn try_from_record(record: &RawRecord, row: Option<usize>) -> Result<Self> {
        Ok(Self {
            state: text(record, row, STATE)?,
            city: text(record, row, CITY)?,
            locality: text(record, row, LOCALITY)?,
            property_type: text(record, row, PROPERTY_TYPE)?,
            bhk: number(record, row, BHK)?,
            size_in_sqft: number(record, row, SIZE_IN_SQFT)?,
            price_in_lakhs: number(record, row, PRICE_IN_LAKHS)?,
            year_built: number(record, row, YEAR_BUILT)?,
            furnished_status: text(record, row, FURNISHED_STATUS)?,
            floor_no: number(record, row, FLOOR_NO)?,
            total_floors: number(record, row, TOTAL_FLOORS)?,
            nearby_schools: number(record, row, NEARBY_SCHOOLS)?,
            nearby_hospitals: number(record, row, NEARBY_HOSPITALS)?,
            public_transport_accessibility: text(record, row, PUBLIC_TRANSPORT_ACCESSIBILITY)?,
            parking_space: text(record, row, PARKING_SPACE)?,
            security: record.get(SECURITY).map(str::to_string),
            facing: text(record, row, FACING)?,
            owner_type: text(record, row, OWNER_TYPE)?,
            availability_status: text(record, row, AVAILABILITY_STATUS)?,
            amenities: record.get(AMENITIES).map(str::to_string),
        })
    }

    /// Raw cell values in [`RAW_COLUMNS`] order; absent optionals are empty.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.state.clone(),
            self.city.clone(),
            self.locality.clone(),
            self.property_type.clone(),
            self.bhk.to_string(),
            self.size_in_sqft.to_string(),
            self.price_in_lakhs.to_string(),
            self.year_built.to_string(),
            self.furnished_status.clone(),
            self.floor_no.to_string(),
            self.total_floors.to_string(),
            self.nearby_schools.to_string(),
            self.nearby_hospitals.to_string(),
            self.public_transport_accessibility.clone(),
            self.parking_space.clone(),
            self.security.clone().unwrap_or_default(),
            self.facing.clone(),
            self.owner_type.clone(),
            self.availability_status.clone(),
            self.amenities.clone().unwrap_or_default(),
        ]
    }

    /// Rebuild the untyped record; inverse of [`RawListing::try_from_record`].
    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        for (column, cell) in RAW_COLUMNS.iter().zip(self.to_cells()) {
            record.set(column, cell);
        }
        record
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_required_columns_exclude_optionals() {
        let required: Vec<_> = required_columns().collect();
        assert_eq!(required.len(), 18);
        assert!(!required.contains(&SECURITY));
        assert!(!required.contains(&AMENITIES));
        assert!(required.contains(&CITY));
    }

    #[test]
    fn test_record_treats_empty_as_missing() {
        let record = RawRecord::new().with(CITY, "");
        assert_eq!(record.get(CITY), None);
    }

    #[test]
    fn test_na_tokens_are_missing_everywhere() {
        for token in NA_TOKENS {
            assert_eq!(RawRecord::new().with(AMENITIES, token).get(AMENITIES), None);
        }
        assert_eq!(RawRecord::new().with(AMENITIES, "Gym").get(AMENITIES), Some("Gym"));
    }

    #[test]
    fn test_csv_and_json_records_engineer_identically() {
        let record = pune_record().with(AMENITIES, "Gym").with(SECURITY, "Yes");
        let cells: Vec<(&str, &str)> = record
            .iter()
            .map(|(k, v)| match k {
                AMENITIES => (k, "NA"),
                SECURITY => (k, "null"),
                _ => (k, v),
            })
            .collect();

        let mut csv = cells.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(",");
        csv.push('\n');
        csv.push_str(&cells.iter().map(|(_, v)| *v).collect::<Vec<_>>().join(","));
        csv.push('\n');
        let table = crate::dataset::RawTable::from_reader(csv.as_bytes()).unwrap();
        let batch = table.record(&table.rows()[0]);

        let request: serde_json::Map<String, serde_json::Value> = cells
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let served = RawRecord::from_json(&serde_json::Value::Object(request)).unwrap();
        assert_eq!(served, batch);
        assert_eq!(served.get(AMENITIES), None);
        assert_eq!(served.get(SECURITY), None);

        let engineer = crate::features::FeatureEngineer::default();
        let from_batch = engineer
            .engineer(&RawListing::try_from_record(&batch, Some(0)).unwrap())
            .unwrap();
        let from_request = engineer
            .engineer(&RawListing::try_from_record(&served, None).unwrap())
            .unwrap();
        assert_eq!(from_batch, from_request);
        assert_eq!(from_request.amenity_count, 0);
        assert!(!from_request.has_security);
    }

    #[test]
    fn test_try_from_record_parses_fields() {
        let listing = pune_listing();
        assert_eq!(listing.city, "Pune");
        assert_eq!(listing.bhk, 3.0);
        assert_eq!(listing.price_in_lakhs, 80.0);
        assert_eq!(listing.security.as_deref(), Some("Yes"));
        assert_eq!(listing.amenities.as_deref(), Some("Gym, Pool, Clubhouse"));
    }

    #[test]
    fn test_try_from_record_names_bad_numeric_field() {
        let record = pune_record().with(SIZE_IN_SQFT, "large");
        let err = RawListing::try_from_record(&record, Some(4)).unwrap_err();
        match err {
            AdvisorError::InvalidRecord { row, field, .. } => {
                assert_eq!(row, Some(4));
                assert_eq!(field, SIZE_IN_SQFT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_try_from_record_missing_required_text() {
        let mut record = pune_record();
        record.set(FACING, "");
        let err = RawListing::try_from_record(&record, None).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidRecord { ref field, .. } if field == FACING));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let mut record = pune_record();
        record.set(SECURITY, "");
        record.set(AMENITIES, "");
        let listing = RawListing::try_from_record(&record, None).unwrap();
        assert_eq!(listing.security, None);
        assert_eq!(listing.amenities, None);
    }

    #[test]
    fn test_record_round_trip() {
        let listing = pune_listing();
        let again = RawListing::try_from_record(&listing.to_record(), None).unwrap();
        assert_eq!(listing, again);
    }

    #[test]
    fn test_from_json_accepts_numbers_and_strings() {
        let value = serde_json::json!({
            "City": "Pune",
            "BHK": 3,
            "Size_in_SqFt": "1000",
            "Security": null,
            "Price_in_Lakhs": 80.5
        });
        let record = RawRecord::from_json(&value).unwrap();
        assert_eq!(record.get(CITY), Some("Pune"));
        assert_eq!(record.get(BHK), Some("3"));
        assert_eq!(record.get(SIZE_IN_SQFT), Some("1000"));
        assert_eq!(record.get(PRICE_IN_LAKHS), Some("80.5"));
        assert_eq!(record.get(SECURITY), None);
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let value = serde_json::json!({ "City": ["Pune"] });
        assert!(RawRecord::from_json(&value).is_err());
        assert!(RawRecord::from_json(&serde_json::json!([1, 2])).is_err());
    }
}
