//! The feature contract: ordered model inputs shared by training and serving.
//!
//! [`FeatureFrame::from_features`] is the only constructor of model input, so
//! both paths produce columns in exactly this order. A fingerprint of the
//! layout travels with every artifact and is checked at load time.

use super::EngineeredFeatures;
use crate::error::{AdvisorError, Result};
use crate::schema;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

pub const PRICE_PER_SQFT: &str = "Price_per_SqFt";
pub const AGE_OF_PROPERTY: &str = "Age_of_Property";
pub const AMENITY_COUNT: &str = "Amenity_Count";
pub const IS_FURNISHED: &str = "Is_Furnished";
pub const IS_READY_TO_MOVE: &str = "Is_Ready_To_Move";
pub const HAS_PARKING: &str = "Has_Parking";
pub const HAS_SECURITY: &str = "Has_Security";
pub const SCHOOL_DENSITY_SCORE: &str = "School_Density_Score";
pub const HOSPITAL_DENSITY_SCORE: &str = "Hospital_Density_Score";
pub const FACING_CODE: &str = "Facing_Code";

/// Engineered columns in persisted order.
pub const ENGINEERED_COLUMNS: [&str; 10] = [
    PRICE_PER_SQFT,
    AMENITY_COUNT,
    IS_FURNISHED,
    IS_READY_TO_MOVE,
    HAS_PARKING,
    HAS_SECURITY,
    FACING_CODE,
    AGE_OF_PROPERTY,
    SCHOOL_DENSITY_SCORE,
    HOSPITAL_DENSITY_SCORE,
];

/// Numeric model inputs, in column order.
pub const NUMERIC_FEATURES: [&str; 18] = [
    schema::BHK,
    schema::SIZE_IN_SQFT,
    schema::PRICE_IN_LAKHS,
    PRICE_PER_SQFT,
    schema::YEAR_BUILT,
    schema::FLOOR_NO,
    schema::TOTAL_FLOORS,
    AGE_OF_PROPERTY,
    schema::NEARBY_SCHOOLS,
    schema::NEARBY_HOSPITALS,
    AMENITY_COUNT,
    IS_FURNISHED,
    IS_READY_TO_MOVE,
    HAS_PARKING,
    HAS_SECURITY,
    SCHOOL_DENSITY_SCORE,
    HOSPITAL_DENSITY_SCORE,
    FACING_CODE,
];

/// Categorical model inputs, in column order.
pub const CATEGORICAL_FEATURES: [&str; 11] = [
    schema::STATE,
    schema::CITY,
    schema::LOCALITY,
    schema::PROPERTY_TYPE,
    schema::FURNISHED_STATUS,
    schema::PUBLIC_TRANSPORT_ACCESSIBILITY,
    schema::PARKING_SPACE,
    schema::SECURITY,
    schema::FACING,
    schema::OWNER_TYPE,
    schema::AVAILABILITY_STATUS,
];

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// Stable hash over the ordered feature names and their kinds.
pub fn contract_fingerprint() -> u64 {
    let numeric = NUMERIC_FEATURES
        .iter()
        .fold(FNV_OFFSET, |h, name| fnv1a(fnv1a(h, b"num:"), name.as_bytes()));
    CATEGORICAL_FEATURES
        .iter()
        .fold(numeric, |h, name| fnv1a(fnv1a(h, b"cat:"), name.as_bytes()))
}

/// Snapshot of the contract stored alongside fitted artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureContract {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub fingerprint: u64,
}

impl FeatureContract {
    /// The contract compiled into this build.
    pub fn current() -> Self {
        Self {
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
            fingerprint: contract_fingerprint(),
        }
    }

    /// Fail with [`AdvisorError::ContractViolation`] unless `self` matches this build.
    pub fn verify(&self) -> Result<()> {
        let current = Self::current();
        if self.fingerprint != current.fingerprint {
            return Err(AdvisorError::ContractViolation(format!(
                "artifact fingerprint {:016x} does not match {:016x}",
                self.fingerprint, current.fingerprint
            )));
        }
        if self != &current {
            return Err(AdvisorError::ContractViolation(
                "artifact feature names differ from the compiled contract".to_string(),
            ));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl EngineeredFeatures {
    /// Numeric inputs in [`NUMERIC_FEATURES`] order; a null facing code is NaN.
    pub fn numeric_row(&self) -> [f64; 18] {
        let l = &self.listing;
        [
            l.bhk,
            l.size_in_sqft,
            l.price_in_lakhs,
            self.price_per_sqft,
            l.year_built,
            l.floor_no,
            l.total_floors,
            self.age_of_property,
            l.nearby_schools,
            l.nearby_hospitals,
            f64::from(self.amenity_count),
            flag(self.is_furnished),
            flag(self.is_ready_to_move),
            flag(self.has_parking),
            flag(self.has_security),
            self.school_density_score,
            self.hospital_density_score,
            self.facing_code.map_or(f64::NAN, f64::from),
        ]
    }

    /// Categorical inputs in [`CATEGORICAL_FEATURES`] order; absent security is empty.
    pub fn categorical_row(&self) -> [String; 11] {
        let l = &self.listing;
        [
            l.state.clone(),
            l.city.clone(),
            l.locality.clone(),
            l.property_type.clone(),
            l.furnished_status.clone(),
            l.public_transport_accessibility.clone(),
            l.parking_space.clone(),
            l.security.clone().unwrap_or_default(),
            l.facing.clone(),
            l.owner_type.clone(),
            l.availability_status.clone(),
        ]
    }

    /// Named feature vector for audit output.
    pub fn named_values(&self) -> Vec<(&'static str, String)> {
        let numeric = NUMERIC_FEATURES
            .iter()
            .zip(self.numeric_row())
            .map(|(name, v)| (*name, if v.is_nan() { String::new() } else { v.to_string() }));
        let categorical = CATEGORICAL_FEATURES
            .iter()
            .zip(self.categorical_row())
            .map(|(name, v)| (*name, v));
        numeric.chain(categorical).collect()
    }
}

/// Model input: a numeric block and a categorical block with equal row counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    numeric: Array2<f64>,
    categorical: Vec<Vec<String>>,
}

impl FeatureFrame {
    pub fn from_features(features: &[EngineeredFeatures]) -> Self {
        let mut numeric = Array2::<f64>::zeros((features.len(), NUMERIC_FEATURES.len()));
        let mut categorical = Vec::with_capacity(features.len());
        for (mut row, f) in numeric.rows_mut().into_iter().zip(features) {
            row.assign(&ArrayView1::from(&f.numeric_row()));
            categorical.push(f.categorical_row().to_vec());
        }
        Self {
            numeric,
            categorical,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.numeric.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn numeric(&self) -> &Array2<f64> {
        &self.numeric
    }

    pub fn categorical(&self) -> &[Vec<String>] {
        &self.categorical
    }

    /// Rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            numeric: self.numeric.select(ndarray::Axis(0), indices),
            categorical: indices.iter().map(|&i| self.categorical[i].clone()).collect(),
        }
    }
}
