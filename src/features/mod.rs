//! Deterministic feature derivation shared by the dataset and serving paths.
//!
//! [`FeatureEngineer`] is a pure function of a [`RawListing`] plus its
//! injected tables and reference year. It holds no dataset-wide state, so the
//! vector derived for a listing at training time is bit-identical to the one
//! derived for the same listing at serving time.

pub mod contract;
pub mod tables;

pub use contract::{
    contract_fingerprint, FeatureContract, FeatureFrame, CATEGORICAL_FEATURES, NUMERIC_FEATURES,
};
pub use tables::FeatureTables;

use crate::error::{AdvisorError, Result};
use crate::schema::{self, RawListing};
use serde::{Deserialize, Serialize};

/// Year subtracted from `Year_Built` when none is configured.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// A listing together with every derived feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    pub listing: RawListing,
    pub price_per_sqft: f64,
    pub amenity_count: u32,
    pub is_furnished: bool,
    pub is_ready_to_move: bool,
    pub has_parking: bool,
    pub has_security: bool,
    /// `None` when the facing direction is not in the table.
    pub facing_code: Option<u8>,
    pub age_of_property: f64,
    pub school_density_score: f64,
    pub hospital_density_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEngineer {
    reference_year: i32,
    tables: FeatureTables,
}

impl FeatureEngineer {
    pub fn new(reference_year: i32) -> Self {
        Self::with_tables(reference_year, FeatureTables::STANDARD)
    }

    pub fn with_tables(reference_year: i32, tables: FeatureTables) -> Self {
        Self {
            reference_year,
            tables,
        }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn tables(&self) -> &FeatureTables {
        &self.tables
    }

    /// Derive all features for one listing.
    ///
    /// # Errors
    /// [`AdvisorError::InvalidRecord`] naming the first numeric field that is
    /// NaN or infinite.
    pub fn engineer(&self, listing: &RawListing) -> Result<EngineeredFeatures> {
        let numerics = [
            (schema::BHK, listing.bhk),
            (schema::SIZE_IN_SQFT, listing.size_in_sqft),
            (schema::PRICE_IN_LAKHS, listing.price_in_lakhs),
            (schema::YEAR_BUILT, listing.year_built),
            (schema::FLOOR_NO, listing.floor_no),
            (schema::TOTAL_FLOORS, listing.total_floors),
            (schema::NEARBY_SCHOOLS, listing.nearby_schools),
            (schema::NEARBY_HOSPITALS, listing.nearby_hospitals),
        ];
        if let Some((field, value)) = numerics.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AdvisorError::invalid(
                None,
                field,
                format!("must be finite, got {value}"),
            ));
        }

        let t = &self.tables;
        Ok(EngineeredFeatures {
            price_per_sqft: listing.price_in_lakhs * 100_000.0 / listing.size_in_sqft.max(1.0),
            amenity_count: amenity_count(listing.amenities.as_deref()),
            is_furnished: t.is_furnished(&listing.furnished_status),
            is_ready_to_move: t.is_ready_to_move(&listing.availability_status),
            has_parking: t.has_parking(&listing.parking_space),
            has_security: t.has_security(listing.security.as_deref()),
            facing_code: t.facing_code(&listing.facing),
            age_of_property: f64::from(self.reference_year) - listing.year_built,
            school_density_score: listing.nearby_schools / 10.0,
            hospital_density_score: listing.nearby_hospitals / 10.0,
            listing: listing.clone(),
        })
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_YEAR)
    }
}

/// Count of non-blank comma-separated amenity tokens.
pub fn amenity_count(amenities: Option<&str>) -> u32 {
    amenities.map_or(0, |text| {
        text.split(',').filter(|token| !token.trim().is_empty()).count() as u32
    })
}
