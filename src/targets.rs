//! Synthetic training labels.
//!
//! Labels are computed once, in the dataset pipeline, from per-city
//! aggregates over the full cleaned dataset. Nothing here runs at serving
//! time.

use crate::error::{AdvisorError, Result};
use crate::features::EngineeredFeatures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum investment score for a listing to count as a good investment.
pub const GOOD_INVESTMENT_THRESHOLD: u8 = 3;

/// Median of finite values; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub median_price_in_lakhs: f64,
    pub median_price_per_sqft: f64,
}

/// Per-city medians of price and price per square foot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityAggregates {
    cities: BTreeMap<String, CityStats>,
}

impl CityAggregates {
    /// Group by city over the complete engineered dataset.
    pub fn compute(features: &[EngineeredFeatures]) -> Result<Self> {
        if features.is_empty() {
            return Err(AdvisorError::EmptyDataset(
                "cannot compute city aggregates without rows".to_string(),
            ));
        }

        let mut grouped: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for f in features {
            let (prices, pps) = grouped.entry(f.listing.city.as_str()).or_default();
            prices.push(f.listing.price_in_lakhs);
            pps.push(f.price_per_sqft);
        }

        let mut cities = BTreeMap::new();
        for (city, (prices, pps)) in grouped {
            let stats = match (median(&prices), median(&pps)) {
                (Some(median_price_in_lakhs), Some(median_price_per_sqft)) => CityStats {
                    median_price_in_lakhs,
                    median_price_per_sqft,
                },
                _ => continue,
            };
            cities.insert(city.to_string(), stats);
        }
        Ok(Self { cities })
    }

    pub fn insert(&mut self, city: impl Into<String>, stats: CityStats) {
        self.cities.insert(city.into(), stats);
    }

    pub fn get(&self, city: &str) -> Result<&CityStats> {
        self.cities
            .get(city)
            .ok_or_else(|| AdvisorError::MissingAggregate {
                city: city.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Annual appreciation rates keyed by transport accessibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthTable {
    pub rates: &'static [(&'static str, f64)],
    pub default_rate: f64,
    pub years: i32,
}

impl GrowthTable {
    pub const STANDARD: GrowthTable = GrowthTable {
        rates: &[("Low", 0.06), ("Medium", 0.08), ("High", 0.10)],
        default_rate: 0.08,
        years: 5,
    };

    /// Exact-match lookup falling back to [`GrowthTable::default_rate`].
    pub fn rate(&self, transport: &str) -> f64 {
        self.rates
            .iter()
            .find(|(level, _)| *level == transport)
            .map_or(self.default_rate, |&(_, r)| r)
    }

    pub fn future_price(&self, price_in_lakhs: f64, transport: &str) -> f64 {
        price_in_lakhs * (1.0 + self.rate(transport)).powi(self.years)
    }
}

impl Default for GrowthTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub investment_score: u8,
    pub good_investment: bool,
    pub future_price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetGenerator {
    growth: GrowthTable,
}

impl TargetGenerator {
    pub fn new(growth: GrowthTable) -> Self {
        Self { growth }
    }

    pub fn growth(&self) -> &GrowthTable {
        &self.growth
    }

    /// Sum of the six heuristic rules, 0 through 6.
    pub fn investment_score(&self, f: &EngineeredFeatures, stats: &CityStats) -> u8 {
        let rules = [
            f.listing.price_in_lakhs <= stats.median_price_in_lakhs,
            f.price_per_sqft <= stats.median_price_per_sqft,
            f.listing.bhk >= 3.0,
            f.is_ready_to_move,
            f.has_parking,
            matches!(
                f.listing.public_transport_accessibility.as_str(),
                "Medium" | "High"
            ),
        ];
        rules.iter().filter(|&&hit| hit).count() as u8
    }

    pub fn label(&self, f: &EngineeredFeatures, aggregates: &CityAggregates) -> Result<Labels> {
        let stats = aggregates.get(&f.listing.city)?;
        let investment_score = self.investment_score(f, stats);
        Ok(Labels {
            investment_score,
            good_investment: investment_score >= GOOD_INVESTMENT_THRESHOLD,
            future_price: self.growth.future_price(
                f.listing.price_in_lakhs,
                &f.listing.public_transport_accessibility,
            ),
        })
    }
}
