//! The fixed-schema feature vector consumed by the preprocessor.

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};

/// Recognized feature names, in the column order the preprocessor was
/// trained with: 14 numeric, then 3 low-cardinality categoricals, then
/// 2 high-cardinality categoricals.
pub const FEATURE_NAMES: [&str; 19] = [
    "amt",
    "city_pop",
    "lat",
    "long",
    "merch_lat",
    "merch_long",
    "distance_km",
    "txn_time_gap",
    "txn_count_1h",
    "avg_amt_per_card",
    "amt_deviation",
    "customer_age",
    "txn_hour",
    "is_weekend",
    "gender",
    "state",
    "category",
    "merchant",
    "cc_num",
];

/// Number of numeric features at the front of [`FEATURE_NAMES`].
pub const NUMERIC_DIMENSION: usize = 14;

/// One transaction's features, strongly typed against the recognized
/// schema. Every field is required; a vector that fails [`validate`]
/// never leaves the assembler.
///
/// [`validate`]: FeatureVector::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amt: f64,
    pub city_pop: f64,
    pub lat: f64,
    pub long: f64,
    pub merch_lat: f64,
    pub merch_long: f64,
    pub distance_km: f64,
    pub txn_time_gap: f64,
    pub txn_count_1h: u32,
    pub avg_amt_per_card: f64,
    pub amt_deviation: f64,
    pub customer_age: i64,
    pub txn_hour: u32,
    pub is_weekend: u8,
    pub gender: String,
    pub state: String,
    pub category: String,
    pub merchant: String,
    pub cc_num: String,
}

impl FeatureVector {
    /// The numeric features as one row, in [`FEATURE_NAMES`] order.
    pub fn numeric_row(&self) -> [f64; NUMERIC_DIMENSION] {
        [
            self.amt,
            self.city_pop,
            self.lat,
            self.long,
            self.merch_lat,
            self.merch_long,
            self.distance_km,
            self.txn_time_gap,
            f64::from(self.txn_count_1h),
            self.avg_amt_per_card,
            self.amt_deviation,
            self.customer_age as f64,
            f64::from(self.txn_hour),
            f64::from(self.is_weekend),
        ]
    }

    /// Check every recognized feature is present and well-formed.
    pub fn validate(&self) -> Result<()> {
        let row = self.numeric_row();
        for (value, name) in row.iter().zip(FEATURE_NAMES.iter()) {
            if !value.is_finite() {
                return Err(ScoringError::SchemaViolation(format!(
                    "{name} is not finite: {value}"
                )));
            }
        }
        if self.amt <= 0.0 {
            return Err(ScoringError::SchemaViolation(format!(
                "amt must be positive, got {}",
                self.amt
            )));
        }
        if self.txn_count_1h == 0 {
            return Err(ScoringError::SchemaViolation(
                "txn_count_1h includes the transaction itself and is never 0".to_string(),
            ));
        }
        if self.txn_hour > 23 {
            return Err(ScoringError::SchemaViolation(format!(
                "txn_hour out of range: {}",
                self.txn_hour
            )));
        }
        if self.is_weekend > 1 {
            return Err(ScoringError::SchemaViolation(format!(
                "is_weekend must be 0 or 1, got {}",
                self.is_weekend
            )));
        }
        if self.gender != "M" && self.gender != "F" {
            return Err(ScoringError::SchemaViolation(format!(
                "gender must be M or F, got {:?}",
                self.gender
            )));
        }
        if self.state.len() != 2 {
            return Err(ScoringError::SchemaViolation(format!(
                "state must be a 2-letter code, got {:?}",
                self.state
            )));
        }
        for (value, name) in [
            (&self.category, "category"),
            (&self.merchant, "merchant"),
            (&self.cc_num, "cc_num"),
        ] {
            if value.is_empty() {
                return Err(ScoringError::SchemaViolation(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}
