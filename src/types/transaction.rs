//! Transaction data structures for payment-card fraud scoring

use crate::error::{Result, ScoringError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single payment-card transaction to be scored for fraud risk.
///
/// Field aliases map the raw transaction log's column names onto the
/// struct, so the same record deserializes from both the bulk CSV log and
/// real-time JSON payloads. Transactions are ingested once and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Card identifier (hashed/tokenized card number)
    pub cc_num: String,

    /// Transaction timestamp (UTC)
    #[serde(alias = "trans_date_trans_time", with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,

    /// Transaction amount in USD; must be > 0
    #[serde(alias = "amt")]
    pub amount: f64,

    /// Merchant category
    pub category: String,

    /// Merchant identifier
    pub merchant: String,

    /// Customer latitude
    pub lat: f64,

    /// Customer longitude
    pub long: f64,

    /// Merchant latitude
    pub merch_lat: f64,

    /// Merchant longitude
    pub merch_long: f64,

    /// Population of the customer's city
    pub city_pop: f64,

    /// Customer gender (M or F)
    pub gender: String,

    /// Customer state (2-letter code)
    pub state: String,

    /// Customer birth date
    pub dob: NaiveDate,

    /// Ground-truth fraud label; present only in training data
    #[serde(default)]
    pub is_fraud: Option<u8>,
}

impl Transaction {
    /// Create a new transaction with neutral defaults for the remaining fields.
    pub fn new(cc_num: &str, timestamp: DateTime<Utc>, amount: f64) -> Self {
        Self {
            cc_num: cc_num.to_string(),
            timestamp,
            amount,
            category: "grocery_pos".to_string(),
            merchant: "merchant_1".to_string(),
            lat: 40.7128,
            long: -74.0060,
            merch_lat: 40.7128,
            merch_long: -74.0060,
            city_pop: 100_000.0,
            gender: "M".to_string(),
            state: "NY".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
            is_fraud: None,
        }
    }

    /// Set customer and merchant coordinates.
    pub fn with_coordinates(mut self, lat: f64, long: f64, merch_lat: f64, merch_long: f64) -> Self {
        self.lat = lat;
        self.long = long;
        self.merch_lat = merch_lat;
        self.merch_long = merch_long;
        self
    }

    /// Set the merchant identifier.
    pub fn with_merchant(mut self, merchant: &str) -> Self {
        self.merchant = merchant.to_string();
        self
    }

    /// Set the ground-truth fraud label (training data only).
    pub fn with_label(mut self, is_fraud: u8) -> Self {
        self.is_fraud = Some(is_fraud);
        self
    }

    /// Validate the ingestion invariants: coordinates in range, amount > 0.
    pub fn validate(&self) -> Result<()> {
        for &(lat, long) in &[(self.lat, self.long), (self.merch_lat, self.merch_long)] {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
                return Err(ScoringError::InvalidCoordinate { lat, long });
            }
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ScoringError::SchemaViolation(format!(
                "amt must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Timestamp (de)serialization for the raw log's `%Y-%m-%d %H:%M:%S`
/// column format, with an RFC 3339 fallback for JSON payloads.
mod timestamp_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, FORMAT) {
            return Ok(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction::new("card_123", ts("2024-03-01 10:00:00"), 50.0);

        let json = serde_json::to_string(&tx).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(tx.cc_num, deserialized.cc_num);
        assert_eq!(tx.timestamp, deserialized.timestamp);
        assert_eq!(tx.amount, deserialized.amount);
    }

    #[test]
    fn test_log_column_aliases() {
        let json = r#"{
            "cc_num": "card_1",
            "trans_date_trans_time": "2024-03-01 10:00:00",
            "amt": 120.5,
            "category": "grocery_pos",
            "merchant": "Whole Foods",
            "lat": 40.7128,
            "long": -74.006,
            "merch_lat": 40.75,
            "merch_long": -73.99,
            "city_pop": 50000,
            "gender": "M",
            "state": "NY",
            "dob": "1985-06-15"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, 120.5);
        assert_eq!(tx.timestamp, ts("2024-03-01 10:00:00"));
        assert_eq!(tx.is_fraud, None);
    }

    #[test]
    fn test_validate_rejects_bad_coordinates() {
        let tx = Transaction::new("card_1", ts("2024-03-01 10:00:00"), 50.0)
            .with_coordinates(91.0, 0.0, 40.0, -74.0);

        assert!(matches!(
            tx.validate(),
            Err(ScoringError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nonpositive_amount() {
        let tx = Transaction::new("card_1", ts("2024-03-01 10:00:00"), 0.0);
        assert!(matches!(
            tx.validate(),
            Err(ScoringError::SchemaViolation(_))
        ));
    }
}
