//! Calendar-derived features and the cross-history "new merchant" flag.

use crate::timeline::TimelineEntry;
use crate::types::Transaction;
use chrono::{Datelike, Timelike, Weekday};

/// Features derived from the transaction's own timestamp plus one
/// prefix-wide scan for the merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFeatures {
    /// Hour of day, 0-23
    pub txn_hour: u32,
    /// Day of week
    pub day_of_week: Weekday,
    /// 1 if Saturday or Sunday
    pub is_weekend: u8,
    /// Whole years between birth date and transaction: floor(days / 365)
    pub customer_age: i64,
    /// 1 if the merchant appears nowhere in the causal prefix
    pub is_new_merchant: u8,
}

/// Derives [`TemporalFeatures`] from a transaction and its causal prefix.
pub struct TemporalFeatureDeriver;

impl TemporalFeatureDeriver {
    pub fn new() -> Self {
        Self
    }

    pub fn derive(&self, txn: &Transaction, prefix: &[TimelineEntry]) -> TemporalFeatures {
        let day_of_week = txn.timestamp.weekday();
        let is_weekend = matches!(day_of_week, Weekday::Sat | Weekday::Sun) as u8;

        let days = (txn.timestamp.date_naive() - txn.dob).num_days();
        let customer_age = days / 365;

        // The one feature that needs the whole prefix, not just the tail.
        let seen_merchant = prefix.iter().any(|e| e.txn.merchant == txn.merchant);

        TemporalFeatures {
            txn_hour: txn.timestamp.hour(),
            day_of_week,
            is_weekend,
            customer_age,
            is_new_merchant: (!seen_merchant) as u8,
        }
    }
}

impl Default for TemporalFeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}
