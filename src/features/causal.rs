//! Windowed and cumulative per-card statistics with strict past-only
//! semantics.
//!
//! Every statistic for a transaction T is a function of its causal prefix
//! only. This is the load-bearing correctness property of the whole core:
//! a statistic that reads T itself or anything after it leaks the future
//! into training features.

use crate::timeline::TimelineEntry;
use crate::types::Transaction;
use chrono::Duration;

/// Statistics computed from a transaction's causal prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct CausalFeatures {
    /// Seconds since the card's previous transaction; 0 for the first.
    pub txn_time_gap: f64,
    /// Transactions in the trailing one-hour window, counting T itself;
    /// 1 for the first.
    pub txn_count_1h: u32,
    /// Expanding mean of prior amounts; the global median for the first.
    pub avg_amt_per_card: f64,
    /// amount / (avg_amt_per_card + 1)
    pub amt_deviation: f64,
}

/// Computes [`CausalFeatures`] from a causal prefix.
///
/// `global_median_amount` is the empty-prefix fallback for the expanding
/// mean: a single scalar computed once over the training set and supplied
/// as a fixed constant, never recomputed at scoring time.
pub struct CausalAggregator {
    global_median_amount: f64,
}

impl CausalAggregator {
    pub fn new(global_median_amount: f64) -> Self {
        Self {
            global_median_amount,
        }
    }

    pub fn global_median_amount(&self) -> f64 {
        self.global_median_amount
    }

    /// Derive the windowed statistics for `txn` given its causal prefix,
    /// chronologically ordered.
    pub fn derive(&self, txn: &Transaction, prefix: &[TimelineEntry]) -> CausalFeatures {
        let txn_time_gap = prefix
            .last()
            .map(|e| (txn.timestamp - e.txn.timestamp).num_seconds() as f64)
            .unwrap_or(0.0);

        // Left-open trailing window (T - 1h, T): an entry exactly one
        // hour old falls outside. The prefix already excludes T and its
        // same-timestamp peers, and the +1 counts T itself.
        let cutoff = txn.timestamp - Duration::hours(1);
        let in_window = prefix
            .iter()
            .rev()
            .take_while(|e| e.txn.timestamp > cutoff)
            .count();
        let txn_count_1h = in_window as u32 + 1;

        // Expanding mean over the prefix; T's own amount stays out.
        let avg_amt_per_card = if prefix.is_empty() {
            self.global_median_amount
        } else {
            prefix.iter().map(|e| e.txn.amount).sum::<f64>() / prefix.len() as f64
        };

        // The +1 is a deliberate smoothing constant: it keeps the ratio
        // bounded when the running mean is near zero.
        let amt_deviation = txn.amount / (avg_amt_per_card + 1.0);

        CausalFeatures {
            txn_time_gap,
            txn_count_1h,
            avg_amt_per_card,
            amt_deviation,
        }
    }
}
