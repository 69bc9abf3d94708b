//! Assembles one validated feature vector per transaction.

use crate::error::Result;
use crate::features::causal::CausalAggregator;
use crate::features::temporal::TemporalFeatureDeriver;
use crate::features::vector::FeatureVector;
use crate::geo;
use crate::timeline::TimelineEntry;
use crate::types::Transaction;
use tracing::debug;

/// Merges geo distance, temporal features, causal statistics, and the
/// pass-through raw fields into one [`FeatureVector`] matching the
/// recognized schema.
///
/// A vector that would violate the schema never leaves this component;
/// assembly fails instead of passing partial features downstream.
pub struct FeatureVectorAssembler {
    deriver: TemporalFeatureDeriver,
    aggregator: CausalAggregator,
}

impl FeatureVectorAssembler {
    pub fn new(global_median_amount: f64) -> Self {
        Self {
            deriver: TemporalFeatureDeriver::new(),
            aggregator: CausalAggregator::new(global_median_amount),
        }
    }

    /// Assemble the feature vector for `txn` from its causal prefix.
    pub fn assemble(&self, txn: &Transaction, prefix: &[TimelineEntry]) -> Result<FeatureVector> {
        let distance_km = geo::haversine_km(txn.lat, txn.long, txn.merch_lat, txn.merch_long)?;
        let temporal = self.deriver.derive(txn, prefix);
        let causal = self.aggregator.derive(txn, prefix);

        let vector = FeatureVector {
            amt: txn.amount,
            city_pop: txn.city_pop,
            lat: txn.lat,
            long: txn.long,
            merch_lat: txn.merch_lat,
            merch_long: txn.merch_long,
            distance_km,
            txn_time_gap: causal.txn_time_gap,
            txn_count_1h: causal.txn_count_1h,
            avg_amt_per_card: causal.avg_amt_per_card,
            amt_deviation: causal.amt_deviation,
            customer_age: temporal.customer_age,
            txn_hour: temporal.txn_hour,
            is_weekend: temporal.is_weekend,
            gender: txn.gender.clone(),
            state: txn.state.clone(),
            category: txn.category.clone(),
            merchant: txn.merchant.clone(),
            cc_num: txn.cc_num.clone(),
        };
        vector.validate()?;

        debug!(
            cc_num = %txn.cc_num,
            prefix_len = prefix.len(),
            txn_count_1h = vector.txn_count_1h,
            "Assembled feature vector"
        );

        Ok(vector)
    }
}
