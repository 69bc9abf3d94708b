//! Bulk feature derivation over a full transaction log.
//!
//! Cards are fully independent: each card's timeline is processed on its
//! own with no shared mutable state, and only the within-card order
//! matters. Output order matches input order, so row i of the result is
//! the feature vector for transaction i.

use crate::error::Result;
use crate::features::assembler::FeatureVectorAssembler;
use crate::features::vector::FeatureVector;
use crate::timeline::group_by_card;
use crate::types::Transaction;
use tracing::info;

/// Derive one feature vector per transaction, leakage-safe.
///
/// Deterministic: the same input always yields the same vectors.
pub fn derive_features(
    transactions: &[Transaction],
    assembler: &FeatureVectorAssembler,
) -> Result<Vec<FeatureVector>> {
    for txn in transactions {
        txn.validate()?;
    }

    let timelines = group_by_card(transactions);

    let mut derived: Vec<(u64, FeatureVector)> = Vec::with_capacity(transactions.len());
    for timeline in timelines.values() {
        for entry in timeline.entries() {
            let prefix = timeline.causal_prefix(entry.txn.timestamp);
            let vector = assembler.assemble(&entry.txn, prefix)?;
            derived.push((entry.seq, vector));
        }
    }

    derived.sort_by_key(|(seq, _)| *seq);

    info!(
        transactions = transactions.len(),
        cards = timelines.len(),
        "Bulk feature derivation complete"
    );

    Ok(derived.into_iter().map(|(_, vector)| vector).collect())
}
