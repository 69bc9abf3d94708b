//! Training-time orchestration: bulk derivation feeding the external
//! collaborators through their fit contracts.
//!
//! The statistical model itself, hyperparameter search, and model
//! persistence all live outside this crate.

use crate::dataset;
use crate::error::{Result, ScoringError};
use crate::features::assembler::FeatureVectorAssembler;
use crate::features::bulk::derive_features;
use crate::preprocess::Preprocessor;
use crate::scorer::Scorer;
use crate::types::Transaction;
use tracing::info;

/// What a training run hands back to the serving side.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// Median amount over the training set; goes into the serving
    /// configuration as `features.global_median_amount`.
    pub global_median_amount: f64,
    /// Rows the collaborators were fitted on.
    pub rows: usize,
}

/// Derive leakage-safe features for a labeled transaction log and fit
/// both collaborators on them.
///
/// Every transaction must carry its `is_fraud` label; a missing label is
/// a schema violation, not a row to skip.
pub fn fit(
    preprocessor: &mut dyn Preprocessor,
    scorer: &mut dyn Scorer,
    transactions: &[Transaction],
) -> Result<TrainingOutcome> {
    let labels = transactions
        .iter()
        .map(|txn| {
            txn.is_fraud.ok_or_else(|| {
                ScoringError::SchemaViolation(format!(
                    "training transaction on card {} has no is_fraud label",
                    txn.cc_num
                ))
            })
        })
        .collect::<Result<Vec<u8>>>()?;

    let global_median_amount = dataset::global_median_amount(transactions);
    let assembler = FeatureVectorAssembler::new(global_median_amount);
    let vectors = derive_features(transactions, &assembler)?;

    preprocessor.fit(&vectors)?;
    let matrix = preprocessor.transform(&vectors)?;
    scorer.fit(&matrix, &labels)?;

    info!(
        rows = vectors.len(),
        global_median_amount, "Training run complete"
    );

    Ok(TrainingOutcome {
        global_median_amount,
        rows: vectors.len(),
    })
}
