//! Scorer boundary: the external classifier capability.
//!
//! The statistical model behind this trait lives outside the core; the
//! core only depends on the fit / predict-probability contract.

use crate::error::{Result, ScoringError};
use crate::preprocess::FeatureMatrix;

/// External classifier contract.
///
/// `predict_probability` returns one probability in [0, 1] per input
/// row, in row order.
pub trait Scorer: Send + Sync {
    /// Fit the model on a numeric matrix and its 0/1 labels.
    fn fit(&mut self, matrix: &FeatureMatrix, labels: &[u8]) -> Result<()>;

    /// Fraud probability per row. `ModelUnavailable` when no fitted
    /// model is loaded.
    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>>;
}

/// Trivial scorer returning one configured probability for every row.
///
/// Stands in for the external classifier when wiring or testing the
/// pipeline; it carries no statistical model and is always ready.
pub struct FixedScorer {
    probability: f64,
}

impl FixedScorer {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl Scorer for FixedScorer {
    fn fit(&mut self, matrix: &FeatureMatrix, labels: &[u8]) -> Result<()> {
        if matrix.rows() != labels.len() {
            return Err(ScoringError::SchemaViolation(format!(
                "{} matrix rows but {} labels",
                matrix.rows(),
                labels.len()
            )));
        }
        Ok(())
    }

    fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(vec![self.probability; matrix.rows()])
    }
}
