//! Preprocessor boundary: recognized feature rows in, numeric matrix out.
//!
//! The matrix crossing the Preprocessor/Scorer boundary is a single
//! discriminated type with exactly one conversion function per variant
//! pair. Collaborators match on the variant; nobody probes element types
//! at runtime.

use crate::error::{Result, ScoringError};
use crate::features::vector::{FeatureVector, NUMERIC_DIMENSION};
use std::collections::HashMap;
use tracing::{debug, info};

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl DenseMatrix {
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Dense → sparse conversion: keep the non-zero entries in CSR form.
    pub fn to_sparse(&self) -> CsrMatrix {
        let mut indptr = Vec::with_capacity(self.rows + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();

        indptr.push(0);
        for i in 0..self.rows {
            for (j, &v) in self.row(i).iter().enumerate() {
                if v != 0.0 {
                    indices.push(j);
                    values.push(v);
                }
            }
            indptr.push(indices.len());
        }

        CsrMatrix {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
            values,
        }
    }
}

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    pub rows: usize,
    pub cols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Sparse → dense conversion.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut values = vec![0.0; self.rows * self.cols];
        for i in 0..self.rows {
            for k in self.indptr[i]..self.indptr[i + 1] {
                values[i * self.cols + self.indices[k]] = self.values[k];
            }
        }
        DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            values,
        }
    }
}

/// The numeric matrix exchanged with the Preprocessor and Scorer.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    Dense(DenseMatrix),
    Sparse(CsrMatrix),
}

impl FeatureMatrix {
    pub fn rows(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.rows,
            FeatureMatrix::Sparse(m) => m.rows,
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.cols,
            FeatureMatrix::Sparse(m) => m.cols,
        }
    }

    pub fn into_dense(self) -> DenseMatrix {
        match self {
            FeatureMatrix::Dense(m) => m,
            FeatureMatrix::Sparse(m) => m.to_dense(),
        }
    }

    pub fn into_sparse(self) -> CsrMatrix {
        match self {
            FeatureMatrix::Dense(m) => m.to_sparse(),
            FeatureMatrix::Sparse(m) => m,
        }
    }
}

/// Feature-row to numeric-matrix transformation.
///
/// `transform` must be deterministic given fitted state, and unknown
/// categorical values map to an "unknown" bucket rather than failing.
pub trait Preprocessor: Send + Sync {
    /// Learn scaling statistics and categorical vocabularies.
    fn fit(&mut self, rows: &[FeatureVector]) -> Result<()>;

    /// Encode rows into a numeric matrix. `ModelUnavailable` before `fit`.
    fn transform(&self, rows: &[FeatureVector]) -> Result<FeatureMatrix>;
}

#[derive(Debug, Clone)]
struct FittedState {
    numeric_mean: [f64; NUMERIC_DIMENSION],
    numeric_scale: [f64; NUMERIC_DIMENSION],
    gender_levels: Vec<String>,
    state_levels: Vec<String>,
    category_levels: Vec<String>,
    merchant_codes: HashMap<String, f64>,
    card_codes: HashMap<String, f64>,
}

/// Standard preprocessing: z-scored numerics, one-hot low-cardinality
/// categoricals (gender, state, category) where an unknown level encodes
/// as an all-zero segment, and ordinal high-cardinality categoricals
/// (merchant, cc_num) where an unknown value encodes as -1.
///
/// Vocabularies are sorted at fit time, so encoding is independent of
/// row order.
pub struct StandardPreprocessor {
    state: Option<FittedState>,
}

impl StandardPreprocessor {
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Output width after encoding, available once fitted.
    pub fn output_cols(&self) -> Option<usize> {
        self.state.as_ref().map(|s| {
            NUMERIC_DIMENSION
                + s.gender_levels.len()
                + s.state_levels.len()
                + s.category_levels.len()
                + 2
        })
    }

    fn sorted_levels<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut levels: Vec<String> = values.map(str::to_string).collect();
        levels.sort();
        levels.dedup();
        levels
    }

    fn ordinal_codes(levels: &[String]) -> HashMap<String, f64> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| (level.clone(), i as f64))
            .collect()
    }

    fn push_one_hot(out: &mut Vec<f64>, levels: &[String], value: &str) {
        // Unknown level: every position stays zero.
        for level in levels {
            out.push(if level == value { 1.0 } else { 0.0 });
        }
    }
}

impl Default for StandardPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor for StandardPreprocessor {
    fn fit(&mut self, rows: &[FeatureVector]) -> Result<()> {
        if rows.is_empty() {
            return Err(ScoringError::SchemaViolation(
                "cannot fit preprocessor on an empty row set".to_string(),
            ));
        }
        for row in rows {
            row.validate()?;
        }

        let n = rows.len() as f64;
        let mut numeric_mean = [0.0; NUMERIC_DIMENSION];
        let mut numeric_scale = [0.0; NUMERIC_DIMENSION];

        for row in rows {
            for (acc, v) in numeric_mean.iter_mut().zip(row.numeric_row()) {
                *acc += v;
            }
        }
        for acc in numeric_mean.iter_mut() {
            *acc /= n;
        }
        for row in rows {
            for ((acc, mean), v) in numeric_scale
                .iter_mut()
                .zip(numeric_mean.iter())
                .zip(row.numeric_row())
            {
                *acc += (v - mean).powi(2);
            }
        }
        for acc in numeric_scale.iter_mut() {
            let std = (*acc / n).sqrt();
            // Zero-variance columns scale by 1 so they encode as 0.
            *acc = if std > 0.0 { std } else { 1.0 };
        }

        let merchant_levels = Self::sorted_levels(rows.iter().map(|r| r.merchant.as_str()));
        let card_levels = Self::sorted_levels(rows.iter().map(|r| r.cc_num.as_str()));

        let state = FittedState {
            numeric_mean,
            numeric_scale,
            gender_levels: Self::sorted_levels(rows.iter().map(|r| r.gender.as_str())),
            state_levels: Self::sorted_levels(rows.iter().map(|r| r.state.as_str())),
            category_levels: Self::sorted_levels(rows.iter().map(|r| r.category.as_str())),
            merchant_codes: Self::ordinal_codes(&merchant_levels),
            card_codes: Self::ordinal_codes(&card_levels),
        };

        info!(
            rows = rows.len(),
            genders = state.gender_levels.len(),
            states = state.state_levels.len(),
            categories = state.category_levels.len(),
            merchants = state.merchant_codes.len(),
            "Preprocessor fitted"
        );

        self.state = Some(state);
        Ok(())
    }

    fn transform(&self, rows: &[FeatureVector]) -> Result<FeatureMatrix> {
        let state = self.state.as_ref().ok_or_else(|| {
            ScoringError::ModelUnavailable("preprocessor has not been fitted".to_string())
        })?;

        let cols = NUMERIC_DIMENSION
            + state.gender_levels.len()
            + state.state_levels.len()
            + state.category_levels.len()
            + 2;
        let mut values = Vec::with_capacity(rows.len() * cols);

        for row in rows {
            row.validate()?;

            for ((v, mean), scale) in row
                .numeric_row()
                .iter()
                .zip(state.numeric_mean.iter())
                .zip(state.numeric_scale.iter())
            {
                values.push((v - mean) / scale);
            }

            Self::push_one_hot(&mut values, &state.gender_levels, &row.gender);
            Self::push_one_hot(&mut values, &state.state_levels, &row.state);
            Self::push_one_hot(&mut values, &state.category_levels, &row.category);

            values.push(state.merchant_codes.get(&row.merchant).copied().unwrap_or(-1.0));
            values.push(state.card_codes.get(&row.cc_num).copied().unwrap_or(-1.0));
        }

        debug!(rows = rows.len(), cols, "Transformed feature rows");

        Ok(FeatureMatrix::Dense(DenseMatrix {
            rows: rows.len(),
            cols,
            values,
        }))
    }
}
