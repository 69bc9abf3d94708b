//! Leakage-safe feature derivation: temporal features, causal windowed
//! statistics, and assembly into the recognized schema.

pub mod assembler;
pub mod bulk;
pub mod causal;
pub mod temporal;
pub mod vector;

pub use assembler::FeatureVectorAssembler;
pub use bulk::derive_features;
pub use causal::{CausalAggregator, CausalFeatures};
pub use temporal::{TemporalFeatureDeriver, TemporalFeatures};
pub use vector::{FeatureVector, FEATURE_NAMES, NUMERIC_DIMENSION};
