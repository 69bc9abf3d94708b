//! Fraud Scoring Pipeline Library
//!
//! Leakage-safe feature derivation and risk scoring for payment-card
//! transactions: per-card causal timelines, windowed past-only
//! aggregation, and a three-tier decision policy, with the classifier
//! and preprocessor consumed through external collaborator contracts.

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod geo;
pub mod metrics;
pub mod pipeline;
pub mod policy;
pub mod preprocess;
pub mod scorer;
pub mod timeline;
pub mod training;
pub mod types;

pub use config::AppConfig;
pub use error::{Result, ScoringError};
pub use features::{FeatureVector, FeatureVectorAssembler};
pub use metrics::ScoringMetrics;
pub use pipeline::PredictionPipeline;
pub use policy::DecisionPolicy;
pub use preprocess::{FeatureMatrix, Preprocessor, StandardPreprocessor};
pub use scorer::{FixedScorer, Scorer};
pub use timeline::{CardTimeline, TimelineStore};
pub use types::{Action, Confidence, Decision, Transaction};
