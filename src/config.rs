//! Configuration management for the fraud scoring pipeline
//!
//! All tunables are explicit values passed into the components at
//! construction; the only process-wide state in the crate is the
//! per-card timeline store.

use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, ScoringError};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decision tier thresholds
///
/// The tier thresholds and the binary prediction threshold are tunable
/// without touching the aggregation logic.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    /// Probability at or above which the transaction is blocked
    #[serde(default = "default_block_threshold")]
    pub block_threshold: f64,
    /// Probability at or above which the transaction goes to review
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f64,
    /// Below this probability an ALLOW is high-confidence
    #[serde(default = "default_low_risk_threshold")]
    pub low_risk_threshold: f64,
    /// Threshold for the binary fraud prediction, decoupled from tiering
    #[serde(default = "default_prediction_threshold")]
    pub prediction_threshold: f64,
}

fn default_block_threshold() -> f64 {
    0.8
}

fn default_review_threshold() -> f64 {
    0.5
}

fn default_low_risk_threshold() -> f64 {
    0.2
}

fn default_prediction_threshold() -> f64 {
    0.5
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            block_threshold: default_block_threshold(),
            review_threshold: default_review_threshold(),
            low_risk_threshold: default_low_risk_threshold(),
            prediction_threshold: default_prediction_threshold(),
        }
    }
}

/// Feature derivation constants
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// Median transaction amount over the training set; the fallback
    /// expanding mean for a card's first transaction. Recomputed per
    /// training run, never at serving time.
    #[serde(default = "default_global_median_amount")]
    pub global_median_amount: f64,
}

fn default_global_median_amount() -> f64 {
    47.52
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            global_median_amount: default_global_median_amount(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent scoring tasks in batch mode
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Deadline for one scorer call, in milliseconds
    #[serde(default = "default_scorer_timeout_ms")]
    pub scorer_timeout_ms: u64,
}

fn default_workers() -> usize {
    4
}

fn default_scorer_timeout_ms() -> u64 {
    1000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            scorer_timeout_ms: default_scorer_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| ScoringError::Config(format!("failed to read configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| ScoringError::Config(format!("failed to deserialize configuration: {e}")))
    }
}
