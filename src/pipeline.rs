//! Prediction pipeline: the one component that talks to the external
//! preprocessor and scorer.
//!
//! Flow per transaction: validate → timeline append (atomic, before any
//! scoring work) → feature assembly → preprocessor transform → scorer
//! call under a deadline → decision policy. The timeline append stands
//! whatever happens downstream, so the hourly counts seen by later
//! transactions stay consistent even when scoring fails or times out.

use crate::config::AppConfig;
use crate::error::{Result, ScoringError};
use crate::features::assembler::FeatureVectorAssembler;
use crate::metrics::ScoringMetrics;
use crate::policy::DecisionPolicy;
use crate::preprocess::Preprocessor;
use crate::scorer::Scorer;
use crate::timeline::TimelineStore;
use crate::types::{Decision, Transaction};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Orchestrates feature assembly, the external collaborators, and the
/// decision policy for real-time scoring.
pub struct PredictionPipeline {
    assembler: FeatureVectorAssembler,
    preprocessor: Arc<dyn Preprocessor>,
    scorer: Arc<dyn Scorer>,
    policy: DecisionPolicy,
    timelines: Arc<TimelineStore>,
    metrics: Arc<ScoringMetrics>,
    scorer_timeout: Duration,
    workers: usize,
}

impl PredictionPipeline {
    pub fn new(
        config: &AppConfig,
        preprocessor: Arc<dyn Preprocessor>,
        scorer: Arc<dyn Scorer>,
    ) -> Result<Self> {
        let policy = DecisionPolicy::new(config.decision.clone())?;

        info!(
            block_threshold = config.decision.block_threshold,
            review_threshold = config.decision.review_threshold,
            global_median_amount = config.features.global_median_amount,
            scorer_timeout_ms = config.pipeline.scorer_timeout_ms,
            "Prediction pipeline initialized"
        );

        Ok(Self {
            assembler: FeatureVectorAssembler::new(config.features.global_median_amount),
            preprocessor,
            scorer,
            policy,
            timelines: Arc::new(TimelineStore::new()),
            metrics: Arc::new(ScoringMetrics::new()),
            scorer_timeout: Duration::from_millis(config.pipeline.scorer_timeout_ms),
            workers: config.pipeline.workers.max(1),
        })
    }

    /// The per-card timeline state maintained by this pipeline.
    pub fn timelines(&self) -> Arc<TimelineStore> {
        self.timelines.clone()
    }

    /// The metrics collector fed by this pipeline.
    pub fn metrics(&self) -> Arc<ScoringMetrics> {
        self.metrics.clone()
    }

    /// Score one transaction and route it to a decision.
    ///
    /// The transaction is recorded in its card's timeline before the
    /// scorer runs; a failed or timed-out scorer call never rolls that
    /// back. No failure path substitutes a default probability.
    pub async fn score(&self, txn: Transaction) -> Result<Decision> {
        let start = Instant::now();
        txn.validate()?;

        let txn = Arc::new(txn);
        let prefix = self.timelines.observe(txn.clone());
        let vector = self.assembler.assemble(&txn, &prefix)?;
        let matrix = self.preprocessor.transform(std::slice::from_ref(&vector))?;

        let scorer = self.scorer.clone();
        let call = tokio::task::spawn_blocking(move || scorer.predict_probability(&matrix));
        let probabilities = match tokio::time::timeout(self.scorer_timeout, call).await {
            Ok(joined) => joined.map_err(|e| {
                ScoringError::ModelUnavailable(format!("scorer task failed: {e}"))
            })??,
            Err(_) => {
                return Err(ScoringError::UpstreamTimeout {
                    deadline_ms: self.scorer_timeout.as_millis() as u64,
                })
            }
        };

        let probability = probabilities.first().copied().ok_or_else(|| {
            ScoringError::ModelUnavailable("scorer returned no probabilities".to_string())
        })?;
        if !probability.is_finite() {
            return Err(ScoringError::ModelUnavailable(format!(
                "scorer returned a non-finite probability: {probability}"
            )));
        }
        let probability = probability.clamp(0.0, 1.0);

        let decision = self.policy.decide(&txn.cc_num, probability);
        self.metrics
            .record_scored(start.elapsed(), probability, decision.decision);

        debug!(
            cc_num = %txn.cc_num,
            fraud_probability = probability,
            decision = ?decision.decision,
            processing_time_us = start.elapsed().as_micros() as u64,
            "Transaction scored"
        );

        Ok(decision)
    }

    /// Score a batch with bounded concurrency, preserving input order.
    ///
    /// Concurrent transactions on the same card are still serialized at
    /// the timeline append; callers that need a deterministic within-card
    /// feature sequence should submit a card's transactions in order.
    pub async fn score_batch(&self, transactions: Vec<Transaction>) -> Vec<Result<Decision>> {
        stream::iter(transactions)
            .map(|txn| self.score(txn))
            .buffered(self.workers)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::{FeatureMatrix, StandardPreprocessor};
    use crate::types::{Action, Confidence};
    use chrono::{DateTime, NaiveDateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    /// Preprocessor that encodes every row as a single zero column,
    /// sidestepping fit requirements in pipeline tests.
    struct PassthroughPreprocessor;

    impl Preprocessor for PassthroughPreprocessor {
        fn fit(&mut self, _rows: &[crate::features::FeatureVector]) -> Result<()> {
            Ok(())
        }

        fn transform(&self, rows: &[crate::features::FeatureVector]) -> Result<FeatureMatrix> {
            Ok(FeatureMatrix::Dense(crate::preprocess::DenseMatrix {
                rows: rows.len(),
                cols: 1,
                values: vec![0.0; rows.len()],
            }))
        }
    }

    struct SlowScorer;

    impl Scorer for SlowScorer {
        fn fit(&mut self, _matrix: &FeatureMatrix, _labels: &[u8]) -> Result<()> {
            Ok(())
        }

        fn predict_probability(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(vec![0.1; matrix.rows()])
        }
    }

    fn pipeline_with(probability: f64) -> PredictionPipeline {
        PredictionPipeline::new(
            &AppConfig::default(),
            Arc::new(PassthroughPreprocessor),
            Arc::new(crate::scorer::FixedScorer::new(probability)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rapid_high_value_scenario() {
        // Card c1: $50 at 10:00, then $5000 five minutes later at a
        // merchant roughly 4000 km away, scored at p = 0.85.
        let pipeline = pipeline_with(0.85);

        let first = Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0)
            .with_coordinates(0.0, 0.0, 0.0, 0.0);
        pipeline.score(first).await.unwrap();

        // 35.9716 degrees of longitude on the equator ≈ 4000 km.
        let second = Transaction::new("c1", ts("2024-03-01 10:05:00"), 5000.0)
            .with_coordinates(0.0, 0.0, 0.0, 35.9716);

        // Reproduce the assembly the pipeline performs for the second
        // transaction: its prefix is exactly the first transaction.
        let prefix = vec![crate::timeline::TimelineEntry {
            txn: Arc::new(
                Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0)
                    .with_coordinates(0.0, 0.0, 0.0, 0.0),
            ),
            seq: 0,
        }];
        let vector = pipeline.assembler.assemble(&second, &prefix).unwrap();
        assert_eq!(vector.txn_time_gap, 300.0);
        assert_eq!(vector.txn_count_1h, 2);
        assert!((vector.avg_amt_per_card - 50.0).abs() < 1e-9);
        assert!((vector.amt_deviation - 98.04).abs() < 0.01);
        assert!((vector.distance_km - 4000.0).abs() < 5.0);

        let decision = pipeline.score(second).await.unwrap();
        assert_eq!(decision.decision, Action::Block);
        assert_eq!(decision.confidence, Confidence::High);
        assert_eq!(decision.fraud_prediction, 1);
        assert!((decision.fraud_probability - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_review_boundary() {
        let pipeline = pipeline_with(0.5);
        let decision = pipeline
            .score(Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0))
            .await
            .unwrap();

        assert_eq!(decision.decision, Action::Review);
        assert_eq!(decision.confidence, Confidence::Medium);
        assert_eq!(decision.fraud_prediction, 1);
    }

    #[tokio::test]
    async fn test_block_boundary() {
        let pipeline = pipeline_with(0.8);
        let decision = pipeline
            .score(Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0))
            .await
            .unwrap();

        assert_eq!(decision.decision, Action::Block);
    }

    #[tokio::test]
    async fn test_unfitted_preprocessor_is_unavailable() {
        let pipeline = PredictionPipeline::new(
            &AppConfig::default(),
            Arc::new(StandardPreprocessor::new()),
            Arc::new(crate::scorer::FixedScorer::new(0.1)),
        )
        .unwrap();

        let result = pipeline
            .score(Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0))
            .await;
        assert!(matches!(result, Err(ScoringError::ModelUnavailable(_))));

        // The append happened before the failure.
        assert_eq!(pipeline.timelines().timeline_len("c1"), 1);
    }

    #[tokio::test]
    async fn test_scorer_timeout_keeps_timeline_intact() {
        let mut config = AppConfig::default();
        config.pipeline.scorer_timeout_ms = 20;

        let pipeline = PredictionPipeline::new(
            &config,
            Arc::new(PassthroughPreprocessor),
            Arc::new(SlowScorer),
        )
        .unwrap();

        let result = pipeline
            .score(Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0))
            .await;
        assert!(matches!(
            result,
            Err(ScoringError::UpstreamTimeout { deadline_ms: 20 })
        ));
        assert_eq!(pipeline.timelines().timeline_len("c1"), 1);
    }

    #[tokio::test]
    async fn test_invalid_transaction_never_reaches_timeline() {
        let pipeline = pipeline_with(0.1);
        let bad = Transaction::new("c1", ts("2024-03-01 10:00:00"), 50.0)
            .with_coordinates(99.0, 0.0, 0.0, 0.0);

        assert!(pipeline.score(bad).await.is_err());
        assert_eq!(pipeline.timelines().timeline_len("c1"), 0);
    }

    #[tokio::test]
    async fn test_score_batch_preserves_order() {
        let pipeline = pipeline_with(0.1);
        let transactions: Vec<Transaction> = (0..10)
            .map(|i| {
                Transaction::new(
                    &format!("card_{i}"),
                    ts("2024-03-01 10:00:00"),
                    10.0 + f64::from(i),
                )
            })
            .collect();

        let decisions = pipeline.score_batch(transactions).await;
        assert_eq!(decisions.len(), 10);
        for (i, decision) in decisions.iter().enumerate() {
            let decision = decision.as_ref().unwrap();
            assert_eq!(decision.cc_num, format!("card_{i}"));
            assert_eq!(decision.decision, Action::Allow);
        }
        assert_eq!(
            pipeline
                .metrics()
                .transactions_scored
                .load(std::sync::atomic::Ordering::Relaxed),
            10
        );
    }
}
