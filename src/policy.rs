//! Three-tier decision policy: fraud probability in, operational action out.

use crate::config::DecisionConfig;
use crate::error::{Result, ScoringError};
use crate::types::{Action, Confidence, Decision};

/// State-free mapping from a fraud probability to an operational action,
/// monotonic in the probability.
///
/// The binary `fraud_prediction` uses its own threshold, deliberately
/// decoupled from the tiering: the prediction is the classifier output,
/// the action is the business response.
pub struct DecisionPolicy {
    config: DecisionConfig,
}

impl DecisionPolicy {
    /// Build a policy, validating that the tier thresholds are ordered.
    pub fn new(config: DecisionConfig) -> Result<Self> {
        for (value, name) in [
            (config.block_threshold, "block_threshold"),
            (config.review_threshold, "review_threshold"),
            (config.low_risk_threshold, "low_risk_threshold"),
            (config.prediction_threshold, "prediction_threshold"),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if config.low_risk_threshold >= config.review_threshold
            || config.review_threshold >= config.block_threshold
        {
            return Err(ScoringError::Config(format!(
                "thresholds must be ordered low < review < block, got {} / {} / {}",
                config.low_risk_threshold, config.review_threshold, config.block_threshold
            )));
        }
        Ok(Self { config })
    }

    /// Map a probability onto an action and confidence tier.
    pub fn action(&self, probability: f64) -> (Action, Confidence) {
        if probability >= self.config.block_threshold {
            (Action::Block, Confidence::High)
        } else if probability >= self.config.review_threshold {
            (Action::Review, Confidence::Medium)
        } else if probability >= self.config.low_risk_threshold {
            (Action::Allow, Confidence::Medium)
        } else {
            (Action::Allow, Confidence::High)
        }
    }

    /// Binary classifier output: 1 iff probability ≥ prediction threshold.
    pub fn prediction(&self, probability: f64) -> u8 {
        u8::from(probability >= self.config.prediction_threshold)
    }

    /// Build the full decision record for a scored transaction.
    pub fn decide(&self, cc_num: &str, probability: f64) -> Decision {
        let (action, confidence) = self.action(probability);
        Decision::new(
            cc_num,
            probability,
            self.prediction(probability),
            action,
            confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DecisionPolicy {
        DecisionPolicy::new(DecisionConfig::default()).unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        let policy = policy();

        assert_eq!(policy.action(0.95), (Action::Block, Confidence::High));
        assert_eq!(policy.action(0.8), (Action::Block, Confidence::High));
        assert_eq!(policy.action(0.79), (Action::Review, Confidence::Medium));
        assert_eq!(policy.action(0.5), (Action::Review, Confidence::Medium));
        assert_eq!(policy.action(0.49), (Action::Allow, Confidence::Medium));
        assert_eq!(policy.action(0.2), (Action::Allow, Confidence::Medium));
        assert_eq!(policy.action(0.19), (Action::Allow, Confidence::High));
        assert_eq!(policy.action(0.0), (Action::Allow, Confidence::High));
    }

    #[test]
    fn test_prediction_threshold_is_inclusive() {
        let policy = policy();
        assert_eq!(policy.prediction(0.5), 1);
        assert_eq!(policy.prediction(0.499), 0);
    }

    #[test]
    fn test_review_boundary_decision() {
        let decision = policy().decide("card_1", 0.5);
        assert_eq!(decision.decision, Action::Review);
        assert_eq!(decision.confidence, Confidence::Medium);
        assert_eq!(decision.fraud_prediction, 1);
    }

    #[test]
    fn test_monotonic_in_probability() {
        let policy = policy();
        let probabilities: Vec<f64> = (0..=100).map(|i| f64::from(i) / 100.0).collect();

        for window in probabilities.windows(2) {
            let (lower, _) = policy.action(window[0]);
            let (higher, _) = policy.action(window[1]);
            assert!(
                lower <= higher,
                "severity regressed between p={} and p={}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let config = DecisionConfig {
            block_threshold: 0.4,
            review_threshold: 0.5,
            low_risk_threshold: 0.2,
            prediction_threshold: 0.5,
        };
        assert!(matches!(
            DecisionPolicy::new(config),
            Err(ScoringError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let config = DecisionConfig {
            block_threshold: 1.2,
            ..DecisionConfig::default()
        };
        assert!(DecisionPolicy::new(config).is_err());
    }
}
