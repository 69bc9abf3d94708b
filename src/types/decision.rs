//! Operational decision records produced by the scoring pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational action for a scored transaction.
///
/// Ordered by severity: `Allow < Review < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Allow,
    Review,
    Block,
}

impl Action {
    /// Stable lowercase label, used as a metrics key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Review => "review",
            Action::Block => "block",
        }
    }
}

/// How confident the policy is in the chosen action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Decision record for one scored transaction.
///
/// Derived, not persisted by this core; persistence belongs to the
/// serving layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Unique decision identifier
    pub decision_id: String,

    /// Card the transaction belongs to
    pub cc_num: String,

    /// Fraud probability from the scorer (0.0 - 1.0)
    pub fraud_probability: f64,

    /// Binary classifier output (0 = legitimate, 1 = fraud)
    pub fraud_prediction: u8,

    /// Operational action
    pub decision: Action,

    /// Confidence in the action
    pub confidence: Confidence,

    /// When the decision was made
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    /// Create a new decision record with a fresh identifier.
    pub fn new(
        cc_num: &str,
        fraud_probability: f64,
        fraud_prediction: u8,
        decision: Action,
        confidence: Confidence,
    ) -> Self {
        Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            cc_num: cc_num.to_string(),
            fraud_probability,
            fraud_prediction,
            decision,
            confidence,
            decided_at: Utc::now(),
        }
    }
}
