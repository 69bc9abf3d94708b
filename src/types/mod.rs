//! Type definitions for the fraud scoring pipeline

pub mod decision;
pub mod transaction;

pub use decision::{Action, Confidence, Decision};
pub use transaction::Transaction;
