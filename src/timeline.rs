//! Per-card ordered transaction timelines with causal (past-only) lookups.
//!
//! The causal prefix of a transaction T is every same-card entry with a
//! timestamp strictly earlier than T's. Same-timestamp peers are never
//! part of the prefix; the arrival-order sequence number only makes the
//! ordering within a timeline deterministic.

use crate::types::Transaction;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::debug;

/// One timeline slot: the transaction plus its stable arrival-order key.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub txn: Arc<Transaction>,
    /// Arrival order; breaks timestamp ties deterministically.
    pub seq: u64,
}

/// Ordered view of one card's transaction history.
///
/// Entries are kept sorted ascending by `(timestamp, seq)`.
#[derive(Debug, Default)]
pub struct CardTimeline {
    card: String,
    entries: Vec<TimelineEntry>,
}

impl CardTimeline {
    pub fn new(card: impl Into<String>) -> Self {
        Self {
            card: card.into(),
            entries: Vec::new(),
        }
    }

    pub fn card(&self) -> &str {
        &self.card
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Insert a transaction, maintaining the `(timestamp, seq)` order.
    ///
    /// Appends are O(1) for in-order arrival; a late transaction is
    /// placed at its chronological position.
    pub fn append(&mut self, txn: Arc<Transaction>, seq: u64) {
        let key = (txn.timestamp, seq);
        let pos = self
            .entries
            .partition_point(|e| (e.txn.timestamp, e.seq) <= key);
        self.entries.insert(pos, TimelineEntry { txn, seq });
    }

    /// All entries with timestamp strictly earlier than `at`.
    pub fn causal_prefix(&self, at: DateTime<Utc>) -> &[TimelineEntry] {
        let end = self.entries.partition_point(|e| e.txn.timestamp < at);
        &self.entries[..end]
    }
}

/// Group transactions by card identifier into ordered timelines.
///
/// The arrival-order key is the transaction's position in the input
/// slice, so repeated grouping of the same data yields identical
/// timelines.
pub fn group_by_card(transactions: &[Transaction]) -> HashMap<String, CardTimeline> {
    let mut timelines: HashMap<String, CardTimeline> = HashMap::new();
    for (seq, txn) in transactions.iter().enumerate() {
        timelines
            .entry(txn.cc_num.clone())
            .or_insert_with(|| CardTimeline::new(txn.cc_num.clone()))
            .append(Arc::new(txn.clone()), seq as u64);
    }
    debug!(
        cards = timelines.len(),
        transactions = transactions.len(),
        "Grouped transactions into card timelines"
    );
    timelines
}

/// Process-wide incremental timeline state for real-time scoring.
///
/// An arena of per-card timelines behind one mutex per card: the
/// append-then-read sequence for a card is serialized, so two concurrent
/// transactions on the same card never observe the same causal prefix.
/// Distinct cards share nothing and need no coordination.
pub struct TimelineStore {
    cards: RwLock<HashMap<String, Arc<Mutex<CardTimeline>>>>,
    next_seq: AtomicU64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Number of cards with at least one observed transaction.
    pub fn card_count(&self) -> usize {
        self.cards.read().len()
    }

    /// Number of observed transactions for one card.
    pub fn timeline_len(&self, cc_num: &str) -> usize {
        self.cards
            .read()
            .get(cc_num)
            .map(|cell| cell.lock().len())
            .unwrap_or(0)
    }

    /// Record a transaction and return its causal prefix as it existed
    /// before this append.
    ///
    /// The snapshot and the append happen under the card's mutex, so the
    /// new transaction never sees itself, and subsequent same-card calls
    /// always see it. The append is unconditional: whether scoring later
    /// succeeds, fails, or times out, the timeline keeps the observed
    /// transaction.
    pub fn observe(&self, txn: Arc<Transaction>) -> Vec<TimelineEntry> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let cell = self.card_cell(&txn.cc_num);

        let mut timeline = cell.lock();
        let prefix = timeline.causal_prefix(txn.timestamp).to_vec();
        timeline.append(txn, seq);
        prefix
    }

    fn card_cell(&self, cc_num: &str) -> Arc<Mutex<CardTimeline>> {
        if let Some(cell) = self.cards.read().get(cc_num) {
            return cell.clone();
        }
        self.cards
            .write()
            .entry(cc_num.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CardTimeline::new(cc_num))))
            .clone()
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}
