//! Raw transaction log ingestion and training-set utilities.

use crate::error::Result;
use crate::types::Transaction;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Read transactions from a CSV log.
///
/// Column names follow the raw log (`trans_date_trans_time`, `amt`, ...);
/// unrecognized columns are ignored. Every row is validated at ingestion;
/// a row with out-of-range coordinates or a non-positive amount rejects
/// the load rather than being silently dropped.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut transactions = Vec::new();
    for record in csv_reader.deserialize::<Transaction>() {
        let txn = record?;
        txn.validate()?;
        transactions.push(txn);
    }

    info!(rows = transactions.len(), "Transaction log loaded");
    Ok(transactions)
}

/// Read transactions from a CSV file on disk.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let file = File::open(path.as_ref())?;
    read_transactions(BufReader::new(file))
}

/// Median transaction amount over a training set.
///
/// Computed once per training run and then carried as a fixed constant
/// in the serving configuration (`features.global_median_amount`); the
/// scoring path never recomputes it. Returns 0.0 for an empty set.
pub fn global_median_amount(transactions: &[Transaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }

    let mut amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
    amounts.sort_by(|a, b| a.total_cmp(b));

    let mid = amounts.len() / 2;
    if amounts.len() % 2 == 0 {
        (amounts[mid - 1] + amounts[mid]) / 2.0
    } else {
        amounts[mid]
    }
}

/// Deterministic shuffled train/test split.
///
/// The same seed always produces the same partition.
pub fn train_test_split(
    mut transactions: Vec<Transaction>,
    test_fraction: f64,
    seed: u64,
) -> (Vec<Transaction>, Vec<Transaction>) {
    let mut rng = StdRng::seed_from_u64(seed);
    transactions.shuffle(&mut rng);

    let test_len = (transactions.len() as f64 * test_fraction.clamp(0.0, 1.0)).round() as usize;
    let train = transactions.split_off(test_len);
    (train, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    const SAMPLE_CSV: &str = "\
cc_num,trans_date_trans_time,amt,category,merchant,lat,long,merch_lat,merch_long,city_pop,gender,state,dob,is_fraud
card_1,2024-03-01 10:00:00,50.0,grocery_pos,shop_a,40.7128,-74.0060,40.75,-73.99,50000,M,NY,1990-01-01,0
card_1,2024-03-01 10:05:00,5000.0,shopping_net,shop_b,40.7128,-74.0060,34.05,-118.24,50000,M,NY,1990-01-01,1
card_2,2024-03-01 11:00:00,20.0,gas_transport,shop_c,34.0522,-118.2437,34.05,-118.24,3900000,F,CA,1985-06-15,0
";

    #[test]
    fn test_read_csv_log() {
        let transactions = read_transactions(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].cc_num, "card_1");
        assert_eq!(transactions[0].timestamp, ts("2024-03-01 10:00:00"));
        assert_eq!(transactions[1].is_fraud, Some(1));
        assert_eq!(transactions[2].gender, "F");
    }

    #[test]
    fn test_bad_row_rejects_load() {
        let csv = SAMPLE_CSV.replace("40.7128,-74.0060,40.75", "95.0,-74.0060,40.75");
        assert!(read_transactions(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_median_odd_and_even() {
        let txns: Vec<Transaction> = [10.0, 30.0, 20.0]
            .iter()
            .map(|&amt| Transaction::new("c", ts("2024-03-01 10:00:00"), amt))
            .collect();
        assert_eq!(global_median_amount(&txns), 20.0);

        let txns: Vec<Transaction> = [10.0, 30.0, 20.0, 40.0]
            .iter()
            .map(|&amt| Transaction::new("c", ts("2024-03-01 10:00:00"), amt))
            .collect();
        assert_eq!(global_median_amount(&txns), 25.0);
    }

    #[test]
    fn test_median_of_empty_set() {
        assert_eq!(global_median_amount(&[]), 0.0);
    }

    #[test]
    fn test_split_is_deterministic() {
        let txns: Vec<Transaction> = (0..10)
            .map(|i| Transaction::new(&format!("c{i}"), ts("2024-03-01 10:00:00"), 10.0))
            .collect();

        let (train_a, test_a) = train_test_split(txns.clone(), 0.2, 42);
        let (train_b, test_b) = train_test_split(txns, 0.2, 42);

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 8);
        assert_eq!(test_a.len(), 2);
    }
}
