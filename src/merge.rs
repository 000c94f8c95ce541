//! The dataset merge protocol.
//!
//! `merge` reconciles a run's results against the previously persisted dataset
//! with upsert-by-key semantics:
//! - a key already present keeps its position, its entry replaced in place
//! - a new key is appended at the end, in results order
//!
//! The function is pure: same inputs, same output, no side effects. Reading and
//! writing the dataset file is the caller's job (see [`crate::dataset`]).

use std::collections::HashMap;

use crate::dataset::DatasetEntry;
use crate::records::RunResult;

/// Apply one upsert per run result to the existing dataset.
pub fn merge(existing: Vec<DatasetEntry>, results: &[RunResult]) -> Vec<DatasetEntry> {
    let mut merged = existing;
    let mut index_by_key: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.key.clone(), i))
        .collect();

    for result in results {
        let entry = DatasetEntry::from(result);
        match index_by_key.get(&result.key) {
            Some(&i) => merged[i] = entry,
            None => {
                index_by_key.insert(result.key.clone(), merged.len());
                merged.push(entry);
            }
        }
    }

    merged
}
