//! h-index over retrieved citation counts.
//!
//! The h-index is the largest `h` such that `h` documents each have at least
//! `h` citations. Only the counts are kept, never the records.

use crate::client::Record;
use crate::schema::CITATIONS_FIELD;

/// Running h-index accumulator
#[derive(Debug, Clone, Default)]
pub struct HIndex {
    citations: Vec<u64>,
}

impl HIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, citations: u64) {
        self.citations.push(citations);
    }

    /// Add the record's `TOT_CITES`, if it has a usable one.
    ///
    /// Returns whether a count was recorded.
    pub fn push_record(&mut self, record: &Record) -> bool {
        match record.get(CITATIONS_FIELD).and_then(citation_count) {
            Some(n) => {
                self.push(n);
                true
            }
            None => false,
        }
    }

    /// Documents counted so far.
    pub fn documents(&self) -> usize {
        self.citations.len()
    }

    pub fn value(&self) -> u64 {
        let mut sorted = self.citations.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted
            .iter()
            .enumerate()
            .take_while(|(rank, cites)| **cites > *rank as u64)
            .count() as u64
    }
}

/// Read a citation count from a number or numeric string.
pub(crate) fn citation_count(val: &serde_json::Value) -> Option<u64> {
    match val {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn h(counts: &[u64]) -> u64 {
        let mut idx = HIndex::new();
        for c in counts {
            idx.push(*c);
        }
        idx.value()
    }

    #[test]
    fn test_h_index_values() {
        assert_eq!(h(&[]), 0);
        assert_eq!(h(&[0, 0, 0]), 0);
        assert_eq!(h(&[10]), 1);
        assert_eq!(h(&[3, 0, 6, 1, 5]), 3);
        assert_eq!(h(&[1, 4, 1, 4, 2, 1, 3, 5, 6]), 4);
        assert_eq!(h(&[100, 100, 100]), 3);
    }

    #[test]
    fn test_push_record() {
        let mut idx = HIndex::new();
        let as_number = json!({"TOT_CITES": 7});
        let as_string = json!({"TOT_CITES": " 2 "});
        let missing = json!({"ISI_LOC": "A1"});
        let garbage = json!({"TOT_CITES": "n/a"});

        assert!(idx.push_record(as_number.as_object().unwrap()));
        assert!(idx.push_record(as_string.as_object().unwrap()));
        assert!(!idx.push_record(missing.as_object().unwrap()));
        assert!(!idx.push_record(garbage.as_object().unwrap()));
        assert_eq!(idx.documents(), 2);
        assert_eq!(idx.value(), 2);
    }
}
