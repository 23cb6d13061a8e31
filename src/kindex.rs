//! k-index: total citing-article count over the retrieved records.
//!
//! Each record contributes its `TOT_CITES`; records without a usable count
//! contribute nothing and are not counted as documents.

use crate::client::Record;
use crate::hindex::citation_count;
use crate::schema::CITATIONS_FIELD;

/// Running k-index accumulator
#[derive(Debug, Clone, Default)]
pub struct KIndex {
    total: u64,
    documents: usize,
}

impl KIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, citings: u64) {
        self.total = self.total.saturating_add(citings);
        self.documents += 1;
    }

    /// Add the record's `TOT_CITES`, if it has a usable one.
    pub fn push_record(&mut self, record: &Record) -> bool {
        match record.get(CITATIONS_FIELD).and_then(citation_count) {
            Some(n) => {
                self.push(n);
                true
            }
            None => false,
        }
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn value(&self) -> u64 {
        self.total
    }
}
