//! Output column schema.
//!
//! The CSV header is declared up front rather than taken from the first batch,
//! because a later batch may carry fields the first one lacked.

use crate::error::{Result, WosError};
use std::collections::HashSet;

/// InCites citation-metric fields, in output column order.
pub const INCITES_FIELDS: &[&str] = &[
    "ISI_LOC",
    "ARTICLE_TYPE",
    "TOT_CITES",
    "JOURNAL_EXPECTED_CITATIONS",
    "JOURNAL_ACT_EXP_CITATIONS",
    "IMPACT_FACTOR",
    "AVG_EXPECTED_RATE",
    "PERCENTILE",
    "NCI",
    "ESI_MOST_CITED_ARTICLE",
    "HOT_PAPER",
    "IS_INTERNATIONAL_COLLAB",
    "IS_INSTITUTION_COLLAB",
    "IS_INDUSTRY_COLLAB",
    "OA_FLAG",
    "RNUM",
];

/// Field holding the record's accession number
pub const ACCESSION_FIELD: &str = "ISI_LOC";

/// Field holding the record's total citation count
pub const CITATIONS_FIELD: &str = "TOT_CITES";

/// Ordered, fixed list of output field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    fields: Vec<String>,
}

impl OutputSchema {
    /// Build a schema from an explicit field list.
    ///
    /// Rejects an empty list and duplicate names.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(WosError::Config("output schema has no fields".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(WosError::Config(format!(
                    "duplicate output field: {}",
                    field
                )));
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self {
            fields: INCITES_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema() {
        let schema = OutputSchema::default();
        assert_eq!(schema.fields().len(), 16);
        assert_eq!(schema.fields()[0], "ISI_LOC");
        assert_eq!(schema.fields()[15], "RNUM");
    }

    #[test]
    fn test_schema_validation() {
        assert!(OutputSchema::new(Vec::<String>::new()).is_err());
        assert!(OutputSchema::new(["A", "B", "A"]).is_err());

        let schema = OutputSchema::new(["TOT_CITES", "ISI_LOC"]).unwrap();
        assert_eq!(schema.fields(), &["TOT_CITES".to_string(), "ISI_LOC".to_string()]);
    }
}
