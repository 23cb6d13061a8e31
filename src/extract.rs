//! Identifier extraction from the input CSV.
//!
//! Locates the accession-number column by a trimmed, case-insensitive header
//! match and returns the cleaned identifiers in file order.

use crate::error::{Result, WosError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Default identifier column name (matched after normalization)
pub const DEFAULT_COLUMN: &str = "ut";

/// Default prefix removed from identifier values
pub const DEFAULT_PREFIX: &str = "WOS:";

/// Options controlling identifier extraction
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Column to read, compared against trimmed, lower-cased headers
    pub column: String,
    /// Literal prefix stripped from the start of each value (case-insensitive)
    pub prefix: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Normalize a header cell for comparison.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Trim a raw value and strip the accession prefix if present.
pub fn clean_identifier(raw: &str, prefix: &str) -> String {
    let value = raw.trim();
    match value.get(..prefix.len()) {
        Some(head) if !prefix.is_empty() && head.eq_ignore_ascii_case(prefix) => {
            value[prefix.len()..].trim_start().to_string()
        }
        _ => value.to_string(),
    }
}

/// Extract identifiers from CSV data with a header row.
///
/// # Errors
///
/// Returns `WosError::MissingColumn` if no header matches `options.column`,
/// or `WosError::Csv` on malformed input.
pub fn extract_identifiers<R: Read>(reader: R, options: &ExtractOptions) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let target = normalize_header(&options.column);
    let column_idx = rdr
        .headers()?
        .iter()
        .position(|h| normalize_header(h) == target)
        .ok_or_else(|| WosError::MissingColumn {
            column: target.clone(),
        })?;

    let mut identifiers = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(raw) = record.get(column_idx) else {
            debug!(row = row_idx + 1, "Row has no identifier cell, skipping");
            continue;
        };

        let id = clean_identifier(raw, &options.prefix);
        if id.is_empty() {
            debug!(row = row_idx + 1, "Empty identifier, skipping");
            continue;
        }
        identifiers.push(id);
    }

    info!(count = identifiers.len(), column = %target, "Extracted identifiers");
    Ok(identifiers)
}

/// Extract identifiers from a CSV file on disk.
pub fn extract_from_path(path: &Path, options: &ExtractOptions) -> Result<Vec<String>> {
    let file = File::open(path)
        .map_err(|e| WosError::Input(format!("cannot open {}: {}", path.display(), e)))?;
    extract_identifiers(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("WOS:000123456", "WOS:"), "000123456");
        assert_eq!(clean_identifier("  wos:000123456 ", "WOS:"), "000123456");
        assert_eq!(clean_identifier("000123456", "WOS:"), "000123456");
        assert_eq!(clean_identifier("MEDLINE:123", "WOS:"), "MEDLINE:123");
        assert_eq!(clean_identifier(" WOS", "WOS:"), "WOS");
    }

    #[test]
    fn test_header_variants() {
        for header in ["UT", "Ut", "ut", "  uT  "] {
            let data = format!("Title,{}\nx,WOS:000123456\n", header);
            let ids = extract_identifiers(data.as_bytes(), &ExtractOptions::default()).unwrap();
            assert_eq!(ids, vec!["000123456"], "header {:?}", header);
        }
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let data = "UT,Title\nWOS:A2,y\nWOS:A1,x\nWOS:A2,z\n";
        let ids = extract_identifiers(data.as_bytes(), &ExtractOptions::default()).unwrap();
        assert_eq!(ids, vec!["A2", "A1", "A2"]);
    }

    #[test]
    fn test_skips_empty_and_short_rows() {
        let data = "Title,UT\na,WOS:A1\nb,\nc\nd,A4\n";
        let ids = extract_identifiers(data.as_bytes(), &ExtractOptions::default()).unwrap();
        assert_eq!(ids, vec!["A1", "A4"]);
    }

    #[test]
    fn test_missing_column_fails() {
        let data = "Title,DOI\nx,10.1/abc\n";
        let err = extract_identifiers(data.as_bytes(), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, WosError::MissingColumn { ref column } if column == "ut"));
    }

    #[test]
    fn test_bom_header() {
        let data = "\u{feff}UT,Title\nWOS:A1,x\n";
        let ids = extract_identifiers(data.as_bytes(), &ExtractOptions::default()).unwrap();
        assert_eq!(ids, vec!["A1"]);
    }

    #[test]
    fn test_extract_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "UT,Title").unwrap();
        writeln!(file, "WOS:A1,x").unwrap();
        writeln!(file, "WOS:A2,y").unwrap();
        file.flush().unwrap();

        let ids = extract_from_path(file.path(), &ExtractOptions::default()).unwrap();
        assert_eq!(ids, vec!["A1", "A2"]);
    }

    #[test]
    fn test_extract_from_missing_path() {
        let err = extract_from_path(Path::new("/nonexistent/input.csv"), &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, WosError::Input(_)));
    }
}
