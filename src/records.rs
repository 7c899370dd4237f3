// Record Store
// Loads the sales CSV once and normalizes every row into a typed SalesRecord.

use crate::error::{LoadError, LoadResult};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Header names every input file must carry (exact, case-sensitive)
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Region", "Category", "Sales", "Profit"];

/// Date-only formats, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Timestamp formats; the time part is dropped
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ============================================================================
// CORE TYPES
// ============================================================================

/// One sales transaction. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Sales")]
    pub sales: Decimal,

    #[serde(rename = "Profit")]
    pub profit: Decimal,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, region: &str, category: &str, sales: Decimal, profit: Decimal) -> Self {
        SalesRecord {
            date,
            region: region.to_string(),
            category: category.to_string(),
            sales,
            profit,
        }
    }
}

/// Row exactly as it appears in the file, before type normalization
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,

    #[serde(rename = "Region")]
    region: String,

    #[serde(rename = "Category")]
    category: String,

    #[serde(rename = "Sales")]
    sales: String,

    #[serde(rename = "Profit")]
    profit: String,
}

impl RawRow {
    fn into_record(self, line: u64) -> LoadResult<SalesRecord> {
        let date = parse_date(&self.date)
            .ok_or_else(|| LoadError::parse(line, "Date", &self.date, "unrecognized date format"))?;
        let sales = parse_amount(line, "Sales", &self.sales)?;
        let profit = parse_amount(line, "Profit", &self.profit)?;

        if sales.is_sign_negative() && !sales.is_zero() {
            warn!(line, sales = %sales, "negative Sales value accepted as-is");
        }

        Ok(SalesRecord {
            date,
            region: self.region,
            category: self.category,
            sales,
            profit,
        })
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// The full, read-only record set for a session.
///
/// Owned explicitly by whoever loaded it; the engine only ever borrows it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<SalesRecord>,
}

impl Dataset {
    /// Load every record from a CSV file on disk.
    ///
    /// Fails with `SourceUnavailable` if the file cannot be opened or read,
    /// `Schema` if a required column is missing and `Parse` on the first bad row.
    /// No partial dataset is ever returned.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let file = File::open(path).map_err(|source| LoadError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = read_records(file, path)?;
        info!(
            rows = dataset.len(),
            source = %path.display(),
            "loaded sales dataset"
        );
        Ok(dataset)
    }

    /// Load from any reader (in-memory buffers, stdin, ...)
    pub fn from_reader<R: Read>(reader: R) -> LoadResult<Self> {
        read_records(reader, Path::new("<reader>"))
    }

    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct region labels in first-seen order
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct category labels in first-seen order
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Earliest and latest date present, None for an empty dataset
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for label in labels {
        if !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    seen
}

// ============================================================================
// PARSING
// ============================================================================

fn read_records<R: Read>(reader: R, origin: &Path) -> LoadResult<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(e, origin))?
        .clone();
    check_schema(&headers)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| csv_error(e, origin))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let raw: RawRow = row
            .deserialize(Some(&headers))
            .map_err(|e| LoadError::parse(line, "<row>", "", e.to_string()))?;
        records.push(raw.into_record(line)?);
    }

    debug!(rows = records.len(), source = %origin.display(), "parsed CSV rows");
    Ok(Dataset { records })
}

fn check_schema(headers: &StringRecord) -> LoadResult<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::Schema { missing })
    }
}

fn csv_error(err: csv::Error, origin: &Path) -> LoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = err.to_string();

    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::SourceUnavailable {
            path: origin.to_path_buf(),
            source,
        },
        _ => LoadError::parse(line, "<row>", "", reason),
    }
}

/// Parse a calendar date from any of the accepted text formats.
///
/// Slash-separated numeric dates are read month-first (`03/04/2024` is March 4).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Plain decimal notation only; `NaN` and `inf` are rejected
fn parse_amount(line: u64, field: &str, value: &str) -> LoadResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|_| LoadError::parse(line, field, value, "not a decimal number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = "\
Date,Region,Category,Sales,Profit
2024-01-05,North,A,100,10
2024-02-10,South,B,200,-20
2024-02-15,North,A,50,5
";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_from_reader_normalizes_types() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3, "Should load 3 records");
        let first = &dataset.records()[0];
        assert_eq!(first.date, ymd(2024, 1, 5));
        assert_eq!(first.region, "North");
        assert_eq!(first.category, "A");
        assert_eq!(first.sales, dec!(100));
        assert_eq!(dataset.records()[1].profit, dec!(-20));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.csv");

        let err = Dataset::load(&path).unwrap_err();
        assert!(
            matches!(err, LoadError::SourceUnavailable { .. }),
            "expected SourceUnavailable, got {:?}",
            err
        );
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "Date,Region,Category,Sales\n2024-01-05,North,A,100\n";

        match Dataset::from_reader(data.as_bytes()) {
            Err(LoadError::Schema { missing }) => assert_eq!(missing, vec!["Profit".to_string()]),
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let data = "date,Region,Category,Sales,Profit\n2024-01-05,North,A,100,10\n";

        match Dataset::from_reader(data.as_bytes()) {
            Err(LoadError::Schema { missing }) => assert_eq!(missing, vec!["Date".to_string()]),
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_schema_error() {
        let err = Dataset::from_reader("".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn test_extra_columns_and_any_order_are_accepted() {
        let data = "Profit,Order ID,Sales,Category,Region,Date\n5,X-1,50,A,North,2024-02-15\n";
        let dataset = Dataset::from_reader(data.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0], SalesRecord::new(ymd(2024, 2, 15), "North", "A", dec!(50), dec!(5)));
    }

    #[test]
    fn test_malformed_date_fails_whole_load() {
        let data = "\
Date,Region,Category,Sales,Profit
2024-01-05,North,A,100,10
not-a-date,South,B,200,-20
2024-02-15,North,A,50,5
";
        match Dataset::from_reader(data.as_bytes()) {
            Err(LoadError::Parse { line, field, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "Date");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_amount_is_parse_error() {
        let data = "Date,Region,Category,Sales,Profit\n2024-01-05,North,A,lots,10\n";
        let err = Dataset::from_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "ParseError");
    }

    #[test]
    fn test_nan_amount_is_parse_error() {
        let data = "Date,Region,Category,Sales,Profit\n2024-01-05,North,A,100,NaN\n";
        let err = Dataset::from_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "ParseError");
    }

    #[test]
    fn test_empty_amount_is_parse_error() {
        let data = "Date,Region,Category,Sales,Profit\n2024-01-05,North,A,,10\n";
        match Dataset::from_reader(data.as_bytes()) {
            Err(LoadError::Parse { field, .. }) => assert_eq!(field, "Sales"),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_amounts_keep_exact_cents() {
        let data = "Date,Region,Category,Sales,Profit\n2024-01-05,North,A,945.74,-0.10\n";
        let dataset = Dataset::from_reader(data.as_bytes()).unwrap();

        assert_eq!(dataset.records()[0].sales, dec!(945.74));
        assert_eq!(dataset.records()[0].profit, dec!(-0.10));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let data = "Date,Region,Category,Sales,Profit\n2024-01-05,North,A,100\n";
        let err = Dataset::from_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "ParseError");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = ymd(2024, 3, 4);
        assert_eq!(parse_date("2024-03-04"), Some(expected));
        assert_eq!(parse_date("2024/03/04"), Some(expected));
        assert_eq!(parse_date("03/04/2024"), Some(expected));
        assert_eq!(parse_date("04-Mar-2024"), Some(expected));
        assert_eq!(parse_date("4 March 2024"), Some(expected));
        assert_eq!(parse_date("March 4, 2024"), Some(expected));
        assert_eq!(parse_date("2024-03-04 13:45:00"), Some(expected));
        assert_eq!(parse_date("2024-03-04T13:45:00"), Some(expected));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("31/12/2024"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let data = "\
Date,Region,Category,Sales,Profit
2024-03-01,West,Tech,1,0
2024-01-01,East,Office,1,0
2024-02-01,West,Furniture,1,0
2024-02-02,Central,Tech,1,0
";
        let dataset = Dataset::from_reader(data.as_bytes()).unwrap();

        assert_eq!(dataset.regions(), vec!["West", "East", "Central"]);
        assert_eq!(dataset.categories(), vec!["Tech", "Office", "Furniture"]);
        assert_eq!(dataset.date_range(), Some((ymd(2024, 1, 1), ymd(2024, 3, 1))));
    }

    #[test]
    fn test_empty_dataset_has_no_date_range() {
        let dataset = Dataset::from_reader("Date,Region,Category,Sales,Profit\n".as_bytes()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.date_range(), None);
        assert!(dataset.regions().is_empty());
    }
}
