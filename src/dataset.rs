//! Trip record loading: CSV ingest, derived fields, filtering, and the
//! one-time cleanup pass.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::filters::{FilterParams, Selector};

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sentinel recorded for rides whose gender field is empty.
pub const GENDER_NOT_DECLARED: &str = "Not declared";
/// Sentinel recorded for rides whose user type field is empty.
pub const USER_TYPE_UNKNOWN: &str = "Unknown";

/// A row exactly as it appears in a city CSV file. The source files are
/// pandas exports: numeric columns may carry a trailing `.0` and the
/// gender / birth year columns are absent entirely for some cities.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

/// One bicycle-share ride, with fields derived from the start timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub start_station: String,
    pub end_station: String,
    pub duration_secs: u64,
    pub user_type: String,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,

    // derived at load time
    pub month: u32,
    pub weekday: u32,
    pub hour: u32,
    pub trip: String,
}

/// Which optional columns the source schema carries. Computed once per load
/// from the CSV header, never re-checked per record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaFlags {
    pub has_gender: bool,
    pub has_birth_year: bool,
}

/// The filtered, cleaned, immutable record sequence all report passes and
/// the paginator operate on. Order is preserved from source ingestion order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<TripRecord>,
    flags: SchemaFlags,
}

impl Dataset {
    pub fn new(records: Vec<TripRecord>, flags: SchemaFlags) -> Self {
        Self { records, flags }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn flags(&self) -> SchemaFlags {
        self.flags
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty dataset is a valid result of filtering, distinct from any
    /// [`LoadError`].
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a dataset containing only records matching both selectors.
    /// The axes are evaluated independently and combined with AND, so
    /// filtering is idempotent under the same selectors.
    pub fn filtered(&self, month: Selector, day: Selector) -> Dataset {
        let records = self
            .records
            .iter()
            .filter(|r| month.matches(r.month) && day.matches(r.weekday))
            .cloned()
            .collect();
        Dataset {
            records,
            flags: self.flags,
        }
    }
}

/// A fatal failure while loading a city's records. Always aborts the current
/// run; never produced for an empty filter result.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no trip data for '{city}' at {}", path.display())]
    SourceNotFound {
        city: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trip data: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {row}: unparseable start time '{value}'")]
    Timestamp { row: usize, value: String },
}

/// Loads the city's full record set, derives per-record fields, and applies
/// both filter axes. No partial datasets: any unparseable start time fails
/// the whole load.
pub fn load_dataset(data_dir: &Path, params: &FilterParams) -> Result<Dataset, LoadError> {
    let path = data_dir.join(params.city.source_file);
    debug!(city = %params.city.key, path = %path.display(), "Loading trip records");

    let file = File::open(&path).map_err(|source| LoadError::SourceNotFound {
        city: params.city.key.to_string(),
        path: path.clone(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let flags = schema_flags(reader.headers()?);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RawTrip>().enumerate() {
        let raw = row?;
        // Row number as a human would count it: header line + 1-based data rows.
        let record = clean_record(raw, flags, index + 2)?;
        if params.month.matches(record.month) && params.day.matches(record.weekday) {
            records.push(record);
        }
    }

    info!(
        city = %params.city.key,
        rows = records.len(),
        has_gender = flags.has_gender,
        has_birth_year = flags.has_birth_year,
        "Dataset loaded"
    );

    Ok(Dataset::new(records, flags))
}

fn schema_flags(headers: &csv::StringRecord) -> SchemaFlags {
    SchemaFlags {
        has_gender: headers.iter().any(|h| h == "Gender"),
        has_birth_year: headers.iter().any(|h| h == "Birth Year"),
    }
}

/// Builds a [`TripRecord`] from a raw row: parses the start timestamp,
/// derives the time fields and trip key, and applies the cleanup sentinels.
fn clean_record(raw: RawTrip, flags: SchemaFlags, row: usize) -> Result<TripRecord, LoadError> {
    let start_time = NaiveDateTime::parse_from_str(&raw.start_time, START_TIME_FORMAT).map_err(
        |_| LoadError::Timestamp {
            row,
            value: raw.start_time.clone(),
        },
    )?;

    // End times are informational only; a malformed one does not fail the load.
    let end_time = raw
        .end_time
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, START_TIME_FORMAT).ok());

    let trip = format!("{} -> {}", raw.start_station, raw.end_station);

    let gender = if flags.has_gender {
        Some(raw.gender.unwrap_or_else(|| GENDER_NOT_DECLARED.to_string()))
    } else {
        None
    };

    Ok(TripRecord {
        month: start_time.month(),
        weekday: start_time.weekday().num_days_from_monday(),
        hour: start_time.hour(),
        trip,
        end_time,
        start_station: raw.start_station,
        end_station: raw.end_station,
        duration_secs: raw.trip_duration as u64,
        user_type: raw.user_type.unwrap_or_else(|| USER_TYPE_UNKNOWN.to_string()),
        gender,
        birth_year: raw.birth_year.map(|y| y as i32),
        start_time,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters;
    use std::io::Write;

    const FULL_HEADER: &str =
        "Start Time,End Time,Start Station,End Station,Trip Duration,User Type,Gender,Birth Year";

    fn write_csv(dir: &Path, file: &str, contents: &str) {
        let mut f = File::create(dir.join(file)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn chicago_csv() -> String {
        // Jan 2: Monday. Mar 3: Friday. Jun 5: Monday.
        format!(
            "{FULL_HEADER}\n\
             2017-01-02 08:15:00,2017-01-02 08:30:00,A St,B St,900.0,Subscriber,Male,1985.0\n\
             2017-03-03 09:00:00,2017-03-03 09:10:00,A St,C St,600.0,Customer,Female,1992.0\n\
             2017-06-05 18:45:00,2017-06-05 19:00:00,B St,A St,901.0,,,\n"
        )
    }

    fn params(city: &str, month: &str, day: &str) -> FilterParams {
        filters::resolve(city, month, day).unwrap()
    }

    #[test]
    fn test_load_all_keeps_every_record() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "all", "all")).unwrap();
        assert_eq!(dataset.len(), 3);
        assert!(dataset.flags().has_gender);
        assert!(dataset.flags().has_birth_year);
    }

    #[test]
    fn test_derived_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "all", "all")).unwrap();
        let first = &dataset.records()[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.weekday, 0); // 2017-01-02 was a Monday
        assert_eq!(first.hour, 8);
        assert_eq!(first.trip, "A St -> B St");
        assert_eq!(first.duration_secs, 900);
    }

    #[test]
    fn test_month_filter_is_independent_of_day_axis() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "march", "all")).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.records().iter().all(|r| r.month == 3));
    }

    #[test]
    fn test_day_filter() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        // Two of the three rides start on a Monday.
        let dataset = load_dataset(dir.path(), &params("chicago", "all", "monday")).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.records().iter().all(|r| r.weekday == 0));
    }

    #[test]
    fn test_both_axes_combined_with_and() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "june", "monday")).unwrap();
        assert_eq!(dataset.len(), 1);

        let dataset = load_dataset(dir.path(), &params("chicago", "june", "friday")).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_refiltering_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let p = params("chicago", "all", "monday");
        let dataset = load_dataset(dir.path(), &p).unwrap();
        let refiltered = dataset.filtered(p.month, p.day);
        assert_eq!(dataset.records(), refiltered.records());
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "december", "all")).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_missing_source_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_dataset(dir.path(), &params("washington", "all", "all")).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
    }

    #[test]
    fn test_unparseable_start_time_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{FULL_HEADER}\n\
             2017-01-02 08:15:00,,A St,B St,900,Subscriber,Male,1985\n\
             not-a-timestamp,,A St,B St,600,Customer,Female,1992\n"
        );
        write_csv(dir.path(), "chicago.csv", &contents);

        let err = load_dataset(dir.path(), &params("chicago", "all", "all")).unwrap_err();
        match err {
            LoadError::Timestamp { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "not-a-timestamp");
            }
            other => panic!("expected timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn test_cleanup_sentinels_and_year_coercion() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "chicago.csv", &chicago_csv());

        let dataset = load_dataset(dir.path(), &params("chicago", "all", "all")).unwrap();
        let last = &dataset.records()[2];
        assert_eq!(last.user_type, USER_TYPE_UNKNOWN);
        assert_eq!(last.gender.as_deref(), Some(GENDER_NOT_DECLARED));
        assert_eq!(last.birth_year, None);

        // pandas-style "1985.0" coerces to an integer year
        assert_eq!(dataset.records()[0].birth_year, Some(1985));
    }

    #[test]
    fn test_schema_without_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "Start Time,End Time,Start Station,End Station,Trip Duration,User Type\n\
                        2017-01-02 08:15:00,2017-01-02 08:30:00,A St,B St,900.0,Subscriber\n";
        write_csv(dir.path(), "washington.csv", contents);

        let dataset = load_dataset(dir.path(), &params("washington", "all", "all")).unwrap();
        assert!(!dataset.flags().has_gender);
        assert!(!dataset.flags().has_birth_year);
        assert_eq!(dataset.records()[0].gender, None);
        assert_eq!(dataset.records()[0].birth_year, None);
    }
}
