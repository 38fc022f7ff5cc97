//! The four descriptive-statistics passes over a working dataset.
//!
//! Every pass is read-only and independent of the others; each records its
//! own wall-clock duration for observability. A pass returns `None` for an
//! empty dataset — callers short-circuit before reaching the passes, so the
//! `None` arm is a type-level guard rather than an expected path.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::filters::FilterParams;

/// Most frequent value in `values`. Ties break to the smallest value among
/// the most frequent: counts live in a `BTreeMap`, the scan runs in
/// ascending key order, and a candidate is replaced only on a strictly
/// greater count.
pub fn mode<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(T, u64)> = None;
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Arithmetic mean of an integer total over `count` observations.
/// Returns 0.0 when `count` is zero.
fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total as f64 / count as f64
}

/// Most frequent travel times: mode of month, weekday, and start hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub most_common_month: u32,
    pub most_common_weekday: u32,
    pub most_common_hour: u32,
    pub elapsed_seconds: f64,
}

impl TimeStats {
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        let started = Instant::now();
        let records = dataset.records();

        Some(TimeStats {
            most_common_month: mode(records.iter().map(|r| r.month))?,
            most_common_weekday: mode(records.iter().map(|r| r.weekday))?,
            most_common_hour: mode(records.iter().map(|r| r.hour))?,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Most popular stations and start/end station combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub most_common_start_station: String,
    pub most_common_end_station: String,
    pub most_common_trip: String,
    pub elapsed_seconds: f64,
}

impl StationStats {
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        let started = Instant::now();
        let records = dataset.records();

        Some(StationStats {
            most_common_start_station: mode(records.iter().map(|r| r.start_station.as_str()))?
                .to_string(),
            most_common_end_station: mode(records.iter().map(|r| r.end_station.as_str()))?
                .to_string(),
            most_common_trip: mode(records.iter().map(|r| r.trip.as_str()))?.to_string(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Total and mean trip duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_secs: u64,
    pub mean_secs: f64,
    pub elapsed_seconds: f64,
}

impl DurationStats {
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        let started = Instant::now();
        if dataset.is_empty() {
            return None;
        }

        let total: u64 = dataset.records().iter().map(|r| r.duration_secs).sum();
        Some(DurationStats {
            total_secs: total,
            mean_secs: mean(total, dataset.len()),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Earliest, most recent, and most common rider birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

/// Rider demographics: user type counts, gender counts, and birth years.
/// The gender and birth-year sub-reports are `None` when the source schema
/// does not carry those columns; each degrades independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_types: BTreeMap<String, u64>,
    pub genders: Option<BTreeMap<String, u64>>,
    pub birth_years: Option<BirthYearStats>,
    pub elapsed_seconds: f64,
}

impl UserStats {
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        let started = Instant::now();
        if dataset.is_empty() {
            return None;
        }
        let records = dataset.records();
        let flags = dataset.flags();

        let mut user_types: BTreeMap<String, u64> = BTreeMap::new();
        for record in records {
            *user_types.entry(record.user_type.clone()).or_default() += 1;
        }

        let genders = flags.has_gender.then(|| {
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for gender in records.iter().filter_map(|r| r.gender.as_deref()) {
                *counts.entry(gender.to_string()).or_default() += 1;
            }
            counts
        });

        let birth_years = if flags.has_birth_year {
            let years: Vec<i32> = records.iter().filter_map(|r| r.birth_year).collect();
            match (
                years.iter().min(),
                years.iter().max(),
                mode(years.iter().copied()),
            ) {
                (Some(&earliest), Some(&most_recent), Some(most_common)) => Some(BirthYearStats {
                    earliest,
                    most_recent,
                    most_common,
                }),
                _ => None,
            }
        } else {
            None
        };

        Some(UserStats {
            user_types,
            genders,
            birth_years,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// All four passes bundled for rendering or JSON output, tagged with the
/// filters that produced the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub city: Option<String>,
    pub month_filter: Option<u32>,
    pub day_filter: Option<u32>,
    pub time: TimeStats,
    pub stations: StationStats,
    pub durations: DurationStats,
    pub users: UserStats,
}

impl Report {
    /// Runs all four passes. `None` for an empty dataset; no pass is invoked
    /// on empty input.
    pub fn compute(dataset: &Dataset) -> Option<Self> {
        if dataset.is_empty() {
            return None;
        }
        Some(Report {
            generated_at: Utc::now(),
            city: None,
            month_filter: None,
            day_filter: None,
            time: TimeStats::compute(dataset)?,
            stations: StationStats::compute(dataset)?,
            durations: DurationStats::compute(dataset)?,
            users: UserStats::compute(dataset)?,
        })
    }

    /// Tags the report with the filter parameters that produced its dataset.
    pub fn with_filters(mut self, params: &FilterParams) -> Self {
        self.city = Some(params.city.key.to_string());
        self.month_filter = params.month.value();
        self.day_filter = params.day.value();
        self
    }
}
