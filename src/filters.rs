//! Filter resolution for the analysis pipeline.
//!
//! Maps raw city/month/weekday tokens onto normalized filter parameters
//! backed by process-wide static lookup tables.

use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// City key -> CSV file name in the data directory.
static CITY_DATA: &[(&str, &str)] = &[
    ("chicago", "chicago.csv"),
    ("new york city", "new_york_city.csv"),
    ("washington", "washington.csv"),
];

/// Full English month names, index 0 = January (month number 1).
static MONTH_NAMES: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English weekday names, index 0 = Monday (ISO weekday ordering).
static WEEKDAY_NAMES: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

static MONTH_INDEX: LazyLock<HashMap<String, u32>> = LazyLock::new(|| {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_lowercase(), i as u32 + 1))
        .collect()
});

static WEEKDAY_INDEX: LazyLock<HashMap<String, u32>> = LazyLock::new(|| {
    WEEKDAY_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_lowercase(), i as u32))
        .collect()
});

/// A supported city and the backing file its trip records live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    pub key: &'static str,
    pub source_file: &'static str,
}

/// One filter axis: either no filtering, or a single concrete match target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    All,
    Only(u32),
}

impl Selector {
    /// Returns `true` if `value` passes this filter axis.
    pub fn matches(&self, value: u32) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(target) => *target == value,
        }
    }

    /// The concrete match target, or `None` for [`Selector::All`].
    pub fn value(&self) -> Option<u32> {
        match self {
            Selector::All => None,
            Selector::Only(target) => Some(*target),
        }
    }
}

/// Fully resolved filter parameters. Invariant: every field holds a valid
/// value before any dataset is loaded; there are no partial filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    pub city: City,
    pub month: Selector,
    pub day: Selector,
}

/// A selection token that is not in the allowed set. Recoverable: the
/// interactive loop re-prompts instead of aborting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown city '{0}' (expected one of: chicago, new york city, washington)")]
    UnknownCity(String),
    #[error("unknown month '{0}' (expected a full month name, or 'all')")]
    UnknownMonth(String),
    #[error("unknown day '{0}' (expected a full weekday name, or 'all')")]
    UnknownWeekday(String),
}

/// Iterates over all supported cities in registry order.
pub fn cities() -> impl Iterator<Item = City> {
    CITY_DATA.iter().map(|&(key, source_file)| City {
        key,
        source_file,
    })
}

/// Resolves a city token (case-insensitive, surrounding whitespace ignored).
pub fn resolve_city(token: &str) -> Result<City, SelectionError> {
    let normalized = token.trim().to_lowercase();
    cities()
        .find(|city| city.key == normalized)
        .ok_or(SelectionError::UnknownCity(normalized))
}

/// Resolves a month token to a 1-indexed month selector, or [`Selector::All`].
pub fn resolve_month(token: &str) -> Result<Selector, SelectionError> {
    let normalized = token.trim().to_lowercase();
    if normalized == "all" {
        return Ok(Selector::All);
    }
    MONTH_INDEX
        .get(&normalized)
        .map(|&month| Selector::Only(month))
        .ok_or(SelectionError::UnknownMonth(normalized))
}

/// Resolves a weekday token to a 0-indexed (Monday-first) selector, or
/// [`Selector::All`].
pub fn resolve_weekday(token: &str) -> Result<Selector, SelectionError> {
    let normalized = token.trim().to_lowercase();
    if normalized == "all" {
        return Ok(Selector::All);
    }
    WEEKDAY_INDEX
        .get(&normalized)
        .map(|&day| Selector::Only(day))
        .ok_or(SelectionError::UnknownWeekday(normalized))
}

/// Resolves all three tokens into [`FilterParams`]. Pure mapping; the first
/// unrecognized token fails the whole resolution.
pub fn resolve(city: &str, month: &str, day: &str) -> Result<FilterParams, SelectionError> {
    Ok(FilterParams {
        city: resolve_city(city)?,
        month: resolve_month(month)?,
        day: resolve_weekday(day)?,
    })
}

/// Display name for a 1-indexed month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Display name for a 0-indexed (Monday-first) weekday number.
pub fn weekday_name(day: u32) -> Option<&'static str> {
    WEEKDAY_NAMES.get(day as usize).copied()
}

/// All month tokens accepted by [`resolve_month`], for prompt text.
pub fn month_tokens() -> impl Iterator<Item = &'static str> {
    MONTH_NAMES.iter().copied().chain(std::iter::once("all"))
}

/// All weekday tokens accepted by [`resolve_weekday`], for prompt text.
pub fn weekday_tokens() -> impl Iterator<Item = &'static str> {
    WEEKDAY_NAMES.iter().copied().chain(std::iter::once("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_city_is_case_insensitive() {
        let city = resolve_city("  Chicago ").unwrap();
        assert_eq!(city.key, "chicago");
        assert_eq!(city.source_file, "chicago.csv");

        let city = resolve_city("NEW YORK CITY").unwrap();
        assert_eq!(city.source_file, "new_york_city.csv");
    }

    #[test]
    fn test_resolve_city_unknown() {
        assert_eq!(
            resolve_city("boston"),
            Err(SelectionError::UnknownCity("boston".to_string()))
        );
    }

    #[test]
    fn test_resolve_month() {
        assert_eq!(resolve_month("january").unwrap(), Selector::Only(1));
        assert_eq!(resolve_month("March").unwrap(), Selector::Only(3));
        assert_eq!(resolve_month("december").unwrap(), Selector::Only(12));
        assert_eq!(resolve_month("all").unwrap(), Selector::All);
    }

    #[test]
    fn test_resolve_month_unknown() {
        assert_eq!(
            resolve_month("jan"),
            Err(SelectionError::UnknownMonth("jan".to_string()))
        );
    }

    #[test]
    fn test_resolve_weekday_is_monday_first() {
        assert_eq!(resolve_weekday("monday").unwrap(), Selector::Only(0));
        assert_eq!(resolve_weekday("Sunday").unwrap(), Selector::Only(6));
        assert_eq!(resolve_weekday("ALL").unwrap(), Selector::All);
    }

    #[test]
    fn test_resolve_weekday_unknown() {
        assert_eq!(
            resolve_weekday("someday"),
            Err(SelectionError::UnknownWeekday("someday".to_string()))
        );
    }

    #[test]
    fn test_resolve_full_params() {
        let params = resolve("washington", "june", "friday").unwrap();
        assert_eq!(params.city.key, "washington");
        assert_eq!(params.month, Selector::Only(6));
        assert_eq!(params.day, Selector::Only(4));
    }

    #[test]
    fn test_selector_matches() {
        assert!(Selector::All.matches(7));
        assert!(Selector::Only(3).matches(3));
        assert!(!Selector::Only(3).matches(4));
        assert_eq!(Selector::All.value(), None);
        assert_eq!(Selector::Only(3).value(), Some(3));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(weekday_name(0), Some("Monday"));
        assert_eq!(weekday_name(6), Some("Sunday"));
        assert_eq!(weekday_name(7), None);
    }
}
