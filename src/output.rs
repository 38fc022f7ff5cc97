//! Console rendering for reports and raw-data pages.
//!
//! Reports render as plain text sections; raw-data pages render as a table.
//! A JSON mode serializes the whole report for non-interactive use.

use std::io::Write;

use anyhow::Result;
use comfy_table::Table;

use crate::dataset::TripRecord;
use crate::filters;
use crate::stats::{DurationStats, Report, StationStats, TimeStats, UserStats};

const SECTION_RULE: &str = "----------------------------------------";

fn section_footer(out: &mut impl Write, elapsed_seconds: f64) -> std::io::Result<()> {
    writeln!(out, "\nThis took {elapsed_seconds:.6} seconds.")?;
    writeln!(out, "{SECTION_RULE}")
}

/// Renders the most-frequent-travel-times section.
pub fn render_time_stats(out: &mut impl Write, stats: &TimeStats) -> std::io::Result<()> {
    writeln!(out, "\nMost Frequent Times of Travel\n")?;
    writeln!(
        out,
        "Most common month: {}",
        filters::month_name(stats.most_common_month).unwrap_or("?")
    )?;
    writeln!(
        out,
        "Most common day of week: {}",
        filters::weekday_name(stats.most_common_weekday).unwrap_or("?")
    )?;
    writeln!(out, "Most common start hour: {}", stats.most_common_hour)?;
    section_footer(out, stats.elapsed_seconds)
}

/// Renders the most-popular-stations section.
pub fn render_station_stats(out: &mut impl Write, stats: &StationStats) -> std::io::Result<()> {
    writeln!(out, "\nMost Popular Stations and Trip\n")?;
    writeln!(
        out,
        "Most commonly used start station: {}",
        stats.most_common_start_station
    )?;
    writeln!(
        out,
        "Most commonly used end station: {}",
        stats.most_common_end_station
    )?;
    writeln!(
        out,
        "Most frequent trip (start station -> end station): {}",
        stats.most_common_trip
    )?;
    section_footer(out, stats.elapsed_seconds)
}

/// Renders the trip-duration section.
pub fn render_duration_stats(out: &mut impl Write, stats: &DurationStats) -> std::io::Result<()> {
    writeln!(out, "\nTrip Duration\n")?;
    writeln!(out, "Total travel time: {} seconds", stats.total_secs)?;
    writeln!(out, "Mean travel time: {:.2} seconds", stats.mean_secs)?;
    section_footer(out, stats.elapsed_seconds)
}

/// Renders the user-demographics section. The gender and birth-year
/// sub-reports degrade to a "no data available" line independently.
pub fn render_user_stats(out: &mut impl Write, stats: &UserStats) -> std::io::Result<()> {
    writeln!(out, "\nUser Stats\n")?;

    writeln!(out, "Counts by user type:")?;
    for (user_type, count) in &stats.user_types {
        writeln!(out, "  {user_type}: {count}")?;
    }

    match &stats.genders {
        Some(genders) => {
            writeln!(out, "\nCounts by gender:")?;
            for (gender, count) in genders {
                writeln!(out, "  {gender}: {count}")?;
            }
        }
        None => writeln!(out, "\nNo gender data available")?,
    }

    match &stats.birth_years {
        Some(years) => {
            writeln!(out, "\nEarliest year of birth: {}", years.earliest)?;
            writeln!(out, "Most recent year of birth: {}", years.most_recent)?;
            writeln!(out, "Most common year of birth: {}", years.most_common)?;
        }
        None => writeln!(out, "\nNo year of birth data available")?,
    }

    section_footer(out, stats.elapsed_seconds)
}

/// Renders all four report sections in the order the interactive flow shows
/// them.
pub fn render_report(out: &mut impl Write, report: &Report) -> std::io::Result<()> {
    render_time_stats(out, &report.time)?;
    render_station_stats(out, &report.stations)?;
    render_duration_stats(out, &report.durations)?;
    render_user_stats(out, &report.users)
}

/// Writes the whole report as pretty-printed JSON.
pub fn render_report_json(out: &mut impl Write, report: &Report) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Renders one page of raw records as a table.
pub fn render_page(out: &mut impl Write, records: &[TripRecord]) -> std::io::Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "Start Time",
        "End Time",
        "Start Station",
        "End Station",
        "Duration (s)",
        "User Type",
        "Gender",
        "Birth Year",
    ]);

    for record in records {
        table.add_row(vec![
            record.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            record
                .end_time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            record.start_station.clone(),
            record.end_station.clone(),
            record.duration_secs.to_string(),
            record.user_type.clone(),
            record.gender.clone().unwrap_or_default(),
            record
                .birth_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
        ]);
    }

    writeln!(out, "{table}")
}
