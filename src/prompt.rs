//! Interactive prompts for the explore flow.
//!
//! Thin wrappers around `dialoguer` that keep re-prompting until a token
//! resolves; all validation lives in [`filters`].

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};

use bikeshare_explorer::filters::{self, FilterParams, SelectionError};

fn read_until<T>(
    prompt_text: &str,
    parse: impl Fn(&str) -> Result<T, SelectionError>,
) -> Result<T> {
    loop {
        let token: String = Input::new()
            .with_prompt(prompt_text)
            .interact_text()
            .context("failed to read input")?;

        match parse(&token) {
            Ok(value) => return Ok(value),
            Err(e) => println!("Invalid option, try again ({e})"),
        }
    }
}

/// Asks for a city, month, and day, re-prompting until all three resolve.
pub fn get_filters() -> Result<FilterParams> {
    let city_options = filters::cities()
        .map(|c| c.key)
        .collect::<Vec<_>>()
        .join(", ");
    let city = read_until(
        &format!("City to analyze ({city_options})"),
        filters::resolve_city,
    )?;

    let month_options = filters::month_tokens().collect::<Vec<_>>().join(", ");
    let month = read_until(
        &format!("Month to filter by ({month_options})"),
        filters::resolve_month,
    )?;

    let day_options = filters::weekday_tokens().collect::<Vec<_>>().join(", ");
    let day = read_until(
        &format!("Day of the week to filter by ({day_options})"),
        filters::resolve_weekday,
    )?;

    Ok(FilterParams { city, month, day })
}

/// A yes/no question, defaulting to no.
pub fn confirm(text: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(text)
        .default(false)
        .interact()
        .context("failed to read confirmation")
}
