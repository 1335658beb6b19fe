use std::ops::Range;

use chrono::NaiveDate;
use rand::Rng;
use uuid::Uuid;

use crate::models::NewForecast;

/// Fixed summary labels, coldest to hottest.
pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

/// Attribution marker stamped on generated rows.
pub const SYSTEM_CREATED_BY: &str = "System";

/// Half-open temperature range for synthetic draws, well inside the
/// entity-level [-100, 100] domain.
pub const SYNTH_TEMPERATURE_RANGE: Range<i32> = -20..55;

/// Source of temperature and summary values for a synthetic day. Injected
/// so tests can substitute a deterministic stub.
pub trait SummaryGenerator {
    fn temperature_c(&mut self) -> i32;
    fn summary(&mut self) -> &'static str;
}

/// Uniform draws from the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomSummaryGenerator;

impl SummaryGenerator for RandomSummaryGenerator {
    fn temperature_c(&mut self) -> i32 {
        rand::thread_rng().gen_range(SYNTH_TEMPERATURE_RANGE)
    }

    fn summary(&mut self) -> &'static str {
        SUMMARIES[rand::thread_rng().gen_range(0..SUMMARIES.len())]
    }
}

/// One synthetic forecast for a missing day, anchored to `location_id`.
/// `location_name` is embedded in the description only for location-scoped
/// windows.
pub fn synthetic_forecast(
    source: &mut impl SummaryGenerator,
    date: NaiveDate,
    location_id: Uuid,
    location_name: Option<&str>,
) -> NewForecast {
    let description = match location_name {
        Some(name) => format!("Generated forecast for {date} ({name})"),
        None => format!("Generated forecast for {date}"),
    };
    NewForecast {
        date,
        temperature_c: source.temperature_c(),
        summary: source.summary().to_string(),
        description: Some(description),
        created_by: Some(SYSTEM_CREATED_BY.to_string()),
        location_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_draws_stay_in_domain() {
        let mut source = RandomSummaryGenerator;
        for _ in 0..200 {
            let temperature = source.temperature_c();
            assert!(SYNTH_TEMPERATURE_RANGE.contains(&temperature));
            assert!(SUMMARIES.contains(&source.summary()));
        }
    }

    #[test]
    fn description_embeds_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let forecast =
            synthetic_forecast(&mut RandomSummaryGenerator, date, Uuid::new_v4(), None);
        assert_eq!(
            forecast.description.as_deref(),
            Some("Generated forecast for 2026-08-30")
        );
        assert_eq!(forecast.created_by.as_deref(), Some(SYSTEM_CREATED_BY));
        assert!(forecast.validate().is_ok());
    }

    #[test]
    fn description_names_location_when_scoped() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let forecast = synthetic_forecast(
            &mut RandomSummaryGenerator,
            date,
            Uuid::new_v4(),
            Some("Lisbon"),
        );
        assert_eq!(
            forecast.description.as_deref(),
            Some("Generated forecast for 2026-09-01 (Lisbon)")
        );
    }
}
