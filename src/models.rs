use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WeatherError;

pub const TEMPERATURE_MIN_C: i32 = -100;
pub const TEMPERATURE_MAX_C: i32 = 100;

const MAX_SUMMARY_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 100;
const MAX_CREATED_BY_LEN: usize = 50;
const MAX_NAME_LEN: usize = 100;

/// A persisted forecast. Generated and caller-submitted rows share this
/// shape; only `created_by`/`description` hint at provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub summary: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub location_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A forecast awaiting insertion; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewForecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub summary: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub location_id: Uuid,
}

impl NewForecast {
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !(TEMPERATURE_MIN_C..=TEMPERATURE_MAX_C).contains(&self.temperature_c) {
            return Err(WeatherError::Validation(format!(
                "temperature {}C is outside [{TEMPERATURE_MIN_C}, {TEMPERATURE_MAX_C}]",
                self.temperature_c
            )));
        }
        if self.summary.is_empty() || self.summary.chars().count() > MAX_SUMMARY_LEN {
            return Err(WeatherError::Validation(format!(
                "summary must be non-empty and at most {MAX_SUMMARY_LEN} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(WeatherError::Validation(format!(
                    "description exceeds {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        if let Some(created_by) = &self.created_by {
            if created_by.chars().count() > MAX_CREATED_BY_LEN {
                return Err(WeatherError::Validation(format!(
                    "created_by exceeds {MAX_CREATED_BY_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// A persisted location. Forecasts reference it by `location_id`; the
/// back-reference is queried on demand, never embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A location awaiting insertion. Coordinates are optional so the sentinel
/// "Default" location can be created unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.name.is_empty() || self.name.chars().count() > MAX_NAME_LEN {
            return Err(WeatherError::Validation(format!(
                "name must be non-empty and at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.country.is_empty() || self.country.chars().count() > MAX_NAME_LEN {
            return Err(WeatherError::Validation(format!(
                "country must be non-empty and at most {MAX_NAME_LEN} characters"
            )));
        }
        if let Some(latitude) = self.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(WeatherError::Validation(format!(
                    "latitude {latitude} is outside [-90, 90]"
                )));
            }
        }
        if let Some(longitude) = self.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(WeatherError::Validation(format!(
                    "longitude {longitude} is outside [-180, 180]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forecast() -> NewForecast {
        NewForecast {
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            temperature_c: 21,
            summary: "Mild".to_string(),
            description: Some("clear morning".to_string()),
            created_by: Some("tester".to_string()),
            location_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn accepts_in_range_forecast() {
        assert!(sample_forecast().validate().is_ok());
    }

    #[test]
    fn rejects_temperature_outside_domain() {
        let mut forecast = sample_forecast();
        forecast.temperature_c = 101;
        assert!(matches!(
            forecast.validate(),
            Err(WeatherError::Validation(_))
        ));
        forecast.temperature_c = -101;
        assert!(forecast.validate().is_err());
    }

    #[test]
    fn rejects_empty_or_oversized_summary() {
        let mut forecast = sample_forecast();
        forecast.summary = String::new();
        assert!(forecast.validate().is_err());
        forecast.summary = "x".repeat(51);
        assert!(forecast.validate().is_err());
    }

    #[test]
    fn rejects_oversized_description() {
        let mut forecast = sample_forecast();
        forecast.description = Some("x".repeat(101));
        assert!(forecast.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut location = NewLocation {
            name: "Paris".to_string(),
            country: "France".to_string(),
            latitude: Some(48.8566),
            longitude: Some(2.3522),
        };
        assert!(location.validate().is_ok());

        location.latitude = Some(90.5);
        assert!(location.validate().is_err());
        location.latitude = None;
        location.longitude = Some(-180.5);
        assert!(location.validate().is_err());
    }

    #[test]
    fn rejects_blank_location_name() {
        let location = NewLocation {
            name: String::new(),
            country: "France".to_string(),
            latitude: None,
            longitude: None,
        };
        assert!(matches!(
            location.validate(),
            Err(WeatherError::Validation(_))
        ));
    }
}
