use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::WeatherError;
use crate::models::{ForecastRecord, LocationRecord, NewForecast, NewLocation};
use crate::store::RecordStore;
use crate::synth::{self, SummaryGenerator};
use crate::window;

pub const DEFAULT_LOCATION_NAME: &str = "Default";
pub const DEFAULT_LOCATION_COUNTRY: &str = "N/A";

/// Window reconciliation over a record store: returns a gap-free,
/// date-ordered forecast window, generating and persisting synthetic rows
/// for any missing day.
pub struct Reconciler<S, G> {
    store: S,
    summaries: G,
}

impl<S: RecordStore, G: SummaryGenerator> Reconciler<S, G> {
    pub fn new(store: S, summaries: G) -> Self {
        Self { store, summaries }
    }

    /// Reconciles the `days`-day window starting today. Generated rows are
    /// anchored to the default location.
    pub async fn window(&mut self, days: i64) -> Result<Vec<ForecastRecord>, WeatherError> {
        self.window_starting(Utc::now().date_naive(), days).await
    }

    pub async fn window_starting(
        &mut self,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        self.reconcile(today, days, None).await
    }

    /// As [`Self::window`] but scoped to one location: the existing-record
    /// query filters by it and generated rows anchor to it directly.
    /// Fails with `WeatherError::NotFound` for an unknown id.
    pub async fn window_for_location(
        &mut self,
        location_id: Uuid,
        days: i64,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        self.window_for_location_starting(Utc::now().date_naive(), location_id, days)
            .await
    }

    pub async fn window_for_location_starting(
        &mut self,
        today: NaiveDate,
        location_id: Uuid,
        days: i64,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        let location = self
            .store
            .find_location(location_id)
            .await?
            .ok_or_else(|| WeatherError::NotFound(format!("location {location_id}")))?;
        self.reconcile(today, days, Some(location)).await
    }

    async fn reconcile(
        &mut self,
        today: NaiveDate,
        days: i64,
        scope: Option<LocationRecord>,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        if days <= 0 {
            return Ok(Vec::new());
        }

        let end = today + Duration::days(days - 1);
        let scope_id = scope.as_ref().map(|l| l.id);
        let mut existing = self.store.query_forecasts(today, end, scope_id).await?;

        // Fast path: a fully backed window triggers no write, not even
        // default-location resolution.
        if existing.len() as i64 >= days {
            existing.truncate(days as usize);
            return Ok(existing);
        }

        let anchor = match scope {
            Some(location) => location,
            None => self.default_location().await?,
        };
        let scoped_name = scope_id.is_some().then(|| anchor.name.clone());

        let missing = days as usize - existing.len();
        let have: HashSet<NaiveDate> = existing.iter().map(|f| f.date).collect();
        let batch: Vec<NewForecast> = window::missing_dates(today, days, &have, missing)
            .into_iter()
            .map(|date| {
                synth::synthetic_forecast(
                    &mut self.summaries,
                    date,
                    anchor.id,
                    scoped_name.as_deref(),
                )
            })
            .collect();

        let generated = if batch.is_empty() {
            Vec::new()
        } else {
            self.store.insert_forecasts(batch).await?
        };
        if !generated.is_empty() {
            info!(count = generated.len(), location = %anchor.id, "generated synthetic forecasts");
        }

        existing.extend(generated);
        existing.sort_by_key(|f| f.date);
        Ok(existing)
    }

    /// The sentinel location anchoring unscoped synthetic rows. Looks up
    /// "Default" and creates it on first use; a create that loses the race
    /// to a concurrent caller re-reads the winner's row.
    pub async fn default_location(&mut self) -> Result<LocationRecord, WeatherError> {
        if let Some(location) = self
            .store
            .find_location_by_name(DEFAULT_LOCATION_NAME)
            .await?
        {
            return Ok(location);
        }

        let fresh = NewLocation {
            name: DEFAULT_LOCATION_NAME.to_string(),
            country: DEFAULT_LOCATION_COUNTRY.to_string(),
            latitude: None,
            longitude: None,
        };
        match self.store.insert_location(fresh).await {
            Ok(location) => {
                info!(id = %location.id, "created default location");
                Ok(location)
            }
            Err(WeatherError::Conflict(_)) => self
                .store
                .find_location_by_name(DEFAULT_LOCATION_NAME)
                .await?
                .ok_or_else(|| {
                    WeatherError::NotFound("default location after create conflict".to_string())
                }),
            Err(err) => Err(err),
        }
    }

    /// Persists a caller-submitted forecast. The location reference is
    /// validated before any write; no gap-fill is triggered.
    pub async fn add_forecast(
        &mut self,
        forecast: NewForecast,
    ) -> Result<ForecastRecord, WeatherError> {
        forecast.validate()?;
        if !self.store.location_exists(forecast.location_id).await? {
            return Err(WeatherError::Validation(format!(
                "location {} does not exist",
                forecast.location_id
            )));
        }

        let stored = self
            .store
            .insert_forecasts(vec![forecast])
            .await?
            .into_iter()
            .next()
            .ok_or(WeatherError::Store(sqlx::Error::RowNotFound))?;
        info!(date = %stored.date, location = %stored.location_id, "added forecast");
        Ok(stored)
    }

    /// Persists a caller-submitted location; `(name, country)` duplicates
    /// surface as `WeatherError::Conflict` from the store.
    pub async fn add_location(
        &mut self,
        location: NewLocation,
    ) -> Result<LocationRecord, WeatherError> {
        location.validate()?;
        let stored = self.store.insert_location(location).await?;
        info!(name = %stored.name, country = %stored.country, "added location");
        Ok(stored)
    }
}
