use chrono::{Duration, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::WeatherError;
use crate::models::{ForecastRecord, LocationRecord, NewForecast, NewLocation};

/// Durable storage for forecast and location records. The reconciliation
/// core talks only to this trait; `PgStore` is the production realization.
pub trait RecordStore {
    /// Records whose date falls in `[start, end]`, optionally filtered by
    /// location, ascending by date.
    async fn query_forecasts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<Vec<ForecastRecord>, WeatherError>;

    /// Persists the batch as one atomic unit and returns the stored rows
    /// with assigned ids.
    async fn insert_forecasts(
        &self,
        batch: Vec<NewForecast>,
    ) -> Result<Vec<ForecastRecord>, WeatherError>;

    async fn find_location(&self, id: Uuid) -> Result<Option<LocationRecord>, WeatherError>;

    async fn find_location_by_name(
        &self,
        name: &str,
    ) -> Result<Option<LocationRecord>, WeatherError>;

    /// Fails with `WeatherError::Conflict` on a `(name, country)` collision.
    async fn insert_location(
        &self,
        location: NewLocation,
    ) -> Result<LocationRecord, WeatherError>;

    async fn location_exists(&self, id: Uuid) -> Result<bool, WeatherError>;

    async fn list_locations(&self) -> Result<Vec<LocationRecord>, WeatherError>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_db(&self) -> Result<(), WeatherError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Idempotent sample data: two resolved locations and two forecasts
    /// in the upcoming window.
    pub async fn seed(&self) -> Result<(), WeatherError> {
        let locations = vec![
            ("Stockholm", "Sweden", 59.3293, 18.0686),
            ("Lisbon", "Portugal", 38.7223, -9.1393),
        ];

        let mut ids = Vec::new();
        for (name, country, latitude, longitude) in locations {
            let stored: Uuid = sqlx::query(
                r#"
                INSERT INTO weatherapp.locations (id, name, country, latitude, longitude)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (name, country) DO UPDATE
                SET latitude = EXCLUDED.latitude, longitude = EXCLUDED.longitude
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(country)
            .bind(latitude)
            .bind(longitude)
            .fetch_one(&self.pool)
            .await?
            .get("id");
            ids.push(stored);
        }

        let today = Utc::now().date_naive();
        let forecasts = vec![
            (today, 14, "Cool", "Observed morning reading", ids[0]),
            (today + Duration::days(2), 27, "Warm", "Station report", ids[1]),
        ];

        for (date, temperature_c, summary, description, location_id) in forecasts {
            sqlx::query(
                r#"
                INSERT INTO weatherapp.forecasts
                (id, date, temperature_c, summary, description, created_by, location_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (location_id, date) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(date)
            .bind(temperature_c)
            .bind(summary)
            .bind(description)
            .bind("seed")
            .bind(location_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

fn forecast_from_row(row: &PgRow) -> ForecastRecord {
    ForecastRecord {
        id: row.get("id"),
        date: row.get("date"),
        temperature_c: row.get("temperature_c"),
        summary: row.get("summary"),
        description: row.get("description"),
        created_by: row.get("created_by"),
        location_id: row.get("location_id"),
        created_at: row.get("created_at"),
    }
}

fn location_from_row(row: &PgRow) -> LocationRecord {
    LocationRecord {
        id: row.get("id"),
        name: row.get("name"),
        country: row.get("country"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        created_at: row.get("created_at"),
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> WeatherError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return WeatherError::Conflict(format!("{what} already exists"));
        }
    }
    WeatherError::Store(err)
}

impl RecordStore for PgStore {
    async fn query_forecasts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        let mut query = String::from(
            "SELECT id, date, temperature_c, summary, description, created_by, \
             location_id, created_at \
             FROM weatherapp.forecasts \
             WHERE date >= $1 AND date <= $2",
        );
        if location_id.is_some() {
            query.push_str(" AND location_id = $3");
        }
        query.push_str(" ORDER BY date ASC");

        let mut rows = sqlx::query(&query).bind(start).bind(end);
        if let Some(id) = location_id {
            rows = rows.bind(id);
        }

        let records = rows.fetch_all(&self.pool).await?;
        Ok(records.iter().map(forecast_from_row).collect())
    }

    async fn insert_forecasts(
        &self,
        batch: Vec<NewForecast>,
    ) -> Result<Vec<ForecastRecord>, WeatherError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(batch.len());

        for forecast in batch {
            let row = sqlx::query(
                r#"
                INSERT INTO weatherapp.forecasts
                (id, date, temperature_c, summary, description, created_by, location_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, date, temperature_c, summary, description, created_by,
                          location_id, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(forecast.date)
            .bind(forecast.temperature_c)
            .bind(&forecast.summary)
            .bind(&forecast.description)
            .bind(&forecast.created_by)
            .bind(forecast.location_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, "forecast for (location, date)"))?;
            stored.push(forecast_from_row(&row));
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<LocationRecord>, WeatherError> {
        let row = sqlx::query(
            "SELECT id, name, country, latitude, longitude, created_at \
             FROM weatherapp.locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(location_from_row))
    }

    async fn find_location_by_name(
        &self,
        name: &str,
    ) -> Result<Option<LocationRecord>, WeatherError> {
        let row = sqlx::query(
            "SELECT id, name, country, latitude, longitude, created_at \
             FROM weatherapp.locations WHERE name = $1 \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(location_from_row))
    }

    async fn insert_location(
        &self,
        location: NewLocation,
    ) -> Result<LocationRecord, WeatherError> {
        let row = sqlx::query(
            r#"
            INSERT INTO weatherapp.locations (id, name, country, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, country, latitude, longitude, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&location.name)
        .bind(&location.country)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                &format!("location ({}, {})", location.name, location.country),
            )
        })?;
        Ok(location_from_row(&row))
    }

    async fn location_exists(&self, id: Uuid) -> Result<bool, WeatherError> {
        let row = sqlx::query("SELECT 1 AS one FROM weatherapp.locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn list_locations(&self) -> Result<Vec<LocationRecord>, WeatherError> {
        let rows = sqlx::query(
            "SELECT id, name, country, latitude, longitude, created_at \
             FROM weatherapp.locations ORDER BY name, country",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(location_from_row).collect())
    }
}
