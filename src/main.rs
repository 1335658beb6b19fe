use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod error;
mod models;
mod reconcile;
mod store;
mod synth;
mod window;

use models::{NewForecast, NewLocation};
use reconcile::Reconciler;
use store::{PgStore, RecordStore};
use synth::RandomSummaryGenerator;

#[derive(Parser)]
#[command(name = "weather-forecast-reconciler")]
#[command(about = "Forecast window reconciliation and gap-fill over Postgres", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample locations and forecasts
    Seed,
    /// Reconcile an N-day forecast window starting today, generating
    /// records for any missing day
    Window {
        #[arg(long, default_value_t = 5)]
        days: i64,
        /// Scope the window to one location id
        #[arg(long)]
        location: Option<Uuid>,
        #[arg(long)]
        json: bool,
    },
    /// Record a real forecast for an existing location
    AddForecast {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, allow_hyphen_values = true)]
        temperature_c: i32,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
        #[arg(long)]
        location: Uuid,
    },
    /// Register a location
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<f64>,
    },
    /// List registered locations
    Locations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool);

    match cli.command {
        Commands::InitDb => {
            store.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            store.seed().await?;
            println!("Seed data inserted.");
        }
        Commands::Window {
            days,
            location,
            json,
        } => {
            let mut reconciler = Reconciler::new(store, RandomSummaryGenerator);
            let forecasts = match location {
                Some(id) => reconciler.window_for_location(id, days).await?,
                None => reconciler.window(days).await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&forecasts)?);
            } else if forecasts.is_empty() {
                println!("No forecasts for this window.");
            } else {
                for forecast in &forecasts {
                    println!(
                        "- {} {:>4}C {} ({})",
                        forecast.date,
                        forecast.temperature_c,
                        forecast.summary,
                        forecast.created_by.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
        Commands::AddForecast {
            date,
            temperature_c,
            summary,
            description,
            created_by,
            location,
        } => {
            let mut reconciler = Reconciler::new(store, RandomSummaryGenerator);
            let stored = reconciler
                .add_forecast(NewForecast {
                    date,
                    temperature_c,
                    summary,
                    description,
                    created_by,
                    location_id: location,
                })
                .await?;
            println!("Recorded forecast {} for {}.", stored.id, stored.date);
        }
        Commands::AddLocation {
            name,
            country,
            latitude,
            longitude,
        } => {
            let mut reconciler = Reconciler::new(store, RandomSummaryGenerator);
            let stored = reconciler
                .add_location(NewLocation {
                    name,
                    country,
                    latitude,
                    longitude,
                })
                .await?;
            println!(
                "Registered location {} ({}, {}).",
                stored.id, stored.name, stored.country
            );
        }
        Commands::Locations => {
            let locations = store.list_locations().await?;
            if locations.is_empty() {
                println!("No locations registered.");
            }
            for location in &locations {
                let coordinates = match (location.latitude, location.longitude) {
                    (Some(lat), Some(lon)) => format!(" at ({lat}, {lon})"),
                    _ => String::new(),
                };
                println!(
                    "- {} {}, {}{}",
                    location.id, location.name, location.country, coordinates
                );
            }
        }
    }

    Ok(())
}
