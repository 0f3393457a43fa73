//! Dataset summary
//!
//! Connects with the same configuration as the server and prints what the
//! API would compute: latest date, trailing window, most active station and
//! table sizes. Handy for checking a new copy of the dataset before serving
//! it.
//!
//! Usage:
//!   cargo run --bin dataset_summary [-- --config PATH]
//!
//! Environment:
//!   DATABASE_URL - overrides [database].url from the config file

use climate_api::config::{self, DEFAULT_CONFIG_PATH};
use climate_api::store::ClimateStore;
use climate_api::{db, queries};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = env_logger::Env::default().default_filter_or("warn");
    env_logger::init_from_env(log_env);

    println!("🌦  Climate Dataset Summary");
    println!("==========================\n");

    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = config::load_with_env(&config_path)?;

    println!("📊 Opening dataset...");
    let mut store = db::open_store(&config.database.url).unwrap_or_else(|e| {
        eprintln!("\n{}\n", e);
        std::process::exit(1);
    });
    println!("✓ Connected\n");

    let rows = store.measurement_count()?;
    let stations = queries::stations(store.as_mut())?;
    println!("Measurements:        {}", rows);
    println!("Stations:            {}", stations.len());

    match queries::observation_window(store.as_mut(), &config.query)? {
        Some(window) => {
            println!("Latest date:         {}", window.end);
            println!(
                "Window ({} days):   {} .. {}",
                config.query.lookback_days, window.start, window.end
            );
        }
        None => {
            println!("\nℹ️  measurement table is empty; all routes will return empty results.");
            return Ok(());
        }
    }

    let observations = queries::most_active_temperatures(store.as_mut(), &config.query)?;
    if let Some(station) = store.most_active_station()? {
        println!("Most active station: {} ({} observations in window)", station, observations.len());
    }

    let precipitation = queries::precipitation(store.as_mut(), &config.query)?;
    let missing = precipitation.values().filter(|p| p.is_none()).count();
    println!(
        "Precipitation days:  {} ({} without a reading)",
        precipitation.len(),
        missing
    );

    Ok(())
}
