/// Read-only access to the climate dataset.
///
/// Each backend answers the same handful of primitive queries; the route
/// logic in `queries` is written once against `ClimateStore`.
///
/// Submodules:
/// - `sqlite` — the dataset as distributed (`hawaii.sqlite`)
/// - `pg`     — the same tables loaded into PostgreSQL

pub mod pg;
pub mod sqlite;

pub use self::pg::PgClimateStore;
pub use self::sqlite::SqliteClimateStore;

use crate::model::{TemperatureObservation, TemperatureStats};
use std::sync::{Arc, Mutex};

/// Tables the service reads. Checked at startup.
pub const REQUIRED_TABLES: &[&str] = &["measurement", "station"];

/// Errors raised while querying a backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("PostgreSQL query failed: {0}")]
    Postgres(#[from] postgres::Error),
    #[error("SQLite query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Primitive read queries over `measurement` and `station`.
///
/// Dates are passed and returned as `YYYY-MM-DD` strings; both backends
/// compare them lexicographically, which matches calendar order for that
/// format.
pub trait ClimateStore {
    /// MAX(measurement.date), or `None` when the table is empty.
    fn latest_date(&mut self) -> Result<Option<String>, StoreError>;

    /// (date, prcp) for every row with `date >= since`, ordered by date and
    /// then station identifier.
    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>, StoreError>;

    /// Distinct station identifiers from the `station` table, ascending.
    fn station_ids(&mut self) -> Result<Vec<String>, StoreError>;

    /// Station with the most measurement rows; ties go to the lowest
    /// identifier. `None` when the table is empty.
    fn most_active_station(&mut self) -> Result<Option<String>, StoreError>;

    /// (date, tobs) for one station with `date >= since`, ordered by date.
    fn temperatures_since(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError>;

    /// MIN/AVG/MAX of tobs over `start <= date [<= end]`.
    fn temperature_stats(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError>;

    /// Total number of measurement rows.
    fn measurement_count(&mut self) -> Result<i64, StoreError>;
}

/// The single long-lived connection shared by every request.
pub type SharedStore = Arc<Mutex<Box<dyn ClimateStore + Send>>>;

pub fn share(store: Box<dyn ClimateStore + Send>) -> SharedStore {
    Arc::new(Mutex::new(store))
}
