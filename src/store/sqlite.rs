//! SQLite backend: the dataset in the form it is distributed.
//!
//! The file is opened read-only; nothing in the service writes to it.

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::Path;

use super::{ClimateStore, StoreError};
use crate::model::{TemperatureObservation, TemperatureStats};

/// `ClimateStore` over a rusqlite connection.
pub struct SqliteClimateStore {
    conn: Connection,
}

impl SqliteClimateStore {
    /// Open an existing dataset file without write access.
    pub fn open_read_only(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Wrap a connection the caller already set up (used by tests and
    /// tooling that build a dataset in memory).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Names of `tables` that do not exist in the database.
    pub fn missing_tables(&self, tables: &[&str]) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let mut missing = Vec::new();
        for table in tables {
            if !stmt.exists(params![table])? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }
}

impl ClimateStore for SqliteClimateStore {
    fn latest_date(&mut self) -> Result<Option<String>, StoreError> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(date) FROM measurement", [], |row| row.get(0))?;
        Ok(latest)
    }

    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, prcp FROM measurement \
             WHERE date >= ?1 \
             ORDER BY date, station",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT station FROM station ORDER BY station")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        let station = self
            .conn
            .query_row(
                "SELECT station FROM measurement \
                 GROUP BY station \
                 ORDER BY COUNT(*) DESC, station ASC \
                 LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(station)
    }

    fn temperatures_since(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, tobs FROM measurement \
             WHERE station = ?1 AND date >= ?2 AND tobs IS NOT NULL \
             ORDER BY date",
        )?;
        let rows = stmt.query_map(params![station, since], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn temperature_stats(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError> {
        // `?2 IS NULL` lets one statement serve both the open and closed range
        let stats = self.conn.query_row(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement \
             WHERE date >= ?1 AND (?2 IS NULL OR date <= ?2)",
            params![start, end],
            |row| {
                Ok(TemperatureStats {
                    min: row.get(0)?,
                    avg: row.get(1)?,
                    max: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn measurement_count(&mut self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM measurement", [], |row| row.get::<_, i64>(0))?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_latest_date_is_max_over_all_stations() {
        let mut store = fixtures::hawaii_store();
        assert_eq!(store.latest_date().unwrap().as_deref(), Some("2017-08-23"));
    }

    #[test]
    fn test_latest_date_is_none_for_empty_table() {
        let mut store = fixtures::empty_store();
        assert_eq!(store.latest_date().unwrap(), None);
        assert_eq!(store.most_active_station().unwrap(), None);
        assert_eq!(store.measurement_count().unwrap(), 0);
    }

    #[test]
    fn test_precipitation_since_is_inclusive_and_ordered() {
        let mut store = fixtures::hawaii_store();
        let rows = store.precipitation_since("2016-08-23").unwrap();

        assert!(!rows.is_empty());
        assert!(rows.iter().all(|(date, _)| date.as_str() >= "2016-08-23"));
        assert!(rows.iter().any(|(date, _)| date == "2016-08-23"), "boundary date must be included");

        let dates: Vec<&str> = rows.iter().map(|(d, _)| d.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_precipitation_keeps_null_values() {
        let mut store = fixtures::hawaii_store();
        let rows = store.precipitation_since("2017-08-23").unwrap();
        assert!(rows.iter().any(|(_, prcp)| prcp.is_none()));
    }

    #[test]
    fn test_station_ids_are_distinct_and_sorted() {
        let mut store = fixtures::hawaii_store();
        let ids = store.station_ids().unwrap();
        assert_eq!(ids, vec!["USC00513117", "USC00519281", "USC00519397"]);
    }

    #[test]
    fn test_most_active_station_counts_rows() {
        let mut store = fixtures::hawaii_store();
        assert_eq!(store.most_active_station().unwrap().as_deref(), Some("USC00519281"));
    }

    #[test]
    fn test_most_active_station_tie_goes_to_lowest_id() {
        let mut store = fixtures::store_with_rows(&[
            ("2017-01-01", "ZZZ", Some(0.1), 70.0),
            ("2017-01-02", "ZZZ", Some(0.1), 71.0),
            ("2017-01-01", "AAA", Some(0.2), 72.0),
            ("2017-01-02", "AAA", Some(0.2), 73.0),
        ]);
        assert_eq!(store.most_active_station().unwrap().as_deref(), Some("AAA"));
    }

    #[test]
    fn test_temperatures_since_filters_station_and_date() {
        let mut store = fixtures::hawaii_store();
        let rows = store.temperatures_since("USC00519397", "2017-08-22").unwrap();
        assert_eq!(
            rows,
            vec![("2017-08-22".to_string(), 82.0), ("2017-08-23".to_string(), 81.0)]
        );
    }

    #[test]
    fn test_temperature_stats_open_and_closed_ranges() {
        let mut store = fixtures::store_with_rows(&[
            ("2017-01-01", "A", None, 60.0),
            ("2017-01-02", "A", None, 70.0),
            ("2017-01-03", "A", None, 80.0),
        ]);

        let open = store.temperature_stats("2017-01-02", None).unwrap();
        assert_eq!(open, TemperatureStats { min: Some(70.0), avg: Some(75.0), max: Some(80.0) });

        let closed = store.temperature_stats("2017-01-01", Some("2017-01-02")).unwrap();
        assert_eq!(closed, TemperatureStats { min: Some(60.0), avg: Some(65.0), max: Some(70.0) });

        let none = store.temperature_stats("2018-01-01", None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_missing_tables_reports_absent_names() {
        let store = SqliteClimateStore::from_connection(Connection::open_in_memory().unwrap());
        let missing = store.missing_tables(&["measurement", "station"]).unwrap();
        assert_eq!(missing, vec!["measurement", "station"]);

        let store = fixtures::hawaii_store();
        assert!(store.missing_tables(&["measurement", "station"]).unwrap().is_empty());
    }
}
