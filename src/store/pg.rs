/// PostgreSQL backend for deployments that load the dataset into a server.
///
/// Column types vary between loads (TEXT or DATE for `date`, REAL or NUMERIC
/// for the readings), so every query casts: dates to TEXT, which renders
/// `YYYY-MM-DD` under the default ISO DateStyle, and readings to NUMERIC,
/// which comes back as `rust_decimal::Decimal`.

use postgres::{Client, NoTls};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{ClimateStore, StoreError};
use crate::model::{TemperatureObservation, TemperatureStats};

/// `ClimateStore` over a blocking PostgreSQL client.
pub struct PgClimateStore {
    client: Client,
}

impl PgClimateStore {
    pub fn connect(db_url: &str) -> Result<Self, postgres::Error> {
        let client = Client::connect(db_url, NoTls)?;
        Ok(Self { client })
    }

    /// Names of `tables` not visible on the current search path.
    pub fn missing_tables(&mut self, tables: &[&str]) -> Result<Vec<String>, postgres::Error> {
        let mut missing = Vec::new();
        for table in tables {
            let row = self.client.query_one(
                "SELECT EXISTS(
                    SELECT 1 FROM information_schema.tables
                    WHERE table_name = $1
                      AND table_schema = ANY(current_schemas(false))
                 )",
                &[table],
            )?;
            let exists: bool = row.get(0);
            if !exists {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }
}

fn to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

impl ClimateStore for PgClimateStore {
    fn latest_date(&mut self) -> Result<Option<String>, StoreError> {
        let row = self
            .client
            .query_one("SELECT MAX(CAST(date AS TEXT)) FROM measurement", &[])?;
        Ok(row.get(0))
    }

    fn precipitation_since(&mut self, since: &str) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        let rows = self.client.query(
            "SELECT CAST(date AS TEXT) AS day, CAST(prcp AS NUMERIC)
             FROM measurement
             WHERE CAST(date AS TEXT) >= $1
             ORDER BY day, station",
            &[&since],
        )?;

        Ok(rows
            .iter()
            .map(|row| {
                let date: String = row.get(0);
                let prcp: Option<Decimal> = row.get(1);
                (date, to_f64(prcp))
            })
            .collect())
    }

    fn station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        let rows = self
            .client
            .query("SELECT DISTINCT station FROM station ORDER BY station", &[])?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        let row = self.client.query_opt(
            "SELECT station FROM measurement
             GROUP BY station
             ORDER BY COUNT(*) DESC, station ASC
             LIMIT 1",
            &[],
        )?;
        Ok(row.map(|r| r.get(0)))
    }

    fn temperatures_since(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError> {
        let rows = self.client.query(
            "SELECT CAST(date AS TEXT) AS day, CAST(tobs AS NUMERIC)
             FROM measurement
             WHERE station = $1 AND CAST(date AS TEXT) >= $2 AND tobs IS NOT NULL
             ORDER BY day",
            &[&station, &since],
        )?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let date: String = row.get(0);
                let tobs: Option<Decimal> = row.get(1);
                to_f64(tobs).map(|t| (date, t))
            })
            .collect())
    }

    fn temperature_stats(&mut self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError> {
        let row = self.client.query_one(
            "SELECT MIN(CAST(tobs AS NUMERIC)),
                    AVG(CAST(tobs AS NUMERIC)),
                    MAX(CAST(tobs AS NUMERIC))
             FROM measurement
             WHERE CAST(date AS TEXT) >= $1
               AND ($2::text IS NULL OR CAST(date AS TEXT) <= $2::text)",
            &[&start, &end],
        )?;

        Ok(TemperatureStats {
            min: to_f64(row.get(0)),
            avg: to_f64(row.get(1)),
            max: to_f64(row.get(2)),
        })
    }

    fn measurement_count(&mut self) -> Result<i64, StoreError> {
        let row = self.client.query_one("SELECT COUNT(*) FROM measurement", &[])?;
        Ok(row.get(0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
