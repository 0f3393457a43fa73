/// Test fixtures: small in-memory copies of the Hawaii climate dataset.
///
/// The schema mirrors `hawaii.sqlite`. `hawaii_store()` holds three
/// stations with these properties the tests rely on:
///
/// - latest date is 2017-08-23
/// - USC00519281 has the most rows (6)
/// - 2016-08-22 and 2010-01-01 fall outside the 365-day window
/// - 2016-08-23 and 2017-08-23 carry readings from several stations
/// - the station table lists USC00519397 twice
///
/// Only compiled for tests.

use rusqlite::{Connection, params};

use crate::store::SqliteClimateStore;

/// (date, station, prcp, tobs)
pub type Row<'a> = (&'a str, &'a str, Option<f64>, f64);

const SCHEMA: &str = "
    CREATE TABLE measurement (
        id      INTEGER PRIMARY KEY,
        station TEXT,
        date    TEXT,
        prcp    FLOAT,
        tobs    FLOAT
    );
    CREATE TABLE station (
        id        INTEGER PRIMARY KEY,
        station   TEXT,
        name      TEXT,
        latitude  FLOAT,
        longitude FLOAT,
        elevation FLOAT
    );
";

pub const HAWAII_ROWS: &[Row<'static>] = &[
    ("2010-01-01", "USC00519281", Some(0.08), 65.0),
    ("2016-08-22", "USC00519281", Some(1.2), 77.0),
    ("2016-08-23", "USC00519281", Some(1.79), 77.0),
    ("2016-12-01", "USC00519281", Some(0.5), 70.0),
    ("2017-08-18", "USC00519281", Some(0.06), 79.0),
    ("2017-08-23", "USC00519281", Some(0.45), 82.0),
    ("2016-08-22", "USC00519397", Some(0.4), 79.0),
    ("2016-08-23", "USC00519397", Some(0.08), 81.0),
    ("2017-08-22", "USC00519397", Some(0.0), 82.0),
    ("2017-08-23", "USC00519397", Some(0.0), 81.0),
    ("2016-08-23", "USC00513117", Some(0.15), 76.0),
    ("2017-08-23", "USC00513117", None, 80.0),
];

pub const HAWAII_STATIONS: &[(&str, &str)] = &[
    ("USC00519397", "WAIKIKI 717.2, HI US"),
    ("USC00513117", "KANEOHE 838.1, HI US"),
    ("USC00519281", "WAIHEE 837.5, HI US"),
    ("USC00519397", "WAIKIKI 717.2, HI US"),
];

fn build(rows: &[Row<'_>], stations: &[(&str, &str)]) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    for (date, station, prcp, tobs) in rows {
        conn.execute(
            "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
            params![station, date, prcp, tobs],
        )
        .unwrap();
    }
    for (station, name) in stations {
        conn.execute(
            "INSERT INTO station (station, name, latitude, longitude, elevation)
             VALUES (?1, ?2, 21.3, -157.8, 3.0)",
            params![station, name],
        )
        .unwrap();
    }
    conn
}

pub fn hawaii_store() -> SqliteClimateStore {
    SqliteClimateStore::from_connection(build(HAWAII_ROWS, HAWAII_STATIONS))
}

pub fn empty_store() -> SqliteClimateStore {
    SqliteClimateStore::from_connection(build(&[], &[]))
}

/// Measurements only; the station table is left empty.
pub fn store_with_rows(rows: &[Row<'_>]) -> SqliteClimateStore {
    SqliteClimateStore::from_connection(build(rows, &[]))
}
