//! Shared helpers for integration tests: a synthetic dataset file and a
//! server bound to an ephemeral port.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDate};
use climate_api::config::QueryConfig;
use climate_api::endpoint::EndpointServer;
use climate_api::{db, store};
use rusqlite::{Connection, params};

pub const STATIONS: &[&str] = &["USC00511918", "USC00513117", "USC00519281", "USC00519397"];
pub const MOST_ACTIVE: &str = "USC00519281";
pub const LAST_DATE: &str = "2017-08-23";

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A dataset file in the temp directory, removed on drop.
pub struct Dataset {
    pub path: PathBuf,
}

impl Drop for Dataset {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Writes a dataset to a temp file.
///
/// Two years of daily readings ending 2017-08-23. USC00519281 reports
/// every day; the others skip days, so it is unambiguously the most active.
/// The station table repeats one identifier.
pub fn write_dataset() -> Dataset {
    let path = std::env::temp_dir().join(format!(
        "climate_api_it_{}_{}.sqlite",
        std::process::id(),
        NEXT_DB.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&path);
    let dataset = Dataset { path };

    let conn = Connection::open(&dataset.path).expect("create dataset file");
    conn.execute_batch(
        "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT, prcp FLOAT, tobs FLOAT);
         CREATE TABLE station (id INTEGER PRIMARY KEY, station TEXT, name TEXT,
                               latitude FLOAT, longitude FLOAT, elevation FLOAT);",
    )
    .unwrap();

    let last = NaiveDate::parse_from_str(LAST_DATE, "%Y-%m-%d").unwrap();
    for offset in 0..730i64 {
        let day = last - Duration::days(offset);
        let date = day.format("%Y-%m-%d").to_string();
        for (idx, station) in STATIONS.iter().enumerate() {
            let reports = *station == MOST_ACTIVE || offset % (idx as i64 + 2) == 0;
            if !reports {
                continue;
            }
            let prcp = if offset % 7 == 0 { None } else { Some((offset % 5) as f64 * 0.1) };
            let tobs = 60.0 + ((offset + idx as i64 * 3) % 25) as f64;
            conn.execute(
                "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
                params![station, date, prcp, tobs],
            )
            .unwrap();
        }
    }

    for station in STATIONS.iter().chain(std::iter::once(&"USC00519397")) {
        conn.execute(
            "INSERT INTO station (station, name, latitude, longitude, elevation)
             VALUES (?1, 'HONOLULU, HI US', 21.3, -157.8, 3.0)",
            params![station],
        )
        .unwrap();
    }

    dataset
}

/// Opens `path` through the normal startup path and serves it on
/// 127.0.0.1:0 in a background thread. Returns the base URL.
pub fn spawn_server(path: &Path) -> String {
    let climate_store = db::open_store(&format!("sqlite://{}", path.display()))
        .expect("dataset should open and validate");

    let server = EndpointServer::bind(
        "127.0.0.1:0",
        2,
        store::share(climate_store),
        QueryConfig::default(),
    )
    .expect("bind ephemeral port");
    let addr: SocketAddr = server.local_addr().expect("TCP listener");

    std::thread::spawn(move || server.run());
    format!("http://{}", addr)
}
