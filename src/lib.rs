/// climate_api: read-only HTTP API over the Hawaii climate dataset.
///
/// # Module structure
///
/// ```text
/// climate_api
/// ├── model     — shared types (TemperatureStats, DateWindow, date parsing)
/// ├── config    — service configuration loader (climate.toml + DATABASE_URL)
/// ├── db        — database URL parsing, store opening and table validation
/// ├── store
/// │   ├── sqlite — rusqlite backend (the dataset as distributed)
/// │   └── pg     — PostgreSQL backend
/// ├── queries   — one query function per API route
/// ├── error     — HTTP-facing error taxonomy
/// ├── endpoint  — routing, JSON replies, tiny_http server + worker pool
/// └── fixtures (test only) — in-memory copies of the dataset
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod queries;
pub mod store;

#[cfg(test)]
mod fixtures;
