/// Query layer: one function per API route.
///
/// Each function takes the store by `&mut dyn ClimateStore` and returns the
/// value that gets serialized as the response body. "Latest date" and "most
/// active station" are recomputed on every call; nothing is cached.
///
/// An empty `measurement` table is not an error: the collection routes
/// answer with `{}` / `[]` and the statistics route with all-null fields.

use chrono::NaiveDate;

use crate::config::QueryConfig;
use crate::error::ApiError;
use crate::model::{self, DateWindow, PrecipitationByDate, TemperatureObservation, TemperatureStats};
use crate::store::ClimateStore;

// ---------------------------------------------------------------------------
// Observation window
// ---------------------------------------------------------------------------

/// The trailing window `[latest - lookback_days, latest]`, or `None` when
/// there are no measurements.
pub fn observation_window(
    store: &mut dyn ClimateStore,
    config: &QueryConfig,
) -> Result<Option<DateWindow>, ApiError> {
    let Some(latest) = store.latest_date()? else {
        return Ok(None);
    };
    let last_date = model::parse_date(&latest).ok_or(ApiError::CorruptDate(latest))?;
    let window = DateWindow::ending_at(last_date, config.lookback_days).ok_or(
        ApiError::WindowOutOfRange {
            lookback_days: config.lookback_days,
        },
    )?;
    Ok(Some(window))
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// `/api/v1.0/precipitation`: date → prcp over the trailing window.
///
/// When several stations report on the same date the last row wins. Rows
/// arrive ordered by (date, station), so the surviving value is the one from
/// the highest station identifier, including a NULL reading.
pub fn precipitation(
    store: &mut dyn ClimateStore,
    config: &QueryConfig,
) -> Result<PrecipitationByDate, ApiError> {
    let Some(window) = observation_window(store, config)? else {
        return Ok(PrecipitationByDate::new());
    };

    let mut by_date = PrecipitationByDate::new();
    for (date, prcp) in store.precipitation_since(&window.start_key())? {
        by_date.insert(date, prcp);
    }
    Ok(by_date)
}

/// `/api/v1.0/stations`: distinct station identifiers, ascending.
pub fn stations(store: &mut dyn ClimateStore) -> Result<Vec<String>, ApiError> {
    Ok(store.station_ids()?)
}

/// `/api/v1.0/tobs`: (date, tobs) for the most active station over the
/// trailing window, ascending by date.
pub fn most_active_temperatures(
    store: &mut dyn ClimateStore,
    config: &QueryConfig,
) -> Result<Vec<TemperatureObservation>, ApiError> {
    let Some(station) = store.most_active_station()? else {
        return Ok(Vec::new());
    };
    let Some(window) = observation_window(store, config)? else {
        return Ok(Vec::new());
    };

    log::debug!("most active station: {} (since {})", station, window.start_key());
    Ok(store.temperatures_since(&station, &window.start_key())?)
}

/// `/api/v1.0/<start>[/<end>]`: TMIN/TAVG/TMAX over the date range.
///
/// Both bounds must be `YYYY-MM-DD`. A range with no rows, including
/// `start > end`, yields all-null statistics.
pub fn temperature_stats(
    store: &mut dyn ClimateStore,
    start: &str,
    end: Option<&str>,
) -> Result<TemperatureStats, ApiError> {
    let start = validate_date(start)?;
    let end = end.map(validate_date).transpose()?;

    let start_key = model::format_date(start);
    let end_key = end.map(model::format_date);
    Ok(store.temperature_stats(&start_key, end_key.as_deref())?)
}

fn validate_date(value: &str) -> Result<NaiveDate, ApiError> {
    model::parse_date(value).ok_or_else(|| ApiError::InvalidDateFormat {
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
