/// HTTP endpoint for the climate API
///
/// Endpoints (GET, and HEAD with the body dropped by tiny_http):
/// - GET /                          - HTML route index
/// - GET /health                    - Service health check
/// - GET /api/v1.0/precipitation    - date → precipitation, trailing year
/// - GET /api/v1.0/stations         - station identifiers
/// - GET /api/v1.0/tobs             - most active station's temperatures
/// - GET /api/v1.0/{start}          - TMIN/TAVG/TMAX from start
/// - GET /api/v1.0/{start}/{end}    - TMIN/TAVG/TMAX over [start, end]
///
/// Requests are accepted on the calling thread and answered on a fixed
/// worker pool. All workers share one store connection.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError};

use serde::Serialize;
use threadpool::ThreadPool;
use tiny_http::Method;

use crate::config::{QueryConfig, ServiceConfig};
use crate::error::ApiError;
use crate::queries;
use crate::store::{ClimateStore, SharedStore};

pub const API_PREFIX: &str = "/api/v1.0/";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
];

const INDEX_HTML: &str = "\
Welcome to the Climate API!<br/><br/>\
Available Routes:<br/>\
<a href='/api/v1.0/precipitation'>/api/v1.0/precipitation</a> - Precipitation data for the last 12 months.<br/>\
<a href='/api/v1.0/stations'>/api/v1.0/stations</a> - List of weather stations.<br/>\
<a href='/api/v1.0/tobs'>/api/v1.0/tobs</a> - Temperature observations of the most active station for the previous year.<br/>\
/api/v1.0/&lt;start&gt; - Temperature statistics (TMIN, TAVG, TMAX) from a start date (YYYY-MM-DD).<br/>\
/api/v1.0/&lt;start&gt;/&lt;end&gt; - Temperature statistics (TMIN, TAVG, TMAX) for a date range (YYYY-MM-DD).<br/>";

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TemperatureStats { start: String, end: Option<String> },
}

/// Maps a request path (query string already removed) to a route.
///
/// Path segments are percent-decoded; date validation happens later so a
/// bad date is a 400 rather than a 404.
pub fn route(path: &str) -> Option<Route> {
    match path {
        "/" => return Some(Route::Index),
        "/health" => return Some(Route::Health),
        _ => {}
    }

    let rest = path.strip_prefix(API_PREFIX)?;
    let segments: Vec<String> = rest.split('/').map(decode_segment).collect();
    if segments.iter().any(String::is_empty) {
        return None;
    }

    match segments.as_slice() {
        [single] => Some(match single.as_str() {
            "precipitation" => Route::Precipitation,
            "stations" => Route::Stations,
            "tobs" => Route::Tobs,
            _ => Route::TemperatureStats { start: single.clone(), end: None },
        }),
        [start, end] => Some(Route::TemperatureStats {
            start: start.clone(),
            end: Some(end.clone()),
        }),
        _ => None,
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(serde_json::Value),
    Html(&'static str),
}

/// Status and body of a response, before it is handed to tiny_http.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: ReplyBody,
}

impl Reply {
    fn ok_json<T: Serialize>(data: &T) -> Result<Self, ApiError> {
        Ok(Reply {
            status: 200,
            body: ReplyBody::Json(serde_json::to_value(data)?),
        })
    }

    fn from_error(err: &ApiError) -> Self {
        let mut body = err.to_json();
        if matches!(err, ApiError::NotFound { .. }) {
            body["available_endpoints"] = serde_json::json!(AVAILABLE_ENDPOINTS);
        }
        Reply {
            status: err.status_code(),
            body: ReplyBody::Json(body),
        }
    }

    fn into_response(self) -> tiny_http::Response<Cursor<Vec<u8>>> {
        let (content_type, bytes) = match self.body {
            ReplyBody::Json(json) => ("application/json", format!("{:#}", json).into_bytes()),
            ReplyBody::Html(html) => ("text/html; charset=utf-8", html.as_bytes().to_vec()),
        };

        let mut response = tiny_http::Response::from_data(bytes)
            .with_status_code(tiny_http::StatusCode::from(self.status));
        if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
            response.add_header(header);
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Route a request and produce its reply. Never fails: errors become
/// error replies, and internal ones are logged with their detail.
pub fn dispatch(method: &Method, url: &str, store: &SharedStore, config: &QueryConfig) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    let result = match route(path) {
        None => Err(ApiError::NotFound { path: path.to_string() }),
        Some(_) if !matches!(method, Method::Get | Method::Head) => Err(ApiError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
        }),
        Some(route) => handle_route(route, store, config),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            if e.is_internal() {
                log::error!("{} {} failed: {}", method, path, e);
            }
            Reply::from_error(&e)
        }
    }
}

fn handle_route(route: Route, store: &SharedStore, config: &QueryConfig) -> Result<Reply, ApiError> {
    match route {
        Route::Index => Ok(Reply {
            status: 200,
            body: ReplyBody::Html(INDEX_HTML),
        }),
        Route::Health => Reply::ok_json(&serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Route::Precipitation => Reply::ok_json(&with_store(store, |s| queries::precipitation(s, config))?),
        Route::Stations => Reply::ok_json(&with_store(store, queries::stations)?),
        Route::Tobs => Reply::ok_json(&with_store(store, |s| queries::most_active_temperatures(s, config))?),
        Route::TemperatureStats { start, end } => Reply::ok_json(&with_store(store, |s| {
            queries::temperature_stats(s, &start, end.as_deref())
        })?),
    }
}

/// Run `f` while holding the shared store.
///
/// The store is read-only, so a request that panicked while holding the
/// lock cannot leave it half-written; the poison flag is ignored.
fn with_store<T>(
    store: &SharedStore,
    f: impl FnOnce(&mut dyn ClimateStore) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut **guard)
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// A bound listener plus the worker pool that answers it.
pub struct EndpointServer {
    server: tiny_http::Server,
    pool: ThreadPool,
    store: SharedStore,
    config: QueryConfig,
}

impl EndpointServer {
    /// Bind `addr` (port 0 picks a free port).
    pub fn bind(addr: &str, workers: usize, store: SharedStore, config: QueryConfig) -> Result<Self, String> {
        let server = tiny_http::Server::http(addr)
            .map_err(|e| format!("Failed to start HTTP server on {}: {}", addr, e))?;
        Ok(Self {
            server,
            pool: ThreadPool::with_name("climate-api-worker".to_string(), workers.max(1)),
            store,
            config,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the listener shuts down.
    pub fn run(self) {
        for request in self.server.incoming_requests() {
            let store = Arc::clone(&self.store);
            let config = self.config.clone();
            self.pool.execute(move || handle_request(request, &store, &config));
        }
        self.pool.join();
    }
}

fn handle_request(request: tiny_http::Request, store: &SharedStore, config: &QueryConfig) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = dispatch(&method, &url, store, config);
    log::debug!("{} {} -> {}", method, url, reply.status);

    if let Err(e) = request.respond(reply.into_response()) {
        log::warn!("Failed to send response for {}: {}", url, e);
    }
}

/// Start HTTP endpoint server with the configured address and worker count.
/// Blocks for the life of the server.
pub fn start_endpoint_server(config: &ServiceConfig, store: SharedStore) -> Result<(), String> {
    let addr = config.server.listen_addr();
    let server = EndpointServer::bind(&addr, config.server.workers, store, config.query.clone())?;

    log::info!(
        "HTTP endpoint listening on http://{} ({} workers)",
        addr,
        config.server.workers.max(1)
    );
    server.run();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
