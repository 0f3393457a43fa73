//! Climate API - HTTP server
//!
//! Serves precipitation, station and temperature queries over the climate
//! dataset.
//!
//! Usage:
//!   cargo run --release                                   # climate.toml, port 5000
//!   cargo run --release -- --port 8080                    # override the port
//!   cargo run --release -- --config /etc/climate.toml
//!   cargo run --release -- --database-url sqlite://Resources/hawaii.sqlite
//!
//! Environment:
//!   DATABASE_URL - overrides [database].url from the config file
//!   RUST_LOG     - log filter (default: info)

use climate_api::config::{self, DEFAULT_CONFIG_PATH};
use climate_api::{db, endpoint, store};
use std::env;
use std::path::PathBuf;

struct Args {
    config_path: PathBuf,
    port: Option<u16>,
    database_url: Option<String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--config PATH] [--port PORT] [--database-url URL]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let program = args.first().map(String::as_str).unwrap_or("climate_api");
    let mut parsed = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        port: None,
        database_url: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--config", Some(path)) => parsed.config_path = PathBuf::from(path),
            ("--port", Some(port)) => {
                let port = port
                    .parse()
                    .map_err(|_| format!("Error: invalid port '{}'", port))?;
                parsed.port = Some(port);
            }
            ("--database-url", Some(url)) => parsed.database_url = Some(url.clone()),
            ("--config" | "--port" | "--database-url", None) => {
                return Err(format!("Error: {} requires a value\n{}", args[i], usage(program)));
            }
            (other, _) => {
                return Err(format!("Unknown argument: {}\n{}", other, usage(program)));
            }
        }
        i += 2;
    }

    Ok(parsed)
}

fn main() {
    let log_env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(log_env);

    println!("🌦  Climate API");
    println!("==============\n");

    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let mut config = config::load_with_env(&args.config_path).unwrap_or_else(|e| {
        eprintln!("\n❌ Configuration error: {}\n", e);
        std::process::exit(1);
    });
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    println!("📊 Opening dataset...");
    let climate_store = db::open_store(&config.database.url).unwrap_or_else(|e| {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    });
    println!("✓ Dataset ready\n");

    println!("🚀 Starting HTTP endpoint server...");
    println!("   http://{}", config.server.listen_addr());
    println!("   GET /api/v1.0/precipitation");
    println!("   GET /api/v1.0/stations");
    println!("   GET /api/v1.0/tobs");
    println!("   GET /api/v1.0/{{start}}[/{{end}}]\n");

    if let Err(e) = endpoint::start_endpoint_server(&config, store::share(climate_store)) {
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
