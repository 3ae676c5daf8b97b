//! Climate Observations Query Service
//!
//! A read-only HTTP facade over a pre-populated climate database of
//! precipitation and temperature observations. Each route runs one query
//! against the `measurement` or `station` table and returns JSON; there
//! is no ingestion, no write path, and no state beyond the database
//! connection.
//!
//! Usage:
//!   cargo run --release               # Serve on the configured port (default 8080)
//!   cargo run --release -- --port 9090
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string

use climate_service::{config, db, endpoint};
use std::env;

/// Parse the --port argument value
fn parse_port(value: &str) -> Result<u16, String> {
    value
        .parse()
        .map_err(|_| format!("invalid port number: {}", value))
}

fn main() {
    println!("🌡️  Climate Observations Query Service");
    println!("======================================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                if i + 1 < args.len() {
                    match parse_port(&args[i + 1]) {
                        Ok(port) => port_override = Some(port),
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            std::process::exit(1);
                        }
                    }
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--port PORT]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // Load listen address configuration (service.toml, or defaults)
    let mut service_config = config::load_config();
    if let Some(port) = port_override {
        service_config.port = port;
    }

    // Connect and verify the observation tables exist
    println!("📊 Validating database...");
    let client = match db::connect_and_verify(&["measurement", "station"]) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("\n❌ Initialization failed: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Database validated\n");

    // Serve until shutdown; the connection is dropped when the loop exits
    if let Err(e) = endpoint::start_endpoint_server(
        &service_config.bind_address,
        service_config.port,
        client,
    ) {
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
