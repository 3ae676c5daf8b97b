/// climate_service: read-only HTTP/JSON facade over a climate observations database.
///
/// # Module structure
///
/// ```text
/// climate_service
/// ├── model    — shared data types (Measurement, Station, QueryError)
/// ├── config   — HTTP listen address configuration (service.toml)
/// ├── db       — database connection, validation of the observation tables
/// └── endpoint — route parsing, queries, JSON shaping, tiny_http server
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod model;
