/// HTTP endpoint for querying climate observations
///
/// Provides a small read-only REST API over the pre-populated
/// precipitation and temperature database. Each route issues one query
/// and serializes the rows to JSON; there is no write path.
///
/// Endpoints:
/// - GET /                              - HTML listing of available routes
/// - GET /api/v1.0/precipitation        - Per-row {date: prcp} records
/// - GET /api/v1.0/stations             - {"Station", "Name"} records
/// - GET /api/v1.0/tobs                 - {date: tobs} for the last 365 days
/// - GET /api/v1.0/{start}              - TMIN/TAVG/TMAX from a start date
/// - GET /api/v1.0/{start}/{end}        - TMIN/TAVG/TMAX over a date range

use crate::model::{QueryError, Station};
use chrono::{Duration, NaiveDate};
use postgres::Client;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// One station entry for the /api/v1.0/stations response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StationRecord {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Aggregate temperature statistics for the {start} and {start}/{end} routes.
///
/// All three fields are null when no rows fall inside the filter window
/// (aggregates over the empty set).
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Parsed request target
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Index,
    Precipitation,
    Stations,
    Tobs,
    /// /api/v1.0/{start} — start date string, taken verbatim (no validation;
    /// a malformed date simply matches no rows in the string comparison)
    TempStatsFrom(String),
    /// /api/v1.0/{start}/{end}
    TempStatsRange(String, String),
    NotFound,
}

/// Map a request URL to a route.
///
/// Any single path segment under /api/v1.0/ that is not one of the named
/// routes is treated as a start date, and two segments as a start/end pair,
/// matching the original API contract.
pub fn parse_route(url: &str) -> Route {
    // tiny_http hands us the raw request target; the API takes no query
    // parameters, so anything after '?' is ignored
    let path = url.split('?').next().unwrap_or(url);

    match path {
        "/" => return Route::Index,
        "/api/v1.0/precipitation" => return Route::Precipitation,
        "/api/v1.0/stations" => return Route::Stations,
        "/api/v1.0/tobs" => return Route::Tobs,
        _ => {}
    }

    let Some(rest) = path.strip_prefix("/api/v1.0/") else {
        return Route::NotFound;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [start] if !start.is_empty() => Route::TempStatsFrom(start.to_string()),
        [start, end] if !start.is_empty() && !end.is_empty() => {
            Route::TempStatsRange(start.to_string(), end.to_string())
        }
        _ => Route::NotFound,
    }
}

// ---------------------------------------------------------------------------
// Data Fetching
// ---------------------------------------------------------------------------

/// Fetch (date, prcp) for every measurement row, in store-native order.
///
/// Duplicate dates are preserved: one entry per row, never merged.
pub fn fetch_precipitation(client: &mut Client) -> Result<Vec<(String, Option<f64>)>, QueryError> {
    let rows = client.query("SELECT date, prcp FROM measurement", &[])?;

    Ok(rows
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect())
}

/// Fetch every station's identifier and name, in store-native order
pub fn fetch_stations(client: &mut Client) -> Result<Vec<Station>, QueryError> {
    let rows = client.query("SELECT station, name FROM station", &[])?;

    Ok(rows
        .iter()
        .map(|row| Station {
            station: row.get(0),
            name: row.get(1),
        })
        .collect())
}

/// Fetch (date, tobs) for the 365 days leading up to the newest measurement.
///
/// The window is anchored at max(date) over the whole table; an empty table
/// has no anchor and is an explicit error rather than an empty result.
pub fn fetch_last_year_tobs(client: &mut Client) -> Result<Vec<(String, f64)>, QueryError> {
    let row = client.query_one("SELECT max(date) FROM measurement", &[])?;
    let latest = anchor_date(row.get(0))?;

    let cutoff = last_year_cutoff(&latest)?;

    let rows = client.query(
        "SELECT date, tobs FROM measurement WHERE date >= $1",
        &[&cutoff],
    )?;

    Ok(rows
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect())
}

/// Resolve the max(date) lookup into the window anchor.
///
/// SQL max() over zero rows comes back NULL; an empty measurement table
/// leaves the last-year window with no anchor, which is an error rather
/// than an empty result.
pub fn anchor_date(latest: Option<String>) -> Result<String, QueryError> {
    latest.ok_or(QueryError::EmptyStore)
}

/// Compute the date exactly 365 days before `latest`.
///
/// Plain day arithmetic, deliberately not calendar-year aware: across a
/// leap day the window covers slightly less than one calendar year.
pub fn last_year_cutoff(latest: &str) -> Result<String, QueryError> {
    let latest_date = NaiveDate::parse_from_str(latest, "%Y-%m-%d")
        .map_err(|_| QueryError::BadStoredDate(latest.to_string()))?;

    let cutoff = latest_date - Duration::days(365);
    Ok(cutoff.format("%Y-%m-%d").to_string())
}

/// Compute min/avg/max observed temperature over rows with date >= start
/// (and date <= end when given).
///
/// Date filters are string comparisons against the stored ISO-8601 text,
/// so an `end` before `start` just selects nothing and every field of the
/// result is None.
pub fn fetch_temperature_stats(
    client: &mut Client,
    start: &str,
    end: Option<&str>,
) -> Result<TemperatureStats, QueryError> {
    let row = match end {
        Some(end) => client.query_one(
            "SELECT min(tobs), avg(tobs), max(tobs)
             FROM measurement
             WHERE date >= $1 AND date <= $2",
            &[&start, &end],
        )?,
        None => client.query_one(
            "SELECT min(tobs), avg(tobs), max(tobs)
             FROM measurement
             WHERE date >= $1",
            &[&start],
        )?,
    };

    Ok(TemperatureStats {
        tmin: row.get(0),
        tavg: row.get(1),
        tmax: row.get(2),
    })
}

/// Shape (date, value) rows into the API's list of single-entry objects:
/// [{"2017-08-01": 0.5}, {"2017-08-23": null}, ...]
pub fn date_keyed_records<V: Serialize>(rows: &[(String, V)]) -> Vec<serde_json::Value> {
    rows.iter()
        .map(|(date, value)| {
            let mut record = serde_json::Map::new();
            record.insert(date.clone(), serde_json::to_value(value).unwrap());
            serde_json::Value::Object(record)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

type HttpResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

/// Start the HTTP server on the specified address and serve until shutdown.
///
/// One blocking request/response cycle at a time against a single
/// read-only database connection; requests share no mutable state.
pub fn start_endpoint_server(
    bind_address: &str,
    port: u16,
    mut client: Client,
) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("{}:{}", bind_address, port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://{}:{}", bind_address, port);
    println!("   GET /                       - Available routes");
    println!("   GET /api/v1.0/precipitation - Daily precipitation");
    println!("   GET /api/v1.0/stations      - Station registry");
    println!("   GET /api/v1.0/tobs          - Last year of temperatures");
    println!("   GET /api/v1.0/{{start}}[/{{end}}] - Temperature statistics\n");

    for request in server.incoming_requests() {
        let response = handle_request(&mut client, request.url());

        if let Err(e) = request.respond(response) {
            eprintln!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Dispatch one request to its handler
fn handle_request(client: &mut Client, url: &str) -> HttpResponse {
    match parse_route(url) {
        Route::Index => handle_index(),
        Route::Precipitation => handle_precipitation(client),
        Route::Stations => handle_stations(client),
        Route::Tobs => handle_tobs(client),
        Route::TempStatsFrom(start) => handle_temperature_stats(client, &start, None),
        Route::TempStatsRange(start, end) => {
            handle_temperature_stats(client, &start, Some(&end))
        }
        Route::NotFound => create_response(
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": [
                    "/",
                    "/api/v1.0/precipitation",
                    "/api/v1.0/stations",
                    "/api/v1.0/tobs",
                    "/api/v1.0/{start}",
                    "/api/v1.0/{start}/{end}"
                ]
            }),
        ),
    }
}

/// Handle / — static HTML listing of the API routes
fn handle_index() -> HttpResponse {
    let body = "<h1>Available Routes:</h1><br/>\
                /api/v1.0/precipitation<br/>\
                /api/v1.0/stations<br/>\
                /api/v1.0/tobs<br/>\
                /api/v1.0/YYYY-MM-DD<br/>\
                /api/v1.0/YYYY-MM-DD/YYYY-MM-DD";

    tiny_http::Response::from_data(body.as_bytes().to_vec())
        .with_status_code(tiny_http::StatusCode::from(200))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap(),
        )
}

/// Handle /api/v1.0/precipitation
fn handle_precipitation(client: &mut Client) -> HttpResponse {
    match fetch_precipitation(client) {
        Ok(rows) => create_response(
            200,
            serde_json::Value::Array(date_keyed_records(&rows)),
        ),
        Err(e) => error_response(e),
    }
}

/// Handle /api/v1.0/stations
fn handle_stations(client: &mut Client) -> HttpResponse {
    match fetch_stations(client) {
        Ok(stations) => {
            let records: Vec<StationRecord> = stations
                .into_iter()
                .map(|s| StationRecord {
                    station: s.station,
                    name: s.name,
                })
                .collect();
            create_response(200, serde_json::to_value(&records).unwrap())
        }
        Err(e) => error_response(e),
    }
}

/// Handle /api/v1.0/tobs
fn handle_tobs(client: &mut Client) -> HttpResponse {
    match fetch_last_year_tobs(client) {
        Ok(rows) => create_response(
            200,
            serde_json::Value::Array(date_keyed_records(&rows)),
        ),
        Err(e) => error_response(e),
    }
}

/// Handle /api/v1.0/{start} and /api/v1.0/{start}/{end}
///
/// The response is always a one-element array, mirroring the shape of the
/// list routes even though the aggregate query yields a single record.
fn handle_temperature_stats(client: &mut Client, start: &str, end: Option<&str>) -> HttpResponse {
    match fetch_temperature_stats(client, start, end) {
        Ok(stats) => create_response(200, serde_json::to_value(&[stats]).unwrap()),
        Err(e) => error_response(e),
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> HttpResponse {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

/// Map a query failure to the 500 response
fn error_response(e: QueryError) -> HttpResponse {
    eprintln!("Query failed: {}", e);
    create_response(500, serde_json::json!({ "error": e.to_string() }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_routes() {
        assert_eq!(parse_route("/"), Route::Index);
        assert_eq!(parse_route("/api/v1.0/precipitation"), Route::Precipitation);
        assert_eq!(parse_route("/api/v1.0/stations"), Route::Stations);
        assert_eq!(parse_route("/api/v1.0/tobs"), Route::Tobs);
    }

    #[test]
    fn test_parse_start_date_route() {
        assert_eq!(
            parse_route("/api/v1.0/2017-08-01"),
            Route::TempStatsFrom("2017-08-01".to_string())
        );
    }

    #[test]
    fn test_parse_date_range_route() {
        assert_eq!(
            parse_route("/api/v1.0/2017-08-01/2017-08-23"),
            Route::TempStatsRange("2017-08-01".to_string(), "2017-08-23".to_string())
        );
    }

    #[test]
    fn test_malformed_dates_still_route() {
        // No format validation: garbage segments reach the comparison as-is
        assert_eq!(
            parse_route("/api/v1.0/not-a-date"),
            Route::TempStatsFrom("not-a-date".to_string())
        );
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(parse_route("/api"), Route::NotFound);
        assert_eq!(parse_route("/api/v1.0/"), Route::NotFound);
        assert_eq!(parse_route("/api/v1.0/a/b/c"), Route::NotFound);
        assert_eq!(parse_route("/api/v2.0/stations"), Route::NotFound);
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(parse_route("/api/v1.0/tobs?pretty=1"), Route::Tobs);
    }

    #[test]
    fn test_empty_store_has_no_anchor_date() {
        let err = anchor_date(None).unwrap_err();
        assert!(matches!(err, QueryError::EmptyStore));
    }

    #[test]
    fn test_anchor_date_passes_through_latest() {
        let anchor = anchor_date(Some("2017-08-23".to_string())).unwrap();
        assert_eq!(anchor, "2017-08-23");
    }

    #[test]
    fn test_last_year_cutoff_simple() {
        assert_eq!(last_year_cutoff("2017-08-23").unwrap(), "2016-08-23");
    }

    #[test]
    fn test_last_year_cutoff_across_leap_day() {
        // 2016 had 366 days, so 365 days back from its end is Jan 1, not
        // the same calendar date one year earlier
        assert_eq!(last_year_cutoff("2016-12-31").unwrap(), "2016-01-01");
    }

    #[test]
    fn test_last_year_cutoff_rejects_garbage() {
        let err = last_year_cutoff("not-a-date").unwrap_err();
        assert!(matches!(err, QueryError::BadStoredDate(_)));
    }

    #[test]
    fn test_date_keyed_records_preserve_order_and_nulls() {
        let rows = vec![
            ("2017-08-01".to_string(), Some(0.5)),
            ("2017-08-23".to_string(), None),
        ];

        let records = date_keyed_records(&rows);

        assert_eq!(
            serde_json::Value::Array(records),
            serde_json::json!([
                {"2017-08-01": 0.5},
                {"2017-08-23": null}
            ])
        );
    }

    #[test]
    fn test_date_keyed_records_keep_duplicate_dates() {
        // Two rows sharing a date (different stations) stay two entries
        let rows = vec![
            ("2017-08-01".to_string(), Some(0.1)),
            ("2017-08-01".to_string(), Some(0.2)),
        ];

        assert_eq!(date_keyed_records(&rows).len(), 2);
    }

    #[test]
    fn test_temperature_stats_serialization_keys() {
        let stats = TemperatureStats {
            tmin: Some(80.0),
            tavg: Some(80.5),
            tmax: Some(81.0),
        };

        let json = serde_json::to_value(&[stats]).unwrap();
        assert_eq!(json, serde_json::json!([{"TMIN": 80.0, "TAVG": 80.5, "TMAX": 81.0}]));
    }

    #[test]
    fn test_empty_window_stats_serialize_as_nulls() {
        let stats = TemperatureStats {
            tmin: None,
            tavg: None,
            tmax: None,
        };

        let json = serde_json::to_value(&[stats]).unwrap();
        assert_eq!(json, serde_json::json!([{"TMIN": null, "TAVG": null, "TMAX": null}]));
    }

    #[test]
    fn test_station_record_serialization_keys() {
        let record = StationRecord {
            station: "USC00519397".to_string(),
            name: "WAIKIKI 717.2, HI US".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Station": "USC00519397", "Name": "WAIKIKI 717.2, HI US"})
        );
    }
}
