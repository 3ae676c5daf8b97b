/// Core data types for the climate observations query service.
///
/// This module defines the shared domain model imported by the other
/// modules. It contains no I/O — only the statically declared row types
/// for the two database tables and the service error type.

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One per-station, per-date observation from the `measurement` table.
///
/// `date` is an ISO-8601 string (`YYYY-MM-DD`), stored as text so that
/// lexicographic comparison equals chronological comparison. Precipitation
/// may be absent for days a station reported temperature only.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station: String,
    pub date: String,       // "2017-08-23"
    pub prcp: Option<f64>,  // inches; None when not recorded
    pub tobs: f64,          // observed temperature, degrees F
}

/// A named weather-observation site from the `station` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while serving a query route.
#[derive(Debug)]
pub enum QueryError {
    /// The database query itself failed.
    Database(postgres::Error),
    /// `max(date)` over `measurement` returned NULL: the table is empty,
    /// so the last-year cutoff for /tobs cannot be computed.
    EmptyStore,
    /// The stored maximum date did not parse as `YYYY-MM-DD`.
    BadStoredDate(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Database(e) => write!(f, "Database query failed: {}", e),
            QueryError::EmptyStore => {
                write!(f, "Measurement table is empty: no maximum date to anchor the last-year window")
            }
            QueryError::BadStoredDate(s) => {
                write!(f, "Stored maximum date {:?} is not a valid YYYY-MM-DD date", s)
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl From<postgres::Error> for QueryError {
    fn from(e: postgres::Error) -> Self {
        QueryError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_message_names_the_table() {
        let msg = QueryError::EmptyStore.to_string();
        assert!(msg.contains("Measurement table is empty"));
    }

    #[test]
    fn test_bad_stored_date_message_includes_value() {
        let msg = QueryError::BadStoredDate("not-a-date".to_string()).to_string();
        assert!(msg.contains("not-a-date"));
    }
}
