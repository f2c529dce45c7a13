//! # Flightstats - Flight Delay Analytics
//!
//! Read-only analytics over a relational flight-delay dataset.
//!
//! Flightstats provides:
//! - Point lookups (flight by ID, flights by date, origin or destination)
//! - Delay statistics by airline, hour of day and route
//! - A single normalization step that turns SQLite rows into canonical records
//! - A JSON API, a one-shot CLI and an interactive text menu over the same queries

pub mod flight;
pub mod storage;
pub mod stats;
pub mod server;
pub mod menu;
pub mod ui;
pub mod config;


// Re-exports for convenient access
pub use flight::{AirportCode, FlightDate, FlightRecord};
pub use storage::{Count, FlightStore, DEFAULT_DELAY_THRESHOLD};
pub use stats::{AggregateKey, AggregateRecord, Dimension, RoutePairStat, StatsAggregator};

/// Result type alias for Flightstats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Flightstats operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Malformed row: {0}")]
    MalformedRow(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for rejections that happen before any query executes
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Collapse a query result into "data or no data".
///
/// Failures are logged and turned into an empty sequence, which is what the
/// interactive surfaces want: they only distinguish "something" from "nothing".
pub trait OrEmpty<T> {
    fn or_empty(self) -> Vec<T>;
}

impl<T> OrEmpty<T> for Result<Vec<T>> {
    fn or_empty(self) -> Vec<T> {
        match self {
            Ok(rows) => rows,
            Err(e) if e.is_validation() => {
                tracing::debug!("rejected before query: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("query failed, treating as empty: {}", e);
                Vec::new()
            }
        }
    }
}
