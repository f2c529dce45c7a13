//! SQLite-backed flight store

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, Params};
use serde::Serialize;

use super::queries;
use super::row::Row;
use crate::flight::{AirportCode, FlightDate, FlightRecord};
use crate::{Error, Result};

/// Minutes of departure delay at which a flight counts as delayed
pub const DEFAULT_DELAY_THRESHOLD: u32 = 20;

/// One row of a grouped count query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count<K> {
    pub key: K,
    pub count: u64,
}

impl<K> Count<K> {
    pub fn new(key: K, count: u64) -> Self {
        Self { key, count }
    }
}

/// Read-only access to the flights dataset.
///
/// Every operation validates its arguments before any SQL runs and returns
/// normalized records. Driver failures are logged here and surface as
/// [`Error::StoreUnavailable`]; an empty vector always means "no data".
pub struct FlightStore {
    conn: Connection,
    delay_threshold: u32,
}

impl FlightStore {
    /// Open an existing database file read-only
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            tracing::error!("failed to open {}: {}", path.display(), e);
            Error::StoreUnavailable(e)
        })?;
        tracing::debug!("opened flight dataset at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            delay_threshold: DEFAULT_DELAY_THRESHOLD,
        }
    }

    pub fn with_delay_threshold(mut self, minutes: u32) -> Self {
        self.delay_threshold = minutes;
        self
    }

    pub fn delay_threshold(&self) -> u32 {
        self.delay_threshold
    }

    /// Release the connection, reporting any failure to close it
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| {
            tracing::warn!("failed to close flight dataset: {}", e);
            Error::StoreUnavailable(e)
        })
    }

    // ========== Flight Lookups ==========

    /// At most one flight
    pub fn flight_by_id(&self, id: i64) -> Result<Vec<FlightRecord>> {
        if id <= 0 {
            return Err(Error::InvalidInput(format!(
                "Invalid flight ID {}. Please enter a positive number.",
                id
            )));
        }
        self.query_flights("flight_by_id", queries::FLIGHT_BY_ID, params![id])
    }

    pub fn flights_by_date(&self, day: u32, month: u32, year: i32) -> Result<Vec<FlightRecord>> {
        let date = FlightDate::new(day, month, year)?;
        self.query_flights(
            "flights_by_date",
            queries::FLIGHTS_BY_DATE,
            params![date.day, date.month, date.year],
        )
    }

    /// All flights delayed by at least the threshold, by airline then longest delay first
    pub fn delayed_flights(&self) -> Result<Vec<FlightRecord>> {
        self.query_flights(
            "delayed_flights",
            queries::DELAYED_FLIGHTS,
            params![self.delay_threshold],
        )
    }

    pub fn flights_by_origin(&self, code: &str) -> Result<Vec<FlightRecord>> {
        let code = AirportCode::parse(code)?;
        self.query_flights(
            "flights_by_origin",
            queries::FLIGHTS_BY_ORIGIN,
            params![code.as_str()],
        )
    }

    pub fn flights_by_destination(&self, code: &str) -> Result<Vec<FlightRecord>> {
        let code = AirportCode::parse(code)?;
        self.query_flights(
            "flights_by_destination",
            queries::FLIGHTS_BY_DESTINATION,
            params![code.as_str()],
        )
    }

    /// Delayed flights departing from `code`, longest delay first
    pub fn delayed_flights_by_airport(&self, code: &str) -> Result<Vec<FlightRecord>> {
        let code = AirportCode::parse(code)?;
        self.query_flights(
            "delayed_flights_by_airport",
            queries::DELAYED_FLIGHTS_BY_AIRPORT,
            params![code.as_str(), self.delay_threshold],
        )
    }

    /// Flights on a date with a positive delay, longest first, at most `limit`
    pub fn top_delayed_flights_by_date(
        &self,
        day: u32,
        month: u32,
        year: i32,
        limit: usize,
    ) -> Result<Vec<FlightRecord>> {
        let date = FlightDate::new(day, month, year)?;
        if limit == 0 {
            return Err(Error::InvalidInput("Limit must be greater than zero".to_string()));
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_flights(
            "top_delayed_flights_by_date",
            queries::TOP_DELAYED_FLIGHTS_BY_DATE,
            params![date.day, date.month, date.year, limit],
        )
    }

    // ========== Grouped Counts ==========

    /// Delayed flight count per airline, optionally only for `airline`
    pub fn delayed_flights_by_airline(&self, airline: Option<&str>) -> Result<Vec<Count<String>>> {
        match airline.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.query_counts(
                "delayed_flights_for_airline",
                queries::DELAYED_FLIGHTS_FOR_AIRLINE,
                params![self.delay_threshold, name],
                "delayed_flights",
                airline_key,
            ),
            None => self.query_counts(
                "delayed_flights_by_airline",
                queries::DELAYED_FLIGHTS_BY_AIRLINE,
                params![self.delay_threshold],
                "delayed_flights",
                airline_key,
            ),
        }
    }

    pub fn total_flights_by_airline(&self) -> Result<Vec<Count<String>>> {
        self.query_counts(
            "total_flights_by_airline",
            queries::TOTAL_FLIGHTS_BY_AIRLINE,
            [],
            "total_flights",
            airline_key,
        )
    }

    pub fn delayed_flights_by_hour(&self) -> Result<Vec<Count<u8>>> {
        self.query_counts(
            "delayed_flights_by_hour",
            queries::DELAYED_FLIGHTS_BY_HOUR,
            params![self.delay_threshold],
            "delayed_flights",
            hour_key,
        )
    }

    pub fn total_flights_by_hour(&self) -> Result<Vec<Count<u8>>> {
        self.query_counts(
            "total_flights_by_hour",
            queries::TOTAL_FLIGHTS_BY_HOUR,
            [],
            "total_flights",
            hour_key,
        )
    }

    pub fn delayed_flights_by_route(&self) -> Result<Vec<Count<(String, String)>>> {
        self.query_counts(
            "delayed_flights_by_route",
            queries::DELAYED_FLIGHTS_BY_ROUTE,
            params![self.delay_threshold],
            "delayed_flights",
            route_key,
        )
    }

    pub fn total_flights_by_route(&self) -> Result<Vec<Count<(String, String)>>> {
        self.query_counts(
            "total_flights_by_route",
            queries::TOTAL_FLIGHTS_BY_ROUTE,
            [],
            "total_flights",
            route_key,
        )
    }

    // ========== Execution ==========

    fn query_flights<P: Params>(&self, name: &str, sql: &str, params: P) -> Result<Vec<FlightRecord>> {
        let rows = self.query_rows(name, sql, params)?;
        rows.iter()
            .map(FlightRecord::from_row)
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| tracing::error!(query = name, "discarding result: {}", e))
    }

    fn query_counts<K, P, F>(
        &self,
        name: &str,
        sql: &str,
        params: P,
        count_column: &str,
        key: F,
    ) -> Result<Vec<Count<K>>>
    where
        P: Params,
        F: Fn(&Row) -> Result<Option<K>>,
    {
        let rows = self.query_rows(name, sql, params)?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(k) = key(row).inspect_err(|e| tracing::error!(query = name, "discarding result: {}", e))? else {
                continue;
            };
            let count = row
                .require_int(count_column)
                .and_then(|n| {
                    u64::try_from(n).map_err(|_| Error::MalformedRow(format!("negative count {}", n)))
                })
                .inspect_err(|e| tracing::error!(query = name, "discarding result: {}", e))?;
            counts.push(Count::new(k, count));
        }
        Ok(counts)
    }

    /// Run a query and normalize every row
    fn query_rows<P: Params>(&self, name: &str, sql: &str, params: P) -> Result<Vec<Row>> {
        tracing::debug!(query = name, "executing");
        self.run(sql, params).map_err(|e| {
            tracing::error!(query = name, "query failed: {}", e);
            Error::StoreUnavailable(e)
        })
    }

    fn run<P: Params>(&self, sql: &str, params: P) -> rusqlite::Result<Vec<Row>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|n| n.to_ascii_lowercase())
            .collect();
        let rows = stmt
            .query_map(params, |row| Row::from_sqlite(&names, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn airline_key(row: &Row) -> Result<Option<String>> {
    row.text("airline_name")
}

/// Hours outside 0-23 (e.g. "2400") and missing departure times are skipped
fn hour_key(row: &Row) -> Result<Option<u8>> {
    Ok(row
        .int("hour")?
        .and_then(|h| u8::try_from(h).ok())
        .filter(|h| *h < 24))
}

fn route_key(row: &Row) -> Result<Option<(String, String)>> {
    let origin = row.text("origin_airport")?;
    let destination = row.text("destination_airport")?;
    Ok(origin
        .zip(destination)
        .map(|(o, d)| (o.trim().to_ascii_uppercase(), d.trim().to_ascii_uppercase())))
}

#[cfg(test)]
impl FlightStore {
    /// Raw normalized rows for an arbitrary query
    pub(crate) fn raw_rows(&self, sql: &str) -> Result<Vec<Row>> {
        self.query_rows("raw", sql, [])
    }
}
