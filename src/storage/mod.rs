//! Storage Layer - read-only access to the flights dataset
//!
//! The dataset is an existing SQLite database with tables:
//! - flights(ID, YEAR, MONTH, DAY, AIRLINE, ORIGIN_AIRPORT, DESTINATION_AIRPORT,
//!   DEPARTURE_TIME, DEPARTURE_DELAY, ...)
//! - airlines(id, airline)

pub mod queries;
pub mod row;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fixture;

pub use row::Row;
pub use sqlite::{Count, FlightStore, DEFAULT_DELAY_THRESHOLD};
