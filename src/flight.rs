//! Flight records and the validated inputs used to look them up

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::storage::row::Row;
use crate::{Error, Result};

/// Message shown for any malformed airport code
pub const INVALID_IATA_MESSAGE: &str =
    "Invalid IATA code. Please enter a valid 3-letter airport code.";

/// Message shown for an out-of-range date component
pub const INVALID_DATE_MESSAGE: &str = "Invalid date parameters";

/// Message shown when a date string is not `DD/MM/YYYY`
pub const INVALID_DATE_FORMAT_MESSAGE: &str = "Invalid date format. Please use DD/MM/YYYY.";

/// One flight as returned by the store.
///
/// Field order is the canonical column order; it is also the JSON key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub origin_airport: String,
    pub destination_airport: String,
    pub airline_name: String,
    /// Departure delay in minutes, `None` when the dataset has no value
    pub delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<i64>,
}

impl FlightRecord {
    /// Build a record from a normalized row.
    ///
    /// Unknown columns are ignored. A missing required column fails the row.
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.require_int("id")?,
            year: narrow(row.require_int("year")?, "year")?,
            month: narrow(row.require_int("month")?, "month")?,
            day: narrow(row.require_int("day")?, "day")?,
            origin_airport: row.require_text("origin_airport")?,
            destination_airport: row.require_text("destination_airport")?,
            airline_name: row.require_text("airline_name")?,
            delay: row.real("delay")?,
            flight_number: row.int("flight_number")?,
        })
    }

    /// Delayed by at least `threshold` minutes
    pub fn is_delayed(&self, threshold: u32) -> bool {
        self.delay.is_some_and(|d| d >= f64::from(threshold))
    }

    /// Date rendered as `DD/MM/YYYY`
    pub fn date_string(&self) -> String {
        format!("{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, column: &str) -> Result<T> {
    T::try_from(value).map_err(|_| Error::MalformedRow(format!("{} out of range: {}", column, value)))
}

/// A validated IATA airport code, always uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportCode(String);

impl AirportCode {
    /// Accepts exactly three ASCII letters in any case
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidInput(INVALID_IATA_MESSAGE.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar date as the dataset stores it: separate day, month and year fields.
///
/// Only the component ranges are checked (day 1-31, month 1-12); `31/02` is
/// accepted and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl FlightDate {
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(Error::InvalidInput(INVALID_DATE_MESSAGE.to_string()));
        }
        Ok(Self { day, month, year })
    }

    /// Parse `DD/MM/YYYY`
    pub fn parse_dmy(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.trim().split('/').collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(Error::InvalidInput(INVALID_DATE_FORMAT_MESSAGE.to_string()));
        };
        let parse_err = |_| Error::InvalidInput(INVALID_DATE_FORMAT_MESSAGE.to_string());
        let day: u32 = day.trim().parse().map_err(parse_err)?;
        let month: u32 = month.trim().parse().map_err(parse_err)?;
        let year: i32 = year.trim().parse().map_err(parse_err)?;
        Self::new(day, month, year)
    }
}

impl fmt::Display for FlightDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}
