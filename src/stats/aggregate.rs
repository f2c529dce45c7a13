//! Delayed/total merge
//!
//! The total side is the authoritative universe of keys: a key seen only on
//! the delayed side never reaches the output.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::Serialize;

use crate::storage::{Count, FlightStore};
use crate::{Error, Result};

/// Grouping dimension for delay statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Airline,
    Hour,
    Route,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Airline => "airline",
            Dimension::Hour => "hour",
            Dimension::Route => "route",
        }
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "airline" | "airlines" => Ok(Dimension::Airline),
            "hour" | "hours" => Ok(Dimension::Hour),
            "route" | "routes" => Ok(Dimension::Route),
            other => Err(Error::InvalidInput(format!("Unknown dimension: {}", other))),
        }
    }
}

/// Identifies one group. Serializes flattened into the record, e.g. `{"hour": 8, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum AggregateKey {
    Airline { airline: String },
    Hour { hour: u8 },
    Route { origin: String, destination: String },
}

impl AggregateKey {
    pub fn airline(name: impl Into<String>) -> Self {
        AggregateKey::Airline { airline: name.into() }
    }

    pub fn route(origin: &str, destination: &str) -> Self {
        AggregateKey::Route {
            origin: origin.to_ascii_uppercase(),
            destination: destination.to_ascii_uppercase(),
        }
    }
}

impl From<String> for AggregateKey {
    fn from(airline: String) -> Self {
        AggregateKey::Airline { airline }
    }
}

impl From<u8> for AggregateKey {
    fn from(hour: u8) -> Self {
        AggregateKey::Hour { hour }
    }
}

impl From<(String, String)> for AggregateKey {
    fn from((origin, destination): (String, String)) -> Self {
        AggregateKey::route(&origin, &destination)
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateKey::Airline { airline } => f.write_str(airline),
            AggregateKey::Hour { hour } => write!(f, "{:02}:00", hour),
            AggregateKey::Route { origin, destination } => write!(f, "{} → {}", origin, destination),
        }
    }
}

/// Merged delay statistics for one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    #[serde(flatten)]
    pub key: AggregateKey,
    pub total_flights: u64,
    pub delayed_flights: u64,
    pub percentage_delayed: f64,
}

impl AggregateRecord {
    fn seed(key: AggregateKey, total_flights: u64) -> Self {
        Self {
            key,
            total_flights,
            delayed_flights: 0,
            percentage_delayed: 0.0,
        }
    }

    fn set_delayed(&mut self, delayed_flights: u64) {
        if delayed_flights > self.total_flights {
            tracing::warn!(
                key = %self.key,
                delayed_flights,
                total_flights = self.total_flights,
                "delayed count exceeds total; counts came from separate reads"
            );
        }
        self.delayed_flights = delayed_flights;
        self.percentage_delayed = percentage(delayed_flights, self.total_flights);
    }
}

/// `round(100 * delayed / total, 2)`, or `0.0` when there are no flights
pub fn percentage(delayed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(delayed as f64 / total as f64 * 100.0)
}

/// Two decimals, exact halves to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Merge delayed and total counts for one dimension.
///
/// Output has one record per total-side key, in total-side order. Either side
/// being empty yields an empty result.
pub fn merge<K>(delayed: &[Count<K>], total: &[Count<K>]) -> Vec<AggregateRecord>
where
    K: Clone + Eq + Hash + Into<AggregateKey>,
{
    if delayed.is_empty() || total.is_empty() {
        return Vec::new();
    }

    let mut index: HashMap<&K, usize> = HashMap::with_capacity(total.len());
    let mut records: Vec<AggregateRecord> = Vec::with_capacity(total.len());

    for row in total {
        match index.get(&row.key) {
            Some(&i) => records[i].total_flights = row.count,
            None => {
                index.insert(&row.key, records.len());
                records.push(AggregateRecord::seed(row.key.clone().into(), row.count));
            }
        }
    }

    for row in delayed {
        if let Some(&i) = index.get(&row.key) {
            records[i].set_delayed(row.count);
        }
    }

    records
}

/// Fetches both sides of a statistic from the store and merges them
pub struct StatsAggregator<'a> {
    store: &'a FlightStore,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(store: &'a FlightStore) -> Self {
        Self { store }
    }

    /// Merged statistics for a dimension.
    ///
    /// Airline and route keep the total query's order; hours are ascending.
    pub fn aggregate(&self, dimension: Dimension) -> Result<Vec<AggregateRecord>> {
        let records = match dimension {
            Dimension::Airline => merge(
                &self.store.delayed_flights_by_airline(None)?,
                &self.store.total_flights_by_airline()?,
            ),
            Dimension::Hour => {
                let mut records = merge(
                    &self.store.delayed_flights_by_hour()?,
                    &self.store.total_flights_by_hour()?,
                );
                records.sort_by(|a, b| a.key.cmp(&b.key));
                records
            }
            Dimension::Route => merge(
                &self.store.delayed_flights_by_route()?,
                &self.store.total_flights_by_route()?,
            ),
        };
        tracing::debug!(dimension = dimension.as_str(), records = records.len(), "aggregated");
        Ok(records)
    }

    /// Route statistics with both directions of each airport pair combined
    pub fn route_pairs(&self) -> Result<Vec<super::RoutePairStat>> {
        Ok(super::collapse_routes(&self.aggregate(Dimension::Route)?))
    }
}
