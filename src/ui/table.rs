use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::flight::FlightRecord;
use crate::stats::{AggregateRecord, Dimension, RoutePairStat};
use crate::storage::Count;
use crate::ui::{theme, Theme};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Field")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column field/value table
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// A column of a flight listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightColumn {
    Id,
    Date,
    FlightNumber,
    Origin,
    Destination,
    Airline,
    Delay,
}

impl FlightColumn {
    /// Lookups by id or date
    pub const DETAIL: &[FlightColumn] = &[
        FlightColumn::Id,
        FlightColumn::Date,
        FlightColumn::Origin,
        FlightColumn::Destination,
        FlightColumn::Airline,
        FlightColumn::Delay,
    ];

    /// Delayed flight listings
    pub const DELAYED: &[FlightColumn] = &[
        FlightColumn::Id,
        FlightColumn::Origin,
        FlightColumn::Destination,
        FlightColumn::Airline,
        FlightColumn::Delay,
    ];

    /// Top delayed flights of a day
    pub const TOP: &[FlightColumn] = &[
        FlightColumn::Id,
        FlightColumn::FlightNumber,
        FlightColumn::Origin,
        FlightColumn::Destination,
        FlightColumn::Delay,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            FlightColumn::Id => "ID",
            FlightColumn::Date => "Date",
            FlightColumn::FlightNumber => "Flight",
            FlightColumn::Origin => "Origin",
            FlightColumn::Destination => "Destination",
            FlightColumn::Airline => "Airline",
            FlightColumn::Delay => "Delay (min)",
        }
    }

    pub fn value(&self, flight: &FlightRecord) -> String {
        match self {
            FlightColumn::Id => flight.id.to_string(),
            FlightColumn::Date => flight.date_string(),
            FlightColumn::FlightNumber => optional(flight.flight_number),
            FlightColumn::Origin => flight.origin_airport.clone(),
            FlightColumn::Destination => flight.destination_airport.clone(),
            FlightColumn::Airline => flight.airline_name.clone(),
            FlightColumn::Delay => optional(flight.delay),
        }
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Delay column highlighted against `threshold`; a missing delay stays plain
fn delay_cell(flight: &FlightRecord, threshold: u32, theme: &Theme) -> String {
    let text = optional(flight.delay);
    match flight.delay {
        None => text,
        Some(_) if flight.is_delayed(threshold) => text.style(theme.delayed.clone()).to_string(),
        Some(_) => text.style(theme.on_time.clone()).to_string(),
    }
}

pub fn flight_table(flights: &[FlightRecord], columns: &[FlightColumn], threshold: u32) -> String {
    if flights.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header()));
    for flight in flights {
        builder.push_record(columns.iter().map(|c| match c {
            FlightColumn::Delay => delay_cell(flight, threshold, theme()),
            other => other.value(flight),
        }));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Every field of a single flight, one per line
pub fn flight_detail(flight: &FlightRecord) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("ID", &flight.id.to_string());
    builder.add_row("Date", &flight.date_string());
    if let Some(number) = flight.flight_number {
        builder.add_row("Flight number", &number.to_string());
    }
    builder.add_row("Airline", &flight.airline_name);
    builder.add_row("Origin", &flight.origin_airport);
    builder.add_row("Destination", &flight.destination_airport);
    builder.add_row("Delay (min)", &optional(flight.delay));
    builder.build()
}

pub fn aggregate_table(dimension: Dimension, records: &[AggregateRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let group = match dimension {
        Dimension::Airline => "Airline",
        Dimension::Hour => "Hour",
        Dimension::Route => "Route",
    };

    let mut builder = Builder::default();
    builder.push_record([group, "Total", "Delayed", "% Delayed"]);
    for record in records {
        builder.push_record([
            record.key.to_string(),
            record.total_flights.to_string(),
            record.delayed_flights.to_string(),
            format!("{:.2}", record.percentage_delayed),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct RoutePairRow {
    #[tabled(rename = "Airports")]
    airports: String,
    #[tabled(rename = "% Delayed (avg)")]
    percentage: String,
    #[tabled(rename = "Directions")]
    directions: u8,
}

pub fn route_pair_table(pairs: &[RoutePairStat]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let rows: Vec<_> = pairs
        .iter()
        .map(|p| RoutePairRow {
            airports: format!("{} ⇄ {}", p.airport_a, p.airport_b),
            percentage: format!("{:.2}", p.percentage_delayed),
            directions: p.directions,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct DelayedCountRow {
    #[tabled(rename = "Airline")]
    airline: String,
    #[tabled(rename = "Delayed Flights")]
    delayed_flights: u64,
}

pub fn delayed_count_table(counts: &[Count<String>]) -> String {
    if counts.is_empty() {
        return String::new();
    }

    let rows: Vec<_> = counts
        .iter()
        .map(|c| DelayedCountRow {
            airline: c.key.clone(),
            delayed_flights: c.count,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
