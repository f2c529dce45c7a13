//! Interactive text menu
//!
//! Each action reads at most one line of input, asks the store, and renders a
//! table. Rendering is separate from terminal I/O: `render_*` functions take the
//! raw input and return either the text to show or a message explaining why
//! there is nothing to show.

use console::Term;

use crate::flight::{AirportCode, FlightDate};
use crate::stats::{Dimension, StatsAggregator};
use crate::storage::FlightStore;
use crate::ui::{self, FlightColumn, Spinner};
use crate::OrEmpty;

/// Flights shown by the "top delayed" action
pub const TOP_DELAYED_LIMIT: usize = 5;

/// What to show after an action: a rendered table or a message
pub type Rendered = std::result::Result<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    FlightById,
    FlightsByDate,
    DelayedByAirline,
    DelayedByOrigin,
    TopDelayedByDate,
    Statistics,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::FlightById,
        MenuChoice::FlightsByDate,
        MenuChoice::DelayedByAirline,
        MenuChoice::DelayedByOrigin,
        MenuChoice::TopDelayedByDate,
        MenuChoice::Statistics,
        MenuChoice::Exit,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::FlightById => "Show flight by ID",
            MenuChoice::FlightsByDate => "Show flights by date",
            MenuChoice::DelayedByAirline => "Delayed flights by airline",
            MenuChoice::DelayedByOrigin => "Delayed flights by origin airport",
            MenuChoice::TopDelayedByDate => "Top 5 delayed flights by date",
            MenuChoice::Statistics => "Delay statistics",
            MenuChoice::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsChoice {
    Dimension(Dimension),
    RoutePairs,
    Back,
}

impl StatsChoice {
    pub const ALL: [StatsChoice; 5] = [
        StatsChoice::Dimension(Dimension::Airline),
        StatsChoice::Dimension(Dimension::Hour),
        StatsChoice::Dimension(Dimension::Route),
        StatsChoice::RoutePairs,
        StatsChoice::Back,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsChoice::Dimension(Dimension::Airline) => "Percentage of delayed flights by airline",
            StatsChoice::Dimension(Dimension::Hour) => "Percentage of delayed flights by hour",
            StatsChoice::Dimension(Dimension::Route) => "Percentage of delayed flights by route",
            StatsChoice::RoutePairs => "Percentage of delayed flights per airport pair (both directions)",
            StatsChoice::Back => "Return to main menu",
        }
    }
}

pub fn render_flight_by_id(store: &FlightStore, input: &str) -> Rendered {
    let input = input.trim();
    let id: i64 = match input.parse() {
        Ok(id) if id > 0 && input.chars().all(|c| c.is_ascii_digit()) => id,
        _ => return Err("Invalid ID. Please enter a number.".to_string()),
    };
    match store.flight_by_id(id).or_empty().first() {
        Some(flight) => Ok(ui::flight_detail(flight)),
        None => Err("Flight not found.".to_string()),
    }
}

pub fn render_flights_by_date(store: &FlightStore, input: &str) -> Rendered {
    let date = FlightDate::parse_dmy(input).map_err(user_message)?;
    let flights = store.flights_by_date(date.day, date.month, date.year).or_empty();
    if flights.is_empty() {
        return Err("No flights found on this date.".to_string());
    }
    Ok(ui::flight_table(&flights, FlightColumn::DETAIL, store.delay_threshold()))
}

/// Blank input means every airline
pub fn render_delayed_by_airline(store: &FlightStore, input: &str) -> Rendered {
    let name = Some(input.trim()).filter(|n| !n.is_empty());
    let counts = store.delayed_flights_by_airline(name).or_empty();
    if counts.is_empty() {
        return Err("No delayed flights data found.".to_string());
    }
    Ok(ui::delayed_count_table(&counts))
}

pub fn render_delayed_by_origin(store: &FlightStore, input: &str) -> Rendered {
    let code = AirportCode::parse(input).map_err(user_message)?;
    let flights = store.delayed_flights_by_airport(code.as_str()).or_empty();
    if flights.is_empty() {
        return Err("No delayed flights found for this origin.".to_string());
    }
    Ok(ui::flight_table(&flights, FlightColumn::DELAYED, store.delay_threshold()))
}

pub fn render_top_delayed_by_date(store: &FlightStore, input: &str) -> Rendered {
    let date = FlightDate::parse_dmy(input).map_err(user_message)?;
    if store.flights_by_date(date.day, date.month, date.year).or_empty().is_empty() {
        return Err("No flights found on this date.".to_string());
    }
    let flights = store
        .top_delayed_flights_by_date(date.day, date.month, date.year, TOP_DELAYED_LIMIT)
        .or_empty();
    if flights.is_empty() {
        return Err("Flights found, but no delayed flights on this date.".to_string());
    }
    Ok(ui::flight_table(&flights, FlightColumn::TOP, store.delay_threshold()))
}

pub fn render_statistics(store: &FlightStore, choice: StatsChoice) -> Rendered {
    let aggregator = StatsAggregator::new(store);
    let table = match choice {
        StatsChoice::Dimension(dimension) => {
            let spinner = Spinner::new("Computing delay statistics...");
            let records = aggregator.aggregate(dimension).map_err(user_message);
            spinner.finish();
            ui::aggregate_table(dimension, &records?)
        }
        StatsChoice::RoutePairs => {
            let spinner = Spinner::new("Computing route statistics...");
            let pairs = aggregator.route_pairs().map_err(user_message);
            spinner.finish();
            ui::route_pair_table(&pairs?)
        }
        StatsChoice::Back => return Ok(String::new()),
    };
    if table.is_empty() {
        return Err("No delayed flight data available.".to_string());
    }
    Ok(table)
}

fn user_message(e: crate::Error) -> String {
    match e {
        crate::Error::InvalidInput(message) => message,
        other => {
            tracing::error!("menu action failed: {}", other);
            "Flight data is currently unavailable.".to_string()
        }
    }
}

/// Run the menu until the user exits or stdin closes
pub fn run(store: &FlightStore) -> anyhow::Result<()> {
    let term = Term::stdout();

    loop {
        print_main_menu();
        let Some(line) = prompt(&term, "Select an option: ")? else {
            return Ok(());
        };
        let Some(choice) = MenuChoice::parse(&line) else {
            ui::warn("Invalid option, please select a number between 1 and 7.");
            continue;
        };

        let rendered = match choice {
            MenuChoice::Exit => {
                println!("Exiting program. Goodbye!");
                return Ok(());
            }
            MenuChoice::FlightById => ask(&term, "Enter flight ID: ", |input| {
                render_flight_by_id(store, input)
            })?,
            MenuChoice::FlightsByDate => ask(&term, "Enter date in DD/MM/YYYY format: ", |input| {
                render_flights_by_date(store, input)
            })?,
            MenuChoice::DelayedByAirline => ask(
                &term,
                "Enter airline name (leave empty for all airlines): ",
                |input| render_delayed_by_airline(store, input),
            )?,
            MenuChoice::DelayedByOrigin => ask(&term, "Enter origin airport code: ", |input| {
                render_delayed_by_origin(store, input)
            })?,
            MenuChoice::TopDelayedByDate => ask(&term, "Enter date in DD/MM/YYYY format: ", |input| {
                render_top_delayed_by_date(store, input)
            })?,
            MenuChoice::Statistics => {
                print_stats_menu();
                match prompt(&term, "Select a statistic (1-5): ")? {
                    None => return Ok(()),
                    Some(line) => match StatsChoice::parse(&line) {
                        Some(StatsChoice::Back) => continue,
                        Some(choice) => Some(render_statistics(store, choice)),
                        None => Some(Err("Invalid choice. Please select a number between 1 and 5.".to_string())),
                    },
                }
            }
        };

        match rendered {
            None => return Ok(()),
            Some(Ok(table)) => {
                ui::section(choice.label());
                println!("{}", table);
            }
            Some(Err(message)) => ui::empty(&message),
        }

        if prompt(&term, "\nPress Enter to return to Main Menu...")?.is_none() {
            return Ok(());
        }
    }
}

fn print_main_menu() {
    println!();
    ui::header("Flight data query menu");
    println!("{}", "=".repeat(40));
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, choice.label());
    }
    println!("{}", "=".repeat(40));
}

fn print_stats_menu() {
    ui::section("Delay statistics");
    for (i, choice) in StatsChoice::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, choice.label());
    }
}

/// Prompt then read one line; `None` once stdin is closed
fn prompt(term: &Term, text: &str) -> anyhow::Result<Option<String>> {
    term.write_str(text)?;
    term.flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn ask(term: &Term, text: &str, render: impl FnOnce(&str) -> Rendered) -> anyhow::Result<Option<Rendered>> {
    Ok(prompt(term, text)?.map(|line| render(&line)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture::{broken_store, sample_store};

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::FlightById));
        assert_eq!(MenuChoice::parse(" 7 "), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("0"), None);
        assert_eq!(MenuChoice::parse("8"), None);
        assert_eq!(MenuChoice::parse("x"), None);
        assert_eq!(StatsChoice::parse("4"), Some(StatsChoice::RoutePairs));
        assert_eq!(StatsChoice::parse("6"), None);
    }

    #[test]
    fn test_flight_by_id() {
        let store = sample_store();
        assert!(render_flight_by_id(&store, "3").unwrap().contains("SFO"));
        assert_eq!(render_flight_by_id(&store, "abc").unwrap_err(), "Invalid ID. Please enter a number.");
        assert_eq!(render_flight_by_id(&store, "-1").unwrap_err(), "Invalid ID. Please enter a number.");
        assert_eq!(render_flight_by_id(&store, "404").unwrap_err(), "Flight not found.");
    }

    #[test]
    fn test_flights_by_date() {
        let store = sample_store();
        let table = render_flights_by_date(&store, "02/01/2015").unwrap();
        assert_eq!(table.lines().filter(|l| l.contains("02/01/2015")).count(), 3);
        assert_eq!(
            render_flights_by_date(&store, "2015-01-02").unwrap_err(),
            crate::flight::INVALID_DATE_FORMAT_MESSAGE
        );
        assert_eq!(
            render_flights_by_date(&store, "01/13/2015").unwrap_err(),
            crate::flight::INVALID_DATE_MESSAGE
        );
        assert_eq!(render_flights_by_date(&store, "05/05/2015").unwrap_err(), "No flights found on this date.");
    }

    #[test]
    fn test_delayed_by_airline() {
        let store = sample_store();
        let all = render_delayed_by_airline(&store, "").unwrap();
        assert!(all.contains("Delta") && all.contains("United"));
        let one = render_delayed_by_airline(&store, "United").unwrap();
        assert!(!one.contains("Delta"));
        assert!(render_delayed_by_airline(&store, "Alaska").is_err());
    }

    #[test]
    fn test_delayed_by_origin() {
        let store = sample_store();
        assert!(render_delayed_by_origin(&store, "jfk").unwrap().contains("JFK"));
        assert_eq!(
            render_delayed_by_origin(&store, "JFKX").unwrap_err(),
            crate::flight::INVALID_IATA_MESSAGE
        );
        assert!(render_delayed_by_origin(&store, "ORD").is_err());
    }

    #[test]
    fn test_top_delayed_by_date() {
        let store = sample_store();
        let table = render_top_delayed_by_date(&store, "01/01/2015").unwrap();
        // 4 has no delay, 8 has zero delay
        assert!(table.contains("200") && table.contains("100") && table.contains("101"));
        assert!(!table.contains("104"));
        assert_eq!(
            render_top_delayed_by_date(&store, "09/09/2015").unwrap_err(),
            "No flights found on this date."
        );
    }

    #[test]
    fn test_statistics() {
        let store = sample_store();
        let table = render_statistics(&store, StatsChoice::Dimension(Dimension::Airline)).unwrap();
        assert!(table.contains("60.00"));
        let pairs = render_statistics(&store, StatsChoice::RoutePairs).unwrap();
        assert!(pairs.contains("JFK ⇄ LAX"));
        assert_eq!(render_statistics(&store, StatsChoice::Back).unwrap(), "");
    }

    #[test]
    fn test_broken_store_degrades_to_messages() {
        let store = broken_store();
        assert_eq!(render_flight_by_id(&store, "1").unwrap_err(), "Flight not found.");
        assert_eq!(
            render_statistics(&store, StatsChoice::Dimension(Dimension::Hour)).unwrap_err(),
            "Flight data is currently unavailable."
        );
    }
}
