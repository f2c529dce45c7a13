//! Flightstats CLI - delay analytics over a read-only flight dataset

use clap::{Parser, Subcommand, ValueEnum};
use flightstats::config::{self, FlightstatsConfig, Overrides, Settings};
use flightstats::flight::{AirportCode, FlightDate, FlightRecord};
use flightstats::stats::{Dimension, StatsAggregator};
use flightstats::ui::{self, FlightColumn, Spinner};
use flightstats::FlightStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "flightstats")]
#[command(version)]
#[command(about = "Flight delay analytics over a SQLite flight dataset")]
#[command(long_about = r#"
Flightstats answers questions about flight delays:
  • Look up flights by id, date, origin or destination
  • List delayed flights and the worst delays of a day
  • Delay percentages by airline, hour of day and route

Example usage:
  flightstats serve --port 5000
  flightstats date 01/01/2015
  flightstats stats routes --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./flightstats.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the flight database
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Minutes of departure delay that count as delayed
    #[arg(short, long, global = true)]
    threshold: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatsKind {
    Airlines,
    Hours,
    Routes,
    RoutePairs,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a flightstats.toml with every default filled in
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Interactive menu
    Menu,

    /// Show one flight
    Flight { id: i64 },

    /// Flights on a date (DD/MM/YYYY)
    Date { date: String },

    /// Most delayed flights on a date (DD/MM/YYYY)
    Top {
        date: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Every delayed flight
    Delayed,

    /// Flights departing from an airport
    Origin { code: String },

    /// Flights arriving at an airport
    Destination { code: String },

    /// Delayed flights departing from an airport
    DelayedOrigin { code: String },

    /// Delayed flight counts per airline
    DelayedAirline {
        /// Only this airline
        name: Option<String>,
    },

    /// Delay percentages
    Stats {
        #[arg(value_enum)]
        kind: StatsKind,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Commands::Init { force } = cli.command {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        config::write_config(&path, &FlightstatsConfig::with_defaults(), force)?;
        ui::success(&format!("Wrote {}", path.display()));
        return Ok(());
    }

    let file_config = config::load_config(cli.config.as_deref())?;
    let (host, port) = match &cli.command {
        Commands::Serve { host, port } => (host.clone(), *port),
        _ => (None, None),
    };
    let settings = Settings::resolve(
        file_config.as_ref(),
        Overrides {
            database: cli.database.clone(),
            delay_threshold: cli.threshold,
            host,
            port,
        },
    );
    tracing::debug!("settings: {:?}", settings);

    if let Commands::Serve { .. } = cli.command {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(flightstats::server::start_server(&settings));
    }

    let store = FlightStore::open(&settings.database)?.with_delay_threshold(settings.delay_threshold);
    if let Err(e) = run(&store, cli.command, cli.format) {
        match e.downcast_ref::<flightstats::Error>() {
            Some(flightstats::Error::InvalidInput(message)) => {
                ui::error(message);
                std::process::exit(2);
            }
            _ => return Err(e),
        }
    }
    store.close()?;

    Ok(())
}

fn run(store: &FlightStore, command: Commands, format: Format) -> anyhow::Result<()> {
    match command {
        Commands::Init { .. } | Commands::Serve { .. } => {}

        Commands::Menu => {
            ui::info("Delay threshold", &format!("{} minutes", store.delay_threshold()));
            flightstats::menu::run(store)?;
        }

        Commands::Flight { id } => {
            let flights = store.flight_by_id(id)?;
            match (format, flights.first()) {
                (Format::Json, _) => emit_json(&flights)?,
                (Format::Text, Some(flight)) => println!("{}", ui::flight_detail(flight)),
                (Format::Text, None) => ui::empty(&format!("Flight with ID {} not found", id)),
            }
        }

        Commands::Date { date } => {
            let date = FlightDate::parse_dmy(&date)?;
            let flights = store.flights_by_date(date.day, date.month, date.year)?;
            emit_flights(store, format, &format!("Flights on {}", date), &flights, FlightColumn::DETAIL)?;
        }

        Commands::Top { date, limit } => {
            let date = FlightDate::parse_dmy(&date)?;
            let flights = store.top_delayed_flights_by_date(date.day, date.month, date.year, limit)?;
            emit_flights(
                store,
                format,
                &format!("Top {} delayed flights on {}", limit, date),
                &flights,
                FlightColumn::TOP,
            )?;
        }

        Commands::Delayed => {
            let flights = store.delayed_flights()?;
            let title = format!("Flights delayed by {}+ minutes", store.delay_threshold());
            emit_flights(store, format, &title, &flights, FlightColumn::DELAYED)?;
        }

        Commands::Origin { code } => {
            let code = AirportCode::parse(&code)?;
            let flights = store.flights_by_origin(code.as_str())?;
            emit_flights(store, format, &format!("Flights from {}", code), &flights, FlightColumn::DETAIL)?;
        }

        Commands::Destination { code } => {
            let code = AirportCode::parse(&code)?;
            let flights = store.flights_by_destination(code.as_str())?;
            emit_flights(store, format, &format!("Flights to {}", code), &flights, FlightColumn::DETAIL)?;
        }

        Commands::DelayedOrigin { code } => {
            let code = AirportCode::parse(&code)?;
            let flights = store.delayed_flights_by_airport(code.as_str())?;
            emit_flights(
                store,
                format,
                &format!("Delayed flights from {}", code),
                &flights,
                FlightColumn::DELAYED,
            )?;
        }

        Commands::DelayedAirline { name } => {
            let counts = store.delayed_flights_by_airline(name.as_deref())?;
            match format {
                Format::Json => {
                    let rows: Vec<_> = counts
                        .iter()
                        .map(|c| serde_json::json!({ "airline": c.key, "delayed_flights": c.count }))
                        .collect();
                    emit_json(&rows)?;
                }
                Format::Text if counts.is_empty() => ui::empty("No delayed flights found."),
                Format::Text => {
                    ui::section("Delayed flights by airline");
                    println!("{}", ui::delayed_count_table(&counts));
                }
            }
        }

        Commands::Stats { kind } => {
            let aggregator = StatsAggregator::new(store);
            let spinner = Spinner::new("Computing delay statistics...");
            let dimension = match kind {
                StatsKind::Airlines => Dimension::Airline,
                StatsKind::Hours => Dimension::Hour,
                StatsKind::Routes | StatsKind::RoutePairs => Dimension::Route,
            };
            let records = aggregator.aggregate(dimension);
            spinner.finish();
            let records = records?;

            if let StatsKind::RoutePairs = kind {
                let pairs = flightstats::stats::collapse_routes(&records);
                match format {
                    Format::Json => emit_json(&pairs)?,
                    Format::Text if pairs.is_empty() => ui::empty("No route data available."),
                    Format::Text => {
                        ui::section("Delayed flights per airport pair");
                        println!("{}", ui::route_pair_table(&pairs));
                    }
                }
                return Ok(());
            }

            match format {
                Format::Json => emit_json(&records)?,
                Format::Text if records.is_empty() => ui::empty("No delay data available."),
                Format::Text => {
                    ui::section(&format!("Delayed flights by {}", dimension.as_str()));
                    println!("{}", ui::aggregate_table(dimension, &records));
                    ui::summary_row("Threshold:", &format!("{} minutes", store.delay_threshold()));
                }
            }
        }
    }

    Ok(())
}

fn emit_flights(
    store: &FlightStore,
    format: Format,
    title: &str,
    flights: &[FlightRecord],
    columns: &[FlightColumn],
) -> anyhow::Result<()> {
    match format {
        Format::Json => emit_json(&flights)?,
        Format::Text if flights.is_empty() => ui::empty("No flights found."),
        Format::Text => {
            ui::section(title);
            println!("{}", ui::flight_table(flights, columns, store.delay_threshold()));
            ui::summary_row("Flights:", &flights.len().to_string());
        }
    }
    Ok(())
}

fn emit_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
