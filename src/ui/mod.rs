pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{empty, error, header, info, section, success, summary_row, warn};
pub use progress::Spinner;
pub use table::{
    aggregate_table, delayed_count_table, flight_detail, flight_table, route_pair_table,
    FlightColumn, TableBuilder,
};
pub use theme::{theme, Theme};
