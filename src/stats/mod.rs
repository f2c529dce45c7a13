//! Delay statistics
//!
//! Each statistic is computed from two independent count queries (delayed
//! and total) merged in memory into percentage-annotated records.

pub mod aggregate;
pub mod routes;

pub use aggregate::{merge, percentage, AggregateKey, AggregateRecord, Dimension, StatsAggregator};
pub use routes::{collapse_routes, RoutePairStat};
