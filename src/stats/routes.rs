//! Direction-collapsed route statistics

use std::collections::HashMap;

use serde::Serialize;

use super::aggregate::{AggregateKey, AggregateRecord};

/// Delay statistics for an airport pair regardless of direction.
///
/// `airport_a` sorts before (or equals) `airport_b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePairStat {
    pub airport_a: String,
    pub airport_b: String,
    pub percentage_delayed: f64,
    /// Number of directions with flights (1 or 2)
    pub directions: u8,
}

#[derive(Default)]
struct PairAcc {
    forward: Option<f64>,
    backward: Option<f64>,
}

/// Combine A→B and B→A into one entry per airport pair.
///
/// Both directions present: arithmetic mean of the two percentages (not
/// weighted by flight count, not rounded again). One direction: its percentage as-is. Directions
/// without flights are ignored. Output is in first-seen order of each pair.
pub fn collapse_routes(records: &[AggregateRecord]) -> Vec<RoutePairStat> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut pairs: HashMap<(String, String), PairAcc> = HashMap::new();

    for record in records {
        let AggregateKey::Route { origin, destination } = &record.key else {
            continue;
        };
        if record.total_flights == 0 {
            continue;
        }

        let forward = origin <= destination;
        let pair = if forward {
            (origin.clone(), destination.clone())
        } else {
            (destination.clone(), origin.clone())
        };

        let acc = pairs.entry(pair.clone()).or_insert_with(|| {
            order.push(pair);
            PairAcc::default()
        });
        if forward {
            acc.forward = Some(record.percentage_delayed);
        } else {
            acc.backward = Some(record.percentage_delayed);
        }
    }

    order
        .into_iter()
        .filter_map(|pair| {
            let acc = pairs.remove(&pair)?;
            let (percentage_delayed, directions) = match (acc.forward, acc.backward) {
                (Some(f), Some(b)) => ((f + b) / 2.0, 2),
                (Some(p), None) | (None, Some(p)) => (p, 1),
                (None, None) => return None,
            };
            Some(RoutePairStat {
                airport_a: pair.0,
                airport_b: pair.1,
                percentage_delayed,
                directions,
            })
        })
        .collect()
}
