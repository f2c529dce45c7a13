//! SQL text for every access pattern
//!
//! The dataset has two tables:
//! - flights(ID, YEAR, MONTH, DAY, AIRLINE, FLIGHT_NUMBER, ORIGIN_AIRPORT,
//!   DESTINATION_AIRPORT, DEPARTURE_TIME, DEPARTURE_DELAY, ...)
//! - airlines(id, airline)
//!
//! The delay threshold is always bound as a parameter, never formatted in.
//! Every query carries an ORDER BY so results are stable across calls.

/// Canonical flight projection, joined to resolve the airline name
macro_rules! select_flights {
    () => {
        "SELECT flights.ID AS id, flights.YEAR AS year, flights.MONTH AS month, flights.DAY AS day, \
                flights.ORIGIN_AIRPORT AS origin_airport, flights.DESTINATION_AIRPORT AS destination_airport, \
                airlines.airline AS airline_name, flights.DEPARTURE_DELAY AS delay, \
                flights.FLIGHT_NUMBER AS flight_number \
         FROM flights \
         JOIN airlines ON flights.AIRLINE = airlines.id "
    };
}

/// Hour of day from an HHMM-style departure time
macro_rules! departure_hour {
    () => {
        "CAST(SUBSTR(flights.DEPARTURE_TIME, 1, 2) AS INTEGER)"
    };
}

/// ?1 = id
pub const FLIGHT_BY_ID: &str = concat!(select_flights!(), "WHERE flights.ID = ?1");

/// ?1 = day, ?2 = month, ?3 = year
pub const FLIGHTS_BY_DATE: &str = concat!(
    select_flights!(),
    "WHERE flights.DAY = ?1 AND flights.MONTH = ?2 AND flights.YEAR = ?3 \
     ORDER BY flights.ID"
);

/// ?1 = threshold
pub const DELAYED_FLIGHTS: &str = concat!(
    select_flights!(),
    "WHERE flights.DEPARTURE_DELAY >= ?1 \
     ORDER BY airlines.airline, flights.DEPARTURE_DELAY DESC, flights.ID"
);

/// ?1 = origin code
pub const FLIGHTS_BY_ORIGIN: &str = concat!(
    select_flights!(),
    "WHERE flights.ORIGIN_AIRPORT = ?1 ORDER BY flights.ID"
);

/// ?1 = destination code
pub const FLIGHTS_BY_DESTINATION: &str = concat!(
    select_flights!(),
    "WHERE flights.DESTINATION_AIRPORT = ?1 ORDER BY flights.ID"
);

/// ?1 = origin code, ?2 = threshold
pub const DELAYED_FLIGHTS_BY_AIRPORT: &str = concat!(
    select_flights!(),
    "WHERE flights.ORIGIN_AIRPORT = ?1 \
       AND flights.DEPARTURE_DELAY IS NOT NULL \
       AND flights.DEPARTURE_DELAY >= ?2 \
     ORDER BY flights.DEPARTURE_DELAY DESC, flights.ID"
);

/// ?1 = day, ?2 = month, ?3 = year, ?4 = limit
pub const TOP_DELAYED_FLIGHTS_BY_DATE: &str = concat!(
    select_flights!(),
    "WHERE flights.DEPARTURE_DELAY IS NOT NULL \
       AND flights.DEPARTURE_DELAY > 0 \
       AND flights.DAY = ?1 AND flights.MONTH = ?2 AND flights.YEAR = ?3 \
     ORDER BY flights.DEPARTURE_DELAY DESC, flights.ID \
     LIMIT ?4"
);

/// ?1 = threshold
pub const DELAYED_FLIGHTS_BY_AIRLINE: &str = r#"
SELECT airlines.airline AS airline_name, COUNT(*) AS delayed_flights
FROM flights
JOIN airlines ON flights.AIRLINE = airlines.id
WHERE flights.DEPARTURE_DELAY >= ?1
GROUP BY airlines.airline
ORDER BY airlines.airline
"#;

/// ?1 = threshold, ?2 = airline name
pub const DELAYED_FLIGHTS_FOR_AIRLINE: &str = r#"
SELECT airlines.airline AS airline_name, COUNT(*) AS delayed_flights
FROM flights
JOIN airlines ON flights.AIRLINE = airlines.id
WHERE flights.DEPARTURE_DELAY >= ?1
  AND airlines.airline = ?2
GROUP BY airlines.airline
ORDER BY airlines.airline
"#;

pub const TOTAL_FLIGHTS_BY_AIRLINE: &str = r#"
SELECT airlines.airline AS airline_name, COUNT(*) AS total_flights
FROM flights
JOIN airlines ON flights.AIRLINE = airlines.id
GROUP BY airlines.airline
ORDER BY airlines.airline
"#;

/// ?1 = threshold
pub const DELAYED_FLIGHTS_BY_HOUR: &str = concat!(
    "SELECT ",
    departure_hour!(),
    " AS hour, COUNT(*) AS delayed_flights \
     FROM flights \
     WHERE flights.DEPARTURE_DELAY >= ?1 \
     GROUP BY hour \
     ORDER BY hour"
);

pub const TOTAL_FLIGHTS_BY_HOUR: &str = concat!(
    "SELECT ",
    departure_hour!(),
    " AS hour, COUNT(*) AS total_flights \
     FROM flights \
     GROUP BY hour \
     ORDER BY hour"
);

/// ?1 = threshold
pub const DELAYED_FLIGHTS_BY_ROUTE: &str = r#"
SELECT flights.ORIGIN_AIRPORT AS origin_airport,
       flights.DESTINATION_AIRPORT AS destination_airport,
       COUNT(*) AS delayed_flights
FROM flights
WHERE flights.DEPARTURE_DELAY >= ?1
GROUP BY flights.ORIGIN_AIRPORT, flights.DESTINATION_AIRPORT
ORDER BY flights.ORIGIN_AIRPORT, flights.DESTINATION_AIRPORT
"#;

pub const TOTAL_FLIGHTS_BY_ROUTE: &str = r#"
SELECT flights.ORIGIN_AIRPORT AS origin_airport,
       flights.DESTINATION_AIRPORT AS destination_airport,
       COUNT(*) AS total_flights
FROM flights
GROUP BY flights.ORIGIN_AIRPORT, flights.DESTINATION_AIRPORT
ORDER BY flights.ORIGIN_AIRPORT, flights.DESTINATION_AIRPORT
"#;
