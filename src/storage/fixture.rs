//! In-memory sample dataset shared by the unit tests

use rusqlite::Connection;

use super::FlightStore;

const SCHEMA: &str = r#"
CREATE TABLE airlines (
    id INTEGER PRIMARY KEY,
    airline TEXT NOT NULL
);
CREATE TABLE flights (
    ID INTEGER PRIMARY KEY,
    YEAR INTEGER NOT NULL,
    MONTH INTEGER NOT NULL,
    DAY INTEGER NOT NULL,
    DAY_OF_WEEK INTEGER,
    AIRLINE INTEGER NOT NULL REFERENCES airlines(id),
    FLIGHT_NUMBER INTEGER,
    TAIL_NUMBER TEXT,
    ORIGIN_AIRPORT TEXT NOT NULL,
    DESTINATION_AIRPORT TEXT NOT NULL,
    SCHEDULED_DEPARTURE TEXT,
    DEPARTURE_TIME TEXT,
    DEPARTURE_DELAY REAL
);
"#;

/// Eight flights over two days, three airports, two airlines with flights.
///
/// | id | date       | airline | route   | dep  | delay |
/// |----|------------|---------|---------|------|-------|
/// | 1  | 01/01/2015 | Delta   | LAX-JFK | 0830 | 25    |
/// | 2  | 01/01/2015 | United  | JFK-LAX | 0915 | 45    |
/// | 3  | 01/01/2015 | Delta   | LAX-SFO | 0845 | 5     |
/// | 4  | 01/01/2015 | United  | SFO-LAX | 1400 | NULL  |
/// | 5  | 02/01/2015 | Delta   | JFK-LAX | 1410 | 60    |
/// | 6  | 02/01/2015 | United  | LAX-JFK | 2305 | -3    |
/// | 7  | 02/01/2015 | Delta   | SFO-JFK | 0805 | 20    |
/// | 8  | 01/01/2015 | Delta   | LAX-JFK | 1455 | 0     |
const DATA: &str = r#"
INSERT INTO airlines (id, airline) VALUES (1, 'Delta'), (2, 'United'), (3, 'Alaska');
INSERT INTO flights (ID, YEAR, MONTH, DAY, DAY_OF_WEEK, AIRLINE, FLIGHT_NUMBER, TAIL_NUMBER,
                     ORIGIN_AIRPORT, DESTINATION_AIRPORT, SCHEDULED_DEPARTURE, DEPARTURE_TIME, DEPARTURE_DELAY)
VALUES
    (1, 2015, 1, 1, 4, 1, 100, 'N100', 'LAX', 'JFK', '0805', '0830', 25),
    (2, 2015, 1, 1, 4, 2, 200, 'N200', 'JFK', 'LAX', '0830', '0915', 45),
    (3, 2015, 1, 1, 4, 1, 101, 'N101', 'LAX', 'SFO', '0840', '0845', 5),
    (4, 2015, 1, 1, 4, 2, 201, 'N201', 'SFO', 'LAX', '1400', '1400', NULL),
    (5, 2015, 1, 2, 5, 1, 102, 'N102', 'JFK', 'LAX', '1310', '1410', 60),
    (6, 2015, 1, 2, 5, 2, 202, 'N202', 'LAX', 'JFK', '2308', '2305', -3),
    (7, 2015, 1, 2, 5, 1, 103, 'N103', 'SFO', 'JFK', '0745', '0805', 20),
    (8, 2015, 1, 1, 4, 1, 104, 'N104', 'LAX', 'JFK', '1455', '1455', 0);
"#;

pub fn populate(conn: &Connection) {
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(DATA).unwrap();
}

pub fn sample_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn);
    conn
}

pub fn sample_store() -> FlightStore {
    FlightStore::from_connection(sample_connection())
}

/// A store whose connection has no tables at all
pub fn broken_store() -> FlightStore {
    FlightStore::from_connection(Connection::open_in_memory().unwrap())
}
