//! JSON API handlers
//!
//! Every response uses the same envelope: `{"success": true, "data": ...}` with
//! 200, or `{"success": false, "error": "..."}` with 400 for validation failures
//! and unknown flights, 503 when the dataset cannot be read.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::flight::{AirportCode, FlightDate, INVALID_DATE_MESSAGE};
use crate::server::AppState;
use crate::stats::{Dimension, StatsAggregator};
use crate::storage::FlightStore;
use crate::Error;

/// Number of flights returned by the top-delayed endpoint when no limit is given
pub const DEFAULT_TOP_LIMIT: usize = 5;

const INVALID_LIMIT_MESSAGE: &str = "Invalid limit. Please use a positive number.";

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type Rejection = (StatusCode, Json<Envelope>);
pub type ApiResult = Result<Json<Envelope>, Rejection>;

#[derive(Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
}

fn respond<T: Serialize>(data: &T) -> ApiResult {
    let data = serde_json::to_value(data)
        .map_err(|e| reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(Envelope {
        success: true,
        data: Some(data),
        error: None,
    }))
}

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> Rejection {
    reject(StatusCode::BAD_REQUEST, message)
}

impl From<Error> for Rejection {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidInput(message) => bad_request(message),
            Error::StoreUnavailable(_) | Error::MalformedRow(_) => reject(
                StatusCode::SERVICE_UNAVAILABLE,
                "Flight data is currently unavailable",
            ),
            other => reject(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

/// Run one request's worth of store work under the lock
async fn with_store<T>(
    state: &AppState,
    f: impl FnOnce(&FlightStore) -> crate::Result<T>,
) -> Result<T, Rejection> {
    let store = state.store.lock().await;
    f(&store).map_err(Rejection::from)
}

fn parse_date(year: &str, month: &str, day: &str) -> Result<FlightDate, Rejection> {
    let parsed = (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>());
    let (Ok(year), Ok(month), Ok(day)) = parsed else {
        return Err(bad_request(INVALID_DATE_MESSAGE));
    };
    FlightDate::new(day, month, year).map_err(Rejection::from)
}

pub async fn index() -> Json<Value> {
    Json(serde_json::json!({
        "name": "Flights Data API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/flights/{flight_id}",
            "/api/flights/date/{year}/{month}/{day}",
            "/api/flights/date/{year}/{month}/{day}/top?limit={n}",
            "/api/flights/delayed",
            "/api/flights/origin/{origin_code}",
            "/api/flights/destination/{destination_code}",
            "/api/flights/delayed/origin/{origin_code}",
            "/api/flights/delayed/airline/{airline_name}",
            "/api/stats/airlines",
            "/api/stats/hours",
            "/api/stats/routes",
            "/api/stats/routes/pairs"
        ]
    }))
}

pub async fn get_flight_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: i64 = id
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| bad_request("Invalid flight ID. Please use a positive number."))?;

    let flights = with_store(&state, |store| store.flight_by_id(id)).await?;
    if flights.is_empty() {
        return Err(bad_request(format!("Flight with ID {} not found", id)));
    }
    respond(&flights)
}

pub async fn get_flights_by_date(
    State(state): State<Arc<AppState>>,
    Path((year, month, day)): Path<(String, String, String)>,
) -> ApiResult {
    let date = parse_date(&year, &month, &day)?;
    let flights =
        with_store(&state, |store| store.flights_by_date(date.day, date.month, date.year)).await?;
    respond(&flights)
}

pub async fn get_top_delayed_flights_by_date(
    State(state): State<Arc<AppState>>,
    Path((year, month, day)): Path<(String, String, String)>,
    params: Result<Query<TopParams>, QueryRejection>,
) -> ApiResult {
    let date = parse_date(&year, &month, &day)?;
    let Query(params) = params.map_err(|e| {
        tracing::debug!("rejected query string: {}", e);
        bad_request(INVALID_LIMIT_MESSAGE)
    })?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let flights = with_store(&state, |store| {
        store.top_delayed_flights_by_date(date.day, date.month, date.year, limit)
    })
    .await?;
    respond(&flights)
}

pub async fn get_delayed_flights(State(state): State<Arc<AppState>>) -> ApiResult {
    let flights = with_store(&state, FlightStore::delayed_flights).await?;
    respond(&flights)
}

pub async fn get_flights_by_origin(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult {
    let code = AirportCode::parse(&code)?;
    let flights = with_store(&state, |store| store.flights_by_origin(code.as_str())).await?;
    respond(&flights)
}

pub async fn get_flights_by_destination(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult {
    let code = AirportCode::parse(&code)?;
    let flights = with_store(&state, |store| store.flights_by_destination(code.as_str())).await?;
    respond(&flights)
}

pub async fn get_delayed_flights_by_airport(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult {
    let code = AirportCode::parse(&code)?;
    let flights =
        with_store(&state, |store| store.delayed_flights_by_airport(code.as_str())).await?;
    respond(&flights)
}

pub async fn get_delayed_flights_by_airline(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult {
    let counts = with_store(&state, |store| store.delayed_flights_by_airline(Some(&name))).await?;
    let data: Vec<Value> = counts
        .into_iter()
        .map(|c| serde_json::json!({ "airline": c.key, "delayed_flights": c.count }))
        .collect();
    respond(&data)
}

async fn stats(state: &AppState, dimension: Dimension) -> ApiResult {
    let records =
        with_store(state, |store| StatsAggregator::new(store).aggregate(dimension)).await?;
    respond(&records)
}

pub async fn get_airline_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    stats(&state, Dimension::Airline).await
}

pub async fn get_hourly_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    stats(&state, Dimension::Hour).await
}

pub async fn get_route_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    stats(&state, Dimension::Route).await
}

pub async fn get_route_pair_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    let pairs = with_store(&state, |store| StatsAggregator::new(store).route_pairs()).await?;
    respond(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture::{broken_store, sample_store};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn state() -> Arc<AppState> {
        AppState::new(sample_store())
    }

    fn data(result: ApiResult) -> Vec<Value> {
        let Json(envelope) = result.unwrap();
        assert!(envelope.success);
        assert!(envelope.error.is_none());
        envelope.data.unwrap().as_array().unwrap().clone()
    }

    fn rejected(result: ApiResult) -> (StatusCode, String) {
        let (status, Json(envelope)) = result.unwrap_err();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        (status, envelope.error.unwrap())
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let Json(body) = index().await;
        assert_eq!(body["name"], "Flights Data API");
        assert!(!body["endpoints"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flight_by_id_found() {
        let flights = data(get_flight_by_id(State(state()), Path("2".to_string())).await);
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0]["id"], 2);
        assert_eq!(flights[0]["origin_airport"], "JFK");
        assert_eq!(flights[0]["airline_name"], "United");
        assert_eq!(flights[0]["delay"], 45.0);
    }

    #[tokio::test]
    async fn test_flight_by_id_not_found() {
        let (status, error) = rejected(get_flight_by_id(State(state()), Path("99999".to_string())).await);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, "Flight with ID 99999 not found");
    }

    #[tokio::test]
    async fn test_flight_by_id_malformed() {
        for bad in ["abc", "0", "-3"] {
            let (status, error) = rejected(get_flight_by_id(State(state()), Path(bad.to_string())).await);
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(error.starts_with("Invalid flight ID"));
        }
    }

    #[tokio::test]
    async fn test_flights_by_date() {
        let path = Path(("2015".to_string(), "1".to_string(), "2".to_string()));
        let flights = data(get_flights_by_date(State(state()), path).await);
        let ids: Vec<_> = flights.iter().map(|f| f["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [5, 6, 7]);
    }

    #[tokio::test]
    async fn test_flights_by_date_invalid_month() {
        // Broken store: the request must be rejected before any query runs
        let broken = AppState::new(broken_store());
        let path = Path(("2023".to_string(), "13".to_string(), "15".to_string()));
        let (status, error) = rejected(get_flights_by_date(State(broken), path).await);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, INVALID_DATE_MESSAGE);

        let path = Path(("2023".to_string(), "june".to_string(), "15".to_string()));
        let (status, _) = rejected(get_flights_by_date(State(state()), path).await);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_top_delayed_flights() {
        let path = || Path(("2015".to_string(), "1".to_string(), "1".to_string()));
        let flights = data(
            get_top_delayed_flights_by_date(State(state()), path(), Ok(Query(TopParams { limit: None }))).await,
        );
        let ids: Vec<_> = flights.iter().map(|f| f["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [2, 1, 3]);

        let flights = data(
            get_top_delayed_flights_by_date(State(state()), path(), Ok(Query(TopParams { limit: Some(1) })))
                .await,
        );
        assert_eq!(flights.len(), 1);

        let (status, _) = rejected(
            get_top_delayed_flights_by_date(State(state()), path(), Ok(Query(TopParams { limit: Some(0) })))
                .await,
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_flights_by_origin_any_case() {
        let upper = data(get_flights_by_origin(State(state()), Path("LAX".to_string())).await);
        let lower = data(get_flights_by_origin(State(state()), Path("lax".to_string())).await);
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 4);
        assert!(upper.iter().all(|f| f["origin_airport"] == "LAX"));
    }

    #[tokio::test]
    async fn test_invalid_iata_code() {
        for bad in ["LAXX", "L1X", "LA"] {
            let (status, error) =
                rejected(get_flights_by_destination(State(state()), Path(bad.to_string())).await);
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error, crate::flight::INVALID_IATA_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_delayed_endpoints() {
        let flights = data(get_delayed_flights(State(state())).await);
        assert_eq!(flights.len(), 4);

        let flights = data(get_delayed_flights_by_airport(State(state()), Path("jfk".to_string())).await);
        let ids: Vec<_> = flights.iter().map(|f| f["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [5, 2]);

        let counts =
            data(get_delayed_flights_by_airline(State(state()), Path("Delta".to_string())).await);
        assert_eq!(counts, [serde_json::json!({"airline": "Delta", "delayed_flights": 3})]);
    }

    #[tokio::test]
    async fn test_airline_stats() {
        let stats = data(get_airline_stats(State(state())).await);
        assert_eq!(stats.len(), 2);
        let united = stats.iter().find(|s| s["airline"] == "United").unwrap();
        assert_eq!(united["total_flights"], 3);
        assert_eq!(united["delayed_flights"], 1);
        assert_eq!(united["percentage_delayed"], 33.33);
    }

    #[tokio::test]
    async fn test_hourly_stats_sorted() {
        let stats = data(get_hourly_stats(State(state())).await);
        let hours: Vec<_> = stats.iter().map(|s| s["hour"].as_u64().unwrap()).collect();
        assert_eq!(hours, [8, 9, 14, 23]);
    }

    #[tokio::test]
    async fn test_route_stats() {
        let stats = data(get_route_stats(State(state())).await);
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[0]["origin"], "JFK");
        assert_eq!(stats[0]["destination"], "LAX");

        let pairs = data(get_route_pair_stats(State(state())).await);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0]["airport_a"], "JFK");
        assert_eq!(pairs[0]["directions"], 2);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let broken = AppState::new(broken_store());
        let (status, error) = rejected(get_airline_stats(State(broken.clone())).await);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error, "Flight data is currently unavailable");

        let (status, _) = rejected(get_flight_by_id(State(broken), Path("1".to_string())).await);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    async fn http_get(uri: &str) -> (u16, Envelope) {
        let app = crate::server::router(state());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", uri);
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        let status = response.split_whitespace().nth(1).unwrap().parse().unwrap();
        let body = response.split("\r\n\r\n").nth(1).unwrap();
        let envelope: Envelope = serde_json::from_str(body)
            .unwrap_or_else(|e| panic!("body is not an envelope ({e}): {body}"));
        (status, envelope)
    }

    #[tokio::test]
    async fn test_served_over_http() {
        let (status, envelope) = http_get("/api/flights/99999").await;
        assert_eq!(status, 400);
        assert!(!envelope.success);
        assert!(envelope.error.is_some());

        let (status, envelope) = http_get("/api/flights/date/2015/1/1/top?limit=2").await;
        assert_eq!(status, 200);
        assert_eq!(envelope.data.unwrap().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_limit_uses_envelope() {
        for query in ["limit=abc", "limit=-1", "limit=1.5"] {
            let (status, envelope) = http_get(&format!("/api/flights/date/2015/1/1/top?{query}")).await;
            assert_eq!(status, 400, "{query}");
            assert!(!envelope.success);
            assert_eq!(envelope.error.as_deref(), Some(INVALID_LIMIT_MESSAGE));
        }
    }
}
