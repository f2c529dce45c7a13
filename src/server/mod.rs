use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::storage::FlightStore;
use crate::ui::Icons;

pub mod routes;

/// Server state
pub struct AppState {
    pub store: Mutex<FlightStore>,
}

impl AppState {
    pub fn new(store: FlightStore) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/flights/delayed", get(routes::get_delayed_flights))
        .route("/api/flights/{id}", get(routes::get_flight_by_id))
        .route("/api/flights/date/{year}/{month}/{day}", get(routes::get_flights_by_date))
        .route(
            "/api/flights/date/{year}/{month}/{day}/top",
            get(routes::get_top_delayed_flights_by_date),
        )
        .route("/api/flights/origin/{code}", get(routes::get_flights_by_origin))
        .route("/api/flights/destination/{code}", get(routes::get_flights_by_destination))
        .route(
            "/api/flights/delayed/origin/{code}",
            get(routes::get_delayed_flights_by_airport),
        )
        .route(
            "/api/flights/delayed/airline/{name}",
            get(routes::get_delayed_flights_by_airline),
        )
        .route("/api/stats/airlines", get(routes::get_airline_stats))
        .route("/api/stats/hours", get(routes::get_hourly_stats))
        .route("/api/stats/routes", get(routes::get_route_stats))
        .route("/api/stats/routes/pairs", get(routes::get_route_pair_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(settings: &Settings) -> anyhow::Result<()> {
    let store = FlightStore::open(&settings.database)?.with_delay_threshold(settings.delay_threshold);
    let state = AppState::new(store);
    let app = router(state);

    let host: std::net::IpAddr = settings.host.parse()?;
    let addr = SocketAddr::from((host, settings.port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
