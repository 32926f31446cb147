use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trip_server::config::{AppConfig, ConfigError};
use trip_server::geocode::{GeocodeClient, GeocodeError};
use trip_server::ride::{RideClient, RideError};
use trip_server::store::MemoryStore;
use trip_server::web::{AppState, create_router};

/// Reasons the server could not start.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("ride client: {0}")]
    Ride(#[from] RideError),

    #[error("geocoding client: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "trip server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    let ride = RideClient::new(config.ride.clone())?;
    let geocoder = GeocodeClient::new(config.geocode.clone())?;

    let state = AppState::new(
        ride,
        geocoder,
        MemoryStore::new(),
        config.trips.clone(),
        &config.cache,
        config.geocode_policy,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "trip server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
