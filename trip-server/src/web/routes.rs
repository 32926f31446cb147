//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{InvalidLocationId, Location, LocationId, TripId};
use crate::locations::{Geocoder, LocationError};
use crate::trips::TripError;

use super::dto::*;
use super::state::{AppState, RideBackend};

/// Create the application router.
pub fn create_router<R, G>(state: AppState<R, G>) -> Router
where
    R: RideBackend,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/locations", post(create_location::<R, G>))
        .route(
            "/locations/:id",
            get(get_location::<R, G>)
                .put(update_location::<R, G>)
                .delete(delete_location::<R, G>),
        )
        .route("/trips", post(plan_trip::<R, G>))
        .route("/trips/:id", get(get_trip::<R, G>))
        .route("/trips/:id/request", put(request_next_leg::<R, G>))
        .route("/trips/:id/progress", get(trip_progress::<R, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body ourselves so malformed input gets the usual error shape.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("invalid JSON: {e}")))
}

fn parse_trip_id(raw: &str) -> Result<TripId, AppError> {
    TripId::parse(raw).ok_or_else(|| AppError::Validation(format!("invalid trip id {raw:?}")))
}

async fn create_location<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let req: CreateLocationRequest = parse_body(&body)?;
    let location = state.locations.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn get_location<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<Location>, AppError> {
    let id = LocationId::parse(&id)?;
    Ok(Json(state.locations.get(id).await?))
}

async fn update_location<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Location>, AppError> {
    let id = LocationId::parse(&id)?;
    let req: UpdateLocationRequest = parse_body(&body)?;
    Ok(Json(state.locations.update(id, req.into()).await?))
}

async fn delete_location<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = LocationId::parse(&id)?;
    state.locations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Plan a trip over saved locations.
async fn plan_trip<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TripResponse>), AppError> {
    let req: PlanTripRequest = parse_body(&body)?;

    let origin = LocationId::parse(&req.starting_from_location_id)?;
    let stops = req
        .location_ids
        .iter()
        .map(|raw| LocationId::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = state.planner.plan(origin, &stops).await?;
    Ok((StatusCode::CREATED, Json(plan.into())))
}

async fn get_trip<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    let id = parse_trip_id(&id)?;
    Ok(Json(state.planner.trip(id).await?.into()))
}

/// Request a ride for the next leg of a trip.
async fn request_next_leg<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, AppError> {
    let id = parse_trip_id(&id)?;
    Ok(Json(state.progressor.advance(id).await?.into()))
}

async fn trip_progress<R: RideBackend, G: Geocoder + 'static>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProgressResponse>>, AppError> {
    let id = parse_trip_id(&id)?;
    let history = state.progressor.history(id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Application error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    UpstreamUnavailable(String),
    DispatchFailed(String),
    NoProductAvailable(String),
    AlreadyCompleted(String),
    Storage(String),
}

impl AppError {
    /// Error class reported in the `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::DispatchFailed(_) => "dispatch_failed",
            AppError::NoProductAvailable(_) => "no_product_available",
            AppError::AlreadyCompleted(_) => "already_completed",
            AppError::Storage(_) => "storage_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_)
            | AppError::DispatchFailed(_)
            | AppError::NoProductAvailable(_) => StatusCode::BAD_GATEWAY,
            AppError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Validation(m)
            | AppError::NotFound(m)
            | AppError::UpstreamUnavailable(m)
            | AppError::DispatchFailed(m)
            | AppError::NoProductAvailable(m)
            | AppError::AlreadyCompleted(m)
            | AppError::Storage(m) => m,
        }
    }
}

impl From<InvalidLocationId> for AppError {
    fn from(e: InvalidLocationId) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<TripError> for AppError {
    fn from(e: TripError) -> Self {
        let message = e.to_string();
        match e {
            TripError::Validation(_) => AppError::Validation(message),
            TripError::LocationNotFound(_) | TripError::TripNotFound(_) => {
                AppError::NotFound(message)
            }
            TripError::UpstreamUnavailable(_) => AppError::UpstreamUnavailable(message),
            TripError::NoProductAvailable(_) => AppError::NoProductAvailable(message),
            TripError::DispatchFailed(_) => AppError::DispatchFailed(message),
            TripError::AlreadyCompleted(_) => AppError::AlreadyCompleted(message),
            TripError::Storage(_) => AppError::Storage(message),
        }
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        let message = e.to_string();
        match e {
            LocationError::Validation(_) | LocationError::Unresolvable(_) => {
                AppError::Validation(message)
            }
            LocationError::NotFound(_) => AppError::NotFound(message),
            LocationError::UpstreamUnavailable(_) => AppError::UpstreamUnavailable(message),
            LocationError::Storage(_) => AppError::Storage(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            error!(%status, kind, error = self.message(), "request failed");
        } else {
            warn!(%status, kind, error = self.message(), "request rejected");
        }

        let body = Json(ErrorResponse {
            kind: kind.to_string(),
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
