use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::db::{DbError, StoredReading};
use crate::services::{ReadingService, WeatherService};
use crate::weather::{CanonicalReading, Measurement, Trend, WindDirection};

#[derive(Clone)]
pub struct AppState {
    pub weather_service: WeatherService,
    pub reading_service: ReadingService,
}

#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceHealth {
    /// `connected` or `unavailable`
    pub database: String,
    /// `available`, `unavailable` or `synthetic`
    pub weather_api: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Maximum number of readings, newest first (default 24)
    pub limit: Option<i64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(root, health, get_current_weather, get_weather_history),
    components(schemas(
        RootResponse,
        HealthResponse,
        ServiceHealth,
        CanonicalReading,
        Measurement,
        WindDirection,
        Trend,
        StoredReading
    )),
    tags((name = "weather", description = "Weather station readings"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/weather/sivas", get(get_current_weather))
        .route("/weather/history", get(get_weather_history))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", api_routes).layer(cors)
}

#[utoipa::path(
    get,
    path = "/api",
    tag = "weather",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Weather Station API".to_string(),
        status: "active".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "weather",
    responses(
        (status = 200, description = "Datastore reachable", body = HealthResponse),
        (status = 503, description = "Datastore unreachable", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let database_up = state.weather_service.database_reachable().await;
    let upstream = state.weather_service.upstream_status().await;

    let (status_code, status) = if database_up {
        (StatusCode::OK, "healthy")
    } else {
        warn!("Health check degraded: datastore unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        services: ServiceHealth {
            database: if database_up { "connected" } else { "unavailable" }.to_string(),
            weather_api: upstream.as_str().to_string(),
        },
    };
    info!(
        "Health check: database={}, weather_api={}",
        response.services.database, response.services.weather_api
    );
    (status_code, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/weather/sivas",
    tag = "weather",
    responses((status = 200, description = "Current reading, live or synthetic", body = CanonicalReading))
)]
#[instrument(skip(state))]
async fn get_current_weather(State(state): State<AppState>) -> Json<CanonicalReading> {
    debug!("Fetching current weather");
    let current = state.weather_service.current_weather().await;

    match &current.persisted {
        Ok(stored) => info!(
            "Served current weather ({}°C, {}) and stored reading {}",
            current.reading.temperature.value, stored.source, stored.id
        ),
        Err(e) => warn!("Served current weather but could not store it: {}", e),
    }

    Json(current.reading)
}

#[utoipa::path(
    get,
    path = "/api/weather/history",
    tag = "weather",
    params(HistoryParams),
    responses(
        (status = 200, description = "Stored readings, newest first", body = [StoredReading]),
        (status = 400, description = "Limit is not positive"),
        (status = 500, description = "Datastore error")
    )
)]
#[instrument(skip(state))]
async fn get_weather_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<StoredReading>>, StatusCode> {
    debug!("Fetching weather history (limit={:?})", params.limit);
    let readings = state
        .reading_service
        .history(params.limit)
        .await
        .map_err(|e| match e {
            DbError::InvalidArgument(msg) => {
                warn!("Rejected history request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            DbError::Persistence(e) => {
                error!("Failed to fetch weather history: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    info!("Retrieved {} historical readings", readings.len());
    Ok(Json(readings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let spec = generate_openapi_spec();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in ["/api", "/api/health", "/api/weather/sivas", "/api/weather/history"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }
}
