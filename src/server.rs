use crate::config::{AppConfig, RangeConfig};
use crate::data::Dataset;
use crate::error::DashboardError;
use crate::processing::{self, PrefixCount, RangeSummary};
use crate::render::{self, MapLayer};
use crate::types::{CoordinateRange, Field, Venue};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info};

pub struct AppState {
    pub dataset: Dataset,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct AreaParams {
    name: String,
}

#[derive(Deserialize)]
pub struct AddressParams {
    address: String,
}

#[derive(Deserialize)]
pub struct RangeParams {
    min_easting: f64,
    max_easting: f64,
    min_northing: f64,
    max_northing: f64,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    areas: Vec<String>,
    addresses: Vec<String>,
    range: RangeConfig,
}

#[derive(Serialize)]
pub struct AreaResponse {
    area: String,
    count: usize,
    venues: Vec<Venue>,
    map: MapLayer,
}

#[derive(Serialize)]
pub struct PostalResponse {
    area: String,
    groups: Vec<PrefixCount>,
}

#[derive(Serialize)]
pub struct AddressResponse {
    venue: Venue,
    matches: usize,
    map: MapLayer,
}

/// Query failures as HTTP responses.
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DashboardError::EmptySelection { .. } => StatusCode::NOT_FOUND,
            DashboardError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/options", get(options_handler))
        .route("/api/area", get(area_handler))
        .route("/api/area/postal", get(postal_handler))
        .route("/api/range", get(range_handler))
        .route("/api/address", get(address_handler));

    if let Some(dir) = &state.config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive()).with_state(state)
}

pub async fn start_server(config: AppConfig, dataset: Dataset) -> Result<()> {
    let port = config.server.port;
    let state = Arc::new(AppState { dataset, config });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn options_handler(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        areas: processing::distinct_sorted(&state.dataset, Field::Area),
        addresses: processing::distinct_sorted(&state.dataset, Field::Address),
        range: state.config.range.clone(),
    })
}

async fn area_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AreaParams>,
) -> Result<Json<AreaResponse>, ApiError> {
    debug!("Area query: {}", params.name);
    let selection = processing::filter_by_area(&state.dataset, &params.name)?;
    let map = render::area_layer(&selection, &state.config.map);

    Ok(Json(AreaResponse {
        count: selection.venues.len(),
        venues: selection.venues.iter().map(|v| (*v).clone()).collect(),
        area: selection.area,
        map,
    }))
}

async fn postal_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AreaParams>,
) -> Result<Json<PostalResponse>, ApiError> {
    debug!("Postal prefix query: {}", params.name);
    let selection = processing::filter_by_area(&state.dataset, &params.name)?;
    let groups = processing::group_by_postal_prefix(
        selection.venues.iter().copied(),
        state.config.query.postal_prefix_len,
    );

    Ok(Json(PostalResponse {
        area: selection.area,
        groups,
    }))
}

async fn range_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<RangeSummary>, ApiError> {
    debug!(
        "Range query: easting [{}, {}], northing [{}, {}]",
        params.min_easting, params.max_easting, params.min_northing, params.max_northing
    );
    let range = CoordinateRange::new(
        (params.min_easting, params.max_easting),
        (params.min_northing, params.max_northing),
        state.config.range.easting_domain,
        state.config.range.northing_domain,
    )?;
    Ok(Json(processing::filter_by_range(&state.dataset, &range)))
}

async fn address_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AddressParams>,
) -> Result<Json<AddressResponse>, ApiError> {
    debug!("Address lookup: {}", params.address);
    let venue = processing::find_by_address(&state.dataset, &params.address)?;

    Ok(Json(AddressResponse {
        matches: processing::all_by_address(&state.dataset, &params.address).len(),
        map: render::address_layer(venue, &state.config.map),
        venue: venue.clone(),
    }))
}
