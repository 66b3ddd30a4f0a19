//! JSON endpoints, one per dashboard callback.
//!
//! Missing query parameters fall back to the configured control defaults.

use atlas_core::{ControlDefaults, DashboardConfig, FeaturePolicy, Metric, ResortTable};
use atlas_query::{MapFilter, QueryError};
use atlas_view::{CountryPanel, MapView, PriceSlider};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ResortTable>,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    pub fn new(table: ResortTable, config: DashboardConfig) -> Self {
        Self {
            table: Arc::new(table),
            config: Arc::new(config),
        }
    }
}

/// Controls of the map tab.
#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    pub max_price: Option<f64>,
    pub summer: Option<bool>,
    pub night: Option<bool>,
    pub snowparks: Option<bool>,
    pub continent: Option<String>,
}

/// Controls of the country tab plus the hovered bar.
#[derive(Debug, Default, Deserialize)]
pub struct CountryParams {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub metric: Option<String>,
    pub hovered: Option<String>,
}

/// Everything the host needs to populate its controls.
#[derive(Debug, Serialize)]
pub struct OptionsDto {
    pub continents: Vec<String>,
    pub metrics: Vec<Metric>,
    pub price_slider: PriceSlider,
    pub feature_policy: FeaturePolicy,
    pub defaults: ControlDefaults,
}

/// A rejected control value.
#[derive(Debug)]
pub struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "rejected request");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[instrument(skip(state))]
pub async fn map_handler(
    State(state): State<AppState>,
    Query(params): Query<MapParams>,
) -> Json<MapView> {
    let defaults = &state.config.defaults;
    let filter = MapFilter {
        max_price: params.max_price.unwrap_or(defaults.max_price),
        summer_only: params.summer.unwrap_or(false),
        night_only: params.night.unwrap_or(false),
        snowpark_only: params.snowparks.unwrap_or(false),
    };
    let continent = params.continent.as_deref().unwrap_or(&defaults.continent);
    Json(atlas_view::map_view(
        &state.table,
        &filter,
        state.config.feature_policy,
        continent,
    ))
}

#[instrument(skip(state))]
pub async fn country_handler(
    State(state): State<AppState>,
    Query(params): Query<CountryParams>,
) -> Result<Json<CountryPanel>, ApiError> {
    let defaults = &state.config.defaults;
    let metric = match params.metric.as_deref() {
        Some(name) => atlas_query::parse_metric(&state.table, name)?,
        None => defaults.metric,
    };
    Ok(Json(atlas_view::country_panel(
        &state.table,
        params.continent.as_deref().unwrap_or(&defaults.continent),
        params.country.as_deref().unwrap_or(&defaults.country),
        metric,
        params.hovered.as_deref().unwrap_or(&defaults.hovered_resort),
    )))
}

pub async fn options_handler(State(state): State<AppState>) -> Json<OptionsDto> {
    let defaults = state.config.defaults.clone();
    Json(OptionsDto {
        continents: atlas_query::continent_options(&state.table),
        metrics: atlas_query::metric_options(&state.table),
        price_slider: atlas_view::price_slider(defaults.max_price),
        feature_policy: state.config.feature_policy,
        defaults,
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/map", get(map_handler))
        .route("/api/country", get(country_handler))
        .route("/api/options", get(options_handler))
        .with_state(state)
}
