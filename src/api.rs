use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::constants::NO_DATA_FALLBACK_MINUTES;
use crate::fetch::fetch_radar_image;
use crate::layers::{render_layer_name, WeatherLayer, WEATHER_LAYERS};
use crate::stations::{normalize_station_id, stations_by_region, Station};
use crate::storage::{load_last_image, persist_last_image};
use crate::timestamp::{estimate_data_timestamp, DataTimeEstimate};
use crate::types::{ActiveRequest, AppState};
use crate::utils::{escape_html, iso_seconds, utc_display};
use crate::wms::{legend_url_for, BoundingBox};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/radar", get(radar_image))
        .route("/api/radar/status", get(radar_status))
        .route("/api/radar/data-time", get(radar_data_time))
        .route("/api/radar/timestamp-history", get(radar_timestamp_history))
        .route("/api/radar/debug", get(radar_debug))
        .route("/api/radar/stations", get(radar_stations))
        .route("/api/radar/station", post(select_station))
        .route("/api/radar/current-station", get(current_station))
        .route("/api/radar/url", get(radar_url))
        .route("/api/radar/last", get(radar_last_image))
        .route("/api/weather/layers", get(weather_layers))
        .route("/api/weather/layer", post(select_layer))
        .route("/api/weather/current-layer", get(current_layer))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn no_store_response<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    let mut response = (status, Json(payload)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    no_store_response(status, &json!({ "error": message.into() }))
}

fn bad_request_body(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn internal_error(error: anyhow::Error) -> Response {
    error!("Request failed: {error:#}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{error:#}"))
}

fn png_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response()
}

fn station_payload(station: &Station) -> Value {
    json!({
        "station_id": station.id,
        "name": station.name,
        "state": station.region,
        "lat": station.lat,
        "lon": station.lon,
    })
}

fn rendered_layer_name(layer: &WeatherLayer, station: &Station) -> String {
    render_layer_name(layer.layer, station.id).unwrap_or_else(|error| {
        warn!("Layer {} template failed: {error:#}", layer.id);
        layer.layer.to_string()
    })
}

fn legend_url(state: &AppState, layer: &WeatherLayer, station: &Station) -> Option<String> {
    legend_url_for(&state.cfg, station, layer).ok()
}

/// Estimates the data time for `request` and records it in the history if
/// the station is still active.
async fn estimate_and_record(
    state: &AppState,
    request: &ActiveRequest,
) -> Option<DataTimeEstimate> {
    let estimate = estimate_data_timestamp(
        &state.http,
        &request.candidates,
        state.cfg.timestamp_timeout,
    )
    .await?;
    info!(
        "Radar data time for {} is {} ({} via {})",
        request.station.id,
        iso_seconds(estimate.timestamp),
        estimate.source.as_str(),
        estimate.candidate.as_str()
    );
    state
        .session
        .write()
        .await
        .record_estimate(request.station.id, estimate.timestamp);
    Some(estimate)
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let station = state.session.read().await.station();
    Html(
        INDEX_TEMPLATE
            .replace("{{station}}", &escape_html(station.id))
            .replace("{{station_name}}", &escape_html(station.name))
            .replace("{{station_state}}", &escape_html(station.region)),
    )
}

pub async fn radar_image(State(state): State<AppState>) -> Response {
    let request = match state.active_request().await {
        Ok(request) => request,
        Err(error) => return internal_error(error),
    };

    let Some(image) =
        fetch_radar_image(&state.http, &request.candidates, state.cfg.image_timeout).await
    else {
        error!("Error fetching radar: all sources failed for {}", request.station.id);
        return error_response(
            StatusCode::BAD_GATEWAY,
            "Failed to fetch radar image from all sources",
        );
    };

    info!("Serving radar image from: {}", image.candidate.url);
    if let Err(error) = persist_last_image(&state.cfg.last_image_path, &image.bytes).await {
        warn!("Could not save debug image: {error:#}");
    }
    png_response(image.bytes)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    station: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_timestamp: Option<String>,
}

pub async fn radar_status(State(state): State<AppState>) -> Response {
    let request = match state.active_request().await {
        Ok(request) => request,
        Err(error) => return internal_error(error),
    };

    let (image, estimate) = futures::join!(
        fetch_radar_image(&state.http, &request.candidates, state.cfg.image_timeout),
        estimate_and_record(&state, &request),
    );

    let payload = StatusResponse {
        status: if image.is_some() { "online" } else { "offline" },
        station: request.station.id.to_string(),
        timestamp: iso_seconds(Utc::now()),
        data_timestamp: estimate.map(|estimate| iso_seconds(estimate.timestamp)),
    };
    no_store_response(StatusCode::OK, &payload)
}

#[derive(Debug, Serialize)]
struct DataTimeResponse {
    data_timestamp: String,
    data_timestamp_utc: String,
    success: bool,
    is_fallback: bool,
    estimate_source: &'static str,
    timezone_support: bool,
    data_time_local_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

pub async fn radar_data_time(State(state): State<AppState>) -> Response {
    let (estimate, error_message) = match state.active_request().await {
        Ok(request) => (estimate_and_record(&state, &request).await, None),
        Err(error) => {
            error!("Error getting radar data timestamp: {error:#}");
            (None, Some(format!("{error:#}")))
        }
    };

    let (timestamp, is_fallback, estimate_source) = match estimate {
        Some(estimate) => (estimate.timestamp, false, estimate.source.as_str()),
        None => {
            warn!("Using fallback radar timestamp");
            (
                Utc::now() - TimeDelta::minutes(NO_DATA_FALLBACK_MINUTES),
                true,
                "unavailable",
            )
        }
    };

    let payload = DataTimeResponse {
        data_timestamp: iso_seconds(timestamp),
        data_timestamp_utc: utc_display(timestamp),
        success: true,
        is_fallback,
        estimate_source,
        timezone_support: true,
        data_time_local_display: utc_display(timestamp),
        error_message,
    };
    no_store_response(StatusCode::OK, &payload)
}

pub async fn radar_timestamp_history(State(state): State<AppState>) -> Response {
    let request = match state.active_request().await {
        Ok(request) => request,
        Err(error) => {
            error!("Error getting radar timestamp history: {error:#}");
            return no_store_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "success": false, "error": format!("{error:#}") }),
            );
        }
    };

    estimate_and_record(&state, &request).await;

    let (history, count) = {
        let session = state.session.read().await;
        if session.history.is_empty() {
            warn!("No radar timestamps recorded for {}", session.station_id());
        }
        (session.history.snapshot(), session.history.len())
    };
    no_store_response(
        StatusCode::OK,
        &json!({
            "success": true,
            "history": history,
            "count": count,
        }),
    )
}

pub async fn radar_debug(State(state): State<AppState>) -> Response {
    let request = match state.active_request().await {
        Ok(request) => request,
        Err(error) => return internal_error(error),
    };

    let mut candidates = Map::new();
    for candidate in &request.candidates {
        candidates.insert(
            candidate.kind.as_str().to_string(),
            Value::String(candidate.url.clone()),
        );
    }

    no_store_response(
        StatusCode::OK,
        &json!({
            "station": request.station.id,
            "layer": request.layer.id,
            "bbox": BoundingBox::standard(request.station),
            "wide_bbox": BoundingBox::wide(request.station),
            "candidates": candidates,
            "time": iso_seconds(Utc::now()),
        }),
    )
}

pub async fn radar_stations() -> Json<Vec<&'static Station>> {
    Json(stations_by_region())
}

#[derive(Debug, Deserialize)]
pub struct StationSelection {
    #[serde(default)]
    station_id: String,
}

pub async fn select_station(
    State(state): State<AppState>,
    body: Result<Json<StationSelection>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request_body(rejection),
    };
    let station_id = normalize_station_id(&body.station_id);
    let Some(station) = state.session.write().await.select_station(&station_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid radar station");
    };

    info!("Switched radar station to {} ({})", station.id, station.name);
    let mut payload = station_payload(station);
    payload["success"] = Value::Bool(true);
    no_store_response(StatusCode::OK, &payload)
}

pub async fn current_station(State(state): State<AppState>) -> Response {
    let station = state.session.read().await.station();
    no_store_response(StatusCode::OK, &station_payload(station))
}

pub async fn radar_url(State(state): State<AppState>) -> Response {
    let request = match state.active_request().await {
        Ok(request) => request,
        Err(error) => return internal_error(error),
    };
    let image =
        fetch_radar_image(&state.http, &request.candidates, state.cfg.image_timeout).await;
    no_store_response(
        StatusCode::OK,
        &json!({
            "ok": image.is_some(),
            "url": image.map(|image| image.candidate.url),
        }),
    )
}

pub async fn radar_last_image(State(state): State<AppState>) -> Response {
    match load_last_image(&state.cfg.last_image_path).await {
        Ok(Some(bytes)) => png_response(bytes),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No saved image"),
        Err(error) => internal_error(error),
    }
}

pub async fn weather_layers(State(state): State<AppState>) -> Response {
    let (station, current_id) = {
        let session = state.session.read().await;
        (session.station(), session.layer().id)
    };

    let layers = WEATHER_LAYERS
        .iter()
        .map(|layer| {
            json!({
                "id": layer.id,
                "name": layer.name,
                "description": layer.description,
                "service": layer.service,
                "layer": rendered_layer_name(layer, station),
                "legend_url": legend_url(&state, layer, station),
                "available": layer.available,
                "is_default": layer.is_default,
                "is_current": layer.id == current_id,
            })
        })
        .collect::<Vec<_>>();
    no_store_response(StatusCode::OK, &layers)
}

#[derive(Debug, Deserialize)]
pub struct LayerSelection {
    #[serde(default)]
    layer_id: String,
}

pub async fn select_layer(
    State(state): State<AppState>,
    body: Result<Json<LayerSelection>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request_body(rejection),
    };
    let (layer, station) = {
        let mut session = state.session.write().await;
        let Some(layer) = session.select_layer(body.layer_id.trim()) else {
            return error_response(StatusCode::BAD_REQUEST, "Invalid weather layer");
        };
        (layer, session.station())
    };

    info!("Switched weather layer to {} ({})", layer.id, layer.service);
    no_store_response(
        StatusCode::OK,
        &json!({
            "success": true,
            "layer_id": layer.id,
            "name": layer.name,
            "description": layer.description,
            "service": layer.service,
            "layer": rendered_layer_name(layer, station),
        }),
    )
}

pub async fn current_layer(State(state): State<AppState>) -> Response {
    let (layer, station) = {
        let session = state.session.read().await;
        (session.layer(), session.station())
    };

    no_store_response(
        StatusCode::OK,
        &json!({
            "layer_id": layer.id,
            "name": layer.name,
            "description": layer.description,
            "service": layer.service,
            "layer": rendered_layer_name(layer, station),
            "legend_url": legend_url(&state, layer, station),
        }),
    )
}
