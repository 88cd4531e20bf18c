use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::constants::{DEFAULT_LAYER_ID, DEFAULT_STATION_ID};
use crate::history::TimestampHistory;
use crate::layers::{find_layer, selectable_layer, WeatherLayer, WEATHER_LAYERS};
use crate::stations::{find_station, Station};
use crate::wms::{build_candidates, Candidate};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub http: Client,
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(cfg: Config, http: Client) -> Self {
        let session = Session::new(&cfg.default_station, &cfg.default_layer);
        Self {
            cfg: Arc::new(cfg),
            http,
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Resolves the active selection and builds its request candidates
    /// under a single read lock.
    pub async fn active_request(&self) -> Result<ActiveRequest> {
        let session = self.session.read().await;
        let station = session.station();
        let layer = session.layer();
        let candidates = build_candidates(&self.cfg, station, layer)?;
        Ok(ActiveRequest {
            station,
            layer,
            candidates,
        })
    }
}

/// Snapshot of the selection a request was built from.
#[derive(Debug, Clone)]
pub struct ActiveRequest {
    pub station: &'static Station,
    pub layer: &'static WeatherLayer,
    pub candidates: Vec<Candidate>,
}

/// Process-wide viewer state: the active station and layer plus the
/// timestamp history, which is only meaningful for one station.
#[derive(Debug, Clone)]
pub struct Session {
    station_id: String,
    layer_id: String,
    pub history: TimestampHistory,
}

impl Session {
    pub fn new(station_id: &str, layer_id: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            layer_id: layer_id.to_string(),
            history: TimestampHistory::default(),
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Falls back to the built-in default if the selection is ever unknown.
    pub fn station(&self) -> &'static Station {
        find_station(&self.station_id)
            .or_else(|| find_station(DEFAULT_STATION_ID))
            .unwrap_or(&crate::stations::STATIONS[0])
    }

    pub fn layer(&self) -> &'static WeatherLayer {
        find_layer(&self.layer_id)
            .or_else(|| find_layer(DEFAULT_LAYER_ID))
            .unwrap_or(&crate::layers::WEATHER_LAYERS[0])
    }

    /// Switches station and clears the history. `None` for unknown ids.
    pub fn select_station(&mut self, station_id: &str) -> Option<&'static Station> {
        let station = find_station(station_id)?;
        self.station_id = station.id.to_string();
        self.history.reset();
        Some(station)
    }

    /// Switches layer. `None` for unknown or unavailable ids.
    pub fn select_layer(&mut self, layer_id: &str) -> Option<&'static WeatherLayer> {
        self.select_layer_from(WEATHER_LAYERS, layer_id)
    }

    fn select_layer_from(
        &mut self,
        catalog: &'static [WeatherLayer],
        layer_id: &str,
    ) -> Option<&'static WeatherLayer> {
        let layer = selectable_layer(catalog, layer_id).ok()?;
        self.layer_id = layer.id.to_string();
        Some(layer)
    }

    /// Records an estimate only if it was made for the current station.
    pub fn record_estimate(&mut self, station_id: &str, timestamp: DateTime<Utc>) {
        if station_id == self.station_id {
            self.history.record(timestamp);
        }
    }
}
