use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::constants::{
    CONUS_WMS_URL, DEFAULT_IMAGE_TIMEOUT_SECONDS, DEFAULT_LAST_IMAGE_PATH, DEFAULT_LAYER_ID,
    DEFAULT_LISTEN_PORT, DEFAULT_STATION_ID, DEFAULT_TIMESTAMP_TIMEOUT_SECONDS, MRMS_WMS_URL,
};
use crate::layers::{selectable_layer, WeatherLayer, WEATHER_LAYERS};
use crate::stations::{find_station, normalize_station_id};

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: String,
    pub conus_wms_url: String,
    pub mrms_wms_url: String,
    pub image_timeout: Duration,
    pub timestamp_timeout: Duration,
    pub last_image_path: PathBuf,
    pub default_station: String,
    pub default_layer: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = match env_optional("RADAR_LISTEN_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", env_u16("PORT", DEFAULT_LISTEN_PORT)?),
        };
        let conus_wms_url = trim_base_url(&env_string("RADAR_CONUS_WMS_URL", CONUS_WMS_URL));
        let mrms_wms_url = trim_base_url(&env_string("RADAR_MRMS_WMS_URL", MRMS_WMS_URL));
        let image_timeout = Duration::from_secs(env_u64(
            "RADAR_IMAGE_TIMEOUT_SECONDS",
            DEFAULT_IMAGE_TIMEOUT_SECONDS,
        )?);
        let timestamp_timeout = Duration::from_secs(env_u64(
            "RADAR_TIMESTAMP_TIMEOUT_SECONDS",
            DEFAULT_TIMESTAMP_TIMEOUT_SECONDS,
        )?);
        let last_image_path =
            PathBuf::from(env_string("RADAR_LAST_IMAGE_PATH", DEFAULT_LAST_IMAGE_PATH));
        let default_station =
            normalize_station_id(&env_string("RADAR_DEFAULT_STATION", DEFAULT_STATION_ID));
        let default_layer = env_string("RADAR_DEFAULT_LAYER", DEFAULT_LAYER_ID);

        let cfg = Self {
            listen_addr,
            conus_wms_url,
            mrms_wms_url,
            image_timeout,
            timestamp_timeout,
            last_image_path,
            default_station,
            default_layer,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_against(WEATHER_LAYERS)
    }

    fn validate_against(&self, layers: &[WeatherLayer]) -> Result<()> {
        if find_station(&self.default_station).is_none() {
            bail!("RADAR_DEFAULT_STATION={} is not a known station", self.default_station);
        }
        selectable_layer(layers, &self.default_layer)
            .with_context(|| format!("Invalid RADAR_DEFAULT_LAYER={}", self.default_layer))?;
        if self.image_timeout.is_zero() || self.timestamp_timeout.is_zero() {
            bail!("Request timeouts must be positive");
        }
        Ok(())
    }
}

fn trim_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_string(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match env_optional(name) {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {}={} as u64", name, value)),
        None => Ok(default),
    }
}

fn env_u16(name: &str, default: u16) -> Result<u16> {
    match env_optional(name) {
        Some(value) => value
            .parse::<u16>()
            .with_context(|| format!("Failed to parse {}={} as u16", name, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str, last_image_path: PathBuf) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        conus_wms_url: format!("{base_url}/conus/ows"),
        mrms_wms_url: format!("{base_url}/mrms/ows"),
        image_timeout: Duration::from_secs(5),
        timestamp_timeout: Duration::from_secs(5),
        last_image_path,
        default_station: DEFAULT_STATION_ID.to_string(),
        default_layer: DEFAULT_LAYER_ID.to_string(),
    }
}
