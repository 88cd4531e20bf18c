use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::constants::{
    CONUS_BREF_LAYER, IMAGE_FORMAT, IMAGE_HEIGHT_PX, IMAGE_WIDTH_PX, STANDARD_LAT_SPAN_DEG,
    STANDARD_LON_SPAN_DEG, WIDE_LAT_SPAN_DEG, WIDE_LON_SPAN_DEG, WMS_BGCOLOR, WMS_CRS,
};
use crate::layers::{render_layer_name, WeatherLayer, WmsService};
use crate::stations::Station;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// Box of `lat_span` x `lon_span` degrees centred on the given point.
    pub fn around(center_lat: f64, center_lon: f64, lat_span: f64, lon_span: f64) -> Self {
        Self {
            lon_min: center_lon - lon_span / 2.0,
            lat_min: center_lat - lat_span / 2.0,
            lon_max: center_lon + lon_span / 2.0,
            lat_max: center_lat + lat_span / 2.0,
        }
    }

    pub fn standard(station: &Station) -> Self {
        Self::around(
            station.lat,
            station.lon,
            STANDARD_LAT_SPAN_DEG,
            STANDARD_LON_SPAN_DEG,
        )
    }

    pub fn wide(station: &Station) -> Self {
        Self::around(station.lat, station.lon, WIDE_LAT_SPAN_DEG, WIDE_LON_SPAN_DEG)
    }

    fn lon_lat_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.lon_min, self.lat_min, self.lon_max, self.lat_max
        )
    }

    fn lat_lon_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Wms111,
    Wms130,
    ConusBref,
}

impl CandidateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wms111 => "wms_111",
            Self::Wms130 => "wms_130",
            Self::ConusBref => "conus_bref",
        }
    }
}

/// One fully formed GetMap request, tried in order by the fetch chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub url: String,
}

pub fn service_base_url(cfg: &Config, service: WmsService) -> &str {
    match service {
        WmsService::Conus => &cfg.conus_wms_url,
        WmsService::Mrms => &cfg.mrms_wms_url,
    }
}

fn encode_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

/// Primary GetMap request, WMS 1.1.1 (`srs`, lon/lat axis order).
pub fn build_wms_111_url(base: &str, layer_name: &str, bbox: &BoundingBox) -> String {
    let bbox = bbox.lon_lat_param();
    let width = IMAGE_WIDTH_PX.to_string();
    let height = IMAGE_HEIGHT_PX.to_string();
    encode_query(
        base,
        &[
            ("service", "WMS"),
            ("request", "GetMap"),
            ("version", "1.1.1"),
            ("layers", layer_name),
            ("format", IMAGE_FORMAT),
            ("transparent", "true"),
            ("width", &width),
            ("height", &height),
            ("srs", WMS_CRS),
            ("bbox", &bbox),
            ("TIME", "latest"),
            ("bgcolor", WMS_BGCOLOR),
            ("styles", ""),
            ("format_options", "antialiasing:full"),
        ],
    )
}

/// Primary GetMap request, WMS 1.3.0 (`crs`, lat/lon axis order).
pub fn build_wms_130_url(base: &str, layer_name: &str, bbox: &BoundingBox) -> String {
    let bbox = bbox.lat_lon_param();
    let width = IMAGE_WIDTH_PX.to_string();
    let height = IMAGE_HEIGHT_PX.to_string();
    encode_query(
        base,
        &[
            ("service", "WMS"),
            ("request", "GetMap"),
            ("version", "1.3.0"),
            ("layers", layer_name),
            ("format", IMAGE_FORMAT),
            ("transparent", "true"),
            ("width", &width),
            ("height", &height),
            ("crs", WMS_CRS),
            ("bbox", &bbox),
            ("TIME", "latest"),
            ("bgcolor", WMS_BGCOLOR),
            ("styles", ""),
        ],
    )
}

/// Last resort: CONUS base reflectivity over the wide box, whatever layer is selected.
pub fn build_conus_bref_url(conus_base: &str, wide_bbox: &BoundingBox) -> String {
    let bbox = wide_bbox.lon_lat_param();
    let width = IMAGE_WIDTH_PX.to_string();
    let height = IMAGE_HEIGHT_PX.to_string();
    encode_query(
        conus_base,
        &[
            ("service", "WMS"),
            ("request", "GetMap"),
            ("version", "1.1.1"),
            ("layers", CONUS_BREF_LAYER),
            ("format", IMAGE_FORMAT),
            ("transparent", "true"),
            ("width", &width),
            ("height", &height),
            ("srs", WMS_CRS),
            ("bbox", &bbox),
            ("bgcolor", WMS_BGCOLOR),
        ],
    )
}

pub fn build_legend_url(base: &str, layer_name: &str) -> String {
    encode_query(
        base,
        &[
            ("service", "WMS"),
            ("request", "GetLegendGraphic"),
            ("version", "1.1.1"),
            ("format", IMAGE_FORMAT),
            ("layer", layer_name),
        ],
    )
}

/// Explicit catalog legend if present, otherwise a GetLegendGraphic request.
pub fn legend_url_for(cfg: &Config, station: &Station, layer: &WeatherLayer) -> Result<String> {
    if let Some(url) = layer.legend_url {
        return Ok(url.to_string());
    }
    let layer_name = render_layer_name(layer.layer, station.id)?;
    Ok(build_legend_url(
        service_base_url(cfg, layer.service),
        &layer_name,
    ))
}

/// The three GetMap requests in fallback priority order.
pub fn build_candidates(
    cfg: &Config,
    station: &Station,
    layer: &WeatherLayer,
) -> Result<Vec<Candidate>> {
    let layer_name = render_layer_name(layer.layer, station.id)?;
    let base = service_base_url(cfg, layer.service);
    let bbox = BoundingBox::standard(station);
    let wide = BoundingBox::wide(station);

    Ok(vec![
        Candidate {
            kind: CandidateKind::Wms111,
            url: build_wms_111_url(base, &layer_name, &bbox),
        },
        Candidate {
            kind: CandidateKind::Wms130,
            url: build_wms_130_url(base, &layer_name, &bbox),
        },
        Candidate {
            kind: CandidateKind::ConusBref,
            url: build_conus_bref_url(&cfg.conus_wms_url, &wide),
        },
    ])
}
