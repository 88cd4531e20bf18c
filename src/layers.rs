use std::fmt;

use anyhow::{bail, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WmsService {
    Conus,
    Mrms,
}

impl WmsService {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conus => "conus",
            Self::Mrms => "mrms",
        }
    }
}

impl fmt::Display for WmsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote WMS dataset the viewer can switch to.
///
/// `layer` may contain `{station}` or `{station_lower}` placeholders, which
/// are filled in from the active station by [`render_layer_name`].
#[derive(Debug, Clone, Copy)]
pub struct WeatherLayer {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub service: WmsService,
    pub layer: &'static str,
    pub legend_url: Option<&'static str>,
    pub available: bool,
    pub is_default: bool,
}

pub static WEATHER_LAYERS: &[WeatherLayer] = &[
    WeatherLayer {
        id: "reflectivity",
        name: "Base Reflectivity",
        description: "Radar reflectivity showing precipitation intensity",
        service: WmsService::Conus,
        layer: "conus:conus_bref_qcd",
        legend_url: None,
        available: true,
        is_default: true,
    },
    WeatherLayer {
        id: "composite_reflectivity",
        name: "Composite Reflectivity",
        description: "Composite radar reflectivity (highest intensity at each location)",
        service: WmsService::Conus,
        layer: "conus:conus_cref_qcd",
        legend_url: None,
        available: true,
        is_default: false,
    },
    WeatherLayer {
        id: "echo_tops",
        name: "Echo Top Heights",
        description: "Height of storm tops (indicating storm intensity)",
        service: WmsService::Conus,
        layer: "conus:conus_neet_v18",
        legend_url: None,
        available: true,
        is_default: false,
    },
    WeatherLayer {
        id: "precipitation_type",
        name: "Precipitation Type",
        description: "Type of precipitation (rain, snow, ice, etc.)",
        service: WmsService::Conus,
        layer: "conus:conus_pcpn_typ",
        legend_url: None,
        available: true,
        is_default: false,
    },
    WeatherLayer {
        id: "local_reflectivity",
        name: "Local Radar",
        description: "Base reflectivity from the selected radar site",
        service: WmsService::Conus,
        layer: "conus:{station}_BREF",
        legend_url: None,
        available: true,
        is_default: false,
    },
    WeatherLayer {
        id: "mrms_composite_reflectivity",
        name: "MRMS Composite Reflectivity",
        description: "Multi-radar multi-sensor composite reflectivity mosaic",
        service: WmsService::Mrms,
        layer: "mrms:mrms_cref",
        legend_url: None,
        available: true,
        is_default: false,
    },
];

pub fn find_layer(id: &str) -> Option<&'static WeatherLayer> {
    WEATHER_LAYERS.iter().find(|layer| layer.id == id)
}

/// Looks `id` up in `catalog` for selection; unknown and unavailable
/// layers are both errors.
pub fn selectable_layer<'a>(catalog: &'a [WeatherLayer], id: &str) -> Result<&'a WeatherLayer> {
    match catalog.iter().find(|layer| layer.id == id) {
        Some(layer) if layer.available => Ok(layer),
        Some(_) => bail!("Layer {id} is not available"),
        None => bail!("Layer {id} is not a known layer"),
    }
}

/// Substitutes station placeholders in a remote layer template.
///
/// Unknown placeholders and unbalanced braces are errors, never passed
/// through to the remote service.
pub fn render_layer_name(template: &str, station_id: &str) -> Result<String> {
    let mut rendered = String::with_capacity(template.len() + station_id.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        if literal.contains('}') {
            bail!("Unbalanced '}}' in layer template {template:?}");
        }
        rendered.push_str(literal);

        let Some(close) = tail.find('}') else {
            bail!("Unterminated placeholder in layer template {template:?}");
        };
        let placeholder = &tail[1..close];
        match placeholder {
            "station" => rendered.push_str(&station_id.to_ascii_uppercase()),
            "station_lower" => rendered.push_str(&station_id.to_ascii_lowercase()),
            other => bail!("Unknown placeholder {{{other}}} in layer template {template:?}"),
        }
        rest = &tail[close + 1..];
    }

    if rest.contains('}') {
        bail!("Unbalanced '}}' in layer template {template:?}");
    }
    rendered.push_str(rest);
    Ok(rendered)
}
