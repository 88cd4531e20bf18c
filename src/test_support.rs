use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::constants::PNG_SIGNATURE;
use crate::layers::{WeatherLayer, WmsService};

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr: SocketAddr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe local addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn png_bytes(tag: u8) -> Vec<u8> {
    let mut body = PNG_SIGNATURE.to_vec();
    body.extend_from_slice(&[0, 0, 0, 13, tag]);
    body
}

/// A catalog with one live layer and one that has been withdrawn.
pub static LAYERS_WITH_RETIRED: &[WeatherLayer] = &[
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
        id: "retired_reflectivity",
        name: "Retired Reflectivity",
        description: "No longer published upstream",
        service: WmsService::Conus,
        layer: "conus:conus_bref_raw",
        legend_url: None,
        available: false,
        is_default: false,
    },
];
