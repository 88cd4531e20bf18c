use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::constants::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECONDS};

/// The parts of an upstream WMS response the fetch chain inspects.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub body: Vec<u8>,
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build reqwest client")
}

fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("image/png,*/*"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers
}

fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// GET with a per-request timeout. Non-2xx statuses are returned, not raised;
/// only transport failures are errors.
pub async fn fetch_upstream(http: &Client, url: &str, timeout: Duration) -> Result<UpstreamResponse> {
    let response = http
        .get(url)
        .headers(request_headers())
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?;

    let status = response.status();
    let content_type = header_string(response.headers(), CONTENT_TYPE);
    let cache_control = header_string(response.headers(), CACHE_CONTROL);

    let body = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body for {url}"))?;

    Ok(UpstreamResponse {
        status,
        content_type,
        cache_control,
        body: body.to_vec(),
    })
}
