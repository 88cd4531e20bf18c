use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::constants::{LOG_ERROR_SNIPPET_CHARS, LOG_URL_PREFIX_CHARS, PNG_SIGNATURE};
use crate::http_client::{fetch_upstream, UpstreamResponse};
use crate::utils::truncate_chars;
use crate::wms::Candidate;

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub candidate: Candidate,
}

pub fn is_png(body: &[u8]) -> bool {
    body.len() >= PNG_SIGNATURE.len() && body[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Runs `attempt` over `candidates` in order and returns the first `Ok`.
/// Failures are logged and never abort the chain.
pub async fn first_success<'a, T, F, Fut>(
    candidates: &'a [Candidate],
    mut attempt: F,
) -> Option<(T, &'a Candidate)>
where
    F: FnMut(&'a Candidate) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Some((value, candidate)),
            Err(error) => warn!("{} attempt failed: {error:#}", candidate.kind.as_str()),
        }
    }
    None
}

/// Accepts only an HTTP 200 whose body starts with the PNG signature.
pub fn validate_image(url: &str, response: UpstreamResponse) -> Result<UpstreamResponse> {
    let content_type = response.content_type.as_deref().unwrap_or("none");
    info!(
        "GET {}... -> {} {}",
        truncate_chars(url, LOG_URL_PREFIX_CHARS),
        response.status.as_u16(),
        content_type
    );

    if response.status == StatusCode::OK && is_png(&response.body) {
        return Ok(response);
    }

    if content_type.to_ascii_lowercase().contains("xml") {
        let text = String::from_utf8_lossy(&response.body);
        warn!(
            "WMS XML error: {}",
            truncate_chars(&text, LOG_ERROR_SNIPPET_CHARS)
        );
    }
    bail!(
        "HTTP {} with {} byte non-PNG body",
        response.status.as_u16(),
        response.body.len()
    )
}

pub async fn fetch_image_candidate(
    http: &Client,
    candidate: &Candidate,
    timeout: Duration,
) -> Result<UpstreamResponse> {
    let response = fetch_upstream(http, &candidate.url, timeout).await?;
    validate_image(&candidate.url, response)
}

/// Fetch chain: first candidate that yields a PNG wins.
pub async fn fetch_radar_image(
    http: &Client,
    candidates: &[Candidate],
    timeout: Duration,
) -> Option<FetchedImage> {
    let (response, candidate) = first_success(candidates, |candidate| {
        fetch_image_candidate(http, candidate, timeout)
    })
    .await?;

    Some(FetchedImage {
        bytes: response.body,
        candidate: candidate.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::build_client;
    use crate::test_support::{closed_base_url, png_bytes, spawn_stub};
    use crate::wms::CandidateKind;
    use axum::http::header;
    use axum::routing::get;
    use axum::Router;

    fn candidates(base: &str) -> Vec<Candidate> {
        vec![
            Candidate {
                kind: CandidateKind::Wms111,
                url: format!("{base}/a"),
            },
            Candidate {
                kind: CandidateKind::Wms130,
                url: format!("{base}/b"),
            },
            Candidate {
                kind: CandidateKind::ConusBref,
                url: format!("{base}/c"),
            },
        ]
    }

    #[test]
    fn png_signature_check() {
        assert!(is_png(&png_bytes(1)));
        assert!(!is_png(b"\x89PNG"));
        assert!(!is_png(b"<?xml version=\"1.0\"?><ServiceExceptionReport/>"));
        assert!(!is_png(&[]));
    }

    #[tokio::test]
    async fn first_success_stops_at_first_ok() {
        let list = candidates("http://unused");
        let mut calls = Vec::new();
        let result = first_success(&list, |candidate| {
            calls.push(candidate.kind);
            let kind = candidate.kind;
            async move {
                if kind == CandidateKind::Wms111 {
                    bail!("boom");
                }
                Ok::<_, anyhow::Error>(kind.as_str())
            }
        })
        .await;

        let (value, winner) = result.expect("second candidate succeeds");
        assert_eq!(value, "wms_130");
        assert_eq!(winner.kind, CandidateKind::Wms130);
        assert_eq!(calls, vec![CandidateKind::Wms111, CandidateKind::Wms130]);
    }

    #[tokio::test]
    async fn non_image_200_falls_through_to_next_variant() {
        let router = Router::new()
            .route(
                "/a",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "application/vnd.ogc.se_xml")],
                        "<ServiceExceptionReport><ServiceException>LayerNotDefined</ServiceException></ServiceExceptionReport>",
                    )
                }),
            )
            .route(
                "/b",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes(2)) }),
            )
            .route(
                "/c",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes(3)) }),
            );
        let base = spawn_stub(router).await;
        let list = candidates(&base);
        let http = build_client().unwrap();

        let image = fetch_radar_image(&http, &list, Duration::from_secs(5))
            .await
            .expect("variant b serves a png");
        assert_eq!(image.bytes, png_bytes(2));
        assert_eq!(image.candidate, list[1]);
    }

    #[tokio::test]
    async fn error_statuses_fall_through_to_wide_fallback() {
        let router = Router::new()
            .route(
                "/a",
                get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, png_bytes(1)) }),
            )
            .route(
                "/b",
                get(|| async { axum::http::StatusCode::NOT_FOUND }),
            )
            .route(
                "/c",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes(3)) }),
            );
        let base = spawn_stub(router).await;
        let list = candidates(&base);
        let http = build_client().unwrap();

        let image = fetch_radar_image(&http, &list, Duration::from_secs(5))
            .await
            .expect("fallback serves a png");
        assert_eq!(image.bytes, png_bytes(3));
        assert_eq!(image.candidate.kind, CandidateKind::ConusBref);
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_none() {
        let base = closed_base_url().await;
        let http = build_client().unwrap();
        let result = fetch_radar_image(&http, &candidates(&base), Duration::from_secs(2)).await;
        assert!(result.is_none());
    }
}
