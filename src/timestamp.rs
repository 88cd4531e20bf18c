//! Estimates when the served radar imagery was generated.
//!
//! The WMS endpoints do not report an acquisition time, so the estimate is
//! backed out of the `Cache-Control: max-age` the server attaches to a fresh
//! GetMap response, assuming a fixed total cache lifetime. Results are
//! snapped to an even minute so that probes a few seconds apart agree.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::constants::{ASSUMED_CACHE_LIFETIME_SECONDS, FALLBACK_DATA_DELAY_MINUTES};
use crate::fetch::{fetch_image_candidate, first_success};
use crate::wms::{Candidate, CandidateKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    CacheControl,
    FallbackDelay,
}

impl EstimateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheControl => "cache_control",
            Self::FallbackDelay => "fallback_delay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataTimeEstimate {
    pub timestamp: DateTime<Utc>,
    pub source: EstimateSource,
    pub candidate: CandidateKind,
}

pub fn parse_max_age(cache_control: &str) -> Option<i64> {
    let regex = Regex::new(r"max-age=(\d+)").ok()?;
    regex
        .captures(cache_control)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<i64>().ok())
}

/// Snaps to an even minute: `round(minute / 2) * 2` with ties to even,
/// seconds dropped. Minute 60 carries into the next hour.
pub fn round_to_even_minute(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let rounded_minute = (f64::from(timestamp.minute()) / 2.0).round_ties_even() as i64 * 2;
    let hour_start = timestamp.timestamp().div_euclid(3600) * 3600;
    DateTime::<Utc>::from_timestamp(hour_start + rounded_minute * 60, 0).unwrap_or(timestamp)
}

/// Pure part of the estimator, given the `Cache-Control` of a valid image
/// response and the current time.
pub fn estimate_from_cache_control(
    cache_control: Option<&str>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, EstimateSource) {
    if let Some(max_age) = cache_control.and_then(parse_max_age) {
        let data_age_seconds = ASSUMED_CACHE_LIFETIME_SECONDS - max_age;
        if data_age_seconds > 0 {
            let estimated = round_to_even_minute(now - TimeDelta::seconds(data_age_seconds));
            info!("Estimated radar timestamp from cache: {estimated} (max-age: {max_age}s)");
            return (estimated, EstimateSource::CacheControl);
        }
    }

    let fallback =
        round_to_even_minute(now - TimeDelta::minutes(FALLBACK_DATA_DELAY_MINUTES));
    info!("Using rounded fallback timestamp: {fallback}");
    (fallback, EstimateSource::FallbackDelay)
}

/// Probes the candidates in order; the first valid image decides the
/// estimate. `None` means no candidate produced an image at all.
pub async fn estimate_data_timestamp(
    http: &Client,
    candidates: &[Candidate],
    timeout: Duration,
) -> Option<DataTimeEstimate> {
    info!("Attempting to get radar data timestamp...");
    let probed = first_success(candidates, |candidate| async move {
        let response = fetch_image_candidate(http, candidate, timeout).await?;
        Ok::<_, anyhow::Error>(estimate_from_cache_control(
            response.cache_control.as_deref(),
            Utc::now(),
        ))
    })
    .await;

    match probed {
        Some(((timestamp, source), candidate)) => Some(DataTimeEstimate {
            timestamp,
            source,
            candidate: candidate.kind,
        }),
        None => {
            error!("Could not determine radar timestamp from any source");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::build_client;
    use crate::test_support::{closed_base_url, png_bytes, spawn_stub};
    use axum::http::header;
    use axum::routing::get;
    use axum::Router;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, h, m, s).unwrap()
    }

    fn candidates(base: &str) -> Vec<Candidate> {
        [
            (CandidateKind::Wms111, "a"),
            (CandidateKind::Wms130, "b"),
            (CandidateKind::ConusBref, "c"),
        ]
        .into_iter()
        .map(|(kind, path)| Candidate {
            kind,
            url: format!("{base}/{path}"),
        })
        .collect()
    }

    #[test]
    fn max_age_is_extracted_from_directive_list() {
        assert_eq!(parse_max_age("public, max-age=60"), Some(60));
        assert_eq!(parse_max_age("max-age=0, must-revalidate"), Some(0));
        assert_eq!(parse_max_age("no-cache"), None);
        assert_eq!(parse_max_age("max-age=abc"), None);
        assert_eq!(parse_max_age("max-age=99999999999999999999999"), None);
    }

    #[test]
    fn even_minute_rounding_uses_ties_to_even() {
        assert_eq!(round_to_even_minute(at(14, 6, 30)), at(14, 6, 0));
        assert_eq!(round_to_even_minute(at(14, 1, 59)), at(14, 0, 0));
        assert_eq!(round_to_even_minute(at(14, 3, 10)), at(14, 4, 0));
        assert_eq!(round_to_even_minute(at(14, 5, 10)), at(14, 4, 0));
        assert_eq!(round_to_even_minute(at(14, 7, 0)), at(14, 8, 0));
    }

    #[test]
    fn minute_sixty_rolls_into_next_day() {
        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 30).unwrap();
        let next = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(round_to_even_minute(late), next);
    }

    #[test]
    fn max_age_sixty_backs_out_one_minute() {
        let now = at(14, 7, 30);
        let (estimate, source) = estimate_from_cache_control(Some("max-age=60"), now);
        assert_eq!(source, EstimateSource::CacheControl);
        assert_eq!(estimate, round_to_even_minute(now - TimeDelta::seconds(60)));
        assert_eq!(estimate, at(14, 6, 0));
    }

    #[test]
    fn missing_header_uses_two_minute_delay() {
        let now = at(14, 7, 30);
        let (estimate, source) = estimate_from_cache_control(None, now);
        assert_eq!(source, EstimateSource::FallbackDelay);
        assert_eq!(estimate, round_to_even_minute(now - TimeDelta::minutes(2)));
        assert_eq!(estimate, at(14, 4, 0));
    }

    #[test]
    fn non_positive_data_age_or_garbage_uses_delay() {
        let now = at(14, 7, 30);
        for header in ["max-age=120", "max-age=600", "max-age=oops", "no-store"] {
            let (estimate, source) = estimate_from_cache_control(Some(header), now);
            assert_eq!(source, EstimateSource::FallbackDelay, "{header}");
            assert_eq!(estimate, at(14, 4, 0));
        }
        let (estimate, source) = estimate_from_cache_control(Some("max-age=0"), now);
        assert_eq!(source, EstimateSource::CacheControl);
        assert_eq!(estimate, at(14, 4, 0));
    }

    #[tokio::test]
    async fn first_image_response_decides_the_estimate() {
        let router = Router::new()
            .route(
                "/a",
                get(|| async { ([(header::CONTENT_TYPE, "text/xml")], "<ServiceExceptionReport/>") }),
            )
            .route(
                "/b",
                get(|| async {
                    (
                        [
                            (header::CONTENT_TYPE, "image/png"),
                            (header::CACHE_CONTROL, "max-age=60"),
                        ],
                        png_bytes(2),
                    )
                }),
            )
            .route(
                "/c",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes(3)) }),
            );
        let base = spawn_stub(router).await;
        let http = build_client().unwrap();

        let before = Utc::now();
        let estimate = estimate_data_timestamp(&http, &candidates(&base), Duration::from_secs(5))
            .await
            .expect("variant b is an image");
        let after = Utc::now();

        assert_eq!(estimate.candidate, CandidateKind::Wms130);
        assert_eq!(estimate.source, EstimateSource::CacheControl);
        let lower = round_to_even_minute(before - TimeDelta::seconds(60));
        let upper = round_to_even_minute(after - TimeDelta::seconds(60));
        assert!(estimate.timestamp >= lower && estimate.timestamp <= upper);
    }

    #[tokio::test]
    async fn image_without_cache_header_uses_delay_rule() {
        let router = Router::new().route(
            "/a",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes(1)) }),
        );
        let base = spawn_stub(router).await;
        let http = build_client().unwrap();

        let estimate = estimate_data_timestamp(&http, &candidates(&base), Duration::from_secs(5))
            .await
            .expect("variant a is an image");
        assert_eq!(estimate.candidate, CandidateKind::Wms111);
        assert_eq!(estimate.source, EstimateSource::FallbackDelay);
    }

    #[tokio::test]
    async fn total_failure_is_distinct_from_fallback() {
        let base = closed_base_url().await;
        let http = build_client().unwrap();
        let estimate =
            estimate_data_timestamp(&http, &candidates(&base), Duration::from_secs(2)).await;
        assert!(estimate.is_none());
    }
}
