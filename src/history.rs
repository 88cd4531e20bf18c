use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{HISTORY_CAPACITY, HISTORY_DEDUP_WINDOW_SECONDS};
use crate::utils::{iso_seconds, round_one_decimal, utc_display};

/// Most-recent-first log of estimated data timestamps for the active station.
#[derive(Debug, Clone, Default)]
pub struct TimestampHistory {
    entries: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub local_display: String,
    pub rank: usize,
    pub position: String,
    /// Minutes to the next older entry; `None` for the oldest.
    pub time_diff_minutes: Option<f64>,
}

impl TimestampHistory {
    /// Returns `false` when `timestamp` is within the dedup window of the
    /// newest entry and was dropped.
    pub fn record(&mut self, timestamp: DateTime<Utc>) -> bool {
        if let Some(newest) = self.entries.first() {
            let diff_seconds = (timestamp - *newest).num_milliseconds().abs() as f64 / 1000.0;
            if diff_seconds < HISTORY_DEDUP_WINDOW_SECONDS as f64 {
                debug!("Skipping timestamp - too similar to recent ({diff_seconds:.1}s difference)");
                return false;
            }
        }

        self.entries.insert(0, timestamp);
        self.entries.truncate(HISTORY_CAPACITY);
        info!(
            "Updated radar timestamp history. Count: {}, latest: {:?}",
            self.entries.len(),
            self.entries
                .iter()
                .map(|ts| ts.format("%H:%M:%S").to_string())
                .collect::<Vec<_>>()
        );
        true
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(rank, timestamp)| {
                let time_diff_minutes = self.entries.get(rank + 1).map(|older| {
                    let diff_seconds = (*timestamp - *older).num_milliseconds() as f64 / 1000.0;
                    round_one_decimal(diff_seconds / 60.0)
                });
                HistoryEntry {
                    timestamp: iso_seconds(*timestamp),
                    local_display: utc_display(*timestamp),
                    rank,
                    position: position_label(rank),
                    time_diff_minutes,
                }
            })
            .collect()
    }
}

fn position_label(rank: usize) -> String {
    if rank == 0 {
        "current".to_string()
    } else {
        format!("previous_{rank}")
    }
}
