// LogTriage - GPL-3.0-or-later
// This file is part of LogTriage.
//
// Copyright (C) 2026 The LogTriage contributors
//
// LogTriage is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LogTriage is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LogTriage.  If not, see <https://www.gnu.org/licenses/>.

//! Temporal pattern detection over the filtered entry sequence: fixed
//! wall-clock bucketing, burst windows, peak windows and cascading
//! failures correlated by transaction id.

use crate::config::AnalysisConfig;
use crate::parser::entry::LogEntry;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A fixed-width time interval aligned to wall-clock boundaries, with its
/// entry counts. Derived per run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_count: usize,
    pub error_count: usize,
    /// category label -> occurrences, in label order
    pub category_counts: BTreeMap<String, usize>,
}

/// A 1-minute (by default) bucket whose error count exceeded the
/// threshold. Consecutive qualifying buckets are reported independently,
/// never merged: the burst count is "number of qualifying windows".
#[derive(Debug, Clone, Serialize)]
pub struct BurstWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub error_count: usize,
    pub dominant_category: Option<String>,
}

/// One of the top-K busiest buckets, ranked by total count.
#[derive(Debug, Clone, Serialize)]
pub struct PeakWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_count: usize,
    pub error_count: usize,
    pub category_counts: BTreeMap<String, usize>,
}

/// Correlated failures sharing one transaction id: multiple categories or
/// multiple severe entries within the analysis window.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeGroup {
    pub transaction_id: String,
    pub member_count: usize,
    pub error_count: usize,
    pub categories: BTreeSet<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemporalFindings {
    pub bursts: Vec<BurstWindow>,
    pub peaks: Vec<PeakWindow>,
    pub cascades: Vec<CascadeGroup>,
}

/// Detects bursts, peaks and cascades in a time-ordered, window-filtered
/// sequence. Never fails on valid input; an empty sequence yields empty
/// findings.
#[derive(Debug, Clone)]
pub struct TemporalAnalyzer {
    burst_threshold: usize,
    burst_width: Duration,
    peak_width: Duration,
    peak_top_k: usize,
}

impl TemporalAnalyzer {
    pub fn new(
        burst_threshold: usize,
        burst_width: Duration,
        peak_width: Duration,
        peak_top_k: usize,
    ) -> Self {
        Self {
            burst_threshold,
            burst_width,
            peak_width,
            peak_top_k,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.burst_threshold_per_minute,
            Duration::minutes(config.burst_window_minutes),
            Duration::minutes(config.peak_window_minutes),
            config.peak_top_k,
        )
    }

    pub fn analyze(&self, entries: &[&LogEntry]) -> TemporalFindings {
        let findings = TemporalFindings {
            bursts: self.detect_bursts(entries),
            peaks: self.detect_peaks(entries),
            cascades: detect_cascades(entries),
        };
        log::info!(
            "Temporal analysis: {} bursts, {} peaks, {} cascades over {} entries",
            findings.bursts.len(),
            findings.peaks.len(),
            findings.cascades.len(),
            entries.len()
        );
        findings
    }

    /// Partition entries into non-overlapping buckets of `width`, aligned
    /// to wall-clock boundaries. Entries without timestamps are ignored.
    pub fn bucketize(entries: &[&LogEntry], width: Duration) -> Vec<TimeBucket> {
        let width_secs = width.num_seconds().max(1);
        let mut buckets: BTreeMap<i64, TimeBucket> = BTreeMap::new();

        for entry in entries {
            let Some(ts) = entry.timestamp else { continue };
            let floored = ts.timestamp().div_euclid(width_secs) * width_secs;
            let bucket = buckets.entry(floored).or_insert_with(|| {
                let start = DateTime::from_timestamp(floored, 0).unwrap_or(ts);
                TimeBucket {
                    start,
                    end: start + width,
                    total_count: 0,
                    error_count: 0,
                    category_counts: BTreeMap::new(),
                }
            });
            bucket.total_count += 1;
            if entry.has_error {
                bucket.error_count += 1;
            }
            for category in &entry.categories {
                *bucket
                    .category_counts
                    .entry(category.label().to_string())
                    .or_insert(0) += 1;
            }
        }

        buckets.into_values().collect()
    }

    /// Buckets whose error count strictly exceeds the threshold, ordered
    /// by window start. The comparison is exclusive: a bucket at exactly
    /// the threshold does not qualify.
    pub fn detect_bursts(&self, entries: &[&LogEntry]) -> Vec<BurstWindow> {
        Self::bucketize(entries, self.burst_width)
            .into_iter()
            .filter(|bucket| bucket.error_count > self.burst_threshold)
            .map(|bucket| BurstWindow {
                start: bucket.start,
                end: bucket.end,
                error_count: bucket.error_count,
                dominant_category: dominant_category(&bucket.category_counts),
            })
            .collect()
    }

    /// Top-K buckets by total count, descending; ties broken by earlier
    /// window start.
    pub fn detect_peaks(&self, entries: &[&LogEntry]) -> Vec<PeakWindow> {
        let mut buckets = Self::bucketize(entries, self.peak_width);
        // bucketize returns buckets in start order, so a stable sort on
        // count keeps the earlier window first among ties.
        buckets.sort_by(|a, b| b.total_count.cmp(&a.total_count));
        buckets.truncate(self.peak_top_k);
        buckets
            .into_iter()
            .map(|bucket| PeakWindow {
                start: bucket.start,
                end: bucket.end,
                total_count: bucket.total_count,
                error_count: bucket.error_count,
                category_counts: bucket.category_counts,
            })
            .collect()
    }
}

/// Group entries by transaction id and keep the groups that look like a
/// failure cascade: more than one category label across the members, or
/// two or more severe-level entries. Entries without an id are excluded.
/// Membership is bounded only by the analysis window the caller already
/// applied.
pub fn detect_cascades(entries: &[&LogEntry]) -> Vec<CascadeGroup> {
    let mut groups: IndexMap<&str, Vec<&LogEntry>> = IndexMap::new();
    for entry in entries {
        if let Some(id) = entry.transaction_id.as_deref() {
            groups.entry(id).or_default().push(entry);
        }
    }

    let mut cascades: Vec<CascadeGroup> = groups
        .into_iter()
        .filter_map(|(id, members)| {
            let categories: BTreeSet<String> = members
                .iter()
                .flat_map(|m| m.categories.iter().map(|c| c.label().to_string()))
                .collect();
            let severe = members.iter().filter(|m| m.level.is_severe()).count();
            if categories.len() < 2 && severe < 2 {
                return None;
            }
            let timestamps: Vec<DateTime<Utc>> =
                members.iter().filter_map(|m| m.timestamp).collect();
            let first_seen = *timestamps.iter().min()?;
            let last_seen = *timestamps.iter().max()?;
            Some(CascadeGroup {
                transaction_id: id.to_string(),
                member_count: members.len(),
                error_count: members.iter().filter(|m| m.has_error).count(),
                categories,
                first_seen,
                last_seen,
            })
        })
        .collect();

    cascades.sort_by(|a, b| {
        a.first_seen
            .cmp(&b.first_seen)
            .then_with(|| a.transaction_id.cmp(&b.transaction_id))
    });
    cascades
}

/// Most frequent label; ties go to the first label in lexicographic order.
fn dominant_category(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (label, &count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}
