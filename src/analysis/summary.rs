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

use crate::analysis::temporal::{TemporalAnalyzer, TemporalFindings};
use crate::analysis::window::filter_by_window;
use crate::config::AnalysisConfig;
use crate::parser::entry::LogEntry;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// A source file that contributed nothing to the run, and why.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub source_file: String,
    pub reason: String,
}

/// The read-only result of one analysis run, handed to reporting.
///
/// Totals (entries, errors, warnings, per-category and per-level counts)
/// cover the whole parsed input; the temporal findings cover only the
/// analysis window. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    pub total_entries: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// `total_errors / total_entries`; 0 for an empty run. Always in [0, 1].
    pub error_rate: f64,
    pub entries_in_window: usize,

    /// category label -> count, most frequent first
    pub category_counts: IndexMap<String, usize>,
    /// level name -> count, most frequent first
    pub level_counts: IndexMap<String, usize>,

    pub findings: TemporalFindings,
    pub failed_files: Vec<FileFailure>,
}

/// Folds whole-run totals and temporal findings into an
/// [`AnalysisSummary`]. No rendering, no I/O.
#[derive(Debug)]
pub struct AnalysisAggregator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> AnalysisAggregator<'a> {
    pub const fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run filter + temporal analysis and fold everything into the
    /// summary. Always succeeds on valid configuration; an empty input
    /// produces an all-zero summary.
    pub fn aggregate(
        &self,
        entries: &[LogEntry],
        failed_files: Vec<FileFailure>,
    ) -> AnalysisSummary {
        let total_entries = entries.len();
        let total_errors = entries.iter().filter(|e| e.has_error).count();
        let total_warnings = entries.iter().filter(|e| e.is_warning).count();
        let error_rate = if total_entries == 0 {
            0.0
        } else {
            total_errors as f64 / total_entries as f64
        };

        let mut category_counts: IndexMap<String, usize> = IndexMap::new();
        let mut level_counts: IndexMap<String, usize> = IndexMap::new();
        for entry in entries {
            for category in &entry.categories {
                *category_counts
                    .entry(category.label().to_string())
                    .or_insert(0) += 1;
            }
            *level_counts.entry(entry.level.to_string()).or_insert(0) += 1;
        }
        sort_counts(&mut category_counts);
        sort_counts(&mut level_counts);

        let in_window =
            filter_by_window(entries, self.config.window_start, self.config.window_end);
        let findings = TemporalAnalyzer::from_config(self.config).analyze(&in_window);

        log::info!(
            "Aggregated {} entries ({} errors, {} warnings, rate {:.2}%), {} in window",
            total_entries,
            total_errors,
            total_warnings,
            error_rate * 100.0,
            in_window.len()
        );

        AnalysisSummary {
            window_start: self.config.window_start,
            window_end: self.config.window_end,
            total_entries,
            total_errors,
            total_warnings,
            error_rate,
            entries_in_window: in_window.len(),
            category_counts,
            level_counts,
            findings,
            failed_files,
        }
    }
}

/// Count-descending order, label order among ties, so serialized output
/// is stable across runs.
fn sort_counts(counts: &mut IndexMap<String, usize>) {
    counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::entry::{Category, LogLevel};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn config() -> AnalysisConfig {
        AnalysisConfig::for_window(
            Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 1, 14, 0, 0).unwrap(),
        )
    }

    fn entry(
        ts: Option<DateTime<Utc>>,
        line: usize,
        level: LogLevel,
        categories: &[Category],
    ) -> LogEntry {
        let categories: BTreeSet<Category> = categories.iter().cloned().collect();
        let has_error = level.is_severe() || !categories.is_empty();
        LogEntry {
            timestamp: ts,
            level,
            source_file: "a.log".to_string(),
            line_number: line,
            message: String::new(),
            categories,
            transaction_id: None,
            is_warning: level == LogLevel::Warn,
            has_error,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_run_is_all_zero() {
        let config = config();
        let summary = AnalysisAggregator::new(&config).aggregate(&[], Vec::new());
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.total_errors, 0);
        assert_eq!(summary.error_rate, 0.0);
        assert!(summary.findings.bursts.is_empty());
        assert!(summary.findings.peaks.is_empty());
        assert!(summary.findings.cascades.is_empty());
    }

    #[test]
    fn test_error_rate_bounds() {
        let config = config();
        let entries = vec![
            entry(Some(at(10, 0)), 1, LogLevel::Error, &[]),
            entry(Some(at(10, 1)), 2, LogLevel::Info, &[]),
            entry(Some(at(10, 2)), 3, LogLevel::Info, &[]),
            entry(None, 4, LogLevel::Fatal, &[]),
        ];
        let summary = AnalysisAggregator::new(&config).aggregate(&entries, Vec::new());
        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.total_errors, 2);
        assert!((summary.error_rate - 0.5).abs() < f64::EPSILON);
        assert!((0.0..=1.0).contains(&summary.error_rate));
    }

    #[test]
    fn test_totals_are_pre_filter() {
        // The entry at 02:00 is outside the window but still counts in
        // totals; only temporal findings ignore it.
        let config = config();
        let entries = vec![
            entry(Some(at(2, 0)), 1, LogLevel::Error, &[Category::Database]),
            entry(Some(at(10, 0)), 2, LogLevel::Info, &[]),
        ];
        let summary = AnalysisAggregator::new(&config).aggregate(&entries, Vec::new());
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.entries_in_window, 1);
        assert_eq!(summary.category_counts.get("database_errors"), Some(&1));
    }

    #[test]
    fn test_out_of_window_run_reports_zero_findings() {
        let config = config();
        let entries = vec![entry(Some(at(2, 0)), 1, LogLevel::Error, &[])];
        let summary = AnalysisAggregator::new(&config).aggregate(&entries, Vec::new());
        assert_eq!(summary.entries_in_window, 0);
        assert!(summary.findings.bursts.is_empty());
        assert!(summary.findings.peaks.is_empty());
        assert!(summary.findings.cascades.is_empty());
        // error_rate is pre-filter, so the lone error still shows up there
        assert!((summary.error_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_counts_sorted_by_frequency() {
        let config = config();
        let entries = vec![
            entry(Some(at(10, 0)), 1, LogLevel::Error, &[Category::Timeout]),
            entry(Some(at(10, 1)), 2, LogLevel::Error, &[Category::Timeout]),
            entry(Some(at(10, 2)), 3, LogLevel::Error, &[Category::Database]),
        ];
        let summary = AnalysisAggregator::new(&config).aggregate(&entries, Vec::new());
        let labels: Vec<&String> = summary.category_counts.keys().collect();
        assert_eq!(labels, vec!["timeout_errors", "database_errors"]);
    }

    #[test]
    fn test_failed_files_carried_through() {
        let config = config();
        let failures = vec![FileFailure {
            source_file: "broken.log".to_string(),
            reason: "not valid UTF-8".to_string(),
        }];
        let summary = AnalysisAggregator::new(&config).aggregate(&[], failures);
        assert_eq!(summary.failed_files.len(), 1);
        assert_eq!(summary.failed_files[0].source_file, "broken.log");
    }
}
