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

//! Rendering collaborators: flat per-entry records, CSV export and the
//! plain-text executive summary. Everything here consumes the read-only
//! structures the core produced; nothing feeds back into analysis.

use crate::analysis::AnalysisSummary;
use crate::parser::entry::{Category, LogEntry, LogLevel};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

const CATEGORY_DELIMITER: &str = ";";

/// The flat per-entry shape handed to downstream consumers. Field order
/// matches the exported CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// RFC 3339, empty when the line had no parseable timestamp.
    pub timestamp: String,
    pub log_level: String,
    pub file_name: String,
    pub line_number: usize,
    pub message: String,
    pub has_error: bool,
    pub is_warning: bool,
    /// `;`-delimited category labels.
    pub error_categories: String,
    pub transaction_id: String,
}

impl FlatRecord {
    pub fn from_entry(entry: &LogEntry) -> Self {
        Self {
            timestamp: entry
                .timestamp
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
            log_level: entry.level.to_string(),
            file_name: entry.source_file.clone(),
            line_number: entry.line_number,
            message: entry.message.clone(),
            has_error: entry.has_error,
            is_warning: entry.is_warning,
            error_categories: entry
                .categories
                .iter()
                .map(Category::label)
                .collect::<Vec<_>>()
                .join(CATEGORY_DELIMITER),
            transaction_id: entry.transaction_id.clone().unwrap_or_default(),
        }
    }

    /// Rebuild a `LogEntry` from the flat shape. Timestamp, level,
    /// categories and transaction id round-trip exactly.
    pub fn to_entry(&self) -> LogEntry {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc));
        let categories: BTreeSet<Category> = self
            .error_categories
            .split(CATEGORY_DELIMITER)
            .filter(|label| !label.is_empty())
            .map(Category::from_label)
            .collect();
        LogEntry {
            timestamp,
            level: LogLevel::from_token(&self.log_level),
            source_file: self.file_name.clone(),
            line_number: self.line_number,
            message: self.message.clone(),
            categories,
            transaction_id: (!self.transaction_id.is_empty())
                .then(|| self.transaction_id.clone()),
            is_warning: self.is_warning,
            has_error: self.has_error,
        }
    }
}

/// Write one CSV row per entry: the flat fields plus one boolean
/// `is_<category>` column per known label.
pub fn write_entries_csv(
    path: &Path,
    entries: &[LogEntry],
    category_labels: &[String],
) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("cannot create {path:?}"))?;

    let mut header = vec![
        "timestamp".to_string(),
        "log_level".to_string(),
        "file_name".to_string(),
        "line_number".to_string(),
        "message".to_string(),
        "has_error".to_string(),
        "is_warning".to_string(),
        "error_categories".to_string(),
        "transaction_id".to_string(),
    ];
    header.extend(category_labels.iter().map(|label| format!("is_{label}")));
    writer.write_record(&header)?;

    for entry in entries {
        let record = FlatRecord::from_entry(entry);
        let mut row = vec![
            record.timestamp,
            record.log_level,
            record.file_name,
            record.line_number.to_string(),
            record.message,
            record.has_error.to_string(),
            record.is_warning.to_string(),
            record.error_categories,
            record.transaction_id,
        ];
        for label in category_labels {
            let has_label = entry
                .categories
                .iter()
                .any(|category| category.label() == label);
            row.push(has_label.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    log::info!("Wrote {} CSV rows to {path:?}", entries.len());
    Ok(())
}

/// Serialize the whole summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &AnalysisSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {path:?}"))?;
    Ok(())
}

/// Human-readable executive summary.
pub fn render_text_summary(summary: &AnalysisSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "LOG TRIAGE SUMMARY");
    let _ = writeln!(out, "==================");
    let _ = writeln!(
        out,
        "Analysis window:   {} .. {}",
        summary.window_start.format("%Y-%m-%d %H:%M"),
        summary.window_end.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "Total entries:     {}", summary.total_entries);
    let _ = writeln!(out, "Total errors:      {}", summary.total_errors);
    let _ = writeln!(out, "Total warnings:    {}", summary.total_warnings);
    let _ = writeln!(
        out,
        "Error rate:        {:.2}%",
        summary.error_rate * 100.0
    );
    let _ = writeln!(out, "Entries in window: {}", summary.entries_in_window);

    if !summary.category_counts.is_empty() {
        let _ = writeln!(out, "\nTop error categories:");
        for (label, count) in summary.category_counts.iter().take(5) {
            let _ = writeln!(out, "  {label}: {count}");
        }
    }

    let _ = writeln!(
        out,
        "\nError bursts:       {}",
        summary.findings.bursts.len()
    );
    for burst in &summary.findings.bursts {
        let _ = writeln!(
            out,
            "  {} errors in 1 minute starting at {}{}",
            burst.error_count,
            burst.start.format("%H:%M:%S"),
            burst
                .dominant_category
                .as_deref()
                .map(|c| format!(" (mostly {c})"))
                .unwrap_or_default()
        );
    }

    let _ = writeln!(
        out,
        "Peak windows:       {}",
        summary.findings.peaks.len()
    );
    for peak in &summary.findings.peaks {
        let _ = writeln!(
            out,
            "  {} - {}: {} entries, {} errors",
            peak.start.format("%H:%M"),
            peak.end.format("%H:%M"),
            peak.total_count,
            peak.error_count
        );
    }

    let _ = writeln!(
        out,
        "Cascading failures: {}",
        summary.findings.cascades.len()
    );
    for cascade in &summary.findings.cascades {
        let _ = writeln!(
            out,
            "  {}: {} entries, categories [{}], {} .. {}",
            cascade.transaction_id,
            cascade.member_count,
            cascade.categories.iter().cloned().collect::<Vec<_>>().join(", "),
            cascade.first_seen.format("%H:%M:%S"),
            cascade.last_seen.format("%H:%M:%S")
        );
    }

    if !summary.failed_files.is_empty() {
        let _ = writeln!(out, "\nFiles not analyzed:");
        for failure in &summary.failed_files {
            let _ = writeln!(out, "  {}: {}", failure.source_file, failure.reason);
        }
    }

    out
}
