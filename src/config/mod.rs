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

use crate::parser::timestamp::{offset_from_config, CustomRecognizer, TimestampNormalizer};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A custom timestamp recognizer from configuration: a regex with one
/// capture group and the strftime format of the captured text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTimestampPattern {
    pub regex: String,
    pub format: String,
}

/// Run configuration for one analysis.
///
/// Loaded from a JSON file and/or overridden by CLI flags; validated once
/// at startup so an invalid window or pattern never reaches the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Inclusive lower bound of the analysis window.
    pub window_start: DateTime<Utc>,
    /// Exclusive upper bound of the analysis window.
    pub window_end: DateTime<Utc>,

    /// A 1-minute bucket is a burst when its error count strictly exceeds
    /// this value.
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold_per_minute: usize,
    #[serde(default = "default_burst_window_minutes")]
    pub burst_window_minutes: i64,
    #[serde(default = "default_peak_window_minutes")]
    pub peak_window_minutes: i64,
    #[serde(default = "default_peak_top_k")]
    pub peak_top_k: usize,

    /// Fixed UTC offset assumed for timestamps without one, e.g. "+02:00".
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Year assumed for year-less formats (syslog). Defaults to the
    /// window start's year.
    #[serde(default)]
    pub assume_year: Option<i32>,

    #[serde(default)]
    pub custom_timestamp_patterns: Vec<CustomTimestampPattern>,
    /// category label -> list of regexes
    #[serde(default)]
    pub custom_category_patterns: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub treat_warnings_as_errors: bool,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default)]
    pub max_lines_per_file: Option<usize>,
}

fn default_burst_threshold() -> usize {
    5
}
fn default_burst_window_minutes() -> i64 {
    1
}
fn default_peak_window_minutes() -> i64 {
    5
}
fn default_peak_top_k() -> usize {
    5
}
fn default_timezone() -> String {
    "+00:00".to_string()
}
fn default_max_file_size_mb() -> u64 {
    200
}

impl AnalysisConfig {
    /// Config for the historical default window: 09:00-14:00 of the given
    /// date, the busy window the tool was originally built to investigate.
    pub fn for_date(date: NaiveDate) -> Self {
        let start = Utc
            .from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap_or_default());
        Self::for_window(start, start + Duration::hours(5))
    }

    pub fn for_window(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            window_start,
            window_end,
            burst_threshold_per_minute: default_burst_threshold(),
            burst_window_minutes: default_burst_window_minutes(),
            peak_window_minutes: default_peak_window_minutes(),
            peak_top_k: default_peak_top_k(),
            timezone: default_timezone(),
            assume_year: None,
            custom_timestamp_patterns: Vec::new(),
            custom_category_patterns: IndexMap::new(),
            treat_warnings_as_errors: false,
            max_file_size_mb: default_max_file_size_mb(),
            max_lines_per_file: None,
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading config from {path:?}");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {path:?}"))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("cannot parse config file {path:?}"))?;
        Ok(config)
    }

    /// Fail fast on configuration that must not reach the pipeline.
    /// Called once before any file is processed.
    pub fn validate(&self) -> Result<()> {
        if self.window_end <= self.window_start {
            bail!(
                "window_end ({}) must be after window_start ({})",
                self.window_end,
                self.window_start
            );
        }
        if self.burst_window_minutes <= 0 {
            bail!("burst_window_minutes must be positive");
        }
        if self.peak_window_minutes <= 0 {
            bail!("peak_window_minutes must be positive");
        }
        if self.peak_top_k == 0 {
            bail!("peak_top_k must be at least 1");
        }
        offset_from_config(&self.timezone)?;
        // Compile everything user-supplied once, so bad patterns surface
        // here and not per line.
        self.build_normalizer()?;
        crate::parser::classifier::ErrorClassifier::with_custom(&self.custom_category_patterns)?;
        Ok(())
    }

    /// Year applied to year-less timestamp formats.
    pub fn effective_year(&self) -> i32 {
        self.assume_year.unwrap_or_else(|| self.window_start.year())
    }

    pub fn build_normalizer(&self) -> Result<TimestampNormalizer> {
        let offset = offset_from_config(&self.timezone)?;
        let mut custom = Vec::with_capacity(self.custom_timestamp_patterns.len());
        for pattern in &self.custom_timestamp_patterns {
            custom.push(CustomRecognizer::compile(&pattern.regex, &pattern.format)?);
        }
        Ok(TimestampNormalizer::new(
            offset,
            self.effective_year(),
            custom,
        ))
    }
}
