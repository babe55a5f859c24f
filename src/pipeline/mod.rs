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

//! The parallel parse pipeline: one rayon task per source file, then a
//! deterministic merge barrier. Workers share nothing mutable — the
//! parser is pure — so the merged sequence is identical regardless of
//! completion order.

use crate::analysis::{AnalysisAggregator, AnalysisSummary, FileFailure};
use crate::config::AnalysisConfig;
use crate::parser::entry::LogEntry;
use crate::parser::LineParser;
use anyhow::Result;
use rayon::prelude::*;

/// One discovered source: its identity and its already-read text.
#[derive(Debug, Clone)]
pub struct LogSource {
    pub name: String,
    pub text: String,
}

impl LogSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parse every source in parallel and merge into one globally ordered
/// sequence, sorted by `(source_file, line_number)`. The explicit sort is
/// the merge barrier: downstream analysis must not depend on worker
/// completion order.
pub fn parse_sources(
    parser: &LineParser,
    sources: &[LogSource],
    max_lines_per_file: Option<usize>,
) -> Vec<LogEntry> {
    let start = std::time::Instant::now();

    let mut entries: Vec<LogEntry> = sources
        .par_iter()
        .flat_map_iter(|source| {
            let mut lines = source.text.lines().enumerate();
            let mut parsed = Vec::new();
            for (idx, line) in &mut lines {
                if max_lines_per_file.is_some_and(|cap| idx >= cap) {
                    log::debug!("Line cap reached for {}, stopping at {idx}", source.name);
                    break;
                }
                if let Some(entry) = parser.parse_line(line, &source.name, idx + 1) {
                    parsed.push(entry);
                }
            }
            parsed.into_iter()
        })
        .collect();

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    log::info!(
        "Parsed {} entries from {} files in {:?}",
        entries.len(),
        sources.len(),
        start.elapsed()
    );
    entries
}

/// Run the whole core: validate configuration, parse all sources, filter,
/// analyze and aggregate. The only error path is invalid configuration;
/// after validation a run always completes with a summary.
pub fn run(
    config: &AnalysisConfig,
    sources: &[LogSource],
    failed_files: Vec<FileFailure>,
) -> Result<AnalysisSummary> {
    config.validate()?;
    let parser = LineParser::from_config(config)?;
    let entries = parse_sources(&parser, sources, config.max_lines_per_file);
    Ok(AnalysisAggregator::new(config).aggregate(&entries, failed_files))
}
