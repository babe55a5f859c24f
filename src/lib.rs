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

//! LogTriage - root-cause triage for application log files.
//!
//! The crate parses heterogeneous log lines (mixed timestamp formats,
//! level tokens and free text), classifies errors into categories,
//! filters to an analysis window and detects temporal patterns: error
//! bursts, peak activity windows and cascading failures that share a
//! transaction id. Reporting renders the result as CSV, JSON and a
//! plain-text executive summary.

pub mod analysis;
pub mod config;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scanner;

pub use analysis::{AnalysisAggregator, AnalysisSummary, TemporalFindings};
pub use config::AnalysisConfig;
pub use parser::LineParser;
pub use pipeline::{parse_sources, run, LogSource};
pub use report::FlatRecord;
pub use scanner::{scan_directory, ScanOutcome};
