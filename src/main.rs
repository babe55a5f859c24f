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

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use logtriage::{config::AnalysisConfig, pipeline, report, scanner};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logtriage")]
#[command(version, about = "Scan log files, classify errors and detect temporal failure patterns", long_about = None)]
struct Args {
    /// Directory scanned recursively for .log and .txt files
    #[arg(value_name = "LOGS_DIR")]
    logs_dir: PathBuf,

    /// Directory for the generated reports
    #[arg(short, long, value_name = "DIR", default_value = "triage-output")]
    output: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Date to analyze (YYYY-MM-DD); selects the default 09:00-14:00 UTC window
    #[arg(short, long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Count warning entries as errors
    #[arg(long)]
    warnings_as_errors: bool,

    /// Override the burst threshold (errors per minute, exclusive)
    #[arg(long, value_name = "N")]
    burst_threshold: Option<usize>,
}

fn load_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match (&args.config, args.date) {
        (Some(path), _) => {
            AnalysisConfig::load(path).with_context(|| format!("cannot load config {path:?}"))?
        }
        (None, Some(date)) => AnalysisConfig::for_date(date),
        (None, None) => anyhow::bail!("either --config or --date is required"),
    };
    if let Some(date) = args.date {
        if args.config.is_some() {
            let window = AnalysisConfig::for_date(date);
            config.window_start = window.window_start;
            config.window_end = window.window_end;
        }
    }
    if args.warnings_as_errors {
        config.treat_warnings_as_errors = true;
    }
    if let Some(threshold) = args.burst_threshold {
        config.burst_threshold_per_minute = threshold;
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Set RUST_LOG to override (e.g., RUST_LOG=debug)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!(
        "LogTriage {} ({}) starting up",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let args = Args::parse();
    let config = load_config(&args)?;
    config.validate()?;

    let outcome = scanner::scan_directory(&args.logs_dir, config.max_file_size_mb);
    if outcome.sources.is_empty() && outcome.failures.is_empty() {
        log::warn!("No log files found under {:?}", args.logs_dir);
    }

    let parser = logtriage::LineParser::from_config(&config)?;
    let known_labels = parser.classifier().known_labels();
    let entries = pipeline::parse_sources(&parser, &outcome.sources, config.max_lines_per_file);
    let summary = logtriage::AnalysisAggregator::new(&config).aggregate(&entries, outcome.failures);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {:?}", args.output))?;
    report::write_entries_csv(&args.output.join("entries.csv"), &entries, &known_labels)?;
    report::write_summary_json(&args.output.join("summary.json"), &summary)?;
    let text = report::render_text_summary(&summary);
    std::fs::write(args.output.join("summary.txt"), &text)
        .with_context(|| format!("cannot write summary to {:?}", args.output))?;

    println!("{text}");
    log::info!("Reports written to {:?}", args.output);
    Ok(())
}
