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

//! Whole-tool integration: files on disk -> scan -> parse -> analyze ->
//! rendered reports.

use chrono::NaiveDate;
use logtriage::{config::AnalysisConfig, pipeline, report, scanner, LineParser};
use std::fs;

fn write_fixture(dir: &std::path::Path) {
    fs::create_dir(dir.join("payments")).unwrap();
    let mut app = String::new();
    app.push_str("2025-10-01 09:15:00 INFO Service started\n");
    for s in 0..6 {
        app.push_str(&format!(
            "2025-10-01 10:30:{s:02} ERROR Database error: connection refused\n"
        ));
    }
    app.push_str("Oct 01 11:00:00 WARNING disk usage at 91%\n");
    app.push_str("2025-10-01 23:00:00 ERROR sql error outside the window\n");
    fs::write(dir.join("app.log"), app).unwrap();

    let payments = "\
2025-10-01 12:00:00 ERROR Payment gateway timeout for txn_id=TXN-42\n\
2025-10-01 12:01:00 ERROR SQL error while settling txn_id=TXN-42\n";
    fs::write(dir.join("payments/gateway.txt"), payments).unwrap();

    // Wrong extension, must be ignored by discovery.
    fs::write(dir.join("notes.md"), "ERROR not a log file").unwrap();
}

#[test]
fn files_on_disk_to_reports() {
    let logs = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(logs.path());

    let config = AnalysisConfig::for_date(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    let outcome = scanner::scan_directory(logs.path(), config.max_file_size_mb);
    assert_eq!(outcome.sources.len(), 2);
    assert!(outcome.failures.is_empty());

    let parser = LineParser::from_config(&config).unwrap();
    let labels = parser.classifier().known_labels();
    let entries = pipeline::parse_sources(&parser, &outcome.sources, config.max_lines_per_file);
    let summary =
        logtriage::AnalysisAggregator::new(&config).aggregate(&entries, outcome.failures);

    // Totals are whole-run; the 23:00 error counts even though it is
    // outside the window.
    assert_eq!(summary.total_entries, 11);
    assert_eq!(summary.total_errors, 9);
    assert_eq!(summary.total_warnings, 1);
    assert_eq!(summary.entries_in_window, 10);

    assert_eq!(summary.findings.bursts.len(), 1);
    assert_eq!(summary.findings.bursts[0].error_count, 6);
    assert_eq!(summary.findings.cascades.len(), 1);
    let cascade = &summary.findings.cascades[0];
    assert_eq!(cascade.transaction_id, "TXN-42");
    assert!(cascade.categories.contains("credit_card_errors"));
    assert!(cascade.categories.contains("database_errors"));
    assert!(cascade.categories.contains("timeout_errors"));

    report::write_entries_csv(&out.path().join("entries.csv"), &entries, &labels).unwrap();
    report::write_summary_json(&out.path().join("summary.json"), &summary).unwrap();
    let text = report::render_text_summary(&summary);
    fs::write(out.path().join("summary.txt"), &text).unwrap();

    let csv = fs::read_to_string(out.path().join("entries.csv")).unwrap();
    // Header + one row per parsed entry.
    assert_eq!(csv.lines().count(), 12);
    assert!(csv.lines().next().unwrap().starts_with("timestamp,log_level,file_name"));

    let json = fs::read_to_string(out.path().join("summary.json")).unwrap();
    assert!(json.contains("\"total_entries\": 11"));

    assert!(text.contains("Error bursts:       1"));
    assert!(text.contains("TXN-42"));
}
