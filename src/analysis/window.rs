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

use crate::parser::entry::LogEntry;
use chrono::{DateTime, Utc};

/// Keep entries whose timestamp lies in `[start, end)`.
///
/// Entries without a timestamp are dropped here — they stay visible in
/// whole-run totals computed upstream, but cannot take part in temporal
/// analysis. An empty result is a normal, reportable outcome.
pub fn filter_by_window<'a>(
    entries: &'a [LogEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a LogEntry> {
    let filtered: Vec<&LogEntry> = entries
        .iter()
        .filter(|entry| {
            entry
                .timestamp
                .is_some_and(|ts| ts >= start && ts < end)
        })
        .collect();
    log::debug!(
        "Window filter [{start} .. {end}): {} -> {} entries",
        entries.len(),
        filtered.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::entry::LogLevel;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn entry(ts: Option<DateTime<Utc>>, line_number: usize) -> LogEntry {
        LogEntry {
            timestamp: ts,
            level: LogLevel::Info,
            source_file: "a.log".to_string(),
            line_number,
            message: String::new(),
            categories: BTreeSet::new(),
            transaction_id: None,
            is_warning: false,
            has_error: false,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_half_open_window() {
        let entries = vec![
            entry(Some(at(8, 59)), 1),
            entry(Some(at(9, 0)), 2),
            entry(Some(at(13, 59)), 3),
            entry(Some(at(14, 0)), 4),
        ];
        let kept = filter_by_window(&entries, at(9, 0), at(14, 0));
        let lines: Vec<usize> = kept.iter().map(|e| e.line_number).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_unparseable_timestamps_excluded() {
        let entries = vec![entry(None, 1), entry(Some(at(10, 0)), 2)];
        let kept = filter_by_window(&entries, at(9, 0), at(14, 0));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].line_number, 2);
    }

    #[test]
    fn test_no_data_in_window_is_empty_not_error() {
        let entries = vec![entry(Some(at(2, 0)), 1)];
        assert!(filter_by_window(&entries, at(9, 0), at(14, 0)).is_empty());
        assert!(filter_by_window(&[], at(9, 0), at(14, 0)).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let entries = vec![
            entry(Some(at(10, 0)), 1),
            entry(Some(at(9, 30)), 2),
            entry(Some(at(11, 0)), 3),
        ];
        let lines: Vec<usize> = filter_by_window(&entries, at(9, 0), at(14, 0))
            .iter()
            .map(|e| e.line_number)
            .collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
