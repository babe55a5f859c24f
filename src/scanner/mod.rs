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

//! File discovery: recursive scan for `.log`/`.txt` files, size cap, and
//! strict-UTF-8 reads. A file that cannot be read or decoded becomes a
//! recorded per-file failure and never cancels the rest of the run.

use crate::analysis::FileFailure;
use crate::pipeline::LogSource;
use std::path::{Path, PathBuf};

const SUPPORTED_EXTENSIONS: [&str; 2] = ["log", "txt"];

/// Everything discovery produced: readable sources plus the files that
/// were skipped or unreadable, with reasons.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub sources: Vec<LogSource>,
    pub failures: Vec<FileFailure>,
}

/// Recursively collect `.log`/`.txt` files under `root` and read them.
/// Discovered paths are sorted before reading so the outcome does not
/// depend on directory iteration order.
pub fn scan_directory(root: &Path, max_file_size_mb: u64) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    if !root.exists() {
        log::warn!("Logs directory {root:?} does not exist");
        return outcome;
    }

    let mut paths = Vec::new();
    collect_paths(root, &mut paths);
    paths.sort();
    log::info!("Found {} log files under {root:?}", paths.len());

    let max_bytes = max_file_size_mb.saturating_mul(1024 * 1024);
    for path in paths {
        let name = path.to_string_lossy().to_string();
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > max_bytes => {
                log::warn!(
                    "Skipping {name}: {} bytes exceeds the {max_file_size_mb} MB limit",
                    meta.len()
                );
                outcome.failures.push(FileFailure {
                    source_file: name,
                    reason: format!("exceeds size limit of {max_file_size_mb} MB"),
                });
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Cannot stat {name}: {e}");
                outcome.failures.push(FileFailure {
                    source_file: name,
                    reason: format!("cannot stat: {e}"),
                });
                continue;
            }
        }

        match std::fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => outcome.sources.push(LogSource::new(name, text)),
                Err(e) => {
                    log::warn!("Dropping {name}: {e}");
                    outcome.failures.push(FileFailure {
                        source_file: name,
                        reason: "not valid UTF-8".to_string(),
                    });
                }
            },
            Err(e) => {
                log::warn!("Cannot read {name}: {e}");
                outcome.failures.push(FileFailure {
                    source_file: name,
                    reason: format!("cannot read: {e}"),
                });
            }
        }
    }

    outcome
}

fn collect_paths(dir: &Path, paths: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list directory {dir:?}: {e}");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        // file_type() does not follow links, so a symlink cycle cannot
        // recurse. Symlinked log files still resolve through the
        // is_dir/extension checks below.
        let is_symlink = entry
            .file_type()
            .map(|ftype| ftype.is_symlink())
            .unwrap_or(false);
        if path.is_dir() {
            if is_symlink {
                log::debug!("Not following directory symlink {path:?}");
                continue;
            }
            collect_paths(&path, paths);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            })
        {
            paths.push(path);
        }
    }
}
