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

//! Timestamp normalization across inconsistent log formats.
//!
//! Recognizers are tried in a fixed priority order; the first one that
//! matches syntactically AND yields a valid calendar value wins. A match
//! with an impossible date (month 13, hour 25) is treated as a non-match
//! and the next recognizer gets its turn.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ISO 8601: 2023-10-01T14:30:45.123Z, 2023-10-01 14:30:45+02:00, ...
    static ref ISO_TIMESTAMP: Regex = Regex::new(
        r"(\d{4}-\d{2}-\d{2})[T ](\d{2}:\d{2}:\d{2})(\.\d{1,9})?(Z|[+-]\d{2}:?\d{2})?"
    ).unwrap();

    // Syslog: Oct 01 14:30:45 (no year, no offset)
    static ref SYSLOG_TIMESTAMP: Regex = Regex::new(
        r"([A-Z][a-z]{2})\s+(\d{1,2})\s+(\d{2}:\d{2}:\d{2})"
    ).unwrap();

    // Apache/Nginx common+combined: [01/Oct/2023:14:30:45 +0000]
    static ref APACHE_TIMESTAMP: Regex = Regex::new(
        r"\[(\d{2}/[A-Za-z]{3}/\d{4}):(\d{2}:\d{2}:\d{2})(?:\s+([+-]\d{4}))?\]"
    ).unwrap();

    // US-style: 10/01/2023 14:30:45
    static ref US_TIMESTAMP: Regex = Regex::new(
        r"(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{2}:\d{2}:\d{2})"
    ).unwrap();
}

/// A caller-supplied recognizer: a regex with one capture group and a
/// strftime format for the captured text.
#[derive(Debug, Clone)]
pub struct CustomRecognizer {
    regex: Regex,
    format: String,
}

impl CustomRecognizer {
    pub fn compile(pattern: &str, format: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("invalid custom timestamp regex `{pattern}`"))?;
        Ok(Self {
            regex,
            format: format.to_string(),
        })
    }
}

/// Converts raw text fragments into canonical instants.
///
/// Pure and stateless after construction; safe to share across workers.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    /// Applied when the source text carries no explicit offset.
    offset: FixedOffset,
    /// Year assumed for year-less formats (syslog).
    assume_year: i32,
    custom: Vec<CustomRecognizer>,
}

impl TimestampNormalizer {
    pub fn new(offset: FixedOffset, assume_year: i32, custom: Vec<CustomRecognizer>) -> Self {
        Self {
            offset,
            assume_year,
            custom,
        }
    }

    /// Try all recognizers in priority order. Returns the canonical
    /// instant and the byte offset just past the matched text (so the
    /// caller can strip the timestamp from the line), or `None` when
    /// nothing matched — an expected outcome, not an error.
    pub fn normalize(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        if let Some(hit) = self.try_iso(line) {
            return Some(hit);
        }
        if let Some(hit) = self.try_apache(line) {
            return Some(hit);
        }
        if let Some(hit) = self.try_syslog(line) {
            return Some(hit);
        }
        if let Some(hit) = self.try_us(line) {
            return Some(hit);
        }
        self.try_custom(line)
    }

    /// Convenience wrapper when the match position is not needed.
    pub fn instant(&self, line: &str) -> Option<DateTime<Utc>> {
        self.normalize(line).map(|(ts, _)| ts)
    }

    fn try_iso(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = ISO_TIMESTAMP.captures(line)?;
        let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
        let mut time = NaiveTime::parse_from_str(caps.get(2)?.as_str(), "%H:%M:%S").ok()?;
        if let Some(frac) = caps.get(3) {
            let nanos = fraction_nanos(frac.as_str())?;
            time = NaiveTime::from_hms_nano_opt(time.hour(), time.minute(), time.second(), nanos)?;
        }
        let naive = NaiveDateTime::new(date, time);
        let offset = match caps.get(4) {
            Some(m) => parse_offset(m.as_str())?,
            None => self.offset,
        };
        let end = caps.get(0)?.end();
        Some((to_utc(naive, offset)?, end))
    }

    fn try_apache(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = APACHE_TIMESTAMP.captures(line)?;
        let naive = NaiveDateTime::parse_from_str(
            &format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str()),
            "%d/%b/%Y %H:%M:%S",
        )
        .ok()?;
        let offset = match caps.get(3) {
            Some(m) => parse_offset(m.as_str())?,
            None => self.offset,
        };
        let end = caps.get(0)?.end();
        Some((to_utc(naive, offset)?, end))
    }

    fn try_syslog(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = SYSLOG_TIMESTAMP.captures(line)?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let naive = NaiveDateTime::parse_from_str(
            &format!(
                "{} {} {:02} {}",
                self.assume_year,
                caps.get(1)?.as_str(),
                day,
                caps.get(3)?.as_str()
            ),
            "%Y %b %d %H:%M:%S",
        )
        .ok()?;
        let end = caps.get(0)?.end();
        Some((to_utc(naive, self.offset)?, end))
    }

    fn try_us(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        let caps = US_TIMESTAMP.captures(line)?;
        let month: u32 = caps.get(1)?.as_str().parse().ok()?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let naive = NaiveDateTime::parse_from_str(
            &format!(
                "{:02}/{:02}/{} {}",
                month,
                day,
                caps.get(3)?.as_str(),
                caps.get(4)?.as_str()
            ),
            "%m/%d/%Y %H:%M:%S",
        )
        .ok()?;
        let end = caps.get(0)?.end();
        Some((to_utc(naive, self.offset)?, end))
    }

    fn try_custom(&self, line: &str) -> Option<(DateTime<Utc>, usize)> {
        for recognizer in &self.custom {
            let Some(caps) = recognizer.regex.captures(line) else {
                continue;
            };
            let text = caps.get(1).or_else(|| caps.get(0))?.as_str();
            let Ok(naive) = NaiveDateTime::parse_from_str(text, &recognizer.format) else {
                continue;
            };
            let end = caps.get(0)?.end();
            if let Some(utc) = to_utc(naive, self.offset) {
                return Some((utc, end));
            }
        }
        None
    }
}

fn to_utc(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse `Z`, `+02:00`, `-0700` into a fixed offset. Anything else,
/// including the empty string or a non-ASCII sign, is `None`.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s == "Z" || s == "z" {
        return FixedOffset::east_opt(0);
    }
    let (east, rest) = match s.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('-')?),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    if east {
        FixedOffset::east_opt(seconds)
    } else {
        FixedOffset::west_opt(seconds)
    }
}

fn fraction_nanos(frac: &str) -> Option<u32> {
    let digits = frac.strip_prefix('.')?;
    let mut padded = digits.to_string();
    while padded.len() < 9 {
        padded.push('0');
    }
    padded[..9].parse().ok()
}

/// Parse a timezone string from configuration, failing loudly — an
/// unparseable offset is a configuration error, not a recoverable one.
pub fn offset_from_config(tz: &str) -> Result<FixedOffset> {
    parse_offset(tz).ok_or_else(|| anyhow!("invalid timezone offset `{tz}` (expected e.g. +02:00)"))
}
