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

pub mod classifier;
pub mod entry;
pub mod timestamp;

use crate::config::AnalysisConfig;
use anyhow::Result;
use classifier::ErrorClassifier;
use entry::{LogEntry, LogLevel};
use lazy_static::lazy_static;
use regex::Regex;
use timestamp::TimestampNormalizer;

lazy_static! {
    // Explicit level tokens. First token in the text wins.
    static ref LOG_LEVEL: Regex = Regex::new(
        r"(?i)\b(TRACE|DEBUG|INFO|INFORMATION|WARN|WARNING|ERROR|ERR|FATAL|CRITICAL|SEVERE)\b"
    ).unwrap();

    // Identifier extraction, tried in order; first match wins.
    static ref TRANSACTION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\btransaction[_\s]?id[\s:=]+([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"(?i)\btxn[_\s]?id[\s:=]+([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"(?i)\border[_\s]?id[\s:=]+([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"(?i)\bref[_\s]?id[\s:=]+([A-Za-z0-9_-]+)").unwrap(),
    ];

    // Warning phrases that mark an entry as a warning even without a WARN
    // level token (PHP-style logs mostly).
    static ref WARNING_PHRASES: Vec<Regex> = vec![
        Regex::new(r"(?i)\bphp\s+warning\b").unwrap(),
        Regex::new(r"(?i)\bphp\s+notice\b").unwrap(),
        Regex::new(r"(?i)\bdeprecated\b").unwrap(),
        Regex::new(r"\bE_WARNING\b").unwrap(),
        Regex::new(r"\bE_NOTICE\b").unwrap(),
    ];
}

/// Builds canonical [`LogEntry`] records out of raw lines.
///
/// Owns the normalizer and classifier; all three are pure, so one
/// `LineParser` can be shared read-only across the worker pool.
#[derive(Debug)]
pub struct LineParser {
    normalizer: TimestampNormalizer,
    classifier: ErrorClassifier,
    treat_warnings_as_errors: bool,
}

impl LineParser {
    pub fn new(
        normalizer: TimestampNormalizer,
        classifier: ErrorClassifier,
        treat_warnings_as_errors: bool,
    ) -> Self {
        Self {
            normalizer,
            classifier,
            treat_warnings_as_errors,
        }
    }

    /// Build a parser from validated configuration. Fails only on
    /// configuration problems (bad custom regex or format), never on
    /// log content.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self::new(
            config.build_normalizer()?,
            ErrorClassifier::with_custom(&config.custom_category_patterns)?,
            config.treat_warnings_as_errors,
        ))
    }

    pub const fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Parse one raw line into a `LogEntry`.
    ///
    /// Never errors on malformed input: a line with no recognizable
    /// timestamp, level or category still yields a valid entry with those
    /// fields empty/unknown. Only blank lines are skipped.
    pub fn parse_line(&self, raw: &str, source_file: &str, line_number: usize) -> Option<LogEntry> {
        let original = raw.trim();
        if original.is_empty() {
            return None;
        }

        let (timestamp, after_ts) = match self.normalizer.normalize(original) {
            Some((ts, end)) => (Some(ts), original[end..].trim_start()),
            None => (None, original),
        };

        let (level, message) = extract_level(after_ts);

        // Classification looks at the whole line, not just the residual
        // message: category phrases may sit before the level token.
        let categories = self.classifier.classify(original);

        let transaction_id = extract_transaction_id(original);

        let is_warning =
            level == LogLevel::Warn || WARNING_PHRASES.iter().any(|p| p.is_match(original));
        let strict_error = level.is_severe() || !categories.is_empty();
        let has_error = strict_error || (is_warning && self.treat_warnings_as_errors);

        Some(LogEntry {
            timestamp,
            level,
            source_file: source_file.to_string(),
            line_number,
            message,
            categories,
            transaction_id,
            is_warning,
            has_error,
        })
    }
}

/// Find the first explicit level token and strip it from the text.
/// No token means `Unknown` with the text untouched.
fn extract_level(text: &str) -> (LogLevel, String) {
    let Some(caps) = LOG_LEVEL.captures(text) else {
        return (LogLevel::Unknown, text.to_string());
    };
    let matched = caps.get(1).map_or("", |m| m.as_str());
    let level = LogLevel::from_token(matched);
    let full = caps.get(0).map_or(0..0, |m| m.range());
    let mut remaining = String::with_capacity(text.len());
    remaining.push_str(&text[..full.start]);
    remaining.push_str(&text[full.end..]);
    (level, remaining.trim().to_string())
}

fn extract_transaction_id(text: &str) -> Option<String> {
    for pattern in TRANSACTION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::entry::Category;
    use chrono::FixedOffset;

    fn parser() -> LineParser {
        LineParser::new(
            TimestampNormalizer::new(FixedOffset::east_opt(0).unwrap(), 2025, Vec::new()),
            ErrorClassifier::new(),
            false,
        )
    }

    #[test]
    fn test_payment_gateway_line() {
        let entry = parser()
            .parse_line(
                "2025-10-01 08:01:33 ERROR Payment gateway timeout for order_id=555",
                "app.log",
                1,
            )
            .unwrap();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.transaction_id.as_deref(), Some("555"));
        assert_eq!(
            entry.categories,
            [Category::CreditCard, Category::Timeout].into_iter().collect()
        );
        assert!(entry.has_error);
        let ts = entry.timestamp.unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-10-01T08:01:33+00:00");
    }

    #[test]
    fn test_blank_line_skipped() {
        assert!(parser().parse_line("   \t ", "app.log", 3).is_none());
    }

    #[test]
    fn test_malformed_line_still_builds_entry() {
        let entry = parser().parse_line("???", "app.log", 9).unwrap();
        assert!(entry.timestamp.is_none());
        assert_eq!(entry.level, LogLevel::Unknown);
        assert!(entry.categories.is_empty());
        assert!(entry.transaction_id.is_none());
        assert!(!entry.has_error);
        assert_eq!(entry.message, "???");
    }

    #[test]
    fn test_level_token_stripped_from_message() {
        let entry = parser()
            .parse_line("2025-10-01 08:00:00 INFO User login successful", "a.log", 1)
            .unwrap();
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "User login successful");
    }

    #[test]
    fn test_transaction_id_first_pattern_wins() {
        let entry = parser()
            .parse_line("txn_id=ABC order_id=DEF something failed", "a.log", 1)
            .unwrap();
        assert_eq!(entry.transaction_id.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_transaction_id_colon_separator() {
        let entry = parser()
            .parse_line("ERROR transaction ID: TXN123456 declined", "a.log", 1)
            .unwrap();
        assert_eq!(entry.transaction_id.as_deref(), Some("TXN123456"));
    }

    #[test]
    fn test_warning_phrase_without_level() {
        let entry = parser()
            .parse_line("PHP Warning: array key does not exist", "a.log", 1)
            .unwrap();
        assert!(entry.is_warning);
        assert!(!entry.has_error);
    }

    #[test]
    fn test_warnings_as_errors_flag() {
        let strict = LineParser::new(
            TimestampNormalizer::new(FixedOffset::east_opt(0).unwrap(), 2025, Vec::new()),
            ErrorClassifier::new(),
            true,
        );
        let entry = strict
            .parse_line("2025-10-01 08:00:00 WARN disk almost full", "a.log", 1)
            .unwrap();
        assert!(entry.is_warning);
        assert!(entry.has_error);
    }

    #[test]
    fn test_severe_level_is_error_without_categories() {
        let entry = parser()
            .parse_line("2025-10-01 08:00:00 FATAL shutting down", "a.log", 1)
            .unwrap();
        assert!(entry.categories.is_empty());
        assert!(entry.has_error);
    }

    #[test]
    fn test_unrecognized_level_defaults_to_unknown() {
        let entry = parser()
            .parse_line("2025-10-01 08:00:00 NOTICE something", "a.log", 1)
            .unwrap();
        assert_eq!(entry.level, LogLevel::Unknown);
    }
}
