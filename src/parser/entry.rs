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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Severity extracted from a log line. Synonyms seen in the wild
/// (INFORMATION, SEVERE, ...) fold into this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Critical,
    Unknown,
}

impl LogLevel {
    pub fn from_token(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "TRACE" | "DEBUG" => LogLevel::Debug,
            "INFO" | "INFORMATION" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" | "ERR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            "CRITICAL" | "SEVERE" => LogLevel::Critical,
            _ => LogLevel::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Unknown => "UNKNOWN",
        }
    }

    /// Levels that make an entry an error on their own, before any
    /// category pattern has matched.
    pub const fn is_severe(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal | LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error category label assigned by pattern matching.
///
/// The built-in variants form a closed set; categories supplied through
/// configuration arrive as `Custom`. Ordering is the label's string order so
/// that category sets and per-category counts are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    CreditCard,
    Database,
    Server,
    Timeout,
    Authentication,
    Exception,
    Custom(String),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::CreditCard => "credit_card_errors",
            Category::Database => "database_errors",
            Category::Server => "server_errors",
            Category::Timeout => "timeout_errors",
            Category::Authentication => "authentication_errors",
            Category::Exception => "exception_errors",
            Category::Custom(name) => name,
        }
    }

    const fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }

    /// Inverse of [`Category::label`], used when reading exported records
    /// back in.
    pub fn from_label(label: &str) -> Self {
        match label {
            "credit_card_errors" => Category::CreditCard,
            "database_errors" => Category::Database,
            "server_errors" => Category::Server,
            "timeout_errors" => Category::Timeout,
            "authentication_errors" => Category::Authentication,
            "exception_errors" => Category::Exception,
            other => Category::Custom(other.to_string()),
        }
    }
}

// Label order, with custom-vs-builtin as a tiebreak so `Ord` agrees with
// the derived `Eq` even for a `Custom` carrying a built-in label.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.label()
            .cmp(other.label())
            .then_with(|| self.is_custom().cmp(&other.is_custom()))
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parsed log line. Built once by the parser and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Canonical instant, `None` when no recognizer matched. Entries
    /// without a timestamp stay in whole-run totals but are excluded from
    /// temporal analysis.
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    pub source_file: String,
    pub line_number: usize,
    /// Raw line text after timestamp/level stripping.
    pub message: String,
    /// Multi-label classification; never mutually exclusive.
    pub categories: BTreeSet<Category>,
    pub transaction_id: Option<String>,
    /// WARN level or a warning phrase in the text.
    pub is_warning: bool,
    /// Severe level, any category match, or (if configured) a warning.
    pub has_error: bool,
}

impl LogEntry {
    /// Stable ordering key for the deterministic merge barrier.
    pub fn sort_key(&self) -> (&str, usize) {
        (self.source_file.as_str(), self.line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_synonyms_fold() {
        assert_eq!(LogLevel::from_token("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::from_token("SEVERE"), LogLevel::Critical);
        assert_eq!(LogLevel::from_token("Information"), LogLevel::Info);
        assert_eq!(LogLevel::from_token("trace"), LogLevel::Debug);
        assert_eq!(LogLevel::from_token("notice"), LogLevel::Unknown);
    }

    #[test]
    fn test_severe_levels() {
        assert!(LogLevel::Error.is_severe());
        assert!(LogLevel::Fatal.is_severe());
        assert!(LogLevel::Critical.is_severe());
        assert!(!LogLevel::Warn.is_severe());
        assert!(!LogLevel::Unknown.is_severe());
    }

    #[test]
    fn test_category_label_round_trip() {
        for cat in [
            Category::CreditCard,
            Category::Database,
            Category::Server,
            Category::Timeout,
            Category::Authentication,
            Category::Exception,
            Category::Custom("cache_errors".to_string()),
        ] {
            assert_eq!(Category::from_label(cat.label()), cat);
        }
    }

    #[test]
    fn test_custom_with_builtin_label_stays_distinct() {
        // A Custom carrying a built-in label is not Eq to the builtin, so
        // Ord must not collapse them either.
        let custom = Category::Custom("credit_card_errors".to_string());
        assert_ne!(custom, Category::CreditCard);
        assert_ne!(custom.cmp(&Category::CreditCard), std::cmp::Ordering::Equal);
        let mut set = BTreeSet::new();
        set.insert(Category::CreditCard);
        set.insert(custom);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_category_order_is_label_order() {
        let mut set = BTreeSet::new();
        set.insert(Category::Timeout);
        set.insert(Category::CreditCard);
        set.insert(Category::Custom("app_errors".to_string()));
        let labels: Vec<&str> = set.iter().map(Category::label).collect();
        assert_eq!(
            labels,
            vec!["app_errors", "credit_card_errors", "timeout_errors"]
        );
    }
}
