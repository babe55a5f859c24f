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

//! Multi-label error classification.
//!
//! Pattern sets are grouped by category; within a category any match
//! assigns the label, and categories are evaluated independently, so one
//! message can carry several labels (a timeout during a credit-card call
//! yields both `credit_card_errors` and `timeout_errors`).

use super::entry::Category;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

macro_rules! patterns {
    ($($p:expr),+ $(,)?) => {
        vec![$(Regex::new(concat!("(?i)", $p)).unwrap()),+]
    };
}

lazy_static! {
    static ref BUILTIN_PATTERNS: Vec<(Category, Vec<Regex>)> = vec![
        (Category::CreditCard, patterns![
            r"payment\s+gateway",
            r"credit\s+card",
            r"card\s+declined",
            r"payment\s+failed",
            r"transaction\s+timeout",
            r"authorization\s+failed",
            r"invalid\s+card",
            r"payment\s+processor",
            r"merchant\s+account",
        ]),
        (Category::Database, patterns![
            r"connection\s+refused",
            r"cannot\s+connect",
            r"database\s+error",
            r"sql\s+error",
            r"timeout.*database",
            r"deadlock",
            r"connection\s+lost",
            r"mysql.*error",
            r"postgresql.*error",
            r"oracle.*error",
        ]),
        // A bare "gateway timeout" is deliberately absent here: that phrase
        // is a timeout (and, for payment gateways, a credit-card) signal,
        // not a 5xx on its own.
        (Category::Server, patterns![
            r"http.*50\d",
            r"status.*50\d",
            r"internal\s+server\s+error",
            r"service\s+unavailable",
            r"bad\s+gateway",
            r"server\s+error",
        ]),
        (Category::Timeout, patterns![
            r"timeout",
            r"timed\s+out",
            r"connection\s+timeout",
            r"read\s+timeout",
            r"request\s+timeout",
        ]),
        (Category::Authentication, patterns![
            r"authentication\s+failed",
            r"unauthorized",
            r"access\s+denied",
            r"forbidden",
            r"invalid\s+credentials",
            r"login\s+failed",
        ]),
        (Category::Exception, patterns![
            r"exception",
            r"stack\s+trace",
            r"null\s+pointer",
            r"out\s+of\s+memory",
            r"segmentation\s+fault",
        ]),
    ];
}

/// Assigns category labels to raw messages by pattern matching.
///
/// Pure and side-effect-free: same input, same output, no shared mutable
/// state. Safe to invoke from every worker without synchronization.
#[derive(Debug)]
pub struct ErrorClassifier {
    custom: Vec<(Category, Vec<Regex>)>,
}

impl ErrorClassifier {
    /// Built-in categories only.
    pub fn new() -> Self {
        Self { custom: Vec::new() }
    }

    /// Built-in categories plus configuration-supplied ones. Custom
    /// patterns are compiled here so an invalid regex fails the run
    /// before any file is parsed.
    pub fn with_custom(custom: &IndexMap<String, Vec<String>>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(custom.len());
        for (category, patterns) in custom {
            let mut regexes = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(&format!("(?i){pattern}")).with_context(|| {
                    format!("invalid pattern `{pattern}` for category `{category}`")
                })?;
                regexes.push(regex);
            }
            compiled.push((Category::from_label(category), regexes));
        }
        Ok(Self { custom: compiled })
    }

    /// Return every category whose pattern set matches the message.
    pub fn classify(&self, message: &str) -> BTreeSet<Category> {
        let mut labels = BTreeSet::new();
        for (category, patterns) in BUILTIN_PATTERNS.iter().chain(self.custom.iter()) {
            if patterns.iter().any(|p| p.is_match(message)) {
                labels.insert(category.clone());
            }
        }
        labels
    }

    /// Labels of every category this classifier can assign, built-ins
    /// first. Used for the per-category CSV columns.
    pub fn known_labels(&self) -> Vec<String> {
        BUILTIN_PATTERNS
            .iter()
            .chain(self.custom.iter())
            .map(|(category, _)| category.label().to_string())
            .collect()
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
