//! Type definitions for the policy rule system.
//!
//! This module defines the core types used throughout the rule engine:
//! - [`RuleCategory`] - What a rule guards (logins, roles, permissions, ...)
//! - [`RuleInfo`] - Rule identity
//! - [`Violation`] - A statement that breaks a rule
//! - [`FileReport`] - Evaluation result of one file

use std::{fmt, path::PathBuf};

use serde::{Serialize, Serializer};

use crate::script::Statement;

/// Number of characters of the offending statement kept in a violation
pub const STATEMENT_PREVIEW_CHARS: usize = 50;

/// Category of a rule for grouping and listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleCategory {
    /// Server logins
    Logins,
    /// Server, database and application roles
    Roles,
    /// Database users
    Users,
    /// Database lifecycle, files and backups
    Databases,
    /// Server-wide configuration
    Server,
    /// Permission grants and ownership
    Permissions,
    /// Dynamic SQL execution
    Execution
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logins => write!(f, "Logins"),
            Self::Roles => write!(f, "Roles"),
            Self::Users => write!(f, "Users"),
            Self::Databases => write!(f, "Databases"),
            Self::Server => write!(f, "Server"),
            Self::Permissions => write!(f, "Permissions"),
            Self::Execution => write!(f, "Execution")
        }
    }
}

/// Metadata about a rule for identification and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    /// Unique rule identifier (e.g., "S001")
    pub id:       &'static str,
    /// Rule name (e.g., "NoCreateLogin")
    pub name:     &'static str,
    pub category: RuleCategory
}

/// A statement that breaks a rule.
///
/// Serialized as `{id, name, statement, message}` where `statement` has
/// surrounding whitespace and `GO` separators trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Identifier of the broken rule
    #[serde(rename = "id")]
    pub rule_id:         &'static str,
    /// Name of the broken rule
    #[serde(rename = "name")]
    pub rule_name:       &'static str,
    /// Leading characters of the offending statement
    #[serde(serialize_with = "serialize_trimmed")]
    pub statement:       String,
    /// Zero-based index of the statement in its file
    #[serde(skip)]
    pub statement_index: usize,
    pub message:         String
}

impl Violation {
    /// Creates a violation of `info` for `statement`
    pub fn new(info: &RuleInfo, statement: Statement<'_>) -> Self {
        let preview = statement.truncated_text(STATEMENT_PREVIEW_CHARS);
        Self {
            rule_id: info.id,
            rule_name: info.name,
            message: format!(
                "Violated rule {} ({}). Statement: '{}'",
                info.name, info.id, preview
            ),
            statement: preview,
            statement_index: statement.index()
        }
    }

    /// Statement preview without surrounding whitespace and `GO` separators
    pub fn trimmed_statement(&self) -> &str {
        trim_batch_separators(&self.statement)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.rule_name, self.rule_id)
    }
}

fn serialize_trimmed<S: Serializer>(statement: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(trim_batch_separators(statement))
}

/// Trims whitespace and a leading or trailing `GO` word from statement text
///
/// # Example
///
/// ```
/// use queryguard::rules::trim_batch_separators;
///
/// assert_eq!(trim_batch_separators("\nGO\nDROP LOGIN x\nGO\n"), "DROP LOGIN x");
/// assert_eq!(trim_batch_separators("GOTO done"), "GOTO done");
/// ```
pub fn trim_batch_separators(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(head) = text.get(..2)
        && head.eq_ignore_ascii_case("go")
        && text[2..].chars().next().is_none_or(char::is_whitespace)
    {
        text = text[2..].trim_start();
    }
    if let Some(split) = text.len().checked_sub(2)
        && let Some(tail) = text.get(split..)
        && tail.eq_ignore_ascii_case("go")
        && text[..split].chars().next_back().is_none_or(char::is_whitespace)
    {
        text = text[..split].trim_end();
    }
    text
}

/// Evaluation state of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStatus {
    #[default]
    NotRun,
    Passed,
    Failed
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRun => write!(f, "Not Run"),
            Self::Passed => write!(f, "Passed"),
            Self::Failed => write!(f, "Failed")
        }
    }
}

impl Serialize for FileStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of evaluating one file.
///
/// Starts as [`FileStatus::NotRun`]; [`record`](Self::record) moves it to
/// `Passed` or `Failed` once all rules have run.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path:       PathBuf,
    pub status:     FileStatus,
    /// Violations in rule registry order
    pub violations: Vec<Violation>
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:       path.into(),
            status:     FileStatus::NotRun,
            violations: Vec::new()
        }
    }

    /// Stores the violations of a completed evaluation and derives the status
    pub fn record(&mut self, violations: Vec<Violation>) {
        self.status = if violations.is_empty() {
            FileStatus::Passed
        } else {
            FileStatus::Failed
        };
        self.violations = violations;
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}
