//! Policy rule engine for T-SQL scripts.
//!
//! Every rule inspects a tokenized [`Script`] and reports the statements that
//! break a governance policy (creating logins, granting server permissions,
//! running dynamic SQL, ...). Rules are implemented as types that implement
//! the [`Rule`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Script    │────▶│  RuleRunner  │────▶│ FileReport  │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │
//!                     ┌──────┴──────┐
//!                     │   Rules     │
//!                     │  (parallel) │
//!                     └─────────────┘
//! ```
//!
//! The [`RuleRunner`] executes the active rules in parallel using [`rayon`]
//! and returns their violations in registry order.
//!
//! # Rules
//!
//! | ID | Name | Category |
//! |----|------|----------|
//! | S001 | NoCreateLogin | Logins |
//! | S002 | NoDropLogin | Logins |
//! | S003 | NoAlterLogin | Logins |
//! | S004 | NoCreateServerRole | Roles |
//! | S005 | NoDropServerRole | Roles |
//! | S006 | NoAlterServerRole | Roles |
//! | S007 | NoCreateDatabaseRole | Roles |
//! | S008 | NoDropDatabaseRole | Roles |
//! | S009 | NoAlterDatabaseRole | Roles |
//! | S010 | NoCreateAppRole | Roles |
//! | S011 | NoDropAppRole | Roles |
//! | S012 | NoAlterAppRole | Roles |
//! | S013 | NoDynamicSQL | Execution |
//! | S014 | NoCreateUser | Users |
//! | S015 | NoDropUser | Users |
//! | S016 | NoAlterUser | Users |
//! | S017 | NoCreateDatabase | Databases |
//! | S018 | NoDropDatabase | Databases |
//! | S019 | NoAlterDatabaseAll | Databases |
//! | S020 | NoAlterDatabaseFiles | Databases |
//! | S021 | NoAlterServerConfiguration | Server |
//! | S022 | NoAlterAuthExceptObject | Permissions |
//! | S023 | NoBackup | Databases |
//! | S024 | NoGrantExceptObject | Permissions |
//!
//! # Selection
//!
//! Rules are picked by id prefix through [`RulesConfig`]: a rule runs when its
//! id starts with any `select` entry and with no `ignore` entry.
//!
//! ```toml
//! [tool.queryguard]
//! select = ["S"]
//! ignore = ["S013", "S02"]
//! ```

mod databases;
mod detect;
mod dynamic;
mod logins;
mod permissions;
mod roles;
mod server;
mod types;
mod users;

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;
pub use types::{
    FileReport, FileStatus, RuleCategory, RuleInfo, STATEMENT_PREVIEW_CHARS, Violation,
    trim_batch_separators
};

use crate::{
    config::RulesConfig,
    error::{AppResult, unknown_selector_error},
    script::{Script, tokenize}
};

/// Trait for implementing policy rules.
///
/// Rules are stateless checks that examine every statement of a script and
/// return one violation per offending statement. They must be `Send + Sync`
/// for parallel execution.
///
/// # Example
///
/// ```
/// use queryguard::{
///     rules::{Rule, RuleCategory, RuleInfo, Violation},
///     script::{Pattern, Script, TokenKind, find_statements_where}
/// };
///
/// struct NoShutdown;
///
/// impl Rule for NoShutdown {
///     fn info(&self) -> RuleInfo {
///         RuleInfo {
///             id:       "X001",
///             name:     "NoShutdown",
///             category: RuleCategory::Server
///         }
///     }
///
///     fn check(&self, script: &Script) -> Vec<Violation> {
///         let info = self.info();
///         let pattern = Pattern::exact("SHUTDOWN");
///         find_statements_where(script.statements(), TokenKind::Keyword, &pattern)
///             .map(|statement| Violation::new(&info, statement))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns metadata about this rule.
    fn info(&self) -> RuleInfo;

    /// Checks every statement of `script`.
    ///
    /// # Returns
    ///
    /// One violation per offending statement, empty if the script passes.
    fn check(&self, script: &Script) -> Vec<Violation>;
}

/// All built-in rules in id order
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(logins::NoCreateLogin),
        Box::new(logins::NoDropLogin),
        Box::new(logins::NoAlterLogin),
        Box::new(roles::NoCreateServerRole),
        Box::new(roles::NoDropServerRole),
        Box::new(roles::NoAlterServerRole),
        Box::new(roles::NoCreateDatabaseRole),
        Box::new(roles::NoDropDatabaseRole),
        Box::new(roles::NoAlterDatabaseRole),
        Box::new(roles::NoCreateAppRole),
        Box::new(roles::NoDropAppRole),
        Box::new(roles::NoAlterAppRole),
        Box::new(dynamic::NoDynamicSql),
        Box::new(users::NoCreateUser),
        Box::new(users::NoDropUser),
        Box::new(users::NoAlterUser),
        Box::new(databases::NoCreateDatabase),
        Box::new(databases::NoDropDatabase),
        Box::new(databases::NoAlterDatabaseAll),
        Box::new(databases::NoAlterDatabaseFiles),
        Box::new(server::NoAlterServerConfiguration),
        Box::new(permissions::NoAlterAuthExceptObject),
        Box::new(databases::NoBackup),
        Box::new(permissions::NoGrantExceptObject),
    ]
}

/// Parallel rule execution engine.
///
/// The runner holds the active rules and executes them in parallel against a
/// script using [`rayon`]. It is read-only once built and can be shared
/// between threads evaluating different files.
///
/// # Example
///
/// ```
/// use queryguard::{config::RulesConfig, rules::RuleRunner, script::tokenize};
///
/// let config = RulesConfig {
///     select: vec!["S00".into()],
///     ignore: vec!["S002".into()]
/// };
///
/// let runner = RuleRunner::with_config(&config).unwrap();
/// let violations = runner.evaluate(&tokenize("DROP LOGIN alice; CREATE LOGIN bob;"));
///
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].rule_id, "S001");
/// ```
pub struct RuleRunner {
    rules: Vec<Box<dyn Rule>>
}

impl Default for RuleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRunner {
    /// Create a new runner with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: all_rules()
        }
    }

    /// Create a runner with the rules picked by `config`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a `select` or `ignore` entry is
    /// not a prefix of any rule id.
    pub fn with_config(config: &RulesConfig) -> AppResult<Self> {
        let all = all_rules();
        for (setting, selectors) in [("select", &config.select), ("ignore", &config.ignore)] {
            if let Some(unknown) = selectors
                .iter()
                .find(|selector| !all.iter().any(|rule| has_prefix(rule.info().id, selector)))
            {
                return Err(unknown_selector_error(setting, unknown));
            }
        }
        let rules: Vec<Box<dyn Rule>> = all
            .into_iter()
            .filter(|rule| config.is_enabled(rule.info().id))
            .collect();
        debug!(
            active = rules.len(),
            ids = ?rules.iter().map(|r| r.info().id).collect::<Vec<_>>(),
            "selected rules"
        );
        Ok(Self {
            rules
        })
    }

    /// Metadata of the active rules in id order
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|rule| rule.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run all active rules on a script (parallel execution)
    ///
    /// Violations are returned grouped by rule, in registry order.
    pub fn evaluate(&self, script: &Script) -> Vec<Violation> {
        let per_rule: Vec<Vec<Violation>> = self
            .rules
            .par_iter()
            .map(|rule| rule.check(script))
            .collect();
        per_rule.into_iter().flatten().collect()
    }

    /// Tokenize `source` and evaluate it as the contents of `path`
    pub fn evaluate_source(&self, path: &Path, source: &str) -> FileReport {
        let mut report = FileReport::new(path);
        let script = tokenize(source);
        debug!(
            path = %path.display(),
            statements = script.len(),
            "evaluating file"
        );
        report.record(self.evaluate(&script));
        report
    }
}

/// Case-insensitive rule id prefix test
pub(crate) fn has_prefix(id: &str, prefix: &str) -> bool {
    id.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
