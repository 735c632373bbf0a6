//! # QueryGuard
//!
//! Policy linter for T-SQL scripts.
//!
//! `queryguard` tokenizes SQL scripts, splits them into statements and flags
//! the statements that break security and governance policies: creating
//! logins or roles, granting permissions beyond objects, running dynamic
//! SQL, reconfiguring the server and so on. It does not parse SQL into a
//! full syntax tree; rules are token pattern matchers that tolerate quoting,
//! comments, unbalanced input and `GO` batch separators.
//!
//! # Quick Start
//!
//! ```bash
//! # Lint every *.sql file below a directory
//! queryguard migrations/
//!
//! # Only login and role rules, JSON output for CI
//! queryguard deploy.sql --select S00,S01 --ignore S013 --output json
//!
//! # Show the active rules
//! queryguard --list-rules
//! ```
//!
//! # Library Usage
//!
//! ```
//! use queryguard::{rules::RuleRunner, script::tokenize};
//!
//! let script = tokenize("CREATE LOGIN alice WITH PASSWORD = 'p';\nGO\nSELECT 1;");
//! let violations = RuleRunner::new().evaluate(&script);
//!
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].rule_name, "NoCreateLogin");
//! ```
//!
//! # Exit Codes
//!
//! - `0` - No violations
//! - `1` - At least one violation
//! - `2` - Usage, configuration or I/O error
//!
//! # Modules
//!
//! - [`script`] - Tokenizer, statement tree and token search primitives
//! - [`rules`] - Policy rules and the parallel rule runner
//! - [`config`] - Layered settings (CLI, environment, file, defaults)
//! - [`files`] - SQL file discovery and decoding
//! - [`output`] - Text, JSON and YAML rendering
//! - [`app`] - Lint pipeline used by the binary
//! - [`error`] - Error types and constructors

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod output;
pub mod rules;
pub mod script;
