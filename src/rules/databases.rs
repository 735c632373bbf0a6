//! Database lifecycle, files and backups.

use std::sync::LazyLock;

use super::{
    Rule, RuleCategory, RuleInfo, Violation,
    detect::{Detections, followed_by}
};
use crate::script::{
    Pattern, Script, Statement, Token, TokenKind, find_tokens, next_significant_tokens
};

static CREATE: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("CREATE"));

static DROP: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("DROP"));

static ALTER: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("ALTER"));

/// Words after `DATABASE` naming a database scoped object, e.g.
/// `DATABASE SCOPED CREDENTIAL` or `DATABASE ENCRYPTION KEY`
const DATABASE_OBJECTS: &[&str] = &["SCOPED", "AUDIT", "ENCRYPTION"];

/// Verbs of `ALTER DATABASE` that change data or log files
const FILE_ACTIONS: &[&str] = &["ADD", "REMOVE", "MODIFY"];

fn database_rule(id: &'static str, name: &'static str) -> RuleInfo {
    RuleInfo {
        id,
        name,
        category: RuleCategory::Databases
    }
}

/// Flags new databases: `CREATE DATABASE`, attaching files and cloning
///
/// Database scoped objects such as `CREATE DATABASE SCOPED CREDENTIAL` or
/// `CREATE DATABASE AUDIT SPECIFICATION` pass.
pub struct NoCreateDatabase;

impl Rule for NoCreateDatabase {
    fn info(&self) -> RuleInfo {
        database_rule("S017", "NoCreateDatabase")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(|statement| targets_database(statement, &CREATE))
            .procedures(&["sp_attach_db", "sp_attach_single_file_db"])
            .words(&["DBCC", "CLONEDATABASE"])
            .finish()
    }
}

pub struct NoDropDatabase;

impl Rule for NoDropDatabase {
    fn info(&self) -> RuleInfo {
        database_rule("S018", "NoDropDatabase")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(|statement| targets_database(statement, &DROP))
            .procedures(&["sp_detach_db", "sp_dbremove"])
            .finish()
    }
}

/// Flags any form of `ALTER DATABASE` and file shrinking
pub struct NoAlterDatabaseAll;

impl Rule for NoAlterDatabaseAll {
    fn info(&self) -> RuleInfo {
        database_rule("S019", "NoAlterDatabaseAll")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(|statement| targets_database(statement, &ALTER))
            .words(&["DBCC", "SHRINKFILE"])
            .words(&["DBCC", "SHRINKDATABASE"])
            .finish()
    }
}

/// Flags changes to database files and filegroups
///
/// `ALTER DATABASE ... SET` options pass; adding, removing or modifying a
/// file, log file or filegroup does not.
pub struct NoAlterDatabaseFiles;

impl Rule for NoAlterDatabaseFiles {
    fn info(&self) -> RuleInfo {
        database_rule("S020", "NoAlterDatabaseFiles")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(alters_database_files)
            .words(&["DBCC", "SHRINKFILE"])
            .words(&["DBCC", "SHRINKDATABASE"])
            .finish()
    }
}

/// Flags `BACKUP` statements
///
/// Only a statement starting with `BACKUP` counts, so a procedure or column
/// named `backup` passes.
pub struct NoBackup;

impl Rule for NoBackup {
    fn info(&self) -> RuleInfo {
        database_rule("S023", "NoBackup")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(starts_with_backup)
            .finish()
    }
}

/// DDL `verb` acting on a database itself rather than on a database scoped
/// object
fn targets_database(statement: Statement<'_>, verb: &Pattern) -> bool {
    find_tokens(statement, TokenKind::Ddl, verb).any(|token| {
        let mut following = next_significant_tokens(statement, token);
        following.next().is_some_and(|t| t.is_word("DATABASE"))
            && following
                .next()
                .is_none_or(|t| !DATABASE_OBJECTS.iter().any(|word| t.is_word(word)))
    })
}

fn alters_database_files(statement: Statement<'_>) -> bool {
    find_tokens(statement, TokenKind::Ddl, &ALTER)
        .filter(|alter| followed_by(statement, alter, &["DATABASE"]))
        .any(|alter| {
            next_significant_tokens(statement, alter).any(|token| {
                FILE_ACTIONS.iter().any(|action| token.is_word(action))
                    && names_file(statement, token)
            })
        })
}

/// `FILE`, `LOG FILE` or `FILEGROUP` after a file action
fn names_file(statement: Statement<'_>, action: &Token) -> bool {
    let mut following = next_significant_tokens(statement, action);
    match following.next() {
        Some(token) if token.is_word("LOG") => following.next().is_some_and(|t| t.is_word("FILE")),
        Some(token) => token.is_word("FILE") || token.is_word("FILEGROUP"),
        None => false
    }
}

fn starts_with_backup(statement: Statement<'_>) -> bool {
    statement
        .first_significant_token()
        .is_some_and(|token| token.kind == TokenKind::Keyword && token.is_word("BACKUP"))
}
