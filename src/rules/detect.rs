//! Detector building blocks shared by the built-in rules.
//!
//! A rule is a union of independent detectors. [`Detections`] runs them one
//! after another over a script and keeps each matched statement once, in the
//! order it was first detected.

use indexmap::IndexSet;
use tracing::debug;

use super::{RuleInfo, Violation};
use crate::script::{
    Pattern, Script, Statement, Token, TokenKind, find_statements_where, find_tokens,
    next_significant_tokens
};

pub(crate) struct Detections<'a> {
    info:    RuleInfo,
    script:  &'a Script,
    matched: IndexSet<usize>
}

impl<'a> Detections<'a> {
    pub fn new(info: RuleInfo, script: &'a Script) -> Self {
        Self {
            info,
            script,
            matched: IndexSet::new()
        }
    }

    /// DDL `verb` directly followed by the `object` words, e.g.
    /// `CREATE` + `SERVER ROLE`
    pub fn ddl(mut self, verb: &str, object: &[&str]) -> Self {
        let script = self.script;
        let pattern = Pattern::exact(verb);
        for statement in find_statements_where(script.statements(), TokenKind::Ddl, &pattern) {
            if find_tokens(statement, TokenKind::Ddl, &pattern)
                .any(|token| followed_by(statement, token, object))
            {
                self.matched.insert(statement.index());
            }
        }
        self
    }

    /// Calls to any of the named procedures, with or without `EXEC`
    pub fn procedures(mut self, names: &[&str]) -> Self {
        let script = self.script;
        for name in names {
            let pattern = Pattern::exact(*name);
            let hits = find_statements_where(script.statements(), TokenKind::Name, &pattern);
            self.matched.extend(hits.map(|statement| statement.index()));
        }
        self
    }

    /// A word followed by the remaining `words`, e.g. `DBCC SHRINKFILE`
    pub fn words(mut self, words: &[&str]) -> Self {
        let Some((first, rest)) = words.split_first() else {
            return self;
        };
        let script = self.script;
        for statement in script.statements() {
            if statement
                .significant_tokens()
                .any(|token| token.is_word(first) && followed_by(statement, token, rest))
            {
                self.matched.insert(statement.index());
            }
        }
        self
    }

    /// Statements accepted by a rule specific predicate
    pub fn statements_where(mut self, predicate: impl Fn(Statement<'a>) -> bool) -> Self {
        let script = self.script;
        let hits = script.statements().filter(|statement| predicate(*statement));
        self.matched.extend(hits.map(|statement| statement.index()));
        self
    }

    pub fn finish(self) -> Vec<Violation> {
        let violations: Vec<Violation> = self
            .matched
            .iter()
            .filter_map(|&index| self.script.statement(index))
            .map(|statement| Violation::new(&self.info, statement))
            .collect();
        if !violations.is_empty() {
            debug!(
                rule = self.info.id,
                name = self.info.name,
                count = violations.len(),
                "rule matched"
            );
        }
        violations
    }
}

/// Returns `true` if the significant tokens after `token` are exactly `words`
pub(crate) fn followed_by(statement: Statement<'_>, token: &Token, words: &[&str]) -> bool {
    let mut following = next_significant_tokens(statement, token);
    words
        .iter()
        .all(|word| following.next().is_some_and(|next| next.is_word(word)))
}
