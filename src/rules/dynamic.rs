//! Dynamic SQL execution.

use std::sync::LazyLock;

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::{
    Pattern, Script, Statement, TokenKind, find_tokens, next_significant_token
};

static EXEC: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::regex("^exec(ute)?$").expect("valid regex"));

/// Procedures that run SQL text built at runtime
const DYNAMIC_PROCEDURES: &[&str] = &[
    "sp_executesql",
    "sp_prepexec",
    "sp_execute",
    "sp_cursorprepexec",
    "sp_cursorexecute"
];

/// Flags SQL text executed at runtime
///
/// `EXEC ('...')` runs a string and is flagged; `EXEC proc @x = 1` and
/// `EXEC @rc = proc` call a fixed procedure and pass.
pub struct NoDynamicSql;

impl Rule for NoDynamicSql {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S013",
            name:     "NoDynamicSQL",
            category: RuleCategory::Execution
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(executes_string)
            .procedures(DYNAMIC_PROCEDURES)
            .finish()
    }
}

fn executes_string(statement: Statement<'_>) -> bool {
    find_tokens(statement, TokenKind::Keyword, &EXEC).any(|exec| {
        next_significant_token(statement, exec).is_some_and(|next| next.is_punctuation("("))
    })
}
