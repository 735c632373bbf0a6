//! Server-wide configuration.

use std::sync::LazyLock;

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::{Pattern, Script, Statement, TokenKind, find_tokens, procedure_arguments};

static SP_CONFIGURE: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("sp_configure"));

/// Flags server configuration changes
///
/// `sp_configure` with no argument or a single one only reads settings and
/// passes; two or more arguments set a value.
pub struct NoAlterServerConfiguration;

impl Rule for NoAlterServerConfiguration {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S021",
            name:     "NoAlterServerConfiguration",
            category: RuleCategory::Server
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", &["SERVER", "CONFIGURATION"])
            .statements_where(sets_configuration)
            .finish()
    }
}

fn sets_configuration(statement: Statement<'_>) -> bool {
    find_tokens(statement, TokenKind::Name, &SP_CONFIGURE)
        .any(|call| procedure_arguments(statement, call).len() >= 2)
}
