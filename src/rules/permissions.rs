//! Permission grants and ownership transfers.
//!
//! Both rules allow changes scoped to a single securable object and flag
//! anything broader: database, schema or server scope (`DATABASE::db`,
//! `SCHEMA::s`), or permissions that are not object permissions.

use std::sync::LazyLock;

use smallvec::SmallVec;

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::{
    Pattern, Script, Statement, Token, TokenKind, find_tokens, next_significant_token,
    next_significant_tokens, previous_significant_token
};

static ALTER: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("ALTER"));

static GRANT: LazyLock<Pattern> = LazyLock::new(|| Pattern::exact("GRANT"));

/// Permissions that may be granted on an object
const OBJECT_PERMISSIONS: &[&str] = &[
    "DELETE",
    "EXECUTE",
    "INSERT",
    "SELECT",
    "UPDATE",
    "REFERENCES",
    "UNMASK",
    "VIEW DEFINITION",
    "VIEW CHANGE TRACKING",
    "RECEIVE"
];

/// Flags ownership transfers of anything but a single object
///
/// `ALTER AUTHORIZATION ON OBJECT::t` and the unqualified
/// `ALTER AUTHORIZATION ON t` pass; `ON SCHEMA::s` or `ON database::db` do
/// not.
pub struct NoAlterAuthExceptObject;

impl Rule for NoAlterAuthExceptObject {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S022",
            name:     "NoAlterAuthExceptObject",
            category: RuleCategory::Permissions
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(transfers_scoped_ownership)
            .finish()
    }
}

/// Flags grants beyond object permissions on a single object
///
/// A grant passes when every permission is an object permission and the
/// target is a plain object name or `OBJECT::name`. It is flagged for any
/// other permission, a missing `ON` clause, or a `scope::` target other
/// than `OBJECT`. Every grant of a statement is checked, so grants in a
/// batch without `;` separators are flagged one by one.
pub struct NoGrantExceptObject;

impl Rule for NoGrantExceptObject {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S024",
            name:     "NoGrantExceptObject",
            category: RuleCategory::Permissions
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .statements_where(grants_beyond_objects)
            .finish()
    }
}

fn transfers_scoped_ownership(statement: Statement<'_>) -> bool {
    find_tokens(statement, TokenKind::Ddl, &ALTER).any(|alter| {
        let mut following = next_significant_tokens(statement, alter);
        let (Some(authorization), Some(on), Some(scope), Some(separator)) = (
            following.next(),
            following.next(),
            following.next(),
            following.next()
        ) else {
            return false;
        };
        authorization.is_word("AUTHORIZATION") && on.is_word("ON") && is_scoped(scope, separator)
    })
}

fn grants_beyond_objects(statement: Statement<'_>) -> bool {
    find_tokens(statement, TokenKind::Keyword, &GRANT)
        .filter(|grant| starts_grant(statement, grant))
        .any(|grant| exceeds_objects(statement, grant))
}

/// `GRANT` opening a grant, not `WITH GRANT OPTION` or
/// `REVOKE GRANT OPTION FOR`
fn starts_grant(statement: Statement<'_>, grant: &Token) -> bool {
    let revoked_or_with = previous_significant_token(statement, grant)
        .is_some_and(|previous| previous.is_word("REVOKE") || previous.is_word("WITH"));
    let option =
        next_significant_token(statement, grant).is_some_and(|next| next.is_word("OPTION"));
    !revoked_or_with && !option
}

fn exceeds_objects(statement: Statement<'_>, grant: &Token) -> bool {
    let mut permissions: SmallVec<[String; 4]> = SmallVec::new();
    let mut phrase = String::new();
    let mut target = None;
    let mut clause = next_significant_tokens(statement, grant).filter(|t| t.group == grant.group);
    while let Some(token) = clause.next() {
        if token.is_word("ON") {
            target = Some((clause.next(), clause.next()));
            break;
        }
        if token.is_word("TO") {
            break;
        }
        if token.is_punctuation(",") {
            permissions.extend(take_phrase(&mut phrase));
        } else if token.kind.is_word() {
            if !phrase.is_empty() {
                phrase.push(' ');
            }
            phrase.push_str(&token.value.to_ascii_uppercase());
        }
    }
    permissions.extend(take_phrase(&mut phrase));
    if permissions.is_empty() {
        return false;
    }
    if permissions
        .iter()
        .any(|permission| !OBJECT_PERMISSIONS.contains(&permission.as_str()))
    {
        return true;
    }
    match target {
        None => true,
        Some((Some(scope), Some(separator))) => is_scoped(scope, separator),
        Some(_) => false
    }
}

fn take_phrase(phrase: &mut String) -> Option<String> {
    (!phrase.is_empty()).then(|| std::mem::take(phrase))
}

/// `scope::` with a scope other than `OBJECT`
fn is_scoped(scope: &Token, separator: &Token) -> bool {
    separator.is_punctuation("::") && !scope.is_word("OBJECT")
}
