//! Token-stream queries over a [`Script`](super::Script).
//!
//! Rules never walk tokens by hand; they compose these primitives:
//!
//! - [`find_statements_where`] - statements containing a matching token
//! - [`find_token`] / [`find_tokens`] - matching tokens inside a statement
//! - [`next_significant_token`] - the next token that is not whitespace or a
//!   comment
//! - [`previous_significant_token`] - the same, looking backwards
//! - [`procedure_arguments`] - the argument list of a stored procedure call
//!
//! A missing token is always reported as `None` or an empty result.

use compact_str::CompactString;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::trace;

use super::types::{Statement, Token, TokenKind};

/// Case-insensitive matcher for token values
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Whole value equals the literal, ignoring ASCII case
    Exact(CompactString),
    /// Regular expression compiled case-insensitively, unanchored
    Regex(Regex)
}

impl Pattern {
    pub fn exact(literal: impl Into<CompactString>) -> Self {
        Self::Exact(literal.into())
    }

    /// Compiles `expression` case-insensitively
    pub fn regex(expression: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(expression)
            .case_insensitive(true)
            .build()
            .map(Self::Regex)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(literal) => literal.eq_ignore_ascii_case(value),
            Self::Regex(regex) => regex.is_match(value)
        }
    }
}

impl From<&str> for Pattern {
    fn from(literal: &str) -> Self {
        Self::exact(literal)
    }
}

impl Token {
    /// Returns `true` if the token has `kind` and its value matches `pattern`
    pub fn matches(&self, kind: TokenKind, pattern: &Pattern) -> bool {
        self.kind == kind && pattern.matches(&self.value)
    }
}

/// How an argument was passed to a procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArgumentKind {
    /// `@name = value`
    Named,
    Positional
}

/// Argument of a stored procedure call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureArgument {
    /// Zero-based position among the captured arguments
    pub index: usize,
    pub kind:  ArgumentKind,
    /// Parameter name without the leading `@`
    pub name:  Option<CompactString>,
    /// Value with surrounding quotes and `N` prefix removed
    pub value: CompactString
}

/// Procedure calls rarely take more than a handful of arguments
pub type ArgumentList = SmallVec<[ProcedureArgument; 4]>;

/// Yields every statement holding at least one token of `kind` whose value
/// matches `pattern`
///
/// # Notes
///
/// - Each statement is yielded at most once, as its root statement even when
///   the match sits in a nested group
/// - Lazy: statements are scanned as the iterator is consumed
pub fn find_statements_where<'a, I>(
    statements: I,
    kind: TokenKind,
    pattern: &Pattern
) -> impl Iterator<Item = Statement<'a>>
where
    I: IntoIterator<Item = Statement<'a>>
{
    statements.into_iter().filter_map(move |statement| {
        find_token(statement, kind, pattern).map(|token| statement.script().statement_of(token))
    })
}

/// First token of `kind` matching `pattern`, in document order
pub fn find_token<'a>(
    statement: Statement<'a>,
    kind: TokenKind,
    pattern: &Pattern
) -> Option<&'a Token> {
    statement
        .tokens()
        .iter()
        .find(|token| token.matches(kind, pattern))
}

/// All tokens of `kind` matching `pattern`, in document order
pub fn find_tokens<'a>(
    statement: Statement<'a>,
    kind: TokenKind,
    pattern: &Pattern
) -> impl Iterator<Item = &'a Token> {
    statement
        .tokens()
        .iter()
        .filter(move |token| token.matches(kind, pattern))
}

/// First significant token after `token` within `statement`
pub fn next_significant_token<'a>(statement: Statement<'a>, token: &Token) -> Option<&'a Token> {
    next_significant_tokens(statement, token).next()
}

/// Significant tokens after `token` up to the end of `statement`
///
/// Yields nothing when `token` is not part of `statement`.
pub fn next_significant_tokens<'a>(
    statement: Statement<'a>,
    token: &Token
) -> impl Iterator<Item = &'a Token> + use<'a> {
    let range = statement.group().tokens.clone();
    let following: &'a [Token] = if range.contains(&token.index) {
        &statement.script().tokens()[token.index + 1..range.end]
    } else {
        &[]
    };
    following.iter().filter(|t| t.is_significant())
}

/// Last significant token before `token` within `statement`
pub fn previous_significant_token<'a>(
    statement: Statement<'a>,
    token: &Token
) -> Option<&'a Token> {
    let range = statement.group().tokens.clone();
    if !range.contains(&token.index) {
        return None;
    }
    statement.script().tokens()[range.start..token.index]
        .iter()
        .rev()
        .find(|t| t.is_significant())
}

/// Collects the arguments passed to the procedure named by `procedure`
///
/// Commas are skipped. `@name` starts a named argument which takes the next
/// token as its value, after an optional `=`; a named argument cut off by the
/// end of the statement is dropped. String and number literals are positional
/// arguments. Everything else is ignored.
pub fn procedure_arguments(statement: Statement<'_>, procedure: &Token) -> ArgumentList {
    let mut arguments = ArgumentList::new();
    let mut tokens = next_significant_tokens(statement, procedure);
    while let Some(token) = tokens.next() {
        if token.is_punctuation(",") {
            continue;
        }
        if token.kind == TokenKind::Name && token.value.starts_with('@') {
            let Some(mut value) = tokens.next() else {
                break;
            };
            if value.kind == TokenKind::Comparison && value.text == "=" {
                let Some(next) = tokens.next() else {
                    break;
                };
                value = next;
            }
            arguments.push(ProcedureArgument {
                index: arguments.len(),
                kind:  ArgumentKind::Named,
                name:  Some(CompactString::from(&token.value[1..])),
                value: strip_literal(&value.text)
            });
            continue;
        }
        if matches!(token.kind, TokenKind::String | TokenKind::Number) {
            arguments.push(ProcedureArgument {
                index: arguments.len(),
                kind:  ArgumentKind::Positional,
                name:  None,
                value: strip_literal(&token.text)
            });
        }
    }
    trace!(
        procedure = %procedure.value,
        count = arguments.len(),
        "collected procedure arguments"
    );
    arguments
}

fn strip_literal(text: &str) -> CompactString {
    let trimmed = text.trim_matches(['\'', '"']);
    let unprefixed = trimmed
        .strip_prefix("N'")
        .or_else(|| trimmed.strip_prefix("N\""))
        .unwrap_or(trimmed);
    CompactString::from(unprefixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_literal() {
        assert_eq!(strip_literal("'abc'"), "abc");
        assert_eq!(strip_literal("N'JOB'"), "JOB");
        assert_eq!(strip_literal("42"), "42");
        assert_eq!(strip_literal("\"x\""), "x");
    }

    #[test]
    fn test_pattern_exact_ignores_case() {
        let pattern = Pattern::exact("sp_configure");
        assert!(pattern.matches("SP_CONFIGURE"));
        assert!(!pattern.matches("sp_configure_x"));
    }

    #[test]
    fn test_pattern_regex_ignores_case() {
        let pattern = Pattern::regex("^exec(ute)?$").unwrap();
        assert!(pattern.matches("EXECUTE"));
        assert!(pattern.matches("exec"));
        assert!(!pattern.matches("executesql"));
    }
}
