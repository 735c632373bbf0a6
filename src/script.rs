//! Tokenization of SQL text into a statement tree.
//!
//! [`tokenize`] turns raw T-SQL into a [`Script`]: a flat token stream split
//! into statements, with parenthesized spans nested as groups. Nothing is
//! parsed against a grammar, so any input (including broken SQL) yields a
//! script whose statement texts concatenate back to the source.
//!
//! # Statement boundaries
//!
//! - `;` ends a statement and belongs to it
//! - `GO` on its own line ends a statement and belongs to it
//! - whitespace and `--` comments directly after a terminator are kept with
//!   the terminated statement
//! - unbalanced parentheses are closed at the statement boundary
//!
//! # Example
//!
//! ```
//! use queryguard::script::tokenize;
//!
//! let script = tokenize("CREATE LOGIN alice WITH PASSWORD = 'p';\nSELECT 1");
//! assert_eq!(script.len(), 2);
//! assert_eq!(script.text(), "CREATE LOGIN alice WITH PASSWORD = 'p';\nSELECT 1");
//! ```

mod lexer;
pub mod search;
mod types;

use lexer::Lexeme;
pub use search::{
    ArgumentKind, ArgumentList, Pattern, ProcedureArgument, find_statements_where, find_token,
    find_tokens, next_significant_token, next_significant_tokens, previous_significant_token,
    procedure_arguments
};
use tracing::trace;
pub use types::{Group, GroupId, GroupKind, Node, Script, Statement, Token, TokenKind};

/// Tokenizes SQL text into a [`Script`]
///
/// # Notes
///
/// - Never fails; text the tokenizer rejects becomes [`TokenKind::Unknown`]
pub fn tokenize(source: &str) -> Script {
    let mut builder = ScriptBuilder::default();
    for lexeme in lexer::lex(source) {
        builder.push(lexeme);
    }
    let script = builder.finish();
    trace!(
        statements = script.len(),
        tokens = script.tokens().len(),
        "tokenized script"
    );
    script
}

#[derive(Default)]
struct ScriptBuilder {
    script:   Script,
    /// Groups currently open, root statement first
    open:     Vec<GroupId>,
    /// Statement that just ended and still takes trailing trivia
    trailing: Option<GroupId>
}

impl ScriptBuilder {
    fn push(&mut self, lexeme: Lexeme) {
        if self.open.is_empty() {
            if let Some(root) = self.trailing
                && is_trailing_trivia(&lexeme)
            {
                self.append(root, lexeme);
                self.script.groups[root].tokens.end = self.script.tokens.len();
                return;
            }
            self.trailing = None;
            self.open_group(GroupKind::Statement);
        }
        let opens = lexeme.kind == TokenKind::Punctuation && lexeme.text == "(";
        let closes = lexeme.kind == TokenKind::Punctuation && lexeme.text == ")" && self.open.len() > 1;
        let terminates = lexeme.kind == TokenKind::BatchSeparator
            || (lexeme.kind == TokenKind::Punctuation && lexeme.text == ";");
        if opens {
            self.open_group(GroupKind::Parenthesis);
        }
        if let Some(&group) = self.open.last() {
            self.append(group, lexeme);
        }
        if closes {
            self.close_group();
        }
        if terminates {
            self.trailing = self.open.first().copied();
            while !self.open.is_empty() {
                self.close_group();
            }
        }
    }

    fn open_group(&mut self, kind: GroupKind) {
        let id = self.script.groups.len();
        let parent = self.open.last().copied();
        let statement = match parent {
            Some(parent) => self.script.groups[parent].statement,
            None => {
                self.script.roots.push(id);
                self.script.roots.len() - 1
            }
        };
        let start = self.script.tokens.len();
        self.script.groups.push(Group {
            kind,
            parent,
            statement,
            tokens: start..start,
            children: Vec::new()
        });
        if let Some(parent) = parent {
            self.script.groups[parent].children.push(Node::Group(id));
        }
        self.open.push(id);
    }

    fn append(&mut self, group: GroupId, lexeme: Lexeme) {
        let index = self.script.tokens.len();
        self.script.tokens.push(Token {
            kind: lexeme.kind,
            text: lexeme.text,
            value: lexeme.value,
            index,
            group
        });
        self.script.groups[group].children.push(Node::Token(index));
    }

    fn close_group(&mut self) {
        if let Some(id) = self.open.pop() {
            self.script.groups[id].tokens.end = self.script.tokens.len();
        }
    }

    fn finish(mut self) -> Script {
        while !self.open.is_empty() {
            self.close_group();
        }
        self.script
    }
}

fn is_trailing_trivia(lexeme: &Lexeme) -> bool {
    lexeme.kind == TokenKind::Whitespace
        || (lexeme.kind == TokenKind::Comment && lexeme.text.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let script = tokenize("");
        assert!(script.is_empty());
        assert_eq!(script.text(), "");
    }

    #[test]
    fn test_trailing_whitespace_stays_with_statement() {
        let script = tokenize("SELECT 1;\n\nSELECT 2;\n");
        assert_eq!(script.len(), 2);
        assert_eq!(script.statement(0).unwrap().text(), "SELECT 1;\n\n");
        assert_eq!(script.statement(1).unwrap().text(), "SELECT 2;\n");
    }

    #[test]
    fn test_nested_groups_point_to_root() {
        let script = tokenize("EXEC ((SELECT 1))");
        assert_eq!(script.len(), 1);
        let inner = script
            .tokens()
            .iter()
            .find(|t| t.kind == TokenKind::Number)
            .unwrap();
        let group = script.group(inner.group);
        assert_eq!(group.kind, GroupKind::Parenthesis);
        assert_eq!(script.group(group.parent.unwrap()).kind, GroupKind::Parenthesis);
        assert_eq!(script.statement_of(inner).index(), 0);
    }

    #[test]
    fn test_unbalanced_parenthesis_closed_at_terminator() {
        let script = tokenize("SELECT (1; SELECT 2");
        assert_eq!(script.len(), 2);
        let second = script.statement(1).unwrap();
        assert_eq!(second.text(), "SELECT 2");
        assert_eq!(script.statement(0).unwrap().text(), "SELECT (1; ");
    }
}
