//! Lexing on top of the `sqlparser` tokenizer.
//!
//! The tokenizer of [`sqlparser`] is run with the MS SQL dialect so `[quoted]`
//! identifiers, `@variables` and `N'...'` literals come out as single tokens.
//! Its tokens are mapped onto [`TokenKind`]s; the grammar itself is never
//! consulted.
//!
//! Lines holding only `GO` are cut out before the tokenizer runs, so every
//! batch is tokenized on its own.
//!
//! Lexing never fails. When the tokenizer gives up (an unterminated string
//! literal, for instance) the rest of the offending line is kept as one
//! [`TokenKind::Unknown`] token and lexing resumes on the next line, so a
//! broken batch does not hide the batches after it.

use std::sync::LazyLock;

use compact_str::CompactString;
use regex::Regex;
use sqlparser::{
    dialect::MsSqlDialect,
    keywords::Keyword,
    tokenizer::{Token as SqlToken, Tokenizer, TokenizerError, Whitespace, Word}
};
use tracing::debug;

use super::types::TokenKind;

/// A line holding only `GO`, optionally followed by a line comment
static GO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t]*GO[ \t]*(?:--.*)?\s*$").expect("valid regex"));

const DDL_WORDS: &[&str] = &["CREATE", "ALTER", "DROP"];

const DML_WORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE"];

/// T-SQL words treated as keywords whether or not `sqlparser` knows them
const TSQL_KEYWORDS: &[&str] = &[
    "APPLICATION",
    "AUTHORIZATION",
    "BACKUP",
    "CONFIGURATION",
    "DATABASE",
    "DBCC",
    "EXEC",
    "EXECUTE",
    "FILEGROUP",
    "GRANT",
    "LOGIN",
    "RECONFIGURE",
    "RESTORE",
    "ROLE",
    "SERVER",
    "USER"
];

/// Token produced by the lexer before it is placed into a statement tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexeme {
    pub kind:  TokenKind,
    pub text:  CompactString,
    pub value: CompactString
}

impl Lexeme {
    fn unknown(text: &str) -> Self {
        Self {
            kind:  TokenKind::Unknown,
            text:  text.into(),
            value: text.into()
        }
    }

    fn from_sql(token: &SqlToken) -> Self {
        let text = CompactString::from(token.to_string());
        let (kind, value) = match token {
            SqlToken::Word(word) => (classify_word(word), CompactString::from(word.value.as_str())),
            SqlToken::Number(number, _) => (TokenKind::Number, CompactString::from(number.as_str())),
            SqlToken::SingleQuotedString(s)
            | SqlToken::DoubleQuotedString(s)
            | SqlToken::NationalStringLiteral(s)
            | SqlToken::EscapedStringLiteral(s)
            | SqlToken::HexStringLiteral(s) => (TokenKind::String, CompactString::from(s.as_str())),
            SqlToken::Whitespace(Whitespace::SingleLineComment {
                comment, ..
            }) => (TokenKind::Comment, CompactString::from(comment.trim_end())),
            SqlToken::Whitespace(Whitespace::MultiLineComment(comment)) => {
                (TokenKind::Comment, CompactString::from(comment.as_str()))
            }
            SqlToken::Whitespace(_) => (TokenKind::Whitespace, text.clone()),
            SqlToken::Eq
            | SqlToken::DoubleEq
            | SqlToken::Neq
            | SqlToken::Lt
            | SqlToken::Gt
            | SqlToken::LtEq
            | SqlToken::GtEq
            | SqlToken::Spaceship => (TokenKind::Comparison, text.clone()),
            SqlToken::Comma
            | SqlToken::SemiColon
            | SqlToken::LParen
            | SqlToken::RParen
            | SqlToken::Period
            | SqlToken::Colon
            | SqlToken::DoubleColon
            | SqlToken::LBracket
            | SqlToken::RBracket
            | SqlToken::LBrace
            | SqlToken::RBrace => (TokenKind::Punctuation, text.clone()),
            SqlToken::Placeholder(_) => (TokenKind::Name, text.clone()),
            _ => (TokenKind::Operator, text.clone())
        };
        Self {
            kind,
            text,
            value
        }
    }
}

/// Lexes `source` into classified lexemes, marking `GO` batch separators
pub(crate) fn lex(source: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    for batch in split_batches(source) {
        lex_into(batch, &mut lexemes);
    }
    mark_batch_separators(&mut lexemes);
    lexemes
}

/// Splits `source` into consecutive slices, each `GO` line a slice of its own
///
/// Batches are cut on lines before tokenizing, so a literal or comment left
/// open in one batch never reaches into the next.
fn split_batches(source: &str) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut batch_start = 0;
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if GO_LINE.is_match(line) {
            if batch_start < offset {
                slices.push(&source[batch_start..offset]);
            }
            slices.push(line);
            batch_start = offset + line.len();
        }
        offset += line.len();
    }
    if batch_start < source.len() {
        slices.push(&source[batch_start..]);
    }
    slices
}

fn lex_into(source: &str, out: &mut Vec<Lexeme>) {
    if source.is_empty() {
        return;
    }
    let dialect = MsSqlDialect {};
    match Tokenizer::new(&dialect, source).tokenize() {
        Ok(tokens) => out.extend(
            tokens
                .iter()
                .filter(|t| !matches!(t, SqlToken::EOF))
                .map(Lexeme::from_sql)
        ),
        Err(err) => recover(source, &err, out)
    }
}

fn recover(source: &str, err: &TokenizerError, out: &mut Vec<Lexeme>) {
    let start = byte_offset(source, err.location.line, err.location.column)
        .filter(|&offset| offset < source.len())
        .unwrap_or(0);
    let end = unknown_end(source, start);
    debug!(
        line = err.location.line,
        column = err.location.column,
        message = %err.message,
        "tokenizer stopped early, keeping rest of line as unknown text"
    );
    lex_into(&source[..start], out);
    out.push(Lexeme::unknown(&source[start..end]));
    lex_into(&source[end..], out);
}

/// End of the unknown span starting at `start`: the end of its line, and at
/// least one character past `start`
fn unknown_end(source: &str, start: usize) -> usize {
    let rest = &source[start..];
    let line_end = rest.find('\n').map_or(source.len(), |n| start + n);
    let first = rest.chars().next().map_or(0, char::len_utf8);
    line_end.max(start + first)
}

/// Converts a 1-based line/column location (columns counted in characters)
/// into a byte offset of `source`
fn byte_offset(source: &str, line: u64, column: u64) -> Option<usize> {
    let mut current_line = 1;
    let mut current_column = 1;
    for (offset, ch) in source.char_indices() {
        if current_line == line && current_column == column {
            return Some(offset);
        }
        if ch == '\n' {
            current_line += 1;
            current_column = 1;
        } else {
            current_column += 1;
        }
    }
    (current_line == line && current_column == column).then_some(source.len())
}

fn classify_word(word: &Word) -> TokenKind {
    if word.quote_style.is_some() || word.value.starts_with('@') {
        return TokenKind::Name;
    }
    let upper = word.value.to_ascii_uppercase();
    if DDL_WORDS.contains(&upper.as_str()) {
        TokenKind::Ddl
    } else if DML_WORDS.contains(&upper.as_str()) {
        TokenKind::Dml
    } else if word.keyword != Keyword::NoKeyword || TSQL_KEYWORDS.contains(&upper.as_str()) {
        TokenKind::Keyword
    } else {
        TokenKind::Name
    }
}

fn mark_batch_separators(lexemes: &mut [Lexeme]) {
    for position in 0..lexemes.len() {
        let lexeme = &lexemes[position];
        if lexeme.kind.is_word()
            && lexeme.text.eq_ignore_ascii_case("GO")
            && starts_line(lexemes, position)
            && ends_line(lexemes, position)
        {
            lexemes[position].kind = TokenKind::BatchSeparator;
        }
    }
}

fn is_inline_space(lexeme: &Lexeme) -> bool {
    lexeme.kind == TokenKind::Whitespace && !lexeme.text.contains('\n')
}

fn starts_line(lexemes: &[Lexeme], position: usize) -> bool {
    lexemes[..position]
        .iter()
        .rev()
        .find(|l| !is_inline_space(l))
        .is_none_or(|l| l.text.ends_with('\n'))
}

fn ends_line(lexemes: &[Lexeme], position: usize) -> bool {
    lexemes[position + 1..]
        .iter()
        .find(|l| !is_inline_space(l))
        .is_none_or(|l| {
            l.text.starts_with('\n')
                || l.text.starts_with('\r')
                || (l.kind == TokenKind::Comment && l.text.starts_with("--"))
        })
}
