//! Token and statement tree types.
//!
//! A [`Script`] owns every token of a source text in one flat vector plus an
//! arena of [`Group`]s. Each group covers a contiguous range of that vector:
//! root groups are statements, nested groups are parenthesized spans. Parent
//! links are indices into the arena, so a token can always be traced back to
//! the statement it belongs to.

use std::{fmt, ops::Range};

use compact_str::CompactString;
use serde::Serialize;

/// Index of a [`Group`] in the script arena
pub type GroupId = usize;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Reserved word (`GRANT`, `EXEC`, `LOGIN`, ...)
    Keyword,
    /// `CREATE`, `ALTER`, `DROP`
    Ddl,
    /// `SELECT`, `INSERT`, `UPDATE`, `DELETE`, `MERGE`
    Dml,
    /// Identifier, quoted identifier or `@variable`
    Name,
    Punctuation,
    Comparison,
    Operator,
    /// String literal; the value holds the unquoted contents
    String,
    Number,
    Whitespace,
    /// Line or block comment
    Comment,
    /// `GO` on a line of its own
    BatchSeparator,
    /// Text the tokenizer could not make sense of
    Unknown
}

impl TokenKind {
    /// Whitespace and comments carry no meaning for matching
    pub fn is_significant(self) -> bool {
        !matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Categories a bare SQL word can be classified as
    pub fn is_word(self) -> bool {
        matches!(self, Self::Keyword | Self::Ddl | Self::Dml | Self::Name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keyword => "Keyword",
            Self::Ddl => "DDL",
            Self::Dml => "DML",
            Self::Name => "Name",
            Self::Punctuation => "Punctuation",
            Self::Comparison => "Comparison",
            Self::Operator => "Operator",
            Self::String => "String",
            Self::Number => "Number",
            Self::Whitespace => "Whitespace",
            Self::Comment => "Comment",
            Self::BatchSeparator => "BatchSeparator",
            Self::Unknown => "Unknown"
        };
        f.write_str(name)
    }
}

/// Single lexical unit of a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind:  TokenKind,
    /// Source text of the token
    pub text:  CompactString,
    /// Normalized value: identifiers without quotes, string contents
    pub value: CompactString,
    /// Position in the flattened token stream of the script
    pub index: usize,
    /// Innermost group owning this token
    pub group: GroupId
}

impl Token {
    pub fn is_significant(&self) -> bool {
        self.kind.is_significant()
    }

    /// Returns `true` for a keyword or name equal to `word`, ignoring case
    pub fn is_word(&self, word: &str) -> bool {
        self.kind.is_word() && self.value.eq_ignore_ascii_case(word)
    }

    pub fn is_punctuation(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    Statement,
    Parenthesis
}

/// Child of a group: either a leaf token or a nested group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Token(usize),
    Group(GroupId)
}

#[derive(Debug, Clone)]
pub struct Group {
    pub kind:      GroupKind,
    pub parent:    Option<GroupId>,
    /// Ordinal of the root statement this group belongs to
    pub statement: usize,
    /// Range of token indices covered by the group, nested groups included
    pub tokens:    Range<usize>,
    pub children:  Vec<Node>
}

/// Tokenized SQL text split into statements
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub(crate) tokens: Vec<Token>,
    pub(crate) groups: Vec<Group>,
    pub(crate) roots:  Vec<GroupId>
}

impl Script {
    /// All tokens in source order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id]
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Statements in source order
    pub fn statements(&self) -> impl ExactSizeIterator<Item = Statement<'_>> + Clone {
        self.roots
            .iter()
            .enumerate()
            .map(move |(index, &group)| Statement {
                script: self,
                group,
                index
            })
    }

    pub fn statement(&self, index: usize) -> Option<Statement<'_>> {
        self.roots.get(index).map(|&group| Statement {
            script: self,
            group,
            index
        })
    }

    /// Root statement containing `token`, however deeply it is nested
    pub fn statement_of(&self, token: &Token) -> Statement<'_> {
        let index = self.groups[token.group].statement;
        Statement {
            script: self,
            group: self.roots[index],
            index
        }
    }

    /// Reassembles the source text from all tokens
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Borrowed view of one root statement of a [`Script`]
#[derive(Clone, Copy)]
pub struct Statement<'a> {
    script: &'a Script,
    group:  GroupId,
    index:  usize
}

impl<'a> Statement<'a> {
    /// Zero-based position of the statement in the script
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn script(&self) -> &'a Script {
        self.script
    }

    pub fn group(&self) -> &'a Group {
        &self.script.groups[self.group]
    }

    /// Leaf tokens of the statement in document order
    pub fn tokens(&self) -> &'a [Token] {
        &self.script.tokens[self.group().tokens.clone()]
    }

    /// Direct children: tokens and parenthesized groups
    pub fn children(&self) -> &'a [Node] {
        &self.group().children
    }

    pub fn significant_tokens(&self) -> impl Iterator<Item = &'a Token> + use<'a> {
        self.tokens().iter().filter(|t| t.is_significant())
    }

    pub fn first_significant_token(&self) -> Option<&'a Token> {
        self.significant_tokens().next()
    }

    /// Returns `true` if `token` sits outside any parenthesized span
    pub fn is_top_level(&self, token: &Token) -> bool {
        token.group == self.group
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.group().tokens.contains(&token.index)
    }

    /// Source text of the statement
    pub fn text(&self) -> String {
        self.tokens().iter().map(|t| t.text.as_str()).collect()
    }

    /// First `max_chars` characters of the source text
    pub fn truncated_text(&self, max_chars: usize) -> String {
        self.tokens()
            .iter()
            .flat_map(|t| t.text.chars())
            .take(max_chars)
            .collect()
    }
}

impl PartialEq for Statement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.script, other.script) && self.group == other.group
    }
}

impl Eq for Statement<'_> {}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("index", &self.index)
            .field("text", &self.text())
            .finish()
    }
}
