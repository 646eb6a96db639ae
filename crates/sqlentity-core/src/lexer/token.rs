//! Token types for the SQL lexer.

use std::borrow::Cow;

use super::Span;

/// SQL keywords recognized by the lexer.
///
/// Anything not listed here lexes as a name (or as a builtin type name, see
/// [`is_builtin_type`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Data Definition Language (DDL)
    Create,
    Alter,
    Drop,
    Table,
    Database,
    Schema,
    Index,
    View,
    Add,
    Modify,
    Column,
    Rename,
    To,
    If,
    Exists,
    Cascade,

    // Constraints
    Constraint,
    Primary,
    Key,
    Unique,
    /// `NOT NULL`, lexed as a single token.
    NotNull,
    Default,
    Check,
    Foreign,
    References,
    Autoincrement,

    // Data Manipulation Language (DML)
    Select,
    Distinct,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,

    // Clauses that end a WHERE
    Order,
    Group,
    By,
    Having,
    Limit,

    // Logical operators and predicates
    And,
    Or,
    Not,
    Like,
    In,
    Is,
    Between,
    Null,
    True,
    False,
    As,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "ALTER" => Some(Self::Alter),
            "DROP" => Some(Self::Drop),
            "TABLE" => Some(Self::Table),
            "DATABASE" => Some(Self::Database),
            "SCHEMA" => Some(Self::Schema),
            "INDEX" => Some(Self::Index),
            "VIEW" => Some(Self::View),
            "ADD" => Some(Self::Add),
            "MODIFY" => Some(Self::Modify),
            "COLUMN" => Some(Self::Column),
            "RENAME" => Some(Self::Rename),
            "TO" => Some(Self::To),
            "IF" => Some(Self::If),
            "EXISTS" => Some(Self::Exists),
            "CASCADE" => Some(Self::Cascade),
            "CONSTRAINT" => Some(Self::Constraint),
            "PRIMARY" => Some(Self::Primary),
            "KEY" => Some(Self::Key),
            "UNIQUE" => Some(Self::Unique),
            "DEFAULT" => Some(Self::Default),
            "CHECK" => Some(Self::Check),
            "FOREIGN" => Some(Self::Foreign),
            "REFERENCES" => Some(Self::References),
            "AUTOINCREMENT" | "AUTO_INCREMENT" => Some(Self::Autoincrement),
            "SELECT" => Some(Self::Select),
            "DISTINCT" => Some(Self::Distinct),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "ORDER" => Some(Self::Order),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "LIMIT" => Some(Self::Limit),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "LIKE" => Some(Self::Like),
            "IN" => Some(Self::In),
            "IS" => Some(Self::Is),
            "BETWEEN" => Some(Self::Between),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "AS" => Some(Self::As),
            _ => None,
        }
    }

    /// Returns the normalized (uppercase) spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Table => "TABLE",
            Self::Database => "DATABASE",
            Self::Schema => "SCHEMA",
            Self::Index => "INDEX",
            Self::View => "VIEW",
            Self::Add => "ADD",
            Self::Modify => "MODIFY",
            Self::Column => "COLUMN",
            Self::Rename => "RENAME",
            Self::To => "TO",
            Self::If => "IF",
            Self::Exists => "EXISTS",
            Self::Cascade => "CASCADE",
            Self::Constraint => "CONSTRAINT",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Unique => "UNIQUE",
            Self::NotNull => "NOT NULL",
            Self::Default => "DEFAULT",
            Self::Check => "CHECK",
            Self::Foreign => "FOREIGN",
            Self::References => "REFERENCES",
            Self::Autoincrement => "AUTOINCREMENT",
            Self::Select => "SELECT",
            Self::Distinct => "DISTINCT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Order => "ORDER",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Is => "IS",
            Self::Between => "BETWEEN",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::As => "AS",
        }
    }
}

/// Returns true if `word` names a builtin column type (case-insensitive).
///
/// Parameterized spellings such as `varchar(255)` are not lexed as builtins;
/// the lexer turns them into a name followed by a parenthesis.
#[must_use]
pub fn is_builtin_type(word: &str) -> bool {
    matches!(
        word.to_ascii_uppercase().as_str(),
        "INT"
            | "INTEGER"
            | "TINYINT"
            | "SMALLINT"
            | "MEDIUMINT"
            | "BIGINT"
            | "REAL"
            | "DOUBLE"
            | "FLOAT"
            | "DECIMAL"
            | "NUMERIC"
            | "BIT"
            | "BOOL"
            | "BOOLEAN"
            | "CHAR"
            | "NCHAR"
            | "VARCHAR"
            | "NVARCHAR"
            | "TEXT"
            | "BLOB"
            | "BINARY"
            | "VARBINARY"
            | "DATE"
            | "TIME"
            | "DATETIME"
            | "TIMESTAMP"
            | "YEAR"
            | "JSON"
            | "UUID"
    )
}

/// The lexical category of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// SQL keyword.
    Keyword(Keyword),
    /// Identifier, quoted or bare.
    Name,
    /// Builtin type name such as `int` or `date`.
    Builtin,
    /// String literal, quotes included in the token text.
    String,
    /// Integer or decimal literal.
    Number,
    /// Comparison or arithmetic operator.
    Operator,
    /// `*`
    Wildcard,
    /// `(`, `)`, `,`, `;`, `.` and friends.
    Punctuation,
    /// Whitespace and comments.
    Whitespace,
    /// End of input.
    Eof,
    /// Invalid/unknown token.
    Error(String),
}

/// A token with its literal text and span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The literal source text.
    pub text: String,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns true if this is a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(_))
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is whitespace (or a comment).
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace)
    }

    /// Returns true if this is a string or numeric literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::Number)
    }

    /// Returns true if this is the punctuation token `symbol`.
    #[must_use]
    pub fn is_punctuation(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == symbol
    }

    /// Returns the normalized form of the token.
    ///
    /// Keywords normalize to their uppercase spelling (multi-word keywords
    /// with a single space); every other token normalizes to its text.
    #[must_use]
    pub fn normalized(&self) -> Cow<'_, str> {
        match &self.kind {
            TokenKind::Keyword(kw) => Cow::Borrowed(kw.as_str()),
            _ => Cow::Borrowed(&self.text),
        }
    }

    /// Returns the value the token denotes: string literals and quoted
    /// identifiers lose their quotes, everything else is its text.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        match self.kind {
            TokenKind::String => unquote(&self.text, '\''),
            TokenKind::Name => match self.text.chars().next() {
                Some(quote @ ('"' | '`')) => unquote(&self.text, quote),
                _ => Cow::Borrowed(&self.text),
            },
            _ => Cow::Borrowed(&self.text),
        }
    }
}

/// Strips the surrounding `quote` characters and collapses doubled quotes.
fn unquote(text: &str, quote: char) -> Cow<'_, str> {
    let inner = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(text);
    let doubled: String = [quote, quote].iter().collect();
    if inner.contains(&doubled) {
        Cow::Owned(inner.replace(&doubled, &quote.to_string()))
    } else {
        Cow::Borrowed(inner)
    }
}
