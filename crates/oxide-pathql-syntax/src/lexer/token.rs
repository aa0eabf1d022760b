//! Tokens produced by the [`Lexer`](super::Lexer).

use std::fmt;

use super::Span;

/// Reserved words of the SELECT grammar.
///
/// Type and function names (`DATE`, `COUNT`, `TEXT`) are not reserved. They
/// lex as identifiers so they stay usable as column names and path
/// segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    Distinct,
    All,
    As,
    From,
    Where,
    Group,
    Having,
    Order,
    By,
    Limit,
    Offset,

    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Using,

    And,
    Or,
    Not,
    Is,
    In,
    Between,
    Like,
    Exists,
    Null,
    True,
    False,

    Asc,
    Desc,
    Nulls,
    First,
    Last,

    Case,
    When,
    Then,
    Else,
    End,
    Cast,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("SELECT", Keyword::Select),
    ("DISTINCT", Keyword::Distinct),
    ("ALL", Keyword::All),
    ("AS", Keyword::As),
    ("FROM", Keyword::From),
    ("WHERE", Keyword::Where),
    ("GROUP", Keyword::Group),
    ("HAVING", Keyword::Having),
    ("ORDER", Keyword::Order),
    ("BY", Keyword::By),
    ("LIMIT", Keyword::Limit),
    ("OFFSET", Keyword::Offset),
    ("JOIN", Keyword::Join),
    ("INNER", Keyword::Inner),
    ("LEFT", Keyword::Left),
    ("RIGHT", Keyword::Right),
    ("FULL", Keyword::Full),
    ("OUTER", Keyword::Outer),
    ("CROSS", Keyword::Cross),
    ("ON", Keyword::On),
    ("USING", Keyword::Using),
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("NOT", Keyword::Not),
    ("IS", Keyword::Is),
    ("IN", Keyword::In),
    ("BETWEEN", Keyword::Between),
    ("LIKE", Keyword::Like),
    ("EXISTS", Keyword::Exists),
    ("NULL", Keyword::Null),
    ("TRUE", Keyword::True),
    ("FALSE", Keyword::False),
    ("ASC", Keyword::Asc),
    ("DESC", Keyword::Desc),
    ("NULLS", Keyword::Nulls),
    ("FIRST", Keyword::First),
    ("LAST", Keyword::Last),
    ("CASE", Keyword::Case),
    ("WHEN", Keyword::When),
    ("THEN", Keyword::Then),
    ("ELSE", Keyword::Else),
    ("END", Keyword::End),
    ("CAST", Keyword::Cast),
];

impl Keyword {
    /// Looks a word up, ignoring case.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|&(_, keyword)| keyword)
    }

    /// The keyword in upper case.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|&&(_, keyword)| keyword == self)
            .map_or("", |&(text, _)| text)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a token is.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare or quoted name. Path markers are part of the text, as in
    /// `\?country`.
    Identifier(String),
    Keyword(Keyword),

    Integer(i64),
    Float(f64),
    /// A single-quoted string, unescaped.
    String(String),
    /// `?` anywhere but at the start of a path segment: a positional
    /// parameter.
    Question,
    /// `:` introducing a named parameter.
    Colon,

    Dot,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `||`
    Concat,
    Eq,
    /// `!=` or `<>`
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitNot,
    LeftShift,
    RightShift,

    Eof,
    /// Text the lexer could not read, with the reason.
    Error(String),
}

impl TokenKind {
    const fn symbol(&self) -> Option<&'static str> {
        Some(match self {
            Self::Question => "?",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Concat => "||",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitNot => "~",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "'{symbol}'");
        }
        match self {
            Self::Identifier(name) => write!(f, "identifier {name}"),
            Self::Keyword(keyword) => write!(f, "{keyword}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "string '{s}'"),
            Self::Eof => f.write_str("end of input"),
            Self::Error(reason) => f.write_str(reason),
            _ => Ok(()),
        }
    }
}

/// A token and where it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this is the end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
