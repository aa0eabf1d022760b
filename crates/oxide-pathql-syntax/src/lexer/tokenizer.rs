//! Turns query text into tokens.

use super::{Keyword, Span, Token, TokenKind};

/// Prefix of a path segment that follows a foreign key backwards.
pub const REVERSE_MARKER: char = '\\';
/// Prefix of a path segment whose join is a LEFT JOIN.
pub const NULLABLE_MARKER: char = '?';

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Reads tokens from a query on demand.
///
/// A path segment keeps its markers in the identifier text: `goods.\good`
/// lexes as `goods`, `.`, `\good`. A `?` is a segment marker only right
/// after a `.` and before a name; anywhere else it is a parameter.
///
/// Iterating yields every token before the end of input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    /// Offset of the next unread character.
    pos: usize,
    /// Offset where the token being read starts.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// The query text under `span`.
    #[must_use]
    pub fn slice(&self, span: Span) -> &'a str {
        &self.input[span.range()]
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn text(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `expected` if it comes next.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, accept: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&accept) {
            self.bump();
        }
    }

    fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, reason: &str) -> Token {
        self.token(TokenKind::Error(String::from(reason)))
    }

    /// Skips whitespace, `-- line` comments and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.rest().starts_with("--") {
                self.eat_while(|c| c != '\n');
            } else if let Some(body) = self.rest().strip_prefix("/*") {
                self.pos = body
                    .find("*/")
                    .map_or(self.input.len(), |end| self.pos + 2 + end + 2);
            } else {
                return;
            }
        }
    }

    /// Whether the token being read directly follows a `.`.
    fn at_segment(&self) -> bool {
        self.input[..self.start].ends_with('.')
    }

    /// Reads the next token. Past the end it keeps returning `Eof`.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;

        let Some(c) = self.bump() else {
            return self.token(TokenKind::Eof);
        };
        let kind = match c {
            REVERSE_MARKER => return self.marked_segment(c),
            NULLABLE_MARKER if self.at_segment() && self.peek().is_some_and(is_word_start) => {
                return self.marked_segment(c)
            }
            NULLABLE_MARKER => TokenKind::Question,
            '\'' => return self.string(),
            '"' | '`' => return self.quoted_identifier(c),
            c if c.is_ascii_digit() => return self.number(),
            c if is_word_start(c) => return self.word(),

            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '~' => TokenKind::BitNot,
            '&' => TokenKind::BitAnd,
            '=' => TokenKind::Eq,
            '|' if self.eat('|') => TokenKind::Concat,
            '|' => TokenKind::BitOr,
            '!' if self.eat('=') => TokenKind::NotEq,
            '<' if self.eat('=') => TokenKind::LtEq,
            '<' if self.eat('>') => TokenKind::NotEq,
            '<' if self.eat('<') => TokenKind::LeftShift,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::GtEq,
            '>' if self.eat('>') => TokenKind::RightShift,
            '>' => TokenKind::Gt,
            other => TokenKind::Error(format!("Unexpected character: {other}")),
        };
        self.token(kind)
    }

    /// A bare word: keyword or identifier.
    fn word(&mut self) -> Token {
        self.eat_while(is_word_char);
        let text = self.text();
        let kind = Keyword::lookup(text)
            .map_or_else(|| TokenKind::Identifier(String::from(text)), TokenKind::Keyword);
        self.token(kind)
    }

    /// The rest of a segment that starts with `marker`: `\seller`,
    /// `\?country` or `?parent_1`. Never a keyword.
    fn marked_segment(&mut self, marker: char) -> Token {
        if marker == REVERSE_MARKER {
            self.eat(NULLABLE_MARKER);
        }
        if !self.peek().is_some_and(is_word_start) {
            return self.error("Expected identifier after path marker");
        }
        self.eat_while(is_word_char);
        self.token(TokenKind::Identifier(String::from(self.text())))
    }

    /// Reads up to the closing `quote`, where a doubled quote stands for
    /// itself. `None` if the input ends first.
    fn quoted(&mut self, quote: char) -> Option<String> {
        let mut value = String::new();
        loop {
            let c = self.bump()?;
            if c == quote && !self.eat(quote) {
                return Some(value);
            }
            value.push(c);
        }
    }

    fn string(&mut self) -> Token {
        match self.quoted('\'') {
            Some(value) => self.token(TokenKind::String(value)),
            None => self.error("Unterminated string literal"),
        }
    }

    /// `"name"` or `` `name` ``. Markers inside the quotes are kept, so
    /// `` `\?address` `` is the same segment as a bare `\?address`.
    fn quoted_identifier(&mut self, quote: char) -> Token {
        match self.quoted(quote) {
            Some(name) => self.token(TokenKind::Identifier(name)),
            None => self.error("Unterminated quoted identifier"),
        }
    }

    fn number(&mut self) -> Token {
        let digits = |c: char| c.is_ascii_digit();
        self.eat_while(digits);
        let mut float = false;
        if self.peek() == Some('.') && self.peek_second().is_some_and(digits) {
            float = true;
            self.bump();
            self.eat_while(digits);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            float = true;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            self.eat_while(digits);
        }

        let text = self.text();
        let kind = if float {
            text.parse().map_or_else(
                |e| TokenKind::Error(format!("Invalid float: {e}")),
                TokenKind::Float,
            )
        } else {
            text.parse().map_or_else(
                |e| TokenKind::Error(format!("Invalid integer: {e}")),
                TokenKind::Integer,
            )
        };
        self.token(kind)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is_eof()).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|token| token.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(String::from(s))
    }

    #[test]
    fn test_empty_input_is_eof() {
        let mut lexer = Lexer::new("   -- nothing");
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn test_forward_path() {
        assert_eq!(
            kinds("users.address.country.code"),
            vec![
                ident("users"),
                TokenKind::Dot,
                ident("address"),
                TokenKind::Dot,
                ident("country"),
                TokenKind::Dot,
                ident("code"),
            ]
        );
    }

    #[test]
    fn test_reverse_marker_segments() {
        assert_eq!(
            kinds("goods.\\good.buyer"),
            vec![
                ident("goods"),
                TokenKind::Dot,
                ident("\\good"),
                TokenKind::Dot,
                ident("buyer"),
            ]
        );
    }

    #[test]
    fn test_combined_markers() {
        assert_eq!(
            kinds("countries.\\?country"),
            vec![ident("countries"), TokenKind::Dot, ident("\\?country")]
        );
    }

    #[test]
    fn test_nullable_marker_only_starts_a_segment() {
        assert_eq!(
            kinds("persons.?parent_1 = ? AND x = ?"),
            vec![
                ident("persons"),
                TokenKind::Dot,
                ident("?parent_1"),
                TokenKind::Eq,
                TokenKind::Question,
                TokenKind::Keyword(Keyword::And),
                ident("x"),
                TokenKind::Eq,
                TokenKind::Question,
            ]
        );
    }

    #[test]
    fn test_marked_segment_is_never_a_keyword() {
        assert_eq!(
            kinds("orders.?order"),
            vec![ident("orders"), TokenKind::Dot, ident("?order")]
        );
        assert_eq!(
            kinds("orders.order"),
            vec![
                ident("orders"),
                TokenKind::Dot,
                TokenKind::Keyword(Keyword::Order)
            ]
        );
    }

    #[test]
    fn test_markers_inside_quotes() {
        assert_eq!(
            kinds("users.`\\?address` \"?parent_1\" \"say \"\"hi\"\"\""),
            vec![
                ident("users"),
                TokenKind::Dot,
                ident("\\?address"),
                ident("?parent_1"),
                ident("say \"hi\""),
            ]
        );
    }

    #[test]
    fn test_dangling_marker_is_an_error() {
        let kinds = kinds("users.\\ ");
        assert!(matches!(&kinds[2], TokenKind::Error(reason) if reason.contains("path marker")));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("SELECT -- users.address\n users /* .\\seller */ .id"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                ident("users"),
                TokenKind::Dot,
                ident("id"),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_the_end() {
        assert_eq!(kinds("SELECT /* never closed").len(), 1);
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("42 2.5 1e3 'it''s'"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(2.5),
                TokenKind::Float(1e3),
                TokenKind::String(String::from("it's")),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            kinds("'abc"),
            vec![TokenKind::Error(String::from("Unterminated string literal"))]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("|| | != <> <= << >= >> ~"),
            vec![
                TokenKind::Concat,
                TokenKind::BitOr,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::LeftShift,
                TokenKind::GtEq,
                TokenKind::RightShift,
                TokenKind::BitNot,
            ]
        );
    }

    #[test]
    fn test_spans_cover_the_marked_segment() {
        let mut lexer = Lexer::new("users.\\seller");
        let _ = lexer.next_token();
        let _ = lexer.next_token();
        let segment = lexer.next_token();
        assert_eq!(segment.span, Span::new(6, 13));
        assert_eq!(lexer.slice(segment.span), "\\seller");
    }
}
