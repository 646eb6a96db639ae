//! SQL Tokenizer implementation.

use super::{is_builtin_type, Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
///
/// Unlike a parser front end, the lexer keeps whitespace and comments as
/// [`TokenKind::Whitespace`] tokens so the token tree can reproduce the
/// literal text of any group.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// Whether the previous significant token leaves room for an operand,
    /// so that a `-` or `+` before a digit is a sign rather than an operator.
    operand_expected: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            operand_expected: true,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // -- line comment
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // /* block comment */
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a token spanning from start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            &self.input[self.start..self.pos],
            Span::new(self.start, self.pos),
        )
    }

    /// Creates an error token spanning from start to the current position.
    fn make_error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    /// Scans an identifier, keyword or builtin type name.
    fn scan_word(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        let called = self.peek() == Some('(');

        match Keyword::from_str(text) {
            Some(Keyword::Not) => {
                if self.scan_null_suffix() {
                    self.make_token(TokenKind::Keyword(Keyword::NotNull))
                } else {
                    self.make_token(TokenKind::Keyword(Keyword::Not))
                }
            }
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            // `varchar(255)` is a call to a parameterized type, not a builtin.
            None if is_builtin_type(text) && !called => self.make_token(TokenKind::Builtin),
            None => self.make_token(TokenKind::Name),
        }
    }

    /// After `NOT`, consumes `<whitespace>NULL` if it follows.
    fn scan_null_suffix(&mut self) -> bool {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        let gap = rest.len() - trimmed.len();
        if gap == 0 {
            return false;
        }

        let is_null = trimmed
            .get(..4)
            .is_some_and(|word| word.eq_ignore_ascii_case("NULL"))
            && !trimmed[4..].starts_with(|c: char| c.is_alphanumeric() || c == '_');

        if is_null {
            self.pos += gap + 4;
            true
        } else {
            false
        }
    }

    /// Scans a quoted identifier (e.g., "column name" or `column name`).
    fn scan_quoted_identifier(&mut self, quote: char) -> Token {
        self.advance(); // opening quote

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.peek_next() == Some(quote) {
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {
                    self.advance();
                }
                None => return self.make_error("Unterminated quoted identifier"),
            }
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::Name)
    }

    /// Scans a number (integer or decimal, optional exponent).
    fn scan_number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> Token {
        self.advance(); // opening quote

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {
                    self.advance();
                }
                None => return self.make_error("Unterminated string literal"),
            }
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::String)
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        if !token.is_whitespace() {
            self.operand_expected = match token.kind {
                TokenKind::Operator | TokenKind::Keyword(_) => true,
                TokenKind::Punctuation => token.text == "(" || token.text == ",",
                _ => false,
            };
        }
        token
    }

    fn scan_token(&mut self) -> Token {
        self.start = self.pos;
        self.skip_whitespace_and_comments();
        if self.pos > self.start {
            return self.make_token(TokenKind::Whitespace);
        }

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' | ')' | ',' | ';' | '.' | '[' | ']' | ':' | '?' | '@' => {
                self.make_token(TokenKind::Punctuation)
            }
            '*' => self.make_token(TokenKind::Wildcard),
            // `-1` after `=`, `(`, `,` or a keyword is a signed number.
            '+' | '-'
                if self.operand_expected && self.peek().is_some_and(|c| c.is_ascii_digit()) =>
            {
                self.scan_number()
            }
            '+' | '-' | '/' | '%' | '=' => self.make_token(TokenKind::Operator),
            '<' => {
                if matches!(self.peek(), Some('=' | '>')) {
                    self.advance();
                }
                self.make_token(TokenKind::Operator)
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                }
                self.make_token(TokenKind::Operator)
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::Operator)
                } else {
                    self.make_error("Unexpected character: !")
                }
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                self.make_token(TokenKind::Operator)
            }

            '\'' => {
                self.pos = self.start;
                self.scan_string()
            }
            '"' | '`' => {
                self.pos = self.start;
                self.scan_quoted_identifier(c)
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }
            c if c.is_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_word()
            }

            _ => self.make_error(format!("Unexpected character: {c}")),
        }
    }

    /// Tokenizes the entire input; the last token is always `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    /// Kinds of all non-whitespace tokens, `Eof` excluded.
    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.is_whitespace() && t.kind != TokenKind::Eof)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_whitespace_is_a_token() {
        let tokens = tokenize("  \n\t ");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Whitespace);
        assert_eq!(tokens[0].text, "  \n\t ");
    }

    #[test]
    fn test_comments_fold_into_whitespace() {
        assert_eq!(
            kinds("DROP -- gone\nTABLE /* really */ Persons"),
            vec![
                TokenKind::Keyword(Keyword::Drop),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("create Database testDB"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Database),
                TokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_not_null_is_one_keyword() {
        let tokens: Vec<Token> = tokenize("Age int NOT  NULL;")
            .into_iter()
            .filter(|t| t.is_keyword())
            .collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].as_keyword(), Some(Keyword::NotNull));
        assert_eq!(tokens[0].text, "NOT  NULL");
    }

    #[test]
    fn test_not_without_null() {
        assert_eq!(
            kinds("NOT NULLABLE"),
            vec![TokenKind::Keyword(Keyword::Not), TokenKind::Name]
        );
        assert_eq!(
            kinds("NOT EXISTS"),
            vec![
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Keyword(Keyword::Exists),
            ]
        );
    }

    #[test]
    fn test_builtin_versus_parameterized_type() {
        assert_eq!(
            kinds("PersonID int, LastName varchar(255)"),
            vec![
                TokenKind::Name,
                TokenKind::Builtin,
                TokenKind::Punctuation,
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::Punctuation,
                TokenKind::Number,
                TokenKind::Punctuation,
            ]
        );
    }

    #[test]
    fn test_keyword_before_parenthesis_stays_keyword() {
        assert_eq!(
            kinds("UNIQUE(ID)"),
            vec![
                TokenKind::Keyword(Keyword::Unique),
                TokenKind::Punctuation,
                TokenKind::Name,
                TokenKind::Punctuation,
            ]
        );
    }

    #[test]
    fn test_strings_keep_quotes_in_text() {
        let tokens = tokenize("'it''s'");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "'it''s'");
        assert_eq!(tokens[0].value(), "it's");
    }

    #[test]
    fn test_quoted_identifiers() {
        let tokens = tokenize("\"Last Name\" `City`");
        assert_eq!(tokens[0].kind, TokenKind::Name);
        assert_eq!(tokens[0].value(), "Last Name");
        assert_eq!(tokens[2].kind, TokenKind::Name);
        assert_eq!(tokens[2].value(), "City");
    }

    #[test]
    fn test_numbers() {
        let texts: Vec<String> = tokenize("42 3.14 1e10 2.5e-3")
            .into_iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["42", "3.14", "1e10", "2.5e-3"]);
    }

    #[test]
    fn test_operators() {
        let texts: Vec<String> = tokenize("= != <> < <= > >= + - / % ||")
            .into_iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text)
            .collect();
        assert_eq!(
            texts,
            vec!["=", "!=", "<>", "<", "<=", ">", ">=", "+", "-", "/", "%", "||"]
        );
    }

    #[test]
    fn test_signed_numbers() {
        let numbers = |input: &str| -> Vec<String> {
            tokenize(input)
                .into_iter()
                .filter(|t| t.kind == TokenKind::Number)
                .map(|t| t.text)
                .collect()
        };
        assert_eq!(numbers("SET Age = -1"), vec!["-1"]);
        assert_eq!(numbers("VALUES (-5, +2.5)"), vec!["-5", "+2.5"]);
        assert_eq!(numbers("DEFAULT -1"), vec!["-1"]);
        assert_eq!(numbers("-3"), vec!["-3"]);
    }

    #[test]
    fn test_minus_after_operand_is_an_operator() {
        assert_eq!(
            kinds("Age -1"),
            vec![TokenKind::Name, TokenKind::Operator, TokenKind::Number]
        );
        assert_eq!(
            kinds("(2) - 1"),
            vec![
                TokenKind::Punctuation,
                TokenKind::Number,
                TokenKind::Punctuation,
                TokenKind::Operator,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(
            kinds("SELECT *"),
            vec![TokenKind::Keyword(Keyword::Select), TokenKind::Wildcard]
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(tokenize("'open")[0].kind, TokenKind::Error(_)));
        assert!(matches!(tokenize("\"open")[0].kind, TokenKind::Error(_)));
        assert!(matches!(tokenize("#")[0].kind, TokenKind::Error(_)));
        assert!(matches!(tokenize("!")[0].kind, TokenKind::Error(_)));
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("DROP TABLE");
        assert_eq!(tokens[0].span, Span::new(0, 4));
        assert_eq!(tokens[1].span, Span::new(4, 5));
        assert_eq!(tokens[2].span, Span::new(5, 10));
    }
}
