//! SQL lexer for tokenizing input.
//!
//! The lexer never fails: unterminated quotes, malformed numbers and stray
//! characters come out as [`TokenKind::Invalid`] tokens and lexing carries on
//! after them. Whitespace and both comment forms are skipped.

use alloc::string::String;
use alloc::vec::Vec;

use super::token::{Token, TokenKind, classify_word};

/// Tokenize `input` completely.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

/// SQL lexer that produces tokens from input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// Skip whitespace and comments.
    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'-' && self.peek_byte(1) == Some(b'-') {
                // Line comment
                self.pos += 2;
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && self.peek_byte(1) == Some(b'*') {
                // Block comment, possibly unterminated
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let start = self.pos;
        let b = self.peek_byte(0)?;

        let (kind, width) = match b {
            b'(' => (TokenKind::OpenParen, 1),
            b')' => (TokenKind::CloseParen, 1),
            b',' => (TokenKind::Comma, 1),
            b'~' => (TokenKind::SymbolPrefix, 1),
            b'+' => (TokenKind::Sign, 1),
            b'-' => match (self.peek_byte(1), self.peek_byte(2)) {
                (Some(b'>'), Some(b'>')) => (TokenKind::Symbol, 3),
                (Some(b'>'), _) => (TokenKind::Symbol, 2),
                _ => (TokenKind::Sign, 1),
            },
            b'*' | b'/' | b'%' | b'&' => (TokenKind::Symbol, 1),
            b'|' => match self.peek_byte(1) {
                Some(b'|') => (TokenKind::Symbol, 2),
                _ => (TokenKind::Symbol, 1),
            },
            b'<' => match self.peek_byte(1) {
                Some(b'<' | b'>' | b'=') => (TokenKind::Symbol, 2),
                _ => (TokenKind::Symbol, 1),
            },
            b'>' => match self.peek_byte(1) {
                Some(b'>' | b'=') => (TokenKind::Symbol, 2),
                _ => (TokenKind::Symbol, 1),
            },
            b'=' => match self.peek_byte(1) {
                Some(b'=') => (TokenKind::Symbol, 2),
                _ => (TokenKind::Symbol, 1),
            },
            b'!' => match self.peek_byte(1) {
                Some(b'=') => (TokenKind::Symbol, 2),
                _ => (TokenKind::Invalid, 1),
            },
            b'.' if !self.peek_byte(1).is_some_and(|c| c.is_ascii_digit()) => {
                (TokenKind::Symbol, 1)
            }
            b'\'' => return Some(self.read_quoted(b'\'', TokenKind::StringLiteral)),
            b'"' => return Some(self.read_quoted(b'"', TokenKind::QuotedIdentifier)),
            b'`' => return Some(self.read_quoted(b'`', TokenKind::BackQuotedIdentifier)),
            b'[' => return Some(self.read_square()),
            b'X' | b'x' if self.peek_byte(1) == Some(b'\'') => return Some(self.read_blob()),
            b'.' | b'0'..=b'9' => return Some(self.read_number()),
            _ if is_ident_start(b) => return Some(self.read_identifier()),
            _ => (TokenKind::Invalid, 1),
        };

        self.pos += width;
        Some(self.finish(kind, start))
    }

    /// Build a token spelled by the input consumed since `start`.
    fn finish(&self, kind: TokenKind, start: usize) -> Token {
        let text = &self.input[start..self.pos];
        if kind == TokenKind::Invalid {
            tracing::trace!(target: "sqlite_ddl::lexer", token = text, "invalid token");
        }
        Token::new(kind, text)
    }

    /// Consume the rest of the input as one invalid token.
    fn invalid_to_end(&mut self, start: usize) -> Token {
        self.pos = self.input.len();
        self.finish(TokenKind::Invalid, start)
    }

    /// Read a `'...'`, `"..."` or `` `...` `` form; a doubled quote stands for itself.
    fn read_quoted(&mut self, quote: u8, kind: TokenKind) -> Token {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        self.pos += 1;

        let mut value = String::new();
        let mut segment = self.pos;
        while self.pos < bytes.len() {
            if bytes[self.pos] != quote {
                self.pos += 1;
                continue;
            }
            value.push_str(&self.input[segment..self.pos]);
            if self.peek_byte(1) == Some(quote) {
                value.push(char::from(quote));
                self.pos += 2;
                segment = self.pos;
            } else {
                self.pos += 1;
                return Token::new(kind, value);
            }
        }

        self.invalid_to_end(start)
    }

    /// Read a `[...]` identifier, terminated by the first `]`.
    fn read_square(&mut self) -> Token {
        let start = self.pos;
        match self.input[start + 1..].find(']') {
            Some(len) => {
                self.pos = start + 1 + len + 1;
                Token::new(
                    TokenKind::SquareIdentifier,
                    &self.input[start + 1..start + 1 + len],
                )
            }
            None => self.invalid_to_end(start),
        }
    }

    fn read_blob(&mut self) -> Token {
        let start = self.pos;
        self.pos += 2; // Skip X'

        let Some(len) = self.input[self.pos..].find('\'') else {
            return self.invalid_to_end(start);
        };
        let hex = &self.input[self.pos..self.pos + len];
        self.pos += len + 1;

        if hex.len() % 2 == 0 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Token::new(TokenKind::BlobLiteral, hex)
        } else {
            self.finish(TokenKind::Invalid, start)
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        let bytes = self.input.as_bytes();

        if bytes[self.pos] == b'0' && matches!(self.peek_byte(1), Some(b'x' | b'X')) {
            self.pos += 2;
            let digits = self.skip_while(|b| b.is_ascii_hexdigit());
            if digits == 0 || self.at_number_junk() {
                return self.malformed_number(start);
            }
            return self.finish(TokenKind::Numeric, start);
        }

        let mut seen_dot = false;
        let mut seen_exponent = false;
        self.skip_while(|b| b.is_ascii_digit());
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'.' => {
                    if seen_dot || seen_exponent {
                        return self.malformed_number(start);
                    }
                    seen_dot = true;
                    self.pos += 1;
                    self.skip_while(|b| b.is_ascii_digit());
                }
                b'e' | b'E' => {
                    if seen_exponent {
                        return self.malformed_number(start);
                    }
                    seen_exponent = true;
                    self.pos += 1;
                    if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                    if self.skip_while(|b| b.is_ascii_digit()) == 0 {
                        return self.malformed_number(start);
                    }
                }
                _ if is_ident_cont(b) => return self.malformed_number(start),
                _ => break,
            }
        }

        self.finish(TokenKind::Numeric, start)
    }

    fn at_number_junk(&self) -> bool {
        self.peek_byte(0)
            .is_some_and(|b| b == b'.' || is_ident_cont(b))
    }

    /// Swallow the rest of a malformed number so lexing resumes after it.
    fn malformed_number(&mut self, start: usize) -> Token {
        self.skip_while(|b| b == b'.' || is_ident_cont(b));
        self.finish(TokenKind::Invalid, start)
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        self.skip_while(is_ident_cont);
        let word = &self.input[start..self.pos];
        Token::new(classify_word(word), word)
    }

    /// Advance while `predicate` holds, returning how many bytes were skipped.
    fn skip_while(&mut self, predicate: impl Fn(u8) -> bool) -> usize {
        let from = self.pos;
        while self.peek_byte(0).is_some_and(&predicate) {
            self.pos += 1;
        }
        self.pos - from
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Check if a byte can start an identifier.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Check if a byte can continue an identifier.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}
