//! `DEFAULT` value recognition.
//!
//! A default is a single literal, a signed numeric literal, one of the
//! keyword values, or a parenthesized expression. Anything else, `1+2`
//! without parentheses included, is rejected.

use alloc::boxed::Box;
use alloc::string::String;

use super::expr_parser::{ExpressionParser, Level, TokenQueue, is_subquery_start, unexpected};
use super::expression::Expression;
use super::format::{FormatSql, render_tokens};
use super::lexer::tokenize;
use super::token::{Token, TokenKind, is_keyword};
use crate::errors::ExpressionError;
use crate::schema::DefaultValue;

/// Keywords accepted as bare default values.
const CONSTANTS: [&str; 3] = ["NULL", "TRUE", "FALSE"];

/// Keywords evaluated when a row is inserted.
const TIME_KEYWORDS: [&str; 3] = ["CURRENT_TIME", "CURRENT_DATE", "CURRENT_TIMESTAMP"];

/// Whether `text` is a valid `DEFAULT` value.
#[must_use]
pub fn is_valid_default(text: &str) -> bool {
    DefaultValue::parse(text).is_some()
}

impl DefaultValue {
    /// Parse a free-standing default value, as entered by a user.
    ///
    /// Returns `None` unless all of `text` is exactly one default value.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens: TokenQueue = tokenize(text).into();
        let verdict = read_default(&mut tokens).and_then(|value| match tokens.pop_front() {
            None => Ok(value),
            Some(extra) => Err(ExpressionError::UnexpectedToken { token: extra.text }),
        });
        match verdict {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::trace!(target: "sqlite_ddl::default", input = text, %error, "rejected default");
                None
            }
        }
    }
}

/// Consume one default value from a catalog statement.
///
/// SQLite also stores `DEFAULT abc` and `DEFAULT "abc"`, reading the name as
/// a string. Those are kept as written; everything else goes through
/// [`read_default`].
pub(crate) fn read_catalog_default(tokens: &mut TokenQueue) -> Result<DefaultValue, ExpressionError> {
    match tokens.pop_front() {
        Some(token) if is_name_default(&token) => Ok(DefaultValue {
            text: render_tokens(core::slice::from_ref(&token)),
            is_expression: false,
            is_quoted: false,
        }),
        Some(token) => {
            tokens.push_front(token);
            read_default(tokens)
        }
        None => Err(ExpressionError::UnexpectedEnd),
    }
}

fn is_name_default(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier => {
            let constant = CONSTANTS.iter().chain(&TIME_KEYWORDS).any(|k| token.is_keyword(k));
            !constant && !is_keyword(&token.text)
        }
        kind => kind.is_quoted_identifier() || token.is_operator_name(),
    }
}

/// Consume one default value from the front of `tokens`.
pub(crate) fn read_default(tokens: &mut TokenQueue) -> Result<DefaultValue, ExpressionError> {
    let token = tokens.pop_front().ok_or(ExpressionError::UnexpectedEnd)?;
    let literal = |text: String, is_expression: bool| DefaultValue {
        text,
        is_expression,
        is_quoted: false,
    };

    match token.kind {
        TokenKind::StringLiteral => Ok(DefaultValue {
            text: token.text,
            is_expression: false,
            is_quoted: true,
        }),
        TokenKind::Numeric | TokenKind::BlobLiteral => {
            Ok(literal(render_tokens(core::slice::from_ref(&token)), false))
        }
        TokenKind::Identifier if CONSTANTS.iter().any(|k| token.is_keyword(k)) => {
            Ok(literal(token.text, false))
        }
        TokenKind::Identifier if TIME_KEYWORDS.iter().any(|k| token.is_keyword(k)) => {
            Ok(literal(token.text, true))
        }
        TokenKind::Sign => match tokens.pop_front() {
            Some(number) if number.kind == TokenKind::Numeric => {
                Ok(literal(render_tokens(&[token, number]), false))
            }
            Some(other) => Err(unexpected(other)),
            None => Err(ExpressionError::UnexpectedEnd),
        },
        TokenKind::OpenParen => {
            if tokens.front().is_some_and(is_subquery_start) {
                return Err(ExpressionError::Subquery);
            }
            let inner = ExpressionParser::new(tokens).parse(Level::Nested, &[])?;
            match tokens.pop_front() {
                Some(close) if close.kind == TokenKind::CloseParen => {}
                Some(other) => return Err(unexpected(other)),
                None => return Err(ExpressionError::UnexpectedEnd),
            }
            let text = Expression::Parenthesized(Box::new(inner)).format_sql();
            Ok(literal(text, true))
        }
        _ => Err(unexpected(token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_defaults() {
        for text in [
            "5",
            "'abc'",
            "-5",
            "+1.5e3",
            "(1+2)",
            "( 1 + 2 )",
            "X'00FF'",
            "NULL",
            "true",
            "CURRENT_TIMESTAMP",
            "(datetime('now'))",
            "0x1F",
        ] {
            assert!(is_valid_default(text), "{text}");
        }
    }

    #[test]
    fn test_invalid_defaults() {
        for text in [
            "",
            "1+2",
            "abc",
            "'a' 'b'",
            "- 'a'",
            "-",
            "(SELECT 1)",
            "((SELECT 1))",
            "(1",
            "()",
            "(1, 2)",
            "x'1g'",
            "'unterminated",
            "\"quoted\"",
            "5 5",
        ] {
            assert!(!is_valid_default(text), "{text}");
        }
    }

    #[test]
    fn test_default_flags() {
        let quoted = DefaultValue::parse("'it''s'").unwrap();
        assert_eq!(quoted.text, "it's");
        assert!(quoted.is_quoted);
        assert!(!quoted.is_expression);

        let signed = DefaultValue::parse("- 5").unwrap();
        assert_eq!(signed.text, "-5");
        assert!(!signed.is_quoted);

        let expression = DefaultValue::parse("(1 + 2)").unwrap();
        assert_eq!(expression.text, "(1+2)");
        assert!(expression.is_expression);

        assert!(DefaultValue::parse("current_date").unwrap().is_expression);
        assert!(!DefaultValue::parse("NULL").unwrap().is_expression);
    }

    #[test]
    fn test_catalog_defaults_accept_names() {
        for (text, kept) in [
            ("\"abc\"", "\"abc\""),
            ("abc", "abc"),
            ("[a b]", "[a b]"),
            ("desc", "desc"),
            ("'abc'", "abc"),
            ("NULL", "NULL"),
            ("TRUE", "TRUE"),
        ] {
            let mut tokens: TokenQueue = tokenize(text).into();
            let value = read_catalog_default(&mut tokens).unwrap();
            assert_eq!(value.text, kept, "{text}");
            assert!(!value.is_expression, "{text}");
            assert!(tokens.is_empty(), "{text}");
        }

        let mut tokens: TokenQueue = tokenize("CURRENT_DATE").into();
        assert!(read_catalog_default(&mut tokens).unwrap().is_expression);

        let mut tokens: TokenQueue = tokenize("PRIMARY KEY").into();
        assert!(read_catalog_default(&mut tokens).is_err());
    }

    #[test]
    fn test_read_default_leaves_following_tokens() {
        let mut tokens: TokenQueue = tokenize("'x' NOT NULL").into();
        let value = read_default(&mut tokens).unwrap();
        assert_eq!(value.text, "x");
        assert_eq!(tokens.len(), 2);
    }
}
