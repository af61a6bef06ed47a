//! Precedence-free expression parser.
//!
//! Operators associate to the right in the order they are read. The parser
//! consumes tokens from the front of a [`TokenQueue`] and fails as soon as a
//! token cannot continue the expression; whatever was built so far is dropped.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::vec::Vec;

use super::expression::Expression;
use super::format::render_tokens;
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::errors::ExpressionError;

/// Token stream consumed front to back by the parsers.
pub type TokenQueue = VecDeque<Token>;

/// Where an expression sits, which decides how it may end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// A whole expression: ends with the input or before a terminator keyword.
    /// May be empty only when a terminator follows immediately.
    Top,
    /// A call's argument list or an index column list: commas separate items,
    /// ends before `)`, may be empty.
    Arguments,
    /// Inside parentheses: ends before `)`, never empty.
    Nested,
    /// A bounded sub-expression ending before a terminator keyword (`CAST`'s
    /// `AS`), never empty.
    Bounded,
}

/// Keywords a `NOT` can combine with into a binary operator.
const NOT_BINARY: [&str; 6] = ["BETWEEN", "LIKE", "GLOB", "MATCH", "REGEXP", "IN"];

/// Parse a complete, free-standing expression.
///
/// # Errors
///
/// Returns an error if `text` is not a single valid expression.
pub fn parse_expression(text: &str) -> Result<Expression, ExpressionError> {
    let mut tokens: TokenQueue = tokenize(text).into();
    ExpressionParser::new(&mut tokens).parse(Level::Top, &[])
}

/// Expression parser over a borrowed token queue.
pub struct ExpressionParser<'q> {
    tokens: &'q mut TokenQueue,
}

impl<'q> ExpressionParser<'q> {
    /// Create a parser consuming from `tokens`.
    #[must_use]
    pub fn new(tokens: &'q mut TokenQueue) -> Self {
        Self { tokens }
    }

    /// Parse one expression at `level`.
    ///
    /// `terminators` are keywords that end a [`Level::Top`] or
    /// [`Level::Bounded`] expression; they are left in the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form an expression at `level`.
    pub fn parse(
        &mut self,
        level: Level,
        terminators: &[&str],
    ) -> Result<Expression, ExpressionError> {
        let allow_empty = matches!(level, Level::Top | Level::Arguments);
        self.expression(level, terminators, allow_empty)
    }

    fn expression(
        &mut self,
        level: Level,
        terminators: &[&str],
        allow_empty: bool,
    ) -> Result<Expression, ExpressionError> {
        match self.operand(level, terminators, allow_empty, false)? {
            Some(operand) => self.continuation(operand, level, terminators),
            None => Ok(Expression::Empty),
        }
    }

    /// Everything after an operand: postfixes, then an end or a binary operator.
    fn continuation(
        &mut self,
        left: Expression,
        level: Level,
        terminators: &[&str],
    ) -> Result<Expression, ExpressionError> {
        let left = self.postfixes(left);

        let Some(next) = self.tokens.front() else {
            return match level {
                Level::Top => Ok(left),
                _ => Err(ExpressionError::UnexpectedEnd),
            };
        };
        let kind = next.kind;
        let at_terminator = is_terminator(next, terminators);

        match kind {
            TokenKind::CloseParen if matches!(level, Level::Arguments | Level::Nested) => Ok(left),
            TokenKind::Comma if level == Level::Arguments => {
                let op = self.pop()?;
                let right = self.expression(level, terminators, false)?;
                Ok(Expression::binary(left, op, right))
            }
            _ if at_terminator && matches!(level, Level::Top | Level::Bounded) => Ok(left),
            _ => {
                let op = self.binary_operator()?;
                let list = op.is_keyword("IN") || op.is_keyword("NOT IN");
                let right = self
                    .operand(level, terminators, false, list)?
                    .ok_or(ExpressionError::UnexpectedEnd)?;
                let right = self.continuation(right, level, terminators)?;
                Ok(Expression::binary(left, op, right))
            }
        }
    }

    /// Wrap `operand` in any postfix operators that follow it.
    fn postfixes(&mut self, mut operand: Expression) -> Expression {
        loop {
            let kind = self.tokens.front().map(|t| t.kind);
            let null_follows = self.tokens.get(1).is_some_and(|t| t.is_keyword("NULL"));
            let op = match (kind, self.tokens.pop_front()) {
                (Some(TokenKind::Postfix), Some(op)) => op,
                (Some(TokenKind::Not), Some(not)) if null_follows => match self.tokens.pop_front() {
                    Some(null) => compound(TokenKind::Postfix, &not, &null),
                    None => not,
                },
                (_, Some(token)) => {
                    self.tokens.push_front(token);
                    return operand;
                }
                (_, None) => return operand,
            };
            operand = Expression::Postfix {
                operand: Box::new(operand),
                op,
            };
        }
    }

    fn binary_operator(&mut self) -> Result<Token, ExpressionError> {
        let token = self.pop()?;
        match token.kind {
            TokenKind::Symbol | TokenKind::Sign => Ok(token),
            TokenKind::Operator if token.is_keyword("IS") => {
                if self.peek_kind() == Some(TokenKind::Not) {
                    let not = self.pop()?;
                    Ok(compound(TokenKind::Operator, &token, &not))
                } else {
                    Ok(token)
                }
            }
            TokenKind::Operator => Ok(token),
            TokenKind::Not => {
                let combines = self
                    .tokens
                    .front()
                    .is_some_and(|t| NOT_BINARY.iter().any(|k| t.is_keyword(k)));
                if combines {
                    let second = self.pop()?;
                    Ok(compound(TokenKind::Operator, &token, &second))
                } else {
                    Err(unexpected(token))
                }
            }
            _ => Err(unexpected(token)),
        }
    }

    /// Parse one operand, or `None` where an empty expression is allowed.
    fn operand(
        &mut self,
        level: Level,
        terminators: &[&str],
        allow_empty: bool,
        list: bool,
    ) -> Result<Option<Expression>, ExpressionError> {
        let Some(front) = self.tokens.front() else {
            return Err(ExpressionError::UnexpectedEnd);
        };
        let kind = front.kind;
        let subquery = is_subquery_start(front);
        let opens_paren = self.tokens.get(1).map(|t| t.kind) == Some(TokenKind::OpenParen);
        let operator_name = front.is_operator_name() && !(front.is_keyword("CAST") && opens_paren);
        let empty = allow_empty
            && match level {
                Level::Arguments => kind == TokenKind::CloseParen,
                Level::Top => is_terminator(front, terminators),
                Level::Nested | Level::Bounded => false,
            };

        if empty {
            return Ok(None);
        }
        if subquery {
            return Err(ExpressionError::Subquery);
        }

        let expression = match kind {
            TokenKind::Sign | TokenKind::SymbolPrefix => {
                let op = self.pop()?;
                self.prefixed(op, level)?
            }
            TokenKind::Not => {
                let not = self.pop()?;
                let op = if self.tokens.front().is_some_and(|t| t.is_keyword("EXISTS")) {
                    let exists = self.pop()?;
                    compound(TokenKind::Prefix, &not, &exists)
                } else {
                    not
                };
                self.prefixed(op, level)?
            }
            // `desc`, `like` and friends name a column or function here.
            _ if kind == TokenKind::Identifier || operator_name => {
                let word = self.pop()?;
                let name = Token::new(TokenKind::Identifier, word.text);
                if self.peek_kind() == Some(TokenKind::OpenParen) {
                    self.call(name)?
                } else {
                    Expression::Leaf(name)
                }
            }
            TokenKind::Prefix => self.prefix_keyword(level)?,
            TokenKind::OpenParen => self.parenthesized(list)?,
            TokenKind::QuotedIdentifier
            | TokenKind::BackQuotedIdentifier
            | TokenKind::SquareIdentifier
            | TokenKind::StringLiteral
            | TokenKind::BlobLiteral
            | TokenKind::Numeric => Expression::Leaf(self.pop()?),
            _ => return Err(unexpected(self.pop()?)),
        };
        Ok(Some(expression))
    }

    fn prefixed(&mut self, op: Token, level: Level) -> Result<Expression, ExpressionError> {
        let operand = self
            .operand(level, &[], false, false)?
            .ok_or(ExpressionError::UnexpectedEnd)?;
        Ok(Expression::Prefix {
            op,
            operand: Box::new(operand),
        })
    }

    fn prefix_keyword(&mut self, level: Level) -> Result<Expression, ExpressionError> {
        let op = self.pop()?;
        if op.is_keyword("CAST") {
            return self.cast(op);
        }
        if op.is_keyword("DISTINCT") {
            if level != Level::Arguments {
                return Err(ExpressionError::MisplacedDistinct);
            }
            if self.tokens.front().is_some_and(|t| t.is_keyword("DISTINCT")) {
                return Err(ExpressionError::RepeatedDistinct);
            }
        }
        if op.is_keyword("CASE") && self.tokens.front().is_some_and(|t| t.is_keyword("WHEN")) {
            let when = self.pop()?;
            let operand = self.prefixed(when, level)?;
            return Ok(Expression::Prefix {
                op,
                operand: Box::new(operand),
            });
        }
        self.prefixed(op, level)
    }

    fn parenthesized(&mut self, list: bool) -> Result<Expression, ExpressionError> {
        self.pop()?;
        if self.tokens.front().is_some_and(is_subquery_start) {
            return Err(ExpressionError::Subquery);
        }
        let inner = if list {
            self.expression(Level::Arguments, &[], true)?
        } else {
            self.expression(Level::Nested, &[], false)?
        };
        self.expect_close()?;
        Ok(Expression::Parenthesized(Box::new(inner)))
    }

    fn call(&mut self, name: Token) -> Result<Expression, ExpressionError> {
        self.pop()?;
        let aggregate_star = self
            .tokens
            .front()
            .is_some_and(|t| t.kind == TokenKind::Symbol && t.text == "*")
            && self.tokens.get(1).map(|t| t.kind) == Some(TokenKind::CloseParen);
        let arguments = if aggregate_star {
            Expression::Leaf(self.pop()?)
        } else {
            self.expression(Level::Arguments, &[], true)?
        };
        self.expect_close()?;
        Ok(Expression::Call {
            name,
            arguments: Box::new(arguments),
        })
    }

    /// `CAST ( expr AS type-name [( n [, n] )] )`
    fn cast(&mut self, name: Token) -> Result<Expression, ExpressionError> {
        match self.pop()? {
            open if open.kind == TokenKind::OpenParen => {}
            other => return Err(unexpected(other)),
        }
        let inner = self.expression(Level::Bounded, &["AS"], false)?;
        let as_token = self.pop()?;

        let mut type_tokens = Vec::new();
        while self.peek_kind() == Some(TokenKind::Identifier) {
            type_tokens.push(self.pop()?);
        }
        if type_tokens.is_empty() {
            return Err(ExpressionError::MissingCastType);
        }
        if self.peek_kind() == Some(TokenKind::OpenParen) {
            type_tokens.push(self.pop()?);
            self.signed_number(&mut type_tokens)?;
            if self.peek_kind() == Some(TokenKind::Comma) {
                type_tokens.push(self.pop()?);
                self.signed_number(&mut type_tokens)?;
            }
            type_tokens.push(self.expect_close()?);
        }
        self.expect_close()?;

        let type_name = Token::new(TokenKind::Identifier, render_tokens(&type_tokens));
        Ok(Expression::Call {
            name,
            arguments: Box::new(Expression::binary(
                inner,
                as_token,
                Expression::Leaf(type_name),
            )),
        })
    }

    fn signed_number(&mut self, into: &mut Vec<Token>) -> Result<(), ExpressionError> {
        if self.peek_kind() == Some(TokenKind::Sign) {
            into.push(self.pop()?);
        }
        match self.pop()? {
            number if number.kind == TokenKind::Numeric => {
                into.push(number);
                Ok(())
            }
            other => Err(unexpected(other)),
        }
    }

    fn expect_close(&mut self) -> Result<Token, ExpressionError> {
        match self.pop()? {
            close if close.kind == TokenKind::CloseParen => Ok(close),
            other => Err(unexpected(other)),
        }
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.front().map(|t| t.kind)
    }

    fn pop(&mut self) -> Result<Token, ExpressionError> {
        self.tokens
            .pop_front()
            .ok_or(ExpressionError::UnexpectedEnd)
    }
}

/// Join two keyword tokens into one compound operator token.
fn compound(kind: TokenKind, first: &Token, second: &Token) -> Token {
    Token::new(kind, format!("{} {}", first.text, second.text))
}

fn is_terminator(token: &Token, terminators: &[&str]) -> bool {
    terminators.iter().any(|k| token.is_keyword(k))
}

pub(crate) fn is_subquery_start(token: &Token) -> bool {
    ["SELECT", "VALUES", "WITH"]
        .iter()
        .any(|k| token.is_keyword(k))
}

pub(crate) fn unexpected(token: Token) -> ExpressionError {
    match token.kind {
        TokenKind::Invalid => ExpressionError::InvalidToken { token: token.text },
        _ => ExpressionError::UnexpectedToken { token: token.text },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::FormatSql;
    use alloc::string::String;

    fn ident(text: &str) -> Expression {
        Expression::leaf(Token::new(TokenKind::Identifier, text))
    }

    fn number(text: &str) -> Expression {
        Expression::leaf(Token::new(TokenKind::Numeric, text))
    }

    #[test]
    fn test_binary_operators_nest_right() {
        let expr = parse_expression("a * b + c").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                ident("a"),
                Token::new(TokenKind::Symbol, "*"),
                Expression::binary(ident("b"), Token::new(TokenKind::Sign, "+"), ident("c")),
            )
        );
    }

    #[test]
    fn test_aggregate_star() {
        let expr = parse_expression("count(*)").unwrap();
        assert_eq!(
            expr,
            Expression::Call {
                name: Token::new(TokenKind::Identifier, "count"),
                arguments: Box::new(Expression::leaf(Token::new(TokenKind::Symbol, "*"))),
            }
        );
        assert!(parse_expression("count(* + 1)").is_err());
        assert!(parse_expression("*").is_err());
        assert!(parse_expression("f(a, *)").is_err());
        assert!(parse_expression("f(a + *)").is_err());
        assert!(parse_expression("count(DISTINCT *)").is_err());
        assert!(parse_expression("a IN (*)").is_err());
    }

    #[test]
    fn test_distinct_argument() {
        assert!(parse_expression("count(DISTINCT a)").is_ok());
        assert_eq!(
            parse_expression("count(DISTINCT DISTINCT a)"),
            Err(ExpressionError::RepeatedDistinct)
        );
        assert_eq!(
            parse_expression("DISTINCT a"),
            Err(ExpressionError::MisplacedDistinct)
        );
    }

    #[test]
    fn test_cast() {
        let expr = parse_expression("CAST(a + 1 AS VARCHAR(10))").unwrap();
        let Expression::Call { name, arguments } = expr else {
            panic!("Expected Call");
        };
        assert!(name.is_keyword("CAST"));
        let Expression::Binary { op, right, .. } = *arguments else {
            panic!("Expected Binary");
        };
        assert!(op.is_keyword("AS"));
        assert_eq!(
            *right,
            Expression::leaf(Token::new(TokenKind::Identifier, "VARCHAR(10)"))
        );

        assert!(parse_expression("CAST(a AS DECIMAL(10, -2))").is_ok());
        assert!(parse_expression("CAST(a AS UNSIGNED BIG INT)").is_ok());
        assert_eq!(
            parse_expression("CAST(a AS)"),
            Err(ExpressionError::MissingCastType)
        );
        assert!(parse_expression("CAST a").is_err());
        assert!(parse_expression("CAST(a)").is_err());
    }

    #[test]
    fn test_not_forms() {
        let is_not = parse_expression("a IS NOT NULL").unwrap();
        let Expression::Binary { op, .. } = is_not else {
            panic!("Expected Binary");
        };
        assert_eq!(op, Token::new(TokenKind::Operator, "IS NOT"));

        let not_null = parse_expression("a NOT NULL").unwrap();
        let Expression::Postfix { op, .. } = not_null else {
            panic!("Expected Postfix");
        };
        assert_eq!(op, Token::new(TokenKind::Postfix, "NOT NULL"));

        let not_like = parse_expression("a not like 'x%'").unwrap();
        let Expression::Binary { op, .. } = not_like else {
            panic!("Expected Binary");
        };
        assert_eq!(op, Token::new(TokenKind::Operator, "not like"));

        assert!(parse_expression("NOT a").is_ok());
        assert!(parse_expression("a NOT b").is_err());
    }

    #[test]
    fn test_subqueries_rejected() {
        assert_eq!(
            parse_expression("(SELECT 1)"),
            Err(ExpressionError::Subquery)
        );
        assert_eq!(
            parse_expression("NOT EXISTS (SELECT 1)"),
            Err(ExpressionError::Subquery)
        );
        assert_eq!(
            parse_expression("a IN (SELECT b FROM t)"),
            Err(ExpressionError::Subquery)
        );
    }

    #[test]
    fn test_in_list() {
        assert!(parse_expression("a IN (1, 2, 3)").is_ok());
        assert!(parse_expression("a NOT IN ()").is_ok());
        assert!(parse_expression("(1, 2)").is_err());
    }

    #[test]
    fn test_empty_forms() {
        assert_eq!(parse_expression(""), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(
            parse_expression("f()").unwrap(),
            Expression::Call {
                name: Token::new(TokenKind::Identifier, "f"),
                arguments: Box::new(Expression::Empty),
            }
        );
        assert!(parse_expression("()").is_err());

        let mut tokens: TokenQueue = tokenize("AS int").into();
        let expr = ExpressionParser::new(&mut tokens)
            .parse(Level::Top, &["AS"])
            .unwrap();
        assert!(expr.is_empty());
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_terminator_stops_top_level() {
        let mut tokens: TokenQueue = tokenize("a + 1 AS x").into();
        let expr = ExpressionParser::new(&mut tokens)
            .parse(Level::Top, &["AS"])
            .unwrap();
        assert!(matches!(expr, Expression::Binary { .. }));
        assert_eq!(tokens.front().map(|t| t.text.as_str()), Some("AS"));
    }

    #[test]
    fn test_argument_level_stops_before_close() {
        let mut tokens: TokenQueue = tokenize("a, b DESC)").into();
        let expr = ExpressionParser::new(&mut tokens)
            .parse(Level::Arguments, &[])
            .unwrap();
        assert_eq!(expr.split_commas().len(), 2);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_failures() {
        assert_eq!(parse_expression("1 +"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(
            parse_expression("a b"),
            Err(ExpressionError::UnexpectedToken {
                token: String::from("b")
            })
        );
        assert!(matches!(
            parse_expression("x'1g'"),
            Err(ExpressionError::InvalidToken { .. })
        ));
        assert!(parse_expression("(1").is_err());
        assert!(parse_expression("1)").is_err());
        assert!(parse_expression("f(a,)").is_err());
    }

    #[test]
    fn test_operator_words_as_operands() {
        let expr = parse_expression("desc DESC").unwrap();
        assert_eq!(
            expr,
            Expression::Postfix {
                operand: Box::new(ident("desc")),
                op: Token::new(TokenKind::Postfix, "DESC"),
            }
        );
        assert_eq!(
            parse_expression("end = 1 AND match LIKE 'x%'").unwrap().format_sql(),
            "end=1 AND match LIKE'x%'"
        );
        assert!(matches!(
            parse_expression("like(a, 'x%')"),
            Ok(Expression::Call { .. })
        ));
        assert!(matches!(
            parse_expression("CAST(a AS TEXT)"),
            Ok(Expression::Call { name, .. }) if name.kind == TokenKind::Prefix
        ));
        assert!(parse_expression("AND").is_err());
        assert!(parse_expression("a desc desc").is_ok());
    }

    #[test]
    fn test_case_expression() {
        assert!(parse_expression("CASE WHEN a THEN 1 ELSE 2 END").is_ok());
        assert!(parse_expression("CASE a WHEN 1 THEN 'x' END").is_ok());
    }

    #[test]
    fn test_signed_literal() {
        assert_eq!(
            parse_expression("-5").unwrap(),
            Expression::Prefix {
                op: Token::new(TokenKind::Sign, "-"),
                operand: Box::new(number("5")),
            }
        );
    }
}
