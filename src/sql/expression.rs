//! Expression trees built by the expression parser.
//!
//! Trees mirror parse order, not operator precedence: `a + b * c` and
//! `a * b + c` both nest to the right. They are only ever rewritten and
//! printed back, never evaluated.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::token::{Token, TokenKind};

/// A scalar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// Nothing: an empty argument list or an empty top-level expression.
    Empty,
    /// A single token: a name, literal or aggregate `*`.
    Leaf(Token),
    /// A prefix operator applied to an operand.
    Prefix {
        /// The operator, possibly compound (`NOT EXISTS`).
        op: Token,
        /// The operand.
        operand: Box<Expression>,
    },
    /// A binary operator.
    Binary {
        /// Left operand.
        left: Box<Expression>,
        /// The operator, possibly compound (`IS NOT`, `NOT LIKE`).
        op: Token,
        /// Right operand.
        right: Box<Expression>,
    },
    /// A postfix operator applied to an operand.
    Postfix {
        /// The operand.
        operand: Box<Expression>,
        /// The operator, possibly compound (`NOT NULL`).
        op: Token,
    },
    /// A parenthesized sub-expression.
    Parenthesized(Box<Expression>),
    /// A function call; `CAST(x AS t)` is a call named `CAST`.
    Call {
        /// The function name.
        name: Token,
        /// The arguments, joined by comma operators, possibly empty.
        arguments: Box<Expression>,
    },
}

impl Expression {
    /// Create a leaf expression.
    #[must_use]
    pub fn leaf(token: Token) -> Self {
        Expression::Leaf(token)
    }

    /// Create a binary expression.
    #[must_use]
    pub fn binary(left: Expression, op: Token, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Whether this is the empty expression.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Expression::Empty)
    }

    /// Split a comma-joined list into its items.
    ///
    /// Comma operators nest to the right, so the items are the left operands
    /// along the right spine. The empty expression yields no items.
    #[must_use]
    pub fn split_commas(self) -> Vec<Expression> {
        let mut items = Vec::new();
        let mut rest = self;
        loop {
            match rest {
                Expression::Empty => break,
                Expression::Binary { left, op, right } if op.kind == TokenKind::Comma => {
                    items.push(*left);
                    rest = *right;
                }
                other => {
                    items.push(other);
                    break;
                }
            }
        }
        items
    }
}
