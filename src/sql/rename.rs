//! Column renaming inside index expressions.
//!
//! Whether a leaf names a column depends on where it sits as well as on its
//! kind: a string literal at the top of an indexed-column term is a column
//! name in SQLite, the same literal inside a function call is not. The
//! decision is a fixed lookup by token kind and context.

use alloc::string::String;

use hashbrown::HashMap;

use super::expression::Expression;
use super::token::{Token, TokenKind};
use crate::errors::RenameError;
use crate::schema::{CreateIndex, FieldInfo};

/// Old column names mapped to new names, or to nothing for dropped columns.
///
/// Names are matched ASCII case-insensitively, as SQLite matches column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: HashMap<String, Option<String>>,
}

impl RenameMap {
    /// An empty map, which renames nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map column `from` to `to`.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> &mut Self {
        self.entries.insert(from.to_ascii_lowercase(), Some(to.into()));
        self
    }

    /// Mark column `name` as dropped.
    pub fn drop_column(&mut self, name: &str) -> &mut Self {
        self.entries.insert(name.to_ascii_lowercase(), None);
        self
    }

    /// Build the map for a table rebuild by pairing columns by position.
    ///
    /// `edited[i]` is the new name of `original[i]`; `None`, or a missing
    /// trailing entry, drops the column.
    #[must_use]
    pub fn pair_by_position(original: &[FieldInfo], edited: &[Option<String>]) -> Self {
        let mut map = Self::new();
        for (i, field) in original.iter().enumerate() {
            match edited.get(i).and_then(Option::as_deref) {
                Some(new_name) => map.rename(&field.name, new_name),
                None => map.drop_column(&field.name),
            };
        }
        map
    }

    /// What happens to column `name`.
    ///
    /// `None` if the map does not mention it, `Some(None)` if it was dropped.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Option<&str>> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(Option::as_deref)
    }

    /// Number of mapped columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map mentions no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a substituted expression comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One term of an index's column list.
    IndexedColumn,
    /// An index's `WHERE` predicate.
    Predicate,
}

/// Position of a leaf relative to the term it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// The whole indexed-column term.
    IndexTop,
    /// Under `ASC`/`DESC`, or left of `COLLATE`, at the top of a term.
    Ordered,
    /// Inside parentheses, a call or another operator of a column term.
    Nested,
    /// Anywhere in a `WHERE` predicate.
    Predicate,
    /// A collation or type name: never a column.
    Literal,
}

impl Context {
    fn descend(self) -> Self {
        match self {
            Context::IndexTop | Context::Ordered | Context::Nested => Context::Nested,
            Context::Predicate => Context::Predicate,
            Context::Literal => Context::Literal,
        }
    }
}

/// Whether a leaf of `kind` in `context` names a column.
fn is_column_candidate(kind: TokenKind, context: Context) -> bool {
    match (kind, context) {
        (_, Context::Literal) => false,
        (
            TokenKind::QuotedIdentifier
            | TokenKind::BackQuotedIdentifier
            | TokenKind::SquareIdentifier
            | TokenKind::Identifier,
            Context::IndexTop | Context::Ordered | Context::Nested | Context::Predicate,
        ) => true,
        (TokenKind::StringLiteral, Context::IndexTop | Context::Ordered) => true,
        (TokenKind::StringLiteral, Context::Nested | Context::Predicate) => false,
        (
            TokenKind::BlobLiteral
            | TokenKind::Numeric
            | TokenKind::Operator
            | TokenKind::Postfix
            | TokenKind::Prefix
            | TokenKind::Not
            | TokenKind::OpenParen
            | TokenKind::CloseParen
            | TokenKind::Comma
            | TokenKind::Symbol
            | TokenKind::SymbolPrefix
            | TokenKind::Sign
            | TokenKind::Invalid,
            _,
        ) => false,
    }
}

/// Rename the column references in `expression` in place.
///
/// A renamed leaf takes the new name and becomes a double-quoted identifier.
///
/// # Errors
///
/// Returns [`RenameError::DroppedColumn`] if the expression references a
/// dropped column. Leaves renamed before the failure stay renamed; the
/// expression must then be discarded.
pub fn substitute(
    expression: &mut Expression,
    map: &RenameMap,
    placement: Placement,
) -> Result<(), RenameError> {
    let context = match placement {
        Placement::IndexedColumn => Context::IndexTop,
        Placement::Predicate => Context::Predicate,
    };
    walk(expression, map, context)
}

fn walk(expression: &mut Expression, map: &RenameMap, context: Context) -> Result<(), RenameError> {
    match expression {
        Expression::Empty => Ok(()),
        Expression::Leaf(token) => rename_leaf(token, map, context),
        Expression::Prefix { operand, .. } => walk(operand, map, context.descend()),
        Expression::Binary { left, op, right } if op.is_keyword("COLLATE") => {
            let left_context = match context {
                Context::IndexTop | Context::Ordered if is_collation_only(right) => Context::Ordered,
                other => other.descend(),
            };
            walk(left, map, left_context)?;
            walk_collated(right, map, context.descend())
        }
        Expression::Binary { left, op, right } => {
            let right_context = if op.is_keyword("AS") {
                Context::Literal
            } else {
                context.descend()
            };
            walk(left, map, context.descend())?;
            walk(right, map, right_context)
        }
        Expression::Postfix { operand, op } => {
            let ordering = op.is_keyword("ASC") || op.is_keyword("DESC");
            let operand_context = match context {
                Context::IndexTop if ordering => Context::Ordered,
                other => other.descend(),
            };
            walk(operand, map, operand_context)
        }
        Expression::Parenthesized(inner) => walk(inner, map, context.descend()),
        Expression::Call { arguments, .. } => walk(arguments, map, context.descend()),
    }
}

/// Walk the right operand of `COLLATE`.
///
/// Trees nest to the right, so `a COLLATE NOCASE = b` has `NOCASE = b` on the
/// right. Only the leftmost leaf is the collation name; the operators that
/// follow it still reach columns.
fn walk_collated(expression: &mut Expression, map: &RenameMap, context: Context) -> Result<(), RenameError> {
    match expression {
        Expression::Leaf(_) => Ok(()),
        Expression::Postfix { operand, .. } => walk_collated(operand, map, context),
        Expression::Binary { left, op, right } => {
            walk_collated(left, map, context)?;
            if op.is_keyword("COLLATE") {
                walk_collated(right, map, context)
            } else {
                walk(right, map, context)
            }
        }
        other => walk(other, map, context),
    }
}

/// Whether a `COLLATE` operand is just the collation name, possibly ordered.
fn is_collation_only(expression: &Expression) -> bool {
    match expression {
        Expression::Leaf(_) => true,
        Expression::Postfix { operand, op } => {
            (op.is_keyword("ASC") || op.is_keyword("DESC")) && is_collation_only(operand)
        }
        _ => false,
    }
}

fn rename_leaf(token: &mut Token, map: &RenameMap, context: Context) -> Result<(), RenameError> {
    if !is_column_candidate(token.kind, context) {
        return Ok(());
    }
    match map.lookup(&token.text) {
        None => Ok(()),
        Some(Some(new_name)) => {
            *token = Token::new(TokenKind::QuotedIdentifier, new_name);
            Ok(())
        }
        Some(None) => {
            tracing::debug!(target: "sqlite_ddl::rename", column = %token.text, "expression references dropped column");
            Err(RenameError::DroppedColumn {
                column: token.text.clone(),
            })
        }
    }
}

impl CreateIndex {
    /// Rename the columns referenced by the column list and the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`RenameError::DroppedColumn`] if any term or the predicate
    /// references a dropped column. The index must then be discarded.
    pub fn substitute_columns(&mut self, map: &RenameMap) -> Result<(), RenameError> {
        for column in &mut self.columns {
            substitute(column, map, Placement::IndexedColumn)?;
        }
        if let Some(predicate) = &mut self.predicate {
            substitute(predicate, map, Placement::Predicate)?;
        }
        Ok(())
    }

    /// Point the index at `table` and rename its columns, for replaying it
    /// against a rebuilt table.
    ///
    /// # Errors
    ///
    /// See [`CreateIndex::substitute_columns`].
    pub fn retarget(&mut self, table: impl Into<String>, map: &RenameMap) -> Result<(), RenameError> {
        self.table = table.into();
        self.substitute_columns(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{FormatSql, parse_expression};
    use alloc::vec;

    fn renamed(sql: &str, map: &RenameMap, placement: Placement) -> Result<String, RenameError> {
        let mut expression = parse_expression(sql).unwrap();
        substitute(&mut expression, map, placement)?;
        Ok(expression.format_sql())
    }

    #[test]
    fn test_rename_map_is_case_insensitive() {
        let mut map = RenameMap::new();
        map.rename("Price", "cost").drop_column("LABEL");
        assert_eq!(map.lookup("price"), Some(Some("cost")));
        assert_eq!(map.lookup("label"), Some(None));
        assert_eq!(map.lookup("other"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_pair_by_position() {
        let original = [FieldInfo::new("a"), FieldInfo::new("b"), FieldInfo::new("c")];
        let map = RenameMap::pair_by_position(
            &original,
            &[Some(String::from("z")), None],
        );
        assert_eq!(map.lookup("a"), Some(Some("z")));
        assert_eq!(map.lookup("b"), Some(None));
        assert_eq!(map.lookup("c"), Some(None));
    }

    #[test]
    fn test_renamed_leaf_becomes_quoted() {
        let mut map = RenameMap::new();
        map.rename("a", "order");
        assert_eq!(
            renamed("a > 0", &map, Placement::Predicate).unwrap(),
            r#""order">0"#
        );
    }

    #[test]
    fn test_string_literal_only_at_top_of_term() {
        let mut map = RenameMap::new();
        map.rename("a", "z");
        assert_eq!(renamed("'a'", &map, Placement::IndexedColumn).unwrap(), r#""z""#);
        assert_eq!(
            renamed("'a' DESC", &map, Placement::IndexedColumn).unwrap(),
            r#""z"DESC"#
        );
        assert_eq!(
            renamed("lower('a')", &map, Placement::IndexedColumn).unwrap(),
            "lower('a')"
        );
        assert_eq!(
            renamed("b = 'a'", &map, Placement::Predicate).unwrap(),
            "b='a'"
        );
    }

    #[test]
    fn test_collation_and_type_names_are_not_columns() {
        let mut map = RenameMap::new();
        map.rename("nocase", "x").rename("text", "y").rename("b", "c");
        assert_eq!(
            renamed("b COLLATE nocase DESC", &map, Placement::IndexedColumn).unwrap(),
            r#""c"COLLATE nocase DESC"#
        );
        assert_eq!(
            renamed("CAST(b AS text)", &map, Placement::IndexedColumn).unwrap(),
            r#"CAST("c"AS text)"#
        );
    }

    #[test]
    fn test_operators_after_collation_reach_columns() {
        let mut map = RenameMap::new();
        map.rename("nocase", "x").rename("b", "z");
        assert_eq!(
            renamed("a COLLATE nocase = b", &map, Placement::Predicate).unwrap(),
            r#"a COLLATE nocase="z""#
        );
        assert_eq!(
            renamed("(a COLLATE nocase || b)", &map, Placement::IndexedColumn).unwrap(),
            r#"(a COLLATE nocase||"z")"#
        );

        let mut dropped = RenameMap::new();
        dropped.drop_column("age").drop_column("b");
        assert_eq!(
            renamed("name COLLATE NOCASE = 'x' AND age > 0", &dropped, Placement::Predicate),
            Err(RenameError::DroppedColumn {
                column: String::from("age")
            })
        );
        assert_eq!(
            renamed("(a COLLATE NOCASE || b)", &dropped, Placement::IndexedColumn),
            Err(RenameError::DroppedColumn {
                column: String::from("b")
            })
        );
    }

    #[test]
    fn test_function_names_are_not_columns() {
        let mut map = RenameMap::new();
        map.rename("lower", "x").rename("a", "z");
        assert_eq!(
            renamed("lower(a)", &map, Placement::IndexedColumn).unwrap(),
            r#"lower("z")"#
        );
    }

    #[test]
    fn test_dropped_column_fails() {
        let mut map = RenameMap::new();
        map.drop_column("a");
        assert_eq!(
            renamed("b + (a * 2)", &map, Placement::IndexedColumn),
            Err(RenameError::DroppedColumn {
                column: String::from("a")
            })
        );
        assert!(renamed("'a' || b", &map, Placement::Predicate).is_ok());
    }

    #[test]
    fn test_index_substitution() {
        let mut index = CreateIndex::new("ix", "t");
        index.columns = vec![parse_expression("a").unwrap(), parse_expression("b").unwrap()];
        index.predicate = Some(parse_expression("a > 0").unwrap());

        let mut map = RenameMap::new();
        map.rename("a", "z");
        let mut renamed = index.clone();
        renamed.retarget("t_new", &map).unwrap();
        assert_eq!(
            renamed.format_sql(),
            r#"CREATE INDEX ix ON t_new("z",b)WHERE"z">0"#
        );

        let mut dropped = RenameMap::new();
        dropped.drop_column("a");
        assert!(index.substitute_columns(&dropped).is_err());
    }
}
