//! Token shape shared by the lexer, the parsers and the serializer.

use alloc::string::String;

/// A token produced by the lexer.
///
/// Tokens carry no position; only their order in the stream is meaningful.
/// Quoted forms store their *unescaped* content in `text`, the quoting style
/// lives in `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The spelling of the token, without quotes for quoted kinds.
    pub text: String,
    /// The kind of token.
    pub kind: TokenKind,
}

/// The different kinds of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Identifiers
    /// Double-quoted identifier, `"name"`.
    QuotedIdentifier,
    /// Back-quoted identifier, `` `name` ``.
    BackQuotedIdentifier,
    /// Square-bracketed identifier, `[name]`.
    SquareIdentifier,
    /// Bare identifier (also every keyword that is not an operator).
    Identifier,

    // Literals
    /// String literal, `'text'`.
    StringLiteral,
    /// Blob literal, `X'CAFE'`. The text holds the hex digits only.
    BlobLiteral,
    /// Numeric literal, kept verbatim.
    Numeric,

    // Alphabetic operators
    /// Alphabetic binary operator (`AND`, `IS`, `LIKE`, ...).
    Operator,
    /// Alphabetic postfix operator (`ASC`, `ISNULL`, ...).
    Postfix,
    /// Alphabetic prefix operator (`CASE`, `CAST`, `NOT EXISTS`, ...).
    Prefix,
    /// The `NOT` keyword, resolved by the expression parser.
    Not,

    // Punctuation and symbols
    /// Left parenthesis
    OpenParen,
    /// Right parenthesis
    CloseParen,
    /// Comma
    Comma,
    /// Symbolic binary operator (`||`, `<=`, `*`, ...).
    Symbol,
    /// Symbolic prefix operator, `~`.
    SymbolPrefix,
    /// `+` or `-`, prefix or binary depending on position.
    Sign,

    /// Unterminated quote or literal, malformed number or stray character.
    Invalid,
}

impl TokenKind {
    /// Whether this is one of the three quoted identifier kinds.
    #[must_use]
    pub fn is_quoted_identifier(self) -> bool {
        matches!(
            self,
            TokenKind::QuotedIdentifier
                | TokenKind::BackQuotedIdentifier
                | TokenKind::SquareIdentifier
        )
    }

    /// Whether tokens of this kind are spelled with letters.
    #[must_use]
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Operator
                | TokenKind::Postfix
                | TokenKind::Prefix
                | TokenKind::Not
        )
    }
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// A token naming `name`, bare when that is unambiguous and double-quoted
    /// otherwise.
    #[must_use]
    pub fn name(name: &str) -> Self {
        let kind = if is_plain_identifier(name) && !is_keyword(name) {
            TokenKind::Identifier
        } else {
            TokenKind::QuotedIdentifier
        };
        Self::new(kind, name)
    }

    /// Whether this token is the alphabetic keyword `keyword` (case-insensitive).
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind.is_word() && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Whether this token can be used as a table, column, index or collation name.
    #[must_use]
    pub fn is_name(&self) -> bool {
        self.kind.is_quoted_identifier()
            || matches!(self.kind, TokenKind::Identifier | TokenKind::StringLiteral)
            || self.is_operator_name()
    }

    /// Whether this is an alphabetic operator SQLite also accepts as a bare name.
    #[must_use]
    pub fn is_operator_name(&self) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Postfix | TokenKind::Prefix)
            && OPERATOR_NAMES.iter().any(|k| self.text.eq_ignore_ascii_case(k))
    }
}

/// Alphabetic operators that SQLite falls back to reading as identifiers.
const OPERATOR_NAMES: [&str; 8] = ["ASC", "DESC", "END", "MATCH", "LIKE", "GLOB", "REGEXP", "CAST"];

/// Reclassify a bare word into its alphabetic operator kind, if any.
pub(crate) fn classify_word(word: &str) -> TokenKind {
    const BINARY: [&str; 14] = [
        "AND", "OR", "IS", "IN", "LIKE", "GLOB", "MATCH", "REGEXP", "BETWEEN", "ESCAPE",
        "COLLATE", "WHEN", "THEN", "ELSE",
    ];
    const POSTFIX: [&str; 5] = ["ASC", "DESC", "ISNULL", "NOTNULL", "END"];
    const PREFIX: [&str; 4] = ["CASE", "CAST", "DISTINCT", "EXISTS"];

    let matches = |set: &[&str]| set.iter().any(|k| k.eq_ignore_ascii_case(word));
    if word.eq_ignore_ascii_case("NOT") {
        TokenKind::Not
    } else if matches(&BINARY) {
        TokenKind::Operator
    } else if matches(&POSTFIX) {
        TokenKind::Postfix
    } else if matches(&PREFIX) {
        TokenKind::Prefix
    } else {
        TokenKind::Identifier
    }
}

/// SQLite keywords. A name spelled like one of these must be quoted.
const KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHOUT",
];

/// Whether `word` is a SQLite keyword (case-insensitive).
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Whether `name` lexes as a single bare identifier.
fn is_plain_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_word() {
        assert_eq!(classify_word("and"), TokenKind::Operator);
        assert_eq!(classify_word("Like"), TokenKind::Operator);
        assert_eq!(classify_word("DESC"), TokenKind::Postfix);
        assert_eq!(classify_word("notnull"), TokenKind::Postfix);
        assert_eq!(classify_word("cast"), TokenKind::Prefix);
        assert_eq!(classify_word("NOT"), TokenKind::Not);
        assert_eq!(classify_word("NULL"), TokenKind::Identifier);
        assert_eq!(classify_word("users"), TokenKind::Identifier);
    }

    #[test]
    fn test_name_quoting() {
        assert_eq!(Token::name("users").kind, TokenKind::Identifier);
        assert_eq!(Token::name("order").kind, TokenKind::QuotedIdentifier);
        assert_eq!(Token::name("first name").kind, TokenKind::QuotedIdentifier);
        assert_eq!(Token::name("1st").kind, TokenKind::QuotedIdentifier);
        assert_eq!(Token::name("").kind, TokenKind::QuotedIdentifier);
    }

    #[test]
    fn test_operator_names() {
        assert!(Token::new(TokenKind::Postfix, "desc").is_name());
        assert!(Token::new(TokenKind::Operator, "Like").is_name());
        assert!(Token::new(TokenKind::Postfix, "END").is_operator_name());
        assert!(!Token::new(TokenKind::Operator, "AND").is_name());
        assert!(!Token::new(TokenKind::Postfix, "ISNULL").is_name());
        assert!(!Token::new(TokenKind::Not, "NOT").is_name());
    }

    #[test]
    fn test_is_keyword_requires_word_kind() {
        assert!(Token::new(TokenKind::Identifier, "primary").is_keyword("PRIMARY"));
        assert!(!Token::new(TokenKind::QuotedIdentifier, "primary").is_keyword("PRIMARY"));
        assert!(!Token::new(TokenKind::StringLiteral, "KEY").is_keyword("KEY"));
    }
}
