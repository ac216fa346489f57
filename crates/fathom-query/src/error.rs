//! Error types for query parsing.

use thiserror::Error;

/// Lexer error with byte position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query syntax error at byte {position}: {message}")]
pub struct LexError {
    /// What went wrong.
    pub message: String,
    /// Byte position in the input where the error occurred.
    pub position: usize,
}

impl LexError {
    /// Creates a new lexer error.
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Errors produced while parsing a query string.
///
/// The parser fails fast: no partial tree is ever returned alongside an
/// error. [`QueryParseError::TooManyClauses`] is the one condition expected
/// under well-formed input, so callers can match on it to react differently
/// from syntax errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryParseError {
    /// The input could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token stream violates the grammar.
    #[error("query syntax error at byte {position}: {message} (near {fragment:?})")]
    Syntax {
        /// What went wrong.
        message: String,
        /// Byte position of the offending token.
        position: usize,
        /// The offending substring, empty at end of input.
        fragment: String,
    },

    /// A fuzzy similarity outside `[0, 1]`.
    #[error("invalid similarity {0}: must be between 0.0 and 1.0")]
    InvalidSimilarity(f32),

    /// The query expanded past the process-wide clause ceiling.
    #[error("too many clauses: query expands past the limit of {limit}")]
    TooManyClauses {
        /// The ceiling in effect when the parse started.
        limit: usize,
    },

    /// A malformed bracketed range.
    #[error("malformed range at byte {position}: {message}")]
    Range {
        /// What went wrong.
        message: String,
        /// Byte position of the offending token.
        position: usize,
    },
}

impl QueryParseError {
    /// Creates a grammar-violation error.
    pub(crate) fn syntax(
        message: impl Into<String>,
        position: usize,
        fragment: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            fragment: fragment.into(),
        }
    }

    /// Creates a malformed-range error.
    pub(crate) fn range(message: impl Into<String>, position: usize) -> Self {
        Self::Range {
            message: message.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new("unterminated phrase", 3);
        assert_eq!(
            err.to_string(),
            "query syntax error at byte 3: unterminated phrase"
        );
    }

    #[test]
    fn lex_error_converts() {
        let err: QueryParseError = LexError::new("unterminated phrase", 0).into();
        assert!(matches!(err, QueryParseError::Lex(_)));
    }

    #[test]
    fn syntax_error_display_carries_fragment() {
        let err = QueryParseError::syntax("unexpected OR", 5, "OR");
        let display = err.to_string();
        assert!(display.contains("unexpected OR"));
        assert!(display.contains("\"OR\""));
        assert!(display.contains("byte 5"));
    }

    #[test]
    fn clause_limit_error_is_distinguishable() {
        let err = QueryParseError::TooManyClauses { limit: 2 };
        assert!(matches!(
            err,
            QueryParseError::TooManyClauses { limit: 2 }
        ));
        assert!(err.to_string().contains("limit of 2"));
    }
}
